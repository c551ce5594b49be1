//! Shared fixtures for quire-db integration tests.

#![allow(dead_code)]

use std::path::PathBuf;
use std::time::Duration;

use quire_core::order::draft_proforma;
use quire_core::{
    Actor, BookTitle, CreditPolicy, Customer, DiscountPolicy, NewBookTitle, OrderLineRequest,
    ProformaDraft, Role, SalesOrder, Warehouse,
};
use quire_db::{Database, DbConfig, NewCustomer, NewUser};
use uuid::Uuid;

pub struct Fixture {
    pub db: Database,
    pub admin: Actor,
    pub central: Warehouse,
    pub north: Warehouse,
    pub customer: Customer,
    /// Effective Java, 45.00
    pub book: BookTitle,
    /// Design Patterns, 50.00
    pub other_book: BookTitle,
    path: Option<PathBuf>,
}

impl Fixture {
    /// Single-connection in-memory database.
    pub async fn in_memory() -> Self {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        Self::populate(db, None).await
    }

    /// Scratch file database with a pool of `connections`.
    pub async fn on_disk(connections: u32) -> Self {
        let path = std::env::temp_dir().join(format!("quire-test-{}.db", Uuid::new_v4()));
        let config = DbConfig::new(&path)
            .max_connections(connections)
            .busy_timeout(Duration::from_secs(30));
        let db = Database::new(config).await.unwrap();
        Self::populate(db, Some(path)).await
    }

    async fn populate(db: Database, path: Option<PathBuf>) -> Self {
        let master = db.master();
        let branch = master.insert_branch("Head Office", None, true).await.unwrap();
        let central = master.insert_warehouse("Central Warehouse", branch.id).await.unwrap();
        let north = master.insert_warehouse("North Warehouse", branch.id).await.unwrap();

        let customer = master
            .insert_customer(&NewCustomer::new("Lotus Books", branch.id).credit_limit(100_000_000))
            .await
            .unwrap();

        let admin = master
            .insert_user(&NewUser {
                name: "System Admin".to_string(),
                email: "admin@erp.com".to_string(),
                role: Role::Admin,
                branch_id: Some(branch.id),
                customer_id: None,
            })
            .await
            .unwrap();

        let book = db
            .catalog()
            .insert(&new_book("978-0134685991", "Effective Java", 4500))
            .await
            .unwrap();
        let other_book = db
            .catalog()
            .insert(&new_book("978-0201633610", "Design Patterns", 5000))
            .await
            .unwrap();

        Fixture {
            db,
            admin: Actor::from(&admin),
            central,
            north,
            customer,
            book,
            other_book,
            path,
        }
    }

    pub async fn customer_with(&self, limit: i64, outstanding: i64) -> Customer {
        self.db
            .master()
            .insert_customer(
                &NewCustomer::new("Page Turners", self.customer.branch_id)
                    .credit_limit(limit)
                    .opening_balance(outstanding),
            )
            .await
            .unwrap()
    }

    pub fn draft(&self, customer: &Customer, lines: &[OrderLineRequest]) -> ProformaDraft {
        draft_proforma(
            &self.admin,
            customer,
            &[self.book.clone(), self.other_book.clone()],
            lines,
            &CreditPolicy::default(),
            &DiscountPolicy::default(),
        )
        .unwrap()
    }

    /// A CONFIRMED order for `quantity` copies of the 45.00 title at 10% off.
    pub async fn confirmed_order(&self, quantity: i64) -> SalesOrder {
        let draft = self.draft(&self.customer, &[line(self.book.id, quantity, Some(1000))]);
        let view = self.db.sales_orders().insert_proforma(&draft).await.unwrap();
        self.db
            .sales_orders()
            .confirm(view.order.id, None)
            .await
            .unwrap()
    }

    pub async fn stock(&self, warehouse: &Warehouse, quantity: i64) {
        self.db
            .inventory()
            .adjust(self.book.id, warehouse.id, quantity)
            .await
            .unwrap();
    }

    pub async fn cleanup(self) {
        self.db.close().await;
        if let Some(path) = self.path {
            for suffix in ["", "-wal", "-shm"] {
                let mut file = path.clone().into_os_string();
                file.push(suffix);
                let _ = std::fs::remove_file(file);
            }
        }
    }
}

pub fn line(book_title_id: i64, quantity: i64, discount_bps: Option<i64>) -> OrderLineRequest {
    OrderLineRequest {
        book_title_id,
        quantity,
        discount_bps,
    }
}

pub fn new_book(isbn: &str, title: &str, price_cents: i64) -> NewBookTitle {
    NewBookTitle {
        isbn: isbn.to_string(),
        title: title.to_string(),
        author: None,
        publisher: None,
        price_cents,
    }
}
