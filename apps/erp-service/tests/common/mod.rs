//! Shared fixtures for quire-service integration tests.

#![allow(dead_code)]

use quire_core::{
    Actor, BookTitle, Customer, NewBookTitle, OrderLineRequest, Role, SalesOrder, Warehouse,
};
use quire_db::{NewCustomer, NewUser};
use quire_service::commands::inventory::{adjust_stock, AdjustStockRequest};
use quire_service::commands::order::{
    confirm_order, create_order, ConfirmOrderRequest, CreateOrderRequest,
};
use quire_service::config::ErpConfig;
use quire_service::Erp;

pub struct Fixture {
    pub erp: Erp,
    pub admin: Actor,
    /// SALES role: may create and confirm, may not approve or invoice.
    pub sales: Actor,
    /// Customer portal user bound to `customer`.
    pub portal: Actor,
    pub central: Warehouse,
    pub north: Warehouse,
    pub customer: Customer,
    /// Effective Java, 45.00
    pub book: BookTitle,
    /// Design Patterns, 50.00
    pub other_book: BookTitle,
}

impl Fixture {
    pub async fn new() -> Self {
        Self::with_config(ErpConfig::in_memory()).await
    }

    pub async fn with_config(config: ErpConfig) -> Self {
        let erp = Erp::open(config).await.unwrap();
        let master = erp.db().master();

        let branch = master.insert_branch("Head Office", None, true).await.unwrap();
        let central = master.insert_warehouse("Central Warehouse", branch.id).await.unwrap();
        let north = master.insert_warehouse("North Warehouse", branch.id).await.unwrap();

        let customer = master
            .insert_customer(&NewCustomer::new("Lotus Books", branch.id).credit_limit(100_000_000))
            .await
            .unwrap();

        let admin = master
            .insert_user(&user("System Admin", "admin@erp.com", Role::Admin, Some(branch.id), None))
            .await
            .unwrap();
        let sales = master
            .insert_user(&user("Ravi", "ravi@erp.com", Role::Sales, Some(branch.id), None))
            .await
            .unwrap();
        let portal = master
            .insert_user(&user(
                "Lotus Buyer",
                "buyer@lotus.example",
                Role::Customer,
                None,
                Some(customer.id),
            ))
            .await
            .unwrap();

        let book = erp
            .db()
            .catalog()
            .insert(&new_book("978-0134685991", "Effective Java", 4500))
            .await
            .unwrap();
        let other_book = erp
            .db()
            .catalog()
            .insert(&new_book("978-0201633610", "Design Patterns", 5000))
            .await
            .unwrap();

        Fixture {
            erp,
            admin: Actor::from(&admin),
            sales: Actor::from(&sales),
            portal: Actor::from(&portal),
            central,
            north,
            customer,
            book,
            other_book,
        }
    }

    pub async fn customer_with(&self, limit: i64, outstanding: i64) -> Customer {
        self.erp
            .db()
            .master()
            .insert_customer(
                &NewCustomer::new("Page Turners", self.customer.branch_id)
                    .credit_limit(limit)
                    .opening_balance(outstanding),
            )
            .await
            .unwrap()
    }

    pub async fn stock(&self, warehouse: &Warehouse, quantity: i64) {
        adjust_stock(
            &self.erp,
            &self.admin,
            AdjustStockRequest {
                book_title_id: self.book.id,
                warehouse_id: warehouse.id,
                delta: quantity,
                reason: Some("opening stock".to_string()),
            },
        )
        .await
        .unwrap();
    }

    /// A CONFIRMED order for `quantity` copies of the 45.00 title at 10% off.
    pub async fn confirmed_order(&self, quantity: i64) -> SalesOrder {
        let created = create_order(
            &self.erp,
            &self.admin,
            CreateOrderRequest {
                customer_id: self.customer.id,
                items: vec![line(self.book.id, quantity, Some(1000))],
            },
        )
        .await
        .unwrap();

        confirm_order(
            &self.erp,
            &self.admin,
            ConfirmOrderRequest {
                sales_order_id: created.order.order.id,
                approver_id: None,
            },
        )
        .await
        .unwrap()
    }

    pub async fn quantity(&self, warehouse: &Warehouse) -> i64 {
        self.erp
            .db()
            .inventory()
            .quantity(self.book.id, warehouse.id)
            .await
            .unwrap()
    }
}

fn user(
    name: &str,
    email: &str,
    role: Role,
    branch_id: Option<i64>,
    customer_id: Option<i64>,
) -> NewUser {
    NewUser {
        name: name.to_string(),
        email: email.to_string(),
        role,
        branch_id,
        customer_id,
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
