//! # Master Data Repository
//!
//! Branches, warehouses, customers and users. The order workflow only reads
//! these; the inserts exist for the seed binary, administration tooling and
//! tests.

use sqlx::SqlitePool;
use tracing::debug;

use crate::error::DbResult;
use crate::repository::CUSTOMER_COLUMNS;
use quire_core::{Branch, Customer, Role, User, Warehouse};

/// Input for a new customer account.
#[derive(Debug, Clone)]
pub struct NewCustomer {
    pub name: String,
    pub gst_number: Option<String>,
    pub branch_id: i64,
    pub credit_limit_cents: i64,
    /// Balance carried over from a previous system.
    pub opening_balance_cents: i64,
    pub discount_bps: i64,
}

impl NewCustomer {
    pub fn new(name: impl Into<String>, branch_id: i64) -> Self {
        NewCustomer {
            name: name.into(),
            gst_number: None,
            branch_id,
            credit_limit_cents: 0,
            opening_balance_cents: 0,
            discount_bps: 0,
        }
    }

    pub fn credit_limit(mut self, cents: i64) -> Self {
        self.credit_limit_cents = cents;
        self
    }

    pub fn opening_balance(mut self, cents: i64) -> Self {
        self.opening_balance_cents = cents;
        self
    }

    pub fn discount(mut self, bps: i64) -> Self {
        self.discount_bps = bps;
        self
    }
}

/// Input for a new user.
#[derive(Debug, Clone)]
pub struct NewUser {
    pub name: String,
    pub email: String,
    pub role: Role,
    pub branch_id: Option<i64>,
    pub customer_id: Option<i64>,
}

/// Repository for reference data.
#[derive(Debug, Clone)]
pub struct MasterDataRepository {
    pool: SqlitePool,
}

impl MasterDataRepository {
    pub fn new(pool: SqlitePool) -> Self {
        MasterDataRepository { pool }
    }

    // =========================================================================
    // Branches & Warehouses
    // =========================================================================

    pub async fn insert_branch(
        &self,
        name: &str,
        address: Option<&str>,
        is_head_office: bool,
    ) -> DbResult<Branch> {
        debug!(name = %name, "Inserting branch");

        let branch = sqlx::query_as::<_, Branch>(
            r#"
            INSERT INTO branches (name, address, is_head_office)
            VALUES (?1, ?2, ?3)
            RETURNING id, name, address, is_head_office
            "#,
        )
        .bind(name)
        .bind(address)
        .bind(is_head_office)
        .fetch_one(&self.pool)
        .await?;

        Ok(branch)
    }

    pub async fn get_branch(&self, id: i64) -> DbResult<Option<Branch>> {
        let branch = sqlx::query_as::<_, Branch>(
            "SELECT id, name, address, is_head_office FROM branches WHERE id = ?1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(branch)
    }

    pub async fn insert_warehouse(&self, name: &str, branch_id: i64) -> DbResult<Warehouse> {
        debug!(name = %name, branch_id = branch_id, "Inserting warehouse");

        let warehouse = sqlx::query_as::<_, Warehouse>(
            r#"
            INSERT INTO warehouses (name, branch_id)
            VALUES (?1, ?2)
            RETURNING id, name, branch_id
            "#,
        )
        .bind(name)
        .bind(branch_id)
        .fetch_one(&self.pool)
        .await?;

        Ok(warehouse)
    }

    pub async fn get_warehouse(&self, id: i64) -> DbResult<Option<Warehouse>> {
        let warehouse = sqlx::query_as::<_, Warehouse>(
            "SELECT id, name, branch_id FROM warehouses WHERE id = ?1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(warehouse)
    }

    /// Lists warehouses, optionally for one branch.
    pub async fn list_warehouses(&self, branch_id: Option<i64>) -> DbResult<Vec<Warehouse>> {
        let warehouses = sqlx::query_as::<_, Warehouse>(
            r#"
            SELECT id, name, branch_id FROM warehouses
            WHERE ?1 IS NULL OR branch_id = ?1
            ORDER BY id
            "#,
        )
        .bind(branch_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(warehouses)
    }

    // =========================================================================
    // Customers
    // =========================================================================

    pub async fn insert_customer(&self, customer: &NewCustomer) -> DbResult<Customer> {
        debug!(name = %customer.name, branch_id = customer.branch_id, "Inserting customer");

        let sql = format!(
            r#"
            INSERT INTO customers (
                name, gst_number, branch_id, credit_limit_cents, outstanding_cents, discount_bps
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6)
            RETURNING {CUSTOMER_COLUMNS}
            "#
        );

        let inserted = sqlx::query_as::<_, Customer>(&sql)
            .bind(&customer.name)
            .bind(&customer.gst_number)
            .bind(customer.branch_id)
            .bind(customer.credit_limit_cents)
            .bind(customer.opening_balance_cents)
            .bind(customer.discount_bps)
            .fetch_one(&self.pool)
            .await?;

        Ok(inserted)
    }

    pub async fn get_customer(&self, id: i64) -> DbResult<Option<Customer>> {
        let sql = format!("SELECT {CUSTOMER_COLUMNS} FROM customers WHERE id = ?1");

        let customer = sqlx::query_as::<_, Customer>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(customer)
    }

    // =========================================================================
    // Users
    // =========================================================================

    pub async fn insert_user(&self, user: &NewUser) -> DbResult<User> {
        debug!(email = %user.email, role = %user.role, "Inserting user");

        let inserted = sqlx::query_as::<_, User>(
            r#"
            INSERT INTO users (name, email, role, branch_id, customer_id)
            VALUES (?1, ?2, ?3, ?4, ?5)
            RETURNING id, name, email, role, branch_id, customer_id
            "#,
        )
        .bind(&user.name)
        .bind(&user.email)
        .bind(user.role)
        .bind(user.branch_id)
        .bind(user.customer_id)
        .fetch_one(&self.pool)
        .await?;

        Ok(inserted)
    }

    pub async fn get_user(&self, id: i64) -> DbResult<Option<User>> {
        let user = sqlx::query_as::<_, User>(
            "SELECT id, name, email, role, branch_id, customer_id FROM users WHERE id = ?1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(user)
    }
}
