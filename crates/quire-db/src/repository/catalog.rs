//! # Catalog Repository
//!
//! Book titles. Entries are immutable once created and never deleted.

use chrono::Utc;
use sqlx::{QueryBuilder, Sqlite, SqlitePool};
use tracing::debug;

use crate::error::{DbError, DbResult};
use quire_core::{BookTitle, CoreError, NewBookTitle, ValidationError};

const BOOK_COLUMNS: &str = "id, isbn, title, author, publisher, price_cents, created_at";

/// Repository for catalog entries.
#[derive(Debug, Clone)]
pub struct CatalogRepository {
    pool: SqlitePool,
}

impl CatalogRepository {
    pub fn new(pool: SqlitePool) -> Self {
        CatalogRepository { pool }
    }

    /// Inserts a validated title. A duplicate ISBN is a validation failure.
    pub async fn insert(&self, book: &NewBookTitle) -> DbResult<BookTitle> {
        let isbn = book.isbn.trim();
        debug!(isbn = %isbn, "Inserting book title");

        let sql = format!(
            r#"
            INSERT INTO book_titles (isbn, title, author, publisher, price_cents, created_at)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6)
            RETURNING {BOOK_COLUMNS}
            "#
        );

        let inserted = sqlx::query_as::<_, BookTitle>(&sql)
            .bind(isbn)
            .bind(book.title.trim())
            .bind(&book.author)
            .bind(&book.publisher)
            .bind(book.price_cents)
            .bind(Utc::now())
            .fetch_one(&self.pool)
            .await
            .map_err(|e| match DbError::from(e) {
                DbError::UniqueViolation { .. } => DbError::Domain(CoreError::Validation(
                    ValidationError::Duplicate {
                        field: "isbn".to_string(),
                        value: isbn.to_string(),
                    },
                )),
                other => other,
            })?;

        Ok(inserted)
    }

    pub async fn get_by_id(&self, id: i64) -> DbResult<Option<BookTitle>> {
        let sql = format!("SELECT {BOOK_COLUMNS} FROM book_titles WHERE id = ?1");

        let book = sqlx::query_as::<_, BookTitle>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(book)
    }

    pub async fn get_by_isbn(&self, isbn: &str) -> DbResult<Option<BookTitle>> {
        let sql = format!("SELECT {BOOK_COLUMNS} FROM book_titles WHERE isbn = ?1");

        let book = sqlx::query_as::<_, BookTitle>(&sql)
            .bind(isbn.trim())
            .fetch_optional(&self.pool)
            .await?;

        Ok(book)
    }

    /// Loads every title whose id is in `ids`. Unknown ids are skipped.
    pub async fn get_many(&self, ids: &[i64]) -> DbResult<Vec<BookTitle>> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }

        let mut qb: QueryBuilder<Sqlite> =
            QueryBuilder::new(format!("SELECT {BOOK_COLUMNS} FROM book_titles WHERE id IN ("));
        let mut separated = qb.separated(", ");
        for id in ids {
            separated.push_bind(*id);
        }
        separated.push_unseparated(")");

        let books = qb
            .build_query_as::<BookTitle>()
            .fetch_all(&self.pool)
            .await?;

        Ok(books)
    }

    /// Lists titles by title, at most `limit`.
    pub async fn list(&self, limit: i64) -> DbResult<Vec<BookTitle>> {
        let sql = format!("SELECT {BOOK_COLUMNS} FROM book_titles ORDER BY title LIMIT ?1");

        let books = sqlx::query_as::<_, BookTitle>(&sql)
            .bind(limit)
            .fetch_all(&self.pool)
            .await?;

        Ok(books)
    }

    pub async fn exists(&self, id: i64) -> DbResult<bool> {
        let found: Option<i64> = sqlx::query_scalar("SELECT id FROM book_titles WHERE id = ?1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(found.is_some())
    }
}
