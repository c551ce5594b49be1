//! # Catalog Commands

use serde_json::json;
use tracing::{debug, info};

use crate::error::{ApiError, ApiResult};
use crate::Erp;
use quire_core::validation::{validate_isbn, validate_price_cents, validate_title};
use quire_core::{Actor, AuditAction, AuditEntity, BookTitle, Capability, NewBookTitle};

const DEFAULT_LIST_LIMIT: i64 = 100;
const MAX_LIST_LIMIT: i64 = 1_000;

/// Adds a title to the catalog. A duplicate ISBN is a validation error.
pub async fn create_book(erp: &Erp, actor: &Actor, book: NewBookTitle) -> ApiResult<BookTitle> {
    debug!(isbn = %book.isbn, "create_book command");

    actor.require(Capability::ManageCatalog)?;
    validate_isbn(&book.isbn)?;
    validate_title(&book.title)?;
    validate_price_cents(book.price_cents)?;

    let created = erp.db().catalog().insert(&book).await?;

    info!(book_id = created.id, isbn = %created.isbn, "Book title created");
    erp.audit()
        .record_with(
            actor.user_id,
            AuditAction::Create,
            AuditEntity::BookTitle,
            created.id,
            json!({ "isbn": created.isbn, "priceCents": created.price_cents }),
        )
        .await;

    Ok(created)
}

pub async fn get_book(erp: &Erp, book_title_id: i64) -> ApiResult<BookTitle> {
    erp.db()
        .catalog()
        .get_by_id(book_title_id)
        .await?
        .ok_or_else(|| ApiError::not_found("BookTitle", book_title_id))
}

pub async fn get_book_by_isbn(erp: &Erp, isbn: &str) -> ApiResult<BookTitle> {
    erp.db()
        .catalog()
        .get_by_isbn(isbn.trim())
        .await?
        .ok_or_else(|| ApiError::not_found("BookTitle", isbn))
}

pub async fn list_books(erp: &Erp, limit: Option<i64>) -> ApiResult<Vec<BookTitle>> {
    let limit = limit.unwrap_or(DEFAULT_LIST_LIMIT).clamp(1, MAX_LIST_LIMIT);
    Ok(erp.db().catalog().list(limit).await?)
}
