//! # Audit Repository
//!
//! Append-only audit log. There is no update or delete here.

use chrono::Utc;
use sqlx::SqlitePool;

use crate::error::DbResult;
use quire_core::{AuditEntity, AuditEntry, NewAuditEntry};

const AUDIT_COLUMNS: &str = "id, user_id, action, entity, entity_id, details, created_at";

/// Repository for audit records.
#[derive(Debug, Clone)]
pub struct AuditRepository {
    pool: SqlitePool,
}

impl AuditRepository {
    pub fn new(pool: SqlitePool) -> Self {
        AuditRepository { pool }
    }

    /// Appends one record and returns its id.
    pub async fn append(&self, entry: &NewAuditEntry) -> DbResult<i64> {
        let details = entry.details.as_ref().map(|d| d.to_string());

        let id: i64 = sqlx::query_scalar(
            r#"
            INSERT INTO audit_log (user_id, action, entity, entity_id, details, created_at)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6)
            RETURNING id
            "#,
        )
        .bind(entry.user_id)
        .bind(entry.action)
        .bind(entry.entity)
        .bind(&entry.entity_id)
        .bind(details)
        .bind(Utc::now())
        .fetch_one(&self.pool)
        .await?;

        Ok(id)
    }

    /// Every record for one entity, oldest first.
    pub async fn history(&self, entity: AuditEntity, entity_id: &str) -> DbResult<Vec<AuditEntry>> {
        let sql = format!(
            "SELECT {AUDIT_COLUMNS} FROM audit_log WHERE entity = ?1 AND entity_id = ?2 ORDER BY id"
        );

        let entries = sqlx::query_as::<_, AuditEntry>(&sql)
            .bind(entity)
            .bind(entity_id)
            .fetch_all(&self.pool)
            .await?;

        Ok(entries)
    }

    /// Most recent records across all entities.
    pub async fn recent(&self, limit: i64) -> DbResult<Vec<AuditEntry>> {
        let sql = format!("SELECT {AUDIT_COLUMNS} FROM audit_log ORDER BY id DESC LIMIT ?1");

        let entries = sqlx::query_as::<_, AuditEntry>(&sql)
            .bind(limit)
            .fetch_all(&self.pool)
            .await?;

        Ok(entries)
    }
}
