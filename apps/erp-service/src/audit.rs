//! # Audit Trail
//!
//! Best-effort recording of who did what. An append that fails is logged on
//! the `quire::audit` target and otherwise ignored: the operation being
//! audited has already committed and its result stands.

use quire_core::{AuditAction, AuditEntity, NewAuditEntry};
use quire_db::AuditRepository;
use tracing::{debug, warn};

#[derive(Debug, Clone)]
pub struct AuditTrail {
    repo: AuditRepository,
}

impl AuditTrail {
    pub fn new(repo: AuditRepository) -> Self {
        AuditTrail { repo }
    }

    /// Appends one entry. Never fails.
    pub async fn record(&self, entry: NewAuditEntry) {
        match self.repo.append(&entry).await {
            Ok(id) => debug!(
                audit_id = id,
                action = entry.action.as_str(),
                entity = entry.entity.as_str(),
                entity_id = %entry.entity_id,
                "Audit entry recorded"
            ),
            Err(e) => warn!(
                target: "quire::audit",
                error = %e,
                user_id = entry.user_id,
                action = entry.action.as_str(),
                entity = entry.entity.as_str(),
                entity_id = %entry.entity_id,
                "Failed to record audit entry"
            ),
        }
    }

    /// Shorthand for an entry with JSON details.
    pub async fn record_with(
        &self,
        user_id: i64,
        action: AuditAction,
        entity: AuditEntity,
        entity_id: impl ToString,
        details: serde_json::Value,
    ) {
        self.record(NewAuditEntry::new(user_id, action, entity, entity_id).with_details(details))
            .await
    }
}
