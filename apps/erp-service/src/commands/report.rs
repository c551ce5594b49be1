//! # Report Commands
//!
//! Read-only JSON views. All require `ViewReports`, except that a customer
//! portal user may read its own statement.

use chrono::NaiveDate;

use crate::error::{ApiError, ApiResult};
use crate::Erp;
use quire_core::views::{CustomerStatement, Daybook, OrderSummary, OutstandingReport};
use quire_core::{Actor, AuditEntity, AuditEntry, Capability, OrderStatus, Role};

const DEFAULT_LIMIT: i64 = 50;
const MAX_LIMIT: i64 = 500;

fn clamp_limit(limit: Option<i64>) -> i64 {
    limit.unwrap_or(DEFAULT_LIMIT).clamp(1, MAX_LIMIT)
}

/// Receivables per customer, optionally for one branch.
pub async fn outstanding_report(
    erp: &Erp,
    actor: &Actor,
    branch_id: Option<i64>,
) -> ApiResult<OutstandingReport> {
    actor.require(Capability::ViewReports)?;
    Ok(erp.db().reports().outstanding(branch_id).await?)
}

/// Invoices raised on one UTC day.
pub async fn daybook(erp: &Erp, actor: &Actor, date: NaiveDate) -> ApiResult<Daybook> {
    actor.require(Capability::ViewReports)?;
    Ok(erp.db().reports().daybook(date).await?)
}

/// Orders in one status (or all), newest first. The approval queue is
/// `pending_orders(.., Some(OrderStatus::Proforma), ..)`.
pub async fn pending_orders(
    erp: &Erp,
    actor: &Actor,
    status: Option<OrderStatus>,
    limit: Option<i64>,
) -> ApiResult<Vec<OrderSummary>> {
    actor.require(Capability::ViewReports)?;
    Ok(erp
        .db()
        .sales_orders()
        .list(status, clamp_limit(limit))
        .await?)
}

pub async fn customer_statement(
    erp: &Erp,
    actor: &Actor,
    customer_id: i64,
    limit: Option<i64>,
) -> ApiResult<CustomerStatement> {
    if actor.role != Role::Customer {
        actor.require(Capability::ViewReports)?;
    }
    actor.require_customer_scope(customer_id, Capability::ViewReports)?;

    erp.db()
        .reports()
        .customer_statement(customer_id, clamp_limit(limit))
        .await?
        .ok_or_else(|| ApiError::not_found("Customer", customer_id))
}

/// Every audit entry for one entity, oldest first.
pub async fn audit_history(
    erp: &Erp,
    actor: &Actor,
    entity: AuditEntity,
    entity_id: &str,
) -> ApiResult<Vec<AuditEntry>> {
    actor.require(Capability::ViewReports)?;
    Ok(erp.db().audit().history(entity, entity_id).await?)
}

pub async fn recent_activity(
    erp: &Erp,
    actor: &Actor,
    limit: Option<i64>,
) -> ApiResult<Vec<AuditEntry>> {
    actor.require(Capability::ViewReports)?;
    Ok(erp.db().audit().recent(clamp_limit(limit)).await?)
}
