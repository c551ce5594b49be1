//! # Inventory Commands

use serde::{Deserialize, Serialize};
use serde_json::json;
use tokio_stream::StreamExt;
use tracing::{debug, info, warn};
use ts_rs::TS;

use crate::error::{ApiError, ApiResult};
use crate::Erp;
use quire_core::validation::{validate_stock_delta, validate_thresholds, validate_transfer};
use quire_core::views::{StockLevel, TransferResult};
use quire_core::{Actor, AuditAction, AuditEntity, Capability, InventoryRow};

#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct AdjustStockRequest {
    pub book_title_id: i64,
    pub warehouse_id: i64,
    /// Signed change: positive for receipts, negative for write-offs.
    pub delta: i64,
    pub reason: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct TransferStockRequest {
    pub book_title_id: i64,
    pub source_warehouse_id: i64,
    pub target_warehouse_id: i64,
    pub quantity: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct SetThresholdsRequest {
    pub book_title_id: i64,
    pub warehouse_id: i64,
    pub min_stock: i64,
    pub max_stock: i64,
}

/// Applies a manual stock correction to one warehouse.
pub async fn adjust_stock(
    erp: &Erp,
    actor: &Actor,
    request: AdjustStockRequest,
) -> ApiResult<InventoryRow> {
    debug!(
        book_title_id = request.book_title_id,
        warehouse_id = request.warehouse_id,
        delta = request.delta,
        "adjust_stock command"
    );

    actor.require(Capability::AdjustStock)?;
    validate_stock_delta(request.delta)?;
    ensure_book(erp, request.book_title_id).await?;
    ensure_warehouse(erp, request.warehouse_id).await?;

    let row = erp
        .db()
        .inventory()
        .adjust(request.book_title_id, request.warehouse_id, request.delta)
        .await?;

    erp.audit()
        .record_with(
            actor.user_id,
            AuditAction::Adjust,
            AuditEntity::Inventory,
            inventory_key(row.book_title_id, row.warehouse_id),
            json!({
                "delta": request.delta,
                "quantity": row.quantity,
                "reason": request.reason,
            }),
        )
        .await;

    Ok(row)
}

/// Moves stock of one title between two warehouses.
pub async fn transfer_stock(
    erp: &Erp,
    actor: &Actor,
    request: TransferStockRequest,
) -> ApiResult<TransferResult> {
    debug!(
        book_title_id = request.book_title_id,
        from = request.source_warehouse_id,
        to = request.target_warehouse_id,
        quantity = request.quantity,
        "transfer_stock command"
    );

    actor.require(Capability::TransferStock)?;
    validate_transfer(
        request.source_warehouse_id,
        request.target_warehouse_id,
        request.quantity,
    )?;
    ensure_book(erp, request.book_title_id).await?;
    ensure_warehouse(erp, request.source_warehouse_id).await?;
    ensure_warehouse(erp, request.target_warehouse_id).await?;

    let moved = erp
        .db()
        .inventory()
        .transfer(
            request.book_title_id,
            request.source_warehouse_id,
            request.target_warehouse_id,
            request.quantity,
        )
        .await?;

    erp.audit()
        .record_with(
            actor.user_id,
            AuditAction::Transfer,
            AuditEntity::Inventory,
            inventory_key(request.book_title_id, request.source_warehouse_id),
            json!({
                "targetWarehouseId": request.target_warehouse_id,
                "quantity": request.quantity,
                "sourceQuantity": moved.source.quantity,
                "targetQuantity": moved.target.quantity,
            }),
        )
        .await;

    Ok(moved)
}

pub async fn set_thresholds(
    erp: &Erp,
    actor: &Actor,
    request: SetThresholdsRequest,
) -> ApiResult<InventoryRow> {
    actor.require(Capability::AdjustStock)?;
    validate_thresholds(request.min_stock, request.max_stock)?;
    ensure_book(erp, request.book_title_id).await?;
    ensure_warehouse(erp, request.warehouse_id).await?;

    let row = erp
        .db()
        .inventory()
        .set_thresholds(
            request.book_title_id,
            request.warehouse_id,
            request.min_stock,
            request.max_stock,
        )
        .await?;

    info!(
        book_title_id = row.book_title_id,
        warehouse_id = row.warehouse_id,
        min = row.min_stock,
        max = row.max_stock,
        "Stock thresholds set"
    );
    Ok(row)
}

/// Stock per title and warehouse, optionally for one warehouse.
pub async fn stock_levels(
    erp: &Erp,
    actor: &Actor,
    warehouse_id: Option<i64>,
) -> ApiResult<Vec<StockLevel>> {
    actor.require(Capability::ViewReports)?;
    Ok(erp.db().inventory().stock_levels(warehouse_id).await?)
}

/// Rows at or below their minimum. Each one is also logged as a warning.
pub async fn low_stock_alerts(
    erp: &Erp,
    actor: &Actor,
    warehouse_id: Option<i64>,
) -> ApiResult<Vec<StockLevel>> {
    actor.require(Capability::ViewReports)?;

    let inventory = erp.db().inventory();
    let mut rows = inventory.low_stock(warehouse_id);

    let mut alerts = Vec::new();
    while let Some(level) = rows.next().await {
        let level = level?;
        warn!(
            isbn = %level.isbn,
            warehouse = %level.warehouse_name,
            quantity = level.quantity,
            min_stock = level.min_stock,
            shortfall = level.shortfall(),
            "Low stock"
        );
        alerts.push(level);
    }

    Ok(alerts)
}

async fn ensure_book(erp: &Erp, book_title_id: i64) -> ApiResult<()> {
    if erp.db().catalog().exists(book_title_id).await? {
        Ok(())
    } else {
        Err(ApiError::not_found("BookTitle", book_title_id))
    }
}

async fn ensure_warehouse(erp: &Erp, warehouse_id: i64) -> ApiResult<()> {
    match erp.db().master().get_warehouse(warehouse_id).await? {
        Some(_) => Ok(()),
        None => Err(ApiError::not_found("Warehouse", warehouse_id)),
    }
}

/// Audit key of an inventory row.
fn inventory_key(book_title_id: i64, warehouse_id: i64) -> String {
    format!("{book_title_id}:{warehouse_id}")
}
