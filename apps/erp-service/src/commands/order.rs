//! # Order Commands
//!
//! ```text
//! create_order ──► PROFORMA ──approve_order──► PROFORMA (approved)
//!                     │                             │
//!                     └──────── confirm_order ◄─────┘
//!                                   │
//!                                   ▼
//!                               CONFIRMED ──generate_invoice──► INVOICED
//! ```

use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::{debug, info, warn};
use ts_rs::TS;

use crate::error::{ApiError, ApiResult};
use crate::Erp;
use quire_core::order::draft_proforma;
use quire_core::validation::{validate_order_lines, validate_order_total_cents};
use quire_core::views::{InvoiceView, OrderView};
use quire_core::{
    Actor, AuditAction, AuditEntity, Capability, CreditAssessment, Invoice, InvoiceType, Money,
    OrderLineRequest, Role, SalesOrder,
};

#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct CreateOrderRequest {
    pub customer_id: i64,
    pub items: Vec<OrderLineRequest>,
}

#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct CreateOrderResponse {
    pub order: OrderView,
    /// Credit evaluation the order was accepted under.
    pub credit: CreditAssessment,
}

#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct ConfirmOrderRequest {
    pub sales_order_id: i64,
    /// User approving the order at confirmation time.
    pub approver_id: Option<i64>,
}

#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct GenerateInvoiceRequest {
    pub sales_order_id: i64,
    pub invoice_type: InvoiceType,
    /// Warehouse the stock ships from.
    pub warehouse_id: i64,
}

/// Prices a new order, runs credit control, and stores it as PROFORMA.
pub async fn create_order(
    erp: &Erp,
    actor: &Actor,
    request: CreateOrderRequest,
) -> ApiResult<CreateOrderResponse> {
    debug!(customer_id = request.customer_id, lines = request.items.len(), "create_order command");

    actor.require(Capability::CreateOrder)?;
    actor.require_customer_scope(request.customer_id, Capability::CreateOrder)?;
    validate_order_lines(&request.items)?;

    let customer = erp
        .db()
        .master()
        .get_customer(request.customer_id)
        .await?
        .ok_or_else(|| ApiError::not_found("Customer", request.customer_id))?;

    let mut book_ids: Vec<i64> = request.items.iter().map(|l| l.book_title_id).collect();
    book_ids.sort_unstable();
    book_ids.dedup();
    let books = erp.db().catalog().get_many(&book_ids).await?;

    let config = erp.config();
    let draft = draft_proforma(
        actor,
        &customer,
        &books,
        &request.items,
        &config.credit_policy,
        &config.discount_policy,
    )?;

    let view = erp.db().sales_orders().insert_proforma(&draft).await?;

    info!(
        order_id = view.order.id,
        customer_id = customer.id,
        total = %draft.total,
        requires_approval = draft.requires_approval,
        credit = ?draft.credit.decision,
        "Proforma order created"
    );

    erp.audit()
        .record_with(
            actor.user_id,
            AuditAction::Create,
            AuditEntity::SalesOrder,
            view.order.id,
            json!({
                "customerId": customer.id,
                "totalCents": draft.total.cents(),
                "lines": draft.lines.len(),
                "requiresApproval": draft.requires_approval,
                "credit": draft.credit.decision,
            }),
        )
        .await;

    Ok(CreateOrderResponse {
        order: view,
        credit: draft.credit,
    })
}

/// Records the actor as approver of a PROFORMA order.
pub async fn approve_order(erp: &Erp, actor: &Actor, sales_order_id: i64) -> ApiResult<SalesOrder> {
    debug!(order_id = sales_order_id, "approve_order command");

    actor.require(Capability::ApproveOrder)?;

    let order = erp
        .db()
        .sales_orders()
        .approve(sales_order_id, actor.user_id)
        .await?;

    info!(order_id = order.id, approver = actor.user_id, "Order approved");
    erp.audit()
        .record_with(
            actor.user_id,
            AuditAction::Approve,
            AuditEntity::SalesOrder,
            order.id,
            json!({ "totalCents": order.total_cents }),
        )
        .await;

    Ok(order)
}

/// Moves a PROFORMA order to CONFIRMED.
///
/// An order that requires approval confirms only if it was approved earlier
/// or `approver_id` names a user whose role may approve orders. An approver
/// without that right is ignored, so the order stays unapproved and the
/// command fails with `APPROVAL_REQUIRED`.
pub async fn confirm_order(
    erp: &Erp,
    actor: &Actor,
    request: ConfirmOrderRequest,
) -> ApiResult<SalesOrder> {
    debug!(order_id = request.sales_order_id, approver = ?request.approver_id, "confirm_order command");

    actor.require(Capability::ConfirmOrder)?;

    let approver = match request.approver_id {
        Some(id) => privileged_approver(erp, id).await?,
        None => None,
    };

    let order = erp
        .db()
        .sales_orders()
        .confirm(request.sales_order_id, approver)
        .await?;

    info!(order_id = order.id, approved_by = ?order.approved_by, "Order confirmed");
    erp.audit()
        .record_with(
            actor.user_id,
            AuditAction::Confirm,
            AuditEntity::SalesOrder,
            order.id,
            json!({ "approvedBy": order.approved_by }),
        )
        .await;

    Ok(order)
}

async fn privileged_approver(erp: &Erp, user_id: i64) -> ApiResult<Option<i64>> {
    match erp.db().master().get_user(user_id).await? {
        Some(user) if user.role.allows(Capability::ApproveOrder) => Ok(Some(user.id)),
        Some(user) => {
            warn!(user_id, role = %user.role, "Approver lacks approval rights");
            Ok(None)
        }
        None => {
            warn!(user_id, "Approver does not exist");
            Ok(None)
        }
    }
}

/// Invoices a CONFIRMED order, shipping from one warehouse.
///
/// Stock deduction, the customer's balance, the invoice number and the
/// status change commit together or not at all.
pub async fn generate_invoice(
    erp: &Erp,
    actor: &Actor,
    request: GenerateInvoiceRequest,
) -> ApiResult<Invoice> {
    debug!(
        order_id = request.sales_order_id,
        invoice_type = %request.invoice_type,
        warehouse_id = request.warehouse_id,
        "generate_invoice command"
    );

    actor.require(Capability::GenerateInvoice)?;

    if erp
        .db()
        .master()
        .get_warehouse(request.warehouse_id)
        .await?
        .is_none()
    {
        return Err(ApiError::not_found("Warehouse", request.warehouse_id));
    }

    let config = erp.config();
    let invoice = erp
        .db()
        .invoices()
        .generate(
            request.sales_order_id,
            request.invoice_type,
            request.warehouse_id,
            &config.tax_table,
            &config.invoice_prefix,
        )
        .await?;

    info!(
        invoice_number = %invoice.invoice_number,
        order_id = invoice.sales_order_id,
        total = %invoice.total(),
        gst = %invoice.gst(),
        "Invoice generated"
    );

    erp.audit()
        .record_with(
            actor.user_id,
            AuditAction::Invoice,
            AuditEntity::Invoice,
            invoice.id,
            json!({
                "salesOrderId": invoice.sales_order_id,
                "invoiceNumber": invoice.invoice_number,
                "warehouseId": invoice.warehouse_id,
                "totalCents": invoice.total_cents,
            }),
        )
        .await;

    Ok(invoice)
}

/// Read-only credit check of a prospective order total.
pub async fn evaluate_credit(
    erp: &Erp,
    actor: &Actor,
    customer_id: i64,
    order_total_cents: i64,
) -> ApiResult<CreditAssessment> {
    actor.require(Capability::CreateOrder)?;
    actor.require_customer_scope(customer_id, Capability::CreateOrder)?;
    validate_order_total_cents(order_total_cents)?;

    let customer = erp
        .db()
        .master()
        .get_customer(customer_id)
        .await?
        .ok_or_else(|| ApiError::not_found("Customer", customer_id))?;

    let assessment = erp
        .config()
        .credit_policy
        .evaluate(&customer, Money::from_cents(order_total_cents))?;
    Ok(assessment)
}

/// One order with its lines. Customers only see their own orders.
pub async fn get_order(erp: &Erp, actor: &Actor, sales_order_id: i64) -> ApiResult<OrderView> {
    if actor.role != Role::Customer {
        actor.require(Capability::ViewReports)?;
    }

    let view = erp
        .db()
        .sales_orders()
        .get_view(sales_order_id)
        .await?
        .ok_or_else(|| ApiError::not_found("SalesOrder", sales_order_id))?;

    actor.require_customer_scope(view.order.customer_id, Capability::ViewReports)?;
    Ok(view)
}

/// An invoice with the order it billed.
pub async fn get_invoice(erp: &Erp, actor: &Actor, invoice_id: i64) -> ApiResult<InvoiceView> {
    actor.require(Capability::ViewReports)?;

    let invoice = erp
        .db()
        .invoices()
        .get(invoice_id)
        .await?
        .ok_or_else(|| ApiError::not_found("Invoice", invoice_id))?;

    let OrderView { order, items } = erp
        .db()
        .sales_orders()
        .get_view(invoice.sales_order_id)
        .await?
        .ok_or_else(|| ApiError::internal("Invoice refers to a missing order"))?;

    Ok(InvoiceView {
        invoice,
        order,
        items,
    })
}
