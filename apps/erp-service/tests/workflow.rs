//! Order-to-invoice workflow through the command layer.

mod common;

use common::{line, new_book, Fixture};
use quire_core::{
    AuditAction, AuditEntity, CreditDecision, InvoiceType, OrderStatus, MAX_ORDER_TOTAL_CENTS,
    MAX_PRICE_CENTS, MAX_STOCK_DELTA,
};
use quire_service::commands::catalog::create_book;
use quire_service::commands::inventory::{
    adjust_stock, low_stock_alerts, set_thresholds, stock_levels, transfer_stock,
    AdjustStockRequest, SetThresholdsRequest, TransferStockRequest,
};
use quire_service::commands::order::{
    approve_order, confirm_order, create_order, evaluate_credit, generate_invoice, get_invoice,
    get_order, ConfirmOrderRequest, CreateOrderRequest, GenerateInvoiceRequest,
};
use quire_service::commands::report::{audit_history, customer_statement, pending_orders};
use quire_service::config::ErpConfig;
use quire_service::ErrorCode;

fn invoice_request(f: &Fixture, order_id: i64) -> GenerateInvoiceRequest {
    GenerateInvoiceRequest {
        sales_order_id: order_id,
        invoice_type: InvoiceType::Cash,
        warehouse_id: f.central.id,
    }
}

#[tokio::test]
async fn test_end_to_end_order_to_invoice() {
    let f = Fixture::new().await;
    f.stock(&f.central, 5).await;

    let created = create_order(
        &f.erp,
        &f.admin,
        CreateOrderRequest {
            customer_id: f.customer.id,
            items: vec![line(f.book.id, 3, Some(1000))],
        },
    )
    .await
    .unwrap();
    let order_id = created.order.order.id;
    assert_eq!(created.order.order.total_cents, 12150);
    assert_eq!(created.order.order.status, OrderStatus::Proforma);
    assert_eq!(created.credit.decision, CreditDecision::Accept);

    let confirmed = confirm_order(
        &f.erp,
        &f.admin,
        ConfirmOrderRequest {
            sales_order_id: order_id,
            approver_id: None,
        },
    )
    .await
    .unwrap();
    assert_eq!(confirmed.status, OrderStatus::Confirmed);

    let invoice = generate_invoice(&f.erp, &f.admin, invoice_request(&f, order_id))
        .await
        .unwrap();
    assert_eq!(invoice.invoice_number, "INV-000001");
    assert_eq!(invoice.subtotal_cents, 12150);
    assert_eq!(invoice.gst_cents, 608);
    assert_eq!(invoice.total_cents, 12758);

    assert_eq!(f.quantity(&f.central).await, 2);

    let statement = customer_statement(&f.erp, &f.admin, f.customer.id, None)
        .await
        .unwrap();
    assert_eq!(statement.customer.outstanding_cents, 12758);
    assert_eq!(statement.recent_invoices.len(), 1);

    let order = get_order(&f.erp, &f.admin, order_id).await.unwrap();
    assert_eq!(order.order.status, OrderStatus::Invoiced);

    let view = get_invoice(&f.erp, &f.admin, invoice.id).await.unwrap();
    assert_eq!(view.order.id, order_id);
    assert_eq!(view.items.len(), 1);
}

#[tokio::test]
async fn test_credit_gate() {
    let f = Fixture::new().await;
    // limit 1000.00, outstanding 900.00
    let tight = f.customer_with(100_000, 90_000).await;

    let small = evaluate_credit(&f.erp, &f.admin, tight.id, 5_000).await.unwrap();
    assert_eq!(small.decision, CreditDecision::Accept);

    let large = evaluate_credit(&f.erp, &f.admin, tight.id, 20_000).await.unwrap();
    assert_eq!(large.decision, CreditDecision::AcceptWithApproval);
    assert_eq!(large.available_cents, -10_000);

    // 4 × 50.00 = 200.00
    let created = create_order(
        &f.erp,
        &f.admin,
        CreateOrderRequest {
            customer_id: tight.id,
            items: vec![line(f.other_book.id, 4, Some(0))],
        },
    )
    .await
    .unwrap();
    assert!(created.order.order.requires_approval);
    assert_eq!(created.credit.decision, CreditDecision::AcceptWithApproval);
    let order_id = created.order.order.id;

    let confirm = |approver_id| ConfirmOrderRequest {
        sales_order_id: order_id,
        approver_id,
    };

    let err = confirm_order(&f.erp, &f.admin, confirm(None)).await.unwrap_err();
    assert_eq!(err.code, ErrorCode::ApprovalRequired);

    // A SALES user cannot approve, so naming one changes nothing.
    let err = confirm_order(&f.erp, &f.admin, confirm(Some(f.sales.user_id)))
        .await
        .unwrap_err();
    assert_eq!(err.code, ErrorCode::ApprovalRequired);

    let confirmed = confirm_order(&f.erp, &f.sales, confirm(Some(f.admin.user_id)))
        .await
        .unwrap();
    assert_eq!(confirmed.status, OrderStatus::Confirmed);
    assert_eq!(confirmed.approved_by, Some(f.admin.user_id));
}

#[tokio::test]
async fn test_approval_queue_then_confirm() {
    let f = Fixture::new().await;
    let tight = f.customer_with(100_000, 90_000).await;

    let created = create_order(
        &f.erp,
        &f.sales,
        CreateOrderRequest {
            customer_id: tight.id,
            items: vec![line(f.other_book.id, 4, None)],
        },
    )
    .await
    .unwrap();
    let order_id = created.order.order.id;

    let queue = pending_orders(&f.erp, &f.admin, Some(OrderStatus::Proforma), None)
        .await
        .unwrap();
    assert_eq!(queue.len(), 1);
    assert!(queue[0].requires_approval);

    let err = approve_order(&f.erp, &f.sales, order_id).await.unwrap_err();
    assert_eq!(err.code, ErrorCode::PermissionDenied);

    approve_order(&f.erp, &f.admin, order_id).await.unwrap();
    let confirmed = confirm_order(
        &f.erp,
        &f.sales,
        ConfirmOrderRequest {
            sales_order_id: order_id,
            approver_id: None,
        },
    )
    .await
    .unwrap();
    assert_eq!(confirmed.approved_by, Some(f.admin.user_id));
}

#[tokio::test]
async fn test_insufficient_stock_changes_nothing() {
    let f = Fixture::new().await;
    f.stock(&f.central, 1).await;
    let order = f.confirmed_order(3).await;

    let err = generate_invoice(&f.erp, &f.admin, invoice_request(&f, order.id))
        .await
        .unwrap_err();
    assert_eq!(err.code, ErrorCode::InsufficientStock);

    assert_eq!(f.quantity(&f.central).await, 1);
    let order = get_order(&f.erp, &f.admin, order.id).await.unwrap();
    assert_eq!(order.order.status, OrderStatus::Confirmed);

    let statement = customer_statement(&f.erp, &f.admin, f.customer.id, None)
        .await
        .unwrap();
    assert_eq!(statement.customer.outstanding_cents, 0);
}

#[tokio::test]
async fn test_second_invoice_is_already_invoiced() {
    let f = Fixture::new().await;
    f.stock(&f.central, 10).await;
    let order = f.confirmed_order(2).await;

    generate_invoice(&f.erp, &f.admin, invoice_request(&f, order.id))
        .await
        .unwrap();
    let err = generate_invoice(&f.erp, &f.admin, invoice_request(&f, order.id))
        .await
        .unwrap_err();

    assert_eq!(err.code, ErrorCode::AlreadyInvoiced);
    assert_eq!(f.quantity(&f.central).await, 8);
}

#[tokio::test]
async fn test_invoice_errors() {
    let f = Fixture::new().await;
    f.stock(&f.central, 10).await;

    let proforma = create_order(
        &f.erp,
        &f.admin,
        CreateOrderRequest {
            customer_id: f.customer.id,
            items: vec![line(f.book.id, 1, None)],
        },
    )
    .await
    .unwrap();

    let err = generate_invoice(&f.erp, &f.admin, invoice_request(&f, proforma.order.order.id))
        .await
        .unwrap_err();
    assert_eq!(err.code, ErrorCode::InvalidTransition);

    let err = generate_invoice(
        &f.erp,
        &f.admin,
        GenerateInvoiceRequest {
            sales_order_id: proforma.order.order.id,
            invoice_type: InvoiceType::Cash,
            warehouse_id: 9_999,
        },
    )
    .await
    .unwrap_err();
    assert_eq!(err.code, ErrorCode::NotFound);

    let err = generate_invoice(&f.erp, &f.sales, invoice_request(&f, proforma.order.order.id))
        .await
        .unwrap_err();
    assert_eq!(err.code, ErrorCode::PermissionDenied);
}

#[tokio::test]
async fn test_create_order_rejections() {
    let f = Fixture::new().await;
    let other = f.customer_with(100_000, 0).await;

    let request = |customer_id, items| CreateOrderRequest { customer_id, items };

    let err = create_order(&f.erp, &f.admin, request(f.customer.id, vec![]))
        .await
        .unwrap_err();
    assert_eq!(err.code, ErrorCode::ValidationError);

    let err = create_order(&f.erp, &f.admin, request(f.customer.id, vec![line(f.book.id, 0, None)]))
        .await
        .unwrap_err();
    assert_eq!(err.code, ErrorCode::ValidationError);

    let err = create_order(&f.erp, &f.admin, request(9_999, vec![line(f.book.id, 1, None)]))
        .await
        .unwrap_err();
    assert_eq!(err.code, ErrorCode::NotFound);

    let err = create_order(&f.erp, &f.admin, request(f.customer.id, vec![line(9_999, 1, None)]))
        .await
        .unwrap_err();
    assert_eq!(err.code, ErrorCode::NotFound);

    // Portal users order only for their own account.
    let err = create_order(&f.erp, &f.portal, request(other.id, vec![line(f.book.id, 1, None)]))
        .await
        .unwrap_err();
    assert_eq!(err.code, ErrorCode::PermissionDenied);

    let own = create_order(&f.erp, &f.portal, request(f.customer.id, vec![line(f.book.id, 1, None)]))
        .await
        .unwrap();
    assert!(!own.order.order.requires_approval);

    // Any discount above the portal cap of zero needs approval.
    let discounted = create_order(
        &f.erp,
        &f.portal,
        request(f.customer.id, vec![line(f.book.id, 1, Some(500))]),
    )
    .await
    .unwrap();
    assert!(discounted.order.order.requires_approval);
}

#[tokio::test]
async fn test_unset_limit_rejected_when_configured() {
    let config = ErpConfig::from_lookup(|key| match key {
        "QUIRE_DATABASE_PATH" => Some(":memory:".to_string()),
        "QUIRE_UNSET_CREDIT_LIMIT" => Some("reject".to_string()),
        "QUIRE_INVOICE_PREFIX" => Some("BLR".to_string()),
        _ => None,
    })
    .unwrap();
    let f = Fixture::with_config(config).await;
    let no_limit = f.customer_with(0, 0).await;

    let err = create_order(
        &f.erp,
        &f.admin,
        CreateOrderRequest {
            customer_id: no_limit.id,
            items: vec![line(f.book.id, 1, None)],
        },
    )
    .await
    .unwrap_err();
    assert_eq!(err.code, ErrorCode::CreditRejected);

    f.stock(&f.central, 1).await;
    let order = f.confirmed_order(1).await;
    let invoice = generate_invoice(&f.erp, &f.admin, invoice_request(&f, order.id))
        .await
        .unwrap();
    assert_eq!(invoice.invoice_number, "BLR-000001");
}

#[tokio::test]
async fn test_transfer_and_stock_views() {
    let f = Fixture::new().await;
    f.stock(&f.central, 10).await;

    let transfer = |from, to, quantity| TransferStockRequest {
        book_title_id: f.book.id,
        source_warehouse_id: from,
        target_warehouse_id: to,
        quantity,
    };

    let moved = transfer_stock(&f.erp, &f.admin, transfer(f.central.id, f.north.id, 4))
        .await
        .unwrap();
    assert_eq!(moved.source.quantity, 6);
    assert_eq!(moved.target.quantity, 4);

    let err = transfer_stock(&f.erp, &f.admin, transfer(f.central.id, f.north.id, 7))
        .await
        .unwrap_err();
    assert_eq!(err.code, ErrorCode::InsufficientStock);

    let err = transfer_stock(&f.erp, &f.admin, transfer(f.central.id, f.central.id, 1))
        .await
        .unwrap_err();
    assert_eq!(err.code, ErrorCode::ValidationError);

    let err = transfer_stock(&f.erp, &f.admin, transfer(f.central.id, 9_999, 1))
        .await
        .unwrap_err();
    assert_eq!(err.code, ErrorCode::NotFound);

    let err = transfer_stock(&f.erp, &f.sales, transfer(f.central.id, f.north.id, 1))
        .await
        .unwrap_err();
    assert_eq!(err.code, ErrorCode::PermissionDenied);

    let levels = stock_levels(&f.erp, &f.admin, None).await.unwrap();
    assert_eq!(levels.iter().map(|l| l.quantity).sum::<i64>(), 10);

    set_thresholds(
        &f.erp,
        &f.admin,
        SetThresholdsRequest {
            book_title_id: f.book.id,
            warehouse_id: f.north.id,
            min_stock: 10,
            max_stock: 100,
        },
    )
    .await
    .unwrap();

    let alerts = low_stock_alerts(&f.erp, &f.admin, None).await.unwrap();
    assert_eq!(alerts.len(), 1);
    assert_eq!(alerts[0].warehouse_id, f.north.id);
    assert_eq!(alerts[0].shortfall(), 6);

    let history = audit_history(
        &f.erp,
        &f.admin,
        AuditEntity::Inventory,
        &format!("{}:{}", f.book.id, f.central.id),
    )
    .await
    .unwrap();
    let actions: Vec<AuditAction> = history.iter().map(|e| e.action).collect();
    assert_eq!(actions, vec![AuditAction::Adjust, AuditAction::Transfer]);
}

#[tokio::test]
async fn test_workflow_is_audited() {
    let f = Fixture::new().await;
    f.stock(&f.central, 5).await;
    let order = f.confirmed_order(1).await;
    let invoice = generate_invoice(&f.erp, &f.admin, invoice_request(&f, order.id))
        .await
        .unwrap();

    let order_history = audit_history(&f.erp, &f.admin, AuditEntity::SalesOrder, &order.id.to_string())
        .await
        .unwrap();
    let actions: Vec<AuditAction> = order_history.iter().map(|e| e.action).collect();
    assert_eq!(actions, vec![AuditAction::Create, AuditAction::Confirm]);
    assert!(order_history.iter().all(|e| e.user_id == f.admin.user_id));

    let invoice_history = audit_history(&f.erp, &f.admin, AuditEntity::Invoice, &invoice.id.to_string())
        .await
        .unwrap();
    assert_eq!(invoice_history.len(), 1);
    let details: serde_json::Value =
        serde_json::from_str(invoice_history[0].details.as_deref().unwrap()).unwrap();
    assert_eq!(details["invoiceNumber"], "INV-000001");
}

#[tokio::test]
async fn test_audit_failure_does_not_fail_the_operation() {
    let f = Fixture::new().await;
    f.stock(&f.central, 5).await;

    sqlx::query("DROP TABLE audit_log")
        .execute(f.erp.db().pool())
        .await
        .unwrap();

    let order = f.confirmed_order(2).await;
    let invoice = generate_invoice(&f.erp, &f.admin, invoice_request(&f, order.id))
        .await
        .unwrap();

    assert_eq!(invoice.invoice_seq, 1);
    assert_eq!(f.quantity(&f.central).await, 3);
}

#[tokio::test]
async fn test_catalog() {
    let f = Fixture::new().await;

    let book = create_book(&f.erp, &f.admin, new_book("978-0132350884", "Clean Code", 4000))
        .await
        .unwrap();
    assert_eq!(book.price_cents, 4000);

    let dup = create_book(&f.erp, &f.admin, new_book("978-0132350884", "Clean Code", 4000))
        .await
        .unwrap_err();
    assert_eq!(dup.code, ErrorCode::ValidationError);

    let bad_isbn = create_book(&f.erp, &f.admin, new_book("12345", "Short", 100))
        .await
        .unwrap_err();
    assert_eq!(bad_isbn.code, ErrorCode::ValidationError);

    let denied = create_book(&f.erp, &f.sales, new_book("978-1593278281", "The Rust Book", 3900))
        .await
        .unwrap_err();
    assert_eq!(denied.code, ErrorCode::PermissionDenied);
}

#[tokio::test]
async fn test_extreme_amounts_are_validation_errors() {
    let f = Fixture::new().await;

    let err = evaluate_credit(&f.erp, &f.admin, f.customer.id, i64::MAX)
        .await
        .unwrap_err();
    assert_eq!(err.code, ErrorCode::ValidationError);

    let largest = evaluate_credit(&f.erp, &f.admin, f.customer.id, MAX_ORDER_TOTAL_CENTS)
        .await
        .unwrap();
    assert_eq!(largest.decision, CreditDecision::AcceptWithApproval);

    // outstanding + total leaves the i64 range
    let indebted = f.customer_with(100_000, i64::MAX - 10).await;
    let err = evaluate_credit(&f.erp, &f.admin, indebted.id, MAX_ORDER_TOTAL_CENTS)
        .await
        .unwrap_err();
    assert_eq!(err.code, ErrorCode::ValidationError);

    let err = create_book(
        &f.erp,
        &f.admin,
        new_book("978-1593278281", "The Rust Book", MAX_PRICE_CENTS + 1),
    )
    .await
    .unwrap_err();
    assert_eq!(err.code, ErrorCode::ValidationError);
}

#[tokio::test]
async fn test_extreme_stock_deltas_are_validation_errors() {
    let f = Fixture::new().await;
    f.stock(&f.central, 5).await;

    for delta in [i64::MIN, -MAX_STOCK_DELTA - 1, MAX_STOCK_DELTA + 1, i64::MAX] {
        let err = adjust_stock(
            &f.erp,
            &f.admin,
            AdjustStockRequest {
                book_title_id: f.book.id,
                warehouse_id: f.central.id,
                delta,
                reason: None,
            },
        )
        .await
        .unwrap_err();
        assert_eq!(err.code, ErrorCode::ValidationError, "delta {delta}");
    }
    assert_eq!(f.quantity(&f.central).await, 5);

    let row = adjust_stock(
        &f.erp,
        &f.admin,
        AdjustStockRequest {
            book_title_id: f.book.id,
            warehouse_id: f.central.id,
            delta: MAX_STOCK_DELTA,
            reason: Some("bulk receipt".to_string()),
        },
    )
    .await
    .unwrap();
    assert_eq!(row.quantity, MAX_STOCK_DELTA + 5);
}

#[tokio::test]
async fn test_health_reports_applied_migrations() {
    let f = Fixture::new().await;

    let health = f.erp.health().await;
    assert!(health.reachable);
    assert_eq!(health.migrations_applied, health.migrations_embedded);
    assert!(health.is_healthy());
}
