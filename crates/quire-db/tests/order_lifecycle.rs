//! Order-to-invoice storage tests against an in-memory database.

mod common;

use chrono::Utc;
use common::{line, Fixture};
use quire_core::{CoreError, InvoiceType, OrderStatus, TaxTable};
use quire_db::DbError;

const PREFIX: &str = "INV";

#[tokio::test]
async fn test_end_to_end_invoice() {
    let f = Fixture::in_memory().await;
    f.stock(&f.central, 5).await;

    let draft = f.draft(&f.customer, &[line(f.book.id, 3, Some(1000))]);
    assert_eq!(draft.total.cents(), 12150);

    let view = f.db.sales_orders().insert_proforma(&draft).await.unwrap();
    assert_eq!(view.order.status, OrderStatus::Proforma);
    assert_eq!(view.items.len(), 1);
    assert_eq!(view.items[0].selling_price_cents, 4500);

    let confirmed = f.db.sales_orders().confirm(view.order.id, None).await.unwrap();
    assert_eq!(confirmed.status, OrderStatus::Confirmed);
    assert!(confirmed.confirmed_at.is_some());

    let invoice = f
        .db
        .invoices()
        .generate(view.order.id, InvoiceType::Cash, f.central.id, &TaxTable::default(), PREFIX)
        .await
        .unwrap();

    assert_eq!(invoice.invoice_number, "INV-000001");
    assert_eq!(invoice.subtotal_cents, 12150);
    assert_eq!(invoice.gst_cents, 608);
    assert_eq!(invoice.total_cents, 12758);

    assert_eq!(f.db.inventory().quantity(f.book.id, f.central.id).await.unwrap(), 2);

    let customer = f.db.master().get_customer(f.customer.id).await.unwrap().unwrap();
    assert_eq!(customer.outstanding_cents, f.customer.outstanding_cents + 12758);

    let order = f.db.sales_orders().get(view.order.id).await.unwrap().unwrap();
    assert_eq!(order.status, OrderStatus::Invoiced);
    assert!(order.invoiced_at.is_some());

    f.cleanup().await;
}

#[tokio::test]
async fn test_insufficient_stock_leaves_everything_untouched() {
    let f = Fixture::in_memory().await;
    f.stock(&f.central, 1).await;
    let order = f.confirmed_order(3).await;

    let err = f
        .db
        .invoices()
        .generate(order.id, InvoiceType::Cash, f.central.id, &TaxTable::default(), PREFIX)
        .await
        .unwrap_err();

    assert!(matches!(
        err,
        DbError::Domain(CoreError::InsufficientStock {
            available: 1,
            requested: 3,
            ..
        })
    ));
    assert_eq!(f.db.inventory().quantity(f.book.id, f.central.id).await.unwrap(), 1);

    let order = f.db.sales_orders().get(order.id).await.unwrap().unwrap();
    assert_eq!(order.status, OrderStatus::Confirmed);
    assert!(f.db.invoices().get_by_order(order.id).await.unwrap().is_none());

    let customer = f.db.master().get_customer(f.customer.id).await.unwrap().unwrap();
    assert_eq!(customer.outstanding_cents, f.customer.outstanding_cents);

    // The failed attempt did not consume a number.
    f.stock(&f.central, 10).await;
    let invoice = f
        .db
        .invoices()
        .generate(order.id, InvoiceType::Cash, f.central.id, &TaxTable::default(), PREFIX)
        .await
        .unwrap();
    assert_eq!(invoice.invoice_seq, 1);

    f.cleanup().await;
}

#[tokio::test]
async fn test_invoice_from_warehouse_without_row() {
    let f = Fixture::in_memory().await;
    f.stock(&f.central, 10).await;
    let order = f.confirmed_order(1).await;

    let err = f
        .db
        .invoices()
        .generate(order.id, InvoiceType::Cash, f.north.id, &TaxTable::default(), PREFIX)
        .await
        .unwrap_err();

    assert!(matches!(
        err,
        DbError::Domain(CoreError::InsufficientStock { available: 0, .. })
    ));

    f.cleanup().await;
}

#[tokio::test]
async fn test_generate_twice_is_already_invoiced() {
    let f = Fixture::in_memory().await;
    f.stock(&f.central, 10).await;
    let order = f.confirmed_order(2).await;
    let invoices = f.db.invoices();

    invoices
        .generate(order.id, InvoiceType::Credit, f.central.id, &TaxTable::default(), PREFIX)
        .await
        .unwrap();
    let err = invoices
        .generate(order.id, InvoiceType::Credit, f.central.id, &TaxTable::default(), PREFIX)
        .await
        .unwrap_err();

    assert!(matches!(err, DbError::Domain(CoreError::AlreadyInvoiced { .. })));
    assert_eq!(f.db.inventory().quantity(f.book.id, f.central.id).await.unwrap(), 8);

    f.cleanup().await;
}

#[tokio::test]
async fn test_invoicing_a_proforma_is_invalid() {
    let f = Fixture::in_memory().await;
    f.stock(&f.central, 10).await;
    let draft = f.draft(&f.customer, &[line(f.book.id, 1, None)]);
    let view = f.db.sales_orders().insert_proforma(&draft).await.unwrap();

    let err = f
        .db
        .invoices()
        .generate(view.order.id, InvoiceType::Cash, f.central.id, &TaxTable::default(), PREFIX)
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        DbError::Domain(CoreError::InvalidTransition {
            from: OrderStatus::Proforma,
            to: OrderStatus::Invoiced,
            ..
        })
    ));

    let missing = f
        .db
        .invoices()
        .generate(9_999, InvoiceType::Cash, f.central.id, &TaxTable::default(), PREFIX)
        .await
        .unwrap_err();
    assert!(matches!(missing, DbError::NotFound { .. }));

    f.cleanup().await;
}

#[tokio::test]
async fn test_invoice_that_would_overflow_the_balance_is_refused() {
    let f = Fixture::in_memory().await;
    f.stock(&f.central, 10).await;
    f.db.inventory()
        .adjust(f.other_book.id, f.central.id, 10)
        .await
        .unwrap();

    // 4 × 50.00 = 200.00 fits the projection; with GST it no longer fits the balance
    let indebted = f.customer_with(100_000, i64::MAX - 20_000).await;
    let draft = f.draft(&indebted, &[line(f.other_book.id, 4, Some(0))]);
    assert_eq!(draft.credit.projected_cents, i64::MAX);

    let orders = f.db.sales_orders();
    let view = orders.insert_proforma(&draft).await.unwrap();
    orders
        .confirm(view.order.id, Some(f.admin.user_id))
        .await
        .unwrap();

    let err = f
        .db
        .invoices()
        .generate(view.order.id, InvoiceType::Cash, f.central.id, &TaxTable::default(), PREFIX)
        .await
        .unwrap_err();
    assert!(matches!(err, DbError::Domain(CoreError::Validation(_))));

    let customer = f.db.master().get_customer(indebted.id).await.unwrap().unwrap();
    assert_eq!(customer.outstanding_cents, i64::MAX - 20_000);
    assert_eq!(
        f.db.inventory().quantity(f.other_book.id, f.central.id).await.unwrap(),
        10
    );
    let order = orders.get(view.order.id).await.unwrap().unwrap();
    assert_eq!(order.status, OrderStatus::Confirmed);

    f.cleanup().await;
}

#[tokio::test]
async fn test_same_title_on_two_lines_is_deducted_together() {
    let f = Fixture::in_memory().await;
    f.stock(&f.central, 4).await;

    let draft = f.draft(
        &f.customer,
        &[line(f.book.id, 2, None), line(f.book.id, 3, None)],
    );
    let view = f.db.sales_orders().insert_proforma(&draft).await.unwrap();
    f.db.sales_orders().confirm(view.order.id, None).await.unwrap();

    let err = f
        .db
        .invoices()
        .generate(view.order.id, InvoiceType::Cash, f.central.id, &TaxTable::default(), PREFIX)
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        DbError::Domain(CoreError::InsufficientStock {
            available: 4,
            requested: 5,
            ..
        })
    ));

    f.cleanup().await;
}

#[tokio::test]
async fn test_confirm_requires_approval() {
    let f = Fixture::in_memory().await;
    // limit 1000.00, outstanding 900.00, order 200.00
    let tight = f.customer_with(100_000, 90_000).await;
    let draft = f.draft(&tight, &[line(f.other_book.id, 4, Some(0))]);
    assert!(draft.requires_approval);

    let orders = f.db.sales_orders();
    let view = orders.insert_proforma(&draft).await.unwrap();

    let err = orders.confirm(view.order.id, None).await.unwrap_err();
    assert!(matches!(err, DbError::Domain(CoreError::ApprovalRequired { .. })));

    let confirmed = orders
        .confirm(view.order.id, Some(f.admin.user_id))
        .await
        .unwrap();
    assert_eq!(confirmed.status, OrderStatus::Confirmed);
    assert_eq!(confirmed.approved_by, Some(f.admin.user_id));

    let again = orders.confirm(view.order.id, None).await.unwrap_err();
    assert!(matches!(again, DbError::Domain(CoreError::InvalidTransition { .. })));

    f.cleanup().await;
}

#[tokio::test]
async fn test_approve_then_confirm() {
    let f = Fixture::in_memory().await;
    let tight = f.customer_with(100_000, 90_000).await;
    let draft = f.draft(&tight, &[line(f.other_book.id, 4, Some(0))]);
    let orders = f.db.sales_orders();
    let view = orders.insert_proforma(&draft).await.unwrap();

    let approved = orders.approve(view.order.id, f.admin.user_id).await.unwrap();
    assert_eq!(approved.status, OrderStatus::Proforma);
    assert!(approved.approval_satisfied());

    let confirmed = orders.confirm(view.order.id, None).await.unwrap();
    assert_eq!(confirmed.approved_by, Some(f.admin.user_id));

    let late = orders.approve(view.order.id, f.admin.user_id).await.unwrap_err();
    assert!(matches!(late, DbError::Domain(CoreError::InvalidTransition { .. })));

    let unknown = orders.confirm(9_999, None).await.unwrap_err();
    assert!(matches!(unknown, DbError::NotFound { .. }));

    f.cleanup().await;
}

#[tokio::test]
async fn test_order_listing_and_reports() {
    let f = Fixture::in_memory().await;
    f.stock(&f.central, 20).await;

    let invoiced = f.confirmed_order(3).await;
    f.db.invoices()
        .generate(invoiced.id, InvoiceType::Cash, f.central.id, &TaxTable::default(), PREFIX)
        .await
        .unwrap();
    let pending = f.confirmed_order(1).await;

    let confirmed = f
        .db
        .sales_orders()
        .list(Some(OrderStatus::Confirmed), 50)
        .await
        .unwrap();
    assert_eq!(confirmed.len(), 1);
    assert_eq!(confirmed[0].id, pending.id);
    assert_eq!(confirmed[0].customer_name, "Lotus Books");
    assert_eq!(f.db.sales_orders().list(None, 50).await.unwrap().len(), 2);

    let reports = f.db.reports();

    let outstanding = reports.outstanding(None).await.unwrap();
    assert_eq!(outstanding.customers.len(), 1);
    assert_eq!(outstanding.total_outstanding_cents, 12758);

    let daybook = reports.daybook(Utc::now().date_naive()).await.unwrap();
    assert_eq!(daybook.invoice_count, 1);
    assert_eq!(daybook.gst_cents, 608);
    assert_eq!(daybook.entries[0].invoice_number, "INV-000001");

    let yesterday = Utc::now().date_naive().pred_opt().unwrap();
    assert_eq!(reports.daybook(yesterday).await.unwrap().invoice_count, 0);

    let statement = reports
        .customer_statement(f.customer.id, 10)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(statement.recent_invoices.len(), 1);
    assert_eq!(
        statement.available_credit_cents,
        statement.customer.credit_limit_cents - 12758
    );
    assert!(reports.customer_statement(9_999, 10).await.unwrap().is_none());

    f.cleanup().await;
}
