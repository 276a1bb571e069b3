mod common;

use chrono::Days;
use pos_backoffice::{
    domain::{OrderStatus, Role, VoucherStatus, VoucherType},
    dto::{
        invoices::UpdateInvoiceRequest,
        orders::CreateOrderRequest,
        payments::RecordPaymentRequest,
        products::CreateProductRequest,
        reports::CloseDayRequest,
        sales::AddCartItemRequest,
        vouchers::{CreateVoucherRequest, UpdateVoucherRequest},
    },
    error::AppError,
    middleware::auth::AuthUser,
    models::Product,
    services::{
        invoice_service, order_service, payment_service, product_service, report_service,
        sale_service, voucher_service,
    },
    state::AppState,
};

async fn product(
    state: &AppState,
    admin: &AuthUser,
    name: &str,
    selling_price: i64,
) -> anyhow::Result<Product> {
    Ok(product_service::create_product(
        state,
        admin,
        CreateProductRequest {
            name: name.into(),
            purchase_price: selling_price / 2,
            selling_price,
            stock: 20,
        },
    )
    .await?
    .data
    .expect("product"))
}

async fn sell(
    state: &AppState,
    seller: &AuthUser,
    product_id: uuid::Uuid,
    quantity: i32,
    discount: i32,
) -> anyhow::Result<()> {
    sale_service::add_item(
        state,
        seller,
        AddCartItemRequest {
            product_id,
            quantity,
            discount,
        },
    )
    .await?;
    Ok(())
}

// Invoice lifecycle, printed flag, free invoices, voucher rejection, future close.
#[tokio::test]
async fn invoice_and_voucher_lifecycle() -> anyhow::Result<()> {
    let Some(state) = common::setup_state().await? else {
        return Ok(());
    };

    let admin =
        common::create_user(&state, "Admin", "admin@test.local", "admin123", Role::Admin).await?;
    let seller = common::create_user(
        &state,
        "Facturier",
        "facturier@test.local",
        "facture123",
        Role::Facturier,
    )
    .await?;
    let cashier = common::create_user(
        &state,
        "Caissier",
        "caissier@test.local",
        "caisse123",
        Role::Caissier,
    )
    .await?;
    let manager = common::create_user(
        &state,
        "Bons",
        "bons@test.local",
        "bons123",
        Role::GestionnaireBon,
    )
    .await?;

    let rice = product(&state, &admin, "Riz 5 kg", 450_000).await?;
    let sugar = product(&state, &admin, "Sucre 1 kg", 90_000).await?;
    let soap = product(&state, &admin, "Savon", 25_000).await?;

    // Lines come back in the order they were entered, all inserted in one transaction.
    sell(&state, &seller, soap.id, 1, 0).await?;
    sell(&state, &seller, rice.id, 1, 0).await?;
    sell(&state, &seller, sugar.id, 2, 0).await?;
    let invoice = order_service::create_order(&state, &seller, CreateOrderRequest::default())
        .await?
        .data
        .expect("invoice");
    let names: Vec<&str> = invoice.items.iter().map(|i| i.product_name.as_str()).collect();
    assert_eq!(names, ["Savon", "Riz 5 kg", "Sucre 1 kg"]);

    let fetched = invoice_service::get_invoice(&state, &cashier, invoice.order.id)
        .await?
        .data
        .expect("invoice");
    let fetched_names: Vec<&str> = fetched.items.iter().map(|i| i.product_name.as_str()).collect();
    assert_eq!(fetched_names, names);

    // Once printed, an invoice stays printed.
    let printed = invoice_service::update_invoice(
        &state,
        &seller,
        invoice.order.id,
        UpdateInvoiceRequest {
            status: None,
            printed: Some(true),
        },
    )
    .await?
    .data
    .expect("invoice");
    assert!(printed.order.printed);

    let unprinted = invoice_service::update_invoice(
        &state,
        &seller,
        invoice.order.id,
        UpdateInvoiceRequest {
            status: None,
            printed: Some(false),
        },
    )
    .await?
    .data
    .expect("invoice");
    assert!(unprinted.order.printed);

    // Paid through the invoice screen, then a second attempt is refused.
    let seller_pays = invoice_service::update_invoice(
        &state,
        &seller,
        invoice.order.id,
        UpdateInvoiceRequest {
            status: Some(OrderStatus::Paid),
            printed: None,
        },
    )
    .await;
    assert!(matches!(seller_pays, Err(AppError::Forbidden)));

    let paid = invoice_service::update_invoice(
        &state,
        &cashier,
        invoice.order.id,
        UpdateInvoiceRequest {
            status: Some(OrderStatus::Paid),
            printed: None,
        },
    )
    .await?
    .data
    .expect("invoice");
    assert_eq!(paid.order.status, OrderStatus::Paid);
    assert!(paid.order.paid_at.is_some());

    let paid_twice = invoice_service::update_invoice(
        &state,
        &cashier,
        invoice.order.id,
        UpdateInvoiceRequest {
            status: Some(OrderStatus::Paid),
            printed: None,
        },
    )
    .await;
    assert!(matches!(paid_twice, Err(AppError::Conflict(_))));

    // A cancelled invoice can no longer be collected.
    sell(&state, &seller, rice.id, 1, 0).await?;
    let to_cancel = order_service::create_order(&state, &seller, CreateOrderRequest::default())
        .await?
        .data
        .expect("invoice");
    let cancelled = invoice_service::update_invoice(
        &state,
        &seller,
        to_cancel.order.id,
        UpdateInvoiceRequest {
            status: Some(OrderStatus::Cancelled),
            printed: None,
        },
    )
    .await?
    .data
    .expect("invoice");
    assert_eq!(cancelled.order.status, OrderStatus::Cancelled);

    let pay_cancelled = invoice_service::update_invoice(
        &state,
        &cashier,
        to_cancel.order.id,
        UpdateInvoiceRequest {
            status: Some(OrderStatus::Paid),
            printed: None,
        },
    )
    .await;
    assert!(matches!(pay_cancelled, Err(AppError::Conflict(_))));

    let back_to_pending = invoice_service::update_invoice(
        &state,
        &seller,
        to_cancel.order.id,
        UpdateInvoiceRequest {
            status: Some(OrderStatus::Pending),
            printed: None,
        },
    )
    .await;
    assert!(matches!(back_to_pending, Err(AppError::BadRequest(_))));

    // A fully discounted sale is a zero invoice, settled with a zero payment.
    sell(&state, &seller, sugar.id, 1, 100).await?;
    let free = order_service::create_order(&state, &seller, CreateOrderRequest::default())
        .await?
        .data
        .expect("invoice");
    assert_eq!(free.order.total, 0);

    let receipt = payment_service::record_payment(
        &state,
        &cashier,
        RecordPaymentRequest {
            order_id: free.order.id,
            amount: 0,
            payment_method: None,
        },
    )
    .await?
    .data
    .expect("receipt");
    assert_eq!(receipt.payment.amount, 0);
    assert_eq!(receipt.order.status, OrderStatus::Paid);

    // Vouchers: printed is sticky, a rejected voucher cannot be processed.
    let voucher = voucher_service::create_voucher(
        &state,
        &manager,
        CreateVoucherRequest {
            voucher_type: VoucherType::Output,
            amount: 120_000,
            description: "Avance sur salaire".into(),
        },
    )
    .await?
    .data
    .expect("voucher");
    assert!(voucher.voucher_number.starts_with("SOR-"));

    let printed = voucher_service::update_voucher(
        &state,
        &manager,
        &voucher.voucher_number,
        UpdateVoucherRequest {
            status: None,
            printed: Some(true),
        },
    )
    .await?
    .data
    .expect("voucher");
    assert!(printed.printed);

    let unprinted = voucher_service::update_voucher(
        &state,
        &manager,
        &voucher.voucher_number,
        UpdateVoucherRequest {
            status: None,
            printed: Some(false),
        },
    )
    .await?
    .data
    .expect("voucher");
    assert!(unprinted.printed);

    let manager_rejects = voucher_service::update_voucher(
        &state,
        &manager,
        &voucher.voucher_number,
        UpdateVoucherRequest {
            status: Some(VoucherStatus::Rejected),
            printed: None,
        },
    )
    .await;
    assert!(matches!(manager_rejects, Err(AppError::Forbidden)));

    let rejected = voucher_service::update_voucher(
        &state,
        &cashier,
        &voucher.voucher_number,
        UpdateVoucherRequest {
            status: Some(VoucherStatus::Rejected),
            printed: None,
        },
    )
    .await?
    .data
    .expect("voucher");
    assert_eq!(rejected.status, VoucherStatus::Rejected);
    assert!(rejected.processed_at.is_none());

    let process_rejected = voucher_service::update_voucher(
        &state,
        &cashier,
        &voucher.voucher_number,
        UpdateVoucherRequest {
            status: Some(VoucherStatus::Processed),
            printed: None,
        },
    )
    .await;
    assert!(matches!(process_rejected, Err(AppError::Conflict(_))));

    // Days that have not happened yet cannot be closed.
    let tomorrow = state
        .today()
        .checked_add_days(Days::new(1))
        .expect("tomorrow");
    let future = report_service::close_day(
        &state,
        &admin,
        CloseDayRequest {
            date: Some(tomorrow),
        },
    )
    .await;
    assert!(matches!(future, Err(AppError::BadRequest(_))));

    Ok(())
}
