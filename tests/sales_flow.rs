mod common;

use pos_backoffice::{
    domain::{OrderStatus, Period, Role, VoucherStatus, VoucherType},
    dto::{
        orders::CreateOrderRequest,
        payments::{CashDrawerQuery, InvoiceLookupQuery, RecordPaymentRequest},
        products::CreateProductRequest,
        reports::CloseDayRequest,
        sales::AddCartItemRequest,
        vouchers::{CreateVoucherRequest, UpdateVoucherRequest},
    },
    error::AppError,
    services::{
        order_service, payment_service, product_service, report_service, sale_service,
        voucher_service,
    },
};

// Sale -> invoice -> payment -> expense voucher -> cash drawer -> day close.
#[tokio::test]
async fn sale_payment_and_cash_drawer_flow() -> anyhow::Result<()> {
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

    let product = product_service::create_product(
        &state,
        &admin,
        CreateProductRequest {
            name: "Huile végétale 1 L".into(),
            purchase_price: 100_000,
            selling_price: 150_000,
            stock: 10,
        },
    )
    .await?
    .data
    .expect("product");

    // Adding three units reserves them, removing the line gives them back.
    let movement = sale_service::add_item(
        &state,
        &seller,
        AddCartItemRequest {
            product_id: product.id,
            quantity: 3,
            discount: 0,
        },
    )
    .await?
    .data
    .expect("movement");
    assert_eq!(movement.product.stock, 7);
    assert_eq!(movement.line.total, 450_000);

    let restored = sale_service::remove_item(&state, &seller, movement.line.id)
        .await?
        .data
        .expect("movement");
    assert_eq!(restored.product.stock, 10);

    let too_many = sale_service::add_item(
        &state,
        &seller,
        AddCartItemRequest {
            product_id: product.id,
            quantity: 11,
            discount: 0,
        },
    )
    .await;
    assert!(matches!(too_many, Err(AppError::BadRequest(_))));

    let empty = order_service::create_order(&state, &seller, CreateOrderRequest::default()).await;
    assert!(matches!(empty, Err(AppError::BadRequest(msg)) if msg == order_service::EMPTY_SALE));

    sale_service::add_item(
        &state,
        &seller,
        AddCartItemRequest {
            product_id: product.id,
            quantity: 2,
            discount: 10,
        },
    )
    .await?;
    let invoice = order_service::create_order(&state, &seller, CreateOrderRequest::default())
        .await?
        .data
        .expect("invoice");
    assert_eq!(invoice.order.total, 270_000);
    assert_eq!(invoice.order.status, OrderStatus::Pending);
    assert!(invoice.order.invoice_number.starts_with("INV-"));
    assert_eq!(invoice.items.len(), 1);

    let cart = sale_service::get_cart(&state, &seller).await?.data.expect("cart");
    assert!(cart.items.is_empty());
    let stocked = product_service::get_product(&state, product.id).await?.data.expect("product");
    assert_eq!(stocked.stock, 8);

    // Only cashiers collect money.
    let forbidden = payment_service::record_payment(
        &state,
        &seller,
        RecordPaymentRequest {
            order_id: invoice.order.id,
            amount: 270_000,
            payment_method: None,
        },
    )
    .await;
    assert!(matches!(forbidden, Err(AppError::Forbidden)));

    let wrong_amount = payment_service::record_payment(
        &state,
        &cashier,
        RecordPaymentRequest {
            order_id: invoice.order.id,
            amount: 200_000,
            payment_method: None,
        },
    )
    .await;
    assert!(matches!(wrong_amount, Err(AppError::BadRequest(_))));

    let receipt = payment_service::record_payment(
        &state,
        &cashier,
        RecordPaymentRequest {
            order_id: invoice.order.id,
            amount: 270_000,
            payment_method: None,
        },
    )
    .await?
    .data
    .expect("receipt");
    assert_eq!(receipt.order.status, OrderStatus::Paid);
    assert_eq!(receipt.payment.payment_method, "cash");

    let again = payment_service::lookup_invoice(
        &state,
        &cashier,
        InvoiceLookupQuery {
            invoice_number: invoice.order.invoice_number.clone(),
        },
    )
    .await;
    assert!(matches!(again, Err(AppError::Conflict(_))));

    // An expense voucher only moves the drawer once processed.
    let voucher = voucher_service::create_voucher(
        &state,
        &manager,
        CreateVoucherRequest {
            voucher_type: VoucherType::Expense,
            amount: 500_000,
            description: "Achat de fournitures".into(),
        },
    )
    .await?
    .data
    .expect("voucher");
    assert!(voucher.voucher_number.starts_with("DEP-"));
    assert_eq!(voucher.status, VoucherStatus::Pending);

    let drawer_query = || CashDrawerQuery {
        period: Some(Period::Day),
        date: None,
    };
    let before = payment_service::cash_drawer(&state, &cashier, drawer_query())
        .await?
        .data
        .expect("snapshot");
    assert_eq!(before.payments_in, 270_000);
    assert_eq!(before.vouchers_out, 0);

    let processed = voucher_service::update_voucher(
        &state,
        &cashier,
        &voucher.voucher_number,
        UpdateVoucherRequest {
            status: Some(VoucherStatus::Processed),
            printed: None,
        },
    )
    .await?
    .data
    .expect("voucher");
    assert_eq!(processed.status, VoucherStatus::Processed);
    assert!(processed.processed_at.is_some());

    let reprocess = voucher_service::update_voucher(
        &state,
        &cashier,
        &voucher.voucher_number,
        UpdateVoucherRequest {
            status: Some(VoucherStatus::Processed),
            printed: None,
        },
    )
    .await;
    assert!(matches!(reprocess, Err(AppError::Conflict(_))));

    let after = payment_service::cash_drawer(&state, &cashier, drawer_query())
        .await?
        .data
        .expect("snapshot");
    assert_eq!(after.vouchers_out, 500_000);
    assert_eq!(after.total_cash, 270_000 - 500_000);

    let closing = report_service::close_day(&state, &admin, CloseDayRequest { date: None })
        .await?
        .data
        .expect("closing");
    assert_eq!(closing.closing_cash, after.drawer_cash());

    let twice = report_service::close_day(&state, &admin, CloseDayRequest { date: None }).await;
    assert!(matches!(twice, Err(AppError::Conflict(_))));

    Ok(())
}
