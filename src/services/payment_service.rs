use chrono::Utc;
use sea_orm::ActiveValue::NotSet;
use sea_orm::sea_query::LockType;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseTransaction, EntityTrait, QueryFilter, QuerySelect, Set,
    TransactionTrait,
};
use uuid::Uuid;

use crate::{
    domain::{Amount, CashSnapshot, OrderStatus, Period, Role},
    dto::{
        orders::OrderWithItems,
        payments::{
            CashDrawerQuery, DailyPayment, DailyPayments, DateQuery, InvoiceLookupQuery,
            PaymentReceipt, RecordPaymentRequest,
        },
    },
    entity::{
        orders::{ActiveModel as OrderActive, Column as OrderCol, Entity as Orders, Model as OrderModel},
        payments::{ActiveModel as PaymentActive, Model as PaymentModel},
    },
    error::{AppError, AppResult},
    format::format_xaf,
    middleware::auth::{AuthUser, ensure_any_role},
    response::{ApiResponse, Meta},
    services::{
        cash_service::{CashWindow, cash_snapshot},
        mapping::{order_from_entity, payment_from_entity},
        order_service::order_items,
    },
    state::AppState,
};

pub const CASH_ROLES: &[Role] = &[Role::Admin, Role::Caissier];
pub const INVOICE_NOT_FOUND: &str = "Facture introuvable";
pub const CASH_METHOD: &str = "cash";

/// Finds a pending invoice to collect.
pub async fn lookup_invoice(
    state: &AppState,
    user: &AuthUser,
    query: InvoiceLookupQuery,
) -> AppResult<ApiResponse<OrderWithItems>> {
    ensure_any_role(user, CASH_ROLES)?;
    let invoice_number = query.invoice_number.trim();
    if invoice_number.is_empty() {
        return Err(AppError::BadRequest("Numéro de facture requis".into()));
    }

    let order = Orders::find()
        .filter(OrderCol::InvoiceNumber.eq(invoice_number))
        .one(&state.orm)
        .await?
        .ok_or_else(|| AppError::not_found(INVOICE_NOT_FOUND))?;

    let order = order_from_entity(order)?;
    order.status.ensure_payable()?;
    let items = order_items(&state.orm, order.id).await?;

    Ok(ApiResponse::success("Facture", OrderWithItems { order, items }, None))
}

pub async fn record_payment(
    state: &AppState,
    user: &AuthUser,
    payload: RecordPaymentRequest,
) -> AppResult<ApiResponse<PaymentReceipt>> {
    ensure_any_role(user, CASH_ROLES)?;
    let method = payload
        .payment_method
        .map(|m| m.trim().to_lowercase())
        .filter(|m| !m.is_empty())
        .unwrap_or_else(|| CASH_METHOD.to_string());

    let txn = state.orm.begin().await?;
    let (payment, order) =
        settle_order(&txn, payload.order_id, Some(payload.amount), &method, user.user_id).await?;
    txn.commit().await?;

    Ok(ApiResponse::success(
        "Paiement enregistré",
        PaymentReceipt {
            payment: payment_from_entity(payment),
            order: order_from_entity(order)?,
        },
        Some(Meta::empty()),
    ))
}

/// Settles a pending order inside `txn`.
///
/// The order row stays locked until the caller commits, so two cashiers
/// collecting the same invoice cannot both succeed. When `amount` is given it
/// must equal the order total.
pub async fn settle_order(
    txn: &DatabaseTransaction,
    order_id: Uuid,
    amount: Option<Amount>,
    method: &str,
    received_by: Uuid,
) -> AppResult<(PaymentModel, OrderModel)> {
    let order = Orders::find_by_id(order_id)
        .lock(LockType::Update)
        .one(txn)
        .await?
        .ok_or_else(|| AppError::not_found(INVOICE_NOT_FOUND))?;

    let status = order_from_entity(order.clone())?.status;
    status.ensure_payable()?;

    let amount = amount.unwrap_or(order.total);
    if amount != order.total {
        return Err(AppError::BadRequest(format!(
            "Le montant doit être égal au total de la facture ({})",
            format_xaf(order.total)
        )));
    }

    let payment = PaymentActive {
        id: Set(Uuid::new_v4()),
        order_id: Set(order.id),
        amount: Set(amount),
        payment_method: Set(method.to_string()),
        received_by: Set(received_by),
        created_at: NotSet,
    }
    .insert(txn)
    .await?;

    let now = Utc::now();
    let mut active: OrderActive = order.into();
    active.status = Set(OrderStatus::Paid.as_str().to_string());
    active.paid_at = Set(Some(now.into()));
    active.updated_at = Set(now.into());
    let order = active.update(txn).await?;

    tracing::info!(
        order_id = %order.id,
        invoice_number = %order.invoice_number,
        amount,
        method,
        "invoice paid"
    );
    Ok((payment, order))
}

pub async fn daily_payments(
    state: &AppState,
    user: &AuthUser,
    query: DateQuery,
) -> AppResult<ApiResponse<DailyPayments>> {
    ensure_any_role(user, CASH_ROLES)?;
    let date = query.date.unwrap_or_else(|| state.today());
    let window = CashWindow::new(Period::Day, date, state.offset)?;

    let payments: Vec<DailyPayment> = sqlx::query_as(
        r#"
        SELECT o.invoice_number, p.amount, p.payment_method, p.created_at
        FROM payments p
        JOIN orders o ON o.id = p.order_id
        WHERE p.created_at >= $1 AND p.created_at < $2
        ORDER BY p.created_at ASC
        "#,
    )
    .bind(window.start)
    .bind(window.end)
    .fetch_all(&state.pool)
    .await?;

    let total = payments.iter().map(|p| p.amount).sum();
    Ok(ApiResponse::success(
        "Paiements du jour",
        DailyPayments {
            date,
            payments,
            total,
        },
        None,
    ))
}

pub async fn cash_drawer(
    state: &AppState,
    user: &AuthUser,
    query: CashDrawerQuery,
) -> AppResult<ApiResponse<CashSnapshot>> {
    ensure_any_role(user, CASH_ROLES)?;
    let period = query.period.unwrap_or_default();
    let date = query.date.unwrap_or_else(|| state.today());
    let snapshot = cash_snapshot(&state.pool, state.offset, period, date).await?;
    tracing::debug!(period = period.as_str(), %date, total_cash = snapshot.total_cash, "cash drawer computed");
    Ok(ApiResponse::success("Caisse", snapshot, None))
}
