use chrono::Utc;
use sea_orm::sea_query::LockType;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, DatabaseTransaction, EntityTrait, PaginatorTrait,
    QueryFilter, QueryOrder, QuerySelect, Set, TransactionTrait,
};
use uuid::Uuid;

use crate::{
    domain::{OrderStatus, Role, merge_printed},
    dto::{
        invoices::{InvoiceQuery, InvoiceSort, InvoiceSummary, PrintFilter, UpdateInvoiceRequest},
        orders::{OrderList, OrderWithItems},
    },
    entity::orders::{ActiveModel as OrderActive, Column as OrderCol, Entity as Orders, Model as OrderModel},
    error::{AppError, AppResult},
    middleware::auth::{AuthUser, ensure_any_role},
    response::{ApiResponse, Meta},
    routes::params::{SortOrder, normalize_page},
    services::{
        mapping::order_from_entity,
        order_service::order_items,
        payment_service::{CASH_METHOD, CASH_ROLES, INVOICE_NOT_FOUND, settle_order},
    },
    state::AppState,
};

pub const INVOICE_ROLES: &[Role] = &[Role::Admin, Role::Facturier, Role::Caissier];

pub async fn list_invoices(
    state: &AppState,
    user: &AuthUser,
    query: InvoiceQuery,
) -> AppResult<ApiResponse<OrderList>> {
    ensure_any_role(user, INVOICE_ROLES)?;
    let (page, limit, offset) = normalize_page(query.page, query.limit);

    let mut condition = Condition::all();
    match query.filter {
        Some(PrintFilter::Printed) => condition = condition.add(OrderCol::Printed.eq(true)),
        Some(PrintFilter::Unprinted) => condition = condition.add(OrderCol::Printed.eq(false)),
        None => {}
    }
    if let Some(status) = query.status {
        condition = condition.add(OrderCol::Status.eq(status.as_str()));
    }

    let sort_col = match query.sort.unwrap_or(InvoiceSort::Date) {
        InvoiceSort::Date => OrderCol::CreatedAt,
        InvoiceSort::Total => OrderCol::Total,
        InvoiceSort::InvoiceNumber => OrderCol::InvoiceNumber,
        InvoiceSort::Status => OrderCol::Status,
    };
    let mut finder = Orders::find().filter(condition);
    finder = match query.direction.unwrap_or(SortOrder::Desc) {
        SortOrder::Asc => finder.order_by_asc(sort_col).order_by_asc(OrderCol::Id),
        SortOrder::Desc => finder.order_by_desc(sort_col).order_by_desc(OrderCol::Id),
    };

    let total = finder.clone().count(&state.orm).await? as i64;
    let items = finder
        .limit(limit as u64)
        .offset(offset as u64)
        .all(&state.orm)
        .await?
        .into_iter()
        .map(order_from_entity)
        .collect::<AppResult<Vec<_>>>()?;

    Ok(ApiResponse::success(
        "Factures",
        OrderList { items },
        Some(Meta::new(page, limit, total)),
    ))
}

pub async fn invoice_summary(
    state: &AppState,
    user: &AuthUser,
) -> AppResult<ApiResponse<InvoiceSummary>> {
    ensure_any_role(user, INVOICE_ROLES)?;
    let (total_amount, total_printed, printed_count, unprinted_count): (i64, i64, i64, i64) =
        sqlx::query_as(
            r#"
            SELECT
                COALESCE(SUM(total), 0)::BIGINT,
                COALESCE(SUM(total) FILTER (WHERE printed), 0)::BIGINT,
                COUNT(*) FILTER (WHERE printed),
                COUNT(*) FILTER (WHERE NOT printed)
            FROM orders
            "#,
        )
        .fetch_one(&state.pool)
        .await?;

    Ok(ApiResponse::success(
        "Résumé des factures",
        InvoiceSummary {
            total_amount,
            total_printed,
            printed_count,
            unprinted_count,
        },
        None,
    ))
}

pub async fn get_invoice(
    state: &AppState,
    user: &AuthUser,
    id: Uuid,
) -> AppResult<ApiResponse<OrderWithItems>> {
    ensure_any_role(user, INVOICE_ROLES)?;
    let order = Orders::find_by_id(id)
        .one(&state.orm)
        .await?
        .ok_or_else(|| AppError::not_found(INVOICE_NOT_FOUND))?;
    let items = order_items(&state.orm, order.id).await?;
    Ok(ApiResponse::success(
        "Facture",
        OrderWithItems {
            order: order_from_entity(order)?,
            items,
        },
        None,
    ))
}

/// Applies a status change and/or marks the invoice printed, atomically.
///
/// `paid` goes through the same settlement as the payment screen, paid in cash.
pub async fn update_invoice(
    state: &AppState,
    user: &AuthUser,
    id: Uuid,
    payload: UpdateInvoiceRequest,
) -> AppResult<ApiResponse<OrderWithItems>> {
    ensure_any_role(user, INVOICE_ROLES)?;
    let txn = state.orm.begin().await?;

    match payload.status {
        Some(OrderStatus::Paid) => {
            ensure_any_role(user, CASH_ROLES)?;
            settle_order(&txn, id, None, CASH_METHOD, user.user_id).await?;
        }
        Some(target) => {
            let order = lock_order(&txn, id).await?;
            let next = order_from_entity(order.clone())?.status.transition(target)?;
            let mut active: OrderActive = order.into();
            active.status = Set(next.as_str().to_string());
            active.updated_at = Set(Utc::now().into());
            active.update(&txn).await?;
            tracing::info!(order_id = %id, status = next.as_str(), "invoice status changed");
        }
        None => {}
    }

    if let Some(requested) = payload.printed {
        let order = lock_order(&txn, id).await?;
        let printed = merge_printed(order.printed, requested);
        if printed != order.printed {
            let mut active: OrderActive = order.into();
            active.printed = Set(printed);
            active.updated_at = Set(Utc::now().into());
            active.update(&txn).await?;
        }
    }

    let order = lock_order(&txn, id).await?;
    let items = order_items(&txn, order.id).await?;
    txn.commit().await?;

    Ok(ApiResponse::success(
        "Facture mise à jour",
        OrderWithItems {
            order: order_from_entity(order)?,
            items,
        },
        Some(Meta::empty()),
    ))
}

async fn lock_order(txn: &DatabaseTransaction, id: Uuid) -> AppResult<OrderModel> {
    Orders::find_by_id(id)
        .lock(LockType::Update)
        .one(txn)
        .await?
        .ok_or_else(|| AppError::not_found(INVOICE_NOT_FOUND))
}
