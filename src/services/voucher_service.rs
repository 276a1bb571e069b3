use chrono::Utc;
use sea_orm::ActiveValue::NotSet;
use sea_orm::sea_query::LockType;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, EntityTrait, PaginatorTrait, QueryFilter, QueryOrder,
    QuerySelect, Set, TransactionTrait,
};
use uuid::Uuid;

use crate::{
    domain::{
        Period, Role, VoucherStatus, VoucherTotals, merge_printed, validation::validate_voucher,
    },
    dto::{
        payments::{CashDrawerQuery, DateQuery},
        vouchers::{
            CreateVoucherRequest, DailyVoucherDetails, UpdateVoucherRequest, VoucherDetail,
            VoucherList, VoucherListQuery, VoucherLookupQuery, VoucherSummary,
        },
    },
    entity::vouchers::{ActiveModel, Column, Entity as Vouchers},
    error::{AppError, AppResult},
    middleware::auth::{AuthUser, ensure_any_role},
    models::Voucher,
    response::{ApiResponse, Meta},
    routes::params::normalize_page,
    services::{
        cash_service::{CashWindow, processed_voucher_totals},
        mapping::voucher_from_entity,
        sequence::{NumberedDocument, next_document_number},
    },
    state::AppState,
};

pub const VOUCHER_NOT_FOUND: &str = "Bon non trouvé";

const ISSUER_ROLES: &[Role] = &[Role::Admin, Role::GestionnaireBon];
const LIST_ROLES: &[Role] = &[Role::Admin, Role::GestionnaireBon, Role::Caissier];
const PROCESSOR_ROLES: &[Role] = &[Role::Admin, Role::Caissier];

pub async fn create_voucher(
    state: &AppState,
    user: &AuthUser,
    payload: CreateVoucherRequest,
) -> AppResult<ApiResponse<Voucher>> {
    ensure_any_role(user, ISSUER_ROLES)?;
    let description = payload.description.trim().to_string();
    validate_voucher(payload.amount, &description)?;

    let txn = state.orm.begin().await?;
    let voucher_number = next_document_number(
        &txn,
        NumberedDocument::Voucher,
        payload.voucher_type.number_prefix(),
        state.today(),
    )
    .await?;

    let voucher = ActiveModel {
        id: Set(Uuid::new_v4()),
        voucher_number: Set(voucher_number),
        voucher_type: Set(payload.voucher_type.as_str().to_string()),
        amount: Set(payload.amount),
        description: Set(description),
        status: Set(VoucherStatus::Pending.as_str().to_string()),
        printed: Set(false),
        created_by: Set(user.user_id),
        processed_by: Set(None),
        processed_at: Set(None),
        created_at: NotSet,
    }
    .insert(&txn)
    .await?;
    txn.commit().await?;

    tracing::info!(
        voucher_number = %voucher.voucher_number,
        voucher_type = %voucher.voucher_type,
        amount = voucher.amount,
        "voucher created"
    );
    Ok(ApiResponse::success(
        "Bon créé",
        voucher_from_entity(voucher)?,
        Some(Meta::empty()),
    ))
}

pub async fn list_vouchers(
    state: &AppState,
    user: &AuthUser,
    query: VoucherListQuery,
) -> AppResult<ApiResponse<VoucherList>> {
    ensure_any_role(user, LIST_ROLES)?;
    let (page, limit, offset) = normalize_page(query.page, query.per_page);

    let mut condition = Condition::all();
    if let Some(voucher_type) = query.voucher_type {
        condition = condition.add(Column::VoucherType.eq(voucher_type.as_str()));
    }
    if let Some(status) = query.status {
        condition = condition.add(Column::Status.eq(status.as_str()));
    }

    let finder = Vouchers::find()
        .filter(condition)
        .order_by_desc(Column::CreatedAt);
    let total = finder.clone().count(&state.orm).await? as i64;
    let items = finder
        .limit(limit as u64)
        .offset(offset as u64)
        .all(&state.orm)
        .await?
        .into_iter()
        .map(voucher_from_entity)
        .collect::<AppResult<Vec<_>>>()?;

    Ok(ApiResponse::success(
        "Bons",
        VoucherList { items },
        Some(Meta::new(page, limit, total)),
    ))
}

/// Finds a voucher the cashier can still process.
pub async fn lookup_voucher(
    state: &AppState,
    user: &AuthUser,
    query: VoucherLookupQuery,
) -> AppResult<ApiResponse<Voucher>> {
    ensure_any_role(user, PROCESSOR_ROLES)?;
    let voucher = Vouchers::find()
        .filter(Column::VoucherNumber.eq(query.voucher_number.trim()))
        .one(&state.orm)
        .await?
        .ok_or_else(|| AppError::not_found(VOUCHER_NOT_FOUND))?;
    let voucher = voucher_from_entity(voucher)?;
    voucher.status.ensure_processable()?;
    Ok(ApiResponse::success("Bon", voucher, None))
}

pub async fn update_voucher(
    state: &AppState,
    user: &AuthUser,
    voucher_number: &str,
    payload: UpdateVoucherRequest,
) -> AppResult<ApiResponse<Voucher>> {
    if payload.status.is_some() {
        ensure_any_role(user, PROCESSOR_ROLES)?;
    } else {
        ensure_any_role(user, LIST_ROLES)?;
    }

    let txn = state.orm.begin().await?;
    let existing = Vouchers::find()
        .filter(Column::VoucherNumber.eq(voucher_number))
        .lock(LockType::Update)
        .one(&txn)
        .await?
        .ok_or_else(|| AppError::not_found(VOUCHER_NOT_FOUND))?;
    let current = voucher_from_entity(existing.clone())?;

    let mut active: ActiveModel = existing.into();
    if let Some(target) = payload.status {
        let next = current.status.transition(target)?;
        active.status = Set(next.as_str().to_string());
        active.processed_by = Set(Some(user.user_id));
        if next == VoucherStatus::Processed {
            active.processed_at = Set(Some(Utc::now().into()));
        }
        tracing::info!(
            voucher_number = %current.voucher_number,
            status = next.as_str(),
            amount = current.amount,
            "voucher status changed"
        );
    }
    if let Some(requested) = payload.printed {
        active.printed = Set(merge_printed(current.printed, requested));
    }

    let voucher = active.update(&txn).await?;
    txn.commit().await?;

    Ok(ApiResponse::success(
        "Bon mis à jour",
        voucher_from_entity(voucher)?,
        Some(Meta::empty()),
    ))
}

pub async fn voucher_summary(
    state: &AppState,
    user: &AuthUser,
    query: CashDrawerQuery,
) -> AppResult<ApiResponse<VoucherSummary>> {
    ensure_any_role(user, LIST_ROLES)?;
    let period = query.period.unwrap_or(Period::Day);
    let date = query.date.unwrap_or_else(|| state.today());
    let window = CashWindow::new(period, date, state.offset)?;

    let processed = processed_voucher_totals(&state.pool, &window).await?;
    let (processed_count, pending_count): (i64, i64) = sqlx::query_as(
        r#"
        SELECT
            COUNT(*) FILTER (WHERE status = 'processed' AND processed_at >= $1 AND processed_at < $2),
            COUNT(*) FILTER (WHERE status = 'pending')
        FROM vouchers
        "#,
    )
    .bind(window.start)
    .bind(window.end)
    .fetch_one(&state.pool)
    .await?;

    Ok(ApiResponse::success(
        "Résumé des bons",
        VoucherSummary {
            period,
            date,
            processed_amount: processed.inflow() + processed.outflow(),
            processed,
            processed_count,
            pending_count,
        },
        None,
    ))
}

pub async fn daily_voucher_details(
    state: &AppState,
    user: &AuthUser,
    query: DateQuery,
) -> AppResult<ApiResponse<DailyVoucherDetails>> {
    ensure_any_role(user, LIST_ROLES)?;
    let date = query.date.unwrap_or_else(|| state.today());
    let voucher_details = processed_vouchers_between(state, Period::Day, date).await?;

    let totals: VoucherTotals = voucher_details
        .iter()
        .map(|v| (v.voucher_type, v.amount))
        .collect();

    Ok(ApiResponse::success(
        "Bons du jour",
        DailyVoucherDetails {
            date,
            cash_in: totals.inflow(),
            cash_out: totals.outflow(),
            voucher_details,
        },
        None,
    ))
}

/// Processed vouchers of the window, oldest first.
pub async fn processed_vouchers_between(
    state: &AppState,
    period: Period,
    date: chrono::NaiveDate,
) -> AppResult<Vec<VoucherDetail>> {
    let window = CashWindow::new(period, date, state.offset)?;
    Vouchers::find()
        .filter(Column::Status.eq(VoucherStatus::Processed.as_str()))
        .filter(Column::ProcessedAt.gte(window.start))
        .filter(Column::ProcessedAt.lt(window.end))
        .order_by_asc(Column::ProcessedAt)
        .all(&state.orm)
        .await?
        .into_iter()
        .map(|model| {
            let voucher = voucher_from_entity(model)?;
            Ok(VoucherDetail {
                id: voucher.id,
                voucher_number: voucher.voucher_number,
                voucher_type: voucher.voucher_type,
                amount: voucher.amount,
                description: voucher.description,
                processed_at: voucher.processed_at,
            })
        })
        .collect()
}
