use chrono::{DateTime, Datelike, NaiveDate, Utc};
use sea_orm::ActiveValue::NotSet;
use sea_orm::{ActiveModelTrait, EntityTrait, PaginatorTrait, QueryOrder, Set, SqlErr};
use uuid::Uuid;

use crate::{
    domain::{OrderStatus, Period, VoucherType},
    dto::{
        payments::DateQuery,
        reports::{
            BilanLine, BilanReport, CloseDayRequest, DashboardStats, LimitQuery, MonthlySales,
            ProductProfit, RecentPayment, RecentTransaction, TopProduct, TransactionKind,
            YearQuery,
        },
    },
    entity::{
        cash_closings::{ActiveModel as ClosingActive, Column as ClosingCol, Entity as CashClosings},
        orders::Entity as Orders,
        products::Entity as Products,
        vouchers::Entity as Vouchers,
    },
    error::{AppError, AppResult},
    format::month_short_name,
    middleware::auth::{AuthUser, ensure_admin, ensure_any_role},
    models::CashClosing,
    response::{ApiResponse, Meta},
    services::{
        cash_service::{CashWindow, cash_snapshot, payments_total, processed_voucher_totals},
        mapping::cash_closing_from_entity,
        payment_service::CASH_ROLES,
        voucher_service::processed_vouchers_between,
    },
    state::AppState,
};

const DEFAULT_TOP_PRODUCTS: i64 = 5;
const DEFAULT_RECENT_PAYMENTS: i64 = 10;

pub async fn bilan(
    state: &AppState,
    user: &AuthUser,
    query: DateQuery,
) -> AppResult<ApiResponse<BilanReport>> {
    ensure_any_role(user, CASH_ROLES)?;
    let date = query.date.unwrap_or_else(|| state.today());
    let window = CashWindow::new(Period::Day, date, state.offset)?;

    let payments: Vec<(String, i64)> = sqlx::query_as(
        r#"
        SELECT o.invoice_number, p.amount
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
    let payments: Vec<BilanLine> = payments
        .into_iter()
        .map(|(reference, amount)| BilanLine { reference, amount })
        .collect();

    let mut entry_vouchers = Vec::new();
    let mut output_vouchers = Vec::new();
    let mut expense_vouchers = Vec::new();
    for voucher in processed_vouchers_between(state, Period::Day, date).await? {
        let line = BilanLine {
            reference: voucher.voucher_number,
            amount: voucher.amount,
        };
        match voucher.voucher_type {
            VoucherType::Entry => entry_vouchers.push(line),
            VoucherType::Output => output_vouchers.push(line),
            VoucherType::Expense => expense_vouchers.push(line),
        }
    }

    let snapshot = cash_snapshot(&state.pool, state.offset, Period::Day, date).await?;
    let sum = |lines: &[BilanLine]| lines.iter().map(|l| l.amount).sum::<i64>();

    let report = BilanReport {
        date,
        payments_total: sum(&payments),
        entry_total: sum(&entry_vouchers),
        output_total: sum(&output_vouchers),
        expense_total: sum(&expense_vouchers),
        payments,
        entry_vouchers,
        output_vouchers,
        expense_vouchers,
        cash_balance: snapshot.total_cash,
        previous_day_cash: snapshot.previous_day_cash,
    };
    Ok(ApiResponse::success("Bilan", report, None))
}

pub async fn dashboard_stats(
    state: &AppState,
    user: &AuthUser,
) -> AppResult<ApiResponse<DashboardStats>> {
    ensure_admin(user)?;
    let today = state.today();
    let window = CashWindow::new(Period::Day, today, state.offset)?;

    let total_sales = payments_total(&state.pool, &window).await?;
    let vouchers_breakdown = processed_voucher_totals(&state.pool, &window).await?;
    let snapshot = cash_snapshot(&state.pool, state.offset, Period::Day, today).await?;

    let products_count = Products::find().count(&state.orm).await? as i64;
    let orders_count = Orders::find().count(&state.orm).await? as i64;
    let vouchers_count = Vouchers::find().count(&state.orm).await? as i64;
    let last_reset_date = CashClosings::find()
        .order_by_desc(ClosingCol::BusinessDate)
        .one(&state.orm)
        .await?
        .map(|closing| closing.business_date);

    let stats = DashboardStats {
        total_sales,
        products_count,
        orders_count,
        vouchers_count,
        daily_cash: snapshot.drawer_cash(),
        last_reset_date,
        vouchers_breakdown,
        net_cash_flow: snapshot.total_cash,
    };
    Ok(ApiResponse::success("Statistiques", stats, None))
}

#[derive(sqlx::FromRow)]
struct TransactionRow {
    id: Uuid,
    reference: String,
    date: DateTime<Utc>,
    amount: i64,
    status: String,
    is_order: bool,
}

/// Today's invoices and vouchers, newest first.
pub async fn recent_transactions(
    state: &AppState,
    user: &AuthUser,
) -> AppResult<ApiResponse<Vec<RecentTransaction>>> {
    ensure_admin(user)?;
    let window = CashWindow::new(Period::Day, state.today(), state.offset)?;

    let rows: Vec<TransactionRow> = sqlx::query_as(
        r#"
        SELECT id, invoice_number AS reference, created_at AS date, total AS amount, status, TRUE AS is_order
        FROM orders
        WHERE created_at >= $1 AND created_at < $2
        UNION ALL
        SELECT id, voucher_number AS reference, created_at AS date, amount, status, FALSE AS is_order
        FROM vouchers
        WHERE created_at >= $1 AND created_at < $2
        ORDER BY date DESC
        "#,
    )
    .bind(window.start)
    .bind(window.end)
    .fetch_all(&state.pool)
    .await?;

    let transactions = rows
        .into_iter()
        .map(|row| RecentTransaction {
            id: row.id,
            reference: row.reference,
            date: row.date,
            amount: row.amount,
            status: row.status,
            kind: if row.is_order {
                TransactionKind::Order
            } else {
                TransactionKind::Voucher
            },
        })
        .collect();
    Ok(ApiResponse::success("Transactions du jour", transactions, None))
}

/// Persists the day's closing balance, which becomes the next day's opening cash.
pub async fn close_day(
    state: &AppState,
    user: &AuthUser,
    payload: CloseDayRequest,
) -> AppResult<ApiResponse<CashClosing>> {
    ensure_admin(user)?;
    let today = state.today();
    let date = payload.date.unwrap_or(today);
    if date > today {
        return Err(AppError::BadRequest(
            "Impossible de clôturer une date future".into(),
        ));
    }

    let snapshot = cash_snapshot(&state.pool, state.offset, Period::Day, date).await?;
    let inserted = ClosingActive {
        id: Set(Uuid::new_v4()),
        business_date: Set(date),
        closing_cash: Set(snapshot.drawer_cash()),
        closed_by: Set(user.user_id),
        created_at: NotSet,
    }
    .insert(&state.orm)
    .await;

    let closing = match inserted {
        Ok(closing) => closing,
        Err(err) if matches!(err.sql_err(), Some(SqlErr::UniqueConstraintViolation(_))) => {
            return Err(AppError::Conflict(
                "Caisse déjà clôturée pour cette date".into(),
            ));
        }
        Err(err) => return Err(err.into()),
    };

    tracing::info!(
        %date,
        closing_cash = closing.closing_cash,
        previous_day_cash = snapshot.previous_day_cash,
        "cash day closed"
    );
    Ok(ApiResponse::success(
        "Caisse clôturée",
        cash_closing_from_entity(closing),
        Some(Meta::empty()),
    ))
}

/// Paid sales per month of `year`, always twelve buckets.
pub async fn monthly_sales(
    state: &AppState,
    user: &AuthUser,
    query: YearQuery,
) -> AppResult<ApiResponse<Vec<MonthlySales>>> {
    ensure_admin(user)?;
    let year = query.year.unwrap_or_else(|| state.today().year());
    let first_day = NaiveDate::from_ymd_opt(year, 1, 1)
        .ok_or_else(|| AppError::BadRequest("Année invalide".into()))?;
    let window = CashWindow::new(Period::Year, first_day, state.offset)?;

    let rows: Vec<(i32, i64)> = sqlx::query_as(
        r#"
        SELECT EXTRACT(MONTH FROM paid_at + ($3 * INTERVAL '1 second'))::INT AS month,
               COALESCE(SUM(total), 0)::BIGINT
        FROM orders
        WHERE status = $4 AND paid_at >= $1 AND paid_at < $2
        GROUP BY 1
        "#,
    )
    .bind(window.start)
    .bind(window.end)
    .bind(state.offset.local_minus_utc())
    .bind(OrderStatus::Paid.as_str())
    .fetch_all(&state.pool)
    .await?;

    let months = (1..=12u32)
        .map(|month| MonthlySales {
            month,
            label: month_short_name(month).to_string(),
            sales: rows
                .iter()
                .find(|(m, _)| *m as u32 == month)
                .map(|(_, sales)| *sales)
                .unwrap_or(0),
        })
        .collect();
    Ok(ApiResponse::success("Ventes mensuelles", months, None))
}

pub async fn top_products(
    state: &AppState,
    user: &AuthUser,
    query: LimitQuery,
) -> AppResult<ApiResponse<Vec<TopProduct>>> {
    ensure_admin(user)?;
    let limit = query.limit.unwrap_or(DEFAULT_TOP_PRODUCTS).clamp(1, 50);
    let products: Vec<TopProduct> = sqlx::query_as(
        r#"
        SELECT oi.product_name AS name,
               SUM(oi.quantity)::BIGINT AS quantity,
               SUM(oi.total)::BIGINT AS revenue
        FROM order_items oi
        JOIN orders o ON o.id = oi.order_id
        WHERE o.status = $1
        GROUP BY oi.product_name
        ORDER BY quantity DESC, name ASC
        LIMIT $2
        "#,
    )
    .bind(OrderStatus::Paid.as_str())
    .bind(limit)
    .fetch_all(&state.pool)
    .await?;
    Ok(ApiResponse::success("Meilleures ventes", products, None))
}

pub async fn recent_payments(
    state: &AppState,
    user: &AuthUser,
    query: LimitQuery,
) -> AppResult<ApiResponse<Vec<RecentPayment>>> {
    ensure_admin(user)?;
    let limit = query.limit.unwrap_or(DEFAULT_RECENT_PAYMENTS).clamp(1, 100);
    let payments: Vec<RecentPayment> = sqlx::query_as(
        r#"
        SELECT p.id, o.invoice_number, p.amount, p.payment_method, p.created_at
        FROM payments p
        JOIN orders o ON o.id = p.order_id
        ORDER BY p.created_at DESC
        LIMIT $1
        "#,
    )
    .bind(limit)
    .fetch_all(&state.pool)
    .await?;
    Ok(ApiResponse::success("Derniers paiements", payments, None))
}

/// Margin per product on paid invoices, using the purchase price recorded on each line.
pub async fn product_profits(
    state: &AppState,
    user: &AuthUser,
) -> AppResult<ApiResponse<Vec<ProductProfit>>> {
    ensure_admin(user)?;
    let profits: Vec<ProductProfit> = sqlx::query_as(
        r#"
        SELECT p.id AS product_id,
               p.name AS product_name,
               p.purchase_price,
               p.selling_price,
               COALESCE(SUM(s.quantity), 0)::BIGINT AS quantity_sold,
               COALESCE(SUM(s.total), 0)::BIGINT AS total_revenue,
               COALESCE(SUM(s.total - s.purchase_price * s.quantity), 0)::BIGINT AS total_profit
        FROM products p
        LEFT JOIN (
            SELECT oi.product_id, oi.quantity, oi.total, oi.purchase_price
            FROM order_items oi
            JOIN orders o ON o.id = oi.order_id
            WHERE o.status = $1
        ) s ON s.product_id = p.id
        GROUP BY p.id, p.name, p.purchase_price, p.selling_price
        ORDER BY total_profit DESC, p.name ASC
        "#,
    )
    .bind(OrderStatus::Paid.as_str())
    .fetch_all(&state.pool)
    .await?;
    Ok(ApiResponse::success("Bénéfices", profits, None))
}
