//! Drawer balance over a reporting window, shared by the cash drawer, the
//! daily bilan, the dashboard and the day closing.

use chrono::{DateTime, FixedOffset, NaiveDate, Utc};

use crate::{
    db::DbPool,
    domain::{Amount, CashSnapshot, Period, VoucherStatus, VoucherTotals, VoucherType},
    error::{AppError, AppResult},
};

#[derive(Debug, Clone, Copy)]
pub struct CashWindow {
    pub start_date: NaiveDate,
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

impl CashWindow {
    pub fn new(period: Period, date: NaiveDate, offset: FixedOffset) -> AppResult<Self> {
        let (start_date, _) = period
            .local_bounds(date)
            .ok_or_else(|| AppError::BadRequest("Date hors limites".into()))?;
        let (start, end) = period
            .window(date, offset)
            .ok_or_else(|| AppError::BadRequest("Date hors limites".into()))?;
        Ok(Self {
            start_date,
            start,
            end,
        })
    }
}

pub async fn cash_snapshot(
    pool: &DbPool,
    offset: FixedOffset,
    period: Period,
    date: NaiveDate,
) -> AppResult<CashSnapshot> {
    let window = CashWindow::new(period, date, offset)?;
    let payments_in = payments_total(pool, &window).await?;
    let vouchers = processed_voucher_totals(pool, &window).await?;
    let previous_day_cash = previous_closing(pool, window.start_date).await?;

    Ok(CashSnapshot::new(
        period,
        date,
        payments_in,
        vouchers,
        previous_day_cash,
    ))
}

pub async fn payments_total(pool: &DbPool, window: &CashWindow) -> AppResult<Amount> {
    let (total,): (i64,) = sqlx::query_as(
        "SELECT COALESCE(SUM(amount), 0)::BIGINT FROM payments WHERE created_at >= $1 AND created_at < $2",
    )
    .bind(window.start)
    .bind(window.end)
    .fetch_one(pool)
    .await?;
    Ok(total)
}

/// Only processed vouchers move cash, and they count on the day they were processed.
pub async fn processed_voucher_totals(pool: &DbPool, window: &CashWindow) -> AppResult<VoucherTotals> {
    let rows: Vec<(String, i64)> = sqlx::query_as(
        r#"
        SELECT voucher_type, COALESCE(SUM(amount), 0)::BIGINT
        FROM vouchers
        WHERE status = $1 AND processed_at >= $2 AND processed_at < $3
        GROUP BY voucher_type
        "#,
    )
    .bind(VoucherStatus::Processed.as_str())
    .bind(window.start)
    .bind(window.end)
    .fetch_all(pool)
    .await?;

    rows.into_iter()
        .map(|(voucher_type, amount)| {
            voucher_type
                .parse::<VoucherType>()
                .map(|voucher_type| (voucher_type, amount))
                .map_err(|err| AppError::Internal(anyhow::anyhow!("corrupt voucher_type: {err}")))
        })
        .collect()
}

/// Closing balance of the latest closed day strictly before `date`, or zero.
pub async fn previous_closing(pool: &DbPool, date: NaiveDate) -> AppResult<Amount> {
    let row: Option<(i64,)> = sqlx::query_as(
        "SELECT closing_cash FROM cash_closings WHERE business_date < $1 ORDER BY business_date DESC LIMIT 1",
    )
    .bind(date)
    .fetch_optional(pool)
    .await?;
    Ok(row.map(|(cash,)| cash).unwrap_or(0))
}
