use chrono::{
    DateTime, Datelike, Duration, FixedOffset, Months, NaiveDate, NaiveDateTime, NaiveTime, Utc,
};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::{Amount, VoucherType};

/// Reporting window selected in the cash drawer.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum Period {
    #[default]
    Day,
    Week,
    Month,
    Year,
}

impl Period {
    pub fn as_str(&self) -> &'static str {
        match self {
            Period::Day => "day",
            Period::Week => "week",
            Period::Month => "month",
            Period::Year => "year",
        }
    }

    /// First local day of the period containing `date`, and the first local day after it.
    pub fn local_bounds(&self, date: NaiveDate) -> Option<(NaiveDate, NaiveDate)> {
        match self {
            Period::Day => Some((date, date.succ_opt()?)),
            Period::Week => {
                let start = date - Duration::days(i64::from(date.weekday().num_days_from_monday()));
                Some((start, start + Duration::days(7)))
            }
            Period::Month => {
                let start = date.with_day(1)?;
                Some((start, start.checked_add_months(Months::new(1))?))
            }
            Period::Year => {
                let start = NaiveDate::from_ymd_opt(date.year(), 1, 1)?;
                Some((start, start.checked_add_months(Months::new(12))?))
            }
        }
    }

    /// The period as a half-open UTC interval, for a business running at `offset`.
    pub fn window(
        &self,
        date: NaiveDate,
        offset: FixedOffset,
    ) -> Option<(DateTime<Utc>, DateTime<Utc>)> {
        let (start, end) = self.local_bounds(date)?;
        Some((local_midnight_utc(start, offset), local_midnight_utc(end, offset)))
    }
}

impl std::str::FromStr for Period {
    type Err = super::DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "day" => Ok(Period::Day),
            "week" => Ok(Period::Week),
            "month" => Ok(Period::Month),
            "year" => Ok(Period::Year),
            other => Err(super::DomainError::Invalid(format!(
                "Période inconnue: {other}"
            ))),
        }
    }
}

fn local_midnight_utc(date: NaiveDate, offset: FixedOffset) -> DateTime<Utc> {
    let local: NaiveDateTime = date.and_time(NaiveTime::MIN);
    (local - Duration::seconds(i64::from(offset.local_minus_utc()))).and_utc()
}

/// Business-local calendar date of an instant.
pub fn local_date(instant: DateTime<Utc>, offset: FixedOffset) -> NaiveDate {
    instant.with_timezone(&offset).date_naive()
}

/// Processed voucher amounts grouped by type.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct VoucherTotals {
    #[serde(default)]
    pub expense: Amount,
    #[serde(default)]
    pub output: Amount,
    #[serde(default)]
    pub entry: Amount,
}

impl VoucherTotals {
    pub fn add(&mut self, voucher_type: VoucherType, amount: Amount) {
        match voucher_type {
            VoucherType::Expense => self.expense += amount,
            VoucherType::Output => self.output += amount,
            VoucherType::Entry => self.entry += amount,
        }
    }

    pub fn inflow(&self) -> Amount {
        self.entry
    }

    pub fn outflow(&self) -> Amount {
        self.expense + self.output
    }
}

impl FromIterator<(VoucherType, Amount)> for VoucherTotals {
    fn from_iter<I: IntoIterator<Item = (VoucherType, Amount)>>(iter: I) -> Self {
        let mut totals = VoucherTotals::default();
        for (voucher_type, amount) in iter {
            totals.add(voucher_type, amount);
        }
        totals
    }
}

/// Cash drawer balance for one period.
///
/// Numeric fields default to zero when absent from a payload; call
/// [`CashSnapshot::reconciled`] after deserializing so `total_cash` always
/// equals `payments_in + vouchers_in - vouchers_out`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct CashSnapshot {
    #[serde(default)]
    pub period: Period,
    pub date: NaiveDate,
    #[serde(default)]
    pub payments_in: Amount,
    #[serde(default)]
    pub vouchers_in: Amount,
    #[serde(default)]
    pub vouchers_out: Amount,
    #[serde(default)]
    pub total_cash: Amount,
    #[serde(default)]
    pub previous_day_cash: Amount,
}

impl CashSnapshot {
    pub fn new(
        period: Period,
        date: NaiveDate,
        payments_in: Amount,
        vouchers: VoucherTotals,
        previous_day_cash: Amount,
    ) -> Self {
        CashSnapshot {
            period,
            date,
            payments_in,
            vouchers_in: vouchers.inflow(),
            vouchers_out: vouchers.outflow(),
            total_cash: 0,
            previous_day_cash,
        }
        .reconciled()
    }

    pub fn reconciled(mut self) -> Self {
        self.total_cash = self.payments_in + self.vouchers_in - self.vouchers_out;
        self
    }

    /// Cash expected in the drawer once the carried-over balance is included.
    pub fn drawer_cash(&self) -> Amount {
        self.previous_day_cash + self.total_cash
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn balance_is_payments_plus_entries_minus_outflows() {
        let vouchers: VoucherTotals = [
            (VoucherType::Expense, 500_000),
            (VoucherType::Output, 120_000),
            (VoucherType::Entry, 300_000),
            (VoucherType::Expense, 80_000),
        ]
        .into_iter()
        .collect();
        let snapshot = CashSnapshot::new(Period::Day, date(2024, 5, 14), 2_000_000, vouchers, 40_000);

        assert_eq!(snapshot.vouchers_in, 300_000);
        assert_eq!(snapshot.vouchers_out, 700_000);
        assert_eq!(snapshot.total_cash, 1_600_000);
        assert_eq!(snapshot.drawer_cash(), 1_640_000);
    }

    #[test]
    fn balance_invariant_holds_for_every_period() {
        for period in [Period::Day, Period::Week, Period::Month, Period::Year] {
            for (payments, entry, expense, output) in
                [(0, 0, 0, 0), (10, 0, 25, 0), (1_000, 500, 200, 300), (7, 3, 0, 11)]
            {
                let totals = VoucherTotals { expense, output, entry };
                let s = CashSnapshot::new(period, date(2024, 2, 29), payments, totals, 0);
                assert_eq!(s.total_cash, s.payments_in + s.vouchers_in - s.vouchers_out);
            }
        }
    }

    #[test]
    fn missing_fields_default_to_zero_and_total_is_recomputed() {
        let raw = r#"{"date":"2024-05-14","payments_in":1500,"total_cash":99}"#;
        let snapshot: CashSnapshot = serde_json::from_str(raw).unwrap();
        let snapshot = snapshot.reconciled();
        assert_eq!(snapshot.period, Period::Day);
        assert_eq!(snapshot.vouchers_in, 0);
        assert_eq!(snapshot.vouchers_out, 0);
        assert_eq!(snapshot.total_cash, 1_500);
    }

    #[test]
    fn week_starts_on_monday() {
        // 2024-05-16 is a Thursday.
        let (start, end) = Period::Week.local_bounds(date(2024, 5, 16)).unwrap();
        assert_eq!(start, date(2024, 5, 13));
        assert_eq!(end, date(2024, 5, 20));
    }

    #[test]
    fn month_and_year_bounds_handle_rollover() {
        assert_eq!(
            Period::Month.local_bounds(date(2024, 12, 31)).unwrap(),
            (date(2024, 12, 1), date(2025, 1, 1))
        );
        assert_eq!(
            Period::Year.local_bounds(date(2024, 6, 1)).unwrap(),
            (date(2024, 1, 1), date(2025, 1, 1))
        );
    }

    #[test]
    fn window_shifts_local_midnight_to_utc() {
        let douala = FixedOffset::east_opt(3600).unwrap();
        let (start, end) = Period::Day.window(date(2024, 5, 14), douala).unwrap();
        assert_eq!(start.to_rfc3339(), "2024-05-13T23:00:00+00:00");
        assert_eq!(end.to_rfc3339(), "2024-05-14T23:00:00+00:00");
        assert_eq!(local_date(start, douala), date(2024, 5, 14));
    }

    #[test]
    fn period_parses_wire_names() {
        assert_eq!("month".parse::<Period>().unwrap(), Period::Month);
        assert!("quarter".parse::<Period>().is_err());
    }
}
