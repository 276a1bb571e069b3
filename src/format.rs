//! Locale-fixed (fr-CM) display helpers.

use chrono::{DateTime, Datelike, FixedOffset, NaiveDate, Timelike};

use crate::domain::{Amount, OrderStatus, Period, VoucherStatus, VoucherType};

const GROUP_SEPARATOR: char = '\u{202f}';
const CURRENCY_SEPARATOR: char = '\u{a0}';

const MONTHS: [&str; 12] = [
    "janvier",
    "février",
    "mars",
    "avril",
    "mai",
    "juin",
    "juillet",
    "août",
    "septembre",
    "octobre",
    "novembre",
    "décembre",
];

const MONTHS_SHORT: [&str; 12] = [
    "Jan", "Fév", "Mar", "Avr", "Mai", "Juin", "Juil", "Août", "Sept", "Oct", "Nov", "Déc",
];

/// Whole francs with French digit grouping, e.g. `5 000 FCFA`.
pub fn format_xaf(amount: Amount) -> String {
    let francs = if amount >= 0 {
        (amount + 50) / 100
    } else {
        (amount - 50) / 100
    };
    let digits = francs.unsigned_abs().to_string();
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3 + 8);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(GROUP_SEPARATOR);
        }
        grouped.push(ch);
    }
    let sign = if francs < 0 { "-" } else { "" };
    format!("{sign}{grouped}{CURRENCY_SEPARATOR}FCFA")
}

pub fn month_name(month: u32) -> &'static str {
    MONTHS[(month.clamp(1, 12) - 1) as usize]
}

pub fn month_short_name(month: u32) -> &'static str {
    MONTHS_SHORT[(month.clamp(1, 12) - 1) as usize]
}

/// `14 mai 2024`
pub fn format_date_fr(date: NaiveDate) -> String {
    format!("{} {} {}", date.day(), month_name(date.month()), date.year())
}

/// `14 mai 2024 à 09:05`
pub fn format_datetime_fr(instant: DateTime<FixedOffset>) -> String {
    format!(
        "{} à {:02}:{:02}",
        format_date_fr(instant.date_naive()),
        instant.hour(),
        instant.minute()
    )
}

/// Label shown next to the cash drawer totals.
pub fn period_label(period: Period, selected: NaiveDate, today: NaiveDate) -> String {
    match period {
        Period::Day if selected != today => format_date_fr(selected),
        Period::Day => "aujourd'hui".to_string(),
        Period::Week => "cette semaine".to_string(),
        Period::Month => "ce mois".to_string(),
        Period::Year => "cette année".to_string(),
    }
}

pub fn voucher_type_label(voucher_type: VoucherType) -> &'static str {
    match voucher_type {
        VoucherType::Expense => "Dépense",
        VoucherType::Output => "Sortie",
        VoucherType::Entry => "Entrée",
    }
}

pub fn voucher_status_label(status: VoucherStatus) -> &'static str {
    match status {
        VoucherStatus::Pending => "En attente",
        VoucherStatus::Processed => "Traité",
        VoucherStatus::Rejected => "Rejeté",
    }
}

pub fn order_status_label(status: OrderStatus) -> &'static str {
    match status {
        OrderStatus::Pending => "En attente de paiement",
        OrderStatus::Paid => "Payée",
        OrderStatus::Cancelled => "Annulée",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn currency_groups_thousands_and_drops_centimes() {
        assert_eq!(format_xaf(500_000), "5\u{202f}000\u{a0}FCFA");
        assert_eq!(format_xaf(0), "0\u{a0}FCFA");
        assert_eq!(format_xaf(99_949), "999\u{a0}FCFA");
        assert_eq!(format_xaf(99_950), "1\u{202f}000\u{a0}FCFA");
        assert_eq!(format_xaf(123_456_789_00), "123\u{202f}456\u{202f}789\u{a0}FCFA");
        assert_eq!(format_xaf(-250_000), "-2\u{202f}500\u{a0}FCFA");
    }

    #[test]
    fn french_dates() {
        let date = NaiveDate::from_ymd_opt(2024, 8, 3).unwrap();
        assert_eq!(format_date_fr(date), "3 août 2024");
        let instant = DateTime::parse_from_rfc3339("2024-05-14T09:05:00+01:00").unwrap();
        assert_eq!(format_datetime_fr(instant), "14 mai 2024 à 09:05");
        assert_eq!(month_short_name(2), "Fév");
    }

    #[test]
    fn period_labels() {
        let today = NaiveDate::from_ymd_opt(2024, 5, 14).unwrap();
        let other = NaiveDate::from_ymd_opt(2024, 5, 2).unwrap();
        assert_eq!(period_label(Period::Day, today, today), "aujourd'hui");
        assert_eq!(period_label(Period::Day, other, today), "2 mai 2024");
        assert_eq!(period_label(Period::Month, other, today), "ce mois");
    }

    #[test]
    fn labels() {
        assert_eq!(voucher_type_label(VoucherType::Expense), "Dépense");
        assert_eq!(voucher_status_label(VoucherStatus::Processed), "Traité");
        assert_eq!(order_status_label(OrderStatus::Paid), "Payée");
    }
}
