use chrono::NaiveDate;

pub const INVOICE_PREFIX: &str = "INV";

/// Daily sequential document number, e.g. `INV-20240514-001`.
pub fn document_number(prefix: &str, date: NaiveDate, sequence: u32) -> String {
    format!("{}-{}-{:03}", prefix, date.format("%Y%m%d"), sequence)
}

/// Common prefix of every document issued on `date`, used to count them.
pub fn daily_prefix(prefix: &str, date: NaiveDate) -> String {
    format!("{}-{}-", prefix, date.format("%Y%m%d"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pads_sequence_to_three_digits() {
        let date = NaiveDate::from_ymd_opt(2024, 5, 14).unwrap();
        assert_eq!(document_number(INVOICE_PREFIX, date, 1), "INV-20240514-001");
        assert_eq!(document_number("DEP", date, 42), "DEP-20240514-042");
        assert_eq!(document_number("SOR", date, 1234), "SOR-20240514-1234");
        assert!(document_number("ENT", date, 7).starts_with(&daily_prefix("ENT", date)));
    }
}
