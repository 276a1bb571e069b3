use super::{DomainError, DomainResult};

/// Money in minor units (centimes of XAF).
pub type Amount = i64;

/// Total of one sale line after discount, rounded half-up to the centime.
///
/// `discount` is a percentage in `0..=100`; callers validate it first.
/// Fails when the result does not fit in an [`Amount`].
pub fn line_total(unit_price: Amount, quantity: i32, discount: i32) -> DomainResult<Amount> {
    let gross = i128::from(unit_price) * i128::from(quantity) * i128::from(100 - discount);
    let rounded = if gross >= 0 {
        (gross + 50) / 100
    } else {
        (gross - 50) / 100
    };
    Amount::try_from(rounded).map_err(|_| DomainError::Invalid("Montant de ligne hors limites".into()))
}

/// Sum of line totals, as shown at the bottom of an invoice.
pub fn order_total<I>(lines: I) -> Amount
where
    I: IntoIterator<Item = Amount>,
{
    lines.into_iter().sum()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn no_discount_is_price_times_quantity() {
        assert_eq!(line_total(150_000, 3, 0), Ok(450_000));
    }

    #[test]
    fn full_discount_is_free() {
        assert_eq!(line_total(150_000, 3, 100), Ok(0));
    }

    #[test]
    fn discount_rounds_half_up_to_the_centime() {
        // 33.33 * 1 * 0.85 = 28.3305 -> 28.33
        assert_eq!(line_total(3_333, 1, 15), Ok(2_833));
        // 0.05 * 1 * 0.90 = 0.045 -> 0.05
        assert_eq!(line_total(5, 1, 10), Ok(5));
        // 12.99 * 7 * 0.67 = 60.9231 -> 60.92
        assert_eq!(line_total(1_299, 7, 33), Ok(6_092));
    }

    #[test]
    fn matches_rounded_float_formula_across_discounts() {
        for discount in 0..=100 {
            for quantity in 1..=12 {
                let unit_price = 2_499;
                let expected = (unit_price as f64 / 100.0
                    * quantity as f64
                    * (1.0 - discount as f64 / 100.0)
                    * 100.0)
                    .round() as Amount;
                let got = line_total(unit_price, quantity, discount).unwrap();
                assert!(
                    (got - expected).abs() <= 1,
                    "discount={discount} quantity={quantity} got={got} expected={expected}"
                );
            }
        }
    }

    #[test]
    fn line_total_rejects_amounts_that_overflow() {
        assert!(matches!(
            line_total(Amount::MAX, 2, 0),
            Err(DomainError::Invalid(_))
        ));
        assert!(line_total(Amount::MAX, 1, 0).is_ok());
    }

    #[test]
    fn order_total_sums_lines() {
        assert_eq!(order_total([100, 250, 0]), 350);
        assert_eq!(order_total(Vec::<Amount>::new()), 0);
    }
}
