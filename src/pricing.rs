//! Discount arithmetic for receipt totals.

use bigdecimal::BigDecimal;

/// Compute the payable total for `base` after a `discount_percent` discount.
///
/// The discount is not validated here; callers clamp it to `[0, 100]` first. Whatever comes in,
/// the total never drops below zero. No rounding is applied.
///
/// # Example
/// ```rust
/// use bigdecimal::BigDecimal;
/// use receipt_pdf::pricing::total;
///
/// assert_eq!(total(&BigDecimal::from(2000), &BigDecimal::from(10)), BigDecimal::from(1800));
/// assert_eq!(total(&BigDecimal::from(100), &BigDecimal::from(150)), BigDecimal::from(0));
/// ```
pub fn total(base: &BigDecimal, discount_percent: &BigDecimal) -> BigDecimal {
    let discount = base * discount_percent / BigDecimal::from(100);
    let total = base - discount;
    let zero = BigDecimal::from(0);
    if total < zero { zero } else { total }
}

/// Clamp a discount entered on a form into `[0, 100]`.
pub fn clamp_discount(discount_percent: &BigDecimal) -> BigDecimal {
    let zero = BigDecimal::from(0);
    let hundred = BigDecimal::from(100);
    if discount_percent < &zero {
        zero
    } else if discount_percent > &hundred {
        hundred
    } else {
        discount_percent.clone()
    }
}

#[cfg(test)]
mod tests {
    use std::str::FromStr;

    use super::*;

    fn dec(s: &str) -> BigDecimal {
        BigDecimal::from_str(s).unwrap()
    }

    #[test]
    fn applies_percentage_discount() {
        assert_eq!(total(&dec("2000"), &dec("10")), dec("1800"));
        assert_eq!(total(&dec("1500"), &dec("0")), dec("1500"));
        assert_eq!(total(&dec("999"), &dec("100")), dec("0"));
    }

    #[test]
    fn keeps_fractional_totals_unrounded() {
        assert_eq!(total(&dec("333"), &dec("33.3")), dec("222.111"));
    }

    #[test]
    fn floors_at_zero_for_oversized_discounts() {
        assert_eq!(total(&dec("100"), &dec("150")), dec("0"));
    }

    #[test]
    fn negative_discount_is_passed_through() {
        assert_eq!(total(&dec("100"), &dec("-10")), dec("110"));
        assert_eq!(clamp_discount(&dec("-10")), dec("0"));
        assert_eq!(clamp_discount(&dec("150")), dec("100"));
        assert_eq!(clamp_discount(&dec("12.5")), dec("12.5"));
    }
}
