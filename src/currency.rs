//! Indian-locale amount formatting.
//!
//! Amounts are grouped the way `en-IN` does it: the last three integer digits form one group and
//! every group above that has two digits (`12,34,567`). Rounding happens here and only here.

use bigdecimal::{BigDecimal, RoundingMode};

/// Group the digits of a non-negative integer string using Indian lakh/crore grouping.
fn group_indian(digits: &str) -> String {
    if digits.len() <= 3 {
        return digits.to_string();
    }
    let (head, tail) = digits.split_at(digits.len() - 3);
    let mut groups: Vec<&str> = Vec::new();
    let mut end = head.len();
    while end > 2 {
        groups.push(&head[end - 2..end]);
        end -= 2;
    }
    groups.push(&head[..end]);
    groups.reverse();
    format!("{},{tail}", groups.join(","))
}

/// Split a rounded amount into its sign, integer digits and fraction digits.
fn split_rounded(amount: &BigDecimal, scale: i64) -> (bool, String, String) {
    let rounded = amount.with_scale_round(scale, RoundingMode::HalfUp);
    let negative = rounded < BigDecimal::from(0);
    let text = rounded.abs().to_string();
    match text.split_once('.') {
        Some((int, frac)) => (negative, int.to_string(), frac.to_string()),
        None => (negative, text, String::new()),
    }
}

/// Format a decimal with Indian digit grouping and exactly two fraction digits.
///
/// # Example
/// ```rust
/// use bigdecimal::BigDecimal;
/// use receipt_pdf::currency::format_decimal;
/// use std::str::FromStr;
///
/// let amount = BigDecimal::from_str("1234567.5").unwrap();
/// assert_eq!(format_decimal(&amount), "12,34,567.50");
/// ```
pub fn format_decimal(amount: &BigDecimal) -> String {
    let (negative, int, frac) = split_rounded(amount, 2);
    let sign = if negative { "-" } else { "" };
    format!("{sign}{}.{frac:0<2}", group_indian(&int))
}

/// Format an amount the way it appears in document tables, e.g. `Rs. 1,800.00`.
pub fn format_inr(amount: &BigDecimal) -> String {
    format!("Rs. {}", format_decimal(amount))
}

/// Format an amount with Indian grouping and only the fraction digits it needs (at most three),
/// the way a plain `en-IN` number renders in a chat message: `1,800` or `1,800.5`.
pub fn format_grouped(amount: &BigDecimal) -> String {
    let (negative, int, frac) = split_rounded(amount, 3);
    let sign = if negative { "-" } else { "" };
    let frac = frac.trim_end_matches('0');
    if frac.is_empty() {
        format!("{sign}{}", group_indian(&int))
    } else {
        format!("{sign}{}.{frac}", group_indian(&int))
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
    fn groups_by_lakh_and_crore() {
        assert_eq!(format_decimal(&dec("0")), "0.00");
        assert_eq!(format_decimal(&dec("999")), "999.00");
        assert_eq!(format_decimal(&dec("1000")), "1,000.00");
        assert_eq!(format_decimal(&dec("100000")), "1,00,000.00");
        assert_eq!(format_decimal(&dec("123456789.123")), "12,34,56,789.12");
    }

    #[test]
    fn rounds_half_up_at_display_time() {
        assert_eq!(format_inr(&dec("1799.995")), "Rs. 1,800.00");
        assert_eq!(format_inr(&dec("0.005")), "Rs. 0.01");
    }

    #[test]
    fn negative_amounts_keep_their_sign() {
        assert_eq!(format_decimal(&dec("-200")), "-200.00");
    }

    #[test]
    fn grouped_drops_trailing_zero_fraction() {
        assert_eq!(format_grouped(&dec("1800")), "1,800");
        assert_eq!(format_grouped(&dec("1800.50")), "1,800.5");
        assert_eq!(format_grouped(&dec("250000.125")), "2,50,000.125");
    }
}
