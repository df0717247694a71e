//! Amount-in-words conversion for Indian rupee receipts.
//!
//! The integer part is split into crore (10,000,000), lakh (100,000), thousand and a final group
//! below one thousand. Paise are the fractional part rounded to two digits.

use bigdecimal::{BigDecimal, RoundingMode, ToPrimitive};

const ONES: [&str; 20] = [
    "", "One", "Two", "Three", "Four", "Five", "Six", "Seven", "Eight", "Nine", "Ten", "Eleven",
    "Twelve", "Thirteen", "Fourteen", "Fifteen", "Sixteen", "Seventeen", "Eighteen", "Nineteen",
];

const TENS: [&str; 10] = [
    "", "", "Twenty", "Thirty", "Forty", "Fifty", "Sixty", "Seventy", "Eighty", "Ninety",
];

const SCALES: [(u64, &str); 3] = [
    (10_000_000, "Crore"),
    (100_000, "Lakh"),
    (1_000, "Thousand"),
];

/// Words for a number below one thousand. Zero yields an empty string.
fn below_thousand(n: u64) -> String {
    match n {
        0 => String::new(),
        1..=19 => ONES[n as usize].to_string(),
        20..=99 => {
            let ones = n % 10;
            if ones == 0 {
                TENS[(n / 10) as usize].to_string()
            } else {
                format!("{} {}", TENS[(n / 10) as usize], ONES[ones as usize])
            }
        }
        _ => {
            let rest = n % 100;
            let hundreds = format!("{} Hundred", ONES[(n / 100) as usize]);
            if rest == 0 {
                hundreds
            } else {
                format!("{hundreds} And {}", below_thousand(rest))
            }
        }
    }
}

/// Words for a whole number using Indian grouping, without any currency suffix.
fn integer_words(mut n: u64) -> String {
    let mut parts: Vec<String> = Vec::new();
    for (size, name) in SCALES {
        if n >= size {
            // a crore count above 999 is spelled recursively ("One Hundred Crore")
            let count = n / size;
            let words = if count >= 1_000 {
                integer_words(count)
            } else {
                below_thousand(count)
            };
            parts.push(format!("{words} {name}"));
            n %= size;
        }
    }
    if n > 0 {
        parts.push(below_thousand(n));
    }
    parts.join(" ").trim().to_string()
}

/// Convert a rupee amount to Indian-English words.
///
/// Negative amounts are spelled by magnitude. A zero amount reads "Zero Rupees Only".
///
/// An amount below one rupee reads "Zero Rupees And Seventy Five Paise Only" for `0.75`. The
/// plain grouping rules would leave the rupee part empty ("Rupees And Seventy Five Paise
/// Only"); this function names zero rupees instead.
///
/// # Example
/// ```rust
/// use bigdecimal::BigDecimal;
/// use receipt_pdf::words::amount_in_words;
/// use std::str::FromStr;
///
/// let amount = BigDecimal::from_str("100000.50").unwrap();
/// assert_eq!(amount_in_words(&amount), "One Lakh Rupees And Fifty Paise Only");
/// ```
pub fn amount_in_words(amount: &BigDecimal) -> String {
    let amount = amount.abs();
    if amount == BigDecimal::from(0) {
        return String::from("Zero Rupees Only");
    }
    let rupees = amount.with_scale_round(0, RoundingMode::Floor);
    let paise = ((&amount - &rupees) * BigDecimal::from(100))
        .with_scale_round(0, RoundingMode::HalfUp)
        .to_u64()
        .unwrap_or(0);
    let rupees = rupees.to_u64().unwrap_or(0);

    let mut result = if rupees == 0 {
        String::from("Zero")
    } else {
        integer_words(rupees)
    };
    result.push_str(" Rupees");
    if paise > 0 {
        result.push_str(" And ");
        result.push_str(&below_thousand(paise));
        result.push_str(" Paise");
    }
    result.push_str(" Only");
    result
}
