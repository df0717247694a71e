//! Receipt listing filters.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::{
    receipt::{Receipt, ReceiptType},
    status::filter_status,
};

/// Criteria chosen on the receipt listing. Empty criteria match everything.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ReceiptFilter {
    /// Case-insensitive text matched against the client name or the receipt number
    #[serde(default)]
    pub search: Option<String>,
    /// `physiotherapy`, `pilates` or `all`
    #[serde(default)]
    pub receipt_type: Option<String>,
    /// A listing filter label: `Paid`, `Pending`, `Partial` or `all`
    #[serde(default)]
    pub payment_status: Option<String>,
    #[serde(default)]
    pub date_from: Option<NaiveDate>,
    #[serde(default)]
    pub date_to: Option<NaiveDate>,
}

fn selected(value: &Option<String>) -> Option<&str> {
    value
        .as_deref()
        .filter(|v| !v.is_empty() && !v.eq_ignore_ascii_case("all"))
}

impl ReceiptFilter {
    /// `true` when `receipt` satisfies every criterion that is set.
    ///
    /// An unrecognised receipt type matches nothing. Date bounds are inclusive.
    pub fn matches(&self, receipt: &Receipt) -> bool {
        if let Some(search) = self.search.as_deref().filter(|s| !s.is_empty()) {
            let needle = search.to_lowercase();
            let hit = receipt.client_name().to_lowercase().contains(&needle)
                || receipt.receipt_number().to_lowercase().contains(&needle);
            if !hit {
                return false;
            }
        }
        if let Some(kind) = selected(&self.receipt_type) {
            match kind.parse::<ReceiptType>() {
                Ok(kind) if kind == receipt.receipt_type() => {}
                _ => return false,
            }
        }
        if let Some(status) = selected(&self.payment_status) {
            if filter_status(status) != receipt.status() {
                return false;
            }
        }
        if let Some(from) = self.date_from {
            if receipt.issue_date() < from {
                return false;
            }
        }
        if let Some(to) = self.date_to {
            if receipt.issue_date() > to {
                return false;
            }
        }
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::receipt::tests::sample_receipt;

    #[test]
    fn empty_filter_matches_everything() {
        assert!(ReceiptFilter::default().matches(&sample_receipt()));
    }

    #[test]
    fn search_covers_name_and_number() {
        let receipt = sample_receipt();
        let by_name = ReceiptFilter {
            search: Some("asha".to_string()),
            ..Default::default()
        };
        let by_number = ReceiptFilter {
            search: Some("rcp-0000".to_string()),
            ..Default::default()
        };
        let miss = ReceiptFilter {
            search: Some("ravi".to_string()),
            ..Default::default()
        };
        assert!(by_name.matches(&receipt));
        assert!(by_number.matches(&receipt));
        assert!(!miss.matches(&receipt));
    }

    #[test]
    fn type_and_status_use_listing_vocabulary() {
        let receipt = sample_receipt();
        let all = ReceiptFilter {
            receipt_type: Some("all".to_string()),
            payment_status: Some("Paid".to_string()),
            ..Default::default()
        };
        let physio = ReceiptFilter {
            receipt_type: Some("Physiotherapy".to_string()),
            ..Default::default()
        };
        let pending = ReceiptFilter {
            payment_status: Some("Pending".to_string()),
            ..Default::default()
        };
        assert!(all.matches(&receipt));
        assert!(!physio.matches(&receipt));
        assert!(!pending.matches(&receipt));
    }

    #[test]
    fn date_bounds_are_inclusive() {
        let receipt = sample_receipt();
        let day = receipt.issue_date();
        let exact = ReceiptFilter {
            date_from: Some(day),
            date_to: Some(day),
            ..Default::default()
        };
        let later = ReceiptFilter {
            date_from: day.succ_opt(),
            ..Default::default()
        };
        assert!(exact.matches(&receipt));
        assert!(!later.matches(&receipt));
    }
}
