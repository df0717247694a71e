//! Aggregates shown on the dashboard.

use std::collections::HashSet;

use bigdecimal::BigDecimal;
use chrono::{Datelike, NaiveDate};
use serde::Serialize;

use crate::receipt::{Receipt, ReceiptStatus, ReceiptType, serialize_bigdecimal};

/// Totals over every receipt of one owner.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReceiptStats {
    pub total_receipts: usize,
    #[serde(serialize_with = "serialize_bigdecimal")]
    pub total_revenue: BigDecimal,
    /// Distinct client names across receipts
    pub active_clients: usize,
    pub physiotherapy_count: usize,
    pub pilates_count: usize,
}

impl ReceiptStats {
    pub fn from_receipts<'a>(receipts: impl IntoIterator<Item = &'a Receipt>) -> ReceiptStats {
        let mut stats = ReceiptStats {
            total_receipts: 0,
            total_revenue: BigDecimal::from(0),
            active_clients: 0,
            physiotherapy_count: 0,
            pilates_count: 0,
        };
        let mut clients = HashSet::new();
        for receipt in receipts {
            stats.total_receipts += 1;
            stats.total_revenue += receipt.total_amount();
            clients.insert(receipt.client_name().to_string());
            match receipt.receipt_type() {
                ReceiptType::Physiotherapy => stats.physiotherapy_count += 1,
                ReceiptType::Pilates => stats.pilates_count += 1,
            }
        }
        stats.active_clients = clients.len();
        stats
    }
}

/// Day and month figures for the dashboard header.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DashboardStats {
    pub today_receipts: usize,
    #[serde(serialize_with = "serialize_bigdecimal")]
    pub today_amount: BigDecimal,
    pub month_receipts: usize,
    #[serde(serialize_with = "serialize_bigdecimal")]
    pub month_amount: BigDecimal,
    /// Receipts still in draft or partially paid
    pub pending_payments: usize,
    pub total_clients: usize,
}

impl DashboardStats {
    /// Compute the dashboard figures as of `today`.
    ///
    /// The month figures count receipts issued on or after the first of `today`'s month,
    /// including any dated in the future.
    pub fn compute(receipts: &[Receipt], active_clients: usize, today: NaiveDate) -> DashboardStats {
        let month_start = today.with_day(1).unwrap_or(today);
        let mut stats = DashboardStats {
            today_receipts: 0,
            today_amount: BigDecimal::from(0),
            month_receipts: 0,
            month_amount: BigDecimal::from(0),
            pending_payments: 0,
            total_clients: active_clients,
        };
        for receipt in receipts {
            if receipt.issue_date() == today {
                stats.today_receipts += 1;
                stats.today_amount += receipt.total_amount();
            }
            if receipt.issue_date() >= month_start {
                stats.month_receipts += 1;
                stats.month_amount += receipt.total_amount();
            }
            if matches!(
                receipt.status(),
                ReceiptStatus::Draft | ReceiptStatus::Modified
            ) {
                stats.pending_payments += 1;
            }
        }
        stats
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::receipt::{ReceiptBuilder, tests::sample_receipt};

    fn physio(client: &str, day: u32, amount: i64, status: ReceiptStatus) -> Receipt {
        ReceiptBuilder::default()
            .receipt_type(ReceiptType::Physiotherapy)
            .receipt_number(format!("PHY-{day}"))
            .status(status)
            .client_name(client)
            .client_phone("9999999999")
            .issue_date(NaiveDate::from_ymd_opt(2026, 1, day).unwrap())
            .amount(BigDecimal::from(amount))
            .build()
            .unwrap()
    }

    #[test]
    fn receipt_stats_count_types_and_distinct_clients() {
        let receipts = vec![
            sample_receipt(),
            physio("Asha Patel", 3, 500, ReceiptStatus::Issued),
            physio("Ravi Shah", 4, 700, ReceiptStatus::Draft),
        ];
        let stats = ReceiptStats::from_receipts(&receipts);
        assert_eq!(stats.total_receipts, 3);
        assert_eq!(stats.total_revenue, BigDecimal::from(3000));
        assert_eq!(stats.active_clients, 2);
        assert_eq!(stats.physiotherapy_count, 2);
        assert_eq!(stats.pilates_count, 1);
    }

    #[test]
    fn stats_serialize_amounts_as_strings() {
        let receipts = vec![
            sample_receipt(),
            physio("Ravi Shah", 15, 700, ReceiptStatus::Draft),
        ];
        let json = serde_json::to_value(ReceiptStats::from_receipts(&receipts)).unwrap();
        assert_eq!(json["total_revenue"], "2500");
        assert_eq!(json["total_receipts"], 2);

        let today = NaiveDate::from_ymd_opt(2026, 1, 15).unwrap();
        let json = serde_json::to_value(DashboardStats::compute(&receipts, 2, today)).unwrap();
        assert_eq!(json["today_amount"], "2500");
        assert_eq!(json["month_amount"], "2500");
        assert_eq!(json["pending_payments"], 1);
    }

    #[test]
    fn dashboard_splits_today_month_and_pending() {
        let receipts = vec![
            physio("A", 15, 500, ReceiptStatus::Issued),
            physio("B", 15, 300, ReceiptStatus::Draft),
            physio("C", 2, 200, ReceiptStatus::Modified),
            physio("D", 1, 100, ReceiptStatus::Cancelled),
        ];
        let today = NaiveDate::from_ymd_opt(2026, 1, 15).unwrap();
        let stats = DashboardStats::compute(&receipts, 7, today);
        assert_eq!(stats.today_receipts, 2);
        assert_eq!(stats.today_amount, BigDecimal::from(800));
        assert_eq!(stats.month_receipts, 4);
        assert_eq!(stats.month_amount, BigDecimal::from(1100));
        assert_eq!(stats.pending_payments, 2);
        assert_eq!(stats.total_clients, 7);
    }
}
