//! Receipt form input and its derivation into a persisted [`Receipt`].
//!
//! A [`ReceiptForm`] holds what the practitioner typed or picked, as text. Turning it into a
//! record runs the pricing, membership period, status and description derivations; turning a
//! record back into a form runs them in reverse for the edit screen.

use std::str::FromStr;

use bigdecimal::BigDecimal;
use chrono::{Local, NaiveDate};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::{
    description::{decode_form_fields, encode_form_ids},
    error::Error,
    membership::{self, MembershipPeriod},
    pricing,
    receipt::{PaymentMethod, Receipt, ReceiptBuilder, ReceiptType},
    status::{self, StatusView},
};

static EMAIL: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("valid regex"));
static PHONE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[0-9+\s-]{10,}$").expect("valid regex"));

/// A validation message attached to one form field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldError {
    pub field: &'static str,
    pub message: &'static str,
}

/// Raw receipt form input.
///
/// For pilates receipts `membership` and `period` hold the ids picked on the form
/// (`mat_and_apparatus`, `3_months_24_sessions`). Physiotherapy receipts use `membership` as free
/// text and leave `period` empty.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReceiptForm {
    pub receipt_type: ReceiptType,
    #[serde(default)]
    pub receipt_date: Option<NaiveDate>,
    #[serde(default)]
    pub client_name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub phone: String,
    #[serde(default)]
    pub address: String,
    #[serde(default)]
    pub membership: String,
    #[serde(default)]
    pub period: String,
    #[serde(default)]
    pub start_date: Option<NaiveDate>,
    #[serde(default)]
    pub end_date: Option<NaiveDate>,
    #[serde(default)]
    pub amount: String,
    #[serde(default)]
    pub discount: String,
    #[serde(default)]
    pub payment_mode: String,
    #[serde(default)]
    pub status: String,
    #[serde(default)]
    pub notes: String,
}

/// Parse a number typed into a form. Anything unparseable counts as zero.
fn parse_number(value: &str) -> BigDecimal {
    BigDecimal::from_str(value.trim()).unwrap_or_else(|_| BigDecimal::from(0))
}

fn non_empty(value: &str) -> Option<String> {
    if value.is_empty() {
        None
    } else {
        Some(value.to_string())
    }
}

impl ReceiptForm {
    /// An empty form for a new receipt of `receipt_type`.
    pub fn new(receipt_type: ReceiptType) -> ReceiptForm {
        ReceiptForm {
            receipt_type,
            receipt_date: None,
            client_name: String::new(),
            email: String::new(),
            phone: String::new(),
            address: String::new(),
            membership: String::new(),
            period: String::new(),
            start_date: None,
            end_date: None,
            amount: String::new(),
            discount: String::new(),
            payment_mode: String::new(),
            status: String::new(),
            notes: String::new(),
        }
    }

    /// Check the fields the form requires before submission.
    pub fn validate(&self) -> Vec<FieldError> {
        let mut errors = Vec::new();
        if self.client_name.trim().is_empty() {
            errors.push(FieldError {
                field: "client_name",
                message: "Client name is required",
            });
        }
        if !self.email.is_empty() && !EMAIL.is_match(&self.email) {
            errors.push(FieldError {
                field: "email",
                message: "Invalid email format",
            });
        }
        if self.phone.trim().is_empty() {
            errors.push(FieldError {
                field: "phone",
                message: "Phone number is required",
            });
        } else if !PHONE.is_match(&self.phone) {
            errors.push(FieldError {
                field: "phone",
                message: "Invalid phone number format",
            });
        }
        errors
    }

    /// The cadence selected by the form's period, if it has one.
    pub fn cadence(&self) -> Option<crate::receipt::MembershipType> {
        match self.receipt_type {
            ReceiptType::Pilates => membership::cadence_for(&self.period),
            ReceiptType::Physiotherapy => None,
        }
    }

    /// Recompute the end date from the start date and the selected cadence.
    ///
    /// Runs whenever either input changes. With a recognised cadence any end date already on the
    /// form is overwritten.
    pub fn apply_period(&mut self) {
        if let (Some(start), Some(cadence)) = (self.start_date, self.cadence()) {
            self.end_date = Some(membership::end_date(start, Some(cadence)));
        }
    }

    /// Payable total for the entered amount and discount. The discount is clamped to `[0, 100]`.
    pub fn total(&self) -> BigDecimal {
        let discount = pricing::clamp_discount(&parse_number(&self.discount));
        pricing::total(&parse_number(&self.amount), &discount)
    }

    /// The description stored for this form.
    pub fn description(&self) -> Option<String> {
        match self.receipt_type {
            ReceiptType::Pilates => encode_form_ids(&self.membership, &self.period),
            ReceiptType::Physiotherapy => non_empty(&self.membership),
        }
    }

    /// Derive the persisted receipt from this form.
    ///
    /// # Errors
    /// [`Error`] of kind validation if a required field is missing or malformed, or if the
    /// derived record breaks a receipt invariant.
    pub fn into_receipt(mut self, owner_id: &str, receipt_number: &str) -> Result<Receipt, Error> {
        let errors = self.validate();
        if !errors.is_empty() {
            let messages: Vec<&str> = errors.iter().map(|e| e.message).collect();
            return Err(Error::validation(messages.join("; ")));
        }
        self.apply_period();

        let amount = parse_number(&self.amount);
        let total = self.total();
        let status = status::forward(&self.status);
        debug!(%amount, %total, %status, "derived receipt fields from form");

        let mut builder = ReceiptBuilder::default()
            .owner_id(owner_id)
            .receipt_type(self.receipt_type)
            .receipt_number(receipt_number)
            .status(status)
            .client_name(self.client_name.clone())
            .client_phone(self.phone.clone())
            .issue_date(self.receipt_date.unwrap_or_else(|| Local::now().date_naive()))
            .amount(amount)
            .total_amount(total)
            .payment_method(PaymentMethod::from_form_label(&self.payment_mode));
        if let Some(email) = non_empty(&self.email) {
            builder = builder.client_email(email);
        }
        if let Some(address) = non_empty(&self.address) {
            builder = builder.client_address(address);
        }
        if let Some(cadence) = self.cadence() {
            builder = builder.membership_type(cadence);
        }
        if let Some(description) = self.description() {
            builder = builder.description(description);
        }
        if let Some(start) = self.start_date {
            builder = builder.membership_start_date(start);
        }
        if let Some(end) = self.end_date {
            builder = builder.membership_end_date(end);
        }
        if let Some(notes) = non_empty(&self.notes) {
            builder = builder.notes(notes);
        }
        builder
            .build()
            .map_err(|e| Error::validation(e.to_string()))
    }

    /// Re-populate a form from a stored receipt for editing.
    ///
    /// A pilates description that does not decode leaves its selections empty; the period then
    /// falls back to the stored cadence's default period.
    pub fn from_receipt(receipt: &Receipt) -> ReceiptForm {
        let (membership, period) = match receipt.receipt_type() {
            ReceiptType::Pilates => {
                let selection = decode_form_fields(receipt.description());
                let period = if selection.period.is_empty() {
                    receipt
                        .membership_type()
                        .map(|c| MembershipPeriod::default_for(c).id().to_string())
                        .unwrap_or_default()
                } else {
                    selection.period
                };
                (selection.membership, period)
            }
            ReceiptType::Physiotherapy => (
                receipt.description().unwrap_or_default().to_string(),
                String::new(),
            ),
        };
        ReceiptForm {
            receipt_type: receipt.receipt_type(),
            receipt_date: Some(receipt.issue_date()),
            client_name: receipt.client_name().to_string(),
            email: receipt.client_email().unwrap_or_default().to_string(),
            phone: receipt.client_phone().to_string(),
            address: receipt.client_address().unwrap_or_default().to_string(),
            membership,
            period,
            start_date: receipt.membership_start_date(),
            end_date: receipt.membership_end_date(),
            amount: receipt.amount().to_string(),
            discount: receipt
                .implied_discount_percent()
                .map(|d| d.to_string())
                .unwrap_or_default(),
            payment_mode: receipt.payment_method().form_label().to_string(),
            status: status::reverse(receipt.status(), StatusView::Form).to_string(),
            notes: receipt.notes().unwrap_or_default().to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::receipt::{MembershipType, ReceiptStatus};

    fn pilates_form() -> ReceiptForm {
        ReceiptForm {
            receipt_date: NaiveDate::from_ymd_opt(2026, 1, 15),
            client_name: "Asha Patel".to_string(),
            email: "asha@example.com".to_string(),
            phone: "98799 73439".to_string(),
            membership: "mat_and_apparatus".to_string(),
            period: "3_months_24_sessions".to_string(),
            start_date: NaiveDate::from_ymd_opt(2026, 1, 15),
            end_date: NaiveDate::from_ymd_opt(2030, 1, 1),
            amount: "2000".to_string(),
            discount: "10".to_string(),
            payment_mode: "UPI".to_string(),
            status: "paid".to_string(),
            ..ReceiptForm::new(ReceiptType::Pilates)
        }
    }

    #[test]
    fn validation_reports_each_bad_field() {
        let mut form = ReceiptForm::new(ReceiptType::Physiotherapy);
        form.email = "not-an-email".to_string();
        let fields: Vec<&str> = form.validate().iter().map(|e| e.field).collect();
        assert_eq!(fields, vec!["client_name", "email", "phone"]);

        form.client_name = "Ravi".to_string();
        form.email.clear();
        form.phone = "12345".to_string();
        let errors = form.validate();
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].message, "Invalid phone number format");
    }

    #[test]
    fn pilates_form_derives_every_persisted_field() {
        let receipt = pilates_form().into_receipt("owner-1", "RCP-00007").unwrap();
        assert_eq!(receipt.receipt_number(), "RCP-00007");
        assert_eq!(receipt.status(), ReceiptStatus::Issued);
        assert_eq!(receipt.total_amount(), &BigDecimal::from(1800));
        assert_eq!(receipt.payment_method(), PaymentMethod::Upi);
        assert_eq!(receipt.membership_type(), Some(MembershipType::Quarterly));
        assert_eq!(
            receipt.description(),
            Some("Mat and Apparatus (3 Months - 24 Sessions)")
        );
        // a recognised cadence overwrites the end date typed on the form
        assert_eq!(
            receipt.membership_end_date(),
            NaiveDate::from_ymd_opt(2026, 4, 14)
        );
        assert_eq!(receipt.client_address(), None);
    }

    #[test]
    fn discount_is_clamped_before_pricing() {
        let mut form = pilates_form();
        form.discount = "150".to_string();
        assert_eq!(form.total(), BigDecimal::from(0));
        form.discount = "abc".to_string();
        assert_eq!(form.total(), BigDecimal::from(2000));
    }

    #[test]
    fn physiotherapy_keeps_free_text_and_end_date() {
        let mut form = pilates_form();
        form.receipt_type = ReceiptType::Physiotherapy;
        form.membership = "Knee rehab, 10 sessions".to_string();
        form.status = "unpaid".to_string();
        let receipt = form.into_receipt("owner-1", "PHY-1").unwrap();
        assert_eq!(receipt.description(), Some("Knee rehab, 10 sessions"));
        assert_eq!(receipt.membership_type(), None);
        assert_eq!(
            receipt.membership_end_date(),
            NaiveDate::from_ymd_opt(2030, 1, 1)
        );
        assert_eq!(receipt.status(), ReceiptStatus::Draft);
    }

    #[test]
    fn invalid_form_is_rejected() {
        let mut form = pilates_form();
        form.client_name = "  ".to_string();
        let err = form.into_receipt("owner-1", "RCP-1").unwrap_err();
        assert!(!err.is_store());
        assert_eq!(err.to_string(), "Client name is required");
    }

    #[test]
    fn edit_form_round_trips_an_encoded_receipt() {
        let receipt = pilates_form().into_receipt("owner-1", "RCP-00007").unwrap();
        let form = ReceiptForm::from_receipt(&receipt);
        assert_eq!(form.membership, "mat_and_apparatus");
        assert_eq!(form.period, "3_months_24_sessions");
        assert_eq!(form.discount, "10");
        assert_eq!(form.payment_mode, "UPI");
        assert_eq!(form.status, "paid");
    }

    #[test]
    fn edit_form_loses_hand_typed_descriptions() {
        let mut form = pilates_form();
        form.membership = String::new();
        form.period = String::new();
        let receipt = form.into_receipt("owner-1", "RCP-1").unwrap();
        assert_eq!(receipt.description(), None);

        let hand_typed = ReceiptBuilder::default()
            .receipt_type(ReceiptType::Pilates)
            .receipt_number("RCP-2")
            .status(ReceiptStatus::Issued)
            .client_name("Asha Patel")
            .client_phone("98799 73439")
            .issue_date(NaiveDate::from_ymd_opt(2026, 1, 15).unwrap())
            .amount(BigDecimal::from(2000))
            .membership_type(MembershipType::Annual)
            .description("Morning batch, hand-typed")
            .build()
            .unwrap();
        let form = ReceiptForm::from_receipt(&hand_typed);
        assert_eq!(form.membership, "");
        assert_eq!(form.period, "12_months");
        assert_eq!(form.discount, "0");
    }
}
