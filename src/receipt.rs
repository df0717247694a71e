//! Receipt domain types and serialization helpers.
//!
//! This module defines the persisted [`Receipt`] record together with the small enums stored
//! alongside it. Amounts are kept as [`BigDecimal`] and serialized as strings so that nothing is
//! lost between the form, the store and the rendered document. The builder validates the record
//! invariants (`total_amount <= amount`, membership start on or before its end) before a record
//! can exist.

use std::{fmt, str::FromStr};

use bigdecimal::{BigDecimal, RoundingMode};
use chrono::{DateTime, FixedOffset, Local, NaiveDate};
use derive_builder::Builder;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

pub(crate) fn serialize_bigdecimal<S>(value: &BigDecimal, serializer: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    serializer.serialize_str(&value.to_string())
}

fn deserialize_bigdecimal<'de, D>(deserializer: D) -> Result<BigDecimal, D::Error>
where
    D: Deserializer<'de>,
{
    let s = String::deserialize(deserializer)?;
    BigDecimal::from_str(&s).map_err(serde::de::Error::custom)
}

fn serialize_datetime<S>(value: &DateTime<FixedOffset>, serializer: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    serializer.serialize_str(&value.to_rfc3339())
}

fn deserialize_datetime<'de, D>(deserializer: D) -> Result<DateTime<FixedOffset>, D::Error>
where
    D: Deserializer<'de>,
{
    let s = String::deserialize(deserializer)?;
    DateTime::parse_from_rfc3339(&s).map_err(serde::de::Error::custom)
}

fn default_created_at() -> DateTime<FixedOffset> {
    Local::now().into()
}

/// The two services the practice issues receipts for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReceiptType {
    Physiotherapy,
    Pilates,
}

impl ReceiptType {
    /// Prefix used by locally synthesized receipt numbers.
    pub fn number_prefix(&self) -> &'static str {
        match self {
            ReceiptType::Physiotherapy => "PHY",
            ReceiptType::Pilates => "PIL",
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ReceiptType::Physiotherapy => "physiotherapy",
            ReceiptType::Pilates => "pilates",
        }
    }
}

impl FromStr for ReceiptType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "physiotherapy" => Ok(ReceiptType::Physiotherapy),
            "pilates" => Ok(ReceiptType::Pilates),
            other => Err(format!("unknown receipt type '{other}'")),
        }
    }
}

/// Persisted lifecycle state of a receipt. UI vocabularies are mapped onto these four values by
/// [`crate::status`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReceiptStatus {
    Draft,
    Issued,
    Modified,
    Cancelled,
}

impl ReceiptStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ReceiptStatus::Draft => "draft",
            ReceiptStatus::Issued => "issued",
            ReceiptStatus::Modified => "modified",
            ReceiptStatus::Cancelled => "cancelled",
        }
    }
}

impl fmt::Display for ReceiptStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ReceiptStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "draft" => Ok(ReceiptStatus::Draft),
            "issued" => Ok(ReceiptStatus::Issued),
            "modified" => Ok(ReceiptStatus::Modified),
            "cancelled" => Ok(ReceiptStatus::Cancelled),
            other => Err(format!("unknown receipt status '{other}'")),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PaymentMethod {
    Cash,
    Card,
    Upi,
    BankTransfer,
    Other,
}

impl PaymentMethod {
    /// Map a payment mode typed or picked on a receipt form to the persisted method.
    ///
    /// Matching is case-insensitive. Card aliases and Indian bank rails (NEFT, RTGS) are folded in;
    /// anything unrecognised becomes [`PaymentMethod::Other`].
    pub fn from_form_label(label: &str) -> PaymentMethod {
        match label.to_lowercase().as_str() {
            "cash" => PaymentMethod::Cash,
            "card" | "credit card" | "debit card" => PaymentMethod::Card,
            "upi" => PaymentMethod::Upi,
            "bank transfer" | "neft" | "rtgs" => PaymentMethod::BankTransfer,
            _ => PaymentMethod::Other,
        }
    }

    /// Label used to re-populate a receipt form. Unmapped methods show as cash.
    pub fn form_label(&self) -> &'static str {
        match self {
            PaymentMethod::Cash => "Cash",
            PaymentMethod::Card => "Card",
            PaymentMethod::Upi => "UPI",
            PaymentMethod::BankTransfer => "Bank Transfer",
            PaymentMethod::Other => "Cash",
        }
    }

    /// Label shown on the receipt detail view.
    pub fn detail_label(&self) -> &'static str {
        match self {
            PaymentMethod::Other => "Other",
            method => method.form_label(),
        }
    }

    /// Label printed in the "Mode of Payment" column of the document.
    pub fn document_label(&self) -> &'static str {
        match self {
            PaymentMethod::Cash => "CASH",
            PaymentMethod::Card => "CARD",
            PaymentMethod::Upi => "UPI",
            PaymentMethod::BankTransfer => "BANK TRANSFER",
            PaymentMethod::Other => "CASH",
        }
    }
}

/// Membership cadence. Drives the automatic end date of a membership.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MembershipType {
    Monthly,
    Quarterly,
    Annual,
}

impl MembershipType {
    /// Number of calendar months covered by one membership of this cadence.
    pub fn months(&self) -> u32 {
        match self {
            MembershipType::Monthly => 1,
            MembershipType::Quarterly => 3,
            MembershipType::Annual => 12,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            MembershipType::Monthly => "monthly",
            MembershipType::Quarterly => "quarterly",
            MembershipType::Annual => "annual",
        }
    }

    /// Lenient parse used for cadences arriving from forms. Unknown values yield `None`.
    pub fn parse(value: &str) -> Option<MembershipType> {
        match value.trim().to_lowercase().as_str() {
            "monthly" => Some(MembershipType::Monthly),
            "quarterly" => Some(MembershipType::Quarterly),
            "annual" => Some(MembershipType::Annual),
            _ => None,
        }
    }
}

/// A persisted receipt.
///
/// Receipts are written wholesale on create and on every edit; there is no version column, so two
/// concurrent edits of the same receipt resolve as last write wins. Deserialization goes through
/// [`ReceiptBuilder::build`], so a stored record that breaks an invariant fails to load.
#[derive(Debug, Clone, PartialEq, Builder, Serialize, Deserialize)]
#[builder(setter(strip_option, into), pattern = "owned", build_fn(skip))]
#[serde(try_from = "ReceiptRecord")]
pub struct Receipt {
    id: String,
    owner_id: String,
    receipt_type: ReceiptType,
    receipt_number: String,
    status: ReceiptStatus,
    client_name: String,
    client_phone: String,
    client_email: Option<String>,
    client_address: Option<String>,
    issue_date: NaiveDate,
    #[serde(serialize_with = "serialize_bigdecimal")]
    amount: BigDecimal,
    #[serde(serialize_with = "serialize_bigdecimal")]
    total_amount: BigDecimal,
    payment_method: PaymentMethod,
    membership_type: Option<MembershipType>,
    description: Option<String>,
    membership_start_date: Option<NaiveDate>,
    membership_end_date: Option<NaiveDate>,
    notes: Option<String>,
    #[serde(serialize_with = "serialize_datetime")]
    created_at: DateTime<FixedOffset>,
    updated_at: Option<DateTime<FixedOffset>>,
}

/// Wire shape of a [`Receipt`] before its invariants are checked.
#[derive(Deserialize)]
struct ReceiptRecord {
    #[serde(default)]
    id: String,
    #[serde(default)]
    owner_id: String,
    receipt_type: ReceiptType,
    receipt_number: String,
    status: ReceiptStatus,
    client_name: String,
    client_phone: String,
    #[serde(default)]
    client_email: Option<String>,
    #[serde(default)]
    client_address: Option<String>,
    issue_date: NaiveDate,
    #[serde(deserialize_with = "deserialize_bigdecimal")]
    amount: BigDecimal,
    #[serde(deserialize_with = "deserialize_bigdecimal")]
    total_amount: BigDecimal,
    payment_method: PaymentMethod,
    #[serde(default)]
    membership_type: Option<MembershipType>,
    #[serde(default)]
    description: Option<String>,
    #[serde(default)]
    membership_start_date: Option<NaiveDate>,
    #[serde(default)]
    membership_end_date: Option<NaiveDate>,
    #[serde(default)]
    notes: Option<String>,
    #[serde(
        deserialize_with = "deserialize_datetime",
        default = "default_created_at"
    )]
    created_at: DateTime<FixedOffset>,
    #[serde(default)]
    updated_at: Option<DateTime<FixedOffset>>,
}

impl TryFrom<ReceiptRecord> for Receipt {
    type Error = ReceiptBuilderError;

    fn try_from(record: ReceiptRecord) -> Result<Self, Self::Error> {
        let mut builder = ReceiptBuilder::default()
            .id(record.id)
            .owner_id(record.owner_id)
            .receipt_type(record.receipt_type)
            .receipt_number(record.receipt_number)
            .status(record.status)
            .client_name(record.client_name)
            .client_phone(record.client_phone)
            .issue_date(record.issue_date)
            .amount(record.amount)
            .total_amount(record.total_amount)
            .payment_method(record.payment_method)
            .created_at(record.created_at);
        if let Some(email) = record.client_email {
            builder = builder.client_email(email);
        }
        if let Some(address) = record.client_address {
            builder = builder.client_address(address);
        }
        if let Some(membership_type) = record.membership_type {
            builder = builder.membership_type(membership_type);
        }
        if let Some(description) = record.description {
            builder = builder.description(description);
        }
        if let Some(start) = record.membership_start_date {
            builder = builder.membership_start_date(start);
        }
        if let Some(end) = record.membership_end_date {
            builder = builder.membership_end_date(end);
        }
        if let Some(notes) = record.notes {
            builder = builder.notes(notes);
        }
        if let Some(updated_at) = record.updated_at {
            builder = builder.updated_at(updated_at);
        }
        builder.build()
    }
}

impl ReceiptBuilder {
    /// Validate builder fields and produce a [`Receipt`].
    ///
    /// Missing optional fields are filled with reasonable defaults:
    /// * `id` and `owner_id` default to empty strings; the store assigns the id on insert.
    /// * `payment_method` defaults to [`PaymentMethod::Cash`].
    /// * `total_amount` defaults to `amount`.
    /// * `created_at` defaults to [`Local::now`].
    ///
    /// # Errors
    /// * [`ReceiptBuilderError::UninitializedField`] if required fields are missing
    /// * [`ReceiptBuilderError::ValidationError`] if an amount is negative, the total exceeds the
    ///   base amount, or the membership ends before it starts
    ///
    /// # Example
    /// ```rust
    /// use bigdecimal::BigDecimal;
    /// use chrono::NaiveDate;
    /// use receipt_pdf::{ReceiptBuilder, ReceiptStatus, ReceiptType};
    ///
    /// let receipt = ReceiptBuilder::default()
    ///     .receipt_type(ReceiptType::Pilates)
    ///     .receipt_number("RCP-00001")
    ///     .status(ReceiptStatus::Issued)
    ///     .client_name("Asha Patel")
    ///     .client_phone("98799 73439")
    ///     .issue_date(NaiveDate::from_ymd_opt(2026, 1, 15).unwrap())
    ///     .amount(BigDecimal::from(2000))
    ///     .total_amount(BigDecimal::from(1800))
    ///     .build()
    ///     .unwrap();
    /// assert_eq!(receipt.discount_implied(), BigDecimal::from(200));
    /// ```
    pub fn build(self) -> Result<Receipt, ReceiptBuilderError> {
        let receipt_type = self
            .receipt_type
            .ok_or(ReceiptBuilderError::UninitializedField("receipt_type"))?;
        let receipt_number = self
            .receipt_number
            .ok_or(ReceiptBuilderError::UninitializedField("receipt_number"))?;
        let status = self
            .status
            .ok_or(ReceiptBuilderError::UninitializedField("status"))?;
        let client_name = self
            .client_name
            .ok_or(ReceiptBuilderError::UninitializedField("client_name"))?;
        let client_phone = self
            .client_phone
            .ok_or(ReceiptBuilderError::UninitializedField("client_phone"))?;
        let issue_date = self
            .issue_date
            .ok_or(ReceiptBuilderError::UninitializedField("issue_date"))?;
        let amount = self
            .amount
            .ok_or(ReceiptBuilderError::UninitializedField("amount"))?;
        let total_amount = self.total_amount.unwrap_or_else(|| amount.clone());
        let membership_start_date = self.membership_start_date.unwrap_or(None);
        let membership_end_date = self.membership_end_date.unwrap_or(None);

        let zero = BigDecimal::from(0);
        if amount < zero {
            return Err(ReceiptBuilderError::ValidationError(format!(
                "amount {amount} is negative"
            )));
        }
        if total_amount < zero {
            return Err(ReceiptBuilderError::ValidationError(format!(
                "total amount {total_amount} is negative"
            )));
        }
        if total_amount > amount {
            return Err(ReceiptBuilderError::ValidationError(format!(
                "total amount {total_amount} exceeds amount {amount}"
            )));
        }
        if let (Some(start), Some(end)) = (membership_start_date, membership_end_date) {
            if start > end {
                return Err(ReceiptBuilderError::ValidationError(format!(
                    "membership ends {end} before it starts {start}"
                )));
            }
        }

        Ok(Receipt {
            id: self.id.unwrap_or_default(),
            owner_id: self.owner_id.unwrap_or_default(),
            receipt_type,
            receipt_number,
            status,
            client_name,
            client_phone,
            client_email: self.client_email.unwrap_or(None),
            client_address: self.client_address.unwrap_or(None),
            issue_date,
            amount,
            total_amount,
            payment_method: self.payment_method.unwrap_or(PaymentMethod::Cash),
            membership_type: self.membership_type.unwrap_or(None),
            description: self.description.unwrap_or(None),
            membership_start_date,
            membership_end_date,
            notes: self.notes.unwrap_or(None),
            created_at: self.created_at.unwrap_or(Local::now().into()),
            updated_at: self.updated_at.unwrap_or(None),
        })
    }
}

impl Receipt {
    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn owner_id(&self) -> &str {
        &self.owner_id
    }

    pub fn receipt_type(&self) -> ReceiptType {
        self.receipt_type
    }

    pub fn receipt_number(&self) -> &str {
        &self.receipt_number
    }

    pub fn status(&self) -> ReceiptStatus {
        self.status
    }

    pub fn client_name(&self) -> &str {
        &self.client_name
    }

    pub fn client_phone(&self) -> &str {
        &self.client_phone
    }

    pub fn client_email(&self) -> Option<&str> {
        self.client_email.as_deref()
    }

    pub fn client_address(&self) -> Option<&str> {
        self.client_address.as_deref()
    }

    pub fn issue_date(&self) -> NaiveDate {
        self.issue_date
    }

    /// Base amount before discount.
    pub fn amount(&self) -> &BigDecimal {
        &self.amount
    }

    /// Amount payable after discount.
    pub fn total_amount(&self) -> &BigDecimal {
        &self.total_amount
    }

    pub fn payment_method(&self) -> PaymentMethod {
        self.payment_method
    }

    pub fn membership_type(&self) -> Option<MembershipType> {
        self.membership_type
    }

    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    pub fn membership_start_date(&self) -> Option<NaiveDate> {
        self.membership_start_date
    }

    pub fn membership_end_date(&self) -> Option<NaiveDate> {
        self.membership_end_date
    }

    pub fn notes(&self) -> Option<&str> {
        self.notes.as_deref()
    }

    pub fn created_at(&self) -> DateTime<FixedOffset> {
        self.created_at
    }

    pub fn updated_at(&self) -> Option<DateTime<FixedOffset>> {
        self.updated_at
    }

    /// The discount granted on this receipt, `amount - total_amount`.
    pub fn discount_implied(&self) -> BigDecimal {
        &self.amount - &self.total_amount
    }

    /// Whole discount percentage implied by the stored amounts, as shown when the receipt is
    /// opened for editing. `None` when either amount is zero.
    pub fn implied_discount_percent(&self) -> Option<BigDecimal> {
        let zero = BigDecimal::from(0);
        if self.amount == zero || self.total_amount == zero {
            return None;
        }
        let percent = self.discount_implied() / &self.amount * BigDecimal::from(100);
        Some(percent.with_scale_round(0, RoundingMode::HalfUp))
    }

    /// Return the receipt with the store-assigned identifier set.
    pub fn with_id(self, id: impl Into<String>) -> Receipt {
        Receipt {
            id: id.into(),
            ..self
        }
    }

    /// Return the receipt stamped with the time of its last overwrite.
    pub fn touched(self, at: DateTime<FixedOffset>) -> Receipt {
        Receipt {
            updated_at: Some(at),
            ..self
        }
    }

    /// Carry identity fields over from the stored record an edit replaces. The receipt number,
    /// owner, id and creation time never change once a receipt has been issued.
    pub fn replacing(self, existing: &Receipt) -> Receipt {
        Receipt {
            id: existing.id.clone(),
            owner_id: existing.owner_id.clone(),
            receipt_number: existing.receipt_number.clone(),
            receipt_type: existing.receipt_type,
            created_at: existing.created_at,
            ..self
        }
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    pub(crate) fn sample_receipt() -> Receipt {
        ReceiptBuilder::default()
            .id("r-1")
            .owner_id("owner-1")
            .receipt_type(ReceiptType::Pilates)
            .receipt_number("RCP-00001")
            .status(ReceiptStatus::Issued)
            .client_name("Asha Patel")
            .client_phone("98799 73439")
            .issue_date(NaiveDate::from_ymd_opt(2026, 1, 15).unwrap())
            .amount(BigDecimal::from(2000))
            .total_amount(BigDecimal::from(1800))
            .payment_method(PaymentMethod::Upi)
            .membership_type(MembershipType::Monthly)
            .description("Mat and Apparatus (1 Month)")
            .membership_start_date(NaiveDate::from_ymd_opt(2026, 1, 15).unwrap())
            .membership_end_date(NaiveDate::from_ymd_opt(2026, 2, 14).unwrap())
            .created_at(DateTime::parse_from_rfc3339("2026-01-15T10:30:00+05:30").unwrap())
            .build()
            .unwrap()
    }

    #[test]
    fn total_above_amount_is_rejected() {
        let err = ReceiptBuilder::default()
            .receipt_type(ReceiptType::Physiotherapy)
            .receipt_number("PHY-1")
            .status(ReceiptStatus::Draft)
            .client_name("A")
            .client_phone("9999999999")
            .issue_date(NaiveDate::from_ymd_opt(2026, 1, 1).unwrap())
            .amount(BigDecimal::from(100))
            .total_amount(BigDecimal::from(150))
            .build()
            .unwrap_err();
        assert!(matches!(err, ReceiptBuilderError::ValidationError(_)));
    }

    #[test]
    fn membership_must_not_end_before_it_starts() {
        let err = ReceiptBuilder::default()
            .receipt_type(ReceiptType::Pilates)
            .receipt_number("PIL-1")
            .status(ReceiptStatus::Draft)
            .client_name("A")
            .client_phone("9999999999")
            .issue_date(NaiveDate::from_ymd_opt(2026, 1, 1).unwrap())
            .amount(BigDecimal::from(100))
            .membership_start_date(NaiveDate::from_ymd_opt(2026, 3, 1).unwrap())
            .membership_end_date(NaiveDate::from_ymd_opt(2026, 2, 1).unwrap())
            .build()
            .unwrap_err();
        assert!(matches!(err, ReceiptBuilderError::ValidationError(_)));
    }

    #[test]
    fn missing_client_name_is_reported() {
        let err = ReceiptBuilder::default()
            .receipt_type(ReceiptType::Pilates)
            .receipt_number("PIL-1")
            .status(ReceiptStatus::Draft)
            .build()
            .unwrap_err();
        assert!(matches!(
            err,
            ReceiptBuilderError::UninitializedField("client_name")
        ));
    }

    #[test]
    fn implied_discount_percent_rounds_to_whole_percent() {
        let receipt = sample_receipt();
        assert_eq!(
            receipt.implied_discount_percent(),
            Some(BigDecimal::from(10))
        );
    }

    #[test]
    fn replacing_keeps_the_issued_receipt_number() {
        let stored = sample_receipt();
        let edited = ReceiptBuilder::default()
            .receipt_type(ReceiptType::Pilates)
            .receipt_number("")
            .status(ReceiptStatus::Modified)
            .client_name("Asha P.")
            .client_phone("98799 73439")
            .issue_date(NaiveDate::from_ymd_opt(2026, 1, 16).unwrap())
            .amount(BigDecimal::from(2000))
            .build()
            .unwrap()
            .replacing(&stored);
        assert_eq!(edited.receipt_number(), "RCP-00001");
        assert_eq!(edited.id(), "r-1");
        assert_eq!(edited.client_name(), "Asha P.");
    }

    #[test]
    fn payment_labels_fold_aliases() {
        assert_eq!(PaymentMethod::from_form_label("Debit Card"), PaymentMethod::Card);
        assert_eq!(PaymentMethod::from_form_label("NEFT"), PaymentMethod::BankTransfer);
        assert_eq!(PaymentMethod::from_form_label("Cheque"), PaymentMethod::Other);
        assert_eq!(PaymentMethod::Other.form_label(), "Cash");
        assert_eq!(PaymentMethod::Other.detail_label(), "Other");
        assert_eq!(PaymentMethod::BankTransfer.document_label(), "BANK TRANSFER");
    }

    #[test]
    fn receipt_json_keeps_amounts_as_strings() {
        let receipt = sample_receipt();
        let json = serde_json::to_value(&receipt).unwrap();
        assert_eq!(json["amount"], "2000");
        assert_eq!(json["status"], "issued");
        assert_eq!(json["payment_method"], "upi");
        let back: Receipt = serde_json::from_value(json).unwrap();
        assert_eq!(back, receipt);
    }

    #[test]
    fn loading_json_checks_the_record_invariants() {
        let mut json = serde_json::to_value(sample_receipt()).unwrap();
        json["amount"] = "100".into();
        json["total_amount"] = "500".into();
        let err = serde_json::from_value::<Receipt>(json.clone()).unwrap_err();
        assert!(err.to_string().contains("total amount 500 exceeds amount 100"));

        json["total_amount"] = "100".into();
        json["membership_start_date"] = "2026-03-01".into();
        json["membership_end_date"] = "2026-02-01".into();
        let err = serde_json::from_value::<Receipt>(json.clone()).unwrap_err();
        assert!(err.to_string().contains("membership ends 2026-02-01 before it starts 2026-03-01"));

        json["membership_end_date"] = "2026-03-31".into();
        let loaded: Receipt = serde_json::from_value(json).unwrap();
        assert_eq!(loaded.total_amount(), &BigDecimal::from(100));
    }
}
