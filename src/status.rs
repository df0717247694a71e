//! Mapping between the persisted [`ReceiptStatus`] and the label sets shown by each view.
//!
//! Every view owns an explicit table. The tables are lossy on purpose: the forms offer
//! `paid/unpaid/partial/cancelled` but persist only four states, and the read-side views each
//! collapse those states differently. `forward(reverse(s))` is therefore not an identity; an
//! "unpaid" selection and a fresh draft cannot be told apart once stored.
//!
//! Adding a persisted state means adding a row to every table below, otherwise the state falls
//! through to the table's default label.

use crate::receipt::ReceiptStatus;

/// The consumers of status labels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StatusView {
    /// Re-populating the physiotherapy or pilates form when a receipt is edited
    Form,
    /// The receipt listing table
    Listing,
    /// The receipt detail page
    Detail,
    /// The printable document and the share message
    Document,
}

struct LabelTable {
    rows: &'static [(ReceiptStatus, &'static str)],
    fallback: &'static str,
}

const FORM_LABELS: LabelTable = LabelTable {
    rows: &[
        (ReceiptStatus::Issued, "paid"),
        (ReceiptStatus::Draft, "pending"),
        (ReceiptStatus::Modified, "partial"),
    ],
    fallback: "pending",
};

const LISTING_LABELS: LabelTable = LabelTable {
    rows: &[(ReceiptStatus::Issued, "Paid")],
    fallback: "Unpaid",
};

const DETAIL_LABELS: LabelTable = LabelTable {
    rows: &[
        (ReceiptStatus::Issued, "Paid"),
        (ReceiptStatus::Draft, "Pending"),
        (ReceiptStatus::Modified, "Pending"),
        (ReceiptStatus::Cancelled, "Overdue"),
    ],
    fallback: "Pending",
};

const DOCUMENT_LABELS: LabelTable = LabelTable {
    rows: &[
        (ReceiptStatus::Issued, "Paid"),
        (ReceiptStatus::Draft, "Pending"),
        (ReceiptStatus::Modified, "Partial"),
        (ReceiptStatus::Cancelled, "Cancelled"),
    ],
    fallback: "Pending",
};

/// Form selections, compared case-insensitively. Anything else, "unpaid" included, is a draft.
const FORM_SELECTIONS: [(&str, ReceiptStatus); 3] = [
    ("paid", ReceiptStatus::Issued),
    ("partial", ReceiptStatus::Modified),
    ("cancelled", ReceiptStatus::Cancelled),
];

/// Payment status choices of the listing filter, compared exactly.
const FILTER_SELECTIONS: [(&str, ReceiptStatus); 3] = [
    ("Paid", ReceiptStatus::Issued),
    ("Pending", ReceiptStatus::Draft),
    ("Partial", ReceiptStatus::Modified),
];

impl StatusView {
    fn table(&self) -> &'static LabelTable {
        match self {
            StatusView::Form => &FORM_LABELS,
            StatusView::Listing => &LISTING_LABELS,
            StatusView::Detail => &DETAIL_LABELS,
            StatusView::Document => &DOCUMENT_LABELS,
        }
    }
}

/// Map a status picked on a receipt form to the persisted state.
///
/// # Example
/// ```rust
/// use receipt_pdf::{ReceiptStatus, status::forward};
///
/// assert_eq!(forward("Paid"), ReceiptStatus::Issued);
/// assert_eq!(forward("unpaid"), ReceiptStatus::Draft);
/// ```
pub fn forward(selection: &str) -> ReceiptStatus {
    let selection = selection.to_lowercase();
    FORM_SELECTIONS
        .iter()
        .find(|(label, _)| *label == selection)
        .map(|(_, status)| *status)
        .unwrap_or(ReceiptStatus::Draft)
}

/// Label a persisted state for the given view.
pub fn reverse(status: ReceiptStatus, view: StatusView) -> &'static str {
    let table = view.table();
    table
        .rows
        .iter()
        .find(|(s, _)| *s == status)
        .map(|(_, label)| *label)
        .unwrap_or(table.fallback)
}

/// Label a raw persisted value for the given view. Values that are not a known state take the
/// view's default label.
pub fn reverse_raw(status: &str, view: StatusView) -> &'static str {
    match status.parse::<ReceiptStatus>() {
        Ok(status) => reverse(status, view),
        Err(_) => view.table().fallback,
    }
}

/// Map a payment status chosen in the listing filter to the persisted state it selects.
pub fn filter_status(selection: &str) -> ReceiptStatus {
    FILTER_SELECTIONS
        .iter()
        .find(|(label, _)| *label == selection)
        .map(|(_, status)| *status)
        .unwrap_or(ReceiptStatus::Draft)
}
