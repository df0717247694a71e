//! Encoding and decoding of the `"Membership (Period)"` descriptor stored in a receipt's
//! description.
//!
//! Pilates receipts store their membership and period as a single string such as
//! `Mat and Apparatus (3 Months - 24 Sessions)`. [`decode`] reports why a description could not
//! be read; [`decode_form_fields`] reproduces what the edit form shows, where anything unreadable
//! silently becomes an empty selection.

use std::fmt;

use once_cell::sync::Lazy;
use regex::Regex;

use crate::membership::MembershipPeriod;

static DESCRIPTOR: Lazy<Regex> = Lazy::new(|| Regex::new(r"^(.+?)\s*\((.+?)\)$").expect("valid regex"));

/// Pilates membership kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Membership {
    Mat,
    MatAndApparatus,
    Apparatus,
}

const MEMBERSHIPS: [(Membership, &str, &str); 3] = [
    (Membership::Mat, "mat", "Mat"),
    (Membership::MatAndApparatus, "mat_and_apparatus", "Mat and Apparatus"),
    (Membership::Apparatus, "apparatus", "Apparatus"),
];

impl Membership {
    pub fn id(&self) -> &'static str {
        MEMBERSHIPS
            .iter()
            .find(|(m, _, _)| m == self)
            .map(|(_, id, _)| *id)
            .unwrap_or_default()
    }

    pub fn label(&self) -> &'static str {
        MEMBERSHIPS
            .iter()
            .find(|(m, _, _)| m == self)
            .map(|(_, _, label)| *label)
            .unwrap_or_default()
    }

    pub fn from_id(id: &str) -> Option<Membership> {
        MEMBERSHIPS
            .iter()
            .find(|(_, i, _)| *i == id)
            .map(|(m, _, _)| *m)
    }

    pub fn from_label(label: &str) -> Option<Membership> {
        MEMBERSHIPS
            .iter()
            .find(|(_, _, l)| *l == label)
            .map(|(m, _, _)| *m)
    }
}

/// Why a stored description could not be decoded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DescriptionError {
    /// No description was stored
    Missing,
    /// The text is not of the form `Label (Period)`
    Unstructured(String),
    /// The shape matched but the membership label is not one the encoder produces
    UnknownMembership(String),
    /// The shape matched but the period label is not one the encoder produces
    UnknownPeriod(String),
}

impl fmt::Display for DescriptionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DescriptionError::Missing => write!(f, "no description stored"),
            DescriptionError::Unstructured(text) => {
                write!(f, "description '{text}' is not a membership descriptor")
            }
            DescriptionError::UnknownMembership(label) => {
                write!(f, "unknown membership '{label}'")
            }
            DescriptionError::UnknownPeriod(label) => write!(f, "unknown period '{label}'"),
        }
    }
}

impl std::error::Error for DescriptionError {}

/// Produce the stored descriptor for a membership and period.
///
/// With both present the result is `"{membership} ({period})"`; with one present it is that label
/// alone; with neither there is nothing to store.
///
/// # Example
/// ```rust
/// use receipt_pdf::description::{Membership, encode};
/// use receipt_pdf::membership::MembershipPeriod;
///
/// let text = encode(
///     Some(Membership::MatAndApparatus),
///     Some(MembershipPeriod::ThreeMonths24Sessions),
/// );
/// assert_eq!(text.as_deref(), Some("Mat and Apparatus (3 Months - 24 Sessions)"));
/// ```
pub fn encode(membership: Option<Membership>, period: Option<MembershipPeriod>) -> Option<String> {
    join_labels(
        membership.map(|m| m.label()).unwrap_or_default(),
        period.map(|p| p.label()).unwrap_or_default(),
    )
}

/// Encode the raw ids submitted by the pilates form.
///
/// Known ids are replaced by their labels; unknown ids are stored as typed. Empty ids count as
/// absent.
pub fn encode_form_ids(membership_id: &str, period_id: &str) -> Option<String> {
    let membership = Membership::from_id(membership_id)
        .map(|m| m.label())
        .unwrap_or(membership_id);
    let period = MembershipPeriod::from_id(period_id)
        .map(|p| p.label())
        .unwrap_or(period_id);
    join_labels(membership, period)
}

fn join_labels(membership: &str, period: &str) -> Option<String> {
    match (membership.is_empty(), period.is_empty()) {
        (false, false) => Some(format!("{membership} ({period})")),
        (false, true) => Some(membership.to_string()),
        (true, false) => Some(period.to_string()),
        (true, true) => None,
    }
}

/// Split a stored descriptor back into its labels without looking them up.
fn split(description: &str) -> Option<(String, String)> {
    let captures = DESCRIPTOR.captures(description)?;
    let membership = captures.get(1)?.as_str().trim().to_string();
    let period = captures.get(2)?.as_str().trim().to_string();
    Some((membership, period))
}

/// Decode a stored description into its membership and period.
///
/// # Errors
/// A [`DescriptionError`] naming what could not be read. Hand-typed notes and legacy text are
/// [`DescriptionError::Unstructured`].
pub fn decode(description: Option<&str>) -> Result<(Membership, MembershipPeriod), DescriptionError> {
    let description = description
        .filter(|d| !d.is_empty())
        .ok_or(DescriptionError::Missing)?;
    let (membership, period) = split(description)
        .ok_or_else(|| DescriptionError::Unstructured(description.to_string()))?;
    let membership = Membership::from_label(&membership)
        .ok_or(DescriptionError::UnknownMembership(membership))?;
    let period =
        MembershipPeriod::from_label(&period).ok_or(DescriptionError::UnknownPeriod(period))?;
    Ok((membership, period))
}

/// The membership and period ids the pilates edit form is populated with.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FormSelection {
    pub membership: String,
    pub period: String,
}

/// Decode a stored description the way the edit form does.
///
/// Each label is looked up on its own; an unknown label leaves only its own field empty. Text that
/// is not a descriptor at all leaves both fields empty. No error is reported, so a description
/// written by hand is lost when the receipt is edited and saved again.
pub fn decode_form_fields(description: Option<&str>) -> FormSelection {
    let Some((membership, period)) = description.and_then(split) else {
        return FormSelection::default();
    };
    FormSelection {
        membership: Membership::from_label(&membership)
            .map(|m| m.id().to_string())
            .unwrap_or_default(),
        period: MembershipPeriod::from_label(&period)
            .map(|p| p.id().to_string())
            .unwrap_or_default(),
    }
}
