//! Membership period arithmetic and the pilates period vocabulary.

use chrono::{Days, Months, NaiveDate};
use tracing::debug;

use crate::receipt::MembershipType;

/// Compute the last day covered by a membership starting on `start`.
///
/// The cadence's months are added to the start date and one day is subtracted, so a monthly
/// membership starting on the 15th ends on the 14th of the next month. When the target month is
/// shorter than the start day the date is clamped to that month's last day before the day is
/// subtracted. Without a recognised cadence the end date is the start date.
///
/// # Example
/// ```rust
/// use chrono::NaiveDate;
/// use receipt_pdf::{MembershipType, membership::end_date};
///
/// let start = NaiveDate::from_ymd_opt(2026, 1, 15).unwrap();
/// let end = end_date(start, Some(MembershipType::Monthly));
/// assert_eq!(end, NaiveDate::from_ymd_opt(2026, 2, 14).unwrap());
/// ```
pub fn end_date(start: NaiveDate, cadence: Option<MembershipType>) -> NaiveDate {
    let Some(cadence) = cadence else {
        return start;
    };
    let end = start
        .checked_add_months(Months::new(cadence.months()))
        .and_then(|d| d.checked_sub_days(Days::new(1)))
        .unwrap_or(start);
    debug!(%start, %end, cadence = cadence.as_str(), "computed membership end date");
    end
}

/// Pilates membership periods offered on the form. `ThreeMonth` is a legacy value that still
/// appears in stored descriptions but is no longer offered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MembershipPeriod {
    OneMonth,
    ThreeMonth,
    ThreeMonths24Sessions,
    ThreeMonths36Sessions,
    SixMonths,
    TwelveMonths,
    SingleSession,
}

const PERIODS: [(MembershipPeriod, &str, &str); 7] = [
    (MembershipPeriod::OneMonth, "1_month", "1 Month"),
    (MembershipPeriod::ThreeMonth, "3_month", "3 Month"),
    (
        MembershipPeriod::ThreeMonths24Sessions,
        "3_months_24_sessions",
        "3 Months - 24 Sessions",
    ),
    (
        MembershipPeriod::ThreeMonths36Sessions,
        "3_months_36_sessions",
        "3 Months - 36 Sessions",
    ),
    (MembershipPeriod::SixMonths, "6_months", "6 Months"),
    (MembershipPeriod::TwelveMonths, "12_months", "12 Months"),
    (MembershipPeriod::SingleSession, "single_session", "Single Session"),
];

impl MembershipPeriod {
    /// Form identifier, e.g. `3_months_24_sessions`.
    pub fn id(&self) -> &'static str {
        PERIODS
            .iter()
            .find(|(p, _, _)| p == self)
            .map(|(_, id, _)| *id)
            .unwrap_or_default()
    }

    /// Display label, e.g. `3 Months - 24 Sessions`.
    pub fn label(&self) -> &'static str {
        PERIODS
            .iter()
            .find(|(p, _, _)| p == self)
            .map(|(_, _, label)| *label)
            .unwrap_or_default()
    }

    pub fn from_id(id: &str) -> Option<MembershipPeriod> {
        PERIODS.iter().find(|(_, i, _)| *i == id).map(|(p, _, _)| *p)
    }

    pub fn from_label(label: &str) -> Option<MembershipPeriod> {
        PERIODS
            .iter()
            .find(|(_, _, l)| *l == label)
            .map(|(p, _, _)| *p)
    }

    /// The cadence a period is stored under.
    ///
    /// Six-month and single-session memberships are filed as annual. The legacy "3 Month" period
    /// has no cadence.
    pub fn cadence(&self) -> Option<MembershipType> {
        match self {
            MembershipPeriod::OneMonth => Some(MembershipType::Monthly),
            MembershipPeriod::ThreeMonths24Sessions | MembershipPeriod::ThreeMonths36Sessions => {
                Some(MembershipType::Quarterly)
            }
            MembershipPeriod::SixMonths
            | MembershipPeriod::TwelveMonths
            | MembershipPeriod::SingleSession => Some(MembershipType::Annual),
            MembershipPeriod::ThreeMonth => None,
        }
    }

    /// Period shown on the edit form when the stored description cannot be decoded.
    pub fn default_for(cadence: MembershipType) -> MembershipPeriod {
        match cadence {
            MembershipType::Monthly => MembershipPeriod::OneMonth,
            MembershipType::Quarterly => MembershipPeriod::ThreeMonths24Sessions,
            MembershipType::Annual => MembershipPeriod::TwelveMonths,
        }
    }
}

/// Cadence for a period given either as a form id or a display label. Unknown text yields `None`.
pub fn cadence_for(period: &str) -> Option<MembershipType> {
    MembershipPeriod::from_id(period)
        .or_else(|| MembershipPeriod::from_label(period))
        .and_then(|p| p.cadence())
}

/// Short period text printed on documents for a stored cadence.
pub fn period_text(cadence: MembershipType) -> &'static str {
    match cadence {
        MembershipType::Monthly => "1 Month",
        MembershipType::Quarterly => "3 Months",
        MembershipType::Annual => "12 Months",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn end_date_is_one_day_before_the_anniversary() {
        assert_eq!(
            end_date(date(2026, 1, 15), Some(MembershipType::Monthly)),
            date(2026, 2, 14)
        );
        assert_eq!(
            end_date(date(2026, 1, 15), Some(MembershipType::Quarterly)),
            date(2026, 4, 14)
        );
        assert_eq!(
            end_date(date(2026, 1, 15), Some(MembershipType::Annual)),
            date(2027, 1, 14)
        );
        assert_eq!(
            end_date(date(2026, 1, 1), Some(MembershipType::Monthly)),
            date(2026, 1, 31)
        );
    }

    #[test]
    fn end_date_clamps_short_months() {
        assert_eq!(
            end_date(date(2026, 1, 31), Some(MembershipType::Monthly)),
            date(2026, 2, 27)
        );
        assert_eq!(
            end_date(date(2028, 1, 31), Some(MembershipType::Monthly)),
            date(2028, 2, 28)
        );
    }

    #[test]
    fn unknown_cadence_keeps_the_start_date() {
        assert_eq!(end_date(date(2026, 5, 5), None), date(2026, 5, 5));
        assert_eq!(
            end_date(date(2026, 5, 5), MembershipType::parse("weekly")),
            date(2026, 5, 5)
        );
    }

    #[test]
    fn periods_map_to_cadences() {
        assert_eq!(cadence_for("1_month"), Some(MembershipType::Monthly));
        assert_eq!(
            cadence_for("3 Months - 36 Sessions"),
            Some(MembershipType::Quarterly)
        );
        assert_eq!(cadence_for("6_months"), Some(MembershipType::Annual));
        assert_eq!(cadence_for("single_session"), Some(MembershipType::Annual));
        assert_eq!(cadence_for("3_month"), None);
        assert_eq!(cadence_for(""), None);
    }

    #[test]
    fn period_ids_and_labels_agree() {
        let period = MembershipPeriod::from_id("3_months_24_sessions").unwrap();
        assert_eq!(period.label(), "3 Months - 24 Sessions");
        assert_eq!(MembershipPeriod::from_label("12 Months").unwrap().id(), "12_months");
        assert_eq!(
            MembershipPeriod::default_for(MembershipType::Quarterly),
            MembershipPeriod::ThreeMonths24Sessions
        );
        assert_eq!(period_text(MembershipType::Annual), "12 Months");
    }
}
