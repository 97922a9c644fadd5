use std::collections::BTreeMap;

use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::domain::contract::{ContractTerms, DateOrigin};
use crate::notices::{Notice, NoticeBoard};

/// Whole-year durations a contract can be written for.
pub const ALLOWED_DURATION_YEARS: std::ops::RangeInclusive<i32> = 1..=4;

/// Maps duration codes to their length in whole years.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DurationCatalog {
    years: BTreeMap<String, u32>,
}

impl DurationCatalog {
    pub fn new(entries: impl IntoIterator<Item = (String, u32)>) -> Self {
        Self { years: entries.into_iter().collect() }
    }

    pub fn years_for(&self, duration_code: &str) -> Option<u32> {
        self.years.get(duration_code.trim()).copied()
    }

    pub fn is_empty(&self) -> bool {
        self.years.is_empty()
    }

    pub fn entries(&self) -> impl Iterator<Item = (&str, u32)> {
        self.years.iter().map(|(code, years)| (code.as_str(), *years))
    }
}

/// Contracts always run until the end of a calendar year. The start year
/// counts as the first of `years` contract years.
pub fn expected_end_date(start_date: NaiveDate, years: u32) -> Option<NaiveDate> {
    let extra_years = i32::try_from(years.checked_sub(1)?).ok()?;
    let year = start_date.year().checked_add(extra_years)?;
    NaiveDate::from_ymd_opt(year, 12, 31)
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct DateCorrection {
    pub should_correct: bool,
    pub expected_end_date: Option<NaiveDate>,
    pub original_end_date: Option<NaiveDate>,
}

impl DateCorrection {
    fn none(original_end_date: Option<NaiveDate>) -> Self {
        Self { should_correct: false, expected_end_date: None, original_end_date }
    }
}

pub fn check_end_date(
    start_date: Option<NaiveDate>,
    end_date: Option<NaiveDate>,
    years: Option<u32>,
    read_only: bool,
) -> DateCorrection {
    if read_only {
        return DateCorrection::none(end_date);
    }

    let (Some(start), Some(end), Some(years)) = (start_date, end_date, years) else {
        return DateCorrection::none(end_date);
    };

    let Some(expected) = expected_end_date(start, years) else {
        return DateCorrection::none(end_date);
    };

    DateCorrection {
        should_correct: expected != end,
        expected_end_date: Some(expected),
        original_end_date: Some(end),
    }
}

/// Silently fixes a stored end date that does not match its duration and
/// raises the one-time notice. Dates defaulted in this session are exempt.
pub fn correct_contract_dates(
    contract: &mut ContractTerms,
    catalog: &DurationCatalog,
    read_only: bool,
    notices: &mut NoticeBoard,
) -> DateCorrection {
    if contract.date_origin != DateOrigin::LoadedFromBackend {
        return DateCorrection::none(contract.end_date);
    }

    let years = contract.duration_code.as_deref().and_then(|code| catalog.years_for(code));
    let correction = check_end_date(contract.start_date, contract.end_date, years, read_only);

    if let (true, Some(original), Some(expected)) =
        (correction.should_correct, correction.original_end_date, correction.expected_end_date)
    {
        info!(
            event_name = "contract.end_date.corrected",
            original = %original,
            corrected = %expected,
            "contract end date did not match duration"
        );
        contract.end_date = Some(expected);
        notices.issue(Notice::DateCorrected { original, corrected: expected });
    }

    correction
}

/// Fills start and end dates for a brand-new quote. Existing dates are left
/// alone.
pub fn default_contract_dates(
    contract: &mut ContractTerms,
    start_date: NaiveDate,
    default_duration_code: &str,
    catalog: &DurationCatalog,
) {
    if contract.date_origin != DateOrigin::Uninitialized {
        return;
    }

    let duration_code =
        contract.duration_code.clone().unwrap_or_else(|| default_duration_code.to_string());
    let start = contract.start_date.unwrap_or(start_date);
    let end = catalog.years_for(&duration_code).and_then(|years| expected_end_date(start, years));

    contract.start_date = Some(start);
    contract.end_date = end;
    contract.duration_code = Some(duration_code);
    contract.date_origin = DateOrigin::DefaultedThisSession;
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum EndDateError {
    Missing,
    NotYearEnd,
    DurationOutOfRange { years: i32 },
}

impl EndDateError {
    pub fn message(&self) -> String {
        match self {
            Self::Missing => "start and end date are required".to_string(),
            Self::NotYearEnd => "contract end date must be 31 December".to_string(),
            Self::DurationOutOfRange { years } => {
                format!("contract must run 1 to 4 full years, not {years}")
            }
        }
    }
}

/// Form-level check: the end date must be 31 December and the contract must
/// span one to four calendar years, the start year included.
pub fn validate_end_date(
    start_date: Option<NaiveDate>,
    end_date: Option<NaiveDate>,
) -> Result<(), EndDateError> {
    let (Some(start), Some(end)) = (start_date, end_date) else {
        return Err(EndDateError::Missing);
    };

    if end.month() != 12 || end.day() != 31 {
        return Err(EndDateError::NotYearEnd);
    }

    let years = end.year() - start.year() + 1;
    if !ALLOWED_DURATION_YEARS.contains(&years) {
        return Err(EndDateError::DurationOutOfRange { years });
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;

    use super::*;

    fn date(year: i32, month: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(year, month, day).expect("valid date")
    }

    fn catalog() -> DurationCatalog {
        DurationCatalog::new((1..=4).map(|years| (format!("{years}Y"), years)))
    }

    #[test]
    fn four_year_contract_ends_at_year_end() {
        let correction =
            check_end_date(Some(date(2024, 3, 15)), Some(date(2027, 6, 30)), Some(4), false);

        assert!(correction.should_correct);
        assert_eq!(correction.expected_end_date, Some(date(2027, 12, 31)));
        assert_eq!(correction.original_end_date, Some(date(2027, 6, 30)));
    }

    #[test]
    fn matching_end_date_needs_no_correction() {
        let correction =
            check_end_date(Some(date(2024, 3, 15)), Some(date(2027, 12, 31)), Some(4), false);
        assert!(!correction.should_correct);
    }

    #[test]
    fn read_only_or_incomplete_input_is_never_corrected() {
        let start = Some(date(2024, 3, 15));
        let end = Some(date(2025, 1, 1));

        assert!(!check_end_date(start, end, Some(1), true).should_correct);
        assert!(!check_end_date(None, end, Some(1), false).should_correct);
        assert!(!check_end_date(start, None, Some(1), false).should_correct);
        assert!(!check_end_date(start, end, None, false).should_correct);
    }

    #[test]
    fn stored_dates_are_corrected_and_notice_issued_once() {
        let mut contract = ContractTerms {
            start_date: Some(date(2024, 3, 15)),
            end_date: Some(date(2027, 6, 30)),
            duration_code: Some("4Y".to_string()),
            terms_code: None,
            date_origin: DateOrigin::LoadedFromBackend,
        };
        let mut notices = NoticeBoard::new();

        let correction = correct_contract_dates(&mut contract, &catalog(), false, &mut notices);
        assert!(correction.should_correct);
        assert_eq!(contract.end_date, Some(date(2027, 12, 31)));
        assert_eq!(notices.visible().len(), 1);

        contract.set_end_date(Some(date(2028, 1, 31)));
        correct_contract_dates(&mut contract, &catalog(), false, &mut notices);
        assert_eq!(contract.end_date, Some(date(2027, 12, 31)));
        assert_eq!(notices.visible().len(), 1);
    }

    #[test]
    fn defaulted_dates_are_exempt_from_correction() {
        let mut contract = ContractTerms::default();
        default_contract_dates(&mut contract, date(2026, 10, 19), "3Y", &catalog());

        assert_eq!(contract.date_origin, DateOrigin::DefaultedThisSession);
        assert_eq!(contract.end_date, Some(date(2028, 12, 31)));

        contract.end_date = Some(date(2028, 10, 19));
        let mut notices = NoticeBoard::new();
        let correction = correct_contract_dates(&mut contract, &catalog(), false, &mut notices);
        assert!(!correction.should_correct);
        assert!(notices.visible().is_empty());
    }

    #[test]
    fn user_edit_makes_dates_subject_to_correction() {
        let mut contract = ContractTerms::default();
        default_contract_dates(&mut contract, date(2026, 10, 19), "1Y", &catalog());
        contract.set_duration_code(Some("2Y".to_string()));

        let mut notices = NoticeBoard::new();
        let correction = correct_contract_dates(&mut contract, &catalog(), false, &mut notices);
        assert!(correction.should_correct);
        assert_eq!(contract.end_date, Some(date(2027, 12, 31)));
    }

    #[test]
    fn form_validation_requires_whole_year_contract() {
        let start = Some(date(2024, 3, 15));
        assert_eq!(validate_end_date(start, Some(date(2025, 12, 31))), Ok(()));
        assert_eq!(validate_end_date(start, Some(date(2024, 12, 31))), Ok(()));
        assert_eq!(validate_end_date(start, Some(date(2027, 12, 31))), Ok(()));
        assert_eq!(validate_end_date(start, Some(date(2027, 6, 30))), Err(EndDateError::NotYearEnd));
        assert_eq!(
            validate_end_date(start, Some(date(2028, 12, 31))),
            Err(EndDateError::DurationOutOfRange { years: 5 })
        );
        assert_eq!(
            validate_end_date(start, Some(date(2023, 12, 31))),
            Err(EndDateError::DurationOutOfRange { years: 0 })
        );
        assert_eq!(validate_end_date(None, Some(date(2025, 12, 31))), Err(EndDateError::Missing));
    }
}
