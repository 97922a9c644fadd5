use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Where the current contract dates came from. Only dates that were loaded
/// from the store, or edited by the user afterwards, are subject to silent
/// correction.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DateOrigin {
    #[default]
    Uninitialized,
    DefaultedThisSession,
    LoadedFromBackend,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContractTerms {
    #[serde(default)]
    pub start_date: Option<NaiveDate>,
    #[serde(default)]
    pub end_date: Option<NaiveDate>,
    #[serde(default)]
    pub duration_code: Option<String>,
    #[serde(default)]
    pub terms_code: Option<String>,
    /// Session state only. A record read back from the store starts as
    /// [`DateOrigin::Uninitialized`] and is promoted by `mark_loaded`.
    #[serde(skip)]
    pub date_origin: DateOrigin,
}

impl ContractTerms {
    pub fn set_start_date(&mut self, start_date: Option<NaiveDate>) {
        self.start_date = start_date;
        self.date_origin = DateOrigin::LoadedFromBackend;
    }

    pub fn set_end_date(&mut self, end_date: Option<NaiveDate>) {
        self.end_date = end_date;
        self.date_origin = DateOrigin::LoadedFromBackend;
    }

    pub fn set_duration_code(&mut self, duration_code: Option<String>) {
        self.duration_code = duration_code;
        self.date_origin = DateOrigin::LoadedFromBackend;
    }

    /// Marks dates read from the quote store. A record without any stored
    /// date stays uninitialized so it can still be defaulted.
    pub fn mark_loaded(&mut self) {
        if self.date_origin == DateOrigin::Uninitialized
            && (self.start_date.is_some() || self.end_date.is_some())
        {
            self.date_origin = DateOrigin::LoadedFromBackend;
        }
    }
}

/// An active version of the general insurance conditions.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TermsVersion {
    pub code: String,
    pub sort_key: i64,
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;

    use super::{ContractTerms, DateOrigin};

    #[test]
    fn origin_is_not_persisted_and_stored_dates_load_as_backend_data() {
        let contract = ContractTerms {
            start_date: NaiveDate::from_ymd_opt(2025, 6, 1),
            end_date: NaiveDate::from_ymd_opt(2027, 12, 31),
            duration_code: Some("3Y".to_string()),
            terms_code: None,
            date_origin: DateOrigin::DefaultedThisSession,
        };

        let json = serde_json::to_string(&contract).expect("serialize");
        assert!(!json.contains("date_origin"));

        let mut stored: ContractTerms = serde_json::from_str(&json).expect("deserialize");
        assert_eq!(stored.date_origin, DateOrigin::Uninitialized);

        stored.mark_loaded();
        assert_eq!(stored.date_origin, DateOrigin::LoadedFromBackend);
    }

    #[test]
    fn record_without_dates_stays_uninitialized() {
        let mut contract = ContractTerms::default();
        contract.mark_loaded();
        assert_eq!(contract.date_origin, DateOrigin::Uninitialized);
    }
}
