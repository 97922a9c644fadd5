use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BonityTier {
    High,
    #[default]
    Medium,
    Low,
}

/// Underwriting gate record. Validity is not stored; it is evaluated from
/// these fields and the quote kind, see [`crate::Quote::checklist_valid`].
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Checklist {
    pub validity_date: Option<NaiveDate>,
    pub insured_age: Option<u32>,
    #[serde(default)]
    pub prior_accidents: bool,
    #[serde(default)]
    pub pending_accident_claims: bool,
    #[serde(default)]
    pub internal_bonity: Option<BonityTier>,
    #[serde(default)]
    pub external_bonity: Option<BonityTier>,
    #[serde(default)]
    pub external_rating_comment: Option<String>,
    #[serde(default)]
    pub external_report_id: Option<String>,
    #[serde(default)]
    pub audit_flag: bool,
    #[serde(default)]
    pub malus_surcharge: Decimal,
    #[serde(default)]
    pub approval_type: Option<String>,
}

impl Checklist {
    pub fn new(validity_date: Option<NaiveDate>, insured_age: Option<u32>) -> Self {
        Self {
            validity_date,
            insured_age,
            prior_accidents: false,
            pending_accident_claims: false,
            internal_bonity: None,
            external_bonity: None,
            external_rating_comment: None,
            external_report_id: None,
            audit_flag: false,
            malus_surcharge: Decimal::ZERO,
            approval_type: None,
        }
    }

    pub fn has_accident_history(&self) -> bool {
        self.prior_accidents || self.pending_accident_claims
    }

    pub fn has_comment(&self) -> bool {
        self.external_rating_comment.as_deref().is_some_and(|comment| !comment.trim().is_empty())
    }
}
