use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::domain::activity::ActivityComposition;

/// Minimal input set that determines the technical assignment.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct TechnicalBasis {
    pub composition: ActivityComposition,
    pub work_percentage: Decimal,
    pub headcount: u32,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssignmentClass {
    pub assignment_type: String,
    pub class: String,
    pub class_portion: Decimal,
}

/// Backend-computed risk classification for a [`TechnicalBasis`].
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TechnicalAssignment {
    /// Percent.
    pub base_premium_rate: Decimal,
    pub base_level: i64,
    pub classes: Vec<AssignmentClass>,
}

/// Signed modifier granted to the agency, stored as a code such as `"+10"`.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AgencyCompetence(pub i32);

impl AgencyCompetence {
    pub fn from_code(code: &str) -> Option<Self> {
        let trimmed = code.trim().trim_end_matches('%').trim();
        let digits = trimmed.strip_prefix('+').unwrap_or(trimmed);
        digits.parse::<i32>().ok().map(Self)
    }

    pub fn code(&self) -> String {
        if self.0 > 0 {
            format!("+{}", self.0)
        } else {
            self.0.to_string()
        }
    }

    pub fn factor(&self) -> Decimal {
        Decimal::ONE + Decimal::from(self.0) / Decimal::ONE_HUNDRED
    }

    pub fn adjusted_premium_rate(&self, base_premium_rate: Decimal) -> Decimal {
        base_premium_rate * self.factor()
    }

    pub fn adjusted_level(&self, base_level: i64) -> i64 {
        base_level + i64::from(self.0)
    }
}

/// Identity of whoever triggers a remote call on behalf of a quote.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Requester {
    pub user_id: String,
    #[serde(default)]
    pub agency_id: Option<String>,
}

#[cfg(test)]
mod tests {
    use rust_decimal::Decimal;

    use super::AgencyCompetence;

    #[test]
    fn parses_signed_competence_codes() {
        assert_eq!(AgencyCompetence::from_code("+10"), Some(AgencyCompetence(10)));
        assert_eq!(AgencyCompetence::from_code("-5 %"), Some(AgencyCompetence(-5)));
        assert_eq!(AgencyCompetence::from_code("0"), Some(AgencyCompetence(0)));
        assert_eq!(AgencyCompetence::from_code("ten"), None);
    }

    #[test]
    fn code_round_trips_through_display_form() {
        assert_eq!(AgencyCompetence(10).code(), "+10");
        assert_eq!(AgencyCompetence(-15).code(), "-15");
        assert_eq!(AgencyCompetence(0).code(), "0");
    }

    #[test]
    fn competence_scales_rate_and_shifts_level() {
        let competence = AgencyCompetence(-10);
        assert_eq!(competence.adjusted_premium_rate(Decimal::new(250, 2)), Decimal::new(225, 2));
        assert_eq!(competence.adjusted_level(12), 2);
    }
}
