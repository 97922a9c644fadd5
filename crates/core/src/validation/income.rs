use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};

/// Full-time minimum insured income for family members working in the business.
pub const FAMILY_MEMBER_MINIMUM_BASE: Decimal = Decimal::from_parts(44_460, 0, 0, false, 0);
/// Full-time minimum insured income for owners.
pub const OWNER_MINIMUM_BASE: Decimal = Decimal::from_parts(66_690, 0, 0, false, 0);

pub const FAMILY_MEMBER_ROLES: [&str; 3] =
    ["family_member", "spouse_of_owner", "registered_partner_of_owner"];
pub const OWNER_ROLES: [&str; 3] = ["owner", "managing_partner", "sole_proprietor"];

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum IncomeThresholdError {
    FamilyMemberMinimum { minimum: Decimal },
    OwnerMinimum { minimum: Decimal },
    NegativeValue,
    MaxExceeded { maximum: Decimal },
}

impl IncomeThresholdError {
    pub fn key(&self) -> &'static str {
        match self {
            Self::FamilyMemberMinimum { .. } => "familyMemberMinimum",
            Self::OwnerMinimum { .. } => "ownerMinimum",
            Self::NegativeValue => "negativeValue",
            Self::MaxExceeded { .. } => "maxExceeded",
        }
    }

    pub fn message(&self) -> String {
        match self {
            Self::FamilyMemberMinimum { minimum } => {
                format!("insured income for family members must be at least {minimum}")
            }
            Self::OwnerMinimum { minimum } => {
                format!("insured income for owners must be at least {minimum}")
            }
            Self::NegativeValue => "insured income cannot be negative".to_string(),
            Self::MaxExceeded { maximum } => {
                format!("insured income cannot exceed {maximum}")
            }
        }
    }
}

/// Person-level inputs shared by all three variants.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct IncomeRules {
    pub is_family_member: bool,
    pub is_owner: bool,
    /// Work percentage, 0..=100.
    pub percentage: Decimal,
    pub absolute_max: Option<Decimal>,
}

impl Default for IncomeRules {
    fn default() -> Self {
        Self {
            is_family_member: false,
            is_owner: false,
            percentage: Decimal::ONE_HUNDRED,
            absolute_max: None,
        }
    }
}

impl IncomeRules {
    pub fn for_person(
        role_code: Option<&str>,
        workload_label: Option<&str>,
        absolute_max: Option<Decimal>,
    ) -> Self {
        let role = role_code.map(normalize_role);
        let in_set = |set: &[&str]| role.as_deref().is_some_and(|role| set.contains(&role));

        Self {
            is_family_member: in_set(FAMILY_MEMBER_ROLES.as_slice()),
            is_owner: in_set(OWNER_ROLES.as_slice()),
            percentage: workload_percentage(workload_label),
            absolute_max,
        }
    }

    pub fn validate(&self, value: Decimal) -> Result<(), IncomeThresholdError> {
        validate_income(value, self.is_family_member, self.is_owner, self.percentage, self.absolute_max)
    }
}

fn normalize_role(code: &str) -> String {
    code.trim().to_ascii_lowercase()
}

fn scaled_minimum(base: Decimal, percentage: Decimal) -> Decimal {
    (base * percentage / Decimal::ONE_HUNDRED)
        .round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero)
}

pub fn validate_income(
    value: Decimal,
    is_family_member: bool,
    is_owner: bool,
    percentage: Decimal,
    absolute_max: Option<Decimal>,
) -> Result<(), IncomeThresholdError> {
    if is_family_member && value > Decimal::ZERO {
        let minimum = scaled_minimum(FAMILY_MEMBER_MINIMUM_BASE, percentage);
        if value < minimum {
            return Err(IncomeThresholdError::FamilyMemberMinimum { minimum });
        }
    } else if is_owner && value > Decimal::ZERO {
        let minimum = scaled_minimum(OWNER_MINIMUM_BASE, percentage);
        if value < minimum {
            return Err(IncomeThresholdError::OwnerMinimum { minimum });
        }
    }

    if value < Decimal::ZERO {
        return Err(IncomeThresholdError::NegativeValue);
    }

    if let Some(maximum) = absolute_max {
        if value > maximum {
            return Err(IncomeThresholdError::MaxExceeded { maximum });
        }
    }

    Ok(())
}

/// Pulls the work percentage out of a workload label such as `"80%"` or
/// `"Pensum 50 %"`. Falls back to 100 when nothing usable is found.
pub fn workload_percentage(label: Option<&str>) -> Decimal {
    label.and_then(parse_leading_number).unwrap_or(Decimal::ONE_HUNDRED)
}

fn parse_leading_number(label: &str) -> Option<Decimal> {
    let start = label.find(|ch: char| ch.is_ascii_digit())?;
    let number: String = label[start..]
        .chars()
        .take_while(|ch| ch.is_ascii_digit() || *ch == '.' || *ch == ',')
        .map(|ch| if ch == ',' { '.' } else { ch })
        .collect();

    number
        .trim_end_matches('.')
        .parse::<Decimal>()
        .ok()
        .filter(|value| *value > Decimal::ZERO && *value <= Decimal::ONE_HUNDRED)
}
