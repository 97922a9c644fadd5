use std::collections::HashMap;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::errors::DomainError;

#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ActivityId(pub String);

/// Allowed distance of the composition total from 100.
pub const COMPOSITION_TOLERANCE: Decimal = Decimal::from_parts(1, 0, 0, false, 3);

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ActivityShare {
    pub activity_id: ActivityId,
    #[serde(default)]
    pub activity_code: Option<String>,
    pub percentage: Decimal,
}

/// Ordered list of activities and their share of the insured workload.
///
/// Percentages may drift away from 100 while the user edits; only
/// [`ActivityComposition::is_complete`] enforces the total.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ActivityComposition {
    shares: Vec<ActivityShare>,
}

impl ActivityComposition {
    pub fn new(shares: Vec<ActivityShare>) -> Self {
        Self { shares }
    }

    pub fn shares(&self) -> &[ActivityShare] {
        &self.shares
    }

    pub fn is_empty(&self) -> bool {
        self.shares.is_empty()
    }

    pub fn add(&mut self, activity_id: ActivityId, percentage: Decimal) -> Result<(), DomainError> {
        if self.position(&activity_id).is_some() {
            return Err(DomainError::DuplicateActivity(activity_id.0));
        }

        self.shares.push(ActivityShare { activity_id, activity_code: None, percentage });
        Ok(())
    }

    pub fn remove(&mut self, activity_id: &ActivityId) -> Result<ActivityShare, DomainError> {
        let index = self
            .position(activity_id)
            .ok_or_else(|| DomainError::UnknownActivity(activity_id.0.clone()))?;
        Ok(self.shares.remove(index))
    }

    pub fn set_percentage(
        &mut self,
        activity_id: &ActivityId,
        percentage: Decimal,
    ) -> Result<(), DomainError> {
        let index = self
            .position(activity_id)
            .ok_or_else(|| DomainError::UnknownActivity(activity_id.0.clone()))?;
        self.shares[index].percentage = percentage;
        Ok(())
    }

    pub fn total(&self) -> Decimal {
        self.shares.iter().map(|share| share.percentage).sum()
    }

    pub fn is_complete(&self) -> bool {
        (self.total() - Decimal::ONE_HUNDRED).abs() <= COMPOSITION_TOLERANCE
    }

    /// Fills in the activity codes known to the catalog. Unknown identifiers
    /// keep whatever code they already carry.
    pub fn resolve_codes(&mut self, catalog: &ActivityCatalog) {
        for share in &mut self.shares {
            if let Some(code) = catalog.code_for(&share.activity_id) {
                share.activity_code = Some(code.to_string());
            }
        }
    }

    fn position(&self, activity_id: &ActivityId) -> Option<usize> {
        self.shares.iter().position(|share| share.activity_id == *activity_id)
    }
}

/// Lookup from activity identifier to the activity code the assignment
/// service understands.
#[derive(Clone, Debug, Default)]
pub struct ActivityCatalog {
    codes: HashMap<ActivityId, String>,
}

impl ActivityCatalog {
    pub fn new(entries: impl IntoIterator<Item = (ActivityId, String)>) -> Self {
        Self { codes: entries.into_iter().collect() }
    }

    pub fn code_for(&self, activity_id: &ActivityId) -> Option<&str> {
        self.codes.get(activity_id).map(String::as_str)
    }
}
