pub mod duration;
pub mod income;
pub mod terms;

use std::collections::BTreeMap;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::domain::quote::Quote;

/// Validation errors keyed by form field name.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FieldErrors {
    errors: BTreeMap<String, String>,
}

impl FieldErrors {
    pub fn insert(&mut self, field: impl Into<String>, message: impl Into<String>) {
        self.errors.entry(field.into()).or_insert_with(|| message.into());
    }

    pub fn get(&self, field: &str) -> Option<&str> {
        self.errors.get(field).map(String::as_str)
    }

    pub fn contains(&self, field: &str) -> bool {
        self.errors.contains_key(field)
    }

    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn len(&self) -> usize {
        self.errors.len()
    }

    pub fn fields(&self) -> impl Iterator<Item = &str> {
        self.errors.keys().map(String::as_str)
    }
}

/// Form validation for the contract and technical-basis step.
pub fn validate_basis_step(quote: &Quote) -> FieldErrors {
    let mut errors = FieldErrors::default();
    let basis = &quote.basis;

    if basis.composition.is_empty() {
        errors.insert("composition", "at least one activity is required");
    } else if !basis.composition.is_complete() {
        errors.insert(
            "compositionTotal",
            format!("activity percentages must total 100, not {}", basis.composition.total()),
        );
    }

    if basis.work_percentage <= Decimal::ZERO || basis.work_percentage > Decimal::ONE_HUNDRED
    {
        errors.insert("workPercentage", "work percentage must be between 0 and 100");
    }

    if basis.headcount == 0 {
        errors.insert("headcount", "headcount must be at least 1");
    }

    if let Err(error) = duration::validate_end_date(quote.contract.start_date, quote.contract.end_date)
    {
        errors.insert("contractEnd", error.message());
    }

    if quote.contract.duration_code.is_none() {
        errors.insert("durationCode", "contract duration is required");
    }

    errors
}
