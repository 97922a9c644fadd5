use serde::Serialize;
use sha2::{Digest, Sha256};
use tracing::info;

use crate::domain::assignment::{TechnicalAssignment, TechnicalBasis};
use crate::domain::quote::Quote;

#[derive(Serialize)]
struct CanonicalShare<'a> {
    id: &'a str,
    code: &'a str,
    pct: String,
}

#[derive(Serialize)]
struct CanonicalBasis<'a> {
    activities: Vec<CanonicalShare<'a>>,
    work_percentage: String,
    headcount: u32,
}

/// Order-sensitive serialization of the inputs that determine the technical
/// assignment. Decimals are normalized so `60` and `60.00` serialize alike.
pub fn canonical_basis(basis: &TechnicalBasis) -> String {
    let canonical = CanonicalBasis {
        activities: basis
            .composition
            .shares()
            .iter()
            .map(|share| CanonicalShare {
                id: share.activity_id.0.as_str(),
                code: share.activity_code.as_deref().unwrap_or(""),
                pct: share.percentage.normalize().to_string(),
            })
            .collect(),
        work_percentage: basis.work_percentage.normalize().to_string(),
        headcount: basis.headcount,
    };

    match serde_json::to_string(&canonical) {
        Ok(payload) => payload,
        Err(_) => format!("{:?}", basis),
    }
}

pub fn composition_hash(basis: &TechnicalBasis) -> String {
    let digest = Sha256::digest(canonical_basis(basis).as_bytes());
    format!("sha256:{:x}", digest)
}

/// A remote recalculation is needed when there is no assignment yet, or when
/// a hash was stored and no longer matches. A missing stored hash next to an
/// existing assignment is treated as valid (see [`reconcile_hash`]).
pub fn needs_recalculation(
    stored_hash: Option<&str>,
    current_hash: &str,
    has_existing_assignment: bool,
) -> bool {
    !has_existing_assignment || stored_hash.is_some_and(|stored| stored != current_hash)
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum HashStatus {
    UpToDate,
    /// Quote predates hashing: the existing assignment was adopted and the
    /// current hash stored.
    Backfilled,
    Stale,
    MissingAssignment,
}

pub fn reconcile_hash(quote: &mut Quote) -> HashStatus {
    let current = composition_hash(&quote.basis);
    let has_assignment = quote.assignment.is_some();

    if has_assignment && quote.basis_hash.is_none() {
        info!(
            event_name = "tracking.hash.backfilled",
            quote_id = %quote.id.0,
            "adopting assignment stored before hashing existed"
        );
        quote.basis_hash = Some(current);
        if quote.confirmed_basis.is_none() {
            quote.confirmed_basis = Some(quote.basis.clone());
        }
        return HashStatus::Backfilled;
    }

    if !has_assignment {
        HashStatus::MissingAssignment
    } else if needs_recalculation(quote.basis_hash.as_deref(), &current, has_assignment) {
        HashStatus::Stale
    } else {
        HashStatus::UpToDate
    }
}

/// The stored assignment, if it still belongs to the basis being edited.
pub fn usable_assignment(quote: &Quote) -> Option<&TechnicalAssignment> {
    let assignment = quote.assignment.as_ref()?;
    let stored = quote.basis_hash.as_deref()?;
    (stored == composition_hash(&quote.basis)).then_some(assignment)
}
