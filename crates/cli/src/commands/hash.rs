use std::path::PathBuf;

use fuv_core::tracking::hash::reconcile_hash;
use fuv_core::{composition_hash, needs_recalculation, HashStatus};
use serde::Serialize;

use crate::commands::{input_failure, read_quote, CommandResult};

#[derive(Debug, Clone)]
pub struct HashArgs {
    pub quote_path: PathBuf,
}

#[derive(Debug, Serialize)]
struct HashDetails {
    quote_id: String,
    composition_hash: String,
    stored_hash: Option<String>,
    has_assignment: bool,
    needs_recalculation: bool,
    status: HashStatus,
}

/// Needs no configuration: the hash depends on the quote alone.
pub fn run(args: &HashArgs) -> CommandResult {
    let mut quote = match read_quote(&args.quote_path) {
        Ok(quote) => quote,
        Err(error) => return input_failure("hash", error),
    };

    let current = composition_hash(&quote.basis);
    let stored_hash = quote.basis_hash.clone();
    let has_assignment = quote.assignment.is_some();
    let needs_recalculation = needs_recalculation(stored_hash.as_deref(), &current, has_assignment);
    let status = reconcile_hash(&mut quote);

    let message = if needs_recalculation {
        "technical assignment must be recalculated"
    } else {
        "technical assignment is current"
    };

    CommandResult::success_with_details(
        "hash",
        message,
        HashDetails {
            quote_id: quote.id.0,
            composition_hash: current,
            stored_hash,
            has_assignment,
            needs_recalculation,
            status,
        },
    )
}
