use std::path::PathBuf;

use chrono::NaiveDate;
use fuv_core::{Corrections, HashStatus, QuoteEvaluation};
use serde::Serialize;

use crate::commands::{notice_messages, open_quote, CommandResult};

#[derive(Debug, Clone)]
pub struct CheckArgs {
    pub quote_path: PathBuf,
    pub today: Option<NaiveDate>,
}

#[derive(Debug, Serialize)]
struct CheckDetails<'a> {
    quote_id: &'a str,
    ready: bool,
    evaluation: QuoteEvaluation,
    corrections: Corrections,
    hash_status: HashStatus,
    notices: Vec<String>,
}

/// Runs the opening sequence and reports every gate without writing back.
pub fn run(args: &CheckArgs) -> CommandResult {
    let opened = match open_quote("check", &args.quote_path, args.today) {
        Ok(opened) => opened,
        Err(result) => return result,
    };

    let evaluation = opened.engine.evaluate(&opened.quote);
    let checklist_ok = evaluation.checklist.map_or(true, |decision| decision.valid);
    let ready = evaluation.basis_errors.is_empty()
        && evaluation.pricing_step_complete
        && !evaluation.needs_recalculation
        && checklist_ok;

    let open_issues = evaluation.basis_errors.len() + evaluation.pricing_errors.len();
    let message = if ready {
        format!("quote {} can proceed", opened.quote.id.0)
    } else {
        format!("quote {} has {open_issues} open field issue(s)", opened.quote.id.0)
    };

    CommandResult::success_with_details(
        "check",
        message,
        CheckDetails {
            quote_id: &opened.quote.id.0,
            ready,
            evaluation,
            corrections: opened.corrections,
            hash_status: opened.hash_status,
            notices: notice_messages(opened.notices.visible()),
        },
    )
}
