use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::domain::checklist::{BonityTier, Checklist};
use crate::domain::quote::{Quote, QuoteKind};

/// Approval codes that clear the checklist regardless of every other rule.
pub const EXPERT_APPROVAL_CODES: [&str; 2] =
    ["ExperteGenehmigung_OK", "ExperteGenehmigung_MitAuflagen"];

/// Rule that decided the outcome of [`evaluate`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ValidityRule {
    ExpertApproval,
    AccidentHistory,
    RenewalMalus,
    MissingRatingComment,
    Clear,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidityDecision {
    pub valid: bool,
    pub rule: ValidityRule,
}

pub fn is_expert_approved(checklist: &Checklist) -> bool {
    checklist
        .approval_type
        .as_deref()
        .is_some_and(|code| EXPERT_APPROVAL_CODES.contains(&code.trim()))
}

/// A comment is mandatory for the lowest external rating or an audit flag.
pub fn comment_required(checklist: &Checklist) -> bool {
    checklist.external_bonity == Some(BonityTier::Low) || checklist.audit_flag
}

/// Short-circuits in a fixed order: expert approval, accident history,
/// renewal malus, missing rating comment.
pub fn evaluate(checklist: &Checklist, kind: QuoteKind) -> ValidityDecision {
    let decide = |valid, rule| ValidityDecision { valid, rule };

    if is_expert_approved(checklist) {
        return decide(true, ValidityRule::ExpertApproval);
    }
    if checklist.has_accident_history() {
        return decide(false, ValidityRule::AccidentHistory);
    }
    // Only contract renewals carry a malus.
    if kind == QuoteKind::ContractRenewal && checklist.malus_surcharge > Decimal::ZERO {
        return decide(false, ValidityRule::RenewalMalus);
    }
    if comment_required(checklist) && !checklist.has_comment() {
        return decide(false, ValidityRule::MissingRatingComment);
    }

    decide(true, ValidityRule::Clear)
}

/// Decision for the quote's checklist, if it has one.
pub fn decide(quote: &Quote) -> Option<ValidityDecision> {
    quote.checklist().map(|checklist| evaluate(checklist, quote.kind))
}
