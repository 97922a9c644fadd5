use serde::{Deserialize, Serialize};
use tracing::info;

use crate::domain::contract::{ContractTerms, TermsVersion};
use crate::notices::{Notice, NoticeBoard};

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TermsCorrection {
    pub should_correct: bool,
    pub latest_code: Option<String>,
    pub original_code: Option<String>,
}

/// Active version with the highest sort key.
pub fn latest_terms(active: &[TermsVersion]) -> Option<&TermsVersion> {
    active.iter().max_by_key(|version| version.sort_key)
}

/// A missing current code is left to the default-assignment path.
pub fn check_terms_code(
    current_code: Option<&str>,
    active: &[TermsVersion],
    read_only: bool,
) -> TermsCorrection {
    let original_code = current_code.map(str::to_string);
    let latest_code = latest_terms(active).map(|version| version.code.clone());

    let should_correct = match (current_code, latest_code.as_deref()) {
        (Some(current), Some(latest)) => !read_only && current != latest,
        _ => false,
    };

    TermsCorrection { should_correct, latest_code, original_code }
}

pub fn correct_terms_code(
    contract: &mut ContractTerms,
    active: &[TermsVersion],
    read_only: bool,
    notices: &mut NoticeBoard,
) -> TermsCorrection {
    let correction = check_terms_code(contract.terms_code.as_deref(), active, read_only);

    if let (true, Some(latest), Some(original)) =
        (correction.should_correct, &correction.latest_code, &correction.original_code)
    {
        info!(
            event_name = "contract.terms_code.corrected",
            original = %original,
            corrected = %latest,
            "contract referenced outdated general conditions"
        );
        contract.terms_code = Some(latest.clone());
        notices.issue(Notice::TermsCorrected {
            original: original.clone(),
            corrected: latest.clone(),
        });
    }

    correction
}
