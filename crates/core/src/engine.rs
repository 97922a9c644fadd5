use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::domain::assignment::AgencyCompetence;
use crate::domain::contract::TermsVersion;
use crate::domain::quote::Quote;
use crate::notices::NoticeBoard;
use crate::pricing::variants::PricingContext;
use crate::tracking::hash::{composition_hash, needs_recalculation, reconcile_hash, HashStatus};
use crate::underwriting::checklist::{self, ValidityDecision};
use crate::validation::duration::{
    correct_contract_dates, default_contract_dates, DateCorrection, DurationCatalog,
};
use crate::validation::income::IncomeRules;
use crate::validation::terms::{correct_terms_code, TermsCorrection};
use crate::validation::{validate_basis_step, FieldErrors};

/// Lookup data the engine needs besides the quote itself.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct EngineSettings {
    pub duration_catalog: DurationCatalog,
    pub default_duration_code: Option<String>,
    pub active_terms: Vec<TermsVersion>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Corrections {
    pub dates: DateCorrection,
    pub terms: TermsCorrection,
}

impl Corrections {
    pub fn any(&self) -> bool {
        self.dates.should_correct || self.terms.should_correct
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuoteEvaluation {
    pub basis_errors: FieldErrors,
    pub pricing_errors: FieldErrors,
    pub pricing_step_complete: bool,
    pub composition_hash: String,
    pub needs_recalculation: bool,
    pub checklist: Option<ValidityDecision>,
    pub comment_required: bool,
}

/// Synchronous quote operations. Every method recomputes derived fields
/// explicitly after the input it changes.
#[derive(Clone, Debug, Default)]
pub struct QuoteEngine {
    settings: EngineSettings,
}

impl QuoteEngine {
    pub fn new(settings: EngineSettings) -> Self {
        Self { settings }
    }

    pub fn settings(&self) -> &EngineSettings {
        &self.settings
    }

    pub fn income_rules(&self, quote: &Quote, income_ceiling: Option<Decimal>) -> IncomeRules {
        IncomeRules::for_person(
            quote.insured.role_code.as_deref(),
            quote.insured.workload_label.as_deref(),
            income_ceiling,
        )
    }

    /// Fresh quotes get dates derived from `today` and the default duration.
    pub fn initialize(&self, quote: &mut Quote, today: NaiveDate) {
        let Some(default_code) = self.settings.default_duration_code.as_deref() else {
            return;
        };
        default_contract_dates(&mut quote.contract, today, default_code, &self.settings.duration_catalog);
    }

    /// Silent corrections for a quote read from the store.
    pub fn apply_corrections(&self, quote: &mut Quote, notices: &mut NoticeBoard) -> Corrections {
        let dates = correct_contract_dates(
            &mut quote.contract,
            &self.settings.duration_catalog,
            quote.read_only,
            notices,
        );
        let terms = correct_terms_code(
            &mut quote.contract,
            &self.settings.active_terms,
            quote.read_only,
            notices,
        );
        Corrections { dates, terms }
    }

    /// Everything that runs when a quote is opened: origin marking, date
    /// defaults for records without dates, corrections, hash backfill and
    /// re-pricing.
    pub fn open(
        &self,
        quote: &mut Quote,
        today: NaiveDate,
        income_ceiling: Option<Decimal>,
        notices: &mut NoticeBoard,
    ) -> (Corrections, HashStatus) {
        quote.contract.mark_loaded();
        self.initialize(quote, today);
        let corrections = self.apply_corrections(quote, notices);
        let status = reconcile_hash(quote);
        self.reprice(quote, income_ceiling);
        (corrections, status)
    }

    /// Re-prices and re-validates all three variants.
    pub fn reprice(&self, quote: &mut Quote, income_ceiling: Option<Decimal>) {
        let context = PricingContext::for_quote(quote);
        let rules = self.income_rules(quote, income_ceiling);
        quote.variants.reprice_all(&context);
        quote.variants.validate_incomes(&rules);
    }

    /// The assignment is untouched; only premiums follow the new competence.
    pub fn set_agency_competence(&self, quote: &mut Quote, competence: AgencyCompetence) {
        quote.agency_competence = competence;
        let context = PricingContext::for_quote(quote);
        quote.variants.reprice_all(&context);
    }

    pub fn evaluate(&self, quote: &Quote) -> QuoteEvaluation {
        let current_hash = composition_hash(&quote.basis);
        let pricing_errors = quote
            .variants
            .pricing_step_errors(quote.payment_frequency, quote.payment_details.as_ref());

        QuoteEvaluation {
            basis_errors: validate_basis_step(quote),
            pricing_step_complete: pricing_errors.is_empty(),
            pricing_errors,
            needs_recalculation: needs_recalculation(
                quote.basis_hash.as_deref(),
                &current_hash,
                quote.assignment.is_some(),
            ),
            composition_hash: current_hash,
            checklist: checklist::decide(quote),
            comment_required: quote.checklist().is_some_and(checklist::comment_required),
        }
    }
}
