use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::domain::assignment::{AgencyCompetence, TechnicalAssignment, TechnicalBasis};
use crate::domain::checklist::Checklist;
use crate::domain::contract::ContractTerms;
use crate::domain::variant::{PaymentDetails, PaymentFrequency};
use crate::pricing::variants::VariantSet;
use crate::underwriting::checklist::evaluate;

#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct QuoteId(pub String);

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QuoteKind {
    #[default]
    NewBusiness,
    ContractRenewal,
    /// Renewal offer prepared outside the contract lifecycle. Not subject to
    /// the malus rule.
    RenewalOffer,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct InsuredPerson {
    pub first_name: String,
    pub last_name: String,
    #[serde(default)]
    pub date_of_birth: Option<NaiveDate>,
    #[serde(default)]
    pub street: String,
    #[serde(default)]
    pub postal_code: String,
    #[serde(default)]
    pub city: String,
    #[serde(default)]
    pub country: String,
    #[serde(default)]
    pub role_code: Option<String>,
    #[serde(default)]
    pub workload_label: Option<String>,
}

/// In-memory quote record as held by the external quote store.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Quote {
    pub id: QuoteId,
    #[serde(default)]
    pub kind: QuoteKind,
    #[serde(default)]
    pub read_only: bool,
    #[serde(default)]
    pub insured: InsuredPerson,
    #[serde(default)]
    pub contract: ContractTerms,
    /// Basis currently being edited.
    #[serde(default)]
    pub basis: TechnicalBasis,
    /// Basis the current assignment was computed from.
    #[serde(default)]
    pub confirmed_basis: Option<TechnicalBasis>,
    #[serde(default)]
    pub basis_hash: Option<String>,
    #[serde(default)]
    pub assignment: Option<TechnicalAssignment>,
    #[serde(default)]
    pub agency_competence: AgencyCompetence,
    #[serde(default)]
    pub variants: VariantSet,
    #[serde(default)]
    pub payment_frequency: Option<PaymentFrequency>,
    #[serde(default)]
    pub payment_details: Option<PaymentDetails>,
    #[serde(default)]
    checklist: Option<Checklist>,
}

impl Quote {
    pub fn new(id: QuoteId, kind: QuoteKind) -> Self {
        Self {
            id,
            kind,
            read_only: false,
            insured: InsuredPerson::default(),
            contract: ContractTerms::default(),
            basis: TechnicalBasis::default(),
            confirmed_basis: None,
            basis_hash: None,
            assignment: None,
            agency_competence: AgencyCompetence::default(),
            variants: VariantSet::default(),
            payment_frequency: None,
            payment_details: None,
            checklist: None,
        }
    }

    pub fn checklist(&self) -> Option<&Checklist> {
        self.checklist.as_ref()
    }

    /// Evaluates the checklist against the quote kind on every call.
    pub fn checklist_valid(&self) -> Option<bool> {
        self.checklist().map(|checklist| evaluate(checklist, self.kind).valid)
    }

    /// Returns the quote's single checklist, creating it on first access.
    pub fn checklist_mut(&mut self) -> &mut Checklist {
        self.checklist.get_or_insert_with(|| Checklist::new(None, None))
    }
}
