pub mod config;
pub mod domain;
pub mod engine;
pub mod errors;
pub mod inflight;
pub mod notices;
pub mod pricing;
pub mod services;
pub mod tracking;
pub mod underwriting;
pub mod validation;

pub use domain::assignment::{AgencyCompetence, Requester, TechnicalAssignment, TechnicalBasis};
pub use domain::quote::{InsuredPerson, Quote, QuoteId, QuoteKind};
pub use domain::variant::{PaymentDetails, PaymentFrequency, Variant, VariantSlot};
pub use engine::{Corrections, EngineSettings, QuoteEngine, QuoteEvaluation};
pub use errors::{ApplicationError, DomainError, RemoteError};
pub use notices::{Notice, NoticeBoard, NoticeKind};
pub use pricing::variants::{PricingContext, VariantSet};
pub use services::{
    BonityService, CachedIncomeCeiling, IncomeCeilingService, StaticIncomeCeiling,
    TechnicalAssignmentService,
};
pub use tracking::hash::{composition_hash, needs_recalculation, HashStatus};
pub use tracking::recalc::{AssignmentUpdate, RecalculationCoordinator, RecalculationOutcome};
pub use underwriting::bonity::{BonityCoordinator, BonityOutcome};
pub use validation::FieldErrors;
