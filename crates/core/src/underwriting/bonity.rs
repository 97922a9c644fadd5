use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::domain::checklist::{BonityTier, Checklist};
use crate::domain::quote::{InsuredPerson, Quote};
use crate::errors::RemoteError;
use crate::inflight::InFlight;
use crate::services::BonityService;

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct BonityRequest {
    pub first_name: String,
    pub last_name: String,
    pub date_of_birth: NaiveDate,
    pub street: String,
    pub postal_code: String,
    pub city: String,
    pub country: String,
}

impl BonityRequest {
    /// `None` when the identity fields needed for a lookup are missing.
    pub fn for_person(person: &InsuredPerson) -> Option<Self> {
        if person.first_name.trim().is_empty() || person.last_name.trim().is_empty() {
            return None;
        }

        Some(Self {
            first_name: person.first_name.trim().to_string(),
            last_name: person.last_name.trim().to_string(),
            date_of_birth: person.date_of_birth?,
            street: person.street.clone(),
            postal_code: person.postal_code.clone(),
            city: person.city.clone(),
            country: person.country.clone(),
        })
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct BonityReport {
    pub colour: String,
    #[serde(default)]
    pub comment: Option<String>,
    #[serde(default)]
    pub audit_flag: bool,
    pub report_id: String,
}

/// Maps the provider's colour scale onto the internal tiers. Anything outside
/// the green, yellow and red families counts as medium.
pub fn tier_for_colour(colour: &str) -> BonityTier {
    let colour = colour.trim().to_ascii_lowercase();

    COLOUR_FAMILIES
        .iter()
        .find(|(names, _)| names.iter().any(|name| colour.contains(name)))
        .map_or(BonityTier::Medium, |(_, tier)| *tier)
}

const COLOUR_FAMILIES: [(&[&str], BonityTier); 3] = [
    (&["green", "gruen", "grün"], BonityTier::High),
    (&["red", "rot"], BonityTier::Low),
    (&["yellow", "gelb", "orange", "amber"], BonityTier::Medium),
];

/// Checklist fields derived from one lookup.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BonityUpdate {
    pub external_bonity: BonityTier,
    pub comment: Option<String>,
    pub audit_flag: bool,
    pub report_id: String,
}

impl From<BonityReport> for BonityUpdate {
    fn from(report: BonityReport) -> Self {
        Self {
            external_bonity: tier_for_colour(&report.colour),
            comment: report.comment.filter(|comment| !comment.trim().is_empty()),
            audit_flag: report.audit_flag,
            report_id: report.report_id,
        }
    }
}

impl BonityUpdate {
    /// A provider comment never overwrites one the user already entered.
    pub fn apply_to(self, checklist: &mut Checklist) {
        checklist.external_bonity = Some(self.external_bonity);
        if !checklist.has_comment() {
            checklist.external_rating_comment = self.comment;
        }
        checklist.audit_flag = self.audit_flag;
        checklist.external_report_id = Some(self.report_id);
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum BonityOutcome {
    Updated,
    MissingIdentity,
    AlreadyInFlight,
    Failed(RemoteError),
}

pub struct BonityCoordinator<S> {
    service: S,
    in_flight: InFlight,
}

impl<S> BonityCoordinator<S>
where
    S: BonityService,
{
    pub fn new(service: S) -> Self {
        Self { service, in_flight: InFlight::new() }
    }

    /// Looks up the insured person and folds the result into the checklist.
    /// A failed lookup leaves the checklist as it was, and validity keeps
    /// evaluating from those values.
    pub async fn refresh(&self, quote: &mut Quote) -> BonityOutcome {
        match BonityRequest::for_person(&quote.insured) {
            None => BonityOutcome::MissingIdentity,
            Some(request) => self.lookup(quote, &request).await,
        }
    }

    async fn lookup(&self, quote: &mut Quote, request: &BonityRequest) -> BonityOutcome {
        let Some(_guard) = self.in_flight.try_acquire(&quote.id) else {
            info!(
                event_name = "underwriting.bonity.suppressed",
                quote_id = %quote.id.0,
                "bonity lookup already in flight"
            );
            return BonityOutcome::AlreadyInFlight;
        };

        match self.service.lookup(request).await {
            Ok(report) => {
                info!(
                    event_name = "underwriting.bonity.received",
                    quote_id = %quote.id.0,
                    report_id = %report.report_id,
                    "bonity report received"
                );
                BonityUpdate::from(report).apply_to(quote.checklist_mut());
                BonityOutcome::Updated
            }
            Err(error) => {
                warn!(
                    event_name = "underwriting.bonity.failed",
                    quote_id = %quote.id.0,
                    detail = %error.detail,
                    "bonity lookup failed, keeping existing rating"
                );
                BonityOutcome::Failed(error)
            }
        }
    }
}
