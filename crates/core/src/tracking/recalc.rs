use tracing::{info, warn};

use crate::domain::assignment::{Requester, TechnicalAssignment, TechnicalBasis};
use crate::domain::quote::{Quote, QuoteId};
use crate::errors::{ApplicationError, DomainError};
use crate::inflight::InFlight;
use crate::pricing::variants::PricingContext;
use crate::services::TechnicalAssignmentService;
use crate::tracking::hash::{composition_hash, needs_recalculation, reconcile_hash, HashStatus};

/// Result of a remote recalculation, ready to be written into the quote it
/// was requested for. Dropping it discards the result.
#[derive(Clone, Debug, PartialEq)]
pub struct AssignmentUpdate {
    pub quote_id: QuoteId,
    pub basis: TechnicalBasis,
    pub basis_hash: String,
    pub assignment: TechnicalAssignment,
}

impl AssignmentUpdate {
    /// Stores snapshot, hash and assignment together and re-prices every
    /// variant. If the basis was edited while the request was outstanding the
    /// quote is left marked as needing another recalculation.
    pub fn apply(self, quote: &mut Quote) -> Result<(), DomainError> {
        if quote.id != self.quote_id {
            return Err(DomainError::InvariantViolation(format!(
                "assignment for {} cannot be applied to {}",
                self.quote_id.0, quote.id.0
            )));
        }

        quote.confirmed_basis = Some(self.basis);
        quote.basis_hash = Some(self.basis_hash);
        quote.assignment = Some(self.assignment);

        let context = PricingContext::for_quote(quote);
        quote.variants.reprice_all(&context);
        Ok(())
    }
}

#[derive(Clone, Debug, PartialEq)]
pub enum RecalculationOutcome {
    UpToDate,
    AlreadyInFlight,
    Recalculated(AssignmentUpdate),
}

pub struct RecalculationCoordinator<S> {
    service: S,
    in_flight: InFlight,
}

impl<S> RecalculationCoordinator<S>
where
    S: TechnicalAssignmentService,
{
    pub fn new(service: S) -> Self {
        Self { service, in_flight: InFlight::new() }
    }

    pub fn is_in_flight(&self, quote_id: &QuoteId) -> bool {
        self.in_flight.is_in_flight(quote_id)
    }

    /// Requests a new assignment if the quote's basis no longer matches the
    /// stored hash. Never touches the quote; on failure nothing needs undoing.
    pub async fn recalculate(
        &self,
        quote: &Quote,
        requester: Option<&Requester>,
    ) -> Result<RecalculationOutcome, ApplicationError> {
        let requester =
            requester.ok_or_else(|| DomainError::MissingRequester(quote.id.clone()))?;

        let current_hash = composition_hash(&quote.basis);
        if !needs_recalculation(
            quote.basis_hash.as_deref(),
            &current_hash,
            quote.assignment.is_some(),
        ) {
            return Ok(RecalculationOutcome::UpToDate);
        }

        let Some(_guard) = self.in_flight.try_acquire(&quote.id) else {
            info!(
                event_name = "tracking.recalculation.suppressed",
                quote_id = %quote.id.0,
                "technical assignment request already in flight"
            );
            return Ok(RecalculationOutcome::AlreadyInFlight);
        };

        info!(
            event_name = "tracking.recalculation.requested",
            quote_id = %quote.id.0,
            requester = %requester.user_id,
            "requesting technical assignment"
        );

        let basis = quote.basis.clone();
        match self.service.calculate(&basis, requester).await {
            Ok(assignment) => {
                info!(
                    event_name = "tracking.recalculation.succeeded",
                    quote_id = %quote.id.0,
                    base_level = assignment.base_level,
                    "technical assignment received"
                );
                Ok(RecalculationOutcome::Recalculated(AssignmentUpdate {
                    quote_id: quote.id.clone(),
                    basis,
                    basis_hash: current_hash,
                    assignment,
                }))
            }
            Err(error) => {
                warn!(
                    event_name = "tracking.recalculation.failed",
                    quote_id = %quote.id.0,
                    detail = %error.detail,
                    "technical assignment request failed"
                );
                Err(error.into())
            }
        }
    }

    /// Backfills legacy hashes, recalculates when needed and applies the
    /// result in one go.
    pub async fn ensure_assignment(
        &self,
        quote: &mut Quote,
        requester: Option<&Requester>,
    ) -> Result<HashStatus, ApplicationError> {
        let status = reconcile_hash(quote);
        if matches!(status, HashStatus::UpToDate | HashStatus::Backfilled) {
            return Ok(status);
        }

        match self.recalculate(quote, requester).await? {
            RecalculationOutcome::Recalculated(update) => {
                update.apply(quote)?;
                Ok(HashStatus::UpToDate)
            }
            RecalculationOutcome::UpToDate => Ok(HashStatus::UpToDate),
            RecalculationOutcome::AlreadyInFlight => Ok(status),
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use async_trait::async_trait;
    use rust_decimal::Decimal;

    use super::*;
    use crate::domain::activity::ActivityId;
    use crate::domain::quote::QuoteKind;
    use crate::domain::variant::VariantSlot;
    use crate::errors::RemoteError;
    use crate::tracking::hash::usable_assignment;
    use crate::validation::income::IncomeRules;

    struct FakeAssignments {
        calls: AtomicUsize,
        fail: bool,
    }

    impl FakeAssignments {
        fn ok() -> Self {
            Self { calls: AtomicUsize::new(0), fail: false }
        }

        fn failing() -> Self {
            Self { calls: AtomicUsize::new(0), fail: true }
        }

        fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl TechnicalAssignmentService for FakeAssignments {
        async fn calculate(
            &self,
            basis: &TechnicalBasis,
            _requester: &Requester,
        ) -> Result<TechnicalAssignment, RemoteError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if self.fail {
                return Err(RemoteError::from_payload(
                    "technical_assignment",
                    r#"{"detail": "Tätigkeit unbekannt"}"#,
                ));
            }
            Ok(TechnicalAssignment {
                base_premium_rate: Decimal::new(245, 2),
                base_level: 10 + i64::from(basis.headcount),
                classes: Vec::new(),
            })
        }
    }

    fn requester() -> Requester {
        Requester { user_id: "agent-7".to_string(), agency_id: None }
    }

    fn quote() -> Quote {
        let mut quote = Quote::new(QuoteId("Q-r".to_string()), QuoteKind::NewBusiness);
        quote.basis.composition.add(ActivityId("X".into()), Decimal::from(60)).expect("add");
        quote.basis.composition.add(ActivityId("Y".into()), Decimal::from(40)).expect("add");
        quote.basis.work_percentage = Decimal::from(100);
        quote.basis.headcount = 2;
        quote
    }

    #[tokio::test]
    async fn missing_requester_is_rejected_before_remote_call() {
        let coordinator = RecalculationCoordinator::new(FakeAssignments::ok());

        let result = coordinator.recalculate(&quote(), None).await;

        assert!(matches!(
            result,
            Err(ApplicationError::Domain(DomainError::MissingRequester(_)))
        ));
        assert_eq!(coordinator.service.calls(), 0);
    }

    #[tokio::test]
    async fn no_recalculation_after_success_until_basis_changes() {
        let coordinator = RecalculationCoordinator::new(FakeAssignments::ok());
        let mut quote = quote();

        let status = coordinator.ensure_assignment(&mut quote, Some(&requester())).await;
        assert_eq!(status, Ok(HashStatus::UpToDate));
        assert_eq!(quote.assignment.as_ref().map(|a| a.base_level), Some(12));
        assert_eq!(quote.confirmed_basis.as_ref(), Some(&quote.basis));

        let again = coordinator.recalculate(&quote, Some(&requester())).await;
        assert_eq!(again, Ok(RecalculationOutcome::UpToDate));
        assert_eq!(coordinator.service.calls(), 1);

        quote.basis.headcount = 5;
        assert!(usable_assignment(&quote).is_none());
        coordinator.ensure_assignment(&mut quote, Some(&requester())).await.expect("recalc");
        assert_eq!(quote.assignment.as_ref().map(|a| a.base_level), Some(15));
        assert_eq!(coordinator.service.calls(), 2);
    }

    #[tokio::test]
    async fn failure_leaves_quote_state_untouched() {
        let coordinator = RecalculationCoordinator::new(FakeAssignments::failing());
        let mut quote = quote();
        let before = quote.clone();

        let error = coordinator
            .ensure_assignment(&mut quote, Some(&requester()))
            .await
            .expect_err("remote failure");

        assert_eq!(error.user_message(), "Tätigkeit unbekannt");
        assert_eq!(quote, before);
        assert!(!coordinator.is_in_flight(&quote.id));
    }

    #[tokio::test]
    async fn duplicate_trigger_while_in_flight_is_a_no_op() {
        let coordinator = RecalculationCoordinator::new(FakeAssignments::ok());
        let quote = quote();

        let _guard = coordinator.in_flight.try_acquire(&quote.id).expect("acquire");
        let outcome = coordinator.recalculate(&quote, Some(&requester())).await;

        assert_eq!(outcome, Ok(RecalculationOutcome::AlreadyInFlight));
        assert_eq!(coordinator.service.calls(), 0);
    }

    #[tokio::test]
    async fn applying_an_update_reprices_variants() {
        let coordinator = RecalculationCoordinator::new(FakeAssignments::ok());
        let mut quote = quote();
        let context = PricingContext::for_quote(&quote);
        quote.variants.set_income(VariantSlot::A, Some(Decimal::from(60_000)), &context, &IncomeRules::default());
        quote.variants.set_deferral_period(VariantSlot::A, Some("3".to_string()), &context);
        assert_eq!(quote.variants.get(VariantSlot::A).gross_annual_premium, Decimal::ZERO);

        let outcome = coordinator.recalculate(&quote, Some(&requester())).await.expect("outcome");
        let RecalculationOutcome::Recalculated(update) = outcome else {
            panic!("expected a recalculation");
        };
        update.apply(&mut quote).expect("apply");

        // 60'000 / 100 * 12
        assert_eq!(quote.variants.get(VariantSlot::A).gross_annual_premium, Decimal::from(7_200));
    }

    #[tokio::test]
    async fn update_for_another_quote_is_rejected() {
        let coordinator = RecalculationCoordinator::new(FakeAssignments::ok());
        let outcome = coordinator.recalculate(&quote(), Some(&requester())).await.expect("outcome");
        let RecalculationOutcome::Recalculated(update) = outcome else {
            panic!("expected a recalculation");
        };

        let mut other = Quote::new(QuoteId("Q-other".to_string()), QuoteKind::NewBusiness);
        assert!(matches!(update.apply(&mut other), Err(DomainError::InvariantViolation(_))));
        assert!(other.assignment.is_none());
    }
}
