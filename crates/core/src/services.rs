use async_trait::async_trait;
use rust_decimal::Decimal;
use tokio::sync::OnceCell;
use tracing::warn;

use crate::domain::assignment::{Requester, TechnicalAssignment, TechnicalBasis};
use crate::errors::RemoteError;
use crate::underwriting::bonity::{BonityReport, BonityRequest};

/// Backend that classifies an activity composition.
#[async_trait]
pub trait TechnicalAssignmentService: Send + Sync {
    async fn calculate(
        &self,
        basis: &TechnicalBasis,
        requester: &Requester,
    ) -> Result<TechnicalAssignment, RemoteError>;
}

/// Third-party credit rating lookup.
#[async_trait]
pub trait BonityService: Send + Sync {
    async fn lookup(&self, request: &BonityRequest) -> Result<BonityReport, RemoteError>;
}

#[async_trait]
pub trait IncomeCeilingService: Send + Sync {
    async fn fetch_ceiling(&self) -> Result<Decimal, RemoteError>;
}

/// Ceiling known up front, e.g. from configuration.
#[derive(Clone, Debug)]
pub struct StaticIncomeCeiling(pub Decimal);

#[async_trait]
impl IncomeCeilingService for StaticIncomeCeiling {
    async fn fetch_ceiling(&self) -> Result<Decimal, RemoteError> {
        Ok(self.0)
    }
}

/// Fetches the ceiling once and serves the cached value afterwards. A failed
/// fetch is not cached, so the next call retries.
pub struct CachedIncomeCeiling<S> {
    service: S,
    ceiling: OnceCell<Decimal>,
}

impl<S> CachedIncomeCeiling<S>
where
    S: IncomeCeilingService,
{
    pub fn new(service: S) -> Self {
        Self { service, ceiling: OnceCell::new() }
    }

    pub async fn ceiling(&self) -> Result<Decimal, RemoteError> {
        self.ceiling.get_or_try_init(|| self.service.fetch_ceiling()).await.copied()
    }

    /// Cached value, or `None` when it is not available. Income validation
    /// then runs without an absolute maximum.
    pub async fn ceiling_or_none(&self) -> Option<Decimal> {
        match self.ceiling().await {
            Ok(ceiling) => Some(ceiling),
            Err(error) => {
                warn!(
                    event_name = "services.income_ceiling.unavailable",
                    detail = %error.detail,
                    "income ceiling lookup failed"
                );
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use async_trait::async_trait;
    use rust_decimal::Decimal;

    use super::{CachedIncomeCeiling, IncomeCeilingService, StaticIncomeCeiling};
    use crate::errors::RemoteError;

    struct CountingCeiling {
        calls: AtomicUsize,
        fail_first: bool,
    }

    #[async_trait]
    impl IncomeCeilingService for CountingCeiling {
        async fn fetch_ceiling(&self) -> Result<Decimal, RemoteError> {
            let call = self.calls.fetch_add(1, Ordering::SeqCst);
            if self.fail_first && call == 0 {
                return Err(RemoteError::new("income_ceiling", "timeout"));
            }
            Ok(Decimal::from(148_200))
        }
    }

    #[tokio::test]
    async fn ceiling_is_fetched_once() {
        let cache = CachedIncomeCeiling::new(CountingCeiling {
            calls: AtomicUsize::new(0),
            fail_first: false,
        });

        assert_eq!(cache.ceiling().await, Ok(Decimal::from(148_200)));
        assert_eq!(cache.ceiling().await, Ok(Decimal::from(148_200)));
        assert_eq!(cache.service.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn failed_fetch_is_retried() {
        let cache = CachedIncomeCeiling::new(CountingCeiling {
            calls: AtomicUsize::new(0),
            fail_first: true,
        });

        assert_eq!(cache.ceiling_or_none().await, None);
        assert_eq!(cache.ceiling_or_none().await, Some(Decimal::from(148_200)));
    }

    #[tokio::test]
    async fn static_ceiling_returns_configured_value() {
        let cache = CachedIncomeCeiling::new(StaticIncomeCeiling(Decimal::from(126_000)));
        assert_eq!(cache.ceiling().await, Ok(Decimal::from(126_000)));
    }
}
