use std::collections::HashSet;
use std::sync::{Mutex, MutexGuard, PoisonError};

use crate::domain::quote::QuoteId;

/// Tracks which quotes have a remote request outstanding.
///
/// A second trigger for the same quote is refused instead of queued. The slot
/// is released when the returned guard drops, so an error or a discarded
/// future frees it as well.
#[derive(Debug, Default)]
pub struct InFlight {
    quotes: Mutex<HashSet<QuoteId>>,
}

impl InFlight {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn try_acquire(&self, quote_id: &QuoteId) -> Option<InFlightGuard<'_>> {
        let inserted = self.lock().insert(quote_id.clone());
        inserted.then(|| InFlightGuard { owner: self, quote_id: quote_id.clone() })
    }

    pub fn is_in_flight(&self, quote_id: &QuoteId) -> bool {
        self.lock().contains(quote_id)
    }

    fn lock(&self) -> MutexGuard<'_, HashSet<QuoteId>> {
        self.quotes.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

#[derive(Debug)]
pub struct InFlightGuard<'a> {
    owner: &'a InFlight,
    quote_id: QuoteId,
}

impl Drop for InFlightGuard<'_> {
    fn drop(&mut self) {
        self.owner.lock().remove(&self.quote_id);
    }
}
