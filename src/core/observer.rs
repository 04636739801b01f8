//! Change notifications the ledger session sends to its display layer.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use crate::{
    errors::{LedgerError, ValidationError},
    ledger::{Aggregates, Transaction},
};

/// Receives ledger notifications. Every method defaults to doing nothing.
pub trait LedgerObserver: Send {
    /// The visible (filtered) transaction list was replaced.
    fn on_transactions_changed(&mut self, _view: &[&Transaction]) {}

    fn on_aggregates_changed(&mut self, _aggregates: &Aggregates) {}

    fn on_validation_error(&mut self, _error: ValidationError) {}

    /// A save failed after its retries were exhausted; the in-memory ledger is unaffected.
    fn on_persistence_failed(&mut self, _error: &LedgerError) {}
}

/// Owned copy of a notification, for hosts that poll rather than react.
#[derive(Debug, Clone, PartialEq)]
pub enum LedgerEvent {
    TransactionsChanged(Vec<Transaction>),
    AggregatesChanged(Aggregates),
    ValidationFailed(ValidationError),
    PersistenceFailed(String),
}

/// Observer that queues every notification as a [`LedgerEvent`].
///
/// Clones share the same queue, so one handle can be registered while another drains it.
#[derive(Debug, Clone, Default)]
pub struct EventRecorder {
    events: Arc<Mutex<Vec<LedgerEvent>>>,
}

impl EventRecorder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Removes and returns everything recorded so far.
    pub fn drain(&self) -> Vec<LedgerEvent> {
        std::mem::take(&mut *self.events())
    }

    pub fn len(&self) -> usize {
        self.events().len()
    }

    pub fn is_empty(&self) -> bool {
        self.events().is_empty()
    }

    fn events(&self) -> MutexGuard<'_, Vec<LedgerEvent>> {
        self.events.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn push(&self, event: LedgerEvent) {
        self.events().push(event);
    }
}

impl LedgerObserver for EventRecorder {
    fn on_transactions_changed(&mut self, view: &[&Transaction]) {
        self.push(LedgerEvent::TransactionsChanged(
            view.iter().map(|txn| (*txn).clone()).collect(),
        ));
    }

    fn on_aggregates_changed(&mut self, aggregates: &Aggregates) {
        self.push(LedgerEvent::AggregatesChanged(*aggregates));
    }

    fn on_validation_error(&mut self, error: ValidationError) {
        self.push(LedgerEvent::ValidationFailed(error));
    }

    fn on_persistence_failed(&mut self, error: &LedgerError) {
        self.push(LedgerEvent::PersistenceFailed(error.to_string()));
    }
}
