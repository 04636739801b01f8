#![allow(dead_code)]

use std::{
    io,
    sync::{
        atomic::{AtomicUsize, Ordering},
        Arc,
    },
};

use chrono::NaiveDate;
use expense_core::{
    core::{
        ledger_manager::{LedgerManager, OpenReport, SessionSettings},
        EventRecorder, FixedClock,
    },
    errors::LedgerError,
    storage::{KeyValueStore, MemoryStore, PersistenceAdapter, RetryPolicy, DEFAULT_STORAGE_KEY},
};

pub fn test_date() -> NaiveDate {
    NaiveDate::from_ymd_opt(2025, 1, 5).expect("valid date")
}

pub fn adapter_for(store: Arc<dyn KeyValueStore>) -> PersistenceAdapter {
    PersistenceAdapter::new(store, DEFAULT_STORAGE_KEY).with_retry(RetryPolicy::none())
}

/// Opens a session over `store` with a fixed clock and a recorder already subscribed.
pub fn open_session(store: Arc<dyn KeyValueStore>) -> (LedgerManager, OpenReport, EventRecorder) {
    let (mut manager, report) = LedgerManager::open(
        adapter_for(store),
        Box::new(FixedClock(test_date())),
        SessionSettings::default(),
    )
    .expect("open session");
    let recorder = EventRecorder::new();
    manager.subscribe(Box::new(recorder.clone()));
    recorder.drain();
    (manager, report, recorder)
}

pub fn memory_session() -> (LedgerManager, Arc<MemoryStore>, EventRecorder) {
    let store = Arc::new(MemoryStore::new());
    let (manager, _, recorder) = open_session(store.clone());
    (manager, store, recorder)
}

/// Store whose writes fail with `kind` until `failures` attempts have been used up.
pub struct FlakyStore {
    inner: MemoryStore,
    failures: AtomicUsize,
    kind: io::ErrorKind,
    attempts: AtomicUsize,
}

impl FlakyStore {
    pub fn new(failures: usize, kind: io::ErrorKind) -> Self {
        Self {
            inner: MemoryStore::new(),
            failures: AtomicUsize::new(failures),
            kind,
            attempts: AtomicUsize::new(0),
        }
    }

    pub fn attempts(&self) -> usize {
        self.attempts.load(Ordering::SeqCst)
    }
}

impl KeyValueStore for FlakyStore {
    fn get(&self, key: &str) -> Result<Option<String>, LedgerError> {
        self.inner.get(key)
    }

    fn put(&self, key: &str, value: &str) -> Result<(), LedgerError> {
        self.attempts.fetch_add(1, Ordering::SeqCst);
        let remaining = self.failures.load(Ordering::SeqCst);
        if remaining > 0 {
            self.failures.store(remaining - 1, Ordering::SeqCst);
            return Err(io::Error::new(self.kind, "simulated store failure").into());
        }
        self.inner.put(key, value)
    }

    fn remove(&self, key: &str) -> Result<bool, LedgerError> {
        self.inner.remove(key)
    }
}
