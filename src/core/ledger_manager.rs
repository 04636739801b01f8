use std::sync::Arc;

use tracing::{debug, error, info, warn};

use crate::{
    config::Config,
    core::{
        observer::LedgerObserver,
        time::{Clock, SystemClock},
        utils::store_dir_in,
    },
    errors::{LedgerError, ValidationError},
    format::DEFAULT_DATE_FORMAT,
    ledger::{
        Aggregates, FilterEngine, Ledger, Transaction, TransactionDraft, TransactionId,
        TransactionType, TypeFilter,
    },
    storage::{JsonFileStore, PersistenceAdapter},
};

/// Knobs the session needs beyond its collaborators.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionSettings {
    pub date_format: String,
    pub recover_corrupt: bool,
}

impl Default for SessionSettings {
    fn default() -> Self {
        Self {
            date_format: DEFAULT_DATE_FORMAT.into(),
            recover_corrupt: true,
        }
    }
}

impl From<&Config> for SessionSettings {
    fn from(config: &Config) -> Self {
        Self {
            date_format: config.date_format.clone(),
            recover_corrupt: config.persistence.recover_corrupt,
        }
    }
}

/// What happened while hydrating the ledger at startup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OpenReport {
    pub loaded: usize,
    pub schema_version: u32,
    pub migrated: bool,
    /// Set when the stored value was unreadable and the session started empty.
    pub recovered: bool,
    pub warnings: Vec<String>,
}

/// Owns the ledger for one session: applies mutations, persists after each one,
/// and tells observers what changed.
///
/// Every mutating method takes `&mut self`, so there is exactly one writer.
pub struct LedgerManager {
    ledger: Ledger,
    filter: FilterEngine,
    persistence: PersistenceAdapter,
    clock: Box<dyn Clock>,
    settings: SessionSettings,
    observers: Vec<Box<dyn LedgerObserver>>,
}

impl LedgerManager {
    /// Hydrates a session from `persistence`.
    ///
    /// An unreadable stored value is preserved under the adapter's corrupt key and the
    /// session starts empty, unless `settings.recover_corrupt` is off.
    pub fn open(
        persistence: PersistenceAdapter,
        clock: Box<dyn Clock>,
        settings: SessionSettings,
    ) -> Result<(Self, OpenReport), LedgerError> {
        let (ledger, report) = match persistence.load_report() {
            Ok(load) => {
                for warning in &load.warnings {
                    warn!(%warning, "stored ledger inconsistency");
                }
                let report = OpenReport {
                    loaded: load.transactions.len(),
                    schema_version: load.schema_version,
                    migrated: load.migrated,
                    recovered: false,
                    warnings: load.warnings,
                };
                (Ledger::from_transactions(load.transactions), report)
            }
            Err(LedgerError::Deserialization(message)) if settings.recover_corrupt => {
                warn!(%message, "stored ledger unreadable, starting empty");
                let mut warnings = vec![format!("stored ledger was unreadable: {message}")];
                match persistence.quarantine() {
                    Ok(Some(key)) => warnings.push(format!("unreadable value kept under `{key}`")),
                    Ok(None) => {}
                    Err(err) => {
                        error!(error = %err, "could not preserve unreadable ledger");
                        warnings.push(format!("unreadable value could not be preserved: {err}"));
                    }
                }
                let report = OpenReport {
                    loaded: 0,
                    schema_version: crate::storage::CURRENT_SCHEMA_VERSION,
                    migrated: false,
                    recovered: true,
                    warnings,
                };
                (Ledger::new(), report)
            }
            Err(err) => return Err(err),
        };
        info!(
            key = persistence.key(),
            transactions = report.loaded,
            "ledger opened"
        );
        let manager = Self {
            ledger,
            filter: FilterEngine::new(),
            persistence,
            clock,
            settings,
            observers: Vec::new(),
        };
        Ok((manager, report))
    }

    /// Opens the file-backed ledger described by `config` using the system clock.
    pub fn from_config(config: &Config) -> Result<(Self, OpenReport), LedgerError> {
        let store = JsonFileStore::new(store_dir_in(&config.resolve_data_dir()))?;
        let persistence = PersistenceAdapter::new(Arc::new(store), config.storage_key.clone())
            .with_retry(config.persistence.retry_policy());
        Self::open(persistence, Box::new(SystemClock), SessionSettings::from(config))
    }

    /// Registers an observer and immediately sends it the current view and aggregates.
    pub fn subscribe(&mut self, mut observer: Box<dyn LedgerObserver>) {
        let view = self.filter.apply(self.ledger.transactions());
        observer.on_transactions_changed(&view);
        observer.on_aggregates_changed(&self.ledger.aggregates());
        self.observers.push(observer);
    }

    /// Validates the draft, prepends the new transaction, and persists.
    pub fn add_transaction(
        &mut self,
        draft: TransactionDraft,
    ) -> Result<Transaction, ValidationError> {
        let valid = match draft.validate() {
            Ok(valid) => valid,
            Err(err) => {
                debug!(error = %err, "transaction rejected");
                for observer in self.observers.iter_mut() {
                    observer.on_validation_error(err);
                }
                return Err(err);
            }
        };
        let today = self.clock.today();
        let transaction = match self.ledger.add(valid, today, &self.settings.date_format) {
            Ok(transaction) => transaction.clone(),
            Err(err) => {
                warn!(error = %err, "transaction rejected");
                for observer in self.observers.iter_mut() {
                    observer.on_validation_error(err);
                }
                return Err(err);
            }
        };
        debug!(
            id = transaction.id,
            kind = %transaction.kind,
            category = %transaction.category,
            "transaction added"
        );
        self.after_mutation();
        Ok(transaction)
    }

    /// Convenience wrapper over [`LedgerManager::add_transaction`].
    pub fn add(
        &mut self,
        description: &str,
        amount: &str,
        kind: TransactionType,
        category: &str,
    ) -> Result<Transaction, ValidationError> {
        self.add_transaction(TransactionDraft::new(description, amount, kind, category))
    }

    /// Deletes by id. Unknown ids are a no-op and return `false`.
    pub fn remove_transaction(&mut self, id: TransactionId) -> bool {
        if !self.ledger.remove(id) {
            debug!(id, "remove ignored, transaction not found");
            return false;
        }
        debug!(id, "transaction removed");
        self.after_mutation();
        true
    }

    /// Shows only transactions whose description contains `query`, ignoring case.
    pub fn filter_by_query(&mut self, query: &str) {
        self.filter.set_query(query);
        debug!(query, "query filter applied");
        self.publish_view();
    }

    /// Shows only transactions of `kind`, or all of them for `None`/[`TypeFilter::All`].
    pub fn filter_by_type(&mut self, kind: impl Into<TypeFilter>) {
        self.filter.set_type(kind);
        debug!(filter = ?self.filter.active(), "type filter applied");
        self.publish_view();
    }

    /// Persists the ledger before the host loses focus. Failures are reported and returned.
    pub fn suspend(&mut self) -> Result<(), LedgerError> {
        info!(transactions = self.ledger.len(), "suspending ledger session");
        self.persist()
    }

    pub fn ledger(&self) -> &Ledger {
        &self.ledger
    }

    pub fn transactions(&self) -> &[Transaction] {
        self.ledger.transactions()
    }

    /// The current filtered view, borrowed from the ledger.
    pub fn view(&self) -> Vec<&Transaction> {
        self.filter.apply(self.ledger.transactions())
    }

    pub fn filter(&self) -> &FilterEngine {
        &self.filter
    }

    pub fn aggregates(&self) -> Aggregates {
        self.ledger.aggregates()
    }

    fn after_mutation(&mut self) {
        // A failed save is already logged and reported; the mutation stays in memory.
        let _ = self.persist();
        self.publish_view();
        self.publish_aggregates();
    }

    fn persist(&mut self) -> Result<(), LedgerError> {
        match self.persistence.save(self.ledger.transactions()) {
            Ok(()) => Ok(()),
            Err(err) => {
                error!(key = self.persistence.key(), error = %err, "failed to persist ledger");
                for observer in self.observers.iter_mut() {
                    observer.on_persistence_failed(&err);
                }
                Err(err)
            }
        }
    }

    fn publish_view(&mut self) {
        let view = self.filter.apply(self.ledger.transactions());
        for observer in self.observers.iter_mut() {
            observer.on_transactions_changed(&view);
        }
    }

    fn publish_aggregates(&mut self) {
        let aggregates = self.ledger.aggregates();
        for observer in self.observers.iter_mut() {
            observer.on_aggregates_changed(&aggregates);
        }
    }
}
