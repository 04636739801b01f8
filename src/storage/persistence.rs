//! Serializes the transaction list into a single key of a [`KeyValueStore`].

use std::{sync::Arc, thread, time::Duration};

use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::{
    errors::LedgerError,
    ledger::{is_storable_amount, Transaction},
};

use super::{KeyValueStore, Result};

/// Layout version written by [`PersistenceAdapter::save`]. Version 0 is the bare array layout.
pub const CURRENT_SCHEMA_VERSION: u32 = 1;
pub const DEFAULT_STORAGE_KEY: &str = "transactions_list";
const CORRUPT_SUFFIX: &str = "corrupt";

/// Bounded retry applied to transient store write failures.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    pub max_attempts: u32,
    pub backoff: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            backoff: Duration::from_millis(25),
        }
    }
}

impl RetryPolicy {
    pub fn none() -> Self {
        Self {
            max_attempts: 1,
            backoff: Duration::ZERO,
        }
    }
}

/// Outcome of reading the stored ledger.
#[derive(Debug, Clone, PartialEq)]
pub struct LoadReport {
    pub transactions: Vec<Transaction>,
    pub schema_version: u32,
    /// True when the value used an older layout and will be rewritten on the next save.
    pub migrated: bool,
    pub warnings: Vec<String>,
}

impl LoadReport {
    fn empty() -> Self {
        Self {
            transactions: Vec::new(),
            schema_version: CURRENT_SCHEMA_VERSION,
            migrated: false,
            warnings: Vec::new(),
        }
    }
}

#[derive(Serialize)]
struct EnvelopeRef<'a> {
    schema_version: u32,
    transactions: &'a [Transaction],
}

#[derive(Deserialize)]
#[serde(untagged)]
enum StoredValue {
    Envelope {
        schema_version: u32,
        #[serde(default)]
        transactions: Vec<Transaction>,
    },
    Legacy(Vec<Transaction>),
}

/// Reads and writes the full ordered transaction list under one fixed key.
pub struct PersistenceAdapter {
    store: Arc<dyn KeyValueStore>,
    key: String,
    retry: RetryPolicy,
}

impl PersistenceAdapter {
    pub fn new(store: Arc<dyn KeyValueStore>, key: impl Into<String>) -> Self {
        Self {
            store,
            key: key.into(),
            retry: RetryPolicy::default(),
        }
    }

    pub fn with_retry(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    pub fn corrupt_key(&self) -> String {
        format!("{}.{}", self.key, CORRUPT_SUFFIX)
    }

    /// Writes the full sequence, retrying transient failures.
    pub fn save(&self, transactions: &[Transaction]) -> Result<()> {
        let json = serde_json::to_string_pretty(&EnvelopeRef {
            schema_version: CURRENT_SCHEMA_VERSION,
            transactions,
        })?;
        self.put_with_retry(&self.key, &json)?;
        debug!(key = %self.key, count = transactions.len(), "ledger saved");
        Ok(())
    }

    /// Returns the stored sequence, or an empty one when nothing was saved yet.
    pub fn load(&self) -> Result<Vec<Transaction>> {
        Ok(self.load_report()?.transactions)
    }

    pub fn load_report(&self) -> Result<LoadReport> {
        let Some(raw) = self.store.get(&self.key)? else {
            debug!(key = %self.key, "no stored ledger, starting empty");
            return Ok(LoadReport::empty());
        };
        let report = decode(&raw)?;
        if report.migrated {
            info!(
                key = %self.key,
                from = report.schema_version,
                to = CURRENT_SCHEMA_VERSION,
                "stored ledger uses an older layout"
            );
        }
        Ok(report)
    }

    /// Copies the raw stored value aside so a later save cannot destroy it.
    ///
    /// Returns the key it was copied to, or `None` when nothing is stored.
    pub fn quarantine(&self) -> Result<Option<String>> {
        let Some(raw) = self.store.get(&self.key)? else {
            return Ok(None);
        };
        let target = self.corrupt_key();
        self.put_with_retry(&target, &raw)?;
        warn!(key = %self.key, target = %target, "unreadable ledger preserved");
        Ok(Some(target))
    }

    fn put_with_retry(&self, key: &str, value: &str) -> Result<()> {
        let max_attempts = self.retry.max_attempts.max(1);
        let mut attempt = 1;
        loop {
            match self.store.put(key, value) {
                Ok(()) => return Ok(()),
                Err(err) if err.is_transient() && attempt < max_attempts => {
                    warn!(key, attempt, max_attempts, error = %err, "store write failed, retrying");
                    if !self.retry.backoff.is_zero() {
                        thread::sleep(self.retry.backoff);
                    }
                    attempt += 1;
                }
                Err(err) => return Err(err),
            }
        }
    }
}

fn decode(raw: &str) -> Result<LoadReport> {
    let stored: StoredValue = serde_json::from_str(raw)
        .map_err(|err| LedgerError::Deserialization(err.to_string()))?;
    let (transactions, schema_version) = match stored {
        StoredValue::Envelope {
            schema_version,
            transactions,
        } => (transactions, schema_version),
        StoredValue::Legacy(transactions) => (transactions, 0),
    };
    if schema_version > CURRENT_SCHEMA_VERSION {
        return Err(LedgerError::Deserialization(format!(
            "schema v{} is newer than supported v{}",
            schema_version, CURRENT_SCHEMA_VERSION
        )));
    }
    let warnings = integrity_warnings(&transactions);
    Ok(LoadReport {
        migrated: schema_version < CURRENT_SCHEMA_VERSION,
        transactions,
        schema_version,
        warnings,
    })
}

/// Flags stored records that break ledger invariants without rejecting the load.
fn integrity_warnings(transactions: &[Transaction]) -> Vec<String> {
    let mut seen = std::collections::HashSet::new();
    let mut warnings = Vec::new();
    for txn in transactions {
        if !seen.insert(txn.id) {
            warnings.push(format!("transaction id {} appears more than once", txn.id));
        }
        if txn.description.trim().is_empty() {
            warnings.push(format!("transaction {} has an empty description", txn.id));
        }
        if txn.amount <= rust_decimal::Decimal::ZERO {
            warnings.push(format!(
                "transaction {} has a non-positive amount {}",
                txn.id, txn.amount
            ));
        } else if !is_storable_amount(txn.amount) {
            warnings.push(format!(
                "transaction {} has an amount {} outside the accepted range",
                txn.id, txn.amount
            ));
        }
    }
    warnings
}
