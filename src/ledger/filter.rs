//! Read-only filtered views over the ledger's transactions.
//!
//! Only one predicate is active at a time: setting a text query discards the
//! type filter and vice versa.

use super::transaction::{Transaction, TransactionType};

/// Tri-state selection used by the type filter.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum TypeFilter {
    #[default]
    All,
    Income,
    Expense,
}

impl TypeFilter {
    fn matches(self, kind: TransactionType) -> bool {
        match self {
            TypeFilter::All => true,
            TypeFilter::Income => kind == TransactionType::Income,
            TypeFilter::Expense => kind == TransactionType::Expense,
        }
    }
}

impl From<Option<TransactionType>> for TypeFilter {
    fn from(kind: Option<TransactionType>) -> Self {
        match kind {
            None => TypeFilter::All,
            Some(TransactionType::Income) => TypeFilter::Income,
            Some(TransactionType::Expense) => TypeFilter::Expense,
        }
    }
}

/// The single predicate currently shaping the view.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ActiveFilter {
    /// Case-insensitive substring match on the description. Stored lowercased.
    Query(String),
    Type(TypeFilter),
}

impl Default for ActiveFilter {
    fn default() -> Self {
        ActiveFilter::Type(TypeFilter::All)
    }
}

impl ActiveFilter {
    pub fn matches(&self, transaction: &Transaction) -> bool {
        match self {
            ActiveFilter::Query(needle) => {
                needle.is_empty() || transaction.description.to_lowercase().contains(needle)
            }
            ActiveFilter::Type(filter) => filter.matches(transaction.kind),
        }
    }

    pub fn selects_everything(&self) -> bool {
        match self {
            ActiveFilter::Query(needle) => needle.is_empty(),
            ActiveFilter::Type(filter) => *filter == TypeFilter::All,
        }
    }
}

/// Holds the active filter and derives views from the full sequence on demand.
#[derive(Debug, Clone, Default)]
pub struct FilterEngine {
    active: ActiveFilter,
}

impl FilterEngine {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn active(&self) -> &ActiveFilter {
        &self.active
    }

    /// Replaces the active filter with a description query.
    pub fn set_query(&mut self, query: &str) {
        self.active = ActiveFilter::Query(query.to_lowercase());
    }

    /// Replaces the active filter with a type selection.
    pub fn set_type(&mut self, filter: impl Into<TypeFilter>) {
        self.active = ActiveFilter::Type(filter.into());
    }

    pub fn clear(&mut self) {
        self.active = ActiveFilter::default();
    }

    /// Returns the matching transactions in their original relative order.
    pub fn apply<'a>(&self, transactions: &'a [Transaction]) -> Vec<&'a Transaction> {
        transactions
            .iter()
            .filter(|txn| self.active.matches(txn))
            .collect()
    }
}

/// Free-standing query filter over any transaction slice.
pub fn filter_by_query<'a>(transactions: &'a [Transaction], query: &str) -> Vec<&'a Transaction> {
    let mut engine = FilterEngine::new();
    engine.set_query(query);
    engine.apply(transactions)
}

/// Free-standing type filter over any transaction slice.
pub fn filter_by_type<'a>(
    transactions: &'a [Transaction],
    kind: Option<TransactionType>,
) -> Vec<&'a Transaction> {
    let mut engine = FilterEngine::new();
    engine.set_type(kind);
    engine.apply(transactions)
}
