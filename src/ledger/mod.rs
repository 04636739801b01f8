//! Ledger domain models, aggregates, and filtered views.

pub mod filter;
#[allow(clippy::module_inception)]
pub mod ledger;
pub mod summary;
pub mod transaction;

pub use filter::{ActiveFilter, FilterEngine, TypeFilter};
pub use ledger::Ledger;
pub use summary::{Aggregates, Summary};
pub use transaction::{
    is_storable_amount, Transaction, TransactionDraft, TransactionId, TransactionType, ValidDraft,
    AMOUNT_DECIMALS, MAX_AMOUNT,
};
