#![doc(test(attr(deny(warnings))))]

//! Expense Core is the ledger model behind a personal income and expense tracker:
//! an ordered transaction list, its derived totals, filtered views, and durable
//! persistence into a key-value store.

pub mod config;
pub mod core;
pub mod errors;
pub mod format;
pub mod ledger;
pub mod storage;
pub mod utils;

use std::sync::Once;

static INIT_TRACING: Once = Once::new();

/// Initializes global tracing and emits a startup info log.
pub fn init() {
    INIT_TRACING.call_once(|| {
        utils::init_tracing();
        tracing::info!("Expense Core tracing initialized.");
    });
}
