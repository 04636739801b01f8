pub mod ledger_manager;
pub mod observer;
pub mod time;
pub mod utils;

pub use ledger_manager::{LedgerManager, OpenReport, SessionSettings};
pub use observer::{EventRecorder, LedgerEvent, LedgerObserver};
pub use time::{Clock, FixedClock, SystemClock};
