//! Presentation helpers shared by every display layer.

use chrono::NaiveDate;
use rust_decimal::Decimal;

use crate::ledger::{Transaction, TransactionType};

/// Pattern used for transaction dates, e.g. `Jan 05, 2025`.
pub const DEFAULT_DATE_FORMAT: &str = "%b %d, %Y";

/// Formats `amount` with two decimals behind `symbol`; negatives lead with `-`.
pub fn format_currency(amount: Decimal, symbol: &str) -> String {
    if amount.is_sign_negative() && !amount.is_zero() {
        format!("-{}{:.2}", symbol, amount.abs())
    } else {
        format!("{}{:.2}", symbol, amount.abs())
    }
}

/// Formats a transaction amount with the sign it applies to the balance.
pub fn format_signed(transaction: &Transaction, symbol: &str) -> String {
    let sign = match transaction.kind {
        TransactionType::Income => '+',
        TransactionType::Expense => '-',
    };
    format!("{}{}", sign, format_currency(transaction.amount, symbol))
}

pub fn count_label(count: usize) -> String {
    if count == 1 {
        "1 transaction".to_string()
    } else {
        format!("{count} transactions")
    }
}

pub fn format_date(date: NaiveDate, pattern: &str) -> String {
    date.format(pattern).to_string()
}
