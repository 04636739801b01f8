use std::{fmt, str::FromStr};

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::errors::ValidationError;
use crate::format::format_date;

/// Identifier issued by the ledger's monotonic counter.
pub type TransactionId = u64;

/// Largest amount a single transaction may carry.
///
/// Amounts are stored as JSON floats; up to this bound, with at most
/// [`AMOUNT_DECIMALS`] fractional digits, they read back unchanged.
pub const MAX_AMOUNT: Decimal = Decimal::from_parts(3_567_587_328, 232, 0, false, 0);

/// Fractional digits an amount may carry.
pub const AMOUNT_DECIMALS: u32 = 2;

/// Direction of a ledger entry.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "UPPERCASE")]
pub enum TransactionType {
    Income,
    Expense,
}

impl fmt::Display for TransactionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            TransactionType::Income => "Income",
            TransactionType::Expense => "Expense",
        };
        f.write_str(label)
    }
}

/// One recorded income or expense event. Immutable once created.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Transaction {
    pub id: TransactionId,
    pub description: String,
    #[serde(with = "rust_decimal::serde::float")]
    pub amount: Decimal,
    #[serde(rename = "type")]
    pub kind: TransactionType,
    pub category: String,
    pub date: String,
}

impl Transaction {
    pub fn is_income(&self) -> bool {
        self.kind == TransactionType::Income
    }

    pub fn is_expense(&self) -> bool {
        self.kind == TransactionType::Expense
    }

    /// Amount with the sign it contributes to the balance.
    pub fn signed_amount(&self) -> Decimal {
        match self.kind {
            TransactionType::Income => self.amount,
            TransactionType::Expense => -self.amount,
        }
    }
}

/// Raw user input for a new transaction, validated by [`TransactionDraft::validate`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransactionDraft {
    pub description: String,
    pub amount: String,
    pub kind: TransactionType,
    pub category: String,
}

impl TransactionDraft {
    pub fn new(
        description: impl Into<String>,
        amount: impl Into<String>,
        kind: TransactionType,
        category: impl Into<String>,
    ) -> Self {
        Self {
            description: description.into(),
            amount: amount.into(),
            kind,
            category: category.into(),
        }
    }

    /// Trims the inputs and checks them in the order the form reports errors.
    pub fn validate(&self) -> Result<ValidDraft, ValidationError> {
        let description = self.description.trim();
        if description.is_empty() {
            return Err(ValidationError::EmptyDescription);
        }
        let amount = self.amount.trim();
        if amount.is_empty() {
            return Err(ValidationError::MissingAmount);
        }
        let amount = parse_amount(amount).ok_or(ValidationError::InvalidAmount)?;
        if !is_storable_amount(amount) {
            return Err(ValidationError::InvalidAmount);
        }
        Ok(ValidDraft {
            description: description.to_string(),
            amount,
            kind: self.kind,
            category: self.category.trim().to_string(),
        })
    }
}

/// Draft that passed validation; only the ledger turns it into a [`Transaction`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidDraft {
    description: String,
    amount: Decimal,
    kind: TransactionType,
    category: String,
}

impl ValidDraft {
    pub(crate) fn into_transaction(
        self,
        id: TransactionId,
        date: NaiveDate,
        date_format: &str,
    ) -> Transaction {
        Transaction {
            id,
            description: self.description,
            amount: self.amount,
            kind: self.kind,
            category: self.category,
            date: format_date(date, date_format),
        }
    }
}

fn parse_amount(raw: &str) -> Option<Decimal> {
    Decimal::from_str(raw)
        .or_else(|_| Decimal::from_scientific(raw))
        .ok()
        .map(|amount| amount.normalize())
}

/// Positive, at most `MAX_AMOUNT`, and no finer than cents.
pub fn is_storable_amount(amount: Decimal) -> bool {
    amount > Decimal::ZERO
        && amount <= MAX_AMOUNT
        && amount.normalize().scale() <= AMOUNT_DECIMALS
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal::Decimal;

    fn draft(description: &str, amount: &str) -> TransactionDraft {
        TransactionDraft::new(description, amount, TransactionType::Expense, "Food")
    }

    #[test]
    fn validation_reports_errors_in_form_order() {
        assert_eq!(
            draft("  ", "").validate(),
            Err(ValidationError::EmptyDescription)
        );
        assert_eq!(
            draft("Lunch", "   ").validate(),
            Err(ValidationError::MissingAmount)
        );
        assert_eq!(
            draft("Lunch", "abc").validate(),
            Err(ValidationError::InvalidAmount)
        );
        assert_eq!(
            draft("Lunch", "0").validate(),
            Err(ValidationError::InvalidAmount)
        );
        assert_eq!(
            draft("Lunch", "-3.50").validate(),
            Err(ValidationError::InvalidAmount)
        );
        assert_eq!(
            draft("Lunch", "NaN").validate(),
            Err(ValidationError::InvalidAmount)
        );
    }

    #[test]
    fn validation_trims_description_and_parses_amount() {
        let valid = draft("  Lunch  ", " 15.50 ").validate().unwrap();
        let txn = valid.into_transaction(
            7,
            NaiveDate::from_ymd_opt(2025, 3, 4).unwrap(),
            "%b %d, %Y",
        );
        assert_eq!(txn.description, "Lunch");
        assert_eq!(txn.amount, Decimal::new(1550, 2));
        assert_eq!(txn.date, "Mar 04, 2025");
        assert_eq!(txn.signed_amount(), Decimal::new(-1550, 2));
    }

    #[test]
    fn amounts_are_capped_and_limited_to_cents() {
        assert_eq!(MAX_AMOUNT, Decimal::new(1_000_000_000_000, 0));
        assert!(draft("Car", "1000000000000").validate().is_ok());
        assert!(draft("Car", "999999999999.99").validate().is_ok());
        assert!(draft("Coffee", "3.500").validate().is_ok());
        assert!(draft("Coffee", "1e2").validate().is_ok());

        for raw in [
            "1000000000000.01",
            "79228162514264337593543950335",
            "19.999999999999999999",
            "0.001",
            "1e-5",
        ] {
            assert_eq!(
                draft("Too much", raw).validate(),
                Err(ValidationError::InvalidAmount),
                "{raw}"
            );
        }
    }

    #[test]
    fn storable_amounts_read_back_unchanged() {
        for raw in ["0.01", "0.1", "15.5", "19.99", "123456789.25", "999999999999.99", "1000000000000"] {
            let valid = draft("Entry", raw).validate().unwrap();
            let txn = valid.into_transaction(
                1,
                NaiveDate::from_ymd_opt(2025, 3, 4).unwrap(),
                "%b %d, %Y",
            );
            let json = serde_json::to_string(&txn).unwrap();
            let back: Transaction = serde_json::from_str(&json).unwrap();
            assert_eq!(back, txn, "{raw} came back as {}", back.amount);
        }
    }

    #[test]
    fn type_serializes_as_upper_case_label() {
        let json = serde_json::to_string(&TransactionType::Income).unwrap();
        assert_eq!(json, "\"INCOME\"");
        let parsed: TransactionType = serde_json::from_str("\"EXPENSE\"").unwrap();
        assert_eq!(parsed, TransactionType::Expense);
    }
}
