use chrono::NaiveDate;
use rust_decimal::Decimal;

use crate::errors::ValidationError;

use super::{
    summary::{Aggregates, Summary},
    transaction::{Transaction, TransactionId, TransactionType, ValidDraft},
};

/// Ordered collection of transactions, most recent first.
///
/// Aggregates are never cached; every call walks the full sequence.
#[derive(Debug, Clone, PartialEq)]
pub struct Ledger {
    transactions: Vec<Transaction>,
    /// `None` once `TransactionId::MAX` has been issued.
    next_id: Option<TransactionId>,
}

impl Default for Ledger {
    fn default() -> Self {
        Self::new()
    }
}

impl Ledger {
    pub fn new() -> Self {
        Self {
            transactions: Vec::new(),
            next_id: Some(1),
        }
    }

    /// Hydrates a ledger from a stored sequence, keeping its order.
    pub fn from_transactions(transactions: Vec<Transaction>) -> Self {
        let next_id = transactions
            .iter()
            .map(|txn| txn.id)
            .max()
            .map_or(Some(1), |max| max.checked_add(1));
        Self {
            transactions,
            next_id,
        }
    }

    /// Builds a transaction from a validated draft and prepends it.
    ///
    /// Fails with [`ValidationError::IdsExhausted`] once the id space is used up.
    pub fn add(
        &mut self,
        draft: ValidDraft,
        date: NaiveDate,
        date_format: &str,
    ) -> Result<&Transaction, ValidationError> {
        let id = self.issue_id().ok_or(ValidationError::IdsExhausted)?;
        let transaction = draft.into_transaction(id, date, date_format);
        self.transactions.insert(0, transaction);
        Ok(&self.transactions[0])
    }

    /// Removes the transaction with `id`; returns whether anything was removed.
    pub fn remove(&mut self, id: TransactionId) -> bool {
        match self.transactions.iter().position(|txn| txn.id == id) {
            Some(index) => {
                self.transactions.remove(index);
                true
            }
            None => false,
        }
    }

    pub fn get(&self, id: TransactionId) -> Option<&Transaction> {
        self.transactions.iter().find(|txn| txn.id == id)
    }

    pub fn transactions(&self) -> &[Transaction] {
        &self.transactions
    }

    pub fn len(&self) -> usize {
        self.transactions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.transactions.is_empty()
    }

    /// Sums saturate so amounts loaded from a hand-edited store cannot overflow.
    pub fn balance(&self) -> Decimal {
        self.transactions
            .iter()
            .map(Transaction::signed_amount)
            .fold(Decimal::ZERO, Decimal::saturating_add)
    }

    pub fn income_summary(&self) -> Summary {
        self.summary_for(TransactionType::Income)
    }

    pub fn expense_summary(&self) -> Summary {
        self.summary_for(TransactionType::Expense)
    }

    pub fn aggregates(&self) -> Aggregates {
        Aggregates {
            balance: self.balance(),
            income: self.income_summary(),
            expense: self.expense_summary(),
        }
    }

    fn summary_for(&self, kind: TransactionType) -> Summary {
        self.transactions
            .iter()
            .filter(|txn| txn.kind == kind)
            .fold(Summary::default(), |acc, txn| Summary {
                total: acc.total.saturating_add(txn.amount),
                count: acc.count + 1,
            })
    }

    fn issue_id(&mut self) -> Option<TransactionId> {
        let id = self.next_id?;
        self.next_id = id.checked_add(1);
        Some(id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ledger::transaction::TransactionDraft;

    const FORMAT: &str = "%b %d, %Y";

    fn date() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 1, 5).unwrap()
    }

    fn add(ledger: &mut Ledger, description: &str, amount: &str, kind: TransactionType) -> u64 {
        let draft = TransactionDraft::new(description, amount, kind, "Other")
            .validate()
            .unwrap();
        ledger.add(draft, date(), FORMAT).unwrap().id
    }

    fn stored(id: TransactionId, amount: Decimal, kind: TransactionType) -> Transaction {
        Transaction {
            id,
            description: "Imported".into(),
            amount,
            kind,
            category: "Other".into(),
            date: "Jan 01, 2025".into(),
        }
    }

    #[test]
    fn newest_transaction_is_first() {
        let mut ledger = Ledger::new();
        let first = add(&mut ledger, "Salary", "1000", TransactionType::Income);
        let second = add(&mut ledger, "Lunch", "15.50", TransactionType::Expense);
        let ids: Vec<_> = ledger.transactions().iter().map(|txn| txn.id).collect();
        assert_eq!(ids, vec![second, first]);
        assert_eq!(ledger.transactions()[0].date, "Jan 05, 2025");
    }

    #[test]
    fn ids_are_not_reused_after_removal() {
        let mut ledger = Ledger::new();
        let first = add(&mut ledger, "A", "1", TransactionType::Income);
        assert!(ledger.remove(first));
        let second = add(&mut ledger, "B", "1", TransactionType::Income);
        assert!(second > first);
    }

    #[test]
    fn hydrated_ledger_continues_after_highest_id() {
        let mut seed = Ledger::new();
        add(&mut seed, "A", "5", TransactionType::Income);
        add(&mut seed, "B", "5", TransactionType::Income);
        let mut ledger = Ledger::from_transactions(seed.transactions().to_vec());
        let id = add(&mut ledger, "C", "5", TransactionType::Expense);
        assert_eq!(id, 3);
    }

    #[test]
    fn remove_is_idempotent() {
        let mut ledger = Ledger::new();
        let id = add(&mut ledger, "Coffee", "3.20", TransactionType::Expense);
        assert!(ledger.remove(id));
        assert!(!ledger.remove(id));
        assert!(ledger.is_empty());
    }

    #[test]
    fn aggregates_are_derived_from_every_entry() {
        let mut ledger = Ledger::new();
        add(&mut ledger, "Salary", "1000", TransactionType::Income);
        add(&mut ledger, "Bonus", "250.25", TransactionType::Income);
        add(&mut ledger, "Rent", "600", TransactionType::Expense);

        let aggregates = ledger.aggregates();
        assert_eq!(aggregates.balance, Decimal::new(65025, 2));
        assert_eq!(aggregates.income.count, 2);
        assert_eq!(aggregates.income.total, Decimal::new(125025, 2));
        assert_eq!(aggregates.expense.count, 1);
        assert_eq!(aggregates.expense.total, Decimal::from(600));
    }

    #[test]
    fn empty_ledger_has_zero_aggregates() {
        let ledger = Ledger::new();
        assert_eq!(ledger.aggregates(), Aggregates::default());
    }

    #[test]
    fn largest_id_is_issued_once() {
        let mut ledger = Ledger::from_transactions(vec![stored(
            TransactionId::MAX - 1,
            Decimal::ONE,
            TransactionType::Income,
        )]);
        let last = add(&mut ledger, "Last", "1", TransactionType::Income);
        assert_eq!(last, TransactionId::MAX);

        let draft = TransactionDraft::new("Overflow", "1", TransactionType::Income, "Other")
            .validate()
            .unwrap();
        assert_eq!(
            ledger.add(draft, date(), FORMAT).err(),
            Some(ValidationError::IdsExhausted)
        );
        assert_eq!(ledger.len(), 2);
    }

    #[test]
    fn largest_capped_amounts_sum_without_overflow() {
        let mut ledger = Ledger::new();
        add(&mut ledger, "Big", "1000000000000", TransactionType::Income);
        add(&mut ledger, "Big again", "1000000000000", TransactionType::Income);
        add(&mut ledger, "Small", "1", TransactionType::Income);
        assert_eq!(ledger.balance(), Decimal::new(2_000_000_000_001, 0));
        assert_eq!(ledger.income_summary().count, 3);
    }

    #[test]
    fn oversized_stored_amounts_saturate() {
        let ledger = Ledger::from_transactions(vec![
            stored(1, Decimal::MAX, TransactionType::Income),
            stored(2, Decimal::MAX, TransactionType::Income),
            stored(3, Decimal::MAX, TransactionType::Expense),
        ]);
        let aggregates = ledger.aggregates();
        assert_eq!(aggregates.income.total, Decimal::MAX);
        assert_eq!(aggregates.expense.total, Decimal::MAX);
        assert_eq!(aggregates.balance, Decimal::ZERO);
    }
}
