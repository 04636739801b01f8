use rust_decimal::Decimal;
use serde::Serialize;

/// Total and count for one transaction type.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct Summary {
    pub total: Decimal,
    pub count: usize,
}

/// Every derived figure the display layer shows after a mutation.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct Aggregates {
    pub balance: Decimal,
    pub income: Summary,
    pub expense: Summary,
}
