mod category;

use std::fmt;
use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

pub(crate) use category::Category;

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub(crate) enum TransactionType {
    Income,
    Expense,
}

impl TransactionType {
    /// The catch-all category used when nothing better is known
    pub(crate) fn fallback_category(&self) -> Category {
        match self {
            TransactionType::Income => Category::OtherIncome,
            TransactionType::Expense => Category::OtherExpense,
        }
    }
}

impl fmt::Display for TransactionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TransactionType::Income => write!(f, "Income"),
            TransactionType::Expense => write!(f, "Expense"),
        }
    }
}

/// A financial movement entered by the user
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub(crate) struct Transaction {
    pub(crate) id: u32,
    pub(crate) description: String,
    /// Always a magnitude. The sign comes from `transaction_type`.
    pub(crate) amount: f64,
    pub(crate) transaction_type: TransactionType,
    pub(crate) category: Category,
    pub(crate) date: NaiveDateTime,
    #[serde(default)]
    pub(crate) notes: Option<String>,
}

impl Transaction {
    pub(crate) fn new(id: u32, description: &str, amount: f64, transaction_type: TransactionType,
                      category: Category, date: NaiveDateTime, notes: Option<String>) -> Transaction {
        let description = description.replace('\n', " ").trim().to_string();
        let notes = notes.map(|n| n.trim().to_string()).filter(|n| !n.is_empty());
        Transaction {
            id,
            description,
            amount: amount.abs(),
            transaction_type,
            category,
            date,
            notes,
        }
    }

    pub(crate) fn is_income(&self) -> bool {
        self.transaction_type == TransactionType::Income
    }

    pub(crate) fn signed_amount(&self) -> f64 {
        match self.transaction_type {
            TransactionType::Income => self.amount,
            TransactionType::Expense => -self.amount,
        }
    }

    pub(crate) fn notes_display(&self) -> &str {
        self.notes.as_deref().unwrap_or("")
    }
}

#[cfg(test)]
mod tests {
    use std::str::FromStr;
    use super::*;

    #[test]
    fn test_amount_is_stored_as_magnitude() {
        let date = NaiveDateTime::from_str("2024-03-10T12:00:00").unwrap();
        let t = Transaction::new(1, "lunch\nwith team", -42.5, TransactionType::Expense, Category::Food, date, None);
        assert_eq!(t.amount, 42.5);
        assert_eq!(t.signed_amount(), -42.5);
        assert_eq!(t.description, "lunch with team");
    }

    #[test]
    fn test_transaction_serde() {
        let date = NaiveDateTime::from_str("2022-07-31T17:30:45").unwrap();
        let t = Transaction::new(3, "salary", 5000.0, TransactionType::Income, Category::Salary, date, Some("  ".into()));
        assert!(t.notes.is_none());

        let s = serde_json::to_string(&t).unwrap();
        assert!(s.contains("\"transaction_type\":\"income\""));
        assert!(s.contains("\"category\":\"salary\""));
        let back: Transaction = serde_json::from_str(&s).unwrap();
        assert_eq!(back, t);
    }
}
