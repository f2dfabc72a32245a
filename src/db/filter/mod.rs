use chrono::NaiveDateTime;
use crate::period::Period;
use crate::transaction::{Category, Transaction, TransactionType};

/// Criteria for selecting transactions. Every field left as `None` matches everything.
#[derive(Debug, Clone, Default, PartialEq)]
pub(crate) struct Filter {
    /// Inclusive
    pub(crate) start: Option<NaiveDateTime>,
    /// Inclusive
    pub(crate) end: Option<NaiveDateTime>,
    pub(crate) transaction_type: Option<TransactionType>,
    pub(crate) category: Option<Category>,
}

impl Filter {
    pub(crate) fn all() -> Filter {
        Filter::default()
    }

    pub(crate) fn between(start: Option<NaiveDateTime>, end: Option<NaiveDateTime>) -> Filter {
        Filter { start, end, ..Filter::default() }
    }

    pub(crate) fn with_period(mut self, period: Period, now: NaiveDateTime) -> Filter {
        let (start, end) = period.bounds(now);
        self.start = start;
        self.end = end;
        self
    }

    pub(crate) fn matches(&self, t: &Transaction) -> bool {
        if let Some(start) = self.start {
            if t.date < start {
                return false;
            }
        }
        if let Some(end) = self.end {
            if t.date > end {
                return false;
            }
        }
        if let Some(transaction_type) = self.transaction_type {
            if t.transaction_type != transaction_type {
                return false;
            }
        }
        if let Some(category) = self.category {
            if t.category != category {
                return false;
            }
        }
        true
    }
}
