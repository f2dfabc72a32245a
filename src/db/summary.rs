use std::collections::BTreeMap;
use crate::transaction::{Category, Transaction};

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub(crate) struct Balance {
    pub(crate) income: f64,
    pub(crate) expense: f64,
    /// income - expense
    pub(crate) balance: f64,
}

impl Balance {
    pub(crate) fn from_transactions<'a>(transactions: impl Iterator<Item = &'a Transaction>) -> Balance {
        let mut income = 0.0;
        let mut expense = 0.0;
        for t in transactions {
            if t.is_income() {
                income += t.amount;
            } else {
                expense += t.amount;
            }
        }
        Balance { income, expense, balance: income - expense }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub(crate) struct CategoryTotal {
    pub(crate) category: Category,
    pub(crate) total: f64,
    pub(crate) count: usize,
}

/// Totals per category, split by transaction type. Each list is sorted by total, largest first.
#[derive(Debug, Clone, Default, PartialEq)]
pub(crate) struct CategorySummary {
    pub(crate) income: Vec<CategoryTotal>,
    pub(crate) expense: Vec<CategoryTotal>,
}

impl CategorySummary {
    pub(crate) fn from_transactions<'a>(transactions: impl Iterator<Item = &'a Transaction>) -> CategorySummary {
        let mut income: BTreeMap<Category, (f64, usize)> = BTreeMap::new();
        let mut expense: BTreeMap<Category, (f64, usize)> = BTreeMap::new();

        for t in transactions {
            let map = if t.is_income() { &mut income } else { &mut expense };
            let entry = map.entry(t.category).or_insert((0.0, 0));
            entry.0 += t.amount;
            entry.1 += 1;
        }

        CategorySummary {
            income: sorted_totals(income),
            expense: sorted_totals(expense),
        }
    }

    pub(crate) fn total_expense(&self) -> f64 {
        self.expense.iter().map(|c| c.total).sum()
    }

    pub(crate) fn total_income(&self) -> f64 {
        self.income.iter().map(|c| c.total).sum()
    }
}

fn sorted_totals(map: BTreeMap<Category, (f64, usize)>) -> Vec<CategoryTotal> {
    let mut totals: Vec<CategoryTotal> = map.into_iter()
        .map(|(category, (total, count))| CategoryTotal { category, total, count })
        .collect();
    totals.sort_by(|a, b| b.total.total_cmp(&a.total).then(a.category.cmp(&b.category)));
    totals
}

#[cfg(test)]
mod tests {
    use crate::db::tests::fixture_filename;
    use crate::db::{Database, Filter};
    use super::*;

    #[test]
    fn test_category_summary() {
        let db = Database::load(&fixture_filename("financial_data.json")).unwrap();
        let summary = db.category_summary(&Filter::all());

        assert_eq!(summary.expense[0], CategoryTotal { category: Category::Housing, total: 1200.0, count: 1 });
        assert_eq!(summary.expense[1], CategoryTotal { category: Category::Food, total: 640.0, count: 3 });
        assert_eq!(summary.income.len(), 2);
        assert_eq!(summary.total_income(), 5800.0);
    }
}
