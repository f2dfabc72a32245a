use crate::db::{Balance, Database, Filter};
use crate::transaction::Category;
use crate::util;

const TOP_CATEGORIES: usize = 5;

/// Summary of a single calendar month
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct MonthlyReport {
    pub(crate) year: i32,
    pub(crate) month: u32,
    pub(crate) balance: Balance,
    pub(crate) transaction_count: usize,
    /// (income + expense) / transaction count
    pub(crate) average_ticket: f64,
    /// Largest expense categories with their total and share of all expenses
    pub(crate) top_expenses: Vec<(Category, f64, f64)>,
}

impl MonthlyReport {
    pub(crate) fn build(db: &Database, year: i32, month: u32) -> Option<MonthlyReport> {
        let range = util::month_range(year, month)?;
        let filter = Filter::between(Some(*range.start()), Some(*range.end()));

        let transaction_count = db.query(&filter).len();
        let balance = db.balance(&filter);
        let summary = db.category_summary(&filter);

        let average_ticket = (balance.income + balance.expense) / transaction_count.max(1) as f64;
        let top_expenses = summary.expense.iter()
            .take(TOP_CATEGORIES)
            .map(|c| (c.category, c.total, util::percentage(c.total, balance.expense)))
            .collect();

        Some(MonthlyReport {
            year,
            month,
            balance,
            transaction_count,
            average_ticket,
            top_expenses,
        })
    }

    pub(crate) fn render(&self, currency_symbol: &str) -> String {
        let money = |v: f64| util::format_currency(v, currency_symbol);

        let mut report = format!("REPORT FOR {} {}\n", util::month_name(self.month).to_uppercase(), self.year);
        report.push_str(&"=".repeat(30));
        report.push_str("\n\n");

        report.push_str("SUMMARY\n");
        report.push_str(&format!("   Income:  {}\n", money(self.balance.income)));
        report.push_str(&format!("   Expense: {}\n", money(self.balance.expense)));
        report.push_str(&format!("   Balance: {}\n\n", money(self.balance.balance)));

        report.push_str("STATISTICS\n");
        report.push_str(&format!("   Transactions:   {}\n", self.transaction_count));
        report.push_str(&format!("   Average ticket: {}\n", money(self.average_ticket)));

        if !self.top_expenses.is_empty() {
            report.push_str(&format!("\nTOP {} EXPENSE CATEGORIES\n", TOP_CATEGORIES));
            for (i, (category, total, share)) in self.top_expenses.iter().enumerate() {
                report.push_str(&format!("   {}. {}: {} ({:.1}%)\n", i + 1, category, money(*total), share));
            }
        }

        report
    }
}
