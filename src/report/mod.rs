mod monthly;

use comfy_table::{Cell, CellAlignment, Color, Table, TableComponent};
use crate::backup::BackupInfo;
use crate::db::{Balance, CategorySummary, CategoryTotal};
use crate::suggest::{Pattern, PopularEntry, Statistics};
use crate::transaction::{Category, Transaction};
use crate::util::{format_currency, format_date, percentage, title_case};

pub(crate) use monthly::MonthlyReport;

/// Table with the horizontal separators removed
pub(crate) fn new_table() -> Table {
    let mut table = Table::new();
    table.remove_style(TableComponent::HorizontalLines);
    table.remove_style(TableComponent::MiddleIntersections);
    table.remove_style(TableComponent::LeftBorderIntersections);
    table.remove_style(TableComponent::RightBorderIntersections);
    table
}

fn amount_cell(amount: f64, currency_symbol: &str) -> Cell {
    Cell::new(format_currency(amount, currency_symbol)).set_alignment(CellAlignment::Right)
}

pub(crate) fn transactions_table(transactions: &[Transaction], currency_symbol: &str) -> Table {
    let mut table = new_table();
    table.set_header(vec!["ID", "Date", "Description", "Type", "Category", "Amount", "Notes"]);

    for t in transactions {
        let color = if t.is_income() { Color::Green } else { Color::Red };
        table.add_row(vec![
            Cell::new(t.id).set_alignment(CellAlignment::Right),
            Cell::new(format_date(t.date)),
            Cell::new(t.description.as_str()),
            Cell::new(t.transaction_type),
            Cell::new(t.category),
            amount_cell(t.amount, currency_symbol).fg(color),
            Cell::new(t.notes_display()),
        ]);
    }

    table
}

pub(crate) fn balance_table(balance: &Balance, currency_symbol: &str) -> Table {
    let mut table = new_table();
    table.set_header(vec!["Income", "Expense", "Balance"]);

    let balance_color = if balance.balance >= 0.0 { Color::Green } else { Color::Red };
    table.add_row(vec![
        amount_cell(balance.income, currency_symbol).fg(Color::Green),
        amount_cell(balance.expense, currency_symbol).fg(Color::Red),
        amount_cell(balance.balance, currency_symbol).fg(balance_color),
    ]);

    table
}

/// One table per transaction type: category, total, share of the type's total and count
pub(crate) fn category_tables(summary: &CategorySummary, currency_symbol: &str) -> (Table, Table) {
    (
        category_table("Expense category", &summary.expense, summary.total_expense(), currency_symbol),
        category_table("Income category", &summary.income, summary.total_income(), currency_symbol),
    )
}

fn category_table(title: &str, totals: &[CategoryTotal], grand_total: f64, currency_symbol: &str) -> Table {
    let mut table = new_table();
    table.set_header(vec![title, "Amount", "Share", "Transactions"]);

    for c in totals {
        table.add_row(vec![
            Cell::new(c.category),
            amount_cell(c.total, currency_symbol),
            Cell::new(format!("{:.1}%", percentage(c.total, grand_total))).set_alignment(CellAlignment::Right),
            Cell::new(format!("{}x", c.count)).set_alignment(CellAlignment::Right),
        ]);
    }

    table
}

pub(crate) fn backups_table(backups: &[BackupInfo]) -> Table {
    let mut table = new_table();
    table.set_header(vec!["File", "Size", "Modified"]);

    for b in backups {
        let modified = b.modified.map(|m| m.format("%d/%m/%Y %H:%M").to_string()).unwrap_or_default();
        table.add_row(vec![
            Cell::new(b.filename.as_str()),
            Cell::new(format!("{:.1} KB", b.size as f64 / 1024.0)).set_alignment(CellAlignment::Right),
            Cell::new(modified),
        ]);
    }

    table
}

pub(crate) fn popular_table(entries: &[PopularEntry], currency_symbol: &str) -> Table {
    let mut table = new_table();
    table.set_header(vec!["Description", "Category", "Amount", "Frequency"]);

    for e in entries {
        table.add_row(vec![
            Cell::new(e.description.as_str()),
            Cell::new(e.category.map(|c| c.to_string()).unwrap_or_default()),
            match e.amount {
                Some(amount) => amount_cell(amount, currency_symbol),
                None => Cell::new(""),
            },
            Cell::new(format!("{}x", e.frequency)).set_alignment(CellAlignment::Right),
        ]);
    }

    table
}

/// Description completions with the category and amount that would be filled in
pub(crate) fn suggestions_table(suggestions: &[(String, Option<Category>, Option<f64>)], currency_symbol: &str) -> Table {
    let mut table = new_table();
    table.set_header(vec!["Description", "Category", "Amount"]);

    for (description, category, amount) in suggestions {
        table.add_row(vec![
            Cell::new(description.as_str()),
            Cell::new(category.map(|c| c.to_string()).unwrap_or_default()),
            match amount {
                Some(amount) => amount_cell(*amount, currency_symbol),
                None => Cell::new(""),
            },
        ]);
    }

    table
}

pub(crate) fn statistics_table(stats: &Statistics, enabled: bool) -> Table {
    let mut table = new_table();
    table.set_header(vec!["Statistic", "Value"]);

    let last_update = stats.last_update.map(|t| t.format("%d/%m/%Y %H:%M").to_string()).unwrap_or_else(|| "Never".to_string());
    table.add_row(vec!["Suggestions", if enabled { "Enabled" } else { "Disabled" }]);
    table.add_row(vec!["Descriptions recorded".to_string(), stats.total_descriptions.to_string()]);
    table.add_row(vec!["Unique descriptions".to_string(), stats.unique_descriptions.to_string()]);
    table.add_row(vec!["Keywords learned".to_string(), stats.keywords_learned.to_string()]);
    table.add_row(vec!["Category patterns".to_string(), stats.category_patterns.to_string()]);
    table.add_row(vec!["Last update".to_string(), last_update]);

    table
}

pub(crate) fn patterns_table(patterns: &[Pattern]) -> Table {
    let mut table = new_table();
    table.set_header(vec!["Keyword", "Category", "Frequency", "Confidence"]);

    for p in patterns {
        table.add_row(vec![
            Cell::new(title_case(&p.keyword)),
            Cell::new(p.category),
            Cell::new(format!("{}x", p.frequency)).set_alignment(CellAlignment::Right),
            Cell::new(format!("{:.1}%", p.confidence)).set_alignment(CellAlignment::Right),
        ]);
    }

    table
}

pub(crate) fn key_value_table(entries: &[(&str, String)]) -> Table {
    let mut table = new_table();
    table.set_header(vec!["Key", "Value"]);
    for (key, value) in entries {
        table.add_row(vec![key.to_string(), value.clone()]);
    }
    table
}

#[cfg(test)]
mod tests {
    use crate::db::tests::fixture_filename;
    use crate::db::{Database, Filter};
    use super::*;

    #[test]
    fn test_category_table_content() {
        let db = Database::load(&fixture_filename("financial_data.json")).unwrap();
        let (expense, income) = category_tables(&db.category_summary(&Filter::all()), "R$");

        let expense = expense.to_string();
        assert!(expense.contains("Housing"));
        assert!(expense.contains("R$ 1.200,00"));
        assert!(expense.contains("3x"));
        assert!(income.to_string().contains("Freelance"));
    }

    #[test]
    fn test_transactions_table() {
        let db = Database::load(&fixture_filename("financial_data.json")).unwrap();
        let table = transactions_table(&db.query(&Filter::all()), "$").to_string();
        assert!(table.contains("Netflix subscription"));
        assert!(table.contains("family plan"));
        assert!(table.contains("02/04/2024"));
    }
}
