use std::fs::File;
use std::io::Write;
use std::path::Path;
use anyhow::Context;
use csv::WriterBuilder;
use crate::transaction::Transaction;
use crate::util::format_date;

const HEADER: [&str; 6] = ["Date", "Description", "Type", "Category", "Amount", "Notes"];

/// Export transactions to a `;` delimited CSV file that spreadsheet tools open directly
pub(crate) fn export_csv(file_path: &Path, transactions: &[Transaction]) -> anyhow::Result<usize> {
    let mut file = File::create(file_path).with_context(|| format!("Unable to create {}", file_path.display()))?;
    // UTF-8 byte order mark so spreadsheets detect the encoding
    file.write_all("\u{feff}".as_bytes())?;

    let mut csv_writer = WriterBuilder::new().delimiter(b';').from_writer(file);
    csv_writer.write_record(HEADER)?;
    for t in transactions {
        csv_writer.write_record([
            format_date(t.date),
            t.description.clone(),
            t.transaction_type.to_string(),
            t.category.to_string(),
            format!("{:.2}", t.amount).replace('.', ","),
            t.notes_display().to_string(),
        ])?;
    }
    csv_writer.flush()?;

    Ok(transactions.len())
}

#[cfg(test)]
mod tests {
    use std::fs;
    use tempfile::TempDir;
    use crate::db::tests::fixture_filename;
    use crate::db::{Database, Filter};
    use super::*;

    #[test]
    fn test_export() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("export.csv");
        let db = Database::load(&fixture_filename("financial_data.json")).unwrap();

        let count = export_csv(&path, &db.query(&Filter::all())).unwrap();
        assert_eq!(count, 8);

        let content = fs::read_to_string(&path).unwrap();
        let mut lines = content.trim_start_matches('\u{feff}').lines();
        assert_eq!(lines.next(), Some("Date;Description;Type;Category;Amount;Notes"));
        assert_eq!(lines.next(), Some("02/04/2024;Netflix subscription;Expense;Entertainment;39,90;family plan"));
        assert_eq!(content.lines().count(), 9);
    }
}
