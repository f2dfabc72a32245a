mod filter;
mod summary;

use std::collections::BTreeMap;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use chrono::{Local, NaiveDateTime};
use log::{info, warn};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::transaction::{Category, Transaction, TransactionType};

pub(crate) use filter::Filter;
pub(crate) use summary::{Balance, CategorySummary, CategoryTotal};

/// fintrack binary version, written into every data file
const FINTRACK_VERSION: &str = env!("CARGO_PKG_VERSION");

#[derive(Error, Debug)]
pub(crate) enum DbError {
    #[error("unable to read {path}: {source}")]
    Read { path: PathBuf, source: io::Error },

    #[error("unable to write {path}: {source}")]
    Write { path: PathBuf, source: io::Error },

    #[error("{path} is not a valid data file: {source}")]
    Corrupt { path: PathBuf, source: serde_json::Error },

    #[error("unable to encode data file: {0}")]
    Encode(#[from] serde_json::Error),

    #[error("no transaction ids left in {path}")]
    IdsExhausted { path: PathBuf },
}

/// A transaction about to be inserted. Id and defaults are filled in by the database.
#[derive(Debug, Clone)]
pub(crate) struct Record {
    pub(crate) description: String,
    pub(crate) amount: f64,
    pub(crate) transaction_type: TransactionType,
    pub(crate) category: Category,
    pub(crate) date: Option<NaiveDateTime>,
    pub(crate) notes: Option<String>,
}

/// On-disk layout of the data file
#[derive(Serialize, Deserialize, Debug)]
struct DataFile {
    transactions: Vec<Transaction>,
    saved_at: Option<NaiveDateTime>,
    #[serde(default)]
    version: String,
    #[serde(default)]
    transaction_id_seed: u32,
}

pub(crate) struct Database {
    transaction_id_seed: u32,
    transactions: BTreeMap<u32, Transaction>,
    file_path: PathBuf,
}

impl Database {
    pub(crate) fn new(file_path: PathBuf) -> Database {
        Database {
            transaction_id_seed: 1,
            transactions: BTreeMap::new(),
            file_path,
        }
    }

    /// Load the data file. A missing file gives an empty database, an unreadable one is an error.
    pub(crate) fn load(path: &Path) -> Result<Database, DbError> {
        let mut database = Database::new(path.to_path_buf());
        database.reload()?;
        Ok(database)
    }

    /// Replace in-memory content with what is currently on disk
    pub(crate) fn reload(&mut self) -> Result<(), DbError> {
        self.transactions.clear();
        self.transaction_id_seed = 1;

        if !self.file_path.exists() {
            info!("Data file {} not found, starting with an empty database", self.file_path.display());
            return Ok(());
        }

        let content = fs::read_to_string(&self.file_path)
            .map_err(|source| DbError::Read { path: self.file_path.clone(), source })?;
        let data: DataFile = serde_json::from_str(&content)
            .map_err(|source| DbError::Corrupt { path: self.file_path.clone(), source })?;
        info!("Loaded {} transactions written by version {}", data.transactions.len(), data.version);

        let mut seed = data.transaction_id_seed.max(1);
        for t in data.transactions {
            if t.id >= seed {
                seed = t.id.checked_add(1)
                    .ok_or_else(|| DbError::IdsExhausted { path: self.file_path.clone() })?;
            }
            if self.transactions.insert(t.id, t).is_some() {
                warn!("Duplicate transaction id in {}, keeping the last one", self.file_path.display());
            }
        }
        self.transaction_id_seed = seed;

        Ok(())
    }

    /// Write the whole database to disk
    pub(crate) fn save(&self) -> Result<(), DbError> {
        let data = DataFile {
            transactions: self.transactions.values().cloned().collect(),
            saved_at: Some(Local::now().naive_local()),
            version: FINTRACK_VERSION.to_string(),
            transaction_id_seed: self.transaction_id_seed,
        };
        let encoded = serde_json::to_string_pretty(&data)?;

        let write_error = |source| DbError::Write { path: self.file_path.clone(), source };
        if let Some(parent) = self.file_path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent).map_err(write_error)?;
            }
        }

        // Write next to the data file first so a failed write never truncates it
        let temp_path = self.file_path.with_extension("json.tmp");
        fs::write(&temp_path, encoded).map_err(write_error)?;
        fs::rename(&temp_path, &self.file_path).map_err(write_error)?;

        Ok(())
    }

    pub(crate) fn add(&mut self, record: Record) -> Result<Transaction, DbError> {
        let id = self.transaction_id_seed;
        let next_seed = id.checked_add(1)
            .ok_or_else(|| DbError::IdsExhausted { path: self.file_path.clone() })?;

        let date = record.date.unwrap_or_else(|| Local::now().naive_local());
        let t = Transaction::new(id, &record.description, record.amount, record.transaction_type,
                                 record.category, date, record.notes);
        info!("Adding transaction {} '{}'", id, t.description);
        self.transactions.insert(id, t.clone());
        self.transaction_id_seed = next_seed;

        // nothing changes unless it reached the disk
        if let Err(e) = self.save() {
            self.transactions.remove(&id);
            self.transaction_id_seed = id;
            return Err(e);
        }

        Ok(t)
    }

    /// Delete transactions by id. Returns how many were actually removed.
    pub(crate) fn delete(&mut self, ids: &[u32]) -> Result<usize, DbError> {
        let mut removed = vec![];
        for id in ids {
            match self.transactions.remove(id) {
                Some(t) => removed.push(t),
                None => warn!("Transaction {id} does not exist"),
            }
        }

        if !removed.is_empty() {
            if let Err(e) = self.save() {
                for t in removed {
                    self.transactions.insert(t.id, t);
                }
                return Err(e);
            }
        }
        Ok(removed.len())
    }

    pub(crate) fn find_by_id(&self, id: u32) -> Option<&Transaction> {
        self.transactions.get(&id)
    }

    /// Transactions matching the filter, newest first
    pub(crate) fn query(&self, filter: &Filter) -> Vec<Transaction> {
        let mut results: Vec<Transaction> = self.transactions.values()
            .filter(|t| filter.matches(t))
            .cloned()
            .collect();
        results.sort_by(|a, b| b.date.cmp(&a.date).then(b.id.cmp(&a.id)));
        results
    }

    pub(crate) fn all(&self) -> impl Iterator<Item = &Transaction> {
        self.transactions.values()
    }

    pub(crate) fn len(&self) -> usize {
        self.transactions.len()
    }

    pub(crate) fn file_path(&self) -> &Path {
        &self.file_path
    }

    pub(crate) fn balance(&self, filter: &Filter) -> Balance {
        Balance::from_transactions(self.transactions.values().filter(|t| filter.matches(t)))
    }

    pub(crate) fn category_summary(&self, filter: &Filter) -> CategorySummary {
        CategorySummary::from_transactions(self.transactions.values().filter(|t| filter.matches(t)))
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use std::path::PathBuf;
    use std::str::FromStr;
    use tempfile::TempDir;
    use super::*;

    fn record(description: &str, amount: f64, transaction_type: TransactionType, category: Category, date: &str) -> Record {
        Record {
            description: description.to_string(),
            amount,
            transaction_type,
            category,
            date: Some(NaiveDateTime::from_str(date).unwrap()),
            notes: None,
        }
    }

    /// Return the path to a file within the test data directory
    pub(crate) fn fixture_filename(filename: &str) -> PathBuf {
        let mut dir = PathBuf::from(env!("CARGO_MANIFEST_DIR"));
        dir.push("fixture");
        dir.push(filename);
        dir
    }

    #[test]
    fn test_missing_file_gives_empty_database() {
        let dir = TempDir::new().unwrap();
        let db = Database::load(&dir.path().join("nothing.json")).unwrap();
        assert_eq!(db.len(), 0);
    }

    #[test]
    fn test_add_save_and_reload() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("data").join("financial_data.json");

        let mut db = Database::load(&path).unwrap();
        let first = db.add(record("Coffee", -4.5, TransactionType::Expense, Category::Food, "2024-03-01T08:00:00")).unwrap();
        let second = db.add(record("Salary", 5000.0, TransactionType::Income, Category::Salary, "2024-03-05T09:00:00")).unwrap();
        assert_eq!(first.id, 1);
        assert_eq!(second.id, 2);
        assert_eq!(first.amount, 4.5);
        assert!(path.exists());

        let mut db = Database::load(&path).unwrap();
        assert_eq!(db.len(), 2);
        assert_eq!(db.find_by_id(1).unwrap().description, "Coffee");

        // ids are never reused, even after deleting the newest transaction
        assert_eq!(db.delete(&[2, 99]).unwrap(), 1);
        let third = db.add(record("Bus", 3.0, TransactionType::Expense, Category::Transport, "2024-03-06T09:00:00")).unwrap();
        assert_eq!(third.id, 3);
    }

    #[test]
    fn test_corrupt_file_is_an_error() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("financial_data.json");
        fs::write(&path, "{ not json").unwrap();
        assert!(matches!(Database::load(&path), Err(DbError::Corrupt { .. })));
    }

    #[test]
    fn test_failed_save_leaves_database_unchanged() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("financial_data.json");
        let mut db = Database::load(&path).unwrap();
        db.add(record("Coffee", 4.5, TransactionType::Expense, Category::Food, "2024-03-01T08:00:00")).unwrap();

        // a directory in place of the temp file makes every write fail
        let temp_path = path.with_extension("json.tmp");
        fs::create_dir(&temp_path).unwrap();
        assert!(matches!(db.add(record("Lunch", 20.0, TransactionType::Expense, Category::Food, "2024-03-01T12:00:00")),
                         Err(DbError::Write { .. })));
        assert!(db.delete(&[1]).is_err());
        assert_eq!(db.len(), 1);
        assert!(db.find_by_id(1).is_some());
        fs::remove_dir(&temp_path).unwrap();

        let bus = db.add(record("Bus", 3.0, TransactionType::Expense, Category::Transport, "2024-03-02T08:00:00")).unwrap();
        assert_eq!(bus.id, 2);
        let reloaded = Database::load(&path).unwrap();
        assert_eq!(reloaded.len(), 2);
        assert!(reloaded.all().all(|t| t.description != "Lunch"));
    }

    #[test]
    fn test_highest_id_cannot_be_exceeded() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("financial_data.json");
        fs::write(&path, r#"{"transactions": [{"id": 4294967295, "description": "Rent", "amount": 1200.0,
            "transaction_type": "expense", "category": "housing", "date": "2024-03-01T00:00:00"}]}"#).unwrap();
        assert!(matches!(Database::load(&path), Err(DbError::IdsExhausted { .. })));

        let mut db = Database::load(&dir.path().join("other.json")).unwrap();
        db.transaction_id_seed = u32::MAX;
        assert!(matches!(db.add(record("Rent", 1200.0, TransactionType::Expense, Category::Housing, "2024-03-01T00:00:00")),
                         Err(DbError::IdsExhausted { .. })));
        assert_eq!(db.len(), 0);
    }

    #[test]
    fn test_load_fixture() {
        let db = Database::load(&fixture_filename("financial_data.json")).unwrap();
        assert_eq!(db.len(), 8);
        assert!(db.find_by_id(8).unwrap().notes.is_some());
    }

    #[test]
    fn test_query_sorted_newest_first() {
        let db = Database::load(&fixture_filename("financial_data.json")).unwrap();
        let results = db.query(&Filter::all());
        assert_eq!(results.len(), 8);
        for pair in results.windows(2) {
            assert!(pair[0].date >= pair[1].date);
        }

        let expenses = db.query(&Filter { transaction_type: Some(TransactionType::Expense), ..Filter::all() });
        assert!(expenses.iter().all(|t| !t.is_income()));
    }

    #[test]
    fn test_balance_for_month() {
        let db = Database::load(&fixture_filename("financial_data.json")).unwrap();
        let range = crate::util::month_range(2024, 3).unwrap();
        let balance = db.balance(&Filter::between(Some(*range.start()), Some(*range.end())));
        assert_eq!(balance.income, 5800.0);
        assert_eq!(balance.expense, 1635.5);
        assert_eq!(balance.balance, 5800.0 - 1635.5);
    }
}
