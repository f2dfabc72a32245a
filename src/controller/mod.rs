mod backup;
mod export;
mod suggest;

use std::io::Write;
use std::path::PathBuf;

use anyhow::{anyhow, bail};
use chrono::{Local, NaiveDateTime, NaiveTime};
use log::{info, warn};

use crate::backup::BackupManager;
use crate::config::Config;
use crate::db::{Database, Filter, Record};
use crate::live_edit;
use crate::parser::{self, AddArgs, Statement};
use crate::period::Period;
use crate::report::{self, MonthlyReport};
use crate::suggest::SuggestionEngine;
use crate::util;

/// Status line keeps the tail of long data paths
const STATUS_PATH_CHARS: usize = 40;

/// Everything a command can act on
pub(crate) struct Session {
    pub(crate) config: Config,
    pub(crate) db: Database,
    pub(crate) suggestions: SuggestionEngine,
    pub(crate) backups: BackupManager,
    /// Ids from the last LIST, used by BROWSE
    pub(crate) last_query_results: Option<Vec<u32>>,
}

impl Session {
    /// Load the database, run the automatic backup when it is due and learn suggestions
    pub(crate) fn open(config: Config) -> anyhow::Result<Session> {
        config.ensure_directories()?;
        let db = Database::load(&config.database_path)?;
        let backups = BackupManager::new(&config.backup_path, &config.database_path);

        if config.auto_backup {
            match backups.auto_backup(config.backup_interval_days, now()) {
                Ok(Some(path)) => info!("Automatic backup written to {}", path.display()),
                Ok(None) => {}
                Err(e) => warn!("Automatic backup failed: {e}"),
            }
        }

        let mut session = Session {
            config,
            db,
            suggestions: SuggestionEngine::new(),
            backups,
            last_query_results: None,
        };
        session.refresh_suggestions();
        Ok(session)
    }

    pub(crate) fn refresh_suggestions(&mut self) {
        if self.config.suggestions_enabled {
            self.suggestions.rebuild(self.db.all(), now());
        } else {
            self.suggestions = SuggestionEngine::new();
        }
    }

    /// Apply one config change. New paths must open before the config is saved or the session switches to them.
    fn update_config(&mut self, key: &str, value: &str) -> anyhow::Result<bool> {
        let mut candidate = self.config.clone();
        candidate.apply(key, value)?;

        let paths_changed = candidate.database_path != self.config.database_path
            || candidate.backup_path != self.config.backup_path;
        let db = if paths_changed {
            candidate.ensure_directories()?;
            Some(Database::load(&candidate.database_path)?)
        } else {
            None
        };

        candidate.save()?;
        self.config = candidate;
        if let Some(db) = db {
            self.db = db;
            self.backups = BackupManager::new(&self.config.backup_path, &self.config.database_path);
            self.last_query_results = None;
        }
        self.refresh_suggestions();
        Ok(paths_changed)
    }

    fn currency(&self) -> &str {
        &self.config.currency_symbol
    }
}

fn now() -> NaiveDateTime {
    Local::now().naive_local()
}

pub(crate) fn parse_and_run_command(session: &mut Session, input: &str, out: &mut impl Write) -> anyhow::Result<()> {
    let statement = parser::parse(input).map_err(|e| anyhow!(e))?;
    run_statement(session, statement, out)
}

pub(crate) fn run_statement(session: &mut Session, statement: Statement, out: &mut impl Write) -> anyhow::Result<()> {
    let now = now();

    match statement {
        Statement::Add(args) => {
            execute_add(session, args, now, out)?;
        }
        Statement::Delete(trans_ids) => {
            let deleted = session.db.delete(&trans_ids)?;
            session.refresh_suggestions();
            writeln!(out, "{deleted} transactions deleted.")?;
        }
        Statement::List(criteria) => {
            let transactions = session.db.query(&criteria.to_filter(Period::All, now));
            writeln!(out, "{}", report::transactions_table(&transactions, session.currency()))?;
            writeln!(out, "{} transactions", transactions.len())?;
            session.last_query_results = Some(transactions.iter().map(|t| t.id).collect());
        }
        Statement::Balance(criteria) => {
            let period = criteria.period.unwrap_or(Period::Month);
            let balance = session.db.balance(&criteria.to_filter(Period::Month, now));
            writeln!(out, "Balance for {period}")?;
            writeln!(out, "{}", report::balance_table(&balance, session.currency()))?;
        }
        Statement::Categories(criteria) => {
            let period = criteria.period.unwrap_or(Period::Month);
            let summary = session.db.category_summary(&criteria.to_filter(Period::Month, now));
            let (expense, income) = report::category_tables(&summary, session.currency());
            writeln!(out, "Categories for {period}")?;
            if !summary.expense.is_empty() {
                writeln!(out, "{expense}")?;
            }
            if !summary.income.is_empty() {
                writeln!(out, "{income}")?;
            }
            if summary.expense.is_empty() && summary.income.is_empty() {
                writeln!(out, "No transactions.")?;
            }
        }
        Statement::Report(month) => {
            let (year, month) = month.unwrap_or_else(util::current_month);
            let monthly = MonthlyReport::build(&session.db, year, month)
                .ok_or_else(|| anyhow!("Invalid month {month:02}/{year}"))?;
            write!(out, "{}", monthly.render(session.currency()))?;
        }
        Statement::Suggest(transaction_type, partial) => {
            suggest::execute_suggest(session, transaction_type, &partial, out)?;
        }
        Statement::Popular(transaction_type) => {
            suggest::execute_popular(session, transaction_type, out)?;
        }
        Statement::Patterns => {
            suggest::execute_patterns(session, out)?;
        }
        Statement::Backup => {
            backup::execute_backup(session, now, out)?;
        }
        Statement::Backups => {
            backup::execute_list_backups(session, out)?;
        }
        Statement::Restore(filename) => {
            backup::execute_restore(session, &filename, now, out)?;
        }
        Statement::Export(file_path, criteria) => {
            let transactions = session.db.query(&criteria.to_filter(Period::All, now));
            let count = export::export_csv(&PathBuf::from(&file_path), &transactions)?;
            writeln!(out, "{count} transactions exported to {file_path}")?;
        }
        Statement::Config => {
            if let Some(path) = session.config.file_path() {
                writeln!(out, "Config file: {}", path.display())?;
            }
            writeln!(out, "{}", report::key_value_table(&session.config.entries()))?;
        }
        Statement::Set(key, value) => {
            if session.update_config(&key, &value)? {
                writeln!(out, "Now using {} ({} transactions)", session.db.file_path().display(), session.db.len())?;
            }
            writeln!(out, "{key} updated.")?;
        }
        Statement::Status => {
            writeln!(out, "{}", status_line(session)?)?;
        }
        Statement::Browse => {
            let ids = match &session.last_query_results {
                Some(ids) => ids.clone(),
                None => session.db.query(&Filter::all()).iter().map(|t| t.id).collect(),
            };
            if ids.is_empty() {
                writeln!(out, "No transactions to browse.")?;
            } else {
                let deleted = live_edit::browse(ids, session)?;
                if deleted > 0 {
                    session.refresh_suggestions();
                    writeln!(out, "{deleted} transactions deleted.")?;
                }
            }
        }
    }

    Ok(())
}

fn execute_add(session: &mut Session, args: AddArgs, now: NaiveDateTime, out: &mut impl Write) -> anyhow::Result<()> {
    if args.description.is_empty() {
        bail!("Description cannot be empty");
    }

    let suggestions_enabled = session.config.suggestions_enabled;
    let amount = match args.amount {
        Some(amount) => amount,
        None if suggestions_enabled => session.suggestions.amount_for(&args.description)
            .ok_or_else(|| anyhow!("No amount given and none known for '{}'", args.description))?,
        None => bail!("No amount given"),
    };
    if !amount.is_finite() || amount == 0.0 {
        bail!("Invalid amount {amount}");
    }

    let category = match args.category {
        Some(category) => {
            if !category.is_compatible(args.transaction_type) {
                bail!("Category {category} cannot be used for {} transactions", args.transaction_type);
            }
            category
        }
        None => {
            let suggested = if suggestions_enabled {
                session.suggestions.category_for(&args.description, args.transaction_type)
            } else {
                None
            };
            suggested.unwrap_or_else(|| args.transaction_type.fallback_category())
        }
    };

    let t = session.db.add(Record {
        description: args.description,
        amount,
        transaction_type: args.transaction_type,
        category,
        date: Some(args.date.map_or(now, |d| d.and_time(NaiveTime::MIN))),
        notes: args.notes,
    })?;
    session.refresh_suggestions();

    writeln!(out, "Transaction {} added: {} {} ({}, {})", t.id, t.transaction_type, util::format_currency(t.amount, session.currency()),
             t.category, t.description)?;
    Ok(())
}

fn status_line(session: &Session) -> anyhow::Result<String> {
    let path = session.db.file_path().display().to_string();
    let last_backup = session.backups.latest()?
        .and_then(|b| b.modified)
        .map(|m| m.format("%d/%m/%Y %H:%M").to_string())
        .unwrap_or_else(|| "Never".to_string());

    Ok(format!("{} | {} transactions | Last backup: {}",
               util::shorten(&path, STATUS_PATH_CHARS), session.db.len(), last_backup))
}

#[cfg(test)]
pub(crate) mod tests {
    use std::fs;
    use tempfile::TempDir;
    use crate::db::tests::fixture_filename;
    use crate::transaction::{Category, TransactionType};
    use super::*;

    /// A session over a copy of the fixture data inside a temp dir
    pub(crate) fn session(dir: &TempDir) -> Session {
        fs::copy(fixture_filename("financial_data.json"), dir.path().join("financial_data.json")).unwrap();
        let config_path = dir.path().join("config.toml");
        fs::write(&config_path, "database_path = \"financial_data.json\"\nbackup_path = \"backups\"\nauto_backup = false\n").unwrap();
        Session::open(Config::load_from_file(&config_path).unwrap()).unwrap()
    }

    pub(crate) fn run(session: &mut Session, command: &str) -> anyhow::Result<String> {
        let mut out: Vec<u8> = vec![];
        parse_and_run_command(session, command, &mut out)?;
        Ok(String::from_utf8(out).unwrap())
    }

    #[test]
    fn test_add_with_explicit_values() {
        let dir = TempDir::new().unwrap();
        let mut session = session(&dir);

        let output = run(&mut session, "add expense 25 'Pharmacy' category health on 10/03/2024 note 'vitamins';").unwrap();
        assert!(output.starts_with("Transaction 9 added"));

        let t = session.db.find_by_id(9).unwrap();
        assert_eq!(t.category, Category::Health);
        assert_eq!(t.notes.as_deref(), Some("vitamins"));
        assert_eq!(t.date.to_string(), "2024-03-10 00:00:00");

        let reloaded = Database::load(&dir.path().join("financial_data.json")).unwrap();
        assert_eq!(reloaded.len(), 9);
    }

    #[test]
    fn test_add_fills_from_suggestions() {
        let dir = TempDir::new().unwrap();
        let mut session = session(&dir);

        run(&mut session, "add expense 'Supermarket groceries'").unwrap();
        let t = session.db.find_by_id(9).unwrap();
        assert_eq!(t.amount, 195.0);
        assert_eq!(t.category, Category::Food);

        // nothing known about this one: amount is required, category falls back
        assert!(run(&mut session, "add expense 'Dentist'").is_err());
        run(&mut session, "add expense 80 'Dentist'").unwrap();
        assert_eq!(session.db.find_by_id(10).unwrap().category, Category::OtherExpense);
    }

    #[test]
    fn test_add_rejects_incompatible_category() {
        let dir = TempDir::new().unwrap();
        let mut session = session(&dir);
        assert!(run(&mut session, "add income 100 'Gift' category food").is_err());
        assert_eq!(session.db.len(), 8);
    }

    #[test]
    fn test_add_without_suggestions() {
        let dir = TempDir::new().unwrap();
        let mut session = session(&dir);
        run(&mut session, "set suggestions_enabled false").unwrap();
        assert!(run(&mut session, "add expense 'Supermarket groceries'").is_err());
        run(&mut session, "add expense 10 'Supermarket groceries'").unwrap();
        assert_eq!(session.db.find_by_id(9).unwrap().category, Category::OtherExpense);
    }

    #[test]
    fn test_delete_and_list() {
        let dir = TempDir::new().unwrap();
        let mut session = session(&dir);

        let output = run(&mut session, "delete 1, 2, 42").unwrap();
        assert_eq!(output, "2 transactions deleted.\n");

        let output = run(&mut session, "list expense period 03/2024").unwrap();
        assert!(output.contains("Supermarket groceries"));
        assert!(!output.contains("Rent"));
        assert!(output.ends_with("3 transactions\n"));
        assert_eq!(session.last_query_results, Some(vec![7, 5, 3]));
    }

    #[test]
    fn test_reports() {
        let dir = TempDir::new().unwrap();
        let mut session = session(&dir);

        let output = run(&mut session, "balance period 03/2024").unwrap();
        assert!(output.contains("Balance for March 2024"));
        assert!(output.contains("R$ 4.164,50"));

        let output = run(&mut session, "categories period all").unwrap();
        assert!(output.contains("Housing"));
        assert!(output.contains("Salary"));

        let output = run(&mut session, "report 03/2024").unwrap();
        assert!(output.contains("Transactions:   6"));
    }

    #[test]
    fn test_status_and_config() {
        let dir = TempDir::new().unwrap();
        let mut session = session(&dir);

        let output = run(&mut session, "status").unwrap();
        assert!(output.contains("8 transactions | Last backup: Never"));

        run(&mut session, "set currency_symbol $").unwrap();
        let output = run(&mut session, "config").unwrap();
        assert!(output.contains("currency_symbol"));
        assert_eq!(session.currency(), "$");

        assert!(run(&mut session, "set colour blue").is_err());
    }

    #[test]
    fn test_export_command() {
        let dir = TempDir::new().unwrap();
        let mut session = session(&dir);
        let path = dir.path().join("income.csv");

        let output = run(&mut session, &format!("export to '{}' income", path.display())).unwrap();
        assert!(output.starts_with("2 transactions exported"));
        assert!(fs::read_to_string(path).unwrap().contains("Freelance website"));
    }

    #[test]
    fn test_set_to_corrupt_database_changes_nothing() {
        let dir = TempDir::new().unwrap();
        let mut session = session(&dir);
        fs::write(dir.path().join("bad.json"), "{ not json").unwrap();

        assert!(run(&mut session, "set database_path 'bad.json'").is_err());
        assert_eq!(session.config.database_path, dir.path().join("financial_data.json"));
        assert_eq!(session.db.file_path(), dir.path().join("financial_data.json"));
        assert_eq!(session.db.len(), 8);

        let on_disk = Config::load_from_file(&dir.path().join("config.toml")).unwrap();
        assert_eq!(on_disk.database_path, dir.path().join("financial_data.json"));
    }

    #[test]
    fn test_open_runs_auto_backup() {
        let dir = TempDir::new().unwrap();
        fs::copy(fixture_filename("financial_data.json"), dir.path().join("financial_data.json")).unwrap();
        let config_path = dir.path().join("config.toml");
        fs::write(&config_path, "database_path = \"financial_data.json\"\nbackup_path = \"backups\"\n").unwrap();

        let session = Session::open(Config::load_from_file(&config_path).unwrap()).unwrap();
        let backups = session.backups.list().unwrap();
        assert_eq!(backups.len(), 1);
        assert!(backups[0].filename.starts_with("financial_data_"));

        // the next start within the interval leaves it alone
        let session = Session::open(Config::load_from_file(&config_path).unwrap()).unwrap();
        assert_eq!(session.backups.list().unwrap().len(), 1);
    }

    #[test]
    fn test_move_database() {
        let dir = TempDir::new().unwrap();
        let mut session = session(&dir);
        let output = run(&mut session, "set database_path 'other/data.json'").unwrap();
        assert!(output.contains("(0 transactions)"));
        assert!(session.suggestions.popular(TransactionType::Expense, 5).is_empty());
    }
}
