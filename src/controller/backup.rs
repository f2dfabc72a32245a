use std::io::Write;
use chrono::NaiveDateTime;
use log::info;
use crate::controller::Session;
use crate::db::Database;
use crate::report;

pub(super) fn execute_backup(session: &Session, now: NaiveDateTime, out: &mut impl Write) -> anyhow::Result<()> {
    match session.backups.create(now)? {
        Some(path) => writeln!(out, "Backup created: {}", path.display())?,
        None => writeln!(out, "Nothing to back up yet.")?,
    }
    Ok(())
}

pub(super) fn execute_list_backups(session: &Session, out: &mut impl Write) -> anyhow::Result<()> {
    let backups = session.backups.list()?;
    if backups.is_empty() {
        writeln!(out, "No backups found.")?;
    } else {
        writeln!(out, "{}", report::backups_table(&backups))?;
    }
    Ok(())
}

/// Restore a backup and reload everything derived from the data file
pub(super) fn execute_restore(session: &mut Session, filename: &str, now: NaiveDateTime, out: &mut impl Write) -> anyhow::Result<()> {
    // a broken backup must not replace good data
    Database::load(&session.backups.backup_path(filename)?)?;

    let safety_copy = session.backups.restore(filename, now)?;
    session.db.reload()?;
    session.last_query_results = None;
    session.refresh_suggestions();
    info!("Reloaded {} transactions from {filename}", session.db.len());

    if let Some(path) = safety_copy {
        writeln!(out, "Previous data saved to {}", path.display())?;
    }
    writeln!(out, "Backup {filename} restored, {} transactions.", session.db.len())?;
    Ok(())
}
