use std::io::Write;
use crate::controller::Session;
use crate::report;
use crate::transaction::TransactionType;

const DISABLED: &str = "Suggestions are disabled. Enable them with: SET suggestions_enabled true;";

pub(super) fn execute_suggest(session: &Session, transaction_type: TransactionType, partial: &str,
                              out: &mut impl Write) -> anyhow::Result<()> {
    if !session.config.suggestions_enabled {
        writeln!(out, "{DISABLED}")?;
        return Ok(());
    }

    let engine = &session.suggestions;
    let suggestions: Vec<_> = engine.descriptions(partial, transaction_type, session.config.max_suggestions)
        .into_iter()
        .map(|d| {
            let category = engine.category_for(&d, transaction_type);
            let amount = engine.amount_for(&d);
            (d, category, amount)
        })
        .collect();

    if suggestions.is_empty() {
        writeln!(out, "No suggestions for '{partial}'.")?;
    } else {
        writeln!(out, "{}", report::suggestions_table(&suggestions, session.currency()))?;
    }
    Ok(())
}

pub(super) fn execute_popular(session: &Session, transaction_type: TransactionType, out: &mut impl Write) -> anyhow::Result<()> {
    if !session.config.suggestions_enabled {
        writeln!(out, "{DISABLED}")?;
        return Ok(());
    }

    let popular = session.suggestions.popular(transaction_type, session.config.max_suggestions);
    if popular.is_empty() {
        writeln!(out, "No {transaction_type} history yet.")?;
    } else {
        writeln!(out, "{}", report::popular_table(&popular, session.currency()))?;
    }
    Ok(())
}

/// Learned keyword patterns followed by engine statistics
pub(super) fn execute_patterns(session: &Session, out: &mut impl Write) -> anyhow::Result<()> {
    let patterns = session.suggestions.patterns(session.config.max_suggestions);
    if !patterns.is_empty() {
        writeln!(out, "{}", report::patterns_table(&patterns))?;
    }
    writeln!(out, "{}", report::statistics_table(&session.suggestions.statistics(), session.config.suggestions_enabled))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use tempfile::TempDir;
    use crate::controller::tests::{run, session};

    #[test]
    fn test_suggest() {
        let dir = TempDir::new().unwrap();
        let mut session = session(&dir);

        let output = run(&mut session, "suggest expense 'super'").unwrap();
        assert!(output.contains("Supermarket Groceries"));
        assert!(output.contains("R$ 195,00"));
        assert!(output.contains("Food"));

        let output = run(&mut session, "suggest income 'xyz'").unwrap();
        assert_eq!(output, "No suggestions for 'xyz'.\n");
    }

    #[test]
    fn test_popular_and_patterns() {
        let dir = TempDir::new().unwrap();
        let mut session = session(&dir);

        let output = run(&mut session, "popular income").unwrap();
        assert!(output.contains("Salary"));
        assert!(output.contains("1x"));

        let output = run(&mut session, "patterns").unwrap();
        assert!(output.contains("Supermarket"));
        assert!(output.contains("Keywords learned"));
    }

    #[test]
    fn test_disabled() {
        let dir = TempDir::new().unwrap();
        let mut session = session(&dir);
        run(&mut session, "set suggestions_enabled false").unwrap();

        let output = run(&mut session, "suggest expense 'super'").unwrap();
        assert!(output.starts_with("Suggestions are disabled"));
        let output = run(&mut session, "patterns").unwrap();
        assert!(output.contains("Disabled"));
    }
}
