use std::borrow::Cow::{self, Borrowed, Owned};

use rustyline::completion::{Completer, Pair};
use rustyline::highlight::{Highlighter, MatchingBracketHighlighter};
use rustyline::hint::HistoryHinter;
use rustyline::validate::MatchingBracketValidator;
use rustyline::{Context, Helper, Hinter, Validator};

const KEYWORDS: &[&str] = &[
    "ADD", "DELETE", "LIST", "BALANCE", "CATEGORIES", "REPORT", "SUGGEST", "POPULAR", "PATTERNS",
    "BACKUP", "BACKUPS", "RESTORE", "EXPORT", "TO", "CONFIG", "SET", "STATUS", "BROWSE",
    "INCOME", "EXPENSE", "CATEGORY", "PERIOD", "ON", "NOTE",
    "TODAY", "WEEK", "MONTH", "QUARTER", "YEAR", "ALL",
    "DATABASE_PATH", "BACKUP_PATH", "AUTO_BACKUP", "BACKUP_INTERVAL_DAYS", "SUGGESTIONS_ENABLED",
    "MAX_SUGGESTIONS", "CURRENCY_SYMBOL",
];

#[derive(Helper, Hinter, Validator)]
pub(crate) struct FintrackHelper {
    /// Known descriptions, completed after an opening quote
    pub(crate) descriptions: Vec<String>,
    pub(crate) highlighter: MatchingBracketHighlighter,
    #[rustyline(Validator)]
    pub(crate) validator: MatchingBracketValidator,
    #[rustyline(Hinter)]
    pub(crate) hinter: HistoryHinter,
    pub(crate) colored_prompt: String,
}

impl FintrackHelper {
    pub(crate) fn new(prompt: &str, descriptions: Vec<String>) -> FintrackHelper {
        FintrackHelper {
            descriptions,
            highlighter: MatchingBracketHighlighter::new(),
            validator: MatchingBracketValidator::new(),
            hinter: HistoryHinter::new(),
            colored_prompt: format!("\x1b[1;32m{prompt}\x1b[0m"),
        }
    }

    /// Start of the word being completed and its replacements
    fn candidates(&self, line: &str, pos: usize) -> (usize, Vec<String>) {
        let before = &line[..pos];

        // inside an open quote, complete descriptions
        let quotes = before.matches(|c: char| c == '\'' || c == '"').count();
        if quotes % 2 == 1 {
            if let Some(quote_pos) = before.rfind(|c: char| c == '\'' || c == '"') {
                let start = quote_pos + 1;
                let partial = before[start..].to_lowercase();
                let matches = self.descriptions.iter()
                    .filter(|d| d.to_lowercase().starts_with(&partial))
                    .cloned()
                    .collect();
                return (start, matches);
            }
        }

        let start = before.char_indices()
            .rev()
            .find(|(_, c)| c.is_whitespace() || *c == ',')
            .map_or(0, |(i, c)| i + c.len_utf8());
        let word = &before[start..];
        if word.is_empty() {
            return (start, vec![]);
        }

        let lowercase = word.chars().all(|c| !c.is_uppercase());
        let matches = KEYWORDS.iter()
            .filter(|k| k.starts_with(&word.to_uppercase()))
            .map(|k| if lowercase { k.to_lowercase() } else { k.to_string() })
            .collect();
        (start, matches)
    }
}

impl Completer for FintrackHelper {
    type Candidate = Pair;

    fn complete(&self, line: &str, pos: usize, _ctx: &Context<'_>) -> rustyline::Result<(usize, Vec<Pair>)> {
        let (start, candidates) = self.candidates(line, pos);
        let pairs = candidates.into_iter()
            .map(|c| Pair { display: c.clone(), replacement: c })
            .collect();
        Ok((start, pairs))
    }
}

impl Highlighter for FintrackHelper {
    fn highlight_prompt<'b, 's: 'b, 'p: 'b>(
        &'s self,
        prompt: &'p str,
        default: bool,
    ) -> Cow<'b, str> {
        if default {
            Borrowed(&self.colored_prompt)
        } else {
            Borrowed(prompt)
        }
    }

    fn highlight_hint<'h>(&self, hint: &'h str) -> Cow<'h, str> {
        Owned("\x1b[2m".to_owned() + hint + "\x1b[m")
    }

    fn highlight<'l>(&self, line: &'l str, pos: usize) -> Cow<'l, str> {
        self.highlighter.highlight(line, pos)
    }

    fn highlight_char(&self, line: &str, pos: usize, forced: bool) -> bool {
        self.highlighter.highlight_char(line, pos, forced)
    }
}
