use std::io::{stdout, Write};

use crossterm::{execute, queue, terminal};
use crossterm::cursor::{Hide, MoveTo, MoveToColumn, Show};
use crossterm::event::{read, Event, KeyCode};
use crossterm::style::{self, Color, ResetColor, SetBackgroundColor, SetForegroundColor};
use crossterm::terminal::{ClearType, EnterAlternateScreen, LeaveAlternateScreen};
use log::info;

use crate::controller::Session;
use crate::transaction::Transaction;
use crate::util::{format_currency, format_date};

const DESCRIPTION_WIDTH: usize = 40;

/// Rows drawn as (screen row, transaction index, highlighted)
type Delta = Vec<(u16, usize, bool)>;

/// Scroll through transactions in the alternate screen. `j`/`k` move, `d` deletes the
/// selected transaction, `q` leaves. Returns the number of deleted transactions.
pub(crate) fn browse(last_query_results: Vec<u32>, session: &mut Session) -> anyhow::Result<usize> {
    let mut transactions: Vec<Transaction> = last_query_results.iter()
        .filter_map(|trans_id| session.db.find_by_id(*trans_id).cloned())
        .collect();
    if transactions.is_empty() {
        return Ok(0);
    }

    execute!(stdout(), EnterAlternateScreen, Hide, MoveTo(0, 0))?;
    terminal::enable_raw_mode()?;

    let result = browse_loop(&mut transactions, session);

    terminal::disable_raw_mode()?;
    execute!(stdout(), Show, LeaveAlternateScreen)?;

    let deleted = result?;
    if deleted > 0 {
        session.last_query_results = Some(transactions.iter().map(|t| t.id).collect());
    }
    Ok(deleted)
}

fn browse_loop(transactions: &mut Vec<Transaction>, session: &mut Session) -> anyhow::Result<usize> {
    let (_columns, rows) = terminal::size()?;
    // last row is the key help line
    let mut window = Window::new(rows.saturating_sub(1).max(1), transactions.len());
    let currency = session.config.currency_symbol.clone();
    let mut deleted = 0;

    repaint_all(&mut window, transactions, &currency)?;

    loop {
        match read()? {
            Event::Key(event) => match event.code {
                KeyCode::Char('q') | KeyCode::Esc => break,
                KeyCode::Char('j') | KeyCode::Down => {
                    let delta = window.move_down();
                    repaint_window(delta, transactions, &currency)?;
                }
                KeyCode::Char('k') | KeyCode::Up => {
                    let delta = window.move_up();
                    repaint_window(delta, transactions, &currency)?;
                }
                KeyCode::Char('d') => {
                    let index = window.selected_transaction_index();
                    let trans_id = transactions[index].id;
                    deleted += session.db.delete(&[trans_id])?;
                    info!("Transaction {trans_id} deleted");
                    transactions.remove(index);
                    if transactions.is_empty() {
                        break;
                    }
                    window.remove_selected();
                    repaint_all(&mut window, transactions, &currency)?;
                }
                _ => {}
            },
            Event::Resize(_, rows) => {
                window.resize(rows.saturating_sub(1).max(1));
                repaint_all(&mut window, transactions, &currency)?;
            }
            _ => {}
        }
    }

    Ok(deleted)
}

struct Window {
    /// Number of rows in this window
    rows: u16,

    /// Number of total transactions
    transactions_count: usize,

    /// Scrolling offset
    offset: usize,

    /// The row that is selected. 0 <= selected_row < rows
    selected_row: u16,
}

impl Window {
    fn new(rows: u16, transactions_count: usize) -> Window {
        Window { rows, transactions_count, offset: 0, selected_row: 0 }
    }

    fn selected_transaction_index(&self) -> usize {
        self.offset + self.selected_row as usize
    }

    fn visible_count(&self) -> usize {
        (self.transactions_count - self.offset).min(self.rows as usize)
    }

    fn repaint(&self) -> Delta {
        (0..self.visible_count())
            .map(|i| (i as u16, self.offset + i, i == self.selected_row as usize))
            .collect()
    }

    fn move_down(&mut self) -> Delta {
        if self.selected_transaction_index() + 1 >= self.transactions_count {
            return vec![];
        }

        if self.selected_row < self.rows - 1 {
            let mut delta = vec![(self.selected_row, self.selected_transaction_index(), false)];
            self.selected_row += 1;
            delta.push((self.selected_row, self.selected_transaction_index(), true));
            delta
        } else {
            self.scroll_up()
        }
    }

    fn scroll_up(&mut self) -> Delta {
        if self.offset + self.rows as usize >= self.transactions_count {
            return vec![];
        }

        self.offset += 1;
        self.repaint()
    }

    fn move_up(&mut self) -> Delta {
        if self.selected_transaction_index() == 0 {
            return vec![];
        }

        if self.selected_row > 0 {
            let mut delta = vec![(self.selected_row, self.selected_transaction_index(), false)];
            self.selected_row -= 1;
            delta.push((self.selected_row, self.selected_transaction_index(), true));
            delta
        } else {
            self.scroll_down()
        }
    }

    fn scroll_down(&mut self) -> Delta {
        if self.offset == 0 {
            return vec![];
        }

        self.offset -= 1;
        self.repaint()
    }

    /// The selected transaction is gone, keep the selection on a neighbouring one
    fn remove_selected(&mut self) {
        self.transactions_count -= 1;
        if self.offset > 0 && self.offset + self.rows as usize > self.transactions_count {
            self.offset -= 1;
            self.selected_row = (self.selected_row + 1).min(self.rows - 1);
        }
        self.clamp_selection();
    }

    fn resize(&mut self, rows: u16) {
        let selected = self.selected_transaction_index();
        self.rows = rows;
        if selected >= self.offset + rows as usize {
            self.offset = selected + 1 - rows as usize;
        }
        self.selected_row = (selected - self.offset) as u16;
    }

    fn clamp_selection(&mut self) {
        let last_row = self.visible_count().saturating_sub(1) as u16;
        self.selected_row = self.selected_row.min(last_row);
    }
}

fn repaint_all(window: &mut Window, transactions: &[Transaction], currency: &str) -> anyhow::Result<()> {
    execute!(stdout(), terminal::Clear(ClearType::All))?;
    repaint_window(window.repaint(), transactions, currency)?;

    let mut out = stdout();
    queue!(out, MoveTo(0, window.rows), style::Print(format!(
        "{} of {}   j/k move   d delete   q quit",
        window.selected_transaction_index() + 1, window.transactions_count)))?;
    out.flush()?;
    Ok(())
}

fn repaint_window(delta: Delta, transactions: &[Transaction], currency: &str) -> anyhow::Result<()> {
    let mut out = stdout();
    for (row, trans_index, highlight) in delta {
        queue!(out, MoveTo(0, row), terminal::Clear(ClearType::CurrentLine))?;
        print_transaction(&mut out, &transactions[trans_index], highlight, currency)?;
    }
    out.flush()?;
    Ok(())
}

/// Print a single transaction, in current terminal line
fn print_transaction(out: &mut impl Write, t: &Transaction, highlight: bool, currency: &str) -> anyhow::Result<()> {
    if highlight {
        queue!(out, SetForegroundColor(Color::Black), SetBackgroundColor(Color::White))?;
    } else if t.is_income() {
        queue!(out, SetForegroundColor(Color::Green))?;
    }
    queue!(out, style::Print(transaction_line(t, currency)), MoveToColumn(0), ResetColor)?;
    Ok(())
}

fn transaction_line(t: &Transaction, currency: &str) -> String {
    let desc = if t.description.chars().count() > DESCRIPTION_WIDTH {
        let mut cut_down_version: String = t.description.chars().take(DESCRIPTION_WIDTH - 1).collect();
        cut_down_version.push('…');
        cut_down_version
    } else {
        t.description.clone()
    };
    format!("| {:4} | {} | {:width$} | {:16} | {:>16} | {} |", t.id, format_date(t.date), desc, t.category.to_string(),
            format_currency(t.signed_amount(), currency), t.notes_display(), width = DESCRIPTION_WIDTH)
}
