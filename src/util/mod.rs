use std::ops::RangeInclusive;
use chrono::{Datelike, Duration, NaiveDate, NaiveDateTime, NaiveTime};
use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
    static ref DDMMYYYY: Regex = Regex::new(r"^\d{1,2}/\d{1,2}/\d{4}$").unwrap();
    static ref YYYYMMDD: Regex = Regex::new(r"^\d{4}-\d{2}-\d{2}$").unwrap();
    static ref MMYYYY: Regex = Regex::new(r"^(\d{1,2})/(\d{4})$").unwrap();
}

const MONTH_NAMES: [&str; 12] = [
    "January", "February", "March", "April", "May", "June",
    "July", "August", "September", "October", "November", "December",
];

/// First and last instant of a calendar month. Returns None for an invalid month.
pub(crate) fn month_range(year: i32, month: u32) -> Option<RangeInclusive<NaiveDateTime>> {
    let first_day = NaiveDate::from_ymd_opt(year, month, 1)?;
    let next_month = if month == 12 { 1 } else { month + 1 };
    let next_month_year = if month == 12 { year + 1 } else { year };
    let first_day_next_month = NaiveDate::from_ymd_opt(next_month_year, next_month, 1)?;
    let last_day = first_day_next_month - Duration::days(1);

    Some(first_day.and_time(NaiveTime::MIN)..=end_of_day(last_day))
}

pub(crate) fn start_of_year(year: i32) -> Option<NaiveDateTime> {
    NaiveDate::from_ymd_opt(year, 1, 1).map(|d| d.and_time(NaiveTime::MIN))
}

pub(crate) fn end_of_day(date: NaiveDate) -> NaiveDateTime {
    // 23:59:59 always exists
    date.and_hms_opt(23, 59, 59).unwrap_or_else(|| date.and_time(NaiveTime::MIN))
}

/// Parse `MM/YYYY`
pub(crate) fn parse_month_year(s: &str) -> Option<(i32, u32)> {
    let captures = MMYYYY.captures(s.trim())?;
    let month = captures.get(1)?.as_str().parse::<u32>().ok()?;
    let year = captures.get(2)?.as_str().parse::<i32>().ok()?;
    if (1..=12).contains(&month) {
        Some((year, month))
    } else {
        None
    }
}

/// Parse a user-entered date, either `dd/mm/yyyy` or `yyyy-mm-dd`
pub(crate) fn parse_date(s: &str) -> Option<NaiveDate> {
    let s = s.trim();
    if DDMMYYYY.is_match(s) {
        NaiveDate::parse_from_str(s, "%d/%m/%Y").ok()
    } else if YYYYMMDD.is_match(s) {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").ok()
    } else {
        None
    }
}

pub(crate) fn format_date(date: NaiveDateTime) -> String {
    date.format("%d/%m/%Y").to_string()
}

pub(crate) fn month_name(month: u32) -> &'static str {
    if (1..=12).contains(&month) {
        MONTH_NAMES[month as usize - 1]
    } else {
        ""
    }
}

/// Format money with `.` as thousands separator and `,` as decimal separator, e.g. `R$ 1.234,56`
pub(crate) fn format_currency(value: f64, symbol: &str) -> String {
    let formatted = format!("{:.2}", value.abs());
    let (integer, decimals) = formatted.split_once('.').unwrap_or((formatted.as_str(), "00"));

    let mut grouped = String::new();
    for (i, c) in integer.chars().enumerate() {
        if i > 0 && (integer.len() - i) % 3 == 0 {
            grouped.push('.');
        }
        grouped.push(c);
    }

    let sign = if value < 0.0 && formatted != "0.00" { "-" } else { "" };
    if symbol.is_empty() {
        format!("{sign}{grouped},{decimals}")
    } else {
        format!("{symbol} {sign}{grouped},{decimals}")
    }
}

/// Inverse of [`format_currency`]. Also accepts a plain `1234.56`, and `1234,56` with a decimal comma.
pub(crate) fn parse_currency(s: &str, symbol: &str) -> Option<f64> {
    let mut cleaned = s.trim().to_string();
    if !symbol.is_empty() {
        cleaned = cleaned.replace(symbol, "");
    }
    let cleaned = cleaned.trim();
    let normalised = if cleaned.contains(',') {
        cleaned.replace('.', "").replace(',', ".")
    } else {
        cleaned.to_string()
    };
    normalised.parse::<f64>().ok()
}

pub(crate) fn percentage(part: f64, total: f64) -> f64 {
    if total > 0.0 { part / total * 100.0 } else { 0.0 }
}

/// Capitalise the first letter of every word and lowercase the rest
pub(crate) fn title_case(s: &str) -> String {
    let mut result = String::with_capacity(s.len());
    let mut at_word_start = true;
    for c in s.chars() {
        if c.is_alphabetic() {
            if at_word_start {
                result.extend(c.to_uppercase());
            } else {
                result.extend(c.to_lowercase());
            }
            at_word_start = false;
        } else {
            result.push(c);
            at_word_start = true;
        }
    }
    result
}

/// Keep the tail of a long path for status lines
pub(crate) fn shorten(s: &str, max_chars: usize) -> String {
    let count = s.chars().count();
    if count <= max_chars {
        s.to_string()
    } else {
        let tail: String = s.chars().skip(count - max_chars).collect();
        format!("...{tail}")
    }
}

pub(crate) fn current_month() -> (i32, u32) {
    let today = chrono::Local::now().date_naive();
    (today.year(), today.month())
}
