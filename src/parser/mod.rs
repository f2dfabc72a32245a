mod add;
mod backup;
mod criteria;
mod delete;
mod export;
mod settings;
mod suggest;
mod view;

use nom::branch::alt;
use nom::bytes::complete::{is_not, tag_no_case, take_while1};
use nom::character::complete::{alphanumeric1, char, multispace0, multispace1};
use nom::combinator::{map, not};
use nom::sequence::{delimited, preceded, terminated};
use nom::IResult;

use crate::period::Period;
use crate::transaction::{Category, TransactionType};

pub(crate) use add::AddArgs;
pub(crate) use criteria::Criteria;

#[derive(Debug, PartialEq)]
pub(crate) enum Statement {
    /// ADD INCOME|EXPENSE [amount] 'description' [CATEGORY 'name'] [ON date] [NOTE 'text']
    Add(AddArgs),
    /// DELETE id, id
    Delete(Vec<u32>),
    /// LIST [filters]
    List(Criteria),
    /// BALANCE [filters]
    Balance(Criteria),
    /// CATEGORIES [filters]
    Categories(Criteria),
    /// REPORT [MM/YYYY], current month when omitted
    Report(Option<(i32, u32)>),
    /// SUGGEST INCOME|EXPENSE ['partial']
    Suggest(TransactionType, String),
    /// POPULAR INCOME|EXPENSE
    Popular(TransactionType),
    /// PATTERNS
    Patterns,
    /// BACKUP
    Backup,
    /// BACKUPS
    Backups,
    /// RESTORE 'filename'
    Restore(String),
    /// EXPORT TO 'file_path' [filters]
    Export(String, Criteria),
    /// CONFIG
    Config,
    /// SET key value
    Set(String, String),
    /// STATUS
    Status,
    /// BROWSE
    Browse,
}

/// Parse a single statement. A trailing `;` is optional.
pub(crate) fn parse(input: &str) -> Result<Statement, String> {
    let input = input.trim().trim_end_matches(';').trim_end();
    let result = preceded(multispace0, alt((
        add::parse_add,
        delete::parse_delete,
        view::list,
        view::balance,
        view::categories,
        view::report,
        suggest::suggest,
        suggest::popular,
        suggest::patterns,
        backup::backups,
        backup::backup,
        backup::restore,
        export::export,
        settings::config,
        settings::set,
        settings::status,
        view::browse,
    )))(input);

    match result {
        Ok(("", statement)) => Ok(statement),
        Ok((rest, _)) => Err(format!("Unexpected input: '{}'", rest.trim())),
        Err(e) => Err(format!("Unable to parse '{input}': {e}")),
    }
}

/// A case-insensitive keyword that is not immediately followed by more letters or digits
pub(crate) fn keyword<'a>(word: &'static str) -> impl FnMut(&'a str) -> IResult<&'a str, &'a str> {
    terminated(tag_no_case(word), not(alphanumeric1))
}

/// 'text' or "text"
pub(crate) fn quoted(input: &str) -> IResult<&str, &str> {
    alt((
        delimited(char('\''), is_not("'"), char('\'')),
        delimited(char('"'), is_not("\""), char('"')),
    ))(input)
}

pub(crate) fn non_space1(input: &str) -> IResult<&str, &str> {
    take_while1(|c: char| !c.is_whitespace())(input)
}

/// At least one space or comma
pub(crate) fn space_comma1(input: &str) -> IResult<&str, &str> {
    take_while1(|c: char| c.is_whitespace() || c == ',')(input)
}

pub(crate) fn transaction_type(input: &str) -> IResult<&str, TransactionType> {
    alt((
        map(keyword("INCOME"), |_| TransactionType::Income),
        map(keyword("EXPENSE"), |_| TransactionType::Expense),
    ))(input)
}

/// CATEGORY 'name' or CATEGORY name
pub(crate) fn category(input: &str) -> IResult<&str, Category> {
    let (input, _) = keyword("CATEGORY")(input)?;
    let (input, _) = multispace1(input)?;
    let (rest, name) = alt((quoted, non_space1))(input)?;
    match name.parse::<Category>() {
        Ok(category) => Ok((rest, category)),
        Err(_) => Err(nom::Err::Error(nom::error::Error::new(input, nom::error::ErrorKind::Verify))),
    }
}

/// PERIOD today|week|month|quarter|year|all|MM/YYYY
pub(crate) fn period(input: &str) -> IResult<&str, Period> {
    let (input, _) = keyword("PERIOD")(input)?;
    let (input, _) = multispace1(input)?;
    let (rest, word) = non_space1(input)?;
    match Period::from_keyword(word) {
        Some(period) => Ok((rest, period)),
        None => Err(nom::Err::Error(nom::error::Error::new(input, nom::error::ErrorKind::Verify))),
    }
}
