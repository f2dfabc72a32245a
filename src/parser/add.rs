use chrono::NaiveDate;
use nom::branch::alt;
use nom::character::complete::{multispace0, multispace1};
use nom::combinator::{map, map_opt, opt};
use nom::multi::many0;
use nom::bytes::complete::take_while1;
use nom::sequence::{preceded, terminated};
use nom::IResult;

use crate::parser::{category, keyword, non_space1, quoted, transaction_type, Statement};
use crate::transaction::{Category, TransactionType};
use crate::util::{parse_currency, parse_date};

/// Arguments of an `ADD` statement. Missing amount and category are filled from suggestions.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct AddArgs {
    pub(crate) transaction_type: TransactionType,
    pub(crate) amount: Option<f64>,
    pub(crate) description: String,
    pub(crate) category: Option<Category>,
    pub(crate) date: Option<NaiveDate>,
    pub(crate) notes: Option<String>,
}

enum AddOption {
    Category(Category),
    Date(NaiveDate),
    Note(String),
}

/// Parse `ADD EXPENSE 12.5 'lunch' CATEGORY food ON 01/03/2024 NOTE 'with team'`
pub(crate) fn parse_add(input: &str) -> IResult<&str, Statement> {
    let (input, _) = keyword("ADD")(input)?;
    let (input, _) = multispace1(input)?;
    let (input, transaction_type) = transaction_type(input)?;
    let (input, _) = multispace1(input)?;
    let (input, amount) = opt(terminated(money, multispace1))(input)?;
    let (input, description) = quoted(input)?;
    let (input, options) = many0(preceded(multispace1, add_option))(input)?;
    let (input, _) = multispace0(input)?;

    let mut args = AddArgs {
        transaction_type,
        amount,
        description: description.trim().to_string(),
        category: None,
        date: None,
        notes: None,
    };
    for option in options {
        match option {
            AddOption::Category(c) => args.category = Some(c),
            AddOption::Date(d) => args.date = Some(d),
            AddOption::Note(n) => args.notes = Some(n),
        }
    }

    Ok((input, Statement::Add(args)))
}

fn add_option(input: &str) -> IResult<&str, AddOption> {
    alt((
        map(category, AddOption::Category),
        map(on_date, AddOption::Date),
        map(note, |n: &str| AddOption::Note(n.to_string())),
    ))(input)
}

/// `12.5`, `12,50` or `1.234,56`
fn money(input: &str) -> IResult<&str, f64> {
    map_opt(take_while1(|c: char| c.is_ascii_digit() || c == '.' || c == ','), |s| parse_currency(s, ""))(input)
}

/// ON dd/mm/yyyy or ON yyyy-mm-dd
fn on_date(input: &str) -> IResult<&str, NaiveDate> {
    let (input, _) = keyword("ON")(input)?;
    let (input, _) = multispace1(input)?;
    map_opt(non_space1, parse_date)(input)
}

/// NOTE 'text'
fn note(input: &str) -> IResult<&str, &str> {
    let (input, _) = keyword("NOTE")(input)?;
    let (input, _) = multispace1(input)?;
    quoted(input)
}

#[cfg(test)]
mod tests {
    use crate::parser::parse;
    use super::*;

    #[test]
    fn test_full_add() {
        let result = parse("add expense 12.5 'Lunch with team' category food on 01/03/2024 note 'friday';");
        assert_eq!(result, Ok(Statement::Add(AddArgs {
            transaction_type: TransactionType::Expense,
            amount: Some(12.5),
            description: "Lunch with team".to_string(),
            category: Some(Category::Food),
            date: NaiveDate::from_ymd_opt(2024, 3, 1),
            notes: Some("friday".to_string()),
        })));
    }

    #[test]
    fn test_minimal_add() {
        let result = parse("ADD INCOME 'Salary'");
        assert_eq!(result, Ok(Statement::Add(AddArgs {
            transaction_type: TransactionType::Income,
            amount: None,
            description: "Salary".to_string(),
            category: None,
            date: None,
            notes: None,
        })));
    }

    #[test]
    fn test_options_in_any_order() {
        let result = parse("add expense 30 \"Taxi\" on 2024-02-10 category 'Transport'").unwrap();
        if let Statement::Add(args) = result {
            assert_eq!(args.category, Some(Category::Transport));
            assert_eq!(args.date, NaiveDate::from_ymd_opt(2024, 2, 10));
        } else {
            panic!("Unexpected statement {result:?}");
        }
    }

    #[test]
    fn test_decimal_comma_amount() {
        if let Ok(Statement::Add(args)) = parse("add expense 1.234,56 'Laptop'") {
            assert_eq!(args.amount, Some(1234.56));
        } else {
            panic!("Unable to parse decimal comma amount");
        }
    }

    #[test]
    fn test_invalid_add() {
        assert!(parse("add expense 10").is_err());
        assert!(parse("add transfer 10 'x'").is_err());
        assert!(parse("add expense 10 'x' on 32/01/2024").is_err());
    }
}
