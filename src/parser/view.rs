use nom::character::complete::multispace1;
use nom::combinator::{map_opt, opt};
use nom::sequence::preceded;
use nom::IResult;

use crate::parser::criteria::criteria;
use crate::parser::{keyword, non_space1, Statement};
use crate::util::parse_month_year;

/// LIST [filters]
pub(crate) fn list(input: &str) -> IResult<&str, Statement> {
    let (input, _) = keyword("LIST")(input)?;
    let (input, criteria) = criteria(input)?;
    Ok((input, Statement::List(criteria)))
}

/// BALANCE [filters]
pub(crate) fn balance(input: &str) -> IResult<&str, Statement> {
    let (input, _) = keyword("BALANCE")(input)?;
    let (input, criteria) = criteria(input)?;
    Ok((input, Statement::Balance(criteria)))
}

/// CATEGORIES [filters]
pub(crate) fn categories(input: &str) -> IResult<&str, Statement> {
    let (input, _) = keyword("CATEGORIES")(input)?;
    let (input, criteria) = criteria(input)?;
    Ok((input, Statement::Categories(criteria)))
}

/// REPORT [MM/YYYY]
pub(crate) fn report(input: &str) -> IResult<&str, Statement> {
    let (input, _) = keyword("REPORT")(input)?;
    let (input, month) = opt(preceded(multispace1, map_opt(non_space1, parse_month_year)))(input)?;
    Ok((input, Statement::Report(month)))
}

/// BROWSE
pub(crate) fn browse(input: &str) -> IResult<&str, Statement> {
    let (input, _) = keyword("BROWSE")(input)?;
    Ok((input, Statement::Browse))
}

#[cfg(test)]
mod tests {
    use crate::parser::{parse, Criteria, Statement};
    use crate::period::Period;
    use crate::transaction::Category;

    #[test]
    fn test() {
        assert_eq!(parse("list"), Ok(Statement::List(Criteria::default())));
        assert_eq!(parse("LIST category bills period 01/2024;"), Ok(Statement::List(Criteria {
            transaction_type: None,
            category: Some(Category::Bills),
            period: Some(Period::Calendar(2024, 1)),
        })));
        assert_eq!(parse("balance period year"), Ok(Statement::Balance(Criteria {
            period: Some(Period::Year),
            ..Criteria::default()
        })));
        assert!(matches!(parse("categories income"), Ok(Statement::Categories(_))));
        assert!(parse("list period tomorrow").is_err());
    }

    #[test]
    fn test_report() {
        assert_eq!(parse("report"), Ok(Statement::Report(None)));
        assert_eq!(parse("report 02/2024"), Ok(Statement::Report(Some((2024, 2)))));
        assert!(parse("report 2024").is_err());
    }
}
