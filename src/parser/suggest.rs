use nom::character::complete::multispace1;
use nom::combinator::opt;
use nom::sequence::preceded;
use nom::IResult;
use crate::parser::{keyword, quoted, transaction_type, Statement};

/// SUGGEST INCOME|EXPENSE ['partial description']
pub(crate) fn suggest(input: &str) -> IResult<&str, Statement> {
    let (input, _) = keyword("SUGGEST")(input)?;
    let (input, _) = multispace1(input)?;
    let (input, transaction_type) = transaction_type(input)?;
    let (input, partial) = opt(preceded(multispace1, quoted))(input)?;
    Ok((input, Statement::Suggest(transaction_type, partial.unwrap_or_default().to_string())))
}

/// POPULAR INCOME|EXPENSE
pub(crate) fn popular(input: &str) -> IResult<&str, Statement> {
    let (input, _) = keyword("POPULAR")(input)?;
    let (input, _) = multispace1(input)?;
    let (input, transaction_type) = transaction_type(input)?;
    Ok((input, Statement::Popular(transaction_type)))
}

/// PATTERNS
pub(crate) fn patterns(input: &str) -> IResult<&str, Statement> {
    let (input, _) = keyword("PATTERNS")(input)?;
    Ok((input, Statement::Patterns))
}

#[cfg(test)]
mod tests {
    use crate::parser::{parse, Statement};
    use crate::transaction::TransactionType;

    #[test]
    fn test() {
        assert_eq!(parse("suggest expense 'sup'"), Ok(Statement::Suggest(TransactionType::Expense, "sup".to_string())));
        assert_eq!(parse("SUGGEST INCOME"), Ok(Statement::Suggest(TransactionType::Income, String::new())));
        assert_eq!(parse("popular expense;"), Ok(Statement::Popular(TransactionType::Expense)));
        assert!(parse("popular").is_err());
    }
}
