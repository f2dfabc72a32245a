use nom::branch::alt;
use nom::bytes::complete::take_while1;
use nom::character::complete::multispace1;
use nom::IResult;
use crate::parser::{keyword, non_space1, quoted, Statement};

/// CONFIG
pub(crate) fn config(input: &str) -> IResult<&str, Statement> {
    let (input, _) = keyword("CONFIG")(input)?;
    Ok((input, Statement::Config))
}

/// SET key value
pub(crate) fn set(input: &str) -> IResult<&str, Statement> {
    let (input, _) = keyword("SET")(input)?;
    let (input, _) = multispace1(input)?;
    let (input, key) = take_while1(|c: char| c.is_alphanumeric() || c == '_')(input)?;
    let (input, _) = multispace1(input)?;
    let (input, value) = alt((quoted, non_space1))(input)?;
    Ok((input, Statement::Set(key.to_string(), value.to_string())))
}

/// STATUS
pub(crate) fn status(input: &str) -> IResult<&str, Statement> {
    let (input, _) = keyword("STATUS")(input)?;
    Ok((input, Statement::Status))
}
