use nom::character::complete::multispace1;
use nom::IResult;
use crate::parser::criteria::criteria;
use crate::parser::{keyword, non_space1, quoted, Statement};
use nom::branch::alt;

/// Parse `EXPORT TO file_path [filters]` pattern.
pub(crate) fn export(input: &str) -> IResult<&str, Statement> {
    let (input, _) = keyword("EXPORT")(input)?;
    let (input, _) = multispace1(input)?;
    let (input, _) = keyword("TO")(input)?;
    let (input, _) = multispace1(input)?;
    let (input, file_path) = alt((quoted, non_space1))(input)?;
    let (input, criteria) = criteria(input)?;
    Ok((input, Statement::Export(file_path.to_string(), criteria)))
}
