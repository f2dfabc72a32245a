use nom::branch::alt;
use nom::character::complete::multispace1;
use nom::IResult;
use crate::parser::{keyword, non_space1, quoted, Statement};

/// BACKUP
pub(crate) fn backup(input: &str) -> IResult<&str, Statement> {
    let (input, _) = keyword("BACKUP")(input)?;
    Ok((input, Statement::Backup))
}

/// BACKUPS
pub(crate) fn backups(input: &str) -> IResult<&str, Statement> {
    let (input, _) = keyword("BACKUPS")(input)?;
    Ok((input, Statement::Backups))
}

/// RESTORE 'financial_data_2024-03-01_10-00-00.json'
pub(crate) fn restore(input: &str) -> IResult<&str, Statement> {
    let (input, _) = keyword("RESTORE")(input)?;
    let (input, _) = multispace1(input)?;
    let (input, filename) = alt((quoted, non_space1))(input)?;
    Ok((input, Statement::Restore(filename.to_string())))
}
