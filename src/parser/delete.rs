use log::warn;
use nom::IResult;
use nom::multi::many1;
use crate::parser::{keyword, space_comma1, Statement};

/// Parse `DELETE trans_id, trans_id` pattern.
pub(crate) fn parse_delete(input: &str) -> IResult<&str, Statement> {
    let (input, _) = keyword("DELETE")(input)?;
    let (input, trans_ids) = many1(parse_transaction_id)(input).map_err(|e| {
        warn!("Unable to parse transaction ids: {e:?}");
        e
    })?;
    Ok((input, Statement::Delete(trans_ids)))
}

fn parse_transaction_id(input: &str) -> IResult<&str, u32> {
    let (input, _) = space_comma1(input)?;
    let (input, trans_id) = nom::character::complete::u32(input)?;
    Ok((input, trans_id))
}
