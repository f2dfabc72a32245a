use chrono::NaiveDateTime;
use nom::branch::alt;
use nom::character::complete::multispace1;
use nom::combinator::map;
use nom::multi::many0;
use nom::sequence::preceded;
use nom::IResult;

use crate::db::Filter;
use crate::parser::{category, period, transaction_type};
use crate::period::Period;
use crate::transaction::{Category, TransactionType};

/// Filters as typed by the user. Turned into a [`Filter`] once "now" is known.
#[derive(Debug, Clone, Default, PartialEq)]
pub(crate) struct Criteria {
    pub(crate) transaction_type: Option<TransactionType>,
    pub(crate) category: Option<Category>,
    pub(crate) period: Option<Period>,
}

impl Criteria {
    /// Resolve against the current time. Without a period, `default_period` applies.
    pub(crate) fn to_filter(&self, default_period: Period, now: NaiveDateTime) -> Filter {
        Filter {
            transaction_type: self.transaction_type,
            category: self.category,
            ..Filter::all()
        }.with_period(self.period.unwrap_or(default_period), now)
    }
}

enum Criterion {
    Type(TransactionType),
    Category(Category),
    Period(Period),
}

/// `[INCOME|EXPENSE] [CATEGORY 'name'] [PERIOD p]` in any order
pub(crate) fn criteria(input: &str) -> IResult<&str, Criteria> {
    let (input, parsed) = many0(preceded(multispace1, criterion))(input)?;

    let mut criteria = Criteria::default();
    for c in parsed {
        match c {
            Criterion::Type(t) => criteria.transaction_type = Some(t),
            Criterion::Category(c) => criteria.category = Some(c),
            Criterion::Period(p) => criteria.period = Some(p),
        }
    }
    Ok((input, criteria))
}

fn criterion(input: &str) -> IResult<&str, Criterion> {
    alt((
        map(transaction_type, Criterion::Type),
        map(category, Criterion::Category),
        map(period, Criterion::Period),
    ))(input)
}
