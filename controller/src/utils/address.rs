//! Host addresses a controller may be bound to.
//!
//! Only dotted-quad addresses are accepted. Each group is 1 to 3 digits, the value of a group is
//! not range checked.

use nom::bytes::complete::take_while_m_n;
use nom::character::complete::char;
use nom::combinator::{all_consuming, recognize};
use nom::{IResult, Parser};
use std::fmt;
use std::str::FromStr;

use crate::utils::ParseError;

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct HostAddress(String);

fn octet(input: &str) -> IResult<&str, &str> {
    take_while_m_n(1, 3, |c: char| c.is_ascii_digit())(input)
}

fn dotted_quad(input: &str) -> IResult<&str, &str> {
    recognize((
        octet,
        char('.'),
        octet,
        char('.'),
        octet,
        char('.'),
        octet,
    ))
    .parse(input)
}

impl HostAddress {
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// File name safe form, dots replaced with dashes.
    pub fn file_stem(&self) -> String {
        self.0.replace('.', "-")
    }
}

impl FromStr for HostAddress {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match all_consuming(dotted_quad).parse(s) {
            Ok((_, address)) => Ok(Self(address.to_string())),
            Err(_) => Err(ParseError::InvalidArgument),
        }
    }
}

impl fmt::Display for HostAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
