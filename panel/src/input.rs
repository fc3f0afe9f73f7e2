//! Lines read from standard input.
//!
//! Each line is a UI event token optionally followed by a value, `ip <address>` to edit the
//! address field, or `quit`.

use nom::bytes::complete::take_till1;
use nom::character::complete::space0;
use nom::combinator::rest;
use nom::sequence::separated_pair;
use nom::{IResult, Parser};
use thiserror::Error;

use rmc::UiEvent;

#[derive(Debug, PartialEq, Eq)]
pub enum Input {
    /// An event together with the volume slider position, if one was given.
    Event(UiEvent, Option<i64>),
    Address(String),
    Quit,
}

#[derive(Debug, PartialEq, Eq, Error)]
pub enum InputError {
    #[error("unrecognised input `{0}`")]
    UnknownToken(String),
    #[error("`{0}` is not a number")]
    InvalidValue(String),
    #[error("no address given")]
    MissingAddress,
    #[error("`{0}` takes no value")]
    UnexpectedValue(String),
}

fn words(input: &str) -> IResult<&str, (&str, &str)> {
    separated_pair(take_till1(char::is_whitespace), space0, rest).parse(input)
}

/// Parses one line, surrounding whitespace is ignored.
///
/// # Errors
/// An [`InputError`] naming the part of the line that could not be understood.
pub fn parse(line: &str) -> Result<Input, InputError> {
    let (_, (token, value)) =
        words(line.trim()).map_err(|_| InputError::UnknownToken(String::new()))?;
    let value = value.trim();

    match token {
        "quit" if value.is_empty() => Ok(Input::Quit),
        "quit" => Err(InputError::UnexpectedValue(token.to_string())),
        "ip" if value.is_empty() => Err(InputError::MissingAddress),
        "ip" => Ok(Input::Address(value.to_string())),
        _ => {
            let event = token
                .parse::<UiEvent>()
                .map_err(|_| InputError::UnknownToken(token.to_string()))?;
            if value.is_empty() {
                return Ok(Input::Event(event, None));
            }
            let volume = value
                .parse::<i64>()
                .map_err(|_| InputError::InvalidValue(value.to_string()))?;
            Ok(Input::Event(event, Some(volume)))
        }
    }
}
