pub mod address;
pub mod interrupt;
pub mod lock;

use thiserror::Error;

#[derive(Debug, PartialEq, Error)]
pub enum ParseError {
    /// The token is not part of the recognised vocabulary.
    #[error("Unrecognised token")]
    UnknownToken,
    /// The value does not have the expected shape.
    #[error("Invalid argument")]
    InvalidArgument,
}
