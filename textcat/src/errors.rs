//! Definition of errors.

use std::error::Error;
use std::fmt;

pub type Result<T, E = TextcatError> = std::result::Result<T, E>;

#[derive(Debug)]
pub enum TextcatError {
    InvalidModel(InvalidModelError),
    InvalidArgument(InvalidArgumentError),
    IOError(std::io::Error),
    JsonError(serde_json::Error),
    CsvError(csv::Error),
}

impl TextcatError {
    pub(crate) fn invalid_model<S>(msg: S) -> Self
    where
        S: Into<String>,
    {
        Self::InvalidModel(InvalidModelError { msg: msg.into() })
    }

    pub(crate) fn invalid_argument<S>(arg: &'static str, msg: S) -> Self
    where
        S: Into<String>,
    {
        Self::InvalidArgument(InvalidArgumentError {
            arg,
            msg: msg.into(),
        })
    }
}

impl fmt::Display for TextcatError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Self::InvalidModel(e) => e.fmt(f),
            Self::InvalidArgument(e) => e.fmt(f),
            Self::IOError(e) => e.fmt(f),
            Self::JsonError(e) => e.fmt(f),
            Self::CsvError(e) => e.fmt(f),
        }
    }
}

impl Error for TextcatError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::InvalidModel(e) => Some(e),
            Self::InvalidArgument(e) => Some(e),
            Self::IOError(e) => Some(e),
            Self::JsonError(e) => Some(e),
            Self::CsvError(e) => Some(e),
        }
    }
}

/// Error used when the model is invalid.
#[derive(Debug)]
pub struct InvalidModelError {
    /// Error message.
    pub(crate) msg: String,
}

impl fmt::Display for InvalidModelError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "InvalidModelError: {}", self.msg)
    }
}

impl Error for InvalidModelError {}

/// Error used when the argument is invalid.
#[derive(Debug)]
pub struct InvalidArgumentError {
    /// Name of the argument.
    pub(crate) arg: &'static str,

    /// Error message.
    pub(crate) msg: String,
}

impl fmt::Display for InvalidArgumentError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "InvalidArgumentError: {}: {}", self.arg, self.msg)
    }
}

impl Error for InvalidArgumentError {}

impl From<std::io::Error> for TextcatError {
    fn from(error: std::io::Error) -> Self {
        Self::IOError(error)
    }
}

impl From<serde_json::Error> for TextcatError {
    fn from(error: serde_json::Error) -> Self {
        Self::JsonError(error)
    }
}

impl From<csv::Error> for TextcatError {
    fn from(error: csv::Error) -> Self {
        Self::CsvError(error)
    }
}
