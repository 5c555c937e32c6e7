//! Error-related types.

use thiserror::Error;

/// Failure to parse an MSRP URI.
#[derive(Clone, Debug, Eq, Error, Hash, PartialEq)]
pub enum UriParseError {
    #[error("missing \"://\" separator")]
    MissingScheme,
    #[error("invalid URI scheme: {0:?}")]
    InvalidScheme(String),
    #[error("missing transport")]
    MissingTransport,
    #[error("invalid URI transport: {0:?} (only \"tcp\" is accepted)")]
    InvalidTransport(String),
    #[error("invalid port: {0:?}")]
    InvalidPort(String),
    #[error("cannot parse URI parameters")]
    InvalidParameters,
    #[error("host must not be empty")]
    EmptyHost,
}

/// Failure to decode a header value.
///
/// Raised lazily when the decoded form of a header is first requested, or
/// eagerly by [`Message::verify_headers`](crate::message::Message::verify_headers).
#[derive(Clone, Debug, Eq, Error, Hash, PartialEq)]
#[error("error parsing {name} header: {reason}")]
pub struct HeaderParseError {
    pub name: String,
    pub reason: String,
}

impl HeaderParseError {
    pub fn new(name: impl Into<String>, reason: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            reason: reason.into(),
        }
    }
}

/// Attempt to store a decoded value that does not fit the header's grammar.
#[derive(Clone, Debug, Eq, Error, Hash, PartialEq)]
#[error("value for {name} header must be {expected}")]
pub struct InvalidHeaderValue {
    pub name: String,
    pub expected: &'static str,
}

/// Violation of a message construction invariant.
#[derive(Clone, Debug, Eq, Error, Hash, PartialEq)]
pub enum MessageError {
    #[error("invalid transaction id: {0:?}")]
    InvalidTransactionId(String),
    #[error("invalid method: {0:?}")]
    InvalidMethod(String),
    #[error("response code must be in 100..=999, got {0}")]
    InvalidCode(u16),
}

/// Failure reported by [`Message::verify_headers`](crate::message::Message::verify_headers).
#[derive(Clone, Debug, Eq, Error, Hash, PartialEq)]
pub enum VerifyError {
    #[error("{0} header is missing")]
    MissingHeader(&'static str),
    #[error(transparent)]
    Header(#[from] HeaderParseError),
}
