//! Defines error types used by this library.

use crate::Fault;

use thiserror::Error;
use xml::reader::Error as XmlError;

use std::error::Error as StdError;
use std::io;

/// A `Value` or `Request` could not be encoded as XML-RPC.
#[derive(Debug, Error)]
pub enum EncodeError {
    /// The data cannot be represented by any XML-RPC type.
    ///
    /// Raised for non-finite doubles, for text holding characters XML 1.0 cannot express, and when
    /// converting host data (for example via [`to_value`]) that has no XML-RPC counterpart.
    ///
    /// [`to_value`]: fn.to_value.html
    #[error("unsupported value kind: {0}")]
    UnsupportedValueKind(String),

    /// A `<dateTime.iso8601>` can only express the years 0 through 9999.
    #[error("unsupported year {0} (must be within 0..=9999)")]
    YearOutOfRange(i32),

    /// Method names must not be empty.
    #[error("method name must not be empty")]
    EmptyMethodName,

    /// The output writer reported an error.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
}

/// Describes possible errors that can occur when decoding a response.
#[derive(Debug, Error)]
pub enum DecodeError {
    /// Error while parsing (malformed?) XML.
    #[error("malformed XML: {0}")]
    Xml(#[from] XmlError),

    /// The `<fault>` value is not a struct with an int `faultCode` and a string `faultString`.
    #[error("malformed <fault>")]
    MalformedFault,

    /// A `<dateTime.iso8601>` did not start with `CCYYMMDDTHH:MM:SS`.
    #[error("malformed dateTime.iso8601 value: {0:?}")]
    MalformedDateTime(String),

    /// An `<array>` without its `<data>` wrapper.
    #[error("malformed <array>: expected <data>")]
    MalformedArray,

    /// A `<struct>` whose children are not well-formed `<member>`s.
    #[error("malformed <struct>: {0}")]
    MalformedStruct(&'static str),

    /// A value was wrapped in a tag that is not an XML-RPC type.
    #[error("unknown value tag <{0}>")]
    UnknownValueTag(String),

    /// Could not parse the given text as XML-RPC value.
    ///
    /// For example, `<value><int>AAA</int></value>` describes an invalid value.
    #[error("invalid value for type '{for_type}': {found}")]
    InvalidValue {
        /// The type for which an invalid value was supplied (eg. `int` or `base64`).
        for_type: &'static str,
        /// The value we encountered, as a string.
        found: String,
    },

    /// The document is well-formed XML, but not shaped like an XML-RPC response.
    #[error("unexpected XML (expected {expected}, found {found})")]
    UnexpectedXml {
        /// A short description of the kind of data that was expected.
        expected: String,
        /// What was found instead.
        found: String,
    },

    /// Values are nested deeper than the decoder follows.
    #[error("values nested deeper than {0} levels")]
    TooDeep(usize),

    /// A `system.multicall` result does not match the batch it answers.
    #[error("malformed multicall response: {0}")]
    MalformedMulticall(String),
}

impl DecodeError {
    pub(crate) fn unexpected<E: ToString, F: ToString>(expected: E, found: F) -> Self {
        DecodeError::UnexpectedXml {
            expected: expected.to_string(),
            found: found.to_string(),
        }
    }
}

/// A request could not be executed.
///
/// This is either a lower-level error (the transport failed), a problem with the server (maybe
/// it's not implementing XML-RPC correctly), or a `<fault>` returned by the called method.
#[derive(Debug, Error)]
pub enum RequestError {
    /// The request could not be encoded.
    #[error("encode error: {0}")]
    Encode(#[from] EncodeError),

    /// The transport failed to deliver the request or to receive the response.
    #[error("transport error: {0}")]
    Transport(Box<dyn StdError + Send + Sync>),

    /// The response could not be parsed.
    #[error("parse error: {0}")]
    Decode(#[from] DecodeError),

    /// The server returned a `<fault>`.
    #[error("server returned a fault: {0}")]
    Fault(#[from] Fault),
}

impl RequestError {
    /// If this `RequestError` was caused by the server responding with a `<fault>` response,
    /// returns the `Fault` in question.
    pub fn fault(&self) -> Option<&Fault> {
        match self {
            RequestError::Fault(fault) => Some(fault),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_messages() {
        assert_eq!(
            EncodeError::YearOutOfRange(10000).to_string(),
            "unsupported year 10000 (must be within 0..=9999)"
        );
        assert_eq!(
            DecodeError::InvalidValue { for_type: "int", found: "bla".into() }.to_string(),
            "invalid value for type 'int': bla"
        );
        assert_eq!(
            DecodeError::unexpected("<params>", "<nope>").to_string(),
            "unexpected XML (expected <params>, found <nope>)"
        );
    }

    #[test]
    fn exposes_faults() {
        let err = RequestError::from(Fault::new(4, "bad"));
        assert_eq!(err.fault().map(Fault::code), Some(4));
        assert!(RequestError::from(DecodeError::MalformedArray).fault().is_none());
    }
}
