//! An XML-RPC message codec in Rust.
//!
//! The `xmlrpc-codec` crate encodes method calls into [XML-RPC][spec] request documents and
//! decodes response documents into typed [`Value`]s or [`Fault`]s. Several calls can be batched
//! into one `system.multicall` request with a [`MulticallBatch`].
//!
//! Sending the documents is left to the caller, either directly or by implementing [`Transport`].
//!
//! ```
//! use xmlrpc_codec::{decode_response, encode_call, Value};
//!
//! let body = encode_call("add", &[Value::Int(2), Value::Int(4)]).unwrap();
//! assert!(body.starts_with(r#"<?xml version="1.0" encoding="UTF-8"?><methodCall>"#));
//!
//! let response = decode_response(
//!     "<methodResponse><params><param><value><int>6</int></value></param></params></methodResponse>",
//! ).unwrap();
//! assert_eq!(response, Ok(Value::Int(6)));
//! ```
//!
//! [spec]: http://xmlrpc.scripting.com/spec.html

#![doc(html_root_url = "https://docs.rs/xmlrpc-codec/0.1.0")]
#![warn(missing_debug_implementations)]

mod datetime;
mod document;
mod error;
mod fault;
mod multicall;
mod parser;
mod request;
#[cfg(feature = "serde")]
mod ser;
mod transport;
mod utils;
mod value;

pub use datetime::DateTime;
pub use document::{Element, Node};
pub use error::{DecodeError, EncodeError, RequestError};
pub use fault::Fault;
pub use multicall::{split_multicall, MulticallBatch, MULTICALL_METHOD};
pub use parser::{decode_document, decode_response, decode_value, parse_response, MAX_DEPTH};
pub use request::{encode_call, Request};
#[cfg(feature = "serde")]
pub use ser::{to_value, to_value_without_extensions, ExtensionAvoid, ExtensionBehaviour, ExtensionUse, Serializer};
pub use transport::Transport;
pub use value::Value;

/// A response from the server.
///
/// XML-RPC specifies that a call should either return a single `Value`, or a `<fault>`.
pub type Response = Result<Value, Fault>;
