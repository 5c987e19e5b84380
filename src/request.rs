use crate::error::{EncodeError, RequestError};
use crate::parser::parse_response;
use crate::transport::Transport;
use crate::utils::escape_xml;
use crate::Value;

use indexmap::IndexMap;
use tracing::debug;

use std::io::{self, Write};

/// A request to call a procedure.
#[derive(Clone, Debug, PartialEq)]
pub struct Request<'a> {
    name: &'a str,
    args: Vec<Value>,
}

impl<'a> Request<'a> {
    /// Creates a new request to call a function named `name`.
    ///
    /// By default, no arguments are passed. Use the `arg` method to append arguments.
    pub fn new(name: &'a str) -> Self {
        Request {
            name,
            args: Vec::new(),
        }
    }

    /// Appends an argument to be passed to the current list of arguments.
    pub fn arg<T: Into<Value>>(mut self, value: T) -> Self {
        self.args.push(value.into());
        self
    }

    /// Appends every value of `values` to the argument list.
    pub fn args<I>(mut self, values: I) -> Self
    where
        I: IntoIterator,
        I::Item: Into<Value>,
    {
        self.args.extend(values.into_iter().map(Into::into));
        self
    }

    /// The name of the called method.
    pub fn name(&self) -> &'a str {
        self.name
    }

    /// The arguments passed to the method, in order.
    pub fn arguments(&self) -> &[Value] {
        &self.args
    }

    /// Performs the request using a [`Transport`].
    ///
    /// # Errors
    ///
    /// Any errors that occur while sending the request using the [`Transport`] will be returned to
    /// the caller. Additionally, if the response is malformed (invalid XML), or indicates that the
    /// method call failed, an error will also be returned.
    ///
    /// [`Transport`]: trait.Transport.html
    pub fn call<T: Transport>(&self, transport: T) -> Result<Value, RequestError> {
        self.validate()?;

        let reader = transport.transmit(self).map_err(RequestError::Transport)?;

        let response = parse_response(reader)?;

        let value = response?;
        Ok(value)
    }

    /// Checks that this `Request` can be encoded, without keeping the output.
    pub fn validate(&self) -> Result<(), EncodeError> {
        self.write_as_xml(&mut io::sink())
    }

    /// Formats this `Request` as a UTF-8 encoded XML document.
    ///
    /// # Errors
    ///
    /// Fails if the method name is empty or an argument cannot be expressed (see
    /// [`Value::write_as_xml`]). Any errors reported by the writer will be propagated to the
    /// caller.
    ///
    /// [`Value::write_as_xml`]: enum.Value.html#method.write_as_xml
    pub fn write_as_xml<W: Write>(&self, fmt: &mut W) -> Result<(), EncodeError> {
        if self.name.is_empty() {
            return Err(EncodeError::EmptyMethodName);
        }

        write!(fmt, r#"<?xml version="1.0" encoding="UTF-8"?>"#)?;
        write!(fmt, r#"<methodCall><methodName>{}</methodName><params>"#, escape_xml(self.name)?)?;
        for value in &self.args {
            write!(fmt, r#"<param>"#)?;
            value.write_as_xml(fmt)?;
            write!(fmt, r#"</param>"#)?;
        }
        write!(fmt, r#"</params></methodCall>"#)?;
        Ok(())
    }

    /// Encodes this `Request` into a `<methodCall>` document.
    pub fn to_xml(&self) -> Result<String, EncodeError> {
        let mut body = Vec::new();
        self.write_as_xml(&mut body)?;
        debug!(method = self.name, bytes = body.len(), "encoded method call");

        // only `&str`s and ASCII markup were written
        Ok(String::from_utf8_lossy(&body).into_owned())
    }

    /// Serialize this `Request` into an XML-RPC struct that can be passed to
    /// the [`system.multicall`](https://mirrors.talideon.com/articles/multicall.html)
    /// XML-RPC method, specifically a struct with two fields:
    ///
    /// * `methodName`: the request name
    /// * `params`: the request arguments
    pub fn into_multicall_struct(self) -> Value {
        let mut multicall_struct = IndexMap::new();

        multicall_struct.insert("methodName".to_string(), self.name.into());
        multicall_struct.insert("params".to_string(), Value::Array(self.args));

        Value::Struct(multicall_struct)
    }
}

/// Encodes a call of the method `name` with the arguments `args` as a `<methodCall>` document.
///
/// # Errors
///
/// `EmptyMethodName` if `name` is empty, `YearOutOfRange` if an argument contains a `DateTime`
/// that XML-RPC cannot express, `UnsupportedValueKind` for non-finite doubles and for characters
/// XML 1.0 cannot hold.
pub fn encode_call(name: &str, args: &[Value]) -> Result<String, EncodeError> {
    Request::new(name).args(args.iter().cloned()).to_xml()
}
