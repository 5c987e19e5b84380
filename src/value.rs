//! Contains the different types of values understood by XML-RPC.

use crate::datetime::DateTime;
use crate::error::EncodeError;
use crate::utils::{escape_cdata, escape_xml};

use base64::encode;
use indexmap::IndexMap;

use std::io::Write;

/// The possible XML-RPC values.
#[derive(Clone, Debug, PartialEq)]
pub enum Value {
    /// The absence of a value.
    ///
    /// XML-RPC 1.0 has no null type, so this is *encoded as `<boolean>0</boolean>`* and the
    /// receiver sees `false`. Decoding the `<nil/>` extension tag produces `Nil`.
    Nil,
    /// `<boolean>`, 0 == `false`, 1 == `true`.
    Bool(bool),
    /// `<i4>` or `<int>`, 32-bit signed integer.
    Int(i32),
    /// `<i8>`, 64-bit signed integer.
    ///
    /// This is an XMLRPC extension and may not be supported by all clients / servers.
    Int64(i64),
    /// `<double>`
    ///
    /// Always encoded as `<double>`, even if the number is whole.
    Double(f64),
    /// `<string>`, escaped and wrapped in a CDATA section on the wire.
    String(String),
    /// `<dateTime.iso8601>`, second precision and no time zone.
    DateTime(DateTime),
    /// `<base64>`, base64-encoded binary data.
    Base64(Vec<u8>),
    /// `<array>`, a list of arbitrary (heterogeneous) values.
    Array(Vec<Value>),
    /// `<struct>`, a mapping of named values.
    ///
    /// Members are written in insertion order.
    Struct(IndexMap<String, Value>),
}

impl Value {
    /// Classifies an untyped host number.
    ///
    /// Whole numbers within the `i32` range become `Int`, other finite numbers `Double`. Anything
    /// else (`NaN`, infinities) cannot be sent and falls back to `Bool(false)`.
    ///
    /// Only use this for numbers of unknown kind; a value known to be a `Double` should stay one.
    pub fn from_untyped_number(number: f64) -> Value {
        if number.fract() == 0.0 && number >= f64::from(i32::MIN) && number <= f64::from(i32::MAX) {
            // whole and in range, so the cast is exact
            Value::Int(number as i32)
        } else if number.is_finite() {
            Value::Double(number)
        } else {
            Value::Bool(false)
        }
    }

    /// Returns the inner `&str` if `self` is a `Value::String`.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match *self {
            Value::Bool(b) => Some(b),
            _ => None,
        }
    }

    pub fn as_i32(&self) -> Option<i32> {
        match *self {
            Value::Int(i) => Some(i),
            _ => None,
        }
    }

    /// Returns the integer value of an `Int` or `Int64`.
    pub fn as_i64(&self) -> Option<i64> {
        match *self {
            Value::Int(i) => Some(i.into()),
            Value::Int64(i) => Some(i),
            _ => None,
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match *self {
            Value::Double(d) => Some(d),
            _ => None,
        }
    }

    pub fn as_datetime(&self) -> Option<DateTime> {
        match *self {
            Value::DateTime(dt) => Some(dt),
            _ => None,
        }
    }

    pub fn as_bytes(&self) -> Option<&[u8]> {
        match self {
            Value::Base64(data) => Some(data),
            _ => None,
        }
    }

    pub fn as_array(&self) -> Option<&[Value]> {
        match self {
            Value::Array(array) => Some(array),
            _ => None,
        }
    }

    pub fn as_struct(&self) -> Option<&IndexMap<String, Value>> {
        match self {
            Value::Struct(map) => Some(map),
            _ => None,
        }
    }

    /// Looks up a member of a `Value::Struct`.
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.as_struct().and_then(|map| map.get(name))
    }

    /// Formats this `Value` as an XML `<value>` element.
    ///
    /// # Errors
    ///
    /// Fails with `YearOutOfRange` if a contained `DateTime` cannot be expressed, with
    /// `UnsupportedValueKind` for non-finite doubles and for strings holding characters XML 1.0
    /// forbids, and with `Io` if the writer fails. Nothing is rolled back, so `fmt` may hold a partial element on error.
    pub fn write_as_xml<W: Write>(&self, fmt: &mut W) -> Result<(), EncodeError> {
        write!(fmt, "<value>")?;
        self.write_type_tag(fmt)?;
        write!(fmt, "</value>")?;
        Ok(())
    }

    fn write_type_tag<W: Write>(&self, fmt: &mut W) -> Result<(), EncodeError> {
        match self {
            Value::Nil => {
                write!(fmt, "<boolean>0</boolean>")?;
            }
            Value::Bool(b) => {
                write!(fmt, "<boolean>{}</boolean>", if *b { "1" } else { "0" })?;
            }
            Value::Int(i) => {
                write!(fmt, "<int>{}</int>", i)?;
            }
            Value::Int64(i) => {
                write!(fmt, "<i8>{}</i8>", i)?;
            }
            Value::Double(d) => {
                // `<double>` only takes decimal literals
                if !d.is_finite() {
                    return Err(EncodeError::UnsupportedValueKind(format!("non-finite double {}", d)));
                }
                write!(fmt, "<double>{}</double>", d)?;
            }
            Value::String(s) => {
                write!(fmt, "<string><![CDATA[{}]]></string>", escape_cdata(s)?)?;
            }
            Value::DateTime(date_time) => {
                write!(fmt, "<dateTime.iso8601>{}</dateTime.iso8601>", date_time.to_wire()?)?;
            }
            Value::Base64(data) => {
                write!(fmt, "<base64>{}</base64>", encode(data))?;
            }
            Value::Array(array) => {
                write!(fmt, "<array><data>")?;
                for value in array {
                    value.write_as_xml(fmt)?;
                }
                write!(fmt, "</data></array>")?;
            }
            Value::Struct(map) => {
                write!(fmt, "<struct>")?;
                for (name, value) in map {
                    write!(fmt, "<member><name>{}</name>", escape_xml(name)?)?;
                    value.write_as_xml(fmt)?;
                    write!(fmt, "</member>")?;
                }
                write!(fmt, "</struct>")?;
            }
        }

        Ok(())
    }
}

impl From<i32> for Value {
    fn from(other: i32) -> Self {
        Value::Int(other)
    }
}

impl From<i64> for Value {
    fn from(other: i64) -> Self {
        Value::Int64(other)
    }
}

impl From<bool> for Value {
    fn from(other: bool) -> Self {
        Value::Bool(other)
    }
}

impl From<String> for Value {
    fn from(other: String) -> Self {
        Value::String(other)
    }
}

impl<'a> From<&'a str> for Value {
    fn from(other: &'a str) -> Self {
        Value::String(other.to_string())
    }
}

impl From<f64> for Value {
    fn from(other: f64) -> Self {
        Value::Double(other)
    }
}

impl From<DateTime> for Value {
    fn from(other: DateTime) -> Self {
        Value::DateTime(other)
    }
}

impl From<Vec<Value>> for Value {
    fn from(other: Vec<Value>) -> Self {
        Value::Array(other)
    }
}

impl From<IndexMap<String, Value>> for Value {
    fn from(other: IndexMap<String, Value>) -> Self {
        Value::Struct(other)
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(other: Option<T>) -> Self {
        other.map_or(Value::Nil, Into::into)
    }
}

impl TryFrom<iso8601::DateTime> for Value {
    type Error = EncodeError;

    fn try_from(other: iso8601::DateTime) -> Result<Self, Self::Error> {
        DateTime::try_from(other).map(Value::DateTime)
    }
}
