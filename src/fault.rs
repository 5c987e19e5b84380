use crate::Value;

use indexmap::IndexMap;

use std::error::Error;
use std::fmt::{self, Display, Formatter};

/// A `<fault>` response, indicating that a request failed.
///
/// The XML-RPC specification requires that a `<faultCode>` and `<faultString>` is returned in the
/// `<fault>` case, further describing the error.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Fault {
    code: i32,
    message: String,
}

impl Fault {
    /// Creates a new `Fault` from an error code and a message.
    pub fn new<S: Into<String>>(code: i32, message: S) -> Fault {
        Fault {
            code,
            message: message.into(),
        }
    }

    /// Returns the fault code.
    ///
    /// The meaning of this code is not specified by XML-RPC and depends on the service you are
    /// implementing/using.
    pub fn code(&self) -> i32 {
        self.code
    }

    /// Returns the `faultString` sent by the server.
    pub fn message(&self) -> &str {
        &self.message
    }

    /// Creates a `Fault` from a `Value`.
    ///
    /// The `Value` must be a `Value::Struct` with an integer `faultCode` and a string
    /// `faultString` member. Servers sometimes add members of their own, those are ignored.
    ///
    /// Returns `None` if the value isn't a valid `Fault`.
    pub fn from_value(value: &Value) -> Option<Self> {
        let map = value.as_struct()?;

        match (map.get("faultCode"), map.get("faultString")) {
            (Some(&Value::Int(code)), Some(Value::String(message))) => {
                Some(Fault::new(code, message.as_str()))
            }
            _ => None,
        }
    }

    /// Turns this `Fault` into an equivalent `Value`.
    ///
    /// The returned value can be parsed back into a `Fault` using `Fault::from_value` or returned
    /// as a `<fault>` error response by serializing it into a `<fault></fault>` tag.
    pub fn to_value(&self) -> Value {
        let mut map = IndexMap::new();
        map.insert("faultCode".to_string(), Value::from(self.code));
        map.insert("faultString".to_string(), Value::from(self.message.as_str()));

        Value::Struct(map)
    }
}

impl Display for Fault {
    fn fmt(&self, f: &mut Formatter) -> fmt::Result {
        write!(f, "{} ({})", self.message, self.code)
    }
}

impl Error for Fault {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fault_roundtrip() {
        let input = Fault::new(-123456, "The Bald Lazy House Jumps Over The Hyperactive Kitten");

        assert_eq!(Fault::from_value(&input.to_value()), Some(input));
    }

    #[test]
    fn rejects_wrong_member_types() {
        let mut map = IndexMap::new();
        map.insert("faultCode".to_string(), Value::from("4"));
        map.insert("faultString".to_string(), Value::from("bad"));
        assert_eq!(Fault::from_value(&Value::Struct(map)), None);

        assert_eq!(Fault::from_value(&Value::Int(4)), None);
    }

    #[test]
    fn displays_message_and_code() {
        assert_eq!(Fault::new(4, "Too many parameters.").to_string(), "Too many parameters. (4)");
    }
}
