//! Conversion of untyped host data into `Value`s via serde.
//!
//! Host data often only knows "a number". Floats go through the untyped-number cascade of
//! [`Value::from_untyped_number`], so `3.0` becomes an `<int>` and `NaN` becomes `false`.

#![allow(missing_debug_implementations)]   // mostly useless for all the serializers in here

use crate::error::EncodeError;
use crate::Value;

use indexmap::IndexMap;
use serde::ser::{self, Serialize};

use std::fmt::Display;
use std::iter;
use std::marker::PhantomData;

impl ser::Error for EncodeError {
    fn custom<T>(msg: T) -> Self where T: Display {
        EncodeError::UnsupportedValueKind(msg.to_string())
    }
}

pub type Result<T> = ::std::result::Result<T, EncodeError>;

/// Converts any serializable host value into a `Value`, using the `i8` extension for integers
/// that do not fit into an `<int>`.
///
/// # Errors
///
/// Fails with `UnsupportedValueKind` for data XML-RPC has no type for: `u64`s above `i64::MAX`,
/// 128-bit integers, and maps whose keys are not strings.
pub fn to_value<T: Serialize + ?Sized>(value: &T) -> Result<Value> {
    value.serialize(&mut Serializer::<ExtensionUse>::new())
}

/// Like [`to_value`], but never emits the `i8` extension: integers outside of `i32` are rejected.
///
/// [`to_value`]: fn.to_value.html
pub fn to_value_without_extensions<T: Serialize + ?Sized>(value: &T) -> Result<Value> {
    value.serialize(&mut Serializer::<ExtensionAvoid>::new())
}

/// Specifies the behaviour of the serializer when encountering values that might need XML-RPC
/// extensions to express.
pub trait ExtensionBehaviour {
    /// Whether to use `Value::Int64` to encode integers outside of the `i32` range.
    ///
    /// If `false`, any attempt to serialize such an integer will fail. The caller can manually
    /// convert to an `f64` instead.
    const USE_INT64: bool;
}

/// Allow the use of the `i8` extension.
pub enum ExtensionUse {}

impl ExtensionBehaviour for ExtensionUse {
    const USE_INT64: bool = true;
}

/// Never use the `i8` extension.
pub enum ExtensionAvoid {}

impl ExtensionBehaviour for ExtensionAvoid {
    const USE_INT64: bool = false;
}

/// A serializer that produces a `Value`.
pub struct Serializer<E: ExtensionBehaviour = ExtensionUse> {
    _phantom: PhantomData<E>,
}

impl<E: ExtensionBehaviour> Serializer<E> {
    pub fn new() -> Self {
        Self { _phantom: PhantomData }
    }
}

impl<E: ExtensionBehaviour> Default for Serializer<E> {
    fn default() -> Self {
        Self::new()
    }
}

fn nested<E: ExtensionBehaviour, T: Serialize + ?Sized>(value: &T) -> Result<Value> {
    value.serialize(&mut Serializer::<E>::new())
}

fn single_member(name: &str, value: Value) -> Value {
    Value::Struct(iter::once((name.to_string(), value)).collect())
}

impl<'a, E: ExtensionBehaviour> ser::Serializer for &'a mut Serializer<E> {
    type Ok = Value;
    type Error = EncodeError;
    type SerializeSeq = SerializeArray<E>;
    type SerializeTuple = Self::SerializeSeq;
    type SerializeTupleStruct = Self::SerializeSeq;
    type SerializeTupleVariant = SerializeTupleVariant<E>;
    type SerializeMap = SerializeMap<E>;
    type SerializeStruct = Self::SerializeMap;
    type SerializeStructVariant = SerializeStructVariant<E>;

    fn serialize_bool(self, v: bool) -> Result<Self::Ok> {
        Ok(Value::Bool(v))
    }

    fn serialize_i8(self, v: i8) -> Result<Self::Ok> {
        self.serialize_i32(v.into())
    }

    fn serialize_i16(self, v: i16) -> Result<Self::Ok> {
        self.serialize_i32(v.into())
    }

    fn serialize_i32(self, v: i32) -> Result<Self::Ok> {
        Ok(Value::Int(v))
    }

    fn serialize_i64(self, v: i64) -> Result<Self::Ok> {
        if let Ok(v) = i32::try_from(v) {
            Ok(Value::Int(v))
        } else if E::USE_INT64 {
            Ok(Value::Int64(v))
        } else {
            Err(EncodeError::UnsupportedValueKind(format!(
                "integer {} does not fit into <int> (use of `i8` extension disabled)",
                v
            )))
        }
    }

    fn serialize_u8(self, v: u8) -> Result<Self::Ok> {
        self.serialize_i32(v.into())
    }

    fn serialize_u16(self, v: u16) -> Result<Self::Ok> {
        self.serialize_i32(v.into())
    }

    fn serialize_u32(self, v: u32) -> Result<Self::Ok> {
        self.serialize_i64(v.into())
    }

    fn serialize_u64(self, v: u64) -> Result<Self::Ok> {
        // half of the u64 range can't fit in *any* XML-RPC integer
        let v = i64::try_from(v)
            .map_err(|_| EncodeError::UnsupportedValueKind(format!("integer {} is too large", v)))?;
        self.serialize_i64(v)
    }

    fn serialize_f32(self, v: f32) -> Result<Self::Ok> {
        self.serialize_f64(v.into())
    }

    fn serialize_f64(self, v: f64) -> Result<Self::Ok> {
        Ok(Value::from_untyped_number(v))
    }

    fn serialize_char(self, v: char) -> Result<Self::Ok> {
        Ok(Value::String(v.to_string()))
    }

    fn serialize_str(self, v: &str) -> Result<Self::Ok> {
        Ok(Value::String(v.to_string()))
    }

    fn serialize_bytes(self, v: &[u8]) -> Result<Self::Ok> {
        Ok(Value::Base64(v.into()))
    }

    fn serialize_none(self) -> Result<Self::Ok> {
        self.serialize_unit()
    }

    fn serialize_some<T: ?Sized>(self, value: &T) -> Result<Self::Ok> where
        T: Serialize {
        value.serialize(self)
    }

    fn serialize_unit(self) -> Result<Self::Ok> {
        // goes out as `false`, see `Value::Nil`
        Ok(Value::Nil)
    }

    fn serialize_unit_struct(self, _name: &'static str) -> Result<Self::Ok> {
        self.serialize_unit()
    }

    fn serialize_unit_variant(self, _name: &'static str, _variant_index: u32, variant: &'static str) -> Result<Self::Ok> {
        self.serialize_str(variant)
    }

    fn serialize_newtype_struct<T: ?Sized>(self, _name: &'static str, value: &T) -> Result<Self::Ok> where
        T: Serialize {
        value.serialize(self)
    }

    fn serialize_newtype_variant<T: ?Sized>(self, _name: &'static str, _variant_index: u32, variant: &'static str, value: &T) -> Result<Self::Ok> where
        T: Serialize {
        // mimic serde_json and create a struct with a single member
        Ok(single_member(variant, nested::<E, _>(value)?))
    }

    fn serialize_seq(self, len: Option<usize>) -> Result<Self::SerializeSeq> {
        Ok(SerializeArray::with_capacity(len.unwrap_or(0)))
    }

    fn serialize_tuple(self, len: usize) -> Result<Self::SerializeTuple> {
        self.serialize_seq(Some(len))
    }

    fn serialize_tuple_struct(self, _name: &'static str, len: usize) -> Result<Self::SerializeTupleStruct> {
        self.serialize_seq(Some(len))
    }

    fn serialize_tuple_variant(self, _name: &'static str, _variant_index: u32, variant: &'static str, len: usize) -> Result<Self::SerializeTupleVariant> {
        Ok(SerializeTupleVariant {
            variant,
            array: SerializeArray::with_capacity(len),
        })
    }

    fn serialize_map(self, len: Option<usize>) -> Result<Self::SerializeMap> {
        Ok(SerializeMap::with_capacity(len.unwrap_or(0)))
    }

    fn serialize_struct(self, _name: &'static str, len: usize) -> Result<Self::SerializeStruct> {
        self.serialize_map(Some(len))
    }

    fn serialize_struct_variant(self, _name: &'static str, _variant_index: u32, variant: &'static str, len: usize) -> Result<Self::SerializeStructVariant> {
        Ok(SerializeStructVariant {
            variant,
            map: SerializeMap::with_capacity(len),
        })
    }
}

pub struct SerializeArray<E: ExtensionBehaviour> {
    _phantom: PhantomData<E>,
    array: Vec<Value>,
}

impl<E: ExtensionBehaviour> SerializeArray<E> {
    fn with_capacity(cap: usize) -> Self {
        Self {
            _phantom: PhantomData,
            array: Vec::with_capacity(cap),
        }
    }

    fn push<T: ?Sized>(&mut self, value: &T) -> Result<()> where T: Serialize {
        self.array.push(nested::<E, _>(value)?);
        Ok(())
    }
}

impl<E: ExtensionBehaviour> ser::SerializeSeq for SerializeArray<E> {
    type Ok = Value;
    type Error = EncodeError;

    fn serialize_element<T: ?Sized>(&mut self, value: &T) -> Result<()> where
        T: Serialize {
        self.push(value)
    }

    fn end(self) -> Result<Self::Ok> {
        Ok(Value::Array(self.array))
    }
}

impl<E: ExtensionBehaviour> ser::SerializeTuple for SerializeArray<E> {
    type Ok = Value;
    type Error = EncodeError;

    fn serialize_element<T: ?Sized>(&mut self, value: &T) -> Result<()> where
        T: Serialize {
        self.push(value)
    }

    fn end(self) -> Result<Self::Ok> {
        Ok(Value::Array(self.array))
    }
}

impl<E: ExtensionBehaviour> ser::SerializeTupleStruct for SerializeArray<E> {
    type Ok = Value;
    type Error = EncodeError;

    fn serialize_field<T: ?Sized>(&mut self, value: &T) -> Result<()> where
        T: Serialize {
        self.push(value)
    }

    fn end(self) -> Result<Self::Ok> {
        Ok(Value::Array(self.array))
    }
}

/// Encodes `Variant(a, b)` as `{ "Variant": [a, b] }`.
pub struct SerializeTupleVariant<E: ExtensionBehaviour> {
    variant: &'static str,
    array: SerializeArray<E>,
}

impl<E: ExtensionBehaviour> ser::SerializeTupleVariant for SerializeTupleVariant<E> {
    type Ok = Value;
    type Error = EncodeError;

    fn serialize_field<T: ?Sized>(&mut self, value: &T) -> Result<()> where
        T: Serialize {
        self.array.push(value)
    }

    fn end(self) -> Result<Self::Ok> {
        Ok(single_member(self.variant, Value::Array(self.array.array)))
    }
}

pub struct SerializeMap<E: ExtensionBehaviour> {
    _phantom: PhantomData<E>,
    next_key: Option<String>,
    map: IndexMap<String, Value>,
}

impl<E: ExtensionBehaviour> SerializeMap<E> {
    fn with_capacity(cap: usize) -> Self {
        Self {
            _phantom: PhantomData,
            next_key: None,
            map: IndexMap::with_capacity(cap),
        }
    }

    /// Inserts a member. Later members replace earlier ones with the same name.
    fn insert<T: ?Sized>(&mut self, key: String, value: &T) -> Result<()> where T: Serialize {
        let value = nested::<E, _>(value)?;
        self.map.insert(key, value);
        Ok(())
    }
}

impl<E: ExtensionBehaviour> ser::SerializeMap for SerializeMap<E> {
    type Ok = Value;
    type Error = EncodeError;

    fn serialize_key<T: ?Sized>(&mut self, key: &T) -> Result<()> where
        T: Serialize {
        // keys go through the regular serializer, so unit variants and newtypes around strings
        // are accepted too
        match nested::<E, _>(key)? {
            Value::String(key) => {
                self.next_key = Some(key);
                Ok(())
            }
            other => Err(EncodeError::UnsupportedValueKind(format!(
                "struct member names must be strings, found {:?}",
                other
            ))),
        }
    }

    fn serialize_value<T: ?Sized>(&mut self, value: &T) -> Result<()> where
        T: Serialize {
        let key = self.next_key.take().ok_or_else(|| {
            EncodeError::UnsupportedValueKind("map value serialized before its key".into())
        })?;
        self.insert(key, value)
    }

    fn end(self) -> Result<Self::Ok> {
        Ok(Value::Struct(self.map))
    }
}

impl<E: ExtensionBehaviour> ser::SerializeStruct for SerializeMap<E> {
    type Ok = Value;
    type Error = EncodeError;

    fn serialize_field<T: ?Sized>(&mut self, key: &'static str, value: &T) -> Result<()> where
        T: Serialize {
        self.insert(key.to_string(), value)
    }

    fn end(self) -> Result<Value> {
        Ok(Value::Struct(self.map))
    }
}

/// Encodes `Variant { a, b }` as `{ "Variant": { "a": a, "b": b } }`.
pub struct SerializeStructVariant<E: ExtensionBehaviour> {
    variant: &'static str,
    map: SerializeMap<E>,
}

impl<E: ExtensionBehaviour> ser::SerializeStructVariant for SerializeStructVariant<E> {
    type Ok = Value;
    type Error = EncodeError;

    fn serialize_field<T: ?Sized>(&mut self, key: &'static str, value: &T) -> Result<()> where
        T: Serialize {
        self.map.insert(key.to_string(), value)
    }

    fn end(self) -> Result<Self::Ok> {
        Ok(single_member(self.variant, Value::Struct(self.map.map)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use std::collections::BTreeMap;

    #[test]
    fn applies_number_cascade() {
        assert_eq!(to_value(&3.0f64).unwrap(), Value::Int(3));
        assert_eq!(to_value(&2.5f32).unwrap(), Value::Double(2.5));
        assert_eq!(to_value(&f64::NAN).unwrap(), Value::Bool(false));
        assert_eq!(to_value(&f64::INFINITY).unwrap(), Value::Bool(false));
    }

    #[test]
    fn picks_integer_width() {
        assert_eq!(to_value(&7u8).unwrap(), Value::Int(7));
        assert_eq!(to_value(&7i64).unwrap(), Value::Int(7));
        assert_eq!(to_value(&u32::MAX).unwrap(), Value::Int64(u32::MAX.into()));
        assert!(matches!(to_value(&u64::MAX), Err(EncodeError::UnsupportedValueKind(_))));
        assert!(matches!(to_value_without_extensions(&u32::MAX), Err(EncodeError::UnsupportedValueKind(_))));
    }

    #[test]
    fn rejects_non_string_keys() {
        let mut map = BTreeMap::new();
        map.insert(1, "one");
        assert!(matches!(to_value(&map), Err(EncodeError::UnsupportedValueKind(_))));
    }

    #[test]
    fn encodes_options_as_nil() {
        assert_eq!(to_value(&None::<i32>).unwrap(), Value::Nil);
        assert_eq!(to_value(&Some("x")).unwrap(), Value::from("x"));
    }
}
