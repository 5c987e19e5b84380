//! XML-RPC response parser.
//!
//! Decoding is a recursive walk over an [`Element`] tree: the tag name of each node selects how
//! it is turned into a [`Value`]. Nothing is kept between calls.

use crate::datetime::DateTime;
use crate::document::{Element, Node};
use crate::error::DecodeError;
use crate::utils::unescape_entities;
use crate::{Fault, Response, Value};

use indexmap::IndexMap;
use tracing::{debug, trace, warn};

use std::io::Read;

pub type ParseResult<T> = Result<T, DecodeError>;

/// Parses a response from an XML reader.
pub fn parse_response<R: Read>(reader: R) -> ParseResult<Response> {
    decode_document(&Element::parse(reader)?)
}

/// Parses a `<methodResponse>` document held in a string.
pub fn decode_response(xml: &str) -> ParseResult<Response> {
    parse_response(xml.as_bytes())
}

/// Decodes an already parsed `<methodResponse>` document.
///
/// A `<fault>` response is returned as `Ok(Err(fault))`; `Err` is reserved for documents that are
/// not valid XML-RPC responses.
pub fn decode_document(root: &Element) -> ParseResult<Response> {
    expect_tag(root, "methodResponse")?;

    let body = root
        .element(0)
        .ok_or_else(|| DecodeError::unexpected("<fault> or <params>", "nothing"))?;

    match body.name() {
        "fault" => {
            expect_plain(body)?;
            let value = body.find("value").ok_or(DecodeError::MalformedFault)?;
            let value = decode_value(value)?;

            match Fault::from_value(&value) {
                Some(fault) => {
                    debug!(code = fault.code(), "decoded fault response");
                    Ok(Err(fault))
                }
                None => {
                    warn!(?value, "fault response without faultCode/faultString");
                    Err(DecodeError::MalformedFault)
                }
            }
        }
        "params" => {
            expect_plain(body)?;
            let param = body
                .element(0)
                .ok_or_else(|| DecodeError::unexpected("<param>", "</params>"))?;
            expect_tag(param, "param")?;
            let value = param
                .element(0)
                .ok_or_else(|| DecodeError::unexpected("<value>", "</param>"))?;
            expect_tag(value, "value")?;

            let value = decode_value(value)?;
            debug!("decoded response value");
            Ok(Ok(value))
        }
        other => Err(DecodeError::unexpected("<fault> or <params>", format!("<{}>", other))),
    }
}

/// How many `<value>` and type tags may be nested inside each other.
///
/// Every level of an array or struct takes two: `<value><array>` or `<value><struct>`.
pub const MAX_DEPTH: usize = 128;

/// Decodes a single value node.
///
/// `element` is either a `<value>` or one of the type tags that can appear inside one.
///
/// # Errors
///
/// Besides malformed values, fails with `TooDeep` for values nested deeper than [`MAX_DEPTH`].
///
/// [`MAX_DEPTH`]: constant.MAX_DEPTH.html
pub fn decode_value(element: &Element) -> ParseResult<Value> {
    decode_nested(element, 0)
}

fn decode_nested(element: &Element, depth: usize) -> ParseResult<Value> {
    if depth >= MAX_DEPTH {
        warn!(limit = MAX_DEPTH, "value nested too deeply");
        return Err(DecodeError::TooDeep(MAX_DEPTH));
    }
    let depth = depth + 1;

    expect_plain(element)?;
    trace!(tag = element.name(), depth, "decoding value");

    let value = match element.name() {
        "value" => match single_element(element)? {
            Some(inner) => decode_nested(inner, depth)?,
            // untyped values are strings
            None => Value::String(string_content(element)),
        },
        "string" => {
            no_elements(element)?;
            Value::String(string_content(element))
        }
        "int" | "i4" => Value::Int(parse_number(element, "int")?),
        "i8" => Value::Int64(parse_number(element, "i8")?),
        "double" => Value::Double(parse_number(element, "double")?),
        "boolean" => {
            no_elements(element)?;
            let text = element.text();
            Value::Bool(matches!(text.trim(), "1" | "true"))
        }
        "dateTime.iso8601" => {
            no_elements(element)?;
            Value::DateTime(DateTime::parse_wire(&element.text())?)
        }
        "base64" => {
            no_elements(element)?;
            let text: String = element.text().split_whitespace().collect();
            let data = base64::decode(&text).map_err(|_| DecodeError::InvalidValue {
                for_type: "base64",
                found: text.clone(),
            })?;
            Value::Base64(data)
        }
        "nil" => {
            let text = element.text();
            if element.elements().next().is_some() || !text.trim().is_empty() {
                return Err(DecodeError::InvalidValue { for_type: "nil", found: text });
            }
            Value::Nil
        }
        "array" => {
            let data = element.element(0).filter(|data| data.name() == "data");
            let data = data.ok_or(DecodeError::MalformedArray)?;
            expect_plain(data)?;

            let elements = data
                .elements()
                .map(|element| decode_nested(element, depth))
                .collect::<ParseResult<Vec<_>>>()?;
            Value::Array(elements)
        }
        "struct" => {
            let mut members = IndexMap::new();
            for member in element.elements() {
                let (name, value) = decode_member(member, depth)?;
                // a repeated name replaces the earlier member
                members.insert(name, value);
            }
            Value::Struct(members)
        }
        other => {
            warn!(tag = other, "unknown value tag");
            return Err(DecodeError::UnknownValueTag(other.to_string()));
        }
    };

    Ok(value)
}

/// Decodes `<member><name>NAME</name><value>...</value></member>`.
fn decode_member(member: &Element, depth: usize) -> ParseResult<(String, Value)> {
    if member.name() != "member" {
        return Err(DecodeError::MalformedStruct("expected <member>"));
    }
    expect_plain(member)?;

    let mut children = member.elements();
    let (name, value) = match (children.next(), children.next(), children.next()) {
        (Some(name), Some(value), None) if name.name() == "name" => (name, value),
        _ => return Err(DecodeError::MalformedStruct("<member> must hold a <name> and a <value>")),
    };
    if name.elements().next().is_some() {
        return Err(DecodeError::MalformedStruct("<name> must only contain text"));
    }

    Ok((string_content(name), decode_nested(value, depth)?))
}

/// Text of a string-like node.
///
/// Entities in plain text are resolved by the XML parser. CDATA sections are passed through
/// verbatim, so entities written into them by an escaping encoder are resolved here.
fn string_content(element: &Element) -> String {
    let mut content = String::new();
    for node in element.children() {
        match node {
            Node::Text(text) => content.push_str(text),
            Node::CData(text) => content.push_str(&unescape_entities(text)),
            Node::Element(_) => {}
        }
    }
    content
}

/// Parses the trimmed text of a numeric tag, defaulting to zero when the tag is empty.
fn parse_number<T>(element: &Element, for_type: &'static str) -> ParseResult<T>
where
    T: std::str::FromStr + Default,
{
    no_elements(element)?;

    let text = element.text();
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return Ok(T::default());
    }

    trimmed.parse().map_err(|_| DecodeError::InvalidValue {
        for_type,
        found: text.clone(),
    })
}

/// Returns the only child element, if any.
fn single_element(element: &Element) -> ParseResult<Option<&Element>> {
    let mut elements = element.elements();
    let first = elements.next();
    match elements.next() {
        None => Ok(first),
        Some(second) => Err(DecodeError::unexpected(
            format!("a single type tag in <{}>", element.name()),
            format!("<{}>", second.name()),
        )),
    }
}

fn no_elements(element: &Element) -> ParseResult<()> {
    match element.elements().next() {
        None => Ok(()),
        Some(child) => Err(DecodeError::unexpected(
            format!("characters in <{}>", element.name()),
            format!("<{}>", child.name()),
        )),
    }
}

/// XML-RPC never uses attributes.
fn expect_plain(element: &Element) -> ParseResult<()> {
    if element.has_attributes() {
        return Err(DecodeError::unexpected(
            format!("tag <{}> without attributes", element.name()),
            "attributes",
        ));
    }
    Ok(())
}

fn expect_tag(element: &Element, tag: &str) -> ParseResult<()> {
    if element.name() != tag {
        return Err(DecodeError::unexpected(format!("<{}>", tag), format!("<{}>", element.name())));
    }
    expect_plain(element)
}
