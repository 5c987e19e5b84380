use crate::error::EncodeError;

use xml::common::is_xml10_char;
use xml::escape::escape_str_pcdata;

use std::borrow::Cow;

/// Escape a string for use as XML characters.
///
/// The resulting string is *not* suitable for use in XML attributes, but XML-RPC doesn't use those.
pub fn escape_xml(s: &str) -> Result<Cow<str>, EncodeError> {
    check_chars(s)?;
    Ok(escape_str_pcdata(s))
}

/// Escapes `&`, `<` and `>` for the payload of a `<string><![CDATA[...]]></string>`.
///
/// Since `>` is always escaped, the payload can never contain the `]]>` terminator.
pub fn escape_cdata(s: &str) -> Result<Cow<str>, EncodeError> {
    check_chars(s)?;
    if !s.contains(['&', '<', '>']) {
        return Ok(Cow::Borrowed(s));
    }

    let mut escaped = String::with_capacity(s.len() + 8);
    for c in s.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            c => escaped.push(c),
        }
    }
    Ok(Cow::Owned(escaped))
}

/// XML 1.0 has no way to express most control characters, escaped or not.
fn check_chars(s: &str) -> Result<(), EncodeError> {
    match s.chars().find(|&c| !is_xml10_char(c)) {
        None => Ok(()),
        Some(c) => Err(EncodeError::UnsupportedValueKind(format!(
            "character {:?} is not allowed in XML",
            c
        ))),
    }
}

/// Resolves the predefined XML entities in text that bypassed the XML parser (CDATA sections).
///
/// Unknown or unterminated entities are kept verbatim.
pub fn unescape_entities(s: &str) -> Cow<str> {
    if !s.contains('&') {
        return Cow::Borrowed(s);
    }

    let mut out = String::with_capacity(s.len());
    let mut rest = s;
    while let Some(amp) = rest.find('&') {
        out.push_str(&rest[..amp]);
        rest = &rest[amp..];

        let replacement = rest.find(';').and_then(|semi| {
            let c = match &rest[1..semi] {
                "amp" => '&',
                "lt" => '<',
                "gt" => '>',
                "quot" => '"',
                "apos" => '\'',
                _ => return None,
            };
            Some((c, semi + 1))
        });

        match replacement {
            Some((c, len)) => {
                out.push(c);
                rest = &rest[len..];
            }
            None => {
                out.push('&');
                rest = &rest[1..];
            }
        }
    }
    out.push_str(rest);

    Cow::Owned(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn escapes_cdata_payloads() {
        assert_eq!(escape_cdata("<a&b>").unwrap(), "&lt;a&amp;b&gt;");
        assert_eq!(escape_cdata("]]>").unwrap(), "]]&gt;");
        assert!(matches!(escape_cdata("plain"), Ok(Cow::Borrowed("plain"))));
    }

    #[test]
    fn rejects_characters_xml_cannot_hold() {
        assert_eq!(escape_cdata("tab\there\r\n").unwrap(), "tab\there\r\n");
        assert_eq!(escape_xml("\u{10000}").unwrap(), "\u{10000}");

        for s in &["a\u{1}b", "\0", "\u{1f}", "\u{fffe}", "\u{ffff}"] {
            assert!(matches!(escape_cdata(s), Err(EncodeError::UnsupportedValueKind(_))), "accepted {:?}", s);
            assert!(matches!(escape_xml(s), Err(EncodeError::UnsupportedValueKind(_))), "accepted {:?}", s);
        }
    }

    #[test]
    fn unescapes_entities() {
        assert_eq!(unescape_entities("&lt;a&amp;b&gt;"), "<a&b>");
        assert_eq!(unescape_entities("&quot;&apos;"), "\"'");
        assert_eq!(unescape_entities("&amp;lt;"), "&lt;");
        assert_eq!(unescape_entities("a & b"), "a & b");
        assert_eq!(unescape_entities("&nbsp;&"), "&nbsp;&");
    }
}
