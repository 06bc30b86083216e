//! HTTP header line decoder.
//!
//! Headers are decoded one line at a time so a handler can pull them on
//! demand. Each line is one of:
//!
//! - `Name: value`, a regular field
//! - a line starting with SP or HTAB, a folded continuation of the previous
//!   field (RFC 822 style)
//! - an empty line, the end of the header section (handled by the caller)
//!
//! Folded lines are returned with the previous field's name and the
//! [`HeaderField::is_folded`] flag set, leaving the value joining to the caller.

use http::{HeaderName, HeaderValue, header};

use crate::ensure;
use crate::protocol::{HTTP_HOST_MAX, HeaderField, LineKind, ParseError};

/// Decodes a single non-empty header line.
///
/// # Arguments
///
/// * `line` - The header line without its terminator
/// * `previous` - Name of the last field decoded in this header section, if any
///
/// # Errors
///
/// Returns `ParseError` if:
/// - The line has no `:` separator
/// - The header name or value contains invalid characters
/// - A continuation line appears before any field
/// - A `Host` value exceeds `HTTP_HOST_MAX`
pub fn decode_header_line(line: &[u8], previous: Option<&HeaderName>) -> Result<HeaderField, ParseError> {
    if let Some(b' ' | b'\t') = line.first() {
        let name = previous.ok_or_else(|| ParseError::invalid_header("continuation line without a preceding header"))?;
        let value = decode_value(name, line.trim_ascii())?;
        return Ok(HeaderField::folded(name.clone(), value));
    }

    let colon = line.iter().position(|b| *b == b':').ok_or_else(|| ParseError::invalid_header("missing ':' separator"))?;

    let name = HeaderName::from_bytes(&line[..colon]).map_err(ParseError::invalid_header)?;
    let value = decode_value(&name, line[colon + 1..].trim_ascii())?;

    Ok(HeaderField::new(name, value))
}

fn decode_value(name: &HeaderName, value: &[u8]) -> Result<HeaderValue, ParseError> {
    if *name == header::HOST {
        ensure!(value.len() <= HTTP_HOST_MAX, ParseError::too_long_line(LineKind::Host, HTTP_HOST_MAX));
    }

    HeaderValue::from_bytes(value).map_err(ParseError::invalid_header)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn regular_field() {
        let field = decode_header_line(b"Content-Type:  text/html ", None).unwrap();

        assert_eq!(field.name(), &header::CONTENT_TYPE);
        assert_eq!(field.value(), "text/html");
        assert!(!field.is_folded());
    }

    #[test]
    fn empty_value() {
        let field = decode_header_line(b"X-Empty:", None).unwrap();

        assert_eq!(field.name().as_str(), "x-empty");
        assert_eq!(field.value(), "");
    }

    #[test]
    fn folded_field() {
        let previous = HeaderName::from_static("x-long");
        let field = decode_header_line(b" \tsecond part", Some(&previous)).unwrap();

        assert_eq!(field.name(), &previous);
        assert_eq!(field.value(), "second part");
        assert!(field.is_folded());
    }

    #[test]
    fn continuation_without_previous() {
        assert!(matches!(decode_header_line(b" orphan", None), Err(ParseError::InvalidHeader { .. })));
    }

    #[test]
    fn missing_separator() {
        assert!(matches!(decode_header_line(b"NoColonHere", None), Err(ParseError::InvalidHeader { .. })));
    }

    #[test]
    fn invalid_name() {
        assert!(matches!(decode_header_line(b"Bad Name: x", None), Err(ParseError::InvalidHeader { .. })));
    }

    #[test]
    fn host_too_long() {
        let line = format!("Host: {}", "h".repeat(HTTP_HOST_MAX + 1));
        assert!(matches!(
            decode_header_line(line.as_bytes(), None),
            Err(ParseError::TooLongLine { kind: LineKind::Host, .. })
        ));

        let line = format!("Host: {}", "h".repeat(HTTP_HOST_MAX));
        assert!(decode_header_line(line.as_bytes(), None).is_ok());
    }
}
