use http::header::Entry;
use http::{HeaderMap, HeaderName, HeaderValue};

use crate::protocol::ParseError;

/// One header line as read from the wire.
///
/// A folded continuation line (one starting with whitespace) is reported as a
/// field carrying the *previous* header's name with `folded` set; its value is
/// the continuation text only. [`HttpStream::read_headers`] joins such values
/// onto the previous one.
///
/// [`HttpStream::read_headers`]: crate::connection::HttpStream::read_headers
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HeaderField {
    name: HeaderName,
    value: HeaderValue,
    folded: bool,
}

impl HeaderField {
    pub fn new(name: HeaderName, value: HeaderValue) -> Self {
        Self { name, value, folded: false }
    }

    pub fn folded(name: HeaderName, value: HeaderValue) -> Self {
        Self { name, value, folded: true }
    }

    pub fn name(&self) -> &HeaderName {
        &self.name
    }

    pub fn value(&self) -> &HeaderValue {
        &self.value
    }

    /// True when this field continues the previous header's value.
    pub fn is_folded(&self) -> bool {
        self.folded
    }

    pub fn into_parts(self) -> (HeaderName, HeaderValue) {
        (self.name, self.value)
    }
}

/// Result of reading one header line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HeaderItem {
    Field(HeaderField),
    /// The blank line terminating the header section
    End,
}

impl HeaderItem {
    #[inline]
    pub fn is_end(&self) -> bool {
        matches!(self, HeaderItem::End)
    }
}

/// Adds `field` to `headers`.
///
/// A folded field is joined onto the last value of its name with a single
/// space; a repeated name is appended, never replaced.
pub fn append_field(headers: &mut HeaderMap, field: HeaderField) -> Result<(), ParseError> {
    let folded = field.is_folded();
    let (name, value) = field.into_parts();

    match headers.entry(name) {
        Entry::Occupied(mut entry) if folded => {
            if let Some(last) = entry.iter_mut().last() {
                let mut joined = Vec::with_capacity(last.len() + value.len() + 1);
                joined.extend_from_slice(last.as_bytes());
                joined.push(b' ');
                joined.extend_from_slice(value.as_bytes());
                *last = HeaderValue::from_bytes(&joined).map_err(ParseError::invalid_header)?;
            }
        }
        Entry::Occupied(mut entry) => entry.append(value),
        Entry::Vacant(entry) => {
            entry.insert(value);
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn folded_value_joins_last_occurrence() {
        let name = HeaderName::from_static("x-list");
        let mut headers = HeaderMap::new();

        append_field(&mut headers, HeaderField::new(name.clone(), HeaderValue::from_static("a"))).unwrap();
        append_field(&mut headers, HeaderField::new(name.clone(), HeaderValue::from_static("b"))).unwrap();
        append_field(&mut headers, HeaderField::folded(name.clone(), HeaderValue::from_static("c"))).unwrap();

        let values: Vec<_> = headers.get_all(&name).iter().collect();
        assert_eq!(values, ["a", "b c"]);
    }
}
