//! Ordered header-line accumulator

use http::header::{HeaderMap, HeaderName, HeaderValue};

use crate::engine::{Code, EngineError};

/// Ordered list of `"Name: Value"` lines attached to the next request.
///
/// Append-only: entries are never reordered or deduplicated, so a repeated
/// name is sent once per entry.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct HeaderList {
    lines: Vec<String>,
}

impl HeaderList {
    /// Create an empty list
    pub fn new() -> Self {
        Self::default()
    }

    /// Format and append one header line.
    pub fn append(&mut self, name: &str, value: &str) {
        self.lines.push(format!("{name}: {value}"));
    }

    /// Discard every line
    pub fn clear(&mut self) {
        self.lines.clear();
    }

    /// Number of lines
    pub fn len(&self) -> usize {
        self.lines.len()
    }

    /// Whether the list is empty
    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// The raw lines in insertion order
    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.lines.iter().map(String::as_str)
    }

    /// Convert the lines into wire headers, preserving order.
    pub fn to_header_map(&self) -> Result<HeaderMap, EngineError> {
        let mut map = HeaderMap::with_capacity(self.lines.len());
        for line in &self.lines {
            let (name, value) = split_line(line)?;
            map.append(name, value);
        }
        Ok(map)
    }
}

fn split_line(line: &str) -> Result<(HeaderName, HeaderValue), EngineError> {
    let bad = || EngineError::with_detail(Code::BadFunctionArgument, format!("header `{line}`"));
    let (name, value) = line.split_once(':').ok_or_else(bad)?;
    let name = HeaderName::from_bytes(name.trim().as_bytes()).map_err(|_| bad())?;
    let value = HeaderValue::from_str(value.trim_start()).map_err(|_| bad())?;
    Ok((name, value))
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn keeps_order_and_duplicates() {
        let mut list = HeaderList::new();
        list.append("X-Test", "1");
        list.append("Accept", "text/plain");
        list.append("X-Test", "2");

        let lines: Vec<&str> = list.iter().collect();
        assert_eq!(lines, vec!["X-Test: 1", "Accept: text/plain", "X-Test: 2"]);

        let map = list.to_header_map().unwrap();
        let values: Vec<&str> = map
            .get_all("x-test")
            .iter()
            .map(|v| v.to_str().unwrap())
            .collect();
        assert_eq!(values, vec!["1", "2"]);
    }

    #[test]
    fn rejects_unencodable_name() {
        let mut list = HeaderList::new();
        list.append("Bad Name", "x");
        let err = list.to_header_map().unwrap_err();
        assert_eq!(err.code(), Code::BadFunctionArgument);
        assert_eq!(err.detail(), Some("header `Bad Name: x`"));
    }

    #[test]
    fn clear_empties_list() {
        let mut list = HeaderList::new();
        list.append("A", "b");
        list.clear();
        assert!(list.is_empty());
        assert_eq!(list.len(), 0);
    }
}
