//! Thin, idiomatic wrapper over the `sfv` crate (RFC 8941 Structured Field
//! Values: Items, Lists, Dictionaries, Inner Lists, Parameters).
//!
//! This module owns every place the rest of the crate touches `sfv`
//! directly, so the one assumption worth stating up front lives in one
//! place: `sfv::Parser` parses from `&str` and a bare-item/list/dictionary
//! round-trips through `sfv::SerializeValue`.

use sfv::{BareItem, Dictionary, Item, List, ListEntry, Parser, SerializeValue};

use crate::error::{Error, Result};

pub fn parse_dictionary(s: &str) -> Result<Dictionary> {
    Parser::new(s)
        .parse_dictionary()
        .map_err(|e| Error::MalformedInput(format!("structured-field dictionary: {e}")))
}

pub fn parse_list(s: &str) -> Result<List> {
    Parser::new(s)
        .parse_list()
        .map_err(|e| Error::MalformedInput(format!("structured-field list: {e}")))
}

pub fn parse_item(s: &str) -> Result<Item> {
    Parser::new(s)
        .parse_item()
        .map_err(|e| Error::MalformedInput(format!("structured-field item: {e}")))
}

pub fn serialize_dictionary(dict: &Dictionary) -> Result<String> {
    dict.serialize_value()
        .map_err(|e| Error::MalformedInput(format!("serialising dictionary: {e}")))
}

pub fn serialize_list(list: &List) -> Result<String> {
    list.serialize_value()
        .map_err(|e| Error::MalformedInput(format!("serialising list: {e}")))
}

/// Serialise a single Item exactly as it would appear as the sole member of
/// a List — i.e. its bare item plus its parameters, canonically ordered.
pub fn serialize_item(item: &Item) -> Result<String> {
    let as_list: List = vec![ListEntry::Item(item.clone())];
    serialize_list(&as_list)
}

/// Wrap a bare consumer-supplied identifier (e.g. `example-dict;key="a"`) so
/// it parses as a valid Structured-Field Item, by quoting the leading bare
/// token if it is not already a quoted string, recognised token, or `@`-led
/// derived-component name. Parameters, if present, are preserved verbatim.
pub fn quote_if_bare(identifier: &str) -> String {
    let (name, rest) = match identifier.find(';') {
        Some(idx) => (&identifier[..idx], &identifier[idx..]),
        None => (identifier, ""),
    };
    let name = name.trim();
    if name.starts_with('"') {
        return format!("{name}{rest}");
    }
    format!("\"{name}\"{rest}")
}

/// Concatenate raw header values with `", "` the way the spec requires
/// before parsing a multi-valued header as a single structured field.
pub fn join_raw_values<S: AsRef<str>>(values: &[S]) -> String {
    values
        .iter()
        .map(|v| v.as_ref())
        .collect::<Vec<_>>()
        .join(", ")
}

/// Build a bare `BareItem::String` with no parameters — the common case for
/// a derived-component name going into a covered-components list.
pub fn bare_string(s: impl Into<String>) -> BareItem {
    BareItem::String(s.into())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn quote_if_bare_wraps_unquoted_name() {
        assert_eq!(quote_if_bare("example-dict;key=\"a\""), "\"example-dict\";key=\"a\"");
    }

    #[test]
    fn quote_if_bare_leaves_quoted_name_alone() {
        assert_eq!(quote_if_bare("\"@method\""), "\"@method\"");
    }

    #[test]
    fn join_raw_values_joins_with_comma_space() {
        assert_eq!(join_raw_values(&["a", "b"]), "a, b");
    }
}
