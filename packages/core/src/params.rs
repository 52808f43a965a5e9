//! Parameter values shared by component identifiers and signature
//! parameters, plus the ordered maps that carry them.
//!
//! Both seams need an insertion-order-preserving map keyed by short
//! lower-case identifiers — the spec's Design Notes (§9) call this out
//! explicitly. `indexmap::IndexMap` gives us that for free; the canonical
//! wire ordering still comes from the Structured-Field serialiser in
//! [`crate::sf`], not from this map's own order guarantees.

use indexmap::IndexMap;
use sfv::BareItem;

/// A single parameter value: string, integer, boolean, or byte sequence —
/// the four bare-item kinds the spec's component and signature parameters
/// are drawn from.
#[derive(Debug, Clone, PartialEq)]
pub enum ParamValue {
    String(String),
    Integer(i64),
    Boolean(bool),
    ByteSequence(Vec<u8>),
}

impl ParamValue {
    pub fn as_str(&self) -> Option<&str> {
        match self {
            ParamValue::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_integer(&self) -> Option<i64> {
        match self {
            ParamValue::Integer(i) => Some(*i),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            ParamValue::Boolean(b) => Some(*b),
            _ => None,
        }
    }

    pub(crate) fn to_bare_item(&self) -> BareItem {
        match self {
            ParamValue::String(s) => BareItem::String(s.clone()),
            ParamValue::Integer(i) => BareItem::Integer(*i),
            ParamValue::Boolean(b) => BareItem::Boolean(*b),
            ParamValue::ByteSequence(b) => BareItem::ByteSeq(b.clone()),
        }
    }

    pub(crate) fn from_bare_item(item: &BareItem) -> Self {
        match item {
            BareItem::String(s) => ParamValue::String(s.clone()),
            BareItem::Integer(i) => ParamValue::Integer(*i),
            BareItem::Boolean(b) => ParamValue::Boolean(*b),
            BareItem::ByteSeq(b) => ParamValue::ByteSequence(b.clone()),
            // Tokens and decimals are accepted on the wire but this crate
            // never emits them for component/signature parameters; treat
            // them as their string form so round-tripping doesn't panic.
            other => ParamValue::String(format!("{other:?}")),
        }
    }
}

impl From<&str> for ParamValue {
    fn from(s: &str) -> Self {
        ParamValue::String(s.to_string())
    }
}

impl From<String> for ParamValue {
    fn from(s: String) -> Self {
        ParamValue::String(s)
    }
}

impl From<i64> for ParamValue {
    fn from(i: i64) -> Self {
        ParamValue::Integer(i)
    }
}

impl From<bool> for ParamValue {
    fn from(b: bool) -> Self {
        ParamValue::Boolean(b)
    }
}

/// An ordered map from short parameter keys to their values.
pub type ParamMap = IndexMap<String, ParamValue>;

/// The signature parameters carried alongside a signature: `created`,
/// `expires`, `nonce`, `alg`, `keyid`, `tag`, and extensions. Wire order is
/// the insertion order of this map.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SignatureParams(pub ParamMap);

impl SignatureParams {
    pub fn new() -> Self {
        Self(ParamMap::new())
    }

    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<ParamValue>) -> &mut Self {
        self.0.insert(key.into(), value.into());
        self
    }

    pub fn get(&self, key: &str) -> Option<&ParamValue> {
        self.0.get(key)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.0.contains_key(key)
    }

    pub fn created(&self) -> Option<i64> {
        self.get("created").and_then(ParamValue::as_integer)
    }

    pub fn expires(&self) -> Option<i64> {
        self.get("expires").and_then(ParamValue::as_integer)
    }

    pub fn alg(&self) -> Option<&str> {
        self.get("alg").and_then(ParamValue::as_str)
    }

    pub fn keyid(&self) -> Option<&str> {
        self.get("keyid").and_then(ParamValue::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &ParamValue)> {
        self.0.iter()
    }
}
