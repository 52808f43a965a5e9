//! Component identifiers and the component resolver (spec §4.2): given an
//! identifier and a message, produce the ordered list of string values that
//! identifier contributes to the signature base.

use base64::{engine::general_purpose::STANDARD as BASE64, Engine};
use http::HeaderMap;
use sfv::{BareItem, Item, ListEntry};

use crate::error::{Error, Result};
use crate::message::{Message, RequestMessage, ResponseMessage};
use crate::params::{ParamMap, ParamValue};
use crate::sf;

/// A component identifier: a name (derived `@foo` or an HTTP field name)
/// plus its ordered parameter map.
#[derive(Debug, Clone, PartialEq)]
pub struct ComponentId {
    pub name: String,
    pub params: ParamMap,
}

impl ComponentId {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            params: ParamMap::new(),
        }
    }

    pub fn with_param(mut self, key: impl Into<String>, value: impl Into<ParamValue>) -> Self {
        self.params.insert(key.into(), value.into());
        self
    }

    pub fn is_derived(&self) -> bool {
        self.name.starts_with('@')
    }

    pub fn req(&self) -> bool {
        self.params.contains_key("req")
    }

    pub fn sf(&self) -> bool {
        self.params.contains_key("sf") || self.key().is_some()
    }

    pub fn key(&self) -> Option<&str> {
        self.params.get("key").and_then(ParamValue::as_str)
    }

    pub fn bs(&self) -> bool {
        self.params.contains_key("bs")
    }

    pub fn query_param_name(&self) -> Option<&str> {
        self.params.get("name").and_then(ParamValue::as_str)
    }

    /// Parse a Structured-Field Item string into a component identifier.
    /// Accepts both the canonical quoted form (`"content-type";bs`) and a
    /// bare convenience form (`content-type;bs`), quoting the leading name
    /// via [`sf::quote_if_bare`] before parsing so both spellings resolve to
    /// the same identifier.
    pub fn parse(identifier: &str) -> Result<Self> {
        let item = sf::parse_item(&sf::quote_if_bare(identifier))?;
        let name = match &item.bare_item {
            BareItem::String(s) => s.clone(),
            other => {
                return Err(Error::MalformedInput(format!(
                    "component identifier bare item must be a string, got {other:?}"
                )))
            }
        };
        let mut params = ParamMap::new();
        for (key, value) in item.params.iter() {
            params.insert(key.clone(), ParamValue::from_bare_item(value));
        }
        Ok(Self { name, params })
    }

    pub(crate) fn to_sf_item(&self) -> Item {
        let mut item = Item::new(BareItem::String(self.name.clone()));
        for (key, value) in &self.params {
            item.params.insert(key.clone(), value.to_bare_item());
        }
        item
    }

    /// The canonical Structured-Field Item form used in `Signature-Input`
    /// and as the base-line prefix: quoted name plus parameters in their
    /// canonical wire order.
    pub fn canonical_string(&self) -> Result<String> {
        sf::serialize_item(&self.to_sf_item())
    }
}

enum Target<'a> {
    Req(&'a RequestMessage),
    Resp(&'a ResponseMessage),
}

impl<'a> Target<'a> {
    fn headers(&self) -> &HeaderMap {
        match self {
            Target::Req(r) => &r.headers,
            Target::Resp(r) => &r.headers,
        }
    }
}

fn select_target<'a>(id: &ComponentId, message: &'a Message) -> Result<Target<'a>> {
    if id.req() {
        return match message {
            Message::Response(r) => {
                let bound = r.bound_request.as_ref().ok_or_else(|| {
                    Error::MissingComponent(format!(
                        "{:?};req requires a response bound to a request",
                        id.name
                    ))
                })?;
                Ok(Target::Req(bound))
            }
            Message::Request(r) => Ok(Target::Req(r)),
        };
    }
    Ok(match message {
        Message::Request(r) => Target::Req(r),
        Message::Response(r) => Target::Resp(r),
    })
}

/// Resolve a component identifier against a message, producing its ordered
/// list of string values (almost always one value; `@query-param` and `bs`
/// on a multi-valued header can produce more).
pub fn resolve(id: &ComponentId, message: &Message) -> Result<Vec<String>> {
    let target = select_target(id, message)?;

    if id.is_derived() {
        return resolve_derived(id, &target);
    }

    resolve_field(id, target.headers())
}

fn resolve_derived(id: &ComponentId, target: &Target<'_>) -> Result<Vec<String>> {
    match id.name.as_str() {
        "@method" => match target {
            Target::Req(r) => Ok(vec![r.method.as_str().to_uppercase()]),
            Target::Resp(_) => Err(Error::MissingComponent(
                "@method requires a request (or ;req on a response)".into(),
            )),
        },
        "@target-uri" => match target {
            Target::Req(r) => Ok(vec![r.url.to_string()]),
            Target::Resp(_) => Err(Error::MissingComponent(
                "@target-uri requires a request (or ;req on a response)".into(),
            )),
        },
        "@authority" => match target {
            Target::Req(r) => {
                let host = r
                    .url
                    .host_str()
                    .ok_or_else(|| Error::MissingComponent("@authority: URL has no host".into()))?
                    .to_lowercase();
                let authority = match r.url.port() {
                    Some(port) => format!("{host}:{port}"),
                    None => host,
                };
                Ok(vec![authority])
            }
            Target::Resp(_) => Err(Error::MissingComponent(
                "@authority requires a request (or ;req on a response)".into(),
            )),
        },
        "@scheme" => match target {
            Target::Req(r) => Ok(vec![r.url.scheme().to_lowercase()]),
            Target::Resp(_) => Err(Error::MissingComponent(
                "@scheme requires a request (or ;req on a response)".into(),
            )),
        },
        "@request-target" => match target {
            Target::Req(r) => Ok(vec![request_target(r)]),
            Target::Resp(_) => Err(Error::MissingComponent(
                "@request-target requires a request (or ;req on a response)".into(),
            )),
        },
        "@path" => match target {
            Target::Req(r) => Ok(vec![normalized_path(r)]),
            Target::Resp(_) => Err(Error::MissingComponent(
                "@path requires a request (or ;req on a response)".into(),
            )),
        },
        "@query" => match target {
            Target::Req(r) => Ok(vec![query_string(r)]),
            Target::Resp(_) => Err(Error::MissingComponent(
                "@query requires a request (or ;req on a response)".into(),
            )),
        },
        "@query-param" => match target {
            Target::Req(r) => resolve_query_param(id, r),
            Target::Resp(_) => Err(Error::MissingComponent(
                "@query-param requires a request (or ;req on a response)".into(),
            )),
        },
        "@status" => match target {
            Target::Resp(r) => Ok(vec![r.status.to_string()]),
            Target::Req(_) => Err(Error::MissingComponent(
                "@status is not valid on a request".into(),
            )),
        },
        other => Err(Error::MissingComponent(format!(
            "unrecognised derived component {other:?}"
        ))),
    }
}

/// `path?query`, the httpbis value of `@request-target`. Empty path is
/// normalised to `/`. This does *not* include the method — the cavage
/// dialect's `(request-target)` line, which does, is built separately in
/// the cavage base formatter.
pub(crate) fn request_target(r: &RequestMessage) -> String {
    let path = normalized_path(r);
    match r.url.query() {
        Some(q) => format!("{path}?{q}"),
        None => path,
    }
}

fn normalized_path(r: &RequestMessage) -> String {
    let path = r.url.path();
    if path.is_empty() {
        "/".to_string()
    } else {
        path.to_string()
    }
}

fn query_string(r: &RequestMessage) -> String {
    match r.url.query() {
        Some(q) => format!("?{q}"),
        None => "?".to_string(),
    }
}

/// Extract the raw (still percent-encoded) values of a named query
/// parameter. Like `@query`/`@path`, `@query-param` is never decoded or
/// re-encoded — the spec's Design Notes (§9) call this out explicitly, so
/// this splits the raw query string by hand rather than going through
/// `url::Url::query_pairs`, which would decode (and its `www-form` encoding
/// would re-encode space as `+` rather than `%20` besides).
fn resolve_query_param(id: &ComponentId, r: &RequestMessage) -> Result<Vec<String>> {
    let name = id
        .query_param_name()
        .ok_or_else(|| Error::InvalidParameters("@query-param requires a name parameter".into()))?;

    let query = r.url.query().unwrap_or("");
    let values: Vec<String> = query
        .split('&')
        .filter(|segment| !segment.is_empty())
        .filter_map(|segment| match segment.split_once('=') {
            Some((k, v)) if k == name => Some(v.to_string()),
            None if segment == name => Some(String::new()),
            _ => None,
        })
        .collect();

    if values.is_empty() {
        return Err(Error::MissingComponent(format!(
            "@query-param {name:?} does not occur in the query string"
        )));
    }
    Ok(values)
}

fn resolve_field(id: &ComponentId, headers: &HeaderMap) -> Result<Vec<String>> {
    if id.bs() && id.sf() {
        return Err(Error::InvalidParameters(
            "bs cannot be combined with sf or key".into(),
        ));
    }

    let raw_values: Vec<String> = headers
        .get_all(id.name.as_str())
        .iter()
        .map(|v| v.to_str().unwrap_or_default().to_string())
        .collect();

    if raw_values.is_empty() {
        return Err(Error::MissingComponent(format!(
            "header {:?} is not present on the message",
            id.name
        )));
    }

    if id.bs() {
        let encoded: Vec<String> = raw_values
            .iter()
            .map(|v| format!(":{}:", BASE64.encode(v.as_bytes())))
            .collect();
        return Ok(vec![encoded.join(", ")]);
    }

    let normalized: Vec<String> = raw_values.iter().map(|v| normalize_field_value(v)).collect();
    let combined = sf::join_raw_values(&normalized);

    if id.sf() {
        if let Some(key) = id.key() {
            let dict = sf::parse_dictionary(&combined)?;
            let entry = dict.get(key).ok_or_else(|| {
                Error::MissingComponent(format!(
                    "dictionary key {key:?} not present in field {:?}",
                    id.name
                ))
            })?;
            return Ok(vec![serialize_entry(entry)?]);
        }
        return Ok(vec![serialize_structured_field(&combined)?]);
    }

    Ok(vec![combined])
}

fn serialize_entry(entry: &ListEntry) -> Result<String> {
    sf::serialize_list(&vec![entry.clone()])
}

/// Parse `combined` as whichever Structured-Field top-level type it
/// actually is (dictionary, list, or item) and re-serialise it canonically.
/// The `sf` parameter does not by itself say which type a field is defined
/// as, so this tries each form in turn.
fn serialize_structured_field(combined: &str) -> Result<String> {
    if let Ok(dict) = sf::parse_dictionary(combined) {
        return sf::serialize_dictionary(&dict);
    }
    if let Ok(list) = sf::parse_list(combined) {
        return sf::serialize_list(&list);
    }
    let item = sf::parse_item(combined)?;
    sf::serialize_item(&item)
}

/// Collapse internal whitespace runs (obs-fold / continued lines) to a
/// single space and trim leading/trailing whitespace.
fn normalize_field_value(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    let mut last_was_space = false;
    for ch in value.trim().chars() {
        if ch.is_whitespace() {
            if !last_was_space {
                out.push(' ');
            }
            last_was_space = true;
        } else {
            out.push(ch);
            last_was_space = false;
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use http::Method;
    use url::Url;

    fn req(url: &str) -> Message {
        Message::Request(RequestMessage::new(Method::GET, Url::parse(url).unwrap()))
    }

    #[test]
    fn authority_omits_default_port_and_lowercases() {
        let id = ComponentId::new("@authority");
        let m = req("HTTPS://Example.com:443/foo");
        assert_eq!(resolve(&id, &m).unwrap(), vec!["example.com".to_string()]);
    }

    #[test]
    fn authority_keeps_nondefault_port() {
        let id = ComponentId::new("@authority");
        let m = req("https://example.com:8443/foo");
        assert_eq!(resolve(&id, &m).unwrap(), vec!["example.com:8443".to_string()]);
    }

    #[test]
    fn query_absent_yields_bare_question_mark() {
        let id = ComponentId::new("@query");
        let m = req("https://example.com/foo");
        assert_eq!(resolve(&id, &m).unwrap(), vec!["?".to_string()]);
    }

    #[test]
    fn path_absent_normalises_to_slash() {
        let id = ComponentId::new("@path");
        let m = req("https://example.com");
        assert_eq!(resolve(&id, &m).unwrap(), vec!["/".to_string()]);
    }

    #[test]
    fn query_param_returns_named_value() {
        let id = ComponentId::new("@query-param").with_param("name", "Pet");
        let m = req("https://example.com/foo?param=Value&Pet=dog");
        assert_eq!(resolve(&id, &m).unwrap(), vec!["dog".to_string()]);
    }

    #[test]
    fn query_param_value_stays_percent_encoded() {
        let id = ComponentId::new("@query-param").with_param("name", "q");
        let m = req("https://example.com/foo?q=a%20b%2Bc");
        assert_eq!(resolve(&id, &m).unwrap(), vec!["a%20b%2Bc".to_string()]);
    }

    #[test]
    fn status_errors_on_request() {
        let id = ComponentId::new("@status");
        let m = req("https://example.com/foo");
        assert!(resolve(&id, &m).is_err());
    }
}
