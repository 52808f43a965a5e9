//! Signature base construction (spec §4.3): map an ordered list of
//! component identifiers to `(canonical-identifier, values)` pairs and
//! format them into the exact byte string presented to the signing
//! primitive. Byte-exactness is the security contract here — this module
//! is the one place that string formatting of the base happens.

use sfv::{InnerList, Item, ListEntry, Parameters};

use crate::component::{self, request_target, ComponentId};
use crate::error::{Error, Result};
use crate::message::Message;
use crate::params::SignatureParams;
use crate::sf;

/// A hook that can override resolution for a specific identifier. Returning
/// `None` falls through to the built-in resolver.
pub type ComponentParserFn<'a> =
    dyn Fn(&ComponentId, &Message) -> Option<Result<Vec<String>>> + 'a;

/// The wire dialect controls both base formatting and a handful of
/// component semantics (`@request-target`, `@created`, `@expires` in
/// cavage) that differ from the httpbis table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Dialect {
    Httpbis,
    Cavage,
}

/// Resolve every requested component identifier (httpbis semantics) into
/// its `(id, values)` pair, dropping any `@signature-params` entry.
pub fn resolve_components(
    components: &[ComponentId],
    message: &Message,
    component_parser: Option<&ComponentParserFn>,
) -> Result<Vec<(ComponentId, Vec<String>)>> {
    let mut pairs = Vec::with_capacity(components.len());
    for id in components {
        if id.name == "@signature-params" {
            continue;
        }
        let values = resolve_one(id, message, component_parser)?;
        pairs.push((id.clone(), values));
    }
    Ok(pairs)
}

/// As [`resolve_components`], but with the cavage dialect's special
/// handling of `@request-target` (method-prefixed), `@created`, and
/// `@expires` (drawn from the signature parameters, not the message).
pub fn resolve_components_cavage(
    components: &[ComponentId],
    message: &Message,
    sig_params: &SignatureParams,
    component_parser: Option<&ComponentParserFn>,
) -> Result<Vec<(ComponentId, Vec<String>)>> {
    let mut pairs = Vec::with_capacity(components.len());
    for id in components {
        if id.name == "@signature-params" {
            continue;
        }
        if let Some(parser) = component_parser {
            if let Some(result) = parser(id, message) {
                pairs.push((id.clone(), result?));
                continue;
            }
        }
        let values = match id.name.as_str() {
            "@created" => {
                let v = sig_params.created().ok_or_else(|| {
                    Error::MissingComponent("(created) requires a created signature parameter".into())
                })?;
                vec![v.to_string()]
            }
            "@expires" => {
                let v = sig_params.expires().ok_or_else(|| {
                    Error::MissingComponent("(expires) requires an expires signature parameter".into())
                })?;
                vec![v.to_string()]
            }
            "@request-target" => {
                let req = message
                    .as_request()
                    .or_else(|| message.as_response().and_then(|r| r.bound_request.as_ref()))
                    .ok_or_else(|| {
                        Error::MissingComponent("(request-target) requires a request".into())
                    })?;
                let method = req.method.as_str().to_lowercase();
                vec![format!("{method} {}", request_target(req))]
            }
            _ => component::resolve(id, message)?,
        };
        pairs.push((id.clone(), values));
    }
    Ok(pairs)
}

fn resolve_one(
    id: &ComponentId,
    message: &Message,
    component_parser: Option<&ComponentParserFn>,
) -> Result<Vec<String>> {
    if let Some(parser) = component_parser {
        if let Some(result) = parser(id, message) {
            return result;
        }
    }
    component::resolve(id, message)
}

/// Format the httpbis signature base: one `"id": value` line per value,
/// followed by the `"@signature-params"` line carrying the covered-
/// components inner list and the signature parameters.
pub fn format_httpbis(
    pairs: &[(ComponentId, Vec<String>)],
    sig_params: &SignatureParams,
) -> Result<String> {
    let mut lines = Vec::new();
    for (id, values) in pairs {
        let canon = id.canonical_string()?;
        for value in values {
            lines.push(format!("{canon}: {value}"));
        }
    }

    let items: Vec<Item> = pairs.iter().map(|(id, _)| id.to_sf_item()).collect();
    let mut params = Parameters::new();
    for (key, value) in sig_params.iter() {
        params.insert(key.clone(), value.to_bare_item());
    }
    let inner_list = InnerList::with_params(items, params);
    let serialized = sf::serialize_list(&vec![ListEntry::InnerList(inner_list)])?;
    lines.push(format!("\"@signature-params\": {serialized}"));

    Ok(lines.join("\n"))
}

/// Format the cavage signature base: `(name): value` / `lowercased-name:
/// value` lines, joined with `\n`, with no trailing `@signature-params`
/// line.
pub fn format_cavage(pairs: &[(ComponentId, Vec<String>)]) -> String {
    let mut lines = Vec::new();
    for (id, values) in pairs {
        let name = cavage_line_name(id);
        for value in values {
            lines.push(format!("{name}: {value}"));
        }
    }
    lines.join("\n")
}

pub(crate) fn cavage_line_name(id: &ComponentId) -> String {
    if let Some(bare) = id.name.strip_prefix('@') {
        format!("({bare})")
    } else {
        id.name.to_lowercase()
    }
}

/// Build the Structured-Field Inner List representing the covered
/// components plus signature parameters, serialised exactly as it appears
/// in `Signature-Input` (and as the `@signature-params` line's value).
pub fn covered_components_inner_list(
    components: &[ComponentId],
    sig_params: &SignatureParams,
) -> InnerList {
    let items: Vec<Item> = components.iter().map(ComponentId::to_sf_item).collect();
    let mut params = Parameters::new();
    for (key, value) in sig_params.iter() {
        params.insert(key.clone(), value.to_bare_item());
    }
    InnerList::with_params(items, params)
}
