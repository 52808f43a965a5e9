//! The legacy cavage dialect (spec §4.4.2, §4.4.4): a single comma-separated
//! `Signature` header, legacy algorithm names, and a `headers` parameter
//! naming covered components with `(request-target)`-style parentheses
//! instead of `@`-prefixed derived names.

use base64::{engine::general_purpose::STANDARD as BASE64, Engine};
use http::header::{HeaderName, HeaderValue};

use crate::alg;
use crate::base::{self, cavage_line_name};
use crate::component::ComponentId;
use crate::error::{Error, Result};
use crate::message::Message;
use crate::params::{ParamValue, SignatureParams};
use crate::sign::{build_signature_params, SignConfig};
use crate::verify::{check_expiry, check_required, VerifyConfig};

/// Render the signature parameters and covered-components list as the body
/// of a cavage `Signature` header (everything but the trailing `signature=`
/// member, which the caller appends once it has the raw bytes).
fn render_params(sig_params: &SignatureParams, covered: &[ComponentId]) -> String {
    let mut parts = Vec::new();
    for (key, value) in sig_params.iter() {
        let (name, rendered) = match key.as_str() {
            "keyid" => ("keyId".to_string(), quote(value)),
            "alg" => (
                "algorithm".to_string(),
                format!("\"{}\"", alg::to_cavage(value.as_str().unwrap_or_default())),
            ),
            other => (other.to_string(), quote(value)),
        };
        parts.push(format!("{name}={rendered}"));
    }

    let headers = covered
        .iter()
        .map(cavage_line_name)
        .collect::<Vec<_>>()
        .join(" ");
    parts.push(format!("headers=\"{headers}\""));
    parts.join(", ")
}

fn quote(value: &ParamValue) -> String {
    match value {
        ParamValue::String(s) => format!("\"{s}\""),
        ParamValue::Integer(i) => i.to_string(),
        ParamValue::Boolean(b) => if *b { "1" } else { "0" }.to_string(),
        ParamValue::ByteSequence(b) => format!("\"{}\"", BASE64.encode(b)),
    }
}

/// Sign `message` and emit the single cavage `Signature` header.
pub fn sign(message: &Message, config: &SignConfig) -> Result<Message> {
    let sig_params = build_signature_params(config)?;
    let pairs =
        base::resolve_components_cavage(&config.fields, message, &sig_params, config.component_parser)?;
    let base_str = base::format_cavage(&pairs);
    let signature_bytes = config.key.sign(base_str.as_bytes())?;
    let signature_b64 = BASE64.encode(&signature_bytes);

    let mut header_value = render_params(&sig_params, &config.fields);
    header_value.push_str(&format!(", signature=\"{signature_b64}\""));

    let mut out = message.clone();
    out.headers_mut().insert(
        HeaderName::from_static("signature"),
        HeaderValue::from_str(&header_value).map_err(|e| Error::MalformedInput(e.to_string()))?,
    );
    Ok(out)
}

/// Split a cavage `Signature` header value into `(key, value)` pairs on
/// commas, respecting double-quoted values, and unquote each value.
fn parse_params(raw: &str) -> Vec<(String, String)> {
    let mut pairs = Vec::new();
    let mut depth_quote = false;
    let mut current = String::new();
    for ch in raw.chars() {
        match ch {
            '"' => {
                depth_quote = !depth_quote;
                current.push(ch);
            }
            ',' if !depth_quote => {
                pairs.push(current.trim().to_string());
                current.clear();
            }
            _ => current.push(ch),
        }
    }
    if !current.trim().is_empty() {
        pairs.push(current.trim().to_string());
    }

    pairs
        .into_iter()
        .filter_map(|pair| {
            let idx = pair.find('=')?;
            let key = pair[..idx].trim().to_string();
            let value = pair[idx + 1..].trim();
            let value = value.trim_matches('"').to_string();
            Some((key, value))
        })
        .collect()
}

fn parse_covered(headers_param: &str) -> Vec<ComponentId> {
    headers_param
        .split_whitespace()
        .map(|token| {
            if let Some(inner) = token.strip_prefix('(').and_then(|t| t.strip_suffix(')')) {
                ComponentId::new(format!("@{inner}"))
            } else {
                ComponentId::new(token.to_lowercase())
            }
        })
        .collect()
}

/// Verify a cavage-dialect `Signature` header. `Ok(None)` means the header
/// is absent (indeterminate); cavage has no multi-signature `all` mode, so
/// the result is otherwise a definite `true`/`false`.
pub fn verify(message: &Message, config: &VerifyConfig) -> Result<Option<bool>> {
    let raw = match message.headers().get("signature") {
        Some(v) => v
            .to_str()
            .map_err(|e| Error::MalformedInput(e.to_string()))?
            .to_string(),
        None => return Ok(None),
    };

    let params = parse_params(&raw);
    let mut sig_params = SignatureParams::new();
    let mut covered = Vec::new();
    let mut signature_bytes = Vec::new();

    for (key, value) in &params {
        match key.as_str() {
            "keyId" => {
                sig_params.insert("keyid", value.clone());
            }
            "algorithm" => {
                sig_params.insert("alg", alg::to_modern(value).to_string());
            }
            "created" => {
                let v: i64 = value
                    .parse()
                    .map_err(|_| Error::MalformedInput("created is not an integer".into()))?;
                sig_params.insert("created", v);
            }
            "expires" => {
                let v: i64 = value
                    .parse()
                    .map_err(|_| Error::MalformedInput("expires is not an integer".into()))?;
                sig_params.insert("expires", v);
            }
            "headers" => {
                covered = parse_covered(value);
            }
            "signature" => {
                signature_bytes = BASE64
                    .decode(value)
                    .map_err(|e| Error::MalformedInput(format!("signature is not base64: {e}")))?;
            }
            other => {
                sig_params.insert(other.to_string(), value.clone());
            }
        }
    }

    let key = match config.key_lookup.lookup(&sig_params)? {
        Some(key) => key,
        None => return Ok(Some(false)),
    };

    if let Some(alg) = sig_params.alg() {
        if let Some(accepted) = key.algorithms() {
            if !accepted.iter().any(|a| a == alg) {
                return Err(Error::UnsupportedAlgorithm(alg.to_string()));
            }
        }
    }

    check_required(&covered, &sig_params, config)?;
    check_expiry(&sig_params, config)?;

    let pairs =
        base::resolve_components_cavage(&covered, message, &sig_params, config.component_parser)?;
    let base_str = base::format_cavage(&pairs);

    let verified = key.verify(base_str.as_bytes(), &signature_bytes, &sig_params)?;
    Ok(Some(verified))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::key::SigningKey;
    use crate::message::{Message, RequestMessage};
    use http::Method;
    use url::Url;

    struct FixedKey;

    impl SigningKey for FixedKey {
        fn key_id(&self) -> Option<&str> {
            Some("rsa-key-1")
        }

        fn algorithm(&self) -> Option<&str> {
            Some("rsa-pss-sha512")
        }

        fn sign(&self, _base: &[u8]) -> Result<Vec<u8>> {
            Ok(b"sig-bytes".to_vec())
        }
    }

    #[test]
    fn cavage_signing_matches_seed_scenario_shape() {
        let key = FixedKey;
        let config = SignConfig::new(&key)
            .with_params(vec![
                "keyid".to_string(),
                "alg".to_string(),
                "created".to_string(),
                "expires".to_string(),
            ])
            .with_fields(vec![
                ComponentId::new("@request-target"),
                ComponentId::new("@created"),
                ComponentId::new("@expires"),
                ComponentId::new("host"),
                ComponentId::new("digest"),
                ComponentId::new("content-length"),
            ])
            .override_param("keyid", "rsa-key-1")
            .override_param("alg", "hs2019")
            .override_param("created", 1402170695i64)
            .override_param("expires", 1402170995i64);

        let mut message = Message::Request(RequestMessage::new(
            Method::POST,
            Url::parse("https://example.org/foo").unwrap(),
        ));
        message.headers_mut().insert(
            HeaderName::from_static("host"),
            HeaderValue::from_static("example.org"),
        );
        message.headers_mut().insert(
            HeaderName::from_static("digest"),
            HeaderValue::from_static("SHA-256=X48E9qOokqqrvdts8nOJRJN3OWDUoyWxBf7kbu9DBPE="),
        );
        message.headers_mut().insert(
            HeaderName::from_static("content-length"),
            HeaderValue::from_static("18"),
        );

        let signed = sign(&message, &config).unwrap();
        let header = signed.headers().get("signature").unwrap().to_str().unwrap();
        assert!(header.starts_with(
            "keyId=\"rsa-key-1\", algorithm=\"hs2019\", created=1402170695, expires=1402170995, \
             headers=\"(request-target) (created) (expires) host digest content-length\""
        ));
    }
}
