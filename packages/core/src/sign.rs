//! The httpbis signing orchestrator (spec §4.4.1): assemble signature
//! parameters, build the base, call the key, and augment the message's
//! `Signature`/`Signature-Input` dictionaries.

use std::time::{SystemTime, UNIX_EPOCH};

use http::header::{HeaderName, HeaderValue};
use http::HeaderMap;
use sfv::{BareItem, Dictionary, Item, ListEntry};

use crate::base::{self, ComponentParserFn};
use crate::component::ComponentId;
use crate::error::{Error, Result};
use crate::key::SigningKey;
use crate::label;
use crate::message::Message;
use crate::params::{ParamValue, SignatureParams};
use crate::sf;

/// Override for a single signature parameter: an explicit value, or an
/// explicit null that suppresses the parameter (and, for `created`,
/// `expires` too unless `expires` carries its own override).
#[derive(Debug, Clone)]
pub enum ParamOverride {
    Value(ParamValue),
    Null,
}

/// Signing configuration (spec §6.4). Build with [`SignConfig::new`] and the
/// builder methods; everything but `key` has a spec-mandated default.
pub struct SignConfig<'a> {
    pub key: &'a dyn SigningKey,
    pub label: Option<String>,
    pub params: Vec<String>,
    pub fields: Vec<ComponentId>,
    pub param_values: Vec<(String, ParamOverride)>,
    pub component_parser: Option<&'a ComponentParserFn<'a>>,
}

impl<'a> SignConfig<'a> {
    pub fn new(key: &'a dyn SigningKey) -> Self {
        Self {
            key,
            label: None,
            params: vec![
                "keyid".to_string(),
                "alg".to_string(),
                "created".to_string(),
                "expires".to_string(),
            ],
            fields: Vec::new(),
            param_values: Vec::new(),
            component_parser: None,
        }
    }

    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    pub fn with_params(mut self, params: Vec<String>) -> Self {
        self.params = params;
        self
    }

    pub fn with_fields(mut self, fields: Vec<ComponentId>) -> Self {
        self.fields = fields;
        self
    }

    pub fn override_param(mut self, name: impl Into<String>, value: impl Into<ParamValue>) -> Self {
        self.param_values
            .push((name.into(), ParamOverride::Value(value.into())));
        self
    }

    pub fn suppress_param(mut self, name: impl Into<String>) -> Self {
        self.param_values.push((name.into(), ParamOverride::Null));
        self
    }

    pub fn with_component_parser(mut self, parser: &'a ComponentParserFn<'a>) -> Self {
        self.component_parser = Some(parser);
        self
    }

    fn find_override(&self, name: &str) -> Option<&ParamOverride> {
        self.param_values
            .iter()
            .find(|(k, _)| k == name)
            .map(|(_, v)| v)
    }
}

fn now_secs() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_secs() as i64
}

pub(crate) fn build_signature_params(config: &SignConfig) -> Result<SignatureParams> {
    let mut sig_params = SignatureParams::new();
    let mut created_value: Option<i64> = None;
    let mut created_suppressed = false;

    for name in &config.params {
        match name.as_str() {
            "created" => match config.find_override("created") {
                Some(ParamOverride::Null) => created_suppressed = true,
                Some(ParamOverride::Value(v)) => {
                    let v = v
                        .as_integer()
                        .ok_or_else(|| Error::InvalidParameters("created must be an integer".into()))?;
                    created_value = Some(v);
                    sig_params.insert("created", v);
                }
                None => {
                    let now = now_secs();
                    created_value = Some(now);
                    sig_params.insert("created", now);
                }
            },
            "expires" => match config.find_override("expires") {
                Some(ParamOverride::Null) => {}
                Some(ParamOverride::Value(v)) => {
                    let v = v
                        .as_integer()
                        .ok_or_else(|| Error::InvalidParameters("expires must be an integer".into()))?;
                    sig_params.insert("expires", v);
                }
                None => {
                    if !created_suppressed {
                        if let Some(created) = created_value {
                            sig_params.insert("expires", created + 300);
                        }
                    }
                }
            },
            "keyid" => {
                let value = match config.find_override("keyid") {
                    Some(ParamOverride::Null) => None,
                    Some(ParamOverride::Value(v)) => v.as_str().map(str::to_string),
                    None => config.key.key_id().map(str::to_string),
                };
                if let Some(v) = value {
                    sig_params.insert("keyid", v);
                }
            }
            "alg" => {
                let value = match config.find_override("alg") {
                    Some(ParamOverride::Null) => None,
                    Some(ParamOverride::Value(v)) => v.as_str().map(str::to_string),
                    None => config.key.algorithm().map(str::to_string),
                };
                if let Some(v) = value {
                    sig_params.insert("alg", v);
                }
            }
            other => match config.find_override(other) {
                Some(ParamOverride::Null) | None => {}
                Some(ParamOverride::Value(v)) => {
                    sig_params.insert(other.to_string(), v.clone());
                }
            },
        }
    }

    Ok(sig_params)
}

pub(crate) fn existing_dictionary(headers: &HeaderMap, name: &str) -> Result<Dictionary> {
    let raw: Vec<String> = headers
        .get_all(name)
        .iter()
        .map(|v| v.to_str().unwrap_or_default().to_string())
        .collect();
    if raw.is_empty() {
        return Ok(Dictionary::new());
    }
    sf::parse_dictionary(&sf::join_raw_values(&raw))
}

/// Sign `message`, returning a fresh message with `Signature` and
/// `Signature-Input` set (existing dictionary entries are preserved).
pub fn sign(message: &Message, config: &SignConfig) -> Result<Message> {
    let sig_params = build_signature_params(config)?;
    let pairs = base::resolve_components(&config.fields, message, config.component_parser)?;
    let base_str = base::format_httpbis(&pairs, &sig_params)?;
    tracing::trace!(base = %base_str, "built httpbis signature base");
    let signature_bytes = config.key.sign(base_str.as_bytes())?;

    let mut out = message.clone();
    let mut sig_dict = existing_dictionary(out.headers(), "signature")?;
    let mut input_dict = existing_dictionary(out.headers(), "signature-input")?;

    let label = label::choose_label(config.label.as_deref(), &sig_dict, &input_dict);
    tracing::debug!(%label, keyid = ?config.key.key_id(), "signed message");

    let inner_list = base::covered_components_inner_list(&config.fields, &sig_params);
    sig_dict.insert(
        label.clone(),
        ListEntry::Item(Item::new(BareItem::ByteSeq(signature_bytes))),
    );
    input_dict.insert(label, ListEntry::InnerList(inner_list));

    let sig_header = sf::serialize_dictionary(&sig_dict)?;
    let input_header = sf::serialize_dictionary(&input_dict)?;

    out.headers_mut().insert(
        HeaderName::from_static("signature"),
        HeaderValue::from_str(&sig_header).map_err(|e| Error::MalformedInput(e.to_string()))?,
    );
    out.headers_mut().insert(
        HeaderName::from_static("signature-input"),
        HeaderValue::from_str(&input_header).map_err(|e| Error::MalformedInput(e.to_string()))?,
    );

    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::message::{Message, ResponseMessage};

    struct FixedKey {
        id: &'static str,
        alg: &'static str,
        output: Vec<u8>,
    }

    impl SigningKey for FixedKey {
        fn key_id(&self) -> Option<&str> {
            Some(self.id)
        }

        fn algorithm(&self) -> Option<&str> {
            Some(self.alg)
        }

        fn sign(&self, _base: &[u8]) -> Result<Vec<u8>> {
            Ok(self.output.clone())
        }
    }

    #[test]
    fn empty_covered_signing_matches_seed_scenario() {
        let key = FixedKey {
            id: "test-key-rsa-pss",
            alg: "rsa-pss-sha512",
            output: b"a fake signature".to_vec(),
        };
        let config = SignConfig::new(&key)
            .with_params(vec!["created".to_string(), "keyid".to_string()])
            .override_param("created", 1618884473i64)
            .override_param("keyid", "test-key-rsa-pss");

        let message = Message::Response(ResponseMessage::new(200));
        let signed = sign(&message, &config).unwrap();

        let sig = signed.headers().get("signature").unwrap().to_str().unwrap();
        assert_eq!(sig, "sig=:YSBmYWtlIHNpZ25hdHVyZQ==:");

        let input = signed
            .headers()
            .get("signature-input")
            .unwrap()
            .to_str()
            .unwrap();
        assert_eq!(input, "sig=();created=1618884473;keyid=\"test-key-rsa-pss\"");
    }

    #[test]
    fn label_avoids_existing_entries() {
        let key = FixedKey {
            id: "k",
            alg: "ed25519",
            output: b"xx".to_vec(),
        };
        let mut message = Message::Response(ResponseMessage::new(200));
        message.headers_mut().insert(
            HeaderName::from_static("signature"),
            HeaderValue::from_static("sig=:AA==:"),
        );
        let config = SignConfig::new(&key).with_params(vec![]);
        let signed = sign(&message, &config).unwrap();
        let sig = signed.headers().get("signature").unwrap().to_str().unwrap();
        assert!(sig.contains("sig0="));
        assert!(sig.contains("sig=:AA==:"));
    }
}
