//! Shared helpers for the HTTP Message Signatures conformance suite.
//!
//! Provides small fixed-output key stand-ins so the seed scenarios can
//! assert exact base/header bytes without depending on a particular
//! cryptographic backend, plus a couple of request/response builders the
//! tests reuse.

use http::Method;
use message_signatures::{
    Error, Message, RequestMessage, ResponseMessage, Result, SignatureParams, SigningKey,
    VerifyingKey,
};
use url::Url;

/// A key whose `sign` call always returns a fixed byte string, for
/// reproducing the spec's literal seed-scenario expectations.
pub struct FixedSigningKey {
    pub id: Option<String>,
    pub alg: Option<String>,
    pub output: Vec<u8>,
}

impl SigningKey for FixedSigningKey {
    fn key_id(&self) -> Option<&str> {
        self.id.as_deref()
    }

    fn algorithm(&self) -> Option<&str> {
        self.alg.as_deref()
    }

    fn sign(&self, _base: &[u8]) -> Result<Vec<u8>> {
        Ok(self.output.clone())
    }
}

/// A verifying key that accepts exactly one expected signature value,
/// independent of the base it is checked against.
pub struct ExpectSignatureKey {
    pub expected: Vec<u8>,
}

impl VerifyingKey for ExpectSignatureKey {
    fn verify(&self, _base: &[u8], signature: &[u8], _params: &SignatureParams) -> Result<bool> {
        Ok(signature == self.expected.as_slice())
    }
}

/// `key_lookup` that always returns `Err` — used to assert a path never
/// reaches key resolution.
pub fn unreachable_lookup(_: &SignatureParams) -> Result<Option<Box<dyn VerifyingKey>>> {
    Err(Error::UnknownKey("lookup should not have been called".into()))
}

pub fn post(url: &str) -> Message {
    Message::Request(RequestMessage::new(Method::POST, Url::parse(url).unwrap()))
}

pub fn get(url: &str) -> Message {
    Message::Request(RequestMessage::new(Method::GET, Url::parse(url).unwrap()))
}

pub fn response(status: u16) -> Message {
    Message::Response(ResponseMessage::new(status))
}
