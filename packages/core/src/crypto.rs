//! Convenience cryptographic primitives (spec §1: "a thin convenience layer
//! may wrap platform crypto but is not the hard part"). Ed25519 via
//! `ed25519-dalek` and HMAC-SHA256 via `hmac`/`sha2` are the two primitives
//! this crate implements directly; everything else (RSA-PSS, RSA-PKCS1v1.5,
//! ECDSA) is consumed only through the [`crate::key`] traits.

use ed25519_dalek::{Signature, Signer, Verifier};
use hmac::{Hmac, Mac};
use sha2::Sha256;

use crate::error::{Error, Result};
use crate::key::{SigningKey, VerifyingKey};
use crate::params::SignatureParams;

/// An Ed25519 signing key, optionally carrying a `keyid`.
pub struct Ed25519SigningKey {
    id: Option<String>,
    inner: ed25519_dalek::SigningKey,
}

impl Ed25519SigningKey {
    pub fn new(inner: ed25519_dalek::SigningKey) -> Self {
        Self { id: None, inner }
    }

    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }

    pub fn verifying_key(&self) -> Ed25519VerifyingKey {
        Ed25519VerifyingKey {
            id: self.id.clone(),
            inner: self.inner.verifying_key(),
        }
    }
}

impl SigningKey for Ed25519SigningKey {
    fn key_id(&self) -> Option<&str> {
        self.id.as_deref()
    }

    fn algorithm(&self) -> Option<&str> {
        Some("ed25519")
    }

    fn sign(&self, base: &[u8]) -> Result<Vec<u8>> {
        Ok(self.inner.sign(base).to_bytes().to_vec())
    }
}

/// The Ed25519 verifying half of [`Ed25519SigningKey`].
pub struct Ed25519VerifyingKey {
    id: Option<String>,
    inner: ed25519_dalek::VerifyingKey,
}

impl Ed25519VerifyingKey {
    pub fn new(inner: ed25519_dalek::VerifyingKey) -> Self {
        Self { id: None, inner }
    }

    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }
}

impl VerifyingKey for Ed25519VerifyingKey {
    fn key_id(&self) -> Option<&str> {
        self.id.as_deref()
    }

    fn algorithms(&self) -> Option<Vec<String>> {
        Some(vec!["ed25519".to_string()])
    }

    fn verify(&self, base: &[u8], signature: &[u8], _params: &SignatureParams) -> Result<bool> {
        let signature = Signature::from_slice(signature)
            .map_err(|e| Error::VerificationFailed(format!("malformed ed25519 signature: {e}")))?;
        Ok(self.inner.verify(base, &signature).is_ok())
    }
}

/// A symmetric HMAC-SHA256 key, used for both signing and verifying.
pub struct HmacSha256Key {
    id: Option<String>,
    secret: Vec<u8>,
}

impl HmacSha256Key {
    pub fn new(secret: impl Into<Vec<u8>>) -> Self {
        Self {
            id: None,
            secret: secret.into(),
        }
    }

    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }

    fn mac(&self) -> Result<Hmac<Sha256>> {
        Hmac::<Sha256>::new_from_slice(&self.secret)
            .map_err(|e| Error::UnknownAlgorithm(format!("hmac-sha256 key: {e}")))
    }
}

impl SigningKey for HmacSha256Key {
    fn key_id(&self) -> Option<&str> {
        self.id.as_deref()
    }

    fn algorithm(&self) -> Option<&str> {
        Some("hmac-sha256")
    }

    fn sign(&self, base: &[u8]) -> Result<Vec<u8>> {
        let mut mac = self.mac()?;
        mac.update(base);
        Ok(mac.finalize().into_bytes().to_vec())
    }
}

impl VerifyingKey for HmacSha256Key {
    fn key_id(&self) -> Option<&str> {
        self.id.as_deref()
    }

    fn algorithms(&self) -> Option<Vec<String>> {
        Some(vec!["hmac-sha256".to_string()])
    }

    fn verify(&self, base: &[u8], signature: &[u8], _params: &SignatureParams) -> Result<bool> {
        let mut mac = self.mac()?;
        mac.update(base);
        Ok(mac.verify_slice(signature).is_ok())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hmac_round_trips() {
        let key = HmacSha256Key::new(b"a shared secret".to_vec());
        let base = b"\"@method\": POST\n\"@signature-params\": ()";
        let signature = SigningKey::sign(&key, base).unwrap();
        let params = SignatureParams::new();
        assert!(VerifyingKey::verify(&key, base, &signature, &params).unwrap());
        assert!(!VerifyingKey::verify(&key, b"tampered", &signature, &params).unwrap());
    }
}
