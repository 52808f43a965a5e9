//! The pluggable cryptographic seam (spec §6.2): `SigningKey`,
//! `VerifyingKey`, and `KeyLookup`. This crate never implements a
//! cryptographic primitive itself beyond the small convenience adapters in
//! [`crate::crypto`] — these traits are the contract external key material
//! is plugged in through.

use crate::error::Result;
use crate::params::SignatureParams;

/// A key capable of producing a signature over a signature base.
pub trait SigningKey {
    /// The `keyid` to carry in the signature parameters, if any.
    fn key_id(&self) -> Option<&str> {
        None
    }

    /// The `alg` to carry in the signature parameters, if any.
    fn algorithm(&self) -> Option<&str> {
        None
    }

    /// Sign `base` and return the raw signature bytes.
    fn sign(&self, base: &[u8]) -> Result<Vec<u8>>;
}

/// A key capable of verifying a signature over a reconstructed signature
/// base, given the signature parameters that accompanied it.
pub trait VerifyingKey {
    /// The `keyid` this key is known by, if any.
    fn key_id(&self) -> Option<&str> {
        None
    }

    /// The set of `alg` values this key accepts. `None` means "accept any
    /// algorithm the signature claims" — callers that care should still
    /// pin this down via `VerifyConfig` policy.
    fn algorithms(&self) -> Option<Vec<String>> {
        None
    }

    /// Verify `signature` over `base`. `params` are the signature
    /// parameters that accompanied the signature, for keys whose
    /// verification depends on them (e.g. versioned algorithms).
    fn verify(&self, base: &[u8], signature: &[u8], params: &SignatureParams) -> Result<bool>;
}

/// Resolves a verifying key from the signature parameters of a single
/// label during verification.
pub trait KeyLookup {
    fn lookup(&self, params: &SignatureParams) -> Result<Option<Box<dyn VerifyingKey>>>;
}

impl<F> KeyLookup for F
where
    F: Fn(&SignatureParams) -> Result<Option<Box<dyn VerifyingKey>>>,
{
    fn lookup(&self, params: &SignatureParams) -> Result<Option<Box<dyn VerifyingKey>>> {
        self(params)
    }
}
