//! The error taxonomy shared by every fallible operation in this crate.
//!
//! Variants map 1:1 onto the error kinds a signing or verifying call can
//! raise; nothing in this crate panics or swallows an error on its way back
//! to the caller.

use thiserror::Error;

/// Every error this crate can return.
#[derive(Debug, Error)]
pub enum Error {
    /// A Structured-Field parse failure, a malformed `Signature`/`Signature-Input`
    /// pair, a signature value that is not a byte sequence, or an incomplete
    /// header pair.
    #[error("malformed input: {0}")]
    MalformedInput(String),

    /// A requested component is absent from the message (missing header,
    /// `@query-param` name not found, `@status` on a request, or a
    /// request-only derived component on a response without `req`).
    #[error("missing component: {0}")]
    MissingComponent(String),

    /// Incompatible or missing component parameters (`bs` with `sf`/`key`,
    /// `key` without `sf`, `@query-param` without `name`).
    #[error("invalid parameters: {0}")]
    InvalidParameters(String),

    /// A signer or verifier constructor was asked for an algorithm it
    /// cannot implement.
    #[error("unknown algorithm: {0}")]
    UnknownAlgorithm(String),

    /// The verifying key does not accept the `alg` carried by the signature.
    #[error("unsupported algorithm: {0}")]
    UnsupportedAlgorithm(String),

    /// Verification with `all` set: key lookup returned no key for a label.
    #[error("unknown key for label {0:?}")]
    UnknownKey(String),

    /// A signature is missing a required parameter or does not cover a
    /// required field.
    #[error("unacceptable signature: {0}")]
    UnacceptableSignature(String),

    /// `created`/`expires` fall outside the acceptable window once
    /// tolerance, `max_age`, and `not_after` are applied.
    #[error("expired: {0}")]
    Expired(String),

    /// The cryptographic primitive rejected the signature or failed.
    #[error("verification failed: {0}")]
    VerificationFailed(String),
}

pub type Result<T> = std::result::Result<T, Error>;
