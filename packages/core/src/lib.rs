//! `message-signatures` implements the IETF HTTP Message Signatures family:
//! the modern **httpbis** dialect (RFC 9421, Structured-Field `Signature`
//! and `Signature-Input` headers) and the legacy **cavage** dialect (a
//! single comma-separated `Signature` header).
//!
//! The crate is a pure, I/O-free pipeline over four layers, composed
//! leaves-first:
//!
//! | Module | Purpose |
//! |--------|---------|
//! | [`sf`] | RFC 8941 Structured Field Values: parse/serialise Items, Lists, Dictionaries, Inner Lists |
//! | [`component`] | Component identifiers and the resolver: identifier + message → ordered string values |
//! | [`base`] | Signature base construction: components → the exact byte string a key signs |
//! | [`sign`] / [`verify`] | The httpbis sign/verify orchestrators |
//! | [`cavage`] | The legacy cavage dialect's sign/verify orchestrators |
//! | [`key`] | The pluggable `SigningKey`/`VerifyingKey`/`KeyLookup` seam |
//! | [`crypto`] | Convenience Ed25519 and HMAC-SHA256 key implementations |
//!
//! This crate never touches a socket, parses a request line, or computes a
//! content digest — see each module's documentation for its exact contract.

pub mod alg;
pub mod base;
pub mod cavage;
pub mod component;
pub mod crypto;
pub mod error;
pub mod key;
pub mod label;
pub mod message;
pub mod params;
pub mod sf;
pub mod sign;
pub mod verify;

pub use component::ComponentId;
pub use error::{Error, Result};
pub use key::{KeyLookup, SigningKey, VerifyingKey};
pub use message::{Message, RequestMessage, ResponseMessage};
pub use params::{ParamValue, SignatureParams};
pub use sign::{sign, ParamOverride, SignConfig};
pub use verify::{verify, VerifyConfig};
