//! The algorithm name table bridging the modern httpbis `alg` registry and
//! the cavage draft's `algorithm` strings (spec §4.1, Design Notes). Cavage
//! predates the structured registry and named things after the primitive
//! rather than the signature scheme, so the two dialects disagree on what a
//! given key material + hash combination is called — `hs2019` is cavage's
//! catch-all for "whatever the key says", which this table maps to
//! `rsa-pss-sha512` since that was the only algorithm ever paired with it in
//! practice.

/// `(modern, legacy)` pairs. Lookups fall through unchanged when a name
/// isn't in the table, since both dialects also carry algorithms this crate
/// has no opinion on.
const ALIASES: &[(&str, &str)] = &[
    ("rsa-pss-sha512", "hs2019"),
    ("rsa-v1_5-sha256", "rsa-sha256"),
    ("rsa-v1_5-sha1", "rsa-sha1"),
    ("ecdsa-p256-sha256", "ecdsa-sha256"),
    ("hmac-sha256", "hmac-sha256"),
];

/// Map a modern httpbis `alg` value to its cavage `algorithm` spelling.
/// Returns the input unchanged if there is no legacy spelling on record.
pub fn to_cavage(modern: &str) -> &str {
    ALIASES
        .iter()
        .find(|(m, _)| *m == modern)
        .map(|(_, legacy)| *legacy)
        .unwrap_or(modern)
}

/// Map a cavage `algorithm` value to its modern httpbis `alg` spelling.
/// Returns the input unchanged if there is no modern spelling on record.
pub fn to_modern(legacy: &str) -> &str {
    ALIASES
        .iter()
        .find(|(_, l)| *l == legacy)
        .map(|(modern, _)| *modern)
        .unwrap_or(legacy)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hs2019_maps_to_rsa_pss_sha512() {
        assert_eq!(to_modern("hs2019"), "rsa-pss-sha512");
        assert_eq!(to_cavage("rsa-pss-sha512"), "hs2019");
    }

    #[test]
    fn unknown_algorithm_passes_through() {
        assert_eq!(to_modern("ed25519"), "ed25519");
        assert_eq!(to_cavage("ed25519"), "ed25519");
    }
}
