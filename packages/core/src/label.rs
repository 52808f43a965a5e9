//! Signature label selection (spec §4.4.1): every signature added to a
//! message needs a label unique among whatever `Signature`/`Signature-Input`
//! dictionary entries are already present.

use sfv::Dictionary;

/// Pick a label for a new signature. `preferred`, if given and not already
/// taken, is used as-is; otherwise the bare `sig` is tried first, then the
/// smallest non-negative integer suffix (`sig0`, `sig1`, …) not already
/// present in either existing dictionary.
pub fn choose_label(
    preferred: Option<&str>,
    existing_signature: &Dictionary,
    existing_signature_input: &Dictionary,
) -> String {
    let taken = |label: &str| {
        existing_signature.get(label).is_some() || existing_signature_input.get(label).is_some()
    };

    if let Some(label) = preferred {
        if !taken(label) {
            return label.to_string();
        }
    }

    if preferred.is_none() && !taken("sig") {
        return "sig".to_string();
    }

    let mut n: u32 = 0;
    loop {
        let candidate = format!("sig{n}");
        if !taken(&candidate) {
            return candidate;
        }
        n += 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn picks_bare_sig_when_empty() {
        let empty = Dictionary::new();
        assert_eq!(choose_label(None, &empty, &empty), "sig");
    }

    #[test]
    fn falls_back_to_numbered_sig_when_bare_taken() {
        let sig = crate::sf::parse_dictionary("sig=:AA==:").unwrap();
        let empty = Dictionary::new();
        assert_eq!(choose_label(None, &sig, &empty), "sig0");
    }

    #[test]
    fn skips_taken_labels() {
        let sig =
            crate::sf::parse_dictionary("sig=:AA==:, sig0=:AA==:, sig1=:AA==:, sig2=:AA==:")
                .unwrap();
        let input = Dictionary::new();
        assert_eq!(choose_label(None, &sig, &input), "sig3");
    }

    #[test]
    fn preferred_label_used_when_free() {
        let empty = Dictionary::new();
        assert_eq!(choose_label(Some("transport"), &empty, &empty), "transport");
    }

    #[test]
    fn preferred_label_falls_back_when_taken() {
        let sig = crate::sf::parse_dictionary("transport=:AA==:").unwrap();
        let empty = Dictionary::new();
        assert_eq!(choose_label(Some("transport"), &sig, &empty), "sig0");
    }
}
