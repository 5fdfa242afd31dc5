//! Base64 handling for user data and shutdown scripts
//!
//! Configuration may carry either plain text or text that is already base64
//! encoded. The API always receives base64. When a script body is empty the
//! API reports the SHA1 of the empty string instead, which must not show up
//! as a diff against an empty configured value.

use base64::{engine::general_purpose::STANDARD, Engine};

/// SHA1 of the empty string, returned by the API for an empty body
pub const EMPTY_SHA1: &str = "da39a3ee5e6b4b0d3255bfef95601890afd80709";

/// Treats any string that decodes as base64 as already encoded.
///
/// This is a heuristic: short strings made only of base64 alphabet
/// characters (for example "abcd" or a hex digest of suitable length) are
/// classified as encoded even when they were meant as plain text.
pub fn is_already_base64(raw: &str) -> bool {
    STANDARD.decode(raw).is_ok()
}

/// Encodes `raw` unless it already is base64, so applying it twice is the
/// same as applying it once
pub fn normalize_to_base64(raw: &str) -> String {
    if is_already_base64(raw) {
        raw.to_string()
    } else {
        STANDARD.encode(raw)
    }
}

/// Decodes a base64 body back to text; non-base64 input is returned as is
pub fn decode_base64(encoded: &str) -> String {
    match STANDARD.decode(encoded) {
        Ok(bytes) => String::from_utf8_lossy(&bytes).into_owned(),
        Err(_) => encoded.to_string(),
    }
}

/// Diff suppression for script bodies: an empty value and the empty-body
/// digest are the same thing, whichever side each comes from
pub fn suppress_empty_sha1(_key: &str, old: &str, new: &str) -> bool {
    matches!(
        (old, new),
        (EMPTY_SHA1, "") | ("", EMPTY_SHA1) | (EMPTY_SHA1, EMPTY_SHA1)
    ) || old == new
}

/// Diff suppression for user data: plain text in config and its base64 form
/// in state are the same script
pub fn suppress_user_data_diff(key: &str, old: &str, new: &str) -> bool {
    suppress_empty_sha1(key, old, new) || normalize_to_base64(old) == normalize_to_base64(new)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plain_text_is_encoded() {
        let encoded = normalize_to_base64("#!/bin/bash\necho hello");
        assert_eq!(decode_base64(&encoded), "#!/bin/bash\necho hello");
    }

    #[test]
    fn normalization_is_idempotent() {
        for input in ["", "echo hi", "#!/bin/sh\nexit 0\n", "ZWNobyBoaQ==", "a b c"] {
            let once = normalize_to_base64(input);
            assert_eq!(normalize_to_base64(&once), once, "input: {:?}", input);
        }
    }

    #[test]
    fn already_encoded_text_passes_through() {
        assert!(is_already_base64("ZWNobyBoaQ=="));
        assert_eq!(normalize_to_base64("ZWNobyBoaQ=="), "ZWNobyBoaQ==");
    }

    #[test]
    fn heuristic_misclassifies_base64_alphabet_text() {
        // "abcd" is meant as plain text but decodes as base64
        assert!(is_already_base64("abcd"));
        assert_eq!(normalize_to_base64("abcd"), "abcd");
    }

    #[test]
    fn empty_sha1_suppressed_in_both_directions() {
        assert!(suppress_empty_sha1("user_data", EMPTY_SHA1, ""));
        assert!(suppress_empty_sha1("user_data", "", EMPTY_SHA1));
    }

    #[test]
    fn real_changes_are_not_suppressed() {
        assert!(!suppress_empty_sha1("user_data", EMPTY_SHA1, "ZWNobyBoaQ=="));
        assert!(!suppress_empty_sha1("user_data", "", "ZWNobyBoaQ=="));
        assert!(!suppress_user_data_diff("user_data", "ZWNobyBoaQ==", "echo bye"));
    }

    #[test]
    fn plain_text_matches_its_encoded_state() {
        assert!(suppress_user_data_diff("user_data", "ZWNobyBoaQ==", "echo hi"));
        assert!(suppress_user_data_diff("user_data", EMPTY_SHA1, ""));
    }
}
