// src/util/obfuscation.rs
//! Reversible encoding for credentials at rest.
//!
//! This is obfuscation, not cryptography: it keeps the raw key out of casual
//! view of the storage file, nothing more. All in-memory and API-call uses
//! operate on the decoded value.

use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;

/// Prefix marking an encoded credential in storage.
pub const ENCODED_PREFIX: &str = "ENCODED:";

pub fn is_encoded(value: &str) -> bool {
    value.starts_with(ENCODED_PREFIX)
}

/// Encode a plaintext credential for storage. Idempotent: an already-encoded
/// value is returned unchanged, as is the empty string.
pub fn encode_credential(plain: &str) -> String {
    if plain.is_empty() || is_encoded(plain) {
        return plain.to_string();
    }
    format!("{}{}", ENCODED_PREFIX, STANDARD.encode(plain.as_bytes()))
}

/// Decode a stored credential. A value without the marker prefix is treated
/// as plaintext; a marked value that fails to decode degrades to being
/// returned as-is rather than failing the read.
pub fn decode_credential(stored: &str) -> String {
    if !is_encoded(stored) {
        return stored.to_string();
    }

    let encoded = &stored[ENCODED_PREFIX.len()..];
    match STANDARD
        .decode(encoded)
        .ok()
        .and_then(|bytes| String::from_utf8(bytes).ok())
    {
        Some(plain) => plain,
        None => stored.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn given_printable_credential_when_round_tripped_then_unchanged() {
        for key in ["sk-abcdef1234567890", "密钥-with-unicode", "a b c!@#$%^&*()"] {
            assert_eq!(decode_credential(&encode_credential(key)), key);
        }
    }

    #[test]
    fn given_plaintext_value_when_decoded_then_passed_through() {
        assert_eq!(decode_credential("sk-plain"), "sk-plain");
        assert_eq!(decode_credential(""), "");
    }

    #[test]
    fn given_already_encoded_value_when_encoded_again_then_unchanged() {
        let once = encode_credential("sk-abc");
        let twice = encode_credential(&once);
        assert_eq!(once, twice);
    }

    #[test]
    fn given_corrupt_encoded_value_when_decoded_then_returned_as_is() {
        let corrupt = format!("{}%%%not-base64%%%", ENCODED_PREFIX);
        assert_eq!(decode_credential(&corrupt), corrupt);
    }
}
