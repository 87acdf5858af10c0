//! Identities written by humans: a 64-char hex string, or a label that is
//! hashed with [`Identity::derive`].
//!
//! Config files and operation scripts accept both forms; serialization always
//! writes hex, which reads back as the same identity.

use clockwork_core::types::Identity;
use serde::{Deserialize, Deserializer};

/// Parse `s` as raw hex when it is exactly 32 bytes of hex, else as a label.
pub fn parse_identity(s: &str) -> Identity {
    let raw = s.trim_start_matches("0x");
    if raw.len() == 64 {
        if let Ok(id) = raw.parse() {
            return id;
        }
    }
    Identity::derive(s)
}

pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Identity, D::Error> {
    let s = String::deserialize(deserializer)?;
    Ok(parse_identity(&s))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn labels_are_derived() {
        assert_eq!(parse_identity("alice"), Identity::derive("alice"));
    }

    #[test]
    fn hex_round_trips() {
        let id = Identity::derive("bob");
        assert_eq!(parse_identity(&id.to_string()), id);
        assert_eq!(parse_identity(&format!("0x{id}")), id);
    }

    #[test]
    fn non_hex_of_hex_length_is_a_label() {
        let label = "z".repeat(64);
        assert_eq!(parse_identity(&label), Identity::derive(&label));
    }
}
