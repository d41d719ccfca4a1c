//! Session tokens: stateless `identity.issued_at.signature` strings.
//!
//! The signature is a hex HMAC-SHA256 over `identity.issued_at` under the process
//! secret. Nothing is stored server-side: a token is valid exactly as long as the
//! secret that signed it is the one the codec was built with. Expiry and account
//! liveness are the caller's concern.

use std::fmt;

use chrono::Utc;
use hmac::{Hmac, Mac};
use sha2::Sha256;
use subtle::ConstantTimeEq;
use thiserror::Error;

type HmacSha256 = Hmac<Sha256>;

const SEPARATOR: char = '.';

/// Signing secret for session tokens. Read once at startup.
#[derive(Clone)]
pub struct SessionSecret(String);

impl SessionSecret {
    pub fn new(secret: impl Into<String>) -> Self {
        Self(secret.into())
    }

    fn as_bytes(&self) -> &[u8] {
        self.0.as_bytes()
    }
}

impl fmt::Debug for SessionSecret {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("SessionSecret(***)")
    }
}

/// Errors raised while building a codec or issuing a token.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum TokenError {
    #[error("session secret must not be empty")]
    EmptySecret,

    #[error("session secret rejected by HMAC: {0}")]
    InvalidKey(String),

    #[error("identity must not be empty")]
    EmptyIdentity,

    #[error("identity must not contain '.'")]
    IdentityContainsSeparator,
}

/// Why a presented token was rejected. Always recoverable by re-authenticating.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum InvalidToken {
    #[error("malformed session token")]
    Malformed,

    #[error("session token signature mismatch")]
    SignatureMismatch,
}

/// Issues and verifies session tokens under a single secret.
#[derive(Clone)]
pub struct TokenCodec {
    mac: HmacSha256,
}

impl TokenCodec {
    pub fn new(secret: &SessionSecret) -> Result<Self, TokenError> {
        if secret.as_bytes().is_empty() {
            return Err(TokenError::EmptySecret);
        }
        let mac = HmacSha256::new_from_slice(secret.as_bytes())
            .map_err(|e| TokenError::InvalidKey(e.to_string()))?;
        Ok(Self { mac })
    }

    /// Issues a token for `identity` stamped with the current time.
    pub fn issue(&self, identity: &str) -> Result<String, TokenError> {
        self.issue_at(identity, Utc::now().timestamp_millis())
    }

    /// Issues a token with an explicit `issued_at` millisecond timestamp.
    pub fn issue_at(&self, identity: &str, issued_at_ms: i64) -> Result<String, TokenError> {
        if identity.is_empty() {
            return Err(TokenError::EmptyIdentity);
        }
        if identity.contains(SEPARATOR) {
            return Err(TokenError::IdentityContainsSeparator);
        }

        let payload = format!("{identity}{SEPARATOR}{issued_at_ms}");
        let signature = self.sign(&payload);
        Ok(format!("{payload}{SEPARATOR}{signature}"))
    }

    /// Verifies `token` and returns the identity it was issued for.
    ///
    /// Fails closed on a wrong field count, any empty field, or a signature that
    /// does not match the one recomputed over `identity.issued_at`.
    pub fn verify<'t>(&self, token: &'t str) -> Result<&'t str, InvalidToken> {
        let mut fields = token.split(SEPARATOR);
        let (Some(identity), Some(issued_at), Some(signature), None) =
            (fields.next(), fields.next(), fields.next(), fields.next())
        else {
            return Err(InvalidToken::Malformed);
        };

        if identity.is_empty() || issued_at.is_empty() || signature.is_empty() {
            return Err(InvalidToken::Malformed);
        }

        let expected = self.sign(&format!("{identity}{SEPARATOR}{issued_at}"));
        if bool::from(expected.as_bytes().ct_eq(signature.as_bytes())) {
            Ok(identity)
        } else {
            Err(InvalidToken::SignatureMismatch)
        }
    }

    fn sign(&self, payload: &str) -> String {
        let mut mac = self.mac.clone();
        mac.update(payload.as_bytes());
        hex::encode(mac.finalize().into_bytes())
    }
}

impl fmt::Debug for TokenCodec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TokenCodec").finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn codec(secret: &str) -> TokenCodec {
        TokenCodec::new(&SessionSecret::new(secret)).unwrap()
    }

    #[test]
    fn test_round_trip_returns_identity() {
        let codec = codec("test-secret");
        for identity in [
            "3f1c2a9e-6a43-4c0f-9d7e-6a2b1f0c9e11",
            "user@example",
            "a",
            "ÄÖÜ-ünïcode",
        ] {
            let token = codec.issue(identity).unwrap();
            assert_eq!(codec.verify(&token), Ok(identity));
        }
    }

    #[test]
    fn test_token_layout() {
        let codec = codec("test-secret");
        let token = codec.issue_at("user-1", 1_700_000_000_000).unwrap();
        let parts: Vec<&str> = token.split('.').collect();
        assert_eq!(parts.len(), 3);
        assert_eq!(parts[0], "user-1");
        assert_eq!(parts[1], "1700000000000");
        assert_eq!(parts[2].len(), 64, "hex SHA-256 digest");
        assert!(parts[2].chars().all(|c| c.is_ascii_hexdigit() && !c.is_ascii_uppercase()));
    }

    #[test]
    fn test_issue_is_deterministic_for_fixed_time() {
        let codec = codec("test-secret");
        assert_eq!(
            codec.issue_at("user-1", 42).unwrap(),
            codec.issue_at("user-1", 42).unwrap()
        );
        assert_ne!(
            codec.issue_at("user-1", 42).unwrap(),
            codec.issue_at("user-1", 43).unwrap()
        );
    }

    #[test]
    fn test_any_single_character_mutation_is_rejected() {
        let codec = codec("test-secret");
        let token = codec.issue_at("user-1", 1_700_000_000_000).unwrap();

        for (idx, original) in token.char_indices() {
            for replacement in ['0', 'a', 'F', '.', 'z'] {
                if replacement == original {
                    continue;
                }
                let mut mutated = token.clone();
                mutated.replace_range(idx..idx + original.len_utf8(), &replacement.to_string());
                assert!(
                    codec.verify(&mutated).is_err(),
                    "mutation at {idx} ('{original}' -> '{replacement}') was accepted"
                );
            }
        }
    }

    #[test]
    fn test_uppercased_signature_is_rejected() {
        let codec = codec("test-secret");
        let token = codec.issue_at("user-1", 7).unwrap();
        let (payload, signature) = token.rsplit_once('.').unwrap();
        let shouted = format!("{payload}.{}", signature.to_uppercase());
        assert_eq!(codec.verify(&shouted), Err(InvalidToken::SignatureMismatch));
    }

    #[test]
    fn test_malformed_tokens() {
        let codec = codec("test-secret");
        for token in [
            "",
            "user-1",
            "user-1.123",
            "user-1.123.abc.def",
            ".123.abc",
            "user-1..abc",
            "user-1.123.",
            "..",
        ] {
            assert_eq!(
                codec.verify(token),
                Err(InvalidToken::Malformed),
                "token {token:?}"
            );
        }
    }

    #[test]
    fn test_well_formed_forgery_is_signature_mismatch() {
        let codec = codec("test-secret");
        assert_eq!(
            codec.verify("admin.1700000000000.deadbeef"),
            Err(InvalidToken::SignatureMismatch)
        );
    }

    #[test]
    fn test_rotating_secret_invalidates_tokens() {
        let old = codec("old-secret");
        let new = codec("new-secret");
        let token = old.issue("user-1").unwrap();
        assert_eq!(new.verify(&token), Err(InvalidToken::SignatureMismatch));
        assert_eq!(old.verify(&token), Ok("user-1"));
    }

    #[test]
    fn test_identity_with_separator_is_rejected_at_issue() {
        let codec = codec("test-secret");
        assert_eq!(
            codec.issue("first.last"),
            Err(TokenError::IdentityContainsSeparator)
        );
        assert_eq!(codec.issue(""), Err(TokenError::EmptyIdentity));
    }

    #[test]
    fn test_empty_secret_is_rejected() {
        assert_eq!(
            TokenCodec::new(&SessionSecret::new("")).unwrap_err(),
            TokenError::EmptySecret
        );
    }

    #[test]
    fn test_secret_debug_is_redacted() {
        let secret = SessionSecret::new("super-secret-value");
        assert!(!format!("{secret:?}").contains("super-secret-value"));
    }
}
