//! PKCE (Proof Key for Code Exchange) primitives
//!
//! Implements the S256 method of RFC 7636. The verifier is 32 random bytes,
//! hex-encoded to 64 characters (inside the 43-128 range the RFC allows).

use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use rand::Rng;
use sha2::{Digest, Sha256};

/// Number of random bytes behind each verifier.
pub const VERIFIER_BYTES: usize = 32;

/// Challenge method implemented here.
pub const CHALLENGE_METHOD: &str = "S256";

/// Generate a cryptographically secure code verifier
pub fn generate_code_verifier() -> String {
    let random_bytes: [u8; VERIFIER_BYTES] = rand::thread_rng().gen();
    hex::encode(random_bytes)
}

/// Derive the code challenge: `BASE64URL(SHA256(ASCII(code_verifier)))`
pub fn generate_code_challenge(verifier: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(verifier.as_bytes());
    URL_SAFE_NO_PAD.encode(hasher.finalize())
}

/// `true` if `challenge` is the S256 derivation of `verifier`.
#[must_use]
pub fn challenge_matches(verifier: &str, challenge: &str) -> bool {
    generate_code_challenge(verifier) == challenge
}

/// A freshly generated verifier and its challenge.
#[derive(Clone)]
pub struct PKCEChallenge {
    /// Kept secret until the code exchange
    pub code_verifier: String,

    /// Sent with the authorization request
    pub code_challenge: String,
}

impl PKCEChallenge {
    /// Generate a new verifier/challenge pair
    ///
    /// # Examples
    /// ```
    /// use authsync_common::auth::pkce::PKCEChallenge;
    ///
    /// let challenge = PKCEChallenge::generate();
    /// assert_eq!(challenge.code_verifier.len(), 64);
    /// assert_eq!(challenge.challenge_method(), "S256");
    /// ```
    #[must_use]
    pub fn generate() -> Self {
        let code_verifier = generate_code_verifier();
        let code_challenge = generate_code_challenge(&code_verifier);
        Self { code_verifier, code_challenge }
    }

    /// Get the challenge method (always "S256" for SHA256)
    #[must_use]
    pub fn challenge_method(&self) -> &str {
        CHALLENGE_METHOD
    }
}

impl std::fmt::Debug for PKCEChallenge {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PKCEChallenge")
            .field("code_verifier", &"<redacted>")
            .field("code_challenge", &self.code_challenge)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    //! Unit tests for auth::pkce.
    use super::*;

    /// Validates `PKCEChallenge::generate` behavior for the generate pkce
    /// challenge scenario.
    ///
    /// Assertions:
    /// - Ensures the verifier is 64 lowercase hex characters.
    /// - Ensures `!challenge.code_challenge.is_empty()` evaluates to true.
    #[test]
    fn test_generate_pkce_challenge() {
        let challenge = PKCEChallenge::generate();

        assert_eq!(challenge.code_verifier.len(), 64);
        assert!(challenge.code_verifier.chars().all(|c| c.is_ascii_hexdigit()));
        assert!(!challenge.code_challenge.is_empty());
    }

    /// Validates `PKCEChallenge::generate` behavior for the unique challenges
    /// scenario.
    #[test]
    fn test_unique_challenges() {
        let challenge1 = PKCEChallenge::generate();
        let challenge2 = PKCEChallenge::generate();

        assert_ne!(challenge1.code_verifier, challenge2.code_verifier);
        assert_ne!(challenge1.code_challenge, challenge2.code_challenge);
    }

    /// RFC 7636 appendix B test vector.
    #[test]
    fn test_rfc7636_vector() {
        let verifier = "dBjftJeZ4CVP-mB92K27uhbUJU1p1r_wW1gFWFOEjXk";
        assert_eq!(
            generate_code_challenge(verifier),
            "E9Melhoa2OwvFrEMTJguCHaoeK1t8URWbuGJSstw-cM"
        );
    }

    /// Validates the base64url encoding of the challenge.
    ///
    /// Assertions:
    /// - Ensures no padding or non-URL-safe characters appear.
    #[test]
    fn test_base64url_encoding() {
        let challenge = PKCEChallenge::generate();

        assert!(!challenge.code_challenge.contains('='));
        assert!(!challenge.code_challenge.contains('+'));
        assert!(!challenge.code_challenge.contains('/'));
        assert_eq!(challenge.code_challenge.len(), 43);
    }

    #[test]
    fn test_challenge_matches() {
        let challenge = PKCEChallenge::generate();
        assert!(challenge_matches(&challenge.code_verifier, &challenge.code_challenge));
        assert!(!challenge_matches("other-verifier", &challenge.code_challenge));
    }

    #[test]
    fn test_debug_redacts_verifier() {
        let challenge = PKCEChallenge::generate();
        assert!(!format!("{challenge:?}").contains(&challenge.code_verifier));
    }
}
