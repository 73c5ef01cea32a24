use serde::{Deserialize, Serialize};

/// The single outstanding PKCE challenge and verifier.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PkceCodePair {
    pub code_challenge: String,
    pub code_verifier: String,
}

impl PkceCodePair {
    /// Challenge method used for every pair this crate produces.
    pub const METHOD: &'static str = "S256";
}

impl std::fmt::Debug for PkceCodePair {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PkceCodePair")
            .field("code_challenge", &self.code_challenge)
            .field("code_verifier", &"<redacted>")
            .finish()
    }
}
