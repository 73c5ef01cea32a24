//! Principal (user or member) profile cached alongside the session

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Denormalized profile of the authenticated principal.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Principal {
    pub principal_id: String,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub display_name: Option<String>,
    #[serde(default)]
    pub status: Option<String>,
    /// Application-defined metadata, passed through untouched.
    #[serde(default, skip_serializing_if = "Value::is_null")]
    pub trusted_metadata: Value,
}
