use serde::{Deserialize, Serialize};

pub const DEFAULT_DATABASE: &str = "(default)";

/// Firestore credentials used by the migration tool.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Settings {
    #[serde(default)]
    pub project_id: String,
    #[serde(default = "default_database")]
    pub database: String,
    #[serde(default)]
    pub access_token: String,
    /// Override for the Firestore REST endpoint (emulators, tests).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_base: Option<String>,
}

fn default_database() -> String {
    DEFAULT_DATABASE.to_string()
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            project_id: String::new(),
            database: default_database(),
            access_token: String::new(),
            api_base: None,
        }
    }
}

impl Settings {
    pub fn migration_configured(&self) -> bool {
        !self.project_id.is_empty() && !self.access_token.is_empty()
    }
}
