use serde::Deserialize;
use thiserror::Error;

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("TOML parse error: {0}")]
    TomlParse(#[from] toml::de::Error),
}

// ---------------------------------------------------------------------------
// Config structs
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize, Clone)]
pub struct ServerSection {
    #[serde(default = "default_base_url")]
    pub base_url: String,
}

#[derive(Debug, Deserialize, Clone, Default)]
pub struct AuthSection {
    /// Access code sent as the `access_code` header on `/admin/register`.
    ///
    /// Prefer loading this via the `UMS_ACCESS_CODE` environment variable.
    /// This config field is the fallback for setups that cannot inject env
    /// vars at runtime. Admin registration fails client-side when neither
    /// source is set.
    pub admin_access_code: Option<String>,
}

#[derive(Debug, Deserialize, Clone)]
pub struct StorageSection {
    /// Path of the persisted credential record. Absence of the file means
    /// unauthenticated.
    #[serde(default = "default_session_file")]
    pub session_file: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ClientConfig {
    #[serde(default = "default_server_section")]
    pub server: ServerSection,
    #[serde(default)]
    pub auth: AuthSection,
    #[serde(default = "default_storage_section")]
    pub storage: StorageSection,
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

impl AuthSection {
    /// Resolve the admin access code with the `UMS_ACCESS_CODE` env var
    /// taking priority over the config file field.
    pub fn resolved_access_code(&self) -> Option<String> {
        std::env::var("UMS_ACCESS_CODE")
            .ok()
            .filter(|s| !s.is_empty())
            .or_else(|| self.admin_access_code.clone())
            .filter(|s| !s.is_empty())
    }
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            server: default_server_section(),
            auth: AuthSection::default(),
            storage: default_storage_section(),
        }
    }
}

// ---------------------------------------------------------------------------
// Serde defaults
// ---------------------------------------------------------------------------

fn default_base_url() -> String {
    "http://localhost:8081".to_string()
}

fn default_session_file() -> String {
    "session.json".to_string()
}

fn default_server_section() -> ServerSection {
    ServerSection {
        base_url: default_base_url(),
    }
}

fn default_storage_section() -> StorageSection {
    StorageSection {
        session_file: default_session_file(),
    }
}
