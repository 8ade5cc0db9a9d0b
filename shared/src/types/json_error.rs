use serde::{Deserialize, Serialize};

/// Generic response envelope the backend returns for mutations and for
/// error bodies. All fields are optional; the API client prefers `error`
/// over `message` when turning a failed response into a user-facing string.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ApiMessage {
    #[serde(default)]
    pub success: Option<bool>,
    #[serde(default)]
    pub error: Option<String>,
    #[serde(default)]
    pub message: Option<String>,
}

impl ApiMessage {
    /// Best available human-readable text, if the backend provided any.
    pub fn text(&self) -> Option<&str> {
        self.error.as_deref().or(self.message.as_deref())
    }
}
