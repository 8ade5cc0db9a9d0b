use serde::{Deserialize, Serialize};

/// Registration form contents, validated locally before any network call.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RegistrationForm {
    pub username: String,
    pub email: String,
    pub password: String,
    #[serde(default)]
    pub confirm_password: String,
    #[serde(default)]
    pub phone: Option<String>,
}
