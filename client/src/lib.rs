pub mod api;
pub mod controllers;
pub mod router;
pub mod session;

pub use self::api::{ApiClient, ApiError};
pub use self::session::{CredentialStore, Session, SessionState};
