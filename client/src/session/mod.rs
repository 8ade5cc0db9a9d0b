pub mod store;

pub use self::store::CredentialStore;

use tracing::{info, warn};

use shared::types::{ApiMessage, CredentialRecord, RegistrationForm, Role, User};

use crate::api::{ApiClient, ApiError};

// ---------------------------------------------------------------------------
// Session state
// ---------------------------------------------------------------------------

/// Initialization phase of the session manager.
///
/// Views must treat the session as loading until [`Session::restore`] has
/// run; protected content is suspended during that window so the current
/// identity and the persisted record are never observed inconsistent.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    Loading,
    Ready,
}

/// Owner of the current identity and the persisted credential record.
///
/// Exposes exactly the lifecycle operations (restore / login / logout /
/// register) plus read accessors. Role flags are recomputed from the current
/// identity on every access, never cached separately.
#[derive(Debug)]
pub struct Session {
    store: CredentialStore,
    current: Option<User>,
    state: SessionState,
}

impl Session {
    pub fn new(store: CredentialStore) -> Self {
        Self {
            store,
            current: None,
            state: SessionState::Loading,
        }
    }

    /// Restore the persisted credential record on process start.
    ///
    /// Parse failures discard the record and proceed unauthenticated. The
    /// in-memory identity never carries the password; the store keeps it for
    /// request signing.
    pub async fn restore(&mut self) {
        self.current = self.store.restore().await;
        self.state = SessionState::Ready;
    }

    /// Authenticate against the backend. On success the returned identity is
    /// merged with the supplied password into the persisted record. Failure
    /// propagates unchanged; no retry, session untouched.
    pub async fn login(
        &mut self,
        api: &ApiClient,
        email: &str,
        password: &str,
    ) -> Result<(), ApiError> {
        let user = api.login(email, password).await?;
        info!("Logged in as {} ({})", user.username, user.role);

        self.store
            .set(CredentialRecord::new(user.clone(), password.to_string()))
            .await;
        self.current = Some(user);
        self.state = SessionState::Ready;
        Ok(())
    }

    /// End the session. The backend call may fail; local state is cleared
    /// regardless, so logout is idempotent and never leaves stale session
    /// state behind.
    pub async fn logout(&mut self, api: &ApiClient) {
        if let Err(e) = api.logout().await {
            warn!("Logout request failed (clearing local session anyway): {}", e);
        }
        self.store.clear().await;
        self.current = None;
    }

    /// Create an account. Does not alter the current session; failures
    /// propagate to the caller for display.
    pub async fn register(
        &self,
        api: &ApiClient,
        form: &RegistrationForm,
    ) -> Result<ApiMessage, ApiError> {
        api.register(form).await
    }

    /// Create an admin account; `access_code` comes from the client config.
    pub async fn register_admin(
        &self,
        api: &ApiClient,
        form: &RegistrationForm,
        access_code: &str,
    ) -> Result<ApiMessage, ApiError> {
        api.register_admin(form, access_code).await
    }

    // -----------------------------------------------------------------------
    // Read accessors: pure functions of the current identity
    // -----------------------------------------------------------------------

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn user(&self) -> Option<&User> {
        self.current.as_ref()
    }

    pub fn is_authenticated(&self) -> bool {
        self.current.is_some()
    }

    pub fn is_admin(&self) -> bool {
        self.role_is(Role::Admin)
    }

    pub fn is_teacher(&self) -> bool {
        self.role_is(Role::Teacher)
    }

    pub fn is_student(&self) -> bool {
        self.role_is(Role::Student)
    }

    fn role_is(&self, role: Role) -> bool {
        self.current.as_ref().is_some_and(|u| u.role == role)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_user(role: Role) -> User {
        User {
            id: 1,
            username: "alice".into(),
            email: "alice@aubg.edu".into(),
            phone: String::new(),
            role,
            verified: true,
            suspended: false,
            forcenewpw: false,
        }
    }

    #[test]
    fn fresh_session_is_loading_and_unauthenticated() {
        let session = Session::new(CredentialStore::new("unused.json"));
        assert_eq!(session.state(), SessionState::Loading);
        assert!(!session.is_authenticated());
        assert!(!session.is_admin());
    }

    #[test]
    fn role_flags_are_derived_from_current_identity() {
        let mut session = Session::new(CredentialStore::new("unused.json"));
        session.current = Some(sample_user(Role::Teacher));
        session.state = SessionState::Ready;

        assert!(session.is_authenticated());
        assert!(session.is_teacher());
        assert!(!session.is_admin());
        assert!(!session.is_student());

        // Flags track the identity with no separate cache to drift.
        session.current = Some(sample_user(Role::Admin));
        assert!(session.is_admin());
        assert!(!session.is_teacher());
    }

    #[test]
    fn unknown_role_matches_no_flag() {
        let mut session = Session::new(CredentialStore::new("unused.json"));
        session.current = Some(sample_user(Role::Unknown));
        assert!(session.is_authenticated());
        assert!(!session.is_admin() && !session.is_teacher() && !session.is_student());
    }
}
