use std::path::PathBuf;
use std::sync::Arc;

use tokio::fs;
use tokio::sync::RwLock;
use tracing::{debug, info, warn};

use shared::types::{CredentialRecord, User};

/// A cheaply-cloneable handle to the single persisted credential record.
///
/// All clones share the same underlying `RwLock`, so the session manager's
/// lifecycle operations are immediately visible to the API client, which
/// holds a clone for read-only request signing. No other component reads or
/// writes the record directly.
#[derive(Clone, Debug)]
pub struct CredentialStore(Arc<RwLock<StoreInner>>);

#[derive(Debug)]
struct StoreInner {
    path: PathBuf,
    record: Option<CredentialRecord>,
}

impl CredentialStore {
    /// Create a store backed by `path`. Nothing is read from disk until
    /// [`restore`](Self::restore) runs.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self(Arc::new(RwLock::new(StoreInner {
            path: path.into(),
            record: None,
        })))
    }

    /// Load the persisted record from disk.
    ///
    /// A missing file means unauthenticated. A file that fails to parse is
    /// deleted and treated the same way, so a corrupt record can never wedge
    /// the client in a half-authenticated state.
    pub async fn restore(&self) -> Option<User> {
        let mut inner = self.0.write().await;

        let contents = match fs::read_to_string(&inner.path).await {
            Ok(c) => c,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                debug!("No session file at {:?}", inner.path);
                return None;
            }
            Err(e) => {
                warn!("Failed to read session file {:?}: {}", inner.path, e);
                return None;
            }
        };

        match serde_json::from_str::<CredentialRecord>(&contents) {
            Ok(record) => {
                info!("Restored session for {}", record.user.username);
                let user = record.user.clone();
                inner.record = Some(record);
                Some(user)
            }
            Err(e) => {
                warn!("Discarding unparseable session file: {}", e);
                if let Err(e) = fs::remove_file(&inner.path).await {
                    warn!("Failed to remove session file: {}", e);
                }
                None
            }
        }
    }

    /// Replace the record and persist it. Persistence failure is logged but
    /// does not fail the login; the in-memory record still signs requests
    /// for the rest of this process.
    pub async fn set(&self, record: CredentialRecord) {
        let mut inner = self.0.write().await;

        match serde_json::to_string(&record) {
            Ok(json) => {
                if let Err(e) = fs::write(&inner.path, json).await {
                    warn!("Failed to persist session file {:?}: {}", inner.path, e);
                } else {
                    restrict_permissions(&inner.path).await;
                    debug!("Session persisted to {:?}", inner.path);
                }
            }
            Err(e) => warn!("Failed to serialize credential record: {}", e),
        }

        inner.record = Some(record);
    }

    /// Drop the record and delete the session file. Idempotent.
    pub async fn clear(&self) {
        let mut inner = self.0.write().await;
        inner.record = None;

        match fs::remove_file(&inner.path).await {
            Ok(()) => debug!("Session file removed"),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
            Err(e) => warn!("Failed to remove session file {:?}: {}", inner.path, e),
        }
    }

    /// `(email, password)` pair for identity headers, when a record exists.
    pub async fn identity(&self) -> Option<(String, String)> {
        let inner = self.0.read().await;
        inner
            .record
            .as_ref()
            .map(|r| (r.user.email.clone(), r.password.clone()))
    }

    /// Whether a record is currently held.
    pub async fn has_record(&self) -> bool {
        self.0.read().await.record.is_some()
    }
}

/// Session file carries a plaintext password; keep it owner-readable only.
#[cfg(unix)]
async fn restrict_permissions(path: &std::path::Path) {
    use std::os::unix::fs::PermissionsExt;
    let perms = std::fs::Permissions::from_mode(0o600);
    if let Err(e) = fs::set_permissions(path, perms).await {
        warn!("Failed to restrict session file permissions: {}", e);
    }
}

#[cfg(not(unix))]
async fn restrict_permissions(_path: &std::path::Path) {}
