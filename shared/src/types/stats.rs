use serde::{Deserialize, Serialize};

/// Point-in-time aggregate snapshot returned by `GET /admin/stats`.
/// Fetched whole, never partially updated.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Statistics {
    pub registered_users: i64,
    pub suspended_users: i64,
    pub faculty_members: i64,
    pub active_students: i64,
    pub graduated_students: i64,
    pub courses: i64,
    pub departments: i64,
}
