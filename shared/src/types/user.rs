use std::fmt;

use serde::{Deserialize, Serialize};

use crate::types::course::Course;

// ---------------------------------------------------------------------------
// Roles
// ---------------------------------------------------------------------------

/// Account role as reported by the backend.
///
/// Role strings outside the three known dashboards deserialize to
/// [`Role::Unknown`]; the router treats those as access-denied rather than
/// failing the whole response.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Student,
    Teacher,
    Admin,
    #[serde(other)]
    Unknown,
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Student => "student",
            Self::Teacher => "teacher",
            Self::Admin => "admin",
            Self::Unknown => "unknown",
        };
        write!(f, "{}", s)
    }
}

// ---------------------------------------------------------------------------
// Identity
// ---------------------------------------------------------------------------

/// A user account as returned by `/login`, `/users`, `/students`,
/// `/teachers` and `/self`.
///
/// The backend includes a `password` field in some of these responses; the
/// client never carries it on the identity type. The plaintext password
/// lives only inside [`CredentialRecord`], which the session manager owns.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    pub id: i64,
    pub username: String,
    pub email: String,
    #[serde(default)]
    pub phone: String,
    pub role: Role,
    #[serde(default)]
    pub verified: bool,
    #[serde(default)]
    pub suspended: bool,
    #[serde(default)]
    pub forcenewpw: bool,
}

// ---------------------------------------------------------------------------
// Persisted credential record
// ---------------------------------------------------------------------------

/// Identity plus the plaintext password used to sign subsequent requests.
///
/// Created on successful login, destroyed on logout or on any parse failure
/// during restore. If present it is assumed valid until the backend rejects
/// a request; there is no local expiry.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CredentialRecord {
    #[serde(flatten)]
    pub user: User,
    pub password: String,
}

impl CredentialRecord {
    pub fn new(user: User, password: String) -> Self {
        Self { user, password }
    }
}

// ---------------------------------------------------------------------------
// Self profile
// ---------------------------------------------------------------------------

/// Response of `GET /self`: the caller's own account, plus the enrolled
/// course list for students. Enrollment membership is always derived from
/// the most recent one of these, never from a locally toggled flag.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SelfProfile {
    #[serde(flatten)]
    pub user: User,
    #[serde(default)]
    pub courses: Vec<Course>,
}

impl SelfProfile {
    /// Whether the profile's enrolled-course list contains `course_id`.
    pub fn is_enrolled(&self, course_id: i64) -> bool {
        self.courses.iter().any(|c| c.id == course_id)
    }

    /// Sum of credits across enrolled courses (student overview card).
    pub fn enrolled_credits(&self) -> i64 {
        self.courses.iter().map(|c| c.cr_cost).sum()
    }
}

// ---------------------------------------------------------------------------
// Admin user patch
// ---------------------------------------------------------------------------

/// Partial update for `PATCH /admin/users/{id}`. Only fields that are set
/// become request headers; everything else is left untouched server-side.
#[derive(Debug, Clone, Default)]
pub struct UserUpdate {
    pub username: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub role: Option<Role>,
    pub verified: Option<bool>,
    pub suspended: Option<bool>,
}

impl UserUpdate {
    /// True when no field is set; the controller skips the request entirely.
    pub fn is_empty(&self) -> bool {
        self.username.is_none()
            && self.email.is_none()
            && self.phone.is_none()
            && self.role.is_none()
            && self.verified.is_none()
            && self.suspended.is_none()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unknown_role_string_parses_to_unknown() {
        let r: Role = serde_json::from_str("\"registrar\"").unwrap();
        assert_eq!(r, Role::Unknown);
    }

    #[test]
    fn credential_record_flattens_identity_fields() {
        let user = User {
            id: 7,
            username: "alice".into(),
            email: "alice@aubg.edu".into(),
            phone: "555-0100".into(),
            role: Role::Student,
            verified: true,
            suspended: false,
            forcenewpw: false,
        };
        let rec = CredentialRecord::new(user, "Secret1!".into());
        let json = serde_json::to_value(&rec).unwrap();
        assert_eq!(json["email"], "alice@aubg.edu");
        assert_eq!(json["password"], "Secret1!");
        assert!(json.get("user").is_none(), "must not nest the identity");
    }

    #[test]
    fn self_profile_enrollment_is_derived_from_courses() {
        let json = serde_json::json!({
            "id": 3, "username": "bob", "email": "bob@aubg.edu",
            "phone": "", "role": "student",
            "verified": true, "suspended": false, "forcenewpw": false,
            "courses": [
                {"id": 4, "teacher_id": 1, "course": "Calculus",
                 "course_nr": "MAT-101", "description": "", "cr_cost": 6,
                 "timeslots": "Mon 9-11"},
            ]
        });
        let profile: SelfProfile = serde_json::from_value(json).unwrap();
        assert!(profile.is_enrolled(4));
        assert!(!profile.is_enrolled(10));
        assert_eq!(profile.enrolled_credits(), 6);
    }

    #[test]
    fn self_profile_without_courses_defaults_to_empty() {
        let json = serde_json::json!({
            "id": 9, "username": "t", "email": "t@aubg.edu",
            "phone": "", "role": "teacher",
            "verified": true, "suspended": false, "forcenewpw": false
        });
        let profile: SelfProfile = serde_json::from_value(json).unwrap();
        assert!(profile.courses.is_empty());
    }
}
