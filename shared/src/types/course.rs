use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Course wire types
// ---------------------------------------------------------------------------

/// A course row. `teacher_id` references a teacher account; the client does
/// not enforce that reference, it trusts the backend.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Course {
    pub id: i64,
    pub teacher_id: i64,
    /// Course name; the backend calls this field `course`.
    pub course: String,
    pub course_nr: String,
    #[serde(default)]
    pub description: String,
    pub cr_cost: i64,
    #[serde(default)]
    pub timeslots: String,
}

/// Envelope around `GET /courses`. A missing `courses` field unwraps to an
/// empty list.
#[derive(Debug, Clone, Deserialize)]
pub struct CourseList {
    #[serde(default)]
    pub courses: Vec<Course>,
}

// ---------------------------------------------------------------------------
// Course form data
// ---------------------------------------------------------------------------

/// Fields for course creation and update, collected in the front-end form.
#[derive(Debug, Clone, Default)]
pub struct CourseForm {
    pub teacher_id: i64,
    pub course: String,
    pub course_nr: String,
    pub description: String,
    pub cr_cost: i64,
    pub timeslots: String,
}
