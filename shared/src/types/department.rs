use serde::{Deserialize, Serialize};

/// A department row. Teacher membership is managed through the
/// invite/kick admin endpoints and is not mirrored client-side.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Department {
    pub id: i64,
    pub name: String,
}

/// Fields for department creation.
#[derive(Debug, Clone, Default)]
pub struct DepartmentForm {
    pub name: String,
}
