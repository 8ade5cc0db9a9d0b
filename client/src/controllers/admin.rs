use tracing::debug;

use shared::types::{
    ApiMessage, Course, CourseForm, Department, DepartmentForm, Statistics, User, UserUpdate,
};
use shared::validation::{validate_course_form, validate_department_form};

use crate::api::{ApiClient, ApiError};
use crate::controllers::LoadTicket;
use crate::router::ViewKey;

// ---------------------------------------------------------------------------
// Fetch payload
// ---------------------------------------------------------------------------

/// What one admin load round-trip brings back. The teacher list rides along
/// with every view; the course creation form needs it for teacher
/// selection regardless of which table is on screen.
#[derive(Debug)]
pub struct AdminPayload {
    pub teachers: Vec<User>,
    pub detail: AdminDetail,
}

#[derive(Debug)]
pub enum AdminDetail {
    None,
    Users(Vec<User>),
    Students(Vec<User>),
    Courses(Vec<Course>),
    Departments(Vec<Department>),
    Stats(Statistics),
}

// ---------------------------------------------------------------------------
// Controller
// ---------------------------------------------------------------------------

#[derive(Debug, Default)]
pub struct AdminController {
    view: ViewKey,
    epoch: u64,
    pub loading: bool,
    pub error: Option<String>,
    pub users: Vec<User>,
    pub students: Vec<User>,
    pub teachers: Vec<User>,
    pub courses: Vec<Course>,
    pub departments: Vec<Department>,
    pub stats: Option<Statistics>,
}

impl AdminController {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn view(&self) -> ViewKey {
        self.view
    }

    /// Switch the active sub-view and begin a load for it.
    pub fn select_view(&mut self, view: ViewKey) -> LoadTicket {
        self.view = view;
        self.begin()
    }

    /// Begin a reload of the current sub-view (used after every mutation).
    pub fn refresh(&mut self) -> LoadTicket {
        self.begin()
    }

    fn begin(&mut self) -> LoadTicket {
        self.epoch += 1;
        self.loading = true;
        self.error = None;
        LoadTicket {
            view: self.view,
            epoch: self.epoch,
        }
    }

    /// Fetch the data the given sub-view needs. Free of `self` so the
    /// front-end can spawn it while the controller stays usable.
    pub async fn fetch(api: &ApiClient, view: ViewKey) -> Result<AdminPayload, ApiError> {
        let teachers = api.teachers().await?;
        let detail = match view {
            ViewKey::Users => AdminDetail::Users(api.users().await?),
            ViewKey::Students => AdminDetail::Students(api.students().await?),
            ViewKey::Courses => AdminDetail::Courses(api.courses().await?),
            ViewKey::Departments => AdminDetail::Departments(api.departments().await?),
            ViewKey::Stats => AdminDetail::Stats(api.stats().await?),
            // Overview and the teachers table need nothing beyond the
            // teacher list itself.
            ViewKey::Overview | ViewKey::Teachers => AdminDetail::None,
        };
        Ok(AdminPayload { teachers, detail })
    }

    /// Apply a completed fetch. Stale tickets (issued before the most
    /// recent `select_view`/`refresh`) are discarded outright.
    pub fn apply(&mut self, ticket: LoadTicket, result: Result<AdminPayload, ApiError>) {
        if ticket.epoch != self.epoch || ticket.view != self.view {
            debug!("Discarding stale admin fetch for {:?}", ticket.view);
            return;
        }

        self.loading = false;
        match result {
            Ok(payload) => {
                self.teachers = payload.teachers;
                match payload.detail {
                    AdminDetail::None => {}
                    AdminDetail::Users(users) => self.users = users,
                    AdminDetail::Students(students) => self.students = students,
                    AdminDetail::Courses(courses) => self.courses = courses,
                    AdminDetail::Departments(departments) => self.departments = departments,
                    AdminDetail::Stats(stats) => self.stats = Some(stats),
                }
            }
            Err(e) => self.error = Some(e.to_string()),
        }
    }

    /// Username shown in the courses table for a course's teacher.
    pub fn teacher_name(&self, teacher_id: i64) -> &str {
        self.teachers
            .iter()
            .find(|t| t.id == teacher_id)
            .map(|t| t.username.as_str())
            .unwrap_or("Unknown")
    }

    // -----------------------------------------------------------------------
    // Mutations: validate locally, call the API, reload on success.
    // Returns true when the mutation itself succeeded (the front-end closes
    // its dialog on true).
    // -----------------------------------------------------------------------

    pub async fn create_course(&mut self, api: &ApiClient, form: &CourseForm) -> bool {
        if let Err(e) = validate_course_form(form) {
            self.error = Some(e.to_string());
            return false;
        }
        self.run(api, api.create_course(form).await).await
    }

    pub async fn create_department(&mut self, api: &ApiClient, form: &DepartmentForm) -> bool {
        if let Err(e) = validate_department_form(form) {
            self.error = Some(e.to_string());
            return false;
        }
        self.run(api, api.create_department(form).await).await
    }

    pub async fn update_user(&mut self, api: &ApiClient, id: i64, update: &UserUpdate) -> bool {
        if update.is_empty() {
            // Nothing to send; treat as a no-op success without a round-trip.
            return true;
        }
        self.run(api, api.update_user(id, update).await).await
    }

    pub async fn delete_user(&mut self, api: &ApiClient, id: i64) -> bool {
        self.run(api, api.delete_user(id).await).await
    }

    pub async fn update_course(&mut self, api: &ApiClient, id: i64, form: &CourseForm) -> bool {
        if let Err(e) = validate_course_form(form) {
            self.error = Some(e.to_string());
            return false;
        }
        self.run(api, api.update_course(id, form).await).await
    }

    pub async fn delete_course(&mut self, api: &ApiClient, id: i64) -> bool {
        self.run(api, api.delete_course(id).await).await
    }

    pub async fn delete_department(&mut self, api: &ApiClient, id: i64) -> bool {
        self.run(api, api.delete_department(id).await).await
    }

    pub async fn invite_to_department(
        &mut self,
        api: &ApiClient,
        department_id: i64,
        teacher_id: i64,
    ) -> bool {
        self.run(api, api.invite_to_department(department_id, teacher_id).await)
            .await
    }

    pub async fn kick_from_department(
        &mut self,
        api: &ApiClient,
        department_id: i64,
        teacher_id: i64,
    ) -> bool {
        self.run(api, api.kick_from_department(department_id, teacher_id).await)
            .await
    }

    /// Shared mutation tail: on success reload the current view's dataset
    /// from scratch (mutation call strictly happens-before the refetch); on
    /// failure leave the datasets untouched and surface the error.
    async fn run(&mut self, api: &ApiClient, result: Result<ApiMessage, ApiError>) -> bool {
        match result {
            Ok(_) => {
                let ticket = self.refresh();
                let reload = Self::fetch(api, ticket.view).await;
                self.apply(ticket, reload);
                true
            }
            Err(e) => {
                self.error = Some(e.to_string());
                false
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn teacher(id: i64, name: &str) -> User {
        User {
            id,
            username: name.into(),
            email: format!("{}@aubg.edu", name),
            phone: String::new(),
            role: shared::types::Role::Teacher,
            verified: true,
            suspended: false,
            forcenewpw: false,
        }
    }

    #[test]
    fn fresh_controller_starts_on_overview() {
        let ctrl = AdminController::new();
        assert_eq!(ctrl.view(), ViewKey::Overview);
        assert!(!ctrl.loading);
        assert!(ctrl.error.is_none());
    }

    #[test]
    fn stale_ticket_is_discarded() {
        let mut ctrl = AdminController::new();
        let stale = ctrl.select_view(ViewKey::Departments);
        // User switches views before the departments response lands.
        let _current = ctrl.select_view(ViewKey::Courses);

        ctrl.apply(
            stale,
            Ok(AdminPayload {
                teachers: vec![teacher(1, "kim")],
                detail: AdminDetail::Departments(vec![Department {
                    id: 3,
                    name: "Physics".into(),
                }]),
            }),
        );

        assert!(ctrl.departments.is_empty(), "stale data must not apply");
        assert!(ctrl.teachers.is_empty());
        assert!(ctrl.loading, "the current load is still outstanding");
    }

    #[test]
    fn current_ticket_applies_and_clears_loading() {
        let mut ctrl = AdminController::new();
        let ticket = ctrl.select_view(ViewKey::Departments);

        ctrl.apply(
            ticket,
            Ok(AdminPayload {
                teachers: vec![teacher(1, "kim")],
                detail: AdminDetail::Departments(vec![Department {
                    id: 3,
                    name: "Physics".into(),
                }]),
            }),
        );

        assert_eq!(ctrl.departments.len(), 1);
        assert_eq!(ctrl.teachers.len(), 1);
        assert!(!ctrl.loading);
        assert!(ctrl.error.is_none());
    }

    #[test]
    fn failed_load_surfaces_error_and_keeps_data() {
        let mut ctrl = AdminController::new();
        let ticket = ctrl.select_view(ViewKey::Departments);
        ctrl.apply(
            ticket,
            Ok(AdminPayload {
                teachers: vec![],
                detail: AdminDetail::Departments(vec![Department {
                    id: 3,
                    name: "Physics".into(),
                }]),
            }),
        );

        let ticket = ctrl.refresh();
        ctrl.apply(
            ticket,
            Err(ApiError::Backend {
                status: reqwest::StatusCode::FORBIDDEN,
                message: "Not allowed".into(),
            }),
        );

        assert_eq!(ctrl.error.as_deref(), Some("Not allowed"));
        assert_eq!(ctrl.departments.len(), 1, "dataset untouched on failure");
    }

    #[test]
    fn teacher_name_falls_back_to_unknown() {
        let mut ctrl = AdminController::new();
        let ticket = ctrl.select_view(ViewKey::Teachers);
        ctrl.apply(
            ticket,
            Ok(AdminPayload {
                teachers: vec![teacher(2, "kim")],
                detail: AdminDetail::None,
            }),
        );
        assert_eq!(ctrl.teacher_name(2), "kim");
        assert_eq!(ctrl.teacher_name(99), "Unknown");
    }
}
