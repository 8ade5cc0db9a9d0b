use tracing::debug;

use shared::types::{Course, SelfProfile};

use crate::api::{ApiClient, ApiError};
use crate::controllers::LoadTicket;
use crate::router::ViewKey;

/// One student load round-trip: the global course list plus the caller's own
/// profile, whose enrolled-course list is the only source of enrollment
/// truth.
#[derive(Debug)]
pub struct StudentPayload {
    pub courses: Vec<Course>,
    pub profile: SelfProfile,
}

#[derive(Debug, Default)]
pub struct StudentController {
    view: ViewKey,
    epoch: u64,
    pub loading: bool,
    pub error: Option<String>,
    pub courses: Vec<Course>,
    pub profile: Option<SelfProfile>,
}

impl StudentController {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn view(&self) -> ViewKey {
        self.view
    }

    pub fn select_view(&mut self, view: ViewKey) -> LoadTicket {
        self.view = view;
        self.epoch += 1;
        self.loading = true;
        self.error = None;
        LoadTicket {
            view: self.view,
            epoch: self.epoch,
        }
    }

    pub async fn fetch(
        api: &ApiClient,
        view: ViewKey,
    ) -> Result<Option<StudentPayload>, ApiError> {
        match view {
            ViewKey::Courses => {
                let courses = api.courses().await?;
                let profile = api.get_self().await?;
                Ok(Some(StudentPayload { courses, profile }))
            }
            _ => Ok(None),
        }
    }

    pub fn apply(
        &mut self,
        ticket: LoadTicket,
        result: Result<Option<StudentPayload>, ApiError>,
    ) {
        if ticket.epoch != self.epoch || ticket.view != self.view {
            debug!("Discarding stale student fetch for {:?}", ticket.view);
            return;
        }

        self.loading = false;
        match result {
            Ok(Some(payload)) => {
                self.courses = payload.courses;
                self.profile = Some(payload.profile);
            }
            Ok(None) => {}
            Err(e) => self.error = Some(e.to_string()),
        }
    }

    // -----------------------------------------------------------------------
    // Enrollment: derived state, never a locally toggled flag
    // -----------------------------------------------------------------------

    /// Whether the most recent self profile lists `course_id` as enrolled.
    pub fn is_enrolled(&self, course_id: i64) -> bool {
        self.profile
            .as_ref()
            .is_some_and(|p| p.is_enrolled(course_id))
    }

    pub fn enrolled_count(&self) -> usize {
        self.profile.as_ref().map_or(0, |p| p.courses.len())
    }

    pub fn enrolled_credits(&self) -> i64 {
        self.profile.as_ref().map_or(0, |p| p.enrolled_credits())
    }

    /// `POST /enroll/{id}` then a fresh `GET /self`. The displayed enrolled
    /// set changes only if the backend's profile says so.
    pub async fn enroll(&mut self, api: &ApiClient, course_id: i64) -> bool {
        match api.enroll(course_id).await {
            Ok(_) => self.refetch_profile(api).await,
            Err(e) => {
                self.error = Some(e.to_string());
                false
            }
        }
    }

    /// `DELETE /unenroll/{id}` then a fresh `GET /self`.
    pub async fn unenroll(&mut self, api: &ApiClient, course_id: i64) -> bool {
        match api.unenroll(course_id).await {
            Ok(_) => self.refetch_profile(api).await,
            Err(e) => {
                self.error = Some(e.to_string());
                false
            }
        }
    }

    async fn refetch_profile(&mut self, api: &ApiClient) -> bool {
        match api.get_self().await {
            Ok(profile) => {
                self.profile = Some(profile);
                self.error = None;
                true
            }
            Err(e) => {
                // The mutation went through; only the refresh failed. Keep
                // the previous profile and surface the error.
                self.error = Some(e.to_string());
                true
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use shared::types::{Role, User};

    fn course(id: i64) -> Course {
        Course {
            id,
            teacher_id: 1,
            course: format!("Course {}", id),
            course_nr: format!("NR-{}", id),
            description: String::new(),
            cr_cost: 3,
            timeslots: String::new(),
        }
    }

    fn profile_with(enrolled: &[i64]) -> SelfProfile {
        SelfProfile {
            user: User {
                id: 50,
                username: "sam".into(),
                email: "sam@aubg.edu".into(),
                phone: String::new(),
                role: Role::Student,
                verified: true,
                suspended: false,
                forcenewpw: false,
            },
            courses: enrolled.iter().copied().map(course).collect(),
        }
    }

    #[test]
    fn enrollment_is_membership_in_latest_profile() {
        let mut ctrl = StudentController::new();
        assert!(!ctrl.is_enrolled(4), "no profile yet means not enrolled");

        let ticket = ctrl.select_view(ViewKey::Courses);
        ctrl.apply(
            ticket,
            Ok(Some(StudentPayload {
                courses: vec![course(4), course(7), course(10)],
                profile: profile_with(&[4, 7]),
            })),
        );

        assert!(ctrl.is_enrolled(4));
        assert!(ctrl.is_enrolled(7));
        assert!(!ctrl.is_enrolled(10));
        assert_eq!(ctrl.enrolled_count(), 2);
        assert_eq!(ctrl.enrolled_credits(), 6);
    }

    #[test]
    fn profile_replacement_updates_derived_set() {
        let mut ctrl = StudentController::new();
        let ticket = ctrl.select_view(ViewKey::Courses);
        ctrl.apply(
            ticket,
            Ok(Some(StudentPayload {
                courses: vec![course(4), course(7), course(10)],
                profile: profile_with(&[4, 7]),
            })),
        );

        // Backend now reports the new enrollment; no client-side toggle.
        ctrl.profile = Some(profile_with(&[4, 7, 10]));
        assert!(ctrl.is_enrolled(10));
    }

    #[test]
    fn stale_student_fetch_is_discarded() {
        let mut ctrl = StudentController::new();
        let stale = ctrl.select_view(ViewKey::Courses);
        let _new = ctrl.select_view(ViewKey::Overview);
        ctrl.apply(
            stale,
            Ok(Some(StudentPayload {
                courses: vec![course(1)],
                profile: profile_with(&[1]),
            })),
        );
        assert!(ctrl.courses.is_empty());
        assert!(ctrl.profile.is_none());
    }
}
