use tracing::debug;

use shared::types::Course;

use crate::api::{ApiClient, ApiError};
use crate::controllers::LoadTicket;
use crate::router::ViewKey;

/// Teacher dashboard: the course list, read-only. The overview counts the
/// teacher's own courses out of the last fetched list.
#[derive(Debug, Default)]
pub struct TeacherController {
    view: ViewKey,
    epoch: u64,
    pub loading: bool,
    pub error: Option<String>,
    pub courses: Vec<Course>,
}

impl TeacherController {
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

    /// Only the courses sub-view needs a network round-trip.
    pub async fn fetch(api: &ApiClient, view: ViewKey) -> Result<Option<Vec<Course>>, ApiError> {
        match view {
            ViewKey::Courses => Ok(Some(api.courses().await?)),
            _ => Ok(None),
        }
    }

    pub fn apply(&mut self, ticket: LoadTicket, result: Result<Option<Vec<Course>>, ApiError>) {
        if ticket.epoch != self.epoch || ticket.view != self.view {
            debug!("Discarding stale teacher fetch for {:?}", ticket.view);
            return;
        }

        self.loading = false;
        match result {
            Ok(Some(courses)) => self.courses = courses,
            Ok(None) => {}
            Err(e) => self.error = Some(e.to_string()),
        }
    }

    /// Courses taught by `teacher_id`, for the overview card.
    pub fn own_courses(&self, teacher_id: i64) -> impl Iterator<Item = &Course> {
        self.courses.iter().filter(move |c| c.teacher_id == teacher_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn course(id: i64, teacher_id: i64) -> Course {
        Course {
            id,
            teacher_id,
            course: format!("Course {}", id),
            course_nr: format!("NR-{}", id),
            description: String::new(),
            cr_cost: 6,
            timeslots: String::new(),
        }
    }

    #[test]
    fn overview_fetch_is_a_noop_apply() {
        let mut ctrl = TeacherController::new();
        let ticket = ctrl.select_view(ViewKey::Overview);
        ctrl.apply(ticket, Ok(None));
        assert!(!ctrl.loading);
        assert!(ctrl.courses.is_empty());
    }

    #[test]
    fn own_courses_filters_by_teacher() {
        let mut ctrl = TeacherController::new();
        let ticket = ctrl.select_view(ViewKey::Courses);
        ctrl.apply(ticket, Ok(Some(vec![course(1, 5), course(2, 6), course(3, 5)])));
        assert_eq!(ctrl.own_courses(5).count(), 2);
        assert_eq!(ctrl.own_courses(9).count(), 0);
    }

    #[test]
    fn stale_course_list_is_discarded() {
        let mut ctrl = TeacherController::new();
        let stale = ctrl.select_view(ViewKey::Courses);
        let _new = ctrl.select_view(ViewKey::Overview);
        ctrl.apply(stale, Ok(Some(vec![course(1, 5)])));
        assert!(ctrl.courses.is_empty());
    }
}
