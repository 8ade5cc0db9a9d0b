use std::time::Duration;

use anyhow::Result;
use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use ratatui::DefaultTerminal;
use tokio::sync::mpsc;

use client::api::{ApiClient, ApiError};
use client::controllers::admin::AdminPayload;
use client::controllers::student::StudentPayload;
use client::controllers::{AdminController, LoadTicket, StudentController, TeacherController};
use client::router::{route_for, DashboardVariant, Route, ViewKey};
use client::session::Session;
use shared::types::{
    ClientConfig, Course, CourseForm, DepartmentForm, RegistrationForm, Role, UserUpdate,
};
use shared::validation::validate_registration;

use crate::form::Form;

// ---------------------------------------------------------------------------
// Messages and overlays
// ---------------------------------------------------------------------------

/// Completed background fetch, tagged with the ticket it was issued under.
pub enum FetchMsg {
    Admin(LoadTicket, Result<AdminPayload, ApiError>),
    Teacher(LoadTicket, Result<Option<Vec<Course>>, ApiError>),
    Student(LoadTicket, Result<Option<StudentPayload>, ApiError>),
}

pub struct Confirm {
    pub prompt: String,
    action: ConfirmAction,
}

enum ConfirmAction {
    DeleteUser(i64),
    DeleteCourse(i64),
    DeleteDepartment(i64),
}

pub struct Modal {
    pub form: Form,
    kind: ModalKind,
}

enum ModalKind {
    CreateCourse,
    EditCourse(i64),
    CreateDepartment,
    EditUser(i64),
    InviteTeacher(i64),
    KickTeacher(i64),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthScreen {
    Login,
    Register,
}

// ---------------------------------------------------------------------------
// App
// ---------------------------------------------------------------------------

pub struct App {
    pub config: ClientConfig,
    pub api: ApiClient,
    pub session: Session,
    pub admin: AdminController,
    pub teacher: TeacherController,
    pub student: StudentController,
    pub auth_screen: AuthScreen,
    pub login_form: Form,
    pub register_form: Form,
    pub register_as_admin: bool,
    pub modal: Option<Modal>,
    pub confirm: Option<Confirm>,
    /// Banner message on the auth screens.
    pub flash: Option<String>,
    /// Cursor row of the active table.
    pub row: usize,
    tx: mpsc::UnboundedSender<FetchMsg>,
    rx: mpsc::UnboundedReceiver<FetchMsg>,
    should_quit: bool,
}

fn login_form() -> Form {
    Form::new("Sign in", &[("Email", false), ("Password", true)])
}

fn register_form() -> Form {
    Form::new(
        "Create account",
        &[
            ("Username", false),
            ("Email", false),
            ("Password", true),
            ("Confirm password", true),
            ("Phone", false),
        ],
    )
}

impl App {
    pub fn new(config: ClientConfig, api: ApiClient, session: Session) -> Self {
        let (tx, rx) = mpsc::unbounded_channel();
        Self {
            config,
            api,
            session,
            admin: AdminController::new(),
            teacher: TeacherController::new(),
            student: StudentController::new(),
            auth_screen: AuthScreen::Login,
            login_form: login_form(),
            register_form: register_form(),
            register_as_admin: false,
            modal: None,
            confirm: None,
            flash: None,
            row: 0,
            tx,
            rx,
            should_quit: false,
        }
    }

    pub fn route(&self) -> Route {
        route_for(self.session.state(), self.session.user())
    }

    pub async fn run(&mut self, terminal: &mut DefaultTerminal) -> Result<()> {
        // A restored session lands straight on its dashboard overview.
        if let Route::Dashboard(_) = self.route() {
            self.spawn_load(ViewKey::Overview);
        }

        while !self.should_quit {
            while let Ok(msg) = self.rx.try_recv() {
                self.on_fetch(msg);
            }

            terminal.draw(|frame| crate::ui::draw(frame, self))?;

            if event::poll(Duration::from_millis(50))? {
                if let Event::Key(key) = event::read()? {
                    if key.kind == KeyEventKind::Press {
                        self.on_key(key).await;
                    }
                }
            }
        }
        Ok(())
    }

    // -----------------------------------------------------------------------
    // Background loads
    // -----------------------------------------------------------------------

    fn spawn_load(&mut self, view: ViewKey) {
        self.row = 0;
        let api = self.api.clone();
        let tx = self.tx.clone();

        match self.route() {
            Route::Dashboard(DashboardVariant::Admin) => {
                let ticket = self.admin.select_view(view);
                tokio::spawn(async move {
                    let result = AdminController::fetch(&api, view).await;
                    let _ = tx.send(FetchMsg::Admin(ticket, result));
                });
            }
            Route::Dashboard(DashboardVariant::Teacher) => {
                let ticket = self.teacher.select_view(view);
                tokio::spawn(async move {
                    let result = TeacherController::fetch(&api, view).await;
                    let _ = tx.send(FetchMsg::Teacher(ticket, result));
                });
            }
            Route::Dashboard(DashboardVariant::Student) => {
                let ticket = self.student.select_view(view);
                tokio::spawn(async move {
                    let result = StudentController::fetch(&api, view).await;
                    let _ = tx.send(FetchMsg::Student(ticket, result));
                });
            }
            _ => {}
        }
    }

    fn on_fetch(&mut self, msg: FetchMsg) {
        match msg {
            FetchMsg::Admin(ticket, result) => self.admin.apply(ticket, result),
            FetchMsg::Teacher(ticket, result) => self.teacher.apply(ticket, result),
            FetchMsg::Student(ticket, result) => self.student.apply(ticket, result),
        }
    }

    pub fn current_view(&self) -> ViewKey {
        match self.route() {
            Route::Dashboard(DashboardVariant::Admin) => self.admin.view(),
            Route::Dashboard(DashboardVariant::Teacher) => self.teacher.view(),
            Route::Dashboard(DashboardVariant::Student) => self.student.view(),
            _ => ViewKey::Overview,
        }
    }

    fn table_len(&self) -> usize {
        match self.route() {
            Route::Dashboard(DashboardVariant::Admin) => match self.admin.view() {
                ViewKey::Users => self.admin.users.len(),
                ViewKey::Students => self.admin.students.len(),
                ViewKey::Teachers => self.admin.teachers.len(),
                ViewKey::Departments => self.admin.departments.len(),
                ViewKey::Courses => self.admin.courses.len(),
                _ => 0,
            },
            Route::Dashboard(DashboardVariant::Teacher) => match self.teacher.view() {
                ViewKey::Courses => self.teacher.courses.len(),
                _ => 0,
            },
            Route::Dashboard(DashboardVariant::Student) => match self.student.view() {
                ViewKey::Courses => self.student.courses.len(),
                _ => 0,
            },
            _ => 0,
        }
    }

    // -----------------------------------------------------------------------
    // Key dispatch
    // -----------------------------------------------------------------------

    async fn on_key(&mut self, key: KeyEvent) {
        if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
            self.should_quit = true;
            return;
        }

        if self.confirm.is_some() {
            self.on_confirm_key(key).await;
            return;
        }
        if self.modal.is_some() {
            self.on_modal_key(key).await;
            return;
        }

        match self.route() {
            Route::Loading => {}
            Route::Login => match self.auth_screen {
                AuthScreen::Login => self.on_login_key(key).await,
                AuthScreen::Register => self.on_register_key(key).await,
            },
            Route::Denied => {
                if let KeyCode::Esc | KeyCode::Char('q') = key.code {
                    self.logout().await;
                }
            }
            Route::Dashboard(variant) => self.on_dashboard_key(variant, key).await,
        }
    }

    // -----------------------------------------------------------------------
    // Auth screens
    // -----------------------------------------------------------------------

    async fn on_login_key(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Esc => self.should_quit = true,
            KeyCode::Tab | KeyCode::Down => self.login_form.focus_next(),
            KeyCode::BackTab | KeyCode::Up => self.login_form.focus_prev(),
            KeyCode::Backspace => self.login_form.backspace(),
            KeyCode::F(2) => {
                self.flash = None;
                self.auth_screen = AuthScreen::Register;
            }
            KeyCode::Enter => self.submit_login().await,
            KeyCode::Char(c) => self.login_form.input(c),
            _ => {}
        }
    }

    async fn submit_login(&mut self) {
        let email = self.login_form.value("Email").to_string();
        let password = self.login_form.value("Password").to_string();
        if email.is_empty() || password.is_empty() {
            self.flash = Some("Email and password are required".into());
            return;
        }

        match self.session.login(&self.api, &email, &password).await {
            Ok(()) => {
                self.flash = None;
                self.login_form = login_form();
                self.spawn_load(ViewKey::Overview);
            }
            Err(e) => self.flash = Some(e.to_string()),
        }
    }

    async fn on_register_key(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Esc => {
                self.flash = None;
                self.register_as_admin = false;
                self.auth_screen = AuthScreen::Login;
            }
            KeyCode::Tab | KeyCode::Down => self.register_form.focus_next(),
            KeyCode::BackTab | KeyCode::Up => self.register_form.focus_prev(),
            KeyCode::Backspace => self.register_form.backspace(),
            KeyCode::F(2) => self.register_as_admin = !self.register_as_admin,
            KeyCode::Enter => self.submit_register().await,
            KeyCode::Char(c) => self.register_form.input(c),
            _ => {}
        }
    }

    async fn submit_register(&mut self) {
        let phone = self.register_form.value("Phone").trim().to_string();
        let form = RegistrationForm {
            username: self.register_form.value("Username").to_string(),
            email: self.register_form.value("Email").to_string(),
            password: self.register_form.value("Password").to_string(),
            confirm_password: self.register_form.value("Confirm password").to_string(),
            phone: (!phone.is_empty()).then_some(phone),
        };

        // Local presorting: invalid forms never reach the network.
        if let Err(e) = validate_registration(&form) {
            self.flash = Some(e.to_string());
            return;
        }

        let result = if self.register_as_admin {
            match self.config.auth.resolved_access_code() {
                Some(code) => self.session.register_admin(&self.api, &form, &code).await,
                None => {
                    self.flash = Some("Admin access code not configured".into());
                    return;
                }
            }
        } else {
            self.session.register(&self.api, &form).await
        };

        match result {
            Ok(_) => {
                self.flash = Some("Registration successful! Please log in.".into());
                self.register_form = register_form();
                self.register_as_admin = false;
                self.auth_screen = AuthScreen::Login;
            }
            Err(e) => self.flash = Some(e.to_string()),
        }
    }

    // -----------------------------------------------------------------------
    // Dashboards
    // -----------------------------------------------------------------------

    async fn on_dashboard_key(&mut self, variant: DashboardVariant, key: KeyEvent) {
        match key.code {
            KeyCode::Char('q') => self.should_quit = true,
            KeyCode::Esc => self.logout().await,
            KeyCode::Char('r') => {
                let view = self.current_view();
                self.spawn_load(view);
            }
            KeyCode::Left | KeyCode::BackTab => self.cycle_menu(-1),
            KeyCode::Right | KeyCode::Tab => self.cycle_menu(1),
            KeyCode::Up => self.row = self.row.saturating_sub(1),
            KeyCode::Down => {
                let len = self.table_len();
                if len > 0 && self.row + 1 < len {
                    self.row += 1;
                }
            }
            _ => match variant {
                DashboardVariant::Admin => self.on_admin_key(key).await,
                DashboardVariant::Student => self.on_student_key(key).await,
                DashboardVariant::Teacher => {}
            },
        }
    }

    fn cycle_menu(&mut self, step: isize) {
        let Some(user) = self.session.user() else {
            return;
        };
        let entries = client::router::visible_menu(user);
        let current = self.current_view();
        let pos = entries
            .iter()
            .position(|e| e.view == current)
            .unwrap_or(0) as isize;
        let next = (pos + step).rem_euclid(entries.len() as isize) as usize;
        let view = entries[next].view;
        self.spawn_load(view);
    }

    async fn logout(&mut self) {
        self.session.logout(&self.api).await;
        self.admin = AdminController::new();
        self.teacher = TeacherController::new();
        self.student = StudentController::new();
        self.modal = None;
        self.confirm = None;
        self.row = 0;
        self.auth_screen = AuthScreen::Login;
        self.flash = Some("Logged out".into());
    }

    // -----------------------------------------------------------------------
    // Admin actions
    // -----------------------------------------------------------------------

    async fn on_admin_key(&mut self, key: KeyEvent) {
        match (key.code, self.admin.view()) {
            (KeyCode::Char('n'), ViewKey::Departments) => {
                self.modal = Some(Modal {
                    form: Form::new("New department", &[("Name", false)]),
                    kind: ModalKind::CreateDepartment,
                });
            }
            (KeyCode::Char('n'), ViewKey::Courses) => {
                self.modal = Some(Modal {
                    form: Form::new(
                        "New course",
                        &[
                            ("Teacher id", false),
                            ("Name", false),
                            ("Course number", false),
                            ("Description", false),
                            ("Credits", false),
                            ("Timeslots", false),
                        ],
                    ),
                    kind: ModalKind::CreateCourse,
                });
            }
            (KeyCode::Char('e'), ViewKey::Courses) => {
                if let Some(course) = self.admin.courses.get(self.row) {
                    let mut form = Form::new(
                        "Edit course",
                        &[
                            ("Teacher id", false),
                            ("Name", false),
                            ("Course number", false),
                            ("Description", false),
                            ("Credits", false),
                            ("Timeslots", false),
                        ],
                    );
                    form.set_value("Teacher id", &course.teacher_id.to_string());
                    form.set_value("Name", &course.course);
                    form.set_value("Course number", &course.course_nr);
                    form.set_value("Description", &course.description);
                    form.set_value("Credits", &course.cr_cost.to_string());
                    form.set_value("Timeslots", &course.timeslots);
                    self.modal = Some(Modal {
                        form,
                        kind: ModalKind::EditCourse(course.id),
                    });
                }
            }
            (KeyCode::Char('e'), ViewKey::Users) => {
                if let Some(user) = self.admin.users.get(self.row) {
                    let mut form = Form::new(
                        "Edit user",
                        &[
                            ("Username", false),
                            ("Email", false),
                            ("Phone", false),
                            ("Role", false),
                        ],
                    );
                    form.set_value("Username", &user.username);
                    form.set_value("Email", &user.email);
                    form.set_value("Phone", &user.phone);
                    form.set_value("Role", &user.role.to_string());
                    self.modal = Some(Modal {
                        form,
                        kind: ModalKind::EditUser(user.id),
                    });
                }
            }
            (KeyCode::Char('i'), ViewKey::Departments) => {
                if let Some(dept) = self.admin.departments.get(self.row) {
                    self.modal = Some(Modal {
                        form: Form::new("Invite teacher", &[("Teacher id", false)]),
                        kind: ModalKind::InviteTeacher(dept.id),
                    });
                }
            }
            (KeyCode::Char('k'), ViewKey::Departments) => {
                if let Some(dept) = self.admin.departments.get(self.row) {
                    self.modal = Some(Modal {
                        form: Form::new("Kick teacher", &[("Teacher id", false)]),
                        kind: ModalKind::KickTeacher(dept.id),
                    });
                }
            }
            (KeyCode::Char('d'), view) => self.request_delete(view),
            _ => {}
        }
    }

    /// Deletes always go through a confirmation prompt.
    fn request_delete(&mut self, view: ViewKey) {
        let confirm = match view {
            ViewKey::Users => self.admin.users.get(self.row).map(|u| Confirm {
                prompt: format!("Delete user \"{}\"? (y/n)", u.username),
                action: ConfirmAction::DeleteUser(u.id),
            }),
            ViewKey::Courses => self.admin.courses.get(self.row).map(|c| Confirm {
                prompt: format!("Delete course \"{}\"? (y/n)", c.course),
                action: ConfirmAction::DeleteCourse(c.id),
            }),
            ViewKey::Departments => self.admin.departments.get(self.row).map(|d| Confirm {
                prompt: format!("Delete department \"{}\"? (y/n)", d.name),
                action: ConfirmAction::DeleteDepartment(d.id),
            }),
            _ => None,
        };
        if confirm.is_some() {
            self.confirm = confirm;
        }
    }

    async fn on_confirm_key(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Char('y') | KeyCode::Char('Y') => {
                if let Some(confirm) = self.confirm.take() {
                    match confirm.action {
                        ConfirmAction::DeleteUser(id) => {
                            self.admin.delete_user(&self.api, id).await;
                        }
                        ConfirmAction::DeleteCourse(id) => {
                            self.admin.delete_course(&self.api, id).await;
                        }
                        ConfirmAction::DeleteDepartment(id) => {
                            self.admin.delete_department(&self.api, id).await;
                        }
                    }
                    self.row = self.row.min(self.table_len().saturating_sub(1));
                }
            }
            KeyCode::Char('n') | KeyCode::Char('N') | KeyCode::Esc => {
                self.confirm = None;
            }
            _ => {}
        }
    }

    async fn on_modal_key(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Esc => self.modal = None,
            KeyCode::Tab | KeyCode::Down => {
                if let Some(modal) = self.modal.as_mut() {
                    modal.form.focus_next();
                }
            }
            KeyCode::BackTab | KeyCode::Up => {
                if let Some(modal) = self.modal.as_mut() {
                    modal.form.focus_prev();
                }
            }
            KeyCode::Backspace => {
                if let Some(modal) = self.modal.as_mut() {
                    modal.form.backspace();
                }
            }
            KeyCode::Enter => self.submit_modal().await,
            KeyCode::Char(c) => {
                if let Some(modal) = self.modal.as_mut() {
                    modal.form.input(c);
                }
            }
            _ => {}
        }
    }

    async fn submit_modal(&mut self) {
        let Some(modal) = self.modal.take() else {
            return;
        };

        let done = match modal.kind {
            ModalKind::CreateDepartment => {
                let form = DepartmentForm {
                    name: modal.form.value("Name").trim().to_string(),
                };
                self.admin.create_department(&self.api, &form).await
            }
            ModalKind::CreateCourse => {
                let form = CourseForm {
                    teacher_id: modal.form.value("Teacher id").trim().parse().unwrap_or(0),
                    course: modal.form.value("Name").trim().to_string(),
                    course_nr: modal.form.value("Course number").trim().to_string(),
                    description: modal.form.value("Description").trim().to_string(),
                    cr_cost: modal.form.value("Credits").trim().parse().unwrap_or(0),
                    timeslots: modal.form.value("Timeslots").trim().to_string(),
                };
                self.admin.create_course(&self.api, &form).await
            }
            ModalKind::EditCourse(id) => {
                let form = CourseForm {
                    teacher_id: modal.form.value("Teacher id").trim().parse().unwrap_or(0),
                    course: modal.form.value("Name").trim().to_string(),
                    course_nr: modal.form.value("Course number").trim().to_string(),
                    description: modal.form.value("Description").trim().to_string(),
                    cr_cost: modal.form.value("Credits").trim().parse().unwrap_or(0),
                    timeslots: modal.form.value("Timeslots").trim().to_string(),
                };
                self.admin.update_course(&self.api, id, &form).await
            }
            ModalKind::EditUser(id) => {
                let update = UserUpdate {
                    username: non_empty(modal.form.value("Username")),
                    email: non_empty(modal.form.value("Email")),
                    phone: Some(modal.form.value("Phone").trim().to_string()),
                    role: parse_role(modal.form.value("Role")),
                    verified: None,
                    suspended: None,
                };
                self.admin.update_user(&self.api, id, &update).await
            }
            ModalKind::InviteTeacher(dept) => match parse_id(modal.form.value("Teacher id")) {
                Some(teacher) => self.admin.invite_to_department(&self.api, dept, teacher).await,
                None => {
                    self.admin.error = Some("Teacher id must be a number".into());
                    false
                }
            },
            ModalKind::KickTeacher(dept) => match parse_id(modal.form.value("Teacher id")) {
                Some(teacher) => self.admin.kick_from_department(&self.api, dept, teacher).await,
                None => {
                    self.admin.error = Some("Teacher id must be a number".into());
                    false
                }
            },
        };

        if !done {
            // Keep the dialog open so the input can be corrected; the error
            // banner explains what was wrong.
            self.modal = Some(modal);
        }
    }

    // -----------------------------------------------------------------------
    // Student actions
    // -----------------------------------------------------------------------

    async fn on_student_key(&mut self, key: KeyEvent) {
        if key.code != KeyCode::Enter || self.student.view() != ViewKey::Courses {
            return;
        }
        let Some(course) = self.student.courses.get(self.row) else {
            return;
        };
        let course_id = course.id;

        if self.student.is_enrolled(course_id) {
            self.student.unenroll(&self.api, course_id).await;
        } else {
            self.student.enroll(&self.api, course_id).await;
        }
    }
}

fn non_empty(value: &str) -> Option<String> {
    let trimmed = value.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_string())
}

fn parse_id(value: &str) -> Option<i64> {
    value.trim().parse().ok()
}

fn parse_role(value: &str) -> Option<Role> {
    match value.trim().to_ascii_lowercase().as_str() {
        "student" => Some(Role::Student),
        "teacher" => Some(Role::Teacher),
        "admin" => Some(Role::Admin),
        _ => None,
    }
}
