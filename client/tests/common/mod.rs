#![allow(dead_code)] // each test binary uses a different slice of this module

//! In-process stub backend for integration tests.
//!
//! Serves the university REST surface over real HTTP on a loopback port so
//! the client under test exercises its full request path: header-based
//! identity, envelope unwrapping, error mapping. State lives in a shared
//! `Mutex` the tests can seed and inspect.

use std::convert::Infallible;
use std::sync::{Arc, Mutex};

use bytes::Bytes;
use http_body_util::Full;
use hyper::body::Incoming;
use hyper::server::conn::http1;
use hyper::service::service_fn;
use hyper::{Method, Request, Response, StatusCode};
use hyper_util::rt::TokioIo;
use tokio::net::TcpListener;

use shared::types::{Course, Department};

pub struct BackendState {
    /// The single seeded account: its JSON (including the `password` field
    /// the real backend echoes) and the password accepted for login.
    pub account: serde_json::Value,
    pub password: String,
    pub users: Vec<serde_json::Value>,
    pub teachers: Vec<serde_json::Value>,
    pub students: Vec<serde_json::Value>,
    pub courses: Vec<Course>,
    pub departments: Vec<Department>,
    pub enrolled: Vec<i64>,
    pub next_id: i64,
    /// When set, `GET /logout` answers 500.
    pub fail_logout: bool,
    /// `(method, path)` log of every request received.
    pub requests: Vec<(String, String)>,
}

impl BackendState {
    pub fn new(account: serde_json::Value, password: &str) -> Self {
        Self {
            account,
            password: password.to_string(),
            users: Vec::new(),
            teachers: Vec::new(),
            students: Vec::new(),
            courses: Vec::new(),
            departments: Vec::new(),
            enrolled: Vec::new(),
            next_id: 100,
            fail_logout: false,
            requests: Vec::new(),
        }
    }
}

pub struct StubBackend {
    pub base_url: String,
    pub state: Arc<Mutex<BackendState>>,
}

impl StubBackend {
    pub async fn spawn(state: BackendState) -> Self {
        let state = Arc::new(Mutex::new(state));
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();

        let serve_state = state.clone();
        tokio::spawn(async move {
            loop {
                let (stream, _) = match listener.accept().await {
                    Ok(conn) => conn,
                    Err(_) => break,
                };
                let io = TokioIo::new(stream);
                let conn_state = serve_state.clone();
                tokio::spawn(async move {
                    let service =
                        service_fn(move |req| handle(req, conn_state.clone()));
                    let _ = http1::Builder::new().serve_connection(io, service).await;
                });
            }
        });

        Self {
            base_url: format!("http://{}", addr),
            state,
        }
    }
}

fn json_response(status: StatusCode, body: serde_json::Value) -> Response<Full<Bytes>> {
    Response::builder()
        .status(status)
        .header("content-type", "application/json")
        .body(Full::new(Bytes::from(body.to_string())))
        .unwrap()
}

fn error_response(status: StatusCode, message: &str) -> Response<Full<Bytes>> {
    json_response(status, serde_json::json!({ "error": message }))
}

fn header<'a>(req: &'a Request<Incoming>, name: &str) -> Option<&'a str> {
    req.headers().get(name).and_then(|v| v.to_str().ok())
}

fn authorized(req: &Request<Incoming>, state: &BackendState) -> bool {
    let email = state.account["email"].as_str().unwrap_or_default();
    header(req, "login_email") == Some(email)
        && header(req, "login_password") == Some(state.password.as_str())
}

fn path_id(path: &str) -> Option<i64> {
    path.trim_end_matches('/').rsplit('/').next()?.parse().ok()
}

async fn handle(
    req: Request<Incoming>,
    state: Arc<Mutex<BackendState>>,
) -> Result<Response<Full<Bytes>>, Infallible> {
    let mut state = state.lock().unwrap();
    let method = req.method().clone();
    let path = req.uri().path().to_string();
    state.requests.push((method.to_string(), path.clone()));

    // Unauthenticated endpoints first.
    match (&method, path.as_str()) {
        (&Method::POST, "/login") => {
            let email = state.account["email"].as_str().unwrap_or_default();
            let ok = header(&req, "login_email") == Some(email)
                && header(&req, "login_password") == Some(state.password.as_str());
            let resp = if ok {
                json_response(StatusCode::OK, state.account.clone())
            } else {
                error_response(StatusCode::UNAUTHORIZED, "Invalid credentials")
            };
            return Ok(resp);
        }
        (&Method::POST, "/register") => {
            let complete = ["username", "password", "email", "phone"]
                .iter()
                .all(|h| header(&req, h).is_some());
            let resp = if complete {
                json_response(StatusCode::OK, serde_json::json!({"message": "registered"}))
            } else {
                error_response(StatusCode::BAD_REQUEST, "Missing registration field")
            };
            return Ok(resp);
        }
        (&Method::POST, "/admin/register") => {
            let resp = if header(&req, "access_code") == Some("campus-code") {
                json_response(StatusCode::OK, serde_json::json!({"message": "registered"}))
            } else {
                error_response(StatusCode::FORBIDDEN, "Invalid access code")
            };
            return Ok(resp);
        }
        _ => {}
    }

    if !authorized(&req, &state) {
        return Ok(error_response(StatusCode::UNAUTHORIZED, "Not logged in"));
    }

    let resp = match (&method, path.as_str()) {
        (&Method::GET, "/logout") => {
            if state.fail_logout {
                error_response(StatusCode::INTERNAL_SERVER_ERROR, "Logout failed")
            } else {
                json_response(StatusCode::OK, serde_json::json!({"message": "bye"}))
            }
        }

        (&Method::GET, "/users") => {
            json_response(StatusCode::OK, serde_json::json!(state.users))
        }
        (&Method::GET, "/students") => {
            json_response(StatusCode::OK, serde_json::json!(state.students))
        }
        (&Method::GET, "/teachers") => {
            json_response(StatusCode::OK, serde_json::json!(state.teachers))
        }

        (&Method::GET, "/self") => {
            let mut profile = state.account.clone();
            let enrolled: Vec<&Course> = state
                .courses
                .iter()
                .filter(|c| state.enrolled.contains(&c.id))
                .collect();
            profile["courses"] = serde_json::json!(enrolled);
            json_response(StatusCode::OK, profile)
        }

        (&Method::GET, "/courses") => json_response(
            StatusCode::OK,
            serde_json::json!({ "courses": state.courses }),
        ),
        (&Method::POST, "/courses") => {
            let id = state.next_id;
            state.next_id += 1;
            let course = Course {
                id,
                teacher_id: header(&req, "id").and_then(|v| v.parse().ok()).unwrap_or(0),
                course: header(&req, "name").unwrap_or_default().to_string(),
                course_nr: header(&req, "course_nr").unwrap_or_default().to_string(),
                description: header(&req, "description").unwrap_or_default().to_string(),
                cr_cost: header(&req, "cr_cost").and_then(|v| v.parse().ok()).unwrap_or(0),
                timeslots: header(&req, "timeslots").unwrap_or_default().to_string(),
            };
            state.courses.push(course);
            json_response(StatusCode::OK, serde_json::json!({"message": "created"}))
        }
        (&Method::GET, p) if p.starts_with("/courses/") => {
            let id = path_id(p).unwrap_or(-1);
            match state.courses.iter().find(|c| c.id == id) {
                Some(course) => json_response(StatusCode::OK, serde_json::json!(course)),
                None => error_response(StatusCode::NOT_FOUND, "Course not found"),
            }
        }
        (&Method::PATCH, p) if p.starts_with("/courses/") => {
            let id = path_id(p).unwrap_or(-1);
            let teacher_id = header(&req, "id").and_then(|v| v.parse().ok());
            let name = header(&req, "name").map(str::to_string);
            let course_nr = header(&req, "course_nr").map(str::to_string);
            let description = header(&req, "description").map(str::to_string);
            let cr_cost = header(&req, "cr_cost").and_then(|v| v.parse().ok());
            let timeslots = header(&req, "timeslots").map(str::to_string);
            match state.courses.iter_mut().find(|c| c.id == id) {
                Some(course) => {
                    if let Some(v) = teacher_id {
                        course.teacher_id = v;
                    }
                    if let Some(v) = name {
                        course.course = v;
                    }
                    if let Some(v) = course_nr {
                        course.course_nr = v;
                    }
                    if let Some(v) = description {
                        course.description = v;
                    }
                    if let Some(v) = cr_cost {
                        course.cr_cost = v;
                    }
                    if let Some(v) = timeslots {
                        course.timeslots = v;
                    }
                    json_response(StatusCode::OK, serde_json::json!({"message": "updated"}))
                }
                None => error_response(StatusCode::NOT_FOUND, "Course not found"),
            }
        }
        (&Method::DELETE, p) if p.starts_with("/courses/") => {
            let id = path_id(p).unwrap_or(-1);
            let before = state.courses.len();
            state.courses.retain(|c| c.id != id);
            if state.courses.len() == before {
                error_response(StatusCode::NOT_FOUND, "Course not found")
            } else {
                json_response(StatusCode::OK, serde_json::json!({"message": "deleted"}))
            }
        }

        (&Method::GET, "/departments") => {
            json_response(StatusCode::OK, serde_json::json!(state.departments))
        }
        (&Method::GET, p) if p.starts_with("/departments/") => {
            let id = path_id(p).unwrap_or(-1);
            match state.departments.iter().find(|d| d.id == id) {
                Some(dept) => json_response(StatusCode::OK, serde_json::json!(dept)),
                None => error_response(StatusCode::NOT_FOUND, "Department not found"),
            }
        }
        (&Method::POST, "/departments") => {
            let id = state.next_id;
            state.next_id += 1;
            let name = header(&req, "name").unwrap_or_default().to_string();
            if name.is_empty() {
                error_response(StatusCode::BAD_REQUEST, "Department name is required")
            } else {
                state.departments.push(Department { id, name });
                json_response(StatusCode::OK, serde_json::json!({"message": "created"}))
            }
        }
        (&Method::DELETE, p) if p.starts_with("/departments/") => {
            let id = path_id(p).unwrap_or(-1);
            // The contract sends the id both in the path and as a header.
            if header(&req, "id").and_then(|v| v.parse::<i64>().ok()) != Some(id) {
                error_response(StatusCode::BAD_REQUEST, "Header id mismatch")
            } else {
                let before = state.departments.len();
                state.departments.retain(|d| d.id != id);
                if state.departments.len() == before {
                    error_response(StatusCode::NOT_FOUND, "Department not found")
                } else {
                    json_response(StatusCode::OK, serde_json::json!({"message": "deleted"}))
                }
            }
        }

        (&Method::PATCH, p) if p.starts_with("/admin/users/") => {
            let id = path_id(p).unwrap_or(-1);
            let username = header(&req, "username").map(str::to_string);
            let mut found = false;
            for user in state.users.iter_mut() {
                if user["id"].as_i64() == Some(id) {
                    if let Some(name) = &username {
                        user["username"] = serde_json::json!(name);
                    }
                    found = true;
                }
            }
            if found {
                json_response(StatusCode::OK, serde_json::json!({"message": "updated"}))
            } else {
                error_response(StatusCode::NOT_FOUND, "User not found")
            }
        }
        (&Method::DELETE, p) if p.starts_with("/admin/users/") => {
            let id = path_id(p).unwrap_or(-1);
            let before = state.users.len();
            state.users.retain(|u| u["id"].as_i64() != Some(id));
            if state.users.len() == before {
                error_response(StatusCode::NOT_FOUND, "User not found")
            } else {
                json_response(StatusCode::OK, serde_json::json!({"message": "deleted"}))
            }
        }

        (&Method::POST, p) if p.starts_with("/admin/department/") => {
            if header(&req, "teacher_id").is_some() {
                json_response(StatusCode::OK, serde_json::json!({"message": "invited"}))
            } else {
                error_response(StatusCode::BAD_REQUEST, "teacher_id required")
            }
        }
        (&Method::DELETE, p) if p.starts_with("/admin/department/") => {
            if header(&req, "teacher_id").is_some() {
                json_response(StatusCode::OK, serde_json::json!({"message": "kicked"}))
            } else {
                error_response(StatusCode::BAD_REQUEST, "teacher_id required")
            }
        }

        (&Method::POST, p) if p.starts_with("/enroll/") => {
            let id = path_id(p).unwrap_or(-1);
            if state.enrolled.contains(&id) {
                error_response(StatusCode::CONFLICT, "Already enrolled")
            } else if !state.courses.iter().any(|c| c.id == id) {
                error_response(StatusCode::NOT_FOUND, "Course not found")
            } else {
                state.enrolled.push(id);
                json_response(StatusCode::OK, serde_json::json!({"message": "enrolled"}))
            }
        }
        (&Method::DELETE, p) if p.starts_with("/unenroll/") => {
            let id = path_id(p).unwrap_or(-1);
            let before = state.enrolled.len();
            state.enrolled.retain(|e| *e != id);
            if state.enrolled.len() == before {
                error_response(StatusCode::NOT_FOUND, "Not enrolled")
            } else {
                json_response(StatusCode::OK, serde_json::json!({"message": "unenrolled"}))
            }
        }

        (&Method::GET, "/admin/stats") => json_response(
            StatusCode::OK,
            serde_json::json!({
                "registered_users": state.users.len(),
                "suspended_users": 0,
                "faculty_members": state.teachers.len(),
                "active_students": state.students.len(),
                "graduated_students": 0,
                "courses": state.courses.len(),
                "departments": state.departments.len(),
            }),
        ),

        _ => error_response(StatusCode::NOT_FOUND, "No such endpoint"),
    };

    Ok(resp)
}

// ---------------------------------------------------------------------------
// Seed helpers
// ---------------------------------------------------------------------------

pub fn account_json(id: i64, username: &str, email: &str, role: &str, password: &str) -> serde_json::Value {
    serde_json::json!({
        "id": id,
        "username": username,
        "email": email,
        "phone": "",
        "role": role,
        "verified": true,
        "suspended": false,
        "forcenewpw": false,
        "password": password,
    })
}

pub fn seed_course(id: i64, teacher_id: i64, name: &str, cr_cost: i64) -> Course {
    Course {
        id,
        teacher_id,
        course: name.to_string(),
        course_nr: format!("NR-{}", id),
        description: format!("{} description", name),
        cr_cost,
        timeslots: "Mon 9-11".to_string(),
    }
}
