use reqwest::Method;
use reqwest::header::{HeaderMap, HeaderValue};
use serde::de::DeserializeOwned;
use tracing::{debug, info};
use url::Url;

use shared::types::{
    ApiMessage, Course, CourseForm, CourseList, Department, DepartmentForm, RegistrationForm,
    SelfProfile, Statistics, User, UserUpdate,
};

use crate::api::error::ApiError;
use crate::session::CredentialStore;

/// One operation per backend endpoint.
///
/// The backend contract is header-based: writes carry their fields as
/// request headers with empty bodies, and every authenticated call attaches
/// the persisted credential's email and password as `login_email` /
/// `login_password`. Responses come back as parsed domain objects; list
/// envelopes are unwrapped before returning. No retries, no backoff.
#[derive(Clone, Debug)]
pub struct ApiClient {
    http: reqwest::Client,
    base: Url,
    store: CredentialStore,
}

impl ApiClient {
    pub fn new(base_url: &str, store: CredentialStore) -> Result<Self, ApiError> {
        let base = Url::parse(base_url)?;
        Ok(Self {
            http: reqwest::Client::new(),
            base,
            store,
        })
    }

    // -----------------------------------------------------------------------
    // Authentication
    // -----------------------------------------------------------------------

    /// `POST /login`; credentials passed explicitly as headers, not body.
    pub async fn login(&self, email: &str, password: &str) -> Result<User, ApiError> {
        info!("Logging in as {}", email);
        let mut headers = HeaderMap::new();
        headers.insert("login_email", hv(email)?);
        headers.insert("login_password", hv(password)?);

        let resp = self
            .http
            .post(self.url("/login")?)
            .headers(headers)
            .send()
            .await?;
        Ok(Self::check(resp).await?.json().await?)
    }

    /// `GET /logout`. The caller clears local state regardless of outcome.
    pub async fn logout(&self) -> Result<(), ApiError> {
        let resp = self
            .http
            .get(self.url("/logout")?)
            .headers(self.identity_headers().await?)
            .send()
            .await?;
        Self::check(resp).await?;
        Ok(())
    }

    /// `POST /register`.
    pub async fn register(&self, form: &RegistrationForm) -> Result<ApiMessage, ApiError> {
        info!("Registering account {}", form.username);
        let mut headers = HeaderMap::new();
        headers.insert("username", hv(&form.username)?);
        headers.insert("password", hv(&form.password)?);
        headers.insert("email", hv(&form.email)?);
        headers.insert("phone", hv(form.phone.as_deref().unwrap_or(""))?);

        self.send_message(Method::POST, "/register", headers).await
    }

    /// `POST /admin/register`; same fields plus the access code.
    pub async fn register_admin(
        &self,
        form: &RegistrationForm,
        access_code: &str,
    ) -> Result<ApiMessage, ApiError> {
        info!("Registering admin account {}", form.username);
        let mut headers = HeaderMap::new();
        headers.insert("username", hv(&form.username)?);
        headers.insert("password", hv(&form.password)?);
        headers.insert("email", hv(&form.email)?);
        headers.insert("phone", hv(form.phone.as_deref().unwrap_or(""))?);
        headers.insert("access_code", hv(access_code)?);

        self.send_message(Method::POST, "/admin/register", headers)
            .await
    }

    // -----------------------------------------------------------------------
    // Users
    // -----------------------------------------------------------------------

    pub async fn users(&self) -> Result<Vec<User>, ApiError> {
        self.get_json("/users").await
    }

    pub async fn students(&self) -> Result<Vec<User>, ApiError> {
        self.get_json("/students").await
    }

    pub async fn teachers(&self) -> Result<Vec<User>, ApiError> {
        self.get_json("/teachers").await
    }

    /// `GET /self`; own profile, including enrolled courses for students.
    pub async fn get_self(&self) -> Result<SelfProfile, ApiError> {
        self.get_json("/self").await
    }

    /// `PATCH /admin/users/{id}`; only fields present on the patch become
    /// headers; everything else stays untouched server-side.
    pub async fn update_user(&self, id: i64, update: &UserUpdate) -> Result<ApiMessage, ApiError> {
        let mut headers = HeaderMap::new();
        if let Some(username) = &update.username {
            headers.insert("username", hv(username)?);
        }
        if let Some(email) = &update.email {
            headers.insert("email", hv(email)?);
        }
        if let Some(phone) = &update.phone {
            headers.insert("phone", hv(phone)?);
        }
        if let Some(role) = &update.role {
            headers.insert("role", hv(&role.to_string())?);
        }
        if let Some(verified) = update.verified {
            headers.insert("verified", hv(&verified.to_string())?);
        }
        if let Some(suspended) = update.suspended {
            headers.insert("suspended", hv(&suspended.to_string())?);
        }

        self.send_message(Method::PATCH, &format!("/admin/users/{}", id), headers)
            .await
    }

    pub async fn delete_user(&self, id: i64) -> Result<ApiMessage, ApiError> {
        let mut headers = HeaderMap::new();
        headers.insert("user_id", hv(&id.to_string())?);
        self.send_message(Method::DELETE, &format!("/admin/users/{}", id), headers)
            .await
    }

    // -----------------------------------------------------------------------
    // Courses
    // -----------------------------------------------------------------------

    /// `GET /courses`; unwraps the `{courses: [...]}` envelope, defaulting
    /// to an empty list when the field is absent.
    pub async fn courses(&self) -> Result<Vec<Course>, ApiError> {
        let list: CourseList = self.get_json("/courses").await?;
        Ok(list.courses)
    }

    pub async fn course(&self, id: i64) -> Result<Course, ApiError> {
        let mut headers = HeaderMap::new();
        headers.insert("id", hv(&id.to_string())?);
        let resp = self
            .http
            .get(self.url(&format!("/courses/{}", id))?)
            .headers(self.identity_headers().await?)
            .headers(headers)
            .send()
            .await?;
        Ok(Self::check(resp).await?.json().await?)
    }

    pub async fn create_course(&self, form: &CourseForm) -> Result<ApiMessage, ApiError> {
        self.send_message(Method::POST, "/courses", course_headers(form)?)
            .await
    }

    pub async fn update_course(
        &self,
        id: i64,
        form: &CourseForm,
    ) -> Result<ApiMessage, ApiError> {
        self.send_message(
            Method::PATCH,
            &format!("/courses/{}", id),
            course_headers(form)?,
        )
        .await
    }

    pub async fn delete_course(&self, id: i64) -> Result<ApiMessage, ApiError> {
        let mut headers = HeaderMap::new();
        headers.insert("id", hv(&id.to_string())?);
        self.send_message(Method::DELETE, &format!("/courses/{}", id), headers)
            .await
    }

    // -----------------------------------------------------------------------
    // Departments
    // -----------------------------------------------------------------------

    pub async fn departments(&self) -> Result<Vec<Department>, ApiError> {
        self.get_json("/departments").await
    }

    pub async fn department(&self, id: i64) -> Result<Department, ApiError> {
        let mut headers = HeaderMap::new();
        headers.insert("id", hv(&id.to_string())?);
        let resp = self
            .http
            .get(self.url(&format!("/departments/{}", id))?)
            .headers(self.identity_headers().await?)
            .headers(headers)
            .send()
            .await?;
        Ok(Self::check(resp).await?.json().await?)
    }

    pub async fn create_department(
        &self,
        form: &DepartmentForm,
    ) -> Result<ApiMessage, ApiError> {
        let mut headers = HeaderMap::new();
        headers.insert("name", hv(&form.name)?);
        self.send_message(Method::POST, "/departments", headers).await
    }

    pub async fn delete_department(&self, id: i64) -> Result<ApiMessage, ApiError> {
        let mut headers = HeaderMap::new();
        headers.insert("id", hv(&id.to_string())?);
        self.send_message(Method::DELETE, &format!("/departments/{}", id), headers)
            .await
    }

    pub async fn invite_to_department(
        &self,
        department_id: i64,
        teacher_id: i64,
    ) -> Result<ApiMessage, ApiError> {
        let mut headers = HeaderMap::new();
        headers.insert("teacher_id", hv(&teacher_id.to_string())?);
        self.send_message(
            Method::POST,
            &format!("/admin/department/{}", department_id),
            headers,
        )
        .await
    }

    pub async fn kick_from_department(
        &self,
        department_id: i64,
        teacher_id: i64,
    ) -> Result<ApiMessage, ApiError> {
        let mut headers = HeaderMap::new();
        headers.insert("teacher_id", hv(&teacher_id.to_string())?);
        self.send_message(
            Method::DELETE,
            &format!("/admin/department/{}", department_id),
            headers,
        )
        .await
    }

    // -----------------------------------------------------------------------
    // Enrollment
    // -----------------------------------------------------------------------

    pub async fn enroll(&self, course_id: i64) -> Result<ApiMessage, ApiError> {
        self.send_message(
            Method::POST,
            &format!("/enroll/{}", course_id),
            HeaderMap::new(),
        )
        .await
    }

    pub async fn unenroll(&self, course_id: i64) -> Result<ApiMessage, ApiError> {
        self.send_message(
            Method::DELETE,
            &format!("/unenroll/{}", course_id),
            HeaderMap::new(),
        )
        .await
    }

    // -----------------------------------------------------------------------
    // Admin
    // -----------------------------------------------------------------------

    pub async fn stats(&self) -> Result<Statistics, ApiError> {
        self.get_json("/admin/stats").await
    }

    // -----------------------------------------------------------------------
    // Plumbing
    // -----------------------------------------------------------------------

    fn url(&self, path: &str) -> Result<Url, ApiError> {
        Ok(self.base.join(path)?)
    }

    /// Identity headers from the persisted credential record, when present.
    async fn identity_headers(&self) -> Result<HeaderMap, ApiError> {
        let mut headers = HeaderMap::new();
        if let Some((email, password)) = self.store.identity().await {
            headers.insert("login_email", hv(&email)?);
            headers.insert("login_password", hv(&password)?);
        }
        Ok(headers)
    }

    async fn get_json<T: DeserializeOwned>(&self, path: &str) -> Result<T, ApiError> {
        debug!("GET {}", path);
        let resp = self
            .http
            .get(self.url(path)?)
            .headers(self.identity_headers().await?)
            .send()
            .await?;
        Ok(Self::check(resp).await?.json().await?)
    }

    /// Issue a bodyless request whose fields travel as headers; mutations
    /// all answer with the generic message envelope (possibly empty).
    async fn send_message(
        &self,
        method: Method,
        path: &str,
        extra: HeaderMap,
    ) -> Result<ApiMessage, ApiError> {
        debug!("{} {}", method, path);
        let mut headers = self.identity_headers().await?;
        headers.extend(extra);

        let resp = self
            .http
            .request(method, self.url(path)?)
            .headers(headers)
            .send()
            .await?;
        let resp = Self::check(resp).await?;
        Ok(resp.json().await.unwrap_or_default())
    }

    /// Map non-success responses to `ApiError::Backend`, preferring the
    /// backend's own error text over the generic fallback.
    async fn check(resp: reqwest::Response) -> Result<reqwest::Response, ApiError> {
        let status = resp.status();
        if status.is_success() {
            return Ok(resp);
        }

        let message = resp
            .json::<ApiMessage>()
            .await
            .ok()
            .and_then(|m| m.text().map(str::to_string))
            .unwrap_or_else(|| format!("Request failed with status {}", status));

        Err(ApiError::Backend { status, message })
    }
}

fn course_headers(form: &CourseForm) -> Result<HeaderMap, ApiError> {
    let mut headers = HeaderMap::new();
    // `id` is the teacher owning the course, per the backend contract.
    headers.insert("id", hv(&form.teacher_id.to_string())?);
    headers.insert("name", hv(&form.course)?);
    headers.insert("course_nr", hv(&form.course_nr)?);
    headers.insert("description", hv(&form.description)?);
    headers.insert("cr_cost", hv(&form.cr_cost.to_string())?);
    headers.insert("timeslots", hv(&form.timeslots)?);
    Ok(headers)
}

fn hv(value: &str) -> Result<HeaderValue, ApiError> {
    Ok(HeaderValue::from_str(value)?)
}
