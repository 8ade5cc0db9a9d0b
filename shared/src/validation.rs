//! Local form validation: the client-side presort that keeps obviously
//! invalid requests off the wire. Display strings are the exact banner
//! messages shown to the user.

use thiserror::Error;

use crate::types::course::CourseForm;
use crate::types::department::DepartmentForm;
use crate::types::register::RegistrationForm;

/// Email domain every account must use.
pub const REQUIRED_EMAIL_DOMAIN: &str = "@aubg.edu";

/// Special characters accepted in passwords.
pub const PASSWORD_SPECIAL_CHARS: &str = "@$!%*?&";

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("{0} is required")]
    MissingField(&'static str),

    #[error("Passwords do not match")]
    PasswordMismatch,

    #[error("Password must be at least 8 characters long")]
    PasswordTooShort,

    #[error(
        "Password must contain at least 1 uppercase letter, 1 lowercase letter, \
         1 number, and 1 special character (@, $, !, %, *, ?, &)"
    )]
    PasswordComplexity,

    #[error("Email must end with @aubg.edu")]
    EmailDomain,

    #[error("Please select a teacher for this course")]
    TeacherNotSelected,

    #[error("All course fields are required")]
    CourseFieldsIncomplete,

    #[error("Department name is required")]
    DepartmentNameRequired,
}

// ---------------------------------------------------------------------------
// Registration
// ---------------------------------------------------------------------------

pub fn validate_registration(form: &RegistrationForm) -> Result<(), ValidationError> {
    if form.username.trim().is_empty() {
        return Err(ValidationError::MissingField("Username"));
    }

    if form.password != form.confirm_password {
        return Err(ValidationError::PasswordMismatch);
    }

    validate_password(&form.password)?;

    if !form.email.ends_with(REQUIRED_EMAIL_DOMAIN) {
        return Err(ValidationError::EmailDomain);
    }

    Ok(())
}

pub fn validate_password(password: &str) -> Result<(), ValidationError> {
    if password.len() < 8 {
        return Err(ValidationError::PasswordTooShort);
    }

    let has_upper = password.chars().any(|c| c.is_ascii_uppercase());
    let has_lower = password.chars().any(|c| c.is_ascii_lowercase());
    let has_digit = password.chars().any(|c| c.is_ascii_digit());
    let has_special = password.chars().any(|c| PASSWORD_SPECIAL_CHARS.contains(c));

    if !(has_upper && has_lower && has_digit && has_special) {
        return Err(ValidationError::PasswordComplexity);
    }

    Ok(())
}

// ---------------------------------------------------------------------------
// Course / department forms
// ---------------------------------------------------------------------------

pub fn validate_course_form(form: &CourseForm) -> Result<(), ValidationError> {
    if form.teacher_id <= 0 {
        return Err(ValidationError::TeacherNotSelected);
    }

    if form.course.trim().is_empty()
        || form.course_nr.trim().is_empty()
        || form.description.trim().is_empty()
        || form.timeslots.trim().is_empty()
        || form.cr_cost <= 0
    {
        return Err(ValidationError::CourseFieldsIncomplete);
    }

    Ok(())
}

pub fn validate_department_form(form: &DepartmentForm) -> Result<(), ValidationError> {
    if form.name.trim().is_empty() {
        return Err(ValidationError::DepartmentNameRequired);
    }

    Ok(())
}
