//! Field validation for the three form kinds (login, signup, task editor).
//!
//! Validation is pure: each function takes the form's current values and
//! returns an ordered list of per-field errors. Fields are checked
//! independently, so one invalid field never masks another. Callers replace
//! their whole `FormErrors` value on every submit attempt, which is what
//! clears stale errors for fields that became valid.

use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
    static ref EMAIL_RE: Regex =
        Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").unwrap();
}

pub const MIN_NAME_LEN: usize = 3;
pub const MIN_PASSWORD_LEN: usize = 8;

const MSG_REQUIRED: &str = "This field is required";
const MSG_EMAIL: &str = "Please enter a valid email address";

/// One invalid field, with the message to show under it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldError {
    pub field: &'static str,
    pub err: String,
}

/// The result of one validation pass. Field order follows the order the
/// fields appear in the form.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FormErrors {
    records: Vec<FieldError>,
}

impl FormErrors {
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// The error message for a field, if it failed the last pass.
    pub fn error_for(&self, field: &str) -> Option<&str> {
        self.records
            .iter()
            .find(|r| r.field == field)
            .map(|r| r.err.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = &FieldError> {
        self.records.iter()
    }

    fn push(&mut self, field: &'static str, err: impl Into<String>) {
        self.records.push(FieldError {
            field,
            err: err.into(),
        });
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LoginForm {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SignupForm {
    pub name: String,
    pub email: String,
    pub password: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TaskForm {
    pub description: String,
}

pub fn validate_login(form: &LoginForm) -> FormErrors {
    let mut errors = FormErrors::default();
    check_email(&mut errors, &form.email);
    check_password(&mut errors, &form.password);
    errors
}

pub fn validate_signup(form: &SignupForm) -> FormErrors {
    let mut errors = FormErrors::default();
    check_name(&mut errors, &form.name);
    check_email(&mut errors, &form.email);
    check_password(&mut errors, &form.password);
    errors
}

pub fn validate_task(form: &TaskForm) -> FormErrors {
    let mut errors = FormErrors::default();
    if form.description.trim().is_empty() {
        errors.push("description", MSG_REQUIRED);
    }
    errors
}

fn check_name(errors: &mut FormErrors, name: &str) {
    if name.is_empty() {
        errors.push("name", MSG_REQUIRED);
    } else if name.chars().count() < MIN_NAME_LEN {
        errors.push(
            "name",
            format!("Name must be at least {MIN_NAME_LEN} characters long"),
        );
    }
}

fn check_email(errors: &mut FormErrors, email: &str) {
    if email.is_empty() {
        errors.push("email", MSG_REQUIRED);
    } else if !EMAIL_RE.is_match(email) {
        errors.push("email", MSG_EMAIL);
    }
}

fn check_password(errors: &mut FormErrors, password: &str) {
    if password.is_empty() {
        errors.push("password", MSG_REQUIRED);
    } else if password.chars().count() < MIN_PASSWORD_LEN {
        errors.push(
            "password",
            format!("Password must be at least {MIN_PASSWORD_LEN} characters long"),
        );
    }
}
