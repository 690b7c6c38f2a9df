//! Field checks run by handlers before anything reaches a store.

use std::sync::LazyLock;

use regex::Regex;
use serde::Serialize;

use crate::error::AppError;
use crate::models::CustomerData;

pub const MIN_PASSWORD_LEN: usize = 8;
pub const MAX_PHONE_LEN: usize = 20;

static EMAIL_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").expect("email regex compiles")
});

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct FieldError {
    pub field: &'static str,
    pub message: String,
}

impl FieldError {
    fn new(field: &'static str, message: &str) -> Self {
        Self {
            field,
            message: message.to_string(),
        }
    }
}

/// `Ok` when there is nothing to report.
pub fn into_result(errors: Vec<FieldError>) -> Result<(), AppError> {
    if errors.is_empty() {
        Ok(())
    } else {
        Err(AppError::Validation(errors))
    }
}

pub fn is_valid_email(email: &str) -> bool {
    EMAIL_RE.is_match(email)
}

fn check_required(errors: &mut Vec<FieldError>, field: &'static str, value: &str) -> bool {
    if value.trim().is_empty() {
        errors.push(FieldError::new(field, "is required"));
        false
    } else {
        true
    }
}

fn check_email(errors: &mut Vec<FieldError>, email: &str) {
    if check_required(errors, "email", email) && !is_valid_email(email.trim()) {
        errors.push(FieldError::new("email", "is not a valid email address"));
    }
}

fn check_password(errors: &mut Vec<FieldError>, field: &'static str, password: &str) {
    if password.chars().count() < MIN_PASSWORD_LEN {
        errors.push(FieldError {
            field,
            message: format!("must be at least {MIN_PASSWORD_LEN} characters"),
        });
    }
}

pub fn validate_registration(name: &str, email: &str, password: &str) -> Vec<FieldError> {
    let mut errors = Vec::new();
    check_required(&mut errors, "name", name);
    check_email(&mut errors, email);
    check_password(&mut errors, "password", password);
    errors
}

pub fn validate_login(email: &str, password: &str) -> Vec<FieldError> {
    let mut errors = Vec::new();
    check_required(&mut errors, "email", email);
    check_required(&mut errors, "password", password);
    errors
}

pub fn validate_profile(name: &str, email: &str) -> Vec<FieldError> {
    let mut errors = Vec::new();
    check_required(&mut errors, "name", name);
    check_email(&mut errors, email);
    errors
}

pub fn validate_password_change(current: &str, new: &str) -> Vec<FieldError> {
    let mut errors = Vec::new();
    check_required(&mut errors, "current_password", current);
    check_password(&mut errors, "new_password", new);
    errors
}

pub fn validate_customer(data: &CustomerData) -> Vec<FieldError> {
    let mut errors = Vec::new();
    check_required(&mut errors, "name", &data.name);
    check_email(&mut errors, &data.email);
    if let Some(phone) = &data.phone {
        if phone.chars().count() > MAX_PHONE_LEN {
            errors.push(FieldError {
                field: "phone",
                message: format!("must be at most {MAX_PHONE_LEN} characters"),
            });
        }
    }
    if data
        .customer_type
        .as_deref()
        .is_some_and(|t| t.trim().is_empty())
    {
        errors.push(FieldError::new("type", "must not be blank"));
    }
    errors
}
