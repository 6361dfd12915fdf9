//! Input validation shared by the services
//!
//! Lengths are counted in characters, not bytes.

use crate::config::{
    CATEGORY_DESCRIPTION_MAX, CATEGORY_NAME_MAX, NOTE_TITLE_MAX, PASSWORD_MAX, PASSWORD_MIN,
    TAG_NAME_MAX, USERNAME_MAX, USERNAME_MIN,
};
use crate::error::{AppError, Result};

/// Non-blank and at most `max` characters.
pub fn required(field: &str, value: &str, max: usize) -> Result<()> {
    if value.trim().is_empty() {
        return Err(AppError::Validation(format!("{} must not be blank", field)));
    }
    at_most(field, value, max)
}

pub fn at_most(field: &str, value: &str, max: usize) -> Result<()> {
    if value.chars().count() > max {
        return Err(AppError::Validation(format!(
            "{} must be at most {} characters",
            field, max
        )));
    }
    Ok(())
}

pub fn category(name: &str, description: Option<&str>) -> Result<()> {
    required("Category name", name, CATEGORY_NAME_MAX)?;
    if let Some(description) = description {
        at_most("Category description", description, CATEGORY_DESCRIPTION_MAX)?;
    }
    Ok(())
}

pub fn tag(name: &str) -> Result<()> {
    required("Tag name", name, TAG_NAME_MAX)
}

pub fn note_title(title: &str) -> Result<()> {
    required("Note title", title, NOTE_TITLE_MAX)
}

pub fn username(username: &str) -> Result<()> {
    let len = username.chars().count();
    if username.trim().is_empty() || !(USERNAME_MIN..=USERNAME_MAX).contains(&len) {
        return Err(AppError::Validation(format!(
            "Username must be between {} and {} characters",
            USERNAME_MIN, USERNAME_MAX
        )));
    }
    Ok(())
}

/// 6 to 20 characters with at least one letter and one digit.
pub fn password(password: &str) -> Result<()> {
    let len = password.chars().count();
    if !(PASSWORD_MIN..=PASSWORD_MAX).contains(&len) {
        return Err(AppError::Validation(format!(
            "Password must be between {} and {} characters",
            PASSWORD_MIN, PASSWORD_MAX
        )));
    }

    let has_letter = password.chars().any(|c| c.is_alphabetic());
    let has_digit = password.chars().any(|c| c.is_ascii_digit());
    if !has_letter || !has_digit {
        return Err(AppError::Validation(
            "Password must contain at least one letter and one digit".to_string(),
        ));
    }

    Ok(())
}

pub fn email(email: &str) -> Result<()> {
    let invalid = || AppError::Validation(format!("Invalid email address: {}", email));

    if email.chars().any(char::is_whitespace) {
        return Err(invalid());
    }

    let (local, domain) = email.split_once('@').ok_or_else(invalid)?;
    if local.is_empty() || domain.contains('@') {
        return Err(invalid());
    }

    let labels: Vec<&str> = domain.split('.').collect();
    if labels.len() < 2 || labels.iter().any(|label| label.is_empty()) {
        return Err(invalid());
    }

    Ok(())
}
