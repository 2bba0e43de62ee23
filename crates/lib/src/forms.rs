//! Form validation and normalization
//!
//! Each form mirrors what the browser submits. Every field defaults to empty so that a
//! missing field is reported as a validation message rather than a decoding failure.
//! Successful validation trims surrounding whitespace and capitalizes names, titles and
//! content before handing back typed values.

use std::fmt;

use serde::Deserialize;

use crate::{
    FeedbackUpdate, NewUser,
    constants::{EMAIL_MAX_LEN, NAME_MAX_LEN, TITLE_MAX_LEN},
};

/// A message about one rejected form field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldError {
    pub field: &'static str,
    pub message: String,
}

/// All problems found in one form submission.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ValidationErrors {
    errors: Vec<FieldError>,
}

impl ValidationErrors {
    fn push(&mut self, field: &'static str, message: impl Into<String>) {
        self.errors.push(FieldError {
            field,
            message: message.into(),
        });
    }

    fn required(&mut self, field: &'static str, label: &str, value: &str) {
        if value.is_empty() {
            self.push(field, format!("{label} is required"));
        }
    }

    fn max_len(&mut self, field: &'static str, label: &str, value: &str, max: usize) {
        if value.chars().count() > max {
            self.push(field, format!("{label} must be at most {max} characters"));
        }
    }

    fn into_result<T>(self, value: impl FnOnce() -> T) -> Result<T, ValidationErrors> {
        if self.errors.is_empty() {
            Ok(value())
        } else {
            Err(self)
        }
    }

    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn errors(&self) -> &[FieldError] {
        &self.errors
    }

    /// Messages in the order the fields were checked.
    pub fn messages(&self) -> Vec<String> {
        self.errors.iter().map(|e| e.message.clone()).collect()
    }

    /// True if `field` has at least one message.
    pub fn has(&self, field: &str) -> bool {
        self.errors.iter().any(|e| e.field == field)
    }
}

impl fmt::Display for ValidationErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Invalid form: {}", self.messages().join("; "))
    }
}

impl std::error::Error for ValidationErrors {}

impl From<ValidationErrors> for crate::Error {
    fn from(err: ValidationErrors) -> Self {
        crate::Error::Validation(err)
    }
}

/// Uppercase the first character and lowercase the rest.
///
/// ```
/// assert_eq!(feedback::forms::capitalize("hello WORLD"), "Hello world");
/// ```
pub fn capitalize(value: &str) -> String {
    let mut chars = value.chars();
    match chars.next() {
        Some(first) => first
            .to_uppercase()
            .chain(chars.flat_map(char::to_lowercase))
            .collect(),
        None => String::new(),
    }
}

/// Loose shape check: one `@`, something before it, a dotted domain after it.
pub fn looks_like_email(value: &str) -> bool {
    if value.chars().any(char::is_whitespace) {
        return false;
    }
    let Some((local, domain)) = value.split_once('@') else {
        return false;
    };
    !local.is_empty()
        && !domain.contains('@')
        && domain.contains('.')
        && !domain.starts_with('.')
        && !domain.ends_with('.')
}

fn is_valid_username(value: &str) -> bool {
    value
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-')
}

/// Registration form.
#[derive(Clone, Default, Deserialize)]
#[serde(default)]
pub struct RegisterForm {
    pub username: String,
    pub password: String,
    pub email: String,
    pub first_name: String,
    pub last_name: String,
}

impl RegisterForm {
    pub fn validate(&self) -> Result<NewUser, ValidationErrors> {
        let mut errors = ValidationErrors::default();

        let username = self.username.trim();
        let email = self.email.trim();
        let first_name = capitalize(self.first_name.trim());
        let last_name = capitalize(self.last_name.trim());

        errors.required("username", "Username", username);
        if !is_valid_username(username) {
            errors.push(
                "username",
                "Username may contain only letters, numbers, underscores, and hyphens",
            );
        }
        errors.required("password", "Password", &self.password);
        errors.required("email", "Email", email);
        if !email.is_empty() && !looks_like_email(email) {
            errors.push("email", "Invalid email address");
        }
        errors.max_len("email", "Email", email, EMAIL_MAX_LEN);
        errors.required("first_name", "First Name", &first_name);
        errors.max_len("first_name", "First Name", &first_name, NAME_MAX_LEN);
        errors.required("last_name", "Last Name", &last_name);
        errors.max_len("last_name", "Last Name", &last_name, NAME_MAX_LEN);

        errors.into_result(|| NewUser {
            username: username.to_string(),
            password: self.password.clone(),
            email: email.to_string(),
            first_name,
            last_name,
        })
    }
}

impl fmt::Debug for RegisterForm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RegisterForm")
            .field("username", &self.username)
            .field("password", &"[REDACTED]")
            .field("email", &self.email)
            .field("first_name", &self.first_name)
            .field("last_name", &self.last_name)
            .finish()
    }
}

/// Login form.
#[derive(Clone, Default, Deserialize)]
#[serde(default)]
pub struct LoginForm {
    pub username: String,
    pub password: String,
}

impl fmt::Debug for LoginForm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LoginForm")
            .field("username", &self.username)
            .field("password", &"[REDACTED]")
            .finish()
    }
}

impl LoginForm {
    /// Returns the trimmed username and the password as typed.
    pub fn validate(&self) -> Result<(String, String), ValidationErrors> {
        let mut errors = ValidationErrors::default();
        let username = self.username.trim();

        errors.required("username", "Username", username);
        errors.required("password", "Password", &self.password);

        errors.into_result(|| (username.to_string(), self.password.clone()))
    }
}

/// Form for adding a feedback item.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct FeedbackForm {
    pub title: String,
    pub content: String,
}

impl FeedbackForm {
    /// Returns the normalized `(title, content)` pair.
    ///
    /// Limits apply to the capitalized text, which can be longer than the input.
    pub fn validate(&self) -> Result<(String, String), ValidationErrors> {
        let mut errors = ValidationErrors::default();
        let title = capitalize(self.title.trim());
        let content = capitalize(self.content.trim());

        errors.required("title", "Title", &title);
        errors.max_len("title", "Title", &title, TITLE_MAX_LEN);
        errors.required("content", "Content", &content);

        errors.into_result(|| (title, content))
    }
}

/// Form for editing a feedback item. Blank fields are left unchanged.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct EditFeedbackForm {
    pub title: String,
    pub content: String,
}

impl EditFeedbackForm {
    pub fn validate(&self) -> Result<FeedbackUpdate, ValidationErrors> {
        let mut errors = ValidationErrors::default();
        let title = capitalize(self.title.trim());
        let content = capitalize(self.content.trim());

        errors.max_len("title", "Title", &title, TITLE_MAX_LEN);

        errors.into_result(|| FeedbackUpdate {
            title: (!title.is_empty()).then_some(title),
            content: (!content.is_empty()).then_some(content),
        })
    }
}
