//! HTML templates for web interface
//!
//! Simple inline HTML templates without a template engine. Every value that came from a
//! user goes through [`html_escape`]. Passwords are never echoed back into a form.

use feedback::{
    Feedback, UserPage,
    forms::{EditFeedbackForm, FeedbackForm, LoginForm, RegisterForm},
};

use crate::session::CSRF_FIELD;

/// Common CSS styles for all pages
const COMMON_STYLES: &str = r#"
    body {
        font-family: -apple-system, BlinkMacSystemFont, "Segoe UI", Roboto, "Helvetica Neue", Arial, sans-serif;
        max-width: 800px;
        margin: 40px auto;
        padding: 0 20px;
        background: #f5f5f5;
    }
    .container {
        background: white;
        padding: 30px;
        border-radius: 8px;
        box-shadow: 0 2px 4px rgba(0,0,0,0.1);
    }
    h1 {
        color: #333;
        border-bottom: 2px solid #0066cc;
        padding-bottom: 10px;
    }
    h2 {
        color: #555;
        margin-top: 30px;
    }
    .info-row {
        margin: 10px 0;
        padding: 8px;
        background: #f9f9f9;
        border-radius: 4px;
    }
    .label {
        font-weight: bold;
        color: #666;
        display: inline-block;
        width: 150px;
    }
    .value {
        color: #0066cc;
    }
    form {
        margin: 20px 0;
    }
    .form-group {
        margin: 15px 0;
    }
    label {
        display: block;
        font-weight: bold;
        margin-bottom: 5px;
        color: #333;
    }
    input[type="text"],
    input[type="email"],
    input[type="password"],
    textarea {
        width: 100%;
        padding: 10px;
        border: 1px solid #ddd;
        border-radius: 4px;
        font-size: 14px;
        box-sizing: border-box;
    }
    textarea {
        resize: vertical;
    }
    button {
        background: #0066cc;
        color: white;
        padding: 10px 20px;
        border: none;
        border-radius: 4px;
        cursor: pointer;
        font-size: 14px;
        font-weight: bold;
    }
    button:hover {
        background: #0052a3;
    }
    .danger-btn {
        background: #d9534f;
    }
    .danger-btn:hover {
        background: #b52b27;
    }
    .logout-link {
        float: right;
        font-size: 14px;
    }
    .feedback-item {
        margin: 15px 0;
        padding: 12px;
        border: 1px solid #ddd;
        border-radius: 4px;
    }
    .feedback-item h3 {
        margin: 0 0 8px 0;
    }
    .feedback-actions form {
        display: inline;
        margin: 0;
    }
    .error {
        color: #d9534f;
        background: #f2dede;
        padding: 10px;
        border-radius: 4px;
        margin: 10px 0;
    }
    .notice {
        color: #31708f;
        background: #d9edf7;
        padding: 10px;
        border-radius: 4px;
        margin: 10px 0;
    }
"#;

/// Messages shown above a page's content
#[derive(Debug, Default)]
pub struct Notices {
    /// Flashed by an earlier request
    pub flashes: Vec<String>,
    /// Problems with the form being re-rendered
    pub errors: Vec<String>,
}

impl Notices {
    pub fn flashes(flashes: Vec<String>) -> Self {
        Self {
            flashes,
            errors: Vec::new(),
        }
    }

    pub fn with_error(mut self, error: impl Into<String>) -> Self {
        self.errors.push(error.into());
        self
    }

    pub fn with_errors(mut self, errors: Vec<String>) -> Self {
        self.errors.extend(errors);
        self
    }

    fn render(&self) -> String {
        let flashes = self
            .flashes
            .iter()
            .map(|m| format!(r#"<div class="notice">{}</div>"#, html_escape(m)));
        let errors = self
            .errors
            .iter()
            .map(|m| format!(r#"<div class="error">{}</div>"#, html_escape(m)));
        flashes.chain(errors).collect()
    }
}

fn layout(title: &str, notices: &Notices, body: &str) -> String {
    let title = html_escape(title);
    let notices_html = notices.render();
    format!(
        r#"<!DOCTYPE html>
<html>
<head>
    <meta charset="utf-8">
    <title>Feedback - {title}</title>
    <style>{COMMON_STYLES}</style>
</head>
<body>
    <div class="container">
        {notices_html}
        {body}
    </div>
</body>
</html>"#
    )
}

/// Render the registration page
pub fn register_page(form: &RegisterForm, csrf: &str, notices: &Notices) -> String {
    let body = format!(
        r#"<h1>Register</h1>
        <form method="POST" action="/register">
            {csrf}
            <div class="form-group">
                <label for="username">Username:</label>
                <input type="text" id="username" name="username" value="{}" required autofocus
                       pattern="[a-zA-Z0-9_-]+"
                       title="Username must contain only letters, numbers, underscores, and hyphens">
            </div>
            <div class="form-group">
                <label for="password">Password:</label>
                <input type="password" id="password" name="password" required>
            </div>
            <div class="form-group">
                <label for="email">Email:</label>
                <input type="email" id="email" name="email" value="{}" maxlength="50" required>
            </div>
            <div class="form-group">
                <label for="first_name">First Name:</label>
                <input type="text" id="first_name" name="first_name" value="{}" maxlength="30" required>
            </div>
            <div class="form-group">
                <label for="last_name">Last Name:</label>
                <input type="text" id="last_name" name="last_name" value="{}" maxlength="30" required>
            </div>
            <button type="submit">Create Account</button>
        </form>
        <p style="margin-top: 20px; text-align: center;">
            Already have an account? <a href="/login">Login here</a>
        </p>"#,
        html_escape(&form.username),
        html_escape(&form.email),
        html_escape(&form.first_name),
        html_escape(&form.last_name),
        csrf = csrf_field(csrf),
    );
    layout("Register", notices, &body)
}

/// Render the login page
pub fn login_page(form: &LoginForm, csrf: &str, notices: &Notices) -> String {
    let body = format!(
        r#"<h1>Login</h1>
        <form method="POST" action="/login">
            {csrf}
            <div class="form-group">
                <label for="username">Username:</label>
                <input type="text" id="username" name="username" value="{}" required autofocus>
            </div>
            <div class="form-group">
                <label for="password">Password:</label>
                <input type="password" id="password" name="password" required>
            </div>
            <button type="submit">Login</button>
        </form>
        <p style="margin-top: 20px; text-align: center;">
            Don't have an account? <a href="/register">Register here</a>
        </p>"#,
        html_escape(&form.username),
        csrf = csrf_field(csrf),
    );
    layout("Login", notices, &body)
}

/// Render a user's private page with their feedback
pub fn user_page(page: &UserPage, csrf: &str, notices: &Notices) -> String {
    let user = &page.user;
    let username = html_escape(&user.username);
    let csrf = csrf_field(csrf);

    let feedback_html = if page.feedback.is_empty() {
        r#"<p style="color: #666; font-style: italic;">No feedback yet.</p>"#.to_string()
    } else {
        page.feedback.iter().map(|item| feedback_item(item, &csrf)).collect()
    };

    let body = format!(
        r#"<h1>{username}
            <a class="logout-link" href="/logout">Logout</a>
        </h1>

        <div class="info-row">
            <span class="label">Name:</span>
            <span class="value">{full_name}</span>
        </div>
        <div class="info-row">
            <span class="label">Email:</span>
            <span class="value">{email}</span>
        </div>

        <h2>Feedback</h2>
        {feedback_html}
        <p><a href="/users/{username}/feedback/add">Add feedback</a></p>

        <form method="POST" action="/users/{username}/delete">
            {csrf}
            <button type="submit" class="danger-btn">Delete account</button>
        </form>"#,
        full_name = html_escape(&user.full_name()),
        email = html_escape(&user.email),
    );
    layout(&user.username, notices, &body)
}

fn feedback_item(item: &Feedback, csrf: &str) -> String {
    format!(
        r#"<div class="feedback-item">
            <h3>{title}</h3>
            <p>{content}</p>
            <div class="feedback-actions">
                <a href="/feedback/{id}/update">Edit</a>
                <form method="POST" action="/feedback/{id}/delete">
                    {csrf}
                    <button type="submit" class="danger-btn">Delete</button>
                </form>
            </div>
        </div>"#,
        id = item.id,
        title = html_escape(&item.title),
        content = html_escape(&item.content),
    )
}

/// Render the form for adding feedback
pub fn new_feedback_page(
    username: &str,
    form: &FeedbackForm,
    csrf: &str,
    notices: &Notices,
) -> String {
    let username = html_escape(username);
    let body = format!(
        r#"<h1>New feedback</h1>
        <form method="POST" action="/users/{username}/feedback/add">
            {csrf}
            <div class="form-group">
                <label for="title">Title:</label>
                <input type="text" id="title" name="title" value="{title}" maxlength="100" required autofocus>
            </div>
            <div class="form-group">
                <label for="content">Content:</label>
                <textarea id="content" name="content" rows="6" required>{content}</textarea>
            </div>
            <button type="submit">Add</button>
        </form>
        <p><a href="/users/{username}">Back</a></p>"#,
        title = html_escape(&form.title),
        content = html_escape(&form.content),
        csrf = csrf_field(csrf),
    );
    layout("New feedback", notices, &body)
}

/// Render the form for editing feedback
///
/// Blank fields leave the stored value unchanged.
pub fn edit_feedback_page(
    item: &Feedback,
    form: &EditFeedbackForm,
    csrf: &str,
    notices: &Notices,
) -> String {
    let body = format!(
        r#"<h1>Edit feedback</h1>
        <form method="POST" action="/feedback/{id}/update">
            {csrf}
            <div class="form-group">
                <label for="title">Title:</label>
                <input type="text" id="title" name="title" value="{title}" maxlength="100" autofocus>
            </div>
            <div class="form-group">
                <label for="content">Content:</label>
                <textarea id="content" name="content" rows="6">{content}</textarea>
            </div>
            <button type="submit">Save</button>
        </form>
        <p><a href="/users/{username}">Back</a></p>"#,
        id = item.id,
        title = html_escape(&form.title),
        content = html_escape(&form.content),
        username = html_escape(&item.username),
        csrf = csrf_field(csrf),
    );
    layout("Edit feedback", notices, &body)
}

pub fn not_found_page() -> String {
    layout(
        "Not Found",
        &Notices::default(),
        r#"<h1>Not Found</h1>
        <p>The page you asked for does not exist.</p>
        <p><a href="/">Home</a></p>"#,
    )
}

pub fn forbidden_page() -> String {
    layout(
        "Forbidden",
        &Notices::default(),
        r#"<h1>Form expired</h1>
        <p>The form could not be verified. Reload the page and submit it again.</p>
        <p><a href="/">Home</a></p>"#,
    )
}

pub fn error_page() -> String {
    layout(
        "Error",
        &Notices::default(),
        r#"<h1>Something went wrong</h1>
        <p>The request could not be completed. Please try again later.</p>
        <p><a href="/">Home</a></p>"#,
    )
}

/// Hidden input carrying the request-forgery token of the session
fn csrf_field(token: &str) -> String {
    format!(
        r#"<input type="hidden" name="{CSRF_FIELD}" value="{}">"#,
        html_escape(token)
    )
}

/// Simple HTML escaping
fn html_escape(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#x27;")
}
