//! Serve command - runs the Feedback web server.

use axum::{
    Form, Router,
    extract::{FromRef, Path, State},
    http::StatusCode,
    middleware,
    response::{Html, IntoResponse, Redirect, Response},
    routing::{get, post},
};
use tokio::signal::unix::{SignalKind, signal};
use tower_cookies::CookieManagerLayer;

use feedback::{
    Error, Identity, LoginFailure, Service, UniqueField,
    backend::{Backend, InMemory},
    forms::{EditFeedbackForm, FeedbackForm, LoginForm, RegisterForm},
};

use crate::backend::{create_backend, json_path};
use crate::cli::ServeArgs;
use crate::session::{Session, SessionKey, require_csrf_token};
use crate::templates::{self, Notices};

/// Used when no secret is configured. Sessions signed with it can be forged.
const INSECURE_SECRET: &str = "missing secret key";

const UNAUTHORIZED: &str = "You are not authorized to do this";
const GENERIC_LOGIN_FAILURE: &str = "Invalid username or password";

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub service: Service,
    pub key: SessionKey,
    /// Hide whether the username or the password was wrong
    pub generic_login_errors: bool,
}

impl FromRef<AppState> for SessionKey {
    fn from_ref(state: &AppState) -> Self {
        state.key.clone()
    }
}

/// Build the application router
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(handle_root_request))
        .route("/health", get(handle_health_endpoint))
        .route(
            "/register",
            get(handle_register_page).post(handle_register_submit),
        )
        .route("/login", get(handle_login_page).post(handle_login_submit))
        .route("/logout", get(handle_logout))
        .route("/users/{username}", get(handle_user_page))
        .route("/users/{username}/delete", post(handle_delete_user))
        .route(
            "/users/{username}/feedback/add",
            get(handle_new_feedback_page).post(handle_new_feedback_submit),
        )
        .route("/feedback/{id}/delete", post(handle_delete_feedback))
        .route(
            "/feedback/{id}/update",
            get(handle_edit_feedback_page).post(handle_edit_feedback_submit),
        )
        .fallback(handle_not_found)
        .layer(middleware::from_fn_with_state(
            state.clone(),
            require_csrf_token,
        ))
        .layer(CookieManagerLayer::new())
        .with_state(state)
}

/// Run the Feedback server
pub async fn run(args: &ServeArgs) -> Result<(), Box<dyn std::error::Error>> {
    let backend = create_backend(&args.backend_config).await?;
    let service = Service::new(backend);

    let secret = match &args.secret_key {
        Some(secret) if !secret.is_empty() => secret.as_str(),
        _ => {
            tracing::warn!(
                "No secret key configured (--secret-key or FEEDBACK_SECRET_KEY); \
                 session cookies are signed with an insecure default"
            );
            INSECURE_SECRET
        }
    };

    let app_state = AppState {
        service: service.clone(),
        key: SessionKey::from_secret(secret),
        generic_login_errors: args.generic_login_errors,
    };
    let app = router(app_state);

    // Bind server
    let addr = format!("{}:{}", args.host, args.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    let local_addr = listener.local_addr()?;

    println!("Feedback server started on http://localhost:{}", local_addr.port());
    println!();
    println!("Available endpoints:");
    println!("  GET      /                              - Redirect to registration");
    println!("  GET/POST /register                      - Create an account");
    println!("  GET/POST /login                         - Log in");
    println!("  GET      /logout                        - Log out");
    println!("  GET      /users/{{username}}              - Private page (requires login)");
    println!("  POST     /users/{{username}}/delete       - Delete account");
    println!("  GET/POST /users/{{username}}/feedback/add - Add feedback");
    println!("  GET/POST /feedback/{{id}}/update          - Edit feedback");
    println!("  POST     /feedback/{{id}}/delete          - Delete feedback");
    println!("  GET      /health                        - Health check");
    println!();
    println!("Press Ctrl+C to shutdown");

    let json_path = json_path(&args.backend_config);

    // Start server with graceful shutdown
    axum::serve(listener, app)
        .with_graceful_shutdown(async move {
            match (
                signal(SignalKind::terminate()),
                signal(SignalKind::interrupt()),
            ) {
                (Ok(mut sigterm), Ok(mut sigint)) => {
                    tokio::select! {
                        _ = sigterm.recv() => tracing::info!("Received SIGTERM, initiating graceful shutdown..."),
                        _ = sigint.recv() => tracing::info!("Received SIGINT, initiating graceful shutdown..."),
                    }
                }
                _ => {
                    tracing::warn!("Failed to install signal handlers, falling back to Ctrl+C");
                    let _ = tokio::signal::ctrl_c().await;
                }
            }

            // Save database on shutdown (only needed for InMemory backend)
            if let Some(in_memory_backend) = service.backend().as_any().downcast_ref::<InMemory>()
            {
                match in_memory_backend.save_to_file(&json_path).await {
                    Ok(_) => {
                        tracing::info!("Database saved to {}", json_path.display());
                        println!("\nDatabase saved successfully");
                    }
                    Err(e) => {
                        tracing::error!("Failed to save database: {e:?}");
                        eprintln!("Failed to save database: {e:?}");
                    }
                }
            }
        })
        .await?;

    println!("Server shut down");
    Ok(())
}

// ============================================================================
// Response helpers
// ============================================================================

fn not_found() -> Response {
    (StatusCode::NOT_FOUND, Html(templates::not_found_page())).into_response()
}

fn internal_error(err: Error) -> Response {
    tracing::error!(module = err.module(), "Request failed: {err}");
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Html(templates::error_page()),
    )
        .into_response()
}

/// Flash the unauthorized notice and send the visitor to `to`.
fn refuse(session: &Session, to: &str) -> Response {
    session.flash(UNAUTHORIZED);
    Redirect::to(to).into_response()
}

/// Page of `username`, or `/` for names no account could have.
///
/// Path segments arrive percent-decoded and must not reach a `Location` header raw.
fn user_url(username: &str) -> String {
    let plausible = !username.is_empty()
        && username
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-');
    if plausible {
        format!("/users/{username}")
    } else {
        "/".to_string()
    }
}

/// Resolve the session into an identity, dropping cookies that name a deleted user.
async fn identify(state: &AppState, session: &Session) -> Result<Identity, Response> {
    let username = session.username();
    let identity = state
        .service
        .identify(username.as_deref())
        .await
        .map_err(internal_error)?;
    if username.is_some() && !identity.is_authenticated() {
        session.logout();
    }
    Ok(identity)
}

/// Feedback ids that are not integers cannot exist.
fn parse_id(raw: &str) -> Option<i64> {
    raw.parse().ok()
}

// ============================================================================
// Authentication Handlers
// ============================================================================

/// Handler for GET / - Root redirect
async fn handle_root_request() -> Redirect {
    Redirect::to("/register")
}

/// Handler for GET /register - Show registration page
async fn handle_register_page(session: Session) -> Html<String> {
    let notices = Notices::flashes(session.take_flashes());
    Html(templates::register_page(
        &RegisterForm::default(),
        &session.csrf_token(),
        &notices,
    ))
}

/// Handler for POST /register - Process registration
async fn handle_register_submit(
    State(state): State<AppState>,
    session: Session,
    Form(form): Form<RegisterForm>,
) -> Response {
    let notices = Notices::flashes(session.take_flashes());

    let new_user = match form.validate() {
        Ok(new_user) => new_user,
        Err(errors) => {
            return Html(templates::register_page(
                &form,
                &session.csrf_token(),
                &notices.with_errors(errors.messages()),
            ))
            .into_response();
        }
    };

    match state.service.register(new_user).await {
        Ok(user) => {
            session.login(&user.username);
            Redirect::to(&user_url(&user.username)).into_response()
        }
        Err(e) => match e.duplicate_field() {
            Some(field) => {
                let message = match field {
                    UniqueField::Username => "Username is taken",
                    UniqueField::Email => "Email is taken",
                };
                Html(templates::register_page(
                    &form,
                    &session.csrf_token(),
                    &notices.with_error(message),
                ))
                .into_response()
            }
            None => internal_error(e),
        },
    }
}

/// Handler for GET /login - Show login page
async fn handle_login_page(session: Session) -> Html<String> {
    let notices = Notices::flashes(session.take_flashes());
    Html(templates::login_page(
        &LoginForm::default(),
        &session.csrf_token(),
        &notices,
    ))
}

/// Handler for POST /login - Process login
async fn handle_login_submit(
    State(state): State<AppState>,
    session: Session,
    Form(form): Form<LoginForm>,
) -> Response {
    let notices = Notices::flashes(session.take_flashes());

    let (username, password) = match form.validate() {
        Ok(credentials) => credentials,
        Err(errors) => {
            return Html(templates::login_page(
                &form,
                &session.csrf_token(),
                &notices.with_errors(errors.messages()),
            ))
            .into_response();
        }
    };

    match state.service.authenticate(&username, &password).await {
        Ok(Some(user)) => {
            session.login(&user.username);
            Redirect::to(&user_url(&user.username)).into_response()
        }
        Ok(None) => {
            let message = if state.generic_login_errors {
                GENERIC_LOGIN_FAILURE
            } else {
                match state.service.login_failure(&username).await {
                    Ok(LoginFailure::UnknownUser) => "Username does not exist",
                    Ok(LoginFailure::WrongPassword) => "Incorrect Password",
                    Err(e) => return internal_error(e),
                }
            };
            Html(templates::login_page(
                &form,
                &session.csrf_token(),
                &notices.with_error(message),
            ))
            .into_response()
        }
        Err(e) => internal_error(e),
    }
}

/// Handler for GET /logout - Clear the session
async fn handle_logout(session: Session) -> Redirect {
    session.logout();
    session.flash("Successfully Logged Out");
    Redirect::to("/")
}

// ============================================================================
// User Handlers
// ============================================================================

/// Handler for GET /users/{username} - Private page of the logged-in user
async fn handle_user_page(
    State(state): State<AppState>,
    session: Session,
    Path(username): Path<String>,
) -> Response {
    let identity = match identify(&state, &session).await {
        Ok(identity) => identity,
        Err(response) => return response,
    };

    match state.service.user_page(&identity, &username).await {
        Ok(page) => {
            let notices = Notices::flashes(session.take_flashes());
            Html(templates::user_page(&page, &session.csrf_token(), &notices)).into_response()
        }
        Err(e) if e.is_permission_denied() => refuse(&session, "/"),
        Err(e) if e.is_not_found() => not_found(),
        Err(e) => internal_error(e),
    }
}

/// Handler for POST /users/{username}/delete - Delete an account and its feedback
async fn handle_delete_user(
    State(state): State<AppState>,
    session: Session,
    Path(username): Path<String>,
) -> Response {
    let identity = match identify(&state, &session).await {
        Ok(identity) => identity,
        Err(response) => return response,
    };

    match state.service.delete_user(&identity, &username).await {
        Ok(()) => {
            session.logout();
            session.flash(format!("{username} was deleted"));
            Redirect::to("/").into_response()
        }
        Err(e) if e.is_permission_denied() => refuse(&session, &user_url(&username)),
        Err(e) if e.is_not_found() => not_found(),
        Err(e) => internal_error(e),
    }
}

// ============================================================================
// Feedback Handlers
// ============================================================================

/// Handler for GET /users/{username}/feedback/add - Show the new feedback form
async fn handle_new_feedback_page(
    State(state): State<AppState>,
    session: Session,
    Path(username): Path<String>,
) -> Response {
    let identity = match identify(&state, &session).await {
        Ok(identity) => identity,
        Err(response) => return response,
    };
    if !identity.is(&username) {
        return refuse(&session, "/");
    }

    let notices = Notices::flashes(session.take_flashes());
    Html(templates::new_feedback_page(
        &username,
        &FeedbackForm::default(),
        &session.csrf_token(),
        &notices,
    ))
    .into_response()
}

/// Handler for POST /users/{username}/feedback/add - Store new feedback
async fn handle_new_feedback_submit(
    State(state): State<AppState>,
    session: Session,
    Path(username): Path<String>,
    Form(form): Form<FeedbackForm>,
) -> Response {
    let identity = match identify(&state, &session).await {
        Ok(identity) => identity,
        Err(response) => return response,
    };
    if !identity.is(&username) {
        return refuse(&session, "/");
    }

    let rerender = |errors: Vec<String>| {
        let notices = Notices::flashes(session.take_flashes()).with_errors(errors);
        Html(templates::new_feedback_page(
            &username,
            &form,
            &session.csrf_token(),
            &notices,
        ))
        .into_response()
    };

    let (title, content) = match form.validate() {
        Ok(values) => values,
        Err(errors) => return rerender(errors.messages()),
    };

    match state
        .service
        .create_feedback(&identity, &username, &title, &content)
        .await
    {
        Ok(_) => {
            session.flash("Feedback received");
            Redirect::to(&user_url(&username)).into_response()
        }
        Err(e) if e.is_validation_error() => rerender(vec![e.to_string()]),
        Err(e) if e.is_permission_denied() => refuse(&session, "/"),
        Err(e) if e.is_not_found() => not_found(),
        Err(e) => internal_error(e),
    }
}

/// Handler for GET /feedback/{id}/update - Show the edit form
async fn handle_edit_feedback_page(
    State(state): State<AppState>,
    session: Session,
    Path(id): Path<String>,
) -> Response {
    let identity = match identify(&state, &session).await {
        Ok(identity) => identity,
        Err(response) => return response,
    };
    if !identity.is_authenticated() {
        return refuse(&session, "/");
    }
    let Some(id) = parse_id(&id) else {
        return not_found();
    };

    match state.service.feedback_for_edit(&identity, id).await {
        Ok(item) => {
            let form = EditFeedbackForm {
                title: item.title.clone(),
                content: item.content.clone(),
            };
            let notices = Notices::flashes(session.take_flashes());
            Html(templates::edit_feedback_page(
                &item,
                &form,
                &session.csrf_token(),
                &notices,
            ))
            .into_response()
        }
        Err(e) if e.is_permission_denied() => refuse(&session, "/"),
        Err(e) if e.is_not_found() => not_found(),
        Err(e) => internal_error(e),
    }
}

/// Handler for POST /feedback/{id}/update - Apply an edit
async fn handle_edit_feedback_submit(
    State(state): State<AppState>,
    session: Session,
    Path(id): Path<String>,
    Form(form): Form<EditFeedbackForm>,
) -> Response {
    let identity = match identify(&state, &session).await {
        Ok(identity) => identity,
        Err(response) => return response,
    };
    if !identity.is_authenticated() {
        return refuse(&session, "/");
    }
    let Some(id) = parse_id(&id) else {
        return not_found();
    };

    let item = match state.service.feedback_for_edit(&identity, id).await {
        Ok(item) => item,
        Err(e) if e.is_permission_denied() => return refuse(&session, "/"),
        Err(e) if e.is_not_found() => return not_found(),
        Err(e) => return internal_error(e),
    };

    let rerender = |errors: Vec<String>| {
        let notices = Notices::flashes(session.take_flashes()).with_errors(errors);
        Html(templates::edit_feedback_page(
            &item,
            &form,
            &session.csrf_token(),
            &notices,
        ))
        .into_response()
    };

    let update = match form.validate() {
        Ok(update) => update,
        Err(errors) => return rerender(errors.messages()),
    };

    match state.service.update_feedback(&identity, id, &update).await {
        Ok(updated) => {
            session.flash("Feedback updated");
            Redirect::to(&user_url(&updated.username)).into_response()
        }
        Err(e) if e.is_validation_error() => rerender(vec![e.to_string()]),
        Err(e) if e.is_permission_denied() => refuse(&session, "/"),
        Err(e) if e.is_not_found() => not_found(),
        Err(e) => internal_error(e),
    }
}

/// Handler for POST /feedback/{id}/delete - Delete feedback
///
/// Redirects to the owner's page whether or not a logged-in user was allowed to delete.
/// Anonymous visitors are sent to `/` without the id being looked up.
async fn handle_delete_feedback(
    State(state): State<AppState>,
    session: Session,
    Path(id): Path<String>,
) -> Response {
    let identity = match identify(&state, &session).await {
        Ok(identity) => identity,
        Err(response) => return response,
    };
    let Some(id) = parse_id(&id) else {
        return not_found();
    };

    match state.service.delete_feedback(&identity, id).await {
        Ok(item) => {
            session.flash(format!("{} was deleted", item.title));
            Redirect::to(&user_url(&item.username)).into_response()
        }
        Err(Error::Auth(auth)) => refuse(&session, &user_url(auth.owner().unwrap_or_default())),
        Err(e) if e.is_not_found() => not_found(),
        Err(e) => internal_error(e),
    }
}

// ============================================================================
// Health and Fallback Handlers
// ============================================================================

/// Health check response
#[derive(serde::Serialize)]
struct HealthResponse {
    status: &'static str,
    backend: &'static str,
}

/// Handler for GET /health - Health check endpoint
async fn handle_health_endpoint(State(state): State<AppState>) -> axum::Json<HealthResponse> {
    axum::Json(HealthResponse {
        status: "healthy",
        backend: state.service.backend().label(),
    })
}

async fn handle_not_found() -> Response {
    not_found()
}
