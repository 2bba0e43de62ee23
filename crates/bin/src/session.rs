//! Cookie sessions for the web interface
//!
//! The session is a signed cookie holding the logged-in username. Nothing is kept on the
//! server: the cookie is resolved into an [`feedback::Identity`] on every request, so a
//! deleted user's cookie simply stops identifying anyone.
//!
//! One-shot notices ("flashes") ride in a second signed cookie until the next page render
//! takes them.
//!
//! Every POST must echo the request-forgery token kept in a third signed cookie. Pages
//! with forms embed it as a hidden field, and [`require_csrf_token`] refuses state-changing
//! requests that do not carry it. All cookies are `SameSite=Lax` on top of that.

use axum::{
    body::Body,
    extract::{FromRef, FromRequestParts, Request},
    http::{Method, StatusCode, request::Parts},
    middleware::Next,
    response::{Html, IntoResponse, Response},
};
use base64ct::{Base64UrlUnpadded, Encoding};
use sha2::{Digest, Sha512};
use tower_cookies::{Cookie, Cookies, Key, cookie::SameSite};

use crate::templates;

pub const SESSION_COOKIE: &str = "feedback_session";
pub const FLASH_COOKIE: &str = "feedback_flash";
pub const CSRF_COOKIE: &str = "feedback_csrf";

/// Form field that must repeat the token from [`CSRF_COOKIE`]
pub const CSRF_FIELD: &str = "csrf_token";

/// Largest form body read while looking for the token
const FORM_BODY_LIMIT: usize = 2 * 1024 * 1024;

/// Key used to sign both cookies
#[derive(Clone)]
pub struct SessionKey(Key);

impl SessionKey {
    /// Derive the signing key from an arbitrary-length secret.
    pub fn from_secret(secret: &str) -> Self {
        let digest = Sha512::digest(secret.as_bytes());
        Self(Key::from(&digest[..]))
    }
}

/// Request-scoped access to the session and flash cookies
pub struct Session {
    cookies: Cookies,
    key: SessionKey,
}

impl<S> FromRequestParts<S> for Session
where
    S: Send + Sync,
    SessionKey: FromRef<S>,
{
    type Rejection = (StatusCode, &'static str);

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let cookies = Cookies::from_request_parts(parts, state).await?;
        Ok(Self {
            cookies,
            key: SessionKey::from_ref(state),
        })
    }
}

fn cookie(name: &'static str, value: String) -> Cookie<'static> {
    let mut cookie = Cookie::new(name, value);
    cookie.set_http_only(true);
    cookie.set_same_site(SameSite::Lax);
    cookie.set_path("/");
    cookie
}

fn removal(name: &'static str) -> Cookie<'static> {
    let mut cookie = Cookie::from(name);
    cookie.set_path("/");
    cookie
}

impl Session {
    /// Username stored in a correctly signed session cookie.
    pub fn username(&self) -> Option<String> {
        self.cookies
            .signed(&self.key.0)
            .get(SESSION_COOKIE)
            .map(|c| c.value().to_string())
            .filter(|name| !name.is_empty())
    }

    pub fn login(&self, username: &str) {
        self.cookies
            .signed(&self.key.0)
            .add(cookie(SESSION_COOKIE, username.to_string()));
    }

    pub fn logout(&self) {
        self.cookies.signed(&self.key.0).remove(removal(SESSION_COOKIE));
    }

    /// Queue a notice for the next rendered page.
    pub fn flash(&self, message: impl Into<String>) {
        let mut messages = self.peek_flashes();
        messages.push(message.into());
        match serde_json::to_vec(&messages) {
            Ok(json) => self
                .cookies
                .signed(&self.key.0)
                .add(cookie(FLASH_COOKIE, Base64UrlUnpadded::encode_string(&json))),
            Err(e) => tracing::warn!("Failed to encode flash messages: {e}"),
        }
    }

    /// Remove and return every queued notice.
    pub fn take_flashes(&self) -> Vec<String> {
        let messages = self.peek_flashes();
        if self.cookies.get(FLASH_COOKIE).is_some() {
            self.cookies.remove(removal(FLASH_COOKIE));
        }
        messages
    }

    /// The request-forgery token of this browser, issued on first use.
    pub fn csrf_token(&self) -> String {
        let signed = self.cookies.signed(&self.key.0);
        let issued = signed
            .get(CSRF_COOKIE)
            .map(|c| c.value().to_string())
            .filter(|token| !token.is_empty());
        if let Some(token) = issued {
            return token;
        }
        let token = uuid::Uuid::new_v4().simple().to_string();
        signed.add(cookie(CSRF_COOKIE, token.clone()));
        token
    }

    /// True if `submitted` matches a token this browser was issued.
    pub fn csrf_matches(&self, submitted: &str) -> bool {
        self.cookies
            .signed(&self.key.0)
            .get(CSRF_COOKIE)
            .is_some_and(|c| !c.value().is_empty() && c.value() == submitted)
    }

    fn peek_flashes(&self) -> Vec<String> {
        self.cookies
            .signed(&self.key.0)
            .get(FLASH_COOKIE)
            .and_then(|c| Base64UrlUnpadded::decode_vec(c.value()).ok())
            .and_then(|json| serde_json::from_slice(&json).ok())
            .unwrap_or_default()
    }
}

/// Middleware refusing POST requests whose form lacks the session's token.
///
/// Runs inside the cookie layer. The body is buffered to read the field and handed on
/// unchanged.
pub async fn require_csrf_token(session: Session, request: Request, next: Next) -> Response {
    if request.method() != Method::POST {
        return next.run(request).await;
    }

    let (parts, body) = request.into_parts();
    let bytes = match axum::body::to_bytes(body, FORM_BODY_LIMIT).await {
        Ok(bytes) => bytes,
        Err(_) => return StatusCode::PAYLOAD_TOO_LARGE.into_response(),
    };

    let submitted = url::form_urlencoded::parse(&bytes)
        .find(|(name, _)| name == CSRF_FIELD)
        .map(|(_, value)| value.into_owned());
    let verified = submitted.is_some_and(|token| session.csrf_matches(&token));
    if !verified {
        tracing::warn!(path = %parts.uri.path(), "Refused POST without a valid form token");
        return (StatusCode::FORBIDDEN, Html(templates::forbidden_page())).into_response();
    }

    next.run(Request::from_parts(parts, Body::from(bytes))).await
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_short_secrets_produce_a_key() {
        // Key::from panics below 64 bytes; the digest always has exactly 64
        let a = SessionKey::from_secret("x");
        let b = SessionKey::from_secret("x");
        assert_eq!(a.0.master(), b.0.master());
        assert_ne!(a.0.master(), SessionKey::from_secret("y").0.master());
    }

    #[test]
    fn test_cookies_are_same_site_lax() {
        let cookie = cookie(CSRF_COOKIE, "token".to_string());
        assert_eq!(cookie.same_site(), Some(SameSite::Lax));
        assert_eq!(cookie.http_only(), Some(true));
        assert_eq!(cookie.path(), Some("/"));
    }
}
