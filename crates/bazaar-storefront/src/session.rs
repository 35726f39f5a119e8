//! Cookie-keyed visitor sessions.

use axum::body::Body;
use axum::extract::State;
use axum::http::header::{COOKIE, SET_COOKIE};
use axum::http::{HeaderMap, HeaderValue, Request};
use axum::middleware::Next;
use axum::response::Response;
use bazaar_cache::SessionId;

use crate::state::AppState;

/// Find a well-formed session id in the `Cookie` headers.
pub fn session_from_cookies(headers: &HeaderMap, cookie_name: &str) -> Option<SessionId> {
    for header in headers.get_all(COOKIE) {
        let Ok(cookie_str) = header.to_str() else {
            continue;
        };
        for cookie in cookie_str.split(';') {
            if let Some((name, value)) = cookie.trim().split_once('=') {
                if name == cookie_name {
                    if let Some(id) = SessionId::parse(value) {
                        return Some(id);
                    }
                }
            }
        }
    }
    None
}

/// `Set-Cookie` value for a newly issued session.
pub fn session_cookie(cookie_name: &str, id: &SessionId) -> String {
    format!("{cookie_name}={id}; HttpOnly; SameSite=Lax; Path=/")
}

/// Attach a [`SessionId`] to every request, issuing a cookie on first visit.
pub async fn session_layer(
    State(state): State<AppState>,
    mut request: Request<Body>,
    next: Next,
) -> Response {
    let existing = session_from_cookies(request.headers(), state.cookie_name());
    let issued = existing.is_none();
    let id = existing.unwrap_or_else(SessionId::generate);

    if issued {
        tracing::debug!(session = %id, "issuing session");
    }
    request.extensions_mut().insert(id.clone());

    let mut response = next.run(request).await;
    if issued {
        match HeaderValue::from_str(&session_cookie(state.cookie_name(), &id)) {
            Ok(value) => {
                response.headers_mut().append(SET_COOKIE, value);
            }
            Err(e) => tracing::warn!("could not encode session cookie: {}", e),
        }
    }
    response
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_finds_named_cookie() {
        let id = SessionId::generate();
        let mut headers = HeaderMap::new();
        headers.insert(
            COOKIE,
            HeaderValue::from_str(&format!("theme=dark; bazaar_session={id}; lang=uz")).unwrap(),
        );
        assert_eq!(session_from_cookies(&headers, "bazaar_session"), Some(id));
        assert_eq!(session_from_cookies(&headers, "other"), None);
    }

    #[test]
    fn test_ignores_malformed_ids() {
        let mut headers = HeaderMap::new();
        headers.insert(COOKIE, HeaderValue::from_static("bazaar_session=../../etc"));
        assert_eq!(session_from_cookies(&headers, "bazaar_session"), None);
    }

    #[test]
    fn test_cookie_attributes() {
        let cookie = session_cookie("bazaar_session", &SessionId::new("sess_abc"));
        assert_eq!(cookie, "bazaar_session=sess_abc; HttpOnly; SameSite=Lax; Path=/");
    }
}
