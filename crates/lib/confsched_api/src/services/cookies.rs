//! Cookie service: set/clear the httpOnly session cookie.

use axum_extra::extract::cookie::{Cookie, SameSite};
use confsched_core::session::SESSION_TTL;
use time::Duration;

/// Cookie name for the session id.
pub const SESSION_COOKIE: &str = "confsched_session";

/// Build the session cookie; it lives as long as the server-side session.
pub fn session_cookie(session_id: &str, secure: bool) -> Cookie<'static> {
    Cookie::build((SESSION_COOKIE.to_string(), session_id.to_string()))
        .http_only(true)
        .secure(secure)
        .same_site(SameSite::Lax)
        .path("/".to_string())
        .max_age(Duration::seconds(SESSION_TTL.as_secs() as i64))
        .build()
}

/// Build an expired session cookie to clear it.
pub fn clear_session_cookie(secure: bool) -> Cookie<'static> {
    Cookie::build((SESSION_COOKIE.to_string(), String::new()))
        .http_only(true)
        .secure(secure)
        .same_site(SameSite::Lax)
        .path("/".to_string())
        .max_age(Duration::ZERO)
        .build()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn session_cookie_is_http_only() {
        let cookie = session_cookie("abc", false);
        assert_eq!(cookie.name(), SESSION_COOKIE);
        assert_eq!(cookie.value(), "abc");
        assert_eq!(cookie.http_only(), Some(true));
        assert_eq!(cookie.secure(), Some(false));
        assert_eq!(cookie.path(), Some("/"));
        assert_eq!(cookie.max_age(), Some(Duration::hours(12)));
    }

    #[test]
    fn secure_flag_is_applied() {
        assert_eq!(session_cookie("abc", true).secure(), Some(true));
        assert_eq!(clear_session_cookie(true).secure(), Some(true));
    }

    #[test]
    fn clear_cookie_expires_immediately() {
        assert_eq!(clear_session_cookie(false).max_age(), Some(Duration::ZERO));
    }
}
