//! Session-identity cookie handling: `userName` + `userEmail`, path `/`,
//! 7-day max-age. Values are form-urlencoded so names with spaces or
//! non-ASCII survive the round trip.

use axum::http::{header, HeaderMap};
use shared::domain::SessionIdentity;
use url::form_urlencoded;

pub const USER_NAME_COOKIE: &str = "userName";
pub const USER_EMAIL_COOKIE: &str = "userEmail";
pub const SESSION_MAX_AGE_SECS: u64 = 60 * 60 * 24 * 7;

/// Reads the identity pair from the request's `Cookie` header. Both cookies
/// must be present and non-empty for the session to count.
pub fn identity_from_headers(headers: &HeaderMap) -> Option<SessionIdentity> {
    let raw = headers.get(header::COOKIE)?.to_str().ok()?;
    let mut name = None;
    let mut email = None;
    for (key, value) in parse_cookie_header(raw) {
        match key.as_str() {
            USER_NAME_COOKIE => name = Some(value),
            USER_EMAIL_COOKIE => email = Some(value),
            _ => {}
        }
    }
    match (name, email) {
        (Some(name), Some(email)) if !name.is_empty() && !email.is_empty() => {
            Some(SessionIdentity { name, email })
        }
        _ => None,
    }
}

/// `Set-Cookie` values establishing the session after registration.
pub fn set_session_cookies(identity: &SessionIdentity) -> [String; 2] {
    [
        session_cookie(USER_NAME_COOKIE, &identity.name, SESSION_MAX_AGE_SECS),
        session_cookie(USER_EMAIL_COOKIE, &identity.email, SESSION_MAX_AGE_SECS),
    ]
}

/// `Set-Cookie` values expiring both cookies, used on reaching the terminal
/// scene.
pub fn clear_session_cookies() -> [String; 2] {
    [
        session_cookie(USER_NAME_COOKIE, "", 0),
        session_cookie(USER_EMAIL_COOKIE, "", 0),
    ]
}

fn session_cookie(name: &str, value: &str, max_age: u64) -> String {
    let encoded: String = form_urlencoded::byte_serialize(value.as_bytes()).collect();
    format!("{name}={encoded}; Path=/; Max-Age={max_age}")
}

fn parse_cookie_header(raw: &str) -> impl Iterator<Item = (String, String)> + '_ {
    raw.split(';').filter_map(|pair| {
        let (key, value) = pair.trim().split_once('=')?;
        let decoded: String = form_urlencoded::parse(value.as_bytes())
            .map(|(k, v)| format!("{k}{v}"))
            .collect();
        Some((key.to_string(), decoded))
    })
}

#[cfg(test)]
mod tests {
    use axum::http::HeaderValue;

    use super::*;

    fn headers_with_cookie(value: &str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(header::COOKIE, HeaderValue::from_str(value).expect("header"));
        headers
    }

    #[test]
    fn round_trips_names_with_spaces() {
        let identity = SessionIdentity {
            name: "Sinta Dewi".into(),
            email: "sinta@example.com".into(),
        };
        let [name_cookie, email_cookie] = set_session_cookies(&identity);
        assert!(name_cookie.starts_with("userName=Sinta+Dewi;"));
        assert!(name_cookie.contains("Max-Age=604800"));
        assert!(email_cookie.contains("Path=/"));

        let header_value = format!(
            "{}; {}",
            name_cookie.split(';').next().expect("pair"),
            email_cookie.split(';').next().expect("pair"),
        );
        let parsed = identity_from_headers(&headers_with_cookie(&header_value)).expect("identity");
        assert_eq!(parsed, identity);
    }

    #[test]
    fn missing_or_empty_cookie_yields_no_identity() {
        assert_eq!(identity_from_headers(&HeaderMap::new()), None);
        assert_eq!(
            identity_from_headers(&headers_with_cookie("userName=Sinta")),
            None
        );
        assert_eq!(
            identity_from_headers(&headers_with_cookie("userName=Sinta; userEmail=")),
            None
        );
        // Unrelated cookies are ignored.
        assert_eq!(
            identity_from_headers(&headers_with_cookie("theme=dark; lang=id")),
            None
        );
    }

    #[test]
    fn clearing_expires_both_cookies() {
        let [name_cookie, email_cookie] = clear_session_cookies();
        assert!(name_cookie.contains("Max-Age=0"));
        assert!(email_cookie.contains("Max-Age=0"));
    }
}
