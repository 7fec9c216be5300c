//! Cookie builders for access and refresh tokens.

use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use time::Duration;

/// Cookie name for the access token.
pub const ATELIER_ACCESS_TOKEN: &str = "atelier_access_token";

/// Cookie name for the refresh token.
pub const ATELIER_REFRESH_TOKEN: &str = "atelier_refresh_token";

const ACCESS_COOKIE_PATH: &str = "/";

/// The refresh cookie is only sent to the auth routes.
const REFRESH_COOKIE_PATH: &str = "/auth";

fn token_cookie(
    name: &'static str,
    value: String,
    path: &'static str,
    domain: String,
    max_age: Duration,
) -> Cookie<'static> {
    Cookie::build((name, value))
        .path(path)
        .domain(domain)
        .max_age(max_age)
        .http_only(true)
        .secure(true)
        .same_site(SameSite::Lax)
        .build()
}

/// Set the access-token cookie on the jar.
///
/// ```
/// use axum_extra::extract::cookie::CookieJar;
/// use atelier_auth_types::cookie::{set_access_token_cookie, ATELIER_ACCESS_TOKEN};
///
/// let jar = CookieJar::new();
/// let jar = set_access_token_cookie(jar, "token_value".to_string(), "example.com".to_string(), 900);
/// let cookie = jar.get(ATELIER_ACCESS_TOKEN).unwrap();
/// assert_eq!(cookie.path(), Some("/"));
/// assert_eq!(cookie.domain(), Some("example.com"));
/// assert_eq!(cookie.max_age(), Some(time::Duration::seconds(900)));
/// assert!(cookie.http_only().unwrap_or(false));
/// assert!(cookie.secure().unwrap_or(false));
/// ```
pub fn set_access_token_cookie(
    jar: CookieJar,
    value: String,
    domain: String,
    max_age_secs: u64,
) -> CookieJar {
    jar.add(token_cookie(
        ATELIER_ACCESS_TOKEN,
        value,
        ACCESS_COOKIE_PATH,
        domain,
        Duration::seconds(max_age_secs as i64),
    ))
}

/// Set the refresh-token cookie on the jar.
///
/// ```
/// use axum_extra::extract::cookie::CookieJar;
/// use atelier_auth_types::cookie::{set_refresh_token_cookie, ATELIER_REFRESH_TOKEN};
///
/// let jar = CookieJar::new();
/// let jar = set_refresh_token_cookie(jar, "refresh_value".to_string(), "example.com".to_string(), 604800);
/// let cookie = jar.get(ATELIER_REFRESH_TOKEN).unwrap();
/// assert_eq!(cookie.path(), Some("/auth"));
/// assert_eq!(cookie.max_age(), Some(time::Duration::seconds(604800)));
/// ```
pub fn set_refresh_token_cookie(
    jar: CookieJar,
    value: String,
    domain: String,
    max_age_secs: u64,
) -> CookieJar {
    jar.add(token_cookie(
        ATELIER_REFRESH_TOKEN,
        value,
        REFRESH_COOKIE_PATH,
        domain,
        Duration::seconds(max_age_secs as i64),
    ))
}

/// Clear both token cookies by setting Max-Age to 0.
pub fn clear_cookies(jar: CookieJar, domain: String) -> CookieJar {
    let access = token_cookie(
        ATELIER_ACCESS_TOKEN,
        String::new(),
        ACCESS_COOKIE_PATH,
        domain.clone(),
        Duration::ZERO,
    );
    let refresh = token_cookie(
        ATELIER_REFRESH_TOKEN,
        String::new(),
        REFRESH_COOKIE_PATH,
        domain,
        Duration::ZERO,
    );
    jar.add(access).add(refresh)
}
