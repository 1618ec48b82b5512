use actix_web::cookie::{time::Duration, Cookie, SameSite};

use crate::auth::{TokenPair, ACCESS_TOKEN_COOKIE, REFRESH_TOKEN_COOKIE};

/// How session cookies are built. `secure` is on in production.
#[derive(Debug, Clone)]
pub struct CookiePolicy {
    pub secure: bool,
    pub access_max_age: i64,
    pub refresh_max_age: i64,
}

impl CookiePolicy {
    pub fn session_cookies(&self, tokens: &TokenPair) -> [Cookie<'static>; 2] {
        [
            self.build(ACCESS_TOKEN_COOKIE, tokens.access_token.clone(), self.access_max_age),
            self.build(REFRESH_TOKEN_COOKIE, tokens.refresh_token.clone(), self.refresh_max_age),
        ]
    }

    pub fn removal_cookies(&self) -> [Cookie<'static>; 2] {
        [ACCESS_TOKEN_COOKIE, REFRESH_TOKEN_COOKIE].map(|name| {
            let mut cookie = self.build(name, String::new(), 0);
            cookie.make_removal();
            cookie
        })
    }

    fn build(&self, name: &'static str, value: String, max_age_seconds: i64) -> Cookie<'static> {
        Cookie::build(name, value)
            .path("/")
            .http_only(true)
            .secure(self.secure)
            .same_site(SameSite::Strict)
            .max_age(Duration::seconds(max_age_seconds))
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn policy(secure: bool) -> CookiePolicy {
        CookiePolicy {
            secure,
            access_max_age: 900,
            refresh_max_age: 1_296_000,
        }
    }

    #[test]
    fn test_session_cookie_flags() {
        let tokens = TokenPair {
            access_token: "access".to_string(),
            refresh_token: "refresh".to_string(),
        };
        let [access, refresh] = policy(true).session_cookies(&tokens);

        assert_eq!(access.name(), ACCESS_TOKEN_COOKIE);
        assert_eq!(access.value(), "access");
        assert_eq!(access.http_only(), Some(true));
        assert_eq!(access.secure(), Some(true));
        assert_eq!(access.same_site(), Some(SameSite::Strict));
        assert_eq!(access.max_age(), Some(Duration::seconds(900)));

        assert_eq!(refresh.name(), REFRESH_TOKEN_COOKIE);
        assert_eq!(refresh.max_age(), Some(Duration::days(15)));
    }

    #[test]
    fn test_insecure_outside_production() {
        let tokens = TokenPair {
            access_token: "a".to_string(),
            refresh_token: "r".to_string(),
        };
        let [access, _] = policy(false).session_cookies(&tokens);
        assert_eq!(access.secure(), Some(false));
    }

    #[test]
    fn test_removal_cookies_expire_immediately() {
        for cookie in policy(false).removal_cookies() {
            assert_eq!(cookie.value(), "");
            assert_eq!(cookie.max_age(), Some(Duration::ZERO));
        }
    }
}
