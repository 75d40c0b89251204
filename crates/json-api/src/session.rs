//! Session cookie transport.

use agora_app::auth::{SessionToken, TokenScope};
use salvo::{
    http::cookie::{Cookie, SameSite, time::Duration},
    prelude::Request,
};

/// Builds and reads the cookie that carries the raw session token.
#[derive(Debug, Clone)]
pub(crate) struct SessionCookie {
    name: String,
}

impl SessionCookie {
    #[must_use]
    pub(crate) fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }

    /// Token presented by the client, if any.
    pub(crate) fn read<'a>(&self, req: &'a Request) -> Option<&'a str> {
        req.cookie(&self.name)
            .map(|cookie| cookie.value())
            .filter(|value| !value.is_empty())
    }

    /// Cookie delivering `token`, living exactly as long as the token itself.
    #[must_use]
    pub(crate) fn issue(&self, token: &SessionToken) -> Cookie<'static> {
        Cookie::build((self.name.clone(), token.as_str().to_owned()))
            .http_only(true)
            .path("/")
            .same_site(SameSite::Lax)
            .max_age(Duration::seconds(
                TokenScope::Authentication.ttl().as_secs(),
            ))
            .build()
    }

    /// Cookie instructing the client to drop its session token.
    #[must_use]
    pub(crate) fn expire(&self) -> Cookie<'static> {
        let mut cookie = Cookie::build((self.name.clone(), String::new()))
            .http_only(true)
            .path("/")
            .same_site(SameSite::Lax)
            .build();

        cookie.make_removal();

        cookie
    }
}

#[cfg(test)]
mod tests {
    use agora_app::auth::generate_token;

    use super::*;

    #[test]
    fn issued_cookie_is_http_only_site_wide_for_a_day() {
        let token = generate_token();
        let cookie = SessionCookie::new("session_token").issue(&token);

        assert_eq!(cookie.name(), "session_token");
        assert_eq!(cookie.value(), token.as_str());
        assert_eq!(cookie.http_only(), Some(true));
        assert_eq!(cookie.path(), Some("/"));
        assert_eq!(cookie.max_age(), Some(Duration::seconds(86_400)));
    }

    #[test]
    fn expiring_cookie_clears_the_value() {
        let cookie = SessionCookie::new("session_token").expire();

        assert_eq!(cookie.value(), "");
        assert_eq!(cookie.path(), Some("/"));
        assert_eq!(cookie.max_age(), Some(Duration::ZERO));
    }
}
