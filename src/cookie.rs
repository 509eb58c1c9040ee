//! Outgoing `Set-Cookie` values.

use std::fmt;

/// A cookie to send with [`Response::set_cookie`](crate::Response::set_cookie).
///
/// `max_age` follows the usual convention: positive keeps the cookie for that
/// many seconds, negative deletes it right away (`Max-Age=0`), zero leaves the
/// attribute off and makes a session cookie.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Cookie {
    pub name: String,
    pub value: String,
    pub max_age: i64,
    pub path: Option<String>,
    pub domain: Option<String>,
    pub secure: bool,
    pub http_only: bool,
}

impl Cookie {
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
            max_age: 0,
            path: None,
            domain: None,
            secure: false,
            http_only: false,
        }
    }

    pub fn max_age(mut self, seconds: i64) -> Self {
        self.max_age = seconds;
        self
    }

    pub fn path(mut self, path: impl Into<String>) -> Self {
        self.path = Some(path.into());
        self
    }

    pub fn domain(mut self, domain: impl Into<String>) -> Self {
        self.domain = Some(domain.into());
        self
    }

    pub fn secure(mut self, secure: bool) -> Self {
        self.secure = secure;
        self
    }

    pub fn http_only(mut self, http_only: bool) -> Self {
        self.http_only = http_only;
        self
    }
}

impl fmt::Display for Cookie {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}={}", self.name, self.value)?;
        if let Some(path) = &self.path {
            write!(f, "; Path={path}")?;
        }
        if let Some(domain) = self.domain.as_deref().filter(|d| !d.is_empty()) {
            write!(f, "; Domain={domain}")?;
        }
        match self.max_age {
            0 => {}
            n if n < 0 => f.write_str("; Max-Age=0")?,
            n => write!(f, "; Max-Age={n}")?,
        }
        if self.http_only {
            f.write_str("; HttpOnly")?;
        }
        if self.secure {
            f.write_str("; Secure")?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn renders_basic_cookie() {
        let c = Cookie::new("session", "abc123").max_age(3600).path("/").http_only(true);
        assert_eq!(c.to_string(), "session=abc123; Path=/; Max-Age=3600; HttpOnly");
    }

    #[test]
    fn renders_secure_cookie_with_domain() {
        let c = Cookie::new("auth_token", "xyz789")
            .max_age(86400)
            .path("/api")
            .domain("example.com")
            .secure(true)
            .http_only(true);
        assert_eq!(
            c.to_string(),
            "auth_token=xyz789; Path=/api; Domain=example.com; Max-Age=86400; HttpOnly; Secure",
        );
    }

    #[test]
    fn negative_max_age_expires_immediately() {
        let c = Cookie::new("jwt_token", "").max_age(-1).path("/");
        assert_eq!(c.to_string(), "jwt_token=; Path=/; Max-Age=0");
    }

    #[test]
    fn zero_max_age_is_a_session_cookie() {
        assert_eq!(Cookie::new("preference", "dark_mode").to_string(), "preference=dark_mode");
    }
}
