//! Process configuration.
//!
//! Built once at startup and handed to whatever needs it. Nothing reads the
//! environment after [`Config::from_env`] returns.

use std::fmt;
use std::net::{IpAddr, Ipv4Addr, SocketAddr};

use tracing::debug;

const DEFAULT_PORT: u16 = 8080;

/// Configuration read from the environment.
#[derive(Clone, Debug)]
pub struct Config {
    /// HMAC secret for signing and verifying session tokens.
    pub jwt_secret: Secret,
    /// Interface to listen on.
    pub host: IpAddr,
    /// Port to listen on.
    pub port: u16,
    /// Cookie that carries the session token.
    pub session_cookie: String,
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("JWT_SECRET is not set; create a .env file or export it")]
    MissingSecret,
    #[error("{key} has an invalid value {value:?}")]
    Invalid { key: &'static str, value: String },
}

impl Config {
    /// Loads `.env` if present, then reads the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        match dotenvy::dotenv() {
            Ok(path) => debug!(path = %path.display(), "loaded .env"),
            Err(e) => debug!("no .env loaded: {e}"),
        }
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds a config from an arbitrary key lookup.
    ///
    /// | Key              | Default      |
    /// |------------------|--------------|
    /// | `JWT_SECRET`     | required     |
    /// | `HOST`           | `0.0.0.0`    |
    /// | `PORT`           | `8080`       |
    /// | `SESSION_COOKIE` | `jwt_token`  |
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let jwt_secret = lookup("JWT_SECRET")
            .filter(|s| !s.is_empty())
            .map(Secret::new)
            .ok_or(ConfigError::MissingSecret)?;

        let host = match lookup("HOST") {
            Some(v) => v.parse().map_err(|_| ConfigError::Invalid { key: "HOST", value: v })?,
            None => IpAddr::V4(Ipv4Addr::UNSPECIFIED),
        };

        let port = match lookup("PORT") {
            Some(v) => v.parse().map_err(|_| ConfigError::Invalid { key: "PORT", value: v })?,
            None => DEFAULT_PORT,
        };

        let session_cookie = lookup("SESSION_COOKIE")
            .filter(|s| !s.is_empty())
            .unwrap_or_else(|| crate::auth::SESSION_COOKIE.to_owned());

        Ok(Self { jwt_secret, host, port, session_cookie })
    }

    pub fn addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }
}

/// A secret string whose `Debug` output is redacted.
#[derive(Clone)]
pub struct Secret(String);

impl Secret {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    pub fn expose(&self) -> &[u8] {
        self.0.as_bytes()
    }
}

impl fmt::Debug for Secret {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Secret(***)")
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> =
            pairs.iter().map(|(k, v)| ((*k).to_owned(), (*v).to_owned())).collect();
        move |key: &str| map.get(key).cloned()
    }

    #[test]
    fn secret_is_required() {
        assert!(matches!(Config::from_lookup(lookup(&[])), Err(ConfigError::MissingSecret)));
        assert!(matches!(
            Config::from_lookup(lookup(&[("JWT_SECRET", "")])),
            Err(ConfigError::MissingSecret)
        ));
    }

    #[test]
    fn defaults() {
        let cfg = Config::from_lookup(lookup(&[("JWT_SECRET", "test-jwt-secret-12345")])).unwrap();
        assert_eq!(cfg.jwt_secret.expose(), b"test-jwt-secret-12345");
        assert_eq!(cfg.port, 8080);
        assert_eq!(cfg.session_cookie, "jwt_token");
        assert_eq!(cfg.addr(), "0.0.0.0:8080".parse::<SocketAddr>().unwrap());
    }

    #[test]
    fn overrides() {
        let cfg = Config::from_lookup(lookup(&[
            ("JWT_SECRET", "s"),
            ("HOST", "127.0.0.1"),
            ("PORT", "3000"),
            ("SESSION_COOKIE", "sid"),
        ]))
        .unwrap();
        assert_eq!(cfg.addr(), "127.0.0.1:3000".parse::<SocketAddr>().unwrap());
        assert_eq!(cfg.session_cookie, "sid");
    }

    #[test]
    fn bad_port_is_reported() {
        let err = Config::from_lookup(lookup(&[("JWT_SECRET", "s"), ("PORT", "eighty")])).unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { key: "PORT", .. }));
        assert!(err.to_string().contains("eighty"));
    }

    #[test]
    fn debug_redacts_secret() {
        let cfg = Config::from_lookup(lookup(&[("JWT_SECRET", "hunter2")])).unwrap();
        assert!(!format!("{cfg:?}").contains("hunter2"));
    }
}
