//! services/api/src/web/cookie.rs
//!
//! The cookie transport for login sessions. A session id travels as
//! `<id>.<hex hmac-sha256(secret, id)>`; anything that fails verification is
//! treated as if no cookie had been sent.

use axum::http::{header, HeaderMap};
use hmac::{Hmac, Mac};
use sha2::Sha256;

use crate::config::{Config, ConfigError};

type HmacSha256 = Hmac<Sha256>;

#[derive(Clone)]
pub struct SessionCookie {
    name: String,
    mac: HmacSha256,
    secure: bool,
    max_age_secs: i64,
}

impl SessionCookie {
    pub fn new(
        name: impl Into<String>,
        secret: &[u8],
        secure: bool,
        max_age_secs: i64,
    ) -> Result<Self, ConfigError> {
        let mac = HmacSha256::new_from_slice(secret).map_err(|e| {
            ConfigError::InvalidValue("SESSION_SECRET".to_string(), e.to_string())
        })?;
        Ok(Self {
            name: name.into(),
            mac,
            secure,
            max_age_secs,
        })
    }

    pub fn from_config(config: &Config) -> Result<Self, ConfigError> {
        Self::new(
            config.session_cookie_name.clone(),
            config.session_secret.as_bytes(),
            config.cookie_secure,
            config.session_ttl().num_seconds(),
        )
    }

    /// Produces the signed cookie value for a session id.
    pub fn sign(&self, session_id: &str) -> String {
        let mut mac = self.mac.clone();
        mac.update(session_id.as_bytes());
        let signature = hex::encode(mac.finalize().into_bytes());
        format!("{}.{}", session_id, signature)
    }

    /// Returns the session id if the signature is valid.
    pub fn verify<'a>(&self, value: &'a str) -> Option<&'a str> {
        let (session_id, signature) = value.rsplit_once('.')?;
        let signature = hex::decode(signature).ok()?;
        let mut mac = self.mac.clone();
        mac.update(session_id.as_bytes());
        mac.verify_slice(&signature).ok()?;
        Some(session_id)
    }

    /// Finds this cookie in the request headers and returns its verified session id.
    pub fn session_id(&self, headers: &HeaderMap) -> Option<String> {
        headers
            .get_all(header::COOKIE)
            .iter()
            .filter_map(|v| v.to_str().ok())
            .flat_map(|v| v.split(';'))
            .find_map(|pair| {
                let (name, value) = pair.trim().split_once('=')?;
                if name != self.name {
                    return None;
                }
                self.verify(value).map(str::to_string)
            })
    }

    /// The `Set-Cookie` value that installs a session.
    pub fn set_cookie(&self, session_id: &str) -> String {
        self.render(&self.sign(session_id), self.max_age_secs)
    }

    /// The `Set-Cookie` value that removes the session cookie.
    pub fn clear_cookie(&self) -> String {
        self.render("", 0)
    }

    fn render(&self, value: &str, max_age: i64) -> String {
        let mut cookie = format!(
            "{}={}; HttpOnly; SameSite=Lax; Path=/; Max-Age={}",
            self.name, value, max_age
        );
        if self.secure {
            cookie.push_str("; Secure");
        }
        cookie
    }
}
