//! Credentials and the cluster auth toggle

use std::env;
use std::fmt;

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use hyper::Method;
use zeroize::Zeroizing;

/// Username/password pair sent as HTTP Basic auth.
///
/// The password is zeroed when the credentials are dropped and never shows
/// up in `Debug` output.
#[derive(Clone)]
pub struct Credentials {
    username: String,
    password: Zeroizing<String>,
}

impl Credentials {
    /// Create a credential pair
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            password: Zeroizing::new(password.into()),
        }
    }

    /// Read `ETCD_USERNAME` and `ETCD_PASSWORD`; `None` unless both are set
    pub fn from_env() -> Option<Self> {
        let username = env::var("ETCD_USERNAME").ok().filter(|u| !u.is_empty())?;
        let password = env::var("ETCD_PASSWORD").ok()?;
        Some(Self::new(username, password))
    }

    /// The username
    pub fn username(&self) -> &str {
        &self.username
    }

    /// `Authorization` header value: `Basic base64(user:pass)`
    pub fn basic_auth_header(&self) -> Zeroizing<String> {
        let raw = Zeroizing::new(format!("{}:{}", self.username, self.password.as_str()));
        Zeroizing::new(format!("Basic {}", BASE64.encode(raw.as_bytes())))
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .finish()
    }
}

/// Direction of an auth toggle call
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthToggle {
    /// `PUT /v2/auth/enable`
    Enable,
    /// `DELETE /v2/auth/enable`
    Disable,
}

impl AuthToggle {
    /// HTTP method for this direction
    pub fn method(self) -> Method {
        match self {
            AuthToggle::Enable => Method::PUT,
            AuthToggle::Disable => Method::DELETE,
        }
    }

    /// Message reported when the server acknowledges with an empty body
    pub fn success_message(self) -> &'static str {
        match self {
            AuthToggle::Enable => "Auth Enabled",
            AuthToggle::Disable => "Auth Disabled",
        }
    }
}
