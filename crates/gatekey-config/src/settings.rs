//! Validated runtime settings.

use std::net::SocketAddr;
use std::path::PathBuf;
use std::time::Duration;

use crate::error::{ConfigError, ConfigResult};
use crate::loader::parse_lifespan;

pub use gatekey_core::engine::{DEFAULT_COOKIE_NAME, DEFAULT_LOGIN_STATUS};

/// Default bind address for the HTTP listener.
pub const DEFAULT_LISTEN: &str = "0.0.0.0:8080";

/// Default token lifespan (100 days, matching long-lived session cookies).
pub const DEFAULT_LIFESPAN: &str = "2400h";

/// Runtime settings, validated once at boot and immutable afterwards.
#[derive(Debug, Clone)]
pub struct Settings {
    /// Bind address for incoming HTTP connections.
    pub listen: SocketAddr,
    /// How long an issued token stays valid.
    pub lifespan: Duration,
    /// Name of the session cookie to issue and accept.
    pub cookie_name: String,
    /// Status code for the "token delivered" response.
    pub login_status: u16,
    /// Path to the passwd-style credential file.
    pub passwd_path: PathBuf,
    /// Path to the raw secret file.
    pub secret_path: PathBuf,
    /// Directory holding the login page.
    pub html_dir: PathBuf,
}

impl Settings {
    /// Validate raw flag/environment values into usable settings.
    ///
    /// # Errors
    ///
    /// Returns an error when the listen address or lifespan fail to parse,
    /// the login status is outside 100-999 or would be mishandled by the
    /// proxy (2xx) or the browser (3xx), or the cookie name contains
    /// characters that break `Set-Cookie` serialization.
    pub fn from_parts(
        listen: &str,
        lifespan: &str,
        cookie_name: &str,
        login_status: u16,
        passwd_path: PathBuf,
        secret_path: PathBuf,
        html_dir: PathBuf,
    ) -> ConfigResult<Self> {
        let listen: SocketAddr = listen.parse().map_err(|_| ConfigError::InvalidListenAddr {
            value: listen.to_string(),
        })?;
        let lifespan = parse_lifespan(lifespan)?;
        let login_status = validate_login_status(login_status)?;
        let cookie_name = validate_cookie_name(cookie_name)?;
        Ok(Self {
            listen,
            lifespan,
            cookie_name,
            login_status,
            passwd_path,
            secret_path,
            html_dir,
        })
    }
}

/// Check that a login status code is deliverable through a forward-auth
/// proxy.
///
/// A 2xx would make the proxy forward the request to the origin without
/// relaying `Set-Cookie` to the browser (infinite login loop); a 3xx would
/// make browsers follow the redirect instead of rendering the response.
///
/// # Errors
///
/// Returns [`ConfigError::InvalidLoginStatus`] for codes outside 100-999 or
/// inside 200-399.
pub fn validate_login_status(status: u16) -> ConfigResult<u16> {
    if !(100..=999).contains(&status) {
        return Err(ConfigError::InvalidLoginStatus {
            value: status,
            reason: "outside 100-999",
        });
    }
    if (200..=299).contains(&status) {
        return Err(ConfigError::InvalidLoginStatus {
            value: status,
            reason: "2xx responses are forwarded to the origin, losing Set-Cookie",
        });
    }
    if (300..=399).contains(&status) {
        return Err(ConfigError::InvalidLoginStatus {
            value: status,
            reason: "3xx responses trigger a redirect instead of rendering",
        });
    }
    Ok(status)
}

fn validate_cookie_name(name: &str) -> ConfigResult<String> {
    if name.is_empty() {
        return Err(ConfigError::InvalidCookieName { reason: "empty" });
    }
    if name
        .chars()
        .any(|ch| ch.is_ascii_whitespace() || matches!(ch, ';' | '=' | ','))
    {
        return Err(ConfigError::InvalidCookieName {
            reason: "contains cookie delimiter characters",
        });
    }
    Ok(name.to_string())
}
