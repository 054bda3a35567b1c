//! Command-line flags for the Gatekey binary.
//!
//! Every flag can also be supplied through an environment variable, which is
//! the usual channel in container deployments.

use std::path::PathBuf;

use clap::Parser;
use gatekey_config::{DEFAULT_COOKIE_NAME, DEFAULT_LIFESPAN, DEFAULT_LISTEN, DEFAULT_LOGIN_STATUS};
use gatekey_telemetry::DEFAULT_LOG_LEVEL;

/// Default location of the passwd-style credential file in containers.
pub const DEFAULT_PASSWD_PATH: &str = "/run/secrets/passwd";

/// Default location of the raw token-signing secret.
pub const DEFAULT_SECRET_PATH: &str = "/run/secrets/gatekey.key";

/// Default directory holding the login page.
pub const DEFAULT_HTML_DIR: &str = "web";

/// Stateless forward-authentication gate for reverse proxies.
#[derive(Debug, Parser)]
#[command(name = "gatekey", about = "Forward-authentication decision service")]
pub struct Cli {
    /// Address to bind the HTTP listener to.
    #[arg(long, env = "GATEKEY_LISTEN", default_value = DEFAULT_LISTEN)]
    pub listen: String,

    /// Token lifespan, as compound duration segments such as `2400h` or `90d12h`.
    #[arg(long, env = "GATEKEY_LIFESPAN", default_value = DEFAULT_LIFESPAN)]
    pub lifespan: String,

    /// Path to the passwd-style credential file.
    #[arg(long, env = "GATEKEY_PASSWORD_FILE", default_value = DEFAULT_PASSWD_PATH)]
    pub passwd: PathBuf,

    /// Path to the raw secret file (ignored when `GATEKEY_SECRET` is set).
    #[arg(long, env = "GATEKEY_SECRET_FILE", default_value = DEFAULT_SECRET_PATH)]
    pub secret: PathBuf,

    /// Directory containing `login.html`.
    #[arg(long, env = "GATEKEY_HTML_PATH", default_value = DEFAULT_HTML_DIR)]
    pub html: PathBuf,

    /// Name of the session cookie to issue and accept.
    #[arg(long, env = "GATEKEY_COOKIE_NAME", default_value = DEFAULT_COOKIE_NAME)]
    pub cookie_name: String,

    /// Status code for the "token delivered" response. Must not be 2xx or
    /// 3xx, otherwise the proxy or the browser swallows the cookie.
    #[arg(long, env = "GATEKEY_LOGIN_STATUS", default_value_t = DEFAULT_LOGIN_STATUS)]
    pub login_status: u16,

    /// Log level when `RUST_LOG` is not provided.
    #[arg(long, env = "GATEKEY_LOG_LEVEL", default_value = DEFAULT_LOG_LEVEL)]
    pub log_level: String,

    /// Log output format (`json` or `pretty`).
    #[arg(long, env = "GATEKEY_LOG_FORMAT")]
    pub log_format: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_container_layout() {
        let cli = Cli::try_parse_from(["gatekey"]).expect("defaults parse");
        assert_eq!(cli.listen, DEFAULT_LISTEN);
        assert_eq!(cli.lifespan, DEFAULT_LIFESPAN);
        assert_eq!(cli.passwd, PathBuf::from(DEFAULT_PASSWD_PATH));
        assert_eq!(cli.secret, PathBuf::from(DEFAULT_SECRET_PATH));
        assert_eq!(cli.html, PathBuf::from(DEFAULT_HTML_DIR));
        assert_eq!(cli.cookie_name, DEFAULT_COOKIE_NAME);
        assert_eq!(cli.login_status, DEFAULT_LOGIN_STATUS);
        assert_eq!(cli.log_level, DEFAULT_LOG_LEVEL);
        assert!(cli.log_format.is_none());
    }

    #[test]
    fn flags_override_defaults() {
        let cli = Cli::try_parse_from([
            "gatekey",
            "--listen",
            "127.0.0.1:9000",
            "--lifespan",
            "12h30m",
            "--cookie-name",
            "edge-session",
            "--login-status",
            "403",
            "--log-format",
            "json",
        ])
        .expect("flags parse");
        assert_eq!(cli.listen, "127.0.0.1:9000");
        assert_eq!(cli.lifespan, "12h30m");
        assert_eq!(cli.cookie_name, "edge-session");
        assert_eq!(cli.login_status, 403);
        assert_eq!(cli.log_format.as_deref(), Some("json"));
    }

    #[test]
    fn login_status_rejects_non_numeric() {
        assert!(Cli::try_parse_from(["gatekey", "--login-status", "teapot"]).is_err());
    }
}
