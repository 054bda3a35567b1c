//! Error types for configuration loading.

use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// Primary error type for configuration operations.
///
/// All of these abort the boot sequence; none can occur after serving
/// begins.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// No secret was supplied via environment or file.
    #[error("signing secret not configured")]
    SecretMissing {
        /// Environment variable that was consulted first.
        env: &'static str,
        /// File path that was consulted second.
        path: PathBuf,
    },
    /// The environment-supplied secret was not valid base64.
    #[error("signing secret is not valid base64")]
    SecretDecode {
        /// Environment variable holding the undecodable value.
        env: &'static str,
    },
    /// The supplied secret material was too short.
    #[error("signing secret too short")]
    SecretTooShort {
        /// Number of bytes actually supplied.
        length: usize,
        /// Minimum number of bytes required.
        minimum: usize,
    },
    /// No credential entries survived loading.
    #[error("no credentials configured")]
    NoCredentials,
    /// A lifespan value could not be parsed.
    #[error("invalid token lifespan")]
    InvalidLifespan {
        /// Offending lifespan string.
        value: String,
        /// Machine-readable reason for the failure.
        reason: &'static str,
    },
    /// A listen address could not be parsed.
    #[error("invalid listen address")]
    InvalidListenAddr {
        /// Offending address string.
        value: String,
    },
    /// The configured login status code is unusable.
    #[error("invalid login status code")]
    InvalidLoginStatus {
        /// Offending status code.
        value: u16,
        /// Machine-readable reason for the failure.
        reason: &'static str,
    },
    /// The configured cookie name is unusable.
    #[error("invalid cookie name")]
    InvalidCookieName {
        /// Machine-readable reason for the failure.
        reason: &'static str,
    },
    /// File system operation failed.
    #[error("filesystem operation failed")]
    Io {
        /// Operation identifier.
        operation: &'static str,
        /// Path involved in the failure.
        path: PathBuf,
        /// Source IO error.
        source: io::Error,
    },
}

/// Convenience alias for configuration results.
pub type ConfigResult<T> = Result<T, ConfigError>;
