//! Error types for token handling.

use thiserror::Error;

/// Primary error type for token operations.
///
/// Verification failures are deliberately *not* represented here: a token
/// that parses but fails its MAC or expiry check is reported as a plain
/// `false` from [`crate::Token::verify`], so callers cannot accidentally
/// surface a forged-vs-expired distinction to clients.
#[derive(Debug, Error)]
pub enum TokenError {
    /// Supplied secret material was shorter than the required minimum.
    #[error("secret material too short")]
    SecretTooShort {
        /// Number of bytes actually supplied.
        length: usize,
    },
    /// Serialized token could not be decoded into its three fields.
    #[error("malformed token")]
    Malformed {
        /// Machine-readable reason, for logs only; never shown to clients.
        reason: &'static str,
    },
}

/// Convenience alias for token results.
pub type TokenResult<T> = Result<T, TokenError>;
