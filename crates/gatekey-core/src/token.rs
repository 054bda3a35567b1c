//! Signed, time-limited session tokens.
//!
//! # Design
//! - The MAC covers an injective encoding of `(username, expires_at)` so a
//!   signature can never be transplanted onto a different username or a
//!   different expiry.
//! - The serialized form is cookie-safe: the username travels base64url
//!   encoded, so the `.` field delimiter cannot collide with its content.
//! - Verification collapses "forged" and "expired" into one boolean; the two
//!   cases must stay observationally identical for clients.

use std::fmt;

use base64::{Engine as _, engine::general_purpose::URL_SAFE_NO_PAD};
use chrono::{DateTime, Duration, Utc};
use hmac::{Hmac, Mac};
use sha2::Sha256;
use subtle::ConstantTimeEq;

use crate::error::{TokenError, TokenResult};

type HmacSha256 = Hmac<Sha256>;

/// Length of the token MAC in bytes (HMAC-SHA256 output).
pub const MAC_LEN: usize = 32;

/// Number of secret bytes used for signing.
pub const SECRET_LEN: usize = 64;

/// Process-wide signing secret.
///
/// Holds exactly [`SECRET_LEN`] bytes; longer input material is truncated at
/// construction. The `Debug` implementation redacts the contents so the
/// secret can never leak through logging.
#[derive(Clone)]
pub struct Secret {
    bytes: [u8; SECRET_LEN],
}

impl Secret {
    /// Build a secret from raw material, keeping only the first
    /// [`SECRET_LEN`] bytes.
    ///
    /// # Errors
    ///
    /// Returns [`TokenError::SecretTooShort`] when fewer than [`SECRET_LEN`]
    /// bytes are supplied.
    pub fn from_bytes(material: &[u8]) -> TokenResult<Self> {
        let Some(head) = material.get(..SECRET_LEN) else {
            return Err(TokenError::SecretTooShort {
                length: material.len(),
            });
        };
        let mut bytes = [0u8; SECRET_LEN];
        bytes.copy_from_slice(head);
        Ok(Self { bytes })
    }

    fn keyed_mac(&self) -> HmacSha256 {
        HmacSha256::new_from_slice(&self.bytes).expect("HMAC accepts keys of any length")
    }
}

impl fmt::Debug for Secret {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Secret(redacted)")
    }
}

/// An immutable authentication token bound to a username and expiry.
///
/// Created by [`Token::issue`] on successful login and re-created by
/// [`Token::parse`] from the client's cookie. A token is well formed only if
/// [`Token::verify`] holds under the current secret.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    username: String,
    expires_at: DateTime<Utc>,
    mac: [u8; MAC_LEN],
}

impl Token {
    /// Mint a token for `username` valid until `expires_at`.
    #[must_use]
    pub fn issue(secret: &Secret, username: &str, expires_at: DateTime<Utc>) -> Self {
        let mac = compute_mac(secret, username, expires_at);
        Self {
            username: username.to_string(),
            expires_at,
            mac,
        }
    }

    /// Decode a serialized token without verifying its signature.
    ///
    /// Accepts attacker-controlled input and never panics.
    ///
    /// # Errors
    ///
    /// Returns [`TokenError::Malformed`] when the input does not consist of
    /// exactly three delimited fields, the username is not valid base64url
    /// UTF-8, the expiry is not a numeric timestamp, or the MAC has the
    /// wrong length.
    pub fn parse(value: &str) -> TokenResult<Self> {
        let mut fields = value.split('.');
        let (Some(name), Some(expiry), Some(mac), None) =
            (fields.next(), fields.next(), fields.next(), fields.next())
        else {
            return Err(TokenError::Malformed {
                reason: "expected three dot-delimited fields",
            });
        };

        let name_bytes = URL_SAFE_NO_PAD
            .decode(name)
            .map_err(|_| TokenError::Malformed {
                reason: "username field is not base64url",
            })?;
        let username = String::from_utf8(name_bytes).map_err(|_| TokenError::Malformed {
            reason: "username field is not UTF-8",
        })?;
        if username.is_empty() {
            return Err(TokenError::Malformed {
                reason: "username field is empty",
            });
        }

        let seconds: i64 = expiry.parse().map_err(|_| TokenError::Malformed {
            reason: "expiry field is not numeric",
        })?;
        let expires_at =
            DateTime::<Utc>::from_timestamp(seconds, 0).ok_or(TokenError::Malformed {
                reason: "expiry field is out of range",
            })?;

        let mac_bytes = URL_SAFE_NO_PAD
            .decode(mac)
            .map_err(|_| TokenError::Malformed {
                reason: "mac field is not base64url",
            })?;
        let mac: [u8; MAC_LEN] = mac_bytes.try_into().map_err(|_| TokenError::Malformed {
            reason: "mac field has wrong length",
        })?;

        Ok(Self {
            username,
            expires_at,
            mac,
        })
    }

    /// Check the token's MAC and expiry against `secret` at time `now`.
    ///
    /// Returns `false` for a bad MAC *or* an expired token; the two cases
    /// are intentionally indistinguishable. The MAC comparison runs in
    /// constant time.
    #[must_use]
    pub fn verify(&self, secret: &Secret, now: DateTime<Utc>) -> bool {
        let computed = compute_mac(secret, &self.username, self.expires_at);
        let mac_ok: bool = computed.ct_eq(&self.mac).into();
        mac_ok && now < self.expires_at
    }

    /// Username the token is bound to.
    #[must_use]
    pub fn username(&self) -> &str {
        &self.username
    }

    /// Absolute expiry timestamp.
    #[must_use]
    pub const fn expires_at(&self) -> DateTime<Utc> {
        self.expires_at
    }

    /// Lifetime remaining at `now`, clamped to zero once expired.
    #[must_use]
    pub fn remaining_lifetime(&self, now: DateTime<Utc>) -> Duration {
        (self.expires_at - now).max(Duration::zero())
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}.{}.{}",
            URL_SAFE_NO_PAD.encode(&self.username),
            self.expires_at.timestamp(),
            URL_SAFE_NO_PAD.encode(self.mac)
        )
    }
}

/// Injective MAC input: `len(username) BE || username || expiry seconds BE`.
///
/// The length prefix guarantees that no two distinct `(username, expires_at)`
/// pairs produce the same byte string, even when one username is a prefix of
/// another.
fn mac_input(username: &str, expires_at: DateTime<Utc>) -> Vec<u8> {
    let name = username.as_bytes();
    let mut input = Vec::with_capacity(name.len() + 16);
    input.extend_from_slice(&(name.len() as u64).to_be_bytes());
    input.extend_from_slice(name);
    input.extend_from_slice(&expires_at.timestamp().to_be_bytes());
    input
}

fn compute_mac(secret: &Secret, username: &str, expires_at: DateTime<Utc>) -> [u8; MAC_LEN] {
    let mut mac = secret.keyed_mac();
    mac.update(&mac_input(username, expires_at));
    mac.finalize().into_bytes().into()
}
