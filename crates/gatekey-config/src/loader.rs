//! One-shot loaders for the secret, credentials and login page.
//!
//! Environment values are passed in by the caller rather than read here, so
//! every loader is a pure function of its inputs and testable without
//! process-global state. Precedence mirrors the deployment contract: an
//! environment value wins over the corresponding file.

use std::collections::HashMap;
use std::fs;
use std::path::Path;
use std::time::Duration;

use base64::{Engine as _, engine::general_purpose::STANDARD};
use gatekey_core::{CredentialStore, SECRET_LEN, Secret};
use tracing::warn;

use crate::error::{ConfigError, ConfigResult};

/// Environment variable carrying the base64-encoded signing secret.
pub const SECRET_ENV: &str = "GATEKEY_SECRET";

/// Environment variable carrying inline `user:hash` credential pairs.
pub const USERS_ENV: &str = "GATEKEY_USERS";

/// File name of the login page inside the configured HTML directory.
pub const LOGIN_PAGE_FILE: &str = "login.html";

/// Load the signing secret from the environment value (base64, takes
/// precedence) or from a raw secret file.
///
/// Either source must supply at least [`SECRET_LEN`] bytes; only the first
/// [`SECRET_LEN`] are used.
///
/// # Errors
///
/// Returns an error when neither source is configured, the environment
/// value does not decode, the file cannot be read, or the material is too
/// short.
pub fn load_secret(env_value: Option<&str>, path: &Path) -> ConfigResult<Secret> {
    if let Some(encoded) = env_value.map(str::trim).filter(|value| !value.is_empty()) {
        let decoded = STANDARD
            .decode(encoded)
            .map_err(|_| ConfigError::SecretDecode { env: SECRET_ENV })?;
        return secret_from_material(&decoded);
    }

    if !path.exists() {
        return Err(ConfigError::SecretMissing {
            env: SECRET_ENV,
            path: path.to_path_buf(),
        });
    }
    let material = fs::read(path).map_err(|source| ConfigError::Io {
        operation: "secret.read",
        path: path.to_path_buf(),
        source,
    })?;
    secret_from_material(&material)
}

fn secret_from_material(material: &[u8]) -> ConfigResult<Secret> {
    Secret::from_bytes(material).map_err(|_| ConfigError::SecretTooShort {
        length: material.len(),
        minimum: SECRET_LEN,
    })
}

/// Load credentials from the environment value (`user:hash,user:hash`,
/// takes precedence) or from a passwd-style file (`user:hash` per line).
///
/// Malformed entries are warned about and skipped; they never abort the
/// load. An empty result does: a service with no provisioned identities
/// cannot authenticate anyone and must not start.
///
/// # Errors
///
/// Returns an error when the credential file cannot be read, or when zero
/// entries survive loading.
pub fn load_credentials(env_value: Option<&str>, path: &Path) -> ConfigResult<CredentialStore> {
    let mut entries = HashMap::new();

    if let Some(users) = env_value.map(str::trim).filter(|value| !value.is_empty()) {
        for pair in users.split(',') {
            let Some((username, hash)) = pair.split_once(':') else {
                warn!(source = USERS_ENV, "skipping credential entry without ':'");
                continue;
            };
            insert_entry(&mut entries, username.trim(), hash.trim());
        }
    } else {
        let contents = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            operation: "passwd.read",
            path: path.to_path_buf(),
            source,
        })?;
        for line in contents.lines() {
            let line = line.trim();
            if line.is_empty() {
                continue;
            }
            let Some((username, hash)) = line.split_once(':') else {
                warn!(path = %path.display(), "skipping credential line without ':'");
                continue;
            };
            insert_entry(&mut entries, username, hash);
        }
    }

    if entries.is_empty() {
        return Err(ConfigError::NoCredentials);
    }
    Ok(CredentialStore::new(entries))
}

fn insert_entry(entries: &mut HashMap<String, String>, username: &str, hash: &str) {
    if username.is_empty() || hash.is_empty() {
        warn!("skipping credential entry with empty username or hash");
        return;
    }
    if entries
        .insert(username.to_string(), hash.to_string())
        .is_some()
    {
        warn!(username, "duplicate credential entry overrides earlier one");
    }
}

/// Read the fallback login page from the configured HTML directory.
///
/// The page is served verbatim on every non-200 response and never
/// templated.
///
/// # Errors
///
/// Returns an error when the file cannot be read.
pub fn load_login_page(html_dir: &Path) -> ConfigResult<Vec<u8>> {
    let path = html_dir.join(LOGIN_PAGE_FILE);
    fs::read(&path).map_err(|source| ConfigError::Io {
        operation: "login_page.read",
        path,
        source,
    })
}

/// Parse a token lifespan like `2400h`, `30d` or `1h30m`.
///
/// Accepts one or more `<count><unit>` segments with units `s`, `m`, `h`
/// and `d`. The total must be positive.
///
/// # Errors
///
/// Returns an error for empty input, unknown units, counts without units,
/// zero totals, or values that overflow.
pub fn parse_lifespan(value: &str) -> ConfigResult<Duration> {
    let invalid = |reason: &'static str| ConfigError::InvalidLifespan {
        value: value.to_string(),
        reason,
    };

    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(invalid("empty"));
    }

    let mut total: u64 = 0;
    let mut digits = String::new();
    for ch in trimmed.chars() {
        if ch.is_ascii_digit() {
            digits.push(ch);
            continue;
        }
        let unit_seconds: u64 = match ch {
            's' => 1,
            'm' => 60,
            'h' => 60 * 60,
            'd' => 60 * 60 * 24,
            _ => return Err(invalid("unknown unit")),
        };
        if digits.is_empty() {
            return Err(invalid("unit without a count"));
        }
        let count: u64 = digits.parse().map_err(|_| invalid("count out of range"))?;
        total = count
            .checked_mul(unit_seconds)
            .and_then(|segment| total.checked_add(segment))
            .ok_or_else(|| invalid("overflow"))?;
        digits.clear();
    }
    if !digits.is_empty() {
        return Err(invalid("count without a unit"));
    }
    if total == 0 {
        return Err(invalid("zero duration"));
    }
    Ok(Duration::from_secs(total))
}
