#![forbid(unsafe_code)]
#![deny(
    warnings,
    dead_code,
    unused,
    unused_imports,
    unused_must_use,
    unreachable_pub,
    clippy::all,
    clippy::pedantic,
    clippy::cargo,
    clippy::nursery,
    rustdoc::broken_intra_doc_links,
    rustdoc::bare_urls,
    missing_docs
)]

//! Startup configuration for the Gatekey service.
//!
//! Layout: `loader.rs` (secret, credential and login-page loaders plus
//! lifespan parsing), `settings.rs` (validated runtime settings),
//! `error.rs` (configuration error taxonomy).
//!
//! Everything here runs once at boot. A failure is fatal to the process;
//! nothing in this crate is touched on the per-request path.

pub mod error;
pub mod loader;
pub mod settings;

pub use error::{ConfigError, ConfigResult};
pub use loader::{load_credentials, load_login_page, load_secret, parse_lifespan};
pub use settings::{
    DEFAULT_COOKIE_NAME, DEFAULT_LIFESPAN, DEFAULT_LISTEN, DEFAULT_LOGIN_STATUS, Settings,
};
