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
    clippy::nursery,
    rustdoc::broken_intra_doc_links,
    rustdoc::bare_urls,
    missing_docs
)]

//! Gatekey application bootstrap wiring.
//!
//! Layout: `cli.rs` (flag and environment parsing), `bootstrap.rs` (boot
//! sequence from parsed flags to a serving listener).

/// Application bootstrap and environment loading.
pub mod bootstrap;
/// Command-line flag definitions.
pub mod cli;
/// Application-level error type.
pub mod error;

pub use bootstrap::run_app;
pub use cli::Cli;
pub use error::{AppError, AppResult};
