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

//! Stateless forward-authentication decision core.
//!
//! Layout: `token.rs` (signed session tokens), `credentials.rs` (password
//! verification), `classify.rs` (per-request authentication claims),
//! `engine.rs` (the decision table turning a claim into an HTTP outcome).
//!
//! The crate is deliberately free of HTTP framework types and I/O: callers
//! extract credentials and cookies from the transport, hand them to the
//! [`DecisionEngine`], and render the returned [`Decision`].

pub mod classify;
pub mod credentials;
pub mod engine;
pub mod error;
pub mod token;

pub use classify::{BasicCredentials, ClassificationResult, Classifier};
pub use credentials::CredentialStore;
pub use engine::{AuthOutcome, AuthRequest, Decision, DecisionEngine, EngineOptions};
pub use error::{TokenError, TokenResult};
pub use token::{MAC_LEN, SECRET_LEN, Secret, Token};
