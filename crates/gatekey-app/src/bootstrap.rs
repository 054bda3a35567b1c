//! Boot sequence: parse flags, load secrets and credentials, then serve.

use clap::Parser;
use gatekey_api::ApiServer;
use gatekey_config::loader::{SECRET_ENV, USERS_ENV};
use gatekey_config::{Settings, load_credentials, load_login_page, load_secret};
use gatekey_core::{DecisionEngine, EngineOptions};
use gatekey_telemetry::{LogFormat, LoggingConfig, Metrics, init_logging};
use tracing::info;

use crate::cli::Cli;
use crate::error::{AppError, AppResult};

/// Entry point for the Gatekey boot sequence.
///
/// # Errors
///
/// Returns an error if configuration loading, telemetry setup, or the HTTP
/// listener fails.
pub async fn run_app() -> AppResult<()> {
    let cli = Cli::parse();
    run_app_with(cli).await
}

/// Boot sequence driven entirely by parsed flags, to keep it testable.
pub(crate) async fn run_app_with(cli: Cli) -> AppResult<()> {
    init_logging(&logging_config(&cli)).map_err(|err| AppError::telemetry("telemetry.init", err))?;

    let settings = Settings::from_parts(
        &cli.listen,
        &cli.lifespan,
        &cli.cookie_name,
        cli.login_status,
        cli.passwd,
        cli.secret,
        cli.html,
    )
    .map_err(|err| AppError::config("settings.from_parts", err))?;

    // Environment values win over files, matching container secret wiring.
    let secret_env = std::env::var(SECRET_ENV).ok();
    let secret = load_secret(secret_env.as_deref(), &settings.secret_path)
        .map_err(|err| AppError::config("load_secret", err))?;
    let users_env = std::env::var(USERS_ENV).ok();
    let store = load_credentials(users_env.as_deref(), &settings.passwd_path)
        .map_err(|err| AppError::config("load_credentials", err))?;
    let login_page =
        load_login_page(&settings.html_dir).map_err(|err| AppError::config("load_login_page", err))?;

    let metrics = Metrics::new().map_err(|err| AppError::telemetry("telemetry.metrics", err))?;

    let engine = DecisionEngine::new(
        secret,
        store,
        EngineOptions {
            cookie_name: settings.cookie_name.clone(),
            lifespan: settings.lifespan,
            login_status: settings.login_status,
        },
    );

    info!(
        listen = %settings.listen,
        users = engine.credential_count(),
        secret_source = if secret_env.is_some() { "env" } else { "file" },
        cookie_name = %settings.cookie_name,
        login_status = settings.login_status,
        lifespan_secs = settings.lifespan.as_secs(),
        "Gatekey boot complete"
    );

    ApiServer::new(engine, login_page, metrics)
        .serve(settings.listen)
        .await
        .map_err(|err| AppError::api_server("api_server.serve", err))
}

fn logging_config(cli: &Cli) -> LoggingConfig<'_> {
    LoggingConfig {
        level: &cli.log_level,
        format: cli
            .log_format
            .as_deref()
            .map_or_else(LogFormat::infer, LogFormat::from_name),
    }
}
