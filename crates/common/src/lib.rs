use snafu::ResultExt;
use tracing_subscriber::EnvFilter;

#[derive(Debug, snafu::Snafu)]
pub enum InitLoggerError {
    #[snafu(display("Invalid log filter directive: {}", source))]
    BadFilter {
        source: tracing_subscriber::filter::ParseError,
    },

    #[snafu(display("Failed to initialize logger: {}", source))]
    LoggerFailed {
        source: Box<dyn std::error::Error + Send + Sync>,
    },
}

/// Install the global fmt subscriber. `directives` follows `RUST_LOG` syntax,
/// e.g. `info` or `apipulse_server=debug,sqlx=warn`.
pub fn init_logger(directives: &str) -> Result<(), InitLoggerError> {
    let filter = EnvFilter::try_new(directives).context(BadFilterSnafu)?;

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .try_init()
        .context(LoggerFailedSnafu)?;

    Ok(())
}

/// Resolves once the process receives SIGTERM or SIGINT, for use with
/// `axum::serve(..).with_graceful_shutdown`.
pub async fn shutdown_signal() {
    #[cfg(unix)]
    {
        use tokio::signal::unix::{signal, SignalKind};

        let mut sigterm =
            signal(SignalKind::terminate()).expect("failed to install handler for SIGTERM");
        let mut sigint =
            signal(SignalKind::interrupt()).expect("failed to install handler for SIGINT");

        tokio::select! {
            _ = sigterm.recv() => {},
            _ = sigint.recv() => {},
        }
    }

    #[cfg(not(unix))]
    {
        tokio::signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    }
}
