//! Tracing subscriber setup

use crate::config::LoggingConfig;
use tracing::{debug, info};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

pub const LOG_FILE_PREFIX: &str = "flight-dashboard.log";

/// Build the filter for the configured level. `RUST_LOG` wins when set.
pub fn build_filter(config: &LoggingConfig) -> anyhow::Result<EnvFilter> {
    if let Ok(filter) = EnvFilter::try_from_default_env() {
        return Ok(filter);
    }
    let filter = EnvFilter::try_new(&config.level)?
        .add_directive(format!("flight_dashboard={}", config.level).parse()?)
        .add_directive("hyper=warn".parse()?)
        .add_directive("reqwest=warn".parse()?);
    Ok(filter)
}

/// Initialize logging.
///
/// With a log directory configured, events go to a daily rolling file as JSON
/// and the returned guard must be held until exit to flush them. Otherwise
/// events go to stderr so they never interleave with rendered output on stdout.
pub fn init_logging(config: &LoggingConfig) -> anyhow::Result<Option<WorkerGuard>> {
    let filter = build_filter(config)?;

    if let Some(dir) = &config.directory {
        std::fs::create_dir_all(dir)?;
        let file_appender = tracing_appender::rolling::daily(dir, LOG_FILE_PREFIX);
        let (writer, guard) = tracing_appender::non_blocking(file_appender);

        tracing_subscriber::registry()
            .with(filter)
            .with(
                tracing_subscriber::fmt::layer()
                    .with_writer(writer)
                    .with_ansi(false)
                    .with_target(true)
                    .with_thread_ids(true)
                    .with_file(true)
                    .with_line_number(true)
                    .json(),
            )
            .try_init()?;

        info!(directory = %dir.display(), "Logging initialized to rolling file");
        return Ok(Some(guard));
    }

    let registry = tracing_subscriber::registry().with(filter);
    if config.format == "json" {
        registry
            .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr).json())
            .try_init()?;
    } else {
        registry
            .with(
                tracing_subscriber::fmt::layer()
                    .with_writer(std::io::stderr)
                    .with_target(false)
                    .compact(),
            )
            .try_init()?;
    }

    debug!(level = %config.level, format = %config.format, "Logging initialized");
    Ok(None)
}
