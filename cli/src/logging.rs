use crate::config::get_log_dir;
use anyhow::{Context, Result};
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

const DEFAULT_FILTER: &str = "artifetch=info,artifetch_core=info";
const DEBUG_FILTER: &str = "artifetch=debug,artifetch_core=debug";

/// Initialize logging for the artifetch CLI
///
/// Logs are written to:
/// - XDG_DATA_HOME/artifetch/logs/ on Unix (typically ~/.local/share/artifetch/logs/)
/// - ~/Library/Application Support/artifetch/logs/ on macOS
/// - {FOLDERID_LocalAppData}/artifetch/logs/ on Windows
///
/// Log files are rotated daily with the pattern: artifetch.log.YYYY-MM-DD
///
/// RUST_LOG takes precedence over `debug`:
/// - RUST_LOG=trace artifetch download ...  (everything, including reqwest)
/// - artifetch download --debug ...         (debug for artifetch itself)
pub fn init(debug: bool) -> Result<()> {
    let log_dir = get_log_dir()?;

    std::fs::create_dir_all(&log_dir)
        .with_context(|| format!("Failed to create log directory: {}", log_dir.display()))?;

    let file_appender = tracing_appender::rolling::daily(&log_dir, "artifetch.log");

    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_filter(debug)));

    tracing_subscriber::registry()
        .with(env_filter)
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(file_appender)
                .with_ansi(false)
                .with_target(true)
                .with_thread_ids(true)
                .with_line_number(true),
        )
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(std::io::stderr)
                .with_ansi(true)
                .with_target(false)
                .compact(),
        )
        .try_init()
        .context("Failed to initialize tracing subscriber")?;

    tracing::debug!("Logging initialized to {}", log_dir.display());

    Ok(())
}

fn default_filter(debug: bool) -> &'static str {
    if debug { DEBUG_FILTER } else { DEFAULT_FILTER }
}
