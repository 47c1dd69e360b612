//! Tracing subscriber setup.

use tracing_subscriber::{EnvFilter, fmt};

/// Output format of log lines.
#[derive(Debug, Clone, Copy, Default, clap::ValueEnum)]
pub enum LogFormat {
    #[default]
    Plain,
    Json,
}

/// Level used when `RUST_LOG` is unset.
///
/// Dry-run statement previews are logged at `debug`, so a dry run raises
/// the level just like `verbose` does.
fn default_level(verbose: bool, dry_run: bool) -> &'static str {
    if verbose || dry_run { "debug" } else { "info" }
}

/// Installs the global subscriber, writing to stderr.
///
/// `RUST_LOG` wins over the defaults.
pub fn init(verbose: bool, dry_run: bool, format: LogFormat) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_level(verbose, dry_run)));

    match format {
        LogFormat::Json => {
            fmt()
                .json()
                .with_env_filter(filter)
                .with_writer(std::io::stderr)
                .init();
        }
        LogFormat::Plain => {
            fmt()
                .with_env_filter(filter)
                .with_writer(std::io::stderr)
                .init();
        }
    }
}
