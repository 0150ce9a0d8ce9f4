use anyhow::{Context, Result};
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

/// Initialize logging for the CLI
///
/// Logs go to stderr so that stdout only carries command output. The level
/// is controlled via the RUST_LOG environment variable:
/// - RUST_LOG=debug tracing-interface publish ...  (verbose logging)
/// - RUST_LOG=info tracing-interface publish ...   (default level)
/// - RUST_LOG=error tracing-interface publish ...  (errors only)
pub fn init() -> Result<()> {
    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_directives()));

    tracing_subscriber::registry()
        .with(env_filter)
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(std::io::stderr)
                .with_ansi(false)
                .with_target(false)
                .compact(),
        )
        .try_init()
        .context("Failed to initialize tracing subscriber")?;

    Ok(())
}

fn default_directives() -> &'static str {
    "tracing_interface=info,tracing_interface_core=info"
}
