use anyhow::{Context, Result};
use std::{fs::OpenOptions, path::Path, sync::Mutex};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Routes tracing output to `path`. The terminal belongs to the UI, so nothing
/// is ever written to stdout or stderr. `RUST_LOG` overrides the default
/// `info` filter.
pub(crate) fn init(path: &Path) -> Result<()> {
    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .with_context(|| format!("opening log file {}", path.display()))?;

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::registry()
        .with(filter)
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(false)
                .with_ansi(false)
                .with_writer(Mutex::new(file)),
        )
        .try_init()
        .context("installing log subscriber")?;
    Ok(())
}
