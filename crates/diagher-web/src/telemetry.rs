//! Tracing setup for the server binary.
//!
//! The subscriber is installed before the config file is read so that
//! config loading can log; the configured filter is swapped in afterwards
//! unless `RUST_LOG` was set.

use tracing::Subscriber;
use tracing_subscriber::fmt::MakeWriter;
use tracing_subscriber::{fmt, prelude::*, reload, EnvFilter, Registry};

use diagher_common::LoggingConfig;

/// Filter used until the config file has been read.
pub const BOOTSTRAP_FILTER: &str = "diagher=debug,info";

/// Handle for replacing the bootstrap filter once configuration is known.
pub struct LogFilterHandle {
    handle: reload::Handle<EnvFilter, Registry>,
    from_env: bool,
}

impl LogFilterHandle {
    /// Switch to the configured filter. No-op when `RUST_LOG` was given.
    pub fn apply(&self, logging: &LoggingConfig) -> anyhow::Result<()> {
        if self.from_env {
            return Ok(());
        }
        self.handle.reload(EnvFilter::try_new(&logging.filter)?)?;
        Ok(())
    }
}

/// Build the subscriber. `env_filter` is the parsed `RUST_LOG`, if any.
pub fn build_subscriber<W>(
    env_filter: Option<EnvFilter>,
    make_writer: W,
) -> (impl Subscriber + Send + Sync + 'static, LogFilterHandle)
where
    W: for<'w> MakeWriter<'w> + Send + Sync + 'static,
{
    let from_env = env_filter.is_some();
    let initial = env_filter.unwrap_or_else(|| EnvFilter::new(BOOTSTRAP_FILTER));
    let (filter, handle) = reload::Layer::new(initial);

    let subscriber = tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_writer(make_writer));

    (subscriber, LogFilterHandle { handle, from_env })
}
