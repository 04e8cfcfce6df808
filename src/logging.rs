use tracing::{instrument, trace, Subscriber};
use tracing_subscriber::{
    prelude::__tracing_subscriber_SubscriberExt, util::SubscriberInitExt, EnvFilter,
};

pub const DEFAULT_FILTER: &str = "motusbot=info";

/// Formatted output filtered by `RUST_LOG`, or [`DEFAULT_FILTER`] without it.
pub fn subscriber() -> impl Subscriber + Send + Sync {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));

    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer())
        .with(filter)
}

/// Installs [`subscriber`] globally. Fails if one is already set.
#[instrument]
pub fn init_tracing() -> Result<(), tracing_subscriber::util::TryInitError> {
    subscriber().try_init()?;

    trace!("finished");
    Ok(())
}
