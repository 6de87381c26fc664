use std::sync::OnceLock;

use tracing::error;
use tracing_subscriber::prelude::*;
use tracing_subscriber::reload::Handle;
use tracing_subscriber::{EnvFilter, Registry};

use crate::commands::Verbosity;

static LOGGER_HANDLE: OnceLock<Handle<EnvFilter, Registry>> = OnceLock::new();

/// Install the logger, or update its filter if it is installed already.
///
/// `RUST_LOG` takes precedence over the verbosity flags.
pub(crate) fn init_logger(verbosity: Option<Verbosity>) {
    let log_filter = log_filter(verbosity.unwrap_or_default());

    let filter_handle = LOGGER_HANDLE.get_or_init(|| {
        // Start permissive, the actual filter is applied right below.
        let filter = EnvFilter::new("trace");
        let (filter, reload_handle) = tracing_subscriber::reload::Layer::new(filter);
        let log_layer = tracing_subscriber::fmt::layer()
            .with_writer(std::io::stderr)
            .with_target(false);
        tracing_subscriber::registry()
            .with(filter)
            .with(log_layer)
            .init();
        reload_handle
    });

    update_filters(filter_handle, log_filter);
}

fn log_filter(verbosity: Verbosity) -> &'static str {
    match verbosity {
        Verbosity::Quiet => "off,pokedex=error",
        Verbosity::Verbose(0) => "off,pokedex=warn",
        Verbosity::Verbose(1) => "off,pokedex=info,pokedex_sdk=info",
        // Also show requests sent by the client
        Verbosity::Verbose(2) => "off,pokedex=debug,pokedex_sdk=debug,pokedex_catalog=debug",
        Verbosity::Verbose(3) => "off,pokedex=trace,pokedex_sdk=trace,pokedex_catalog=trace",
        Verbosity::Verbose(_) => "trace",
    }
}

fn update_filters(filter_handle: &Handle<EnvFilter, Registry>, log_filter: &str) {
    let result = filter_handle.modify(|layer| {
        match EnvFilter::try_from_default_env().or_else(|_| EnvFilter::try_new(log_filter)) {
            Ok(new_filter) => *layer = new_filter,
            Err(err) => {
                error!("Updating logger filter failed: {}", err);
            },
        };
    });
    if let Err(err) = result {
        error!("Updating logger filter failed: {}", err);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn filters_parse() {
        for verbosity in [
            Verbosity::Quiet,
            Verbosity::Verbose(0),
            Verbosity::Verbose(1),
            Verbosity::Verbose(2),
            Verbosity::Verbose(3),
            Verbosity::Verbose(9),
        ] {
            let filter = log_filter(verbosity);
            assert!(EnvFilter::try_new(filter).is_ok(), "invalid filter {filter}");
        }
    }

    #[test]
    fn more_verbosity_enables_client_logs() {
        assert!(!log_filter(Verbosity::Verbose(1)).contains("pokedex_catalog"));
        assert!(log_filter(Verbosity::Verbose(2)).contains("pokedex_catalog=debug"));
    }
}
