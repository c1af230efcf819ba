//! Logging setup utilities for the Kakehashi binaries.

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Build the default `EnvFilter` directive string.
///
/// Every crate in `targets` gets `default_log_level`. Crate names may be given with
/// dashes (as in `Cargo.toml`); they are normalized to the underscore form used by
/// `tracing` targets.
pub fn default_directives(targets: &[&str], default_log_level: &str) -> String {
    targets
        .iter()
        .map(|target| format!("{}={}", target.replace('-', "_"), default_log_level))
        .collect::<Vec<_>>()
        .join(",")
}

/// Initialize the tracing subscriber.
///
/// The filter can be overridden using the `RUST_LOG` environment variable.
///
/// # Arguments
///
/// * `targets` - Crate / binary names to enable (e.g. `["kakehashi-server"]`)
/// * `default_log_level` - Level applied to every target when `RUST_LOG` is unset
///
/// # Examples
///
/// ```no_run
/// use kakehashi_shared::logger::setup_logger;
///
/// setup_logger(&["kakehashi-server", "tower_http"], "debug");
/// ```
pub fn setup_logger(targets: &[&str], default_log_level: &str) {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| default_directives(targets, default_log_level).into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();
}
