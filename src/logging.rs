//! Diagnostic logging setup for the `guardrails` binary.
//!
//! Library code only emits `tracing` events; installing a subscriber is left
//! to the process that embeds the crate. Review output goes to stdout, so
//! diagnostics are written to stderr.

use tracing_subscriber::EnvFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

/// Environment variable holding an `EnvFilter` directive.
pub const LOG_ENV: &str = "GUARDRAILS_LOG";

/// Filter used when `GUARDRAILS_LOG` is unset or invalid.
pub const DEFAULT_FILTER: &str = "warn";

/// Install the global subscriber.
///
/// `verbose` lowers the fallback filter to `debug`; an explicit
/// `GUARDRAILS_LOG` always wins. Calling this more than once is a no-op.
pub fn init(verbose: bool) {
    let fallback = if verbose { "debug" } else { DEFAULT_FILTER };
    let filter = EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new(fallback));

    let _ = tracing_subscriber::registry()
        .with(filter)
        .with(
            tracing_subscriber::fmt::layer()
                .without_time()
                .with_writer(std::io::stderr),
        )
        .try_init();
}
