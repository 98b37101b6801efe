//! Tracing setup for the command-line front end.
//!
//! Library code only emits `tracing` events; nothing is printed unless the
//! binary installs a subscriber here. Output goes to stderr so it never mixes
//! with results on stdout.

use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Directives used by `--verbose` when `RUST_LOG` is unset: lowering and
/// checking at debug, per-block conditions and e-graph internals stay quiet.
pub const VERBOSE_DIRECTIVES: &str = "warn,triple_if=debug,egg=warn";

/// Which directives to install, if any. `RUST_LOG` wins over `--verbose`.
pub fn directives(rust_log: Option<&str>, verbose: bool) -> Option<String> {
    match rust_log {
        Some(filter) if !filter.trim().is_empty() => Some(filter.to_string()),
        _ if verbose => Some(VERBOSE_DIRECTIVES.to_string()),
        _ => None,
    }
}

/// Install the stderr subscriber when `RUST_LOG` is set or `verbose` is
/// requested. A second call, or one after another subscriber was set, is a
/// no-op.
pub fn init_tracing(verbose: bool) {
    let rust_log = std::env::var("RUST_LOG").ok();
    let Some(directives) = directives(rust_log.as_deref(), verbose) else {
        return;
    };
    let filter = EnvFilter::try_new(&directives).unwrap_or_else(|e| {
        eprintln!("ignoring invalid log filter '{}': {}", directives, e);
        EnvFilter::new(VERBOSE_DIRECTIVES)
    });

    let layer = fmt::layer()
        .without_time()
        .with_target(verbose)
        .compact()
        .with_writer(std::io::stderr);

    let _ = tracing_subscriber::registry()
        .with(filter)
        .with(layer)
        .try_init();
}
