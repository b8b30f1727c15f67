//! Tracing subscriber setup.
//!
//! Logs go to stderr so stdout stays clean for tables and plots. `RUST_LOG`
//! overrides the default directive.

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Default filter for CLI commands.
pub const CLI_DIRECTIVE: &str = "price_elasticity=info";
/// The TUI owns the screen, so only warnings and errors get through.
pub const TUI_DIRECTIVE: &str = "price_elasticity=warn";

/// Install the global subscriber. Calling it twice is a no-op.
pub fn init(default_directive: &str) {
    let _ = tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| default_directive.into()),
        )
        .try_init();
}
