use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Environment variable holding a `tracing` filter that replaces the -v/-q level
pub const LOG_ENV: &str = "MODPLAN_LOG";

/// Install the stderr subscriber for library events
///
/// `MODPLAN_LOG` takes precedence over the verbosity flags. A second call is
/// a no-op.
pub fn init_tracing(verbosity: u8, quiet: bool) {
    let filter = EnvFilter::try_from_env(LOG_ENV)
        .unwrap_or_else(|_| EnvFilter::new(modplan_logger::filter_directive(verbosity, quiet)));

    let _ = tracing_subscriber::registry()
        .with(filter)
        .with(
            tracing_subscriber::fmt::layer()
                .compact()
                .with_writer(std::io::stderr),
        )
        .try_init();
}
