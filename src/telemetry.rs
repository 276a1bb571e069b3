use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Installs the `fmt` subscriber; `RUST_LOG` overrides the default filter.
pub fn init_tracing() {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,pos_backoffice=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();
}
