//! Subscriber setup for the `tracing` events emitted by the library crates.
//!
//! `RUST_LOG` takes precedence over the `[logging]` config section:
//! ```bash
//! RUST_LOG=kb_retrieval=debug kb query "refund window"
//! ```

use std::sync::Once;

use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, Layer};

use crate::config::LoggingConfig;

static INIT: Once = Once::new();

/// Install the global subscriber. Only the first call takes effect; a
/// subscriber installed elsewhere (e.g. by a host application) is left alone.
pub fn init_with_config(config: &LoggingConfig) {
    INIT.call_once(|| {
        let filter = if std::env::var("RUST_LOG").is_ok() {
            EnvFilter::from_default_env()
        } else {
            EnvFilter::new(filter_directives(config))
        };

        let fmt_layer = tracing_subscriber::fmt::layer()
            .with_writer(std::io::stderr)
            .with_target(true)
            .with_level(true)
            .compact()
            .with_filter(filter);

        let _ = tracing_subscriber::registry().with(fmt_layer).try_init();
    });
}

/// `default` followed by `module=level` pairs, in `EnvFilter` syntax.
pub fn filter_directives(config: &LoggingConfig) -> String {
    let mut directives = config.default.clone();
    for (module, level) in &config.modules {
        directives.push_str(&format!(",{module}={level}"));
    }
    directives
}
