use std::sync::Once;

static TRACING_INIT: Once = Once::new();

/// Initializes the global tracing subscriber with sensible defaults.
///
/// `RUST_LOG` directives are honoured; `signup_core=info` is always added so
/// transitions show up without any environment setup.
pub fn init_tracing() {
    TRACING_INIT.call_once(|| {
        use tracing_subscriber::{fmt, EnvFilter};

        let mut filter = EnvFilter::from_default_env();
        if let Ok(directive) = "signup_core=info".parse() {
            filter = filter.add_directive(directive);
        }

        // Another subscriber may already be installed by a host binary or test harness.
        let _ = fmt().with_env_filter(filter).with_writer(std::io::stderr).try_init();
    });
}
