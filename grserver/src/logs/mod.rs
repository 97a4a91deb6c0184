//! Initialisation du logging pour GRender.
//!
//! Tout le workspace logge via `tracing` ; ce module installe le
//! subscriber fmt avec un `EnvFilter` pilotable par `RUST_LOG`.

use std::sync::Once;
use tracing_subscriber::EnvFilter;

static INIT: Once = Once::new();

/// Options de configuration du logging.
#[derive(Debug, Clone)]
pub struct LoggingOptions {
    /// Filtre par défaut quand `RUST_LOG` n'est pas défini (ex: "info")
    pub default_filter: String,
}

impl Default for LoggingOptions {
    fn default() -> Self {
        Self {
            default_filter: "info".to_string(),
        }
    }
}

/// Initialise le système de logging.
///
/// Idempotent : les appels suivants sont ignorés (utile dans les tests).
pub fn init_logging(options: &LoggingOptions) {
    let default = options.default_filter.clone();
    INIT.call_once(move || {
        let filter =
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&default));
        tracing_subscriber::fmt().with_env_filter(filter).init();
    });
}
