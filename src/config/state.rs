// Application state module
// Immutable state shared by every connection

use std::sync::atomic::AtomicUsize;
use std::sync::Arc;

use metrics_exporter_prometheus::BuildError;
use thiserror::Error;

use super::types::Config;
use crate::responder::{ErrorResponder, ResponderError};
use crate::telemetry::RequestMetrics;

/// Why the state could not be built
#[derive(Debug, Error)]
pub enum StateError {
    #[error(transparent)]
    Responder(#[from] ResponderError),
    #[error("failed to build metrics recorder: {0}")]
    Metrics(#[from] BuildError),
}

/// Application state
pub struct AppState {
    pub config: Config,
    pub responder: ErrorResponder,
    pub metrics: RequestMetrics,
    pub active_connections: Arc<AtomicUsize>,
}

impl AppState {
    /// Build the state, validating the error page configuration
    ///
    /// Fails when the default format is not a usable media type; the server
    /// must not start in that case.
    pub fn new(config: Config) -> Result<Self, StateError> {
        let responder =
            ErrorResponder::new(&config.errors.root_path, &config.errors.default_format)?
                .with_debug(config.errors.debug);

        Ok(Self {
            config,
            responder,
            metrics: RequestMetrics::new()?,
            active_connections: Arc::new(AtomicUsize::new(0)),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config_with_format(format: &str) -> Config {
        let dir = tempfile::tempdir().unwrap();
        let env = [(
            "DEFAULT_RESPONSE_FORMAT".to_string(),
            format.to_string(),
        )]
        .into_iter()
        .collect();
        Config::load_with_env(&dir.path().join("absent").to_string_lossy(), env).unwrap()
    }

    #[test]
    fn test_invalid_default_format_is_rejected() {
        assert!(matches!(
            AppState::new(config_with_format("invalid/format")),
            Err(StateError::Responder(ResponderError::UnmappedDefaultFormat { .. }))
        ));
        assert!(matches!(
            AppState::new(config_with_format("emptytype/")),
            Err(StateError::Responder(ResponderError::MalformedDefaultFormat { .. }))
        ));
    }

    #[test]
    fn test_state_carries_responder_settings() {
        let state = AppState::new(config_with_format("application/json")).unwrap();
        assert_eq!(state.responder.default_format().extension, "json");
        assert_eq!(state.responder.root_path(), std::path::Path::new("/www"));
        assert!(!state.responder.debug());
    }
}
