// ABOUTME: Engine error types with SNAFU pattern.
// ABOUTME: Unifies detection and connection errors for programmatic handling.

use snafu::Snafu;

use super::detection::DetectionError;
use super::traits::EngineInfoError;

/// Failure to reach a local container engine.
#[derive(Debug, Snafu)]
#[snafu(visibility(pub))]
pub enum EngineError {
    #[snafu(display("container engine detection failed: {source}"))]
    Detection { source: DetectionError },

    #[snafu(display("container engine connection failed: {source}"))]
    Connection { source: EngineInfoError },
}

/// Error kind for programmatic handling.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EngineErrorKind {
    /// No engine socket on this machine.
    NoEngineFound,
    /// DOCKER_HOST points somewhere we cannot reach.
    UnsupportedHost,
    /// Socket exists but the daemon did not answer.
    ConnectionFailed,
    /// Engine answered with an error.
    EngineOperation,
}

impl EngineError {
    pub fn kind(&self) -> EngineErrorKind {
        match self {
            EngineError::Detection { source } => match source {
                DetectionError::NoEngineFound => EngineErrorKind::NoEngineFound,
                DetectionError::UnsupportedHost(_) => EngineErrorKind::UnsupportedHost,
            },
            EngineError::Connection { source } => match source {
                EngineInfoError::ConnectionFailed(_) => EngineErrorKind::ConnectionFailed,
                EngineInfoError::Engine(_) => EngineErrorKind::EngineOperation,
            },
        }
    }
}

impl From<DetectionError> for EngineError {
    fn from(source: DetectionError) -> Self {
        EngineError::Detection { source }
    }
}

impl From<EngineInfoError> for EngineError {
    fn from(source: EngineInfoError) -> Self {
        EngineError::Connection { source }
    }
}
