// ABOUTME: Container engine type definitions for Docker and Podman.
// ABOUTME: Includes EngineType enum and the socket an engine listens on.

use serde::{Deserialize, Serialize};

/// The local container engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EngineType {
    Docker,
    Podman,
}

impl EngineType {
    /// Command-line tool used for builds and registry login.
    pub fn program(&self) -> &'static str {
        match self {
            EngineType::Docker => "docker",
            EngineType::Podman => "podman",
        }
    }
}

impl std::fmt::Display for EngineType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            EngineType::Docker => write!(f, "docker"),
            EngineType::Podman => write!(f, "podman"),
        }
    }
}

/// Detected engine socket.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EngineSocket {
    /// The type of engine detected.
    pub engine_type: EngineType,
    /// Path to the engine's API socket.
    pub socket_path: String,
}
