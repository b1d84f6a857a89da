// ABOUTME: Local container engine abstraction.
// ABOUTME: Capability traits plus a bollard implementation for Docker and Podman.

mod auth;
mod bollard_engine;
mod detection;
mod error;
mod traits;
mod types;

pub use auth::RegistryAuth;
pub use bollard_engine::BollardEngine;
pub use detection::{DetectionError, detect_local};
pub use error::{EngineError, EngineErrorKind};
pub use traits::{
    BuildError, BuildOps, BuildSpec, ContainerEngine, EngineInfo, EngineInfoError, ImageError,
    ImageOps, LoginError, LoginOps,
};
pub use types::{EngineSocket, EngineType};

/// Detect the local engine and open a client for it.
///
/// Nothing is sent to the daemon yet; call `EngineInfo::ping` to check it answers.
pub fn connect_local() -> Result<BollardEngine, EngineError> {
    let socket = detect_local()?;
    tracing::debug!(engine = %socket.engine_type, socket = %socket.socket_path, "engine detected");
    Ok(BollardEngine::connect(&socket)?)
}
