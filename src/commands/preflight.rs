// ABOUTME: Requirement validation that runs before any configuration or network work.
// ABOUTME: Checks required tools are on PATH and the container engine answers.

use std::path::PathBuf;

use crate::deploy::{DeployError, Stage};
use crate::engine::{self, BollardEngine, EngineErrorKind, EngineInfo};

fn missing(name: &str, detail: impl std::fmt::Display) -> DeployError {
    DeployError::MissingDependency {
        stage: Stage::Validate,
        name: name.to_string(),
        detail: detail.to_string(),
    }
}

/// Locate a tool on PATH.
pub fn require_tool(name: &str) -> Result<PathBuf, DeployError> {
    let path = which::which(name).map_err(|e| missing(name, e))?;
    tracing::debug!("found {} at {}", name, path.display());
    Ok(path)
}

/// Fail unless the engine daemon answers a ping.
pub async fn require_engine<E: EngineInfo>(engine: &E) -> Result<(), DeployError> {
    engine
        .ping()
        .await
        .map_err(|e| missing("container engine daemon", e))
}

/// Find the local engine, its CLI and make sure the daemon is reachable.
pub async fn connect_engine() -> Result<BollardEngine, DeployError> {
    let engine = engine::connect_local().map_err(|e| {
        let name = match e.kind() {
            EngineErrorKind::NoEngineFound | EngineErrorKind::UnsupportedHost => {
                "container engine"
            }
            EngineErrorKind::ConnectionFailed | EngineErrorKind::EngineOperation => {
                "container engine daemon"
            }
        };
        missing(name, e)
    })?;
    let program = require_tool(engine.engine_type().program())?;
    require_engine(&engine).await?;
    Ok(engine.with_program(program))
}
