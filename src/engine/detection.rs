// ABOUTME: Local container engine detection.
// ABOUTME: Honors DOCKER_HOST, then checks the Docker socket, then Podman sockets.

use super::types::{EngineSocket, EngineType};
use std::path::Path;

/// Error during engine detection.
#[derive(Debug, thiserror::Error)]
pub enum DetectionError {
    #[error("no container engine socket found (checked DOCKER_HOST, Docker and Podman sockets)")]
    NoEngineFound,

    #[error("unsupported DOCKER_HOST '{0}' (only unix:// sockets are supported)")]
    UnsupportedHost(String),
}

const DOCKER_SOCKET: &str = "/var/run/docker.sock";
const ROOTFUL_PODMAN: &str = "/run/podman/podman.sock";

/// Detect the container engine on the local system.
///
/// Detection order:
/// 1. `DOCKER_HOST` when it names a unix socket
/// 2. Docker socket (`/var/run/docker.sock`)
/// 3. Rootless Podman socket (`/run/user/$UID/podman/podman.sock`)
/// 4. Rootful Podman socket (`/run/podman/podman.sock`)
pub fn detect_local() -> Result<EngineSocket, DetectionError> {
    detect_with(std::env::var("DOCKER_HOST").ok().as_deref(), get_uid().as_deref(), |p| {
        Path::new(p).exists()
    })
}

fn detect_with(
    docker_host: Option<&str>,
    uid: Option<&str>,
    exists: impl Fn(&str) -> bool,
) -> Result<EngineSocket, DetectionError> {
    if let Some(host) = docker_host.filter(|h| !h.is_empty()) {
        let path = host
            .strip_prefix("unix://")
            .ok_or_else(|| DetectionError::UnsupportedHost(host.to_string()))?;
        let engine_type = if path.contains("podman") {
            EngineType::Podman
        } else {
            EngineType::Docker
        };
        return Ok(EngineSocket {
            engine_type,
            socket_path: path.to_string(),
        });
    }

    if exists(DOCKER_SOCKET) {
        return Ok(EngineSocket {
            engine_type: EngineType::Docker,
            socket_path: DOCKER_SOCKET.to_string(),
        });
    }

    if let Some(uid) = uid {
        let rootless_socket = format!("/run/user/{}/podman/podman.sock", uid);
        if exists(&rootless_socket) {
            return Ok(EngineSocket {
                engine_type: EngineType::Podman,
                socket_path: rootless_socket,
            });
        }
    }

    if exists(ROOTFUL_PODMAN) {
        return Ok(EngineSocket {
            engine_type: EngineType::Podman,
            socket_path: ROOTFUL_PODMAN.to_string(),
        });
    }

    Err(DetectionError::NoEngineFound)
}

fn get_uid() -> Option<String> {
    std::env::var("UID").ok().or_else(|| {
        // Fall back to reading /proc/self/status
        std::fs::read_to_string("/proc/self/status")
            .ok()
            .and_then(|s| {
                s.lines()
                    .find(|l| l.starts_with("Uid:"))
                    .and_then(|l| l.split_whitespace().nth(1))
                    .map(|s| s.to_string())
            })
    })
}
