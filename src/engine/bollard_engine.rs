// ABOUTME: Bollard-based container engine implementation.
// ABOUTME: API calls go through bollard; builds and registry login use the engine CLI.

use async_trait::async_trait;
use bollard::Docker;
use bollard::auth::DockerCredentials;
use bollard::query_parameters::{
    ListImagesOptions, PushImageOptions, RemoveImageOptions, TagImageOptions,
};
use futures::StreamExt;
use secrecy::ExposeSecret;
use std::path::PathBuf;
use std::process::Stdio;
use tokio::io::AsyncWriteExt;
use tokio::process::Command;

use super::auth::RegistryAuth;
use super::traits::{
    BuildError, BuildOps, BuildSpec, EngineInfo, EngineInfoError, ImageError, ImageOps,
    LoginError, LoginOps,
};
use super::types::{EngineSocket, EngineType};
use crate::types::{ImageRef, RepositoryName};

/// Lines of build output kept when a build fails.
const BUILD_OUTPUT_TAIL: usize = 60;

fn map_image_error(e: bollard::errors::Error, image_name: &str) -> ImageError {
    match &e {
        bollard::errors::Error::DockerResponseServerError { status_code, .. }
            if *status_code == 404 =>
        {
            ImageError::NotFound(image_name.to_string())
        }
        _ => ImageError::Engine(format!("{}: {}", image_name, e)),
    }
}

/// Error message embedded in a push progress message, if any.
///
/// Registries report rejected pushes inside the progress stream rather than
/// as an HTTP error.
fn stream_error(message: &serde_json::Value) -> Option<String> {
    if let Some(detail) = message
        .get("errorDetail")
        .and_then(|d| d.get("message"))
        .and_then(|m| m.as_str())
    {
        return Some(detail.to_string());
    }
    message
        .get("error")
        .and_then(|e| e.as_str())
        .filter(|e| !e.is_empty())
        .map(|e| e.to_string())
}

/// Keep the last `lines` lines of tool output.
fn output_tail(output: &str, lines: usize) -> String {
    let all: Vec<&str> = output.lines().collect();
    let start = all.len().saturating_sub(lines);
    all[start..].join("\n")
}

/// Container engine reached over its API socket.
pub struct BollardEngine {
    client: Docker,
    engine_type: EngineType,
    program: PathBuf,
}

impl BollardEngine {
    pub fn new(client: Docker, engine_type: EngineType) -> Self {
        Self {
            client,
            engine_type,
            program: PathBuf::from(engine_type.program()),
        }
    }

    /// Connect to a detected engine socket.
    pub fn connect(socket: &EngineSocket) -> Result<Self, EngineInfoError> {
        let client =
            Docker::connect_with_unix(&socket.socket_path, 120, bollard::API_DEFAULT_VERSION)
                .map_err(|e| EngineInfoError::ConnectionFailed(e.to_string()))?;
        Ok(Self::new(client, socket.engine_type))
    }

    /// Use a specific CLI binary for builds and login.
    pub fn with_program(mut self, program: impl Into<PathBuf>) -> Self {
        self.program = program.into();
        self
    }

    pub fn engine_type(&self) -> EngineType {
        self.engine_type
    }
}

#[async_trait]
impl EngineInfo for BollardEngine {
    async fn ping(&self) -> Result<(), EngineInfoError> {
        self.client
            .ping()
            .await
            .map_err(|e| EngineInfoError::ConnectionFailed(e.to_string()))?;
        Ok(())
    }
}

#[async_trait]
impl LoginOps for BollardEngine {
    async fn login(&self, auth: &RegistryAuth) -> Result<(), LoginError> {
        tracing::debug!(server = %auth.server, "registry login");

        let mut child = Command::new(&self.program)
            .args(["login", "--username", auth.username.as_str(), "--password-stdin"])
            .arg(&auth.server)
            .stdin(Stdio::piped())
            .stdout(Stdio::null())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|e| LoginError::Spawn(e.to_string()))?;

        if let Some(mut stdin) = child.stdin.take() {
            stdin
                .write_all(auth.password.expose_secret().as_bytes())
                .await
                .map_err(|e| LoginError::Spawn(e.to_string()))?;
        }

        let output = child
            .wait_with_output()
            .await
            .map_err(|e| LoginError::Spawn(e.to_string()))?;

        if !output.status.success() {
            return Err(LoginError::Rejected {
                server: auth.server.clone(),
                message: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }
        Ok(())
    }
}

#[async_trait]
impl BuildOps for BollardEngine {
    async fn build_image(&self, spec: &BuildSpec) -> Result<(), BuildError> {
        if !spec.context.is_dir() {
            return Err(BuildError::ContextNotFound(spec.context.display().to_string()));
        }
        if !spec.dockerfile.is_file() {
            return Err(BuildError::DockerfileNotFound(
                spec.dockerfile.display().to_string(),
            ));
        }

        let image = spec.image.to_string();
        tracing::debug!(%image, platform = %spec.platform, "building image");

        let output = Command::new(&self.program)
            .arg("build")
            .args(["--platform", spec.platform.as_str()])
            .args(["--tag", image.as_str()])
            .arg("--file")
            .arg(&spec.dockerfile)
            .arg(&spec.context)
            .stdin(Stdio::null())
            .output()
            .await
            .map_err(|e| BuildError::Spawn(e.to_string()))?;

        if !output.status.success() {
            // BuildKit writes progress and errors to stderr, the classic builder to stdout
            let mut combined = String::from_utf8_lossy(&output.stdout).into_owned();
            combined.push_str(&String::from_utf8_lossy(&output.stderr));
            return Err(BuildError::Failed {
                image,
                output: output_tail(&combined, BUILD_OUTPUT_TAIL),
            });
        }
        Ok(())
    }
}

#[async_trait]
impl ImageOps for BollardEngine {
    async fn tag_image(&self, source: &ImageRef, target: &ImageRef) -> Result<(), ImageError> {
        let source_name = source.to_string();
        let opts = TagImageOptions {
            repo: Some(target.repository()),
            tag: Some(target.tag().to_string()),
            ..Default::default()
        };

        self.client
            .tag_image(&source_name, Some(opts))
            .await
            .map_err(|e| ImageError::TagFailed {
                source_image: source_name.clone(),
                target: target.to_string(),
                message: e.to_string(),
            })
    }

    async fn push_image(&self, image: &ImageRef, auth: &RegistryAuth) -> Result<(), ImageError> {
        let image_name = image.to_string();
        let opts = PushImageOptions {
            tag: Some(image.tag().to_string()),
            ..Default::default()
        };
        let credentials = DockerCredentials {
            username: Some(auth.username.clone()),
            password: Some(auth.password.expose_secret().to_string()),
            serveraddress: Some(auth.server.clone()),
            ..Default::default()
        };

        let mut stream = self
            .client
            .push_image(&image.repository(), Some(opts), Some(credentials));
        while let Some(result) = stream.next().await {
            let info = result.map_err(|e| ImageError::PushFailed {
                image: image_name.clone(),
                message: e.to_string(),
            })?;
            let message = serde_json::to_value(&info).unwrap_or_default();
            if let Some(message) = stream_error(&message) {
                return Err(ImageError::PushFailed {
                    image: image_name,
                    message,
                });
            }
        }
        Ok(())
    }

    async fn remove_image(&self, image: &ImageRef) -> Result<(), ImageError> {
        let image_name = image.to_string();
        let opts = RemoveImageOptions {
            force: false,
            ..Default::default()
        };

        self.client
            .remove_image(&image_name, Some(opts), None)
            .await
            .map_err(|e| map_image_error(e, &image_name))?;
        Ok(())
    }

    async fn list_images(&self, name: &RepositoryName) -> Result<Vec<ImageRef>, ImageError> {
        let summaries = self
            .client
            .list_images(None::<ListImagesOptions>)
            .await
            .map_err(|e| ImageError::Engine(e.to_string()))?;

        Ok(summaries
            .into_iter()
            .flat_map(|summary| summary.repo_tags)
            .filter_map(|tag| ImageRef::parse(&tag).ok())
            .filter(|image| image.name() == name.as_str())
            .collect())
    }
}
