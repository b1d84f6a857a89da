// ABOUTME: Composable capability traits for the local container engine.
// ABOUTME: Defines EngineInfo, LoginOps, BuildOps and ImageOps with their errors.

use async_trait::async_trait;
use std::path::PathBuf;

use super::auth::RegistryAuth;
use crate::types::{ImageRef, RepositoryName};

/// What to build and where the result goes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuildSpec {
    pub context: PathBuf,
    pub dockerfile: PathBuf,
    /// Always passed explicitly, e.g. `linux/amd64`.
    pub platform: String,
    pub image: ImageRef,
}

/// Engine reachability.
#[async_trait]
pub trait EngineInfo: Send + Sync {
    /// Ping the engine daemon.
    async fn ping(&self) -> Result<(), EngineInfoError>;
}

/// Registry login.
#[async_trait]
pub trait LoginOps: Send + Sync {
    /// Open a login session against a registry.
    async fn login(&self, auth: &RegistryAuth) -> Result<(), LoginError>;
}

/// Image builds.
#[async_trait]
pub trait BuildOps: Send + Sync {
    /// Build an image for the pinned platform and tag it as `spec.image`.
    async fn build_image(&self, spec: &BuildSpec) -> Result<(), BuildError>;
}

/// Local image management and publishing.
#[async_trait]
pub trait ImageOps: Send + Sync {
    /// Add `target` as another reference to the image `source`.
    async fn tag_image(&self, source: &ImageRef, target: &ImageRef) -> Result<(), ImageError>;

    /// Push one tagged reference to its registry.
    async fn push_image(&self, image: &ImageRef, auth: &RegistryAuth) -> Result<(), ImageError>;

    /// Remove a local image reference.
    async fn remove_image(&self, image: &ImageRef) -> Result<(), ImageError>;

    /// Local references whose repository name matches `name`, in any registry.
    async fn list_images(&self, name: &RepositoryName) -> Result<Vec<ImageRef>, ImageError>;
}

/// Every engine capability the deployment pipeline needs.
///
/// Automatically implemented for any type that implements all capability traits.
pub trait ContainerEngine: EngineInfo + LoginOps + BuildOps + ImageOps {}

impl<T> ContainerEngine for T where T: EngineInfo + LoginOps + BuildOps + ImageOps {}

#[derive(Debug, thiserror::Error)]
pub enum EngineInfoError {
    #[error("connection failed: {0}")]
    ConnectionFailed(String),

    #[error("engine error: {0}")]
    Engine(String),
}

#[derive(Debug, thiserror::Error)]
pub enum LoginError {
    #[error("login to {server} rejected: {message}")]
    Rejected { server: String, message: String },

    #[error("failed to run login: {0}")]
    Spawn(String),
}

#[derive(Debug, thiserror::Error)]
pub enum BuildError {
    #[error("build context not found: {0}")]
    ContextNotFound(String),

    #[error("build file not found: {0}")]
    DockerfileNotFound(String),

    #[error("failed to run build: {0}")]
    Spawn(String),

    #[error("build of {image} failed:\n{output}")]
    Failed { image: String, output: String },
}

#[derive(Debug, thiserror::Error)]
pub enum ImageError {
    #[error("image not found: {0}")]
    NotFound(String),

    #[error("failed to tag {source_image} as {target}: {message}")]
    TagFailed {
        source_image: String,
        target: String,
        message: String,
    },

    #[error("push of {image} failed: {message}")]
    PushFailed { image: String, message: String },

    #[error("engine error: {0}")]
    Engine(String),
}
