// ABOUTME: Registry capability: repositories, login tokens and remote image tags.
// ABOUTME: Creating an existing repository reports AlreadyExists so callers can treat it as success.

use async_trait::async_trait;
use secrecy::SecretString;

use crate::types::RepositoryName;

#[async_trait]
pub trait RegistryOps: Send + Sync {
    /// Create a repository. Returns `RegistryError::AlreadyExists` if it is already there.
    async fn create_repository(&self, name: &RepositoryName) -> Result<(), RegistryError>;

    /// Short-lived password for the registry of the configured region.
    async fn login_password(&self) -> Result<SecretString, RegistryError>;

    /// Every tag in a repository, exactly as the registry reports it.
    ///
    /// Remote tags are not held to the local tag rules; the registry accepts
    /// longer tags than this tool ever produces.
    async fn list_image_tags(&self, name: &RepositoryName) -> Result<Vec<String>, RegistryError>;

    /// Delete one tagged image from a repository.
    async fn delete_image(&self, name: &RepositoryName, tag: &str) -> Result<(), RegistryError>;
}

#[derive(Debug, thiserror::Error)]
pub enum RegistryError {
    #[error("repository already exists: {0}")]
    AlreadyExists(String),

    #[error("repository not found: {0}")]
    NotFound(String),

    #[error("registry authentication failed: {0}")]
    AuthenticationFailed(String),

    #[error("failed to delete image {tag}: {reason}")]
    DeleteFailed { tag: String, reason: String },

    #[error("provider error: {0}")]
    Provider(String),
}
