// ABOUTME: Function capability: point the function at an image and report convergence.
// ABOUTME: The update call only starts the rollout; status must be polled until it settles.

use async_trait::async_trait;

use crate::types::ImageRef;

/// Provider-reported state of the most recent code update.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FunctionUpdateStatus {
    InProgress,
    Successful,
    Failed { reason: String },
}

impl FunctionUpdateStatus {
    /// Map the provider's status string; unknown states are treated as still running.
    pub fn from_provider(status: Option<&str>, reason: Option<&str>) -> Self {
        match status {
            Some("Successful") | None => FunctionUpdateStatus::Successful,
            Some("Failed") => FunctionUpdateStatus::Failed {
                reason: reason.unwrap_or("no reason reported").to_string(),
            },
            Some(_) => FunctionUpdateStatus::InProgress,
        }
    }
}

#[async_trait]
pub trait FunctionOps: Send + Sync {
    /// Start an update of the function's code to the given image.
    async fn update_function_image(
        &self,
        function: &str,
        image: &ImageRef,
    ) -> Result<(), FunctionError>;

    /// Current state of the last update.
    async fn function_update_status(
        &self,
        function: &str,
    ) -> Result<FunctionUpdateStatus, FunctionError>;
}

#[derive(Debug, thiserror::Error)]
pub enum FunctionError {
    #[error("function not found: {0}")]
    NotFound(String),

    #[error("update rejected: {0}")]
    Rejected(String),

    #[error("provider error: {0}")]
    Provider(String),
}
