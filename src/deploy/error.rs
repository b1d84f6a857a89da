// ABOUTME: Error taxonomy for the deployment pipeline.
// ABOUTME: Every fatal error names its stage and carries the underlying tool or API text.

use std::fmt;
use std::time::Duration;

/// Pipeline stage, used to name where a run failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Validate,
    Identity,
    Repository,
    Authenticate,
    Build,
    Publish,
    StackApply,
    StackOutputs,
    FunctionUpdate,
    Confirm,
    StackDelete,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Stage::Validate => "environment validation",
            Stage::Identity => "identity resolution",
            Stage::Repository => "repository ensure",
            Stage::Authenticate => "registry authentication",
            Stage::Build => "image build",
            Stage::Publish => "image publish",
            Stage::StackApply => "stack apply",
            Stage::StackOutputs => "stack outputs",
            Stage::FunctionUpdate => "function update",
            Stage::Confirm => "confirmation",
            Stage::StackDelete => "stack deletion",
        };
        f.write_str(name)
    }
}

/// Fatal deployment errors.
#[derive(Debug, thiserror::Error)]
pub enum DeployError {
    #[error("{stage} failed: missing dependency '{name}': {detail}")]
    MissingDependency {
        stage: Stage,
        name: String,
        detail: String,
    },

    #[error("{} failed: missing required secret(s): {}", Stage::Validate, .names.join(", "))]
    MissingSecret { names: Vec<&'static str> },

    #[error("{stage} failed: {message}")]
    AuthFailure { stage: Stage, message: String },

    #[error("{stage} failed: {message}")]
    InfrastructureFailure { stage: Stage, message: String },

    #[error("{} failed: {message}", Stage::Build)]
    BuildFailure { message: String },

    #[error("{} failed: {message}", Stage::Publish)]
    PublishFailure { message: String },

    #[error("{} failed: {message}", Stage::FunctionUpdate)]
    UpdateFailure { message: String },

    #[error(
        "{} failed: function '{function}' did not converge within {}s",
        Stage::FunctionUpdate,
        .waited.as_secs()
    )]
    UpdateTimeout { function: String, waited: Duration },

    #[error("aborted by user")]
    UserAborted,
}

/// Error kind for programmatic handling.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeployErrorKind {
    MissingDependency,
    MissingSecret,
    AuthFailure,
    InfrastructureFailure,
    BuildFailure,
    PublishFailure,
    UpdateFailure,
    UpdateTimeout,
    UserAborted,
}

impl DeployError {
    pub fn kind(&self) -> DeployErrorKind {
        match self {
            DeployError::MissingDependency { .. } => DeployErrorKind::MissingDependency,
            DeployError::MissingSecret { .. } => DeployErrorKind::MissingSecret,
            DeployError::AuthFailure { .. } => DeployErrorKind::AuthFailure,
            DeployError::InfrastructureFailure { .. } => DeployErrorKind::InfrastructureFailure,
            DeployError::BuildFailure { .. } => DeployErrorKind::BuildFailure,
            DeployError::PublishFailure { .. } => DeployErrorKind::PublishFailure,
            DeployError::UpdateFailure { .. } => DeployErrorKind::UpdateFailure,
            DeployError::UpdateTimeout { .. } => DeployErrorKind::UpdateTimeout,
            DeployError::UserAborted => DeployErrorKind::UserAborted,
        }
    }

    /// The stage that failed, if the error belongs to one.
    pub fn stage(&self) -> Option<Stage> {
        match self {
            DeployError::MissingDependency { stage, .. }
            | DeployError::AuthFailure { stage, .. }
            | DeployError::InfrastructureFailure { stage, .. } => Some(*stage),
            DeployError::MissingSecret { .. } => Some(Stage::Validate),
            DeployError::BuildFailure { .. } => Some(Stage::Build),
            DeployError::PublishFailure { .. } => Some(Stage::Publish),
            DeployError::UpdateFailure { .. } | DeployError::UpdateTimeout { .. } => {
                Some(Stage::FunctionUpdate)
            }
            DeployError::UserAborted => Some(Stage::Confirm),
        }
    }

    pub(crate) fn infrastructure(stage: Stage, source: impl fmt::Display) -> Self {
        DeployError::InfrastructureFailure {
            stage,
            message: source.to_string(),
        }
    }

    pub(crate) fn auth(stage: Stage, source: impl fmt::Display) -> Self {
        DeployError::AuthFailure {
            stage,
            message: source.to_string(),
        }
    }
}
