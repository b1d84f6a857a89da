// ABOUTME: Deployment pipeline using the type state pattern.
// ABOUTME: Stages run strictly in order; each one hands its results to the next.

mod cleanup;
mod delete;
mod deployment;
mod error;
mod state;
mod summary;
mod transitions;
mod wait;

pub use cleanup::{CleanupReport, clean_repository, remove_local_images};
pub use delete::{DeleteReport, delete_stack};
pub use deployment::Deployment;
pub use error::{DeployError, DeployErrorKind, Stage};
pub use state::{Authenticated, Built, ImagePair, Published, RepositoryReady, Rolled, Validated};
pub use summary::Summary;
pub use transitions::{
    MANAGED_BY, REGISTRY_USERNAME, ensure_repository, read_outputs, stack_deployment,
};
pub use wait::{Backoff, wait_for_function_update};
