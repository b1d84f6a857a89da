// ABOUTME: Generic deployment struct parameterized by state.
// ABOUTME: State types carry their own data for compile-time guarantees.

use crate::cloud::{StackChange, StackOutputs};
use crate::config::{DeployTarget, DeploymentConfig};

use super::state::{Built, ImagePair, Published, RepositoryReady, Rolled, Validated};

/// A deployment in progress, parameterized by its current state.
///
/// Holding a `Deployment<Validated>` means every required secret was present,
/// so stages past this point may mutate cloud resources.
#[derive(Debug)]
pub struct Deployment<S> {
    pub(crate) config: DeploymentConfig,
    pub(crate) state: S,
}

impl Deployment<Validated> {
    pub fn new(config: DeploymentConfig) -> Self {
        Deployment {
            config,
            state: Validated,
        }
    }
}

impl<S> Deployment<S> {
    pub fn config(&self) -> &DeploymentConfig {
        &self.config
    }

    pub fn target(&self) -> &DeployTarget {
        &self.config.target
    }
}

impl Deployment<RepositoryReady> {
    pub fn repository_uri(&self) -> &crate::types::RepositoryUri {
        &self.state.uri
    }
}

impl Deployment<Built> {
    pub fn images(&self) -> &ImagePair {
        &self.state.images
    }
}

impl Deployment<Published> {
    pub fn images(&self) -> &ImagePair {
        &self.state.images
    }
}

impl Deployment<Rolled> {
    pub fn images(&self) -> &ImagePair {
        &self.state.images
    }

    pub fn outputs(&self) -> &StackOutputs {
        &self.state.outputs
    }

    /// `None` when the function was updated directly instead of via the stack.
    pub fn stack_change(&self) -> Option<StackChange> {
        self.state.change
    }
}
