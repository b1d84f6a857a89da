// ABOUTME: Deployment state types for the type state pattern.
// ABOUTME: Each state carries the data produced by the stage that reached it.

use crate::cloud::{StackChange, StackOutputs};
use crate::engine::RegistryAuth;
use crate::types::{ImageRef, ImageTag, RepositoryUri};

/// Configuration resolved and secrets present.
/// Available actions: `ensure_repository()`
#[derive(Debug, Clone, Copy, Default)]
pub struct Validated;

/// Repository exists and its URI is known.
/// Available actions: `authenticate()`
#[derive(Debug)]
pub struct RepositoryReady {
    pub(crate) uri: RepositoryUri,
}

/// Logged in to the registry.
/// Available actions: `build()`
#[derive(Debug)]
pub struct Authenticated {
    pub(crate) uri: RepositoryUri,
    pub(crate) auth: RegistryAuth,
}

/// Image built and tagged twice locally.
/// Available actions: `publish()`
#[derive(Debug)]
pub struct Built {
    pub(crate) auth: RegistryAuth,
    pub(crate) images: ImagePair,
}

/// Both tags pushed.
/// Available actions: `apply_stack()`, `update_function()`, `images()`
#[derive(Debug)]
pub struct Published {
    pub(crate) images: ImagePair,
}

/// Stack or function now runs the new image.
/// Available actions: `summary()`
#[derive(Debug)]
pub struct Rolled {
    pub(crate) images: ImagePair,
    pub(crate) outputs: StackOutputs,
    pub(crate) change: Option<StackChange>,
}

/// The two references produced by one build.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImagePair {
    /// Explicit or timestamp tag; the one that gets deployed.
    pub primary: ImageRef,
    pub latest: ImageRef,
}

impl ImagePair {
    pub fn for_tag(uri: &RepositoryUri, tag: &ImageTag) -> Self {
        ImagePair {
            primary: uri.image(tag),
            latest: uri.image(&ImageTag::latest()),
        }
    }

    /// Both references, primary first.
    pub fn refs(&self) -> [&ImageRef; 2] {
        [&self.primary, &self.latest]
    }
}
