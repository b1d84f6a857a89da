// ABOUTME: Validated domain types shared by the cloud, engine and deploy layers.
// ABOUTME: Invalid names and tags are rejected before any external call is made.

mod account;
mod image_ref;
mod image_tag;
mod repository;
mod stack_name;

pub use account::{AccountId, AccountIdError, Region, RegionError};
pub use image_ref::{ImageRef, ParseImageRefError};
pub use image_tag::{ImageTag, ImageTagError, TIMESTAMP_FORMAT};
pub use repository::{RepositoryName, RepositoryNameError, RepositoryUri, RepositoryUriError};
pub use stack_name::{StackName, StackNameError};
