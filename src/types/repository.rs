// ABOUTME: Registry repository name and fully-qualified repository URI.
// ABOUTME: The URI is composed from account, region and repository name.

use super::account::{AccountId, Region};
use super::image_ref::ImageRef;
use super::image_tag::ImageTag;
use std::fmt;
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum RepositoryNameError {
    #[error("repository name cannot be empty")]
    Empty,

    #[error("repository name exceeds maximum length of 256 characters")]
    TooLong,

    #[error("repository name must be lowercase")]
    NotLowercase,

    #[error("repository name must start and end with a letter or digit")]
    InvalidBoundary,

    #[error("invalid character in repository name: '{0}'")]
    InvalidChar(char),
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RepositoryName(String);

impl RepositoryName {
    pub fn new(value: &str) -> Result<Self, RepositoryNameError> {
        let value = value.trim();
        if value.is_empty() {
            return Err(RepositoryNameError::Empty);
        }

        if value.len() > 256 {
            return Err(RepositoryNameError::TooLong);
        }

        for c in value.chars() {
            if c.is_ascii_uppercase() {
                return Err(RepositoryNameError::NotLowercase);
            }
            if !c.is_ascii_lowercase() && !c.is_ascii_digit() && !matches!(c, '-' | '_' | '.' | '/')
            {
                return Err(RepositoryNameError::InvalidChar(c));
            }
        }

        let alnum = |c: char| c.is_ascii_lowercase() || c.is_ascii_digit();
        if !value.starts_with(alnum) || !value.ends_with(alnum) {
            return Err(RepositoryNameError::InvalidBoundary);
        }

        Ok(Self(value.to_string()))
    }

    /// Derive a repository name from an arbitrary label (e.g. a stack name).
    pub fn derive_from(label: &str) -> Result<Self, RepositoryNameError> {
        Self::new(&label.to_ascii_lowercase())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for RepositoryName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum RepositoryUriError {
    #[error("repository URI must have the form <registry>/<name>: '{0}'")]
    MissingName(String),

    #[error("invalid repository name in URI: {0}")]
    InvalidName(#[from] RepositoryNameError),
}

/// `<account>.dkr.ecr.<region>.amazonaws.com/<name>`
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RepositoryUri {
    registry: String,
    name: RepositoryName,
}

impl RepositoryUri {
    pub fn compose(account: &AccountId, region: &Region, name: &RepositoryName) -> Self {
        Self {
            registry: format!("{}.dkr.ecr.{}.amazonaws.com", account, region),
            name: name.clone(),
        }
    }

    pub fn parse(input: &str) -> Result<Self, RepositoryUriError> {
        let input = input.trim();
        let (registry, name) = input
            .split_once('/')
            .filter(|(registry, name)| !registry.is_empty() && !name.is_empty())
            .ok_or_else(|| RepositoryUriError::MissingName(input.to_string()))?;

        Ok(Self {
            registry: registry.to_string(),
            name: RepositoryName::new(name)?,
        })
    }

    /// Registry host used for login.
    pub fn registry(&self) -> &str {
        &self.registry
    }

    pub fn name(&self) -> &RepositoryName {
        &self.name
    }

    /// Image reference for this repository at the given tag.
    pub fn image(&self, tag: &ImageTag) -> ImageRef {
        ImageRef::new(Some(self.registry.clone()), self.name.as_str(), tag.clone())
    }
}

impl fmt::Display for RepositoryUri {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.registry, self.name)
    }
}
