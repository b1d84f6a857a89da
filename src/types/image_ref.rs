// ABOUTME: Container image reference parsing and formatting.
// ABOUTME: Handles forms like app:tag and registry.example.com/org/app:tag.

use super::image_tag::{ImageTag, ImageTagError};
use std::fmt;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ParseImageRefError {
    #[error("image reference cannot be empty")]
    Empty,

    #[error("invalid character in image reference: {0}")]
    InvalidChar(char),

    #[error("invalid image reference format: {0}")]
    InvalidFormat(String),

    #[error("invalid tag in image reference: {0}")]
    InvalidTag(#[from] ImageTagError),
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ImageRef {
    registry: Option<String>,
    name: String,
    tag: ImageTag,
}

impl ImageRef {
    pub fn new(registry: Option<String>, name: &str, tag: ImageTag) -> Self {
        Self {
            registry,
            name: name.to_string(),
            tag,
        }
    }

    pub fn parse(input: &str) -> Result<Self, ParseImageRefError> {
        let input = input.trim();
        if input.is_empty() {
            return Err(ParseImageRefError::Empty);
        }

        for c in input.chars() {
            if !c.is_ascii_alphanumeric() && !matches!(c, '/' | ':' | '.' | '-' | '_') {
                return Err(ParseImageRefError::InvalidChar(c));
            }
        }

        // A colon followed by a slash belongs to a registry port, not a tag
        let (without_tag, tag) = match input.rsplit_once(':') {
            Some((before, after)) if !after.contains('/') => (before, ImageTag::new(after)?),
            _ => (input, ImageTag::latest()),
        };

        let (registry, name) = Self::parse_registry_and_name(without_tag)?;

        Ok(Self {
            registry,
            name,
            tag,
        })
    }

    fn parse_registry_and_name(
        input: &str,
    ) -> Result<(Option<String>, String), ParseImageRefError> {
        match input.split_once('/') {
            None if !input.is_empty() => Ok((None, input.to_string())),
            Some((first, rest)) if !first.is_empty() && !rest.is_empty() => {
                if first.contains('.') || first.contains(':') || first == "localhost" {
                    Ok((Some(first.to_string()), rest.to_string()))
                } else {
                    Ok((None, input.to_string()))
                }
            }
            _ => Err(ParseImageRefError::InvalidFormat(input.to_string())),
        }
    }

    pub fn registry(&self) -> Option<&str> {
        self.registry.as_deref()
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn tag(&self) -> &ImageTag {
        &self.tag
    }

    /// The reference without its tag (`registry/name`).
    pub fn repository(&self) -> String {
        match &self.registry {
            Some(registry) => format!("{}/{}", registry, self.name),
            None => self.name.clone(),
        }
    }

    /// Same repository, different tag.
    pub fn with_tag(&self, tag: ImageTag) -> Self {
        Self {
            registry: self.registry.clone(),
            name: self.name.clone(),
            tag,
        }
    }
}

impl fmt::Display for ImageRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.repository(), self.tag)
    }
}
