// ABOUTME: Validated container image tag.
// ABOUTME: Provides the timestamp default and the floating `latest` tag.

use chrono::{DateTime, Local};
use std::fmt;
use thiserror::Error;

/// Format used for tags generated from the current time.
pub const TIMESTAMP_FORMAT: &str = "%Y%m%d-%H%M%S";

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ImageTagError {
    #[error("image tag cannot be empty")]
    Empty,

    #[error("image tag exceeds maximum length of 128 characters")]
    TooLong,

    #[error("image tag cannot start with '{0}'")]
    InvalidStart(char),

    #[error("invalid character in image tag: '{0}'")]
    InvalidChar(char),
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ImageTag(String);

impl ImageTag {
    pub fn new(value: &str) -> Result<Self, ImageTagError> {
        let value = value.trim();
        let first = value.chars().next().ok_or(ImageTagError::Empty)?;

        if value.len() > 128 {
            return Err(ImageTagError::TooLong);
        }

        if !first.is_ascii_alphanumeric() && first != '_' {
            return Err(ImageTagError::InvalidStart(first));
        }

        if let Some(c) = value
            .chars()
            .find(|c| !c.is_ascii_alphanumeric() && !matches!(c, '_' | '.' | '-'))
        {
            return Err(ImageTagError::InvalidChar(c));
        }

        Ok(Self(value.to_string()))
    }

    /// Tag derived from a point in time, e.g. `20240131-174502`.
    pub fn timestamp(at: DateTime<Local>) -> Self {
        Self(at.format(TIMESTAMP_FORMAT).to_string())
    }

    /// Tag derived from the current local time.
    pub fn now() -> Self {
        Self::timestamp(Local::now())
    }

    pub fn latest() -> Self {
        Self("latest".to_string())
    }

    pub fn is_latest(&self) -> bool {
        self.0 == "latest"
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ImageTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
