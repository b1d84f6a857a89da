// ABOUTME: Cloud account identity and region types.
// ABOUTME: Every registry reference is namespaced by these two values.

use std::fmt;
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum AccountIdError {
    #[error("account id must be exactly 12 digits, got '{0}'")]
    InvalidFormat(String),
}

/// Twelve-digit AWS account number.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct AccountId(String);

impl AccountId {
    pub fn new(value: &str) -> Result<Self, AccountIdError> {
        let value = value.trim();
        if value.len() != 12 || !value.chars().all(|c| c.is_ascii_digit()) {
            return Err(AccountIdError::InvalidFormat(value.to_string()));
        }
        Ok(Self(value.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for AccountId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum RegionError {
    #[error("region cannot be empty")]
    Empty,

    #[error("invalid region name: '{0}'")]
    InvalidFormat(String),
}

/// Region code such as `us-west-1` or `us-gov-east-1`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Region(String);

impl Region {
    pub fn new(value: &str) -> Result<Self, RegionError> {
        let value = value.trim();
        if value.is_empty() {
            return Err(RegionError::Empty);
        }

        let parts: Vec<&str> = value.split('-').collect();
        let well_formed = parts.len() >= 3
            && parts.iter().all(|p| {
                !p.is_empty() && p.chars().all(|c| c.is_ascii_lowercase() || c.is_ascii_digit())
            })
            && parts
                .last()
                .is_some_and(|p| p.chars().all(|c| c.is_ascii_digit()));

        if !well_formed {
            return Err(RegionError::InvalidFormat(value.to_string()));
        }

        Ok(Self(value.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Region {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
