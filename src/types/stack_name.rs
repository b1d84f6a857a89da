// ABOUTME: Validated CloudFormation stack name.
// ABOUTME: Enforces the provider's naming rules before any API call is made.

use std::fmt;
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum StackNameError {
    #[error("stack name cannot be empty")]
    Empty,

    #[error("stack name exceeds maximum length of 128 characters")]
    TooLong,

    #[error("stack name must start with a letter")]
    MustStartWithLetter,

    #[error("invalid character in stack name: '{0}'")]
    InvalidChar(char),
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct StackName(String);

impl StackName {
    pub fn new(value: &str) -> Result<Self, StackNameError> {
        let value = value.trim();
        if value.is_empty() {
            return Err(StackNameError::Empty);
        }

        if value.len() > 128 {
            return Err(StackNameError::TooLong);
        }

        if !value.starts_with(|c: char| c.is_ascii_alphabetic()) {
            return Err(StackNameError::MustStartWithLetter);
        }

        if let Some(c) = value
            .chars()
            .find(|c| !c.is_ascii_alphanumeric() && *c != '-')
        {
            return Err(StackNameError::InvalidChar(c));
        }

        Ok(Self(value.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for StackName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_letters_digits_and_hyphens() {
        let name = StackName::new("SlackBot-dev2").unwrap();
        assert_eq!(name.as_str(), "SlackBot-dev2");
    }

    #[test]
    fn rejects_leading_digit() {
        assert_eq!(
            StackName::new("1stack"),
            Err(StackNameError::MustStartWithLetter)
        );
    }

    #[test]
    fn rejects_underscore() {
        assert_eq!(
            StackName::new("slack_bot"),
            Err(StackNameError::InvalidChar('_'))
        );
    }

    #[test]
    fn rejects_overlong_name() {
        let long = format!("a{}", "b".repeat(128));
        assert_eq!(StackName::new(&long), Err(StackNameError::TooLong));
    }
}
