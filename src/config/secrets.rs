// ABOUTME: The three required runtime secrets and their resolution.
// ABOUTME: Values are held as SecretString so they never reach logs or Debug output.

use secrecy::SecretString;

use super::env_file::EnvSnapshot;
use crate::deploy::DeployError;

pub const SLACK_BOT_TOKEN: &str = "SLACK_BOT_TOKEN";
pub const SLACK_SIGNING_SECRET: &str = "SLACK_SIGNING_SECRET";
pub const ANTHROPIC_API_KEY: &str = "ANTHROPIC_API_KEY";

/// Names of every secret that must be present before any cloud mutation.
pub const REQUIRED_SECRETS: [&str; 3] = [SLACK_BOT_TOKEN, SLACK_SIGNING_SECRET, ANTHROPIC_API_KEY];

#[derive(Debug)]
pub struct Secrets {
    pub slack_bot_token: SecretString,
    pub slack_signing_secret: SecretString,
    pub anthropic_api_key: SecretString,
}

impl Secrets {
    /// Resolve all required secrets, naming every one that is missing or blank.
    pub fn resolve(env: &EnvSnapshot) -> Result<Self, DeployError> {
        let missing: Vec<&'static str> = REQUIRED_SECRETS
            .iter()
            .copied()
            .filter(|name| env.get(name).is_none())
            .collect();

        if !missing.is_empty() {
            return Err(DeployError::MissingSecret { names: missing });
        }

        let secret = |name: &str| SecretString::from(env.get(name).unwrap_or_default().to_string());

        Ok(Secrets {
            slack_bot_token: secret(SLACK_BOT_TOKEN),
            slack_signing_secret: secret(SLACK_SIGNING_SECRET),
            anthropic_api_key: secret(ANTHROPIC_API_KEY),
        })
    }
}
