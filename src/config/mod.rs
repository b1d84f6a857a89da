// ABOUTME: Configuration types and resolution for deployments.
// ABOUTME: Merges flags, environment, env file and lamdeploy.yml into one immutable record.

mod build;
mod deserialize;
mod env_file;
mod env_value;
mod function_update;
mod secrets;

pub use build::{BuildSettings, DEFAULT_PLATFORM};
pub use env_file::{DEFAULT_ENV_FILE, EnvFile, EnvSnapshot};
pub use env_value::{EnvValue, resolve_env_map};
pub use function_update::FunctionUpdateSettings;
pub use secrets::{
    ANTHROPIC_API_KEY, REQUIRED_SECRETS, SLACK_BOT_TOKEN, SLACK_SIGNING_SECRET, Secrets,
};

use crate::error::{Error, Result};
use crate::types::{ImageTag, Region, RepositoryName, StackName};
use deserialize::{deserialize_region, deserialize_repository, deserialize_stack_name};
use serde::Deserialize;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

pub const SETTINGS_FILENAME: &str = "lamdeploy.yml";
pub const SETTINGS_FILENAME_ALT: &str = "lamdeploy.yaml";
pub const SETTINGS_FILENAME_DIR: &str = ".lamdeploy/config.yml";

pub const DEFAULT_STACK_NAME: &str = "slack-bot";
pub const DEFAULT_REGION: &str = "us-west-1";
pub const DEFAULT_ENVIRONMENT: &str = "dev";
pub const DEFAULT_TEMPLATE: &str = "infrastructure/template.yaml";

pub const ENV_IMAGE_TAG: &str = "IMAGE_TAG";
pub const ENV_STACK_NAME: &str = "STACK_NAME";
pub const ENV_ENVIRONMENT: &str = "ENVIRONMENT";
pub const ENV_REGION: [&str; 2] = ["AWS_REGION", "AWS_DEFAULT_REGION"];

/// Optional project settings file.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Settings {
    #[serde(default, deserialize_with = "deserialize_stack_name")]
    pub stack_name: Option<StackName>,

    #[serde(default, deserialize_with = "deserialize_region")]
    pub region: Option<Region>,

    #[serde(default)]
    pub environment: Option<String>,

    #[serde(default, deserialize_with = "deserialize_repository")]
    pub repository: Option<RepositoryName>,

    #[serde(default)]
    pub template: Option<PathBuf>,

    #[serde(default)]
    pub env_file: Option<PathBuf>,

    #[serde(default)]
    pub build: BuildSettings,

    #[serde(default)]
    pub function_update: FunctionUpdateSettings,

    /// Extra template parameters passed on every stack apply.
    #[serde(default)]
    pub parameters: BTreeMap<String, EnvValue>,

    /// Extra tags applied to the stack.
    #[serde(default)]
    pub tags: BTreeMap<String, String>,
}

impl Settings {
    pub fn from_yaml(yaml: &str) -> Result<Self> {
        serde_yaml::from_str(yaml).map_err(Error::from)
    }

    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|source| Error::ReadFile {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_yaml(&content)
    }

    /// Find and load the settings file in `dir`, falling back to defaults.
    pub fn discover(dir: &Path) -> Result<Self> {
        let candidates = [
            dir.join(SETTINGS_FILENAME),
            dir.join(SETTINGS_FILENAME_ALT),
            dir.join(SETTINGS_FILENAME_DIR),
        ];

        match candidates.iter().find(|path| path.is_file()) {
            Some(path) => {
                tracing::debug!("Loading settings from {}", path.display());
                Self::load(path)
            }
            None => {
                tracing::debug!("No settings file in {}, using defaults", dir.display());
                Ok(Self::default())
            }
        }
    }

    /// Env file path: flag override, then settings, then `.env`.
    pub fn env_file_path(&self, dir: &Path, overrides: &Overrides) -> PathBuf {
        let path = overrides
            .env_file
            .clone()
            .or_else(|| self.env_file.clone())
            .unwrap_or_else(|| PathBuf::from(DEFAULT_ENV_FILE));
        dir.join(path)
    }
}

/// Values supplied on the command line; they win over everything else.
#[derive(Debug, Clone, Default)]
pub struct Overrides {
    pub stack_name: Option<String>,
    pub region: Option<String>,
    pub environment: Option<String>,
    pub image_tag: Option<String>,
    pub env_file: Option<PathBuf>,
}

/// Everything about a deployment except its secrets.
///
/// Enough for local-only work such as image cleanup.
#[derive(Debug, Clone)]
pub struct DeployTarget {
    pub stack_name: StackName,
    pub region: Region,
    pub environment: String,
    pub repository: RepositoryName,
    pub image_tag: ImageTag,
    pub template: PathBuf,
    pub build: BuildSettings,
    pub function_update: FunctionUpdateSettings,
    pub parameters: BTreeMap<String, String>,
    pub tags: BTreeMap<String, String>,
}

impl DeployTarget {
    pub fn resolve(settings: &Settings, env: &EnvSnapshot, overrides: &Overrides) -> Result<Self> {
        let stack_name = match overrides
            .stack_name
            .as_deref()
            .or_else(|| env.get(ENV_STACK_NAME))
        {
            Some(raw) => StackName::new(raw).map_err(|e| Error::InvalidConfig(e.to_string()))?,
            None => match &settings.stack_name {
                Some(name) => name.clone(),
                None => StackName::new(DEFAULT_STACK_NAME)
                    .map_err(|e| Error::InvalidConfig(e.to_string()))?,
            },
        };

        let region = match overrides
            .region
            .as_deref()
            .or_else(|| env.first_of(&ENV_REGION))
        {
            Some(raw) => Region::new(raw).map_err(|e| Error::InvalidConfig(e.to_string()))?,
            None => match &settings.region {
                Some(region) => region.clone(),
                None => {
                    Region::new(DEFAULT_REGION).map_err(|e| Error::InvalidConfig(e.to_string()))?
                }
            },
        };

        let environment = overrides
            .environment
            .as_deref()
            .or_else(|| env.get(ENV_ENVIRONMENT))
            .or(settings.environment.as_deref())
            .unwrap_or(DEFAULT_ENVIRONMENT)
            .trim()
            .to_string();
        validate_environment(&environment)?;

        let image_tag = match overrides
            .image_tag
            .as_deref()
            .or_else(|| env.get(ENV_IMAGE_TAG))
        {
            Some(raw) => ImageTag::new(raw).map_err(|e| Error::InvalidConfig(e.to_string()))?,
            None => ImageTag::now(),
        };

        if image_tag.is_latest() {
            return Err(Error::InvalidConfig(
                "image tag 'latest' is reserved; deployments must use a traceable tag".to_string(),
            ));
        }

        settings.function_update.validate()?;

        let repository = match &settings.repository {
            Some(name) => name.clone(),
            None => RepositoryName::derive_from(stack_name.as_str()).map_err(|e| {
                Error::InvalidConfig(format!(
                    "cannot derive repository name from stack '{}': {}",
                    stack_name, e
                ))
            })?,
        };

        Ok(DeployTarget {
            stack_name,
            region,
            environment,
            repository,
            image_tag,
            template: settings
                .template
                .clone()
                .unwrap_or_else(|| PathBuf::from(DEFAULT_TEMPLATE)),
            build: settings.build.clone(),
            function_update: settings.function_update,
            parameters: resolve_env_map(&settings.parameters, env)?,
            tags: settings.tags.clone(),
        })
    }
}

fn validate_environment(environment: &str) -> Result<()> {
    if environment.is_empty() {
        return Err(Error::InvalidConfig(
            "environment tag cannot be empty".to_string(),
        ));
    }
    if let Some(c) = environment
        .chars()
        .find(|c| !c.is_ascii_alphanumeric() && !matches!(c, '-' | '_'))
    {
        return Err(Error::InvalidConfig(format!(
            "invalid character in environment tag: '{}'",
            c
        )));
    }
    Ok(())
}

/// Fully resolved deployment configuration.
///
/// Construction fails unless every required secret is present, so holding one
/// of these is proof that cloud mutations may proceed.
#[derive(Debug)]
pub struct DeploymentConfig {
    pub target: DeployTarget,
    pub secrets: Secrets,
}

impl DeploymentConfig {
    pub fn resolve(settings: &Settings, env: &EnvSnapshot, overrides: &Overrides) -> Result<Self> {
        let target = DeployTarget::resolve(settings, env, overrides)?;
        let secrets = Secrets::resolve(env)?;
        Ok(DeploymentConfig { target, secrets })
    }

    pub fn new(target: DeployTarget, secrets: Secrets) -> Self {
        DeploymentConfig { target, secrets }
    }
}
