// ABOUTME: Command handlers, one per command mode.
// ABOUTME: Handlers are generic over cloud, engine and confirmation so they run against mocks.

mod cleanup;
mod delete_stack;
mod pipeline;
mod preflight;

use std::path::Path;

use crate::config::{DeployTarget, DeploymentConfig, EnvFile, EnvSnapshot, Overrides, Settings};
use crate::diagnostics::{Diagnostics, Warning};
use crate::error::Result;

pub use cleanup::cleanup;
pub use delete_stack::delete_stack;
pub use pipeline::{build_only, deploy, update_code};
pub use preflight::{connect_engine, require_engine, require_tool};

/// What one invocation does.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommandMode {
    Deploy,
    UpdateCode,
    BuildOnly,
    Cleanup,
    DeleteStack,
}

impl std::fmt::Display for CommandMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            CommandMode::Deploy => "deploy",
            CommandMode::UpdateCode => "update-code",
            CommandMode::BuildOnly => "build-only",
            CommandMode::Cleanup => "cleanup",
            CommandMode::DeleteStack => "delete-stack",
        };
        f.write_str(name)
    }
}

/// Settings, environment and flags for one invocation, before resolution.
#[derive(Debug, Clone, Default)]
pub struct Invocation {
    pub settings: Settings,
    pub env: EnvSnapshot,
    pub overrides: Overrides,
}

impl Invocation {
    /// Discover the settings file in `dir` and layer the env file under `env`.
    ///
    /// A missing env file is only a warning.
    pub fn load(
        dir: &Path,
        env: EnvSnapshot,
        overrides: Overrides,
        diagnostics: &mut Diagnostics,
    ) -> Result<Self> {
        let settings = Settings::discover(dir)?;
        let env_path = settings.env_file_path(dir, &overrides);

        let env = match EnvFile::load(&env_path)? {
            Some(file) => {
                tracing::debug!("loaded {} entries from {}", file.entries().len(), env_path.display());
                env.with_env_file(&file)
            }
            None => {
                diagnostics.warn(Warning::env_file_missing(format!(
                    "{} not found, using exported environment only",
                    env_path.display()
                )));
                env
            }
        };

        Ok(Invocation {
            settings,
            env,
            overrides,
        })
    }

    /// Everything but the secrets.
    pub fn target(&self) -> Result<DeployTarget> {
        DeployTarget::resolve(&self.settings, &self.env, &self.overrides)
    }

    /// Full configuration; fails unless every required secret is present.
    pub fn config(&self) -> Result<DeploymentConfig> {
        DeploymentConfig::resolve(&self.settings, &self.env, &self.overrides)
    }
}
