// ABOUTME: Image build settings: context directory, build file and target platform.
// ABOUTME: The platform is always pinned, never inferred from the build host.

use serde::Deserialize;
use std::path::PathBuf;

/// Platform of the function runtime the image is built for.
pub const DEFAULT_PLATFORM: &str = "linux/amd64";

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct BuildSettings {
    #[serde(default = "default_context")]
    pub context: PathBuf,

    #[serde(default = "default_dockerfile")]
    pub dockerfile: PathBuf,

    #[serde(default = "default_platform")]
    pub platform: String,
}

fn default_context() -> PathBuf {
    PathBuf::from("app")
}

fn default_dockerfile() -> PathBuf {
    PathBuf::from("app/Dockerfile")
}

fn default_platform() -> String {
    DEFAULT_PLATFORM.to_string()
}

impl Default for BuildSettings {
    fn default() -> Self {
        BuildSettings {
            context: default_context(),
            dockerfile: default_dockerfile(),
            platform: default_platform(),
        }
    }
}
