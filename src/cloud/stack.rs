// ABOUTME: Stack capability: apply a template, read outputs, delete.
// ABOUTME: Also defines the validated StackOutputs record consumed by later stages.

use async_trait::async_trait;
use secrecy::{ExposeSecret, SecretString};
use std::collections::BTreeMap;
use std::path::PathBuf;

use crate::types::{RepositoryUri, RepositoryUriError, StackName};

pub const OUTPUT_REPOSITORY_URI: &str = "ECRRepositoryURI";
pub const OUTPUT_FUNCTION_NAME: &str = "LambdaFunctionName";
pub const OUTPUT_API_URL: &str = "ApiGatewayUrl";
pub const OUTPUT_BUCKET_NAME: &str = "S3BucketName";

/// Outputs every later stage dereferences directly.
pub const REQUIRED_OUTPUTS: [&str; 3] = [OUTPUT_REPOSITORY_URI, OUTPUT_FUNCTION_NAME, OUTPUT_API_URL];

/// Capability needed to provision IAM roles with explicit names.
pub const CAPABILITY_NAMED_IAM: &str = "CAPABILITY_NAMED_IAM";

/// A template parameter value. Secret values are redacted in Debug output.
#[derive(Debug)]
pub enum ParameterValue {
    Plain(String),
    Secret(SecretString),
}

impl ParameterValue {
    pub fn expose(&self) -> &str {
        match self {
            ParameterValue::Plain(v) => v,
            ParameterValue::Secret(v) => v.expose_secret(),
        }
    }

    pub fn is_secret(&self) -> bool {
        matches!(self, ParameterValue::Secret(_))
    }
}

/// Everything needed to create or update a stack in one call.
#[derive(Debug)]
pub struct StackDeployment {
    pub stack_name: StackName,
    pub template: PathBuf,
    pub parameters: BTreeMap<String, ParameterValue>,
    pub capabilities: Vec<String>,
    pub tags: BTreeMap<String, String>,
}

/// What an apply did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StackChange {
    /// A change set was executed.
    Applied,
    /// The template and parameters matched the live stack.
    NoChanges,
}

#[async_trait]
pub trait StackOps: Send + Sync {
    /// Create or update a stack and wait until the provider finishes.
    async fn deploy_stack(&self, request: &StackDeployment) -> Result<StackChange, StackError>;

    /// Raw key/value outputs of a stack.
    async fn stack_outputs(&self, stack: &StackName) -> Result<BTreeMap<String, String>, StackError>;

    /// Delete a stack and wait until deletion completes.
    async fn delete_stack(&self, stack: &StackName) -> Result<(), StackError>;
}

#[derive(Debug, thiserror::Error)]
pub enum StackError {
    #[error("stack not found: {0}")]
    NotFound(String),

    #[error("template not found: {0}")]
    TemplateNotFound(String),

    #[error("stack operation failed: {0}")]
    OperationFailed(String),

    #[error("stack is missing required output(s): {}", .names.join(", "))]
    MissingOutputs { names: Vec<&'static str> },

    #[error("invalid {key} output: {source}")]
    InvalidOutput {
        key: &'static str,
        source: RepositoryUriError,
    },

    #[error("provider error: {0}")]
    Provider(String),
}

/// Validated stack outputs. Values are kept verbatim for reporting.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StackOutputs {
    repository_uri: RepositoryUri,
    repository_uri_raw: String,
    function_name: String,
    api_url: String,
    bucket_name: Option<String>,
}

impl StackOutputs {
    /// Build from raw outputs, failing if any required key is absent or blank.
    pub fn from_map(mut map: BTreeMap<String, String>) -> Result<Self, StackError> {
        let missing: Vec<&'static str> = REQUIRED_OUTPUTS
            .iter()
            .copied()
            .filter(|key| map.get(*key).is_none_or(|v| v.trim().is_empty()))
            .collect();

        if !missing.is_empty() {
            return Err(StackError::MissingOutputs { names: missing });
        }

        let mut take = |key: &str| map.remove(key).unwrap_or_default();
        let repository_uri_raw = take(OUTPUT_REPOSITORY_URI);
        let function_name = take(OUTPUT_FUNCTION_NAME);
        let api_url = take(OUTPUT_API_URL);
        let bucket_name = map
            .remove(OUTPUT_BUCKET_NAME)
            .filter(|v| !v.trim().is_empty());

        let repository_uri =
            RepositoryUri::parse(&repository_uri_raw).map_err(|source| StackError::InvalidOutput {
                key: OUTPUT_REPOSITORY_URI,
                source,
            })?;

        Ok(StackOutputs {
            repository_uri,
            repository_uri_raw,
            function_name,
            api_url,
            bucket_name,
        })
    }

    pub fn repository_uri(&self) -> &RepositoryUri {
        &self.repository_uri
    }

    /// Repository URI exactly as the stack reported it.
    pub fn repository_uri_raw(&self) -> &str {
        &self.repository_uri_raw
    }

    pub fn function_name(&self) -> &str {
        &self.function_name
    }

    pub fn api_url(&self) -> &str {
        &self.api_url
    }

    pub fn bucket_name(&self) -> Option<&str> {
        self.bucket_name.as_deref()
    }
}
