// ABOUTME: Cloud provider implementation that drives the `aws` command-line tool.
// ABOUTME: Every call is a typed request; JSON output is parsed into typed responses.

use async_trait::async_trait;
use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;
use serde::de::DeserializeOwned;
use snafu::{ResultExt, Snafu};
use std::collections::BTreeMap;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::process::Stdio;
use tempfile::NamedTempFile;
use tokio::process::Command;

use super::function::{FunctionError, FunctionOps, FunctionUpdateStatus};
use super::identity::{CallerIdentity, IdentityError, IdentityOps};
use super::registry::{RegistryError, RegistryOps};
use super::stack::{ParameterValue, StackChange, StackDeployment, StackError, StackOps};
use crate::types::{AccountId, ImageRef, Region, RepositoryName, StackName};

/// Name of the executable looked up on PATH.
pub const AWS_PROGRAM: &str = "aws";

// =============================================================================
// Process Errors
// =============================================================================

/// Failure running a single `aws` invocation.
#[derive(Debug, Snafu)]
#[snafu(visibility(pub(crate)))]
pub enum AwsCliError {
    #[snafu(display("failed to run aws {operation}: {source}"))]
    Spawn {
        operation: String,
        source: std::io::Error,
    },

    #[snafu(display("aws {operation} failed: {stderr}"))]
    Failed {
        operation: String,
        code: Option<i32>,
        stderr: String,
    },

    #[snafu(display("unexpected output from aws {operation}: {source}"))]
    Parse {
        operation: String,
        source: serde_json::Error,
    },
}

impl AwsCliError {
    /// Whether the tool's error output mentions `needle`.
    pub fn mentions(&self, needle: &str) -> bool {
        match self {
            AwsCliError::Failed { stderr, .. } => stderr.contains(needle),
            _ => false,
        }
    }
}

// =============================================================================
// Response Shapes
// =============================================================================

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct CallerIdentityResponse {
    account: String,
    arn: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ListImagesResponse {
    #[serde(default)]
    image_ids: Vec<ImageIdentifier>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ImageIdentifier {
    #[serde(default)]
    image_tag: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct BatchDeleteImageResponse {
    #[serde(default)]
    failures: Vec<ImageFailure>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ImageFailure {
    #[serde(default)]
    failure_code: Option<String>,
    #[serde(default)]
    failure_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct StackOutputEntry {
    output_key: String,
    output_value: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct FunctionConfigurationResponse {
    #[serde(default)]
    last_update_status: Option<String>,
    #[serde(default)]
    last_update_status_reason: Option<String>,
}

// =============================================================================
// AwsCli
// =============================================================================

/// Cloud provider backed by the `aws` executable.
///
/// Only the service and operation names are ever logged. Secret values never
/// appear in arguments; stack parameters are passed by file reference.
#[derive(Debug, Clone)]
pub struct AwsCli {
    program: PathBuf,
    region: Region,
}

impl AwsCli {
    pub fn new(region: Region) -> Self {
        Self::with_program(AWS_PROGRAM, region)
    }

    pub fn with_program(program: impl Into<PathBuf>, region: Region) -> Self {
        Self {
            program: program.into(),
            region,
        }
    }

    pub fn region(&self) -> &Region {
        &self.region
    }

    /// Run `aws <service> <operation> <args...>` and return stdout.
    async fn run(&self, service: &str, operation: &str, args: &[String]) -> Result<String, AwsCliError> {
        let label = format!("{} {}", service, operation);
        tracing::debug!("Running aws {}", label);

        let output = Command::new(&self.program)
            .arg(service)
            .arg(operation)
            .args(args)
            .arg("--region")
            .arg(self.region.as_str())
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .output()
            .await
            .context(SpawnSnafu {
                operation: label.clone(),
            })?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr).trim().to_string();
            tracing::debug!("aws {} exited with {:?}", label, output.status.code());
            return FailedSnafu {
                operation: label,
                code: output.status.code(),
                stderr,
            }
            .fail();
        }

        Ok(String::from_utf8_lossy(&output.stdout).into_owned())
    }

    async fn run_json<T: DeserializeOwned>(
        &self,
        service: &str,
        operation: &str,
        args: &[String],
    ) -> Result<T, AwsCliError> {
        let mut args = args.to_vec();
        args.extend(["--output".to_string(), "json".to_string()]);
        let stdout = self.run(service, operation, &args).await?;
        parse_json(&stdout).context(ParseSnafu {
            operation: format!("{} {}", service, operation),
        })
    }
}

fn parse_json<T: DeserializeOwned>(stdout: &str) -> Result<T, serde_json::Error> {
    serde_json::from_str(stdout.trim())
}

/// Arguments for `cloudformation deploy`. Parameters are only ever passed by
/// file reference so secret values stay out of the process list.
fn deploy_args(request: &StackDeployment, parameter_file: Option<&Path>) -> Vec<String> {
    let mut cmd_args = vec![
        "--stack-name".to_string(),
        request.stack_name.to_string(),
        "--template-file".to_string(),
        request.template.display().to_string(),
        "--no-fail-on-empty-changeset".to_string(),
    ];

    if let Some(path) = parameter_file {
        cmd_args.push("--parameter-overrides".to_string());
        cmd_args.push(format!("file://{}", path.display()));
    }

    if !request.capabilities.is_empty() {
        cmd_args.push("--capabilities".to_string());
        cmd_args.extend(request.capabilities.iter().cloned());
    }

    if !request.tags.is_empty() {
        cmd_args.push("--tags".to_string());
        cmd_args.extend(request.tags.iter().map(|(k, v)| format!("{}={}", k, v)));
    }

    cmd_args
}

/// Write parameters as a JSON list of `Key=Value` strings.
///
/// The temporary file is created readable by the owner only.
fn write_parameter_file(
    parameters: &BTreeMap<String, ParameterValue>,
) -> std::io::Result<NamedTempFile> {
    let entries: Vec<String> = parameters
        .iter()
        .map(|(k, v)| format!("{}={}", k, v.expose()))
        .collect();

    let mut file = tempfile::Builder::new()
        .prefix("lamdeploy-params-")
        .suffix(".json")
        .tempfile()?;
    serde_json::to_writer(&mut file, &entries)?;
    file.flush()?;
    Ok(file)
}

/// Tags of a listing in order, without duplicates or untagged entries.
fn unique_tags(response: ListImagesResponse) -> Vec<String> {
    let mut tags: Vec<String> = Vec::new();
    for tag in response.image_ids.into_iter().filter_map(|id| id.image_tag) {
        if !tags.contains(&tag) {
            tags.push(tag);
        }
    }
    tags
}

fn args<const N: usize>(values: [&str; N]) -> Vec<String> {
    values.iter().map(|v| v.to_string()).collect()
}

// =============================================================================
// Error Mapping Helpers
// =============================================================================

fn map_identity_error(e: AwsCliError) -> IdentityError {
    if e.mentions("InvalidClientTokenId")
        || e.mentions("ExpiredToken")
        || e.mentions("Unable to locate credentials")
        || e.mentions("SignatureDoesNotMatch")
    {
        IdentityError::InvalidCredentials(e.to_string())
    } else {
        IdentityError::Provider(e.to_string())
    }
}

fn map_registry_error(e: AwsCliError, repository: &str) -> RegistryError {
    if e.mentions("RepositoryAlreadyExistsException") {
        RegistryError::AlreadyExists(repository.to_string())
    } else if e.mentions("RepositoryNotFoundException") {
        RegistryError::NotFound(repository.to_string())
    } else {
        RegistryError::Provider(e.to_string())
    }
}

fn map_stack_error(e: AwsCliError, stack: &StackName) -> StackError {
    if e.mentions("does not exist") {
        StackError::NotFound(stack.to_string())
    } else {
        StackError::OperationFailed(e.to_string())
    }
}

fn map_function_error(e: AwsCliError, function: &str) -> FunctionError {
    if e.mentions("ResourceNotFoundException") {
        FunctionError::NotFound(function.to_string())
    } else if e.mentions("InvalidParameterValueException") || e.mentions("ResourceConflictException")
    {
        FunctionError::Rejected(e.to_string())
    } else {
        FunctionError::Provider(e.to_string())
    }
}

/// `aws cloudformation deploy` prints this when the change set is empty.
fn is_empty_changeset(stdout: &str) -> bool {
    stdout.contains("No changes to deploy")
}

fn outputs_to_map(entries: Option<Vec<StackOutputEntry>>) -> BTreeMap<String, String> {
    entries
        .unwrap_or_default()
        .into_iter()
        .map(|e| (e.output_key, e.output_value))
        .collect()
}

// =============================================================================
// Capability Implementations
// =============================================================================

#[async_trait]
impl IdentityOps for AwsCli {
    async fn caller_identity(&self) -> Result<CallerIdentity, IdentityError> {
        let response: CallerIdentityResponse = self
            .run_json("sts", "get-caller-identity", &[])
            .await
            .map_err(map_identity_error)?;

        let account = AccountId::new(&response.account)
            .map_err(|e| IdentityError::InvalidResponse(e.to_string()))?;

        Ok(CallerIdentity {
            account,
            arn: response.arn,
        })
    }
}

#[async_trait]
impl RegistryOps for AwsCli {
    async fn create_repository(&self, name: &RepositoryName) -> Result<(), RegistryError> {
        self.run(
            "ecr",
            "create-repository",
            &args([
                "--repository-name",
                name.as_str(),
                "--image-scanning-configuration",
                "scanOnPush=true",
            ]),
        )
        .await
        .map_err(|e| map_registry_error(e, name.as_str()))?;
        Ok(())
    }

    async fn login_password(&self) -> Result<SecretString, RegistryError> {
        let stdout = self
            .run("ecr", "get-login-password", &[])
            .await
            .map_err(|e| RegistryError::AuthenticationFailed(e.to_string()))?;

        let password = SecretString::from(stdout.trim().to_string());
        if password.expose_secret().is_empty() {
            return Err(RegistryError::AuthenticationFailed(
                "registry returned an empty login password".to_string(),
            ));
        }
        Ok(password)
    }

    async fn list_image_tags(&self, name: &RepositoryName) -> Result<Vec<String>, RegistryError> {
        let response: ListImagesResponse = self
            .run_json(
                "ecr",
                "list-images",
                &args([
                    "--repository-name",
                    name.as_str(),
                    "--filter",
                    "tagStatus=TAGGED",
                ]),
            )
            .await
            .map_err(|e| map_registry_error(e, name.as_str()))?;

        Ok(unique_tags(response))
    }

    async fn delete_image(
        &self,
        name: &RepositoryName,
        tag: &str,
    ) -> Result<(), RegistryError> {
        let image_id = format!("imageTag={}", tag);
        let response: BatchDeleteImageResponse = self
            .run_json(
                "ecr",
                "batch-delete-image",
                &args(["--repository-name", name.as_str(), "--image-ids", image_id.as_str()]),
            )
            .await
            .map_err(|e| map_registry_error(e, name.as_str()))?;

        match response.failures.into_iter().next() {
            None => Ok(()),
            Some(failure) => Err(RegistryError::DeleteFailed {
                tag: tag.to_string(),
                reason: failure
                    .failure_reason
                    .or(failure.failure_code)
                    .unwrap_or_else(|| "unknown failure".to_string()),
            }),
        }
    }
}

#[async_trait]
impl StackOps for AwsCli {
    async fn deploy_stack(&self, request: &StackDeployment) -> Result<StackChange, StackError> {
        if !request.template.is_file() {
            return Err(StackError::TemplateNotFound(
                request.template.display().to_string(),
            ));
        }

        // Kept alive until the command exits; removed on drop
        let parameter_file = if request.parameters.is_empty() {
            None
        } else {
            Some(write_parameter_file(&request.parameters).map_err(|e| {
                StackError::Provider(format!("cannot write parameter file: {}", e))
            })?)
        };
        let cmd_args = deploy_args(request, parameter_file.as_ref().map(NamedTempFile::path));

        let stdout = self
            .run("cloudformation", "deploy", &cmd_args)
            .await
            .map_err(|e| map_stack_error(e, &request.stack_name))?;

        if is_empty_changeset(&stdout) {
            Ok(StackChange::NoChanges)
        } else {
            Ok(StackChange::Applied)
        }
    }

    async fn stack_outputs(&self, stack: &StackName) -> Result<BTreeMap<String, String>, StackError> {
        let entries: Option<Vec<StackOutputEntry>> = self
            .run_json(
                "cloudformation",
                "describe-stacks",
                &args(["--stack-name", stack.as_str(), "--query", "Stacks[0].Outputs"]),
            )
            .await
            .map_err(|e| map_stack_error(e, stack))?;

        Ok(outputs_to_map(entries))
    }

    async fn delete_stack(&self, stack: &StackName) -> Result<(), StackError> {
        self.run(
            "cloudformation",
            "delete-stack",
            &args(["--stack-name", stack.as_str()]),
        )
        .await
        .map_err(|e| map_stack_error(e, stack))?;

        self.run(
            "cloudformation",
            "wait",
            &args(["stack-delete-complete", "--stack-name", stack.as_str()]),
        )
        .await
        .map_err(|e| map_stack_error(e, stack))?;

        Ok(())
    }
}

#[async_trait]
impl FunctionOps for AwsCli {
    async fn update_function_image(
        &self,
        function: &str,
        image: &ImageRef,
    ) -> Result<(), FunctionError> {
        let image_uri = image.to_string();
        self.run(
            "lambda",
            "update-function-code",
            &args(["--function-name", function, "--image-uri", image_uri.as_str()]),
        )
        .await
        .map_err(|e| map_function_error(e, function))?;
        Ok(())
    }

    async fn function_update_status(
        &self,
        function: &str,
    ) -> Result<FunctionUpdateStatus, FunctionError> {
        let response: FunctionConfigurationResponse = self
            .run_json(
                "lambda",
                "get-function-configuration",
                &args(["--function-name", function]),
            )
            .await
            .map_err(|e| map_function_error(e, function))?;

        Ok(FunctionUpdateStatus::from_provider(
            response.last_update_status.as_deref(),
            response.last_update_status_reason.as_deref(),
        ))
    }
}
