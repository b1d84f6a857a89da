// ABOUTME: State transition methods for the deployment pipeline.
// ABOUTME: Each method consumes self and returns the next state on success.

use secrecy::{ExposeSecret, SecretString};
use std::collections::BTreeMap;

use crate::cloud::{
    CAPABILITY_NAMED_IAM, FunctionOps, IdentityOps, ParameterValue, RegistryError, RegistryOps,
    StackDeployment, StackOps, StackOutputs,
};
use crate::config::DeploymentConfig;
use crate::engine::{BuildOps, BuildSpec, ImageOps, LoginOps, RegistryAuth};
use crate::types::{ImageRef, RepositoryName, RepositoryUri, StackName};

use super::Deployment;
use super::error::{DeployError, Stage};
use super::state::{
    Authenticated, Built, ImagePair, Published, RepositoryReady, Rolled, Validated,
};
use super::wait::wait_for_function_update;

/// Registry user name for token-based login.
pub const REGISTRY_USERNAME: &str = "AWS";

/// Stack tag recording which tool last applied the stack.
pub const MANAGED_BY: &str = "lamdeploy";

/// Create the repository unless it already exists.
///
/// Returns `true` if this call created it.
pub async fn ensure_repository<C: RegistryOps>(
    cloud: &C,
    name: &RepositoryName,
) -> Result<bool, DeployError> {
    match cloud.create_repository(name).await {
        Ok(()) => {
            tracing::info!(repository = %name, "created repository");
            Ok(true)
        }
        Err(RegistryError::AlreadyExists(_)) => {
            tracing::debug!(repository = %name, "repository already exists");
            Ok(false)
        }
        Err(e) => Err(DeployError::infrastructure(Stage::Repository, e)),
    }
}

/// Read and validate the outputs of a stack.
pub async fn read_outputs<C: StackOps>(
    cloud: &C,
    stack: &StackName,
) -> Result<StackOutputs, DeployError> {
    let raw = cloud
        .stack_outputs(stack)
        .await
        .map_err(|e| DeployError::infrastructure(Stage::StackOutputs, e))?;
    StackOutputs::from_map(raw).map_err(|e| DeployError::infrastructure(Stage::StackOutputs, e))
}

/// Build the stack request for deploying `image`.
///
/// Settings-file parameters and tags are applied first so the managed
/// entries always win.
pub fn stack_deployment(
    config: &DeploymentConfig,
    image: &ImageRef,
    deployed_from: &str,
) -> StackDeployment {
    let target = &config.target;
    let secrets = &config.secrets;

    let mut parameters: BTreeMap<String, ParameterValue> = target
        .parameters
        .iter()
        .map(|(k, v)| (k.clone(), ParameterValue::Plain(v.clone())))
        .collect();
    let plain = [
        ("Environment", target.environment.clone()),
        ("ImageTag", image.tag().to_string()),
        ("RepositoryName", image.name().to_string()),
    ];
    for (key, value) in plain {
        parameters.insert(key.to_string(), ParameterValue::Plain(value));
    }
    let secret = [
        ("SlackBotToken", &secrets.slack_bot_token),
        ("SlackSigningSecret", &secrets.slack_signing_secret),
        ("AnthropicApiKey", &secrets.anthropic_api_key),
    ];
    for (key, value) in secret {
        parameters.insert(
            key.to_string(),
            ParameterValue::Secret(SecretString::from(value.expose_secret().to_string())),
        );
    }

    let mut tags = target.tags.clone();
    tags.insert("Environment".to_string(), target.environment.clone());
    tags.insert("ManagedBy".to_string(), MANAGED_BY.to_string());
    tags.insert("DeployedFrom".to_string(), deployed_from.to_string());

    StackDeployment {
        stack_name: target.stack_name.clone(),
        template: target.template.clone(),
        parameters,
        capabilities: vec![CAPABILITY_NAMED_IAM.to_string()],
        tags,
    }
}

// =============================================================================
// Validated -> RepositoryReady
// =============================================================================

impl Deployment<Validated> {
    /// Resolve the account and make sure the repository exists.
    ///
    /// # Errors
    ///
    /// `AuthFailure` if the credentials are rejected, `InfrastructureFailure`
    /// if the repository cannot be created.
    pub async fn ensure_repository<C: IdentityOps + RegistryOps>(
        self,
        cloud: &C,
    ) -> Result<Deployment<RepositoryReady>, DeployError> {
        let identity = cloud
            .caller_identity()
            .await
            .map_err(|e| DeployError::auth(Stage::Identity, e))?;
        tracing::debug!(account = %identity.account, arn = %identity.arn, "resolved identity");

        let target = &self.config.target;
        ensure_repository(cloud, &target.repository).await?;
        let uri = RepositoryUri::compose(&identity.account, &target.region, &target.repository);

        Ok(Deployment {
            config: self.config,
            state: RepositoryReady { uri },
        })
    }
}

// =============================================================================
// RepositoryReady -> Authenticated
// =============================================================================

impl Deployment<RepositoryReady> {
    /// Exchange a short-lived registry password for an engine login session.
    pub async fn authenticate<C: RegistryOps, E: LoginOps>(
        self,
        cloud: &C,
        engine: &E,
    ) -> Result<Deployment<Authenticated>, DeployError> {
        let password = cloud
            .login_password()
            .await
            .map_err(|e| DeployError::auth(Stage::Authenticate, e))?;
        let auth = RegistryAuth::new(REGISTRY_USERNAME, password, self.state.uri.registry());

        engine
            .login(&auth)
            .await
            .map_err(|e| DeployError::auth(Stage::Authenticate, e))?;

        Ok(Deployment {
            config: self.config,
            state: Authenticated {
                uri: self.state.uri,
                auth,
            },
        })
    }
}

// =============================================================================
// Authenticated -> Built
// =============================================================================

impl Deployment<Authenticated> {
    /// Build for the configured platform, then add the `latest` reference.
    pub async fn build<E: BuildOps + ImageOps>(
        self,
        engine: &E,
    ) -> Result<Deployment<Built>, DeployError> {
        let target = &self.config.target;
        let images = ImagePair::for_tag(&self.state.uri, &target.image_tag);

        let spec = BuildSpec {
            context: target.build.context.clone(),
            dockerfile: target.build.dockerfile.clone(),
            platform: target.build.platform.clone(),
            image: images.primary.clone(),
        };
        engine
            .build_image(&spec)
            .await
            .map_err(|e| DeployError::BuildFailure {
                message: e.to_string(),
            })?;
        engine
            .tag_image(&images.primary, &images.latest)
            .await
            .map_err(|e| DeployError::BuildFailure {
                message: e.to_string(),
            })?;

        Ok(Deployment {
            config: self.config,
            state: Built {
                auth: self.state.auth,
                images,
            },
        })
    }
}

// =============================================================================
// Built -> Published
// =============================================================================

impl Deployment<Built> {
    /// Push both references. Succeeds only if every push lands.
    pub async fn publish<E: ImageOps>(
        self,
        engine: &E,
    ) -> Result<Deployment<Published>, DeployError> {
        for image in self.state.images.refs() {
            tracing::debug!(%image, "pushing");
            engine
                .push_image(image, &self.state.auth)
                .await
                .map_err(|e| DeployError::PublishFailure {
                    message: e.to_string(),
                })?;
        }

        Ok(Deployment {
            config: self.config,
            state: Published {
                images: self.state.images,
            },
        })
    }
}

// =============================================================================
// Published -> Rolled
// =============================================================================

impl Deployment<Published> {
    /// Re-apply the stack with the new image tag and read its outputs.
    pub async fn apply_stack<C: StackOps>(
        self,
        cloud: &C,
    ) -> Result<Deployment<Rolled>, DeployError> {
        let hostname = gethostname::gethostname();
        let request = stack_deployment(
            &self.config,
            &self.state.images.primary,
            &hostname.to_string_lossy(),
        );

        let change = cloud
            .deploy_stack(&request)
            .await
            .map_err(|e| DeployError::infrastructure(Stage::StackApply, e))?;
        tracing::debug!(stack = %request.stack_name, ?change, "stack applied");

        let outputs = read_outputs(cloud, &self.config.target.stack_name).await?;

        Ok(Deployment {
            config: self.config,
            state: Rolled {
                images: self.state.images,
                outputs,
                change: Some(change),
            },
        })
    }

    /// Point the function at the new tag and wait for the update to converge.
    ///
    /// The stack itself is not touched.
    pub async fn update_function<C: StackOps + FunctionOps>(
        self,
        cloud: &C,
    ) -> Result<Deployment<Rolled>, DeployError> {
        let outputs = read_outputs(cloud, &self.config.target.stack_name).await?;
        let function = outputs.function_name();

        cloud
            .update_function_image(function, &self.state.images.primary)
            .await
            .map_err(|e| DeployError::UpdateFailure {
                message: e.to_string(),
            })?;
        wait_for_function_update(cloud, function, &self.config.target.function_update).await?;

        Ok(Deployment {
            config: self.config,
            state: Rolled {
                images: self.state.images,
                outputs,
                change: None,
            },
        })
    }
}
