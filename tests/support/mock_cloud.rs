// ABOUTME: Recording mock of every cloud capability.
// ABOUTME: Counts calls per operation and fails operations on request.

use async_trait::async_trait;
use lamdeploy::cloud::{
    CallerIdentity, FunctionError, FunctionOps, FunctionUpdateStatus, IdentityError, IdentityOps,
    OUTPUT_API_URL, OUTPUT_FUNCTION_NAME, OUTPUT_REPOSITORY_URI, RegistryError, RegistryOps,
    StackChange, StackDeployment, StackError, StackOps,
};
use lamdeploy::types::{AccountId, ImageRef, RepositoryName, StackName};
use secrecy::SecretString;
use std::collections::{BTreeMap, BTreeSet, HashSet, VecDeque};
use std::sync::Mutex;

pub const REPOSITORY_URI: &str = "123.dkr.ecr.us-west-1.amazonaws.com/x";
pub const FUNCTION_NAME: &str = "x-slack-bot";
pub const API_URL: &str = "https://x/prod/slack/events";

/// A stack apply as the mock saw it, secrets exposed for assertions.
#[derive(Debug, Clone)]
pub struct RecordedApply {
    pub stack_name: String,
    pub parameters: BTreeMap<String, String>,
    pub secret_parameters: BTreeSet<String>,
    pub capabilities: Vec<String>,
    pub tags: BTreeMap<String, String>,
}

#[derive(Default)]
pub struct MockCloud {
    calls: Mutex<Vec<&'static str>>,
    failing: Mutex<HashSet<&'static str>>,
    repositories: Mutex<BTreeSet<String>>,
    outputs: Mutex<BTreeMap<String, String>>,
    remote_tags: Mutex<Vec<String>>,
    failing_tags: Mutex<HashSet<String>>,
    statuses: Mutex<VecDeque<FunctionUpdateStatus>>,
    applies: Mutex<Vec<RecordedApply>>,
    function_images: Mutex<Vec<String>>,
}

impl MockCloud {
    /// A stack that reports the standard outputs and converges immediately.
    pub fn new() -> Self {
        let cloud = MockCloud::default();
        {
            let mut outputs = cloud.outputs.lock().unwrap();
            outputs.insert(OUTPUT_REPOSITORY_URI.to_string(), REPOSITORY_URI.to_string());
            outputs.insert(OUTPUT_FUNCTION_NAME.to_string(), FUNCTION_NAME.to_string());
            outputs.insert(OUTPUT_API_URL.to_string(), API_URL.to_string());
        }
        cloud
    }

    /// Make one operation fail every time it is called.
    pub fn failing(self, operation: &'static str) -> Self {
        self.failing.lock().unwrap().insert(operation);
        self
    }

    pub fn with_remote_tags(self, tags: &[&str]) -> Self {
        *self.remote_tags.lock().unwrap() = tags.iter().map(|t| t.to_string()).collect();
        self
    }

    /// Make deletion of one remote tag fail.
    pub fn failing_tag(self, tag: &str) -> Self {
        self.failing_tags.lock().unwrap().insert(tag.to_string());
        self
    }

    /// Statuses returned by successive polls; once exhausted, polls report success.
    pub fn with_statuses(self, statuses: Vec<FunctionUpdateStatus>) -> Self {
        *self.statuses.lock().unwrap() = statuses.into();
        self
    }

    pub fn without_output(self, key: &str) -> Self {
        self.outputs.lock().unwrap().remove(key);
        self
    }

    pub fn calls(&self) -> Vec<&'static str> {
        self.calls.lock().unwrap().clone()
    }

    pub fn count(&self, operation: &str) -> usize {
        self.calls
            .lock()
            .unwrap()
            .iter()
            .filter(|c| **c == operation)
            .count()
    }

    pub fn repository_count(&self) -> usize {
        self.repositories.lock().unwrap().len()
    }

    pub fn applies(&self) -> Vec<RecordedApply> {
        self.applies.lock().unwrap().clone()
    }

    pub fn function_images(&self) -> Vec<String> {
        self.function_images.lock().unwrap().clone()
    }

    pub fn remote_tags(&self) -> Vec<String> {
        self.remote_tags.lock().unwrap().clone()
    }

    fn record(&self, operation: &'static str) -> bool {
        self.calls.lock().unwrap().push(operation);
        self.failing.lock().unwrap().contains(operation)
    }
}

#[async_trait]
impl IdentityOps for MockCloud {
    async fn caller_identity(&self) -> Result<CallerIdentity, IdentityError> {
        if self.record("caller_identity") {
            return Err(IdentityError::InvalidCredentials(
                "ExpiredToken: the security token included in the request is expired".to_string(),
            ));
        }
        Ok(CallerIdentity {
            account: AccountId::new("123456789012").unwrap(),
            arn: "arn:aws:iam::123456789012:user/deployer".to_string(),
        })
    }
}

#[async_trait]
impl RegistryOps for MockCloud {
    async fn create_repository(&self, name: &RepositoryName) -> Result<(), RegistryError> {
        if self.record("create_repository") {
            return Err(RegistryError::Provider("AccessDenied".to_string()));
        }
        if !self.repositories.lock().unwrap().insert(name.to_string()) {
            return Err(RegistryError::AlreadyExists(name.to_string()));
        }
        Ok(())
    }

    async fn login_password(&self) -> Result<SecretString, RegistryError> {
        if self.record("login_password") {
            return Err(RegistryError::AuthenticationFailed(
                "not authorized to perform ecr:GetAuthorizationToken".to_string(),
            ));
        }
        Ok(SecretString::from("registry-password".to_string()))
    }

    async fn list_image_tags(&self, _name: &RepositoryName) -> Result<Vec<String>, RegistryError> {
        if self.record("list_image_tags") {
            return Err(RegistryError::Provider("throttled".to_string()));
        }
        Ok(self.remote_tags.lock().unwrap().clone())
    }

    async fn delete_image(&self, _name: &RepositoryName, tag: &str) -> Result<(), RegistryError> {
        self.record("delete_image");
        if self.failing_tags.lock().unwrap().contains(tag) {
            return Err(RegistryError::DeleteFailed {
                tag: tag.to_string(),
                reason: "ImageNotFound".to_string(),
            });
        }
        self.remote_tags.lock().unwrap().retain(|t| t != tag);
        Ok(())
    }
}

#[async_trait]
impl StackOps for MockCloud {
    async fn deploy_stack(&self, request: &StackDeployment) -> Result<StackChange, StackError> {
        if self.record("deploy_stack") {
            return Err(StackError::OperationFailed(
                "ROLLBACK_COMPLETE: Resource handler returned message".to_string(),
            ));
        }
        self.applies.lock().unwrap().push(RecordedApply {
            stack_name: request.stack_name.to_string(),
            parameters: request
                .parameters
                .iter()
                .map(|(k, v)| (k.clone(), v.expose().to_string()))
                .collect(),
            secret_parameters: request
                .parameters
                .iter()
                .filter(|(_, v)| v.is_secret())
                .map(|(k, _)| k.clone())
                .collect(),
            capabilities: request.capabilities.clone(),
            tags: request.tags.clone(),
        });
        Ok(StackChange::Applied)
    }

    async fn stack_outputs(&self, stack: &StackName) -> Result<BTreeMap<String, String>, StackError> {
        if self.record("stack_outputs") {
            return Err(StackError::NotFound(stack.to_string()));
        }
        Ok(self.outputs.lock().unwrap().clone())
    }

    async fn delete_stack(&self, _stack: &StackName) -> Result<(), StackError> {
        if self.record("delete_stack") {
            return Err(StackError::OperationFailed("DELETE_FAILED".to_string()));
        }
        Ok(())
    }
}

#[async_trait]
impl FunctionOps for MockCloud {
    async fn update_function_image(&self, _function: &str, image: &ImageRef) -> Result<(), FunctionError> {
        if self.record("update_function_image") {
            return Err(FunctionError::Rejected("ResourceConflictException".to_string()));
        }
        self.function_images.lock().unwrap().push(image.to_string());
        Ok(())
    }

    async fn function_update_status(&self, _function: &str) -> Result<FunctionUpdateStatus, FunctionError> {
        self.record("function_update_status");
        Ok(self
            .statuses
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or(FunctionUpdateStatus::Successful))
    }
}
