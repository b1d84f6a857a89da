// ABOUTME: Recording mock of every container engine capability.
// ABOUTME: Tracks pushes and local references and fails operations on request.

use async_trait::async_trait;
use lamdeploy::engine::{
    BuildError, BuildOps, BuildSpec, EngineInfo, EngineInfoError, ImageError, ImageOps,
    LoginError, LoginOps, RegistryAuth,
};
use lamdeploy::types::{ImageRef, RepositoryName};
use std::collections::HashSet;
use std::sync::Mutex;

#[derive(Default)]
pub struct MockEngine {
    calls: Mutex<Vec<&'static str>>,
    failing: Mutex<HashSet<&'static str>>,
    builds: Mutex<Vec<BuildSpec>>,
    pushed: Mutex<Vec<String>>,
    fail_push_number: Mutex<Option<usize>>,
    local: Mutex<Vec<ImageRef>>,
    logins: Mutex<Vec<(String, String)>>,
}

impl MockEngine {
    pub fn new() -> Self {
        MockEngine::default()
    }

    /// Make one operation fail every time it is called.
    pub fn failing(self, operation: &'static str) -> Self {
        self.failing.lock().unwrap().insert(operation);
        self
    }

    /// Fail the n-th push (1-based); earlier pushes land.
    pub fn failing_push(self, number: usize) -> Self {
        *self.fail_push_number.lock().unwrap() = Some(number);
        self
    }

    /// Pretend these references exist locally.
    pub fn with_local(self, images: &[&str]) -> Self {
        *self.local.lock().unwrap() = images.iter().map(|i| ImageRef::parse(i).unwrap()).collect();
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

    pub fn builds(&self) -> Vec<BuildSpec> {
        self.builds.lock().unwrap().clone()
    }

    pub fn pushed(&self) -> Vec<String> {
        self.pushed.lock().unwrap().clone()
    }

    pub fn local(&self) -> Vec<String> {
        self.local.lock().unwrap().iter().map(|i| i.to_string()).collect()
    }

    /// (username, server) of every login.
    pub fn logins(&self) -> Vec<(String, String)> {
        self.logins.lock().unwrap().clone()
    }

    fn record(&self, operation: &'static str) -> bool {
        self.calls.lock().unwrap().push(operation);
        self.failing.lock().unwrap().contains(operation)
    }
}

#[async_trait]
impl EngineInfo for MockEngine {
    async fn ping(&self) -> Result<(), EngineInfoError> {
        if self.record("ping") {
            return Err(EngineInfoError::ConnectionFailed(
                "Cannot connect to the Docker daemon".to_string(),
            ));
        }
        Ok(())
    }
}

#[async_trait]
impl LoginOps for MockEngine {
    async fn login(&self, auth: &RegistryAuth) -> Result<(), LoginError> {
        if self.record("login") {
            return Err(LoginError::Rejected {
                server: auth.server.clone(),
                message: "unauthorized: authentication required".to_string(),
            });
        }
        self.logins
            .lock()
            .unwrap()
            .push((auth.username.clone(), auth.server.clone()));
        Ok(())
    }
}

#[async_trait]
impl BuildOps for MockEngine {
    async fn build_image(&self, spec: &BuildSpec) -> Result<(), BuildError> {
        if self.record("build_image") {
            return Err(BuildError::Failed {
                image: spec.image.to_string(),
                output: "ERROR: failed to solve: process \"/bin/sh -c pip install\" did not complete successfully".to_string(),
            });
        }
        self.builds.lock().unwrap().push(spec.clone());
        self.local.lock().unwrap().push(spec.image.clone());
        Ok(())
    }
}

#[async_trait]
impl ImageOps for MockEngine {
    async fn tag_image(&self, source: &ImageRef, target: &ImageRef) -> Result<(), ImageError> {
        if self.record("tag_image") {
            return Err(ImageError::TagFailed {
                source_image: source.to_string(),
                target: target.to_string(),
                message: "No such image".to_string(),
            });
        }
        self.local.lock().unwrap().push(target.clone());
        Ok(())
    }

    async fn push_image(&self, image: &ImageRef, _auth: &RegistryAuth) -> Result<(), ImageError> {
        self.record("push_image");
        let number = self.count("push_image");
        if *self.fail_push_number.lock().unwrap() == Some(number) {
            return Err(ImageError::PushFailed {
                image: image.to_string(),
                message: "denied: requested access to the resource is denied".to_string(),
            });
        }
        self.pushed.lock().unwrap().push(image.to_string());
        Ok(())
    }

    async fn remove_image(&self, image: &ImageRef) -> Result<(), ImageError> {
        if self.record("remove_image") {
            return Err(ImageError::Engine("conflict: image is in use".to_string()));
        }
        let mut local = self.local.lock().unwrap();
        let before = local.len();
        local.retain(|i| i != image);
        if local.len() == before {
            return Err(ImageError::NotFound(image.to_string()));
        }
        Ok(())
    }

    async fn list_images(&self, name: &RepositoryName) -> Result<Vec<ImageRef>, ImageError> {
        if self.record("list_images") {
            return Err(ImageError::Engine("daemon busy".to_string()));
        }
        Ok(self
            .local
            .lock()
            .unwrap()
            .iter()
            .filter(|i| i.name() == name.as_str())
            .cloned()
            .collect())
    }
}
