// ABOUTME: Registry credentials held for the duration of a run.
// ABOUTME: The password is a SecretString and is only exposed to the engine.

use secrecy::SecretString;

/// Credentials for pushing to one registry.
#[derive(Debug)]
pub struct RegistryAuth {
    pub username: String,
    pub password: SecretString,
    /// Registry host, e.g. `123456789012.dkr.ecr.us-west-1.amazonaws.com`.
    pub server: String,
}

impl RegistryAuth {
    pub fn new(username: impl Into<String>, password: SecretString, server: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            password,
            server: server.into(),
        }
    }
}
