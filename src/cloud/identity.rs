// ABOUTME: Identity capability: resolve the caller's account.
// ABOUTME: Registry URIs are namespaced by the account this returns.

use async_trait::async_trait;

use crate::types::AccountId;

/// Who the configured credentials belong to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CallerIdentity {
    pub account: AccountId,
    pub arn: String,
}

#[async_trait]
pub trait IdentityOps: Send + Sync {
    /// Resolve the account and principal behind the active credentials.
    async fn caller_identity(&self) -> Result<CallerIdentity, IdentityError>;
}

#[derive(Debug, thiserror::Error)]
pub enum IdentityError {
    #[error("credentials rejected: {0}")]
    InvalidCredentials(String),

    #[error("unexpected identity response: {0}")]
    InvalidResponse(String),

    #[error("provider error: {0}")]
    Provider(String),
}
