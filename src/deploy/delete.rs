// ABOUTME: Confirmed stack deletion.
// ABOUTME: Registry images are deleted one by one first, since a stack that owns a non-empty repository cannot be deleted.

use crate::cloud::{OUTPUT_REPOSITORY_URI, RegistryError, RegistryOps, StackOps};
use crate::config::DeployTarget;
use crate::confirm::Confirm;
use crate::diagnostics::{Diagnostics, Warning};
use crate::types::{RepositoryName, RepositoryUri};

use super::error::{DeployError, Stage};

/// What a confirmed deletion did.
#[derive(Debug, Default)]
pub struct DeleteReport {
    pub repository: Option<RepositoryName>,
    pub deleted: Vec<String>,
    pub failed: Vec<String>,
}

/// Repository owned by the stack, falling back to the configured name when
/// the stack does not report one.
async fn owned_repository<C: StackOps>(cloud: &C, target: &DeployTarget) -> RepositoryName {
    match cloud.stack_outputs(&target.stack_name).await {
        Ok(outputs) => outputs
            .get(OUTPUT_REPOSITORY_URI)
            .and_then(|raw| RepositoryUri::parse(raw).ok())
            .map(|uri| uri.name().clone())
            .unwrap_or_else(|| target.repository.clone()),
        Err(e) => {
            tracing::debug!("cannot read stack outputs, using configured repository: {}", e);
            target.repository.clone()
        }
    }
}

/// Delete every tagged image, then the stack.
///
/// Nothing is touched unless `confirm` answers yes. Image failures are
/// recorded in `diagnostics` and never block the stack deletion.
///
/// # Errors
///
/// `UserAborted` if not confirmed, `InfrastructureFailure` if the stack
/// deletion itself fails.
pub async fn delete_stack<C, P>(
    cloud: &C,
    confirm: &P,
    target: &DeployTarget,
    diagnostics: &mut Diagnostics,
) -> Result<DeleteReport, DeployError>
where
    C: RegistryOps + StackOps,
    P: Confirm + ?Sized,
{
    let prompt = format!(
        "Delete stack '{}' in {} and every image in its repository?",
        target.stack_name, target.region
    );
    let confirmed = confirm
        .confirm(&prompt)
        .map_err(|e| DeployError::infrastructure(Stage::Confirm, e))?;
    if !confirmed {
        return Err(DeployError::UserAborted);
    }

    let mut report = DeleteReport::default();
    let repository = owned_repository(cloud, target).await;

    match cloud.list_image_tags(&repository).await {
        Ok(tags) => {
            for tag in tags {
                match cloud.delete_image(&repository, &tag).await {
                    Ok(()) => report.deleted.push(tag),
                    Err(e) => {
                        diagnostics.warn(Warning::image_delete(e.to_string()));
                        report.failed.push(tag);
                    }
                }
            }
        }
        Err(RegistryError::NotFound(_)) => {
            tracing::debug!(%repository, "repository not found, no images to delete");
        }
        Err(e) => {
            diagnostics.warn(Warning::image_delete(format!(
                "cannot list images in {}: {}",
                repository, e
            )));
        }
    }
    report.repository = Some(repository);

    cloud
        .delete_stack(&target.stack_name)
        .await
        .map_err(|e| DeployError::infrastructure(Stage::StackDelete, e))?;

    Ok(report)
}
