// ABOUTME: The deploy, update-code and build-only commands.
// ABOUTME: They share the publish stages and differ in how the new image is rolled out.

use crate::cloud::{CloudProvider, IdentityOps, RegistryOps, StackChange};
use crate::config::DeploymentConfig;
use crate::deploy::{
    DeployError, Deployment, ImagePair, Published, Rolled, Summary, remove_local_images,
};
use crate::diagnostics::Diagnostics;
use crate::engine::ContainerEngine;
use crate::error::Result;
use crate::output::Output;

use super::Invocation;

/// Ensure the repository, log in, build and push both tags.
async fn publish<C, E>(
    config: DeploymentConfig,
    cloud: &C,
    engine: &E,
    output: &Output,
) -> std::result::Result<Deployment<Published>, DeployError>
where
    C: IdentityOps + RegistryOps,
    E: ContainerEngine,
{
    let target = &config.target;
    output.progress(&format!(
        "Deploying stack {} ({}) to {}, image tag {}",
        target.stack_name, target.environment, target.region, target.image_tag
    ));

    output.progress(&format!("  → Ensuring repository {}...", target.repository));
    let deployment = Deployment::new(config).ensure_repository(cloud).await?;

    output.progress(&format!(
        "  → Logging in to {}...",
        deployment.repository_uri().registry()
    ));
    let deployment = deployment.authenticate(cloud, engine).await?;

    output.progress(&format!(
        "  → Building image for {}...",
        deployment.target().build.platform
    ));
    let deployment = deployment.build(engine).await?;

    let images = deployment.images();
    output.progress(&format!(
        "  → Pushing {} and {}...",
        images.primary, images.latest
    ));
    deployment.publish(engine).await
}

/// Report, then remove the run's two local references.
async fn finish<E: ContainerEngine>(
    deployment: &Deployment<Rolled>,
    engine: &E,
    output: &Output,
    diagnostics: &mut Diagnostics,
) -> Summary {
    let summary = Summary::new(
        deployment.target(),
        deployment.images().primary.tag(),
        deployment.outputs(),
    );
    output.summary(&summary);
    cleanup_images(deployment.images(), engine, output, diagnostics).await;
    summary
}

async fn cleanup_images<E: ContainerEngine>(
    images: &ImagePair,
    engine: &E,
    output: &Output,
    diagnostics: &mut Diagnostics,
) {
    output.progress("  → Removing local images...");
    let report = remove_local_images(engine, &images.refs(), diagnostics).await;
    tracing::debug!(removed = report.removed.len(), failed = report.failed, "cleanup done");
}

/// Full pipeline: publish, re-apply the stack with the new tag, report, clean up.
pub async fn deploy<C, E>(
    invocation: &Invocation,
    cloud: &C,
    engine: &E,
    output: &Output,
    diagnostics: &mut Diagnostics,
) -> Result<Summary>
where
    C: CloudProvider,
    E: ContainerEngine,
{
    let config = invocation.config()?;
    let published = publish(config, cloud, engine, output).await?;

    output.progress(&format!(
        "  → Applying stack {}...",
        published.target().stack_name
    ));
    let rolled = published.apply_stack(cloud).await?;
    if rolled.stack_change() == Some(StackChange::NoChanges) {
        output.progress("  → Stack already up to date");
    }

    let summary = finish(&rolled, engine, output, diagnostics).await;
    output.success("Deployment complete!");
    Ok(summary)
}

/// Publish and point the existing function at the new tag. The stack is not applied.
pub async fn update_code<C, E>(
    invocation: &Invocation,
    cloud: &C,
    engine: &E,
    output: &Output,
    diagnostics: &mut Diagnostics,
) -> Result<Summary>
where
    C: CloudProvider,
    E: ContainerEngine,
{
    let config = invocation.config()?;
    let published = publish(config, cloud, engine, output).await?;

    output.progress(&format!(
        "  → Updating function to {}...",
        published.images().primary
    ));
    let rolled = published.update_function(cloud).await?;

    let summary = finish(&rolled, engine, output, diagnostics).await;
    output.success("Function code updated!");
    Ok(summary)
}

/// Publish only, then clean up.
pub async fn build_only<C, E>(
    invocation: &Invocation,
    cloud: &C,
    engine: &E,
    output: &Output,
    diagnostics: &mut Diagnostics,
) -> Result<ImagePair>
where
    C: CloudProvider,
    E: ContainerEngine,
{
    let config = invocation.config()?;
    let published = publish(config, cloud, engine, output).await?;
    let images = published.images().clone();

    cleanup_images(&images, engine, output, diagnostics).await;
    output.success(&format!("Pushed {}", images.primary));
    Ok(images)
}
