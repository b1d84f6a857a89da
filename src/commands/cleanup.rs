// ABOUTME: The cleanup command: remove local images of the configured repository.
// ABOUTME: Needs no secrets and no cloud access; failures are warnings only.

use crate::deploy::{CleanupReport, clean_repository};
use crate::diagnostics::Diagnostics;
use crate::engine::ImageOps;
use crate::error::Result;
use crate::output::Output;

use super::Invocation;

pub async fn cleanup<E: ImageOps>(
    invocation: &Invocation,
    engine: &E,
    output: &Output,
    diagnostics: &mut Diagnostics,
) -> Result<CleanupReport> {
    let target = invocation.target()?;
    output.progress(&format!(
        "Removing local images of repository {}...",
        target.repository
    ));

    let report = clean_repository(engine, &target.repository, diagnostics).await;
    output.success(&format!("Removed {} local image(s)", report.removed.len()));
    Ok(report)
}
