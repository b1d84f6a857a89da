// ABOUTME: The delete-stack command.
// ABOUTME: Confirms, empties the repository and deletes the stack.

use crate::cloud::{RegistryOps, StackOps};
use crate::confirm::Confirm;
use crate::deploy::{self, DeleteReport};
use crate::diagnostics::Diagnostics;
use crate::error::Result;
use crate::output::Output;

use super::Invocation;

pub async fn delete_stack<C, P>(
    invocation: &Invocation,
    cloud: &C,
    confirm: &P,
    output: &Output,
    diagnostics: &mut Diagnostics,
) -> Result<DeleteReport>
where
    C: RegistryOps + StackOps,
    P: Confirm + ?Sized,
{
    let config = invocation.config()?;
    let target = &config.target;

    let report = deploy::delete_stack(cloud, confirm, target, diagnostics).await?;
    if let Some(repository) = &report.repository {
        output.progress(&format!(
            "  → Deleted {} image(s) from {}",
            report.deleted.len(),
            repository
        ));
    }
    output.success(&format!("Stack {} deleted", target.stack_name));
    Ok(report)
}
