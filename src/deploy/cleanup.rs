// ABOUTME: Best-effort removal of local image references.
// ABOUTME: Failures become warnings and never fail the run.

use crate::diagnostics::{Diagnostics, Warning};
use crate::engine::{ImageError, ImageOps};
use crate::types::{ImageRef, RepositoryName};

#[derive(Debug, Default, PartialEq, Eq)]
pub struct CleanupReport {
    pub removed: Vec<ImageRef>,
    pub failed: usize,
}

/// Remove the given references from the local engine.
pub async fn remove_local_images<E: ImageOps>(
    engine: &E,
    images: &[&ImageRef],
    diagnostics: &mut Diagnostics,
) -> CleanupReport {
    let mut report = CleanupReport::default();
    for image in images {
        match engine.remove_image(image).await {
            Ok(()) => report.removed.push((*image).clone()),
            Err(ImageError::NotFound(_)) => {
                diagnostics.warn(Warning::cleanup(format!("{} already absent locally", image)));
                report.failed += 1;
            }
            Err(e) => {
                diagnostics.warn(Warning::cleanup(format!("could not remove {}: {}", image, e)));
                report.failed += 1;
            }
        }
    }
    report
}

/// Remove every local reference to `repository`, in any registry.
pub async fn clean_repository<E: ImageOps>(
    engine: &E,
    repository: &RepositoryName,
    diagnostics: &mut Diagnostics,
) -> CleanupReport {
    let images = match engine.list_images(repository).await {
        Ok(images) => images,
        Err(e) => {
            diagnostics.warn(Warning::cleanup(format!("could not list local images: {}", e)));
            return CleanupReport {
                removed: Vec::new(),
                failed: 1,
            };
        }
    };
    let refs: Vec<&ImageRef> = images.iter().collect();
    remove_local_images(engine, &refs, diagnostics).await
}
