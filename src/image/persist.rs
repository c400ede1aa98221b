//! Binary persistence for generated images.

use crate::error::Result;
use std::path::Path;

/// Writes decoded image bytes to `path`, creating or overwriting the file.
///
/// The parent directory must already exist; filesystem errors propagate
/// uninterpreted.
pub fn write_image(path: impl AsRef<Path>, data: &[u8]) -> Result<()> {
    let path = path.as_ref();
    std::fs::write(path, data).map_err(|e| {
        tracing::error!(path = %path.display(), error = %e, "failed to write image");
        e
    })?;
    tracing::debug!(path = %path.display(), bytes = data.len(), "image saved");
    Ok(())
}
