//! Output tree removal.

use super::BuildError;
use crate::core::BuildMode;
use crate::paths::PathTable;

/// Delete the whole output root of `mode`. An absent root is not an error.
///
/// The other mode's root is never touched; config validation guarantees
/// the two roots are disjoint.
pub async fn clean(paths: &PathTable, mode: BuildMode) -> Result<(), BuildError> {
    let root = paths.output_root(mode);
    match tokio::fs::remove_dir_all(root).await {
        Ok(()) => {
            crate::debug!("clean"; "removed {}", root.display());
            Ok(())
        }
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(()),
        Err(err) => Err(BuildError::io(root, err)),
    }
}
