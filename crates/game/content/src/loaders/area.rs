//! Area placement loader.

use std::path::Path;

use realm_core::AreaData;

use crate::loaders::{LoadResult, read_ron};

/// Loader for area definitions from RON files.
///
/// An area file is a plain [`AreaData`] record; characters and objects name
/// content IDs and optionally carry a serial and full saved state.
pub struct AreaLoader;

impl AreaLoader {
    pub fn load(path: &Path) -> LoadResult<AreaData> {
        let data: AreaData = read_ron(path, "area")?;
        if data.id.is_empty() {
            anyhow::bail!("Area {} has no id", path.display());
        }
        Ok(data)
    }
}
