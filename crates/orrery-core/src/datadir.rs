//! Data-area path expansion.
//!
//! The toolkit addresses its data files as `$area/relative/path`, where
//! `$area` is a named area (mission or `base`) under one data root. The root
//! comes from `$ORRERY_DATA`; tests construct a [`DataArea`] directly over a
//! temporary directory instead of mutating the process environment.

use std::path::{Path, PathBuf};
use thiserror::Error;

/// Environment variable naming the data root.
pub const DATA_VAR: &str = "ORRERY_DATA";

#[derive(Debug, Error)]
pub enum DataAreaError {
    #[error("{DATA_VAR} is not set")]
    Unset,
}

#[derive(Debug, Clone)]
pub struct DataArea {
    root: PathBuf,
}

impl DataArea {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        DataArea { root: root.into() }
    }

    pub fn from_env() -> Result<Self, DataAreaError> {
        let root = std::env::var(DATA_VAR).map_err(|_| DataAreaError::Unset)?;
        Ok(DataArea::new(root))
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Expand `$area/rest` to `<root>/area/rest`; paths without a `$` prefix
    /// pass through unchanged.
    pub fn expand(&self, path: &str) -> PathBuf {
        let Some(rest) = path.strip_prefix('$') else {
            return PathBuf::from(path);
        };
        match rest.split_once('/') {
            Some((area, tail)) => self.root.join(area).join(tail),
            None => self.root.join(rest),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dollar_prefix_expands_under_the_root() {
        let area = DataArea::new("/data");
        assert_eq!(
            area.expand("$cassini/kernels/pck/kernels.????.db"),
            PathBuf::from("/data/cassini/kernels/pck/kernels.????.db")
        );
    }

    #[test]
    fn plain_paths_pass_through() {
        let area = DataArea::new("/data");
        assert_eq!(
            area.expand("/tmp/kernels.db"),
            PathBuf::from("/tmp/kernels.db")
        );
    }

    #[test]
    fn bare_area_name_expands_to_the_area_directory() {
        let area = DataArea::new("/data");
        assert_eq!(area.expand("$base"), PathBuf::from("/data/base"));
    }
}
