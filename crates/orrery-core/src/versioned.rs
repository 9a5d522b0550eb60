//! Versioned filenames: `kernels.????.db` style templates.
//!
//! A file name may carry one run of `?` standing in for a zero-padded version
//! number. Resolution scans the parent directory at call time and is never
//! cached, so repeated runs observe the live state of the data area.

use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum VersionError {
    #[error("no version placeholder in file name: {path}")]
    NotVersioned { path: String },
    #[error("no file matches versioned name {path}")]
    NoMatch { path: String },
    #[error("cannot scan {dir}: {source}")]
    Scan {
        dir: String,
        #[source]
        source: std::io::Error,
    },
}

/// A path whose file name may contain a `?` version placeholder.
#[derive(Debug, Clone)]
pub struct VersionedPath {
    path: PathBuf,
}

/// `<prefix><?-run><suffix>` decomposition of a versioned file name.
struct Template<'a> {
    prefix: &'a str,
    width: usize,
    suffix: &'a str,
}

impl VersionedPath {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        VersionedPath { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Whether the file name contains a version placeholder.
    pub fn is_versioned(&self) -> bool {
        self.file_name().contains('?')
    }

    /// Full path of the highest existing version.
    pub fn highest(&self) -> Result<PathBuf, VersionError> {
        let name = self.highest_name()?;
        Ok(self.dir().join(name))
    }

    /// File name of the highest existing version.
    pub fn highest_name(&self) -> Result<String, VersionError> {
        let template = self.template()?;
        let versions = self.scan(&template)?;
        let highest = versions
            .into_iter()
            .max()
            .ok_or_else(|| VersionError::NoMatch {
                path: self.path.display().to_string(),
            })?;
        tracing::debug!(path = %self.path.display(), version = highest, "resolved highest version");
        Ok(template.render(highest))
    }

    /// Full path for the next unused version: max+1, or 1 when nothing
    /// matches yet. The parent directory must exist.
    pub fn next(&self) -> Result<PathBuf, VersionError> {
        let template = self.template()?;
        let versions = self.scan(&template)?;
        let next = versions.into_iter().max().map_or(1, |v| v + 1);
        tracing::debug!(path = %self.path.display(), version = next, "allocated new version");
        Ok(self.dir().join(template.render(next)))
    }

    fn dir(&self) -> &Path {
        match self.path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => Path::new("."),
        }
    }

    fn file_name(&self) -> &str {
        self.path
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or_default()
    }

    fn template(&self) -> Result<Template<'_>, VersionError> {
        let name = self.file_name();
        let Some(start) = name.find('?') else {
            return Err(VersionError::NotVersioned {
                path: self.path.display().to_string(),
            });
        };
        let width = name[start..].chars().take_while(|c| *c == '?').count();
        Ok(Template {
            prefix: &name[..start],
            width,
            suffix: &name[start + width..],
        })
    }

    /// Version numbers of all directory entries matching the template.
    fn scan(&self, template: &Template<'_>) -> Result<Vec<u64>, VersionError> {
        let dir = self.dir();
        let entries = std::fs::read_dir(dir).map_err(|source| VersionError::Scan {
            dir: dir.display().to_string(),
            source,
        })?;

        let mut versions = Vec::new();
        for entry in entries.flatten() {
            let name = entry.file_name();
            let Some(name) = name.to_str() else { continue };
            if let Some(version) = template.version_of(name) {
                versions.push(version);
            }
        }
        versions.sort_unstable();
        Ok(versions)
    }
}

impl Template<'_> {
    /// Parse an entry name against the template; the digit run must have
    /// exactly the placeholder width.
    fn version_of(&self, name: &str) -> Option<u64> {
        let mid = name.strip_prefix(self.prefix)?.strip_suffix(self.suffix)?;
        if mid.len() != self.width || !mid.bytes().all(|b| b.is_ascii_digit()) {
            return None;
        }
        mid.parse().ok()
    }

    fn render(&self, version: u64) -> String {
        format!(
            "{}{:0width$}{}",
            self.prefix,
            version,
            self.suffix,
            width = self.width
        )
    }
}
