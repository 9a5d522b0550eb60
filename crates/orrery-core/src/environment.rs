//! Installation environment: user/host lookups and the version-stamp file.
//!
//! Environment lookups never fail; an unset variable degrades to the caller's
//! default. The version stamp is different: it ships with the installation,
//! so a malformed stamp is reported as a fatal error naming the broken line.

use regex::Regex;
use std::env;
use std::path::Path;
use std::sync::OnceLock;
use thiserror::Error;

/// Environment variable naming the installation root (holds the `version`
/// stamp file).
pub const ROOT_VAR: &str = "ORRERY_ROOT";

#[derive(Debug, Error)]
pub enum EnvironmentError {
    #[error("{ROOT_VAR} is not set")]
    RootUnset,
    #[error("failed to read version file {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("version file {path}: expected 4 lines, found {found}")]
    TooShort { path: String, found: usize },
    #[error("version file {path} line {line}, no valid text found")]
    MalformedLine { path: String, line: usize },
}

/// The current user, or `"Unknown"`.
pub fn user_name() -> String {
    env_value("USER", "Unknown")
}

/// The current host, or `"Unknown"`.
pub fn host_name() -> String {
    env_value("HOST", "Unknown")
}

/// The value of `name`, or `default` when the variable is unset.
pub fn env_value(name: &str, default: &str) -> String {
    env::var(name).unwrap_or_else(|_| default.to_string())
}

/// The toolkit version string, read from `$ORRERY_ROOT/version`.
///
/// Format: `"<version> <qualifier> | <date>"` where the version comes from
/// line 1 of the stamp file, the qualifier from line 4 and the date from
/// line 2. Line 3 is reserved.
pub fn toolkit_version() -> Result<String, EnvironmentError> {
    let root = env::var(ROOT_VAR).map_err(|_| EnvironmentError::RootUnset)?;
    version_from(Path::new(&root))
}

/// [`toolkit_version`] against an explicit installation root.
pub fn version_from(root: &Path) -> Result<String, EnvironmentError> {
    let path = root.join("version");
    let text = std::fs::read_to_string(&path).map_err(|source| EnvironmentError::Io {
        path: path.display().to_string(),
        source,
    })?;

    let lines: Vec<&str> = text.lines().collect();
    if lines.len() < 4 {
        return Err(EnvironmentError::TooShort {
            path: path.display().to_string(),
            found: lines.len(),
        });
    }

    let version = leading_token(lines[0]).ok_or_else(|| malformed(&path, 1))?;
    let date = leading_token(lines[1]).ok_or_else(|| malformed(&path, 2))?;
    // Line 3 is read but carries no token we use.
    let qualifier = leading_token(lines[3]).ok_or_else(|| malformed(&path, 4))?;

    Ok(format!("{version} {qualifier} | {date}"))
}

fn malformed(path: &Path, line: usize) -> EnvironmentError {
    EnvironmentError::MalformedLine {
        path: path.display().to_string(),
        line,
    }
}

/// Leading run of characters excluding space and `#`; `None` when the line is
/// empty or starts with a delimiter.
fn leading_token(line: &str) -> Option<&str> {
    static TOKEN: OnceLock<Regex> = OnceLock::new();
    let re = TOKEN.get_or_init(|| Regex::new(r"^[^ #]+").expect("static pattern"));
    re.find(line).map(|m| m.as_str())
}
