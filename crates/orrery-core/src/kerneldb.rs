//! Kernel database refresh.
//!
//! A PCK kernel database lists `Selection` groups whose `File` entries may be
//! versioned (`cpck????.tpc`). Refreshing builds a fresh `TargetAttitudeShape`
//! object that keeps the versioned entries for consumers that understand them
//! and adds hardcoded copies, resolved to the highest existing version, for
//! legacy consumers that do not.
//!
//! Rewritten values keep the `$area` form of the source value; expansion to a
//! real path happens only for the directory scan.

use orrery_pvl::{Document, Group, Keyword, Object};
use thiserror::Error;

use crate::datadir::DataArea;
use crate::versioned::{VersionError, VersionedPath};

/// Kernel database template for the PCK data area.
pub const PCK_DB_TEMPLATE: &str = "$cassini/kernels/pck/kernels.????.db";

/// Leapsecond kernel template; every refreshed database depends on it.
pub const LSK_TEMPLATE: &str = "$base/kernels/lsk/naif????.tls";

/// The object a kernel database must carry.
pub const TARGET_OBJECT: &str = "TargetAttitudeShape";

const LEGACY_COMMENT: &str =
    "This group is hardcoded to support consumers without versioned file name support";

#[derive(Debug, Error)]
pub enum KernelDbError {
    #[error("kernel database has no `{TARGET_OBJECT}` object")]
    MissingSection,
    #[error("cannot resolve leapsecond kernel {template}: {source}")]
    Leapsecond {
        template: String,
        #[source]
        source: VersionError,
    },
    #[error("cannot resolve file `{value}` in group `{group}`: {source}")]
    SelectionFile {
        group: String,
        value: String,
        #[source]
        source: VersionError,
    },
}

/// Current local time in the `RunTime` stamp format.
pub fn current_run_time() -> String {
    chrono::Local::now().format("%Y-%m-%dT%H:%M:%S").to_string()
}

/// Build a refreshed kernel database from `db`.
///
/// The result contains a single fresh [`TARGET_OBJECT`] object stamped with
/// `run_time`, a `Dependencies` group naming the resolved leapsecond kernel,
/// and the source's `Selection` groups: versioned groups appear twice (the
/// original, then a resolved copy for legacy consumers), unversioned groups
/// pass through once unchanged.
pub fn refresh_kernel_db(
    db: &Document,
    area: &DataArea,
    run_time: &str,
) -> Result<Document, KernelDbError> {
    let source = db
        .find_object(TARGET_OBJECT)
        .ok_or(KernelDbError::MissingSection)?;

    let mut latest = Object::new(TARGET_OBJECT);
    latest.push(Keyword::new("RunTime", run_time));
    latest.push_group(leapsecond_dependencies(area)?);

    for group in source.groups.iter().filter(|g| g.is_named("Selection")) {
        let (resolved, rewrote) = resolve_selection(group, area)?;
        if rewrote {
            // Versioned form first, for consumers that resolve it themselves.
            latest.push_group(group.clone());
            let mut resolved = resolved;
            resolved.add_comment(LEGACY_COMMENT);
            latest.push_group(resolved);
        } else {
            tracing::debug!(group = %group.name, "selection group has no versioned files");
            latest.push_group(group.clone());
        }
    }

    let mut out = Document::new();
    out.push_object(latest);
    Ok(out)
}

fn leapsecond_dependencies(area: &DataArea) -> Result<Group, KernelDbError> {
    let lsk = resolve_in_place(area, LSK_TEMPLATE).map_err(|source| KernelDbError::Leapsecond {
        template: LSK_TEMPLATE.to_string(),
        source,
    })?;
    let lsk = lsk.ok_or_else(|| KernelDbError::Leapsecond {
        template: LSK_TEMPLATE.to_string(),
        source: VersionError::NotVersioned {
            path: LSK_TEMPLATE.to_string(),
        },
    })?;

    let mut dependencies = Group::new("Dependencies");
    dependencies.push(Keyword::new("LeapsecondKernel", lsk));
    Ok(dependencies)
}

/// A copy of `group` with every versioned `File` value resolved, built as new
/// keywords rather than by indexing into a clone.
fn resolve_selection(group: &Group, area: &DataArea) -> Result<(Group, bool), KernelDbError> {
    let mut resolved = Group::new(group.name.clone());
    resolved.comments = group.comments.clone();

    let mut rewrote = false;
    for keyword in &group.keywords {
        let replacement = match keyword.single_value() {
            Some(value) if keyword.is_named("File") => resolve_in_place(area, value).map_err(
                |source| KernelDbError::SelectionFile {
                    group: group.name.clone(),
                    value: value.to_string(),
                    source,
                },
            )?,
            _ => None,
        };

        match replacement {
            Some(value) => {
                rewrote = true;
                let mut latest = Keyword::new(keyword.name.clone(), value);
                latest.comments = keyword.comments.clone();
                resolved.push(latest);
            }
            None => resolved.push(keyword.clone()),
        }
    }
    Ok((resolved, rewrote))
}

/// Resolve a versioned value to its highest match, keeping the value's own
/// directory prefix. `Ok(None)` when the value is already concrete.
fn resolve_in_place(area: &DataArea, value: &str) -> Result<Option<String>, VersionError> {
    let versioned = VersionedPath::new(area.expand(value));
    if !versioned.is_versioned() {
        return Ok(None);
    }
    let name = versioned.highest_name()?;
    Ok(Some(match value.rsplit_once('/') {
        Some((dir, _)) => format!("{dir}/{name}"),
        None => name,
    }))
}
