//! `orrery pckgen`: refresh the PCK kernel database.
//!
//! Nothing is written until the refreshed document is fully built; any
//! resolution or parse failure aborts before the output path is touched.

use anyhow::{Context, Result};
use colored::Colorize;
use std::fs;
use std::path::{Path, PathBuf};

use orrery_core::datadir::DataArea;
use orrery_core::kerneldb::{current_run_time, refresh_kernel_db, PCK_DB_TEMPLATE};
use orrery_core::versioned::VersionedPath;
use orrery_pvl::Document;

pub fn cmd_pckgen(from: Option<&Path>, to: Option<&Path>) -> Result<()> {
    let area = DataArea::from_env()?;

    let input = match from {
        Some(path) => path.to_path_buf(),
        None => VersionedPath::new(area.expand(PCK_DB_TEMPLATE))
            .highest()
            .context("resolving the input kernel database")?,
    };

    let text = fs::read_to_string(&input)
        .with_context(|| format!("reading {}", input.display()))?;
    let db = Document::parse(&text)
        .with_context(|| format!("parsing {}", input.display()))?;

    let latest = refresh_kernel_db(&db, &area, &current_run_time())?;

    let output = output_path(&area, to)?;
    fs::write(&output, latest.to_string())
        .with_context(|| format!("writing {}", output.display()))?;

    eprintln!(
        "{} {}",
        "wrote".green().bold(),
        output.display().to_string().bold()
    );
    Ok(())
}

fn output_path(area: &DataArea, to: Option<&Path>) -> Result<PathBuf> {
    match to {
        Some(path) => Ok(path.to_path_buf()),
        None => VersionedPath::new(area.expand(PCK_DB_TEMPLATE))
            .next()
            .context("allocating the output kernel database version"),
    }
}
