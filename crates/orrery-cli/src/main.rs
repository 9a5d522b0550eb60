//! Orrery CLI
//!
//! Command-line interface for:
//! - Refreshing the PCK kernel database (`pckgen`)
//! - Checking kernel database files (`check`)
//! - Reporting the installed toolkit version (`version`)

use anyhow::{anyhow, Context, Result};
use clap::{Parser, Subcommand};
use colored::Colorize;
use orrery_pvl::Document;
use std::path::{Path, PathBuf};

mod pckgen;

#[derive(Parser)]
#[command(name = "orrery")]
#[command(author, version, about = "Orrery: planetary kernel database utilities")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Rewrite the PCK kernel database, resolving versioned file names for
    /// legacy consumers.
    Pckgen {
        /// Input kernel database (default: highest version of the PCK
        /// database template in the data area).
        #[arg(long)]
        from: Option<PathBuf>,
        /// Output path (default: next unused version of the same template).
        #[arg(long)]
        to: Option<PathBuf>,
    },

    /// Parse a kernel database file and report its structure.
    Check {
        /// Input kernel database file.
        input: PathBuf,
    },

    /// Print the installed toolkit version.
    Version,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();
    match cli.command {
        Commands::Pckgen { from, to } => pckgen::cmd_pckgen(from.as_deref(), to.as_deref()),
        Commands::Check { input } => cmd_check(&input),
        Commands::Version => cmd_version(),
    }
}

fn cmd_check(input: &PathBuf) -> Result<()> {
    let text = std::fs::read_to_string(input)
        .with_context(|| format!("reading {}", input.display()))?;
    let db = Document::parse(&text)
        .with_context(|| format!("parsing {}", input.display()))?;

    let report = check_report(&db, input)?;
    println!("{} {report}", "ok".green().bold());
    Ok(())
}

/// Structure summary for a parsed kernel database; errors (before anything is
/// reported) when the required object is absent.
fn check_report(db: &Document, input: &Path) -> Result<String> {
    if db.find_object(orrery_core::kerneldb::TARGET_OBJECT).is_none() {
        return Err(anyhow!(
            "{} has no `{}` object",
            input.display(),
            orrery_core::kerneldb::TARGET_OBJECT
        ));
    }

    let objects = db.objects.len();
    let groups: usize = db.objects.iter().map(|o| o.groups.len()).sum();
    let keywords: usize = db
        .objects
        .iter()
        .map(|o| {
            o.keywords.len()
                + o.groups.iter().map(|g| g.keywords.len()).sum::<usize>()
        })
        .sum::<usize>()
        + db.keywords.len();

    Ok(format!(
        "{}: {objects} objects, {groups} groups, {keywords} keywords",
        input.display()
    ))
}

fn cmd_version() -> Result<()> {
    let version = orrery_core::environment::toolkit_version()?;
    println!("{version}");
    println!(
        "user {} on {}",
        orrery_core::environment::user_name(),
        orrery_core::environment::host_name()
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn check_report_fails_before_reporting_on_missing_object() {
        let db = Document::parse("Object = SomethingElse\nEnd_Object\nEnd\n").unwrap();
        assert!(check_report(&db, Path::new("kernels.db")).is_err());
    }

    #[test]
    fn check_report_counts_structure() {
        let db = Document::parse(
            "Object = TargetAttitudeShape\n  Group = Selection\n    File = x\n  End_Group\nEnd_Object\nEnd\n",
        )
        .unwrap();
        let report = check_report(&db, Path::new("kernels.db")).unwrap();
        assert!(report.contains("1 objects"), "report={report}");
        assert!(report.contains("1 groups"), "report={report}");
        assert!(report.contains("1 keywords"), "report={report}");
    }
}
