//! `porter convert` command implementation.

use std::fs;
use std::path::{Path, PathBuf};

use clap::Args;
use porter_config::{CliSettings, Config};
use porter_essay::{
    Batch, BatchConfig, BatchReport, BirthTime, ConvertOptions, CreationDate, FixedDate, Outcome,
};
use porter_markup::AttributeAudit;

use super::validate_date;
use crate::error::CliError;
use crate::output::Output;

/// Arguments for the convert command.
#[derive(Args)]
pub(crate) struct ConvertArgs {
    /// Path to configuration file (default: auto-discover porter.toml).
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Essay source directory (overrides config).
    #[arg(short, long)]
    source_dir: Option<PathBuf>,

    /// Output directory for posts (overrides config).
    #[arg(short, long)]
    dest_dir: Option<PathBuf>,

    /// Stop after this many converted essays (overrides config). With
    /// --parallel, only the first N essays are attempted, so failures
    /// leave fewer posts.
    #[arg(short, long)]
    max: Option<usize>,

    /// Date prefix for every post instead of the directory birth time.
    #[arg(long)]
    date: Option<String>,

    /// Convert essays in parallel.
    #[arg(long)]
    parallel: bool,

    /// Prefix root-relative links with `{{ site.baseurl }}`.
    #[arg(long)]
    rewrite_links: bool,

    /// Write the unrecognized attribute counters to this JSON file.
    #[arg(long)]
    audit_json: Option<PathBuf>,
}

impl ConvertArgs {
    /// Execute the convert command.
    ///
    /// # Errors
    ///
    /// Returns an error if configuration fails, the source directory is
    /// missing, or the output directory cannot be created.
    pub(crate) fn execute(self) -> Result<(), CliError> {
        let output = Output::new();

        if let Some(date) = &self.date {
            validate_date(date)?;
        }

        let cli_settings = CliSettings {
            source_dir: self.source_dir,
            dest_dir: self.dest_dir,
            max: self.max,
            parallel: self.parallel.then_some(true),
            rewrite_links: self.rewrite_links.then_some(true),
        };
        let config = Config::load(self.config.as_deref(), Some(&cli_settings))?;
        let convert = &config.convert_resolved;
        tracing::debug!(config_path = ?config.config_path, "Loaded configuration");

        output.info(&format!("Source: {}", convert.source_dir.display()));
        output.info(&format!("Output: {}", convert.dest_dir.display()));

        let batch = Batch::new(BatchConfig {
            source_dir: convert.source_dir.clone(),
            dest_dir: convert.dest_dir.clone(),
            body_filename: convert.body_filename.clone(),
            max: convert.max,
            options: ConvertOptions {
                media_subpath_prefix: config.front_matter.media_subpath_prefix.clone(),
                rewrite_links: convert.rewrite_links,
            },
        });

        let dates: Box<dyn CreationDate> = match self.date {
            Some(date) => Box::new(FixedDate::new(date)),
            None => Box::new(BirthTime),
        };

        let mut audit = AttributeAudit::new();
        let report = if convert.parallel {
            batch.run_parallel(dates.as_ref(), &mut audit)?
        } else {
            batch.run(dates.as_ref(), &mut audit)?
        };

        print_report(&output, &report);
        output.audit(&audit);

        if let Some(path) = &self.audit_json {
            write_audit_json(path, &audit)?;
            output.info(&format!("Audit written to {}", path.display()));
        }
        Ok(())
    }
}

fn print_report(output: &Output, report: &BatchReport) {
    for outcome in report.outcomes() {
        match outcome {
            Outcome::Converted(c) => output.info(&format!(
                "{}: {} -> {}",
                c.index,
                c.source.display(),
                c.dest.display()
            )),
            Outcome::Failed(f) => {
                output.error(&format!("Skipped {}: {}", f.source.display(), f.message));
            }
        }
    }

    let converted = report.converted_count();
    let failed = report.failed_count();
    if failed == 0 {
        output.success(&format!("Converted {converted} essays"));
    } else {
        output.warning(&format!("Converted {converted} essays, skipped {failed}"));
    }
}

fn write_audit_json(path: &Path, audit: &AttributeAudit) -> Result<(), CliError> {
    let json = serde_json::to_string_pretty(audit)?;
    fs::write(path, json + "\n")?;
    Ok(())
}
