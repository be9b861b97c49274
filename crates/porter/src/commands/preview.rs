//! `porter preview` command implementation.

use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use chrono::Local;
use clap::Args;
use porter_config::Config;
use porter_essay::{ConvertOptions, convert_document, post_stem};
use porter_markup::AttributeAudit;

use super::validate_date;
use crate::error::CliError;
use crate::output::Output;

/// Arguments for the preview command.
#[derive(Args)]
pub(crate) struct PreviewArgs {
    /// Essay body file to convert.
    file: PathBuf,

    /// Date prefix of the post (default: today).
    #[arg(long)]
    date: Option<String>,

    /// Post name (default: the essay directory name).
    #[arg(long)]
    name: Option<String>,

    /// Path to configuration file (default: auto-discover porter.toml).
    #[arg(short, long)]
    config: Option<PathBuf>,
}

impl PreviewArgs {
    /// Execute the preview command.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or converted.
    pub(crate) fn execute(self) -> Result<(), CliError> {
        let output = Output::new();

        let date = match self.date {
            Some(date) => {
                validate_date(&date)?;
                date
            }
            None => Local::now().format("%Y-%m-%d").to_string(),
        };
        let name = match self.name {
            Some(name) => name,
            None => default_name(&self.file)?,
        };

        let config = Config::load(self.config.as_deref(), None)?;
        let options = ConvertOptions {
            media_subpath_prefix: config.front_matter.media_subpath_prefix,
            rewrite_links: config.convert_resolved.rewrite_links,
        };

        let source = fs::read_to_string(&self.file)?;
        let mut audit = AttributeAudit::new();
        let post = convert_document(&source, &post_stem(&date, &name), &options, &mut audit)?;

        let mut stdout = io::stdout().lock();
        stdout.write_all(post.as_bytes())?;
        stdout.flush()?;

        output.audit(&audit);
        Ok(())
    }
}

/// Name of the directory holding `file`, or the file stem for a bare file.
fn default_name(file: &Path) -> Result<String, CliError> {
    let dir_name = fs::canonicalize(file)
        .ok()
        .and_then(|p| p.parent().and_then(Path::file_name).map(ToOwned::to_owned));
    dir_name
        .or_else(|| file.file_stem().map(ToOwned::to_owned))
        .map(|n| n.to_string_lossy().into_owned())
        .ok_or_else(|| {
            CliError::Validation(format!(
                "Cannot derive a post name from {}, use --name",
                file.display()
            ))
        })
}
