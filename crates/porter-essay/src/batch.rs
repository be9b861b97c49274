//! Batch conversion of an essay tree.
//!
//! Every document is converted with its own [`AttributeAudit`]; the audit is
//! merged into the batch total only when the post was written, so skipped
//! documents never show up in the report.

use std::fs;
use std::path::{Path, PathBuf};

use porter_markup::AttributeAudit;
use rayon::prelude::*;

use crate::date::CreationDate;
use crate::document::{ConvertOptions, convert_document, post_stem};
use crate::scanner::{EssayRef, Scanner};
use crate::{BatchError, DocumentError};

/// Batch configuration.
#[derive(Debug, Clone)]
pub struct BatchConfig {
    /// Root of the essay tree.
    pub source_dir: PathBuf,
    /// Directory receiving `<date>-<name>.md` posts.
    pub dest_dir: PathBuf,
    /// Essay body file name inside each essay directory.
    pub body_filename: String,
    /// Cap on documents. [`Batch::run`] counts written posts,
    /// [`Batch::run_parallel`] counts attempted documents.
    pub max: Option<usize>,
    pub options: ConvertOptions,
}

/// A written post.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Converted {
    /// 1-based position among converted documents.
    pub index: usize,
    pub source: PathBuf,
    pub dest: PathBuf,
}

/// A skipped document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Failed {
    pub source: PathBuf,
    pub message: String,
}

/// Result of one document, in processing order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    Converted(Converted),
    Failed(Failed),
}

/// Outcome of a batch run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BatchReport {
    outcomes: Vec<Outcome>,
    converted: usize,
}

impl BatchReport {
    /// Every outcome in processing order.
    #[must_use]
    pub fn outcomes(&self) -> &[Outcome] {
        &self.outcomes
    }

    /// Written posts.
    pub fn converted(&self) -> impl Iterator<Item = &Converted> {
        self.outcomes.iter().filter_map(|o| match o {
            Outcome::Converted(c) => Some(c),
            Outcome::Failed(_) => None,
        })
    }

    /// Skipped documents.
    pub fn failed(&self) -> impl Iterator<Item = &Failed> {
        self.outcomes.iter().filter_map(|o| match o {
            Outcome::Failed(f) => Some(f),
            Outcome::Converted(_) => None,
        })
    }

    #[must_use]
    pub fn converted_count(&self) -> usize {
        self.converted
    }

    #[must_use]
    pub fn failed_count(&self) -> usize {
        self.outcomes.len() - self.converted
    }

    fn push(&mut self, essay: &EssayRef, result: Result<PathBuf, DocumentError>) {
        let outcome = match result {
            Ok(dest) => {
                self.converted += 1;
                let index = self.converted;
                tracing::info!(
                    index,
                    source = %essay.body_path.display(),
                    dest = %dest.display(),
                    "Converted"
                );
                Outcome::Converted(Converted {
                    index,
                    source: essay.body_path.clone(),
                    dest,
                })
            }
            Err(e) => {
                tracing::warn!(
                    source = %essay.body_path.display(),
                    error = %e,
                    "Skipping document"
                );
                Outcome::Failed(Failed {
                    source: essay.body_path.clone(),
                    message: e.to_string(),
                })
            }
        };
        self.outcomes.push(outcome);
    }
}

/// Converts every essay under a source tree into posts.
pub struct Batch {
    config: BatchConfig,
}

impl Batch {
    #[must_use]
    pub fn new(config: BatchConfig) -> Self {
        Self { config }
    }

    /// Convert essays one after another.
    ///
    /// Stops once `max` posts have been written. Failed documents do not
    /// count towards `max`.
    ///
    /// # Errors
    ///
    /// Returns an error if the source directory is missing or the
    /// destination directory cannot be created.
    pub fn run(
        &self,
        dates: &dyn CreationDate,
        audit: &mut AttributeAudit,
    ) -> Result<BatchReport, BatchError> {
        let essays = self.prepare()?;
        let mut report = BatchReport::default();

        for essay in &essays {
            if self.config.max.is_some_and(|max| report.converted_count() >= max) {
                break;
            }
            let mut local = AttributeAudit::new();
            let result = self.convert_one(essay, dates, &mut local);
            if result.is_ok() {
                audit.merge(local);
            }
            report.push(essay, result);
        }
        Ok(report)
    }

    /// Convert essays on the rayon thread pool.
    ///
    /// The essay list is truncated to `max` before dispatch, so failures
    /// reduce the number of written posts. Outcomes are reported in source
    /// order.
    ///
    /// # Errors
    ///
    /// Returns an error if the source directory is missing or the
    /// destination directory cannot be created.
    pub fn run_parallel(
        &self,
        dates: &dyn CreationDate,
        audit: &mut AttributeAudit,
    ) -> Result<BatchReport, BatchError> {
        let mut essays = self.prepare()?;
        if let Some(max) = self.config.max {
            essays.truncate(max);
        }

        let (mut results, worker_audit) = essays
            .par_iter()
            .enumerate()
            .fold(
                || (Vec::new(), AttributeAudit::new()),
                |(mut results, mut worker), (i, essay)| {
                    let mut local = AttributeAudit::new();
                    let result = self.convert_one(essay, dates, &mut local);
                    if result.is_ok() {
                        worker.merge(local);
                    }
                    results.push((i, result));
                    (results, worker)
                },
            )
            .reduce(
                || (Vec::new(), AttributeAudit::new()),
                |(mut results, mut total), (more, worker)| {
                    results.extend(more);
                    total.merge(worker);
                    (results, total)
                },
            );
        audit.merge(worker_audit);

        results.sort_by_key(|(i, _)| *i);
        let mut report = BatchReport::default();
        for (i, result) in results {
            report.push(&essays[i], result);
        }
        Ok(report)
    }

    fn prepare(&self) -> Result<Vec<EssayRef>, BatchError> {
        if !self.config.source_dir.is_dir() {
            return Err(BatchError::SourceNotFound(self.config.source_dir.clone()));
        }
        fs::create_dir_all(&self.config.dest_dir).map_err(|source| BatchError::CreateDest {
            path: self.config.dest_dir.clone(),
            source,
        })?;
        let scanner = Scanner::new(
            self.config.source_dir.clone(),
            self.config.body_filename.clone(),
        );
        let essays = scanner.scan();
        tracing::debug!(
            count = essays.len(),
            source_dir = %self.config.source_dir.display(),
            "Found essays"
        );
        Ok(essays)
    }

    fn convert_one(
        &self,
        essay: &EssayRef,
        dates: &dyn CreationDate,
        audit: &mut AttributeAudit,
    ) -> Result<PathBuf, DocumentError> {
        let date = dates
            .creation_date(&essay.dir)
            .map_err(|source| DocumentError::CreationDate {
                path: essay.dir.clone(),
                source,
            })?;
        let stem = post_stem(&date, &essay.name);
        let source = read(&essay.body_path)?;
        let post = convert_document(&source, &stem, &self.config.options, audit)?;

        let dest = self.config.dest_dir.join(format!("{stem}.md"));
        fs::write(&dest, post).map_err(|source| DocumentError::Write {
            path: dest.clone(),
            source,
        })?;
        Ok(dest)
    }
}

fn read(path: &Path) -> Result<String, DocumentError> {
    fs::read_to_string(path).map_err(|source| DocumentError::Read {
        path: path.to_path_buf(),
        source,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::FixedDate;
    use porter_markup::AuditDomain;
    use pretty_assertions::assert_eq;

    const GOOD: &str = "---\ntitle: Tea\n---\n`header img=tea.jpg`\n`image src=a.jpg width=3`\n";
    const NO_IMAGE: &str = "`header title=Tea`\n`image src=a.jpg height=3`\n";

    fn write_essay(root: &Path, name: &str, body: &str) {
        let dir = root.join(name);
        fs::create_dir_all(&dir).unwrap();
        fs::write(dir.join("index.md"), body).unwrap();
    }

    fn setup(essays: &[(&str, &str)]) -> (tempfile::TempDir, BatchConfig) {
        let temp_dir = tempfile::tempdir().unwrap();
        let source_dir = temp_dir.path().join("essays");
        fs::create_dir(&source_dir).unwrap();
        for (name, body) in essays {
            write_essay(&source_dir, name, body);
        }
        let config = BatchConfig {
            source_dir,
            dest_dir: temp_dir.path().join("out/_posts"),
            body_filename: "index.md".to_owned(),
            max: None,
            options: ConvertOptions::default(),
        };
        (temp_dir, config)
    }

    fn date() -> FixedDate {
        FixedDate::new("2021-03-04")
    }

    #[test]
    fn test_run_writes_posts() {
        let (_temp, config) = setup(&[("tea", GOOD), ("coffee", GOOD)]);
        let dest_dir = config.dest_dir.clone();
        let mut audit = AttributeAudit::new();

        let report = Batch::new(config).run(&date(), &mut audit).unwrap();

        assert_eq!(report.converted_count(), 2);
        let converted: Vec<_> = report.converted().collect();
        assert_eq!(converted[0].index, 1);
        assert!(converted[0].dest.ends_with("2021-03-04-coffee.md"));
        assert!(converted[1].source.ends_with("tea/index.md"));

        let post = fs::read_to_string(dest_dir.join("2021-03-04-tea.md")).unwrap();
        assert!(post.starts_with(
            "---\ntitle: Tea\nmedia_subpath: /assets/posts/2021-03-04-tea\nimage:\n  path: tea.jpg\n---\n"
        ));
        assert_eq!(audit.count(AuditDomain::Image, "width"), 2);
    }

    #[test]
    fn test_run_continues_after_failure() {
        let (_temp, config) = setup(&[("a-bad", NO_IMAGE), ("b-good", GOOD)]);
        let dest_dir = config.dest_dir.clone();
        let mut audit = AttributeAudit::new();

        let report = Batch::new(config).run(&date(), &mut audit).unwrap();

        assert_eq!(report.converted_count(), 1);
        let failed: Vec<_> = report.failed().collect();
        assert_eq!(failed.len(), 1);
        assert!(failed[0].source.ends_with("a-bad/index.md"));
        assert!(failed[0].message.contains("img"));
        assert!(!dest_dir.join("2021-03-04-a-bad.md").exists());
        assert_eq!(audit.count(AuditDomain::Image, "height"), 0);
        assert_eq!(audit.count(AuditDomain::Image, "width"), 1);
    }

    #[test]
    fn test_run_honors_max() {
        let (_temp, mut config) = setup(&[("a", NO_IMAGE), ("b", GOOD), ("c", GOOD), ("d", GOOD)]);
        config.max = Some(2);
        let mut audit = AttributeAudit::new();

        let report = Batch::new(config).run(&date(), &mut audit).unwrap();

        assert_eq!(report.converted_count(), 2);
        assert_eq!(report.failed_count(), 1);
        assert_eq!(report.outcomes().len(), 3);
    }

    #[test]
    fn test_report_counts_and_indexes() {
        let (_temp, config) = setup(&[("a", GOOD), ("b", NO_IMAGE), ("c", GOOD), ("d", NO_IMAGE)]);
        let report = Batch::new(config).run(&date(), &mut AttributeAudit::new()).unwrap();

        assert_eq!(report.converted_count(), 2);
        assert_eq!(report.failed_count(), 2);
        assert_eq!(report.converted().count(), report.converted_count());
        let indexes: Vec<_> = report.converted().map(|c| c.index).collect();
        assert_eq!(indexes, vec![1, 2]);
    }

    #[test]
    fn test_run_missing_source() {
        let (_temp, mut config) = setup(&[]);
        config.source_dir.push("missing");
        let result = Batch::new(config).run(&date(), &mut AttributeAudit::new());
        assert!(matches!(result, Err(BatchError::SourceNotFound(_))));
    }

    #[test]
    fn test_run_empty_tree_creates_dest() {
        let (_temp, config) = setup(&[]);
        let dest_dir = config.dest_dir.clone();
        let report = Batch::new(config).run(&date(), &mut AttributeAudit::new()).unwrap();
        assert!(report.outcomes().is_empty());
        assert!(dest_dir.is_dir());
    }

    #[test]
    fn test_run_parallel_matches_sequential() {
        let essays = [("a", GOOD), ("b", NO_IMAGE), ("c", GOOD), ("d", GOOD), ("e", GOOD)];
        let (_seq_temp, seq_config) = setup(&essays);
        let (_par_temp, par_config) = setup(&essays);
        let mut seq_audit = AttributeAudit::new();
        let mut par_audit = AttributeAudit::new();

        let seq = Batch::new(seq_config).run(&date(), &mut seq_audit).unwrap();
        let par = Batch::new(par_config).run_parallel(&date(), &mut par_audit).unwrap();

        assert_eq!(par_audit, seq_audit);
        assert_eq!(par.converted_count(), 4);
        assert_eq!(par.failed_count(), 1);
        let names = |r: &BatchReport| -> Vec<String> {
            r.converted()
                .map(|c| c.dest.file_name().unwrap().to_string_lossy().into_owned())
                .collect()
        };
        assert_eq!(names(&par), names(&seq));
        let indexes: Vec<_> = par.converted().map(|c| c.index).collect();
        assert_eq!(indexes, vec![1, 2, 3, 4]);
    }

    #[test]
    fn test_run_parallel_truncates_to_max() {
        let (_temp, mut config) = setup(&[("a", NO_IMAGE), ("b", GOOD), ("c", GOOD)]);
        config.max = Some(2);
        let report = Batch::new(config)
            .run_parallel(&date(), &mut AttributeAudit::new())
            .unwrap();
        assert_eq!(report.outcomes().len(), 2);
        assert_eq!(report.converted_count(), 1);
    }
}
