//! Batch extraction: plan the input tree, then write every entry.
//!
//! Each output directory is one job, run sequentially on a single worker
//! with its own name registries. Jobs run in parallel on a rayon pool.

pub mod plan;
pub mod writer;

use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};

use rayon::prelude::*;
use serde::Serialize;
use tracing::{info, warn};

use crate::config::Config;
use crate::error::{MsgError, Result};
use crate::model::entry::{FileFailure, Layout, NameSource, WrittenEntry};
use crate::naming::resolver::resolve_name;
use crate::parser::container::{read_container, ContainerParser};
use crate::parser::text::LegacyEncoding;

use self::plan::ExtractPlan;

/// Immutable settings for one extraction run.
#[derive(Debug, Clone)]
pub struct ExtractOptions {
    pub input: PathBuf,
    pub output: PathBuf,
    pub encoding: LegacyEncoding,
    pub languages: Vec<String>,
    pub misc_dir: String,
    pub messages_dir: String,
    /// Worker threads (0 = rayon default).
    pub threads: usize,
}

impl ExtractOptions {
    /// Build options from the loaded configuration.
    pub fn from_config(
        config: &Config,
        input: impl Into<PathBuf>,
        output: impl Into<PathBuf>,
    ) -> Self {
        Self {
            input: input.into(),
            output: output.into(),
            encoding: config.extract.legacy_encoding,
            languages: config.extract.languages.clone(),
            misc_dir: config.extract.misc_dir.clone(),
            messages_dir: config.extract.messages_dir.clone(),
            threads: config.performance.threads,
        }
    }
}

/// Outcome of an extraction run.
#[derive(Debug, Clone, Default, Serialize)]
pub struct ExtractReport {
    pub written: Vec<WrittenEntry>,
    pub failures: Vec<FileFailure>,
}

impl ExtractReport {
    fn merge(&mut self, other: ExtractReport) {
        self.written.extend(other.written);
        self.failures.extend(other.failures);
    }

    /// Total bytes of text written.
    pub fn bytes_written(&self) -> u64 {
        self.written.iter().map(|w| w.bytes).sum()
    }

    /// Number of entries routed to a messages subfolder.
    pub fn tagged_count(&self) -> usize {
        self.written.iter().filter(|w| w.tagged).count()
    }
}

/// Scan the input directory and build the extraction plan.
pub fn plan(opts: &ExtractOptions) -> Result<ExtractPlan> {
    if !opts.input.is_dir() {
        return Err(MsgError::InputNotFound(opts.input.clone()));
    }
    let dirs = plan::scan_input(&opts.input)?;
    Ok(plan::build_plan(dirs, opts))
}

/// Run every job of `plan`.
///
/// `progress` receives `(files_done, files_total)` after each file.
pub fn execute(
    plan: &ExtractPlan,
    opts: &ExtractOptions,
    progress: Option<&(dyn Fn(usize, usize) + Sync)>,
) -> ExtractReport {
    let parser = ContainerParser::new(opts.encoding);
    let total = plan.total_files();
    let done = AtomicUsize::new(0);
    let tick = || {
        let n = done.fetch_add(1, Ordering::Relaxed) + 1;
        if let Some(cb) = progress {
            cb(n, total);
        }
    };

    info!(
        jobs = plan.jobs.len(),
        files = total,
        encoding = %opts.encoding,
        "Extracting"
    );

    let run_jobs = || -> Vec<ExtractReport> {
        plan.jobs
            .par_iter()
            .map(|job| writer::extract_job(job, &parser, &opts.messages_dir, &tick))
            .collect()
    };

    let reports = if opts.threads > 0 {
        match rayon::ThreadPoolBuilder::new()
            .num_threads(opts.threads)
            .build()
        {
            Ok(pool) => pool.install(run_jobs),
            Err(e) => {
                warn!(error = %e, "Could not build thread pool, using the global one");
                run_jobs()
            }
        }
    } else {
        run_jobs()
    };

    let mut report = ExtractReport::default();
    for r in reports {
        report.merge(r);
    }

    info!(
        written = report.written.len(),
        failed = report.failures.len(),
        "Extraction finished"
    );
    report
}

/// Plan and execute in one call.
pub fn run(
    opts: &ExtractOptions,
    progress: Option<&(dyn Fn(usize, usize) + Sync)>,
) -> Result<ExtractReport> {
    let plan = plan(opts)?;
    Ok(execute(&plan, opts, progress))
}

/// What a single container looks like, without writing anything.
#[derive(Debug, Clone, Serialize)]
pub struct Inspection {
    pub source: PathBuf,
    pub size: u64,
    pub layout: Layout,
    pub header_magic: u32,
    pub payload_len: usize,
    pub footer_len: Option<usize>,
    pub name: String,
    pub name_source: NameSource,
    pub text: String,
}

/// Parse one `.msg` file and report its layout and resolved name.
pub fn inspect(path: &Path, encoding: LegacyEncoding) -> Result<Inspection> {
    let raw = read_container(path)?;
    let parser = ContainerParser::new(encoding);
    let entry = parser.parse(&raw)?;
    let resolved = resolve_name(&entry, path, encoding)?;
    Ok(Inspection {
        source: path.to_path_buf(),
        size: raw.len() as u64,
        layout: entry.layout,
        header_magic: entry.header_magic(),
        payload_len: entry.payload.len(),
        footer_len: entry.footer.map(<[u8]>::len),
        name: resolved.name,
        name_source: resolved.source,
        text: entry.text,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::container::HEADER_SIZE;

    #[test]
    fn test_plan_missing_input() {
        let opts = ExtractOptions::from_config(&Config::default(), "/no/such/input", "/tmp");
        assert!(matches!(plan(&opts), Err(MsgError::InputNotFound(_))));
    }

    #[test]
    fn test_inspect_plain() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("0007.msg");
        let mut raw = vec![0u8; HEADER_SIZE];
        raw.extend_from_slice(b"plain text\0");
        std::fs::write(&path, raw).unwrap();

        let info = inspect(&path, LegacyEncoding::Iso8859_1).unwrap();
        assert_eq!(info.layout, Layout::Plain);
        assert_eq!(info.name, "0007");
        assert_eq!(info.text, "plain text");
        assert_eq!(info.payload_len, 11);
        assert_eq!(info.footer_len, None);
    }

    #[test]
    fn test_report_totals() {
        let mut report = ExtractReport::default();
        for (bytes, tagged) in [(3, false), (5, true)] {
            report.written.push(WrittenEntry {
                source: PathBuf::from("a.msg"),
                output: PathBuf::from("a.txt"),
                name: "a".into(),
                name_source: NameSource::SourceFile,
                tagged,
                bytes,
            });
        }
        assert_eq!(report.bytes_written(), 8);
        assert_eq!(report.tagged_count(), 1);
    }
}
