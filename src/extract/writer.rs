//! Write decoded entries for one destination directory.

use std::path::{Path, PathBuf};

use tracing::{info, warn};

use crate::error::{MsgError, Result};
use crate::model::entry::{FileFailure, WrittenEntry};
use crate::naming::registry::NameRegistry;
use crate::naming::resolver::resolve_name;
use crate::parser::container::{read_container, ContainerParser};

use super::plan::OutputJob;
use super::ExtractReport;

/// Sequential writer for one destination directory.
///
/// Holds one registry for the directory itself and one for its messages
/// subfolder; both are dropped with the writer.
pub struct DirectoryWriter<'p> {
    parser: &'p ContainerParser,
    dest: PathBuf,
    messages: PathBuf,
    messages_ready: bool,
    plain_names: NameRegistry,
    tagged_names: NameRegistry,
}

impl<'p> DirectoryWriter<'p> {
    /// Create the destination directory and a writer for it.
    pub fn create(parser: &'p ContainerParser, dest: &Path, messages_dir: &str) -> Result<Self> {
        std::fs::create_dir_all(dest).map_err(|e| MsgError::output(dest, e))?;
        Ok(Self {
            parser,
            dest: dest.to_path_buf(),
            messages: dest.join(messages_dir),
            messages_ready: false,
            plain_names: NameRegistry::new(),
            tagged_names: NameRegistry::new(),
        })
    }

    /// Parse one `.msg` file and write its text as `<name>.txt`.
    ///
    /// An existing file with the same name from an earlier run is overwritten.
    pub fn extract_file(&mut self, source: &Path) -> Result<WrittenEntry> {
        let raw = read_container(source)?;
        let entry = self.parser.parse(&raw)?;
        let resolved = resolve_name(&entry, source, self.parser.encoding())?;
        let tagged = entry.is_tagged_message();

        let (dir, registry) = if tagged {
            if !self.messages_ready {
                std::fs::create_dir_all(&self.messages)
                    .map_err(|e| MsgError::output(&self.messages, e))?;
                self.messages_ready = true;
            }
            (&self.messages, &mut self.tagged_names)
        } else {
            (&self.dest, &mut self.plain_names)
        };

        let name = registry.make_unique(resolved.name);
        let output = dir.join(format!("{name}.txt"));
        std::fs::write(&output, entry.text.as_bytes())
            .map_err(|e| MsgError::output(&output, e))?;

        info!(
            source = %source.display(),
            output = %output.display(),
            tagged,
            "Extracted entry"
        );

        Ok(WrittenEntry {
            source: source.to_path_buf(),
            output,
            name,
            name_source: resolved.source,
            tagged,
            bytes: entry.text.len() as u64,
        })
    }
}

/// Extract every file of `job` in order, recording per-file failures.
///
/// `tick` is called once per file, whatever the outcome.
pub fn extract_job(
    job: &OutputJob,
    parser: &ContainerParser,
    messages_dir: &str,
    tick: &dyn Fn(),
) -> ExtractReport {
    let mut report = ExtractReport::default();

    let mut writer = match DirectoryWriter::create(parser, &job.dest, messages_dir) {
        Ok(w) => w,
        Err(e) => {
            warn!(dest = %job.dest.display(), error = %e, "Cannot create output directory");
            for source in &job.files {
                report.failures.push(failure(source, &e));
                tick();
            }
            return report;
        }
    };

    for source in &job.files {
        match writer.extract_file(source) {
            Ok(written) => report.written.push(written),
            Err(e) => {
                warn!(path = %source.display(), error = %e, "Skipping file");
                report.failures.push(failure(source, &e));
            }
        }
        tick();
    }
    report
}

fn failure(source: &Path, error: &MsgError) -> FileFailure {
    FileFailure {
        source: source.to_path_buf(),
        kind: error.kind(),
        error: error.to_string(),
    }
}
