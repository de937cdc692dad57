//! End-to-end conversion: project document in, cleaned report out.

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use tempfile::NamedTempFile;
use tracing::{debug, info};

use crate::config::Config;
use crate::debug_trace::PipelineTrace;
use crate::error::PipelineError;
use crate::executor::{run_stages, run_stages_traced};
use crate::project::load_project;
use crate::record::{ModuleRecord, TextBlock, assemble};
use crate::stage::report_stages;

/// Outcome of a successful run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConversionSummary {
    pub module_count: usize,
    pub output: PathBuf,
}

fn assemble_records(records: &[ModuleRecord]) -> String {
    let blocks: Vec<TextBlock> = records.iter().map(TextBlock::from).collect();
    assemble(&blocks)
}

/// Render module records into the final cleaned report text.
pub fn render_report(records: &[ModuleRecord]) -> String {
    run_stages(assemble_records(records), &report_stages())
}

/// Render module records, capturing the text after every stage.
pub fn render_report_traced(records: &[ModuleRecord]) -> (String, PipelineTrace) {
    run_stages_traced(assemble_records(records), &report_stages())
}

fn write_error(path: &Path, source: std::io::Error) -> PipelineError {
    PipelineError::Write {
        path: path.to_path_buf(),
        source,
    }
}

/// Write `contents` to `path` through a temporary file in the same
/// directory, so a failed write never leaves a partial report behind.
pub fn write_atomic(path: &Path, contents: &str) -> Result<(), PipelineError> {
    let parent = match path.parent() {
        Some(p) if !p.as_os_str().is_empty() => p,
        _ => Path::new("."),
    };
    fs::create_dir_all(parent).map_err(|e| write_error(path, e))?;

    let mut tmp = NamedTempFile::new_in(parent).map_err(|e| write_error(path, e))?;
    tmp.write_all(contents.as_bytes())
        .map_err(|e| write_error(path, e))?;
    tmp.persist(path).map_err(|e| write_error(path, e.error))?;
    Ok(())
}

fn dump_stages(dir: &Path, trace: &PipelineTrace) -> Result<(), PipelineError> {
    for (idx, point) in trace.pipe_points.iter().enumerate() {
        let path = dir.join(PipelineTrace::file_name(idx, &point.stage_name));
        write_atomic(&path, &point.text)?;
        debug!(path = %path.display(), lines = point.line_count, "stage dumped");
    }
    Ok(())
}

/// Run the whole conversion described by `config`.
///
/// Document-level failures abort before anything is written.
pub fn convert(config: &Config) -> Result<ConversionSummary, PipelineError> {
    let records = load_project(&config.input)?;

    let report = match &config.stage_dump {
        Some(dir) => {
            let (report, trace) = render_report_traced(&records);
            dump_stages(dir, &trace)?;
            report
        }
        None => render_report(&records),
    };

    write_atomic(&config.output, &report)?;
    info!(
        modules = records.len(),
        output = %config.output.display(),
        "successfully processed and cleaned modules"
    );

    Ok(ConversionSummary {
        module_count: records.len(),
        output: config.output.clone(),
    })
}
