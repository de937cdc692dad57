//! Run configuration, built once at startup and passed into the pipeline.

use std::path::{Path, PathBuf};

/// Suffix appended to the input file stem when no output path is given.
pub const DEFAULT_OUTPUT_SUFFIX: &str = "_vlp.txt";

/// Paths for a single conversion run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// The project XML document to read.
    pub input: PathBuf,
    /// Where the cleaned report is written.
    pub output: PathBuf,
    /// Directory receiving one file per pipeline stage, if set.
    pub stage_dump: Option<PathBuf>,
}

impl Config {
    /// Build a config, deriving the output path from the input when absent.
    pub fn new(input: PathBuf, output: Option<PathBuf>) -> Self {
        let output = output.unwrap_or_else(|| default_output_path(&input));
        Self {
            input,
            output,
            stage_dump: None,
        }
    }

    pub fn with_stage_dump(mut self, dir: Option<PathBuf>) -> Self {
        self.stage_dump = dir;
        self
    }
}

/// `MyProject.vlp` -> `MyProject_vlp.txt`, next to the input.
pub fn default_output_path(input: &Path) -> PathBuf {
    let stem = input
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    input.with_file_name(format!("{stem}{DEFAULT_OUTPUT_SUFFIX}"))
}
