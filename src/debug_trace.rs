//! Debug trace types for the stage executor.
//!
//! A trace captures the full text at every pipe point so each stage's
//! effect on the report can be inspected or dumped to disk.

use crate::stage::split_lines;

/// The text present at one pipe point.
#[derive(Debug, Clone, PartialEq)]
pub struct StageSnapshot {
    /// Name of the stage that produced this text.
    pub stage_name: String,
    pub line_count: usize,
    pub text: String,
}

impl StageSnapshot {
    pub fn new(stage_name: &str, text: String) -> Self {
        Self {
            stage_name: stage_name.to_string(),
            line_count: split_lines(&text).len(),
            text,
        }
    }
}

/// Complete trace of one pipeline execution.
///
/// `pipe_points[0]` is the text entering the stage chain, `pipe_points[i]`
/// is the output of stage `i-1`. Length is `num_stages + 1`.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct PipelineTrace {
    pub pipe_points: Vec<StageSnapshot>,
}

impl PipelineTrace {
    pub fn stage_names(&self) -> Vec<&str> {
        self.pipe_points
            .iter()
            .map(|p| p.stage_name.as_str())
            .collect()
    }

    /// File name for pipe point `index`, e.g. `01-wide-wrap.txt`.
    pub fn file_name(index: usize, stage_name: &str) -> String {
        format!("{index:02}-{stage_name}.txt")
    }
}
