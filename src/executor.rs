//! Stage-at-a-time pipeline executor.
//!
//! Every stage receives the complete output of the previous stage; nothing
//! is streamed between stages.

use tracing::debug;

use crate::debug_trace::{PipelineTrace, StageSnapshot};
use crate::stage::TextStage;

/// Name recorded for the pipe point in front of the first stage.
pub const SOURCE_NAME: &str = "assemble";

fn run_stage(stage: &dyn TextStage, text: &str) -> String {
    let output = stage.apply(text);
    debug!(
        stage = stage.name(),
        lines_in = text.lines().count(),
        lines_out = output.lines().count(),
        "stage complete"
    );
    output
}

/// Run `text` through the stages in order.
pub fn run_stages(text: String, stages: &[Box<dyn TextStage>]) -> String {
    stages
        .iter()
        .fold(text, |current, stage| run_stage(&**stage, &current))
}

/// Run `text` through the stages, capturing the text at every pipe point.
pub fn run_stages_traced(
    text: String,
    stages: &[Box<dyn TextStage>],
) -> (String, PipelineTrace) {
    let mut trace = PipelineTrace::default();
    trace
        .pipe_points
        .push(StageSnapshot::new(SOURCE_NAME, text.clone()));

    let mut current = text;
    for stage in stages {
        current = run_stage(&**stage, &current);
        trace
            .pipe_points
            .push(StageSnapshot::new(stage.name(), current.clone()));
    }

    (current, trace)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::stage::{NarrowWrapStage, WideWrapStage, report_stages};

    #[test]
    fn test_no_stages_is_identity() {
        assert_eq!(run_stages("a\n\nb".to_string(), &[]), "a\n\nb");
    }

    #[test]
    fn test_stages_applied_in_order() {
        // Wide wrap drops the blank line, narrow wrap then splits the long one.
        let stages: Vec<Box<dyn TextStage>> = vec![
            Box::new(WideWrapStage::default()),
            Box::new(NarrowWrapStage { width: 4 }),
        ];
        let out = run_stages("abcdefgh\n\nij".to_string(), &stages);
        assert_eq!(out, "abcd\nefgh\nij");
    }

    #[test]
    fn test_traced_captures_pipe_points() {
        let stages = report_stages();
        let (output, trace) = run_stages_traced("Modulenaam : A\nxyz".to_string(), &stages);
        assert_eq!(trace.pipe_points.len(), stages.len() + 1);
        assert_eq!(trace.pipe_points[0].stage_name, SOURCE_NAME);
        assert_eq!(trace.pipe_points[0].text, "Modulenaam : A\nxyz");
        assert_eq!(trace.pipe_points.last().map(|p| p.text.as_str()), Some(output.as_str()));
    }

    #[test]
    fn test_traced_equivalence() {
        let input = "Module : VMB4RYLD 26\nAddress :  26\nModulenaam : Relay1\nAscii : \r\n.A.B.relay1.....\n________________________".to_string();
        let stages = report_stages();
        let plain = run_stages(input.clone(), &stages);
        let (traced, _trace) = run_stages_traced(input, &stages);
        assert_eq!(plain, traced);
    }
}
