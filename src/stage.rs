//! Whole-text pipeline stages.
//!
//! Each stage consumes the complete output of the previous one and returns
//! a fully materialized text. Stage order matters: the dot normalizer and
//! the block filter depend on the line boundaries the wrappers produce.

use crate::superclean::SupercleanStage;

/// Width of the first wrapping pass.
pub const WIDE_WIDTH: usize = 240;
/// Width of the second wrapping pass.
pub const NARROW_WIDTH: usize = 16;

/// Markers that exempt a line from narrow wrapping.
const HEADER_MARKERS: [&str; 4] = ["Module", "Modulenaam", "Address", "___"];

/// Lengths of all-dot lines that the dot normalizer removes.
const ELIDED_DOT_LENGTHS: [usize; 2] = [15, 16];

/// A pipeline stage transforming one full text into the next.
pub trait TextStage {
    /// Transform the full input text.
    fn apply(&self, text: &str) -> String;

    /// The display name of this stage.
    fn name(&self) -> &str;
}

/// Characters that end a line, in addition to `\r\n` as a pair.
const LINE_BREAKS: [char; 10] = [
    '\n', '\r', '\u{0b}', '\u{0c}', '\u{1c}', '\u{1d}', '\u{1e}', '\u{85}', '\u{2028}', '\u{2029}',
];

/// Split text into lines on every line-break character, treating `\r\n`
/// as one break. A trailing break does not produce an empty final line.
pub fn split_lines(text: &str) -> Vec<&str> {
    let mut lines = Vec::new();
    let mut start = 0;
    let mut chars = text.char_indices().peekable();
    while let Some((idx, c)) = chars.next() {
        if !LINE_BREAKS.contains(&c) {
            continue;
        }
        lines.push(&text[start..idx]);
        start = idx + c.len_utf8();
        if c == '\r' && chars.next_if(|&(_, next)| next == '\n').is_some() {
            start += 1;
        }
    }
    if start < text.len() {
        lines.push(&text[start..]);
    }
    lines
}

/// Split a line into consecutive chunks of at most `width` characters.
///
/// An empty line yields no chunks.
fn chunk_chars(line: &str, width: usize) -> Vec<String> {
    let chars: Vec<char> = line.chars().collect();
    chars
        .chunks(width.max(1))
        .map(|chunk| chunk.iter().collect())
        .collect()
}

/// WIDE-WRAP - drops blank lines and splits long non-sentinel lines.
pub struct WideWrapStage {
    pub width: usize,
}

impl Default for WideWrapStage {
    fn default() -> Self {
        Self { width: WIDE_WIDTH }
    }
}

impl TextStage for WideWrapStage {
    fn apply(&self, text: &str) -> String {
        let mut out = Vec::new();
        for line in split_lines(text) {
            if line.trim().is_empty() {
                continue;
            }
            if line.starts_with("___") {
                out.push(line.to_string());
            } else {
                out.extend(chunk_chars(line, self.width));
            }
        }
        out.join("\n")
    }

    fn name(&self) -> &str {
        "wide-wrap"
    }
}

/// NARROW-WRAP - splits every non-header line into short chunks.
pub struct NarrowWrapStage {
    pub width: usize,
}

impl Default for NarrowWrapStage {
    fn default() -> Self {
        Self {
            width: NARROW_WIDTH,
        }
    }
}

fn is_header(line: &str) -> bool {
    HEADER_MARKERS.iter().any(|m| line.contains(m))
}

impl TextStage for NarrowWrapStage {
    fn apply(&self, text: &str) -> String {
        let mut out = Vec::new();
        for line in split_lines(text) {
            if is_header(line) {
                out.push(line.to_string());
            } else {
                out.extend(chunk_chars(line, self.width));
            }
        }
        out.join("\n")
    }

    fn name(&self) -> &str {
        "narrow-wrap"
    }
}

/// DOT-NORMALIZE - fills single-character gaps between dots, then drops
/// all-dot lines of the elided lengths.
pub struct DotNormalizeStage;

/// Replace every interior non-dot character whose neighbours are both dots.
pub fn fill_dot_gaps(line: &str) -> String {
    let original: Vec<char> = line.chars().collect();
    let mut filled = original.clone();
    for i in 1..original.len().saturating_sub(1) {
        if original[i - 1] == '.' && original[i + 1] == '.' && original[i] != '.' {
            filled[i] = '.';
        }
    }
    filled.into_iter().collect()
}

fn is_elided_dot_line(line: &str) -> bool {
    line.chars().all(|c| c == '.') && ELIDED_DOT_LENGTHS.contains(&line.chars().count())
}

impl TextStage for DotNormalizeStage {
    fn apply(&self, text: &str) -> String {
        split_lines(text)
            .into_iter()
            .map(fill_dot_gaps)
            .filter(|line| !is_elided_dot_line(line))
            .collect::<Vec<_>>()
            .join("\n")
    }

    fn name(&self) -> &str {
        "dot-normalize"
    }
}

/// The report stages, in the order they must run.
pub fn report_stages() -> Vec<Box<dyn TextStage>> {
    vec![
        Box::new(WideWrapStage::default()),
        Box::new(NarrowWrapStage::default()),
        Box::new(DotNormalizeStage),
        Box::new(SupercleanStage),
    ]
}
