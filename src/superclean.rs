//! SUPERCLEAN - the final block-level filter.
//!
//! The normalized text is cut back into module blocks on runs of
//! underscores. Inside each block the `Modulenaam` line gives the module
//! name, and lines that merely restate that name are dropped along with
//! blank and dot-only filler. The `Ascii :` label is blanked out.

use std::sync::LazyLock;

use regex::Regex;

use crate::record::SENTINEL;
use crate::stage::{TextStage, split_lines};

/// Block boundary: a newline, four or more underscores, optional
/// whitespace, and a newline.
static BLOCK_SPLIT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\n_{4,}\s*\n").expect("block split pattern is valid"));

const NAME_LABEL: &str = "modulenaam";

/// Lowercased ASCII letters and digits of `text`, everything else removed.
pub fn comparison_key(text: &str) -> String {
    text.chars()
        .filter(char::is_ascii_alphanumeric)
        .map(|c| c.to_ascii_lowercase())
        .collect()
}

/// Find the `Modulenaam` line: its index and the trimmed value after the
/// first colon (empty when the line has no colon).
fn find_module_name<'a>(lines: &[&'a str]) -> Option<(usize, &'a str)> {
    lines.iter().copied().enumerate().find_map(|(idx, line)| {
        line.trim()
            .to_lowercase()
            .starts_with(NAME_LABEL)
            .then(|| (idx, line.split_once(':').map_or("", |(_, v)| v.trim())))
    })
}

fn is_filler(line: &str) -> bool {
    line.chars().all(|c| c == '.' || c.is_whitespace())
}

/// Filter one block. Blocks without a `Modulenaam` line pass unchanged.
pub fn clean_block(block: &str) -> String {
    let lines = split_lines(block);
    let Some((name_idx, name)) = find_module_name(&lines) else {
        return lines.join("\n");
    };
    let name_key = comparison_key(name);

    let mut kept: Vec<&str> = Vec::with_capacity(lines.len());
    for (idx, line) in lines.iter().copied().enumerate() {
        if idx == name_idx {
            kept.push(line);
            continue;
        }

        let stripped = line.trim();
        if stripped.to_lowercase().contains("ascii") {
            kept.push("");
            continue;
        }
        if stripped.is_empty() || is_filler(line) {
            continue;
        }

        let key = comparison_key(line);
        if !key.is_empty() && name_key.contains(&key) {
            continue;
        }

        kept.push(line);
    }
    kept.join("\n")
}

/// Split normalized text into blocks, skipping segments that are blank.
pub fn split_blocks(text: &str) -> Vec<&str> {
    BLOCK_SPLIT
        .split(text.trim())
        .filter(|block| !block.trim().is_empty())
        .collect()
}

/// SUPERCLEAN stage: filter every block and rejoin with the sentinel.
pub struct SupercleanStage;

impl TextStage for SupercleanStage {
    fn apply(&self, text: &str) -> String {
        let separator = format!("\n{SENTINEL}\n");
        split_blocks(text)
            .into_iter()
            .map(clean_block)
            .collect::<Vec<_>>()
            .join(&separator)
    }

    fn name(&self) -> &str {
        "superclean"
    }
}
