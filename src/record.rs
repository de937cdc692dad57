//! Module records and their fixed five-line text rendering.
//!
//! Each module becomes a block:
//!
//! ```text
//! Module : VMB4RYLD 26
//! Address :  26
//! Modulenaam : Kitchen relays
//! Ascii : \r\n<snapshot text>
//! ________________________
//! ```
//!
//! Blocks are then assembled into one stream, the trailing sentinel of each
//! block doubling as the separator.

use crate::decode::{Address, Snapshot};

/// Block separator: 24 underscores.
pub const SENTINEL: &str = "________________________";
/// Caption used when a module has none.
pub const NO_CAPTION: &str = "N/A (No Caption)";
/// Number of lines in a rendered block.
pub const BLOCK_LINES: usize = 5;

/// One decoded module element.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModuleRecord {
    pub module_type: String,
    pub address: Address,
    pub name: String,
    pub snapshot: Snapshot,
}

impl ModuleRecord {
    /// Decode raw attribute and child text into a record.
    ///
    /// Never fails: bad address or snapshot text is kept as an error value.
    pub fn decode(
        module_type: Option<&str>,
        address: Option<&str>,
        caption: Option<&str>,
        memory: Option<&str>,
    ) -> Self {
        let name = caption
            .map(str::trim)
            .filter(|c| !c.is_empty())
            .unwrap_or(NO_CAPTION)
            .to_string();

        Self {
            module_type: module_type.unwrap_or_default().to_string(),
            address: Address::parse(address),
            name,
            snapshot: Snapshot::parse(memory),
        }
    }

    /// True when the address or snapshot could not be decoded.
    pub fn has_field_errors(&self) -> bool {
        !self.address.is_valid() || self.snapshot.is_error()
    }
}

/// The rendering of one module, one entry per logical line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextBlock {
    lines: Vec<String>,
}

impl TextBlock {
    pub fn lines(&self) -> &[String] {
        &self.lines
    }

    pub fn to_text(&self) -> String {
        self.lines.join("\n")
    }
}

impl From<&ModuleRecord> for TextBlock {
    fn from(record: &ModuleRecord) -> Self {
        let address = record.address.to_string();
        TextBlock {
            lines: vec![
                format!("Module : {} {}", record.module_type, address),
                format!("Address :  {address}"),
                format!("Modulenaam : {}", record.name),
                format!("Ascii : \r\n{}", record.snapshot.to_ascii()),
                SENTINEL.to_string(),
            ],
        }
    }
}

/// Join rendered blocks into a single text stream.
pub fn assemble(blocks: &[TextBlock]) -> String {
    blocks
        .iter()
        .map(TextBlock::to_text)
        .collect::<Vec<_>>()
        .join("\n")
}
