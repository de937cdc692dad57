//! # vlp-report
//!
//! Turns a Velbus project export (`.vlp`, an XML document listing the
//! modules on the bus together with a hex dump of their memory) into a
//! compact, readable text report.
//!
//! ## Overview
//!
//! The conversion is a strictly linear chain of whole-text stages:
//!
//! 1. **Record builder**: every `<Module>` becomes a fixed five-line block
//! 2. **Assembler**: blocks are joined into one stream, separated by a
//!    sentinel line of underscores
//! 3. **Wide wrap**: blank lines dropped, lines over 240 chars split
//! 4. **Narrow wrap**: non-header lines split into 16-char chunks
//! 5. **Dot normalize**: `.X.` gaps filled, 15/16-dot filler lines removed
//! 6. **Superclean**: per block, lines restating the module name dropped
//!
//! ## Example
//!
//! ```
//! use vlp_report::{ModuleRecord, render_report};
//!
//! let records = vec![ModuleRecord::decode(
//!     Some("VMB4RYLD"),
//!     Some("1A"),
//!     Some("Relay1"),
//!     Some("48656C6C6F"),
//! )];
//!
//! let report = render_report(&records);
//! assert!(report.starts_with("Module : VMB4RYLD 26\n"));
//! assert!(report.contains("\nHello\n"));
//! ```

pub mod config;
pub mod debug_trace;
pub mod decode;
pub mod error;
pub mod executor;
pub mod project;
pub mod record;
pub mod report;
pub mod stage;
pub mod superclean;

pub use config::{Config, default_output_path};
pub use debug_trace::{PipelineTrace, StageSnapshot};
pub use decode::{Address, Snapshot};
pub use error::PipelineError;
pub use executor::{run_stages, run_stages_traced};
pub use project::{load_project, parse_project};
pub use record::{ModuleRecord, SENTINEL, TextBlock, assemble};
pub use report::{ConversionSummary, convert, render_report, render_report_traced};
pub use stage::{DotNormalizeStage, NarrowWrapStage, TextStage, WideWrapStage, report_stages};
pub use superclean::SupercleanStage;
