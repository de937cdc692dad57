//! Fatal error taxonomy for a conversion run.
//!
//! Only document-level problems are errors. A bad address or snapshot on a
//! single module is recovered in place and shows up as text in the report.

use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// Errors that abort the whole conversion. No output file is left behind.
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("input file not found: {}", .0.display())]
    InputNotFound(PathBuf),

    #[error("error reading '{}': {source}", .path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("error parsing XML content: {0}")]
    MalformedXml(#[from] quick_xml::Error),

    #[error("could not find the <Modules> element in the XML")]
    MissingModules,

    #[error("error writing '{}': {source}", .path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}
