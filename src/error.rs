//! Call-level failures.
//!
//! Problems found *in* a configuration are diagnostics, never errors. The
//! variants here describe a call that could not produce a verdict or a
//! formatted document at all.

use std::io;
use std::time::Duration;

use thiserror::Error;

/// Errors surfaced by the validator and the external compiler wrapper.
#[derive(Error, Debug)]
pub enum Error {
    /// The scoped temporary file could not be created or written.
    #[error("failed to stage configuration in a temporary file: {source}")]
    Resource {
        #[source]
        source: io::Error,
    },

    /// The external compiler ran but reported a failure.
    #[error("alloy {command} failed: {message}")]
    ExternalTool {
        command: &'static str,
        message: String,
    },

    /// The external compiler did not finish in time.
    #[error("alloy {command} timed out after {}ms", after.as_millis())]
    Timeout {
        command: &'static str,
        after: Duration,
    },

    /// A catalog document could not be decoded.
    #[error("invalid catalog data in {origin}: {source}")]
    Catalog {
        origin: String,
        #[source]
        source: serde_json::Error,
    },
}

pub type Result<T> = std::result::Result<T, Error>;
