use std::path::PathBuf;

use thiserror::Error;

/// Errors raised by the demo itself.
///
/// Faults inside burn (dataset download, device set-up) are not wrapped here;
/// they abort the process the way the framework reports them.
#[derive(Debug, Error)]
pub enum DemoError {
    #[error("the {0} split contains no items")]
    EmptyDataset(&'static str),

    #[error("invalid training configuration: {0}")]
    InvalidConfig(String),

    #[error("I/O error at {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("cannot read training config at {}: {reason}", path.display())]
    ConfigFile { path: PathBuf, reason: String },

    #[error("cannot record model weights at {}: {reason}", path.display())]
    Record { path: PathBuf, reason: String },
}

impl DemoError {
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}
