use std::path::PathBuf;

use thiserror::Error;

/// Failures raised by visualization backends.
#[derive(Debug, Error)]
pub enum VisualError {
    #[error("no audio output: {0}")]
    Output(String),
    #[error("could not start visualization worker: {0}")]
    Worker(#[from] std::io::Error),
    #[error("visualization worker is gone")]
    Disconnected,
    #[error("cannot open {}: {source}", path.display())]
    Open {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("cannot decode {}: {reason}", path.display())]
    Decode { path: PathBuf, reason: String },
    #[error("empty audio locator")]
    EmptyLocator,
}
