use std::path::PathBuf;

use crate::document::SourceFormat;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The document declared no component schemas; nothing can be emitted.
    #[error("no components.schemas found")]
    EmptyRegistry,

    #[error("failed to parse {format} document at {path}: {message}")]
    Parse {
        format: SourceFormat,
        path: String,
        message: String,
    },

    #[error("document is neither valid JSON ({json}) nor valid YAML ({yaml})")]
    Undetected { json: String, yaml: String },

    #[error("failed to read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
