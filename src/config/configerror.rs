use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("cannot read configuration {path}: {source}")]
    IOError {
        path: PathBuf,
        #[source]
        source: std::io::Error
    },

    #[error("cannot parse configuration {path}: {source}")]
    JsonParseError {
        path: PathBuf,
        #[source]
        source: serde_json::Error
    }
}
