use lineforge::core::io::draftkings::ExportError;
use lineforge::core::io::pool_csv::PoolLoadError;
use lineforge::core::io::runs::RunStoreError;
use lineforge::engine::error::EngineError;
use std::path::PathBuf;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, CliError>;

#[derive(Debug, Error)]
pub enum CliError {
    #[error(transparent)]
    Engine(#[from] EngineError),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Failed to parse file '{path}': {source}", path = path.display())]
    FileParsing {
        path: PathBuf,
        #[source]
        source: anyhow::Error,
    },

    #[error("Failed to load player pool: {0}")]
    Pool(#[from] PoolLoadError),

    #[error("Export failed: {0}")]
    Export(#[from] ExportError),

    #[error("Run store error: {0}")]
    RunStore(#[from] RunStoreError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid argument: {0}")]
    Argument(String),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}
