use heightmod_map::{EditLogError, GridError};
use std::io;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum TerrainError {
    #[error("could not read base grid {path:?}")]
    ReadGrid {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("base grid {path:?} is unusable")]
    BadGrid {
        path: PathBuf,
        #[source]
        source: GridError,
    },
    /// The edit log decoded fine but references cells outside of the loaded grid.
    #[error("edit log {path:?} does not fit the loaded grid")]
    LogMismatch {
        path: PathBuf,
        #[source]
        source: GridError,
    },
    #[error(transparent)]
    Grid(#[from] GridError),
    #[error(transparent)]
    EditLog(#[from] EditLogError),
    #[error("invalid configuration")]
    Config(#[from] ron::Error),
}
