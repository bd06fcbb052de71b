use crate::TerrainError;

use heightmod_map::{ChannelDepth, HeightGrid};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Produces the base [`HeightGrid`] that edits are applied on top of.
///
/// Image decoding lives outside of this crate; any loader can be plugged in, including a plain closure.
pub trait GridSource {
    /// If `invert_y`, the first row of the file becomes the last row of the grid.
    fn load_grid(&self, path: &Path, invert_y: bool) -> Result<HeightGrid, TerrainError>;
}

impl<F> GridSource for F
where
    F: Fn(&Path, bool) -> Result<HeightGrid, TerrainError>,
{
    fn load_grid(&self, path: &Path, invert_y: bool) -> Result<HeightGrid, TerrainError> {
        self(path, invert_y)
    }
}

/// Reads headerless dumps of native-endian samples in row-major order.
#[derive(Clone, Copy, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub struct RawGridSource {
    pub width: u32,
    pub height: u32,
    /// Bytes per sample, 1 or 2.
    pub depth: u8,
}

impl Default for RawGridSource {
    fn default() -> Self {
        Self {
            width: 1024,
            height: 1024,
            depth: 2,
        }
    }
}

impl GridSource for RawGridSource {
    fn load_grid(&self, path: &Path, invert_y: bool) -> Result<HeightGrid, TerrainError> {
        let bad_grid = |source| TerrainError::BadGrid {
            path: path.to_owned(),
            source,
        };
        let depth = ChannelDepth::from_bytes(self.depth).map_err(bad_grid)?;
        let bytes = std::fs::read(path).map_err(|source| TerrainError::ReadGrid {
            path: path.to_owned(),
            source,
        })?;
        let mut grid =
            HeightGrid::from_bytes(self.width, self.height, depth, &bytes).map_err(bad_grid)?;
        if invert_y {
            grid.flip_rows();
        }
        Ok(grid)
    }
}
