//! Editable terrain heightmaps with a replayable edit log.
//!
//! A [`Terrain`] owns a base [`HeightGrid`](heightmod_map::HeightGrid), the grid with edits applied, and the
//! [`EditLog`](heightmod_map::EditLog) between them. Only the log needs to be saved; loading it on top of the same base grid
//! reproduces the edited terrain.

mod config;
mod error;
mod source;
mod terrain;

pub use config::Config;
pub use error::TerrainError;
pub use source::{GridSource, RawGridSource};
pub use terrain::Terrain;

pub use heightmod_map as map;
