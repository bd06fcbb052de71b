//! The heightmod terrain data model.
//!
//! # Grid
//!
//! Terrain elevation is a dense [`HeightGrid`] of 8- or 16-bit samples. Either depth reads out as a level in `[0, 256)`;
//! 16-bit samples carry a fractional low byte under the integer high byte.
//!
//! # World Space
//!
//! World coordinates are signed and unbounded, with `(0, 0)` at the center of the grid. A [`CoordinateMapper`] scales them
//! into grid space and decides, by [`EdgePolicy`], what happens off the edge. The [`HeightSampler`] builds exact,
//! bilinear and normal queries on top of it.
//!
//! # Edits
//!
//! A [`Brush`] is a falloff-weighted elevation change around a cell. The [`EditLog`] applies brushes, keeps them in order for
//! undo, and compacts their effect into a sparse per-cell delta map. Saving the log is enough to reconstruct the edited
//! terrain from the base grid.

mod brush;
mod config;
mod coordinates;
mod edit_log;
mod grid;
mod sampling;

pub use brush::*;
pub use config::*;
pub use coordinates::*;
pub use edit_log::*;
pub use grid::*;
pub use sampling::*;

pub use heightmod_core as core;
pub use heightmod_core::glam;
