mod codec;

pub use codec::{FormatError, HEADER_SIGNATURE, TRAILER_SIGNATURE};

use crate::brush::Brush;
use crate::core::SmallKeyHashMap;
use crate::grid::{GridCoord, GridError, HeightGrid};

use std::fs::File;
use std::io::{self, BufReader, BufWriter, Read, Write};
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum EditLogError {
    #[error("could not open edit log {path:?} for read")]
    Open {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("could not open edit log {path:?} for write")]
    Create {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("edit log I/O failed")]
    Io(#[from] io::Error),
    #[error("malformed edit log")]
    Format(#[from] FormatError),
}

/// The key of one cell in an [`EditLog`]'s delta map.
///
/// Ordering is row-major, which is the order records are written in.
#[derive(Clone, Copy, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub struct CellKey {
    pub y: u16,
    pub x: u16,
}

impl CellKey {
    pub fn new(x: u16, y: u16) -> Self {
        Self { y, x }
    }
}

impl From<GridCoord> for CellKey {
    fn from(c: GridCoord) -> Self {
        // Grid dimensions are capped at MAX_GRID_DIM, so every coordinate fits.
        Self::new(c.x() as u16, c.y() as u16)
    }
}

/// A net elevation change for one cell.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct ModElement {
    pub key: CellKey,
    pub delta: i32,
}

impl ModElement {
    pub fn new(key: CellKey, delta: i32) -> Self {
        Self { key, delta }
    }
}

/// A record of every edit made to a [`HeightGrid`].
///
/// Two views of the same edits are kept:
///
/// - the brush history, in application order, which is what [`EditLog::undo_last`] pops from
/// - the delta map, the net change per cell, which is what gets replayed onto a freshly loaded base grid
///
/// Only changes that were actually stored in the grid are recorded, so a sample that saturates contributes less than its
/// brush asked for. The delta map is always the edited grid minus the grid the edits started from, and replaying it onto
/// that base rebuilds the edited grid exactly. Undo stamps the inverse brush the same way. Cells whose net change returns
/// to zero are dropped from the map.
#[derive(Clone, Debug, Default)]
pub struct EditLog {
    brush_history: Vec<Brush>,
    delta_map: SmallKeyHashMap<CellKey, i32>,
}

impl PartialEq for EditLog {
    fn eq(&self, other: &Self) -> bool {
        self.brush_history == other.brush_history && *self.delta_map == *other.delta_map
    }
}

impl EditLog {
    pub fn brushes(&self) -> &[Brush] {
        &self.brush_history
    }

    pub fn last_brush(&self) -> Option<&Brush> {
        self.brush_history.last()
    }

    pub fn num_mods(&self) -> usize {
        self.delta_map.len()
    }

    pub fn is_empty(&self) -> bool {
        self.brush_history.is_empty() && self.delta_map.is_empty()
    }

    /// The net delta recorded for `key`, zero if the cell was never edited.
    pub fn delta(&self, key: CellKey) -> i32 {
        self.delta_map.get(&key).copied().unwrap_or(0)
    }

    /// All mods in arbitrary order.
    pub fn mods(&self) -> impl Iterator<Item = ModElement> + '_ {
        self.delta_map
            .iter()
            .map(|(&key, &delta)| ModElement::new(key, delta))
    }

    /// All mods in row-major cell order.
    pub fn sorted_mods(&self) -> Vec<ModElement> {
        let mut mods: Vec<_> = self.mods().collect();
        mods.sort_by_key(|m| m.key);
        mods
    }

    pub fn clear(&mut self) {
        self.brush_history.clear();
        self.delta_map.clear();
    }

    /// Accumulates `m` into the delta map. Does not touch any grid.
    pub fn add(&mut self, m: ModElement) {
        if m.delta == 0 {
            return;
        }
        let entry = self.delta_map.entry(m.key).or_insert(0);
        *entry = entry.saturating_add(m.delta);
        if *entry == 0 {
            self.delta_map.remove(&m.key);
        }
    }

    /// Accumulates every element of `batch`, exactly as if each were [`add`](Self::add)ed in turn.
    pub fn merge(&mut self, batch: impl IntoIterator<Item = ModElement>) {
        for m in batch {
            self.add(m);
        }
    }

    /// Accumulates the delta map of `other`. Its brush history is not merged.
    pub fn merge_mods(&mut self, other: &EditLog) {
        self.merge(other.mods());
    }

    /// Applies `brush` to `grid`, records its per-cell deltas, and appends it to the history.
    ///
    /// Returns the number of grid cells whose value changed. Cells past the grid edges are skipped.
    pub fn apply_brush(&mut self, brush: Brush, grid: &mut HeightGrid) -> usize {
        let num_cells = self.stamp(&brush, grid);
        self.brush_history.push(brush);
        log::debug!("Applied {:?} to {} cells", brush, num_cells);
        num_cells
    }

    /// Reverts the most recent brush by stamping its inverse. Returns the reverted brush, or `None` if the history is empty.
    ///
    /// Deltas are restored exactly because rounding is sign-symmetric, but cells that saturated at the channel range when
    /// the brush was applied don't come back to their previous value.
    pub fn undo_last(&mut self, grid: &mut HeightGrid) -> Option<Brush> {
        let brush = self.brush_history.pop()?;
        let num_cells = self.stamp(&brush.inverse(), grid);
        log::debug!("Undid {:?} on {} cells", brush, num_cells);
        Some(brush)
    }

    fn stamp(&mut self, brush: &Brush, grid: &mut HeightGrid) -> usize {
        let mut num_cells = 0;
        for (p, delta) in brush.cell_deltas_within(&grid.extent()) {
            if delta == 0 {
                continue;
            }
            if let Some(c) = grid.coord_at(p) {
                let stored = grid.set(c, delta, true);
                if stored != 0 {
                    self.add(ModElement::new(c.into(), stored));
                    num_cells += 1;
                }
            }
        }
        num_cells
    }

    /// Applies raw mods to `grid` and records them. Every key is checked against `grid` before anything is modified.
    ///
    /// As with brushes, the recorded delta is what the grid actually stored. Raw mods have no brush, so they can't be
    /// undone.
    pub fn apply_mods(
        &mut self,
        batch: impl IntoIterator<Item = ModElement>,
        grid: &mut HeightGrid,
    ) -> Result<(), GridError> {
        let checked = batch
            .into_iter()
            .map(|m| Ok((grid.try_coord(m.key.x as i64, m.key.y as i64)?, m)))
            .collect::<Result<Vec<_>, GridError>>()?;
        for (c, m) in checked {
            let stored = grid.set(c, m.delta, true);
            self.add(ModElement::new(m.key, stored));
        }
        Ok(())
    }

    /// Applies every delta map entry to `grid` once. This turns a base grid into the edited grid.
    ///
    /// Fails without modifying `grid` if any key lies outside of it.
    pub fn replay_onto(&self, grid: &mut HeightGrid) -> Result<(), GridError> {
        let checked = self
            .delta_map
            .iter()
            .map(|(key, &delta)| Ok((grid.try_coord(key.x as i64, key.y as i64)?, delta)))
            .collect::<Result<Vec<_>, GridError>>()?;
        for (c, delta) in checked {
            grid.set(c, delta, true);
        }
        Ok(())
    }

    pub fn write_to(&self, writer: impl Write) -> io::Result<()> {
        codec::encode(self, writer)
    }

    pub fn read_from(reader: impl Read) -> Result<Self, EditLogError> {
        codec::decode(reader)
    }

    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), EditLogError> {
        let path = path.as_ref();
        let file = File::create(path).map_err(|source| EditLogError::Create {
            path: path.to_owned(),
            source,
        })?;
        let mut writer = BufWriter::new(file);
        self.write_to(&mut writer)?;
        writer.flush()?;
        log::info!(
            "Wrote {} mods and {} brushes to {}",
            self.delta_map.len(),
            self.brush_history.len(),
            path.display()
        );
        Ok(())
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, EditLogError> {
        let path = path.as_ref();
        let file = File::open(path).map_err(|source| EditLogError::Open {
            path: path.to_owned(),
            source,
        })?;
        let log = Self::read_from(BufReader::new(file)).map_err(|e| {
            log::warn!("Rejected edit log {}: {}", path.display(), e);
            e
        })?;
        log::info!(
            "Read {} mods and {} brushes from {}",
            log.delta_map.len(),
            log.brush_history.len(),
            path.display()
        );
        Ok(log)
    }

    /// Replaces `self` with the log at `path`. On failure `self` is left as it was.
    pub fn load_into(&mut self, path: impl AsRef<Path>) -> Result<(), EditLogError> {
        *self = Self::load(path)?;
        Ok(())
    }
}

// ████████╗███████╗███████╗████████╗
// ╚══██╔══╝██╔════╝██╔════╝╚══██╔══╝
//    ██║   █████╗  ███████╗   ██║
//    ██║   ██╔══╝  ╚════██║   ██║
//    ██║   ███████╗███████║   ██║
//    ╚═╝   ╚══════╝╚══════╝   ╚═╝
