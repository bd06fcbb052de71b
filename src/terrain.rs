use crate::{GridSource, TerrainError};

use heightmod_map::glam::Vec3;
use heightmod_map::{
    Brush, EditLog, ElevationScale, GridCoord, HeightGrid, HeightSampler, LinearElevation,
    MapConfig, ModElement,
};
use std::path::Path;
use std::time::Instant;

/// An editable heightmap: the base grid, the edited grid, and the log that turns one into the other.
///
/// All mutation goes through `&mut self`, so there is a single writer. Height queries only need `&self`.
pub struct Terrain<E = LinearElevation> {
    base: HeightGrid,
    grid: HeightGrid,
    sampler: HeightSampler<E>,
    edits: EditLog,
}

impl Terrain<LinearElevation> {
    pub fn new(grid: HeightGrid, config: &MapConfig) -> Self {
        Self::with_elevation(grid, config, config.elevation)
    }

    /// Loads the base grid with `source`. Can only fail if the source does.
    pub fn load(
        source: &impl GridSource,
        path: impl AsRef<Path>,
        invert_y: bool,
        config: &MapConfig,
    ) -> Result<Self, TerrainError> {
        let path = path.as_ref();
        log::info!("Loading terrain heightmap {}", path.display());
        let start = Instant::now();
        let grid = source.load_grid(path, invert_y)?;
        log::info!(
            "Loaded {}x{} heightmap ({:?}) in {:?}",
            grid.width(),
            grid.height(),
            grid.depth(),
            start.elapsed()
        );
        Ok(Self::new(grid, config))
    }
}

impl<E> Terrain<E>
where
    E: ElevationScale,
{
    /// Like [`Terrain::new`], with an external conversion from elevation levels to world heights.
    pub fn with_elevation(grid: HeightGrid, config: &MapConfig, elevation: E) -> Self {
        let sampler = HeightSampler::from_config(config, &grid, elevation);
        Self {
            base: grid.clone(),
            grid,
            sampler,
            edits: EditLog::default(),
        }
    }

    /// The grid with all edits applied.
    pub fn grid(&self) -> &HeightGrid {
        &self.grid
    }

    /// The grid as it was loaded.
    pub fn base_grid(&self) -> &HeightGrid {
        &self.base
    }

    pub fn edits(&self) -> &EditLog {
        &self.edits
    }

    pub fn sampler(&self) -> &HeightSampler<E> {
        &self.sampler
    }

    /// The cell that world `(x, y)` maps to, if any.
    pub fn world_to_grid(&self, x: i32, y: i32) -> Option<GridCoord> {
        self.sampler.mapper().map(x, y)
    }

    pub fn height(&self, x: i32, y: i32) -> f32 {
        self.sampler.exact_height(&self.grid, x, y)
    }

    pub fn interpolated_height(&self, x: f32, y: f32) -> f32 {
        self.sampler.interpolated_height(&self.grid, x, y)
    }

    pub fn surface_normal(&self, x: i32, y: i32) -> Vec3 {
        self.sampler.surface_normal(&self.grid, x, y)
    }

    /// Converts a normalized delta in `[-1, 1]` into raw sample units for this grid's channel depth.
    pub fn scale_delta(&self, delta: f32) -> i32 {
        (self.grid.depth().num_levels() as f32 * delta.clamp(-1.0, 1.0)) as i32
    }

    /// Applies `brush`, centered in grid coordinates. Returns the number of cells changed.
    pub fn apply_brush(&mut self, brush: Brush) -> usize {
        self.edits.apply_brush(brush, &mut self.grid)
    }

    /// Reverts the most recent brush. `None` when there is nothing to undo.
    pub fn undo_last(&mut self) -> Option<Brush> {
        self.edits.undo_last(&mut self.grid)
    }

    /// Applies and records raw per-cell deltas, e.g. a batch merged from another edit session.
    pub fn import_mods(
        &mut self,
        batch: impl IntoIterator<Item = ModElement>,
    ) -> Result<(), TerrainError> {
        self.edits.apply_mods(batch, &mut self.grid)?;
        Ok(())
    }

    /// Drops every edit and restores the base grid.
    pub fn reset_edits(&mut self) {
        self.grid = self.base.clone();
        self.edits.clear();
    }

    pub fn save_edits(&self, path: impl AsRef<Path>) -> Result<(), TerrainError> {
        self.edits.save(path)?;
        Ok(())
    }

    /// Replaces the current edits with the log at `path`.
    ///
    /// The grid is rebuilt from the base grid plus the log's delta map. The log's brush history is kept for undo but not
    /// replayed, since the delta map already contains its effect. On failure nothing changes.
    pub fn load_edits(&mut self, path: impl AsRef<Path>) -> Result<(), TerrainError> {
        let path = path.as_ref();
        let start = Instant::now();
        let edits = EditLog::load(path)?;
        let mut grid = self.base.clone();
        edits
            .replay_onto(&mut grid)
            .map_err(|source| TerrainError::LogMismatch {
                path: path.to_owned(),
                source,
            })?;
        self.grid = grid;
        self.edits = edits;
        log::info!("Replayed {} in {:?}", path.display(), start.elapsed());
        Ok(())
    }
}

// ████████╗███████╗███████╗████████╗
// ╚══██╔══╝██╔════╝██╔════╝╚══██╔══╝
//    ██║   █████╗  ███████╗   ██║
//    ██║   ██╔══╝  ╚════██║   ██║
//    ██║   ███████╗███████║   ██║
//    ╚═╝   ╚══════╝╚══════╝   ╚═╝

#[cfg(test)]
mod tests {
    use super::*;
    use crate::RawGridSource;

    use approx::assert_relative_eq;
    use heightmod_map::{BrushShape, CellKey, ChannelDepth, EdgePolicy, EditLogError, Samples};
    use std::path::PathBuf;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn temp_path(name: &str) -> PathBuf {
        static COUNTER: AtomicUsize = AtomicUsize::new(0);
        let n = COUNTER.fetch_add(1, Ordering::Relaxed);
        std::env::temp_dir().join(format!(
            "heightmod-{}-{}-{}",
            std::process::id(),
            name,
            n
        ))
    }

    fn config(edge_policy: EdgePolicy) -> MapConfig {
        MapConfig {
            edge_policy,
            elevation: LinearElevation {
                min: 0.0,
                max: 256.0,
            },
            ..Default::default()
        }
    }

    fn flat_terrain(level: u8) -> Terrain {
        let grid = HeightGrid::from_samples(16, 16, Samples::U8(vec![level; 256])).unwrap();
        Terrain::new(grid, &config(EdgePolicy::Clamp))
    }

    #[test]
    fn queries_use_world_coordinates() {
        let mut terrain = flat_terrain(10);
        // Grid cell (8, 8) is world (0, 0).
        terrain.apply_brush(Brush::new(8, 8, 0, BrushShape::Flat, 6));
        assert_relative_eq!(terrain.height(0, 0), 16.0);
        assert_relative_eq!(terrain.height(1, 0), 10.0);
        assert_relative_eq!(terrain.interpolated_height(0.5, 0.0), 13.0);
        assert_eq!(terrain.world_to_grid(0, 0).map(|c| (c.x(), c.y())), Some((8, 8)));
        assert_eq!(terrain.surface_normal(3, 3), Vec3::Z);
    }

    #[test]
    fn cutoff_terrain_reports_minimum_off_surface() {
        let grid = HeightGrid::from_samples(4, 4, Samples::U8(vec![200; 16])).unwrap();
        let terrain = Terrain::new(grid, &config(EdgePolicy::Cutoff));
        assert_eq!(terrain.world_to_grid(2, 0), None);
        assert_relative_eq!(terrain.height(2, 0), 0.0);
        assert_relative_eq!(terrain.height(1, 0), 200.0);
    }

    #[test]
    fn custom_elevation_scale() {
        let grid = HeightGrid::from_samples(2, 2, Samples::U8(vec![4; 4])).unwrap();
        let terrain = Terrain::with_elevation(grid, &MapConfig::default(), |level: f32| level * 0.5);
        assert_relative_eq!(terrain.height(0, 0), 2.0);
    }

    #[test]
    fn undo_restores_heights() {
        let mut terrain = flat_terrain(100);
        let before = terrain.grid().clone();
        let brush = Brush::new(5, 6, 4, BrushShape::Quadratic, 40);
        assert!(terrain.apply_brush(brush) > 0);
        assert_ne!(terrain.grid(), &before);

        assert_eq!(terrain.undo_last(), Some(brush));
        assert_eq!(terrain.grid(), &before);
        assert_eq!(terrain.undo_last(), None);
        assert_eq!(terrain.grid(), &before);
    }

    #[test]
    fn saved_edits_rebuild_terrain_from_base() {
        let mut terrain = flat_terrain(100);
        terrain.apply_brush(Brush::new(4, 4, 3, BrushShape::Cosine, 50));
        terrain.apply_brush(Brush::new(6, 5, 5, BrushShape::Linear, -30));
        terrain.apply_brush(Brush::new(15, 15, 2, BrushShape::Flat, 7));
        terrain.undo_last();

        let path = temp_path("edits.hmod");
        terrain.save_edits(&path).unwrap();

        let mut restored = flat_terrain(100);
        restored.load_edits(&path).unwrap();
        std::fs::remove_file(&path).unwrap();

        assert_eq!(restored.grid(), terrain.grid());
        assert_eq!(restored.edits(), terrain.edits());

        // Loaded history is still undoable.
        let last = restored.undo_last().unwrap();
        assert_eq!(last.delta(), -30);
        terrain.undo_last();
        assert_eq!(restored.grid(), terrain.grid());
    }

    #[test]
    fn saturating_edits_survive_reload() {
        let cases = [
            (Samples::U8(vec![250; 16]), 10),
            (Samples::U8(vec![4; 16]), -10),
            (Samples::U16(vec![65_530; 16]), 10),
            (Samples::U16(vec![4; 16]), -10),
        ];
        for (samples, delta) in cases {
            let base = HeightGrid::from_samples(4, 4, samples).unwrap();
            let mut terrain = Terrain::new(base.clone(), &config(EdgePolicy::Clamp));
            terrain.apply_brush(Brush::new(1, 1, 0, BrushShape::Flat, delta));
            terrain.apply_brush(Brush::new(1, 1, 0, BrushShape::Flat, -delta));
            terrain.apply_brush(Brush::new(2, 2, 1, BrushShape::Flat, delta));
            terrain
                .import_mods([ModElement::new(CellKey::new(0, 3), delta * 2)])
                .unwrap();

            let path = temp_path("saturated.hmod");
            terrain.save_edits(&path).unwrap();
            let mut restored = Terrain::new(base, &config(EdgePolicy::Clamp));
            restored.load_edits(&path).unwrap();
            std::fs::remove_file(&path).unwrap();

            assert_eq!(restored.grid(), terrain.grid(), "delta {}", delta);
            assert_eq!(restored.edits(), terrain.edits());
        }
    }

    #[test]
    fn extreme_world_positions_do_not_panic() {
        let terrain = flat_terrain(10);
        assert_relative_eq!(terrain.height(i32::MAX, 0), 10.0);
        assert_relative_eq!(terrain.height(i32::MIN, i32::MIN), 10.0);
        assert_relative_eq!(terrain.interpolated_height(3.0e9, 0.0), 10.0);
        assert_eq!(terrain.surface_normal(i32::MAX, i32::MIN), Vec3::Z);
        assert!(terrain.world_to_grid(i32::MAX, 0).is_some());
    }

    #[test]
    fn loading_twice_does_not_double_count() {
        let mut terrain = flat_terrain(100);
        terrain.apply_brush(Brush::new(8, 8, 3, BrushShape::RoundFlat, 20));
        let path = temp_path("twice.hmod");
        terrain.save_edits(&path).unwrap();

        let edited = terrain.grid().clone();
        terrain.load_edits(&path).unwrap();
        terrain.load_edits(&path).unwrap();
        std::fs::remove_file(&path).unwrap();

        assert_eq!(terrain.grid(), &edited);
    }

    #[test]
    fn corrupt_log_leaves_terrain_untouched() {
        let mut terrain = flat_terrain(50);
        terrain.apply_brush(Brush::new(3, 3, 2, BrushShape::Flat, 9));
        let path = temp_path("corrupt.hmod");
        terrain.save_edits(&path).unwrap();

        let mut bytes = std::fs::read(&path).unwrap();
        bytes[1] ^= 0xFF;
        std::fs::write(&path, &bytes).unwrap();

        let mut other = flat_terrain(50);
        other.apply_brush(Brush::new(10, 10, 1, BrushShape::Flat, 3));
        let grid_before = other.grid().clone();
        let edits_before = other.edits().clone();

        let result = other.load_edits(&path);
        std::fs::remove_file(&path).unwrap();

        assert!(matches!(
            result,
            Err(TerrainError::EditLog(EditLogError::Format(_)))
        ));
        assert_eq!(other.grid(), &grid_before);
        assert_eq!(other.edits(), &edits_before);
    }

    #[test]
    fn log_for_larger_grid_is_rejected() {
        let mut big = flat_terrain(50);
        big.import_mods([ModElement::new(CellKey::new(15, 15), 3)])
            .unwrap();
        let path = temp_path("big.hmod");
        big.save_edits(&path).unwrap();

        let small_grid = HeightGrid::new(8, 8, ChannelDepth::One).unwrap();
        let mut small = Terrain::new(small_grid.clone(), &config(EdgePolicy::Clamp));
        let result = small.load_edits(&path);
        std::fs::remove_file(&path).unwrap();

        assert!(matches!(result, Err(TerrainError::LogMismatch { .. })));
        assert_eq!(small.grid(), &small_grid);
        assert!(small.edits().is_empty());
    }

    #[test]
    fn missing_log_is_open_error() {
        let mut terrain = flat_terrain(0);
        assert!(matches!(
            terrain.load_edits(temp_path("missing.hmod")),
            Err(TerrainError::EditLog(EditLogError::Open { .. }))
        ));
    }

    #[test]
    fn reset_restores_base() {
        let mut terrain = flat_terrain(30);
        terrain.apply_brush(Brush::new(2, 2, 2, BrushShape::Flat, 5));
        terrain
            .import_mods([ModElement::new(CellKey::new(9, 9), -4)])
            .unwrap();
        terrain.reset_edits();
        assert_eq!(terrain.grid(), terrain.base_grid());
        assert!(terrain.edits().is_empty());
    }

    #[test]
    fn scale_delta_follows_channel_depth() {
        let one = flat_terrain(0);
        assert_eq!(one.scale_delta(0.5), 128);
        assert_eq!(one.scale_delta(-2.0), -256);

        let two = Terrain::new(
            HeightGrid::new(2, 2, ChannelDepth::Two).unwrap(),
            &MapConfig::default(),
        );
        assert_eq!(two.scale_delta(0.25), 16384);
    }

    #[test]
    fn load_raw_grid_with_inverted_rows() {
        let path = temp_path("base.raw");
        std::fs::write(&path, [1u8, 2, 3, 4, 5, 6]).unwrap();
        let source = RawGridSource {
            width: 2,
            height: 3,
            depth: 1,
        };
        let terrain = Terrain::load(&source, &path, true, &MapConfig::default()).unwrap();
        std::fs::remove_file(&path).unwrap();

        assert_eq!(terrain.grid().samples(), &Samples::U8(vec![5, 6, 3, 4, 1, 2]));
    }

    #[test]
    fn raw_grid_errors_keep_path() {
        let source = RawGridSource {
            width: 4,
            height: 4,
            depth: 1,
        };
        let missing = temp_path("missing.raw");
        assert!(matches!(
            Terrain::load(&source, &missing, false, &MapConfig::default()),
            Err(TerrainError::ReadGrid { path, .. }) if path == missing
        ));

        let short = temp_path("short.raw");
        std::fs::write(&short, [0u8; 10]).unwrap();
        let result = Terrain::load(&source, &short, false, &MapConfig::default());
        std::fs::remove_file(&short).unwrap();
        assert!(matches!(result, Err(TerrainError::BadGrid { .. })));
    }

    #[test]
    fn closure_grid_source() {
        let source = |_: &Path, _: bool| -> Result<HeightGrid, TerrainError> {
            Ok(HeightGrid::new(4, 4, ChannelDepth::Two)?)
        };
        let terrain = Terrain::load(&source, "generated", false, &MapConfig::default()).unwrap();
        assert_eq!(terrain.grid().width(), 4);
    }
}
