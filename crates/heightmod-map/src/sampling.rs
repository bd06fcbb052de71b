use crate::config::MapConfig;
use crate::coordinates::CoordinateMapper;
use crate::core::glam::{Vec2, Vec3};
use crate::grid::HeightGrid;

use serde::{Deserialize, Serialize};

/// Converts an elevation level in `[0, 256)` (see [`HeightGrid::level`]) into a world-space height.
pub trait ElevationScale {
    fn to_world(&self, level: f32) -> f32;
}

impl<F> ElevationScale for F
where
    F: Fn(f32) -> f32,
{
    #[inline]
    fn to_world(&self, level: f32) -> f32 {
        self(level)
    }
}

/// Maps level `0` to `min` and level `256` to `max`.
#[derive(Clone, Copy, Debug, Deserialize, PartialEq, Serialize)]
pub struct LinearElevation {
    pub min: f32,
    pub max: f32,
}

impl Default for LinearElevation {
    fn default() -> Self {
        Self { min: 0.0, max: 1.0 }
    }
}

impl ElevationScale for LinearElevation {
    #[inline]
    fn to_world(&self, level: f32) -> f32 {
        self.min + (self.max - self.min) * (level / 256.0)
    }
}

/// Reads world-space heights out of a [`HeightGrid`].
///
/// Every lookup goes through the [`CoordinateMapper`], so the edge policy decides what happens past the grid edges.
#[derive(Clone, Debug)]
pub struct HeightSampler<E> {
    mapper: CoordinateMapper,
    spacing: Vec2,
    vertical_scale: f32,
    elevation: E,
}

impl<E> HeightSampler<E>
where
    E: ElevationScale,
{
    pub fn new(mapper: CoordinateMapper, spacing: Vec2, vertical_scale: f32, elevation: E) -> Self {
        Self {
            mapper,
            spacing,
            vertical_scale,
            elevation,
        }
    }

    pub fn from_config(config: &MapConfig, grid: &HeightGrid, elevation: E) -> Self {
        Self::new(
            CoordinateMapper::for_grid(config.edge_policy, config.mesh_scale, grid),
            Vec2::from(config.spacing),
            config.vertical_scale,
            elevation,
        )
    }

    pub fn mapper(&self) -> &CoordinateMapper {
        &self.mapper
    }

    pub fn elevation(&self) -> &E {
        &self.elevation
    }

    /// The height of the cell at world `(x, y)`. Off-surface points get the height of level zero.
    pub fn exact_height(&self, grid: &HeightGrid, x: i32, y: i32) -> f32 {
        self.height_at(grid, i64::from(x), i64::from(y))
    }

    fn height_at(&self, grid: &HeightGrid, x: i64, y: i64) -> f32 {
        match self.mapper.map_wide(x, y) {
            Some(c) => self.elevation.to_world(grid.level(c)),
            None => self.elevation.to_world(0.0),
        }
    }

    /// Bilinear interpolation between the four cells surrounding `(x, y)`.
    pub fn interpolated_height(&self, grid: &HeightGrid, x: f32, y: f32) -> f32 {
        let xlo = x.floor();
        let ylo = y.floor();
        let xv = x - xlo;
        let yv = y - ylo;
        // Float to int casts saturate, so only the neighbor offset can overflow.
        let (xi, yi) = (xlo as i64, ylo as i64);
        let (xn, yn) = (xi.saturating_add(1), yi.saturating_add(1));

        let h00 = self.height_at(grid, xi, yi);
        let h10 = self.height_at(grid, xn, yi);
        let h01 = self.height_at(grid, xi, yn);
        let h11 = self.height_at(grid, xn, yn);

        (1.0 - yv) * ((1.0 - xv) * h00 + xv * h10) + yv * ((1.0 - xv) * h01 + xv * h11)
    }

    /// Unit normal from forward differences along each axis.
    pub fn surface_normal(&self, grid: &HeightGrid, x: i32, y: i32) -> Vec3 {
        let (x, y) = (i64::from(x), i64::from(y));
        let h = self.height_at(grid, x, y);
        let hx = self.height_at(grid, x + 1, y);
        let hy = self.height_at(grid, x, y + 1);

        Vec3::new(
            self.spacing.y * (h - hx),
            self.spacing.x * (h - hy),
            self.vertical_scale,
        )
        .normalize()
    }
}

// ████████╗███████╗███████╗████████╗
// ╚══██╔══╝██╔════╝██╔════╝╚══██╔══╝
//    ██║   █████╗  ███████╗   ██║
//    ██║   ██╔══╝  ╚════██║   ██║
//    ██║   ███████╗███████║   ██║
//    ╚═╝   ╚══════╝╚══════╝   ╚═╝
