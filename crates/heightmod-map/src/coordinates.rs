use crate::grid::{GridCoord, HeightGrid};

use serde::{Deserialize, Serialize};

/// What happens when a world coordinate lands outside of the grid.
#[derive(Clone, Copy, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub enum EdgePolicy {
    /// Saturate each axis to the nearest edge cell.
    Clamp,
    /// Anything past the edge is off the surface.
    Cutoff,
    /// Tile the grid, reflecting every other tile.
    Mirror,
}

impl Default for EdgePolicy {
    fn default() -> Self {
        Self::Mirror
    }
}

/// Maps signed world coordinates onto grid cells. World `(0, 0)` is the center of the grid.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CoordinateMapper {
    policy: EdgePolicy,
    scale: f32,
    width: i64,
    height: i64,
}

impl CoordinateMapper {
    pub fn new(policy: EdgePolicy, scale: f32, width: u32, height: u32) -> Self {
        debug_assert!(width > 0 && height > 0);
        Self {
            policy,
            scale,
            width: i64::from(width),
            height: i64::from(height),
        }
    }

    pub fn for_grid(policy: EdgePolicy, scale: f32, grid: &HeightGrid) -> Self {
        Self::new(policy, scale, grid.width(), grid.height())
    }

    pub fn policy(&self) -> EdgePolicy {
        self.policy
    }

    pub fn scale(&self) -> f32 {
        self.scale
    }

    /// Scales `(x, y)` and moves the origin to the grid center, without applying the edge policy.
    ///
    /// The result is widened so that any world coordinate can be translated. Points beyond the `i64` range saturate.
    pub fn to_unbounded(&self, x: i64, y: i64) -> (i64, i64) {
        (
            ((self.scale * x as f32).round() as i64).saturating_add(self.width / 2),
            ((self.scale * y as f32).round() as i64).saturating_add(self.height / 2),
        )
    }

    /// Returns `None` only for [`EdgePolicy::Cutoff`] when the point is off the grid.
    pub fn map(&self, x: i32, y: i32) -> Option<GridCoord> {
        self.map_wide(i64::from(x), i64::from(y))
    }

    /// [`CoordinateMapper::map`] for world coordinates past the `i32` range, such as the neighbors of an extreme point.
    pub fn map_wide(&self, x: i64, y: i64) -> Option<GridCoord> {
        let (x, y) = self.to_unbounded(x, y);
        self.apply_policy(x, y)
    }

    /// Applies the edge policy to an already translated grid-space point.
    pub fn apply_policy(&self, x: i64, y: i64) -> Option<GridCoord> {
        let (x, y) = match self.policy {
            EdgePolicy::Clamp => (x.clamp(0, self.width - 1), y.clamp(0, self.height - 1)),
            EdgePolicy::Cutoff => {
                if x < 0 || y < 0 || x >= self.width || y >= self.height {
                    return None;
                }
                (x, y)
            }
            EdgePolicy::Mirror => (mirror(x, self.width), mirror(y, self.height)),
        };
        Some(GridCoord::new_unchecked(x as u32, y as u32))
    }
}

/// Reflect-repeat tiling along one axis of length `d`.
///
/// `m = |v| mod d` and `q = floor(v / d)`; odd tiles are reflected to `d - m - 1`. The quotient uses floor division, so
/// `v = -1` lands in tile `-1` and maps to `d - 2`.
pub fn mirror(v: i64, d: i64) -> i64 {
    debug_assert!(d > 0);
    let m = (v.unsigned_abs() % d as u64) as i64;
    let q = v.div_euclid(d);
    if q & 1 != 0 {
        d - m - 1
    } else {
        m
    }
}

// ████████╗███████╗███████╗████████╗
// ╚══██╔══╝██╔════╝██╔════╝╚══██╔══╝
//    ██║   █████╗  ███████╗   ██║
//    ██║   ██╔══╝  ╚════██║   ██║
//    ██║   ███████╗███████║   ██║
//    ╚═╝   ╚══════╝╚══════╝   ╚═╝
