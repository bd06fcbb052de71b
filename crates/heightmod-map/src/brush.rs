use crate::core::geometry::Extent2i;
use crate::core::glam::IVec2;
use crate::grid::MAX_GRID_DIM;

use std::f32::consts::FRAC_PI_2;
use std::fmt;
use std::str::FromStr;

/// How a brush's strength falls off with distance from its center.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum BrushShape {
    /// Full strength over the whole bounding square.
    Flat,
    /// Full strength inside the radius.
    RoundFlat,
    Linear,
    Quadratic,
    Cosine,
}

impl BrushShape {
    pub const ALL: [Self; 5] = [
        Self::Flat,
        Self::RoundFlat,
        Self::Linear,
        Self::Quadratic,
        Self::Cosine,
    ];

    /// The on-disk encoding.
    pub fn code(self) -> u32 {
        match self {
            Self::Flat => 0,
            Self::RoundFlat => 1,
            Self::Linear => 2,
            Self::Quadratic => 3,
            Self::Cosine => 4,
        }
    }

    pub fn from_code(code: u32) -> Option<Self> {
        Self::ALL.get(code as usize).copied()
    }

    /// Every shape except [`BrushShape::Flat`] is clipped to a circle.
    pub fn is_round(self) -> bool {
        self != Self::Flat
    }

    /// The strength multiplier at normalized distance `dval`, where `1.0` is the brush radius.
    pub fn falloff(self, dval: f32) -> f32 {
        match self {
            Self::Flat | Self::RoundFlat => 1.0,
            Self::Linear => 1.0 - dval,
            Self::Quadratic => 1.0 - dval * dval,
            Self::Cosine => (FRAC_PI_2 * dval).cos(),
        }
    }

    fn name(self) -> &'static str {
        match self {
            Self::Flat => "flat",
            Self::RoundFlat => "round-flat",
            Self::Linear => "linear",
            Self::Quadratic => "quadratic",
            Self::Cosine => "cosine",
        }
    }
}

impl fmt::Display for BrushShape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for BrushShape {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|shape| shape.name() == s)
            .ok_or_else(|| format!("unknown brush shape {:?}", s))
    }
}

/// The largest brush radius. A brush this wide covers every cell of the largest grid from anywhere on it.
pub const MAX_BRUSH_RADIUS: u32 = MAX_GRID_DIM;

/// A localized elevation edit centered on a grid cell.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub struct Brush {
    x: i32,
    y: i32,
    radius: u32,
    shape: BrushShape,
    delta: i32,
}

impl Brush {
    /// `radius` is capped at [`MAX_BRUSH_RADIUS`].
    pub fn new(x: i32, y: i32, radius: u32, shape: BrushShape, delta: i32) -> Self {
        Self {
            x,
            y,
            radius: radius.min(MAX_BRUSH_RADIUS),
            shape,
            delta,
        }
    }

    pub fn center(&self) -> IVec2 {
        IVec2::new(self.x, self.y)
    }

    pub fn radius(&self) -> u32 {
        self.radius
    }

    pub fn shape(&self) -> BrushShape {
        self.shape
    }

    /// The elevation change at the brush center.
    pub fn delta(&self) -> i32 {
        self.delta
    }

    /// The same brush with its delta negated.
    pub fn inverse(&self) -> Self {
        Self {
            delta: self.delta.saturating_neg(),
            ..*self
        }
    }

    /// The bounding square of the brush footprint.
    pub fn extent(&self) -> Extent2i {
        Extent2i::square(self.center(), self.radius as i32)
    }

    /// The rounded delta applied at normalized distance `dval`.
    ///
    /// Rounding is half away from zero, so `inverse().magnitude_at(d) == -magnitude_at(d)`.
    pub fn magnitude_at(&self, dval: f32) -> i32 {
        (self.delta as f32 * self.shape.falloff(dval)).round() as i32
    }

    /// Every cell touched by the brush with its rounded delta, in row-major order. Cells may lie outside of any particular
    /// grid; callers filter them.
    pub fn cell_deltas(&self) -> impl Iterator<Item = (IVec2, i32)> {
        self.cell_deltas_within(&self.extent())
    }

    /// Like [`Brush::cell_deltas`], restricted to the cells inside `bounds`.
    pub fn cell_deltas_within(&self, bounds: &Extent2i) -> impl Iterator<Item = (IVec2, i32)> {
        let brush = *self;
        let center = self.center().as_vec2();
        let norm = self.radius.max(1) as f32;
        self.extent().intersection(bounds).iter2().filter_map(move |p| {
            let dval = p.as_vec2().distance(center) / norm;
            if brush.shape.is_round() && dval > 1.0 {
                return None;
            }
            Some((p, brush.magnitude_at(dval)))
        })
    }
}

// ████████╗███████╗███████╗████████╗
// ╚══██╔══╝██╔════╝██╔════╝╚══██╔══╝
//    ██║   █████╗  ███████╗   ██║
//    ██║   ██╔══╝  ╚════██║   ██║
//    ██║   ███████╗███████║   ██║
//    ╚═╝   ╚══════╝╚══════╝   ╚═╝
