use crate::core::geometry::Extent2i;
use crate::core::glam::IVec2;

use thiserror::Error;

/// The largest supported width or height. Every valid cell coordinate fits in a `u16`, which is what the edit log stores on
/// disk.
pub const MAX_GRID_DIM: u32 = 1 << 16;

#[derive(Clone, Debug, Eq, Error, PartialEq)]
pub enum GridError {
    #[error("grid dimensions {width}x{height} must each be in 1..={}", MAX_GRID_DIM)]
    InvalidDimensions { width: u32, height: u32 },
    #[error("unsupported channel depth {0}; expected 1 or 2 bytes per sample")]
    UnsupportedDepth(u8),
    #[error("sample buffer holds {actual} samples but the grid needs {expected}")]
    SampleCount { expected: usize, actual: usize },
    #[error("coordinate ({x}, {y}) is outside the {width}x{height} grid")]
    OutOfBounds {
        x: i64,
        y: i64,
        width: u32,
        height: u32,
    },
}

/// Number of bytes per stored elevation sample.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum ChannelDepth {
    One,
    Two,
}

impl ChannelDepth {
    pub fn from_bytes(bytes: u8) -> Result<Self, GridError> {
        match bytes {
            1 => Ok(Self::One),
            2 => Ok(Self::Two),
            other => Err(GridError::UnsupportedDepth(other)),
        }
    }

    pub fn bytes(self) -> usize {
        match self {
            Self::One => 1,
            Self::Two => 2,
        }
    }

    /// The largest storable sample value.
    pub fn max_value(self) -> u16 {
        match self {
            Self::One => u8::MAX as u16,
            Self::Two => u16::MAX,
        }
    }

    /// The number of discrete elevation steps, `2^(8 * bytes)`.
    pub fn num_levels(self) -> u32 {
        1 << (8 * self.bytes())
    }
}

/// Sample storage, one variant per channel depth.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum Samples {
    U8(Vec<u8>),
    U16(Vec<u16>),
}

impl Samples {
    pub fn zeroed(depth: ChannelDepth, len: usize) -> Self {
        match depth {
            ChannelDepth::One => Self::U8(vec![0; len]),
            ChannelDepth::Two => Self::U16(vec![0; len]),
        }
    }

    pub fn depth(&self) -> ChannelDepth {
        match self {
            Self::U8(_) => ChannelDepth::One,
            Self::U16(_) => ChannelDepth::Two,
        }
    }

    pub fn len(&self) -> usize {
        match self {
            Self::U8(s) => s.len(),
            Self::U16(s) => s.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// A cell coordinate that has been checked against the bounds of a [`HeightGrid`].
///
/// The only way to get one is a fallible conversion ([`HeightGrid::coord`], [`CoordinateMapper::map`](crate::CoordinateMapper::map)),
/// so grid accessors don't re-check bounds. Using a coordinate with a different, smaller grid is a bug and will panic.
#[derive(Clone, Copy, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub struct GridCoord {
    // Field order gives row-major ordering.
    y: u32,
    x: u32,
}

impl GridCoord {
    pub(crate) fn new_unchecked(x: u32, y: u32) -> Self {
        Self { y, x }
    }

    pub fn x(self) -> u32 {
        self.x
    }

    pub fn y(self) -> u32 {
        self.y
    }

    pub fn as_ivec2(self) -> IVec2 {
        IVec2::new(self.x as i32, self.y as i32)
    }
}

/// A dense 2D grid of elevation samples.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct HeightGrid {
    width: u32,
    height: u32,
    samples: Samples,
}

impl HeightGrid {
    /// A grid with every sample at zero.
    pub fn new(width: u32, height: u32, depth: ChannelDepth) -> Result<Self, GridError> {
        let len = Self::checked_len(width, height)?;
        Ok(Self {
            width,
            height,
            samples: Samples::zeroed(depth, len),
        })
    }

    pub fn from_samples(width: u32, height: u32, samples: Samples) -> Result<Self, GridError> {
        let expected = Self::checked_len(width, height)?;
        if samples.len() != expected {
            return Err(GridError::SampleCount {
                expected,
                actual: samples.len(),
            });
        }
        Ok(Self {
            width,
            height,
            samples,
        })
    }

    /// Decodes a headerless buffer of native-endian samples in row-major order.
    pub fn from_bytes(
        width: u32,
        height: u32,
        depth: ChannelDepth,
        bytes: &[u8],
    ) -> Result<Self, GridError> {
        let bytes_per_sample = depth.bytes();
        if bytes.len() % bytes_per_sample != 0 {
            return Err(GridError::SampleCount {
                expected: Self::checked_len(width, height)?,
                actual: bytes.len() / bytes_per_sample,
            });
        }
        let samples = match depth {
            ChannelDepth::One => Samples::U8(bytes.to_vec()),
            ChannelDepth::Two => Samples::U16(
                bytes
                    .chunks_exact(2)
                    .map(|pair| u16::from_ne_bytes([pair[0], pair[1]]))
                    .collect(),
            ),
        };
        Self::from_samples(width, height, samples)
    }

    /// The inverse of [`HeightGrid::from_bytes`].
    pub fn to_bytes(&self) -> Vec<u8> {
        match &self.samples {
            Samples::U8(s) => s.clone(),
            Samples::U16(s) => s.iter().flat_map(|v| v.to_ne_bytes()).collect(),
        }
    }

    fn checked_len(width: u32, height: u32) -> Result<usize, GridError> {
        if width == 0 || height == 0 || width > MAX_GRID_DIM || height > MAX_GRID_DIM {
            return Err(GridError::InvalidDimensions { width, height });
        }
        Ok(width as usize * height as usize)
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn depth(&self) -> ChannelDepth {
        self.samples.depth()
    }

    pub fn samples(&self) -> &Samples {
        &self.samples
    }

    pub fn extent(&self) -> Extent2i {
        Extent2i::from_min_and_shape(
            IVec2::ZERO,
            IVec2::new(self.width as i32, self.height as i32),
        )
    }

    pub fn coord(&self, x: i64, y: i64) -> Option<GridCoord> {
        (x >= 0 && y >= 0 && x < self.width as i64 && y < self.height as i64)
            .then(|| GridCoord::new_unchecked(x as u32, y as u32))
    }

    pub fn try_coord(&self, x: i64, y: i64) -> Result<GridCoord, GridError> {
        self.coord(x, y).ok_or(GridError::OutOfBounds {
            x,
            y,
            width: self.width,
            height: self.height,
        })
    }

    pub fn coord_at(&self, p: IVec2) -> Option<GridCoord> {
        self.coord(p.x as i64, p.y as i64)
    }

    #[inline]
    fn index(&self, c: GridCoord) -> usize {
        debug_assert!(c.x < self.width && c.y < self.height);
        c.y as usize * self.width as usize + c.x as usize
    }

    /// The raw sample, in `[0, 2^(8 * depth) - 1]`.
    #[inline]
    pub fn get(&self, c: GridCoord) -> u16 {
        let i = self.index(c);
        match &self.samples {
            Samples::U8(s) => s[i] as u16,
            Samples::U16(s) => s[i],
        }
    }

    /// The elevation level in `[0, 256)`.
    ///
    /// Two-byte samples are composed as `high + low / 256`: the high byte is the integer level and the low byte refines it.
    #[inline]
    pub fn level(&self, c: GridCoord) -> f32 {
        let i = self.index(c);
        match &self.samples {
            Samples::U8(s) => f32::from(s[i]),
            Samples::U16(s) => {
                let [low, high] = s[i].to_le_bytes();
                f32::from(high) + f32::from(low) / 256.0
            }
        }
    }

    /// Writes `value` (or the current value plus `value` when `is_delta`), saturating at the channel range.
    ///
    /// Returns the change that was actually stored, which differs from the requested one when the sample saturates.
    pub fn set(&mut self, c: GridCoord, value: i32, is_delta: bool) -> i32 {
        let i = self.index(c);
        match &mut self.samples {
            Samples::U8(s) => {
                let old = s[i] as i32;
                let v = if is_delta {
                    value.saturating_add(old)
                } else {
                    value
                };
                s[i] = v.clamp(0, u8::MAX as i32) as u8;
                s[i] as i32 - old
            }
            Samples::U16(s) => {
                let old = s[i] as i32;
                let v = if is_delta {
                    value.saturating_add(old)
                } else {
                    value
                };
                s[i] = v.clamp(0, u16::MAX as i32) as u16;
                s[i] as i32 - old
            }
        }
    }

    /// Reverses the row order, turning the first row into the last.
    pub fn flip_rows(&mut self) {
        let w = self.width as usize;
        let h = self.height as usize;
        match &mut self.samples {
            Samples::U8(s) => flip_rows(s, w, h),
            Samples::U16(s) => flip_rows(s, w, h),
        }
    }
}

fn flip_rows<T>(values: &mut [T], width: usize, height: usize) {
    for row in 0..height / 2 {
        let (top, bottom) = values.split_at_mut((height - row - 1) * width);
        top[row * width..(row + 1) * width].swap_with_slice(&mut bottom[..width]);
    }
}

// ████████╗███████╗███████╗████████╗
// ╚══██╔══╝██╔════╝██╔════╝╚══██╔══╝
//    ██║   █████╗  ███████╗   ██║
//    ██║   ██╔══╝  ╚════██║   ██║
//    ██║   ███████╗███████║   ██║
//    ╚═╝   ╚══════╝╚══════╝   ╚═╝
