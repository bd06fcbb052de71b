use crate::glam::IVec2;

use itertools::iproduct;

/// An axis-aligned rectangle of integer lattice points.
///
/// `shape` is always non-negative; an extent with a zero component contains no points. The constructors clip the shape so
/// that it and `minimum + shape` stay representable as `i32`, dropping the upper end of extents that would not fit.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct Extent2i {
    pub minimum: IVec2,
    pub shape: IVec2,
}

impl Extent2i {
    pub fn from_min_and_shape(minimum: IVec2, shape: IVec2) -> Self {
        Self::from_min_and_lub(
            minimum,
            [
                i64::from(minimum.x) + i64::from(shape.x),
                i64::from(minimum.y) + i64::from(shape.y),
            ],
        )
    }

    /// `max` is inclusive.
    pub fn from_min_and_max(minimum: IVec2, max: IVec2) -> Self {
        Self::from_min_and_lub(minimum, [i64::from(max.x) + 1, i64::from(max.y) + 1])
    }

    /// The `(2 * radius + 1)` square centered on `center`, clipped to the `i32` range.
    pub fn square(center: IVec2, radius: i32) -> Self {
        let radius = radius.max(0);
        Self::from_min_and_max(
            IVec2::new(center.x.saturating_sub(radius), center.y.saturating_sub(radius)),
            IVec2::new(center.x.saturating_add(radius), center.y.saturating_add(radius)),
        )
    }

    fn from_min_and_lub(minimum: IVec2, lub: [i64; 2]) -> Self {
        fn span(lo: i32, lub: i64) -> i32 {
            (lub - i64::from(lo)).clamp(0, i64::from(i32::MAX - lo.max(0))) as i32
        }

        Self {
            minimum,
            shape: IVec2::new(span(minimum.x, lub[0]), span(minimum.y, lub[1])),
        }
    }

    /// The inclusive maximum. Meaningless for empty extents.
    pub fn max(&self) -> IVec2 {
        self.minimum + self.shape - IVec2::ONE
    }

    pub fn least_upper_bound(&self) -> IVec2 {
        self.minimum + self.shape
    }

    pub fn is_empty(&self) -> bool {
        self.shape.x == 0 || self.shape.y == 0
    }

    pub fn num_points(&self) -> usize {
        self.shape.x as usize * self.shape.y as usize
    }

    pub fn contains(&self, p: IVec2) -> bool {
        let lub = self.least_upper_bound();
        p.x >= self.minimum.x && p.y >= self.minimum.y && p.x < lub.x && p.y < lub.y
    }

    pub fn intersection(&self, other: &Self) -> Self {
        let minimum = self.minimum.max(other.minimum);
        let lub = self.least_upper_bound().min(other.least_upper_bound());
        Self::from_min_and_lub(minimum, [i64::from(lub.x), i64::from(lub.y)])
    }

    /// Iterates over all points in row-major order (`x` varies fastest).
    pub fn iter2(&self) -> impl Iterator<Item = IVec2> {
        let lub = self.least_upper_bound();
        iproduct!(self.minimum.y..lub.y, self.minimum.x..lub.x).map(|(y, x)| IVec2::new(x, y))
    }
}

// ████████╗███████╗███████╗████████╗
// ╚══██╔══╝██╔════╝██╔════╝╚══██╔══╝
//    ██║   █████╗  ███████╗   ██║
//    ██║   ██╔══╝  ╚════██║   ██║
//    ██║   ███████╗███████║   ██║
//    ╚═╝   ╚══════╝╚══════╝   ╚═╝

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn square_extent_covers_radius_on_both_sides() {
        let e = Extent2i::square(IVec2::new(5, -3), 2);
        assert_eq!(e.minimum, IVec2::new(3, -5));
        assert_eq!(e.max(), IVec2::new(7, -1));
        assert_eq!(e.num_points(), 25);
        assert_eq!(e.iter2().count(), 25);
    }

    #[test]
    fn zero_radius_square_is_single_point() {
        let e = Extent2i::square(IVec2::new(1, 1), 0);
        assert_eq!(e.iter2().collect::<Vec<_>>(), vec![IVec2::new(1, 1)]);
    }

    #[test]
    fn iteration_is_row_major() {
        let e = Extent2i::from_min_and_shape(IVec2::ZERO, IVec2::new(2, 2));
        assert_eq!(
            e.iter2().collect::<Vec<_>>(),
            vec![
                IVec2::new(0, 0),
                IVec2::new(1, 0),
                IVec2::new(0, 1),
                IVec2::new(1, 1)
            ]
        );
    }

    #[test]
    fn disjoint_intersection_is_empty() {
        let a = Extent2i::from_min_and_shape(IVec2::ZERO, IVec2::splat(4));
        let b = Extent2i::from_min_and_shape(IVec2::splat(10), IVec2::splat(4));
        let i = a.intersection(&b);
        assert!(i.is_empty());
        assert_eq!(i.iter2().count(), 0);
    }

    #[test]
    fn square_near_integer_limits_is_clipped() {
        let e = Extent2i::square(IVec2::new(i32::MAX, i32::MIN), 3);
        assert_eq!(e.minimum, IVec2::new(i32::MAX - 3, i32::MIN));
        assert_eq!(e.least_upper_bound(), IVec2::new(i32::MAX, i32::MIN + 4));
        assert_eq!(e.num_points(), 3 * 4);

        let huge = Extent2i::square(IVec2::ZERO, i32::MAX);
        assert_eq!(huge.minimum, IVec2::splat(-i32::MAX));
        assert_eq!(huge.shape, IVec2::splat(i32::MAX));
    }

    #[test]
    fn intersection_of_far_apart_extents_is_empty() {
        let low = Extent2i::square(IVec2::splat(i32::MIN), 1);
        let high = Extent2i::square(IVec2::splat(i32::MAX), 1);
        assert!(low.intersection(&high).is_empty());
        assert!(high.intersection(&low).is_empty());

        let grid = Extent2i::from_min_and_shape(IVec2::ZERO, IVec2::splat(16));
        let clipped = Extent2i::square(IVec2::new(1, 1), 1 << 16).intersection(&grid);
        assert_eq!(clipped, grid);
    }

    #[test]
    fn contains_respects_exclusive_upper_bound() {
        let e = Extent2i::from_min_and_shape(IVec2::ZERO, IVec2::new(3, 2));
        assert!(e.contains(IVec2::new(2, 1)));
        assert!(!e.contains(IVec2::new(3, 1)));
        assert!(!e.contains(IVec2::new(-1, 0)));
    }
}
