use crate::{Dbu, Point};

/// An axis-aligned rectangle, inclusive of its boundary on both ends.
///
/// **Invariant**: `xl <= xh` and `yl <= yh`. A rectangle with `xl == xh` or `yl == yh` is
/// degenerate (a point or a zero-width slab); both occur legitimately as maximal rectangles of a
/// thin polygon slice, so `Rect` does not reject them.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub struct Rect {
    pub xl: Dbu,
    pub yl: Dbu,
    pub xh: Dbu,
    pub yh: Dbu,
}

impl Rect {
    pub fn new(xl: Dbu, yl: Dbu, xh: Dbu, yh: Dbu) -> Self {
        debug_assert!(xl <= xh && yl <= yh, "Rect corners out of order");
        Rect { xl, yl, xh, yh }
    }

    pub fn from_points(lo: Point, hi: Point) -> Self {
        Rect::new(lo.x.min(hi.x), lo.y.min(hi.y), lo.x.max(hi.x), lo.y.max(hi.y))
    }

    pub fn width(&self) -> Dbu {
        self.xh - self.xl
    }

    pub fn height(&self) -> Dbu {
        self.yh - self.yl
    }

    /// The narrower of the two extents; DRC rules are keyed on this.
    pub fn min_width(&self) -> Dbu {
        self.width().min(self.height())
    }

    pub fn area(&self) -> i128 {
        self.width() as i128 * self.height() as i128
    }

    pub fn center(&self) -> Point {
        Point::new((self.xl + self.xh) / 2, (self.yl + self.yh) / 2)
    }

    pub fn ll(&self) -> Point {
        Point::new(self.xl, self.yl)
    }

    pub fn ur(&self) -> Point {
        Point::new(self.xh, self.yh)
    }

    pub fn contains_point(&self, p: Point) -> bool {
        self.xl <= p.x && p.x <= self.xh && self.yl <= p.y && p.y <= self.yh
    }

    /// `true` if `p` is in the strict interior of `self` on at least one axis (used by the
    /// feedthrough-pin-split check, which only fires when a pin is not already at an endpoint).
    pub fn strictly_contains_point(&self, p: Point) -> bool {
        self.xl < p.x && p.x < self.xh && self.yl < p.y && p.y < self.yh
    }

    pub fn contains_rect(&self, other: &Rect) -> bool {
        self.xl <= other.xl && other.xh <= self.xh && self.yl <= other.yl && other.yh <= self.yh
    }

    pub fn intersects(&self, other: &Rect) -> bool {
        self.xl <= other.xh && other.xl <= self.xh && self.yl <= other.yh && other.yl <= self.yh
    }

    /// The intersection rectangle, or `None` if the two rectangles don't overlap (not even at a
    /// shared edge).
    pub fn intersection(&self, other: &Rect) -> Option<Rect> {
        let xl = self.xl.max(other.xl);
        let yl = self.yl.max(other.yl);
        let xh = self.xh.min(other.xh);
        let yh = self.yh.min(other.yh);
        (xl <= xh && yl <= yh).then(|| Rect::new(xl, yl, xh, yh))
    }

    /// The generalized intersection used throughout the DRC engine: like [`Self::intersection`]
    /// but defined even when the rectangles don't overlap, by letting the result have `xl > xh`
    /// or `yl > yh`. Used to compute the `(distX, distY)` gap a spacing check measures.
    pub fn generalized_intersection(&self, other: &Rect) -> GapRect {
        GapRect {
            xl: self.xl.max(other.xl),
            yl: self.yl.max(other.yl),
            xh: self.xh.min(other.xh),
            yh: self.yh.min(other.yh),
        }
    }

    /// Grows the rectangle by `d` on every side.
    pub fn bloat(&self, d: Dbu) -> Rect {
        Rect::new(self.xl - d, self.yl - d, self.xh + d, self.yh + d)
    }

    /// Grows the rectangle by `(dx, dy)` independently on each axis.
    pub fn bloat_xy(&self, dx: Dbu, dy: Dbu) -> Rect {
        Rect::new(self.xl - dx, self.yl - dy, self.xh + dx, self.yh + dy)
    }

    pub fn is_on_grid(&self, grid: Dbu) -> bool {
        grid == 0 || (self.xl % grid == 0 && self.yl % grid == 0 && self.xh % grid == 0 && self.yh % grid == 0)
    }
}

/// The result of [`Rect::generalized_intersection`]: may be "negative" on either axis, in which
/// case `-gap` is the clearance between the two rectangles on that axis.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub struct GapRect {
    pub xl: Dbu,
    pub yl: Dbu,
    pub xh: Dbu,
    pub yh: Dbu,
}

impl GapRect {
    /// Parallel-run length: the positive overlap along whichever axis the two rectangles run
    /// alongside each other.
    pub fn prl(&self) -> Dbu {
        (-(self.xh - self.xl)).max(-(self.yh - self.yl)).max(0)
    }

    /// `(distX, distY)`: the gap between the two rectangles on each axis (0 or negative means
    /// they overlap on that axis).
    pub fn dist_xy(&self) -> (Dbu, Dbu) {
        ((self.xl - self.xh).max(0), (self.yl - self.yh).max(0))
    }

    pub fn dist_sq(&self) -> i128 {
        let (dx, dy) = self.dist_xy();
        dx as i128 * dx as i128 + dy as i128 * dy as i128
    }

    pub fn max_xy(&self) -> Dbu {
        (self.xh - self.xl).max(self.yh - self.yl)
    }

    /// The true (possibly empty/negative) rectangle, if the two inputs actually overlap on both
    /// axes.
    pub fn as_rect(&self) -> Option<Rect> {
        (self.xl <= self.xh && self.yl <= self.yh).then(|| Rect::new(self.xl, self.yl, self.xh, self.yh))
    }

    /// A valid `Rect` covering the gap region regardless of sign, by taking each axis's corners
    /// in sorted order. On an axis where the two inputs overlap this is the overlap span (the
    /// parallel-run range); on an axis where they don't, it's the clearance span between them.
    /// Used to give a spacing violation a concrete marker bbox.
    pub fn envelope_rect(&self) -> Rect {
        Rect::new(self.xl.min(self.xh), self.yl.min(self.yh), self.xl.max(self.xh), self.yl.max(self.yh))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn intersection_of_disjoint_rects_is_none() {
        let a = Rect::new(0, 0, 10, 10);
        let b = Rect::new(20, 20, 30, 30);
        assert_eq!(a.intersection(&b), None);
    }

    #[test]
    fn generalized_intersection_reports_gap() {
        let a = Rect::new(0, 0, 10, 100);
        let b = Rect::new(50, 0, 60, 100);
        let gap = a.generalized_intersection(&b);
        assert_eq!(gap.dist_xy(), (40, 0));
        assert_eq!(gap.prl(), 100);
    }

    #[test]
    fn bloat_grows_symmetrically() {
        let r = Rect::new(0, 0, 10, 10).bloat(5);
        assert_eq!(r, Rect::new(-5, -5, 15, 15));
    }
}
