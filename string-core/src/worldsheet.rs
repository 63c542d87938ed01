use std::ops::RangeInclusive;

use glam::DVec3;

use crate::types::{PointIndex, TimeIndex};

/// State of one point of a string at one time slice.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Point {
    Alive(DVec3),
    /// Absorbed into a loop, or not yet computed.
    Erased,
}

impl Point {
    #[inline]
    pub fn position(self) -> Option<DVec3> {
        match self {
            Point::Alive(p) => Some(p),
            Point::Erased => None,
        }
    }

    #[inline]
    pub fn is_alive(self) -> bool {
        matches!(self, Point::Alive(_))
    }

    /// Coordinates for plotting; an erased point reads as three NaNs.
    #[inline]
    pub fn coords(self) -> [f64; 3] {
        match self {
            Point::Alive(p) => p.to_array(),
            Point::Erased => [f64::NAN; 3],
        }
    }
}

/// Trajectory of a string: its shape at every time slice.
///
/// Stored densely, slice-major, so slice `j` is the contiguous run
/// `points[j * len..(j + 1) * len]`. The coordinate axis is implicit in
/// [`DVec3`], giving the logical shape `(slices, len, 3)`.
///
/// Slices that have not been computed yet hold [`Point::Erased`].
#[derive(Debug, Clone, PartialEq)]
pub struct Worldsheet {
    slices: usize,
    len: usize,
    points: Vec<Point>,
}

impl Worldsheet {
    /// Allocates `slices` slices of `initial.len()` points and fills slice 0.
    pub fn with_initial(slices: usize, initial: &[DVec3]) -> Self {
        let len = initial.len();
        let mut points = vec![Point::Erased; slices * len];
        for (dst, &p) in points.iter_mut().zip(initial) {
            *dst = Point::Alive(p);
        }
        Self {
            slices,
            len,
            points,
        }
    }

    /// `(slices, points per slice, 3)`.
    pub fn shape(&self) -> (usize, usize, usize) {
        (self.slices, self.len, 3)
    }

    pub fn slice_count(&self) -> usize {
        self.slices
    }

    /// Points per slice.
    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// ### Panics
    /// Panics if `j` or `i` is out of range.
    #[inline]
    pub fn get(&self, j: TimeIndex, i: PointIndex) -> Point {
        self.slice(j)[i]
    }

    #[inline]
    pub fn position(&self, j: TimeIndex, i: PointIndex) -> Option<DVec3> {
        self.get(j, i).position()
    }

    #[inline]
    pub fn coords(&self, j: TimeIndex, i: PointIndex) -> [f64; 3] {
        self.get(j, i).coords()
    }

    #[inline]
    pub fn set(&mut self, j: TimeIndex, i: PointIndex, p: Point) {
        self.slice_mut(j)[i] = p;
    }

    pub fn slice(&self, j: TimeIndex) -> &[Point] {
        assert!(j < self.slices, "time index {j} out of {} slices", self.slices);
        &self.points[j * self.len..(j + 1) * self.len]
    }

    pub fn slice_mut(&mut self, j: TimeIndex) -> &mut [Point] {
        assert!(j < self.slices, "time index {j} out of {} slices", self.slices);
        &mut self.points[j * self.len..(j + 1) * self.len]
    }

    /// Erases an inclusive range of points in one slice.
    pub fn erase(&mut self, j: TimeIndex, range: RangeInclusive<PointIndex>) {
        for p in &mut self.slice_mut(j)[range] {
            *p = Point::Erased;
        }
    }

    /// Copies the points `range` of every slice into a new worldsheet.
    ///
    /// The copy shares nothing with `self`; later writes to either side
    /// are not seen by the other.
    pub fn segment(&self, range: RangeInclusive<PointIndex>) -> Worldsheet {
        let (lo, hi) = (*range.start(), *range.end());
        assert!(lo <= hi && hi < self.len, "segment {lo}..={hi} out of {} points", self.len);
        let len = hi - lo + 1;
        let mut points = Vec::with_capacity(self.slices * len);
        for j in 0..self.slices {
            points.extend_from_slice(&self.slice(j)[lo..=hi]);
        }
        Worldsheet {
            slices: self.slices,
            len,
            points,
        }
    }

    /// Maximal runs of consecutive live points in slice `j`, in order.
    ///
    /// Each run is one polyline for a renderer; erased points split runs
    /// the way NaN gaps split a plotted line.
    pub fn runs(&self, j: TimeIndex) -> Vec<Vec<DVec3>> {
        let mut runs = Vec::new();
        let mut current = Vec::new();
        for p in self.slice(j) {
            match p {
                Point::Alive(pos) => current.push(*pos),
                Point::Erased => {
                    if !current.is_empty() {
                        runs.push(std::mem::take(&mut current));
                    }
                }
            }
        }
        if !current.is_empty() {
            runs.push(current);
        }
        runs
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn line(n: usize) -> Vec<DVec3> {
        (0..n).map(|k| DVec3::new(k as f64, 0.0, 0.0)).collect()
    }

    #[test]
    fn with_initial_fills_first_slice_only() {
        let sheet = Worldsheet::with_initial(4, &line(3));

        assert_eq!(sheet.shape(), (4, 3, 3));
        assert_eq!(sheet.position(0, 2), Some(DVec3::new(2.0, 0.0, 0.0)));
        for j in 1..4 {
            assert!(sheet.slice(j).iter().all(|p| !p.is_alive()));
        }
    }

    #[test]
    fn erased_points_read_as_nan() {
        let mut sheet = Worldsheet::with_initial(2, &line(3));
        sheet.erase(0, 1..=1);

        assert_eq!(sheet.coords(0, 0), [0.0, 0.0, 0.0]);
        assert!(sheet.coords(0, 1).iter().all(|c| c.is_nan()));
        assert_eq!(sheet.position(0, 1), None);
    }

    #[test]
    fn segment_copies_every_slice_of_the_range() {
        let mut sheet = Worldsheet::with_initial(3, &line(5));
        sheet.set(2, 3, Point::Alive(DVec3::splat(9.0)));

        let seg = sheet.segment(1..=3);

        assert_eq!(seg.shape(), (3, 3, 3));
        assert_eq!(seg.position(0, 0), Some(DVec3::new(1.0, 0.0, 0.0)));
        assert_eq!(seg.position(0, 2), Some(DVec3::new(3.0, 0.0, 0.0)));
        assert_eq!(seg.position(2, 2), Some(DVec3::splat(9.0)));
        assert_eq!(seg.get(1, 0), Point::Erased);
    }

    #[test]
    fn segment_is_independent_of_its_source() {
        let mut sheet = Worldsheet::with_initial(2, &line(4));
        let mut seg = sheet.segment(0..=1);

        sheet.erase(0, 0..=3);
        assert!(seg.get(0, 0).is_alive());

        seg.set(1, 1, Point::Alive(DVec3::ONE));
        assert_eq!(sheet.get(1, 1), Point::Erased);
    }

    #[test]
    fn runs_split_at_erased_points() {
        let mut sheet = Worldsheet::with_initial(1, &line(6));
        sheet.erase(0, 2..=3);

        let runs = sheet.runs(0);
        assert_eq!(runs.len(), 2);
        assert_eq!(runs[0], line(2));
        assert_eq!(runs[1], vec![DVec3::new(4.0, 0.0, 0.0), DVec3::new(5.0, 0.0, 0.0)]);
    }

    #[test]
    #[should_panic]
    fn slice_out_of_range_panics() {
        let sheet = Worldsheet::with_initial(2, &line(2));
        let _ = sheet.slice(2);
    }
}
