use std::ops::RangeInclusive;

use crate::{types::PointIndex, worldsheet::Point};

/// Links between the live points of one time slice.
///
/// For each index `i` (live or not) this buffer stores:
///
/// - the nearest live index strictly after `i`, and
/// - the nearest live index strictly before `i`.
///
/// It is rebuilt from a slice once per step and then kept in sync with
/// erasures through [`LiveChain::unlink`], so finding the next live
/// neighbour never scans across an erased stretch.
#[derive(Debug, Clone, Default)]
pub struct LiveChain {
    alive: Vec<bool>,
    next: Vec<Option<PointIndex>>,
    prev: Vec<Option<PointIndex>>,
}

impl LiveChain {
    /// Creates an empty chain for `len` points, all of them erased.
    pub fn with_len(len: usize) -> Self {
        Self {
            alive: vec![false; len],
            next: vec![None; len],
            prev: vec![None; len],
        }
    }

    /// Number of indices covered, live or not.
    pub fn len(&self) -> usize {
        self.alive.len()
    }

    pub fn is_empty(&self) -> bool {
        self.alive.is_empty()
    }

    /// Resizes to `slice.len()` and relinks every index from `slice`.
    pub fn rebuild(&mut self, slice: &[Point]) {
        let len = slice.len();
        if self.alive.len() != len {
            self.alive.resize(len, false);
            self.next.resize(len, None);
            self.prev.resize(len, None);
        }

        for (flag, p) in self.alive.iter_mut().zip(slice) {
            *flag = p.is_alive();
        }

        let mut last = None;
        for i in 0..len {
            self.prev[i] = last;
            if self.alive[i] {
                last = Some(i);
            }
        }

        let mut last = None;
        for i in (0..len).rev() {
            self.next[i] = last;
            if self.alive[i] {
                last = Some(i);
            }
        }
    }

    #[cfg(test)]
    pub(crate) fn is_alive(&self, i: PointIndex) -> bool {
        self.alive[i]
    }

    /// Nearest live index after `i`, or `None` past the last live point.
    #[inline]
    pub fn next_live(&self, i: PointIndex) -> Option<PointIndex> {
        self.next[i]
    }

    /// Nearest live index before `i`, or `None` before the first live point.
    #[cfg(test)]
    pub(crate) fn prev_live(&self, i: PointIndex) -> Option<PointIndex> {
        self.prev[i]
    }

    /// Marks an inclusive range as erased and links around it.
    ///
    /// Only the links that pointed into the range are touched.
    ///
    /// ### Panics
    /// Panics if the range is empty or reaches past the chain.
    pub fn unlink(&mut self, range: RangeInclusive<PointIndex>) {
        let (lo, hi) = (*range.start(), *range.end());
        assert!(lo <= hi && hi < self.len(), "unlink {lo}..={hi} out of {}", self.len());

        let before = self.prev[lo];
        let after = self.next[hi];

        for flag in &mut self.alive[lo..=hi] {
            *flag = false;
        }

        // Everything from the live point before the range up to its end
        // used to see a next link inside the range.
        for link in &mut self.next[before.unwrap_or(0)..=hi] {
            *link = after;
        }
        let last = after.unwrap_or(self.len() - 1);
        for link in &mut self.prev[lo..=last] {
            *link = before;
        }
    }

    /// Iterator over live indices in ascending order.
    #[cfg(test)]
    pub(crate) fn live_indices(&self) -> impl Iterator<Item = PointIndex> + '_ {
        let first = match self.alive.first() {
            Some(true) => Some(0),
            Some(false) => self.next[0],
            None => None,
        };
        std::iter::successors(first, |&i| self.next[i])
    }
}
