use crate::{
    error::Result,
    phases,
    types::TimeIndex,
    worldsheet::Worldsheet,
};

/// A closed loop that pinched off a string.
///
/// The loop owns a copy of the parent's points `i..=m` across every slice.
/// Slices up to its birth are the parent's history; later slices are
/// written by [`StringLoop::evolve`]. Indices wrap around, so the first
/// and last points are neighbours.
#[derive(Debug, Clone)]
pub struct StringLoop {
    time_born: f64,
    birth_index: TimeIndex,
    time_index: TimeIndex,
    worldsheet: Worldsheet,
}

impl StringLoop {
    /// Creates a loop from a segment copied out of its parent at slice
    /// `birth_index`.
    pub fn spawn(birth_index: TimeIndex, step: f64, worldsheet: Worldsheet) -> Self {
        Self {
            time_born: birth_index as f64 * step,
            birth_index,
            time_index: birth_index,
            worldsheet,
        }
    }

    /// Simulation time at which the loop split off.
    pub fn time_born(&self) -> f64 {
        self.time_born
    }

    /// First frame in which the loop exists on its own.
    pub fn birth_index(&self) -> TimeIndex {
        self.birth_index
    }

    /// Last slice written so far.
    pub fn time_index(&self) -> TimeIndex {
        self.time_index
    }

    pub fn length(&self) -> usize {
        self.worldsheet.len()
    }

    pub fn worldsheet(&self) -> &Worldsheet {
        &self.worldsheet
    }

    pub fn is_finished(&self) -> bool {
        self.time_index + 1 >= self.worldsheet.slice_count()
    }

    /// Writes the next slice. Returns `Ok(false)` once the last slice is
    /// already written.
    pub fn advance(&mut self) -> Result<bool> {
        if self.is_finished() {
            return Ok(false);
        }
        phases::loop_phase(&mut self.worldsheet, self.time_index)?;
        self.time_index += 1;
        Ok(true)
    }

    /// Advances until the end time shared with the parent.
    pub fn evolve(&mut self) -> Result<()> {
        while self.advance()? {}
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::worldsheet::Point;
    use glam::DVec3;

    fn square(slices: usize) -> Worldsheet {
        let pts = [
            DVec3::new(0.0, 0.0, 0.0),
            DVec3::new(1.0, 0.0, 0.0),
            DVec3::new(1.0, 1.0, 0.0),
            DVec3::new(0.0, 1.0, 0.0),
        ];
        Worldsheet::with_initial(slices, &pts)
    }

    #[test]
    fn spawn_records_birth() {
        let lp = StringLoop::spawn(3, 0.5, square(6));
        assert_eq!(lp.birth_index(), 3);
        assert_eq!(lp.time_born(), 1.5);
        assert_eq!(lp.time_index(), 3);
        assert_eq!(lp.length(), 4);
    }

    #[test]
    fn evolve_fills_every_slice_after_birth() {
        let mut lp = StringLoop::spawn(0, 1.0, square(5));
        lp.evolve().unwrap();

        assert!(lp.is_finished());
        assert_eq!(lp.time_index(), 4);
        for j in 0..5 {
            assert!(lp.worldsheet().slice(j).iter().all(|p| p.is_alive()), "slice {j}");
        }
        assert!(!lp.advance().unwrap());
    }

    #[test]
    fn evolve_keeps_the_periodic_identity() {
        let mut sheet = square(6);
        // A moving history so the update does more than hold still.
        for i in 0..4 {
            let p = sheet.position(0, i).unwrap();
            sheet.set(1, i, Point::Alive(p + DVec3::new(0.0, 0.0, 0.25 * i as f64)));
        }
        let mut lp = StringLoop::spawn(1, 1.0, sheet);
        lp.evolve().unwrap();

        let ws = lp.worldsheet();
        let len = lp.length();
        for j in 1..5 {
            for i in 0..len {
                let expect = ws.position(j, (i + 1) % len).unwrap()
                    + ws.position(j, (i + len - 1) % len).unwrap()
                    - ws.position(j - 1, i).unwrap();
                assert_eq!(ws.position(j + 1, i), Some(expect), "slice {} point {i}", j + 1);
            }
        }
    }

    #[test]
    fn loop_born_on_the_last_slice_does_nothing() {
        let mut lp = StringLoop::spawn(2, 1.0, square(3));
        assert!(lp.is_finished());
        lp.evolve().unwrap();
        assert_eq!(lp.time_index(), 2);
    }
}
