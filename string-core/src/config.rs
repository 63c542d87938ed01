use crate::error::{Error, Result};

/// Separation below which two first-step neighbours count as coincident,
/// and the slack allowed around one lattice unit for the diagonal case.
pub const LIGHT_CONE_TOLERANCE: f64 = 1e-3;

/// Relative tolerance for two points to count as one intersection.
pub const INTERSECT_RTOL: f64 = 1e-5;

/// Absolute tolerance for two points to count as one intersection.
pub const INTERSECT_ATOL: f64 = 1e-8;

/// Settings for one simulation run.
///
/// Geometry (`lattice_size`, `step`) is fixed when a string is built;
/// `self_intersect` is read each time a string is advanced.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Config {
    /// Number of lattice cells along one edge of the box (`N`).
    pub lattice_size: usize,
    /// Lattice spacing and time step (`δ`).
    pub step: f64,
    /// How many times each random-walk move is repeated (`R`).
    pub repeat: usize,
    pub string_count: usize,
    pub frame_count: usize,
    /// Split off closed loops where a string meets itself.
    pub self_intersect: bool,
    /// Read by the front end only. No export format exists.
    pub save_animation: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            lattice_size: 32,
            step: 1.0,
            repeat: 8,
            string_count: 5,
            frame_count: 50,
            self_intersect: false,
            save_animation: false,
        }
    }
}

impl Config {
    /// Edge length of the enclosing box, `N * δ`.
    pub fn box_len(&self) -> f64 {
        self.lattice_size as f64 * self.step
    }

    /// Distance from the centre of the box to each face.
    pub fn half_width(&self) -> f64 {
        self.box_len() / 2.0
    }

    /// Time every string of an ensemble is integrated to.
    pub fn end_time(&self) -> f64 {
        self.frame_count as f64 * self.step
    }

    /// Checks the box geometry and the walk repeat factor.
    ///
    /// ### Returns
    /// - `Ok(())` if a walk can be started inside the box.
    /// - `Err(Error::Configuration)` naming the first offending field.
    pub fn validate(&self) -> Result<()> {
        if self.lattice_size == 0 {
            return Err(Error::config("lattice_size", "must be at least 1"));
        }
        if !self.step.is_finite() || self.step <= 0.0 {
            return Err(Error::config(
                "step",
                format!("must be finite and positive, got {}", self.step),
            ));
        }
        check_repeat(self.repeat)
    }

    /// Number of time steps needed to reach `end_time`.
    ///
    /// Mirrors `int(end_time / step)`: partial steps are dropped. A tiny
    /// slack absorbs rounding in products like `frames * step / step`.
    ///
    /// ### Returns
    /// - `Ok(steps)`, where `steps + 1` slices are still addressable.
    /// - `Err(Error::Configuration)` for a negative, non-finite or
    ///   too large `end_time`.
    pub fn time_steps(&self, end_time: f64) -> Result<usize> {
        if !end_time.is_finite() || end_time < 0.0 {
            return Err(Error::config(
                "end_time",
                format!("must be finite and non-negative, got {end_time}"),
            ));
        }
        let steps = (end_time / self.step + 1e-9).floor();
        // `as` saturates, so anything at or past usize::MAX must be caught here.
        if steps >= usize::MAX as f64 {
            return Err(Error::config(
                "end_time",
                format!("{end_time} needs more time steps than can be stored"),
            ));
        }
        Ok(steps as usize)
    }
}

pub(crate) fn check_repeat(repeat: usize) -> Result<()> {
    if repeat == 0 {
        return Err(Error::config("repeat", "must be at least 1"));
    }
    Ok(())
}
