use glam::DVec3;
use rand::Rng;

use crate::{
    config::check_repeat,
    error::{Error, Result},
    lattice::MOVES,
};

/// Initial shape of a string: a random walk on the lattice that starts
/// strictly inside the box and stops once it has left it.
#[derive(Debug, Clone)]
pub struct LatticeWalk {
    pub points: Vec<DVec3>,
}

impl LatticeWalk {
    /// Draws a lattice-aligned origin strictly inside the box, then walks.
    ///
    /// ### Parameters
    /// - `half_width` - Distance from the box centre to each face.
    /// - `step` - Lattice spacing; every move has this length.
    /// - `repeat` - How many times each chosen move is applied in a row.
    /// - `rng` - Random source. All draws for one walk come from it.
    ///
    /// ### Returns
    /// The walk, or `Error::Configuration` for a degenerate box, a
    /// non-positive step or a zero repeat factor.
    pub fn generate(half_width: f64, step: f64, repeat: usize, rng: &mut impl Rng) -> Result<Self> {
        let origin = random_origin(half_width, step, rng)?;
        Self::from_origin(origin, half_width, step, repeat, rng)
    }

    /// Walks from a given origin.
    ///
    /// Each iteration picks one of the six moves uniformly and applies it
    /// `repeat` times, appending one point per application. The exit test
    /// runs between runs, so the final run is always completed.
    pub fn from_origin(
        origin: DVec3,
        half_width: f64,
        step: f64,
        repeat: usize,
        rng: &mut impl Rng,
    ) -> Result<Self> {
        check_box(half_width, step)?;
        check_repeat(repeat)?;
        if !inside(origin, half_width) {
            return Err(Error::config(
                "origin",
                format!("{origin} is not strictly inside a box of half width {half_width}"),
            ));
        }

        let mut points = vec![origin];
        let mut current = origin;
        while inside(current, half_width) {
            let dir = MOVES[rng.random_range(0..MOVES.len())] * step;
            for _ in 0..repeat {
                current += dir;
                points.push(current);
            }
        }

        Ok(Self { points })
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }
}

/// `true` while every coordinate is strictly inside the box.
#[inline]
pub fn inside(p: DVec3, half_width: f64) -> bool {
    p.abs().max_element() < half_width
}

/// Draws each axis as a truncated uniform cell offset, redrawing the rare
/// value that lands on a face.
fn random_origin(half_width: f64, step: f64, rng: &mut impl Rng) -> Result<DVec3> {
    check_box(half_width, step)?;
    let cells = half_width / step;
    let mut axis = || loop {
        let c = rng.random_range(-cells..cells).trunc() * step;
        if c.abs() < half_width {
            break c;
        }
    };
    let x = axis();
    let y = axis();
    let z = axis();
    Ok(DVec3::new(x, y, z))
}

fn check_box(half_width: f64, step: f64) -> Result<()> {
    if !half_width.is_finite() || half_width <= 0.0 {
        return Err(Error::config(
            "half_width",
            format!("must be finite and positive, got {half_width}"),
        ));
    }
    if !step.is_finite() || step <= 0.0 {
        return Err(Error::config(
            "step",
            format!("must be finite and positive, got {step}"),
        ));
    }
    Ok(())
}
