use glam::DVec3;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

use crate::{
    config::{Config, check_repeat},
    error::{Error, Result},
    live_chain::LiveChain,
    phases,
    string_loop::StringLoop,
    types::{Seed, TimeIndex},
    walk::LatticeWalk,
    worldsheet::{Point, Worldsheet},
};

/// An open cosmic string with both ends fixed.
///
/// A string owns its worldsheet, the loops that have split off it, and a
/// private random stream seeded from `seed`. Nothing is shared between
/// strings, so the outcome depends only on the seed and the config.
#[derive(Debug, Clone)]
pub struct CosmicString {
    seed: Seed,
    step: f64,
    end_time: f64,
    time_index: TimeIndex,
    worldsheet: Worldsheet,
    loops: Vec<StringLoop>,
    faults: Vec<Error>,
    rng: ChaCha8Rng,
    chain: LiveChain,
}

impl CosmicString {
    /// Walks a new string inside the box described by `cfg`.
    ///
    /// ### Parameters
    /// - `seed` - Seeds the walk and every later random draw.
    /// - `end_time` - Time to integrate to; the worldsheet gets
    ///   `end_time / step + 1` slices.
    /// - `repeat` - Random-walk repeat factor. Overrides `cfg.repeat`.
    /// - `cfg` - Box size and step.
    ///
    /// ### Returns
    /// The string with slice 0 filled, or `Error::Configuration`.
    pub fn new(seed: Seed, end_time: f64, repeat: usize, cfg: &Config) -> Result<Self> {
        cfg.validate()?;
        check_repeat(repeat)?;
        let steps = cfg.time_steps(end_time)?;

        let mut rng = ChaCha8Rng::seed_from_u64(seed);
        let walk = LatticeWalk::generate(cfg.half_width(), cfg.step, repeat, &mut rng)?;
        log::debug!("string {seed}: walked {} points", walk.len());

        Self::assemble(seed, cfg.step, end_time, steps, &walk.points, rng)
    }

    /// Builds a string from a given initial shape instead of a walk.
    ///
    /// The seed still drives the first-step velocity draws.
    pub fn from_points(seed: Seed, points: &[DVec3], end_time: f64, cfg: &Config) -> Result<Self> {
        cfg.validate()?;
        if points.len() < 2 {
            return Err(Error::config(
                "points",
                format!("a string needs at least two points, got {}", points.len()),
            ));
        }
        let steps = cfg.time_steps(end_time)?;
        let rng = ChaCha8Rng::seed_from_u64(seed);
        Self::assemble(seed, cfg.step, end_time, steps, points, rng)
    }

    fn assemble(
        seed: Seed,
        step: f64,
        end_time: f64,
        steps: usize,
        points: &[DVec3],
        rng: ChaCha8Rng,
    ) -> Result<Self> {
        let slices = steps + 1;
        let fits = slices
            .checked_mul(points.len())
            .is_some_and(|total| total <= isize::MAX as usize / size_of::<Point>());
        if !fits {
            return Err(Error::config(
                "end_time",
                format!("{slices} slices of {} points do not fit in memory", points.len()),
            ));
        }

        Ok(Self {
            seed,
            step,
            end_time,
            time_index: 0,
            worldsheet: Worldsheet::with_initial(slices, points),
            loops: Vec::new(),
            faults: Vec::new(),
            rng,
            chain: LiveChain::with_len(points.len()),
        })
    }

    pub fn seed(&self) -> Seed {
        self.seed
    }

    pub fn end_time(&self) -> f64 {
        self.end_time
    }

    /// Number of points, fixed at creation.
    pub fn length(&self) -> usize {
        self.worldsheet.len()
    }

    pub fn worldsheet(&self) -> &Worldsheet {
        &self.worldsheet
    }

    /// Loops in the order they split off.
    pub fn loops(&self) -> &[StringLoop] {
        &self.loops
    }

    /// Boundary faults met so far. Each faulting point was pinned.
    pub fn faults(&self) -> &[Error] {
        &self.faults
    }

    /// Last slice written so far.
    pub fn time_index(&self) -> TimeIndex {
        self.time_index
    }

    pub fn is_finished(&self) -> bool {
        self.time_index + 1 >= self.worldsheet.slice_count()
    }

    /// Writes the next slice of the string.
    ///
    /// With `cfg.self_intersect` set, loops are split off the current
    /// slice first. Loops created here are not evolved; see
    /// [`CosmicString::evolve`].
    ///
    /// ### Returns
    /// - `Ok(true)` after writing a slice.
    /// - `Ok(false)` if the end time was already reached.
    /// - `Err(Error::EndpointErased)` or `Err(Error::ErasedSample)` if the
    ///   worldsheet lost a point it must never lose.
    pub fn advance(&mut self, cfg: &Config) -> Result<bool> {
        if self.is_finished() {
            return Ok(false);
        }
        let j = self.time_index;
        self.chain.rebuild(self.worldsheet.slice(j));

        if cfg.self_intersect {
            let spawned = phases::intersection_phase(&mut self.worldsheet, j, self.step, &mut self.chain);
            self.loops.extend(spawned);
        }

        if j == 0 {
            phases::first_step_phase(&mut self.worldsheet, self.step, &mut self.rng);
        } else {
            let faults = phases::steady_state_phase(&mut self.worldsheet, j, &self.chain)?;
            for fault in &faults {
                log::warn!("string {}: {fault}; point pinned", self.seed);
            }
            self.faults.extend(faults);
        }

        phases::check_endpoints(&self.worldsheet, j + 1)?;
        self.time_index = j + 1;
        Ok(true)
    }

    /// Advances to the end time, then evolves every loop to the same end.
    pub fn evolve(&mut self, cfg: &Config) -> Result<()> {
        while self.advance(cfg)? {}
        for lp in &mut self.loops {
            lp.evolve()?;
        }
        log::debug!(
            "string {}: evolved {} slices, {} loops, {} faults",
            self.seed,
            self.worldsheet.slice_count(),
            self.loops.len(),
            self.faults.len()
        );
        Ok(())
    }
}
