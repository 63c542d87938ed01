//! A batch of independent strings evolved to a shared end time.
//!
//! This is the engine's boundary with a renderer: the renderer builds an
//! [`Ensemble`] from a [`Config`] and then only reads it, one frame at a
//! time, through [`Ensemble::frame_polylines`] or the raw worldsheets.

use glam::DVec3;

use crate::{
    config::Config,
    error::Result,
    string::CosmicString,
    types::{Seed, TimeIndex},
};

/// Which kind of curve a polyline belongs to.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CurveKind {
    String,
    Loop,
}

/// One drawable run of live points.
#[derive(Clone, Debug, PartialEq)]
pub struct Polyline {
    /// Seed of the string this curve belongs to (or split off from).
    pub seed: Seed,
    pub kind: CurveKind,
    pub points: Vec<DVec3>,
}

/// Strings seeded `0..cfg.string_count`, each fully evolved together
/// with its loops.
#[derive(Debug, Clone)]
pub struct Ensemble {
    cfg: Config,
    strings: Vec<CosmicString>,
}

impl Ensemble {
    /// Builds and evolves every string of the run.
    ///
    /// Strings are processed one after another, each with its own seed,
    /// so the result does not depend on processing order.
    ///
    /// ### Returns
    /// - `Ok(ensemble)` when every string reached the end time.
    /// - `Err` on a configuration error or a broken worldsheet.
    pub fn generate(cfg: &Config) -> Result<Self> {
        cfg.validate()?;
        log::info!(
            "generating {} strings in a {}^3 box (step {}, repeat {}, {} frames, self-intersection {})",
            cfg.string_count,
            cfg.lattice_size,
            cfg.step,
            cfg.repeat,
            cfg.frame_count,
            if cfg.self_intersect { "on" } else { "off" }
        );

        let mut strings = Vec::with_capacity(cfg.string_count);
        for seed in 0..cfg.string_count as Seed {
            let mut s = CosmicString::new(seed, cfg.end_time(), cfg.repeat, cfg)?;
            s.evolve(cfg)?;
            strings.push(s);
        }

        let ensemble = Self { cfg: *cfg, strings };
        log::info!(
            "ensemble ready: {} points, {} loops, {} boundary faults",
            ensemble.strings.iter().map(CosmicString::length).sum::<usize>(),
            ensemble.loop_count(),
            ensemble.strings.iter().map(|s| s.faults().len()).sum::<usize>()
        );
        if cfg.save_animation {
            log::warn!("save_animation is set, but frames are only kept in memory");
        }

        Ok(ensemble)
    }

    pub fn config(&self) -> &Config {
        &self.cfg
    }

    pub fn strings(&self) -> &[CosmicString] {
        &self.strings
    }

    /// Number of frames a renderer can show: one per worldsheet slice.
    pub fn frame_count(&self) -> usize {
        self.strings
            .first()
            .map_or(0, |s| s.worldsheet().slice_count())
    }

    pub fn loop_count(&self) -> usize {
        self.strings.iter().map(|s| s.loops().len()).sum()
    }

    /// Everything visible in `frame`, as polylines.
    ///
    /// Each string contributes its live runs. A loop contributes its runs
    /// from its birth frame onwards; before that its points are still
    /// part of the parent.
    ///
    /// ### Parameters
    /// - `frame` - Time index; clamped to the last frame.
    pub fn frame_polylines(&self, frame: TimeIndex) -> Vec<Polyline> {
        let mut out = Vec::new();
        let Some(last) = self.frame_count().checked_sub(1) else {
            return out;
        };
        let frame = frame.min(last);

        for s in &self.strings {
            let seed = s.seed();
            out.extend(s.worldsheet().runs(frame).into_iter().map(|points| Polyline {
                seed,
                kind: CurveKind::String,
                points,
            }));

            for lp in s.loops().iter().filter(|lp| lp.birth_index() <= frame) {
                out.extend(lp.worldsheet().runs(frame).into_iter().map(|points| Polyline {
                    seed,
                    kind: CurveKind::Loop,
                    points,
                }));
            }
        }
        out
    }
}
