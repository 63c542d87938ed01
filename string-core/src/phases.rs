//! Update rules for one time slice of a worldsheet.
//!
//! A string step from slice `j` to `j + 1` runs:
//! 1. [`intersection_phase`] (optional): find points of slice `j` that
//!    meet a later point, split the enclosed segment off as a loop and
//!    erase it from the string.
//! 2. [`first_step_phase`] for `j == 0`, otherwise
//!    [`steady_state_phase`]: write slice `j + 1`.
//! 3. [`check_endpoints`]: the fixed ends of slice `j + 1` must be alive.
//!
//! A loop step uses [`loop_phase`] alone.
//!
//! Every phase reads slice `j` (and `j - 1`) and writes only slice `j + 1`,
//! except the intersection phase, which erases inside slice `j` before
//! anything of slice `j + 1` is computed. No phase ever sees a partially
//! written slice.

use glam::DVec3;
use rand::Rng;

use crate::{
    config::{INTERSECT_ATOL, INTERSECT_RTOL, LIGHT_CONE_TOLERANCE},
    error::{Error, Result},
    lattice::{CUSP_VELOCITIES, DIAGONAL_VELOCITIES, all_close},
    live_chain::LiveChain,
    string_loop::StringLoop,
    types::{PointIndex, TimeIndex},
    worldsheet::{Point, Worldsheet},
};

/// Whether point `i` of `slice` is held in place this step.
///
/// Endpoints are always pinned. So is any point that is erased or has an
/// erased neighbour.
#[inline]
pub fn is_pinned(slice: &[Point], i: PointIndex) -> bool {
    i == 0
        || i + 1 >= slice.len()
        || !slice[i - 1].is_alive()
        || !slice[i].is_alive()
        || !slice[i + 1].is_alive()
}

/// Splits self-intersections of slice `j` off into loops.
///
/// Points are scanned in ascending order. For each unpinned point `i`, the
/// first later point `m` of the same live run that sits on top of it
/// (within [`INTERSECT_RTOL`] / [`INTERSECT_ATOL`]) closes a loop:
///
/// 1. The points `i..=m` of every slice are copied into a new
///    [`StringLoop`] born at `j`.
/// 2. The same range of slice `j` is erased from `sheet` and unlinked
///    from `chain`, which pins it from here on.
/// 3. The scan resumes after `m`.
///
/// The fixed ends are never part of a loop, and a loop never spans a
/// stretch already erased by an earlier loop.
///
/// ### Parameters
/// - `sheet` - The string's worldsheet; slice `j` is partly erased.
/// - `j` - Time index being scanned.
/// - `step` - Time step, used for the loop's birth time.
/// - `chain` - Live links of slice `j`; kept in sync with the erasures.
///
/// ### Returns
/// The loops spawned, in scan order.
pub fn intersection_phase(
    sheet: &mut Worldsheet,
    j: TimeIndex,
    step: f64,
    chain: &mut LiveChain,
) -> Vec<StringLoop> {
    let len = sheet.len();
    let mut loops = Vec::new();

    let mut i = 1;
    while i + 1 < len {
        let slice = sheet.slice(j);
        if is_pinned(slice, i) {
            i += 1;
            continue;
        }
        let Some(here) = slice[i].position() else {
            i += 1;
            continue;
        };

        let hit = (i + 1..len - 1)
            .take_while(|&m| slice[m].is_alive())
            .find(|&m| {
                slice[m]
                    .position()
                    .is_some_and(|there| all_close(here, there, INTERSECT_RTOL, INTERSECT_ATOL))
            });

        match hit {
            Some(m) => {
                log::debug!("self-intersection at time index {j}: points {i}..={m} pinch off");
                loops.push(StringLoop::spawn(j, step, sheet.segment(i..=m)));
                sheet.erase(j, i..=m);
                chain.unlink(i..=m);
                i = m + 1;
            }
            None => i += 1,
        }
    }

    loops
}

/// Writes slice 1 from slice 0.
///
/// Each unpinned point looks at the separation `s` of its two neighbours:
///
/// - `s ≈ 0`: a cusp; it moves by `step` times a random axis velocity.
/// - `s ≈ step` (one lattice unit): it moves by `step` times a random
///   face-diagonal velocity.
/// - anything else: it stays put.
///
/// Both comparisons use [`LIGHT_CONE_TOLERANCE`]. Random draws happen in
/// ascending point order, one per moving point.
pub fn first_step_phase(sheet: &mut Worldsheet, step: f64, rng: &mut impl Rng) {
    let current = sheet.slice(0);
    let mut next = Vec::with_capacity(current.len());

    for i in 0..current.len() {
        if is_pinned(current, i) {
            next.push(current[i]);
            continue;
        }
        let (Some(x), Some(back), Some(fwd)) = (
            current[i].position(),
            current[i - 1].position(),
            current[i + 1].position(),
        ) else {
            next.push(current[i]);
            continue;
        };

        let separation = fwd.distance(back);
        let velocity = if separation <= LIGHT_CONE_TOLERANCE {
            CUSP_VELOCITIES[rng.random_range(0..CUSP_VELOCITIES.len())]
        } else if (separation - step).abs() <= LIGHT_CONE_TOLERANCE {
            DIAGONAL_VELOCITIES[rng.random_range(0..DIAGONAL_VELOCITIES.len())]
        } else {
            DVec3::ZERO
        };
        next.push(Point::Alive(x + velocity * step));
    }

    sheet.slice_mut(1).copy_from_slice(&next);
}

/// Writes slice `j + 1` from slices `j` and `j - 1`, for `j >= 1`.
///
/// Each unpinned point takes the leapfrog update along the light cone:
///
/// `next = X[j, k] + X[j, i - 1] - X[j - 1, i]`
///
/// where `k` is the nearest live point after `i`, read from `chain`.
/// Pinned points are copied forward.
///
/// ### Returns
/// - `Ok(faults)` with one [`Error::BoundaryFault`] per point that had no
///   live forward neighbour. Such points are pinned instead.
/// - `Err(Error::ErasedSample)` if a live point has no live past.
pub fn steady_state_phase(
    sheet: &mut Worldsheet,
    j: TimeIndex,
    chain: &LiveChain,
) -> Result<Vec<Error>> {
    debug_assert!(j >= 1);
    let current = sheet.slice(j);
    let past = sheet.slice(j - 1);
    let mut next = Vec::with_capacity(current.len());
    let mut faults = Vec::new();

    for i in 0..current.len() {
        if is_pinned(current, i) {
            next.push(current[i]);
            continue;
        }

        let Some(k) = chain.next_live(i) else {
            faults.push(Error::BoundaryFault {
                time_index: j,
                point: i,
            });
            next.push(current[i]);
            continue;
        };

        let fwd = live(current, j, k)?;
        let back = live(current, j, i - 1)?;
        let prev = live(past, j - 1, i)?;
        next.push(Point::Alive(fwd + back - prev));
    }

    sheet.slice_mut(j + 1).copy_from_slice(&next);
    Ok(faults)
}

/// Writes slice `j + 1` of a closed loop.
///
/// Every point takes the leapfrog update with periodic neighbours:
/// index `-1` is the last point and index `len` is the first. Nothing is
/// pinned. A loop born at slice 0 has no past, so its first step holds
/// the shape at rest.
///
/// ### Returns
/// `Err(Error::ErasedSample)` if any sample the update needs is erased.
pub fn loop_phase(sheet: &mut Worldsheet, j: TimeIndex) -> Result<()> {
    let len = sheet.len();
    if j == 0 {
        let rest = sheet.slice(0).to_vec();
        sheet.slice_mut(1).copy_from_slice(&rest);
        return Ok(());
    }

    let current = sheet.slice(j);
    let past = sheet.slice(j - 1);
    let mut next = Vec::with_capacity(len);

    for i in 0..len {
        let fwd = live(current, j, (i + 1) % len)?;
        let back = live(current, j, (i + len - 1) % len)?;
        let prev = live(past, j - 1, i)?;
        next.push(Point::Alive(fwd + back - prev));
    }

    sheet.slice_mut(j + 1).copy_from_slice(&next);
    Ok(())
}

/// Both fixed ends of slice `j` must be alive.
pub fn check_endpoints(sheet: &Worldsheet, j: TimeIndex) -> Result<()> {
    let len = sheet.len();
    for point in [0, len.saturating_sub(1)] {
        if !sheet.get(j, point).is_alive() {
            return Err(Error::EndpointErased {
                time_index: j,
                point,
            });
        }
    }
    Ok(())
}

#[inline]
fn live(slice: &[Point], j: TimeIndex, i: PointIndex) -> Result<DVec3> {
    slice[i].position().ok_or(Error::ErasedSample {
        time_index: j,
        point: i,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    fn v(x: f64, y: f64, z: f64) -> DVec3 {
        DVec3::new(x, y, z)
    }

    fn chain_for(sheet: &Worldsheet, j: TimeIndex) -> LiveChain {
        let mut chain = LiveChain::with_len(sheet.len());
        chain.rebuild(sheet.slice(j));
        chain
    }

    #[test]
    fn endpoints_and_erased_neighbours_are_pinned() {
        let slice = vec![
            Point::Alive(v(0.0, 0.0, 0.0)),
            Point::Alive(v(1.0, 0.0, 0.0)),
            Point::Alive(v(2.0, 0.0, 0.0)),
            Point::Erased,
            Point::Alive(v(4.0, 0.0, 0.0)),
            Point::Alive(v(5.0, 0.0, 0.0)),
        ];
        let pinned: Vec<bool> = (0..slice.len()).map(|i| is_pinned(&slice, i)).collect();
        assert_eq!(pinned, vec![true, false, true, true, true, true]);
    }

    #[test]
    fn first_step_moves_cusps_along_an_axis() {
        let step = 0.5;
        let mut sheet = Worldsheet::with_initial(2, &[v(0.0, 0.0, 0.0), v(0.5, 0.0, 0.0), v(0.0, 0.0, 0.0)]);
        first_step_phase(&mut sheet, step, &mut ChaCha8Rng::seed_from_u64(1));

        let moved = sheet.position(1, 1).unwrap() - sheet.position(0, 1).unwrap();
        assert!(CUSP_VELOCITIES.iter().any(|c| *c * step == moved), "{moved}");
        assert_eq!(sheet.get(1, 0), sheet.get(0, 0));
        assert_eq!(sheet.get(1, 2), sheet.get(0, 2));
    }

    #[test]
    fn first_step_moves_unit_separated_points_diagonally() {
        let mut sheet = Worldsheet::with_initial(2, &[v(0.0, 0.0, 0.0), v(0.5, 0.5, 0.0), v(1.0, 0.0, 0.0)]);
        first_step_phase(&mut sheet, 1.0, &mut ChaCha8Rng::seed_from_u64(2));

        let moved = sheet.position(1, 1).unwrap() - sheet.position(0, 1).unwrap();
        assert!(DIAGONAL_VELOCITIES.contains(&moved), "{moved}");
    }

    #[test]
    fn first_step_leaves_straight_and_corner_points_in_place() {
        let initial = [
            v(0.0, 0.0, 0.0),
            v(1.0, 0.0, 0.0),
            v(2.0, 0.0, 0.0),
            v(2.0, 1.0, 0.0),
            v(2.0, 2.0, 0.0),
        ];
        let mut sheet = Worldsheet::with_initial(2, &initial);
        first_step_phase(&mut sheet, 1.0, &mut ChaCha8Rng::seed_from_u64(3));

        assert_eq!(sheet.slice(1), sheet.slice(0));
    }

    #[test]
    fn steady_state_is_the_leapfrog_update() {
        let mut sheet = Worldsheet::with_initial(3, &[v(0.0, 0.0, 0.0), v(1.0, 0.0, 0.0), v(2.0, 0.0, 0.0)]);
        sheet.set(1, 0, Point::Alive(v(0.0, 0.0, 0.0)));
        sheet.set(1, 1, Point::Alive(v(1.0, 0.5, 0.0)));
        sheet.set(1, 2, Point::Alive(v(2.0, 0.0, 0.0)));

        let chain = chain_for(&sheet, 1);
        let faults = steady_state_phase(&mut sheet, 1, &chain).unwrap();

        assert!(faults.is_empty());
        // X[1,2] + X[1,0] - X[0,1] = (2,0,0) + (0,0,0) - (1,0,0)
        assert_eq!(sheet.position(2, 1), Some(v(1.0, 0.0, 0.0)));
        assert_eq!(sheet.position(2, 0), Some(v(0.0, 0.0, 0.0)));
        assert_eq!(sheet.position(2, 2), Some(v(2.0, 0.0, 0.0)));
    }

    #[test]
    fn steady_state_reports_a_missing_forward_neighbour_and_pins() {
        let initial = [v(0.0, 0.0, 0.0), v(1.0, 0.0, 0.0), v(2.0, 0.0, 0.0)];
        let mut sheet = Worldsheet::with_initial(3, &initial);
        sheet.slice_mut(1).copy_from_slice(&initial.map(Point::Alive));

        // A chain that disagrees with the slice: nothing live after point 1.
        let mut chain = chain_for(&sheet, 1);
        chain.unlink(2..=2);

        let faults = steady_state_phase(&mut sheet, 1, &chain).unwrap();
        assert_eq!(
            faults,
            vec![Error::BoundaryFault {
                time_index: 1,
                point: 1
            }]
        );
        assert_eq!(sheet.position(2, 1), Some(v(1.0, 0.0, 0.0)));
    }

    #[test]
    fn intersection_phase_splits_the_first_match_and_erases_it() {
        // 1 and 5 coincide, and so do 1 and 7; the first match wins.
        let initial = [
            v(-1.0, 0.0, 0.0),
            v(0.0, 0.0, 0.0),
            v(1.0, 0.0, 0.0),
            v(1.0, 1.0, 0.0),
            v(0.0, 1.0, 0.0),
            v(0.0, 0.0, 0.0),
            v(0.0, -1.0, 0.0),
            v(0.0, 0.0, 0.0),
            v(0.0, 0.0, 1.0),
        ];
        let mut sheet = Worldsheet::with_initial(3, &initial);
        let mut chain = chain_for(&sheet, 0);

        let loops = intersection_phase(&mut sheet, 0, 1.0, &mut chain);

        assert_eq!(loops.len(), 1);
        assert_eq!(loops[0].birth_index(), 0);
        assert_eq!(loops[0].length(), 5);
        assert_eq!(loops[0].worldsheet().position(0, 0), Some(initial[1]));
        assert_eq!(loops[0].worldsheet().position(0, 4), Some(initial[5]));

        for i in 1..=5 {
            assert_eq!(sheet.get(0, i), Point::Erased);
            assert!(!chain.is_alive(i));
        }
        assert_eq!(chain.next_live(0), Some(6));
        // Point 7 also sat on point 1; it only looks forward, so it stays.
        assert!(sheet.get(0, 7).is_alive());
    }

    #[test]
    fn intersection_phase_does_not_reach_across_an_erased_stretch() {
        // Points 1 and 5 meet, but point 3 was already cut out at slice 0.
        let initial = [
            v(-1.0, 0.0, 0.0),
            v(0.0, 0.0, 0.0),
            v(1.0, 0.0, 0.0),
            v(1.0, 1.0, 0.0),
            v(0.0, 1.0, 0.0),
            v(0.0, 0.0, 0.0),
            v(0.0, 0.0, 1.0),
        ];
        let mut sheet = Worldsheet::with_initial(3, &initial);
        sheet.erase(0, 3..=3);
        let carried = sheet.slice(0).to_vec();
        sheet.slice_mut(1).copy_from_slice(&carried);

        let mut chain = chain_for(&sheet, 1);
        let loops = intersection_phase(&mut sheet, 1, 1.0, &mut chain);

        assert!(loops.is_empty());
        assert_eq!(sheet.slice(1), carried.as_slice());

        // The same shape without the gap does pinch off.
        let mut whole = Worldsheet::with_initial(3, &initial);
        let mut chain = chain_for(&whole, 0);
        assert_eq!(intersection_phase(&mut whole, 0, 1.0, &mut chain).len(), 1);
    }

    #[test]
    fn intersection_phase_ignores_the_fixed_ends() {
        let initial = [v(0.0, 0.0, 0.0), v(1.0, 0.0, 0.0), v(1.0, 1.0, 0.0), v(1.0, 0.0, 0.0)];
        let mut sheet = Worldsheet::with_initial(2, &initial);
        let mut chain = chain_for(&sheet, 0);

        let loops = intersection_phase(&mut sheet, 0, 1.0, &mut chain);

        assert!(loops.is_empty());
        assert!(sheet.slice(0).iter().all(|p| p.is_alive()));
    }

    #[test]
    fn loop_phase_wraps_indices() {
        let square = [v(0.0, 0.0, 0.0), v(1.0, 0.0, 0.0), v(1.0, 1.0, 0.0), v(0.0, 1.0, 0.0)];
        let mut sheet = Worldsheet::with_initial(3, &square);
        sheet.slice_mut(1).copy_from_slice(&square.map(Point::Alive));

        loop_phase(&mut sheet, 1).unwrap();

        // Point 0: X[1,1] + X[1,3] - X[0,0]
        assert_eq!(sheet.position(2, 0), Some(v(1.0, 1.0, 0.0)));
        // Point 3: X[1,0] + X[1,2] - X[0,3]
        assert_eq!(sheet.position(2, 3), Some(v(1.0, 0.0, 0.0)));
    }

    #[test]
    fn loop_phase_holds_a_loop_born_at_slice_zero() {
        let square = [v(0.0, 0.0, 0.0), v(1.0, 0.0, 0.0), v(1.0, 1.0, 0.0), v(0.0, 1.0, 0.0)];
        let mut sheet = Worldsheet::with_initial(2, &square);

        loop_phase(&mut sheet, 0).unwrap();

        assert_eq!(sheet.slice(1), sheet.slice(0));
    }

    #[test]
    fn loop_phase_rejects_erased_samples() {
        let square = [v(0.0, 0.0, 0.0), v(1.0, 0.0, 0.0), v(1.0, 1.0, 0.0)];
        let mut sheet = Worldsheet::with_initial(3, &square);
        sheet.slice_mut(1).copy_from_slice(&square.map(Point::Alive));
        sheet.set(1, 2, Point::Erased);

        assert!(matches!(
            loop_phase(&mut sheet, 1),
            Err(Error::ErasedSample { time_index: 1, .. })
        ));
    }

    #[test]
    fn check_endpoints_flags_an_erased_end() {
        let mut sheet = Worldsheet::with_initial(1, &[v(0.0, 0.0, 0.0), v(1.0, 0.0, 0.0), v(2.0, 0.0, 0.0)]);
        assert!(check_endpoints(&sheet, 0).is_ok());

        sheet.set(0, 2, Point::Erased);
        assert_eq!(
            check_endpoints(&sheet, 0),
            Err(Error::EndpointErased {
                time_index: 0,
                point: 2
            })
        );
    }
}
