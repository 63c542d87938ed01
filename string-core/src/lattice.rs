use glam::DVec3;

/// Unit moves of the random walk, one per axis direction. Scaled by the
/// lattice spacing before use.
pub const MOVES: [DVec3; 6] = [
    DVec3::new(0.0, 0.0, 1.0),
    DVec3::new(0.0, 1.0, 0.0),
    DVec3::new(1.0, 0.0, 0.0),
    DVec3::new(-1.0, 0.0, 0.0),
    DVec3::new(0.0, 0.0, -1.0),
    DVec3::new(0.0, -1.0, 0.0),
];

/// First-step velocities for a cusp, where both neighbours coincide.
pub const CUSP_VELOCITIES: [DVec3; 6] = MOVES;

/// First-step velocities for neighbours one lattice unit apart: the twelve
/// face diagonals at half magnitude.
pub const DIAGONAL_VELOCITIES: [DVec3; 12] = [
    DVec3::new(0.5, 0.5, 0.0),
    DVec3::new(0.0, 0.5, 0.5),
    DVec3::new(0.5, 0.0, 0.5),
    DVec3::new(-0.5, -0.5, 0.0),
    DVec3::new(0.0, -0.5, -0.5),
    DVec3::new(-0.5, 0.0, -0.5),
    DVec3::new(0.5, -0.5, 0.0),
    DVec3::new(-0.5, 0.5, 0.0),
    DVec3::new(0.0, 0.5, -0.5),
    DVec3::new(0.0, -0.5, 0.5),
    DVec3::new(0.5, 0.0, -0.5),
    DVec3::new(-0.5, 0.0, 0.5),
];

/// Element-wise closeness in the style of `allclose`:
/// `|a - b| <= atol + rtol * |b|` on every axis.
#[inline]
pub fn all_close(a: DVec3, b: DVec3, rtol: f64, atol: f64) -> bool {
    let diff = (a - b).abs();
    let bound = DVec3::splat(atol) + b.abs() * rtol;
    diff.cmple(bound).all()
}
