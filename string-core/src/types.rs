/// Index of a point along a string, `0..length`.
///
/// Only meaningful within the worldsheet it was taken from; a loop
/// re-numbers its points from zero.
pub type PointIndex = usize;

/// Index of a time slice in a worldsheet. Slice `j` holds the shape at
/// time `j * step`.
pub type TimeIndex = usize;

/// Seed of a string's private random stream.
pub type Seed = u64;
