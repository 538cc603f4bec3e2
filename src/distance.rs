//! Squared Euclidean distance and nearest-centroid search

use rayon::prelude::*;

/// Euclidean (L2) distance squared between two vectors
///
/// Squared distance orders neighbors the same way as L2 and skips the sqrt.
#[inline]
pub fn l2_squared(a: &[f32], b: &[f32]) -> f32 {
    debug_assert_eq!(a.len(), b.len(), "Vector dimensions must match");

    a.iter()
        .zip(b.iter())
        .map(|(x, y)| {
            let diff = x - y;
            diff * diff
        })
        .sum()
}

/// Index and squared distance of the closest row of `centroids` (row-major,
/// `dimension` wide). Ties go to the lowest index.
#[inline]
pub fn nearest(query: &[f32], centroids: &[f32], dimension: usize) -> (usize, f32) {
    let mut best = (0, f32::INFINITY);
    for (i, c) in centroids.chunks_exact(dimension).enumerate() {
        let d = l2_squared(query, c);
        if d < best.1 {
            best = (i, d);
        }
    }
    best
}

/// Nearest centroid for every row of `vectors`, computed in parallel.
///
/// Output order matches input order regardless of thread count.
pub fn batch_nearest(
    vectors: &[f32],
    centroids: &[f32],
    dimension: usize,
) -> (Vec<usize>, Vec<f32>) {
    vectors
        .par_chunks_exact(dimension)
        .map(|v| nearest(v, centroids, dimension))
        .unzip()
}
