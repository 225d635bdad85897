//! Random distance sampling and metric-matrix coordinates.

use nalgebra::{DMatrix, SymmetricEigen};
use rand::Rng;
use rand::rngs::StdRng;

use super::bounds::BoundsMatrix;

/// Dimensions kept from the eigendecomposition.
pub const EMBED_DIM: usize = 4;

/// Draws one distance per pair uniformly between its bounds.
pub fn sample_distances(bounds: &BoundsMatrix, rng: &mut StdRng) -> DMatrix<f64> {
    let n = bounds.len();
    let mut d = DMatrix::zeros(n, n);
    for i in 0..n {
        for j in (i + 1)..n {
            let (lo, hi) = (bounds.lower(i, j), bounds.upper(i, j));
            let value = if hi > lo { rng.random_range(lo..=hi) } else { lo };
            d[(i, j)] = value;
            d[(j, i)] = value;
        }
    }
    d
}

/// Builds 4D coordinates (flat, stride 4) from a distance matrix.
///
/// Returns `None` when the metric matrix has no positive eigenvalue, which
/// happens only for degenerate samples.
pub fn metric_coordinates(distances: &DMatrix<f64>, rng: &mut StdRng) -> Option<Vec<f64>> {
    let n = distances.nrows();
    if n == 0 {
        return Some(Vec::new());
    }
    if n == 1 {
        return Some(vec![0.0; EMBED_DIM]);
    }

    let nf = n as f64;
    let sq = distances.map(|d| d * d);
    let mut pair_sum = 0.0;
    for i in 0..n {
        for j in (i + 1)..n {
            pair_sum += sq[(i, j)];
        }
    }
    let origin_sq: Vec<f64> = (0..n)
        .map(|i| sq.row(i).sum() / nf - pair_sum / (nf * nf))
        .collect();

    let metric = DMatrix::from_fn(n, n, |i, j| 0.5 * (origin_sq[i] + origin_sq[j] - sq[(i, j)]));
    let eigen = SymmetricEigen::new(metric);

    let mut order: Vec<usize> = (0..n).collect();
    order.sort_by(|&a, &b| eigen.eigenvalues[b].total_cmp(&eigen.eigenvalues[a]));
    if eigen.eigenvalues[order[0]] <= 0.0 {
        return None;
    }

    let mut coords = vec![0.0; n * EMBED_DIM];
    for (dim, &e) in order.iter().take(EMBED_DIM).enumerate() {
        let value = eigen.eigenvalues[e];
        if value > 1e-8 {
            let scale = value.sqrt();
            for i in 0..n {
                coords[i * EMBED_DIM + dim] = eigen.eigenvectors[(i, e)] * scale;
            }
        } else {
            for i in 0..n {
                coords[i * EMBED_DIM + dim] = rng.random_range(-0.5..0.5);
            }
        }
    }
    Some(coords)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use rand::SeedableRng;

    fn distance(coords: &[f64], i: usize, j: usize) -> f64 {
        (0..EMBED_DIM)
            .map(|k| (coords[i * EMBED_DIM + k] - coords[j * EMBED_DIM + k]).powi(2))
            .sum::<f64>()
            .sqrt()
    }

    #[test]
    fn samples_stay_within_bounds() {
        let mut bounds = BoundsMatrix::new(3);
        bounds.set(0, 1, 1.0, 1.5);
        bounds.set(1, 2, 2.0, 2.0);
        bounds.set(0, 2, 0.5, 3.0);
        let mut rng = StdRng::seed_from_u64(7);
        let d = sample_distances(&bounds, &mut rng);
        assert!((1.0..=1.5).contains(&d[(0, 1)]));
        assert_eq!(d[(1, 2)], 2.0);
        assert_eq!(d[(0, 1)], d[(1, 0)]);
        assert_eq!(d[(0, 0)], 0.0);
    }

    #[test]
    fn reproduces_a_euclidean_distance_matrix() {
        // Unit square in a plane.
        let points = [[0.0, 0.0], [1.0, 0.0], [1.0, 1.0], [0.0, 1.0]];
        let d = DMatrix::from_fn(4, 4, |i, j| {
            let (a, b): ([f64; 2], [f64; 2]) = (points[i], points[j]);
            ((a[0] - b[0]).powi(2) + (a[1] - b[1]).powi(2)).sqrt()
        });
        let mut rng = StdRng::seed_from_u64(1);
        let coords = metric_coordinates(&d, &mut rng).unwrap();
        for i in 0..4 {
            for j in 0..4 {
                let expected = d[(i, j)];
                // Unused dimensions are filled with small noise.
                assert_abs_diff_eq!(distance(&coords, i, j), expected, epsilon = 1.5);
            }
        }
        let planar_error: f64 = (0..4)
            .flat_map(|i| (0..4).map(move |j| (i, j)))
            .map(|(i, j)| {
                let planar = (0..2)
                    .map(|k| (coords[i * EMBED_DIM + k] - coords[j * EMBED_DIM + k]).powi(2))
                    .sum::<f64>()
                    .sqrt();
                (planar - d[(i, j)]).abs()
            })
            .fold(0.0, f64::max);
        assert!(planar_error < 1e-6);
    }

    #[test]
    fn single_atom_sits_at_the_origin() {
        let mut rng = StdRng::seed_from_u64(1);
        let coords = metric_coordinates(&DMatrix::zeros(1, 1), &mut rng).unwrap();
        assert_eq!(coords, vec![0.0; EMBED_DIM]);
    }
}
