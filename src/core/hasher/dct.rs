//! Two-dimensional discrete cosine transform (orthonormal DCT-II).
//!
//! Only the lowest `block` x `block` frequencies are ever needed for
//! hashing, so the separable passes stop there instead of producing the
//! full spectrum. The values that are produced are identical to the
//! matching corner of a full transform.

use std::f64::consts::PI;

/// Cosine basis rows `0..count` for a signal of length `n`, orthonormal scaling.
fn basis(n: usize, count: usize) -> Vec<f64> {
    let mut table = Vec::with_capacity(n * count);
    for k in 0..count {
        let scale = if k == 0 {
            (1.0 / n as f64).sqrt()
        } else {
            (2.0 / n as f64).sqrt()
        };
        for i in 0..n {
            let angle = PI * (2 * i + 1) as f64 * k as f64 / (2 * n) as f64;
            table.push(scale * angle.cos());
        }
    }
    table
}

/// Low-frequency corner of the 2-D DCT of a row-major `width` x `height` grid.
///
/// Returns `block * block` coefficients in row-major order: index
/// `v * block + u` holds vertical frequency `v`, horizontal frequency `u`.
pub fn dct_2d_low(input: &[f64], width: usize, height: usize, block: usize) -> Vec<f64> {
    debug_assert_eq!(input.len(), width * height);
    debug_assert!(block <= width && block <= height);

    let row_basis = basis(width, block);
    let col_basis = basis(height, block);

    // Row pass: horizontal frequencies for every row
    let mut rows = vec![0.0; height * block];
    for y in 0..height {
        let row = &input[y * width..(y + 1) * width];
        for u in 0..block {
            let weights = &row_basis[u * width..(u + 1) * width];
            rows[y * block + u] = row.iter().zip(weights).map(|(a, b)| a * b).sum();
        }
    }

    // Column pass over the reduced rows
    let mut out = vec![0.0; block * block];
    for v in 0..block {
        let weights = &col_basis[v * height..(v + 1) * height];
        for u in 0..block {
            out[v * block + u] = (0..height).map(|y| rows[y * block + u] * weights[y]).sum();
        }
    }
    out
}
