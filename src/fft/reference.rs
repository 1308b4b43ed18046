//! CPU reference transforms, used by tests and offline validation.

use rustfft::num_complex::Complex;
use rustfft::FftPlanner;

/// Unnormalized 1D inverse FFT in place.
pub fn inverse_fft_1d(buffer: &mut [Complex<f32>]) {
    let mut planner = FftPlanner::new();
    let fft = planner.plan_fft_inverse(buffer.len());
    fft.process(buffer);
}

/// Unnormalized 2D forward FFT of an n x n row-major grid, in place.
pub fn forward_fft_2d(grid: &mut [Complex<f32>], n: usize) {
    assert_eq!(grid.len(), n * n);
    let mut planner = FftPlanner::new();
    let fft = planner.plan_fft_forward(n);

    for row in grid.chunks_exact_mut(n) {
        fft.process(row);
    }
    let mut column = vec![Complex::new(0.0, 0.0); n];
    for col in 0..n {
        for row in 0..n {
            column[row] = grid[row * n + col];
        }
        fft.process(&mut column);
        for row in 0..n {
            grid[row * n + col] = column[row];
        }
    }
}

/// 2D inverse FFT of an n x n row-major grid, in place, including the
/// 1/N^2 scaling (the same scaling the merge pass applies on the GPU).
pub fn inverse_fft_2d(grid: &mut [Complex<f32>], n: usize) {
    assert_eq!(grid.len(), n * n);
    let mut planner = FftPlanner::new();
    let fft = planner.plan_fft_inverse(n);

    for row in grid.chunks_exact_mut(n) {
        fft.process(row);
    }
    let mut column = vec![Complex::new(0.0, 0.0); n];
    let scale = 1.0 / (n * n) as f32;
    for col in 0..n {
        for row in 0..n {
            column[row] = grid[row * n + col];
        }
        fft.process(&mut column);
        for row in 0..n {
            grid[row * n + col] = column[row] * scale;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dc_spectrum_is_flat_field() {
        // Energy only at k = 0 must synthesize a spatially constant field
        let n = 16usize;
        let mut grid = vec![Complex::new(0.0f32, 0.0); n * n];
        grid[0] = Complex::new((n * n) as f32, 0.0);

        inverse_fft_2d(&mut grid, n);

        for value in &grid {
            assert!((value - Complex::new(1.0, 0.0)).norm() < 1e-4);
        }
    }

    #[test]
    fn test_forward_inverse_round_trip() {
        let n = 32usize;
        let original: Vec<Complex<f32>> = (0..n * n)
            .map(|i| Complex::new((i as f32 * 0.7).cos(), (i as f32 * 0.3).sin()))
            .collect();

        let mut grid = original.clone();
        forward_fft_2d(&mut grid, n);
        inverse_fft_2d(&mut grid, n);

        for (got, want) in grid.iter().zip(&original) {
            assert!(
                (got - want).norm() < 1e-3 * (1.0 + want.norm()),
                "{:?} vs {:?}",
                got,
                want
            );
        }
    }
}
