//! Butterfly lookup construction for the inverse FFT passes.
//!
//! The table is generated once on the CPU and uploaded as an N x log2(N)
//! texture: each texel holds the two source indices and the complex weight
//! for one output element of one pass. Bit-reversal reordering is folded
//! into the source addressing of pass 0 instead of a separate permutation
//! pass.

use rustfft::num_complex::Complex;

/// Reverse the low log2(n) bits of `i`.
pub fn bit_reverse(i: u32, n: u32) -> u32 {
    i.reverse_bits() >> (u32::BITS - n.trailing_zeros())
}

/// Inverse-kernel twiddle factor e^(+2*pi*i*k/n) as (re, im).
pub fn inverse_twiddle(n: u32, k: f32) -> (f32, f32) {
    let angle = 2.0 * std::f32::consts::PI * k / n as f32;
    (angle.cos(), angle.sin())
}

/// Precomputed butterfly schedule for a 1D inverse FFT of `size` elements.
///
/// `data` is laid out as `size * passes` texels of four floats:
/// `[src_index_1, src_index_2, weight_re, weight_im]`. The second output of
/// each butterfly pair stores the negated weight, so every lane computes the
/// same expression `out = in[j1] + w * in[j2]`.
pub struct ButterflyTable {
    pub size: u32,
    pub passes: u32,
    pub data: Vec<f32>,
}

impl ButterflyTable {
    pub fn new(size: u32) -> Self {
        debug_assert!(size.is_power_of_two() && size >= 2);
        let passes = size.trailing_zeros();
        let mut data = vec![0.0f32; (size * passes * 4) as usize];

        for p in 0..passes {
            let half_span = 1u32 << p;
            let blocks = size >> (p + 1);
            for block in 0..blocks {
                for k in 0..half_span {
                    let i1 = block * half_span * 2 + k;
                    let i2 = i1 + half_span;
                    // Pass 0 reads its sources through the bit-reversal
                    // permutation; later passes read in place
                    let (j1, j2) = if p == 0 {
                        (bit_reverse(i1, size), bit_reverse(i2, size))
                    } else {
                        (i1, i2)
                    };
                    let (wr, wi) = inverse_twiddle(size, (k * blocks) as f32);

                    let row = (p * size) as usize;
                    let o1 = (row + i1 as usize) * 4;
                    data[o1] = j1 as f32;
                    data[o1 + 1] = j2 as f32;
                    data[o1 + 2] = wr;
                    data[o1 + 3] = wi;

                    let o2 = (row + i2 as usize) * 4;
                    data[o2] = j1 as f32;
                    data[o2 + 1] = j2 as f32;
                    data[o2 + 2] = -wr;
                    data[o2 + 3] = -wi;
                }
            }
        }

        Self { size, passes, data }
    }

    fn entry(&self, pass: u32, index: u32) -> (usize, usize, Complex<f32>) {
        let offset = ((pass * self.size + index) * 4) as usize;
        (
            self.data[offset] as usize,
            self.data[offset + 1] as usize,
            Complex::new(self.data[offset + 2], self.data[offset + 3]),
        )
    }

    /// Run the full 1D schedule on the CPU.
    ///
    /// This is the exact mirror of what `fft.wgsl` does per row/column and
    /// exists so the GPU algorithm is testable against rustfft without a
    /// device. Unnormalized, like the GPU passes; the merger applies 1/N^2.
    pub fn apply(&self, input: &[Complex<f32>]) -> Vec<Complex<f32>> {
        assert_eq!(input.len(), self.size as usize);
        let mut current = input.to_vec();
        let mut next = vec![Complex::new(0.0, 0.0); input.len()];
        for p in 0..self.passes {
            for x in 0..self.size {
                let (j1, j2, w) = self.entry(p, x);
                next[x as usize] = current[j1] + w * current[j2];
            }
            std::mem::swap(&mut current, &mut next);
        }
        current
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fft::reference;

    #[test]
    fn test_bit_reverse() {
        assert_eq!(bit_reverse(0, 8), 0);
        assert_eq!(bit_reverse(1, 8), 4);
        assert_eq!(bit_reverse(2, 8), 2);
        assert_eq!(bit_reverse(3, 8), 6);
        assert_eq!(bit_reverse(1, 256), 128);
        assert_eq!(bit_reverse(255, 256), 255);
    }

    #[test]
    fn test_table_dimensions() {
        let table = ButterflyTable::new(64);
        assert_eq!(table.passes, 6);
        assert_eq!(table.data.len(), 64 * 6 * 4);
    }

    #[test]
    fn test_impulse_becomes_constant() {
        // Inverse transform of a DC impulse is a constant signal
        let table = ButterflyTable::new(16);
        let mut input = vec![Complex::new(0.0f32, 0.0); 16];
        input[0] = Complex::new(1.0, 0.0);

        let output = table.apply(&input);
        for value in &output {
            assert!((value - Complex::new(1.0, 0.0)).norm() < 1e-5);
        }
    }

    #[test]
    fn test_matches_reference_inverse() {
        // Deterministic pseudo-random spectrum, compared against rustfft
        let n = 128usize;
        let table = ButterflyTable::new(n as u32);
        let input: Vec<Complex<f32>> = (0..n)
            .map(|i| {
                let a = (i as f32 * 0.37).sin();
                let b = (i as f32 * 1.13).cos();
                Complex::new(a, b)
            })
            .collect();

        let table_out = table.apply(&input);
        let mut reference_out = input.clone();
        reference::inverse_fft_1d(&mut reference_out);

        for (got, want) in table_out.iter().zip(&reference_out) {
            assert!(
                (got - want).norm() < 1e-3 * (1.0 + want.norm()),
                "{:?} vs {:?}",
                got,
                want
            );
        }
    }

    #[test]
    fn test_round_trip_2d() {
        // Forward reference transform, then the table-driven inverse over
        // rows and columns with 1/N^2 scaling, must reproduce the input
        let n = 32usize;
        let table = ButterflyTable::new(n as u32);
        let original: Vec<Complex<f32>> = (0..n * n)
            .map(|i| Complex::new((i as f32 * 0.11).sin(), 0.0))
            .collect();

        let mut spectrum = original.clone();
        reference::forward_fft_2d(&mut spectrum, n);

        // Rows
        let mut grid = spectrum;
        for row in 0..n {
            let transformed = table.apply(&grid[row * n..(row + 1) * n]);
            grid[row * n..(row + 1) * n].copy_from_slice(&transformed);
        }
        // Columns
        let mut column = vec![Complex::new(0.0, 0.0); n];
        for col in 0..n {
            for row in 0..n {
                column[row] = grid[row * n + col];
            }
            let transformed = table.apply(&column);
            for row in 0..n {
                grid[row * n + col] = transformed[row] / (n * n) as f32;
            }
        }

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
