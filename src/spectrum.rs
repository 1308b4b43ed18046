//! Initial wave-spectrum generation and CPU-side spectral math.
//!
//! The initializer runs on the CPU and uploads its result once per wind
//! epoch; everything per-frame happens in compute passes. The functions here
//! are also the reference mirror of the shader math, which is what the tests
//! exercise.

use glam::Vec2;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rustfft::num_complex::Complex;

use crate::params::{SpectrumModel, WindParameters};

/// Gravitational acceleration (m/s^2)
pub const GRAVITY: f32 = 9.81;

/// Floor applied to |k| before the dispersion square root; keeps the DC
/// texel finite. The DC amplitude is zeroed anyway, so this is numerical
/// safety, not physics.
const K_EPSILON: f32 = 1e-6;

/// Map a texel index to a signed frequency index, DC at texel 0.
///
/// Texel order is standard FFT order, so the inverse transform needs no
/// shift pass and no per-texel sign flip.
pub fn wrap_index(i: u32, n: u32) -> i32 {
    if i < n / 2 {
        i as i32
    } else {
        i as i32 - n as i32
    }
}

/// Wavevector for texel (i, j) on an n x n grid over a patch of
/// `domain_length_m` meters.
pub fn wavevector(i: u32, j: u32, n: u32, domain_length_m: f32) -> Vec2 {
    let dk = 2.0 * std::f32::consts::PI / domain_length_m;
    Vec2::new(wrap_index(i, n) as f32 * dk, wrap_index(j, n) as f32 * dk)
}

/// Deep-water dispersion relation: omega = sqrt(g * |k|), clamped near k = 0.
pub fn dispersion(k: Vec2) -> f32 {
    (GRAVITY * k.length().max(K_EPSILON)).sqrt()
}

/// Directional energy density of the chosen model at wavevector `k`.
pub fn spectral_energy(model: &SpectrumModel, k: Vec2, wind: &WindParameters) -> f32 {
    let k_len = k.length();
    if k_len < K_EPSILON {
        return 0.0;
    }
    let (wx, wy) = wind.wind_direction();
    let alignment = (k.x * wx + k.y * wy) / k_len;

    match *model {
        SpectrumModel::Phillips {
            small_wave_cutoff_m,
            opposing_suppression,
        } => {
            // Largest wave arising from a sustained wind of this speed
            let l = wind.wind_speed_m_per_s * wind.wind_speed_m_per_s / GRAVITY;
            if l <= 0.0 {
                return 0.0;
            }
            let kl = k_len * l;
            let mut energy = wind.amplitude * (-1.0 / (kl * kl)).exp() / k_len.powi(4)
                * alignment
                * alignment;
            if alignment < 0.0 {
                energy *= opposing_suppression;
            }
            // Suppress wavelengths below the cutoff to avoid grid aliasing
            let cutoff = k_len * small_wave_cutoff_m;
            energy * (-cutoff * cutoff).exp()
        }
        SpectrumModel::PiersonMoskowitz { small_wave_cutoff_m } => {
            let u = wind.wind_speed_m_per_s;
            if u <= 0.0 {
                return 0.0;
            }
            // Peak wavenumber of a fully developed sea
            let kp = 0.77 * GRAVITY / (u * u);
            let alpha = 0.0081 * wind.amplitude;
            let mut energy = alpha / (2.0 * k_len.powi(3))
                * (-1.25 * (kp / k_len).powi(2)).exp()
                * alignment
                * alignment;
            if alignment < 0.0 {
                energy = 0.0;
            }
            let cutoff = k_len * small_wave_cutoff_m;
            energy * (-cutoff * cutoff).exp()
        }
    }
}

/// Two-term time evolution of a spectrum texel.
///
/// `h0_minus_conj` is conj(H0(-k)), stored alongside H0 so evaluation needs
/// no cross-texel reads. This is the CPU mirror of `evolve.wgsl`.
pub fn evolve(
    h0: Complex<f32>,
    h0_minus_conj: Complex<f32>,
    omega: f32,
    t: f32,
) -> Complex<f32> {
    let rotation = Complex::new((omega * t).cos(), (omega * t).sin());
    h0 * rotation + h0_minus_conj * rotation.conj()
}

/// Static initial spectrum for one wind epoch.
///
/// Texel (i, j) packs four floats: `[H0(k).re, H0(k).im,
/// conj(H0(-k)).re, conj(H0(-k)).im]`, ready for upload as Rgba32Float.
pub struct InitialSpectrum {
    pub grid_size: u32,
    pub domain_length_m: f32,
    pub data: Vec<f32>,
}

impl InitialSpectrum {
    /// Generate the spectrum for `wind` under `model`.
    ///
    /// Deterministic: identical parameters produce bit-identical data.
    /// Fails on invalid parameters before anything is allocated.
    pub fn generate(wind: &WindParameters, model: &SpectrumModel) -> Result<Self, String> {
        wind.validate()?;

        let n = wind.grid_size;
        let dk = 2.0 * std::f32::consts::PI / wind.domain_length_m;
        // The merge pass divides the inverse transform by N^2 once; the
        // amplitudes carry the compensating factor so heights stay in meters.
        let norm = (n * n) as f32;

        let mut rng = StdRng::seed_from_u64(wind.spectrum_seed);
        let mut h0 = vec![Complex::new(0.0f32, 0.0f32); (n * n) as usize];
        for j in 0..n {
            for i in 0..n {
                // Draw for every texel in a fixed order so the sequence is
                // independent of which texels end up with zero energy
                let (xi_re, xi_im) = gaussian_pair(&mut rng);
                let k = wavevector(i, j, n, wind.domain_length_m);
                let energy = spectral_energy(model, k, wind);
                let amp = (energy * 0.5).sqrt() * dk * norm;
                h0[(j * n + i) as usize] =
                    Complex::new(xi_re * amp, xi_im * amp);
            }
        }
        // Flat mean sea level
        h0[0] = Complex::new(0.0, 0.0);

        let mut data = vec![0.0f32; (n * n * 4) as usize];
        for j in 0..n {
            for i in 0..n {
                let idx = (j * n + i) as usize;
                // -k lives at the mirrored texel, pairing (i, j) with (N-i, N-j)
                let mi = (n - i) % n;
                let mj = (n - j) % n;
                let mirror = h0[(mj * n + mi) as usize].conj();
                data[idx * 4] = h0[idx].re;
                data[idx * 4 + 1] = h0[idx].im;
                data[idx * 4 + 2] = mirror.re;
                data[idx * 4 + 3] = mirror.im;
            }
        }

        Ok(Self {
            grid_size: n,
            domain_length_m: wind.domain_length_m,
            data,
        })
    }

    /// H0(k) at texel (i, j)
    pub fn h0(&self, i: u32, j: u32) -> Complex<f32> {
        let idx = ((j * self.grid_size + i) * 4) as usize;
        Complex::new(self.data[idx], self.data[idx + 1])
    }

    /// conj(H0(-k)) at texel (i, j)
    pub fn h0_minus_conj(&self, i: u32, j: u32) -> Complex<f32> {
        let idx = ((j * self.grid_size + i) * 4) as usize;
        Complex::new(self.data[idx + 2], self.data[idx + 3])
    }

    /// The evolved spectrum value at t = 0: H(k, 0) = H0(k) + conj(H0(-k)).
    ///
    /// This combined field is conjugate-symmetric, which is what guarantees
    /// a real height field after the inverse transform.
    pub fn value_at(&self, i: u32, j: u32) -> Complex<f32> {
        self.h0(i, j) + self.h0_minus_conj(i, j)
    }

    /// Aggregate statistics for logging at initialization.
    pub fn summary(&self) -> SpectrumSummary {
        let n = self.grid_size;
        let mut total_energy = 0.0f64;
        let mut peak = 0.0f32;
        let mut peak_k = Vec2::ZERO;
        for j in 0..n {
            for i in 0..n {
                let h = self.value_at(i, j);
                let e = h.norm_sqr();
                total_energy += e as f64;
                if e > peak {
                    peak = e;
                    peak_k = wavevector(i, j, n, self.domain_length_m);
                }
            }
        }
        SpectrumSummary {
            total_energy: total_energy as f32,
            peak_wavevector: peak_k,
            peak_wavelength_m: if peak_k.length() > K_EPSILON {
                2.0 * std::f32::consts::PI / peak_k.length()
            } else {
                0.0
            },
        }
    }
}

/// Spectrum statistics logged once per wind epoch
pub struct SpectrumSummary {
    pub total_energy: f32,
    pub peak_wavevector: Vec2,
    pub peak_wavelength_m: f32,
}

/// One standard-normal pair via the Box-Muller transform.
fn gaussian_pair(rng: &mut StdRng) -> (f32, f32) {
    let u1: f32 = rng.random::<f32>().max(1e-9);
    let u2: f32 = rng.random();
    let r = (-2.0 * u1.ln()).sqrt();
    let theta = 2.0 * std::f32::consts::PI * u2;
    (r * theta.cos(), r * theta.sin())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_wind() -> WindParameters {
        WindParameters {
            grid_size: 64,
            ..WindParameters::default()
        }
    }

    #[test]
    fn test_wrap_index_orders_dc_first() {
        assert_eq!(wrap_index(0, 64), 0);
        assert_eq!(wrap_index(31, 64), 31);
        assert_eq!(wrap_index(32, 64), -32);
        assert_eq!(wrap_index(63, 64), -1);
    }

    #[test]
    fn test_dispersion_finite_at_dc() {
        let omega = dispersion(Vec2::ZERO);
        assert!(omega.is_finite());
        assert!(omega >= 0.0);
    }

    #[test]
    fn test_generate_rejects_bad_grid() {
        let wind = WindParameters {
            grid_size: 100,
            ..WindParameters::default()
        };
        assert!(InitialSpectrum::generate(&wind, &SpectrumModel::default()).is_err());
    }

    #[test]
    fn test_conjugate_symmetry() {
        let wind = test_wind();
        let spectrum = InitialSpectrum::generate(&wind, &SpectrumModel::default()).unwrap();
        let n = wind.grid_size;

        for j in 0..n {
            for i in 0..n {
                let value = spectrum.value_at(i, j);
                let mirrored = spectrum.value_at((n - i) % n, (n - j) % n);
                assert!(
                    (value - mirrored.conj()).norm() < 1e-4 * (1.0 + value.norm()),
                    "symmetry violated at ({}, {}): {:?} vs conj {:?}",
                    i,
                    j,
                    value,
                    mirrored
                );
            }
        }
    }

    #[test]
    fn test_determinism() {
        let wind = test_wind();
        let model = SpectrumModel::default();
        let a = InitialSpectrum::generate(&wind, &model).unwrap();
        let b = InitialSpectrum::generate(&wind, &model).unwrap();
        assert_eq!(a.data, b.data, "same parameters must be bit-identical");
    }

    #[test]
    fn test_dc_texel_is_zero() {
        let spectrum =
            InitialSpectrum::generate(&test_wind(), &SpectrumModel::default()).unwrap();
        assert_eq!(spectrum.h0(0, 0), Complex::new(0.0, 0.0));
    }

    #[test]
    fn test_energy_concentrates_downwind() {
        let wind = test_wind(); // wind along +X
        let spectrum = InitialSpectrum::generate(&wind, &SpectrumModel::default()).unwrap();
        let n = wind.grid_size;

        let mut aligned = 0.0f64;
        let mut crosswind = 0.0f64;
        for j in 0..n {
            for i in 0..n {
                let k = wavevector(i, j, n, wind.domain_length_m);
                if k.length() < 1e-6 {
                    continue;
                }
                let cos = k.x / k.length();
                let e = spectrum.value_at(i, j).norm_sqr() as f64;
                if cos.abs() > 0.9 {
                    aligned += e;
                } else if cos.abs() < 0.1 {
                    crosswind += e;
                }
            }
        }
        assert!(
            aligned > 10.0 * crosswind,
            "wind-aligned energy {} should dominate crosswind {}",
            aligned,
            crosswind
        );
    }

    #[test]
    fn test_evolution_at_t0_matches_initial() {
        let wind = test_wind();
        let spectrum = InitialSpectrum::generate(&wind, &SpectrumModel::default()).unwrap();
        let n = wind.grid_size;

        for j in 0..n {
            for i in 0..n {
                let k = wavevector(i, j, n, wind.domain_length_m);
                let evolved = evolve(
                    spectrum.h0(i, j),
                    spectrum.h0_minus_conj(i, j),
                    dispersion(k),
                    0.0,
                );
                let initial = spectrum.value_at(i, j);
                assert!((evolved - initial).norm() < 1e-5 * (1.0 + initial.norm()));
            }
        }
    }

    #[test]
    fn test_height_field_is_real() {
        let wind = test_wind();
        let spectrum = InitialSpectrum::generate(&wind, &SpectrumModel::default()).unwrap();
        let n = wind.grid_size as usize;

        let mut grid: Vec<Complex<f32>> = (0..n * n)
            .map(|idx| spectrum.value_at((idx % n) as u32, (idx / n) as u32))
            .collect();
        crate::fft::reference::inverse_fft_2d(&mut grid, n);

        let max_re = grid.iter().map(|c| c.re.abs()).fold(0.0f32, f32::max);
        let max_im = grid.iter().map(|c| c.im.abs()).fold(0.0f32, f32::max);
        assert!(max_re > 0.0, "spectrum should produce waves");
        assert!(
            max_im < 1e-3 * max_re,
            "imaginary residue {} vs real magnitude {}",
            max_im,
            max_re
        );
    }
}
