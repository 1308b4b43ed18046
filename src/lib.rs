//! Swellfield - FFT-synthesized ocean wave simulation on the GPU.
//!
//! A fixed compute pipeline evolves a wind-driven wave spectrum each frame,
//! inverse-FFTs it into displacement, slope and foam fields, and exposes the
//! merged surface textures to a renderer.

pub mod camera;
pub mod cli;
pub mod context;
pub mod fft;
pub mod ocean;
pub mod params;
pub mod rendering;
pub mod spectrum;
