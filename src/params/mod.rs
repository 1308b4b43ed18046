//! Parameter definitions with physical units and documented semantics.
//!
//! All magic numbers are extracted here with:
//! - Physical units (meters, seconds, radians, etc.)
//! - Documented ranges and meanings
//! - Validation at the simulation boundary

mod camera;
mod render;
mod waves;
mod wind;

// Re-export all types
pub use camera::{CameraPreset, FixedCamera, OrbitCamera};
pub use render::{RecordingConfig, RenderConfig};
pub use waves::{FoamParams, SpectrumModel};
pub use wind::WindParameters;
