pub mod camera;
pub mod color;
pub mod constants;
pub mod error;
pub mod geometry;
pub mod glitch;
pub mod input;
pub mod nebula;
pub mod post;
pub mod provider;
pub mod scene;
pub mod sim;
pub mod stars;
pub mod surface;
pub mod viewport;

// Shaders bundled as string constants
pub static NEBULA_WGSL: &str = include_str!("../shaders/nebula.wgsl");
pub static OBJECTS_WGSL: &str = include_str!("../shaders/objects.wgsl");
pub static COLOR_ENHANCE_WGSL: &str = include_str!("../shaders/color_enhance.wgsl");
pub static FILM_GRAIN_WGSL: &str = include_str!("../shaders/film_grain.wgsl");

pub use camera::*;
pub use error::*;
pub use glitch::*;
pub use input::*;
pub use provider::*;
pub use sim::*;
pub use stars::*;
pub use surface::*;
pub use viewport::*;

use rand::rngs::StdRng;
use rand::SeedableRng;

/// Derive an independent RNG stream from a base seed.
///
/// Each subsystem owns its own stream so reseeding or reordering one does not
/// shift the random sequence seen by the others.
pub fn derive_rng(seed: u64, stream: u64) -> StdRng {
    let mix = seed ^ stream.wrapping_mul(0x9E37_79B9_7F4A_7C15);
    StdRng::seed_from_u64(mix)
}
