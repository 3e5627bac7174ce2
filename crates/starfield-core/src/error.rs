use thiserror::Error;

/// Errors raised by the simulation core.
///
/// Everything here is recoverable by the host: the web front-end logs the
/// error and either keeps the previous value or re-initializes.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum SceneError {
    #[error("viewport must be non-empty, got {width}x{height}")]
    EmptyViewport { width: u32, height: u32 },

    #[error("invalid range for {name}: [{lo}, {hi}]")]
    InvalidRange { name: &'static str, lo: f32, hi: f32 },

    #[error("render surface cannot go from {from:?} to {to:?}")]
    InvalidSurfaceTransition {
        from: crate::surface::SurfaceState,
        to: crate::surface::SurfaceState,
    },
}
