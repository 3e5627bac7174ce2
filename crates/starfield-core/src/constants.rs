//! Tuning constants for the simulation core.
//!
//! Units are noted per group; rotations are radians, distances are world
//! units, times are milliseconds unless the name says otherwise.

// Camera rotation
pub const EASING_FACTOR: f32 = 0.05; // fraction of remaining distance per frame
pub const TARGET_EPSILON: f32 = 0.001; // rad; "arrived" threshold while completing
pub const DRAG_SENSITIVITY: f32 = 0.0005; // rad per pixel of pointer travel
pub const DEFAULT_DRIFT_DIVISOR: f32 = 2000.0; // drift = (rand - 0.5) / divisor
pub const PITCH_LIMIT: f32 = std::f32::consts::FRAC_PI_2;

// Zoom
pub const ZOOM_MIN: f32 = 100.0;
pub const ZOOM_MAX: f32 = 5000.0;
pub const ZOOM_INITIAL: f32 = 1000.0;
pub const ZOOM_WHEEL_SCALE: f32 = 0.5;

// Positional random walk
pub const DRIFT_BOUND: f32 = 3000.0;

// Projection
pub const FOV_Y_DEGREES: f32 = 45.0;
pub const Z_NEAR: f32 = 1.0;
pub const Z_FAR: f32 = 50000.0;

// Glitch scheduling defaults (seconds, converted at point of use)
pub const GLITCH_INTERVAL_MIN_SEC: f32 = 1.0;
pub const GLITCH_INTERVAL_MAX_SEC: f32 = 5.0;
pub const GLITCH_DURATION_MIN_SEC: f32 = 0.06;
pub const GLITCH_DURATION_MAX_SEC: f32 = 0.16;
pub const GLITCH_MAX_BANDS: u32 = 5;
pub const GLITCH_SEED_RANGE: f32 = 1000.0;

// Chroma aberration
pub const CHROMA_IDLE: f32 = 0.0055;
pub const CHROMA_PULSE_MIN: f32 = 0.01;
pub const CHROMA_PULSE_MAX: f32 = 0.02;
pub const CHROMA_PULSE_CYCLES: f32 = 8.0;

// Shooting stars
pub const STAR_TIMESTEP_SEC: f32 = 1.0 / 60.0; // fixed, not wall-clock
pub const STAR_SPAWN_GAP_MIN_MS: u32 = 1200;
pub const STAR_SPAWN_GAP_MAX_MS: u32 = 8200;
pub const STAR_START_DIST_MIN: f32 = 6000.0;
pub const STAR_START_DIST_MAX: f32 = 12000.0;
pub const STAR_START_HEIGHT: f32 = 300.0; // +/- around the ring plane
pub const STAR_DIR_VERTICAL: f32 = 0.15;
pub const STAR_SPEED_MIN: f32 = 900.0;
pub const STAR_SPEED_MAX: f32 = 15200.0;
pub const STAR_LIFETIME_MIN_SEC: f32 = 1.0;
pub const STAR_LIFETIME_MAX_SEC: f32 = 3.0;
pub const STAR_DOT_RADIUS: f32 = 10.0;
pub const STAR_INITIAL_OPACITY: f32 = 0.95;

// Nebula
pub const NEBULA_TIME_SCALE: f64 = 0.00005; // shader time per ms
pub const NEBULA_DOME_RADIUS: f32 = 35000.0;

// Film grain time base
pub const FILM_TIME_SCALE: f64 = 0.001; // seconds per ms

// Viewport
pub const MAX_PIXEL_RATIO: f64 = 2.0;
pub const MSAA_SAMPLES: u32 = 4;
