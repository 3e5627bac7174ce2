//! Sky dome parameters and the uniform block for `nebula.wgsl`.
//!
//! The shader itself is procedural (warped value noise, Worley cells, a
//! galactic band); the pieces that are cheap to mirror on the CPU
//! (`band_term`, `blend4`) live here so their shape can be tested.

use crate::color::hex;
use crate::constants::{NEBULA_DOME_RADIUS, NEBULA_TIME_SCALE};
use crate::scene::NebulaPalette;
use glam::{Mat4, Vec3};

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct NebulaParams {
    pub intensity: f32,
    pub scale: f32,
    pub warp: f32,
    pub detail: f32,
    pub sharpness: f32,
    /// Axis the galactic band wraps around; the band peaks perpendicular to it.
    pub band_dir: Vec3,
    pub band_width: f32,
    pub band_sharpness: f32,
    pub band_boost: f32,
    pub deep_space: Vec3,
    pub accent_strength: f32,
}

impl Default for NebulaParams {
    fn default() -> Self {
        Self {
            intensity: 0.60,
            scale: 1.2,
            warp: 0.55,
            detail: 0.45,
            sharpness: 1.4,
            band_dir: Vec3::Y,
            band_width: 0.35,
            band_sharpness: 2.5,
            band_boost: 0.7,
            deep_space: hex(0x070a14),
            accent_strength: 0.12,
        }
    }
}

/// Uniform block for the dome. Layout matches `NebulaUniforms` in WGSL.
#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct NebulaUniforms {
    pub view_proj: [[f32; 4]; 4],
    pub model: [[f32; 4]; 4],
    /// time, intensity, scale, warp
    pub p0: [f32; 4],
    /// detail, sharpness, band width, band sharpness
    pub p1: [f32; 4],
    /// band boost, accent strength
    pub p2: [f32; 4],
    pub band_dir: [f32; 4],
    pub deep_space: [f32; 4],
    pub colors: [[f32; 4]; 4],
    pub accent: [f32; 4],
}

impl NebulaUniforms {
    pub fn new(
        params: &NebulaParams,
        palette: &NebulaPalette,
        time: f32,
        view_proj: Mat4,
        camera_pos: Vec3,
    ) -> Self {
        let band = params.band_dir.try_normalize().unwrap_or(Vec3::Y);
        Self {
            view_proj: view_proj.to_cols_array_2d(),
            model: dome_model(camera_pos).to_cols_array_2d(),
            p0: [time, params.intensity, params.scale, params.warp],
            p1: [
                params.detail,
                params.sharpness,
                params.band_width,
                params.band_sharpness,
            ],
            p2: [params.band_boost, params.accent_strength, 0.0, 0.0],
            band_dir: band.extend(0.0).to_array(),
            deep_space: params.deep_space.extend(1.0).to_array(),
            colors: palette.colors.map(|c| c.extend(1.0).to_array()),
            accent: palette.accent.extend(1.0).to_array(),
        }
    }
}

/// Shader time for a wall-clock timestamp.
pub fn nebula_time(now_ms: f64) -> f32 {
    (now_ms * NEBULA_TIME_SCALE) as f32
}

/// Dome transform: unit sphere scaled to the dome radius and centred on the
/// camera, so the far plane never clips it.
pub fn dome_model(camera_pos: Vec3) -> Mat4 {
    Mat4::from_translation(camera_pos) * Mat4::from_scale(Vec3::splat(NEBULA_DOME_RADIUS))
}

pub fn smoothstep(edge0: f32, edge1: f32, x: f32) -> f32 {
    let t = ((x - edge0) / (edge1 - edge0)).clamp(0.0, 1.0);
    t * t * (3.0 - 2.0 * t)
}

/// Band strength for a view direction: 1 on the great circle perpendicular to
/// `band_dir`, falling to 0 toward its poles.
pub fn band_term(dir: Vec3, band_dir: Vec3, width: f32, sharpness: f32) -> f32 {
    let coord = 1.0 - dir.normalize_or_zero().dot(band_dir.normalize_or_zero()).abs();
    smoothstep(0.5 - width, 0.5 + width, coord).powf(sharpness)
}

/// Piecewise smooth blend across four palette stops.
pub fn blend4(colors: &[Vec3; 4], t: f32) -> Vec3 {
    let t = t.clamp(0.0, 1.0);
    let (a, b, k) = if t < 0.3333 {
        (colors[0], colors[1], t / 0.3333)
    } else if t < 0.6666 {
        (colors[1], colors[2], (t - 0.3333) / 0.3333)
    } else {
        (colors[2], colors[3], (t - 0.6666) / 0.3334)
    };
    a.lerp(b, smoothstep(0.0, 1.0, k))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn band_peaks_on_the_equator() {
        let p = NebulaParams::default();
        let eq = band_term(Vec3::X, p.band_dir, p.band_width, p.band_sharpness);
        let pole = band_term(Vec3::Y, p.band_dir, p.band_width, p.band_sharpness);
        assert!((eq - 1.0).abs() < 1e-6);
        assert_eq!(pole, 0.0);
        let mid = band_term(Vec3::new(1.0, 1.0, 0.0), p.band_dir, p.band_width, p.band_sharpness);
        assert!(mid > 0.0 && mid < 1.0);
    }

    #[test]
    fn blend_hits_end_stops() {
        let c = [Vec3::X, Vec3::Y, Vec3::Y, Vec3::Z];
        assert_eq!(blend4(&c, 0.0), Vec3::X);
        assert!((blend4(&c, 1.0) - Vec3::Z).length() < 1e-5);
        assert_eq!(blend4(&c, 0.5), Vec3::Y);
        assert_eq!(blend4(&c, -3.0), Vec3::X);
    }

    #[test]
    fn dome_follows_camera() {
        let cam = Vec3::new(100.0, -20.0, 3000.0);
        let m = dome_model(cam);
        let far = m.transform_point3(Vec3::Z);
        assert!(((far - cam).length() - NEBULA_DOME_RADIUS).abs() < 1.0);
    }

    #[test]
    fn shader_time_scale() {
        assert!((nebula_time(20_000.0) - 1.0).abs() < 1e-6);
    }

    #[test]
    fn uniform_block_layout() {
        assert_eq!(std::mem::size_of::<NebulaUniforms>(), 272);
    }
}
