//! Static scene content, generated once at startup and never mutated.
//!
//! Everything here is plain instance data; the web renderer uploads it into
//! vertex buffers and draws it with the pipelines in `objects.wgsl`.

use crate::color::{hex, hsl};
use crate::derive_rng;
use crate::error::SceneError;
use crate::nebula::NebulaParams;
use crate::post::ColorEnhance;
use glam::{EulerRot, Mat4, Quat, Vec3};
use rand::rngs::StdRng;
use rand::Rng;
use std::f32::consts::{FRAC_PI_2, TAU};

/// Camera-facing sprite: stars, dust and shooting-star dots.
#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct BillboardInstance {
    pub center: [f32; 3],
    /// Full edge length in world units.
    pub size: f32,
    pub color: [f32; 4],
}

/// Instanced sphere or ring quad.
#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct MeshInstance {
    pub model: [[f32; 4]; 4],
    pub color: [f32; 4],
    /// Rings: `x` = inner radius as a fraction of the outer radius.
    pub params: [f32; 4],
}

impl MeshInstance {
    fn sphere(center: Vec3, radius: f32, color: Vec3) -> Self {
        let model = Mat4::from_scale_rotation_translation(Vec3::splat(radius), Quat::IDENTITY, center);
        Self {
            model: model.to_cols_array_2d(),
            color: color.extend(1.0).to_array(),
            params: [0.0; 4],
        }
    }

    fn ring(center: Vec3, tilt_x: f32, inner: f32, outer: f32, color: Vec3, opacity: f32) -> Self {
        let rotation = Quat::from_euler(EulerRot::XYZ, tilt_x, 0.0, 0.0);
        let model = Mat4::from_scale_rotation_translation(Vec3::splat(outer), rotation, center);
        Self {
            model: model.to_cols_array_2d(),
            color: color.extend(opacity).to_array(),
            params: [inner / outer, 0.0, 0.0, 0.0],
        }
    }

    pub fn center(&self) -> Vec3 {
        Vec3::from_slice(&self.model[3][..3])
    }

    /// Uniform scale factor (radius for spheres, outer radius for rings).
    pub fn radius(&self) -> f32 {
        Vec3::from_slice(&self.model[0][..3]).length()
    }
}

/// Four-stop nebula palette plus accent, in linear RGB.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct NebulaPalette {
    pub base_hue: f32,
    pub colors: [Vec3; 4],
    pub accent: Vec3,
}

impl NebulaPalette {
    /// Two close, dark colors around a random base hue, mirrored into four
    /// stops, plus an accent sixty degrees away.
    pub fn generate(rng: &mut impl Rng) -> Self {
        let base_hue = rng.gen_range(180.0..340.0);
        let s0 = 0.50 + rng.gen_range(-0.04..0.04);
        let s1 = 0.50 + rng.gen_range(-0.06..0.06);
        let l0 = 0.18 + rng.gen_range(-0.02..0.02);
        let l1 = 0.14 + rng.gen_range(-0.02..0.02);
        let c0 = hsl(base_hue, s0, l0);
        let c1 = hsl(base_hue + rng.gen_range(-28.0..28.0), s1, l1);
        let accent_hue = base_hue + if rng.gen_bool(0.5) { 60.0 } else { -60.0 };
        Self {
            base_hue,
            colors: [c0, c1, c1, c0],
            accent: hsl(accent_hue, 0.65, 0.30),
        }
    }
}

/// Counts, spreads and look settings for the static scene.
#[derive(Clone, Debug, PartialEq)]
pub struct SceneConfig {
    pub seed: u64,
    pub star_count: u32,
    /// Per-axis full width of the star box.
    pub star_spread: Vec3,
    /// Stars closer to the origin than this become glow sprites.
    pub glow_radius: f32,
    pub glow_size: (f32, f32),
    pub point_size: f32,
    pub dust_count: u32,
    pub dust_range: f32,
    pub dust_size: f32,
    pub dust_opacity: f32,
    pub background_planets: u32,
    pub color_enhance: ColorEnhance,
    pub nebula: NebulaParams,
}

impl Default for SceneConfig {
    fn default() -> Self {
        Self {
            seed: 0x5EED,
            star_count: 25_000,
            star_spread: Vec3::new(50_000.0, 20_000.0, 50_000.0),
            glow_radius: 5_000.0,
            glow_size: (16.0, 28.0),
            point_size: 20.0,
            dust_count: 4_000,
            dust_range: 5_000.0,
            dust_size: 2.0,
            dust_opacity: 0.12,
            background_planets: 5,
            color_enhance: ColorEnhance::default(),
            nebula: NebulaParams::default(),
        }
    }
}

impl SceneConfig {
    pub fn validate(&self) -> Result<(), SceneError> {
        let (lo, hi) = self.glow_size;
        if !(lo > 0.0 && hi >= lo) {
            return Err(SceneError::InvalidRange { name: "glow_size", lo, hi });
        }
        if !(self.dust_range > 0.0) {
            return Err(SceneError::InvalidRange {
                name: "dust_range",
                lo: 0.0,
                hi: self.dust_range,
            });
        }
        if self.star_spread.min_element() <= 0.0 {
            return Err(SceneError::InvalidRange {
                name: "star_spread",
                lo: self.star_spread.min_element(),
                hi: self.star_spread.max_element(),
            });
        }
        Ok(())
    }
}

/// Foreground planet colors: saturated, high-value hues.
const FOREGROUND_COLORS: [u32; 44] = [
    0xFF6B6B, 0x4ECDC4, 0x45B7D1, 0x96CEB4, 0xFFEAA7, 0xDDA0DD, 0x98D8C8, 0xF7DC6F, 0xBB8FCE,
    0x85C1E9, 0xFF1493, 0x00CED1, 0x32CD32, 0xFFD700, 0xFF6347, 0x9370DB, 0x20B2AA, 0xFF69B4,
    0x00BFFF, 0xFF4500, 0x8A2BE2, 0x00FF7F, 0xFF1493, 0x1E90FF, 0x32CD32, 0xFFD700, 0xFF6347,
    0x9370DB, 0x20B2AA, 0xFF69B4, 0xFF00FF, 0x00FFFF, 0xFFFF00, 0xFF0080, 0x00FF00, 0x0080FF,
    0xFF8000, 0x8000FF, 0xFF4080, 0x40FF80, 0x4080FF, 0xFFFF80, 0xFF8040, 0x8040FF,
];

pub const FOREGROUND_PLANET_CENTER: Vec3 = Vec3::new(0.0, 0.0, -800.0);

#[derive(Clone, Debug)]
pub struct SceneObjects {
    pub palette: NebulaPalette,
    pub glow_stars: Vec<BillboardInstance>,
    pub point_stars: Vec<BillboardInstance>,
    /// Positions relative to the camera; the renderer offsets them each frame.
    pub dust: Vec<BillboardInstance>,
    pub planets: Vec<MeshInstance>,
    pub rings: Vec<MeshInstance>,
}

impl SceneObjects {
    pub fn generate(config: &SceneConfig) -> Result<Self, SceneError> {
        config.validate()?;
        let mut objects = Self {
            palette: NebulaPalette::generate(&mut derive_rng(config.seed, 1)),
            glow_stars: Vec::new(),
            point_stars: Vec::new(),
            dust: Vec::new(),
            planets: Vec::new(),
            rings: Vec::new(),
        };
        objects.add_stars(config, &mut derive_rng(config.seed, 2));
        objects.add_dust(config, &mut derive_rng(config.seed, 3));
        let mut planet_rng = derive_rng(config.seed, 4);
        objects.add_foreground_planet(&mut planet_rng);
        for _ in 0..config.background_planets {
            objects.add_background_planet(&mut planet_rng);
        }
        log::info!(
            "[scene] {} glow stars, {} point stars, {} dust, {} planets, {} rings",
            objects.glow_stars.len(),
            objects.point_stars.len(),
            objects.dust.len(),
            objects.planets.len(),
            objects.rings.len()
        );
        Ok(objects)
    }

    fn add_stars(&mut self, config: &SceneConfig, rng: &mut StdRng) {
        let half = config.star_spread * 0.5;
        for _ in 0..config.star_count {
            let p = Vec3::new(
                rng.gen_range(-half.x..=half.x),
                rng.gen_range(-half.y..=half.y),
                rng.gen_range(-half.z..=half.z),
            );
            if p.length() < config.glow_radius {
                let (lo, hi) = config.glow_size;
                self.glow_stars.push(BillboardInstance {
                    center: p.to_array(),
                    size: rng.gen_range(lo..=hi),
                    color: [1.0; 4],
                });
            } else {
                let color = if rng.gen_bool(0.9) {
                    Vec3::ONE
                } else {
                    hex(rng.gen_range(0..=0xFF_FFFF))
                };
                self.point_stars.push(BillboardInstance {
                    center: p.to_array(),
                    size: config.point_size,
                    color: color.extend(1.0).to_array(),
                });
            }
        }
    }

    fn add_dust(&mut self, config: &SceneConfig, rng: &mut StdRng) {
        let half = config.dust_range * 0.5;
        let half_y = half * 0.6;
        self.dust = (0..config.dust_count)
            .map(|_| BillboardInstance {
                center: [
                    rng.gen_range(-half..=half),
                    rng.gen_range(-half_y..=half_y),
                    rng.gen_range(-half..=half),
                ],
                size: config.dust_size,
                color: [1.0, 1.0, 1.0, config.dust_opacity],
            })
            .collect();
    }

    fn add_foreground_planet(&mut self, rng: &mut StdRng) {
        let radius = rng.gen_range(120.0..270.0);
        let color = hex(FOREGROUND_COLORS[rng.gen_range(0..FOREGROUND_COLORS.len())]);
        self.planets
            .push(MeshInstance::sphere(FOREGROUND_PLANET_CENTER, radius, color));
        if rng.gen_bool(0.3) {
            let ring_color = hex(rng.gen_range(0..=0xFF_FFFF));
            self.rings.push(MeshInstance::ring(
                FOREGROUND_PLANET_CENTER,
                FRAC_PI_2,
                radius * 1.5,
                radius * 2.2,
                ring_color,
                0.6,
            ));
        }
    }

    fn add_background_planet(&mut self, rng: &mut StdRng) {
        let radius = rng.gen_range(50.0..200.0);
        let center = Vec3::new(
            rng.gen_range(-10_000.0..=10_000.0),
            rng.gen_range(-1_500.0..=1_500.0),
            rng.gen_range(-10_000.0..=10_000.0),
        );
        let color = bright_color(rng);
        self.planets.push(MeshInstance::sphere(center, radius, color));

        let ring_color = bright_color(rng);
        let tilt = rng.gen::<f32>() * TAU;
        if rng.gen_bool(0.5) {
            self.rings.push(MeshInstance::ring(
                center,
                tilt,
                radius * 1.2,
                radius * 1.7,
                ring_color,
                0.6,
            ));
            if rng.gen_bool(0.5) {
                self.rings.push(MeshInstance::ring(
                    center,
                    tilt,
                    radius * 1.8,
                    radius * 1.9,
                    color,
                    0.3,
                ));
            }
        } else if rng.gen_bool(0.5) {
            let mut offset = || {
                let sign = if rng.gen_bool(0.5) { -1.0 } else { 1.0 };
                (rng.gen::<f32>() * 100.0 + 200.0, sign)
            };
            let (ox, sx) = offset();
            let (oy, sy) = offset();
            let (oz, sz) = offset();
            let moon_center = Vec3::new(
                (center.x + ox) * sx,
                (center.y + oy) * sy,
                (center.z + oz) * sz,
            );
            let moon_color = hex(rng.gen_range(0..=0xFF_FFFF));
            self.planets
                .push(MeshInstance::sphere(moon_center, radius / 6.0, moon_color));
        }
    }
}

fn bright_color(rng: &mut impl Rng) -> Vec3 {
    hsl(rng.gen::<f32>() * 360.0, 0.9, 0.65)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn generation_is_deterministic_per_seed() {
        let cfg = SceneConfig {
            star_count: 500,
            dust_count: 50,
            ..SceneConfig::default()
        };
        let a = SceneObjects::generate(&cfg).unwrap();
        let b = SceneObjects::generate(&cfg).unwrap();
        assert_eq!(a.glow_stars, b.glow_stars);
        assert_eq!(a.planets, b.planets);
        assert_eq!(a.palette, b.palette);
    }

    #[test]
    fn stars_are_split_by_distance() {
        let cfg = SceneConfig {
            star_count: 2_000,
            ..SceneConfig::default()
        };
        let objects = SceneObjects::generate(&cfg).unwrap();
        assert_eq!(
            objects.glow_stars.len() + objects.point_stars.len(),
            2_000
        );
        for s in &objects.glow_stars {
            assert!(Vec3::from(s.center).length() < 5_000.0);
            assert!((16.0..=28.0).contains(&s.size));
        }
        for s in &objects.point_stars {
            assert!(Vec3::from(s.center).length() >= 5_000.0);
        }
    }

    #[test]
    fn dust_box_is_flattened() {
        let objects = SceneObjects::generate(&SceneConfig::default()).unwrap();
        assert_eq!(objects.dust.len(), 4_000);
        for d in &objects.dust {
            assert!(d.center[1].abs() <= 1_500.0);
            assert!(d.center[0].abs() <= 2_500.0);
            assert_eq!(d.color[3], 0.12);
        }
    }

    #[test]
    fn foreground_planet_sits_in_front_of_camera() {
        for seed in 0..20 {
            let cfg = SceneConfig {
                seed,
                star_count: 0,
                dust_count: 0,
                ..SceneConfig::default()
            };
            let objects = SceneObjects::generate(&cfg).unwrap();
            let fg = objects.planets[0];
            assert_eq!(fg.center(), FOREGROUND_PLANET_CENTER);
            assert!((120.0..270.0).contains(&fg.radius()));
            // at most two rings per background planet plus one foreground ring
            assert!(objects.rings.len() <= 11);
        }
    }

    #[test]
    fn palette_mirrors_two_colors() {
        let mut rng = derive_rng(7, 0);
        for _ in 0..50 {
            let p = NebulaPalette::generate(&mut rng);
            assert!((180.0..340.0).contains(&p.base_hue));
            assert_eq!(p.colors[0], p.colors[3]);
            assert_eq!(p.colors[1], p.colors[2]);
        }
    }

    #[test]
    fn inverted_glow_range_is_rejected() {
        let cfg = SceneConfig {
            glow_size: (28.0, 16.0),
            ..SceneConfig::default()
        };
        assert!(matches!(
            SceneObjects::generate(&cfg),
            Err(SceneError::InvalidRange { name: "glow_size", .. })
        ));
    }
}
