//! Color enhancement pass settings.

use glam::Vec3;

const LUMA: Vec3 = Vec3::new(0.299, 0.587, 0.114);

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ColorEnhance {
    pub saturation: f32,
    pub contrast: f32,
    pub brightness: f32,
}

impl Default for ColorEnhance {
    fn default() -> Self {
        Self {
            saturation: 1.0,
            contrast: 1.0,
            brightness: 1.0,
        }
    }
}

impl ColorEnhance {
    /// CPU mirror of `fs_enhance`: saturation, then contrast, then brightness.
    pub fn apply(&self, rgb: Vec3) -> Vec3 {
        let luminance = rgb.dot(LUMA);
        let saturated = Vec3::splat(luminance).lerp(rgb, self.saturation);
        let contrasted = (saturated - 0.5) * self.contrast + 0.5;
        contrasted * self.brightness
    }

    pub fn uniforms(&self) -> ColorEnhanceUniforms {
        ColorEnhanceUniforms {
            saturation: self.saturation,
            contrast: self.contrast,
            brightness: self.brightness,
            _pad: 0.0,
        }
    }
}

#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct ColorEnhanceUniforms {
    pub saturation: f32,
    pub contrast: f32,
    pub brightness: f32,
    pub _pad: f32,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn close(a: Vec3, b: Vec3) -> bool {
        (a - b).abs().max_element() < 1e-5
    }

    #[test]
    fn defaults_are_identity() {
        let c = Vec3::new(0.2, 0.7, 0.4);
        assert!(close(ColorEnhance::default().apply(c), c));
    }

    #[test]
    fn zero_saturation_gives_luminance() {
        let e = ColorEnhance {
            saturation: 0.0,
            ..Default::default()
        };
        let out = e.apply(Vec3::new(1.0, 0.0, 0.0));
        assert!(close(out, Vec3::splat(0.299)));
    }

    #[test]
    fn contrast_pivots_on_mid_grey() {
        let e = ColorEnhance {
            contrast: 2.0,
            ..Default::default()
        };
        assert!(close(e.apply(Vec3::splat(0.5)), Vec3::splat(0.5)));
        assert!(close(e.apply(Vec3::splat(0.75)), Vec3::splat(1.0)));
    }

    #[test]
    fn brightness_multiplies() {
        let e = ColorEnhance {
            brightness: 0.5,
            ..Default::default()
        };
        assert!(close(e.apply(Vec3::splat(0.8)), Vec3::splat(0.4)));
    }
}
