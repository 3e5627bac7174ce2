use crate::constants::{MAX_PIXEL_RATIO, MSAA_SAMPLES};
use crate::error::SceneError;

/// Backing-store size of the render surface, in physical pixels.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Viewport {
    pub width: u32,
    pub height: u32,
}

impl Viewport {
    pub fn new(width: u32, height: u32) -> Result<Self, SceneError> {
        if width == 0 || height == 0 {
            return Err(SceneError::EmptyViewport { width, height });
        }
        Ok(Self { width, height })
    }

    /// Physical size for a CSS-pixel box, with the pixel ratio capped.
    pub fn from_css(css_width: f64, css_height: f64, device_pixel_ratio: f64) -> Self {
        let dpr = if device_pixel_ratio.is_finite() && device_pixel_ratio > 0.0 {
            device_pixel_ratio.min(MAX_PIXEL_RATIO)
        } else {
            1.0
        };
        let px = |css: f64| ((css.max(0.0) * dpr) as u32).max(1);
        Self {
            width: px(css_width),
            height: px(css_height),
        }
    }

    pub fn aspect(&self) -> f32 {
        self.width as f32 / self.height.max(1) as f32
    }
}

/// Width/height pair for one render target.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Extent {
    pub width: u32,
    pub height: u32,
    pub samples: u32,
}

/// Sizes of every target the post-processing chain allocates.
///
/// All targets are full resolution; the renderer recreates every one of them
/// from a single `TargetSizes` so none can be left at a stale size.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TargetSizes {
    pub surface: Extent,
    pub scene_msaa: Extent,
    pub depth: Extent,
    pub scene_resolved: Extent,
    pub enhanced: Extent,
}

impl TargetSizes {
    pub fn for_viewport(viewport: Viewport) -> Self {
        let single = Extent {
            width: viewport.width,
            height: viewport.height,
            samples: 1,
        };
        let multi = Extent {
            samples: MSAA_SAMPLES,
            ..single
        };
        Self {
            surface: single,
            scene_msaa: multi,
            depth: multi,
            scene_resolved: single,
            enhanced: single,
        }
    }

    pub fn all(&self) -> [Extent; 5] {
        [
            self.surface,
            self.scene_msaa,
            self.depth,
            self.scene_resolved,
            self.enhanced,
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_viewport_is_rejected() {
        assert!(Viewport::new(0, 10).is_err());
        assert!(Viewport::new(10, 0).is_err());
    }

    #[test]
    fn pixel_ratio_is_capped() {
        let vp = Viewport::from_css(800.0, 600.0, 3.0);
        assert_eq!(vp, Viewport { width: 1600, height: 1200 });
        let vp = Viewport::from_css(800.0, 600.0, f64::NAN);
        assert_eq!(vp, Viewport { width: 800, height: 600 });
    }

    #[test]
    fn collapsed_box_still_has_one_pixel() {
        let vp = Viewport::from_css(0.0, 0.0, 1.0);
        assert_eq!(vp, Viewport { width: 1, height: 1 });
    }
}
