use super::helpers::{self, DEPTH_FORMAT, HDR_FORMAT};
use starfield_core::TargetSizes;
use wgpu;

/// Offscreen targets for the scene and post chain.
///
/// - `scene_msaa` + `depth` are the 4x multisampled scene attachments.
/// - `scene_resolved` receives the MSAA resolve and feeds color enhancement.
/// - `enhanced` feeds the film grain pass, which writes the swapchain.
pub(crate) struct RenderTargets {
    pub(crate) sizes: TargetSizes,
    pub(crate) scene_msaa: wgpu::Texture,
    pub(crate) scene_msaa_view: wgpu::TextureView,
    pub(crate) depth: wgpu::Texture,
    pub(crate) depth_view: wgpu::TextureView,
    pub(crate) scene_resolved: wgpu::Texture,
    pub(crate) scene_resolved_view: wgpu::TextureView,
    pub(crate) enhanced: wgpu::Texture,
    pub(crate) enhanced_view: wgpu::TextureView,
}

impl RenderTargets {
    pub(crate) fn new(device: &wgpu::Device, sizes: TargetSizes) -> Self {
        let attach = wgpu::TextureUsages::RENDER_ATTACHMENT;
        let sampled = attach | wgpu::TextureUsages::TEXTURE_BINDING;
        let (scene_msaa, scene_msaa_view) =
            helpers::create_texture(device, "scene_msaa", sizes.scene_msaa, HDR_FORMAT, attach);
        let (depth, depth_view) =
            helpers::create_texture(device, "scene_depth", sizes.depth, DEPTH_FORMAT, attach);
        let (scene_resolved, scene_resolved_view) = helpers::create_texture(
            device,
            "scene_resolved",
            sizes.scene_resolved,
            HDR_FORMAT,
            sampled,
        );
        let (enhanced, enhanced_view) =
            helpers::create_texture(device, "enhanced", sizes.enhanced, HDR_FORMAT, sampled);
        Self {
            sizes,
            scene_msaa,
            scene_msaa_view,
            depth,
            depth_view,
            scene_resolved,
            scene_resolved_view,
            enhanced,
            enhanced_view,
        }
    }

    /// Drop the old textures and allocate every target at `sizes`.
    pub(crate) fn recreate(&mut self, device: &wgpu::Device, sizes: TargetSizes) {
        self.destroy();
        *self = Self::new(device, sizes);
    }

    pub(crate) fn destroy(&self) {
        self.scene_msaa.destroy();
        self.depth.destroy();
        self.scene_resolved.destroy();
        self.enhanced.destroy();
    }
}
