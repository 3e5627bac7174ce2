//! WebGPU renderer: scene pass into a multisampled HDR target, then color
//! enhancement, then film grain onto the canvas.

mod helpers;
mod objects;
mod post;
mod sky;
mod targets;

use starfield_core::scene::{SceneConfig, SceneObjects};
use starfield_core::{FrameState, TargetSizes, Viewport};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use web_sys as web;
use wgpu;

pub struct GpuState {
    surface: wgpu::Surface<'static>,
    device: wgpu::Device,
    queue: wgpu::Queue,
    config: wgpu::SurfaceConfiguration,
    targets: targets::RenderTargets,
    sky: sky::SkyPass,
    objects: objects::ObjectPasses,
    post: post::PostResources,
}

impl GpuState {
    pub async fn new(
        canvas: &web::HtmlCanvasElement,
        viewport: Viewport,
        scene: &SceneObjects,
        scene_config: &SceneConfig,
        device_lost: Arc<AtomicBool>,
    ) -> anyhow::Result<Self> {
        let instance = wgpu::Instance::default();
        let surface = instance.create_surface(wgpu::SurfaceTarget::Canvas(canvas.clone()))?;
        let adapter = instance
            .request_adapter(&wgpu::RequestAdapterOptions {
                power_preference: wgpu::PowerPreference::HighPerformance,
                compatible_surface: Some(&surface),
                force_fallback_adapter: false,
            })
            .await
            .ok_or_else(|| anyhow::anyhow!("No WebGPU adapter"))?;
        let (device, queue) = adapter
            .request_device(
                &wgpu::DeviceDescriptor {
                    required_features: wgpu::Features::empty(),
                    // default limits; older WebGPU impls reject unknown fields
                    required_limits: wgpu::Limits::default(),
                    memory_hints: wgpu::MemoryHints::Performance,
                    label: Some("starfield_device"),
                },
                None,
            )
            .await
            .map_err(|e| anyhow::anyhow!("request_device error: {:?}", e))?;

        device.set_device_lost_callback(move |reason, message| {
            if matches!(reason, wgpu::DeviceLostReason::Destroyed) {
                return;
            }
            log::error!("[gpu] device lost: {:?} {}", reason, message);
            device_lost.store(true, Ordering::SeqCst);
        });
        device.on_uncaptured_error(Box::new(|e: wgpu::Error| {
            log::error!("[gpu] uncaptured error: {}", e);
        }));

        let caps = surface.get_capabilities(&adapter);
        // colors are authored as display values, so skip the sRGB encode
        let format = caps
            .formats
            .iter()
            .copied()
            .find(|f| {
                matches!(
                    f,
                    wgpu::TextureFormat::Bgra8Unorm | wgpu::TextureFormat::Rgba8Unorm
                )
            })
            .or_else(|| caps.formats.first().copied())
            .ok_or_else(|| anyhow::anyhow!("surface reports no formats"))?;
        let alpha_mode = caps
            .alpha_modes
            .first()
            .copied()
            .unwrap_or(wgpu::CompositeAlphaMode::Opaque);
        let config = wgpu::SurfaceConfiguration {
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            format,
            width: viewport.width,
            height: viewport.height,
            present_mode: wgpu::PresentMode::Fifo,
            alpha_mode,
            view_formats: vec![],
            desired_maximum_frame_latency: 2,
        };
        surface.configure(&device, &config);

        let targets = targets::RenderTargets::new(&device, TargetSizes::for_viewport(viewport));
        let sky = sky::SkyPass::new(&device, scene_config.nebula, scene.palette);
        let objects = objects::ObjectPasses::new(&device, scene);
        let post = post::PostResources::new(&device, &targets, format, &scene_config.color_enhance);
        log::info!(
            "[gpu] ready {}x{} format={:?}",
            viewport.width,
            viewport.height,
            format
        );

        Ok(Self {
            surface,
            device,
            queue,
            config,
            targets,
            sky,
            objects,
            post,
        })
    }

    /// Resize the surface and every offscreen target together.
    pub fn resize(&mut self, viewport: Viewport) {
        let sizes = TargetSizes::for_viewport(viewport);
        if sizes == self.targets.sizes {
            return;
        }
        self.config.width = sizes.surface.width;
        self.config.height = sizes.surface.height;
        self.surface.configure(&self.device, &self.config);
        self.targets.recreate(&self.device, sizes);
        self.post.rebuild_bind_groups(&self.device, &self.targets);
        log::info!("[resize] {}x{}", viewport.width, viewport.height);
    }

    pub fn reconfigure(&mut self) {
        self.surface.configure(&self.device, &self.config);
    }

    pub fn sizes(&self) -> TargetSizes {
        self.targets.sizes
    }

    pub fn render(&mut self, frame: &FrameState) -> Result<(), wgpu::SurfaceError> {
        self.sky.update(&self.queue, frame);
        self.objects.update(&self.queue, frame);
        self.post.write_film(&self.queue, &frame.film_grain);

        let output = self.surface.get_current_texture()?;
        let view = output
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());
        let mut encoder = self
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("encoder"),
            });
        {
            let mut pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("scene_pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: &self.targets.scene_msaa_view,
                    resolve_target: Some(&self.targets.scene_resolved_view),
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(wgpu::Color::BLACK),
                        store: wgpu::StoreOp::Discard,
                    },
                })],
                depth_stencil_attachment: Some(wgpu::RenderPassDepthStencilAttachment {
                    view: &self.targets.depth_view,
                    depth_ops: Some(wgpu::Operations {
                        load: wgpu::LoadOp::Clear(1.0),
                        store: wgpu::StoreOp::Discard,
                    }),
                    stencil_ops: None,
                }),
                timestamp_writes: None,
                occlusion_query_set: None,
            });
            self.sky.draw(&mut pass);
            self.objects.draw(&mut pass);
        }
        self.post.encode(&mut encoder, &self.targets, &view);
        self.queue.submit(Some(encoder.finish()));
        output.present();
        Ok(())
    }

    /// Free every GPU resource now instead of waiting for drop.
    pub fn release(self) {
        self.targets.destroy();
        self.sky.destroy();
        self.objects.destroy();
        self.post.destroy();
        self.device.destroy();
        log::info!("[teardown] gpu resources released");
    }
}
