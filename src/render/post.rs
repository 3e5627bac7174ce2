use super::helpers;
use super::targets::RenderTargets;
use starfield_core::glitch::FilmGrainUniforms;
use starfield_core::post::ColorEnhance;
use wgpu;

/// Color enhancement and film grain passes.
///
/// Both read one texture through the same layout (texture, sampler, uniform
/// block), so a single bind group layout serves the two pipelines.
pub(crate) struct PostResources {
    bgl: wgpu::BindGroupLayout,
    sampler: wgpu::Sampler,
    enhance_buffer: wgpu::Buffer,
    film_buffer: wgpu::Buffer,
    enhance_pipeline: wgpu::RenderPipeline,
    film_pipeline: wgpu::RenderPipeline,
    bg_enhance: wgpu::BindGroup,
    bg_film: wgpu::BindGroup,
}

impl PostResources {
    pub(crate) fn new(
        device: &wgpu::Device,
        targets: &RenderTargets,
        swap_format: wgpu::TextureFormat,
        enhance: &ColorEnhance,
    ) -> Self {
        let bgl = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("post_bgl"),
            entries: &[
                wgpu::BindGroupLayoutEntry {
                    binding: 0,
                    visibility: wgpu::ShaderStages::FRAGMENT,
                    ty: wgpu::BindingType::Texture {
                        multisampled: false,
                        view_dimension: wgpu::TextureViewDimension::D2,
                        sample_type: wgpu::TextureSampleType::Float { filterable: true },
                    },
                    count: None,
                },
                wgpu::BindGroupLayoutEntry {
                    binding: 1,
                    visibility: wgpu::ShaderStages::FRAGMENT,
                    ty: wgpu::BindingType::Sampler(wgpu::SamplerBindingType::Filtering),
                    count: None,
                },
                helpers::uniform_layout_entry(2, wgpu::ShaderStages::FRAGMENT),
            ],
        });
        let sampler = helpers::linear_sampler(device);
        let enhance_buffer =
            helpers::create_uniform_buffer(device, "enhance_uniforms", &enhance.uniforms());
        let film_buffer = helpers::create_uniform_buffer(
            device,
            "film_uniforms",
            &FilmGrainUniforms::default(),
        );
        let layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("pl_post"),
            bind_group_layouts: &[&bgl],
            push_constant_ranges: &[],
        });
        let enhance_shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("color_enhance_shader"),
            source: wgpu::ShaderSource::Wgsl(starfield_core::COLOR_ENHANCE_WGSL.into()),
        });
        let film_shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("film_grain_shader"),
            source: wgpu::ShaderSource::Wgsl(starfield_core::FILM_GRAIN_WGSL.into()),
        });
        let enhance_pipeline = helpers::make_post_pipeline(
            device,
            "enhance_pipeline",
            &layout,
            &enhance_shader,
            "fs_enhance",
            helpers::HDR_FORMAT,
        );
        let film_pipeline = helpers::make_post_pipeline(
            device,
            "film_pipeline",
            &layout,
            &film_shader,
            "fs_film",
            swap_format,
        );
        let (bg_enhance, bg_film) =
            make_bind_groups(device, &bgl, &sampler, targets, &enhance_buffer, &film_buffer);
        Self {
            bgl,
            sampler,
            enhance_buffer,
            film_buffer,
            enhance_pipeline,
            film_pipeline,
            bg_enhance,
            bg_film,
        }
    }

    /// Bind groups reference target views, so they follow every resize.
    pub(crate) fn rebuild_bind_groups(&mut self, device: &wgpu::Device, targets: &RenderTargets) {
        (self.bg_enhance, self.bg_film) = make_bind_groups(
            device,
            &self.bgl,
            &self.sampler,
            targets,
            &self.enhance_buffer,
            &self.film_buffer,
        );
    }

    pub(crate) fn write_film(&self, queue: &wgpu::Queue, uniforms: &FilmGrainUniforms) {
        queue.write_buffer(&self.film_buffer, 0, bytemuck::bytes_of(uniforms));
    }

    pub(crate) fn encode(
        &self,
        encoder: &mut wgpu::CommandEncoder,
        targets: &RenderTargets,
        swap_view: &wgpu::TextureView,
    ) {
        blit(
            encoder,
            "enhance_pass",
            &targets.enhanced_view,
            &self.enhance_pipeline,
            &self.bg_enhance,
        );
        blit(encoder, "film_pass", swap_view, &self.film_pipeline, &self.bg_film);
    }

    pub(crate) fn destroy(&self) {
        self.enhance_buffer.destroy();
        self.film_buffer.destroy();
    }
}

fn make_bind_groups(
    device: &wgpu::Device,
    bgl: &wgpu::BindGroupLayout,
    sampler: &wgpu::Sampler,
    targets: &RenderTargets,
    enhance_buffer: &wgpu::Buffer,
    film_buffer: &wgpu::Buffer,
) -> (wgpu::BindGroup, wgpu::BindGroup) {
    let make = |label: &str, view: &wgpu::TextureView, buffer: &wgpu::Buffer| {
        device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some(label),
            layout: bgl,
            entries: &[
                wgpu::BindGroupEntry {
                    binding: 0,
                    resource: wgpu::BindingResource::TextureView(view),
                },
                wgpu::BindGroupEntry {
                    binding: 1,
                    resource: wgpu::BindingResource::Sampler(sampler),
                },
                wgpu::BindGroupEntry {
                    binding: 2,
                    resource: buffer.as_entire_binding(),
                },
            ],
        })
    };
    (
        make("bg_enhance", &targets.scene_resolved_view, enhance_buffer),
        make("bg_film", &targets.enhanced_view, film_buffer),
    )
}

fn blit(
    encoder: &mut wgpu::CommandEncoder,
    label: &str,
    target: &wgpu::TextureView,
    pipeline: &wgpu::RenderPipeline,
    bind_group: &wgpu::BindGroup,
) {
    let mut r = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
        label: Some(label),
        color_attachments: &[Some(wgpu::RenderPassColorAttachment {
            view: target,
            resolve_target: None,
            ops: wgpu::Operations {
                load: wgpu::LoadOp::Clear(wgpu::Color::BLACK),
                store: wgpu::StoreOp::Store,
            },
        })],
        depth_stencil_attachment: None,
        timestamp_writes: None,
        occlusion_query_set: None,
    });
    r.set_pipeline(pipeline);
    r.set_bind_group(0, bind_group, &[]);
    r.draw(0..3, 0..1);
}
