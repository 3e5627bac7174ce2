use super::helpers;
use starfield_core::geometry::{self, Vertex};
use starfield_core::nebula::{NebulaParams, NebulaUniforms};
use starfield_core::scene::NebulaPalette;
use starfield_core::FrameState;
use wgpu;

const DOME_SEGMENTS: u32 = 96;

pub(crate) const VERTEX_LAYOUT: wgpu::VertexBufferLayout<'static> = wgpu::VertexBufferLayout {
    array_stride: std::mem::size_of::<Vertex>() as u64,
    step_mode: wgpu::VertexStepMode::Vertex,
    attributes: &wgpu::vertex_attr_array![0 => Float32x3],
};

/// Nebula dome, drawn first with depth writes off.
pub(crate) struct SkyPass {
    pipeline: wgpu::RenderPipeline,
    uniform_buffer: wgpu::Buffer,
    bind_group: wgpu::BindGroup,
    vertex_buffer: wgpu::Buffer,
    index_buffer: wgpu::Buffer,
    index_count: u32,
    params: NebulaParams,
    palette: NebulaPalette,
}

impl SkyPass {
    pub(crate) fn new(device: &wgpu::Device, params: NebulaParams, palette: NebulaPalette) -> Self {
        let shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("nebula_shader"),
            source: wgpu::ShaderSource::Wgsl(starfield_core::NEBULA_WGSL.into()),
        });
        let initial = NebulaUniforms::new(
            &params,
            &palette,
            0.0,
            glam::Mat4::IDENTITY,
            glam::Vec3::ZERO,
        );
        let uniform_buffer = helpers::create_uniform_buffer(device, "nebula_uniforms", &initial);
        let bgl = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("nebula_bgl"),
            entries: &[helpers::uniform_layout_entry(
                0,
                wgpu::ShaderStages::VERTEX | wgpu::ShaderStages::FRAGMENT,
            )],
        });
        let bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("nebula_bg"),
            layout: &bgl,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: uniform_buffer.as_entire_binding(),
            }],
        });
        let layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("nebula_pl"),
            bind_group_layouts: &[&bgl],
            push_constant_ranges: &[],
        });
        let pipeline = device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some("nebula_pipeline"),
            layout: Some(&layout),
            vertex: wgpu::VertexState {
                module: &shader,
                entry_point: Some("vs_dome"),
                buffers: &[VERTEX_LAYOUT],
                compilation_options: wgpu::PipelineCompilationOptions::default(),
            },
            // viewed from inside
            primitive: wgpu::PrimitiveState {
                cull_mode: None,
                ..Default::default()
            },
            depth_stencil: helpers::scene_depth(false, wgpu::CompareFunction::Always),
            multisample: helpers::scene_multisample(),
            fragment: Some(wgpu::FragmentState {
                module: &shader,
                entry_point: Some("fs_nebula"),
                targets: &[Some(wgpu::ColorTargetState {
                    format: helpers::HDR_FORMAT,
                    blend: None,
                    write_mask: wgpu::ColorWrites::ALL,
                })],
                compilation_options: wgpu::PipelineCompilationOptions::default(),
            }),
            cache: None,
            multiview: None,
        });

        let mesh = geometry::uv_sphere(DOME_SEGMENTS, DOME_SEGMENTS);
        let vertex_buffer = helpers::create_vertex_buffer(device, "dome_vertices", &mesh.vertices);
        let index_buffer = helpers::create_index_buffer(device, "dome_indices", &mesh.indices);
        Self {
            pipeline,
            uniform_buffer,
            bind_group,
            vertex_buffer,
            index_buffer,
            index_count: mesh.index_count(),
            params,
            palette,
        }
    }

    pub(crate) fn update(&self, queue: &wgpu::Queue, frame: &FrameState) {
        let uniforms = NebulaUniforms::new(
            &self.params,
            &self.palette,
            frame.nebula_time,
            frame.view_proj,
            frame.eye,
        );
        queue.write_buffer(&self.uniform_buffer, 0, bytemuck::bytes_of(&uniforms));
    }

    pub(crate) fn draw(&self, pass: &mut wgpu::RenderPass<'_>) {
        pass.set_pipeline(&self.pipeline);
        pass.set_bind_group(0, &self.bind_group, &[]);
        pass.set_vertex_buffer(0, self.vertex_buffer.slice(..));
        pass.set_index_buffer(self.index_buffer.slice(..), wgpu::IndexFormat::Uint32);
        pass.draw_indexed(0..self.index_count, 0, 0..1);
    }

    pub(crate) fn destroy(&self) {
        self.uniform_buffer.destroy();
        self.vertex_buffer.destroy();
        self.index_buffer.destroy();
    }
}
