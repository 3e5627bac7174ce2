use super::helpers::{self, ADDITIVE};
use super::sky::VERTEX_LAYOUT;
use starfield_core::geometry;
use starfield_core::scene::{BillboardInstance, MeshInstance, SceneObjects};
use starfield_core::FrameState;
use wgpu;

/// Upper bound on simultaneously drawn shooting stars; extras are skipped.
const MAX_SHOOTING_STARS: usize = 64;
const PLANET_SEGMENTS: u32 = 48;

#[repr(C)]
#[derive(Copy, Clone, bytemuck::Pod, bytemuck::Zeroable)]
pub(crate) struct CameraUniforms {
    view_proj: [[f32; 4]; 4],
    eye: [f32; 4],
    right: [f32; 4],
    up: [f32; 4],
    follow: [f32; 4],
}

impl CameraUniforms {
    fn from_frame(frame: &FrameState) -> Self {
        Self {
            view_proj: frame.view_proj.to_cols_array_2d(),
            eye: frame.eye.extend(1.0).to_array(),
            right: frame.camera_right.extend(0.0).to_array(),
            up: frame.camera_up.extend(0.0).to_array(),
            // dust box stays centred on the camera
            follow: frame.eye.extend(0.0).to_array(),
        }
    }
}

const MESH_INSTANCE_LAYOUT: wgpu::VertexBufferLayout<'static> = wgpu::VertexBufferLayout {
    array_stride: std::mem::size_of::<MeshInstance>() as u64,
    step_mode: wgpu::VertexStepMode::Instance,
    attributes: &wgpu::vertex_attr_array![
        1 => Float32x4,
        2 => Float32x4,
        3 => Float32x4,
        4 => Float32x4,
        5 => Float32x4,
        6 => Float32x4,
    ],
};

const BILLBOARD_LAYOUT: wgpu::VertexBufferLayout<'static> = wgpu::VertexBufferLayout {
    array_stride: std::mem::size_of::<BillboardInstance>() as u64,
    step_mode: wgpu::VertexStepMode::Instance,
    attributes: &wgpu::vertex_attr_array![0 => Float32x3, 1 => Float32, 2 => Float32x4],
};

struct MeshBuffers {
    vertices: wgpu::Buffer,
    indices: wgpu::Buffer,
    index_count: u32,
}

impl MeshBuffers {
    fn new(device: &wgpu::Device, label: &str, mesh: &geometry::Mesh) -> Self {
        Self {
            vertices: helpers::create_vertex_buffer(device, label, &mesh.vertices),
            indices: helpers::create_index_buffer(device, label, &mesh.indices),
            index_count: mesh.index_count(),
        }
    }

    fn destroy(&self) {
        self.vertices.destroy();
        self.indices.destroy();
    }
}

struct InstanceBuffer {
    buffer: wgpu::Buffer,
    count: u32,
}

impl InstanceBuffer {
    fn new<T: bytemuck::Pod>(device: &wgpu::Device, label: &str, data: &[T]) -> Option<Self> {
        if data.is_empty() {
            return None;
        }
        Some(Self {
            buffer: helpers::create_vertex_buffer(device, label, data),
            count: data.len() as u32,
        })
    }
}

/// Every scene object except the dome: planets, rings, stars, dust and
/// shooting stars.
pub(crate) struct ObjectPasses {
    camera_buffer: wgpu::Buffer,
    camera_bg: wgpu::BindGroup,
    sphere: MeshBuffers,
    quad: MeshBuffers,
    planets: Option<InstanceBuffer>,
    rings: Option<InstanceBuffer>,
    point_stars: Option<InstanceBuffer>,
    glow_stars: Option<InstanceBuffer>,
    dust: Option<InstanceBuffer>,
    shooting: wgpu::Buffer,
    shooting_count: u32,
    planet_pipeline: wgpu::RenderPipeline,
    ring_pipeline: wgpu::RenderPipeline,
    point_pipeline: wgpu::RenderPipeline,
    dust_pipeline: wgpu::RenderPipeline,
    glow_pipeline: wgpu::RenderPipeline,
    shooting_pipeline: wgpu::RenderPipeline,
}

struct PipelineSpec<'a> {
    label: &'a str,
    vs: &'a str,
    fs: &'a str,
    mesh: bool,
    blend: Option<wgpu::BlendState>,
    depth_write: bool,
}

impl ObjectPasses {
    pub(crate) fn new(device: &wgpu::Device, scene: &SceneObjects) -> Self {
        let shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("objects_shader"),
            source: wgpu::ShaderSource::Wgsl(starfield_core::OBJECTS_WGSL.into()),
        });
        let camera_buffer = helpers::create_uniform_buffer(
            device,
            "camera_uniforms",
            &CameraUniforms {
                view_proj: glam::Mat4::IDENTITY.to_cols_array_2d(),
                eye: [0.0; 4],
                right: [1.0, 0.0, 0.0, 0.0],
                up: [0.0, 1.0, 0.0, 0.0],
                follow: [0.0; 4],
            },
        );
        let bgl = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("camera_bgl"),
            entries: &[helpers::uniform_layout_entry(0, wgpu::ShaderStages::VERTEX)],
        });
        let camera_bg = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("camera_bg"),
            layout: &bgl,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: camera_buffer.as_entire_binding(),
            }],
        });
        let layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("objects_pl"),
            bind_group_layouts: &[&bgl],
            push_constant_ranges: &[],
        });

        let make = |spec: PipelineSpec| {
            let mesh_buffers = [VERTEX_LAYOUT, MESH_INSTANCE_LAYOUT];
            let billboard_buffers = [BILLBOARD_LAYOUT];
            let buffers: &[wgpu::VertexBufferLayout] = if spec.mesh {
                &mesh_buffers
            } else {
                &billboard_buffers
            };
            device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
                label: Some(spec.label),
                layout: Some(&layout),
                vertex: wgpu::VertexState {
                    module: &shader,
                    entry_point: Some(spec.vs),
                    buffers,
                    compilation_options: wgpu::PipelineCompilationOptions::default(),
                },
                // rings are seen from both sides; billboards always face the camera
                primitive: wgpu::PrimitiveState::default(),
                depth_stencil: helpers::scene_depth(spec.depth_write, wgpu::CompareFunction::Less),
                multisample: helpers::scene_multisample(),
                fragment: Some(wgpu::FragmentState {
                    module: &shader,
                    entry_point: Some(spec.fs),
                    targets: &[Some(wgpu::ColorTargetState {
                        format: helpers::HDR_FORMAT,
                        blend: spec.blend,
                        write_mask: wgpu::ColorWrites::ALL,
                    })],
                    compilation_options: wgpu::PipelineCompilationOptions::default(),
                }),
                cache: None,
                multiview: None,
            })
        };

        let planet_pipeline = make(PipelineSpec {
            label: "planet_pipeline",
            vs: "vs_mesh",
            fs: "fs_planet",
            mesh: true,
            blend: None,
            depth_write: true,
        });
        let ring_pipeline = make(PipelineSpec {
            label: "ring_pipeline",
            vs: "vs_mesh",
            fs: "fs_ring",
            mesh: true,
            blend: Some(wgpu::BlendState::ALPHA_BLENDING),
            depth_write: false,
        });
        let point_pipeline = make(PipelineSpec {
            label: "point_star_pipeline",
            vs: "vs_billboard",
            fs: "fs_point",
            mesh: false,
            blend: None,
            depth_write: true,
        });
        let dust_pipeline = make(PipelineSpec {
            label: "dust_pipeline",
            vs: "vs_billboard_follow",
            fs: "fs_point",
            mesh: false,
            blend: Some(wgpu::BlendState::ALPHA_BLENDING),
            depth_write: false,
        });
        let glow_pipeline = make(PipelineSpec {
            label: "glow_star_pipeline",
            vs: "vs_billboard",
            fs: "fs_glow",
            mesh: false,
            blend: Some(ADDITIVE),
            depth_write: false,
        });
        let shooting_pipeline = make(PipelineSpec {
            label: "shooting_star_pipeline",
            vs: "vs_billboard",
            fs: "fs_point",
            mesh: false,
            blend: Some(ADDITIVE),
            depth_write: false,
        });

        let shooting = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("shooting_instances"),
            size: (MAX_SHOOTING_STARS * std::mem::size_of::<BillboardInstance>()) as u64,
            usage: wgpu::BufferUsages::VERTEX | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });

        Self {
            camera_buffer,
            camera_bg,
            sphere: MeshBuffers::new(
                device,
                "sphere",
                &geometry::uv_sphere(PLANET_SEGMENTS, PLANET_SEGMENTS),
            ),
            quad: MeshBuffers::new(device, "ring_quad", &geometry::unit_quad()),
            planets: InstanceBuffer::new(device, "planet_instances", &scene.planets),
            rings: InstanceBuffer::new(device, "ring_instances", &scene.rings),
            point_stars: InstanceBuffer::new(device, "point_star_instances", &scene.point_stars),
            glow_stars: InstanceBuffer::new(device, "glow_star_instances", &scene.glow_stars),
            dust: InstanceBuffer::new(device, "dust_instances", &scene.dust),
            shooting,
            shooting_count: 0,
            planet_pipeline,
            ring_pipeline,
            point_pipeline,
            dust_pipeline,
            glow_pipeline,
            shooting_pipeline,
        }
    }

    pub(crate) fn update(&mut self, queue: &wgpu::Queue, frame: &FrameState) {
        let camera = CameraUniforms::from_frame(frame);
        queue.write_buffer(&self.camera_buffer, 0, bytemuck::bytes_of(&camera));
        let n = frame.shooting_stars.len().min(MAX_SHOOTING_STARS);
        if n > 0 {
            queue.write_buffer(
                &self.shooting,
                0,
                bytemuck::cast_slice(&frame.shooting_stars[..n]),
            );
        }
        self.shooting_count = n as u32;
    }

    /// Opaque meshes first, then depth-tested translucent layers.
    pub(crate) fn draw(&self, pass: &mut wgpu::RenderPass<'_>) {
        pass.set_bind_group(0, &self.camera_bg, &[]);

        if let Some(planets) = &self.planets {
            draw_mesh(pass, &self.planet_pipeline, &self.sphere, planets);
        }
        if let Some(stars) = &self.point_stars {
            draw_billboards(pass, &self.point_pipeline, &stars.buffer, stars.count);
        }
        if let Some(rings) = &self.rings {
            draw_mesh(pass, &self.ring_pipeline, &self.quad, rings);
        }
        if let Some(dust) = &self.dust {
            draw_billboards(pass, &self.dust_pipeline, &dust.buffer, dust.count);
        }
        if let Some(stars) = &self.glow_stars {
            draw_billboards(pass, &self.glow_pipeline, &stars.buffer, stars.count);
        }
        if self.shooting_count > 0 {
            draw_billboards(
                pass,
                &self.shooting_pipeline,
                &self.shooting,
                self.shooting_count,
            );
        }
    }

    pub(crate) fn destroy(&self) {
        self.camera_buffer.destroy();
        self.sphere.destroy();
        self.quad.destroy();
        for instances in [
            &self.planets,
            &self.rings,
            &self.point_stars,
            &self.glow_stars,
            &self.dust,
        ]
        .into_iter()
        .flatten()
        {
            instances.buffer.destroy();
        }
        self.shooting.destroy();
    }
}

fn draw_mesh(
    pass: &mut wgpu::RenderPass<'_>,
    pipeline: &wgpu::RenderPipeline,
    mesh: &MeshBuffers,
    instances: &InstanceBuffer,
) {
    pass.set_pipeline(pipeline);
    pass.set_vertex_buffer(0, mesh.vertices.slice(..));
    pass.set_vertex_buffer(1, instances.buffer.slice(..));
    pass.set_index_buffer(mesh.indices.slice(..), wgpu::IndexFormat::Uint32);
    pass.draw_indexed(0..mesh.index_count, 0, 0..instances.count);
}

fn draw_billboards(
    pass: &mut wgpu::RenderPass<'_>,
    pipeline: &wgpu::RenderPipeline,
    buffer: &wgpu::Buffer,
    count: u32,
) {
    pass.set_pipeline(pipeline);
    pass.set_vertex_buffer(0, buffer.slice(..));
    pass.draw(0..6, 0..count);
}
