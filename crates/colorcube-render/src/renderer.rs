use colorcube_core::grid::VoxelGrid;
use glam::Vec3;
use wgpu::util::DeviceExt;

use crate::instance::{
    partition_instances, sort_back_to_front, unit_cube_vertices, CubeVertex, VoxelInstance,
};

const DEPTH_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Depth32Float;

const CLEAR_COLOR: wgpu::Color = wgpu::Color {
    r: 0.0,
    g: 0.0,
    b: 0.0,
    a: 1.0,
};

/// GPU-uploadable camera uniforms. Must match CameraUniforms in voxel.wgsl.
#[repr(C)]
#[derive(Clone, Copy, bytemuck::Pod, bytemuck::Zeroable)]
pub struct CameraUniforms {
    pub view_proj: [[f32; 4]; 4],
}

/// Instance storage for the grid currently on screen.
struct GridBuffers {
    instance_buffer: wgpu::Buffer,
    opaque_count: u32,
    /// CPU copy, re-sorted back-to-front whenever the eye moves.
    transparent: Vec<VoxelInstance>,
}

/// Owns all GPU resources for drawing the voxel grid.
pub struct Renderer {
    opaque_pipeline: wgpu::RenderPipeline,
    transparent_pipeline: wgpu::RenderPipeline,
    camera_uniform_buffer: wgpu::Buffer,
    camera_bind_group: wgpu::BindGroup,
    cube_vertex_buffer: wgpu::Buffer,
    cube_vertex_count: u32,
    depth_texture: wgpu::Texture,
    depth_view: wgpu::TextureView,
    grid: Option<GridBuffers>,
    last_eye: Option<Vec3>,
}

impl Renderer {
    pub fn new(
        device: &wgpu::Device,
        surface_format: wgpu::TextureFormat,
        width: u32,
        height: u32,
    ) -> Self {
        let voxel_wgsl = include_str!("../../../shaders/voxel.wgsl");
        let module = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("voxel-shader"),
            source: wgpu::ShaderSource::Wgsl(voxel_wgsl.into()),
        });

        let camera_uniform_buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("camera-uniforms"),
            size: std::mem::size_of::<CameraUniforms>() as u64,
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });

        let camera_bgl = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("camera-bgl"),
            entries: &[wgpu::BindGroupLayoutEntry {
                binding: 0,
                visibility: wgpu::ShaderStages::VERTEX,
                ty: wgpu::BindingType::Buffer {
                    ty: wgpu::BufferBindingType::Uniform,
                    has_dynamic_offset: false,
                    min_binding_size: None,
                },
                count: None,
            }],
        });

        let camera_bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("camera-bg"),
            layout: &camera_bgl,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: camera_uniform_buffer.as_entire_binding(),
            }],
        });

        let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("voxel-pipeline-layout"),
            bind_group_layouts: &[&camera_bgl],
            push_constant_ranges: &[],
        });

        let opaque_pipeline =
            Self::create_pipeline(device, &pipeline_layout, &module, surface_format, false);
        let transparent_pipeline =
            Self::create_pipeline(device, &pipeline_layout, &module, surface_format, true);

        let cube = unit_cube_vertices();
        let cube_vertex_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("cube-vertices"),
            contents: bytemuck::cast_slice(&cube),
            usage: wgpu::BufferUsages::VERTEX,
        });

        let (depth_texture, depth_view) = Self::create_depth_texture(device, width, height);

        Self {
            opaque_pipeline,
            transparent_pipeline,
            camera_uniform_buffer,
            camera_bind_group,
            cube_vertex_buffer,
            cube_vertex_count: cube.len() as u32,
            depth_texture,
            depth_view,
            grid: None,
            last_eye: None,
        }
    }

    /// Recreate the depth target on canvas resize.
    pub fn resize(&mut self, device: &wgpu::Device, width: u32, height: u32) {
        self.depth_texture.destroy();
        let (texture, view) = Self::create_depth_texture(device, width, height);
        self.depth_texture = texture;
        self.depth_view = view;
    }

    /// Replace the instance data with `grid`. The previous buffer is destroyed first.
    pub fn upload_grid(&mut self, device: &wgpu::Device, grid: &VoxelGrid) {
        self.release_grid();

        let (opaque, transparent) = partition_instances(grid);
        let mut all = opaque;
        let opaque_count = all.len() as u32;
        all.extend_from_slice(&transparent);
        if all.is_empty() {
            return;
        }

        let instance_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("voxel-instances"),
            contents: bytemuck::cast_slice(&all),
            usage: wgpu::BufferUsages::VERTEX | wgpu::BufferUsages::COPY_DST,
        });

        log::debug!(
            "uploaded {} voxel instances ({} transparent)",
            all.len(),
            transparent.len()
        );

        self.grid = Some(GridBuffers {
            instance_buffer,
            opaque_count,
            transparent,
        });
        // Force a re-sort on the next camera update.
        self.last_eye = None;
    }

    /// Destroy the grid's GPU buffer, if any.
    pub fn release_grid(&mut self) {
        if let Some(old) = self.grid.take() {
            old.instance_buffer.destroy();
        }
    }

    /// Upload the camera matrix and re-sort transparent voxels if the eye moved.
    pub fn update_camera(&mut self, queue: &wgpu::Queue, view_proj: [[f32; 4]; 4], eye: Vec3) {
        queue.write_buffer(
            &self.camera_uniform_buffer,
            0,
            bytemuck::bytes_of(&CameraUniforms { view_proj }),
        );

        if self.last_eye == Some(eye) {
            return;
        }
        self.last_eye = Some(eye);

        let Some(grid) = self.grid.as_mut() else {
            return;
        };
        if grid.transparent.is_empty() {
            return;
        }
        sort_back_to_front(&mut grid.transparent, eye);
        let offset = grid.opaque_count as u64 * std::mem::size_of::<VoxelInstance>() as u64;
        queue.write_buffer(
            &grid.instance_buffer,
            offset,
            bytemuck::cast_slice(&grid.transparent),
        );
    }

    /// Clear the frame and draw opaque voxels, then transparent voxels.
    pub fn render(&self, encoder: &mut wgpu::CommandEncoder, surface_view: &wgpu::TextureView) {
        let mut pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
            label: Some("voxel-pass"),
            color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                view: surface_view,
                resolve_target: None,
                ops: wgpu::Operations {
                    load: wgpu::LoadOp::Clear(CLEAR_COLOR),
                    store: wgpu::StoreOp::Store,
                },
            })],
            depth_stencil_attachment: Some(wgpu::RenderPassDepthStencilAttachment {
                view: &self.depth_view,
                depth_ops: Some(wgpu::Operations {
                    load: wgpu::LoadOp::Clear(1.0),
                    store: wgpu::StoreOp::Store,
                }),
                stencil_ops: None,
            }),
            timestamp_writes: None,
            occlusion_query_set: None,
        });

        let Some(grid) = self.grid.as_ref() else {
            return;
        };
        let total = grid.opaque_count + grid.transparent.len() as u32;

        pass.set_bind_group(0, &self.camera_bind_group, &[]);
        pass.set_vertex_buffer(0, self.cube_vertex_buffer.slice(..));
        pass.set_vertex_buffer(1, grid.instance_buffer.slice(..));

        if grid.opaque_count > 0 {
            pass.set_pipeline(&self.opaque_pipeline);
            pass.draw(0..self.cube_vertex_count, 0..grid.opaque_count);
        }
        if total > grid.opaque_count {
            pass.set_pipeline(&self.transparent_pipeline);
            pass.draw(0..self.cube_vertex_count, grid.opaque_count..total);
        }
    }

    /// Number of instances currently uploaded.
    pub fn instance_count(&self) -> usize {
        self.grid
            .as_ref()
            .map_or(0, |g| g.opaque_count as usize + g.transparent.len())
    }

    // -- Private helpers --

    fn create_pipeline(
        device: &wgpu::Device,
        layout: &wgpu::PipelineLayout,
        module: &wgpu::ShaderModule,
        surface_format: wgpu::TextureFormat,
        transparent: bool,
    ) -> wgpu::RenderPipeline {
        let label = if transparent {
            "voxel-transparent-pipeline"
        } else {
            "voxel-opaque-pipeline"
        };

        device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some(label),
            layout: Some(layout),
            vertex: wgpu::VertexState {
                module,
                entry_point: Some("vs_main"),
                buffers: &[
                    wgpu::VertexBufferLayout {
                        array_stride: std::mem::size_of::<CubeVertex>() as u64,
                        step_mode: wgpu::VertexStepMode::Vertex,
                        attributes: &[wgpu::VertexAttribute {
                            format: wgpu::VertexFormat::Float32x3,
                            offset: 0,
                            shader_location: 0,
                        }],
                    },
                    wgpu::VertexBufferLayout {
                        array_stride: std::mem::size_of::<VoxelInstance>() as u64,
                        step_mode: wgpu::VertexStepMode::Instance,
                        attributes: &[
                            wgpu::VertexAttribute {
                                format: wgpu::VertexFormat::Float32x3,
                                offset: 0,
                                shader_location: 1,
                            },
                            wgpu::VertexAttribute {
                                format: wgpu::VertexFormat::Float32,
                                offset: 12,
                                shader_location: 2,
                            },
                            wgpu::VertexAttribute {
                                format: wgpu::VertexFormat::Float32x4,
                                offset: 16,
                                shader_location: 3,
                            },
                        ],
                    },
                ],
                compilation_options: Default::default(),
            },
            primitive: wgpu::PrimitiveState {
                topology: wgpu::PrimitiveTopology::TriangleList,
                front_face: wgpu::FrontFace::Ccw,
                cull_mode: Some(wgpu::Face::Back),
                ..Default::default()
            },
            depth_stencil: Some(wgpu::DepthStencilState {
                format: DEPTH_FORMAT,
                // Transparent voxels test against depth but never occlude each other.
                depth_write_enabled: !transparent,
                depth_compare: wgpu::CompareFunction::Less,
                stencil: wgpu::StencilState::default(),
                bias: wgpu::DepthBiasState::default(),
            }),
            multisample: wgpu::MultisampleState::default(),
            fragment: Some(wgpu::FragmentState {
                module,
                entry_point: Some("fs_main"),
                targets: &[Some(wgpu::ColorTargetState {
                    format: surface_format,
                    blend: if transparent {
                        Some(wgpu::BlendState::ALPHA_BLENDING)
                    } else {
                        None
                    },
                    write_mask: wgpu::ColorWrites::ALL,
                })],
                compilation_options: Default::default(),
            }),
            multiview: None,
            cache: None,
        })
    }

    fn create_depth_texture(
        device: &wgpu::Device,
        width: u32,
        height: u32,
    ) -> (wgpu::Texture, wgpu::TextureView) {
        let texture = device.create_texture(&wgpu::TextureDescriptor {
            label: Some("depth-texture"),
            size: wgpu::Extent3d {
                width: width.max(1),
                height: height.max(1),
                depth_or_array_layers: 1,
            },
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: DEPTH_FORMAT,
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            view_formats: &[],
        });
        let view = texture.create_view(&wgpu::TextureViewDescriptor::default());
        (texture, view)
    }
}
