//! wgpu implementation of [`RenderBackend`].

use super::{DrawRange, DrawUniforms, FrameUniforms, ProgramHandle, RenderBackend, RenderError};
use crate::core::{Context, Id};
use crate::geometry::{Geometry, Vertex};
use crate::material::{Blending, ProgramKey};
use crate::math::Color;
use crate::scene::{GeometryId, TextureId};
use crate::texture::Texture;
use std::collections::HashMap;
use std::num::NonZeroU64;
use wgpu::util::DeviceExt;

impl From<wgpu::SurfaceError> for RenderError {
    fn from(err: wgpu::SurfaceError) -> Self {
        match err {
            wgpu::SurfaceError::Lost => Self::SurfaceLost,
            wgpu::SurfaceError::Outdated => Self::SurfaceOutdated,
            wgpu::SurfaceError::Timeout => Self::Timeout,
            wgpu::SurfaceError::OutOfMemory => Self::OutOfMemory,
            #[allow(unreachable_patterns)]
            other => Self::Backend(other.to_string()),
        }
    }
}

struct GpuGeometry {
    vertex_buffer: wgpu::Buffer,
    index_buffer: Option<wgpu::Buffer>,
}

/// Recorded pass command, replayed at `end_frame`.
#[derive(Debug, Clone, Copy)]
enum PassCommand {
    SetPipeline(ProgramHandle),
    SetGeometry(GeometryId),
    SetTexture(Option<TextureId>),
    Draw { slot: u32, range: DrawRange },
}

/// Renders through a wgpu surface.
///
/// Binding and draw calls are queued during the frame; `end_frame` acquires
/// the surface texture, uploads the frame's uniforms in one write and
/// replays the queue into a single render pass.
pub struct WgpuBackend {
    id: Id,
    context: Context,
    pipeline_layout: wgpu::PipelineLayout,
    mesh_layout: wgpu::BindGroupLayout,
    texture_layout: wgpu::BindGroupLayout,
    sampler: wgpu::Sampler,
    frame_buffer: wgpu::Buffer,
    frame_bind_group: wgpu::BindGroup,
    mesh_buffer: wgpu::Buffer,
    mesh_bind_group: wgpu::BindGroup,
    mesh_capacity: u32,
    mesh_stride: u64,
    white_texture: wgpu::BindGroup,
    pipelines: Vec<wgpu::RenderPipeline>,
    geometries: HashMap<GeometryId, GpuGeometry>,
    textures: HashMap<TextureId, wgpu::BindGroup>,
    commands: Vec<PassCommand>,
    mesh_data: Vec<u8>,
    frame: Option<FrameUniforms>,
    clear: wgpu::Color,
}

impl WgpuBackend {
    /// Shader source shared by all program variants.
    const SHADER_SOURCE: &'static str = include_str!("shaders/standard.wgsl");

    /// Initial capacity of the per-draw uniform buffer.
    const INITIAL_DRAWS: u32 = 256;

    /// Create GPU state on top of a configured context.
    pub fn new(context: Context) -> Self {
        let device = &context.device;

        let frame_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("Frame Bind Group Layout"),
            entries: &[wgpu::BindGroupLayoutEntry {
                binding: 0,
                visibility: wgpu::ShaderStages::VERTEX | wgpu::ShaderStages::FRAGMENT,
                ty: wgpu::BindingType::Buffer {
                    ty: wgpu::BufferBindingType::Uniform,
                    has_dynamic_offset: false,
                    min_binding_size: NonZeroU64::new(std::mem::size_of::<FrameUniforms>() as u64),
                },
                count: None,
            }],
        });

        let mesh_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("Mesh Bind Group Layout"),
            entries: &[wgpu::BindGroupLayoutEntry {
                binding: 0,
                visibility: wgpu::ShaderStages::VERTEX | wgpu::ShaderStages::FRAGMENT,
                ty: wgpu::BindingType::Buffer {
                    ty: wgpu::BufferBindingType::Uniform,
                    has_dynamic_offset: true,
                    min_binding_size: NonZeroU64::new(std::mem::size_of::<DrawUniforms>() as u64),
                },
                count: None,
            }],
        });

        let texture_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("Color Map Bind Group Layout"),
            entries: &[
                wgpu::BindGroupLayoutEntry {
                    binding: 0,
                    visibility: wgpu::ShaderStages::FRAGMENT,
                    ty: wgpu::BindingType::Texture {
                        sample_type: wgpu::TextureSampleType::Float { filterable: true },
                        view_dimension: wgpu::TextureViewDimension::D2,
                        multisampled: false,
                    },
                    count: None,
                },
                wgpu::BindGroupLayoutEntry {
                    binding: 1,
                    visibility: wgpu::ShaderStages::FRAGMENT,
                    ty: wgpu::BindingType::Sampler(wgpu::SamplerBindingType::Filtering),
                    count: None,
                },
            ],
        });

        let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("Standard Pipeline Layout"),
            bind_group_layouts: &[&frame_layout, &mesh_layout, &texture_layout],
            push_constant_ranges: &[],
        });

        let frame_buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("Frame Uniform Buffer"),
            size: std::mem::size_of::<FrameUniforms>() as u64,
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });
        let frame_bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("Frame Bind Group"),
            layout: &frame_layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: frame_buffer.as_entire_binding(),
            }],
        });

        let alignment = device.limits().min_uniform_buffer_offset_alignment as u64;
        let mesh_stride = align_to(std::mem::size_of::<DrawUniforms>() as u64, alignment);
        let (mesh_buffer, mesh_bind_group) =
            create_mesh_buffer(device, &mesh_layout, mesh_stride, Self::INITIAL_DRAWS);

        let sampler = device.create_sampler(&wgpu::SamplerDescriptor {
            label: Some("Color Map Sampler"),
            address_mode_u: wgpu::AddressMode::Repeat,
            address_mode_v: wgpu::AddressMode::Repeat,
            mag_filter: wgpu::FilterMode::Linear,
            min_filter: wgpu::FilterMode::Linear,
            ..Default::default()
        });

        let white = create_texture(&context, &Texture::solid([255; 4]), "White Texture");
        let white_texture = create_texture_bind_group(device, &texture_layout, &sampler, &white);

        log::info!(
            "wgpu backend ready: {} samples, depth {:?}",
            context.sample_count,
            context.depth_format
        );

        Self {
            id: Id::new(),
            context,
            pipeline_layout,
            mesh_layout,
            texture_layout,
            sampler,
            frame_buffer,
            frame_bind_group,
            mesh_buffer,
            mesh_bind_group,
            mesh_capacity: Self::INITIAL_DRAWS,
            mesh_stride,
            white_texture,
            pipelines: Vec::new(),
            geometries: HashMap::new(),
            textures: HashMap::new(),
            commands: Vec::new(),
            mesh_data: Vec::new(),
            frame: None,
            clear: wgpu::Color::BLACK,
        }
    }

    /// The wgpu context.
    #[inline]
    pub fn context(&self) -> &Context {
        &self.context
    }

    /// Mutable wgpu context.
    #[inline]
    pub fn context_mut(&mut self) -> &mut Context {
        &mut self.context
    }

    /// Reconfigure the surface after it was lost or outdated.
    pub fn reconfigure(&mut self) {
        self.context.reconfigure();
    }

    fn ensure_mesh_capacity(&mut self, draws: u32) {
        if draws <= self.mesh_capacity {
            return;
        }
        let capacity = draws.next_power_of_two();
        log::debug!("Growing mesh uniform buffer to {} draws", capacity);
        let (buffer, bind_group) =
            create_mesh_buffer(&self.context.device, &self.mesh_layout, self.mesh_stride, capacity);
        self.mesh_buffer = buffer;
        self.mesh_bind_group = bind_group;
        self.mesh_capacity = capacity;
    }
}

impl RenderBackend for WgpuBackend {
    fn begin_frame(&mut self, clear: Color) -> Result<(), RenderError> {
        self.commands.clear();
        self.mesh_data.clear();
        self.frame = None;
        self.clear = clear.into();
        Ok(())
    }

    fn upload_geometry(&mut self, id: GeometryId, geometry: &Geometry) -> Result<(), RenderError> {
        let device = &self.context.device;
        let vertices = geometry.interleave();
        let (vertex_label, index_label) = geometry_buffer_labels(id);
        let vertex_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some(&vertex_label),
            contents: bytemuck::cast_slice(&vertices),
            usage: wgpu::BufferUsages::VERTEX,
        });
        let index_buffer = geometry.indices().map(|indices| {
            device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
                label: Some(&index_label),
                contents: bytemuck::cast_slice(indices),
                usage: wgpu::BufferUsages::INDEX,
            })
        });
        self.geometries.insert(
            id,
            GpuGeometry {
                vertex_buffer,
                index_buffer,
            },
        );
        Ok(())
    }

    fn upload_texture(&mut self, id: TextureId, texture: &Texture) -> Result<(), RenderError> {
        let label = texture.label().unwrap_or("Color Map");
        let gpu = create_texture(&self.context, texture, label);
        let bind_group =
            create_texture_bind_group(&self.context.device, &self.texture_layout, &self.sampler, &gpu);
        self.textures.insert(id, bind_group);
        Ok(())
    }

    fn compile_program(&mut self, key: &ProgramKey) -> Result<ProgramHandle, RenderError> {
        let device = &self.context.device;
        let label = format!("{} #{}", key.label(), self.id);
        let source = format!("{}{}", key.shader_defines(), Self::SHADER_SOURCE);
        let shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some(&label),
            source: wgpu::ShaderSource::Wgsl(source.into()),
        });

        let blend = match key.blending {
            Blending::Opaque => wgpu::BlendState::REPLACE,
            Blending::Alpha => wgpu::BlendState::ALPHA_BLENDING,
        };
        let pipeline = device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some(&label),
            layout: Some(&self.pipeline_layout),
            vertex: wgpu::VertexState {
                module: &shader,
                entry_point: Some("vs_main"),
                buffers: &[Vertex::layout()],
                compilation_options: Default::default(),
            },
            fragment: Some(wgpu::FragmentState {
                module: &shader,
                entry_point: Some("fs_main"),
                targets: &[Some(wgpu::ColorTargetState {
                    format: self.context.surface_format(),
                    blend: Some(blend),
                    write_mask: wgpu::ColorWrites::ALL,
                })],
                compilation_options: Default::default(),
            }),
            primitive: wgpu::PrimitiveState {
                topology: wgpu::PrimitiveTopology::TriangleList,
                strip_index_format: None,
                front_face: wgpu::FrontFace::Ccw,
                cull_mode: if key.double_sided {
                    None
                } else {
                    Some(wgpu::Face::Back)
                },
                unclipped_depth: false,
                polygon_mode: wgpu::PolygonMode::Fill,
                conservative: false,
            },
            depth_stencil: self.context.depth_format.map(|format| wgpu::DepthStencilState {
                format,
                depth_write_enabled: key.depth_write,
                depth_compare: wgpu::CompareFunction::LessEqual,
                stencil: wgpu::StencilState::default(),
                bias: wgpu::DepthBiasState::default(),
            }),
            multisample: wgpu::MultisampleState {
                count: self.context.sample_count,
                mask: !0,
                alpha_to_coverage_enabled: false,
            },
            multiview: None,
            cache: None,
        });

        let handle = ProgramHandle(self.pipelines.len() as u32);
        self.pipelines.push(pipeline);
        Ok(handle)
    }

    fn bind_program(&mut self, program: ProgramHandle) {
        self.commands.push(PassCommand::SetPipeline(program));
    }

    fn bind_geometry(&mut self, geometry: GeometryId) {
        self.commands.push(PassCommand::SetGeometry(geometry));
    }

    fn bind_texture(&mut self, texture: Option<TextureId>) {
        self.commands.push(PassCommand::SetTexture(texture));
    }

    fn set_frame_uniforms(&mut self, uniforms: &FrameUniforms) {
        self.frame = Some(*uniforms);
    }

    fn draw(&mut self, uniforms: &DrawUniforms, range: DrawRange) {
        let slot = (self.mesh_data.len() as u64 / self.mesh_stride) as u32;
        let start = self.mesh_data.len();
        self.mesh_data.resize(start + self.mesh_stride as usize, 0);
        let bytes = bytemuck::bytes_of(uniforms);
        self.mesh_data[start..start + bytes.len()].copy_from_slice(bytes);
        self.commands.push(PassCommand::Draw { slot, range });
    }

    fn end_frame(&mut self) -> Result<(), RenderError> {
        let output = self.context.get_current_texture()?;
        let view = output
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());

        let draws = (self.mesh_data.len() as u64 / self.mesh_stride) as u32;
        self.ensure_mesh_capacity(draws);
        if let Some(frame) = &self.frame {
            self.context
                .queue
                .write_buffer(&self.frame_buffer, 0, bytemuck::bytes_of(frame));
        }
        if !self.mesh_data.is_empty() {
            self.context.queue.write_buffer(&self.mesh_buffer, 0, &self.mesh_data);
        }

        let mut encoder = self.context.create_command_encoder();
        {
            let (target, resolve_target) = match self.context.msaa_view() {
                Some(msaa) => (msaa, Some(&view)),
                None => (&view, None),
            };
            let depth_attachment =
                self.context
                    .depth_view()
                    .map(|depth_view| wgpu::RenderPassDepthStencilAttachment {
                        view: depth_view,
                        depth_ops: Some(wgpu::Operations {
                            load: wgpu::LoadOp::Clear(1.0),
                            store: wgpu::StoreOp::Store,
                        }),
                        stencil_ops: None,
                    });

            let mut pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("Main Render Pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: target,
                    resolve_target,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(self.clear),
                        store: wgpu::StoreOp::Store,
                    },
                })],
                depth_stencil_attachment: depth_attachment,
                timestamp_writes: None,
                occlusion_query_set: None,
            });
            pass.set_bind_group(0, &self.frame_bind_group, &[]);

            let mut pipeline_bound = false;
            let mut geometry_bound = false;
            for command in &self.commands {
                match *command {
                    PassCommand::SetPipeline(handle) => {
                        match self.pipelines.get(handle.0 as usize) {
                            Some(pipeline) => {
                                pass.set_pipeline(pipeline);
                                pipeline_bound = true;
                            }
                            None => pipeline_bound = false,
                        }
                    }
                    PassCommand::SetGeometry(id) => match self.geometries.get(&id) {
                        Some(gpu) => {
                            pass.set_vertex_buffer(0, gpu.vertex_buffer.slice(..));
                            if let Some(index_buffer) = &gpu.index_buffer {
                                pass.set_index_buffer(index_buffer.slice(..), wgpu::IndexFormat::Uint32);
                            }
                            geometry_bound = true;
                        }
                        None => geometry_bound = false,
                    },
                    PassCommand::SetTexture(id) => {
                        let bind_group = id
                            .and_then(|id| self.textures.get(&id))
                            .unwrap_or(&self.white_texture);
                        pass.set_bind_group(2, bind_group, &[]);
                    }
                    PassCommand::Draw { slot, range } => {
                        if !(pipeline_bound && geometry_bound) {
                            continue;
                        }
                        let offset = (slot as u64 * self.mesh_stride) as u32;
                        pass.set_bind_group(1, &self.mesh_bind_group, &[offset]);
                        if range.indexed {
                            pass.draw_indexed(0..range.count, 0, 0..1);
                        } else {
                            pass.draw(0..range.count, 0..1);
                        }
                    }
                }
            }
        }

        self.context.queue.submit(std::iter::once(encoder.finish()));
        output.present();
        Ok(())
    }

    fn resize(&mut self, width: u32, height: u32) {
        self.context.resize(width, height);
    }
}

/// Vertex and index buffer labels naming the scene geometry.
fn geometry_buffer_labels(id: GeometryId) -> (String, String) {
    (
        format!("Geometry {:?} Vertex Buffer", id),
        format!("Geometry {:?} Index Buffer", id),
    )
}

fn align_to(size: u64, alignment: u64) -> u64 {
    size.div_ceil(alignment) * alignment
}

fn create_mesh_buffer(
    device: &wgpu::Device,
    layout: &wgpu::BindGroupLayout,
    stride: u64,
    draws: u32,
) -> (wgpu::Buffer, wgpu::BindGroup) {
    let buffer = device.create_buffer(&wgpu::BufferDescriptor {
        label: Some("Mesh Uniform Buffer"),
        size: stride * draws as u64,
        usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
        mapped_at_creation: false,
    });
    let bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
        label: Some("Mesh Bind Group"),
        layout,
        entries: &[wgpu::BindGroupEntry {
            binding: 0,
            resource: wgpu::BindingResource::Buffer(wgpu::BufferBinding {
                buffer: &buffer,
                offset: 0,
                size: NonZeroU64::new(std::mem::size_of::<DrawUniforms>() as u64),
            }),
        }],
    });
    (buffer, bind_group)
}

fn create_texture(context: &Context, texture: &Texture, label: &str) -> wgpu::Texture {
    context.device.create_texture_with_data(
        &context.queue,
        &wgpu::TextureDescriptor {
            label: Some(label),
            size: wgpu::Extent3d {
                width: texture.width(),
                height: texture.height(),
                depth_or_array_layers: 1,
            },
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: wgpu::TextureFormat::Rgba8UnormSrgb,
            usage: wgpu::TextureUsages::TEXTURE_BINDING | wgpu::TextureUsages::COPY_DST,
            view_formats: &[],
        },
        wgpu::util::TextureDataOrder::LayerMajor,
        texture.data(),
    )
}

fn create_texture_bind_group(
    device: &wgpu::Device,
    layout: &wgpu::BindGroupLayout,
    sampler: &wgpu::Sampler,
    texture: &wgpu::Texture,
) -> wgpu::BindGroup {
    let view = texture.create_view(&wgpu::TextureViewDescriptor::default());
    device.create_bind_group(&wgpu::BindGroupDescriptor {
        label: Some("Color Map Bind Group"),
        layout,
        entries: &[
            wgpu::BindGroupEntry {
                binding: 0,
                resource: wgpu::BindingResource::TextureView(&view),
            },
            wgpu::BindGroupEntry {
                binding: 1,
                resource: wgpu::BindingResource::Sampler(sampler),
            },
        ],
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::light::MAX_LIGHTS;

    #[test]
    fn test_shader_matches_uniform_layout() {
        let source = WgpuBackend::SHADER_SOURCE;
        assert!(source.contains(&format!("array<Light, {}>", MAX_LIGHTS)));
        assert!(source.contains("fn vs_main"));
        assert!(source.contains("fn fs_main"));
        assert!(!source.contains("const SHADING_MODEL"));
    }

    #[test]
    fn test_align_to() {
        assert_eq!(align_to(192, 256), 256);
        assert_eq!(align_to(256, 256), 256);
        assert_eq!(align_to(300, 256), 512);
    }

    #[test]
    fn test_buffer_labels_name_geometry() {
        let mut ids: slotmap::SlotMap<GeometryId, ()> = slotmap::SlotMap::with_key();
        let a = ids.insert(());
        let b = ids.insert(());
        let (vertex, index) = geometry_buffer_labels(a);
        assert!(vertex.contains(&format!("{:?}", a)));
        assert!(index.contains(&format!("{:?}", a)));
        assert_ne!(vertex, index);
        assert_ne!(geometry_buffer_labels(b).0, vertex);
    }

    #[test]
    fn test_surface_errors_map() {
        assert!(matches!(RenderError::from(wgpu::SurfaceError::Lost), RenderError::SurfaceLost));
        assert!(matches!(RenderError::from(wgpu::SurfaceError::Timeout), RenderError::Timeout));
    }
}
