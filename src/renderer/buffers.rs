// renderer/buffers.rs
//
// GPU-visible buffers consumed by the model shaders. Per-draw and per-pass
// data live in dynamic-offset uniform rings: every instance and every drawn
// pass gets its own slot for the frame, so a later pass can never observe an
// earlier pass's values and writes always land before the draw that reads
// them.

use std::mem;
use std::num::NonZeroU64;

use bytemuck::bytes_of;
use glam::Mat4;
use wgpu::util::DeviceExt;

use crate::renderer::uniforms::{CameraUniform, PerDrawUniform, PerPassUniform};
use crate::renderer::{GraphicsContext, ModelVertex, SharedStateRegistry};

const INITIAL_DRAW_SLOTS: u32 = 64;
const INITIAL_PASS_SLOTS: u32 = 256;

struct UniformRing {
    buffer: wgpu::Buffer,
    stride: u32,
    capacity: u32,
    cursor: u32,
    label: &'static str,
}

impl UniformRing {
    fn new(device: &wgpu::Device, label: &'static str, item_size: u32, alignment: u32, capacity: u32) -> Self {
        let stride = item_size.next_multiple_of(alignment.max(1));
        let buffer = Self::create_buffer(device, label, stride, capacity);
        Self {
            buffer,
            stride,
            capacity,
            cursor: 0,
            label,
        }
    }

    fn create_buffer(device: &wgpu::Device, label: &str, stride: u32, capacity: u32) -> wgpu::Buffer {
        device.create_buffer(&wgpu::BufferDescriptor {
            label: Some(label),
            size: stride as u64 * capacity as u64,
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        })
    }

    fn reset(&mut self) {
        self.cursor = 0;
    }

    /// Writes one slot, returns its dynamic offset and whether the backing
    /// buffer was replaced (draws already recorded keep the old buffer
    /// alive through their bind group).
    fn push(&mut self, gx: &GraphicsContext, bytes: &[u8]) -> (u32, bool) {
        let grew = if self.cursor == self.capacity {
            self.grow(gx);
            true
        } else {
            false
        };

        let offset = self.cursor * self.stride;
        gx.queue.write_buffer(&self.buffer, offset as u64, bytes);
        self.cursor += 1;
        (offset, grew)
    }

    fn grow(&mut self, gx: &GraphicsContext) {
        let new_capacity = self.capacity * 2;
        log::debug!(
            "Growing {}: {} -> {} slots",
            self.label,
            self.capacity,
            new_capacity
        );
        self.buffer = Self::create_buffer(&gx.device, self.label, self.stride, new_capacity);
        self.capacity = new_capacity;
    }
}

/// The per-draw-call and per-pass uniform rings plus their shared bind
/// group (two dynamic-offset bindings).
pub struct ConstantBufferSet {
    per_draw: UniformRing,
    per_pass: UniformRing,
    bind_group: wgpu::BindGroup,
}

impl ConstantBufferSet {
    pub fn new(gx: &GraphicsContext, registry: &SharedStateRegistry) -> Self {
        let alignment = gx.uniform_alignment();
        let per_draw = UniformRing::new(
            &gx.device,
            "PerDrawRing",
            mem::size_of::<PerDrawUniform>() as u32,
            alignment,
            INITIAL_DRAW_SLOTS,
        );
        let per_pass = UniformRing::new(
            &gx.device,
            "PerPassRing",
            mem::size_of::<PerPassUniform>() as u32,
            alignment,
            INITIAL_PASS_SLOTS,
        );
        let bind_group = Self::create_bind_group(gx, registry, &per_draw, &per_pass);
        Self {
            per_draw,
            per_pass,
            bind_group,
        }
    }

    fn create_bind_group(
        gx: &GraphicsContext,
        registry: &SharedStateRegistry,
        per_draw: &UniformRing,
        per_pass: &UniformRing,
    ) -> wgpu::BindGroup {
        gx.device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("DrawPassBindGroup"),
            layout: &registry.draw_pass_layout,
            entries: &[
                wgpu::BindGroupEntry {
                    binding: 0,
                    resource: wgpu::BindingResource::Buffer(wgpu::BufferBinding {
                        buffer: &per_draw.buffer,
                        offset: 0,
                        size: NonZeroU64::new(mem::size_of::<PerDrawUniform>() as u64),
                    }),
                },
                wgpu::BindGroupEntry {
                    binding: 1,
                    resource: wgpu::BindingResource::Buffer(wgpu::BufferBinding {
                        buffer: &per_pass.buffer,
                        offset: 0,
                        size: NonZeroU64::new(mem::size_of::<PerPassUniform>() as u64),
                    }),
                },
            ],
        })
    }

    /// Rewinds both rings. Called once per frame batch, from `begin_draw`.
    pub fn begin_frame(&mut self) {
        self.per_draw.reset();
        self.per_pass.reset();
    }

    pub fn push_draw(
        &mut self,
        gx: &GraphicsContext,
        registry: &SharedStateRegistry,
        uniform: &PerDrawUniform,
    ) -> u32 {
        let (offset, grew) = self.per_draw.push(gx, bytes_of(uniform));
        if grew {
            self.bind_group = Self::create_bind_group(gx, registry, &self.per_draw, &self.per_pass);
        }
        offset
    }

    pub fn push_pass(
        &mut self,
        gx: &GraphicsContext,
        registry: &SharedStateRegistry,
        uniform: &PerPassUniform,
    ) -> u32 {
        let (offset, grew) = self.per_pass.push(gx, bytes_of(uniform));
        if grew {
            self.bind_group = Self::create_bind_group(gx, registry, &self.per_draw, &self.per_pass);
        }
        offset
    }

    pub fn bind_group(&self) -> &wgpu::BindGroup {
        &self.bind_group
    }
}

/// Bone matrix storage for one animation source, uploaded only when the
/// animator reports a change.
pub struct BoneBuffer {
    buffer: wgpu::Buffer,
    bind_group: wgpu::BindGroup,
    scratch: Vec<[[f32; 4]; 4]>,
}

impl BoneBuffer {
    pub fn new(gx: &GraphicsContext, registry: &SharedStateRegistry, bone_count: usize) -> Self {
        // A boneless model still binds one identity matrix so the layout
        // stays uniform across shader variants.
        let count = bone_count.max(1);
        let identity: Vec<[[f32; 4]; 4]> = vec![Mat4::IDENTITY.to_cols_array_2d(); count];
        let buffer = gx
            .device
            .create_buffer_init(&wgpu::util::BufferInitDescriptor {
                label: Some("BoneBuffer"),
                contents: bytemuck::cast_slice(&identity),
                usage: wgpu::BufferUsages::STORAGE | wgpu::BufferUsages::COPY_DST,
            });
        let bind_group = gx.device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("BonesBindGroup"),
            layout: &registry.bones_layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: buffer.as_entire_binding(),
            }],
        });
        Self {
            buffer,
            bind_group,
            scratch: identity,
        }
    }

    pub fn upload(&mut self, gx: &GraphicsContext, matrices: &[Mat4]) {
        debug_assert!(matrices.len() <= self.scratch.len());
        self.scratch.clear();
        self.scratch
            .extend(matrices.iter().map(Mat4::to_cols_array_2d));
        gx.queue
            .write_buffer(&self.buffer, 0, bytemuck::cast_slice(&self.scratch));
    }

    pub fn bind_group(&self) -> &wgpu::BindGroup {
        &self.bind_group
    }

    pub(crate) fn into_buffer(self) -> wgpu::Buffer {
        self.buffer
    }
}

/// Camera uniform bound at group 0 for the whole frame batch.
pub struct CameraBuffer {
    buffer: wgpu::Buffer,
    bind_group: wgpu::BindGroup,
}

impl CameraBuffer {
    pub fn new(gx: &GraphicsContext, registry: &SharedStateRegistry) -> Self {
        let buffer = gx
            .device
            .create_buffer_init(&wgpu::util::BufferInitDescriptor {
                label: Some("CameraBuffer"),
                contents: bytes_of(&CameraUniform::new()),
                usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            });
        let bind_group = gx.device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("CameraBindGroup"),
            layout: &registry.camera_layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: buffer.as_entire_binding(),
            }],
        });
        Self { buffer, bind_group }
    }

    pub fn update(&self, gx: &GraphicsContext, uniform: &CameraUniform) {
        gx.queue.write_buffer(&self.buffer, 0, bytes_of(uniform));
    }

    pub fn bind_group(&self) -> &wgpu::BindGroup {
        &self.bind_group
    }
}

/// Geometry and textures shared by every instance of one model: the single
/// vertex/index buffer pair all passes index into, the batch path's bone
/// buffer, and the loaded texture views.
pub struct ModelGpu {
    pub(crate) vertex_buffer: wgpu::Buffer,
    pub(crate) index_buffer: wgpu::Buffer,
    pub(crate) shared_bones: BoneBuffer,
    pub(crate) textures: Vec<wgpu::TextureView>,
}

impl ModelGpu {
    pub fn new(
        gx: &GraphicsContext,
        registry: &SharedStateRegistry,
        vertices: &[ModelVertex],
        indices: &[u16],
        bone_count: usize,
        textures: Vec<wgpu::TextureView>,
    ) -> Self {
        let vertex_buffer = gx
            .device
            .create_buffer_init(&wgpu::util::BufferInitDescriptor {
                label: Some("ModelVertexBuffer"),
                contents: bytemuck::cast_slice(vertices),
                usage: wgpu::BufferUsages::VERTEX,
            });
        let index_buffer = gx
            .device
            .create_buffer_init(&wgpu::util::BufferInitDescriptor {
                label: Some("ModelIndexBuffer"),
                contents: bytemuck::cast_slice(indices),
                usage: wgpu::BufferUsages::INDEX,
            });
        Self {
            vertex_buffer,
            index_buffer,
            shared_bones: BoneBuffer::new(gx, registry, bone_count),
            textures,
        }
    }

    pub fn shared_bones_mut(&mut self) -> &mut BoneBuffer {
        &mut self.shared_bones
    }
}
