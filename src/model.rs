// src/model.rs
//
// Asset-facing description of a renderable model. Everything here is
// produced by the asset loader and read-only for the renderer; validation
// of index ranges and op counts happens at load time, not here.

use glam::{Mat4, Vec4};

use crate::renderer::shaders::{PixelShaderKind, VertexShaderKind};

/// Hardware ceiling on simultaneously bound texture stages per pass.
pub const MAX_TEXTURE_STAGES: usize = 4;

/// Number of entries in the fixed blend-mode table.
pub const BLEND_MODE_COUNT: u8 = 7;

bitflags::bitflags! {
    /// Per-pass render flags. These are "disable" bits: a set bit turns the
    /// named feature off, which the shader receives as an inverted scalar.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct RenderFlags: u16 {
        const UNLIT = 0x01;
        const UNFOGGED = 0x02;
        const TWO_SIDED = 0x04;
    }
}

/// UV addressing declared on a texture by the asset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SamplerKind {
    WrapBoth,
    WrapU,
    WrapV,
    ClampBoth,
}

#[derive(Debug, Clone, Copy)]
pub struct TextureInfo {
    pub sampler: SamplerKind,
}

/// One drawable sub-range of the model with its own material configuration.
#[derive(Debug, Clone)]
pub struct ModelPass {
    /// Index into the fixed 7-entry blend table, 0..=6.
    pub blend_mode: u8,
    pub flags: RenderFlags,
    pub vertex_shader: VertexShaderKind,
    pub pixel_shader: PixelShaderKind,
    pub start_index: u32,
    pub index_count: u32,
    /// Active texture stages, 1..=4.
    pub op_count: u8,
    pub texture_indices: [u16; MAX_TEXTURE_STAGES],
    pub alpha_anim: u16,
    pub tex_anim: u16,
    pub color_anim: u16,
}

impl ModelPass {
    /// Stage count capped at the hardware ceiling.
    pub fn active_stages(&self) -> usize {
        (self.op_count as usize).min(MAX_TEXTURE_STAGES)
    }
}

impl Default for ModelPass {
    fn default() -> Self {
        Self {
            blend_mode: 0,
            flags: RenderFlags::empty(),
            vertex_shader: VertexShaderKind::DiffuseT1,
            pixel_shader: PixelShaderKind::CombinersMod,
            start_index: 0,
            index_count: 0,
            op_count: 1,
            texture_indices: [0; MAX_TEXTURE_STAGES],
            alpha_anim: 0,
            tex_anim: 0,
            color_anim: 0,
        }
    }
}

/// Parsed model asset. Pass order is load-bearing: transparency correctness
/// depends on drawing passes exactly as declared.
pub struct Model {
    pub passes: Vec<ModelPass>,
    pub textures: Vec<TextureInfo>,
    pub bone_count: usize,
    /// When false, opaque passes of this model are drawn by the batch
    /// renderer and must be skipped by the per-instance path.
    pub needs_per_instance_animation: bool,
}

/// One placed instance of a model, owned by the scene layer.
#[derive(Debug, Clone, Copy)]
pub struct RenderInstance {
    pub world: Mat4,
    /// Undoes the instance rotation for billboarded bones.
    pub inverse_rotation: Mat4,
    /// Highlight tint applied on top of the animated pass color.
    pub tint: Vec4,
}

impl Default for RenderInstance {
    fn default() -> Self {
        Self {
            world: Mat4::IDENTITY,
            inverse_rotation: Mat4::IDENTITY,
            tint: Vec4::ONE,
        }
    }
}
