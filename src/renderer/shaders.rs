// renderer/shaders.rs
//
// Shader-variant lookup: each vertex/pixel variant is an entry point in one
// WGSL module, selected by value from the pass descriptor. Two passes with
// the same kind pair always resolve to the identical compiled variant.

use crate::renderer::GraphicsContext;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum VertexShaderKind {
    /// Both stages sample the first UV set.
    DiffuseT1,
    /// Stage 0 samples the first UV set, stage 1 the second.
    DiffuseT2,
    /// Stage 0 uses sphere-mapped environment coordinates.
    DiffuseEnv,
}

impl VertexShaderKind {
    pub const ALL: [Self; 3] = [Self::DiffuseT1, Self::DiffuseT2, Self::DiffuseEnv];

    pub fn entry_point(self) -> &'static str {
        match self {
            Self::DiffuseT1 => "vs_diffuse_t1",
            Self::DiffuseT2 => "vs_diffuse_t2",
            Self::DiffuseEnv => "vs_diffuse_env",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PixelShaderKind {
    CombinersMod,
    CombinersOpaque,
    CombinersModMod,
    CombinersOpaqueMod,
}

impl PixelShaderKind {
    pub const ALL: [Self; 4] = [
        Self::CombinersMod,
        Self::CombinersOpaque,
        Self::CombinersModMod,
        Self::CombinersOpaqueMod,
    ];

    pub fn entry_point(self) -> &'static str {
        match self {
            Self::CombinersMod => "fs_combiners_mod",
            Self::CombinersOpaque => "fs_combiners_opaque",
            Self::CombinersModMod => "fs_combiners_mod_mod",
            Self::CombinersOpaqueMod => "fs_combiners_opaque_mod",
        }
    }
}

/// Compiled shader module shared by every pipeline variant.
pub struct ShaderVariants {
    module: wgpu::ShaderModule,
}

impl ShaderVariants {
    pub fn new(gx: &GraphicsContext) -> Self {
        let module = gx
            .device
            .create_shader_module(wgpu::ShaderModuleDescriptor {
                label: Some("ModelShader"),
                source: wgpu::ShaderSource::Wgsl(include_str!("../shader/model.wgsl").into()),
            });
        Self { module }
    }

    pub fn module(&self) -> &wgpu::ShaderModule {
        &self.module
    }
}
