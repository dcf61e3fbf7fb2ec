// renderer/resolve.rs
//
// Stateless resolution from a pass descriptor to concrete pipeline state
// and shader parameters. Nothing here touches the GPU; the frame renderer
// binds whatever this module decides.

use crate::anim::Animator;
use crate::model::{Model, ModelPass, RenderFlags, SamplerKind, TextureInfo, MAX_TEXTURE_STAGES};
use crate::renderer::shaders::{PixelShaderKind, VertexShaderKind};
use crate::renderer::states::{depth_write_for_blend, PipelineKey};
use crate::renderer::uniforms::PerPassUniform;

/// Concrete pipeline configuration for one pass.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ResolvedPass {
    pub blend_mode: u8,
    pub depth_write: bool,
    pub two_sided: bool,
    /// Lighting enable scalar: 1.0 lit, 0.0 unlit.
    pub unlit: f32,
    /// Fog enable scalar: 1.0 fogged, 0.0 unfogged.
    pub unfogged: f32,
    /// 1.0 only for the alpha-keyed opaque mode.
    pub alpha_key: f32,
    pub vertex: VertexShaderKind,
    pub pixel: PixelShaderKind,
    /// Sampler choice per texture stage; `None` past the pass's op count.
    pub samplers: [Option<SamplerKind>; MAX_TEXTURE_STAGES],
}

impl ResolvedPass {
    pub fn pipeline_key(&self) -> PipelineKey {
        PipelineKey {
            blend_mode: self.blend_mode,
            two_sided: self.two_sided,
            vertex: self.vertex,
            pixel: self.pixel,
        }
    }
}

/// Pure resolution; calling twice with the same inputs yields the same
/// tuple. Out-of-range blend modes or texture indices are asset-layer
/// contract violations and are not defended here.
pub fn resolve(pass: &ModelPass, textures: &[TextureInfo]) -> ResolvedPass {
    debug_assert!(pass.blend_mode <= 6, "blend mode out of table range");
    debug_assert!((1..=4).contains(&pass.op_count), "op count out of range");

    let mut samplers = [None; MAX_TEXTURE_STAGES];
    for (stage, slot) in samplers.iter_mut().enumerate().take(pass.active_stages()) {
        *slot = Some(textures[pass.texture_indices[stage] as usize].sampler);
    }

    ResolvedPass {
        blend_mode: pass.blend_mode,
        depth_write: depth_write_for_blend(pass.blend_mode),
        two_sided: pass.flags.contains(RenderFlags::TWO_SIDED),
        unlit: if pass.flags.contains(RenderFlags::UNLIT) { 0.0 } else { 1.0 },
        unfogged: if pass.flags.contains(RenderFlags::UNFOGGED) { 0.0 } else { 1.0 },
        alpha_key: if pass.blend_mode == 1 { 1.0 } else { 0.0 },
        vertex: pass.vertex_shader,
        pixel: pass.pixel_shader,
        samplers,
    }
}

/// True for the opaque blend modes the batch renderer submits in bulk.
pub fn batch_covered(pass: &ModelPass) -> bool {
    pass.blend_mode <= 1
}

/// A batch-covered pass is skipped here unless the model animates per
/// instance; drawing it again would double-render. Blended passes never go
/// through the batch path and are always eligible.
pub fn eligible(pass: &ModelPass, needs_per_instance_animation: bool) -> bool {
    needs_per_instance_animation || !batch_covered(pass)
}

/// The passes the per-instance path will draw, in declared order.
pub fn drawn_passes(model: &Model) -> impl Iterator<Item = (usize, &ModelPass)> {
    let needs = model.needs_per_instance_animation;
    model
        .passes
        .iter()
        .enumerate()
        .filter(move |(_, pass)| eligible(pass, needs))
}

/// Gathers the animated inputs for one pass: one UV matrix and one alpha
/// query per active stage, identity / 1.0 padding past op_count, and the
/// pass tint.
pub fn pass_uniform(
    pass: &ModelPass,
    resolved: &ResolvedPass,
    animator: &dyn Animator,
) -> PerPassUniform {
    let mut uniform = PerPassUniform {
        params: [resolved.unlit, resolved.unfogged, resolved.alpha_key, 0.0],
        anim_color: animator.color_value(pass.color_anim).to_array(),
        ..PerPassUniform::default()
    };

    for stage in 0..pass.active_stages() {
        uniform.uv_anim[stage] = animator
            .uv_anim_matrix(pass.tex_anim + stage as u16)
            .to_cols_array_2d();
        uniform.transparency[stage] = animator.alpha_value(pass.alpha_anim + stage as u16);
    }

    uniform
}

#[cfg(test)]
mod tests {
    use super::*;

    fn textures() -> Vec<TextureInfo> {
        vec![
            TextureInfo { sampler: SamplerKind::WrapBoth },
            TextureInfo { sampler: SamplerKind::ClampBoth },
        ]
    }

    #[test]
    fn sampler_follows_texture_declaration() {
        let pass = ModelPass {
            op_count: 2,
            texture_indices: [1, 0, 0, 0],
            ..ModelPass::default()
        };
        let resolved = resolve(&pass, &textures());
        assert_eq!(resolved.samplers[0], Some(SamplerKind::ClampBoth));
        assert_eq!(resolved.samplers[1], Some(SamplerKind::WrapBoth));
        assert_eq!(resolved.samplers[2], None);
        assert_eq!(resolved.samplers[3], None);
    }

    #[test]
    fn blended_passes_are_always_eligible() {
        for blend_mode in 2..=6u8 {
            let pass = ModelPass { blend_mode, ..ModelPass::default() };
            assert!(eligible(&pass, false));
            assert!(eligible(&pass, true));
        }
    }
}
