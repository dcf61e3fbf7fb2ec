//! Properties of the pure pass resolution: depth-write law, flag inversion,
//! idempotence, and the two resolution scenarios from the pass contract.

mod common;

use common::ScriptedAnimator;
use m2view::renderer::resolve::{pass_uniform, resolve};
use m2view::renderer::states::BLEND_TABLE;
use m2view::{ModelPass, RenderFlags, SamplerKind, TextureInfo};

fn two_textures() -> Vec<TextureInfo> {
    vec![
        TextureInfo {
            sampler: SamplerKind::WrapBoth,
        },
        TextureInfo {
            sampler: SamplerKind::ClampBoth,
        },
    ]
}

#[test]
fn depth_write_enabled_exactly_for_opaque_blend_modes() {
    let textures = two_textures();
    for blend_mode in 0..=6u8 {
        let pass = ModelPass {
            blend_mode,
            ..ModelPass::default()
        };
        let resolved = resolve(&pass, &textures);
        assert_eq!(
            resolved.depth_write,
            blend_mode <= 1,
            "blend mode {blend_mode}"
        );
        assert_eq!(resolved.blend_mode, blend_mode);
    }
}

#[test]
fn flag_scalars_invert_the_disable_bits() {
    let textures = two_textures();
    for bits in 0..=0b111u16 {
        let pass = ModelPass {
            flags: RenderFlags::from_bits_truncate(bits),
            ..ModelPass::default()
        };
        let resolved = resolve(&pass, &textures);
        let bit0 = f32::from(bits & 0b001);
        let bit1 = f32::from((bits & 0b010) >> 1);
        assert_eq!(resolved.unlit + bit0, 1.0);
        assert_eq!(resolved.unfogged + bit1, 1.0);
        assert_eq!(resolved.two_sided, bits & 0b100 != 0);
    }
}

#[test]
fn resolution_is_idempotent() {
    let textures = two_textures();
    let pass = ModelPass {
        blend_mode: 4,
        flags: RenderFlags::UNLIT | RenderFlags::TWO_SIDED,
        op_count: 2,
        texture_indices: [1, 0, 0, 0],
        alpha_anim: 3,
        tex_anim: 5,
        color_anim: 2,
        ..ModelPass::default()
    };
    let first = resolve(&pass, &textures);
    let second = resolve(&pass, &textures);
    assert_eq!(first, second);
    assert_eq!(first.pipeline_key(), second.pipeline_key());
}

#[test]
fn shader_variant_resolves_by_value() {
    let textures = two_textures();
    let a = ModelPass::default();
    let b = ModelPass {
        start_index: 300,
        index_count: 42,
        ..ModelPass::default()
    };
    // Same kind pair on two different passes: identical variant and key.
    assert_eq!(
        resolve(&a, &textures).pipeline_key(),
        resolve(&b, &textures).pipeline_key()
    );
}

#[test]
fn standard_alpha_blend_pass_resolves_to_table_entry_two() {
    // Scenario: blendMode=2, renderFlags=0, opCount=1.
    let pass = ModelPass {
        blend_mode: 2,
        op_count: 1,
        ..ModelPass::default()
    };
    let resolved = resolve(&pass, &two_textures());

    assert!(!resolved.depth_write);
    assert_eq!(resolved.unlit, 1.0);
    assert_eq!(resolved.unfogged, 1.0);
    assert_eq!(resolved.alpha_key, 0.0);

    let blend = BLEND_TABLE[resolved.blend_mode as usize].expect("mode 2 blends");
    assert_eq!(blend.color.src_factor, wgpu::BlendFactor::SrcAlpha);
    assert_eq!(blend.color.dst_factor, wgpu::BlendFactor::OneMinusSrcAlpha);
}

#[test]
fn alpha_keyed_unlit_two_sided_pass_queries_two_stages() {
    // Scenario: blendMode=1, renderFlags=0b101, opCount=2.
    let pass = ModelPass {
        blend_mode: 1,
        flags: RenderFlags::from_bits_truncate(0b101),
        op_count: 2,
        texture_indices: [0, 1, 0, 0],
        alpha_anim: 10,
        tex_anim: 20,
        ..ModelPass::default()
    };
    let resolved = resolve(&pass, &two_textures());

    assert!(resolved.depth_write);
    assert!(resolved.two_sided);
    assert_eq!(resolved.unlit, 0.0);
    assert_eq!(resolved.unfogged, 1.0);
    assert_eq!(resolved.alpha_key, 1.0);

    let animator = ScriptedAnimator::static_pose();
    let uniform = pass_uniform(&pass, &resolved, &animator);

    // One query per active stage, none past op_count.
    assert_eq!(*animator.alpha_queries.borrow(), vec![10, 11]);
    assert_eq!(*animator.uv_queries.borrow(), vec![20, 21]);

    // Unused stages padded with identity and full alpha.
    let identity = glam::Mat4::IDENTITY.to_cols_array_2d();
    assert_ne!(uniform.uv_anim[1], identity);
    assert_eq!(uniform.uv_anim[2], identity);
    assert_eq!(uniform.uv_anim[3], identity);
    assert_eq!(uniform.transparency[2], 1.0);
    assert_eq!(uniform.transparency[3], 1.0);
    assert_eq!(uniform.params, [0.0, 1.0, 1.0, 0.0]);
}
