// renderer/single.rs
//
// Per-instance draw path: one animated model instance per call, one draw
// per eligible pass. Pipeline state comes from the shared registry, per-pass
// parameters from the resolver, and every bind it performs leaks into the
// shared GPU binding state; callers must not expect state to be restored.

use std::sync::Arc;

use glam::Vec3;

use crate::anim::{Animator, BillboardParams, BoneTracker};
use crate::model::{Model, RenderInstance};
use crate::renderer::buffers::{BoneBuffer, CameraBuffer, ConstantBufferSet, ModelGpu};
use crate::renderer::resolve::{self, ResolvedPass};
use crate::renderer::retire::RetireQueue;
use crate::renderer::uniforms::PerDrawUniform;
use crate::renderer::{GraphicsContext, SharedStateRegistry};

/// Camera orientation for the frame, consumed by billboarding animators.
#[derive(Debug, Clone, Copy)]
pub struct CameraVectors {
    pub forward: Vec3,
    pub right: Vec3,
    pub up: Vec3,
}

/// Everything a frame's draw calls share.
pub struct FrameContext<'a> {
    pub gx: &'a GraphicsContext,
    pub registry: &'a SharedStateRegistry,
    pub camera: CameraVectors,
}

/// Renders one model's instances through the per-instance path. Owns the
/// instance-local animation state; geometry and textures come from the
/// model-level [`ModelGpu`].
pub struct SingleModelRenderer {
    model: Arc<Model>,
    /// Owned animator for models that animate per instance; otherwise the
    /// caller's shared animator is used each frame.
    animator: Option<Box<dyn Animator>>,
    bones: BoneTracker,
    bone_buffer: Option<BoneBuffer>,
    pass_textures: Vec<wgpu::BindGroup>,
}

impl SingleModelRenderer {
    pub fn new(model: Arc<Model>, animator: Option<Box<dyn Animator>>) -> Self {
        debug_assert!(
            !model.needs_per_instance_animation || animator.is_some(),
            "per-instance animated model without an owned animator"
        );
        let bones = BoneTracker::new(model.bone_count);
        Self {
            model,
            animator,
            bones,
            bone_buffer: None,
            pass_textures: Vec::new(),
        }
    }

    pub fn model(&self) -> &Model {
        &self.model
    }

    /// Allocates the per-instance GPU state. Must run on the render thread
    /// before the first `on_frame` for this instance.
    pub fn on_sync_load(
        &mut self,
        gx: &GraphicsContext,
        registry: &SharedStateRegistry,
        shared: &ModelGpu,
    ) {
        if let Some(animator) = self.animator.as_deref_mut() {
            animator.reset();
            let mut buffer = BoneBuffer::new(gx, registry, self.model.bone_count);
            buffer.upload(gx, self.bones.matrices());
            self.bone_buffer = Some(buffer);
        }

        self.pass_textures = self
            .model
            .passes
            .iter()
            .map(|pass| {
                let resolved = resolve::resolve(pass, &self.model.textures);
                Self::create_pass_texture_bind(gx, registry, shared, pass, &resolved)
            })
            .collect();
    }

    /// Texture views and resolved samplers for one pass, fallback-padded
    /// past the pass's op count.
    fn create_pass_texture_bind(
        gx: &GraphicsContext,
        registry: &SharedStateRegistry,
        shared: &ModelGpu,
        pass: &crate::model::ModelPass,
        resolved: &ResolvedPass,
    ) -> wgpu::BindGroup {
        let views: Vec<&wgpu::TextureView> = (0..4usize)
            .map(|stage| {
                if stage < pass.active_stages() {
                    &shared.textures[pass.texture_indices[stage] as usize]
                } else {
                    registry.fallback_view()
                }
            })
            .collect();

        let entries: Vec<wgpu::BindGroupEntry> = views
            .iter()
            .enumerate()
            .map(|(stage, view)| wgpu::BindGroupEntry {
                binding: stage as u32,
                resource: wgpu::BindingResource::TextureView(view),
            })
            .chain(resolved.samplers.iter().enumerate().map(|(stage, kind)| {
                let sampler = registry.sampler(kind.unwrap_or(crate::model::SamplerKind::WrapBoth));
                wgpu::BindGroupEntry {
                    binding: 4 + stage as u32,
                    resource: wgpu::BindingResource::Sampler(sampler),
                }
            }))
            .collect();

        gx.device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("PassTextureBindGroup"),
            layout: &registry.texture_layout,
            entries: &entries,
        })
    }

    /// Once per frame batch, before the first instance: rewinds the uniform
    /// rings and binds the frame-constant groups (camera, default textures).
    pub fn begin_draw(
        rpass: &mut wgpu::RenderPass<'_>,
        registry: &SharedStateRegistry,
        buffers: &mut ConstantBufferSet,
        camera: &CameraBuffer,
    ) {
        buffers.begin_frame();
        rpass.set_bind_group(0, camera.bind_group(), &[]);
        rpass.set_bind_group(2, buffers.bind_group(), &[0, 0]);
        rpass.set_bind_group(3, registry.default_texture_bind(), &[]);
    }

    /// Draws one instance: animation refresh, buffer uploads, then one draw
    /// per eligible pass in declared order.
    #[allow(clippy::too_many_arguments)]
    pub fn on_frame(
        &mut self,
        frame: &FrameContext<'_>,
        buffers: &mut ConstantBufferSet,
        shared: &ModelGpu,
        shared_animator: &mut dyn Animator,
        instance: &RenderInstance,
        rpass: &mut wgpu::RenderPass<'_>,
    ) {
        let Self {
            model,
            animator,
            bones,
            bone_buffer,
            pass_textures,
        } = self;

        // If we have our own animator, use that. Otherwise use the shared one.
        let animator: &mut dyn Animator = match animator.as_deref_mut() {
            Some(owned) => {
                owned.update(&BillboardParams {
                    forward: frame.camera.forward,
                    right: frame.camera.right,
                    up: frame.camera.up,
                    inverse_rotation: instance.inverse_rotation,
                });
                if bones.refresh(owned) {
                    if let Some(buffer) = bone_buffer.as_mut() {
                        buffer.upload(frame.gx, bones.matrices());
                    }
                }
                owned
            }
            None => shared_animator,
        };

        // All models draw through the one shared geometry slot, so the
        // buffers are swapped per instance.
        rpass.set_vertex_buffer(0, shared.vertex_buffer.slice(..));
        rpass.set_index_buffer(shared.index_buffer.slice(..), wgpu::IndexFormat::Uint16);

        let draw_offset = buffers.push_draw(
            frame.gx,
            frame.registry,
            &PerDrawUniform::new(instance.world, instance.tint),
        );

        let bones_bind = match bone_buffer.as_ref() {
            Some(buffer) => buffer.bind_group(),
            None => shared.shared_bones.bind_group(),
        };
        rpass.set_bind_group(1, bones_bind, &[]);

        for (pass_index, pass) in resolve::drawn_passes(model.as_ref()) {
            let resolved = resolve::resolve(pass, &model.textures);
            rpass.set_pipeline(frame.registry.pipeline(resolved.pipeline_key()));

            let uniform = resolve::pass_uniform(pass, &resolved, animator);
            let pass_offset = buffers.push_pass(frame.gx, frame.registry, &uniform);
            rpass.set_bind_group(2, buffers.bind_group(), &[draw_offset, pass_offset]);
            rpass.set_bind_group(3, &pass_textures[pass_index], &[]);

            rpass.draw_indexed(pass.start_index..pass.start_index + pass.index_count, 0, 0..1);
        }
    }

    /// Schedules the per-instance bone buffer for release once in-flight
    /// draws referencing it have been recorded.
    pub fn dispose(&mut self, retire: &mut RetireQueue) {
        if let Some(buffer) = self.bone_buffer.take() {
            retire.defer(buffer.into_buffer());
        }
        self.pass_textures.clear();
    }
}
