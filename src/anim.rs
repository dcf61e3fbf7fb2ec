// src/anim.rs
//
// Contract between the renderer and the animation system. Track evaluation
// lives elsewhere; the renderer only consumes per-frame outputs.

use glam::{Mat4, Vec3, Vec4};

/// Camera-derived orientation fed to animators that drive billboarded bones.
#[derive(Debug, Clone, Copy)]
pub struct BillboardParams {
    pub forward: Vec3,
    pub right: Vec3,
    pub up: Vec3,
    pub inverse_rotation: Mat4,
}

/// Per-frame animation source. Implementations evaluate the model's tracks;
/// absent track data resolves to identity / full alpha / white rather than
/// an error.
pub trait Animator {
    /// Re-select the default animation. Called once when the owning
    /// instance is prepared for rendering.
    fn reset(&mut self) {}

    fn update(&mut self, billboard: &BillboardParams);

    /// Writes the current bone matrices into `out` and reports whether they
    /// changed since the previous query.
    fn bones(&mut self, out: &mut [Mat4]) -> bool;

    fn alpha_value(&self, index: u16) -> f32;

    fn uv_anim_matrix(&self, index: u16) -> Mat4;

    fn color_value(&self, index: u16) -> Vec4;
}

/// CPU-side bone matrix state for one instance. Decides when the GPU copy
/// is stale, so static or paused animations cost no uploads.
pub struct BoneTracker {
    scratch: Vec<Mat4>,
}

impl BoneTracker {
    pub fn new(bone_count: usize) -> Self {
        Self {
            scratch: vec![Mat4::IDENTITY; bone_count],
        }
    }

    pub fn matrices(&self) -> &[Mat4] {
        &self.scratch
    }

    /// Queries the animator and reports whether the GPU copy must be
    /// rewritten. A boneless model is never an error; the previous
    /// (identity) matrices simply stay in place.
    pub fn refresh(&mut self, animator: &mut dyn Animator) -> bool {
        if self.scratch.is_empty() {
            log::warn!("animator queried for a model with no bones; keeping previous matrices");
            return false;
        }
        animator.bones(&mut self.scratch)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct StaticAnimator;

    impl Animator for StaticAnimator {
        fn update(&mut self, _billboard: &BillboardParams) {}
        fn bones(&mut self, _out: &mut [Mat4]) -> bool {
            false
        }
        fn alpha_value(&self, _index: u16) -> f32 {
            1.0
        }
        fn uv_anim_matrix(&self, _index: u16) -> Mat4 {
            Mat4::IDENTITY
        }
        fn color_value(&self, _index: u16) -> Vec4 {
            Vec4::ONE
        }
    }

    #[test]
    fn unchanged_bones_request_no_upload() {
        let mut tracker = BoneTracker::new(8);
        let mut animator = StaticAnimator;
        for _ in 0..16 {
            assert!(!tracker.refresh(&mut animator));
        }
    }

    #[test]
    fn boneless_model_is_silently_skipped() {
        let mut tracker = BoneTracker::new(0);
        let mut animator = StaticAnimator;
        assert!(!tracker.refresh(&mut animator));
        assert!(tracker.matrices().is_empty());
    }
}
