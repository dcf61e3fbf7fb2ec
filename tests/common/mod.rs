use std::cell::RefCell;

use glam::{Mat4, Vec4};
use m2view::{Animator, BillboardParams};

/// Animator with scripted outputs that records every query, so tests can
/// assert exactly which tracks a pass touched.
pub struct ScriptedAnimator {
    /// Return values for successive `bones` calls; the last entry repeats.
    pub bone_changes: Vec<bool>,
    pub bone_calls: RefCell<usize>,
    pub alpha_queries: RefCell<Vec<u16>>,
    pub uv_queries: RefCell<Vec<u16>>,
    pub color_queries: RefCell<Vec<u16>>,
    pub updates: RefCell<usize>,
}

impl ScriptedAnimator {
    pub fn new(bone_changes: Vec<bool>) -> Self {
        Self {
            bone_changes,
            bone_calls: RefCell::new(0),
            alpha_queries: RefCell::new(Vec::new()),
            uv_queries: RefCell::new(Vec::new()),
            color_queries: RefCell::new(Vec::new()),
            updates: RefCell::new(0),
        }
    }

    pub fn static_pose() -> Self {
        Self::new(vec![false])
    }
}

impl Animator for ScriptedAnimator {
    fn update(&mut self, _billboard: &BillboardParams) {
        *self.updates.borrow_mut() += 1;
    }

    fn bones(&mut self, out: &mut [Mat4]) -> bool {
        let call = *self.bone_calls.borrow();
        *self.bone_calls.borrow_mut() += 1;
        for matrix in out.iter_mut() {
            *matrix = Mat4::IDENTITY;
        }
        self.bone_changes
            .get(call)
            .or(self.bone_changes.last())
            .copied()
            .unwrap_or(false)
    }

    fn alpha_value(&self, index: u16) -> f32 {
        self.alpha_queries.borrow_mut().push(index);
        // Distinct per track so stale values are detectable.
        0.5 + f32::from(index) * 0.01
    }

    fn uv_anim_matrix(&self, index: u16) -> Mat4 {
        self.uv_queries.borrow_mut().push(index);
        Mat4::from_translation(glam::Vec3::new(f32::from(index) * 0.1, 0.0, 0.0))
    }

    fn color_value(&self, index: u16) -> Vec4 {
        self.color_queries.borrow_mut().push(index);
        Vec4::new(1.0, 1.0, 1.0, 1.0 - f32::from(index) * 0.05)
    }
}
