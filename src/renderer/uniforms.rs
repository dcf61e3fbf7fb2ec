// renderer/uniforms.rs
use bytemuck::{Pod, Zeroable};
use glam::{Mat4, Vec3, Vec4};

#[repr(C)]
#[derive(Clone, Copy, Pod, Zeroable)]
pub struct CameraUniform {
    pub view_proj: [[f32; 4]; 4],
    pub camera_pos: [f32; 4],
}

impl CameraUniform {
    pub fn new() -> Self {
        Self {
            view_proj: Mat4::IDENTITY.to_cols_array_2d(),
            camera_pos: [0.0; 4],
        }
    }

    pub fn from_matrix(view_proj: Mat4, camera_pos: Vec3) -> Self {
        Self {
            view_proj: view_proj.to_cols_array_2d(),
            camera_pos: camera_pos.extend(1.0).to_array(),
        }
    }
}

impl Default for CameraUniform {
    fn default() -> Self {
        Self::new()
    }
}

/// Instance transform and highlight tint. Rewritten in full once per
/// instance per frame, before any pass of that instance is drawn.
#[repr(C)]
#[derive(Clone, Copy, Pod, Zeroable, PartialEq, Debug)]
pub struct PerDrawUniform {
    pub world: [[f32; 4]; 4],
    pub tint: [f32; 4],
}

impl PerDrawUniform {
    pub fn new(world: Mat4, tint: Vec4) -> Self {
        Self {
            world: world.to_cols_array_2d(),
            tint: tint.to_array(),
        }
    }
}

/// Animated material state for one pass. Field order matches the WGSL
/// `PerPass` struct.
#[repr(C)]
#[derive(Clone, Copy, Pod, Zeroable, PartialEq, Debug)]
pub struct PerPassUniform {
    /// One UV matrix per texture stage, identity-padded past op_count.
    pub uv_anim: [[[f32; 4]; 4]; 4],
    /// (unlit, unfogged, alpha_key, reserved) enable scalars.
    pub params: [f32; 4],
    pub anim_color: [f32; 4],
    /// Per-stage alpha, 1.0-padded past op_count.
    pub transparency: [f32; 4],
}

impl Default for PerPassUniform {
    fn default() -> Self {
        Self {
            uv_anim: [Mat4::IDENTITY.to_cols_array_2d(); 4],
            params: [1.0, 1.0, 0.0, 0.0],
            anim_color: [1.0; 4],
            transparency: [1.0; 4],
        }
    }
}
