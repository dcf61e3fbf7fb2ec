pub mod anim;
pub mod model;
pub mod renderer;

pub use anim::{Animator, BillboardParams, BoneTracker};
pub use model::{
    Model, ModelPass, RenderFlags, RenderInstance, SamplerKind, TextureInfo, MAX_TEXTURE_STAGES,
};
pub use renderer::{
    CameraBuffer, CameraVectors, ConstantBufferSet, FrameContext, GraphicsContext, ModelGpu,
    ModelVertex, PixelShaderKind, RetireQueue, ShaderVariants, SharedStateRegistry,
    SingleModelRenderer, VertexShaderKind,
};

pub fn init_logging() {
    let _ = env_logger::Builder::from_default_env()
        .filter_level(log::LevelFilter::Info)
        .try_init();
}
