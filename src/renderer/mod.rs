pub mod buffers;
pub mod context;
pub mod pipeline_builder;
pub mod resolve;
pub mod retire;
pub mod shaders;
pub mod single;
pub mod states;
pub mod uniforms;
pub mod vertex;

pub use buffers::{BoneBuffer, CameraBuffer, ConstantBufferSet, ModelGpu};
pub use context::GraphicsContext;
pub use pipeline_builder::PipelineBuilder;
pub use resolve::ResolvedPass;
pub use retire::RetireQueue;
pub use shaders::{PixelShaderKind, ShaderVariants, VertexShaderKind};
pub use single::{CameraVectors, FrameContext, SingleModelRenderer};
pub use states::{PipelineKey, SharedStateRegistry};
pub use uniforms::{CameraUniform, PerDrawUniform, PerPassUniform};
pub use vertex::ModelVertex;
