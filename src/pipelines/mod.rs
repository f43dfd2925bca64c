mod pipeline;
pub use pipeline::{CameraBlock, CullMode, Pipeline, UniformSlots};

mod shaders;
pub use shaders::ShaderStage;
