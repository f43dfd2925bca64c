use thiserror::Error;

use crate::pipelines::ShaderStage;

/// Errors raised while building the cube or setting up the render session.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum RenderError {
    /// Geometry was requested with a non-positive side length or an empty palette.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),
    /// No usable instance, surface, adapter or logical device.
    #[error("graphics device unavailable: {0}")]
    DeviceUnavailable(String),
    /// A shader stage failed to compile; `log` is the compiler output.
    #[error("{stage} shader failed to compile:\n{log}")]
    ShaderCompile { stage: ShaderStage, log: String },
    /// Shader modules could not be combined into a graphics pipeline.
    #[error("shader program link failed: {0}")]
    ProgramLink(String),
    /// A buffer, image, memory block or command object could not be created.
    #[error("device allocation failed: {0}")]
    Allocation(String),
}
