use std::fmt;

use gfx_auxil as auxil;

use crate::error::RenderError;

pub const CUBE_VERTEX_SHADER: &str = include_str!("../../shaders/cube.vert");
pub const CUBE_FRAGMENT_SHADER: &str = include_str!("../../shaders/cube.frag");

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShaderStage {
    Vertex,
    Fragment,
}

impl ShaderStage {
    fn shader_type(self) -> glsl_to_spirv::ShaderType {
        match self {
            ShaderStage::Vertex => glsl_to_spirv::ShaderType::Vertex,
            ShaderStage::Fragment => glsl_to_spirv::ShaderType::Fragment,
        }
    }
}

impl fmt::Display for ShaderStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ShaderStage::Vertex => f.write_str("vertex"),
            ShaderStage::Fragment => f.write_str("fragment"),
        }
    }
}

/// Compiles GLSL source for one stage into SPIR-V words.
///
/// The compiler's diagnostic log is written to the error log and carried in
/// the returned error.
pub fn compile_stage(stage: ShaderStage, source: &str) -> Result<Vec<u32>, RenderError> {
    let output = glsl_to_spirv::compile(source, stage.shader_type()).map_err(|log| {
        log::error!("{} shader compile log:\n{}", stage, log);
        RenderError::ShaderCompile { stage, log }
    })?;

    let spirv = auxil::read_spirv(output).map_err(|e| RenderError::ShaderCompile {
        stage,
        log: format!("unreadable SPIR-V output: {}", e),
    })?;

    log::debug!("compiled {} shader ({} words)", stage, spirv.len());
    Ok(spirv)
}

#[cfg(test)]
mod tests {
    use super::*;

    const SPIRV_MAGIC: u32 = 0x0723_0203;

    #[test]
    fn cube_shaders_compile() {
        let vs = compile_stage(ShaderStage::Vertex, CUBE_VERTEX_SHADER).unwrap();
        let fs = compile_stage(ShaderStage::Fragment, CUBE_FRAGMENT_SHADER).unwrap();
        assert_eq!(vs[0], SPIRV_MAGIC);
        assert_eq!(fs[0], SPIRV_MAGIC);
    }

    #[test]
    fn cube_vertex_shader_declares_its_interface() {
        for name in &["vertPosition", "vertColor", "mWorld", "mView", "mProj"] {
            assert!(CUBE_VERTEX_SHADER.contains(name), "missing {}", name);
        }
        assert!(CUBE_FRAGMENT_SHADER.contains("vec4(fragColor, 1.0)"));
    }

    #[test]
    fn compile_failure_reports_stage() {
        let broken = "#version 450\nvoid main() { undeclared = 1.0; }\n";
        match compile_stage(ShaderStage::Fragment, broken) {
            Err(RenderError::ShaderCompile { stage, log }) => {
                assert_eq!(stage, ShaderStage::Fragment);
                assert!(!log.is_empty());
            }
            other => panic!("expected a compile error, got {:?}", other.map(|w| w.len())),
        }
    }
}
