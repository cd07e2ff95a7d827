use std::fmt;

use crate::backend::GlBackend;
use crate::error::InitError;

/// Bundled vertex stage: a clip-space quad with derived texture coordinates.
pub const VERTEX_SHADER: &str = include_str!("shaders/blend.vert");
/// Bundled fragment stage: base-A / base-B selected by the pattern mask.
pub const FRAGMENT_SHADER: &str = include_str!("shaders/blend.frag");

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShaderStage {
    Vertex,
    Fragment,
}

impl fmt::Display for ShaderStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ShaderStage::Vertex => f.write_str("vertex"),
            ShaderStage::Fragment => f.write_str("fragment"),
        }
    }
}

/// Compiles both stages and links them into one program.
///
/// The first failing stage wins; shader and program objects are not released on failure.
pub fn compile_and_link<B: GlBackend>(
    backend: &B,
    vertex_source: &str,
    fragment_source: &str,
) -> Result<B::Program, InitError> {
    let vertex = compile_stage(backend, ShaderStage::Vertex, vertex_source)?;
    let fragment = compile_stage(backend, ShaderStage::Fragment, fragment_source)?;

    let program = backend
        .create_program()
        .ok_or(InitError::Allocation("program"))?;
    if !backend.link_program(&program, &vertex, &fragment) {
        let log = backend
            .program_info_log(&program)
            .unwrap_or_else(|| "unknown error linking program".into());
        return Err(InitError::ShaderLink { log });
    }

    log::debug!("shader program linked");
    Ok(program)
}

fn compile_stage<B: GlBackend>(
    backend: &B,
    stage: ShaderStage,
    source: &str,
) -> Result<B::Shader, InitError> {
    let shader = backend
        .create_shader(stage)
        .ok_or_else(|| InitError::ShaderCompile {
            stage,
            log: "graphics context refused to allocate a shader object".into(),
        })?;

    if !backend.compile_shader(&shader, source) {
        let log = backend
            .shader_info_log(&shader)
            .unwrap_or_else(|| format!("unknown error compiling {stage} shader"));
        return Err(InitError::ShaderCompile { stage, log });
    }
    Ok(shader)
}
