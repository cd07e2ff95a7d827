use std::fmt;

use thiserror::Error;

use crate::session::SessionState;
use crate::shader::ShaderStage;
use crate::texture::TextureRole;

/// Initialization phase an [`InitError`] is attributed to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InitStage {
    Shader,
    Geometry,
    Assets,
    Bindings,
    Lifecycle,
}

impl fmt::Display for InitStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            InitStage::Shader => "shader",
            InitStage::Geometry => "geometry",
            InitStage::Assets => "assets",
            InitStage::Bindings => "bindings",
            InitStage::Lifecycle => "lifecycle",
        };
        f.write_str(name)
    }
}

/// Fatal initialization failures. None of these are retried.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum InitError {
    #[error("{stage} shader failed to compile: {log}")]
    ShaderCompile { stage: ShaderStage, log: String },

    #[error("shader program failed to link: {log}")]
    ShaderLink { log: String },

    #[error("shader does not declare attribute `{name}`")]
    MissingAttribute { name: String },

    #[error("shader does not declare uniform `{name}`")]
    MissingUniform { name: String },

    #[error("graphics context refused to allocate a {0}")]
    Allocation(&'static str),

    #[error("failed to decode {role} image from `{locator}`: {message}")]
    ImageDecode {
        role: TextureRole,
        locator: String,
        message: String,
    },

    #[error("failed to upload {role} texture: {reason}")]
    TextureUpload { role: TextureRole, reason: String },

    #[error("asset sequence stopped while awaiting the {awaiting} image")]
    AssetsIncomplete { awaiting: TextureRole },

    #[error("cannot {operation} while the session is {state}")]
    InvalidTransition {
        operation: &'static str,
        state: SessionState,
    },
}

impl InitError {
    pub fn stage(&self) -> InitStage {
        match self {
            InitError::ShaderCompile { .. } | InitError::ShaderLink { .. } => InitStage::Shader,
            InitError::MissingAttribute { .. } | InitError::Allocation(_) => InitStage::Geometry,
            InitError::ImageDecode { .. }
            | InitError::TextureUpload { .. }
            | InitError::AssetsIncomplete { .. } => InitStage::Assets,
            InitError::MissingUniform { .. } => InitStage::Bindings,
            InitError::InvalidTransition { .. } => InitStage::Lifecycle,
        }
    }

    /// The texture role a failure is attributed to, if any.
    pub fn role(&self) -> Option<TextureRole> {
        match self {
            InitError::ImageDecode { role, .. } | InitError::TextureUpload { role, .. } => {
                Some(*role)
            }
            InitError::AssetsIncomplete { awaiting } => Some(*awaiting),
            _ => None,
        }
    }
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("malformed config: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("invalid config: {0}")]
    Invalid(String),
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("animation frame request rejected: {0}")]
pub struct FrameRequestError(pub String);
