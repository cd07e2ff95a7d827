use std::fmt;

use crate::backend::{GlBackend, TextureParameter, TextureValue};
use crate::error::InitError;

/// The three textures a session blends, in load order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TextureRole {
    BaseA,
    BaseB,
    Pattern,
}

impl TextureRole {
    pub const ALL: [TextureRole; 3] = [TextureRole::BaseA, TextureRole::BaseB, TextureRole::Pattern];

    /// Fixed texture unit this role is bound to.
    pub fn unit(self) -> u32 {
        match self {
            TextureRole::BaseA => 0,
            TextureRole::BaseB => 1,
            TextureRole::Pattern => 2,
        }
    }
}

impl fmt::Display for TextureRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TextureRole::BaseA => f.write_str("base-A"),
            TextureRole::BaseB => f.write_str("base-B"),
            TextureRole::Pattern => f.write_str("pattern"),
        }
    }
}

// Nearest filtering keeps the pattern's edges hard.
const SAMPLING: [(TextureParameter, TextureValue); 4] = [
    (TextureParameter::WrapS, TextureValue::ClampToEdge),
    (TextureParameter::WrapT, TextureValue::ClampToEdge),
    (TextureParameter::MinFilter, TextureValue::Nearest),
    (TextureParameter::MagFilter, TextureValue::Nearest),
];

/// Creates a write-once 2D texture from a decoded image.
///
/// Leaves the new texture bound on the active unit.
pub fn upload_texture<B: GlBackend>(
    backend: &B,
    role: TextureRole,
    image: &B::Image,
) -> Result<B::Texture, InitError> {
    let (width, height) = backend.image_size(image);
    if width == 0 || height == 0 {
        return Err(InitError::TextureUpload {
            role,
            reason: format!("image has zero dimensions ({width}x{height})"),
        });
    }

    let texture = backend
        .create_texture()
        .ok_or_else(|| InitError::TextureUpload {
            role,
            reason: "graphics context refused to allocate a texture".into(),
        })?;
    backend.bind_texture(Some(&texture));
    for (parameter, value) in SAMPLING {
        backend.texture_parameter(parameter, value);
    }
    backend
        .upload_rgba(image)
        .map_err(|reason| InitError::TextureUpload { role, reason })?;

    log::debug!("uploaded {role} texture ({width}x{height})");
    Ok(texture)
}
