use crate::backend::GlBackend;
use crate::error::InitError;

/// Two triangles covering clip space.
pub const QUAD_VERTICES: [f32; 12] = [
    -1.0, -1.0, //
    1.0, -1.0, //
    -1.0, 1.0, //
    -1.0, 1.0, //
    1.0, -1.0, //
    1.0, 1.0, //
];

pub const QUAD_COMPONENTS: i32 = 2;
pub const QUAD_VERTEX_COUNT: i32 = QUAD_VERTICES.len() as i32 / QUAD_COMPONENTS;

/// Uploads the static quad and points `attribute` at it.
///
/// The returned buffer is never written again.
pub fn bind_quad<B: GlBackend>(
    backend: &B,
    program: &B::Program,
    attribute: &str,
) -> Result<B::Buffer, InitError> {
    let location = backend
        .attrib_location(program, attribute)
        .ok_or_else(|| InitError::MissingAttribute {
            name: attribute.to_owned(),
        })?;

    let buffer = backend
        .create_buffer()
        .ok_or(InitError::Allocation("vertex buffer"))?;
    backend.upload_static_vertices(&buffer, &QUAD_VERTICES);
    backend.enable_vertex_attribute(location, QUAD_COMPONENTS);
    Ok(buffer)
}
