//! The graphics seam between the render core and a concrete context.
//!
//! Everything the core does on the GPU goes through [`GlBackend`]. The browser build
//! implements it over `WebGl2RenderingContext`; tests implement it with a recorder.

use crate::shader::ShaderStage;

/// Texture parameters the texture loader sets.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextureParameter {
    WrapS,
    WrapT,
    MinFilter,
    MagFilter,
}

/// Values assigned to a [`TextureParameter`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextureValue {
    ClampToEdge,
    Nearest,
}

/// A WebGL-shaped graphics context.
///
/// Methods take `&self`: the underlying context is a shared handle mutated only from
/// the rendering thread. Handle types are opaque to the core.
pub trait GlBackend {
    type Shader;
    type Program;
    type Buffer;
    type Texture;
    type UniformLocation;
    /// A decoded image ready for upload.
    type Image;

    /// Resizes the drawing surface and the viewport to match it.
    fn set_surface_size(&self, width: u32, height: u32);

    fn create_shader(&self, stage: ShaderStage) -> Option<Self::Shader>;
    /// Sets the source and compiles; returns the compile status.
    fn compile_shader(&self, shader: &Self::Shader, source: &str) -> bool;
    fn shader_info_log(&self, shader: &Self::Shader) -> Option<String>;

    fn create_program(&self) -> Option<Self::Program>;
    /// Attaches both stages and links; returns the link status.
    fn link_program(
        &self,
        program: &Self::Program,
        vertex: &Self::Shader,
        fragment: &Self::Shader,
    ) -> bool;
    fn program_info_log(&self, program: &Self::Program) -> Option<String>;
    fn use_program(&self, program: &Self::Program);

    fn attrib_location(&self, program: &Self::Program, name: &str) -> Option<u32>;
    fn uniform_location(&self, program: &Self::Program, name: &str)
        -> Option<Self::UniformLocation>;

    fn create_buffer(&self) -> Option<Self::Buffer>;
    /// Binds `buffer` as the array buffer and uploads `data` as static draw data.
    fn upload_static_vertices(&self, buffer: &Self::Buffer, data: &[f32]);
    /// Enables `location` reading tightly packed `components`-wide floats at offset 0.
    fn enable_vertex_attribute(&self, location: u32, components: i32);

    fn image_size(&self, image: &Self::Image) -> (u32, u32);
    fn create_texture(&self) -> Option<Self::Texture>;
    fn bind_texture(&self, texture: Option<&Self::Texture>);
    fn texture_parameter(&self, parameter: TextureParameter, value: TextureValue);
    /// Uploads `image` into the bound 2D texture as RGBA / unsigned byte, level 0.
    fn upload_rgba(&self, image: &Self::Image) -> Result<(), String>;

    fn active_texture(&self, unit: u32);
    fn uniform_1i(&self, location: &Self::UniformLocation, value: i32);
    fn uniform_1f(&self, location: &Self::UniformLocation, value: f32);

    fn draw_triangles(&self, first: i32, count: i32);
}
