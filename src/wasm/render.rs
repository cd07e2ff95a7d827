use std::cell::RefCell;
use std::rc::Rc;

use js_sys::Float32Array;
use wasm_bindgen::{closure::Closure, JsCast, JsValue};
use web_sys::{
    window, HtmlCanvasElement, HtmlImageElement, HtmlInputElement, WebGl2RenderingContext as GL,
    WebGlBuffer, WebGlProgram, WebGlShader, WebGlTexture, WebGlUniformLocation,
};

use crate::assets;
use crate::backend::{GlBackend, TextureParameter, TextureValue};
use crate::config::Config;
use crate::error::FrameRequestError;
use crate::scheduler::{FrameRequester, FrameToken};
use crate::session::RenderSession;
use crate::shader::{ShaderStage, FRAGMENT_SHADER, VERTEX_SHADER};

use super::images::HtmlImageDecoder;

/// Slider positions run 0..=100.
const SLIDER_RANGE: f64 = 100.0;

pub type Session = RenderSession<WebGlBackend, AnimationFrames>;

/// The canvas and its WebGL2 context. Cloning shares the same context.
#[derive(Clone)]
pub struct WebGlBackend {
    canvas: HtmlCanvasElement,
    gl: GL,
}

impl WebGlBackend {
    pub fn new(canvas: HtmlCanvasElement) -> Result<Self, JsValue> {
        let gl: GL = canvas
            .get_context("webgl2")?
            .ok_or("WebGL2 not supported")?
            .dyn_into()?;
        Ok(Self { canvas, gl })
    }
}

impl GlBackend for WebGlBackend {
    type Shader = WebGlShader;
    type Program = WebGlProgram;
    type Buffer = WebGlBuffer;
    type Texture = WebGlTexture;
    type UniformLocation = WebGlUniformLocation;
    type Image = HtmlImageElement;

    fn set_surface_size(&self, width: u32, height: u32) {
        self.canvas.set_width(width);
        self.canvas.set_height(height);
        self.gl.viewport(0, 0, width as i32, height as i32);
    }

    fn create_shader(&self, stage: ShaderStage) -> Option<WebGlShader> {
        let kind = match stage {
            ShaderStage::Vertex => GL::VERTEX_SHADER,
            ShaderStage::Fragment => GL::FRAGMENT_SHADER,
        };
        self.gl.create_shader(kind)
    }

    fn compile_shader(&self, shader: &WebGlShader, source: &str) -> bool {
        self.gl.shader_source(shader, source);
        self.gl.compile_shader(shader);
        self.gl
            .get_shader_parameter(shader, GL::COMPILE_STATUS)
            .as_bool()
            .unwrap_or(false)
    }

    fn shader_info_log(&self, shader: &WebGlShader) -> Option<String> {
        self.gl.get_shader_info_log(shader)
    }

    fn create_program(&self) -> Option<WebGlProgram> {
        self.gl.create_program()
    }

    fn link_program(
        &self,
        program: &WebGlProgram,
        vertex: &WebGlShader,
        fragment: &WebGlShader,
    ) -> bool {
        self.gl.attach_shader(program, vertex);
        self.gl.attach_shader(program, fragment);
        self.gl.link_program(program);
        self.gl
            .get_program_parameter(program, GL::LINK_STATUS)
            .as_bool()
            .unwrap_or(false)
    }

    fn program_info_log(&self, program: &WebGlProgram) -> Option<String> {
        self.gl.get_program_info_log(program)
    }

    fn use_program(&self, program: &WebGlProgram) {
        self.gl.use_program(Some(program));
    }

    fn attrib_location(&self, program: &WebGlProgram, name: &str) -> Option<u32> {
        // -1 marks an attribute the program does not declare.
        u32::try_from(self.gl.get_attrib_location(program, name)).ok()
    }

    fn uniform_location(&self, program: &WebGlProgram, name: &str) -> Option<WebGlUniformLocation> {
        self.gl.get_uniform_location(program, name)
    }

    fn create_buffer(&self) -> Option<WebGlBuffer> {
        self.gl.create_buffer()
    }

    fn upload_static_vertices(&self, buffer: &WebGlBuffer, data: &[f32]) {
        self.gl.bind_buffer(GL::ARRAY_BUFFER, Some(buffer));
        let array = Float32Array::from(data);
        self.gl
            .buffer_data_with_array_buffer_view(GL::ARRAY_BUFFER, &array, GL::STATIC_DRAW);
    }

    fn enable_vertex_attribute(&self, location: u32, components: i32) {
        self.gl.enable_vertex_attrib_array(location);
        self.gl
            .vertex_attrib_pointer_with_i32(location, components, GL::FLOAT, false, 0, 0);
    }

    fn image_size(&self, image: &HtmlImageElement) -> (u32, u32) {
        (image.natural_width(), image.natural_height())
    }

    fn create_texture(&self) -> Option<WebGlTexture> {
        self.gl.create_texture()
    }

    fn bind_texture(&self, texture: Option<&WebGlTexture>) {
        self.gl.bind_texture(GL::TEXTURE_2D, texture);
    }

    fn texture_parameter(&self, parameter: TextureParameter, value: TextureValue) {
        let parameter = match parameter {
            TextureParameter::WrapS => GL::TEXTURE_WRAP_S,
            TextureParameter::WrapT => GL::TEXTURE_WRAP_T,
            TextureParameter::MinFilter => GL::TEXTURE_MIN_FILTER,
            TextureParameter::MagFilter => GL::TEXTURE_MAG_FILTER,
        };
        let value = match value {
            TextureValue::ClampToEdge => GL::CLAMP_TO_EDGE,
            TextureValue::Nearest => GL::NEAREST,
        };
        self.gl.tex_parameteri(GL::TEXTURE_2D, parameter, value as i32);
    }

    fn upload_rgba(&self, image: &HtmlImageElement) -> Result<(), String> {
        self.gl
            .tex_image_2d_with_u32_and_u32_and_html_image_element(
                GL::TEXTURE_2D,
                0,
                GL::RGBA as i32,
                GL::RGBA,
                GL::UNSIGNED_BYTE,
                image,
            )
            .map_err(|err| format!("{err:?}"))
    }

    fn active_texture(&self, unit: u32) {
        self.gl.active_texture(GL::TEXTURE0 + unit);
    }

    fn uniform_1i(&self, location: &WebGlUniformLocation, value: i32) {
        self.gl.uniform1i(Some(location), value);
    }

    fn uniform_1f(&self, location: &WebGlUniformLocation, value: f32) {
        self.gl.uniform1f(Some(location), value);
    }

    fn draw_triangles(&self, first: i32, count: i32) {
        self.gl.draw_arrays(GL::TRIANGLES, first, count);
    }
}

type FrameHandler = Rc<RefCell<Option<Rc<dyn Fn(FrameToken)>>>>;

/// `requestAnimationFrame` with a handler installed after the session exists.
///
/// Each request gets its own one-shot callback that reports its token back.
pub struct AnimationFrames {
    handler: FrameHandler,
    next: i32,
}

impl FrameRequester for AnimationFrames {
    fn request_frame(&mut self) -> Result<FrameToken, FrameRequestError> {
        let handler = self
            .handler
            .borrow()
            .clone()
            .ok_or_else(|| FrameRequestError("frame handler not installed".into()))?;
        let window = window().ok_or_else(|| FrameRequestError("no window".into()))?;

        let token = FrameToken(self.next);
        self.next = self.next.wrapping_add(1);
        let callback = Closure::once_into_js(move || handler(token));
        window
            .request_animation_frame(callback.unchecked_ref())
            .map(|_| token)
            .map_err(|err| FrameRequestError(format!("{err:?}")))
    }
}

/// Creates the session on `canvas`, wires `slider` to it and starts loading.
///
/// Initialization failures are logged and leave the canvas blank; they are not
/// returned to the page.
pub fn start(
    canvas: HtmlCanvasElement,
    slider: Option<HtmlInputElement>,
    config: Config,
) -> Result<(), JsValue> {
    let window = window().ok_or("no window")?;
    let inner_width = window.inner_width()?.as_f64().unwrap_or(0.0) as u32;
    let inner_height = window.inner_height()?.as_f64().unwrap_or(0.0) as u32;
    let desired = config.desired_size(inner_width, inner_height);

    let backend = WebGlBackend::new(canvas)?;

    // `handler` routes frames back into the session. It is filled in after the
    // session exists so it can capture it; the resulting cycle keeps the session
    // alive for the lifetime of the page.
    let handler: FrameHandler = Rc::new(RefCell::new(None));
    let frames = AnimationFrames {
        handler: handler.clone(),
        next: 1,
    };
    let session = Rc::new(RefCell::new(Session::new(backend, frames, config, desired)));
    let on_frame: Rc<dyn Fn(FrameToken)> = {
        let session = session.clone();
        Rc::new(move |token: FrameToken| {
            session.borrow_mut().on_frame(token);
        })
    };
    *handler.borrow_mut() = Some(on_frame);

    if let Some(slider) = slider {
        let on_input = {
            let session = session.clone();
            let slider = slider.clone();
            Closure::wrap(Box::new(move || {
                let value = (slider.value_as_number() / SLIDER_RANGE) as f32;
                session.borrow_mut().request_blend(value);
            }) as Box<dyn FnMut()>)
        };
        slider.add_event_listener_with_callback("input", on_input.as_ref().unchecked_ref())?;
        on_input.forget();
    }

    if session
        .borrow_mut()
        .begin(VERTEX_SHADER, FRAGMENT_SHADER)
        .is_err()
    {
        return Ok(());
    }

    let (backend, sources) = {
        let session = session.borrow();
        (session.backend().clone(), session.config().assets.clone())
    };
    wasm_bindgen_futures::spawn_local(async move {
        let loaded = assets::load_all(&backend, &HtmlImageDecoder, &sources).await;
        // Failures are logged by the session.
        let _ = session.borrow_mut().complete_loading(loaded);
    });

    Ok(())
}
