//! Recording doubles for the graphics context, image decoder and frame requester.
//!
//! All three append to one shared call log so tests can assert on global ordering.
#![allow(dead_code)]

use std::cell::{Cell, RefCell};
use std::collections::HashMap;
use std::future::{ready, Future};
use std::rc::Rc;

use paternize::{
    FrameRequestError, FrameRequester, FrameToken, GlBackend, ShaderStage, TextureParameter,
    TextureValue,
};

#[derive(Debug, Clone, PartialEq)]
pub enum Call {
    SurfaceSize(u32, u32),
    CompileShader(ShaderStage),
    LinkProgram,
    UseProgram,
    UploadVertices(Vec<f32>),
    EnableAttribute { location: u32, components: i32 },
    CreateTexture(u32),
    BindTexture(Option<u32>),
    TextureParameter(TextureParameter, TextureValue),
    UploadImage(String),
    ActiveTexture(u32),
    Uniform1i(String, i32),
    Uniform1f(String, f32),
    DrawTriangles { first: i32, count: i32 },
    Decode(String),
    RequestFrame(i32),
}

pub type CallLog = Rc<RefCell<Vec<Call>>>;

#[derive(Debug, Clone, PartialEq)]
pub struct FakeImage {
    pub name: String,
    pub width: u32,
    pub height: u32,
}

impl FakeImage {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_owned(),
            width: 4,
            height: 4,
        }
    }
}

/// A graphics context that accepts everything unless told otherwise.
pub struct FakeGl {
    log: CallLog,
    next_id: Cell<u32>,
    compile_failure: Option<(ShaderStage, String)>,
    link_failure: Option<String>,
    attributes: Vec<String>,
    uniforms: Vec<String>,
    rejected_upload: Option<String>,
}

impl FakeGl {
    pub fn new(log: CallLog) -> Self {
        Self {
            log,
            next_id: Cell::new(1),
            compile_failure: None,
            link_failure: None,
            attributes: vec!["a_position".into()],
            uniforms: ["u_image0", "u_image1", "u_pattern", "u_patternWidth"]
                .map(String::from)
                .to_vec(),
            rejected_upload: None,
        }
    }

    pub fn failing_compile(mut self, stage: ShaderStage, log: &str) -> Self {
        self.compile_failure = Some((stage, log.to_owned()));
        self
    }

    pub fn failing_link(mut self, log: &str) -> Self {
        self.link_failure = Some(log.to_owned());
        self
    }

    pub fn without_attribute(mut self, name: &str) -> Self {
        self.attributes.retain(|attribute| attribute != name);
        self
    }

    pub fn without_uniform(mut self, name: &str) -> Self {
        self.uniforms.retain(|uniform| uniform != name);
        self
    }

    pub fn rejecting_upload_of(mut self, image: &str) -> Self {
        self.rejected_upload = Some(image.to_owned());
        self
    }

    fn record(&self, call: Call) {
        self.log.borrow_mut().push(call);
    }

    fn id(&self) -> u32 {
        let id = self.next_id.get();
        self.next_id.set(id + 1);
        id
    }
}

impl GlBackend for FakeGl {
    type Shader = ShaderStage;
    type Program = u32;
    type Buffer = u32;
    type Texture = u32;
    type UniformLocation = String;
    type Image = FakeImage;

    fn set_surface_size(&self, width: u32, height: u32) {
        self.record(Call::SurfaceSize(width, height));
    }

    fn create_shader(&self, stage: ShaderStage) -> Option<ShaderStage> {
        Some(stage)
    }

    fn compile_shader(&self, shader: &ShaderStage, _source: &str) -> bool {
        self.record(Call::CompileShader(*shader));
        !matches!(&self.compile_failure, Some((stage, _)) if stage == shader)
    }

    fn shader_info_log(&self, shader: &ShaderStage) -> Option<String> {
        match &self.compile_failure {
            Some((stage, log)) if stage == shader => Some(log.clone()),
            _ => None,
        }
    }

    fn create_program(&self) -> Option<u32> {
        Some(self.id())
    }

    fn link_program(&self, _program: &u32, _vertex: &ShaderStage, _fragment: &ShaderStage) -> bool {
        self.record(Call::LinkProgram);
        self.link_failure.is_none()
    }

    fn program_info_log(&self, _program: &u32) -> Option<String> {
        self.link_failure.clone()
    }

    fn use_program(&self, _program: &u32) {
        self.record(Call::UseProgram);
    }

    fn attrib_location(&self, _program: &u32, name: &str) -> Option<u32> {
        self.attributes
            .iter()
            .position(|attribute| attribute == name)
            .map(|index| index as u32)
    }

    fn uniform_location(&self, _program: &u32, name: &str) -> Option<String> {
        self.uniforms
            .iter()
            .any(|uniform| uniform == name)
            .then(|| name.to_owned())
    }

    fn create_buffer(&self) -> Option<u32> {
        Some(self.id())
    }

    fn upload_static_vertices(&self, _buffer: &u32, data: &[f32]) {
        self.record(Call::UploadVertices(data.to_vec()));
    }

    fn enable_vertex_attribute(&self, location: u32, components: i32) {
        self.record(Call::EnableAttribute {
            location,
            components,
        });
    }

    fn image_size(&self, image: &FakeImage) -> (u32, u32) {
        (image.width, image.height)
    }

    fn create_texture(&self) -> Option<u32> {
        let id = self.id();
        self.record(Call::CreateTexture(id));
        Some(id)
    }

    fn bind_texture(&self, texture: Option<&u32>) {
        self.record(Call::BindTexture(texture.copied()));
    }

    fn texture_parameter(&self, parameter: TextureParameter, value: TextureValue) {
        self.record(Call::TextureParameter(parameter, value));
    }

    fn upload_rgba(&self, image: &FakeImage) -> Result<(), String> {
        if self.rejected_upload.as_deref() == Some(image.name.as_str()) {
            return Err("texImage2D rejected the source".into());
        }
        self.record(Call::UploadImage(image.name.clone()));
        Ok(())
    }

    fn active_texture(&self, unit: u32) {
        self.record(Call::ActiveTexture(unit));
    }

    fn uniform_1i(&self, location: &String, value: i32) {
        self.record(Call::Uniform1i(location.clone(), value));
    }

    fn uniform_1f(&self, location: &String, value: f32) {
        self.record(Call::Uniform1f(location.clone(), value));
    }

    fn draw_triangles(&self, first: i32, count: i32) {
        self.record(Call::DrawTriangles { first, count });
    }
}

/// Decodes from a fixed table; unknown locators decode to a 4x4 image of that name.
pub struct FakeDecoder {
    log: CallLog,
    outcomes: HashMap<String, Result<FakeImage, String>>,
}

impl FakeDecoder {
    pub fn new(log: CallLog) -> Self {
        Self {
            log,
            outcomes: HashMap::new(),
        }
    }

    pub fn with(mut self, locator: &str, outcome: Result<FakeImage, String>) -> Self {
        self.outcomes.insert(locator.to_owned(), outcome);
        self
    }
}

impl paternize::ImageDecoder for FakeDecoder {
    type Image = FakeImage;

    fn decode(&self, locator: &str) -> impl Future<Output = Result<FakeImage, String>> {
        self.log.borrow_mut().push(Call::Decode(locator.to_owned()));
        let outcome = self
            .outcomes
            .get(locator)
            .cloned()
            .unwrap_or_else(|| Ok(FakeImage::new(locator)));
        ready(outcome)
    }
}

/// Hands out increasing tokens; frames run only when a test calls `on_frame`.
pub struct FakeFrames {
    log: CallLog,
    next: i32,
    reject: bool,
}

impl FakeFrames {
    pub fn new(log: CallLog) -> Self {
        Self {
            log,
            next: 1,
            reject: false,
        }
    }

    pub fn rejecting(mut self) -> Self {
        self.reject = true;
        self
    }
}

impl FrameRequester for FakeFrames {
    fn request_frame(&mut self) -> Result<FrameToken, FrameRequestError> {
        if self.reject {
            return Err(FrameRequestError("no window".into()));
        }
        let token = self.next;
        self.next += 1;
        self.log.borrow_mut().push(Call::RequestFrame(token));
        Ok(FrameToken(token))
    }
}

pub fn call_log() -> CallLog {
    Rc::new(RefCell::new(Vec::new()))
}

pub fn count(log: &CallLog, predicate: impl Fn(&Call) -> bool) -> usize {
    log.borrow().iter().filter(|call| predicate(call)).count()
}

pub fn draws(log: &CallLog) -> usize {
    count(log, |call| matches!(call, Call::DrawTriangles { .. }))
}

pub fn position(log: &CallLog, wanted: &Call) -> usize {
    log.borrow()
        .iter()
        .position(|call| call == wanted)
        .unwrap_or_else(|| panic!("{wanted:?} never recorded"))
}
