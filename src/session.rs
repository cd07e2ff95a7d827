//! The render controller.
//!
//! A [`RenderSession`] owns the graphics context, the linked program and the three
//! textures, and redraws only while the rendered pattern width lags the requested one.
//! Each draw schedules one follow-up frame; the frame that finds nothing to do clears
//! the pending flag, so an idle session issues no GPU work.

use std::fmt;

use crate::assets::{self, ImageDecoder, LoadedTextures};
use crate::backend::GlBackend;
use crate::config::Config;
use crate::error::InitError;
use crate::geometry::{bind_quad, QUAD_VERTEX_COUNT};
use crate::scheduler::{DrawScheduler, FrameRequester, FrameToken};
use crate::shader::compile_and_link;
use crate::texture::TextureRole;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    Uninitialized,
    Loading,
    Ready,
    Failed,
}

impl fmt::Display for SessionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            SessionState::Uninitialized => "uninitialized",
            SessionState::Loading => "loading",
            SessionState::Ready => "ready",
            SessionState::Failed => "failed",
        };
        f.write_str(name)
    }
}

/// Requested and last-rendered pattern width.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BlendParameter {
    requested: f32,
    applied: Option<f32>,
}

impl BlendParameter {
    pub fn new(initial: f32) -> Self {
        Self {
            requested: initial,
            applied: None,
        }
    }

    pub fn requested(&self) -> f32 {
        self.requested
    }

    pub fn applied(&self) -> Option<f32> {
        self.applied
    }

    pub fn request(&mut self, value: f32) {
        self.requested = value;
    }

    /// Bitwise comparison, so a NaN request converges like any other value.
    pub fn needs_draw(&self) -> bool {
        self.applied.map(f32::to_bits) != Some(self.requested.to_bits())
    }

    pub fn mark_applied(&mut self) {
        self.applied = Some(self.requested);
    }
}

/// What a single draw step did.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum DrawOutcome {
    /// The session is not ready; nothing happens.
    Inert,
    /// Rendered value already matches; the pending frame was cleared.
    Converged,
    /// A draw call was issued with this pattern width.
    Drawn(f32),
}

struct Resources<B: GlBackend> {
    program: B::Program,
    _quad: B::Buffer,
}

struct Bound<B: GlBackend> {
    _resources: Resources<B>,
    _textures: LoadedTextures<B::Texture>,
    pattern_width: B::UniformLocation,
}

enum Stage<B: GlBackend> {
    Uninitialized,
    Loading(Resources<B>),
    Ready(Bound<B>),
    Failed(InitError),
}

impl<B: GlBackend> Stage<B> {
    fn state(&self) -> SessionState {
        match self {
            Stage::Uninitialized => SessionState::Uninitialized,
            Stage::Loading(_) => SessionState::Loading,
            Stage::Ready(_) => SessionState::Ready,
            Stage::Failed(_) => SessionState::Failed,
        }
    }
}

pub struct RenderSession<B: GlBackend, F: FrameRequester> {
    backend: B,
    frames: F,
    config: Config,
    surface_size: u32,
    stage: Stage<B>,
    blend: BlendParameter,
    scheduler: DrawScheduler,
    draws: u64,
}

impl<B: GlBackend, F: FrameRequester> RenderSession<B, F> {
    /// `desired_size` is clamped to `config.max_canvas_dimension`.
    pub fn new(backend: B, frames: F, config: Config, desired_size: u32) -> Self {
        let surface_size = config.surface_size(desired_size);
        let blend = BlendParameter::new(config.initial_blend);
        Self {
            backend,
            frames,
            config,
            surface_size,
            stage: Stage::Uninitialized,
            blend,
            scheduler: DrawScheduler::default(),
            draws: 0,
        }
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn state(&self) -> SessionState {
        self.stage.state()
    }

    pub fn failure(&self) -> Option<&InitError> {
        match &self.stage {
            Stage::Failed(err) => Some(err),
            _ => None,
        }
    }

    pub fn surface_size(&self) -> u32 {
        self.surface_size
    }

    pub fn blend(&self) -> BlendParameter {
        self.blend
    }

    pub fn frame_pending(&self) -> bool {
        self.scheduler.is_pending()
    }

    /// Token of the outstanding frame request, if any.
    pub fn pending_frame(&self) -> Option<FrameToken> {
        self.scheduler.pending()
    }

    /// Draw calls issued so far.
    pub fn draws(&self) -> u64 {
        self.draws
    }

    /// Runs the whole initialization: program, quad, ordered asset load, bindings and
    /// the first draw. Failures leave the session in [`SessionState::Failed`].
    pub async fn init<D>(
        &mut self,
        vertex_source: &str,
        fragment_source: &str,
        decoder: &D,
    ) -> Result<(), InitError>
    where
        D: ImageDecoder<Image = B::Image>,
    {
        self.begin(vertex_source, fragment_source)?;
        let loaded = assets::load_all(&self.backend, decoder, &self.config.assets).await;
        self.complete_loading(loaded)
    }

    /// Sizes the surface, builds the program and binds the quad, entering `Loading`.
    pub fn begin(&mut self, vertex_source: &str, fragment_source: &str) -> Result<(), InitError> {
        if !matches!(self.stage, Stage::Uninitialized) {
            return Err(self.invalid_transition("begin initialization"));
        }

        log::info!("initializing {0}x{0} surface", self.surface_size);
        match self.prepare(vertex_source, fragment_source) {
            Ok(resources) => {
                self.stage = Stage::Loading(resources);
                log::info!("program ready, loading images");
                Ok(())
            }
            Err(err) => Err(self.fail(err)),
        }
    }

    /// Accepts the asset pipeline result, binds texture units and draws the first frame.
    pub fn complete_loading(
        &mut self,
        loaded: Result<LoadedTextures<B::Texture>, InitError>,
    ) -> Result<(), InitError> {
        let resources = match std::mem::replace(&mut self.stage, Stage::Uninitialized) {
            Stage::Loading(resources) => resources,
            other => {
                self.stage = other;
                return Err(self.invalid_transition("complete loading"));
            }
        };

        match loaded.and_then(|textures| self.bind(resources, textures)) {
            Ok(bound) => {
                self.stage = Stage::Ready(bound);
                log::info!("textures bound, session ready");
                self.draw();
                Ok(())
            }
            Err(err) => Err(self.fail(err)),
        }
    }

    /// Records a new pattern width and draws unless a frame is already pending.
    ///
    /// The value is expected in [0, 1]; it is not re-validated.
    pub fn request_blend(&mut self, value: f32) {
        self.blend.request(value);
        if self.scheduler.is_pending() {
            log::trace!("blend {value} queued behind pending frame");
            return;
        }
        self.draw();
    }

    /// Host callback for a requested frame. Frames other than the pending one are ignored.
    pub fn on_frame(&mut self, token: FrameToken) -> DrawOutcome {
        if self.scheduler.pending() != Some(token) {
            log::warn!(
                "ignoring frame {token:?}, pending request is {:?}",
                self.scheduler.pending()
            );
            return DrawOutcome::Inert;
        }
        self.scheduler.fire();
        self.draw()
    }

    /// The draw step: renders only when the requested width differs from the applied one.
    ///
    /// Callers must not have a frame outstanding.
    fn draw(&mut self) -> DrawOutcome {
        let Stage::Ready(bound) = &self.stage else {
            return DrawOutcome::Inert;
        };
        if !self.blend.needs_draw() {
            self.scheduler.clear();
            return DrawOutcome::Converged;
        }

        let value = self.blend.requested();
        self.backend.uniform_1f(&bound.pattern_width, value);
        self.backend.draw_triangles(0, QUAD_VERTEX_COUNT);
        self.blend.mark_applied();
        self.draws += 1;
        log::trace!("drew pattern width {value}");

        self.scheduler.clear();
        match self.frames.request_frame() {
            Ok(token) => self.scheduler.arm(token),
            Err(err) => log::warn!("{err}"),
        }
        DrawOutcome::Drawn(value)
    }

    fn prepare(
        &self,
        vertex_source: &str,
        fragment_source: &str,
    ) -> Result<Resources<B>, InitError> {
        self.backend
            .set_surface_size(self.surface_size, self.surface_size);
        let program = compile_and_link(&self.backend, vertex_source, fragment_source)?;
        self.backend.use_program(&program);
        let quad = bind_quad(
            &self.backend,
            &program,
            &self.config.bindings.position_attribute,
        )?;
        Ok(Resources {
            program,
            _quad: quad,
        })
    }

    fn bind(
        &self,
        resources: Resources<B>,
        textures: LoadedTextures<B::Texture>,
    ) -> Result<Bound<B>, InitError> {
        let bindings = &self.config.bindings;
        for role in TextureRole::ALL {
            let name = bindings.sampler(role);
            let sampler = self.uniform(&resources.program, name)?;
            self.backend.active_texture(role.unit());
            self.backend.bind_texture(Some(textures.get(role)));
            self.backend.uniform_1i(&sampler, role.unit() as i32);
            log::debug!("bound {role} texture to unit {}", role.unit());
        }
        let pattern_width = self.uniform(&resources.program, &bindings.pattern_width)?;

        Ok(Bound {
            _resources: resources,
            _textures: textures,
            pattern_width,
        })
    }

    fn uniform(&self, program: &B::Program, name: &str) -> Result<B::UniformLocation, InitError> {
        self.backend
            .uniform_location(program, name)
            .ok_or_else(|| InitError::MissingUniform {
                name: name.to_owned(),
            })
    }

    fn fail(&mut self, err: InitError) -> InitError {
        log::error!("initialization failed during {} stage: {err}", err.stage());
        self.scheduler.clear();
        self.stage = Stage::Failed(err.clone());
        err
    }

    fn invalid_transition(&self, operation: &'static str) -> InitError {
        let err = InitError::InvalidTransition {
            operation,
            state: self.state(),
        };
        log::warn!("{err}");
        err
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fresh_parameter_needs_a_draw() {
        let mut blend = BlendParameter::new(0.3);
        assert!(blend.needs_draw());
        blend.mark_applied();
        assert!(!blend.needs_draw());
        assert_eq!(blend.applied(), Some(0.3));
    }

    #[test]
    fn only_a_changed_value_needs_a_draw() {
        let mut blend = BlendParameter::new(0.3);
        blend.mark_applied();
        blend.request(0.3);
        assert!(!blend.needs_draw());
        blend.request(0.7);
        assert!(blend.needs_draw());
    }

    #[test]
    fn nan_request_converges() {
        let mut blend = BlendParameter::new(f32::NAN);
        blend.mark_applied();
        assert!(!blend.needs_draw());
    }
}
