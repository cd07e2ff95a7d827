//! Blends two images through a grayscale pattern mask on a WebGL2 canvas.
//!
//! The render core is host-independent: it drives any [`GlBackend`] and asks a
//! [`FrameRequester`] for animation frames. The browser wiring lives in the
//! wasm32-only `wasm` module.

pub mod assets;
pub mod backend;
pub mod config;
pub mod error;
pub mod geometry;
pub mod scheduler;
pub mod session;
pub mod shader;
pub mod texture;

pub use assets::{load_all, AssetSources, ImageDecoder, LoadStep, LoadedTextures};
pub use backend::{GlBackend, TextureParameter, TextureValue};
pub use config::{Config, ShaderBindings, DEFAULT_BLEND, MAX_CANVAS_DIMENSION};
pub use error::{ConfigError, FrameRequestError, InitError, InitStage};
pub use scheduler::{DrawScheduler, FrameRequester, FrameToken};
pub use session::{BlendParameter, DrawOutcome, RenderSession, SessionState};
pub use shader::{compile_and_link, ShaderStage, FRAGMENT_SHADER, VERTEX_SHADER};
pub use texture::{upload_texture, TextureRole};

// Only compile wasm-specific code when targeting wasm32.
#[cfg(target_arch = "wasm32")]
pub mod wasm {
    use wasm_bindgen::prelude::*;
    use wasm_bindgen::JsCast;

    use crate::config::Config;

    mod images;
    mod render;

    pub use images::HtmlImageDecoder;
    pub use render::{start, AnimationFrames, Session, WebGlBackend};

    const CANVAS_ID: &str = "imageCanvas";
    const SLIDER_ID: &str = "rangeSelector";
    const CONFIG_ID: &str = "paternizeConfig";

    #[wasm_bindgen(start)]
    pub fn main() -> Result<(), JsValue> {
        console_error_panic_hook::set_once();

        let window = web_sys::window().ok_or("no window")?;
        let document = window.document().ok_or("no document")?;

        let parsed = document
            .get_element_by_id(CONFIG_ID)
            .and_then(|element| element.text_content())
            .map(|text| Config::from_json(&text));
        let level = match &parsed {
            Some(Ok(config)) => config.log_level(),
            _ => log::Level::Info,
        };
        if console_log::init_with_level(level).is_err() {
            web_sys::console::warn_1(&"logger already initialized".into());
        }
        let config = match parsed {
            Some(Ok(config)) => config,
            Some(Err(err)) => {
                log::error!("ignoring #{CONFIG_ID}: {err}");
                Config::default()
            }
            None => Config::default(),
        };

        let Some(canvas) = document.get_element_by_id(CANVAS_ID) else {
            log::warn!("no #{CANVAS_ID} on this page, nothing to render");
            return Ok(());
        };
        let canvas = canvas.dyn_into::<web_sys::HtmlCanvasElement>()?;
        let slider = document
            .get_element_by_id(SLIDER_ID)
            .and_then(|element| element.dyn_into::<web_sys::HtmlInputElement>().ok());

        start(canvas, slider, config)
    }
}
