use std::future::Future;

use wasm_bindgen::{JsCast, JsValue};
use wasm_bindgen_futures::JsFuture;
use web_sys::{DomException, HtmlImageElement};

use crate::assets::ImageDecoder;

/// Decodes images through `<img>` elements and their `decode()` promise.
#[derive(Debug, Default, Clone, Copy)]
pub struct HtmlImageDecoder;

impl ImageDecoder for HtmlImageDecoder {
    type Image = HtmlImageElement;

    fn decode(&self, locator: &str) -> impl Future<Output = Result<HtmlImageElement, String>> {
        let locator = locator.to_owned();
        async move {
            let image = HtmlImageElement::new().map_err(describe)?;
            image.set_src(&locator);
            JsFuture::from(image.decode()).await.map_err(describe)?;
            Ok(image)
        }
    }
}

fn describe(value: JsValue) -> String {
    if let Some(exception) = value.dyn_ref::<DomException>() {
        return format!("{}: {}", exception.name(), exception.message());
    }
    if let Some(error) = value.dyn_ref::<js_sys::Error>() {
        return String::from(error.message());
    }
    value.as_string().unwrap_or_else(|| format!("{value:?}"))
}
