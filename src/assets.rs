//! Ordered loading of the three source images.
//!
//! Images are decoded and uploaded one at a time: base-A, then base-B, then the
//! pattern. [`LoadStep`] carries the textures produced so far, so a step can only
//! be reached once every earlier texture exists.

use std::future::Future;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::backend::GlBackend;
use crate::error::InitError;
use crate::texture::{upload_texture, TextureRole};

/// Locators for the three images, resolved by the host's loader.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct AssetSources {
    pub base_a: String,
    pub base_b: String,
    pub pattern: String,
}

impl Default for AssetSources {
    fn default() -> Self {
        Self {
            base_a: "images/image0.jpg".into(),
            base_b: "images/image1.jpg".into(),
            pattern: "images/pattern.png".into(),
        }
    }
}

impl AssetSources {
    pub fn locator(&self, role: TextureRole) -> &str {
        match role {
            TextureRole::BaseA => &self.base_a,
            TextureRole::BaseB => &self.base_b,
            TextureRole::Pattern => &self.pattern,
        }
    }

    /// Roles whose locator, read as a path relative to `root`, has no file behind it.
    pub fn missing_under(&self, root: &Path) -> Vec<TextureRole> {
        TextureRole::ALL
            .into_iter()
            .filter(|role| !root.join(self.locator(*role)).is_file())
            .collect()
    }
}

/// Decodes an image locator asynchronously.
pub trait ImageDecoder {
    type Image;

    /// Resolves with the decoded image or a diagnostic message.
    fn decode(&self, locator: &str) -> impl Future<Output = Result<Self::Image, String>>;
}

/// The three textures, addressed by role.
#[derive(Debug, Clone, PartialEq)]
pub struct LoadedTextures<T> {
    pub base_a: T,
    pub base_b: T,
    pub pattern: T,
}

impl<T> LoadedTextures<T> {
    pub fn get(&self, role: TextureRole) -> &T {
        match role {
            TextureRole::BaseA => &self.base_a,
            TextureRole::BaseB => &self.base_b,
            TextureRole::Pattern => &self.pattern,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum LoadStep<T> {
    AwaitingImage0,
    AwaitingImage1 { base_a: T },
    AwaitingPattern { base_a: T, base_b: T },
    Ready(LoadedTextures<T>),
    Failed(InitError),
}

impl<T> Default for LoadStep<T> {
    fn default() -> Self {
        LoadStep::AwaitingImage0
    }
}

impl<T> LoadStep<T> {
    /// Role whose texture the sequence needs next; `None` once terminal.
    pub fn awaiting(&self) -> Option<TextureRole> {
        match self {
            LoadStep::AwaitingImage0 => Some(TextureRole::BaseA),
            LoadStep::AwaitingImage1 { .. } => Some(TextureRole::BaseB),
            LoadStep::AwaitingPattern { .. } => Some(TextureRole::Pattern),
            LoadStep::Ready(_) | LoadStep::Failed(_) => None,
        }
    }

    /// Feeds the outcome for the awaited role. Terminal steps ignore further input.
    pub fn advance(self, outcome: Result<T, InitError>) -> Self {
        match (self, outcome) {
            (done @ (LoadStep::Ready(_) | LoadStep::Failed(_)), _) => done,
            (_, Err(err)) => LoadStep::Failed(err),
            (LoadStep::AwaitingImage0, Ok(base_a)) => LoadStep::AwaitingImage1 { base_a },
            (LoadStep::AwaitingImage1 { base_a }, Ok(base_b)) => {
                LoadStep::AwaitingPattern { base_a, base_b }
            }
            (LoadStep::AwaitingPattern { base_a, base_b }, Ok(pattern)) => {
                LoadStep::Ready(LoadedTextures {
                    base_a,
                    base_b,
                    pattern,
                })
            }
        }
    }

    pub fn into_result(self) -> Result<LoadedTextures<T>, InitError> {
        match self {
            LoadStep::Ready(textures) => Ok(textures),
            LoadStep::Failed(err) => Err(err),
            pending => Err(InitError::AssetsIncomplete {
                // Non-terminal steps always await a role.
                awaiting: pending.awaiting().unwrap_or(TextureRole::BaseA),
            }),
        }
    }
}

/// Decodes and uploads every image in order, stopping at the first failure.
///
/// Textures created before a failure stay allocated.
pub async fn load_all<B, D>(
    backend: &B,
    decoder: &D,
    sources: &AssetSources,
) -> Result<LoadedTextures<B::Texture>, InitError>
where
    B: GlBackend,
    D: ImageDecoder<Image = B::Image>,
{
    let mut step = LoadStep::default();
    while let Some(role) = step.awaiting() {
        let outcome = load_one(backend, decoder, role, sources.locator(role)).await;
        step = step.advance(outcome);
    }
    step.into_result()
}

async fn load_one<B, D>(
    backend: &B,
    decoder: &D,
    role: TextureRole,
    locator: &str,
) -> Result<B::Texture, InitError>
where
    B: GlBackend,
    D: ImageDecoder<Image = B::Image>,
{
    log::debug!("decoding {role} image from {locator}");
    let image = decoder
        .decode(locator)
        .await
        .map_err(|message| InitError::ImageDecode {
            role,
            locator: locator.to_owned(),
            message,
        })?;
    upload_texture(backend, role, &image)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn steps_follow_load_order() {
        let step = LoadStep::default();
        assert_eq!(step.awaiting(), Some(TextureRole::BaseA));
        let step = step.advance(Ok("a"));
        assert_eq!(step.awaiting(), Some(TextureRole::BaseB));
        let step = step.advance(Ok("b"));
        assert_eq!(step.awaiting(), Some(TextureRole::Pattern));
        let step = step.advance(Ok("p"));
        assert_eq!(step.awaiting(), None);

        let textures = step.into_result().unwrap();
        assert_eq!(*textures.get(TextureRole::BaseA), "a");
        assert_eq!(*textures.get(TextureRole::BaseB), "b");
        assert_eq!(*textures.get(TextureRole::Pattern), "p");
    }

    #[test]
    fn failure_is_absorbing() {
        let err = InitError::ImageDecode {
            role: TextureRole::BaseB,
            locator: "b.jpg".into(),
            message: "404".into(),
        };
        let step = LoadStep::default()
            .advance(Ok(1))
            .advance(Err(err.clone()))
            .advance(Ok(3));
        assert_eq!(step.awaiting(), None);
        assert_eq!(step.into_result(), Err(err));
    }

    #[test]
    fn unfinished_sequence_reports_awaited_role() {
        let step = LoadStep::default().advance(Ok(1));
        assert_eq!(
            step.into_result(),
            Err(InitError::AssetsIncomplete {
                awaiting: TextureRole::BaseB
            })
        );
    }

    #[test]
    fn reports_images_missing_from_a_site_root() {
        let root = std::env::temp_dir().join(format!("paternize-assets-{}", std::process::id()));
        std::fs::create_dir_all(root.join("images")).unwrap();
        let sources = AssetSources::default();
        assert_eq!(sources.missing_under(&root), TextureRole::ALL.to_vec());

        std::fs::write(root.join(&sources.base_a), b"jpg").unwrap();
        std::fs::write(root.join(&sources.pattern), b"png").unwrap();
        assert_eq!(sources.missing_under(&root), vec![TextureRole::BaseB]);

        std::fs::remove_dir_all(&root).unwrap();
    }

    #[test]
    fn locators_map_by_role() {
        let sources = AssetSources::default();
        assert_eq!(sources.locator(TextureRole::Pattern), "images/pattern.png");
        assert_eq!(sources.locator(TextureRole::BaseA), "images/image0.jpg");
    }
}
