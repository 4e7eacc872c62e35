//! Deduplicated store of the textures a scene samples

use std::path::{Path, PathBuf};

use image::RgbaImage;

use crate::error::{Error, Result};

use super::texture_resource::{TextureDesc, TextureResource};

/// Index of a texture inside a [`TextureLibrary`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TextureId(usize);

struct Entry {
    desc: TextureDesc,
    resource: Option<TextureResource>,
}

/// Texture descriptions registered on the CPU side and uploaded on demand.
///
/// A file that cannot be read or decoded is replaced by a 1x1 white texture,
/// so a missing asset degrades the look of the scene without stopping it.
pub struct TextureLibrary {
    root: PathBuf,
    entries: Vec<Entry>,
    neutral: Option<TextureResource>,
}

impl TextureLibrary {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            entries: Vec::new(),
            neutral: None,
        }
    }

    /// Registers a texture; an identical description returns the existing id
    pub fn add(&mut self, desc: TextureDesc) -> TextureId {
        if let Some(index) = self.entries.iter().position(|entry| entry.desc == desc) {
            return TextureId(index);
        }
        self.entries.push(Entry {
            desc,
            resource: None,
        });
        TextureId(self.entries.len() - 1)
    }

    pub fn desc(&self, id: TextureId) -> &TextureDesc {
        &self.entries[id.0].desc
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn resolve(&self, desc: &TextureDesc) -> PathBuf {
        self.root.join(&desc.path)
    }

    pub fn load_image(path: &Path) -> Result<RgbaImage> {
        let image = image::open(path).map_err(|source| Error::Texture {
            path: path.to_path_buf(),
            source,
        })?;
        Ok(image.to_rgba8())
    }

    /// Decodes and uploads every texture that is not on the GPU yet
    pub fn upload_all(&mut self, device: &wgpu::Device, queue: &wgpu::Queue) {
        if self.neutral.is_none() {
            self.neutral = Some(TextureResource::solid(
                device,
                queue,
                [255, 255, 255, 255],
                "Neutral Texture",
            ));
        }

        let mut loaded = 0;
        for entry in self.entries.iter_mut().filter(|e| e.resource.is_none()) {
            let path = self.root.join(&entry.desc.path);
            let label = entry.desc.path.display().to_string();
            let image = match Self::load_image(&path) {
                Ok(image) => {
                    loaded += 1;
                    image
                }
                Err(err) => {
                    log::warn!("{}; using a white placeholder", err);
                    RgbaImage::from_pixel(1, 1, image::Rgba([255, 255, 255, 255]))
                }
            };
            entry.resource = Some(TextureResource::from_image(
                device,
                queue,
                image,
                &entry.desc,
                &label,
            ));
        }

        log::info!(
            "Texture library ready: {} of {} textures decoded from {}",
            loaded,
            self.entries.len(),
            self.root.display()
        );
    }

    pub fn get(&self, id: TextureId) -> Option<&TextureResource> {
        self.entries.get(id.0).and_then(|entry| entry.resource.as_ref())
    }

    /// 1x1 white stand-in for absent maps, available after [`Self::upload_all`]
    pub fn neutral(&self) -> Option<&TextureResource> {
        self.neutral.as_ref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gfx::resources::texture_resource::Wrap;

    #[test]
    fn identical_descriptions_share_an_id() {
        let mut library = TextureLibrary::new("static");
        let arm = library.add(TextureDesc::linear("floor/arm.webp").with_repeat(8.0, 8.0));
        let again = library.add(TextureDesc::linear("floor/arm.webp").with_repeat(8.0, 8.0));
        let other = library.add(
            TextureDesc::linear("floor/arm.webp")
                .with_repeat(8.0, 8.0)
                .with_wrap(Wrap::Repeat, Wrap::Repeat),
        );
        assert_eq!(arm, again);
        assert_ne!(arm, other);
        assert_eq!(library.len(), 2);
        assert!(library.get(arm).is_none());
    }

    #[test]
    fn paths_resolve_against_the_root() {
        let library = TextureLibrary::new("assets");
        let desc = TextureDesc::srgb("door/color.webp");
        assert_eq!(library.resolve(&desc), PathBuf::from("assets/door/color.webp"));
    }

    #[test]
    fn missing_file_is_a_texture_error() {
        let err = TextureLibrary::load_image(Path::new("does/not/exist.webp")).unwrap_err();
        assert!(matches!(err, Error::Texture { .. }));
        assert!(err.to_string().contains("does/not/exist.webp"));
    }
}
