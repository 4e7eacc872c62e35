//! Texture resource management for wgpu
//!
//! Provides utilities for creating and managing GPU textures, views, and samplers:
//! image-backed material maps with CPU generated mip chains, depth buffers and
//! shadow map arrays.

use std::path::PathBuf;

use image::{imageops::FilterType, Rgba, Rgba32FImage, RgbaImage};

use crate::gfx::color::{linear_to_srgb, srgb_to_linear};

/// How the texel values of an image are interpreted
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ColorSpace {
    /// Colour maps, decoded to linear by the sampler
    Srgb,
    /// Data maps (normals, roughness, heights) used as stored
    Linear,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Wrap {
    Repeat,
    Clamp,
}

impl From<Wrap> for wgpu::AddressMode {
    fn from(wrap: Wrap) -> Self {
        match wrap {
            Wrap::Repeat => wgpu::AddressMode::Repeat,
            Wrap::Clamp => wgpu::AddressMode::ClampToEdge,
        }
    }
}

/// Where an image comes from and how it is sampled
#[derive(Debug, Clone, PartialEq)]
pub struct TextureDesc {
    /// Relative to the texture library's asset root
    pub path: PathBuf,
    pub color_space: ColorSpace,
    /// UV multiplier applied by every material that samples this texture
    pub repeat: [f32; 2],
    pub wrap_s: Wrap,
    pub wrap_t: Wrap,
    /// Store the image bottom row first, so `v = 0` samples the bottom of the image
    pub flip_y: bool,
}

impl TextureDesc {
    pub fn new(path: impl Into<PathBuf>, color_space: ColorSpace) -> Self {
        Self {
            path: path.into(),
            color_space,
            repeat: [1.0, 1.0],
            wrap_s: Wrap::Clamp,
            wrap_t: Wrap::Clamp,
            flip_y: true,
        }
    }

    pub fn srgb(path: impl Into<PathBuf>) -> Self {
        Self::new(path, ColorSpace::Srgb)
    }

    pub fn linear(path: impl Into<PathBuf>) -> Self {
        Self::new(path, ColorSpace::Linear)
    }

    pub fn with_repeat(mut self, u: f32, v: f32) -> Self {
        self.repeat = [u, v];
        self
    }

    pub fn with_wrap(mut self, wrap_s: Wrap, wrap_t: Wrap) -> Self {
        self.wrap_s = wrap_s;
        self.wrap_t = wrap_t;
        self
    }

    pub fn format(&self) -> wgpu::TextureFormat {
        match self.color_space {
            ColorSpace::Srgb => wgpu::TextureFormat::Rgba8UnormSrgb,
            ColorSpace::Linear => wgpu::TextureFormat::Rgba8Unorm,
        }
    }
}

/// Number of levels in a full mip chain down to 1x1
pub fn mip_level_count(width: u32, height: u32) -> u32 {
    32 - width.max(height).max(1).leading_zeros()
}

/// Halves the image until it is 1x1, starting with the image itself.
///
/// Levels are filtered on linear values; colour maps are decoded from sRGB
/// first and encoded again for upload. Alpha is always linear.
pub fn generate_mip_chain(base: RgbaImage, color_space: ColorSpace) -> Vec<RgbaImage> {
    let (decode, encode): (fn(f32) -> f32, fn(f32) -> f32) = match color_space {
        ColorSpace::Srgb => (srgb_to_linear, linear_to_srgb),
        ColorSpace::Linear => (|c| c, |c| c),
    };

    let levels = mip_level_count(base.width(), base.height());
    let mut linear = Rgba32FImage::from_fn(base.width(), base.height(), |x, y| {
        let [r, g, b, a] = base.get_pixel(x, y).0.map(|c| c as f32 / 255.0);
        Rgba([decode(r), decode(g), decode(b), a])
    });

    let mut chain = Vec::with_capacity(levels as usize);
    chain.push(base);
    for _ in 1..levels {
        let width = (linear.width() / 2).max(1);
        let height = (linear.height() / 2).max(1);
        linear = image::imageops::resize(&linear, width, height, FilterType::Triangle);
        chain.push(RgbaImage::from_fn(width, height, |x, y| {
            let [r, g, b, a] = linear.get_pixel(x, y).0;
            let quantize = |c: f32| (c.clamp(0.0, 1.0) * 255.0).round() as u8;
            Rgba([
                quantize(encode(r)),
                quantize(encode(g)),
                quantize(encode(b)),
                quantize(a),
            ])
        }));
    }
    chain
}

/// GPU texture resource containing texture, view, and sampler
///
/// Bundles the three main components needed for texture operations:
/// - Texture: The actual GPU memory allocation
/// - View: Interface for shader access
/// - Sampler: Filtering and addressing configuration
#[derive(Clone)]
pub struct TextureResource {
    pub texture: wgpu::Texture,
    pub view: wgpu::TextureView,
    pub sampler: wgpu::Sampler,
}

impl TextureResource {
    /// Standard depth buffer format used throughout the engine
    pub const DEPTH_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Depth32Float;

    /// Creates a depth texture matching the surface configuration
    pub fn create_depth_texture(
        device: &wgpu::Device,
        config: &wgpu::SurfaceConfiguration,
        label: &str,
    ) -> Self {
        let size = wgpu::Extent3d {
            width: config.width.max(1),
            height: config.height.max(1),
            depth_or_array_layers: 1,
        };

        let texture = device.create_texture(&wgpu::TextureDescriptor {
            label: Some(label),
            size,
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: Self::DEPTH_FORMAT,
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT | wgpu::TextureUsages::TEXTURE_BINDING,
            view_formats: &[Self::DEPTH_FORMAT],
        });
        let view = texture.create_view(&wgpu::TextureViewDescriptor::default());
        let sampler = Self::comparison_sampler(device, label);

        Self {
            texture,
            view,
            sampler,
        }
    }

    /// Square depth array with `layers` layers; `view` sees all of them as a 2D array
    pub fn create_shadow_map(
        device: &wgpu::Device,
        size: u32,
        layers: u32,
        label: &str,
    ) -> Self {
        let texture = device.create_texture(&wgpu::TextureDescriptor {
            label: Some(label),
            size: wgpu::Extent3d {
                width: size,
                height: size,
                depth_or_array_layers: layers.max(1),
            },
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: Self::DEPTH_FORMAT,
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT | wgpu::TextureUsages::TEXTURE_BINDING,
            view_formats: &[],
        });

        let view = texture.create_view(&wgpu::TextureViewDescriptor {
            label: Some(label),
            dimension: Some(wgpu::TextureViewDimension::D2Array),
            ..Default::default()
        });
        let sampler = Self::comparison_sampler(device, label);

        Self {
            texture,
            view,
            sampler,
        }
    }

    /// View of a single shadow map layer, used as a depth attachment
    pub fn layer_view(&self, layer: u32) -> wgpu::TextureView {
        self.texture.create_view(&wgpu::TextureViewDescriptor {
            label: Some("Shadow Layer View"),
            dimension: Some(wgpu::TextureViewDimension::D2),
            base_array_layer: layer,
            array_layer_count: Some(1),
            ..Default::default()
        })
    }

    /// Shadow lookups go through a comparison sampler. Shaders skip the lookup
    /// for coordinates outside the map.
    fn comparison_sampler(device: &wgpu::Device, label: &str) -> wgpu::Sampler {
        device.create_sampler(&wgpu::SamplerDescriptor {
            label: Some(&format!("{} Sampler", label)),
            address_mode_u: wgpu::AddressMode::ClampToEdge,
            address_mode_v: wgpu::AddressMode::ClampToEdge,
            address_mode_w: wgpu::AddressMode::ClampToEdge,
            mag_filter: wgpu::FilterMode::Linear,
            min_filter: wgpu::FilterMode::Linear,
            mipmap_filter: wgpu::FilterMode::Nearest,
            compare: Some(wgpu::CompareFunction::LessEqual),
            lod_min_clamp: 0.0,
            lod_max_clamp: 100.0,
            ..Default::default()
        })
    }

    /// Uploads a decoded image with its full mip chain
    pub fn from_image(
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        mut image: RgbaImage,
        desc: &TextureDesc,
        label: &str,
    ) -> Self {
        if desc.flip_y {
            image::imageops::flip_vertical_in_place(&mut image);
        }
        let (width, height) = image.dimensions();
        let chain = generate_mip_chain(image, desc.color_space);

        let texture = device.create_texture(&wgpu::TextureDescriptor {
            label: Some(label),
            size: wgpu::Extent3d {
                width,
                height,
                depth_or_array_layers: 1,
            },
            mip_level_count: chain.len() as u32,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: desc.format(),
            usage: wgpu::TextureUsages::TEXTURE_BINDING | wgpu::TextureUsages::COPY_DST,
            view_formats: &[],
        });

        for (level, mip) in chain.iter().enumerate() {
            queue.write_texture(
                wgpu::TexelCopyTextureInfo {
                    texture: &texture,
                    mip_level: level as u32,
                    origin: wgpu::Origin3d::ZERO,
                    aspect: wgpu::TextureAspect::All,
                },
                mip.as_raw(),
                wgpu::TexelCopyBufferLayout {
                    offset: 0,
                    bytes_per_row: Some(4 * mip.width()),
                    rows_per_image: Some(mip.height()),
                },
                wgpu::Extent3d {
                    width: mip.width(),
                    height: mip.height(),
                    depth_or_array_layers: 1,
                },
            );
        }

        let view = texture.create_view(&wgpu::TextureViewDescriptor::default());
        let sampler = device.create_sampler(&wgpu::SamplerDescriptor {
            label: Some(&format!("{} Sampler", label)),
            address_mode_u: desc.wrap_s.into(),
            address_mode_v: desc.wrap_t.into(),
            address_mode_w: wgpu::AddressMode::ClampToEdge,
            mag_filter: wgpu::FilterMode::Linear,
            min_filter: wgpu::FilterMode::Linear,
            mipmap_filter: wgpu::FilterMode::Linear,
            ..Default::default()
        });

        log::debug!(
            "Uploaded texture '{}' ({}x{}, {} mips)",
            label,
            width,
            height,
            chain.len()
        );

        Self {
            texture,
            view,
            sampler,
        }
    }

    /// 1x1 texture of a single colour, bound where a material has no map
    pub fn solid(device: &wgpu::Device, queue: &wgpu::Queue, rgba: [u8; 4], label: &str) -> Self {
        let image = RgbaImage::from_pixel(1, 1, image::Rgba(rgba));
        let desc = TextureDesc::linear(label);
        Self::from_image(device, queue, image, &desc, label)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mip_count_reaches_one_texel() {
        assert_eq!(mip_level_count(1, 1), 1);
        assert_eq!(mip_level_count(1024, 1024), 11);
        assert_eq!(mip_level_count(1024, 256), 11);
        assert_eq!(mip_level_count(3, 5), 3);
    }

    #[test]
    fn mip_chain_halves_each_level() {
        let base = RgbaImage::from_pixel(8, 2, image::Rgba([200, 100, 50, 255]));
        let chain = generate_mip_chain(base, ColorSpace::Srgb);
        let sizes: Vec<(u32, u32)> = chain.iter().map(|m| m.dimensions()).collect();
        assert_eq!(sizes, vec![(8, 2), (4, 1), (2, 1), (1, 1)]);
        // A flat colour stays flat through filtering
        assert_eq!(chain[3].get_pixel(0, 0).0, [200, 100, 50, 255]);
    }

    #[test]
    fn colour_mips_average_light_not_encoded_values() {
        let mut base = RgbaImage::new(2, 1);
        base.put_pixel(0, 0, image::Rgba([0, 0, 0, 0]));
        base.put_pixel(1, 0, image::Rgba([255, 255, 255, 255]));

        let colour = generate_mip_chain(base.clone(), ColorSpace::Srgb);
        let [r, _, _, a] = colour[1].get_pixel(0, 0).0;
        // half the light of white encodes to about 0.735
        assert!((186..=189).contains(&r), "got {r}");
        assert!((127..=128).contains(&a));

        let data = generate_mip_chain(base, ColorSpace::Linear);
        let [r, _, _, _] = data[1].get_pixel(0, 0).0;
        assert!((127..=128).contains(&r), "got {r}");
    }

    #[test]
    fn colour_maps_are_srgb() {
        assert_eq!(
            TextureDesc::srgb("door/color.webp").format(),
            wgpu::TextureFormat::Rgba8UnormSrgb
        );
        let data = TextureDesc::linear("door/height.webp").with_repeat(8.0, 8.0);
        assert_eq!(data.format(), wgpu::TextureFormat::Rgba8Unorm);
        assert_eq!(data.repeat, [8.0, 8.0]);
        assert!(data.flip_y);
        assert_eq!(data.wrap_s, Wrap::Clamp);
    }
}
