//! GPU textures: the depth buffer and per-body colour maps.

use std::path::Path;

use image::{imageops, RgbaImage};

use crate::error::OrreryError;

/// A texture with its default view and sampler.
pub struct TextureResource {
    pub texture: wgpu::Texture,
    pub view: wgpu::TextureView,
    pub sampler: wgpu::Sampler,
}

/// Depth attachment for the main pass.
pub struct DepthTexture {
    pub texture: wgpu::Texture,
    pub view: wgpu::TextureView,
}

impl TextureResource {
    pub const DEPTH_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Depth32Float;
    pub const COLOR_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Rgba8UnormSrgb;
    pub const DEPTH_USAGE: wgpu::TextureUsages = wgpu::TextureUsages::RENDER_ATTACHMENT;

    /// Creates a depth buffer sized to the surface. It is only ever a
    /// render attachment, so it carries no sampler.
    pub fn create_depth_texture(
        device: &wgpu::Device,
        config: &wgpu::SurfaceConfiguration,
        label: &str,
    ) -> DepthTexture {
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
            usage: Self::DEPTH_USAGE,
            view_formats: &[],
        });
        let view = texture.create_view(&wgpu::TextureViewDescriptor::default());

        DepthTexture { texture, view }
    }

    /// Decodes an image file into a mipmapped sRGB colour map.
    pub fn from_image_file(
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        path: &Path,
        label: &str,
    ) -> Result<Self, OrreryError> {
        let mut image = image::open(path)
            .map_err(|e| OrreryError::resource(format!("texture {}", path.display()), e))?
            .to_rgba8();

        let max_dimension = device.limits().max_texture_dimension_2d;
        let (width, height) = image.dimensions();
        if width > max_dimension || height > max_dimension {
            let scale = max_dimension as f32 / width.max(height) as f32;
            let fitted_width = ((width as f32 * scale) as u32).clamp(1, max_dimension);
            let fitted_height = ((height as f32 * scale) as u32).clamp(1, max_dimension);
            log::warn!(
                "{} is {}x{}, above the device limit; downscaling to {}x{}",
                path.display(),
                width,
                height,
                fitted_width,
                fitted_height
            );
            image = imageops::resize(
                &image,
                fitted_width,
                fitted_height,
                imageops::FilterType::Triangle,
            );
        }
        log::debug!(
            "Loaded {} ({}x{})",
            path.display(),
            image.width(),
            image.height()
        );
        Ok(Self::create_mipmapped(device, queue, &image, label))
    }

    /// Uploads an RGBA8 image with a full CPU-generated mip chain and a
    /// trilinear wrapping sampler.
    pub fn create_mipmapped(
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        image: &RgbaImage,
        label: &str,
    ) -> Self {
        let (width, height) = image.dimensions();
        let mip_level_count = mip_level_count(width, height);

        let texture = device.create_texture(&wgpu::TextureDescriptor {
            label: Some(label),
            size: wgpu::Extent3d {
                width,
                height,
                depth_or_array_layers: 1,
            },
            mip_level_count,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: Self::COLOR_FORMAT,
            usage: wgpu::TextureUsages::TEXTURE_BINDING | wgpu::TextureUsages::COPY_DST,
            view_formats: &[],
        });

        let mut level_image = image.clone();
        for mip_level in 0..mip_level_count {
            if mip_level > 0 {
                let (w, h) = mip_extent(width, height, mip_level);
                level_image = imageops::resize(&level_image, w, h, imageops::FilterType::Triangle);
            }
            let (w, h) = level_image.dimensions();
            queue.write_texture(
                wgpu::TexelCopyTextureInfo {
                    texture: &texture,
                    mip_level,
                    origin: wgpu::Origin3d::ZERO,
                    aspect: wgpu::TextureAspect::All,
                },
                level_image.as_raw(),
                wgpu::TexelCopyBufferLayout {
                    offset: 0,
                    bytes_per_row: Some(4 * w),
                    rows_per_image: Some(h),
                },
                wgpu::Extent3d {
                    width: w,
                    height: h,
                    depth_or_array_layers: 1,
                },
            );
        }

        let view = texture.create_view(&wgpu::TextureViewDescriptor::default());

        // Longitude wraps at the texture seam.
        let sampler = device.create_sampler(&wgpu::SamplerDescriptor {
            label: Some(&format!("{} Sampler", label)),
            address_mode_u: wgpu::AddressMode::Repeat,
            address_mode_v: wgpu::AddressMode::Repeat,
            address_mode_w: wgpu::AddressMode::Repeat,
            mag_filter: wgpu::FilterMode::Linear,
            min_filter: wgpu::FilterMode::Linear,
            mipmap_filter: wgpu::FilterMode::Linear,
            ..Default::default()
        });

        Self {
            texture,
            view,
            sampler,
        }
    }
}

/// Number of levels in a full mip chain down to 1x1.
pub fn mip_level_count(width: u32, height: u32) -> u32 {
    32 - width.max(height).max(1).leading_zeros()
}

/// Extent of `mip_level`, never smaller than one texel.
pub fn mip_extent(width: u32, height: u32, mip_level: u32) -> (u32, u32) {
    ((width >> mip_level).max(1), (height >> mip_level).max(1))
}
