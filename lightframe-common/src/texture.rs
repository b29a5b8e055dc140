//! Texture-upload format mapping
//!
//! Bridges decoded images to whatever graphics backend uploads them: a
//! decoded [`PixelFormat`] picks a sized internal format plus the matching
//! client data layout, and [`mip_level_count`] sizes a full mip chain.
//! The actual upload call lives in the backend, not here.

use lightframe_tga::{PixelFormat, Tga};

/// Sized internal format requested from the graphics API
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InternalFormat {
    R8,
    Rg8,
    Rgb8,
    Rgba8,
}

/// Layout of the client pixel data handed to the upload call
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExternalFormat {
    Red,
    RedGreen,
    Bgr,
    Bgra,
}

/// Internal/external format pair for a decoded pixel format.
///
/// One gray byte uploads as a single red channel, gray+alpha as red/green;
/// the shader swizzles from there. BGR/BGRA upload as-is against an RGB
/// internal format, no CPU-side channel reorder.
pub fn texture_formats(format: PixelFormat) -> (InternalFormat, ExternalFormat) {
    match format {
        PixelFormat::Luminance => (InternalFormat::R8, ExternalFormat::Red),
        PixelFormat::LuminanceAlpha => (InternalFormat::Rg8, ExternalFormat::RedGreen),
        PixelFormat::Bgr => (InternalFormat::Rgb8, ExternalFormat::Bgr),
        PixelFormat::Bgra => (InternalFormat::Rgba8, ExternalFormat::Bgra),
    }
}

/// Mip levels in a full chain down to 1x1, counted over the larger
/// dimension
pub fn mip_level_count(width: u16, height: u16) -> u32 {
    let mut levels = 1;
    let mut size = u32::from(width.max(height));
    while size > 1 {
        levels += 1;
        size /= 2;
    }
    levels
}

/// Everything an upload backend needs from a decoded image
#[derive(Debug, Clone, Copy)]
pub struct UploadDesc<'a> {
    pub width: u16,
    pub height: u16,
    pub internal_format: InternalFormat,
    pub external_format: ExternalFormat,
    pub mip_levels: u32,
    pub pixels: &'a [u8],
}

impl<'a> UploadDesc<'a> {
    /// Describe an upload of `image`, with a full mip chain if `mipmapped`
    pub fn new(image: &'a Tga, mipmapped: bool) -> Self {
        let (internal_format, external_format) = texture_formats(image.pixel_format);
        Self {
            width: image.width,
            height: image.height,
            internal_format,
            external_format,
            mip_levels: if mipmapped {
                mip_level_count(image.width, image.height)
            } else {
                1
            },
            pixels: &image.pixels,
        }
    }
}

// ============================================================================
// Tests
// ============================================================================
