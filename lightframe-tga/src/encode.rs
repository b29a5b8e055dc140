//! TGA encoder implementation.
//!
//! Writes the uncompressed variants only (type 2 for BGR/BGRA, type 3 for
//! grayscale): an 18-byte header and the raw pixel dump, top row first with
//! a zero descriptor byte. This is what the framework's screenshot path
//! produces, and anything written here decodes back losslessly.

use crate::{PixelFormat, TGA_TYPE_LUMINANCE, TGA_TYPE_TRUECOLOR, Tga, TgaHeader};

pub(crate) fn encode(image: &Tga) -> Vec<u8> {
    let bpp = image.pixel_format.bytes_per_pixel();
    debug_assert_eq!(image.pixels.len(), image.expected_len());

    let image_type = match image.pixel_format {
        PixelFormat::Luminance | PixelFormat::LuminanceAlpha => TGA_TYPE_LUMINANCE,
        PixelFormat::Bgr | PixelFormat::Bgra => TGA_TYPE_TRUECOLOR,
    };
    let header = TgaHeader {
        id_length: 0,
        color_map_type: 0,
        image_type,
        color_map_origin: 0,
        color_map_length: 0,
        color_map_entry_size: 0,
        x_origin: 0,
        y_origin: 0,
        width: image.width,
        height: image.height,
        bits_per_pixel: (bpp << 3) as u8,
        image_descriptor: 0,
    };

    let mut out = Vec::with_capacity(TgaHeader::SIZE + image.pixels.len());
    out.extend_from_slice(&header.to_bytes());
    out.extend_from_slice(&image.pixels);
    out
}

// =============================================================================
// Tests
// =============================================================================
