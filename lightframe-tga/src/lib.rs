//! TGA (Truevision) image codec for lightframe.
//!
//! Decodes all six TGA image variants into a tightly packed, top-to-bottom
//! pixel buffer ready for texture upload, and encodes uncompressed images
//! back out (screenshots use this). No graphics API calls live here - the
//! caller maps [`PixelFormat`] to whatever its backend wants.
//!
//! # File layout
//!
//! ```text
//! 0x00: header (18 bytes, all multi-byte fields little-endian)
//!   0x00: id_length u8
//!   0x01: color_map_type u8
//!   0x02: image_type u8 (1/2/3 raw, 9/10/11 RLE)
//!   0x03: color_map_origin u16
//!   0x05: color_map_length u16
//!   0x07: color_map_entry_size u8 (16/24/32 bits)
//!   0x08: x_origin u16, y_origin u16 (ignored)
//!   0x0C: width u16, height u16
//!   0x10: bits_per_pixel u8
//!   0x11: image_descriptor u8 (bit 5: rows stored bottom-to-top)
//! 0x12: image id field (id_length bytes)
//!       colour map (color_map_length entries, mapped types only)
//!       pixel data (raw scan or RLE packets)
//! ```
//!
//! 16-bit pixels and 16-bit colour map entries are 5-5-5 RGB words expanded
//! to 3-byte BGR by shifting each channel up 3 bits. 24/32-bit data is kept
//! in file byte order (BGR/BGRA) - no channel swizzling.
//!
//! # Usage
//!
//! ```no_run
//! use lightframe_tga::Tga;
//!
//! let image = Tga::load("assets/light_probe.tga")?;
//! assert_eq!(
//!     image.pixels.len(),
//!     image.width as usize * image.height as usize
//!         * image.pixel_format.bytes_per_pixel(),
//! );
//! # Ok::<(), lightframe_tga::TgaError>(())
//! ```

use std::path::{Path, PathBuf};

mod decode;
mod encode;

// =============================================================================
// Constants
// =============================================================================

/// Image type code: colour-mapped, uncompressed
pub const TGA_TYPE_COLOR_MAPPED: u8 = 1;

/// Image type code: truecolor, uncompressed
pub const TGA_TYPE_TRUECOLOR: u8 = 2;

/// Image type code: grayscale, uncompressed
pub const TGA_TYPE_LUMINANCE: u8 = 3;

/// Image type code: colour-mapped, run-length encoded
pub const TGA_TYPE_COLOR_MAPPED_RLE: u8 = 9;

/// Image type code: truecolor, run-length encoded
pub const TGA_TYPE_TRUECOLOR_RLE: u8 = 10;

/// Image type code: grayscale, run-length encoded
pub const TGA_TYPE_LUMINANCE_RLE: u8 = 11;

/// Descriptor bit 5: pixel rows are stored bottom-to-top
pub const TGA_DESCRIPTOR_FLIP: u8 = 0x20;

// =============================================================================
// Pixel format
// =============================================================================

/// Layout of the decoded pixel buffer.
///
/// 24/32-bit TGA data is stored blue-first, so the two truecolor variants
/// are BGR/BGRA rather than RGB/RGBA.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PixelFormat {
    /// One gray byte per pixel
    Luminance,
    /// Gray + alpha, two bytes per pixel
    LuminanceAlpha,
    /// Blue, green, red - three bytes per pixel
    Bgr,
    /// Blue, green, red, alpha - four bytes per pixel
    Bgra,
}

impl PixelFormat {
    /// Bytes of pixel data per pixel
    #[inline]
    pub const fn bytes_per_pixel(self) -> usize {
        match self {
            PixelFormat::Luminance => 1,
            PixelFormat::LuminanceAlpha => 2,
            PixelFormat::Bgr => 3,
            PixelFormat::Bgra => 4,
        }
    }
}

// =============================================================================
// Header
// =============================================================================

/// The fixed 18-byte TGA file header.
///
/// Transient: it drives decode dispatch and is rebuilt from scratch when
/// encoding, but is not retained on [`Tga`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TgaHeader {
    pub id_length: u8,
    pub color_map_type: u8,
    pub image_type: u8,
    pub color_map_origin: u16,
    pub color_map_length: u16,
    pub color_map_entry_size: u8,
    pub x_origin: u16,
    pub y_origin: u16,
    pub width: u16,
    pub height: u16,
    pub bits_per_pixel: u8,
    pub image_descriptor: u8,
}

impl TgaHeader {
    pub const SIZE: usize = 18;

    /// Read a header from the start of `bytes`
    pub fn from_bytes(bytes: &[u8]) -> Option<Self> {
        if bytes.len() < Self::SIZE {
            return None;
        }
        Some(Self {
            id_length: bytes[0],
            color_map_type: bytes[1],
            image_type: bytes[2],
            color_map_origin: u16::from_le_bytes([bytes[3], bytes[4]]),
            color_map_length: u16::from_le_bytes([bytes[5], bytes[6]]),
            color_map_entry_size: bytes[7],
            x_origin: u16::from_le_bytes([bytes[8], bytes[9]]),
            y_origin: u16::from_le_bytes([bytes[10], bytes[11]]),
            width: u16::from_le_bytes([bytes[12], bytes[13]]),
            height: u16::from_le_bytes([bytes[14], bytes[15]]),
            bits_per_pixel: bytes[16],
            image_descriptor: bytes[17],
        })
    }

    /// Write the header to bytes
    pub fn to_bytes(&self) -> [u8; Self::SIZE] {
        let mut b = [0u8; Self::SIZE];
        b[0] = self.id_length;
        b[1] = self.color_map_type;
        b[2] = self.image_type;
        b[3..5].copy_from_slice(&self.color_map_origin.to_le_bytes());
        b[5..7].copy_from_slice(&self.color_map_length.to_le_bytes());
        b[7] = self.color_map_entry_size;
        b[8..10].copy_from_slice(&self.x_origin.to_le_bytes());
        b[10..12].copy_from_slice(&self.y_origin.to_le_bytes());
        b[12..14].copy_from_slice(&self.width.to_le_bytes());
        b[14..16].copy_from_slice(&self.height.to_le_bytes());
        b[16] = self.bits_per_pixel;
        b[17] = self.image_descriptor;
        b
    }

    /// Descriptor bit 5: rows are stored bottom-to-top and need flipping
    #[inline]
    pub fn vertical_flip(&self) -> bool {
        self.image_descriptor & TGA_DESCRIPTOR_FLIP != 0
    }
}

// =============================================================================
// Error types
// =============================================================================

/// Decode/encode failure tied to a source file.
///
/// Every failure names the file it came from; the underlying cause is the
/// `source` of the variant.
#[derive(Debug, thiserror::Error)]
pub enum TgaError {
    /// File could not be opened, read or written
    #[error("in file {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// File contents are not decodable TGA data
    #[error("in file {}: {source}", .path.display())]
    Format {
        path: PathBuf,
        #[source]
        source: FormatError,
    },
}

/// Malformed or unsupported TGA data
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum FormatError {
    /// Width or height is zero
    #[error("invalid TGA dimensions")]
    InvalidDimensions,

    /// Image type code is not one of 1/2/3/9/10/11
    #[error("unknown TGA image type code {0}")]
    UnknownImageType(u8),

    /// Bits-per-pixel value unsupported for this image type
    #[error("invalid TGA bits per pixel amount: {0}")]
    InvalidBitsPerPixel(u8),

    /// Colour map declared empty, or a pixel indexes past its end
    #[error("invalid TGA colour map size")]
    InvalidColorMapSize,

    /// Colour-mapped images must carry a zero descriptor byte
    #[error("invalid TGA image descriptor byte")]
    InvalidDescriptor,

    /// File ended before all pixel data was read
    #[error("unexpected end of TGA data")]
    UnexpectedEof,
}

// =============================================================================
// Decoded image
// =============================================================================

/// A decoded TGA image.
///
/// `pixels` holds exactly `width * height * bytes_per_pixel` bytes,
/// row-major, top row first (bottom-to-top files are flipped during
/// decode). The buffer is exclusively owned; a failed decode never hands
/// out a partially filled image.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Tga {
    pub width: u16,
    pub height: u16,
    pub pixel_format: PixelFormat,
    pub pixels: Vec<u8>,
}

impl Tga {
    /// Decode a TGA file from disk.
    ///
    /// # Errors
    /// [`TgaError::Io`] if the file cannot be read, [`TgaError::Format`]
    /// if its contents are not valid TGA data. Both carry the path.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, TgaError> {
        let path = path.as_ref();
        let bytes = std::fs::read(path).map_err(|source| TgaError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let image = Self::from_bytes(&bytes).map_err(|source| TgaError::Format {
            path: path.to_path_buf(),
            source,
        })?;
        log::debug!(
            "decoded TGA {}: {}x{} {:?}",
            path.display(),
            image.width,
            image.height,
            image.pixel_format,
        );
        Ok(image)
    }

    /// Decode a TGA image from an in-memory byte stream.
    ///
    /// # Errors
    /// Returns [`FormatError`] if the data is malformed, truncated, or uses
    /// an unsupported variant.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, FormatError> {
        decode::decode(bytes)
    }

    /// Encode as an uncompressed TGA file (type 2 for BGR/BGRA, type 3 for
    /// grayscale).
    pub fn to_bytes(&self) -> Vec<u8> {
        encode::encode(self)
    }

    /// Encode and write to disk.
    ///
    /// # Errors
    /// [`TgaError::Io`] if the file cannot be written.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), TgaError> {
        let path = path.as_ref();
        std::fs::write(path, self.to_bytes()).map_err(|source| TgaError::Io {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Pixel buffer length implied by the dimensions and format
    #[inline]
    pub fn expected_len(&self) -> usize {
        self.width as usize * self.height as usize * self.pixel_format.bytes_per_pixel()
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_header_size() {
        assert_eq!(TgaHeader::SIZE, 18);
    }

    #[test]
    fn test_header_roundtrip() {
        let header = TgaHeader {
            id_length: 5,
            color_map_type: 1,
            image_type: TGA_TYPE_COLOR_MAPPED,
            color_map_origin: 2,
            color_map_length: 256,
            color_map_entry_size: 24,
            x_origin: 0,
            y_origin: 0,
            width: 640,
            height: 480,
            bits_per_pixel: 8,
            image_descriptor: 0,
        };
        let bytes = header.to_bytes();
        assert_eq!(TgaHeader::from_bytes(&bytes), Some(header));
    }

    #[test]
    fn test_header_fields_little_endian() {
        let mut bytes = [0u8; 18];
        bytes[2] = TGA_TYPE_TRUECOLOR;
        bytes[12] = 0x34;
        bytes[13] = 0x12;
        bytes[14] = 0x78;
        bytes[15] = 0x56;
        bytes[16] = 24;
        let header = TgaHeader::from_bytes(&bytes).unwrap();
        assert_eq!(header.width, 0x1234);
        assert_eq!(header.height, 0x5678);
    }

    #[test]
    fn test_header_too_short() {
        assert!(TgaHeader::from_bytes(&[0u8; 17]).is_none());
    }

    #[test]
    fn test_bytes_per_pixel() {
        assert_eq!(PixelFormat::Luminance.bytes_per_pixel(), 1);
        assert_eq!(PixelFormat::LuminanceAlpha.bytes_per_pixel(), 2);
        assert_eq!(PixelFormat::Bgr.bytes_per_pixel(), 3);
        assert_eq!(PixelFormat::Bgra.bytes_per_pixel(), 4);
    }

    #[test]
    fn test_unknown_type_message_names_the_code() {
        let message = FormatError::UnknownImageType(4).to_string();
        assert!(message.starts_with("unknown"), "{message}");
        assert!(message.contains('4'), "{message}");
    }

    #[test]
    fn test_load_missing_file_wraps_path() {
        let err = Tga::load("no/such/image.tga").unwrap_err();
        match err {
            TgaError::Io { ref path, .. } => {
                assert_eq!(path, Path::new("no/such/image.tga"));
            }
            other => panic!("expected Io error, got {other:?}"),
        }
        assert!(err.to_string().contains("no/such/image.tga"));
    }

    #[test]
    fn test_load_malformed_file_wraps_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bad.tga");
        std::fs::write(&path, [0u8; 4]).unwrap();

        let err = Tga::load(&path).unwrap_err();
        match err {
            TgaError::Format {
                source: FormatError::UnexpectedEof,
                ..
            } => {}
            other => panic!("expected Format/UnexpectedEof, got {other:?}"),
        }
        assert!(err.to_string().contains("bad.tga"));
    }

    #[test]
    fn test_save_and_load_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("shot.tga");

        let image = Tga {
            width: 2,
            height: 1,
            pixel_format: PixelFormat::Bgr,
            pixels: vec![10, 20, 30, 40, 50, 60],
        };
        image.save(&path).unwrap();

        let reloaded = Tga::load(&path).unwrap();
        assert_eq!(reloaded, image);
    }
}
