//! TGA decoder implementation.
//!
//! One parameterized scan handles all six image type codes: the packet
//! layer is either a flat raw scan or RLE packets, and the pixel source is
//! either direct bytes (with optional 5-5-5 expansion) or a colour map
//! lookup. The original format reference is
//! <http://paulbourke.net/dataformats/tga/>.

use crate::{
    FormatError, PixelFormat, TGA_TYPE_COLOR_MAPPED, TGA_TYPE_COLOR_MAPPED_RLE,
    TGA_TYPE_LUMINANCE, TGA_TYPE_LUMINANCE_RLE, TGA_TYPE_TRUECOLOR, TGA_TYPE_TRUECOLOR_RLE, Tga,
    TgaHeader,
};

/// Sequential reader over the in-memory file
struct Reader<'a> {
    bytes: &'a [u8],
    pos: usize,
}

impl<'a> Reader<'a> {
    fn new(bytes: &'a [u8]) -> Self {
        Self { bytes, pos: 0 }
    }

    fn skip(&mut self, count: usize) -> Result<(), FormatError> {
        self.read_exact(count).map(|_| ())
    }

    fn read_exact(&mut self, count: usize) -> Result<&'a [u8], FormatError> {
        let end = self.pos.checked_add(count).ok_or(FormatError::UnexpectedEof)?;
        let slice = self
            .bytes
            .get(self.pos..end)
            .ok_or(FormatError::UnexpectedEof)?;
        self.pos = end;
        Ok(slice)
    }

    fn read_u8(&mut self) -> Result<u8, FormatError> {
        Ok(self.read_exact(1)?[0])
    }

    fn read_u16_le(&mut self) -> Result<u16, FormatError> {
        let raw = self.read_exact(2)?;
        Ok(u16::from_le_bytes([raw[0], raw[1]]))
    }

    /// Little-endian colour map index of 1-4 bytes
    fn read_index(&mut self, bytes: usize) -> Result<usize, FormatError> {
        let raw = self.read_exact(bytes)?;
        let mut index = 0usize;
        for (i, &b) in raw.iter().enumerate() {
            index |= (b as usize) << (8 * i);
        }
        Ok(index)
    }
}

/// Pixel data packetization
#[derive(Clone, Copy, PartialEq, Eq)]
enum Packets {
    /// One pixel after another, `width * height` of them
    Raw,
    /// Packet header byte, then one repeated pixel or a literal block
    RunLength,
}

pub(crate) fn decode(bytes: &[u8]) -> Result<Tga, FormatError> {
    let mut r = Reader::new(bytes);
    let header = TgaHeader::from_bytes(r.read_exact(TgaHeader::SIZE)?)
        .ok_or(FormatError::UnexpectedEof)?;

    if header.width == 0 || header.height == 0 {
        return Err(FormatError::InvalidDimensions);
    }

    log::trace!(
        "TGA header: type {} {}x{} {}bpp descriptor {:#04x}",
        header.image_type,
        header.width,
        header.height,
        header.bits_per_pixel,
        header.image_descriptor,
    );

    let (pixel_format, mut pixels) = match header.image_type {
        TGA_TYPE_COLOR_MAPPED => decode_mapped(&mut r, &header, Packets::Raw)?,
        TGA_TYPE_COLOR_MAPPED_RLE => decode_mapped(&mut r, &header, Packets::RunLength)?,
        TGA_TYPE_TRUECOLOR => decode_truecolor(&mut r, &header, Packets::Raw)?,
        TGA_TYPE_TRUECOLOR_RLE => decode_truecolor(&mut r, &header, Packets::RunLength)?,
        TGA_TYPE_LUMINANCE => decode_luminance(&mut r, &header, Packets::Raw)?,
        TGA_TYPE_LUMINANCE_RLE => decode_luminance(&mut r, &header, Packets::RunLength)?,
        code => return Err(FormatError::UnknownImageType(code)),
    };

    // Normalize to top-to-bottom row order
    if header.vertical_flip() {
        flip_rows(
            &mut pixels,
            header.width as usize * pixel_format.bytes_per_pixel(),
        );
    }

    Ok(Tga {
        width: header.width,
        height: header.height,
        pixel_format,
        pixels,
    })
}

/// Bytes between the header and the pixel data of a non-mapped image.
///
/// `color_map_type` is zero for truecolor/grayscale files, so this normally
/// collapses to the id field alone; files that carry a stray colour map
/// anyway get it skipped. Identical for raw and RLE variants.
fn unmapped_data_offset(header: &TgaHeader) -> usize {
    header.id_length as usize
        + header.color_map_type as usize
            * (header.color_map_origin as usize
                + header.color_map_length as usize
                    * (header.color_map_entry_size >> 3) as usize)
}

fn decode_truecolor(
    r: &mut Reader<'_>,
    header: &TgaHeader,
    packets: Packets,
) -> Result<(PixelFormat, Vec<u8>), FormatError> {
    r.skip(unmapped_data_offset(header))?;

    let count = header.width as usize * header.height as usize;
    match header.bits_per_pixel {
        // 5-5-5 words expanded to BGR, not passed through
        16 => {
            let pixels = scan(r, count, 3, packets, |r, px| {
                px.copy_from_slice(&unpack_rgb555(r.read_u16_le()?));
                Ok(())
            })?;
            Ok((PixelFormat::Bgr, pixels))
        }
        24 => {
            let pixels = scan(r, count, 3, packets, copy_pixel)?;
            Ok((PixelFormat::Bgr, pixels))
        }
        32 => {
            let pixels = scan(r, count, 4, packets, copy_pixel)?;
            Ok((PixelFormat::Bgra, pixels))
        }
        bits => Err(FormatError::InvalidBitsPerPixel(bits)),
    }
}

fn decode_luminance(
    r: &mut Reader<'_>,
    header: &TgaHeader,
    packets: Packets,
) -> Result<(PixelFormat, Vec<u8>), FormatError> {
    r.skip(unmapped_data_offset(header))?;

    let count = header.width as usize * header.height as usize;
    let pixel_format = match header.bits_per_pixel {
        8 => PixelFormat::Luminance,
        16 => PixelFormat::LuminanceAlpha,
        bits => return Err(FormatError::InvalidBitsPerPixel(bits)),
    };
    let pixels = scan(
        r,
        count,
        pixel_format.bytes_per_pixel(),
        packets,
        copy_pixel,
    )?;
    Ok((pixel_format, pixels))
}

fn decode_mapped(
    r: &mut Reader<'_>,
    header: &TgaHeader,
    packets: Packets,
) -> Result<(PixelFormat, Vec<u8>), FormatError> {
    r.skip(header.color_map_origin as usize + header.id_length as usize)?;

    if header.image_descriptor != 0 {
        return Err(FormatError::InvalidDescriptor);
    }
    // bits_per_pixel is the palette index width here
    let bytes_per_index = (header.bits_per_pixel >> 3) as usize;
    if !(1..=4).contains(&bytes_per_index) {
        return Err(FormatError::InvalidBitsPerPixel(header.bits_per_pixel));
    }
    if header.color_map_length == 0 {
        return Err(FormatError::InvalidColorMapSize);
    }

    let (pixel_format, color_map) = load_color_map(r, header)?;
    let bpp = pixel_format.bytes_per_pixel();

    let count = header.width as usize * header.height as usize;
    let pixels = scan(r, count, bpp, packets, |r, px| {
        let index = r.read_index(bytes_per_index)?;
        let start = index * bpp;
        let entry = color_map
            .get(start..start + bpp)
            .ok_or(FormatError::InvalidColorMapSize)?;
        px.copy_from_slice(entry);
        Ok(())
    })?;
    Ok((pixel_format, pixels))
}

/// Load the colour map and the pixel format its entries decode to.
///
/// 16-bit entries are expanded to 3-byte BGR; 24/32-bit entries are copied
/// verbatim.
fn load_color_map(
    r: &mut Reader<'_>,
    header: &TgaHeader,
) -> Result<(PixelFormat, Vec<u8>), FormatError> {
    let length = header.color_map_length as usize;
    match header.color_map_entry_size {
        16 => {
            let mut map = Vec::with_capacity(length * 3);
            for _ in 0..length {
                map.extend_from_slice(&unpack_rgb555(r.read_u16_le()?));
            }
            Ok((PixelFormat::Bgr, map))
        }
        24 => {
            let map = r.read_exact(length * 3)?.to_vec();
            Ok((PixelFormat::Bgr, map))
        }
        32 => {
            let map = r.read_exact(length * 4)?.to_vec();
            Ok((PixelFormat::Bgra, map))
        }
        bits => Err(FormatError::InvalidBitsPerPixel(bits)),
    }
}

/// Decode `count` pixels of `bpp` bytes each through `next_pixel`.
///
/// `next_pixel` is the pixel source: direct bytes, a 5-5-5 expansion, or a
/// colour map lookup. RLE packets that run past the pixel count are
/// truncated to the expected length.
fn scan<F>(
    r: &mut Reader<'_>,
    count: usize,
    bpp: usize,
    packets: Packets,
    mut next_pixel: F,
) -> Result<Vec<u8>, FormatError>
where
    F: FnMut(&mut Reader<'_>, &mut [u8]) -> Result<(), FormatError>,
{
    let expected = count * bpp;
    let mut out = Vec::with_capacity(expected);
    let mut px = [0u8; 4];

    match packets {
        Packets::Raw => {
            for _ in 0..count {
                next_pixel(r, &mut px[..bpp])?;
                out.extend_from_slice(&px[..bpp]);
            }
        }
        Packets::RunLength => {
            let mut emitted = 0;
            while emitted < count {
                let packet = r.read_u8()?;
                let block = (packet & 0x7f) as usize + 1;
                if packet & 0x80 != 0 {
                    // run: one pixel repeated block times
                    next_pixel(r, &mut px[..bpp])?;
                    for _ in 0..block {
                        out.extend_from_slice(&px[..bpp]);
                    }
                } else {
                    // literal block
                    for _ in 0..block {
                        next_pixel(r, &mut px[..bpp])?;
                        out.extend_from_slice(&px[..bpp]);
                    }
                }
                emitted += block;
            }
            out.truncate(expected);
        }
    }
    Ok(out)
}

/// Direct pixel source: bytes exactly as stored
fn copy_pixel(r: &mut Reader<'_>, px: &mut [u8]) -> Result<(), FormatError> {
    px.copy_from_slice(r.read_exact(px.len())?);
    Ok(())
}

/// Expand a 5-5-5 RGB word to BGR bytes.
///
/// Left shift only; the low three bits stay zero to keep existing assets
/// bit-exact.
#[inline]
fn unpack_rgb555(word: u16) -> [u8; 3] {
    [
        ((word & 0x001f) << 3) as u8,
        (((word & 0x03e0) >> 5) << 3) as u8,
        (((word & 0x7c00) >> 10) << 3) as u8,
    ]
}

/// Swap row `y` with row `height - 1 - y`, whole rows at a time
fn flip_rows(pixels: &mut [u8], row_len: usize) {
    let height = pixels.len() / row_len;
    for y in 0..height / 2 {
        let (head, tail) = pixels.split_at_mut((height - 1 - y) * row_len);
        head[y * row_len..(y + 1) * row_len].swap_with_slice(&mut tail[..row_len]);
    }
}

// =============================================================================
// Tests
// =============================================================================
