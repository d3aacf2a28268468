/// DDS container reader
///
/// Handles DXT1/DXT3/DXT5 block-compressed surfaces and uncompressed 32-bit
/// RGB(A) surfaces, which are converted to RGBA8 using the header channel masks.

use std::io::Read;
use glam::UVec2;
use crate::error::Result;
use crate::graphics_device::{CompressedFormat, PixelFormat};
use crate::texture::texture_data::{check_dimensions, level_bytes, read_bytes, read_u32, skip, MIN_MIP_SIDE};
use crate::texture::{DecodedImage, MipLevel, TextureFormat};
use crate::engine_bail;

/// "DDS " read as a little-endian u32
pub const DDS_MAGIC: u32 = 0x2053_4444;

const HEADER_SIZE: u32 = 124;

const fn four_cc(code: &[u8; 4]) -> u32 {
    u32::from_le_bytes(*code)
}

const FOURCC_DXT1: u32 = four_cc(b"DXT1");
const FOURCC_DXT3: u32 = four_cc(b"DXT3");
const FOURCC_DXT5: u32 = four_cc(b"DXT5");

const PF_ALPHA_PIXELS: u32 = 0x01;
const PF_FOURCC: u32 = 0x04;
const PF_RGB: u32 = 0x40;

/// Channel masks of an uncompressed surface
struct ChannelMasks {
    red: u32,
    green: u32,
    blue: u32,
    alpha: Option<u32>,
}

fn extract(pixel: u32, mask: u32) -> u8 {
    if mask == 0 {
        return 0;
    }
    let shifted = (pixel & mask) >> mask.trailing_zeros();
    let bits = mask.count_ones();
    if bits >= 8 {
        (shifted >> (bits - 8)) as u8
    } else {
        (shifted * 255 / ((1 << bits) - 1)) as u8
    }
}

fn convert_to_rgba8(data: &[u8], masks: &ChannelMasks) -> Vec<u8> {
    let mut rgba = Vec::with_capacity(data.len());
    for chunk in data.chunks_exact(4) {
        let pixel = u32::from_le_bytes([chunk[0], chunk[1], chunk[2], chunk[3]]);
        rgba.push(extract(pixel, masks.red));
        rgba.push(extract(pixel, masks.green));
        rgba.push(extract(pixel, masks.blue));
        rgba.push(masks.alpha.map_or(255, |mask| extract(pixel, mask)));
    }
    rgba
}

/// Decode a DDS stream positioned at its magic
pub fn decode<R: Read + ?Sized>(reader: &mut R) -> Result<DecodedImage> {
    let magic = read_u32(reader)?;
    let size = read_u32(reader)?;
    if magic != DDS_MAGIC || size != HEADER_SIZE {
        engine_bail!(InvalidData, "lime::DdsDecoder", "Invalid DDS file header");
    }
    let _flags = read_u32(reader)?;
    let height = read_u32(reader)?;
    let width = read_u32(reader)?;
    let _pitch_or_linear_size = read_u32(reader)?;
    let _depth = read_u32(reader)?;
    let mip_count = read_u32(reader)?.max(1);
    skip(reader, 11 * 4)?;
    check_dimensions("lime::DdsDecoder", width, height)?;

    // Pixel format block
    let _pf_size = read_u32(reader)?;
    let pf_flags = read_u32(reader)?;
    let pf_four_cc = read_u32(reader)?;
    let pf_rgb_bit_count = read_u32(reader)?;
    let masks = ChannelMasks {
        red: read_u32(reader)?,
        green: read_u32(reader)?,
        blue: read_u32(reader)?,
        alpha: Some(read_u32(reader)?),
    };

    // caps, caps2, caps3, caps4, reserved2
    skip(reader, 5 * 4)?;

    let (format, masks) = if pf_flags & PF_FOURCC != 0 {
        let format = match pf_four_cc {
            FOURCC_DXT1 => CompressedFormat::Dxt1,
            FOURCC_DXT3 => CompressedFormat::Dxt3,
            FOURCC_DXT5 => CompressedFormat::Dxt5,
            other => engine_bail!(UnsupportedFormat, "lime::DdsDecoder",
                "Unsupported DDS FourCC 0x{:08X}", other),
        };
        (TextureFormat::Compressed(format), None)
    } else if pf_flags & PF_RGB != 0 && pf_rgb_bit_count == 32 {
        let alpha = masks.alpha.filter(|&mask| pf_flags & PF_ALPHA_PIXELS != 0 && mask != 0);
        (TextureFormat::Uncompressed(PixelFormat::Rgba8), Some(ChannelMasks { alpha, ..masks }))
    } else {
        engine_bail!(UnsupportedFormat, "lime::DdsDecoder",
            "Unsupported DDS pixel format (flags 0x{:X}, {} bpp)", pf_flags, pf_rgb_bit_count);
    };

    let mut levels = Vec::new();
    let (mut level_width, mut level_height) = (width, height);
    for level in 0..mip_count {
        if level > 0 && (level_width < MIN_MIP_SIDE || level_height < MIN_MIP_SIDE) {
            break;
        }
        let size = level_bytes("lime::DdsDecoder", format, level_width, level_height)?;
        let data = match &masks {
            Some(masks) => convert_to_rgba8(&read_bytes(reader, size)?, masks),
            None => read_bytes(reader, size)?,
        };
        levels.push(MipLevel { width: level_width, height: level_height, data });
        level_width = (level_width / 2).max(1);
        level_height = (level_height / 2).max(1);
    }

    Ok(DecodedImage {
        format,
        image_size: UVec2::new(width, height),
        surface_size: UVec2::new(width, height),
        levels,
    })
}
