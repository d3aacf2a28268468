/// KTX (version 1) container reader
///
/// Only plain 2D textures are accepted: no arrays, cubemaps or volumes.
/// Every mip level stored in the file is read.

use std::io::Read;
use glam::UVec2;
use crate::error::Result;
use crate::graphics_device::{CompressedFormat, PixelFormat};
use crate::texture::texture_data::{check_dimensions, read_bytes, read_u32, skip};
use crate::texture::{DecodedImage, MipLevel, TextureFormat};
use crate::engine_bail;

/// First four identifier bytes (`0xAB 'K' 'T' 'X'`) as a little-endian u32
pub const KTX_MAGIC: u32 = 0x5854_4BAB;

const IDENTIFIER: [u8; 12] = [0xAB, b'K', b'T', b'X', b' ', b'1', b'1', 0xBB, b'\r', b'\n', 0x1A, b'\n'];
const ENDIANNESS: u32 = 0x0403_0201;

const GL_ETC1_RGB8_OES: u32 = 0x8D64;
const GL_COMPRESSED_RGB8_ETC2: u32 = 0x9274;
const GL_COMPRESSED_RGB8_PUNCHTHROUGH_ALPHA1_ETC2: u32 = 0x9276;
const GL_COMPRESSED_RGBA8_ETC2_EAC: u32 = 0x9278;
const GL_RGB: u32 = 0x1907;
const GL_RGBA: u32 = 0x1908;
const GL_UNSIGNED_BYTE: u32 = 0x1401;
const GL_UNSIGNED_SHORT_4_4_4_4: u32 = 0x8033;
const GL_UNSIGNED_SHORT_5_5_5_1: u32 = 0x8034;
const GL_UNSIGNED_SHORT_5_6_5: u32 = 0x8363;

/// Map the header's GL enums onto an upload format
pub fn convert_gl_format(
    internal_format: u32,
    base_internal_format: u32,
    format: u32,
    gl_type: u32,
) -> Option<TextureFormat> {
    let compressed = match internal_format {
        GL_ETC1_RGB8_OES => Some(CompressedFormat::Etc1),
        GL_COMPRESSED_RGB8_ETC2 => Some(CompressedFormat::Etc2Rgb8),
        GL_COMPRESSED_RGB8_PUNCHTHROUGH_ALPHA1_ETC2 => Some(CompressedFormat::Etc2Rgb8A1),
        GL_COMPRESSED_RGBA8_ETC2_EAC => Some(CompressedFormat::Etc2Rgba8),
        _ => None,
    };
    if let Some(compressed) = compressed {
        return Some(TextureFormat::Compressed(compressed));
    }
    if base_internal_format != format {
        return None;
    }
    let pixel = match (format, gl_type) {
        (GL_RGB, GL_UNSIGNED_BYTE) => PixelFormat::Rgb8,
        (GL_RGBA, GL_UNSIGNED_BYTE) => PixelFormat::Rgba8,
        (GL_RGB, GL_UNSIGNED_SHORT_5_6_5) => PixelFormat::Rgb565,
        (GL_RGBA, GL_UNSIGNED_SHORT_5_5_5_1) => PixelFormat::Rgba5551,
        (GL_RGBA, GL_UNSIGNED_SHORT_4_4_4_4) => PixelFormat::Rgba4444,
        _ => return None,
    };
    Some(TextureFormat::Uncompressed(pixel))
}

/// Number of levels in a full mip chain for `width` x `height`
pub fn full_mip_count(width: u32, height: u32) -> u32 {
    32 - width.max(height).max(1).leading_zeros()
}

/// Decode a KTX stream positioned at its identifier
pub fn decode<R: Read + ?Sized>(reader: &mut R) -> Result<DecodedImage> {
    let identifier = read_bytes(reader, IDENTIFIER.len())?;
    if identifier[1..4] != IDENTIFIER[1..4] {
        engine_bail!(InvalidData, "lime::KtxDecoder", "Invalid KTX header");
    }
    let endianness = read_u32(reader)?;
    if endianness != ENDIANNESS {
        engine_bail!(InvalidData, "lime::KtxDecoder", "Unsupported endianness 0x{:08X}", endianness);
    }
    let gl_type = read_u32(reader)?;
    let _gl_type_size = read_u32(reader)?;
    let gl_format = read_u32(reader)?;
    let gl_internal_format = read_u32(reader)?;
    let gl_base_internal_format = read_u32(reader)?;
    let width = read_u32(reader)?;
    let height = read_u32(reader)?;
    let depth = read_u32(reader)?;
    let array_elements = read_u32(reader)?;
    let faces = read_u32(reader)?;
    let mip_count = read_u32(reader)?.max(1);
    let key_value_bytes = read_u32(reader)?;
    skip(reader, key_value_bytes as u64)?;

    if array_elements != 0 {
        engine_bail!(UnsupportedFormat, "lime::KtxDecoder", "Array textures are not supported");
    }
    if faces != 1 {
        engine_bail!(UnsupportedFormat, "lime::KtxDecoder", "Cubemap textures are not supported");
    }
    if depth != 0 {
        engine_bail!(UnsupportedFormat, "lime::KtxDecoder", "3D textures are not supported");
    }
    check_dimensions("lime::KtxDecoder", width, height)?;
    if width & 3 != 0 || height & 3 != 0 {
        engine_bail!(InvalidData, "lime::KtxDecoder",
            "Texture dimensions should be a multiple of 4, got {}x{}", width, height);
    }
    if mip_count > 1 && mip_count != full_mip_count(width, height) {
        engine_bail!(InvalidData, "lime::KtxDecoder",
            "Inconsistent mip count {} for {}x{}", mip_count, width, height);
    }
    let format = convert_gl_format(gl_internal_format, gl_base_internal_format, gl_format, gl_type)
        .ok_or_else(|| crate::engine_err!(UnsupportedFormat, "lime::KtxDecoder",
            "Unknown GL format (internal 0x{:04X}, format 0x{:04X}, type 0x{:04X})",
            gl_internal_format, gl_format, gl_type))?;

    let mut levels = Vec::with_capacity(mip_count as usize);
    for level in 0..mip_count {
        let level_width = (width >> level).max(1);
        let level_height = (height >> level).max(1);
        let size = read_u32(reader)? as usize;
        let data = read_bytes(reader, size)?;
        // Each level is padded to a 4-byte boundary
        let padding = (4 - size % 4) % 4;
        if padding > 0 && level + 1 < mip_count {
            skip(reader, padding as u64)?;
        }
        levels.push(MipLevel { width: level_width, height: level_height, data });
    }

    Ok(DecodedImage {
        format,
        image_size: UVec2::new(width, height),
        surface_size: UVec2::new(width, height),
        levels,
    })
}
