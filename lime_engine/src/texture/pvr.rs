/// PowerVR texture container reader (version 3 and the legacy 52-byte header)

use std::io::Read;
use glam::UVec2;
use crate::error::Result;
use crate::graphics_device::{CompressedFormat, PixelFormat};
use crate::texture::texture_data::{
    check_dimensions, level_bytes, read_bytes, read_u32, read_u64, skip, MIN_MIP_SIDE,
};
use crate::texture::{DecodedImage, MipLevel, TextureFormat};
use crate::engine_bail;

/// Version field of a v3 header
pub const PVR_MAGIC: u32 = 0x0352_5650;

/// Header length field of a legacy (v2) header
pub const PVR_LEGACY_HEADER_LENGTH: u32 = 52;

const fn channel_format(channels: &[u8], bits: &[u8]) -> u64 {
    let mut value = 0u64;
    let mut i = 0;
    while i < channels.len() {
        value |= (channels[i] as u64) << (8 * i);
        value |= (bits[i] as u64) << (32 + 8 * i);
        i += 1;
    }
    value
}

const PVR3_PVRTC_2BPP_RGB: u64 = 0;
const PVR3_PVRTC_2BPP_RGBA: u64 = 1;
const PVR3_PVRTC_4BPP_RGB: u64 = 2;
const PVR3_PVRTC_4BPP_RGBA: u64 = 3;
const PVR3_ETC1: u64 = 6;
const PVR3_RGBA8888: u64 = channel_format(b"rgba", &[8, 8, 8, 8]);
const PVR3_RGBA4444: u64 = channel_format(b"rgba", &[4, 4, 4, 4]);
const PVR3_RGB565: u64 = channel_format(b"rgb", &[5, 6, 5]);

const LEGACY_PVRTC_2: u32 = 0x0C;
const LEGACY_PVRTC_4: u32 = 0x0D;
const LEGACY_GL_ARGB_4444: u32 = 0x10;
const LEGACY_GL_ARGB_8888: u32 = 0x12;
const LEGACY_GL_RGB_565: u32 = 0x13;

fn v3_format(pixel_format: u64) -> Option<TextureFormat> {
    Some(match pixel_format {
        PVR3_PVRTC_2BPP_RGB | PVR3_PVRTC_2BPP_RGBA => TextureFormat::Compressed(CompressedFormat::Pvrtc2Bpp),
        PVR3_PVRTC_4BPP_RGB | PVR3_PVRTC_4BPP_RGBA => TextureFormat::Compressed(CompressedFormat::Pvrtc4Bpp),
        PVR3_ETC1 => TextureFormat::Compressed(CompressedFormat::Etc1),
        PVR3_RGBA8888 => TextureFormat::Uncompressed(PixelFormat::Rgba8),
        PVR3_RGBA4444 => TextureFormat::Uncompressed(PixelFormat::Rgba4444),
        PVR3_RGB565 => TextureFormat::Uncompressed(PixelFormat::Rgb565),
        _ => return None,
    })
}

fn legacy_format(flags: u32) -> Option<TextureFormat> {
    Some(match flags & 0xFF {
        LEGACY_PVRTC_2 => TextureFormat::Compressed(CompressedFormat::Pvrtc2Bpp),
        LEGACY_PVRTC_4 => TextureFormat::Compressed(CompressedFormat::Pvrtc4Bpp),
        LEGACY_GL_ARGB_4444 => TextureFormat::Uncompressed(PixelFormat::Rgba4444),
        LEGACY_GL_ARGB_8888 => TextureFormat::Uncompressed(PixelFormat::Rgba8),
        LEGACY_GL_RGB_565 => TextureFormat::Uncompressed(PixelFormat::Rgb565),
        _ => return None,
    })
}

fn read_levels<R: Read + ?Sized>(
    reader: &mut R,
    format: TextureFormat,
    width: u32,
    height: u32,
    level_count: u32,
) -> Result<Vec<MipLevel>> {
    check_dimensions("lime::PvrDecoder", width, height)?;
    let mut levels = Vec::new();
    let (mut level_width, mut level_height) = (width, height);
    for level in 0..level_count {
        if level > 0 && (level_width < MIN_MIP_SIDE || level_height < MIN_MIP_SIDE) {
            break;
        }
        let size = level_bytes("lime::PvrDecoder", format, level_width, level_height)?;
        let data = read_bytes(reader, size)?;
        levels.push(MipLevel { width: level_width, height: level_height, data });
        level_width = (level_width / 2).max(1);
        level_height = (level_height / 2).max(1);
    }
    Ok(levels)
}

/// Decode a PVR stream positioned at its first header field
pub fn decode<R: Read + ?Sized>(reader: &mut R) -> Result<DecodedImage> {
    match read_u32(reader)? {
        PVR_MAGIC => decode_v3(reader),
        PVR_LEGACY_HEADER_LENGTH => decode_legacy(reader),
        other => engine_bail!(InvalidData, "lime::PvrDecoder", "Invalid PVR header 0x{:08X}", other),
    }
}

fn decode_v3<R: Read + ?Sized>(reader: &mut R) -> Result<DecodedImage> {
    let _flags = read_u32(reader)?;
    let pixel_format = read_u64(reader)?;
    let _color_space = read_u32(reader)?;
    let _channel_type = read_u32(reader)?;
    let height = read_u32(reader)?;
    let width = read_u32(reader)?;
    let _depth = read_u32(reader)?;
    let _surfaces = read_u32(reader)?;
    let _faces = read_u32(reader)?;
    let mip_count = read_u32(reader)?.max(1);
    let metadata_size = read_u32(reader)?;
    skip(reader, metadata_size as u64)?;

    let Some(format) = v3_format(pixel_format) else {
        engine_bail!(UnsupportedFormat, "lime::PvrDecoder",
            "Unsupported PVR pixel format 0x{:016X}", pixel_format);
    };
    let levels = read_levels(reader, format, width, height, mip_count)?;
    Ok(DecodedImage {
        format,
        image_size: UVec2::new(width, height),
        surface_size: UVec2::new(width, height),
        levels,
    })
}

fn decode_legacy<R: Read + ?Sized>(reader: &mut R) -> Result<DecodedImage> {
    let height = read_u32(reader)?;
    let width = read_u32(reader)?;
    let mipmaps = read_u32(reader)?;
    let flags = read_u32(reader)?;
    // dataLength, bpp, four bitmasks, pvrTag, numSurfs
    skip(reader, 8 * 4)?;

    let Some(format) = legacy_format(flags) else {
        engine_bail!(UnsupportedFormat, "lime::PvrDecoder",
            "Unsupported legacy PVR format 0x{:02X}", flags & 0xFF);
    };
    // The legacy header counts mip levels below the base one
    let levels = read_levels(reader, format, width, height, mipmaps.saturating_add(1))?;
    Ok(DecodedImage {
        format,
        image_size: UVec2::new(width, height),
        surface_size: UVec2::new(width, height),
        levels,
    })
}
