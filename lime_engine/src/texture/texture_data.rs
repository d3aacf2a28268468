/// Decoded texture payloads and little-endian header reading helpers

use std::io::Read;
use glam::{UVec2, Vec2};
use crate::error::Result;
use crate::graphics_device::{CompressedFormat, PixelFormat};
use crate::engine_bail;

/// Smallest mip side read after level 0; smaller levels are skipped
pub const MIN_MIP_SIDE: u32 = 8;

/// Largest texture side a container header may declare
pub const MAX_TEXTURE_SIDE: u32 = 65536;

/// Upload format of a decoded texture
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextureFormat {
    Uncompressed(PixelFormat),
    Compressed(CompressedFormat),
}

impl TextureFormat {
    /// Byte size of a `width` x `height` level in this format, `None` on overflow
    pub fn level_size(&self, width: u32, height: u32) -> Option<usize> {
        match self {
            TextureFormat::Uncompressed(format) => format.level_size(width, height),
            TextureFormat::Compressed(format) => format.level_size(width, height),
        }
    }
}

/// One mip level ready for upload
#[derive(Debug, Clone, PartialEq)]
pub struct MipLevel {
    pub width: u32,
    pub height: u32,
    pub data: Vec<u8>,
}

/// Fully parsed texture, independent of any context
#[derive(Debug, Clone, PartialEq)]
pub struct DecodedImage {
    pub format: TextureFormat,
    /// Size of the meaningful pixels
    pub image_size: UVec2,
    /// Size of the allocated surface (power-of-two padding may make it larger)
    pub surface_size: UVec2,
    pub levels: Vec<MipLevel>,
}

impl DecodedImage {
    /// Single-level RGBA8 image whose surface matches its size
    pub fn rgba8(width: u32, height: u32, data: Vec<u8>) -> Self {
        Self {
            format: TextureFormat::Uncompressed(PixelFormat::Rgba8),
            image_size: UVec2::new(width, height),
            surface_size: UVec2::new(width, height),
            levels: vec![MipLevel { width, height, data }],
        }
    }

    /// Bytes held by every level
    pub fn memory_size(&self) -> usize {
        self.levels.iter().map(|level| level.data.len()).sum()
    }

    /// Maximum texture coordinate of the meaningful pixels
    pub fn uv_max(&self) -> Vec2 {
        if self.surface_size.x == 0 || self.surface_size.y == 0 {
            return Vec2::ONE;
        }
        self.image_size.as_vec2() / self.surface_size.as_vec2()
    }
}

// ===== HEADER READING =====

pub(crate) fn read_u32<R: Read + ?Sized>(reader: &mut R) -> Result<u32> {
    let mut bytes = [0u8; 4];
    reader.read_exact(&mut bytes)?;
    Ok(u32::from_le_bytes(bytes))
}

pub(crate) fn read_u64<R: Read + ?Sized>(reader: &mut R) -> Result<u64> {
    let mut bytes = [0u8; 8];
    reader.read_exact(&mut bytes)?;
    Ok(u64::from_le_bytes(bytes))
}

/// Reject header dimensions that are empty or too large to address
pub(crate) fn check_dimensions(source: &str, width: u32, height: u32) -> Result<()> {
    if width == 0 || height == 0 || width > MAX_TEXTURE_SIDE || height > MAX_TEXTURE_SIDE {
        engine_bail!(InvalidData, source,
            "Texture size {}x{} is outside 1..={}", width, height, MAX_TEXTURE_SIDE);
    }
    Ok(())
}

/// Byte size of one level of `format`, as an error when it cannot be represented
pub(crate) fn level_bytes(source: &str, format: TextureFormat, width: u32, height: u32) -> Result<usize> {
    match format.level_size(width, height) {
        Some(size) => Ok(size),
        None => engine_bail!(InvalidData, source,
            "Level size of {}x{} {:?} overflows", width, height, format),
    }
}

/// Initial buffer size of `read_bytes`
const READ_CHUNK: usize = 1 << 20;

/// Read exactly `length` bytes
///
/// The buffer grows with the data actually read, so a bogus length from a
/// header fails on the short stream instead of allocating up front.
pub(crate) fn read_bytes<R: Read + ?Sized>(reader: &mut R, length: usize) -> Result<Vec<u8>> {
    let mut data = Vec::with_capacity(length.min(READ_CHUNK));
    let read = (&mut *reader).take(length as u64).read_to_end(&mut data)?;
    if read < length {
        return Err(std::io::Error::from(std::io::ErrorKind::UnexpectedEof).into());
    }
    Ok(data)
}

pub(crate) fn skip<R: Read + ?Sized>(reader: &mut R, length: u64) -> Result<()> {
    let copied = std::io::copy(&mut (&mut *reader).take(length), &mut std::io::sink())?;
    if copied < length {
        return Err(std::io::Error::from(std::io::ErrorKind::UnexpectedEof).into());
    }
    Ok(())
}
