/// Format sniffing and decode dispatch
///
/// The first four bytes of the stream select the container parser. The
/// decoded image is then adapted to what the context can sample: ETC data
/// is decoded in software when unsupported, and bitmaps are padded to
/// power-of-two surfaces when NPOT textures are unavailable.

use std::io::Read;
use crate::config::TextureConfig;
use crate::error::Result;
use crate::graphics_device::{Capabilities, PixelFormat};
use crate::texture::rewindable_reader::RewindableReader;
use crate::texture::{bitmap, dds, etc_decoder, ktx, pvr};
use crate::texture::{DecodedImage, MipLevel, TextureFormat};
use crate::{engine_bail, engine_debug, engine_warn};

/// Container detected from the leading bytes of a stream
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContainerKind {
    Dds,
    Ktx,
    Pvr,
    /// Anything else, handed to the PNG / JPEG decoder
    Bitmap,
}

impl ContainerKind {
    /// Classify a stream from its first four bytes
    pub fn sniff(head: &[u8]) -> Self {
        let Ok(head) = <[u8; 4]>::try_from(head) else {
            return ContainerKind::Bitmap;
        };
        match u32::from_le_bytes(head) {
            dds::DDS_MAGIC => ContainerKind::Dds,
            ktx::KTX_MAGIC => ContainerKind::Ktx,
            pvr::PVR_MAGIC | pvr::PVR_LEGACY_HEADER_LENGTH => ContainerKind::Pvr,
            _ => ContainerKind::Bitmap,
        }
    }
}

/// Decode any supported texture stream, ready for upload on this context
pub fn load<R: Read>(reader: R, capabilities: &Capabilities, config: &TextureConfig) -> Result<DecodedImage> {
    let mut reader = RewindableReader::new(reader);
    let mut head = Vec::with_capacity(4);
    (&mut reader).take(4).read_to_end(&mut head)?;
    reader.rewind()?;

    let kind = ContainerKind::sniff(&head);
    let image = match kind {
        ContainerKind::Dds => dds::decode(&mut reader)?,
        ContainerKind::Ktx => ktx::decode(&mut reader)?,
        ContainerKind::Pvr => pvr::decode(&mut reader)?,
        ContainerKind::Bitmap => bitmap::decode(&mut reader)?,
    };
    let image = prepare_for_upload(image, capabilities)?;

    let pad = kind == ContainerKind::Bitmap && (config.force_pot || !capabilities.supports_npot());
    Ok(if pad { bitmap::pad_to_power_of_two(image) } else { image })
}

/// Replace formats the context cannot sample with something it can
pub fn prepare_for_upload(image: DecodedImage, capabilities: &Capabilities) -> Result<DecodedImage> {
    let max_size = capabilities.max_texture_size();
    if max_size > 0 && (image.surface_size.x > max_size || image.surface_size.y > max_size) {
        engine_warn!("lime::TextureLoader",
            "Texture {}x{} exceeds the maximum texture size {}",
            image.surface_size.x, image.surface_size.y, max_size);
    }

    let TextureFormat::Compressed(format) = image.format else {
        return Ok(image);
    };
    if capabilities.supports(format) {
        return Ok(image);
    }
    if !format.is_etc() {
        engine_bail!(UnsupportedFormat, "lime::TextureLoader",
            "{:?} textures are not supported by this context", format);
    }

    engine_debug!("lime::TextureLoader",
        "Decoding {:?} {}x{} in software", format, image.image_size.x, image.image_size.y);
    let levels = image
        .levels
        .into_iter()
        .map(|level| {
            let data = etc_decoder::decode(format, &level.data, level.width, level.height)?;
            Ok(MipLevel { data, ..level })
        })
        .collect::<Result<Vec<_>>>()?;
    Ok(DecodedImage {
        format: TextureFormat::Uncompressed(PixelFormat::Rgba8),
        levels,
        ..image
    })
}

#[cfg(test)]
#[path = "texture_loader_tests.rs"]
mod tests;
