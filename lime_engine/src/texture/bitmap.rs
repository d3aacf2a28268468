/// PNG / JPEG decoding through the `image` crate

use std::io::Read;
use glam::UVec2;
use crate::error::Result;
use crate::texture::DecodedImage;

/// Decode a PNG or JPEG stream into RGBA8
pub fn decode<R: Read + ?Sized>(reader: &mut R) -> Result<DecodedImage> {
    let mut bytes = Vec::new();
    reader.read_to_end(&mut bytes)?;
    let image = image::load_from_memory(&bytes)?.into_rgba8();
    let (width, height) = image.dimensions();
    Ok(DecodedImage::rgba8(width, height, image.into_raw()))
}

/// Copy an RGBA8 image into the top-left corner of a power-of-two surface
///
/// The padding is transparent black. Returns the image unchanged when both
/// sides already are powers of two.
pub fn pad_to_power_of_two(image: DecodedImage) -> DecodedImage {
    let UVec2 { x: width, y: height } = image.image_size;
    let surface = UVec2::new(width.max(1).next_power_of_two(), height.max(1).next_power_of_two());
    if surface == image.image_size {
        return image;
    }
    let Some(source) = image.levels.into_iter().next().filter(|_| width > 0 && height > 0) else {
        return DecodedImage::rgba8(surface.x, surface.y, vec![0; (surface.x * surface.y * 4) as usize]);
    };
    let row = width as usize * 4;
    let surface_row = surface.x as usize * 4;
    let mut data = vec![0u8; surface_row * surface.y as usize];
    for (y, line) in source.data.chunks_exact(row).take(height as usize).enumerate() {
        data[y * surface_row..y * surface_row + row].copy_from_slice(line);
    }
    let mut padded = DecodedImage::rgba8(surface.x, surface.y, data);
    padded.image_size = UVec2::new(width, height);
    padded
}
