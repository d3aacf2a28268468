/// Textures with lazily created native handles and deferred deletion
///
/// Loading is destructive: the current native texture is queued for
/// deletion, the new source is decoded on the calling thread, and the upload
/// runs on the rendering thread with the next batch of queued work.

use std::io::Read;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;
use glam::{UVec2, Vec2};
use crate::error::{Error, Result};
use crate::graphics_device::{PixelFormat, TextureHandle, TextureParams};
use crate::resource::{GpuObject, GpuObjectKey, NativeHandle};
use crate::texture::texture_manager::TextureLedger;
use crate::texture::{bitmap, texture_loader, AssetBundle, DecodedImage, TextureFormat, TextureManager};
use crate::{engine_bail, engine_error, engine_warn};

/// Side of the stub texture used for missing or broken assets
pub const STUB_SIZE: u32 = 128;

/// Suffixes probed by `Texture2D::load_from_bundle`, in order
pub const BUNDLE_EXTENSIONS: [&str; 5] = [".pvr", ".ktx", ".dds", ".png", ".jpg"];

const STUB_BLUE: [u8; 4] = [0, 0, 255, 255];
const STUB_WHITE: [u8; 4] = [255, 255, 255, 255];

/// Axis-aligned rectangle in texture coordinates
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rect {
    pub min: Vec2,
    pub max: Vec2,
}

impl Rect {
    /// The whole texture
    pub const UNIT: Rect = Rect { min: Vec2::ZERO, max: Vec2::ONE };

    pub fn new(min: Vec2, max: Vec2) -> Self {
        Self { min, max }
    }

    pub fn size(&self) -> Vec2 {
        self.max - self.min
    }
}

/// Anything that can be sampled by a render batch
pub trait Texture {
    /// Native handle used for batching; `None` until the upload has run
    ///
    /// Fails with `InvalidObjectState` once the texture is disposed.
    fn native_handle(&self) -> Result<Option<TextureHandle>>;

    /// Size of the meaningful pixels
    fn image_size(&self) -> UVec2;

    /// Texture coordinates covering the meaningful pixels
    fn uv_rect(&self) -> Rect;
}

// ===== NATIVE SIDE =====

/// Native part of a texture, shared with the registry and pending uploads
struct GpuTexture {
    handle: NativeHandle,
    memory_used: AtomicUsize,
    disposed: AtomicBool,
    ledger: Arc<TextureLedger>,
}

impl GpuObject for GpuTexture {
    fn discard(&self) {
        if let Some((raw, generation)) = self.handle.take() {
            self.ledger.schedule_delete(TextureHandle(raw), generation);
        }
        self.ledger.release_memory(self.memory_used.swap(0, Ordering::AcqRel));
    }
}

impl Drop for GpuTexture {
    fn drop(&mut self) {
        self.discard();
    }
}

// ===== TEXTURE 2D =====

/// 2D texture owned by the application
pub struct Texture2D {
    gpu: Arc<GpuTexture>,
    key: GpuObjectKey,
    manager: TextureManager,
    image_size: UVec2,
    surface_size: UVec2,
    uv_rect: Rect,
    params: TextureParams,
    level_count: u32,
    stub: bool,
}

impl Texture2D {
    /// Create an empty texture; nothing is allocated until a load
    pub fn new(manager: &TextureManager) -> Self {
        let gpu = Arc::new(GpuTexture {
            handle: NativeHandle::empty(),
            memory_used: AtomicUsize::new(0),
            disposed: AtomicBool::new(false),
            ledger: Arc::clone(manager.ledger()),
        });
        let key = manager.resources().registry().add(&gpu);
        Self {
            gpu,
            key,
            manager: manager.clone(),
            image_size: UVec2::ZERO,
            surface_size: UVec2::ZERO,
            uv_rect: Rect::UNIT,
            params: TextureParams::default(),
            level_count: 0,
            stub: false,
        }
    }

    fn ensure_alive(&self, operation: &str) -> Result<()> {
        if self.is_disposed() {
            engine_bail!(InvalidObjectState, "lime::Texture2D", "Cannot {} a disposed texture", operation);
        }
        Ok(())
    }

    pub fn is_disposed(&self) -> bool {
        self.gpu.disposed.load(Ordering::Acquire)
    }

    /// Whether the texture currently shows a stub instead of real content
    pub fn is_stub(&self) -> bool {
        self.stub
    }

    /// Size of the allocated surface, padding included
    pub fn surface_size(&self) -> UVec2 {
        self.surface_size
    }

    /// Bytes of texture data on the GPU
    pub fn memory_used(&self) -> usize {
        self.gpu.memory_used.load(Ordering::Acquire)
    }

    pub fn params(&self) -> TextureParams {
        self.params
    }

    /// Change the sampling parameters, re-applying them to an uploaded texture
    pub fn set_params(&mut self, params: TextureParams) {
        self.params = params;
        let gpu = Arc::clone(&self.gpu);
        let level_count = self.level_count;
        self.manager.resources().rendering().invoke_if_current(move |device| {
            if let Some((raw, generation)) = gpu.handle.current() {
                if generation == device.context_generation() {
                    device.bind_texture(0, Some(TextureHandle(raw)));
                    device.set_texture_params(&params, level_count);
                }
            }
        });
    }

    /// Decode `reader` and upload it, replacing the current contents
    ///
    /// On a decode failure the texture becomes a transparent stub and the
    /// error is returned.
    pub fn load_image<R: Read>(&mut self, reader: R) -> Result<()> {
        self.ensure_alive("load")?;
        self.gpu.discard();
        let capabilities = self.manager.capabilities();
        match texture_loader::load(reader, capabilities, self.manager.config()) {
            Ok(image) => {
                self.upload(image, false);
                Ok(())
            }
            Err(error) => self.fail_with_stub(error),
        }
    }

    /// Upload tightly packed RGBA8 pixels, replacing the current contents
    pub fn load_pixels(&mut self, pixels: &[u8], width: u32, height: u32) -> Result<()> {
        self.ensure_alive("load")?;
        let expected = PixelFormat::Rgba8.level_size(width, height);
        if expected != Some(pixels.len()) {
            engine_bail!(InvalidData, "lime::Texture2D",
                "Expected {}x{} RGBA8 pixels, got {} bytes", width, height, pixels.len());
        }
        self.gpu.discard();
        let image = DecodedImage::rgba8(width, height, pixels.to_vec());
        let config = self.manager.config();
        let image = if config.force_pot || !self.manager.supports_npot() {
            bitmap::pad_to_power_of_two(image)
        } else {
            image
        };
        self.upload(image, false);
        Ok(())
    }

    /// Overwrite an RGBA8 rectangle of the uploaded image
    pub fn load_sub_image(&mut self, pixels: &[u8], x: u32, y: u32, width: u32, height: u32) -> Result<()> {
        self.ensure_alive("update")?;
        let expected = PixelFormat::Rgba8.level_size(width, height);
        if expected != Some(pixels.len()) {
            engine_bail!(InvalidData, "lime::Texture2D",
                "Expected a {}x{} RGBA8 sub-image, got {} bytes", width, height, pixels.len());
        }
        if x.saturating_add(width) > self.surface_size.x || y.saturating_add(height) > self.surface_size.y {
            engine_bail!(InvalidData, "lime::Texture2D",
                "Sub-image {}x{} at ({}, {}) exceeds the {}x{} surface",
                width, height, x, y, self.surface_size.x, self.surface_size.y);
        }
        let data = pixels.to_vec();
        let gpu = Arc::clone(&self.gpu);
        self.manager.resources().rendering().invoke_if_current(move |device| {
            if let Some((raw, generation)) = gpu.handle.current() {
                if generation == device.context_generation() {
                    device.bind_texture(0, Some(TextureHandle(raw)));
                    device.tex_sub_image_2d(x, y, width, height, &data);
                }
            }
        });
        Ok(())
    }

    /// Replace the contents with the missing-asset stub
    pub fn load_stub(&mut self) -> Result<()> {
        self.ensure_alive("load")?;
        self.gpu.discard();
        let transparent = self.manager.config().transparent_stub;
        self.upload_stub(transparent);
        Ok(())
    }

    /// Load `path` from `bundle`, probing the known texture suffixes
    ///
    /// A missing asset is not an error: it logs a warning and loads the stub.
    pub fn load_from_bundle(&mut self, bundle: &dyn AssetBundle, path: &str) -> Result<()> {
        self.ensure_alive("load")?;
        let found = std::iter::once(path.to_string())
            .chain(BUNDLE_EXTENSIONS.iter().map(|extension| format!("{}{}", path, extension)))
            .find(|candidate| bundle.file_exists(candidate));
        let Some(candidate) = found else {
            engine_warn!("lime::Texture2D", "Missing texture '{}'", path);
            return self.load_stub();
        };
        match bundle.open_file(&candidate) {
            Ok(reader) => self.load_image(reader),
            Err(error) => {
                self.gpu.discard();
                self.fail_with_stub(error)
            }
        }
    }

    /// Release the native texture; later loads fail with `InvalidObjectState`
    pub fn dispose(&mut self) {
        if !self.gpu.disposed.swap(true, Ordering::AcqRel) {
            self.gpu.discard();
        }
    }

    fn fail_with_stub(&mut self, error: Error) -> Result<()> {
        engine_warn!("lime::Texture2D", "Texture load failed, using a stub: {}", error);
        self.upload_stub(true);
        Err(error)
    }

    fn upload_stub(&mut self, transparent: bool) {
        let mut data = vec![0u8; (STUB_SIZE * STUB_SIZE * 4) as usize];
        if !transparent {
            for (index, pixel) in data.chunks_exact_mut(4).enumerate() {
                let i = index % STUB_SIZE as usize;
                let j = index / STUB_SIZE as usize;
                let color = if (i + (j & !7)) & 8 == 0 { STUB_BLUE } else { STUB_WHITE };
                pixel.copy_from_slice(&color);
            }
        }
        self.upload(DecodedImage::rgba8(STUB_SIZE, STUB_SIZE, data), true);
    }

    /// Record the image geometry now and queue the native upload
    fn upload(&mut self, image: DecodedImage, stub: bool) {
        self.image_size = image.image_size;
        self.surface_size = image.surface_size;
        self.uv_rect = Rect::new(Vec2::ZERO, image.uv_max());
        self.level_count = image.levels.len() as u32;
        self.stub = stub;

        let gpu = Arc::clone(&self.gpu);
        let params = self.params;
        self.manager.resources().rendering().invoke_if_current(move |device| {
            let handle = match device.create_texture() {
                Ok(handle) => handle,
                Err(error) => {
                    engine_error!("lime::Texture2D", "Texture creation failed: {}", error);
                    return;
                }
            };
            device.bind_texture(0, Some(handle));
            device.set_texture_params(&params, image.levels.len() as u32);
            for (level, mip) in image.levels.iter().enumerate() {
                match image.format {
                    TextureFormat::Uncompressed(format) => {
                        device.tex_image_2d(level as u32, format, mip.width, mip.height, &mip.data);
                    }
                    TextureFormat::Compressed(format) => {
                        device.compressed_tex_image_2d(level as u32, format, mip.width, mip.height, &mip.data);
                    }
                }
            }

            if gpu.disposed.load(Ordering::Acquire) {
                device.delete_textures(&[handle]);
                return;
            }
            let generation = device.context_generation();
            if let Some((previous, previous_generation)) = gpu.handle.replace(handle.0, generation) {
                gpu.ledger.schedule_delete(TextureHandle(previous), previous_generation);
            }
            let memory = image.memory_size();
            gpu.ledger.release_memory(gpu.memory_used.swap(memory, Ordering::AcqRel));
            gpu.ledger.add_memory(memory);
        });
    }
}

impl Texture for Texture2D {
    fn native_handle(&self) -> Result<Option<TextureHandle>> {
        self.ensure_alive("bind")?;
        Ok(self.gpu.handle.get().map(TextureHandle))
    }

    fn image_size(&self) -> UVec2 {
        self.image_size
    }

    fn uv_rect(&self) -> Rect {
        self.uv_rect
    }
}

impl Drop for Texture2D {
    fn drop(&mut self) {
        self.gpu.discard();
        self.manager.resources().registry().remove(self.key);
    }
}

// ===== ATLAS PART =====

/// Rectangle of pixels inside another texture
///
/// Shares the native handle of its texture, so parts of one atlas batch
/// together.
pub struct AtlasPart {
    texture: Arc<Texture2D>,
    offset: UVec2,
    size: UVec2,
}

impl AtlasPart {
    pub fn new(texture: Arc<Texture2D>, offset: UVec2, size: UVec2) -> Self {
        Self { texture, offset, size }
    }

    pub fn texture(&self) -> &Arc<Texture2D> {
        &self.texture
    }

    /// Pixel offset inside the atlas
    pub fn offset(&self) -> UVec2 {
        self.offset
    }
}

impl Texture for AtlasPart {
    fn native_handle(&self) -> Result<Option<TextureHandle>> {
        self.texture.native_handle()
    }

    fn image_size(&self) -> UVec2 {
        self.size
    }

    fn uv_rect(&self) -> Rect {
        let surface = self.texture.surface_size().max(UVec2::ONE).as_vec2();
        Rect::new(self.offset.as_vec2() / surface, (self.offset + self.size).as_vec2() / surface)
    }
}

#[cfg(test)]
#[path = "texture_2d_tests.rs"]
mod tests;
