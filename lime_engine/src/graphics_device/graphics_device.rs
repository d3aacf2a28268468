/// GraphicsDevice trait - the raw drawing interface the render core drives
///
/// One implementation wraps the OpenGL context (see the `lime_engine_renderer_gl`
/// crate); `RecordingDevice` stands in for it in tests and headless tools.
/// Every method must be called on the rendering thread, the one that owns
/// the context.

use std::num::NonZeroU32;
use glam::Mat4;
use crate::error::Result;
use crate::graphics_device::Capabilities;

// ===== NATIVE HANDLES =====

/// Native texture name (never 0)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TextureHandle(pub NonZeroU32);

impl TextureHandle {
    /// Wrap a raw name, `None` for 0
    pub fn new(raw: u32) -> Option<Self> {
        NonZeroU32::new(raw).map(Self)
    }

    pub fn raw(self) -> u32 {
        self.0.get()
    }
}

/// Native buffer name (never 0)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct BufferHandle(pub NonZeroU32);

impl BufferHandle {
    /// Wrap a raw name, `None` for 0
    pub fn new(raw: u32) -> Option<Self> {
        NonZeroU32::new(raw).map(Self)
    }

    pub fn raw(self) -> u32 {
        self.0.get()
    }
}

// ===== BUFFERS =====

/// Buffer binding point
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BufferTarget {
    /// Interleaved `Vertex` data; binding also sets up the attribute layout
    Vertex,
    /// 16-bit triangle indices
    Index,
}

/// Upload usage hint
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BufferUsage {
    StaticDraw,
    DynamicDraw,
}

// ===== TEXTURES =====

/// Uncompressed upload formats
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PixelFormat {
    Rgba8,
    Rgb8,
    Rgb565,
    Rgba4444,
    Rgba5551,
}

impl PixelFormat {
    pub fn bytes_per_pixel(&self) -> usize {
        match self {
            PixelFormat::Rgba8 => 4,
            PixelFormat::Rgb8 => 3,
            PixelFormat::Rgb565 | PixelFormat::Rgba4444 | PixelFormat::Rgba5551 => 2,
        }
    }

    /// Byte size of a `width` x `height` level, `None` if it overflows `usize`
    pub fn level_size(&self, width: u32, height: u32) -> Option<usize> {
        (width as usize)
            .checked_mul(height as usize)?
            .checked_mul(self.bytes_per_pixel())
    }
}

/// Block-compressed upload formats
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CompressedFormat {
    Dxt1,
    Dxt3,
    Dxt5,
    Etc1,
    Etc2Rgb8,
    Etc2Rgb8A1,
    Etc2Rgba8,
    Pvrtc2Bpp,
    Pvrtc4Bpp,
}

impl CompressedFormat {
    /// Byte size of a `width` x `height` level, `None` if it overflows `usize`
    ///
    /// PVRTC levels are `width * height * bpp / 8` bytes, matching the
    /// layout PVR asset files are written with.
    pub fn level_size(&self, width: u32, height: u32) -> Option<usize> {
        let (w, h) = (width as usize, height as usize);
        let blocks = || w.div_ceil(4).checked_mul(h.div_ceil(4));
        match self {
            CompressedFormat::Dxt1 | CompressedFormat::Etc1
            | CompressedFormat::Etc2Rgb8 | CompressedFormat::Etc2Rgb8A1 => blocks()?.checked_mul(8),
            CompressedFormat::Dxt3 | CompressedFormat::Dxt5 | CompressedFormat::Etc2Rgba8 => {
                blocks()?.checked_mul(16)
            }
            CompressedFormat::Pvrtc2Bpp => Some(w.checked_mul(h)?.checked_mul(2)? / 8),
            CompressedFormat::Pvrtc4Bpp => Some(w.checked_mul(h)?.checked_mul(4)? / 8),
        }
    }

    /// ETC family (software-decodable when the context lacks support)
    pub fn is_etc(&self) -> bool {
        matches!(
            self,
            CompressedFormat::Etc1
                | CompressedFormat::Etc2Rgb8
                | CompressedFormat::Etc2Rgb8A1
                | CompressedFormat::Etc2Rgba8
        )
    }
}

/// Texture sampling filter
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextureFilter {
    Nearest,
    Linear,
}

/// Texture addressing mode
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextureWrap {
    ClampToEdge,
    Repeat,
    MirroredRepeat,
}

/// Sampling parameters applied when a texture is uploaded
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TextureParams {
    pub min_filter: TextureFilter,
    pub mag_filter: TextureFilter,
    pub wrap_u: TextureWrap,
    pub wrap_v: TextureWrap,
}

impl Default for TextureParams {
    fn default() -> Self {
        Self {
            min_filter: TextureFilter::Linear,
            mag_filter: TextureFilter::Linear,
            wrap_u: TextureWrap::ClampToEdge,
            wrap_v: TextureWrap::ClampToEdge,
        }
    }
}

// ===== BLENDING / PROGRAMS =====

/// Fixed-function blend factor
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BlendFactor {
    Zero,
    One,
    SrcAlpha,
    OneMinusSrcAlpha,
    DstColor,
}

/// Concrete shader programs a device must provide
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ShaderProgram {
    ColorOnly,
    OneTexture,
    TwoTextures,
    Silhouette,
    TwoTexturesSilhouette,
    InversedSilhouette,
}

impl ShaderProgram {
    pub const ALL: [ShaderProgram; 6] = [
        ShaderProgram::ColorOnly,
        ShaderProgram::OneTexture,
        ShaderProgram::TwoTextures,
        ShaderProgram::Silhouette,
        ShaderProgram::TwoTexturesSilhouette,
        ShaderProgram::InversedSilhouette,
    ];

    /// Number of sampler stages the program reads
    pub fn texture_count(&self) -> usize {
        match self {
            ShaderProgram::ColorOnly => 0,
            ShaderProgram::OneTexture
            | ShaderProgram::Silhouette
            | ShaderProgram::InversedSilhouette => 1,
            ShaderProgram::TwoTextures | ShaderProgram::TwoTexturesSilhouette => 2,
        }
    }
}

// ===== DEVICE TRAIT =====

/// Raw graphics device driven by the render core
///
/// Calls are unconditional: redundant-state elimination happens one level
/// up in `PlatformRenderer`.
pub trait GraphicsDevice {
    /// Capabilities probed once when the device was created
    fn capabilities(&self) -> &Capabilities;

    /// Whether the context is bound and usable on this thread
    fn is_context_current(&self) -> bool;

    /// Counter bumped every time the context is re-created
    ///
    /// Native handles are only meaningful within the generation that created them.
    fn context_generation(&self) -> u64;

    fn create_buffer(&mut self) -> Result<BufferHandle>;
    fn delete_buffer(&mut self, handle: BufferHandle);
    fn bind_buffer(&mut self, target: BufferTarget, handle: Option<BufferHandle>);

    /// Upload `data` to the buffer bound on `target`
    fn buffer_data(&mut self, target: BufferTarget, data: &[u8], usage: BufferUsage);

    fn create_texture(&mut self) -> Result<TextureHandle>;

    /// Delete several textures with one native call
    fn delete_textures(&mut self, handles: &[TextureHandle]);

    fn bind_texture(&mut self, stage: u32, handle: Option<TextureHandle>);

    /// Apply sampling parameters to the texture bound on stage 0
    fn set_texture_params(&mut self, params: &TextureParams, level_count: u32);

    /// Upload one uncompressed level to the texture bound on stage 0
    fn tex_image_2d(&mut self, level: u32, format: PixelFormat, width: u32, height: u32, data: &[u8]);

    /// Upload one compressed level to the texture bound on stage 0
    fn compressed_tex_image_2d(
        &mut self,
        level: u32,
        format: CompressedFormat,
        width: u32,
        height: u32,
        data: &[u8],
    );

    /// Replace an RGBA8 rectangle of level 0 of the texture bound on stage 0
    fn tex_sub_image_2d(&mut self, x: u32, y: u32, width: u32, height: u32, data: &[u8]);

    fn set_blending_enabled(&mut self, enabled: bool);
    fn blend_func(&mut self, src: BlendFactor, dst: BlendFactor);
    fn use_program(&mut self, program: ShaderProgram);

    /// Projection used by every program
    fn set_projection(&mut self, projection: &Mat4);

    fn clear(&mut self, color: [f32; 4]);

    /// Draw `index_count` indices of the bound index buffer as triangles
    fn draw_indexed_triangles(&mut self, index_count: u32);

    /// Pop one pending driver error code
    fn get_error(&mut self) -> Option<u32>;
}
