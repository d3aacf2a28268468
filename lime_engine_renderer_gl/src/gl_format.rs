/// Conversions from engine enums to OpenGL enums
///
/// Pure functions, so they are tested without a context. Extension formats
/// (S3TC, ETC1, PVRTC) are spelled out here because their tokens only exist
/// in extension headers.

use lime_engine::lime::device::{
    ApiVersion, BlendFactor, BufferTarget, BufferUsage, CompressedFormat, PixelFormat,
    TextureFilter, TextureWrap,
};

// ===== EXTENSION TOKENS =====

/// GL_EXT_texture_compression_s3tc
pub const COMPRESSED_RGBA_S3TC_DXT1_EXT: u32 = 0x83F1;
pub const COMPRESSED_RGBA_S3TC_DXT3_EXT: u32 = 0x83F2;
pub const COMPRESSED_RGBA_S3TC_DXT5_EXT: u32 = 0x83F3;

/// GL_OES_compressed_ETC1_RGB8_texture
pub const ETC1_RGB8_OES: u32 = 0x8D64;

/// ETC2 / EAC (core in GLES 3.0 and GL 4.3)
pub const COMPRESSED_RGB8_ETC2: u32 = 0x9274;
pub const COMPRESSED_RGB8_PUNCHTHROUGH_ALPHA1_ETC2: u32 = 0x9276;
pub const COMPRESSED_RGBA8_ETC2_EAC: u32 = 0x9278;

/// GL_IMG_texture_compression_pvrtc
pub const COMPRESSED_RGBA_PVRTC_4BPPV1_IMG: u32 = 0x8C02;
pub const COMPRESSED_RGBA_PVRTC_2BPPV1_IMG: u32 = 0x8C03;

/// Internal format, format and type triple of an uncompressed upload
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GlPixelFormat {
    pub internal_format: u32,
    pub format: u32,
    pub ty: u32,
}

/// Unsized internal formats are used so the same call works on GLES 2.0
pub fn pixel_format_to_gl(format: PixelFormat) -> GlPixelFormat {
    let (format, ty) = match format {
        PixelFormat::Rgba8 => (glow::RGBA, glow::UNSIGNED_BYTE),
        PixelFormat::Rgb8 => (glow::RGB, glow::UNSIGNED_BYTE),
        PixelFormat::Rgb565 => (glow::RGB, glow::UNSIGNED_SHORT_5_6_5),
        PixelFormat::Rgba4444 => (glow::RGBA, glow::UNSIGNED_SHORT_4_4_4_4),
        PixelFormat::Rgba5551 => (glow::RGBA, glow::UNSIGNED_SHORT_5_5_5_1),
    };
    GlPixelFormat { internal_format: format, format, ty }
}

pub fn compressed_format_to_gl(format: CompressedFormat) -> u32 {
    match format {
        CompressedFormat::Dxt1 => COMPRESSED_RGBA_S3TC_DXT1_EXT,
        CompressedFormat::Dxt3 => COMPRESSED_RGBA_S3TC_DXT3_EXT,
        CompressedFormat::Dxt5 => COMPRESSED_RGBA_S3TC_DXT5_EXT,
        CompressedFormat::Etc1 => ETC1_RGB8_OES,
        CompressedFormat::Etc2Rgb8 => COMPRESSED_RGB8_ETC2,
        CompressedFormat::Etc2Rgb8A1 => COMPRESSED_RGB8_PUNCHTHROUGH_ALPHA1_ETC2,
        CompressedFormat::Etc2Rgba8 => COMPRESSED_RGBA8_ETC2_EAC,
        CompressedFormat::Pvrtc2Bpp => COMPRESSED_RGBA_PVRTC_2BPPV1_IMG,
        CompressedFormat::Pvrtc4Bpp => COMPRESSED_RGBA_PVRTC_4BPPV1_IMG,
    }
}

pub fn buffer_target_to_gl(target: BufferTarget) -> u32 {
    match target {
        BufferTarget::Vertex => glow::ARRAY_BUFFER,
        BufferTarget::Index => glow::ELEMENT_ARRAY_BUFFER,
    }
}

pub fn buffer_usage_to_gl(usage: BufferUsage) -> u32 {
    match usage {
        BufferUsage::StaticDraw => glow::STATIC_DRAW,
        BufferUsage::DynamicDraw => glow::DYNAMIC_DRAW,
    }
}

pub fn blend_factor_to_gl(factor: BlendFactor) -> u32 {
    match factor {
        BlendFactor::Zero => glow::ZERO,
        BlendFactor::One => glow::ONE,
        BlendFactor::SrcAlpha => glow::SRC_ALPHA,
        BlendFactor::OneMinusSrcAlpha => glow::ONE_MINUS_SRC_ALPHA,
        BlendFactor::DstColor => glow::DST_COLOR,
    }
}

/// Minification filter; mipmapped textures sample the nearest level
pub fn min_filter_to_gl(filter: TextureFilter, mipmapped: bool) -> u32 {
    match (filter, mipmapped) {
        (TextureFilter::Nearest, false) => glow::NEAREST,
        (TextureFilter::Linear, false) => glow::LINEAR,
        (TextureFilter::Nearest, true) => glow::NEAREST_MIPMAP_NEAREST,
        (TextureFilter::Linear, true) => glow::LINEAR_MIPMAP_NEAREST,
    }
}

pub fn mag_filter_to_gl(filter: TextureFilter) -> u32 {
    match filter {
        TextureFilter::Nearest => glow::NEAREST,
        TextureFilter::Linear => glow::LINEAR,
    }
}

pub fn wrap_to_gl(wrap: TextureWrap) -> u32 {
    match wrap {
        TextureWrap::ClampToEdge => glow::CLAMP_TO_EDGE,
        TextureWrap::Repeat => glow::REPEAT,
        TextureWrap::MirroredRepeat => glow::MIRRORED_REPEAT,
    }
}

/// Texture unit token for sampler `stage`
pub fn texture_unit(stage: u32) -> u32 {
    glow::TEXTURE0 + stage
}

/// Clamp a size or offset to the `i32` GL entry points take
pub fn gl_int(value: u32) -> i32 {
    i32::try_from(value).unwrap_or(i32::MAX)
}

/// Shader preamble matching the context's GLSL dialect
///
/// Desktop GLSL 1.20 has no precision qualifiers, so they are defined away.
pub fn default_shader_header(version: ApiVersion) -> &'static str {
    if version.embedded {
        "#version 100\n"
    } else {
        "#version 120\n#define lowp\n#define mediump\n#define highp\n"
    }
}

/// Whether a vertex array object must be bound before attribute setup
pub fn needs_vertex_array(version: ApiVersion) -> bool {
    version.at_least(3, 0)
}

/// Human-readable name of a GL error code
#[cfg_attr(not(feature = "gl-trace-errors"), allow(dead_code))]
pub fn error_name(code: u32) -> &'static str {
    match code {
        glow::INVALID_ENUM => "GL_INVALID_ENUM",
        glow::INVALID_VALUE => "GL_INVALID_VALUE",
        glow::INVALID_OPERATION => "GL_INVALID_OPERATION",
        glow::INVALID_FRAMEBUFFER_OPERATION => "GL_INVALID_FRAMEBUFFER_OPERATION",
        glow::OUT_OF_MEMORY => "GL_OUT_OF_MEMORY",
        _ => "unknown GL error",
    }
}

#[cfg(test)]
#[path = "gl_format_tests.rs"]
mod tests;
