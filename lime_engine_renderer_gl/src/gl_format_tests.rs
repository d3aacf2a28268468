//! Unit tests for OpenGL enum conversion functions
//!
//! Tests pure conversion functions without requiring GPU.

use super::*;

// ============================================================================
// TEXTURE FORMAT CONVERSION TESTS
// ============================================================================

#[test]
fn test_compressed_format_tokens() {
    assert_eq!(compressed_format_to_gl(CompressedFormat::Dxt1), 0x83F1);
    assert_eq!(compressed_format_to_gl(CompressedFormat::Dxt3), 0x83F2);
    assert_eq!(compressed_format_to_gl(CompressedFormat::Dxt5), 0x83F3);
    assert_eq!(compressed_format_to_gl(CompressedFormat::Etc1), 0x8D64);
    assert_eq!(compressed_format_to_gl(CompressedFormat::Etc2Rgb8), 0x9274);
    assert_eq!(compressed_format_to_gl(CompressedFormat::Etc2Rgb8A1), 0x9276);
    assert_eq!(compressed_format_to_gl(CompressedFormat::Etc2Rgba8), 0x9278);
    assert_eq!(compressed_format_to_gl(CompressedFormat::Pvrtc4Bpp), 0x8C02);
    assert_eq!(compressed_format_to_gl(CompressedFormat::Pvrtc2Bpp), 0x8C03);
}

#[test]
fn test_etc2_tokens_match_core_enums() {
    assert_eq!(COMPRESSED_RGB8_ETC2, glow::COMPRESSED_RGB8_ETC2);
    assert_eq!(COMPRESSED_RGBA8_ETC2_EAC, glow::COMPRESSED_RGBA8_ETC2_EAC);
}

#[test]
fn test_pixel_formats() {
    assert_eq!(
        pixel_format_to_gl(PixelFormat::Rgba8),
        GlPixelFormat { internal_format: glow::RGBA, format: glow::RGBA, ty: glow::UNSIGNED_BYTE }
    );
    assert_eq!(
        pixel_format_to_gl(PixelFormat::Rgb8),
        GlPixelFormat { internal_format: glow::RGB, format: glow::RGB, ty: glow::UNSIGNED_BYTE }
    );
    assert_eq!(pixel_format_to_gl(PixelFormat::Rgb565).ty, glow::UNSIGNED_SHORT_5_6_5);
    assert_eq!(pixel_format_to_gl(PixelFormat::Rgba4444).ty, glow::UNSIGNED_SHORT_4_4_4_4);
    assert_eq!(pixel_format_to_gl(PixelFormat::Rgba5551).ty, glow::UNSIGNED_SHORT_5_5_5_1);
}

#[test]
fn test_packed_formats_keep_unsized_internal_format() {
    for format in [PixelFormat::Rgb565, PixelFormat::Rgba4444, PixelFormat::Rgba5551] {
        let gl = pixel_format_to_gl(format);
        assert_eq!(gl.internal_format, gl.format);
    }
}

// ============================================================================
// SAMPLER CONVERSION TESTS
// ============================================================================

#[test]
fn test_min_filter_follows_mipmaps() {
    assert_eq!(min_filter_to_gl(TextureFilter::Linear, false), glow::LINEAR);
    assert_eq!(min_filter_to_gl(TextureFilter::Nearest, false), glow::NEAREST);
    assert_eq!(min_filter_to_gl(TextureFilter::Linear, true), glow::LINEAR_MIPMAP_NEAREST);
    assert_eq!(min_filter_to_gl(TextureFilter::Nearest, true), glow::NEAREST_MIPMAP_NEAREST);
    assert_eq!(mag_filter_to_gl(TextureFilter::Nearest), glow::NEAREST);
}

#[test]
fn test_wrap_modes() {
    assert_eq!(wrap_to_gl(TextureWrap::ClampToEdge), glow::CLAMP_TO_EDGE);
    assert_eq!(wrap_to_gl(TextureWrap::Repeat), glow::REPEAT);
    assert_eq!(wrap_to_gl(TextureWrap::MirroredRepeat), glow::MIRRORED_REPEAT);
}

// ============================================================================
// STATE CONVERSION TESTS
// ============================================================================

#[test]
fn test_blend_factors() {
    assert_eq!(blend_factor_to_gl(BlendFactor::Zero), glow::ZERO);
    assert_eq!(blend_factor_to_gl(BlendFactor::One), glow::ONE);
    assert_eq!(blend_factor_to_gl(BlendFactor::SrcAlpha), glow::SRC_ALPHA);
    assert_eq!(blend_factor_to_gl(BlendFactor::OneMinusSrcAlpha), glow::ONE_MINUS_SRC_ALPHA);
    assert_eq!(blend_factor_to_gl(BlendFactor::DstColor), glow::DST_COLOR);
}

#[test]
fn test_buffer_targets_and_usage() {
    assert_eq!(buffer_target_to_gl(BufferTarget::Vertex), glow::ARRAY_BUFFER);
    assert_eq!(buffer_target_to_gl(BufferTarget::Index), glow::ELEMENT_ARRAY_BUFFER);
    assert_eq!(buffer_usage_to_gl(BufferUsage::StaticDraw), glow::STATIC_DRAW);
    assert_eq!(buffer_usage_to_gl(BufferUsage::DynamicDraw), glow::DYNAMIC_DRAW);
}

#[test]
fn test_texture_units() {
    assert_eq!(texture_unit(0), glow::TEXTURE0);
    assert_eq!(texture_unit(1), glow::TEXTURE1);
}

#[test]
fn test_gl_int_saturates() {
    assert_eq!(gl_int(640), 640);
    assert_eq!(gl_int(u32::MAX), i32::MAX);
}

// ============================================================================
// CONTEXT VERSION TESTS
// ============================================================================

#[test]
fn test_shader_header_per_dialect() {
    let gles2 = ApiVersion { major: 2, minor: 0, embedded: true };
    let gl33 = ApiVersion { major: 3, minor: 3, embedded: false };
    assert_eq!(default_shader_header(gles2), "#version 100\n");
    assert!(default_shader_header(gl33).starts_with("#version 120\n"));
    assert!(default_shader_header(gl33).contains("#define lowp"));
}

#[test]
fn test_vertex_array_requirement() {
    assert!(!needs_vertex_array(ApiVersion { major: 2, minor: 0, embedded: true }));
    assert!(needs_vertex_array(ApiVersion { major: 3, minor: 0, embedded: true }));
    assert!(needs_vertex_array(ApiVersion { major: 4, minor: 1, embedded: false }));
}

#[test]
fn test_error_names() {
    assert_eq!(error_name(glow::INVALID_OPERATION), "GL_INVALID_OPERATION");
    assert_eq!(error_name(0x1234), "unknown GL error");
}
