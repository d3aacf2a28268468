//! Unit tests for GlGraphicsDevice backend
//!
//! These tests verify that GlGraphicsDevice correctly implements the GraphicsDevice trait.
//! All tests require a GPU and are marked with #[ignore].
//!
//! Run with: cargo test --test gl_device_tests -- --ignored

use std::num::NonZeroU32;
use glutin::config::ConfigTemplateBuilder;
use glutin::context::{ContextAttributesBuilder, PossiblyCurrentContext};
use glutin::display::{Display, DisplayApiPreference};
use glutin::prelude::*;
use glutin::surface::{Surface, SurfaceAttributesBuilder, WindowSurface};
use raw_window_handle::{HasDisplayHandle, HasWindowHandle};
use winit::event_loop::EventLoop;
use winit::window::Window;
use lime_engine::glam::Vec2;
use lime_engine::lime::{Error, Renderer, RendererConfig, TextureConfig};
use lime_engine::lime::device::{
    BufferTarget, BufferUsage, GraphicsDevice, PixelFormat, ShaderProgram, TextureParams,
};
use lime_engine::lime::render::{Blending, ShaderId};
use lime_engine::lime::resource::{Color4, Vertex};
use lime_engine::lime::texture::Texture;
use lime_engine_renderer_gl::glow;
use lime_engine_renderer_gl::lime::{GlDeviceConfig, GlGraphicsDevice};

/// Window, surface and context kept alive for the duration of a test
struct TestContext {
    _context: PossiblyCurrentContext,
    _surface: Surface<WindowSurface>,
    _display: Display,
    _window: Window,
    _event_loop: EventLoop<()>,
}

/// Helper to create a hidden window with a current GL context
#[allow(deprecated)]
fn create_test_context() -> (glow::Context, TestContext) {
    let event_loop = EventLoop::new().unwrap();
    let window_attrs = Window::default_attributes()
        .with_title("Lime GL Device Test")
        .with_inner_size(winit::dpi::LogicalSize::new(800, 600))
        .with_visible(false); // Hidden window for tests
    let window = event_loop.create_window(window_attrs).unwrap();

    let display_handle = window.display_handle().unwrap().as_raw();
    let raw_window_handle = window.window_handle().unwrap().as_raw();
    #[cfg(target_os = "windows")]
    let preference = DisplayApiPreference::Wgl(Some(raw_window_handle));
    #[cfg(target_os = "macos")]
    let preference = DisplayApiPreference::Cgl;
    #[cfg(all(unix, not(target_os = "macos")))]
    let preference = DisplayApiPreference::Egl;
    let display = unsafe { Display::new(display_handle, preference) }.unwrap();

    let template = ConfigTemplateBuilder::new().build();
    let config = unsafe { display.find_configs(template) }.unwrap().next().unwrap();
    let size = window.inner_size();
    let surface_attributes = SurfaceAttributesBuilder::<WindowSurface>::new().build(
        raw_window_handle,
        NonZeroU32::new(size.width.max(1)).unwrap(),
        NonZeroU32::new(size.height.max(1)).unwrap(),
    );
    let surface = unsafe { display.create_window_surface(&config, &surface_attributes) }.unwrap();
    let context_attributes = ContextAttributesBuilder::new().build(Some(raw_window_handle));
    let context = unsafe { display.create_context(&config, &context_attributes) }
        .unwrap()
        .make_current(&surface)
        .unwrap();

    let gl = unsafe { glow::Context::from_loader_function_cstr(|name| display.get_proc_address(name)) };
    let test_context = TestContext {
        _context: context,
        _surface: surface,
        _display: display,
        _window: window,
        _event_loop: event_loop,
    };
    (gl, test_context)
}

fn quad() -> [Vertex; 4] {
    [
        Vertex::new(Vec2::new(0.0, 0.0), Vec2::new(0.0, 0.0), Color4::WHITE),
        Vertex::new(Vec2::new(64.0, 0.0), Vec2::new(1.0, 0.0), Color4::WHITE),
        Vertex::new(Vec2::new(64.0, 64.0), Vec2::new(1.0, 1.0), Color4::WHITE),
        Vertex::new(Vec2::new(0.0, 64.0), Vec2::new(0.0, 1.0), Color4::WHITE),
    ]
}

// ============================================================================
// DEVICE TESTS
// ============================================================================

#[test]
#[ignore] // Requires GPU
fn test_gl_device_creation() {
    let (gl, _context) = create_test_context();
    let device = GlGraphicsDevice::new(gl, GlDeviceConfig::default()).unwrap();

    assert!(device.is_context_current());
    assert_eq!(device.context_generation(), 1);
    assert!(device.capabilities().max_texture_size() >= 64);
}

#[test]
#[ignore] // Requires GPU
fn test_gl_invalid_shader_header_is_fatal() {
    let (gl, _context) = create_test_context();
    let config = GlDeviceConfig { shader_version_header: Some("#version 999\n".to_string()) };
    let result = GlGraphicsDevice::new(gl, config);

    assert!(matches!(result, Err(Error::ShaderCompilation(_))));
}

#[test]
#[ignore] // Requires GPU
fn test_gl_every_program_binds() {
    let (gl, _context) = create_test_context();
    let mut device = GlGraphicsDevice::new(gl, GlDeviceConfig::default()).unwrap();

    for program in ShaderProgram::ALL {
        device.use_program(program);
    }
    assert_eq!(device.get_error(), None);
}

// ============================================================================
// RESOURCE TESTS
// ============================================================================

#[test]
#[ignore] // Requires GPU
fn test_gl_buffer_upload() {
    let (gl, _context) = create_test_context();
    let mut device = GlGraphicsDevice::new(gl, GlDeviceConfig::default()).unwrap();

    let buffer = device.create_buffer().unwrap();
    device.bind_buffer(BufferTarget::Vertex, Some(buffer));
    device.buffer_data(BufferTarget::Vertex, &[0u8; 28 * 4], BufferUsage::DynamicDraw);
    device.bind_buffer(BufferTarget::Vertex, None);
    device.delete_buffer(buffer);

    assert_eq!(device.get_error(), None);
}

#[test]
#[ignore] // Requires GPU
fn test_gl_texture_upload() {
    let (gl, _context) = create_test_context();
    let mut device = GlGraphicsDevice::new(gl, GlDeviceConfig::default()).unwrap();

    let first = device.create_texture().unwrap();
    let second = device.create_texture().unwrap();
    assert_ne!(first, second);

    device.bind_texture(0, Some(first));
    device.set_texture_params(&TextureParams::default(), 1);
    device.tex_image_2d(0, PixelFormat::Rgba8, 4, 4, &[255u8; 64]);
    device.tex_sub_image_2d(1, 1, 2, 2, &[0u8; 16]);
    device.bind_texture(0, Some(second));
    device.tex_image_2d(0, PixelFormat::Rgb565, 2, 2, &[0u8; 8]);
    device.delete_textures(&[first, second]);

    assert_eq!(device.get_error(), None);
}

#[test]
#[ignore] // Requires GPU
fn test_gl_context_loss_stops_gl_calls() {
    let (gl, _context) = create_test_context();
    let mut device = GlGraphicsDevice::new(gl, GlDeviceConfig::default()).unwrap();

    device.context_lost();
    assert!(!device.is_context_current());
    assert!(device.create_buffer().is_err());
    assert_eq!(device.get_error(), None);
}

// ============================================================================
// RENDERER TESTS
// ============================================================================

#[test]
#[ignore] // Requires GPU
fn test_gl_renderer_frame() {
    let (gl, _context) = create_test_context();
    let device = GlGraphicsDevice::new(gl, GlDeviceConfig::default()).unwrap();
    let config = RendererConfig { check_errors: true, ..Default::default() };
    let mut renderer = Renderer::new(Box::new(device), config, TextureConfig::default()).unwrap();

    let mut texture = renderer.create_texture();
    texture.load_pixels(&[255u8; 64], 4, 4).unwrap();
    renderer.begin_frame().unwrap();
    renderer.set_orthogonal_projection(0.0, 800.0, 600.0, 0.0);

    let indices = [0, 1, 2, 2, 3, 0];
    renderer.draw_triangles(Some(&texture), None, Blending::Default, ShaderId::Default, &quad(), &indices).unwrap();
    renderer.draw_triangles(None, None, Blending::Add, ShaderId::Default, &quad(), &indices).unwrap();
    renderer.end_frame().unwrap();

    assert_eq!(renderer.draw_calls(), 2);
    assert!(texture.native_handle().unwrap().is_some());
}
