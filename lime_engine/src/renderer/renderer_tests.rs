use super::*;
use glam::{UVec2, Vec2};
use crate::error::Error;
use crate::graphics_device::{DeviceCall, RecordingDevice, ShaderProgram};
use crate::resource::Color4;
use crate::texture::AtlasPart;

// ============================================================================
// Helpers
// ============================================================================

const QUAD_INDICES: [u16; 6] = [0, 1, 2, 2, 3, 0];

fn create_renderer() -> (Renderer, RecordingDevice) {
    let device = RecordingDevice::minimal();
    let renderer = Renderer::new(Box::new(device.clone()), RendererConfig::default(), TextureConfig::default())
        .unwrap();
    (renderer, device)
}

fn quad() -> [Vertex; 4] {
    [
        Vertex::new(Vec2::new(0.0, 0.0), Vec2::new(0.0, 0.0), Color4::WHITE),
        Vertex::new(Vec2::new(1.0, 0.0), Vec2::new(1.0, 0.0), Color4::WHITE),
        Vertex::new(Vec2::new(1.0, 1.0), Vec2::new(1.0, 1.0), Color4::WHITE),
        Vertex::new(Vec2::new(0.0, 1.0), Vec2::new(0.0, 1.0), Color4::WHITE),
    ]
}

fn loaded_texture(renderer: &mut Renderer) -> Texture2D {
    let mut texture = renderer.create_texture();
    texture.load_pixels(&[255; 16], 2, 2).unwrap();
    renderer.begin_frame().unwrap();
    texture
}

fn draws(device: &RecordingDevice) -> usize {
    device.count(|call| matches!(call, DeviceCall::DrawIndexedTriangles(_)))
}

// ============================================================================
// Construction
// ============================================================================

#[test]
fn test_invalid_capacities_rejected() {
    let device = RecordingDevice::minimal();
    let config = RendererConfig { vertex_buffer_capacity: 70_000, ..Default::default() };
    let result = Renderer::new(Box::new(device.clone()), config, TextureConfig::default());
    assert!(matches!(result, Err(Error::InitializationFailed(_))));

    let config = RendererConfig { batch_index_capacity: 2, ..Default::default() };
    let result = Renderer::new(Box::new(device), config, TextureConfig::default());
    assert!(matches!(result, Err(Error::InitializationFailed(_))));
}

#[test]
fn test_texture_manager_uses_device_capabilities() {
    let (renderer, _device) = create_renderer();
    assert!(!renderer.texture_manager().supports_npot());
}

// ============================================================================
// Frames
// ============================================================================

#[test]
fn test_begin_frame_applies_baseline() {
    let (mut renderer, device) = create_renderer();
    renderer.begin_frame().unwrap();

    let calls = device.calls();
    assert!(calls.contains(&DeviceCall::SetBlendingEnabled(true)));
    assert!(calls.contains(&DeviceCall::UseProgram(ShaderProgram::ColorOnly)));
    assert!(matches!(calls.last(), Some(DeviceCall::Clear(_))));
}

#[test]
fn test_frame_batches_draws() {
    let (mut renderer, device) = create_renderer();
    let texture = loaded_texture(&mut renderer);

    renderer.draw_triangles(Some(&texture), None, Blending::Default, ShaderId::Default, &quad(), &QUAD_INDICES).unwrap();
    renderer.draw_triangles(Some(&texture), None, Blending::Default, ShaderId::Default, &quad(), &QUAD_INDICES).unwrap();
    renderer.draw_triangles(None, None, Blending::Default, ShaderId::Default, &quad(), &QUAD_INDICES).unwrap();
    assert_eq!(renderer.render_list().batch_count(), 2);

    renderer.end_frame().unwrap();
    assert!(renderer.render_list().is_empty());
    assert_eq!(renderer.draw_calls(), 2);
    assert_eq!(device.count(|call| *call == DeviceCall::DrawIndexedTriangles(12)), 1);
    assert_eq!(device.count(|call| *call == DeviceCall::DrawIndexedTriangles(6)), 1);
}

#[test]
fn test_atlas_parts_merge_with_their_atlas() {
    let (mut renderer, _device) = create_renderer();
    let atlas = Arc::new(loaded_texture(&mut renderer));
    let left = AtlasPart::new(Arc::clone(&atlas), UVec2::ZERO, UVec2::new(1, 2));
    let right = AtlasPart::new(Arc::clone(&atlas), UVec2::new(1, 0), UVec2::new(1, 2));

    renderer.draw_triangles(Some(&left), None, Blending::Default, ShaderId::Default, &quad(), &QUAD_INDICES).unwrap();
    renderer.draw_triangles(Some(&right), None, Blending::Default, ShaderId::Default, &quad(), &QUAD_INDICES).unwrap();
    renderer.draw_triangles(Some(&*atlas), None, Blending::Default, ShaderId::Default, &quad(), &QUAD_INDICES).unwrap();
    assert_eq!(renderer.render_list().batch_count(), 1);
}

#[test]
fn test_disposed_texture_cannot_be_drawn() {
    let (mut renderer, _device) = create_renderer();
    let mut texture = loaded_texture(&mut renderer);
    texture.dispose();

    let result = renderer.draw_triangles(Some(&texture), None, Blending::Default, ShaderId::Default, &quad(), &QUAD_INDICES);
    assert!(matches!(result, Err(Error::InvalidObjectState(_))));
}

#[test]
fn test_driver_errors_reported_at_end_of_frame() {
    let device = RecordingDevice::minimal();
    let config = RendererConfig { check_errors: true, ..Default::default() };
    let mut renderer = Renderer::new(Box::new(device.clone()), config, TextureConfig::default()).unwrap();
    renderer.begin_frame().unwrap();
    device.push_error(0x0502);

    assert_eq!(renderer.end_frame(), Err(Error::DriverErrors(vec![0x0502])));
}

#[test]
fn test_orthogonal_projection() {
    let (mut renderer, device) = create_renderer();
    renderer.set_orthogonal_projection(0.0, 800.0, 600.0, 0.0);
    let expected = glam::Mat4::orthographic_rh_gl(0.0, 800.0, 600.0, 0.0, -1.0, 1.0);
    assert_eq!(device.calls(), vec![DeviceCall::SetProjection(expected)]);
}

// ============================================================================
// Deferred work / context loss
// ============================================================================

#[test]
fn test_begin_frame_deletes_before_uploading() {
    let (mut renderer, device) = create_renderer();
    let mut texture = loaded_texture(&mut renderer);
    device.take_calls();

    texture.load_pixels(&[0; 4], 1, 1).unwrap();
    renderer.begin_frame().unwrap();
    let calls = device.calls();
    let delete = calls.iter().position(|call| matches!(call, DeviceCall::DeleteTextures(_)));
    let create = calls.iter().position(|call| matches!(call, DeviceCall::CreateTexture(_)));
    assert!(delete.unwrap() < create.unwrap());
}

#[test]
fn test_queued_work_runs_at_frame_start() {
    let (mut renderer, device) = create_renderer();
    renderer.rendering_queue().invoke(|device| device.clear([1.0, 0.0, 0.0, 1.0]));
    assert!(device.calls().is_empty());

    renderer.begin_frame().unwrap();
    assert_eq!(device.calls()[0], DeviceCall::Clear([1.0, 0.0, 0.0, 1.0]));
}

#[test]
fn test_context_loss_recovers_buffers() {
    let (mut renderer, device) = create_renderer();
    renderer.begin_frame().unwrap();
    renderer.draw_triangles(None, None, Blending::Default, ShaderId::Default, &quad(), &QUAD_INDICES).unwrap();
    renderer.end_frame().unwrap();

    device.lose_context();
    renderer.context_lost();
    renderer.context_lost();
    device.restore_context();
    renderer.context_restored();
    device.take_calls();

    renderer.begin_frame().unwrap();
    // Old buffers belong to the lost context: no native delete reaches the new one
    assert_eq!(device.count(|call| matches!(call, DeviceCall::DeleteBuffer(_))), 0);

    renderer.draw_triangles(None, None, Blending::Default, ShaderId::Default, &quad(), &QUAD_INDICES).unwrap();
    renderer.end_frame().unwrap();
    assert_eq!(device.count(|call| matches!(call, DeviceCall::CreateBuffer(_))), 2);
    assert_eq!(draws(&device), 1);
}

#[test]
fn test_context_loss_empties_textures() {
    let (mut renderer, device) = create_renderer();
    let texture = loaded_texture(&mut renderer);
    assert!(texture.native_handle().unwrap().is_some());

    device.lose_context();
    renderer.context_lost();
    assert_eq!(texture.native_handle().unwrap(), None);
    assert_eq!(renderer.texture_manager().total_memory_used(), 0);

    device.restore_context();
    renderer.context_restored();
    renderer.begin_frame().unwrap();
    assert_eq!(device.count(|call| matches!(call, DeviceCall::DeleteTextures(_))), 0);
}
