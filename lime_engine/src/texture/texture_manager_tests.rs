use super::*;
use crate::graphics_device::{DeviceCall, FormatSupport, RecordingDevice};
use crate::resource::{GpuObjectRegistry, RenderingDispatcher};

// ============================================================================
// Helpers
// ============================================================================

fn manager(formats: FormatSupport) -> (TextureManager, RenderingDispatcher) {
    let dispatcher = RenderingDispatcher::new();
    let resources = GpuResources::new(Arc::new(GpuObjectRegistry::new()), dispatcher.queue());
    let manager = TextureManager::new(resources, Capabilities::with_formats(formats), TextureConfig::default());
    (manager, dispatcher)
}

fn handle(raw: u32) -> TextureHandle {
    TextureHandle::new(raw).unwrap()
}

// ============================================================================
// Deferred deletion
// ============================================================================

#[test]
fn test_scheduled_textures_deleted_in_one_call() {
    let (manager, _dispatcher) = manager(FormatSupport::empty());
    let mut device = RecordingDevice::minimal();
    for raw in 1..=3 {
        manager.schedule_delete(handle(raw), 1);
    }
    assert_eq!(manager.pending_deletions(), 3);

    assert_eq!(manager.delete_scheduled_textures(&mut device), 3);
    assert_eq!(device.calls(), vec![DeviceCall::DeleteTextures(vec![handle(1), handle(2), handle(3)])]);
    assert_eq!(manager.pending_deletions(), 0);
}

#[test]
fn test_nothing_scheduled_issues_no_call() {
    let (manager, _dispatcher) = manager(FormatSupport::empty());
    let mut device = RecordingDevice::minimal();
    assert_eq!(manager.delete_scheduled_textures(&mut device), 0);
    assert!(device.calls().is_empty());
}

#[test]
fn test_handles_from_old_generation_are_dropped() {
    let (manager, _dispatcher) = manager(FormatSupport::empty());
    let mut device = RecordingDevice::minimal();
    manager.schedule_delete(handle(1), 1);
    device.lose_context();
    device.restore_context();
    manager.schedule_delete(handle(7), 2);

    assert_eq!(manager.delete_scheduled_textures(&mut device), 1);
    assert_eq!(device.calls(), vec![DeviceCall::DeleteTextures(vec![handle(7)])]);
    assert_eq!(manager.pending_deletions(), 0);
}

#[test]
fn test_no_current_context_drops_everything() {
    let (manager, _dispatcher) = manager(FormatSupport::empty());
    let mut device = RecordingDevice::minimal();
    manager.schedule_delete(handle(1), 1);
    device.lose_context();

    assert_eq!(manager.delete_scheduled_textures(&mut device), 0);
    assert!(device.calls().is_empty());
    assert_eq!(manager.pending_deletions(), 0);
}

#[test]
fn test_clones_share_the_queue() {
    let (manager, _dispatcher) = manager(FormatSupport::empty());
    let clone = manager.clone();
    std::thread::spawn(move || clone.schedule_delete(handle(4), 1)).join().unwrap();
    assert_eq!(manager.pending_deletions(), 1);
}

// ============================================================================
// Memory / capabilities
// ============================================================================

#[test]
fn test_memory_accounting_saturates() {
    let (manager, _dispatcher) = manager(FormatSupport::empty());
    manager.ledger().add_memory(1000);
    manager.ledger().add_memory(24);
    assert_eq!(manager.total_memory_used(), 1024);

    manager.ledger().release_memory(1000);
    manager.ledger().release_memory(100);
    assert_eq!(manager.total_memory_used(), 0);
}

#[test]
fn test_capabilities_are_cached() {
    let (manager, _dispatcher) = manager(FormatSupport::ETC1 | FormatSupport::NPOT);
    assert!(manager.supports(CompressedFormat::Etc1));
    assert!(!manager.supports(CompressedFormat::Etc2Rgb8));
    assert!(manager.supports_npot());
}
