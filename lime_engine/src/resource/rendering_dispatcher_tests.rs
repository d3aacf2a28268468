use super::*;
use crate::graphics_device::{DeviceCall, RecordingDevice};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

#[test]
fn test_run_pending_executes_in_order() {
    let dispatcher = RenderingDispatcher::new();
    let queue = dispatcher.queue();
    queue.invoke(|device| device.draw_indexed_triangles(3));
    queue.invoke(|device| device.draw_indexed_triangles(6));
    assert_eq!(dispatcher.pending(), 2);

    let mut device = RecordingDevice::minimal();
    assert_eq!(dispatcher.run_pending(&mut device), 2);
    assert_eq!(
        device.calls(),
        &[DeviceCall::DrawIndexedTriangles(3), DeviceCall::DrawIndexedTriangles(6)]
    );
    assert_eq!(dispatcher.pending(), 0);
}

#[test]
fn test_invoke_from_other_thread() {
    let dispatcher = RenderingDispatcher::new();
    let queue = dispatcher.queue();
    let handle = std::thread::spawn(move || {
        for _ in 0..10 {
            queue.invoke(|device| device.clear([1.0; 4]));
        }
    });
    handle.join().unwrap();

    let mut device = RecordingDevice::minimal();
    assert_eq!(dispatcher.run_pending(&mut device), 10);
}

#[test]
fn test_invoke_in_context_skips_stale_generation() {
    let dispatcher = RenderingDispatcher::new();
    let queue = dispatcher.queue();
    let mut device = RecordingDevice::minimal();
    let generation = device.context_generation();
    queue.invoke_in_context(generation, |device| device.draw_indexed_triangles(1));

    device.lose_context();
    device.restore_context();
    dispatcher.run_pending(&mut device);
    assert!(device.calls().is_empty());
}

#[test]
fn test_invoke_in_context_runs_current_generation() {
    let dispatcher = RenderingDispatcher::new();
    let mut device = RecordingDevice::minimal();
    dispatcher
        .queue()
        .invoke_in_context(device.context_generation(), |device| device.draw_indexed_triangles(1));
    dispatcher.run_pending(&mut device);
    assert_eq!(device.calls().len(), 1);
}

#[test]
fn test_invoke_if_current_skips_lost_context() {
    let dispatcher = RenderingDispatcher::new();
    let mut device = RecordingDevice::minimal();
    dispatcher.queue().invoke_if_current(|device| device.clear([0.0; 4]));
    device.lose_context();
    dispatcher.run_pending(&mut device);
    assert!(device.calls().is_empty());
}

#[test]
fn test_tasks_queued_by_tasks_wait_for_next_run() {
    let dispatcher = RenderingDispatcher::new();
    let queue = dispatcher.queue();
    let runs = Arc::new(AtomicUsize::new(0));
    let inner_queue = queue.clone();
    let inner_runs = runs.clone();
    queue.invoke(move |_| {
        inner_runs.fetch_add(1, Ordering::SeqCst);
        let runs = inner_runs.clone();
        inner_queue.invoke(move |_| {
            runs.fetch_add(1, Ordering::SeqCst);
        });
    });

    let mut device = RecordingDevice::minimal();
    assert_eq!(dispatcher.run_pending(&mut device), 1);
    assert_eq!(runs.load(Ordering::SeqCst), 1);
    assert_eq!(dispatcher.run_pending(&mut device), 1);
    assert_eq!(runs.load(Ordering::SeqCst), 2);
}

#[test]
fn test_invoke_after_dispatcher_dropped_is_silent() {
    let dispatcher = RenderingDispatcher::new();
    let queue = dispatcher.queue();
    drop(dispatcher);
    queue.invoke(|device| device.clear([0.0; 4]));
}
