/// Vertex and index buffers with a CPU-side shadow copy
///
/// A buffer keeps its contents in a fixed-capacity `Vec<T>` and uploads them
/// to the GPU the first time it is bound after a change. The native handle
/// is created lazily on first bind, so a buffer whose handle was discarded
/// (context loss) simply re-creates and re-uploads on next use.
///
/// Dropping a buffer discards its handle: the native delete runs later on
/// the rendering thread, and only if the context that created the handle is
/// still current.

use std::sync::Arc;
use bytemuck::Pod;
use crate::error::Result;
use crate::graphics_device::{BufferHandle, BufferTarget, BufferUsage};
use crate::renderer::PlatformRenderer;
use crate::resource::{GpuObject, GpuObjectKey, GpuResources, NativeHandle, RenderingQueue, Vertex};
use crate::engine_bail;

// ===== ELEMENT TYPES =====

/// Element type a buffer can hold
pub trait BufferElement: Pod + Send + Sync + 'static {
    /// Binding point used for this element type
    const TARGET: BufferTarget;
}

impl BufferElement for Vertex {
    const TARGET: BufferTarget = BufferTarget::Vertex;
}

impl BufferElement for u16 {
    const TARGET: BufferTarget = BufferTarget::Index;
}

/// Interleaved vertex buffer
pub type VertexBuffer = Buffer<Vertex>;

/// 16-bit index buffer
pub type IndexBuffer = Buffer<u16>;

// ===== NATIVE SIDE =====

/// Native part of a buffer, shared with the registry
struct GpuBuffer {
    handle: NativeHandle,
    rendering: RenderingQueue,
}

impl GpuObject for GpuBuffer {
    fn discard(&self) {
        if let Some((raw, generation)) = self.handle.take() {
            let handle = BufferHandle(raw);
            self.rendering.invoke_in_context(generation, move |device| {
                device.delete_buffer(handle);
            });
        }
    }
}

// ===== BUFFER =====

/// GPU buffer of `T` with a CPU shadow copy
pub struct Buffer<T: BufferElement> {
    gpu: Arc<GpuBuffer>,
    key: GpuObjectKey,
    resources: GpuResources,
    data: Vec<T>,
    capacity: usize,
    dynamic: bool,
    uploaded: bool,
    disposed: bool,
}

impl<T: BufferElement> Buffer<T> {
    /// Create an empty buffer holding up to `capacity` elements
    ///
    /// No native handle is created until the buffer is first bound.
    pub fn new(resources: &GpuResources, capacity: usize, dynamic: bool) -> Self {
        let gpu = Arc::new(GpuBuffer {
            handle: NativeHandle::empty(),
            rendering: resources.rendering().clone(),
        });
        let key = resources.registry().add(&gpu);
        Self {
            gpu,
            key,
            resources: resources.clone(),
            data: Vec::with_capacity(capacity),
            capacity,
            dynamic,
            uploaded: false,
            disposed: false,
        }
    }

    fn ensure_alive(&self, operation: &str) -> Result<()> {
        if self.disposed {
            engine_bail!(InvalidObjectState, "lime::Buffer",
                "Cannot {} a disposed {:?} buffer", operation, T::TARGET);
        }
        Ok(())
    }

    /// Number of elements currently stored
    pub fn count(&self) -> usize {
        self.data.len()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Elements that still fit
    pub fn remaining(&self) -> usize {
        self.capacity.saturating_sub(self.data.len())
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    pub fn is_dynamic(&self) -> bool {
        self.dynamic
    }

    /// Whether the GPU copy matches the CPU contents
    pub fn is_uploaded(&self) -> bool {
        self.uploaded
    }

    pub fn is_disposed(&self) -> bool {
        self.disposed
    }

    pub fn native_handle(&self) -> Option<BufferHandle> {
        self.gpu.handle.get().map(BufferHandle)
    }

    pub fn data(&self) -> &[T] {
        &self.data
    }

    fn usage(&self) -> BufferUsage {
        if self.dynamic { BufferUsage::DynamicDraw } else { BufferUsage::StaticDraw }
    }

    /// Append one element
    pub fn push(&mut self, item: T) -> Result<()> {
        self.ensure_alive("write to")?;
        debug_assert!(self.data.len() < self.capacity, "buffer capacity {} exceeded", self.capacity);
        self.data.push(item);
        self.uploaded = false;
        Ok(())
    }

    /// Append `items`, returning the index of the first one
    pub fn extend_from_slice(&mut self, items: &[T]) -> Result<usize> {
        self.ensure_alive("write to")?;
        debug_assert!(
            self.data.len() + items.len() <= self.capacity,
            "buffer capacity {} exceeded", self.capacity
        );
        let start = self.data.len();
        self.data.extend_from_slice(items);
        self.uploaded = false;
        Ok(start)
    }

    /// Replace the contents with the first `count` elements of `data` and upload them now
    pub fn set_data(&mut self, platform: &mut PlatformRenderer, data: &[T], count: usize) -> Result<()> {
        self.ensure_alive("upload")?;
        debug_assert!(count <= data.len(), "count {} exceeds data length {}", count, data.len());
        debug_assert!(count <= self.capacity, "count {} exceeds capacity {}", count, self.capacity);
        self.data.clear();
        self.data.extend_from_slice(&data[..count]);
        let handle = self.ensure_handle(platform)?;
        platform.bind_buffer(T::TARGET, Some(handle));
        self.upload(platform);
        Ok(())
    }

    /// Force the next bind to upload
    pub fn mark_dirty(&mut self) {
        self.uploaded = false;
    }

    /// Drop the contents, keeping the native handle
    pub fn clear(&mut self) {
        self.data.clear();
        self.uploaded = false;
    }

    /// Bind the buffer, uploading the CPU contents if they changed
    pub fn bind(&mut self, platform: &mut PlatformRenderer) -> Result<()> {
        self.ensure_alive("bind")?;
        let handle = self.ensure_handle(platform)?;
        platform.bind_buffer(T::TARGET, Some(handle));
        if !self.uploaded {
            self.upload(platform);
        }
        Ok(())
    }

    /// Release the native handle; later operations fail with `InvalidObjectState`
    pub fn dispose(&mut self) {
        if !self.disposed {
            self.disposed = true;
            self.gpu.discard();
            self.data = Vec::new();
            self.uploaded = false;
        }
    }

    fn ensure_handle(&mut self, platform: &mut PlatformRenderer) -> Result<BufferHandle> {
        if let Some(raw) = self.gpu.handle.get() {
            return Ok(BufferHandle(raw));
        }
        let handle = platform.device_mut().create_buffer()?;
        let generation = platform.device().context_generation();
        self.gpu.handle.replace(handle.0, generation);
        self.uploaded = false;
        Ok(handle)
    }

    fn upload(&mut self, platform: &mut PlatformRenderer) {
        let bytes: &[u8] = bytemuck::cast_slice(&self.data);
        let usage = self.usage();
        platform.device_mut().buffer_data(T::TARGET, bytes, usage);
        self.uploaded = true;
    }
}

impl<T: BufferElement> Drop for Buffer<T> {
    fn drop(&mut self) {
        self.gpu.discard();
        self.resources.registry().remove(self.key);
    }
}

#[cfg(test)]
#[path = "buffer_tests.rs"]
mod tests;
