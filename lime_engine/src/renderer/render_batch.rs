/// Render batches - one indexed draw call each
///
/// A batch holds an index buffer of fixed capacity and points at one vertex
/// buffer of its render list. Batches are recycled through a FIFO pool; a
/// recycled batch keeps its serial, while its index buffer goes back to the
/// index buffer pool.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicU64, Ordering};
use crate::error::Result;
use crate::graphics_device::TextureHandle;
use crate::renderer::{Blending, PlatformRenderer, ShaderId};
use crate::resource::{BufferPool, IndexBuffer};
use crate::engine_bail;

static NEXT_SERIAL: AtomicU64 = AtomicU64::new(1);

/// Everything a draw request must share with a batch to join it
///
/// Textures compare by native handle, so two wrappers around the same
/// native texture merge.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct BatchState {
    pub texture1: Option<TextureHandle>,
    pub texture2: Option<TextureHandle>,
    pub blending: Blending,
    pub shader: ShaderId,
}

impl BatchState {
    pub fn new(
        texture1: Option<TextureHandle>,
        texture2: Option<TextureHandle>,
        blending: Blending,
        shader: ShaderId,
    ) -> Self {
        Self { texture1, texture2, blending, shader }
    }

    /// Number of texture stages the program has to sample
    pub fn texture_count(&self) -> usize {
        match (self.texture1, self.texture2) {
            (_, Some(_)) => 2,
            (Some(_), None) => 1,
            (None, None) => 0,
        }
    }
}

/// One draw call: state, a vertex buffer of the owning list and indices into it
pub struct RenderBatch {
    serial: u64,
    state: BatchState,
    vertex_buffer: usize,
    index_buffer: IndexBuffer,
}

impl RenderBatch {
    /// Wrap `index_buffer`; its capacity is the batch's index capacity
    pub fn new(index_buffer: IndexBuffer) -> Self {
        Self {
            serial: NEXT_SERIAL.fetch_add(1, Ordering::Relaxed),
            state: BatchState::default(),
            vertex_buffer: 0,
            index_buffer,
        }
    }

    fn recycled(serial: u64, index_buffer: IndexBuffer) -> Self {
        Self { serial, state: BatchState::default(), vertex_buffer: 0, index_buffer }
    }

    /// Process-unique identity of this batch
    pub fn serial(&self) -> u64 {
        self.serial
    }

    pub fn state(&self) -> &BatchState {
        &self.state
    }

    /// Position of the batch's vertex buffer in its render list
    pub fn vertex_buffer_index(&self) -> usize {
        self.vertex_buffer
    }

    pub fn index_count(&self) -> usize {
        self.index_buffer.count()
    }

    pub fn index_capacity(&self) -> usize {
        self.index_buffer.capacity()
    }

    /// Indices that still fit
    pub fn index_headroom(&self) -> usize {
        self.index_buffer.remaining()
    }

    pub fn indices(&self) -> &[u16] {
        self.index_buffer.data()
    }

    /// Stamp a recycled batch with new state
    pub(crate) fn reset(&mut self, state: BatchState, vertex_buffer: usize) {
        self.state = state;
        self.vertex_buffer = vertex_buffer;
        self.index_buffer.clear();
    }

    /// Append `indices`, each offset by `base_vertex`
    pub(crate) fn push_indices(&mut self, indices: &[u16], base_vertex: usize) -> Result<()> {
        let mut rebased = Vec::with_capacity(indices.len());
        for &index in indices {
            let Ok(index) = u16::try_from(base_vertex + index as usize) else {
                engine_bail!(CapacityExceeded, "lime::RenderBatch",
                    "Index {} + {} does not fit 16 bits", base_vertex, index);
            };
            rebased.push(index);
        }
        self.index_buffer.extend_from_slice(&rebased)?;
        Ok(())
    }

    /// Apply the batch state and draw its indices
    ///
    /// The batch's vertex buffer must already be bound.
    pub fn render(&mut self, platform: &mut PlatformRenderer) -> Result<()> {
        let count = self.index_buffer.count();
        platform.set_texture(self.state.texture1, 0);
        platform.set_texture(self.state.texture2, 1);
        platform.set_blending(self.state.blending);
        platform.set_shader(self.state.shader, self.state.texture_count());
        self.index_buffer.bind(platform)?;
        platform.draw_triangles(count as u32);
        Ok(())
    }

    /// Give up the index buffer, keeping the serial for reuse
    fn into_parts(self) -> (u64, IndexBuffer) {
        (self.serial, self.index_buffer)
    }
}

/// FIFO freelist of batches
///
/// Unlike `BufferPool` it does not grow ahead of demand: an empty pool
/// simply makes a new batch. Index buffers are lent by the index
/// `BufferPool` for as long as a batch is in use.
pub struct RenderBatchPool {
    idle: VecDeque<u64>,
    total: usize,
}

impl RenderBatchPool {
    pub fn new() -> Self {
        Self { idle: VecDeque::new(), total: 0 }
    }

    /// Take a batch with an empty index buffer from `index_pool`
    pub fn acquire(&mut self, index_pool: &mut BufferPool<u16>) -> RenderBatch {
        let index_buffer = index_pool.acquire();
        match self.idle.pop_front() {
            Some(serial) => RenderBatch::recycled(serial, index_buffer),
            None => {
                self.total += 1;
                RenderBatch::new(index_buffer)
            }
        }
    }

    /// Recycle `batch`, returning its index buffer to `index_pool`
    pub fn release(&mut self, batch: RenderBatch, index_pool: &mut BufferPool<u16>) {
        let (serial, index_buffer) = batch.into_parts();
        index_pool.release(index_buffer);
        self.idle.push_back(serial);
    }

    /// Batches ever created by this pool
    pub fn total(&self) -> usize {
        self.total
    }

    pub fn idle(&self) -> usize {
        self.idle.len()
    }
}

impl Default for RenderBatchPool {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
#[path = "render_batch_tests.rs"]
mod tests;
