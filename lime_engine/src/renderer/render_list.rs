/// Render list - turns draw requests into as few batches as possible
///
/// Only the trailing batch is ever extended, so draw order is submission
/// order. Consecutive requests with equal state share a batch as long as
/// both its index buffer and the current vertex buffer have room.

use crate::config::RendererConfig;
use crate::error::Result;
use crate::renderer::{BatchState, PlatformRenderer, RenderBatch, RenderBatchPool};
use crate::resource::{BufferPool, GpuResources, Vertex, VertexBuffer};
use crate::{engine_bail, engine_trace};

// ===== POOLS =====

/// Vertex buffer, index buffer and batch pools of one renderer
pub struct RenderPools {
    vertex_buffers: BufferPool<Vertex>,
    index_buffers: BufferPool<u16>,
    batches: RenderBatchPool,
}

impl RenderPools {
    pub fn new(resources: &GpuResources, config: &RendererConfig) -> Self {
        Self {
            vertex_buffers: BufferPool::new(resources, config.vertex_buffer_capacity),
            index_buffers: BufferPool::new(resources, config.batch_index_capacity),
            batches: RenderBatchPool::new(),
        }
    }

    pub fn vertex_buffers(&self) -> &BufferPool<Vertex> {
        &self.vertex_buffers
    }

    pub fn index_buffers(&self) -> &BufferPool<u16> {
        &self.index_buffers
    }

    pub fn batches(&self) -> &RenderBatchPool {
        &self.batches
    }

    pub fn vertex_buffer_capacity(&self) -> usize {
        self.vertex_buffers.buffer_capacity()
    }

    pub fn batch_index_capacity(&self) -> usize {
        self.index_buffers.buffer_capacity()
    }

    fn acquire_batch(&mut self) -> RenderBatch {
        self.batches.acquire(&mut self.index_buffers)
    }

    fn release_batch(&mut self, batch: RenderBatch) {
        self.batches.release(batch, &mut self.index_buffers);
    }
}

// ===== WRITER =====

/// Write access to the batch returned by `RenderList::request_for_batch`
pub struct BatchWriter<'a> {
    batch: &'a mut RenderBatch,
    vertex_buffer: &'a mut VertexBuffer,
}

impl BatchWriter<'_> {
    pub fn batch(&self) -> &RenderBatch {
        self.batch
    }

    /// Serial of the batch being written
    pub fn serial(&self) -> u64 {
        self.batch.serial()
    }

    /// Append `vertices` and `indices`
    ///
    /// Indices refer to `vertices` (0 is the first vertex written by this
    /// call) and are rebased onto the vertex buffer.
    pub fn write(&mut self, vertices: &[Vertex], indices: &[u16]) -> Result<()> {
        let base_vertex = self.vertex_buffer.extend_from_slice(vertices)?;
        self.batch.push_indices(indices, base_vertex)
    }
}

// ===== RENDER LIST =====

/// Ordered batches and the vertex buffers they draw from
pub struct RenderList {
    batches: Vec<RenderBatch>,
    vertex_buffers: Vec<VertexBuffer>,
}

impl RenderList {
    pub fn new() -> Self {
        Self { batches: Vec::new(), vertex_buffers: Vec::new() }
    }

    /// Find or start the batch for a request of `num_vertices` vertices and `num_indices` indices
    ///
    /// Decision order: a new vertex buffer (and so a new batch) when the
    /// current one lacks room, then the trailing batch when its state matches
    /// and its indices fit, else a new batch on the current vertex buffer.
    pub fn request_for_batch(
        &mut self,
        pools: &mut RenderPools,
        state: BatchState,
        num_vertices: usize,
        num_indices: usize,
    ) -> Result<BatchWriter<'_>> {
        if num_vertices > pools.vertex_buffer_capacity() {
            engine_bail!(CapacityExceeded, "lime::RenderList",
                "{} vertices exceed the vertex buffer capacity {}",
                num_vertices, pools.vertex_buffer_capacity());
        }
        if num_indices > pools.batch_index_capacity() {
            engine_bail!(CapacityExceeded, "lime::RenderList",
                "{} indices exceed the batch capacity {}",
                num_indices, pools.batch_index_capacity());
        }

        let needs_vertex_buffer = self
            .vertex_buffers
            .last()
            .map_or(true, |buffer| buffer.remaining() < num_vertices);
        if needs_vertex_buffer {
            self.vertex_buffers.push(pools.vertex_buffers.acquire());
        }
        let reuse = !needs_vertex_buffer
            && self
                .batches
                .last()
                .is_some_and(|batch| *batch.state() == state && batch.index_headroom() >= num_indices);
        if !reuse {
            let mut batch = pools.acquire_batch();
            batch.reset(state, self.vertex_buffers.len() - 1);
            engine_trace!("lime::RenderList", "Batch {} started", batch.serial());
            self.batches.push(batch);
        }

        let (Some(batch), Some(vertex_buffer)) = (self.batches.last_mut(), self.vertex_buffers.last_mut()) else {
            engine_bail!(InvalidObjectState, "lime::RenderList", "Render list has no batch to write");
        };
        Ok(BatchWriter { batch, vertex_buffer })
    }

    /// Draw every batch in order
    ///
    /// A vertex buffer is bound (and uploaded if needed) only when it differs
    /// from the previous batch's.
    pub fn render(&mut self, platform: &mut PlatformRenderer) -> Result<()> {
        let mut bound = None;
        for batch in &mut self.batches {
            if batch.index_count() == 0 {
                continue;
            }
            let index = batch.vertex_buffer_index();
            if bound != Some(index) {
                let Some(vertex_buffer) = self.vertex_buffers.get_mut(index) else {
                    engine_bail!(InvalidObjectState, "lime::RenderList",
                        "Batch {} refers to missing vertex buffer {}", batch.serial(), index);
                };
                vertex_buffer.bind(platform)?;
                bound = Some(index);
            }
            batch.render(platform)?;
        }
        Ok(())
    }

    /// Return every batch and vertex buffer to the pools
    pub fn clear(&mut self, pools: &mut RenderPools) {
        for batch in self.batches.drain(..) {
            pools.release_batch(batch);
        }
        for buffer in self.vertex_buffers.drain(..) {
            pools.vertex_buffers.release(buffer);
        }
    }

    /// Render then clear; nothing happens when the list is empty
    pub fn flush(&mut self, platform: &mut PlatformRenderer, pools: &mut RenderPools) -> Result<()> {
        if self.is_empty() {
            return Ok(());
        }
        let result = self.render(platform);
        self.clear(pools);
        result
    }

    pub fn is_empty(&self) -> bool {
        self.batches.is_empty()
    }

    pub fn batch_count(&self) -> usize {
        self.batches.len()
    }

    pub fn vertex_buffer_count(&self) -> usize {
        self.vertex_buffers.len()
    }

    pub fn batches(&self) -> &[RenderBatch] {
        &self.batches
    }

    pub fn vertex_buffers(&self) -> &[VertexBuffer] {
        &self.vertex_buffers
    }
}

impl Default for RenderList {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
#[path = "render_list_tests.rs"]
mod tests;
