/// Freelist of reusable buffers
///
/// Buffers are handed out FIFO. Whenever idle buffers make up half or less
/// of every buffer the pool has created, the pool doubles before handing one
/// out, so a steady per-frame demand settles after a few frames and
/// `acquire` never fails.

use std::collections::VecDeque;
use crate::resource::{Buffer, BufferElement, GpuResources};
use crate::engine_debug;

/// Growing pool of `Buffer<T>` of one fixed capacity
pub struct BufferPool<T: BufferElement> {
    idle: VecDeque<Buffer<T>>,
    total: usize,
    buffer_capacity: usize,
    resources: GpuResources,
}

impl<T: BufferElement> BufferPool<T> {
    /// Create an empty pool whose buffers hold `buffer_capacity` elements
    pub fn new(resources: &GpuResources, buffer_capacity: usize) -> Self {
        Self {
            idle: VecDeque::new(),
            total: 0,
            buffer_capacity,
            resources: resources.clone(),
        }
    }

    /// Take a cleared buffer, growing the pool first if it runs low
    pub fn acquire(&mut self) -> Buffer<T> {
        if self.idle.len() * 2 <= self.total {
            let grow = self.total.max(1);
            for _ in 0..grow {
                self.idle.push_back(Buffer::new(&self.resources, self.buffer_capacity, true));
            }
            self.total += grow;
            engine_debug!("lime::BufferPool", "{:?} pool grew by {} to {} buffer(s)",
                T::TARGET, grow, self.total);
        }
        // Growth above always leaves at least one idle buffer
        match self.idle.pop_front() {
            Some(buffer) => buffer,
            None => {
                self.total += 1;
                Buffer::new(&self.resources, self.buffer_capacity, true)
            }
        }
    }

    /// Give a buffer back; it is cleared before being queued
    pub fn release(&mut self, mut buffer: Buffer<T>) {
        buffer.clear();
        self.idle.push_back(buffer);
    }

    /// Buffers ever created by this pool
    pub fn total(&self) -> usize {
        self.total
    }

    /// Buffers waiting in the pool
    pub fn idle(&self) -> usize {
        self.idle.len()
    }

    /// Element capacity of every pooled buffer
    pub fn buffer_capacity(&self) -> usize {
        self.buffer_capacity
    }
}

#[cfg(test)]
#[path = "buffer_pool_tests.rs"]
mod tests;
