/// Texture deletion queue and memory accounting
///
/// Textures may be dropped or reloaded on any thread. Their old native
/// handles land in a pending list that the rendering thread flushes once per
/// frame, before any texture is bound, with a single batched delete call.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use crate::config::TextureConfig;
use crate::graphics_device::{Capabilities, CompressedFormat, GraphicsDevice, TextureHandle};
use crate::resource::GpuResources;
use crate::engine_debug;

const BYTES_PER_MB: f64 = 1024.0 * 1024.0;

/// State shared by the manager and every texture it created
pub(crate) struct TextureLedger {
    pending: Mutex<Vec<(TextureHandle, u64)>>,
    memory_used: AtomicUsize,
}

impl TextureLedger {
    fn pending(&self) -> MutexGuard<'_, Vec<(TextureHandle, u64)>> {
        self.pending.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Queue `handle`, created in context `generation`, for deletion
    pub(crate) fn schedule_delete(&self, handle: TextureHandle, generation: u64) {
        self.pending().push((handle, generation));
    }

    pub(crate) fn add_memory(&self, bytes: usize) {
        self.memory_used.fetch_add(bytes, Ordering::AcqRel);
    }

    pub(crate) fn release_memory(&self, bytes: usize) {
        let _ = self.memory_used.fetch_update(Ordering::AcqRel, Ordering::Acquire, |total| {
            Some(total.saturating_sub(bytes))
        });
    }
}

/// Owner of the texture deletion queue and the texture-side context services
#[derive(Clone)]
pub struct TextureManager {
    ledger: Arc<TextureLedger>,
    resources: GpuResources,
    capabilities: Arc<Capabilities>,
    config: TextureConfig,
}

impl TextureManager {
    /// Create a manager for a context with `capabilities`
    ///
    /// The capabilities are probed once and cached for every later load.
    pub fn new(resources: GpuResources, capabilities: Capabilities, config: TextureConfig) -> Self {
        Self {
            ledger: Arc::new(TextureLedger {
                pending: Mutex::new(Vec::new()),
                memory_used: AtomicUsize::new(0),
            }),
            resources,
            capabilities: Arc::new(capabilities),
            config,
        }
    }

    pub(crate) fn ledger(&self) -> &Arc<TextureLedger> {
        &self.ledger
    }

    pub fn resources(&self) -> &GpuResources {
        &self.resources
    }

    pub fn capabilities(&self) -> &Capabilities {
        &self.capabilities
    }

    pub fn config(&self) -> &TextureConfig {
        &self.config
    }

    pub fn supports(&self, format: CompressedFormat) -> bool {
        self.capabilities.supports(format)
    }

    pub fn supports_npot(&self) -> bool {
        self.capabilities.supports_npot()
    }

    /// Queue a native texture for deletion at the next frame start
    pub fn schedule_delete(&self, handle: TextureHandle, generation: u64) {
        self.ledger.schedule_delete(handle, generation);
    }

    /// Number of handles waiting for deletion
    pub fn pending_deletions(&self) -> usize {
        self.ledger.pending().len()
    }

    /// Bytes of texture data currently uploaded
    pub fn total_memory_used(&self) -> usize {
        self.ledger.memory_used.load(Ordering::Acquire)
    }

    /// Delete every scheduled texture, returning how many native deletes were issued
    ///
    /// Must run on the rendering thread. Handles from an earlier context
    /// generation are dropped without a native call.
    pub fn delete_scheduled_textures(&self, device: &mut dyn GraphicsDevice) -> usize {
        let pending = std::mem::take(&mut *self.ledger.pending());
        if pending.is_empty() {
            return 0;
        }
        let generation = device.context_generation();
        let current = device.is_context_current();
        let handles: Vec<TextureHandle> = pending
            .into_iter()
            .filter(|&(_, handle_generation)| current && handle_generation == generation)
            .map(|(handle, _)| handle)
            .collect();
        if !handles.is_empty() {
            device.delete_textures(&handles);
        }
        engine_debug!("lime::TextureManager",
            "Discarded {} texture(s). Total texture memory: {:.2} mb",
            handles.len(), self.total_memory_used() as f64 / BYTES_PER_MB);
        handles.len()
    }
}

#[cfg(test)]
#[path = "texture_manager_tests.rs"]
mod tests;
