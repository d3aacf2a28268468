/// GPU object registry and native handle cells
///
/// Every object owning a native handle registers a weak reference here.
/// When the context is lost, `discard_objects` tells every live object to
/// forget its handle; objects re-create their native side lazily on next use.
///
/// Registration never keeps an object alive: entries are `Weak`. Objects
/// unregister on drop; entries left behind by objects that never did are
/// swept once the registry outgrows its high-water mark.

use std::num::NonZeroU32;
use std::sync::atomic::{AtomicU32, AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError, Weak};
use slotmap::{new_key_type, SlotMap};
use crate::resource::RenderingQueue;

new_key_type! {
    /// Key of a registry entry
    pub struct GpuObjectKey;
}

/// Object holding native GPU state
pub trait GpuObject: Send + Sync {
    /// Release the native handle, if any
    ///
    /// Must be idempotent and callable from any thread: implementations hand
    /// the actual native release to the rendering thread.
    fn discard(&self);
}

// ===== REGISTRY =====

/// Registry of live GPU objects
pub struct GpuObjectRegistry {
    entries: Mutex<Entries>,
}

/// Entry count below which dead entries are never swept
const MIN_SWEEP_THRESHOLD: usize = 32;

struct Entries {
    objects: SlotMap<GpuObjectKey, Weak<dyn GpuObject>>,
    sweep_at: usize,
}

impl Entries {
    /// Drop entries whose object is gone, then move the mark past the survivors
    fn sweep(&mut self) {
        self.objects.retain(|_, entry| entry.strong_count() > 0);
        self.sweep_at = (self.objects.len() * 2).max(MIN_SWEEP_THRESHOLD);
    }
}

impl GpuObjectRegistry {
    pub fn new() -> Self {
        Self {
            entries: Mutex::new(Entries {
                objects: SlotMap::with_key(),
                sweep_at: MIN_SWEEP_THRESHOLD,
            }),
        }
    }

    fn lock(&self) -> MutexGuard<'_, Entries> {
        self.entries.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Register an object
    ///
    /// Freed slots are reused by the slot map. Reaching the high-water mark
    /// sweeps dead entries first, so the cost stays amortized constant.
    pub fn add<T: GpuObject + 'static>(&self, object: &Arc<T>) -> GpuObjectKey {
        let weak: Weak<dyn GpuObject> = Arc::downgrade(object) as Weak<dyn GpuObject>;
        let mut entries = self.lock();
        if entries.objects.len() >= entries.sweep_at {
            entries.sweep();
        }
        entries.objects.insert(weak)
    }

    /// Unregister an object
    pub fn remove(&self, key: GpuObjectKey) {
        self.lock().objects.remove(key);
    }

    /// Discard every live object, returning how many were reached
    ///
    /// The registry lock is held for the whole sweep so concurrent `add`
    /// calls wait for it.
    pub fn discard_objects(&self) -> usize {
        let entries = self.lock();
        let mut discarded = 0;
        for (_, entry) in entries.objects.iter() {
            if let Some(object) = entry.upgrade() {
                object.discard();
                discarded += 1;
            }
        }
        crate::engine_debug!("lime::GpuObjectRegistry", "Discarded {} GPU object(s)", discarded);
        discarded
    }

    /// Number of entries, including those whose object is gone
    pub fn len(&self) -> usize {
        self.lock().objects.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Number of entries whose object is still alive
    pub fn live_count(&self) -> usize {
        self.lock().objects.values().filter(|entry| entry.strong_count() > 0).count()
    }
}

impl Default for GpuObjectRegistry {
    fn default() -> Self {
        Self::new()
    }
}

// ===== NATIVE HANDLE CELL =====

/// Atomic slot for a native handle and the context generation that created it
///
/// `take` empties the slot, so whichever caller takes it first is the only
/// one to release the handle.
pub struct NativeHandle {
    raw: AtomicU32,
    generation: AtomicU64,
}

impl NativeHandle {
    pub const fn empty() -> Self {
        Self { raw: AtomicU32::new(0), generation: AtomicU64::new(0) }
    }

    pub fn get(&self) -> Option<NonZeroU32> {
        NonZeroU32::new(self.raw.load(Ordering::Acquire))
    }

    pub fn is_set(&self) -> bool {
        self.get().is_some()
    }

    /// Handle and generation without emptying the slot
    pub fn current(&self) -> Option<(NonZeroU32, u64)> {
        let generation = self.generation.load(Ordering::Acquire);
        self.get().map(|raw| (raw, generation))
    }

    /// Store a handle, returning the one it replaces
    pub fn replace(&self, raw: NonZeroU32, generation: u64) -> Option<(NonZeroU32, u64)> {
        let previous_generation = self.generation.swap(generation, Ordering::AcqRel);
        NonZeroU32::new(self.raw.swap(raw.get(), Ordering::AcqRel))
            .map(|previous| (previous, previous_generation))
    }

    /// Empty the slot, returning the handle it held
    pub fn take(&self) -> Option<(NonZeroU32, u64)> {
        let generation = self.generation.load(Ordering::Acquire);
        NonZeroU32::new(self.raw.swap(0, Ordering::AcqRel)).map(|raw| (raw, generation))
    }
}

impl Default for NativeHandle {
    fn default() -> Self {
        Self::empty()
    }
}

// ===== SHARED CONTEXT SERVICES =====

/// Registry and rendering queue shared by every GPU object of one renderer
#[derive(Clone)]
pub struct GpuResources {
    registry: Arc<GpuObjectRegistry>,
    rendering: RenderingQueue,
}

impl GpuResources {
    pub fn new(registry: Arc<GpuObjectRegistry>, rendering: RenderingQueue) -> Self {
        Self { registry, rendering }
    }

    pub fn registry(&self) -> &GpuObjectRegistry {
        &self.registry
    }

    pub fn rendering(&self) -> &RenderingQueue {
        &self.rendering
    }
}

#[cfg(test)]
#[path = "gpu_object_tests.rs"]
mod tests;
