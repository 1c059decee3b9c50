/// Device - owning graphics context and resource factory
///
/// The device wraps a boxed [`Backend`] together with the context state the
/// resource types share: the garbage-collection policy, the allocation
/// statistics counters and the deferred-delete collector queue. Resources
/// hold only weak references back to this shared state; when the device is
/// torn down while resources are still alive, those resources become
/// implicitly invalid and their cleanup emits no further device calls.

use crate::device::backend::{Backend, BackendLimits, RawHandle};
use crate::device::buffer::{Buffer, BufferDesc};
use crate::device::texture_array::{TextureArray, TextureArrayDesc};
use crate::device::types::{ApiVariant, GcMode};
use crate::error::Result;
use rustc_hash::FxHashMap;
use std::sync::{Arc, Mutex, Weak};

// ===== ALLOCATION STATS =====

/// Process-wide allocation counters, keyed by resource kind
/// (`"texture"`, `"buffer"`).
///
/// Used for leak diagnostics: `active(kind)` is the number of device-side
/// objects of that kind currently alive.
#[derive(Default)]
pub struct AllocationStats {
    counters: Mutex<FxHashMap<&'static str, Counter>>,
}

#[derive(Default, Clone, Copy)]
struct Counter {
    created: u64,
    freed: u64,
}

impl AllocationStats {
    pub(crate) fn incr(&self, kind: &'static str) {
        let mut counters = self.counters.lock().unwrap();
        counters.entry(kind).or_default().created += 1;
    }

    pub(crate) fn decr(&self, kind: &'static str) {
        let mut counters = self.counters.lock().unwrap();
        counters.entry(kind).or_default().freed += 1;
    }

    /// Total number of objects of this kind created so far
    pub fn created(&self, kind: &str) -> u64 {
        self.counters.lock().unwrap().get(kind).map_or(0, |c| c.created)
    }

    /// Total number of objects of this kind freed so far
    pub fn freed(&self, kind: &str) -> u64 {
        self.counters.lock().unwrap().get(kind).map_or(0, |c| c.freed)
    }

    /// Number of objects of this kind currently alive
    pub fn active(&self, kind: &str) -> u64 {
        let counters = self.counters.lock().unwrap();
        counters.get(kind).map_or(0, |c| c.created - c.freed)
    }
}

// ===== SHARED CONTEXT STATE =====

/// Deferred-delete queue entry
pub(crate) enum PendingDelete {
    Texture(RawHandle),
    Buffer(RawHandle),
}

/// Context state shared between the device and its resources
pub(crate) struct DeviceShared {
    pub(crate) backend: Box<dyn Backend>,
    pub(crate) limits: BackendLimits,
    /// Unit reserved for internal binding fiddling (the last unit, so
    /// collaborator bindings on low units survive resource operations)
    pub(crate) default_unit: u32,
    pub(crate) gc_mode: Mutex<GcMode>,
    pub(crate) stats: AllocationStats,
    pub(crate) collector: Mutex<Vec<PendingDelete>>,
}

// ===== DEVICE =====

/// The owning graphics context through which all GPU object creation and
/// state changes are issued.
///
/// Cheap to clone (all clones share the same context state). Single
/// factory for [`TextureArray`] and [`Buffer`] resources.
///
/// # Example
///
/// ```
/// use nebula_2d_engine::nebula2d::device::{Device, TextureArrayDesc};
/// use nebula_2d_engine_device_headless::HeadlessBackend;
///
/// let device = Device::new(HeadlessBackend::new());
/// let texture = device.texture(TextureArrayDesc {
///     size: (64, 64, 4),
///     ..Default::default()
/// })?;
/// # Ok::<(), nebula_2d_engine::nebula2d::Error>(())
/// ```
#[derive(Clone)]
pub struct Device {
    shared: Arc<DeviceShared>,
}

impl std::fmt::Debug for Device {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Device")
            .field("api", &self.shared.backend.api_variant())
            .finish_non_exhaustive()
    }
}

impl Device {
    /// Create a device over a backend implementation
    pub fn new<B: Backend + 'static>(backend: B) -> Self {
        let limits = backend.limits();
        let default_unit = limits.max_texture_units.saturating_sub(1);
        crate::engine_debug!(
            "nebula2d::Device",
            "device created (api={:?}, max_samples={}, max_texture_size={})",
            backend.api_variant(),
            limits.max_samples,
            limits.max_texture_size
        );
        Self {
            shared: Arc::new(DeviceShared {
                backend: Box::new(backend),
                limits,
                default_unit,
                gc_mode: Mutex::new(GcMode::default()),
                stats: AllocationStats::default(),
                collector: Mutex::new(Vec::new()),
            }),
        }
    }

    // ----- factories -----

    /// Create a texture array
    pub fn texture(&self, desc: TextureArrayDesc<'_>) -> Result<TextureArray> {
        TextureArray::new(&self.shared, desc)
    }

    /// Create a depth texture array of the given size
    pub fn depth_texture(&self, size: (u32, u32, u32)) -> Result<TextureArray> {
        TextureArray::new(
            &self.shared,
            TextureArrayDesc {
                size,
                depth: true,
                ..Default::default()
            },
        )
    }

    /// Create a device-side transfer buffer
    pub fn buffer(&self, desc: BufferDesc<'_>) -> Result<Buffer> {
        Buffer::new(&self.shared, desc)
    }

    // ----- garbage collection -----

    /// The active resource-lifetime policy
    pub fn gc_mode(&self) -> GcMode {
        *self.shared.gc_mode.lock().unwrap()
    }

    /// Change the resource-lifetime policy.
    ///
    /// Applies to resources dropped from this point on; already-queued
    /// collector entries still require a `gc()` pass.
    pub fn set_gc_mode(&self, mode: GcMode) {
        *self.shared.gc_mode.lock().unwrap() = mode;
    }

    /// Release all handles queued by resources dropped under the
    /// deferred-collect policy. Returns the number of objects released.
    pub fn gc(&self) -> usize {
        let pending: Vec<PendingDelete> = {
            let mut collector = self.shared.collector.lock().unwrap();
            collector.drain(..).collect()
        };
        let count = pending.len();
        for entry in pending {
            match entry {
                PendingDelete::Texture(handle) => {
                    self.shared.backend.delete_texture(handle);
                    self.shared.stats.decr("texture");
                }
                PendingDelete::Buffer(handle) => {
                    self.shared.backend.delete_buffer(handle);
                    self.shared.stats.decr("buffer");
                }
            }
        }
        if count > 0 {
            crate::engine_debug!("nebula2d::Device", "gc pass released {} objects", count);
        }
        count
    }

    // ----- introspection -----

    /// Capability limits of the underlying backend
    pub fn limits(&self) -> BackendLimits {
        self.shared.limits
    }

    /// API variant of the underlying backend
    pub fn api_variant(&self) -> ApiVariant {
        self.shared.backend.api_variant()
    }

    /// The texture unit reserved for internal binding operations
    pub fn default_texture_unit(&self) -> u32 {
        self.shared.default_unit
    }

    /// Allocation statistics for leak diagnostics
    pub fn stats(&self) -> &AllocationStats {
        &self.shared.stats
    }
}

/// Resolve a resource's weak context reference, or fail with a
/// `Resource` error when the device has been torn down.
pub(crate) fn upgrade_device(weak: &Weak<DeviceShared>) -> Result<Arc<DeviceShared>> {
    weak.upgrade().ok_or_else(|| {
        crate::error::Error::Resource("device context has been destroyed".to_string())
    })
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
#[path = "device_tests.rs"]
mod tests;
