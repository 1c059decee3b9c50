/// Buffer - device-side byte buffer for pixel transfers
///
/// A fixed-size block of device memory, used as the source of zero-copy
/// texture uploads through the pixel-unpack binding (see
/// `TextureArray::write` with [`WriteSource::Buffer`]). Like textures,
/// buffers hold only a weak reference to the device context and follow the
/// device's garbage-collection policy on drop.
///
/// [`WriteSource::Buffer`]: crate::device::texture_array::WriteSource

use crate::device::backend::RawHandle;
use crate::device::device::{upgrade_device, DeviceShared, PendingDelete};
use crate::device::types::GcMode;
use crate::error::{Error, Result};
use std::fmt;
use std::sync::{Arc, Weak};

/// Descriptor for creating a device buffer
#[derive(Debug, Clone, Copy)]
pub struct BufferDesc<'a> {
    /// Size in bytes. Ignored when `data` is given (the data length wins).
    pub size: usize,
    /// Optional initial contents
    pub data: Option<&'a [u8]>,
}

impl Default for BufferDesc<'_> {
    fn default() -> Self {
        Self { size: 0, data: None }
    }
}

/// A fixed-size device-side byte buffer
pub struct Buffer {
    device: Weak<DeviceShared>,
    handle: RawHandle,
    size: usize,
}

impl Buffer {
    /// Create a buffer on a device context. Called through `Device::buffer`.
    pub(crate) fn new(shared: &Arc<DeviceShared>, desc: BufferDesc<'_>) -> Result<Self> {
        let size = match desc.data {
            Some(data) => data.len(),
            None => desc.size,
        };
        if size == 0 {
            return Err(Error::Configuration(
                "buffer size must be positive".to_string(),
            ));
        }

        let handle = shared.backend.create_buffer(size, desc.data);
        if handle == 0 {
            crate::engine_error!(
                "nebula2d::Buffer",
                "device failed to allocate a {} byte buffer",
                size
            );
            return Err(Error::Resource(
                "device failed to allocate a buffer handle".to_string(),
            ));
        }

        shared.stats.incr("buffer");
        crate::engine_trace!("nebula2d::Buffer", "created handle={} size={}", handle, size);

        Ok(Self {
            device: Arc::downgrade(shared),
            handle,
            size,
        })
    }

    /// Size of the buffer in bytes
    pub fn size(&self) -> usize {
        self.size
    }

    /// The device-side handle. `0` once the buffer has been deleted.
    pub fn raw_handle(&self) -> RawHandle {
        self.handle
    }

    /// Overwrite part of the buffer with new bytes.
    /// The range `offset..offset + data.len()` must fit within the buffer.
    pub fn write(&self, data: &[u8], offset: usize) -> Result<()> {
        let shared = self.context()?;
        let end = offset
            .checked_add(data.len())
            .ok_or_else(|| Error::Validation("buffer write range overflows".to_string()))?;
        if end > self.size {
            return Err(Error::Validation(format!(
                "write of {} bytes at offset {} exceeds buffer size {}",
                data.len(),
                offset,
                self.size
            )));
        }
        shared.backend.buffer_sub_data(self.handle, offset, data)
    }

    /// Destroy the underlying device-side resource.
    ///
    /// Idempotent: calling it again (or dropping afterwards) does nothing.
    pub fn delete(&mut self) {
        if self.handle == 0 {
            return;
        }
        if let Some(shared) = self.device.upgrade() {
            shared.backend.delete_buffer(self.handle);
            shared.stats.decr("buffer");
        }
        self.handle = 0;
    }

    fn context(&self) -> Result<Arc<DeviceShared>> {
        if self.handle == 0 {
            return Err(Error::Resource(
                "buffer handle has already been deleted".to_string(),
            ));
        }
        upgrade_device(&self.device)
    }
}

impl Drop for Buffer {
    fn drop(&mut self) {
        if self.handle == 0 {
            return;
        }
        let Some(shared) = self.device.upgrade() else {
            return;
        };
        let mode = *shared.gc_mode.lock().unwrap();
        match mode {
            GcMode::Auto => {
                shared.backend.delete_buffer(self.handle);
                shared.stats.decr("buffer");
            }
            GcMode::DeferredCollect => {
                shared
                    .collector
                    .lock()
                    .unwrap()
                    .push(PendingDelete::Buffer(self.handle));
            }
            GcMode::Manual => {
                crate::engine_warn!(
                    "nebula2d::Buffer",
                    "buffer handle {} dropped without delete() under manual gc mode",
                    self.handle
                );
            }
        }
    }
}

impl fmt::Debug for Buffer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "<Buffer handle={} size={}>", self.handle, self.size)
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
#[path = "buffer_tests.rs"]
mod tests;
