//! Recording mock backend for unit tests.
//!
//! Records every command as a formatted string so tests can assert on call
//! order (in particular the re-bind-before-stateful-op discipline) without a
//! real device. Storage contents are not modeled; readback returns zeroes.
//! The headless software backend crate covers content-accurate testing.

use crate::device::backend::{
    Backend, BackendLimits, PixelSource, RawHandle, TexParameter,
};
use crate::device::types::{
    ApiVariant, ImageAccess, ImageFormat, InternalFormat, SwizzleChannel, TextureTarget,
};
use crate::error::{Error, Result};
use rustc_hash::FxHashMap;
use std::sync::{Arc, Mutex};

pub struct MockBackend {
    limits: BackendLimits,
    api: ApiVariant,
    fail_texture_alloc: bool,
    fail_buffer_alloc: bool,
    inner: Arc<Mutex<MockState>>,
}

/// Cloneable view into a mock's recorded state, usable after the backend
/// has been moved into a `Device`
#[derive(Clone)]
pub struct MockProbe {
    inner: Arc<Mutex<MockState>>,
}

impl MockProbe {
    /// Snapshot of all recorded calls, in issue order
    pub fn calls(&self) -> Vec<String> {
        self.inner.lock().unwrap().calls.clone()
    }

    /// Number of recorded calls starting with `prefix`
    pub fn call_count(&self, prefix: &str) -> usize {
        self.inner
            .lock()
            .unwrap()
            .calls
            .iter()
            .filter(|c| c.starts_with(prefix))
            .count()
    }

    /// Forget all recorded calls (state like handles is kept)
    pub fn clear_calls(&self) {
        self.inner.lock().unwrap().calls.clear();
    }

    /// Make the next `tex_image` call fail, for exercising error branches
    /// on re-allocation
    pub fn fail_next_tex_image(&self) {
        self.inner.lock().unwrap().fail_next_tex_image = true;
    }
}

struct MockState {
    calls: Vec<String>,
    next_handle: RawHandle,
    swizzle: [SwizzleChannel; 4],
    bindless: FxHashMap<RawHandle, u64>,
    next_bindless: u64,
    resident: Vec<u64>,
    fail_next_tex_image: bool,
}

impl Default for MockState {
    fn default() -> Self {
        Self {
            calls: Vec::new(),
            next_handle: 1,
            swizzle: [
                SwizzleChannel::Red,
                SwizzleChannel::Green,
                SwizzleChannel::Blue,
                SwizzleChannel::Alpha,
            ],
            bindless: FxHashMap::default(),
            next_bindless: 0x1000,
            resident: Vec::new(),
            fail_next_tex_image: false,
        }
    }
}

impl MockBackend {
    pub fn new() -> Self {
        Self {
            limits: BackendLimits::default(),
            api: ApiVariant::Full,
            fail_texture_alloc: false,
            fail_buffer_alloc: false,
            inner: Arc::new(Mutex::new(MockState::default())),
        }
    }

    pub fn restricted() -> Self {
        Self {
            api: ApiVariant::Restricted,
            ..Self::new()
        }
    }

    pub fn with_limits(limits: BackendLimits) -> Self {
        Self {
            limits,
            ..Self::new()
        }
    }

    /// A backend whose allocations always fail (returns handle `0`)
    pub fn failing_alloc() -> Self {
        Self {
            fail_texture_alloc: true,
            fail_buffer_alloc: true,
            ..Self::new()
        }
    }

    /// A probe for inspecting recorded calls once the backend has been
    /// moved into a device
    pub fn probe(&self) -> MockProbe {
        MockProbe {
            inner: self.inner.clone(),
        }
    }

    fn record(&self, call: String) {
        self.inner.lock().unwrap().calls.push(call);
    }
}

impl Backend for MockBackend {
    fn limits(&self) -> BackendLimits {
        self.limits
    }

    fn api_variant(&self) -> ApiVariant {
        self.api
    }

    fn set_active_unit(&self, unit: u32) {
        self.record(format!("set_active_unit({})", unit));
    }

    fn bind_texture(&self, target: TextureTarget, handle: RawHandle) {
        self.record(format!("bind_texture({:?}, {})", target, handle));
    }

    fn create_texture(&self) -> RawHandle {
        if self.fail_texture_alloc {
            self.record("create_texture -> 0".to_string());
            return 0;
        }
        let mut state = self.inner.lock().unwrap();
        let handle = state.next_handle;
        state.next_handle += 1;
        state.calls.push(format!("create_texture -> {}", handle));
        handle
    }

    fn delete_texture(&self, handle: RawHandle) {
        self.record(format!("delete_texture({})", handle));
    }

    fn create_buffer(&self, size: usize, data: Option<&[u8]>) -> RawHandle {
        if self.fail_buffer_alloc {
            self.record("create_buffer -> 0".to_string());
            return 0;
        }
        let mut state = self.inner.lock().unwrap();
        let handle = state.next_handle;
        state.next_handle += 1;
        state.calls.push(format!(
            "create_buffer({}, init={}) -> {}",
            size,
            data.is_some(),
            handle
        ));
        handle
    }

    fn delete_buffer(&self, handle: RawHandle) {
        self.record(format!("delete_buffer({})", handle));
    }

    fn buffer_sub_data(&self, handle: RawHandle, offset: usize, data: &[u8]) -> Result<()> {
        self.record(format!(
            "buffer_sub_data({}, {}, {} bytes)",
            handle,
            offset,
            data.len()
        ));
        Ok(())
    }

    fn bind_pixel_unpack_buffer(&self, handle: RawHandle) {
        self.record(format!("bind_pixel_unpack_buffer({})", handle));
    }

    fn set_pack_alignment(&self, alignment: u32) {
        self.record(format!("set_pack_alignment({})", alignment));
    }

    fn set_unpack_alignment(&self, alignment: u32) {
        self.record(format!("set_unpack_alignment({})", alignment));
    }

    fn tex_storage(
        &self,
        target: TextureTarget,
        levels: u32,
        internal: InternalFormat,
        size: (u32, u32, u32),
    ) -> Result<()> {
        self.record(format!(
            "tex_storage({:?}, levels={}, {:?}, {:?})",
            target, levels, internal, size
        ));
        Ok(())
    }

    fn tex_image(
        &self,
        target: TextureTarget,
        level: u32,
        internal: InternalFormat,
        size: (u32, u32, u32),
        format: ImageFormat,
        data: Option<&[u8]>,
    ) -> Result<()> {
        {
            let mut state = self.inner.lock().unwrap();
            if state.fail_next_tex_image {
                state.fail_next_tex_image = false;
                state.calls.push("tex_image -> error".to_string());
                return Err(Error::Resource(
                    "simulated storage allocation failure".to_string(),
                ));
            }
        }
        self.record(format!(
            "tex_image({:?}, level={}, {:?}, {:?}, {:?}, data={})",
            target,
            level,
            internal,
            size,
            format,
            data.map_or("none".to_string(), |d| format!("{} bytes", d.len()))
        ));
        Ok(())
    }

    fn compressed_tex_image(
        &self,
        target: TextureTarget,
        level: u32,
        internal: InternalFormat,
        size: (u32, u32, u32),
        data: &[u8],
    ) -> Result<()> {
        self.record(format!(
            "compressed_tex_image({:?}, level={}, {:?}, {:?}, {} bytes)",
            target,
            level,
            internal,
            size,
            data.len()
        ));
        Ok(())
    }

    fn tex_image_multisample(
        &self,
        target: TextureTarget,
        samples: u32,
        internal: InternalFormat,
        size: (u32, u32, u32),
        fixed_locations: bool,
    ) -> Result<()> {
        self.record(format!(
            "tex_image_multisample({:?}, samples={}, {:?}, {:?}, fixed={})",
            target, samples, internal, size, fixed_locations
        ));
        Ok(())
    }

    fn tex_sub_image(
        &self,
        target: TextureTarget,
        level: u32,
        offset: (u32, u32, u32),
        size: (u32, u32, u32),
        format: ImageFormat,
        source: PixelSource<'_>,
    ) -> Result<()> {
        let source = match source {
            PixelSource::Bytes(data) => format!("{} bytes", data.len()),
            PixelSource::UnpackBuffer => "unpack-buffer".to_string(),
        };
        self.record(format!(
            "tex_sub_image({:?}, level={}, offset={:?}, size={:?}, {:?}, {})",
            target, level, offset, size, format, source
        ));
        Ok(())
    }

    fn read_tex_image(
        &self,
        target: TextureTarget,
        level: u32,
        format: ImageFormat,
        byte_len: usize,
    ) -> Result<Vec<u8>> {
        self.record(format!(
            "read_tex_image({:?}, level={}, {:?}, {} bytes)",
            target, level, format, byte_len
        ));
        Ok(vec![0; byte_len])
    }

    fn set_tex_parameter(&self, target: TextureTarget, parameter: TexParameter) {
        if let TexParameter::Swizzle(channels) = parameter {
            self.inner.lock().unwrap().swizzle = channels;
        }
        self.record(format!("set_tex_parameter({:?}, {:?})", target, parameter));
    }

    fn query_swizzle(&self, target: TextureTarget) -> [SwizzleChannel; 4] {
        self.record(format!("query_swizzle({:?})", target));
        self.inner.lock().unwrap().swizzle
    }

    fn generate_mipmap(&self, target: TextureTarget) {
        self.record(format!("generate_mipmap({:?})", target));
    }

    fn texture_handle(&self, handle: RawHandle) -> Result<u64> {
        if self.api == ApiVariant::Restricted {
            return Err(Error::Unsupported(
                "bindless texture handles are not available on the restricted API variant"
                    .to_string(),
            ));
        }
        let mut state = self.inner.lock().unwrap();
        let bindless = match state.bindless.get(&handle) {
            Some(existing) => *existing,
            None => {
                let bindless = state.next_bindless;
                state.next_bindless += 1;
                state.bindless.insert(handle, bindless);
                bindless
            }
        };
        state
            .calls
            .push(format!("texture_handle({}) -> {}", handle, bindless));
        Ok(bindless)
    }

    fn is_handle_resident(&self, bindless: u64) -> bool {
        self.inner.lock().unwrap().resident.contains(&bindless)
    }

    fn set_handle_residency(&self, bindless: u64, resident: bool) {
        let mut state = self.inner.lock().unwrap();
        if resident {
            if !state.resident.contains(&bindless) {
                state.resident.push(bindless);
            }
        } else {
            state.resident.retain(|&h| h != bindless);
        }
        state
            .calls
            .push(format!("set_handle_residency({}, {})", bindless, resident));
    }

    fn bind_image_texture(
        &self,
        unit: u32,
        handle: RawHandle,
        level: u32,
        access: ImageAccess,
        internal: InternalFormat,
    ) -> Result<()> {
        self.record(format!(
            "bind_image_texture({}, {}, level={}, {:?}, {:?})",
            unit, handle, level, access, internal
        ));
        Ok(())
    }
}
