/// HeadlessBackend - software implementation of the backend trait
///
/// Models the device's process-wide state machine faithfully: an active
/// texture unit, per-(unit, target) bindings, a pixel-unpack binding and
/// pack/unpack alignment. Stateful texture operations act on whatever is
/// bound to the given target on the active unit, exactly like a real
/// device, so binding mistakes in calling code surface as errors here
/// instead of silently working.

use crate::storage::{internal_bytes_per_pixel, TextureStorage};
use nebula_2d_engine::nebula2d::device::{
    ApiVariant, Backend, BackendLimits, ImageAccess, ImageFormat, InternalFormat, PixelSource,
    RawHandle, SwizzleChannel, TexParameter, TextureTarget,
};
use nebula_2d_engine::nebula2d::{Error, Result};
use rustc_hash::{FxHashMap, FxHashSet};
use slotmap::{new_key_type, Key, KeyData, SlotMap};
use std::sync::Mutex;

new_key_type! {
    struct TextureKey;
    struct BufferKey;
}

// Slotmap keys encode a non-zero version in the high bits, so the ffi form
// of a live key is never 0 and can serve directly as a raw handle.
fn texture_key(handle: RawHandle) -> TextureKey {
    TextureKey::from(KeyData::from_ffi(handle))
}

fn buffer_key(handle: RawHandle) -> BufferKey {
    BufferKey::from(KeyData::from_ffi(handle))
}

struct HeadlessState {
    textures: SlotMap<TextureKey, TextureStorage>,
    buffers: SlotMap<BufferKey, Vec<u8>>,
    active_unit: u32,
    bound: FxHashMap<(u32, TextureTarget), RawHandle>,
    unpack_buffer: RawHandle,
    pack_alignment: u32,
    unpack_alignment: u32,
    bindless: FxHashMap<RawHandle, u64>,
    resident: FxHashSet<u64>,
    next_bindless: u64,
}

impl Default for HeadlessState {
    fn default() -> Self {
        Self {
            textures: SlotMap::with_key(),
            buffers: SlotMap::with_key(),
            active_unit: 0,
            bound: FxHashMap::default(),
            unpack_buffer: 0,
            pack_alignment: 4,
            unpack_alignment: 4,
            bindless: FxHashMap::default(),
            resident: FxHashSet::default(),
            next_bindless: 0x4000_0000,
        }
    }
}

impl HeadlessState {
    /// The texture bound to `target` on the active unit
    fn bound_texture(&mut self, target: TextureTarget) -> Result<&mut TextureStorage> {
        let unit = self.active_unit;
        let handle = self
            .bound
            .get(&(unit, target))
            .copied()
            .filter(|&h| h != 0)
            .ok_or_else(|| {
                Error::Validation(format!("no texture bound to {:?} on unit {}", target, unit))
            })?;
        self.textures.get_mut(texture_key(handle)).ok_or_else(|| {
            Error::Validation(format!("bound texture handle {} no longer exists", handle))
        })
    }
}

/// Software device backend: all storage lives in host memory
pub struct HeadlessBackend {
    limits: BackendLimits,
    api: ApiVariant,
    state: Mutex<HeadlessState>,
}

impl HeadlessBackend {
    pub fn new() -> Self {
        Self::with_limits(BackendLimits::default())
    }

    pub fn with_limits(limits: BackendLimits) -> Self {
        Self {
            limits,
            api: ApiVariant::Full,
            state: Mutex::new(HeadlessState::default()),
        }
    }

    /// A backend reporting the restricted API variant (no readback, no
    /// bindless handles)
    pub fn restricted() -> Self {
        Self {
            api: ApiVariant::Restricted,
            ..Self::new()
        }
    }
}

impl Default for HeadlessBackend {
    fn default() -> Self {
        Self::new()
    }
}

impl Backend for HeadlessBackend {
    fn limits(&self) -> BackendLimits {
        self.limits
    }

    fn api_variant(&self) -> ApiVariant {
        self.api
    }

    fn set_active_unit(&self, unit: u32) {
        self.state.lock().unwrap().active_unit = unit;
    }

    fn bind_texture(&self, target: TextureTarget, handle: RawHandle) {
        let mut state = self.state.lock().unwrap();
        let unit = state.active_unit;
        state.bound.insert((unit, target), handle);
    }

    fn create_texture(&self) -> RawHandle {
        let mut state = self.state.lock().unwrap();
        state.textures.insert(TextureStorage::new()).data().as_ffi()
    }

    fn delete_texture(&self, handle: RawHandle) {
        let mut state = self.state.lock().unwrap();
        state.textures.remove(texture_key(handle));
        state.bound.retain(|_, &mut bound| bound != handle);
        if let Some(bindless) = state.bindless.remove(&handle) {
            state.resident.remove(&bindless);
        }
    }

    fn create_buffer(&self, size: usize, data: Option<&[u8]>) -> RawHandle {
        let mut state = self.state.lock().unwrap();
        let mut contents = vec![0u8; size];
        if let Some(data) = data {
            let len = data.len().min(size);
            contents[..len].copy_from_slice(&data[..len]);
        }
        state.buffers.insert(contents).data().as_ffi()
    }

    fn delete_buffer(&self, handle: RawHandle) {
        let mut state = self.state.lock().unwrap();
        state.buffers.remove(buffer_key(handle));
        if state.unpack_buffer == handle {
            state.unpack_buffer = 0;
        }
    }

    fn buffer_sub_data(&self, handle: RawHandle, offset: usize, data: &[u8]) -> Result<()> {
        let mut state = self.state.lock().unwrap();
        let buffer = state
            .buffers
            .get_mut(buffer_key(handle))
            .ok_or_else(|| Error::Validation(format!("buffer handle {} does not exist", handle)))?;
        let end = offset + data.len();
        if end > buffer.len() {
            return Err(Error::Validation(format!(
                "write of {} bytes at offset {} exceeds buffer size {}",
                data.len(),
                offset,
                buffer.len()
            )));
        }
        buffer[offset..end].copy_from_slice(data);
        Ok(())
    }

    fn bind_pixel_unpack_buffer(&self, handle: RawHandle) {
        self.state.lock().unwrap().unpack_buffer = handle;
    }

    fn set_pack_alignment(&self, alignment: u32) {
        self.state.lock().unwrap().pack_alignment = alignment;
    }

    fn set_unpack_alignment(&self, alignment: u32) {
        self.state.lock().unwrap().unpack_alignment = alignment;
    }

    fn tex_storage(
        &self,
        target: TextureTarget,
        levels: u32,
        internal: InternalFormat,
        size: (u32, u32, u32),
    ) -> Result<()> {
        let mut state = self.state.lock().unwrap();
        let texture = state.bound_texture(target)?;
        texture.allocate(internal, size, levels)?;
        texture.immutable = true;
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
        if internal_bytes_per_pixel(internal) != format.bytes_per_pixel() {
            return Err(Error::Validation(format!(
                "transfer format {:?} does not match internal format {:?}",
                format, internal
            )));
        }
        let mut state = self.state.lock().unwrap();
        let texture = state.bound_texture(target)?;
        texture.allocate(internal, size, level + 1)?;
        if let Some(data) = data {
            texture.write_region(level, (0, 0, 0), size, data)?;
        }
        Ok(())
    }

    fn compressed_tex_image(
        &self,
        target: TextureTarget,
        _level: u32,
        internal: InternalFormat,
        size: (u32, u32, u32),
        data: &[u8],
    ) -> Result<()> {
        let mut state = self.state.lock().unwrap();
        let texture = state.bound_texture(target)?;
        texture.allocate(internal, size, 1)?;
        texture.compressed_data = Some(data.to_vec());
        Ok(())
    }

    fn tex_image_multisample(
        &self,
        target: TextureTarget,
        samples: u32,
        internal: InternalFormat,
        size: (u32, u32, u32),
        _fixed_locations: bool,
    ) -> Result<()> {
        if samples == 0 || samples > self.limits.max_samples {
            return Err(Error::Validation(format!(
                "sample count {} outside the supported range 1..={}",
                samples, self.limits.max_samples
            )));
        }
        let mut state = self.state.lock().unwrap();
        let texture = state.bound_texture(target)?;
        texture.allocate(internal, size, 1)?;
        texture.multisample = true;
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
        let mut state = self.state.lock().unwrap();

        let staged;
        let data: &[u8] = match source {
            PixelSource::Bytes(data) => data,
            PixelSource::UnpackBuffer => {
                let handle = state.unpack_buffer;
                if handle == 0 {
                    return Err(Error::Validation(
                        "no buffer bound to the pixel-unpack binding".to_string(),
                    ));
                }
                staged = state
                    .buffers
                    .get(buffer_key(handle))
                    .ok_or_else(|| {
                        Error::Validation(format!("buffer handle {} does not exist", handle))
                    })?
                    .clone();
                &staged
            }
        };

        let unpack_alignment = state.unpack_alignment;
        let texture = state.bound_texture(target)?;
        if matches!(texture.internal, Some(InternalFormat::Compressed(_))) {
            return Err(Error::Validation(
                "compressed storage has no addressable pixels".to_string(),
            ));
        }
        if texture.bytes_per_pixel != format.bytes_per_pixel() {
            return Err(Error::Validation(format!(
                "transfer format {:?} does not match texture storage",
                format
            )));
        }
        // Incoming rows are tightly packed; row padding is not modeled
        let row_bytes = size.0 as usize * texture.bytes_per_pixel as usize;
        if unpack_alignment > 1 && row_bytes % unpack_alignment as usize != 0 {
            return Err(Error::Unsupported(format!(
                "unpack alignment {} would pad {} byte rows",
                unpack_alignment, row_bytes
            )));
        }
        texture.write_region(level, offset, size, data)
    }

    fn read_tex_image(
        &self,
        target: TextureTarget,
        level: u32,
        format: ImageFormat,
        byte_len: usize,
    ) -> Result<Vec<u8>> {
        let mut state = self.state.lock().unwrap();
        let pack_alignment = state.pack_alignment;
        let texture = state.bound_texture(target)?;
        if texture.compressed_data.is_some() {
            return Err(Error::Unsupported(
                "compressed storage cannot be read back as pixels".to_string(),
            ));
        }
        if texture.bytes_per_pixel != format.bytes_per_pixel() {
            return Err(Error::Validation(format!(
                "transfer format {:?} does not match texture storage",
                format
            )));
        }
        let level = texture.level(level)?;
        // Returned rows are tightly packed; row padding is not modeled
        let row_bytes = level.width as usize * texture.bytes_per_pixel as usize;
        if pack_alignment > 1 && row_bytes % pack_alignment as usize != 0 {
            return Err(Error::Unsupported(format!(
                "pack alignment {} would pad {} byte rows",
                pack_alignment, row_bytes
            )));
        }
        if level.data.len() != byte_len {
            return Err(Error::Validation(format!(
                "read of {} bytes does not match level storage of {} bytes",
                byte_len,
                level.data.len()
            )));
        }
        Ok(level.data.clone())
    }

    fn set_tex_parameter(&self, target: TextureTarget, parameter: TexParameter) {
        let mut state = self.state.lock().unwrap();
        if let Ok(texture) = state.bound_texture(target) {
            if let TexParameter::Swizzle(channels) = parameter {
                texture.swizzle = channels;
            }
        }
    }

    fn query_swizzle(&self, target: TextureTarget) -> [SwizzleChannel; 4] {
        let mut state = self.state.lock().unwrap();
        match state.bound_texture(target) {
            Ok(texture) => texture.swizzle,
            Err(_) => [
                SwizzleChannel::Red,
                SwizzleChannel::Green,
                SwizzleChannel::Blue,
                SwizzleChannel::Alpha,
            ],
        }
    }

    fn generate_mipmap(&self, target: TextureTarget) {
        let mut state = self.state.lock().unwrap();
        if let Ok(texture) = state.bound_texture(target) {
            texture.build_mip_chain();
        }
    }

    fn texture_handle(&self, handle: RawHandle) -> Result<u64> {
        if self.api == ApiVariant::Restricted {
            return Err(Error::Unsupported(
                "bindless texture handles are not available on the restricted API variant"
                    .to_string(),
            ));
        }
        let mut state = self.state.lock().unwrap();
        if !state.textures.contains_key(texture_key(handle)) {
            return Err(Error::Validation(format!(
                "texture handle {} does not exist",
                handle
            )));
        }
        if let Some(existing) = state.bindless.get(&handle) {
            return Ok(*existing);
        }
        let bindless = state.next_bindless;
        state.next_bindless += 1;
        state.bindless.insert(handle, bindless);
        Ok(bindless)
    }

    fn is_handle_resident(&self, bindless: u64) -> bool {
        self.state.lock().unwrap().resident.contains(&bindless)
    }

    fn set_handle_residency(&self, bindless: u64, resident: bool) {
        let mut state = self.state.lock().unwrap();
        if resident {
            state.resident.insert(bindless);
        } else {
            state.resident.remove(&bindless);
        }
    }

    fn bind_image_texture(
        &self,
        _unit: u32,
        handle: RawHandle,
        level: u32,
        _access: ImageAccess,
        _internal: InternalFormat,
    ) -> Result<()> {
        let state = self.state.lock().unwrap();
        let texture = state.textures.get(texture_key(handle)).ok_or_else(|| {
            Error::Validation(format!("texture handle {} does not exist", handle))
        })?;
        texture.level(level)?;
        Ok(())
    }
}
