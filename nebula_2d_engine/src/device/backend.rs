/// Backend trait - low-level graphics command interface
///
/// This is the leaf surface the resource layer issues GPU commands through.
/// It is deliberately shaped like the underlying graphics API: texture units
/// and binding points are process-wide mutable state, and all state-changing
/// texture operations act on whatever is currently bound to the given target
/// on the active unit. Callers therefore re-bind immediately before every
/// stateful operation instead of assuming a binding persists; the resource
/// types in this crate follow that discipline internally.
///
/// Backend implementations live in separate crates (e.g. the headless
/// software backend used for testing and CI).

use crate::device::types::{
    ApiVariant, CompareFunc, Filter, ImageAccess, ImageFormat, InternalFormat, SwizzleChannel,
    TextureTarget, Wrap,
};
use crate::error::Result;

/// Opaque device-assigned identifier for a GPU resource.
///
/// The value `0` is reserved: it is never a valid handle and marks a
/// resource whose storage has been released.
pub type RawHandle = u64;

/// Capability limits reported by a backend
#[derive(Debug, Clone, Copy)]
pub struct BackendLimits {
    /// Maximum sample count for multisampled textures
    pub max_samples: u32,
    /// Maximum anisotropic filtering level
    pub max_anisotropy: f32,
    /// Maximum texture width/height in pixels
    pub max_texture_size: u32,
    /// Number of combined texture units
    pub max_texture_units: u32,
}

impl Default for BackendLimits {
    fn default() -> Self {
        // Conservative baseline of a desktop core profile
        Self {
            max_samples: 8,
            max_anisotropy: 16.0,
            max_texture_size: 16384,
            max_texture_units: 32,
        }
    }
}

/// Source of pixel data for a sub-image transfer
#[derive(Debug, Clone, Copy)]
pub enum PixelSource<'a> {
    /// Raw bytes copied from client memory
    Bytes(&'a [u8]),
    /// Read from the buffer currently bound to the pixel-unpack binding
    /// (zero-copy path)
    UnpackBuffer,
}

/// One texture parameter change issued to the device
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum TexParameter {
    MinFilter(Filter),
    MagFilter(Filter),
    WrapX(Wrap),
    WrapY(Wrap),
    Swizzle([SwizzleChannel; 4]),
    Anisotropy(f32),
    /// `None` disables depth comparison entirely
    Compare(Option<CompareFunc>),
    /// Base mip level used by mipmap generation
    BaseLevel(u32),
    /// Maximum mip level used by mipmap generation
    MaxLevel(u32),
}

/// Low-level graphics command trait
///
/// All methods take `&self`; implementations serialize their internal state
/// as needed. The design assumes a single owning thread per device context —
/// cross-thread coordination is entirely the caller's responsibility.
pub trait Backend: Send + Sync {
    /// Capability limits of this backend
    fn limits(&self) -> BackendLimits;

    /// API variant (full vs restricted feature set)
    fn api_variant(&self) -> ApiVariant;

    // ----- unit and binding state -----

    /// Select the active texture unit for subsequent binding calls
    fn set_active_unit(&self, unit: u32);

    /// Bind a texture to the given target on the active unit.
    /// Handle `0` unbinds.
    fn bind_texture(&self, target: TextureTarget, handle: RawHandle);

    // ----- object lifetime -----

    /// Allocate a texture handle. Returns `0` when the device fails to
    /// allocate one.
    fn create_texture(&self) -> RawHandle;

    /// Release a texture handle and its storage
    fn delete_texture(&self, handle: RawHandle);

    /// Allocate a buffer of `size` bytes, optionally initialized with
    /// `data`. Returns `0` when the device fails to allocate.
    fn create_buffer(&self, size: usize, data: Option<&[u8]>) -> RawHandle;

    /// Release a buffer handle and its storage
    fn delete_buffer(&self, handle: RawHandle);

    /// Overwrite a range of a buffer with new bytes
    fn buffer_sub_data(&self, handle: RawHandle, offset: usize, data: &[u8]) -> Result<()>;

    /// Bind a buffer to the pixel-unpack binding point (handle `0` unbinds)
    fn bind_pixel_unpack_buffer(&self, handle: RawHandle);

    // ----- transfer alignment state -----

    /// Row alignment for readback transfers
    fn set_pack_alignment(&self, alignment: u32);

    /// Row alignment for upload transfers
    fn set_unpack_alignment(&self, alignment: u32);

    // ----- storage allocation (operates on the bound texture) -----

    /// Immutable storage allocation; can only be issued once per texture
    fn tex_storage(
        &self,
        target: TextureTarget,
        levels: u32,
        internal: InternalFormat,
        size: (u32, u32, u32),
    ) -> Result<()>;

    /// Mutable storage allocation; may be issued again to re-allocate
    fn tex_image(
        &self,
        target: TextureTarget,
        level: u32,
        internal: InternalFormat,
        size: (u32, u32, u32),
        format: ImageFormat,
        data: Option<&[u8]>,
    ) -> Result<()>;

    /// Mutable allocation from pre-compressed data
    fn compressed_tex_image(
        &self,
        target: TextureTarget,
        level: u32,
        internal: InternalFormat,
        size: (u32, u32, u32),
        data: &[u8],
    ) -> Result<()>;

    /// Multisampled storage allocation (not directly readable or writable)
    fn tex_image_multisample(
        &self,
        target: TextureTarget,
        samples: u32,
        internal: InternalFormat,
        size: (u32, u32, u32),
        fixed_locations: bool,
    ) -> Result<()>;

    // ----- pixel transfer (operates on the bound texture) -----

    /// Upload pixels into a region of the bound texture.
    /// `offset` is `(x, y, layer)`, `size` is `(width, height, layer_count)`.
    fn tex_sub_image(
        &self,
        target: TextureTarget,
        level: u32,
        offset: (u32, u32, u32),
        size: (u32, u32, u32),
        format: ImageFormat,
        source: PixelSource<'_>,
    ) -> Result<()>;

    /// Read back the full contents of the bound texture at a mip level.
    /// `byte_len` is the expected length of the returned vector.
    fn read_tex_image(
        &self,
        target: TextureTarget,
        level: u32,
        format: ImageFormat,
        byte_len: usize,
    ) -> Result<Vec<u8>>;

    // ----- parameter state (operates on the bound texture) -----

    /// Change one parameter of the bound texture
    fn set_tex_parameter(&self, target: TextureTarget, parameter: TexParameter);

    /// Read the swizzle mask of the bound texture back from device state
    fn query_swizzle(&self, target: TextureTarget) -> [SwizzleChannel; 4];

    /// Generate successive half-resolution mip levels for the bound texture
    fn generate_mipmap(&self, target: TextureTarget);

    // ----- bindless handles -----

    /// Create (or return the existing) bindless handle for a texture.
    /// Fails with `Unsupported` on the restricted API variant.
    fn texture_handle(&self, handle: RawHandle) -> Result<u64>;

    /// Whether a bindless handle is currently resident
    fn is_handle_resident(&self, bindless: u64) -> bool;

    /// Move a bindless handle in or out of GPU-resident memory
    fn set_handle_residency(&self, bindless: u64, resident: bool);

    // ----- compute image binding -----

    /// Bind a texture level to a compute image unit
    fn bind_image_texture(
        &self,
        unit: u32,
        handle: RawHandle,
        level: u32,
        access: ImageAccess,
        internal: InternalFormat,
    ) -> Result<()>;
}
