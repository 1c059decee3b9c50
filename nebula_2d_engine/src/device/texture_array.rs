/// TextureArray - one array of 2D image layers on a graphics device
///
/// The central GPU resource of the framework: sprite batchers allocate their
/// atlas layers here and post-process passes sample from it. A texture array
/// owns exactly one device-side handle, its format metadata and its sampling
/// parameter state. It holds only a weak reference to the device context:
/// when the device is torn down first, the resource becomes implicitly
/// invalid and its cleanup emits no further device calls.
///
/// Storage comes in three modes, fixed at creation:
///
/// - **mutable** (default): storage may be re-allocated, `resize` works
/// - **immutable**: storage is fixed at creation, contents still writable
/// - **multisampled** (`samples > 0`): no direct reads, writes or sampling
///   parameters
///
/// Binding discipline: the device's texture-unit state is process-wide, so
/// every stateful operation re-binds this texture on the device's reserved
/// unit immediately before issuing the call.

use crate::device::backend::{PixelSource, RawHandle, TexParameter};
use crate::device::buffer::Buffer;
use crate::device::device::{upgrade_device, DeviceShared, PendingDelete};
use crate::device::types::{
    ApiVariant, CompareFunc, Filter, GcMode, ImageAccess, ImageFormat, InternalFormat, PixelKind,
    Swizzle, TextureTarget, Viewport, Wrap,
};
use crate::error::{Error, Result};
use std::fmt;
use std::sync::{Arc, Weak};

// ===== DESCRIPTOR =====

/// Descriptor for creating a texture array
#[derive(Debug, Clone, Copy)]
pub struct TextureArrayDesc<'a> {
    /// Size as `(width, height, layers)`, all positive
    pub size: (u32, u32, u32),
    /// Number of components per pixel (1: R, 2: RG, 3: RGB, 4: RGBA)
    pub components: u8,
    /// Element data kind of each component
    pub kind: PixelKind,
    /// Optional initial pixel data for the whole texture.
    /// Must be absent for multisampled textures.
    pub data: Option<&'a [u8]>,
    /// Minification/magnification filter pair. Defaults to linear for float
    /// kinds and nearest for integer kinds.
    pub filter: Option<(Filter, Filter)>,
    /// Horizontal wrap mode (default repeat)
    pub wrap_x: Option<Wrap>,
    /// Vertical wrap mode (default repeat)
    pub wrap_y: Option<Wrap>,
    /// Create a depth texture. Forces one `u4` component per pixel and a
    /// fixed depth-component storage format.
    pub depth: bool,
    /// Sample count; values above 0 create multisampled storage. Clamped to
    /// the device maximum.
    pub samples: u32,
    /// Make the storage (not the contents) immutable
    pub immutable: bool,
    /// Override the derived internal storage format
    pub internal_format: Option<InternalFormat>,
    /// Allocate from pre-compressed data (mutable storage only)
    pub compressed: bool,
}

impl Default for TextureArrayDesc<'_> {
    fn default() -> Self {
        Self {
            size: (1, 1, 1),
            components: 4,
            kind: PixelKind::F1,
            data: None,
            filter: None,
            wrap_x: None,
            wrap_y: None,
            depth: false,
            samples: 0,
            immutable: false,
            internal_format: None,
            compressed: false,
        }
    }
}

// ===== WRITE SOURCE =====

/// Source of pixel data for [`TextureArray::write`]
#[derive(Debug, Clone, Copy)]
pub enum WriteSource<'a> {
    /// Raw bytes, copied at write time; the texture holds no reference to
    /// the slice after the call returns
    Bytes(&'a [u8]),
    /// A device-side transfer buffer, used through the pixel-unpack binding
    /// without a round trip through client memory
    Buffer(&'a Buffer),
}

// ===== TEXTURE ARRAY =====

/// An array of 2D image layers on a graphics device
pub struct TextureArray {
    device: Weak<DeviceShared>,
    handle: RawHandle,
    target: TextureTarget,
    width: u32,
    height: u32,
    layers: u32,
    components: u8,
    kind: PixelKind,
    internal: InternalFormat,
    depth: bool,
    samples: u32,
    immutable: bool,
    compressed: bool,
    filter: (Filter, Filter),
    wrap_x: Wrap,
    wrap_y: Wrap,
    anisotropy: f32,
    compare: Option<CompareFunc>,
    bindless: Option<u64>,
}

impl TextureArray {
    /// Create a texture array on a device context.
    ///
    /// Called through `Device::texture` / `Device::depth_texture`. All
    /// argument validation happens before any device call, so a failed
    /// creation leaves no observable device mutation behind.
    pub(crate) fn new(shared: &Arc<DeviceShared>, desc: TextureArrayDesc<'_>) -> Result<Self> {
        let (width, height, layers) = desc.size;
        if width == 0 || height == 0 || layers == 0 {
            return Err(Error::Configuration(format!(
                "texture dimensions must be positive, got {}x{}x{}",
                width, height, layers
            )));
        }
        if !(1..=4).contains(&desc.components) {
            return Err(Error::Configuration(
                "components must be 1, 2, 3 or 4".to_string(),
            ));
        }
        let limits = shared.limits;
        if width > limits.max_texture_size || height > limits.max_texture_size {
            return Err(Error::Configuration(format!(
                "texture size {}x{} exceeds the device maximum of {}",
                width, height, limits.max_texture_size
            )));
        }
        if desc.data.is_some() && desc.samples > 0 {
            return Err(Error::Configuration(
                "multisampled textures are not writable (cannot be initialized with data)"
                    .to_string(),
            ));
        }
        if desc.compressed && (desc.data.is_none() || desc.immutable) {
            return Err(Error::Configuration(
                "compressed textures require initial data and mutable storage".to_string(),
            ));
        }

        // Depth textures transfer one unsigned-int component per pixel
        let (components, kind) = if desc.depth {
            (1, PixelKind::U4)
        } else {
            (desc.components, desc.kind)
        };
        let format = ImageFormat { components, kind };

        // Validate initial data before the handle exists
        if let Some(data) = desc.data {
            if !desc.compressed {
                let expected = u64::from(width)
                    * u64::from(height)
                    * u64::from(layers)
                    * u64::from(format.bytes_per_pixel());
                if data.len() as u64 != expected {
                    return Err(Error::Validation(format!(
                        "data size {} does not match expected size {}",
                        data.len(),
                        expected
                    )));
                }
            }
        }

        let samples = desc.samples.min(limits.max_samples);
        let target = if samples == 0 {
            TextureTarget::Array2d
        } else {
            TextureTarget::MultisampleArray2d
        };
        let internal = desc.internal_format.unwrap_or(if desc.depth {
            InternalFormat::Depth24
        } else {
            InternalFormat::Color { components, kind }
        });
        let filter = desc.filter.unwrap_or(if desc.depth || kind.is_float() {
            (Filter::Linear, Filter::Linear)
        } else {
            (Filter::Nearest, Filter::Nearest)
        });

        let backend = shared.backend.as_ref();
        let handle = backend.create_texture();
        if handle == 0 {
            crate::engine_error!(
                "nebula2d::TextureArray",
                "device failed to allocate a texture handle ({}x{}x{})",
                width,
                height,
                layers
            );
            return Err(Error::Resource(
                "device failed to allocate a texture handle".to_string(),
            ));
        }

        backend.set_active_unit(shared.default_unit);
        backend.bind_texture(target, handle);

        let mut texture = Self {
            device: Arc::downgrade(shared),
            handle,
            target,
            width,
            height,
            layers,
            components,
            kind,
            internal,
            depth: desc.depth,
            samples,
            immutable: desc.immutable,
            compressed: desc.compressed,
            filter,
            wrap_x: desc.wrap_x.unwrap_or_default(),
            wrap_y: desc.wrap_y.unwrap_or_default(),
            anisotropy: 1.0,
            compare: None,
            bindless: None,
        };

        if let Err(err) = texture.allocate(shared, desc.data) {
            backend.delete_texture(handle);
            texture.handle = 0;
            return Err(err);
        }

        // Sampling parameters are meaningless on multisampled storage
        if samples == 0 {
            backend.set_tex_parameter(target, TexParameter::MinFilter(texture.filter.0));
            backend.set_tex_parameter(target, TexParameter::MagFilter(texture.filter.1));
            backend.set_tex_parameter(target, TexParameter::WrapX(texture.wrap_x));
            backend.set_tex_parameter(target, TexParameter::WrapY(texture.wrap_y));
        }

        shared.stats.incr("texture");
        crate::engine_trace!(
            "nebula2d::TextureArray",
            "created handle={} size={}x{}x{} components={} kind={}",
            handle,
            width,
            height,
            layers,
            components,
            kind
        );

        Ok(texture)
    }

    /// Allocate (or re-allocate) the device-side storage.
    /// The texture must already be bound on the device's reserved unit.
    fn allocate(&mut self, shared: &DeviceShared, data: Option<&[u8]>) -> Result<()> {
        let backend = shared.backend.as_ref();
        let size = (self.width, self.height, self.layers);

        if self.samples > 0 {
            return backend.tex_image_multisample(self.target, self.samples, self.internal, size, true);
        }

        // Unpack with byte alignment or rows end up corrupted
        backend.set_unpack_alignment(1);
        backend.set_pack_alignment(1);

        if self.depth {
            backend.tex_image(self.target, 0, self.internal, size, self.format(), data)?;
            backend.set_tex_parameter(
                self.target,
                TexParameter::Compare(Some(CompareFunc::LessEqual)),
            );
            self.compare = Some(CompareFunc::LessEqual);
        } else if self.immutable {
            // Storage reservation can only happen once for this texture
            backend.tex_storage(self.target, 1, self.internal, size)?;
            if let Some(data) = data {
                backend.tex_sub_image(
                    self.target,
                    0,
                    (0, 0, 0),
                    size,
                    self.format(),
                    PixelSource::Bytes(data),
                )?;
            }
        } else if self.compressed {
            // Creation guarantees data is present on the compressed path
            backend.compressed_tex_image(self.target, 0, self.internal, size, data.unwrap_or(&[]))?;
        } else {
            backend.tex_image(self.target, 0, self.internal, size, self.format(), data)?;
        }
        Ok(())
    }

    // ----- introspection -----

    /// The size of the texture as `(width, height, layers)`
    pub fn size(&self) -> (u32, u32, u32) {
        (self.width, self.height, self.layers)
    }

    /// The width of the texture in pixels
    pub fn width(&self) -> u32 {
        self.width
    }

    /// The height of the texture in pixels
    pub fn height(&self) -> u32 {
        self.height
    }

    /// The number of layers in the texture
    pub fn layers(&self) -> u32 {
        self.layers
    }

    /// Number of components per pixel
    pub fn components(&self) -> u8 {
        self.components
    }

    /// Element data kind of each component
    pub fn kind(&self) -> PixelKind {
        self.kind
    }

    /// Size in bytes of one component
    pub fn component_size(&self) -> u32 {
        self.kind.byte_size()
    }

    /// Total byte size of the full texture (all layers, base level)
    pub fn byte_size(&self) -> u64 {
        u64::from(self.width)
            * u64::from(self.height)
            * u64::from(self.layers)
            * u64::from(self.format().bytes_per_pixel())
    }

    /// Sample count when multisampling is enabled, 0 otherwise
    pub fn samples(&self) -> u32 {
        self.samples
    }

    /// Whether this is a depth texture
    pub fn is_depth(&self) -> bool {
        self.depth
    }

    /// Whether the storage is immutable
    pub fn immutable(&self) -> bool {
        self.immutable
    }

    /// Whether the storage uses a compressed format
    pub fn compressed(&self) -> bool {
        self.compressed
    }

    /// Internal storage format
    pub fn internal_format(&self) -> InternalFormat {
        self.internal
    }

    /// The device-side handle. `0` once the texture has been deleted.
    pub fn raw_handle(&self) -> RawHandle {
        self.handle
    }

    fn format(&self) -> ImageFormat {
        ImageFormat {
            components: self.components,
            kind: self.kind,
        }
    }

    /// Width and height of one mip level, clamped at 1x1.
    /// Levels past the end of any possible chain stay 1x1.
    fn mip_dimensions(&self, level: u32) -> (u32, u32) {
        (
            self.width.checked_shr(level).unwrap_or(0).max(1),
            self.height.checked_shr(level).unwrap_or(0).max(1),
        )
    }

    /// Resolve the device context, failing when the handle has been deleted
    /// or the device torn down
    fn context(&self) -> Result<Arc<DeviceShared>> {
        if self.handle == 0 {
            return Err(Error::Resource(
                "texture handle has already been deleted".to_string(),
            ));
        }
        upgrade_device(&self.device)
    }

    /// Re-bind this texture on the device's reserved unit.
    /// Binding state is process-wide, so this precedes every stateful call.
    fn rebind(&self, shared: &DeviceShared) {
        shared.backend.set_active_unit(shared.default_unit);
        shared.backend.bind_texture(self.target, self.handle);
    }

    /// Reject parameter mutation where it cannot take effect
    fn ensure_parameters_mutable(&self) -> Result<()> {
        if self.samples > 0 {
            return Err(Error::Configuration(
                "multisampled textures have no sampling parameters".to_string(),
            ));
        }
        if self.bindless.is_some() {
            return Err(Error::Configuration(
                "texture parameters are frozen once a bindless handle has been created"
                    .to_string(),
            ));
        }
        Ok(())
    }

    // ----- storage mutation -----

    /// Resize the texture, re-allocating the storage in place.
    ///
    /// All pixel data is lost. Only width and height change; the layer count
    /// is fixed at creation. Immutable storage cannot be resized.
    pub fn resize(&mut self, size: (u32, u32)) -> Result<()> {
        if self.immutable {
            return Err(Error::Configuration(
                "immutable textures cannot be resized".to_string(),
            ));
        }
        if self.compressed {
            return Err(Error::Configuration(
                "compressed textures cannot be resized".to_string(),
            ));
        }
        let shared = self.context()?;
        let (width, height) = size;
        if width == 0 || height == 0 {
            return Err(Error::Configuration(format!(
                "texture dimensions must be positive, got {}x{}",
                width, height
            )));
        }
        if width > shared.limits.max_texture_size || height > shared.limits.max_texture_size {
            return Err(Error::Configuration(format!(
                "texture size {}x{} exceeds the device maximum of {}",
                width, height, shared.limits.max_texture_size
            )));
        }

        self.rebind(&shared);
        let (prev_width, prev_height) = (self.width, self.height);
        self.width = width;
        self.height = height;
        if let Err(err) = self.allocate(&shared, None) {
            // Storage was not re-allocated; keep describing the old one
            self.width = prev_width;
            self.height = prev_height;
            return Err(err);
        }
        Ok(())
    }

    /// Write byte data into the texture.
    ///
    /// With a `viewport`, writes a region of one layer; the supplied data
    /// must match `width * height * bytes_per_pixel` of that region. Without
    /// a viewport, the whole texture is written and the data must cover all
    /// layers. A [`WriteSource::Buffer`] goes through the pixel-unpack
    /// binding without a round trip through client memory.
    ///
    /// Byte-length mismatches fail with a `Validation` error before any
    /// device mutation; there are no partial writes.
    pub fn write(
        &self,
        source: WriteSource<'_>,
        level: u32,
        viewport: Option<Viewport>,
    ) -> Result<()> {
        let shared = self.context()?;
        if self.samples > 0 {
            return Err(Error::Configuration(
                "writing to multisampled textures is not supported".to_string(),
            ));
        }

        let (level_width, level_height) = self.mip_dimensions(level);
        let (offset, region) = match viewport {
            Some(v) => {
                if v.width == 0 || v.height == 0 {
                    return Err(Error::Configuration(
                        "viewport extent must be positive".to_string(),
                    ));
                }
                if v.layer >= self.layers {
                    return Err(Error::Configuration(format!(
                        "viewport layer {} out of range ({} layers)",
                        v.layer, self.layers
                    )));
                }
                // checked_add: an offset near u32::MAX must not wrap past the check
                let x_end = v.x.checked_add(v.width);
                let y_end = v.y.checked_add(v.height);
                if x_end.map_or(true, |e| e > level_width)
                    || y_end.map_or(true, |e| e > level_height)
                {
                    return Err(Error::Configuration(format!(
                        "viewport {}x{}+{}+{} exceeds level size {}x{}",
                        v.width, v.height, v.x, v.y, level_width, level_height
                    )));
                }
                ((v.x, v.y, v.layer), (v.width, v.height, 1))
            }
            None => ((0, 0, 0), (level_width, level_height, self.layers)),
        };

        let expected = u64::from(region.0)
            * u64::from(region.1)
            * u64::from(region.2)
            * u64::from(self.format().bytes_per_pixel());

        let backend = shared.backend.as_ref();
        match source {
            WriteSource::Bytes(data) => {
                if !self.compressed && data.len() as u64 != expected {
                    return Err(Error::Validation(format!(
                        "data size {} does not match expected size {}",
                        data.len(),
                        expected
                    )));
                }
                self.rebind(&shared);
                backend.set_pack_alignment(1);
                backend.set_unpack_alignment(1);
                backend.tex_sub_image(
                    self.target,
                    level,
                    offset,
                    region,
                    self.format(),
                    PixelSource::Bytes(data),
                )
            }
            WriteSource::Buffer(buffer) => {
                if buffer.raw_handle() == 0 {
                    return Err(Error::Resource(
                        "transfer buffer has already been deleted".to_string(),
                    ));
                }
                if !self.compressed && buffer.size() as u64 != expected {
                    return Err(Error::Validation(format!(
                        "buffer size {} does not match expected size {}",
                        buffer.size(),
                        expected
                    )));
                }
                backend.bind_pixel_unpack_buffer(buffer.raw_handle());
                self.rebind(&shared);
                backend.set_pack_alignment(1);
                backend.set_unpack_alignment(1);
                let result = backend.tex_sub_image(
                    self.target,
                    level,
                    offset,
                    region,
                    self.format(),
                    PixelSource::UnpackBuffer,
                );
                backend.bind_pixel_unpack_buffer(0);
                result
            }
        }
    }

    /// Read the full contents of the texture at a mip level.
    ///
    /// `alignment` sets the row alignment of the returned data (1, 2 or 4).
    /// Not available for multisampled textures, nor on the restricted API
    /// variant (no layer-addressable readback there).
    pub fn read(&self, level: u32, alignment: u32) -> Result<Vec<u8>> {
        let shared = self.context()?;
        if self.samples > 0 {
            return Err(Error::Configuration(
                "multisampled textures cannot be read directly".to_string(),
            ));
        }
        if !matches!(alignment, 1 | 2 | 4) {
            return Err(Error::Configuration(format!(
                "alignment must be 1, 2 or 4, got {}",
                alignment
            )));
        }
        if shared.backend.api_variant() == ApiVariant::Restricted {
            return Err(Error::Unsupported(
                "texture array readback is not available on the restricted API variant"
                    .to_string(),
            ));
        }

        let (level_width, level_height) = self.mip_dimensions(level);
        let byte_len = (u64::from(level_width)
            * u64::from(level_height)
            * u64::from(self.layers)
            * u64::from(self.format().bytes_per_pixel())) as usize;

        self.rebind(&shared);
        shared.backend.set_pack_alignment(alignment);
        shared
            .backend
            .read_tex_image(self.target, level, self.format(), byte_len)
    }

    /// Generate successive half-resolution mip levels.
    ///
    /// Mipmaps are only sampled when the minification filter is one of the
    /// MIPMAP variants. Not available for multisampled textures.
    pub fn build_mipmaps(&self, base: u32, max_level: u32) -> Result<()> {
        let shared = self.context()?;
        if self.samples > 0 {
            return Err(Error::Configuration(
                "multisampled textures do not support mipmaps".to_string(),
            ));
        }
        self.rebind(&shared);
        shared
            .backend
            .set_tex_parameter(self.target, TexParameter::BaseLevel(base));
        shared
            .backend
            .set_tex_parameter(self.target, TexParameter::MaxLevel(max_level));
        shared.backend.generate_mipmap(self.target);
        Ok(())
    }

    // ----- sampling parameter state -----

    /// The `(min, mag)` filter pair
    pub fn filter(&self) -> (Filter, Filter) {
        self.filter
    }

    /// Set the `(min, mag)` filter pair
    pub fn set_filter(&mut self, filter: (Filter, Filter)) -> Result<()> {
        let shared = self.context()?;
        self.ensure_parameters_mutable()?;
        self.rebind(&shared);
        shared
            .backend
            .set_tex_parameter(self.target, TexParameter::MinFilter(filter.0));
        shared
            .backend
            .set_tex_parameter(self.target, TexParameter::MagFilter(filter.1));
        self.filter = filter;
        Ok(())
    }

    /// Horizontal wrap mode
    pub fn wrap_x(&self) -> Wrap {
        self.wrap_x
    }

    /// Set the horizontal wrap mode
    pub fn set_wrap_x(&mut self, wrap: Wrap) -> Result<()> {
        let shared = self.context()?;
        self.ensure_parameters_mutable()?;
        self.rebind(&shared);
        shared
            .backend
            .set_tex_parameter(self.target, TexParameter::WrapX(wrap));
        self.wrap_x = wrap;
        Ok(())
    }

    /// Vertical wrap mode
    pub fn wrap_y(&self) -> Wrap {
        self.wrap_y
    }

    /// Set the vertical wrap mode
    pub fn set_wrap_y(&mut self, wrap: Wrap) -> Result<()> {
        let shared = self.context()?;
        self.ensure_parameters_mutable()?;
        self.rebind(&shared);
        shared
            .backend
            .set_tex_parameter(self.target, TexParameter::WrapY(wrap));
        self.wrap_y = wrap;
        Ok(())
    }

    /// Anisotropic filtering level
    pub fn anisotropy(&self) -> f32 {
        self.anisotropy
    }

    /// Set the anisotropic filtering level.
    /// The value is clamped to `[1.0, device maximum]` before being applied.
    pub fn set_anisotropy(&mut self, value: f32) -> Result<()> {
        let shared = self.context()?;
        self.ensure_parameters_mutable()?;
        let clamped = value.clamp(1.0, shared.limits.max_anisotropy);
        self.rebind(&shared);
        shared
            .backend
            .set_tex_parameter(self.target, TexParameter::Anisotropy(clamped));
        self.anisotropy = clamped;
        Ok(())
    }

    /// Depth comparison function (`None` when comparison is disabled)
    pub fn compare_func(&self) -> Option<CompareFunc> {
        self.compare
    }

    /// Set or disable the depth comparison function.
    /// Only valid on depth textures, regardless of the value.
    pub fn set_compare_func(&mut self, value: Option<CompareFunc>) -> Result<()> {
        if !self.depth {
            return Err(Error::Configuration(
                "depth comparison function can only be set on depth textures".to_string(),
            ));
        }
        let shared = self.context()?;
        self.ensure_parameters_mutable()?;
        self.rebind(&shared);
        shared
            .backend
            .set_tex_parameter(self.target, TexParameter::Compare(value));
        self.compare = value;
        Ok(())
    }

    /// The swizzle mask, read back from actual device state
    pub fn swizzle(&self) -> Result<Swizzle> {
        let shared = self.context()?;
        if self.samples > 0 {
            return Err(Error::Configuration(
                "multisampled textures have no sampling parameters".to_string(),
            ));
        }
        self.rebind(&shared);
        Ok(Swizzle(shared.backend.query_swizzle(self.target)))
    }

    /// Set the swizzle mask.
    ///
    /// The mask reorders or masks the four channel values returned to
    /// shaders, e.g. `"RGB1"` forces alpha to 1.0 and `"ABGR"` reverses the
    /// components. Parse masks from text with `str::parse::<Swizzle>()`.
    pub fn set_swizzle(&mut self, swizzle: Swizzle) -> Result<()> {
        let shared = self.context()?;
        self.ensure_parameters_mutable()?;
        self.rebind(&shared);
        shared
            .backend
            .set_tex_parameter(self.target, TexParameter::Swizzle(swizzle.channels()));
        Ok(())
    }

    // ----- binding -----

    /// Bind the texture to a sampling unit for subsequent draw calls
    pub fn bind(&self, unit: u32) -> Result<()> {
        let shared = self.context()?;
        shared.backend.set_active_unit(unit);
        shared.backend.bind_texture(self.target, self.handle);
        Ok(())
    }

    /// Bind one mip level to a compute image unit.
    ///
    /// At least one of `read` and `write` must be set. On the restricted API
    /// variant the texture must have been created with immutable storage.
    pub fn bind_to_image(&self, unit: u32, read: bool, write: bool, level: u32) -> Result<()> {
        let shared = self.context()?;
        let access = match (read, write) {
            (true, true) => ImageAccess::ReadWrite,
            (true, false) => ImageAccess::ReadOnly,
            (false, true) => ImageAccess::WriteOnly,
            (false, false) => {
                return Err(Error::Configuration(
                    "illegal access mode: the image must at least be readable or writable"
                        .to_string(),
                ));
            }
        };
        if shared.backend.api_variant() == ApiVariant::Restricted && !self.immutable {
            return Err(Error::Configuration(
                "textures bound to image units must be created immutable on the restricted API variant"
                    .to_string(),
            ));
        }
        shared
            .backend
            .bind_image_texture(unit, self.handle, level, access, self.internal)
    }

    /// Get a handle for bindless texture access, moving it in or out of
    /// GPU-resident memory.
    ///
    /// The same handle is returned on repeated calls; toggling `resident`
    /// only changes residency. Once a bindless handle exists the sampling
    /// parameters of this texture are frozen: further parameter mutations
    /// fail with a `Configuration` error. There is no way to undo this.
    ///
    /// Resident handle storage may be scarcer than ordinary texture storage,
    /// so make textures non-resident when they go unused for a while.
    pub fn get_handle(&mut self, resident: bool) -> Result<u64> {
        let shared = self.context()?;
        let bindless = match self.bindless {
            Some(existing) => existing,
            None => shared.backend.texture_handle(self.handle)?,
        };
        if shared.backend.is_handle_resident(bindless) != resident {
            shared.backend.set_handle_residency(bindless, resident);
        }
        self.bindless = Some(bindless);
        Ok(bindless)
    }

    // ----- destruction -----

    /// Destroy the underlying device-side resource.
    ///
    /// Idempotent: calling it again (or dropping afterwards) does nothing.
    /// After deletion every operation fails with a `Resource` error.
    pub fn delete(&mut self) {
        if self.handle == 0 {
            return;
        }
        if let Some(shared) = self.device.upgrade() {
            shared.backend.delete_texture(self.handle);
            shared.stats.decr("texture");
        }
        self.handle = 0;
        self.bindless = None;
    }
}

impl Drop for TextureArray {
    fn drop(&mut self) {
        if self.handle == 0 {
            return;
        }
        // Device already torn down: the handle died with it
        let Some(shared) = self.device.upgrade() else {
            return;
        };
        let mode = *shared.gc_mode.lock().unwrap();
        match mode {
            GcMode::Auto => {
                shared.backend.delete_texture(self.handle);
                shared.stats.decr("texture");
            }
            GcMode::DeferredCollect => {
                shared
                    .collector
                    .lock()
                    .unwrap()
                    .push(PendingDelete::Texture(self.handle));
            }
            GcMode::Manual => {
                crate::engine_warn!(
                    "nebula2d::TextureArray",
                    "texture handle {} dropped without delete() under manual gc mode",
                    self.handle
                );
            }
        }
    }
}

impl fmt::Debug for TextureArray {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "<TextureArray handle={} size={}x{}x{} components={}>",
            self.handle, self.width, self.height, self.layers, self.components
        )
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
#[path = "texture_array_tests.rs"]
mod tests;
