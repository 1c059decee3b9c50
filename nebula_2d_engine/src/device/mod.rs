/// Device module - graphics context, resource types and the backend trait
///
/// Layering, top to bottom:
///
/// - [`Device`]: owning context and resource factory
/// - [`TextureArray`] / [`Buffer`]: resources holding weak context references
/// - [`Backend`]: the low-level command trait real device crates implement

pub mod backend;
pub mod buffer;
#[allow(clippy::module_inception)]
pub mod device;
pub mod texture_array;
pub mod types;

#[cfg(test)]
pub(crate) mod mock_backend;

pub use backend::{Backend, BackendLimits, PixelSource, RawHandle, TexParameter};
pub use buffer::{Buffer, BufferDesc};
pub use device::{AllocationStats, Device};
pub use texture_array::{TextureArray, TextureArrayDesc, WriteSource};
pub use types::{
    ApiVariant, CompareFunc, Filter, GcMode, ImageAccess, ImageFormat, InternalFormat, PixelKind,
    Swizzle, SwizzleChannel, TextureTarget, Viewport, Wrap, PIXEL_KIND_CODES,
};
