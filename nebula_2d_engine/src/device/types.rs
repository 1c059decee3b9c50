/// Closed enumerations for texture formats and parameter state
///
/// These replace the string/integer tables of loosely-typed GL wrappers with
/// enums validated at the API boundary. Parsing entry points (`FromStr`,
/// `from_symbol`, `from_char`) accept the conventional short codes so data
/// driven callers can still configure textures from text.

use crate::error::{Error, Result};
use std::fmt;
use std::str::FromStr;

// ===== PIXEL KIND =====

/// Element data kind of one texture component.
///
/// Nine kinds are recognized, written with the conventional short codes:
///
/// ```text
/// # Float formats
/// "f1": unsigned byte (normalized)
/// "f2": half float
/// "f4": float
/// # Signed integer formats
/// "i1": byte
/// "i2": short
/// "i4": int
/// # Unsigned integer formats
/// "u1": unsigned byte
/// "u2": unsigned short
/// "u4": unsigned int
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PixelKind {
    /// Unsigned byte, normalized to float on sampling
    F1,
    /// Half float (16 bit)
    F2,
    /// Float (32 bit)
    F4,
    /// Signed byte
    I1,
    /// Signed short
    I2,
    /// Signed int
    I4,
    /// Unsigned byte
    U1,
    /// Unsigned short
    U2,
    /// Unsigned int
    U4,
}

/// All recognized pixel kind codes, used in error messages
pub const PIXEL_KIND_CODES: [&str; 9] = ["f1", "f2", "f4", "i1", "i2", "i4", "u1", "u2", "u4"];

impl PixelKind {
    /// Size in bytes of one component of this kind
    pub fn byte_size(self) -> u32 {
        match self {
            PixelKind::F1 | PixelKind::I1 | PixelKind::U1 => 1,
            PixelKind::F2 | PixelKind::I2 | PixelKind::U2 => 2,
            PixelKind::F4 | PixelKind::I4 | PixelKind::U4 => 4,
        }
    }

    /// True for the float kinds (f1, f2, f4).
    ///
    /// Float textures default to linear filtering; integer textures default
    /// to nearest, which is the only filtering core profiles support
    /// consistently for them.
    pub fn is_float(self) -> bool {
        matches!(self, PixelKind::F1 | PixelKind::F2 | PixelKind::F4)
    }

    /// The short code for this kind ("f1", "u4", ...)
    pub fn code(self) -> &'static str {
        match self {
            PixelKind::F1 => "f1",
            PixelKind::F2 => "f2",
            PixelKind::F4 => "f4",
            PixelKind::I1 => "i1",
            PixelKind::I2 => "i2",
            PixelKind::I4 => "i4",
            PixelKind::U1 => "u1",
            PixelKind::U2 => "u2",
            PixelKind::U4 => "u4",
        }
    }
}

impl Default for PixelKind {
    fn default() -> Self {
        PixelKind::F1
    }
}

impl FromStr for PixelKind {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "f1" => Ok(PixelKind::F1),
            "f2" => Ok(PixelKind::F2),
            "f4" => Ok(PixelKind::F4),
            "i1" => Ok(PixelKind::I1),
            "i2" => Ok(PixelKind::I2),
            "i4" => Ok(PixelKind::I4),
            "u1" => Ok(PixelKind::U1),
            "u2" => Ok(PixelKind::U2),
            "u4" => Ok(PixelKind::U4),
            other => Err(Error::Configuration(format!(
                "pixel kind '{}' not supported. Supported kinds are: {}",
                other,
                PIXEL_KIND_CODES.join(", ")
            ))),
        }
    }
}

impl fmt::Display for PixelKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

// ===== FILTER =====

/// Texture interpolation filter.
///
/// The filter is specified separately for minification and magnification.
/// The MIPMAP variants are only meaningful as minification filters.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Filter {
    /// Nearest pixel
    Nearest,
    /// Linear interpolation
    Linear,
    /// Minification filter for mipmaps
    NearestMipmapNearest,
    /// Minification filter for mipmaps
    LinearMipmapNearest,
    /// Minification filter for mipmaps
    NearestMipmapLinear,
    /// Minification filter for mipmaps
    LinearMipmapLinear,
}

// ===== WRAP =====

/// Texture coordinate wrapping outside the `[0.0, 1.0]` range
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Wrap {
    /// Repeat the texture (default)
    Repeat,
    /// Repeat the texture mirrored
    MirroredRepeat,
    /// Repeat the edge pixels
    ClampToEdge,
    /// Use the border color
    ClampToBorder,
}

impl Default for Wrap {
    fn default() -> Self {
        Wrap::Repeat
    }
}

// ===== COMPARE FUNC =====

/// Depth comparison function for depth textures.
///
/// The conventional symbol codes are accepted by [`CompareFunc::from_symbol`]:
/// `"<="`, `"<"`, `">="`, `">"`, `"=="`, `"!="`, `"0"` (never), `"1"` (always).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompareFunc {
    LessEqual,
    Less,
    GreaterEqual,
    Greater,
    Equal,
    NotEqual,
    Never,
    Always,
}

impl CompareFunc {
    /// Parse a comparison function from its symbol code
    pub fn from_symbol(symbol: &str) -> Result<Self> {
        match symbol {
            "<=" => Ok(CompareFunc::LessEqual),
            "<" => Ok(CompareFunc::Less),
            ">=" => Ok(CompareFunc::GreaterEqual),
            ">" => Ok(CompareFunc::Greater),
            "==" => Ok(CompareFunc::Equal),
            "!=" => Ok(CompareFunc::NotEqual),
            "0" => Ok(CompareFunc::Never),
            "1" => Ok(CompareFunc::Always),
            other => Err(Error::Configuration(format!(
                "compare function '{}' invalid. Must be one of: <=, <, >=, >, ==, !=, 0, 1",
                other
            ))),
        }
    }

    /// The symbol code for this comparison function
    pub fn symbol(self) -> &'static str {
        match self {
            CompareFunc::LessEqual => "<=",
            CompareFunc::Less => "<",
            CompareFunc::GreaterEqual => ">=",
            CompareFunc::Greater => ">",
            CompareFunc::Equal => "==",
            CompareFunc::NotEqual => "!=",
            CompareFunc::Never => "0",
            CompareFunc::Always => "1",
        }
    }
}

// ===== SWIZZLE =====

/// One channel of a swizzle mask
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SwizzleChannel {
    Red,
    Green,
    Blue,
    Alpha,
    Zero,
    One,
}

impl SwizzleChannel {
    /// Parse a channel from its letter (case-insensitive)
    pub fn from_char(c: char) -> Result<Self> {
        match c.to_ascii_uppercase() {
            'R' => Ok(SwizzleChannel::Red),
            'G' => Ok(SwizzleChannel::Green),
            'B' => Ok(SwizzleChannel::Blue),
            'A' => Ok(SwizzleChannel::Alpha),
            '0' => Ok(SwizzleChannel::Zero),
            '1' => Ok(SwizzleChannel::One),
            other => Err(Error::Configuration(format!(
                "swizzle value '{}' invalid. Must be one of RGBA01",
                other
            ))),
        }
    }

    /// The letter for this channel
    pub fn letter(self) -> char {
        match self {
            SwizzleChannel::Red => 'R',
            SwizzleChannel::Green => 'G',
            SwizzleChannel::Blue => 'B',
            SwizzleChannel::Alpha => 'A',
            SwizzleChannel::Zero => '0',
            SwizzleChannel::One => '1',
        }
    }
}

/// Per-channel remapping applied when sampling a texture (default `"RGBA"`).
///
/// The swizzle mask reorders or masks the four channel values returned to
/// shaders. Each channel is one of `R`, `G`, `B`, `A`, `0`, `1`:
///
/// ```
/// use nebula_2d_engine::nebula2d::device::Swizzle;
///
/// // Alpha channel will always return 1.0
/// let s: Swizzle = "RGB1".parse().unwrap();
///
/// // Only return the red component, the rest masked to 0.0
/// let s: Swizzle = "R000".parse().unwrap();
///
/// // Reverse the components
/// let s: Swizzle = "ABGR".parse().unwrap();
/// assert_eq!(s.to_string(), "ABGR");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Swizzle(pub [SwizzleChannel; 4]);

impl Swizzle {
    /// The four channel selectors
    pub fn channels(self) -> [SwizzleChannel; 4] {
        self.0
    }
}

impl Default for Swizzle {
    fn default() -> Self {
        Swizzle([
            SwizzleChannel::Red,
            SwizzleChannel::Green,
            SwizzleChannel::Blue,
            SwizzleChannel::Alpha,
        ])
    }
}

impl FromStr for Swizzle {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let chars: Vec<char> = s.chars().collect();
        if chars.len() != 4 {
            return Err(Error::Configuration(
                "swizzle must be a string of length 4".to_string(),
            ));
        }
        Ok(Swizzle([
            SwizzleChannel::from_char(chars[0])?,
            SwizzleChannel::from_char(chars[1])?,
            SwizzleChannel::from_char(chars[2])?,
            SwizzleChannel::from_char(chars[3])?,
        ]))
    }
}

impl fmt::Display for Swizzle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for channel in self.0 {
            write!(f, "{}", channel.letter())?;
        }
        Ok(())
    }
}

// ===== TEXTURE TARGET =====

/// Target kind of a texture object on the device
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TextureTarget {
    /// 2D array texture
    Array2d,
    /// Multisampled 2D array texture
    MultisampleArray2d,
}

// ===== IMAGE FORMAT =====

/// Pixel transfer format: component count plus element kind
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ImageFormat {
    /// Number of components per pixel (1: R, 2: RG, 3: RGB, 4: RGBA)
    pub components: u8,
    /// Element data kind of each component
    pub kind: PixelKind,
}

impl ImageFormat {
    /// Size in bytes of one pixel in this format
    pub fn bytes_per_pixel(self) -> u32 {
        u32::from(self.components) * self.kind.byte_size()
    }
}

// ===== INTERNAL FORMAT =====

/// Internal storage format of a texture on the device
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InternalFormat {
    /// Uncompressed color storage derived from component count and pixel kind
    Color { components: u8, kind: PixelKind },
    /// Fixed 24-bit depth component storage used by depth textures
    Depth24,
    /// Backend-specific compressed storage identified by its native constant
    Compressed(u32),
}

// ===== IMAGE ACCESS =====

/// Access mode for binding a texture to a compute image unit
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageAccess {
    ReadOnly,
    WriteOnly,
    ReadWrite,
}

// ===== API VARIANT =====

/// Capability variant of the active graphics API.
///
/// The restricted variant (GLES-class devices) lacks layer-addressable
/// texture readback and bindless texture handles, and requires immutable
/// storage for compute image bindings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ApiVariant {
    /// Full desktop feature set
    Full,
    /// Restricted feature set
    Restricted,
}

// ===== GC MODE =====

/// Resource-lifetime policy of a device.
///
/// - `Manual`: the caller must call `delete()`; dropping a resource leaks
///   its device-side handle until the device itself is torn down.
/// - `Auto`: dropping the last owning value releases the device-side handle
///   immediately (default).
/// - `DeferredCollect`: dropping a resource queues its handle on the device
///   collector; handles are released in a batch by `Device::gc()`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GcMode {
    Manual,
    Auto,
    DeferredCollect,
}

impl Default for GcMode {
    fn default() -> Self {
        GcMode::Auto
    }
}

// ===== VIEWPORT =====

/// Target region for a single-layer texture write: offset, layer and extent
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Viewport {
    /// X offset in pixels
    pub x: u32,
    /// Y offset in pixels
    pub y: u32,
    /// Target layer index
    pub layer: u32,
    /// Width of the written area in pixels
    pub width: u32,
    /// Height of the written area in pixels
    pub height: u32,
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
#[path = "types_tests.rs"]
mod tests;
