/// In-memory texture storage for the headless backend
///
/// Models one texture object: its mip level chain, allocation flags and the
/// sticky parameter state the core crate reads back (the swizzle mask).
/// Pixel data is stored tightly packed, layer-major: all rows of layer 0,
/// then all rows of layer 1, and so on.

use nebula_2d_engine::nebula2d::device::{InternalFormat, SwizzleChannel};
use nebula_2d_engine::nebula2d::{Error, Result};

/// One mip level: its own width and height, the layer count of the texture
#[derive(Debug, Clone)]
pub(crate) struct LevelStorage {
    pub width: u32,
    pub height: u32,
    pub data: Vec<u8>,
}

/// One texture object held by the headless device
#[derive(Debug)]
pub(crate) struct TextureStorage {
    pub internal: Option<InternalFormat>,
    pub layers: u32,
    pub bytes_per_pixel: u32,
    pub immutable: bool,
    pub multisample: bool,
    pub levels: Vec<LevelStorage>,
    /// Raw blob for compressed allocations (no per-pixel layout)
    pub compressed_data: Option<Vec<u8>>,
    pub swizzle: [SwizzleChannel; 4],
}

/// Bytes per pixel implied by an internal storage format.
/// Compressed formats have no per-pixel layout and report 0.
pub(crate) fn internal_bytes_per_pixel(internal: InternalFormat) -> u32 {
    match internal {
        InternalFormat::Color { components, kind } => u32::from(components) * kind.byte_size(),
        // Stored as one u32 depth value per pixel
        InternalFormat::Depth24 => 4,
        InternalFormat::Compressed(_) => 0,
    }
}

impl TextureStorage {
    /// A fresh texture object with no storage allocated yet
    pub fn new() -> Self {
        Self {
            internal: None,
            layers: 0,
            bytes_per_pixel: 0,
            immutable: false,
            multisample: false,
            levels: Vec::new(),
            compressed_data: None,
            swizzle: [
                SwizzleChannel::Red,
                SwizzleChannel::Green,
                SwizzleChannel::Blue,
                SwizzleChannel::Alpha,
            ],
        }
    }

    /// (Re-)allocate the level chain, zero-filled.
    /// `level_count` halved levels are built down from the base size.
    pub fn allocate(
        &mut self,
        internal: InternalFormat,
        size: (u32, u32, u32),
        level_count: u32,
    ) -> Result<()> {
        if self.immutable {
            return Err(Error::Validation(
                "texture storage is immutable and cannot be re-allocated".to_string(),
            ));
        }
        let (width, height, layers) = size;
        self.internal = Some(internal);
        self.layers = layers;
        self.bytes_per_pixel = internal_bytes_per_pixel(internal);
        self.compressed_data = None;

        self.levels.clear();
        let (mut w, mut h) = (width, height);
        for _ in 0..level_count.max(1) {
            let len = (w as usize) * (h as usize) * (layers as usize) * self.bytes_per_pixel as usize;
            self.levels.push(LevelStorage {
                width: w,
                height: h,
                data: vec![0; len],
            });
            w = (w / 2).max(1);
            h = (h / 2).max(1);
        }
        Ok(())
    }

    pub fn level(&self, level: u32) -> Result<&LevelStorage> {
        self.levels.get(level as usize).ok_or_else(|| {
            Error::Validation(format!("mip level {} has no allocated storage", level))
        })
    }

    /// Copy a tightly packed pixel region into one mip level.
    /// `offset` is `(x, y, layer)`, `size` is `(width, height, layer_count)`.
    pub fn write_region(
        &mut self,
        level: u32,
        offset: (u32, u32, u32),
        size: (u32, u32, u32),
        data: &[u8],
    ) -> Result<()> {
        if self.multisample {
            return Err(Error::Validation(
                "multisampled storage has no addressable pixels".to_string(),
            ));
        }
        let bpp = self.bytes_per_pixel as usize;
        let layers = self.layers;
        let level = self.levels.get_mut(level as usize).ok_or_else(|| {
            Error::Validation(format!("mip level {} has no allocated storage", level))
        })?;

        let (x, y, layer) = offset;
        let (width, height, depth) = size;
        let in_bounds = x.checked_add(width).is_some_and(|e| e <= level.width)
            && y.checked_add(height).is_some_and(|e| e <= level.height)
            && layer.checked_add(depth).is_some_and(|e| e <= layers);
        if !in_bounds {
            return Err(Error::Validation(format!(
                "region {}x{}x{} at ({}, {}, {}) exceeds level storage {}x{}x{}",
                width, height, depth, x, y, layer, level.width, level.height, layers
            )));
        }
        let expected = (width as usize) * (height as usize) * (depth as usize) * bpp;
        if data.len() < expected {
            return Err(Error::Validation(format!(
                "pixel data holds {} bytes, region needs {}",
                data.len(),
                expected
            )));
        }

        let level_width = level.width as usize;
        let level_height = level.height as usize;
        let row_len = width as usize * bpp;
        for l in 0..depth as usize {
            for row in 0..height as usize {
                let dst_layer = layer as usize + l;
                let dst_row = y as usize + row;
                let dst = ((dst_layer * level_height + dst_row) * level_width + x as usize) * bpp;
                let src = (l * height as usize + row) * row_len;
                level.data[dst..dst + row_len].copy_from_slice(&data[src..src + row_len]);
            }
        }
        Ok(())
    }

    /// Extend the level chain down to 1x1 and fill each level by
    /// nearest-neighbor downsampling of the one above (top-left pixel of
    /// each 2x2 block). Good enough for content assertions in tests.
    pub fn build_mip_chain(&mut self) {
        let bpp = self.bytes_per_pixel as usize;
        if bpp == 0 || self.levels.is_empty() {
            return;
        }
        self.levels.truncate(1);
        let layers = self.layers as usize;

        loop {
            let prev = &self.levels[self.levels.len() - 1];
            if prev.width == 1 && prev.height == 1 {
                break;
            }
            let width = (prev.width / 2).max(1);
            let height = (prev.height / 2).max(1);
            let mut data = vec![0; width as usize * height as usize * layers * bpp];
            let (pw, ph) = (prev.width as usize, prev.height as usize);
            for l in 0..layers {
                for y in 0..height as usize {
                    for x in 0..width as usize {
                        let src = ((l * ph + y * 2) * pw + x * 2) * bpp;
                        let dst = ((l * height as usize + y) * width as usize + x) * bpp;
                        data[dst..dst + bpp]
                            .copy_from_slice(&self.levels[self.levels.len() - 1].data[src..src + bpp]);
                    }
                }
            }
            self.levels.push(LevelStorage {
                width,
                height,
                data,
            });
        }
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
#[path = "storage_tests.rs"]
mod tests;
