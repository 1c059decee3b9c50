/*!
# Nebula 2D Engine

Core traits and types for the Nebula 2D game framework.

This crate provides the platform-agnostic GPU resource layer using trait-based
dynamic polymorphism. The central abstraction is the [`device::Backend`] trait:
a low-level graphics command surface implemented by backend crates (OpenGL,
headless software, etc.). On top of it, [`device::Device`] owns the context
state (garbage-collection policy, allocation statistics, deferred-delete
queue) and acts as the factory for GPU resources.

## Architecture

- **Backend**: low-level command trait implemented by backend crates
- **Device**: owning context and resource factory
- **TextureArray**: one array of 2D image layers on the device
- **Buffer**: device-side byte buffer used for zero-copy texture uploads

Rendering collaborators (sprite batchers, post-process passes) consume these
resources through `TextureArray::bind` and the read-only introspection
accessors; they are not part of this crate.
*/

// Internal modules
mod engine;
mod error;
pub mod device;
pub mod log;

// Main nebula2d namespace module
pub mod nebula2d {
    // Error types
    pub use crate::error::{Error, Result};

    // Engine singleton
    pub use crate::engine::Engine;

    // Logging sub-module (types only, NOT macros)
    pub mod log {
        pub use crate::log::{DefaultLogger, LogEntry, LogSeverity, Logger};
        // Note: engine_* macros are NOT re-exported here - they are internal only
    }

    // Device sub-module with all GPU resource types
    pub mod device {
        pub use crate::device::*;
    }
}

// Re-export math library at crate root
pub use glam;
