/// Nebula2D Engine - Singleton manager for engine subsystems
///
/// This module provides global singleton management for the graphics device
/// and the logging system. It uses thread-safe static storage with RwLock
/// for safe concurrent access.

use crate::device::Device;
use crate::error::{Error, Result};
use crate::log::{DefaultLogger, LogEntry, LogSeverity, Logger};
use std::sync::{OnceLock, RwLock};
use std::time::SystemTime;

// ===== INTERNAL STATE =====

/// Global engine state storage
static ENGINE_STATE: OnceLock<EngineState> = OnceLock::new();

/// Global logger (initialized with DefaultLogger)
static LOGGER: OnceLock<RwLock<Box<dyn Logger>>> = OnceLock::new();

/// Internal state structure holding all engine singletons
struct EngineState {
    /// Graphics device singleton
    device: RwLock<Option<Device>>,
}

impl EngineState {
    fn new() -> Self {
        Self {
            device: RwLock::new(None),
        }
    }
}

// ===== PUBLIC API =====

/// Main engine singleton manager
///
/// Manages the lifecycle of the graphics device singleton and the global
/// logger. Registering a device is optional: code that prefers explicit
/// ownership can pass `Device` values around directly and only use the
/// logging half of this type.
///
/// # Example
///
/// ```no_run
/// use nebula_2d_engine::nebula2d::Engine;
/// # fn make_device() -> nebula_2d_engine::nebula2d::device::Device { unimplemented!() }
///
/// Engine::initialize()?;
/// Engine::register_device(make_device())?;
///
/// let device = Engine::device()?;
/// // Create textures through the device...
///
/// Engine::shutdown();
/// # Ok::<(), nebula_2d_engine::nebula2d::Error>(())
/// ```
pub struct Engine;

impl Engine {
    /// Helper to log errors before returning them (internal use)
    fn log_and_return_error(error: Error) -> Error {
        crate::engine_error!("nebula2d::Engine", "{}", error);
        error
    }

    /// Initialize the engine
    ///
    /// This must be called once at application startup before registering
    /// any subsystems.
    ///
    /// # Errors
    ///
    /// Currently always succeeds, but returns Result for future extensibility.
    pub fn initialize() -> Result<()> {
        ENGINE_STATE.get_or_init(EngineState::new);
        Ok(())
    }

    /// Shutdown the engine and destroy all singletons
    ///
    /// Releases the registered device (if any). Resources still alive after
    /// this point hold only weak references to the device and become
    /// implicitly invalid without emitting further device calls.
    pub fn shutdown() {
        if let Some(state) = ENGINE_STATE.get() {
            if let Ok(mut device) = state.device.write() {
                *device = None;
            }
        }
    }

    /// Register the graphics device singleton
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The engine is not initialized
    /// - A device is already registered
    pub fn register_device(device: Device) -> Result<()> {
        let state = ENGINE_STATE.get().ok_or_else(|| {
            Self::log_and_return_error(Error::Configuration(
                "Engine not initialized. Call Engine::initialize() first.".to_string(),
            ))
        })?;

        let mut lock = state.device.write().map_err(|_| {
            Self::log_and_return_error(Error::Resource("Device lock poisoned".to_string()))
        })?;

        if lock.is_some() {
            return Err(Self::log_and_return_error(Error::Configuration(
                "Device already registered. Call Engine::destroy_device() first.".to_string(),
            )));
        }

        *lock = Some(device);

        crate::engine_info!("nebula2d::Engine", "Device singleton registered");

        Ok(())
    }

    /// Get the graphics device singleton
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The engine is not initialized
    /// - No device has been registered
    pub fn device() -> Result<Device> {
        let state = ENGINE_STATE.get().ok_or_else(|| {
            Self::log_and_return_error(Error::Configuration(
                "Engine not initialized. Call Engine::initialize() first.".to_string(),
            ))
        })?;

        let lock = state.device.read().map_err(|_| {
            Self::log_and_return_error(Error::Resource("Device lock poisoned".to_string()))
        })?;

        lock.clone().ok_or_else(|| {
            Self::log_and_return_error(Error::Configuration(
                "Device not registered. Call Engine::register_device() first.".to_string(),
            ))
        })
    }

    /// Destroy the device singleton
    ///
    /// Removes the device singleton, allowing a new one to be registered.
    /// Existing clones of the device remain valid until dropped.
    ///
    /// # Errors
    ///
    /// Returns an error if the engine is not initialized
    pub fn destroy_device() -> Result<()> {
        let state = ENGINE_STATE.get().ok_or_else(|| {
            Self::log_and_return_error(Error::Configuration(
                "Engine not initialized".to_string(),
            ))
        })?;

        let mut lock = state.device.write().map_err(|_| {
            Self::log_and_return_error(Error::Resource("Device lock poisoned".to_string()))
        })?;

        *lock = None;

        crate::engine_info!("nebula2d::Engine", "Device singleton destroyed");

        Ok(())
    }

    // ===== LOGGING API =====

    /// Set a custom logger
    ///
    /// Replace the default logger with a custom implementation.
    ///
    /// # Example
    ///
    /// ```no_run
    /// use nebula_2d_engine::nebula2d::{Engine, log::{Logger, LogEntry}};
    ///
    /// struct FileLogger;
    /// impl Logger for FileLogger {
    ///     fn log(&self, entry: &LogEntry) {
    ///         // Write to file...
    ///     }
    /// }
    ///
    /// Engine::set_logger(FileLogger);
    /// ```
    pub fn set_logger<L: Logger + 'static>(logger: L) {
        let logger_lock = LOGGER.get_or_init(|| RwLock::new(Box::new(DefaultLogger)));
        if let Ok(mut lock) = logger_lock.write() {
            *lock = Box::new(logger);
        }
    }

    /// Reset logger to default (DefaultLogger)
    pub fn reset_logger() {
        let logger_lock = LOGGER.get_or_init(|| RwLock::new(Box::new(DefaultLogger)));
        if let Ok(mut lock) = logger_lock.write() {
            *lock = Box::new(DefaultLogger);
        }
    }

    /// Internal logging method (for simple logs without file:line)
    ///
    /// Used by the engine_trace!/engine_debug!/engine_info!/engine_warn! macros.
    pub fn log(severity: LogSeverity, source: &str, message: String) {
        let logger_lock = LOGGER.get_or_init(|| RwLock::new(Box::new(DefaultLogger)));
        if let Ok(lock) = logger_lock.read() {
            lock.log(&LogEntry {
                severity,
                timestamp: SystemTime::now(),
                source: source.to_string(),
                message,
                file: None,
                line: None,
            });
        }
    }

    /// Internal logging method with file:line information (for ERROR logs)
    ///
    /// Used by the engine_error! macro to include source location.
    pub fn log_detailed(
        severity: LogSeverity,
        source: &str,
        message: String,
        file: &'static str,
        line: u32,
    ) {
        let logger_lock = LOGGER.get_or_init(|| RwLock::new(Box::new(DefaultLogger)));
        if let Ok(lock) = logger_lock.read() {
            lock.log(&LogEntry {
                severity,
                timestamp: SystemTime::now(),
                source: source.to_string(),
                message,
                file: Some(file),
                line: Some(line),
            });
        }
    }
}
