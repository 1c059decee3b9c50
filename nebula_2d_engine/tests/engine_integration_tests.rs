//! Integration tests for the Engine singleton lifecycle
//!
//! The headless backend stands in for a real device, so no GPU is required.
//!
//! Run with: cargo test --test engine_integration_tests

use nebula_2d_engine::nebula2d::device::{Device, TextureArrayDesc};
use nebula_2d_engine::nebula2d::{Engine, Error};
use nebula_2d_engine_device_headless::HeadlessBackend;
use serial_test::serial;

// ============================================================================
// ENGINE LIFECYCLE TESTS
// ============================================================================

#[test]
#[serial]
fn test_integration_device_singleton_lifecycle() {
    Engine::initialize().unwrap();
    let _ = Engine::destroy_device();

    Engine::register_device(Device::new(HeadlessBackend::new())).unwrap();

    // The singleton hands out usable clones
    let device = Engine::device().unwrap();
    let texture = device.texture(TextureArrayDesc::default()).unwrap();
    assert_ne!(texture.raw_handle(), 0);
    drop(texture);

    Engine::destroy_device().unwrap();
    let err = Engine::device().unwrap_err();
    assert!(matches!(err, Error::Configuration(_)));

    Engine::shutdown();
}

#[test]
#[serial]
fn test_integration_double_registration_rejected() {
    Engine::initialize().unwrap();
    let _ = Engine::destroy_device();

    Engine::register_device(Device::new(HeadlessBackend::new())).unwrap();
    let err = Engine::register_device(Device::new(HeadlessBackend::new())).unwrap_err();
    assert!(matches!(err, Error::Configuration(_)));

    Engine::destroy_device().unwrap();
    Engine::shutdown();
}

#[test]
#[serial]
fn test_integration_resources_survive_singleton_destruction() {
    Engine::initialize().unwrap();
    let _ = Engine::destroy_device();

    Engine::register_device(Device::new(HeadlessBackend::new())).unwrap();
    let device = Engine::device().unwrap();
    let texture = device.texture(TextureArrayDesc::default()).unwrap();

    // Dropping the singleton slot does not tear down the context while a
    // device clone is still alive
    Engine::destroy_device().unwrap();
    assert_eq!(device.stats().active("texture"), 1);
    drop(texture);
    assert_eq!(device.stats().active("texture"), 0);

    Engine::shutdown();
}
