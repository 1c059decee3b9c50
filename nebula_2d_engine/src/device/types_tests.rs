//! Unit tests for format and parameter state enumerations

use crate::device::{
    CompareFunc, ImageFormat, PixelKind, Swizzle, SwizzleChannel, Wrap,
};
use crate::error::Error;

// ============================================================================
// PIXEL KIND
// ============================================================================

#[test]
fn test_pixel_kind_byte_sizes() {
    assert_eq!(PixelKind::F1.byte_size(), 1);
    assert_eq!(PixelKind::F2.byte_size(), 2);
    assert_eq!(PixelKind::F4.byte_size(), 4);
    assert_eq!(PixelKind::I1.byte_size(), 1);
    assert_eq!(PixelKind::I2.byte_size(), 2);
    assert_eq!(PixelKind::I4.byte_size(), 4);
    assert_eq!(PixelKind::U1.byte_size(), 1);
    assert_eq!(PixelKind::U2.byte_size(), 2);
    assert_eq!(PixelKind::U4.byte_size(), 4);
}

#[test]
fn test_pixel_kind_float_classification() {
    // Float kinds default to linear filtering, integer kinds to nearest
    assert!(PixelKind::F1.is_float());
    assert!(PixelKind::F2.is_float());
    assert!(PixelKind::F4.is_float());
    assert!(!PixelKind::I1.is_float());
    assert!(!PixelKind::I2.is_float());
    assert!(!PixelKind::I4.is_float());
    assert!(!PixelKind::U1.is_float());
    assert!(!PixelKind::U2.is_float());
    assert!(!PixelKind::U4.is_float());
}

#[test]
fn test_pixel_kind_code_round_trip() {
    for code in ["f1", "f2", "f4", "i1", "i2", "i4", "u1", "u2", "u4"] {
        let kind: PixelKind = code.parse().unwrap();
        assert_eq!(kind.code(), code);
    }
}

#[test]
fn test_pixel_kind_unknown_code() {
    let err = "x8".parse::<PixelKind>().unwrap_err();
    match err {
        Error::Configuration(msg) => {
            // The error must list the supported kinds
            assert!(msg.contains("x8"));
            assert!(msg.contains("f1"));
            assert!(msg.contains("u4"));
        }
        other => panic!("expected Configuration error, got {:?}", other),
    }
}

#[test]
fn test_pixel_kind_default() {
    assert_eq!(PixelKind::default(), PixelKind::F1);
}

// ============================================================================
// COMPARE FUNC
// ============================================================================

#[test]
fn test_compare_func_symbol_round_trip() {
    for symbol in ["<=", "<", ">=", ">", "==", "!=", "0", "1"] {
        let func = CompareFunc::from_symbol(symbol).unwrap();
        assert_eq!(func.symbol(), symbol);
    }
}

#[test]
fn test_compare_func_invalid_symbol() {
    assert!(matches!(
        CompareFunc::from_symbol("=<"),
        Err(Error::Configuration(_))
    ));
    assert!(matches!(
        CompareFunc::from_symbol(""),
        Err(Error::Configuration(_))
    ));
}

// ============================================================================
// SWIZZLE
// ============================================================================

#[test]
fn test_swizzle_parse_and_display() {
    let swizzle: Swizzle = "ABGR".parse().unwrap();
    assert_eq!(
        swizzle.channels(),
        [
            SwizzleChannel::Alpha,
            SwizzleChannel::Blue,
            SwizzleChannel::Green,
            SwizzleChannel::Red,
        ]
    );
    assert_eq!(swizzle.to_string(), "ABGR");
}

#[test]
fn test_swizzle_parse_case_insensitive() {
    let swizzle: Swizzle = "rgb1".parse().unwrap();
    assert_eq!(swizzle.to_string(), "RGB1");
}

#[test]
fn test_swizzle_parse_masks() {
    let swizzle: Swizzle = "R000".parse().unwrap();
    assert_eq!(
        swizzle.channels(),
        [
            SwizzleChannel::Red,
            SwizzleChannel::Zero,
            SwizzleChannel::Zero,
            SwizzleChannel::Zero,
        ]
    );
}

#[test]
fn test_swizzle_wrong_length() {
    assert!(matches!("RGB".parse::<Swizzle>(), Err(Error::Configuration(_))));
    assert!(matches!("RGBAR".parse::<Swizzle>(), Err(Error::Configuration(_))));
    assert!(matches!("".parse::<Swizzle>(), Err(Error::Configuration(_))));
}

#[test]
fn test_swizzle_invalid_character() {
    let err = "RGBX".parse::<Swizzle>().unwrap_err();
    match err {
        Error::Configuration(msg) => assert!(msg.contains("RGBA01")),
        other => panic!("expected Configuration error, got {:?}", other),
    }
}

#[test]
fn test_swizzle_default_identity() {
    assert_eq!(Swizzle::default().to_string(), "RGBA");
}

// ============================================================================
// IMAGE FORMAT
// ============================================================================

#[test]
fn test_image_format_bytes_per_pixel() {
    let rgba8 = ImageFormat { components: 4, kind: PixelKind::U1 };
    assert_eq!(rgba8.bytes_per_pixel(), 4);

    let rg16f = ImageFormat { components: 2, kind: PixelKind::F2 };
    assert_eq!(rg16f.bytes_per_pixel(), 4);

    let r32f = ImageFormat { components: 1, kind: PixelKind::F4 };
    assert_eq!(r32f.bytes_per_pixel(), 4);

    let rgb32i = ImageFormat { components: 3, kind: PixelKind::I4 };
    assert_eq!(rgb32i.bytes_per_pixel(), 12);
}

// ============================================================================
// DEFAULTS
// ============================================================================

#[test]
fn test_wrap_default_is_repeat() {
    assert_eq!(Wrap::default(), Wrap::Repeat);
}
