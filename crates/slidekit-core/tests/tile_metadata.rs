//! Integration tests for deriving slide scale from tile-server metadata

use slidekit_core::calibration::MAGNIFICATION_MPP_FACTOR;
use slidekit_core::{CalibrationError, CalibrationState, SlideMetadata, TileMetadata};

fn metadata(mm_x: Option<f64>, mm_y: Option<f64>, magnification: Option<f64>) -> TileMetadata {
    TileMetadata {
        size_x: 100_000,
        size_y: 80_000,
        magnification,
        mm_x,
        mm_y,
    }
}

#[test]
fn test_square_pixels_are_factory_calibrated() {
    let slide =
        SlideMetadata::from_tile_metadata(&metadata(Some(0.00025), Some(0.00025), Some(40.0)))
            .unwrap();
    assert!((slide.mpp.unwrap() - 0.25).abs() < 1e-12);
    assert_eq!(slide.mpp_source, "scanner");
    assert_eq!(slide.calibration_state, CalibrationState::Factory);
}

#[test]
fn test_anisotropic_pixels_are_unvalidated() {
    let slide =
        SlideMetadata::from_tile_metadata(&metadata(Some(0.00025), Some(0.0003), None)).unwrap();
    assert!((slide.mpp.unwrap() - 0.25).abs() < 1e-12);
    assert_eq!(slide.calibration_state, CalibrationState::Unvalidated);
}

#[test]
fn test_single_axis_pixel_size() {
    let slide = SlideMetadata::from_tile_metadata(&metadata(None, Some(0.0005), None)).unwrap();
    assert!((slide.mpp.unwrap() - 0.5).abs() < 1e-12);
    assert_eq!(slide.calibration_state, CalibrationState::Factory);
}

#[test]
fn test_magnification_only_is_estimated() {
    let slide = SlideMetadata::from_tile_metadata(&metadata(None, None, Some(20.0))).unwrap();
    assert_eq!(slide.mpp, Some(MAGNIFICATION_MPP_FACTOR / 20.0));
    assert_eq!(slide.mpp_source, "magnification");
    assert_eq!(slide.calibration_state, CalibrationState::Estimated);
}

#[test]
fn test_no_scale_information() {
    let slide = SlideMetadata::from_tile_metadata(&metadata(None, None, None)).unwrap();
    assert_eq!(slide, SlideMetadata::uncalibrated());
    assert_eq!(slide.calibration_state, CalibrationState::Unknown);
}

#[test]
fn test_invalid_sizes_rejected() {
    let err = SlideMetadata::from_tile_metadata(&metadata(Some(0.0), None, None)).unwrap_err();
    assert!(matches!(err, CalibrationError::InvalidPixelSize { ref axis, .. } if axis == "x"));

    let err =
        SlideMetadata::from_tile_metadata(&metadata(Some(0.00025), Some(f64::NAN), None))
            .unwrap_err();
    assert!(matches!(err, CalibrationError::InvalidPixelSize { ref axis, .. } if axis == "y"));

    let err = SlideMetadata::from_tile_metadata(&metadata(None, None, Some(-5.0))).unwrap_err();
    assert_eq!(err, CalibrationError::InvalidMagnification { value: -5.0 });
}

#[test]
fn test_parses_tile_server_response() {
    let json = r#"{
        "levels": 9,
        "sizeX": 98304,
        "sizeY": 75264,
        "tileWidth": 256,
        "tileHeight": 256,
        "magnification": 40.0,
        "mm_x": 0.000252,
        "mm_y": 0.000252
    }"#;
    let meta: TileMetadata = serde_json::from_str(json).unwrap();
    assert_eq!(meta.size_x, 98304);
    assert_eq!(meta.mm_x, Some(0.000252));

    let slide = SlideMetadata::from_tile_metadata(&meta).unwrap();
    assert!((slide.mpp.unwrap() - 0.252).abs() < 1e-9);
}

#[test]
fn test_slide_metadata_wire_names() {
    let slide = SlideMetadata::new(Some(0.5), "site", CalibrationState::SiteCalibrated);
    let value = serde_json::to_value(&slide).unwrap();
    assert_eq!(value["mpp"], 0.5);
    assert_eq!(value["mppSource"], "site");
    assert_eq!(value["calibrationState"], "site_calibrated");
}
