//! End-to-end generator behavior with the real `qrcode`-backed encoder.

use simple_qr::config::GeneratorConfig;
use simple_qr::encoding::{Charset, EncodingMode};
use simple_qr::events::{ChangeEvent, Property};
use simple_qr::types::{Dimension, ErrorCorrectionLevel, SizingMode, TriState};
use simple_qr::{Generator, GeneratorError, GeneratorStatus};
use std::sync::{Arc, Mutex};
use tempfile::TempDir;

/// 20 lowercase bytes: one more than version 1 holds at L, so version 2 (25 modules).
const VERSION_2_CONTENT: &str = "abcdefghijklmnopqrst";

fn generator(mode: SizingMode, size: u32) -> Generator {
    Generator::from_config(&GeneratorConfig {
        mode,
        size,
        ..GeneratorConfig::default()
    })
}

fn record(generator: &mut Generator) -> Arc<Mutex<Vec<ChangeEvent>>> {
    let events = Arc::new(Mutex::new(Vec::new()));
    let sink = Arc::clone(&events);
    generator.subscribe(move |e| sink.lock().unwrap().push(e.clone()));
    events
}

#[test]
fn fixed_size_hello_fills_requested_dimension() {
    let mut g = generator(SizingMode::FixedSize, 210);
    g.set_content("hello");
    g.generate_code().unwrap();

    let symbol = g.symbol().unwrap();
    assert_eq!(symbol.version(), 1);
    assert_eq!(symbol.module_count(), 21);
    assert_eq!(g.actual_dimension(), Some(Dimension::square(210)));
    assert_eq!(g.module_size(), Some(10));
    assert_eq!(g.exceeds_requested_dimension(), TriState::False);
    assert_eq!(g.status(), GeneratorStatus::Valid);
}

#[test]
fn image_matches_actual_dimension_and_symbol() {
    let mut g = generator(SizingMode::BestFit, 100);
    g.set_content("hello");
    g.generate_code().unwrap();

    // 100 / 21 = 4 px per module
    let image = g.get_image().unwrap();
    assert_eq!(image.dimensions(), (84, 84));
    // top-left finder pattern is dark, its separator light
    assert_eq!(image.get_pixel(0, 0).0, [0]);
    assert_eq!(image.get_pixel(7 * 4, 0).0, [255]);
}

#[test]
fn best_fit_overshoots_small_target() {
    let mut g = generator(SizingMode::BestFit, 20);
    g.set_content(VERSION_2_CONTENT);
    g.generate_code().unwrap();

    assert_eq!(g.symbol().unwrap().module_count(), 25);
    assert_eq!(g.actual_dimension(), Some(Dimension::square(25)));
    assert_eq!(g.exceeds_requested_dimension(), TriState::True);
}

#[test]
fn fixed_size_rejects_small_target() {
    let mut g = generator(SizingMode::FixedSize, 20);
    g.set_content(VERSION_2_CONTENT);

    assert_eq!(
        g.generate_code(),
        Err(GeneratorError::CodeSizeExceeded {
            min: 25,
            max: 20,
            value: 20
        })
    );
    assert!(!g.has_result());
    assert_eq!(g.status(), GeneratorStatus::Dirty);
}

#[test]
fn module_size_mode_scales_module_count() {
    let mut g = generator(SizingMode::ModuleSize, 256);
    g.set_module_size(4).unwrap();
    g.set_content("hello");
    g.generate_code().unwrap();

    assert_eq!(g.actual_dimension(), Some(Dimension::square(84)));
    assert_eq!(g.exceeds_requested_dimension(), TriState::NotApplicable);
}

#[test]
fn ceiling_applies_in_module_size_mode() {
    let mut g = Generator::from_config(&GeneratorConfig {
        mode: SizingMode::ModuleSize,
        module_size: 10,
        max_image_size: 100,
        ..GeneratorConfig::default()
    });
    g.set_content("hello");

    assert_eq!(
        g.generate_code(),
        Err(GeneratorError::CodeSizeExceeded {
            min: 21,
            max: 100,
            value: 210
        })
    );
}

#[test]
fn oversized_content_is_too_large() {
    let mut g = generator(SizingMode::BestFit, 256);
    g.set_error_correction_level(Some(ErrorCorrectionLevel::H))
        .unwrap();
    g.set_content("x".repeat(3000));

    assert!(matches!(
        g.generate_code(),
        Err(GeneratorError::ContentTooLarge { .. })
    ));
    assert!(!g.has_result());
    assert_eq!(g.was_ascii(), TriState::True);
}

#[test]
fn higher_error_correction_needs_larger_symbol() {
    let mut g = generator(SizingMode::ModuleSize, 256);
    g.set_content(VERSION_2_CONTENT);
    g.generate_code().unwrap();
    let low = g.symbol().unwrap().version();

    g.set_error_correction_level(Some(ErrorCorrectionLevel::H))
        .unwrap();
    g.generate_code().unwrap();
    let high = g.symbol().unwrap().version();

    assert!(high > low, "H ({high}) should need more than L ({low})");
    assert_eq!(
        g.symbol().unwrap().error_correction_level(),
        ErrorCorrectionLevel::H
    );
}

#[test]
fn numeric_content_reports_numeric_mode() {
    let mut g = generator(SizingMode::BestFit, 256);
    g.set_content("0123456789");
    g.generate_code().unwrap();
    assert_eq!(g.symbol().unwrap().mode(), EncodingMode::Numeric);
    assert_eq!(g.was_ascii(), TriState::True);
}

#[test]
fn charset_flags_for_non_latin_text() {
    let mut g = generator(SizingMode::BestFit, 256);
    g.set_content("日本語");

    g.set_character_encoding(Charset::Utf8);
    g.generate_code().unwrap();
    assert_eq!(g.was_encodable(), TriState::True);
    assert_eq!(g.was_ascii(), TriState::False);

    g.set_character_encoding(Charset::UsAscii);
    g.generate_code().unwrap();
    assert_eq!(g.was_encodable(), TriState::False);
    assert!(g.has_result());
}

#[test]
fn shift_jis_kanji_text_uses_kanji_mode() {
    let mut g = generator(SizingMode::BestFit, 256);
    g.set_character_encoding(Charset::ShiftJis);
    g.set_content("漢字");
    g.generate_code().unwrap();

    assert_eq!(g.symbol().unwrap().mode(), EncodingMode::Kanji);
    assert_eq!(g.was_encodable(), TriState::True);
    assert_eq!(g.was_ascii(), TriState::False);
}

#[test]
fn raster_limit_fails_cleanly() {
    let mut g = Generator::from_config(&GeneratorConfig {
        mode: SizingMode::ModuleSize,
        module_size: 200_000,
        max_image_size: u32::MAX,
        ..GeneratorConfig::default()
    });
    g.set_content("hello");

    assert!(matches!(g.generate_code(), Err(GeneratorError::Encoding(_))));
    assert_eq!(g.status(), GeneratorStatus::Dirty);
    assert!(!g.has_result());
}

#[test]
fn one_event_per_setter_and_one_result_update_per_generation() {
    let mut g = generator(SizingMode::BestFit, 256);
    let events = record(&mut g);

    g.set_content("hello");
    g.set_error_correction_level(Some(ErrorCorrectionLevel::M))
        .unwrap();
    g.set_requested_dimension(Dimension::square(300)).unwrap();
    g.generate_code().unwrap();
    g.generate_code().unwrap();

    let events = events.lock().unwrap();
    let props: Vec<Property> = events.iter().map(|e| e.property).collect();
    assert_eq!(&props[..3], &[
        Property::Content,
        Property::ErrorCorrection,
        Property::RequestedDimension
    ]);
    assert_eq!(
        props.iter().filter(|p| **p == Property::ResultUpdated).count(),
        2
    );
    assert_eq!(props.last(), Some(&Property::ResultUpdated));
}

#[test]
fn mode_switch_carries_size_then_falls_back_to_default() {
    let mut g = generator(SizingMode::FixedSize, 256);
    g.set_requested_dimension(Dimension::square(420)).unwrap();
    g.set_content("hello");
    g.generate_code().unwrap();

    g.set_sizing_mode(SizingMode::ModuleSize);
    // 420 / 21 = 20 px per module carried over
    assert_eq!(g.module_size(), Some(20));

    // nothing rendered in module-size mode yet, so the configured size applies
    g.set_sizing_mode(SizingMode::BestFit);
    assert_eq!(g.requested_dimension(), Some(Dimension::square(256)));
}

#[test]
fn png_export_round_trips_dimensions() {
    let tmp = TempDir::new().unwrap();
    let path = tmp.path().join("code.png");

    let mut g = generator(SizingMode::FixedSize, 210);
    g.set_content("hello");
    g.generate_code().unwrap();
    g.get_image()
        .unwrap()
        .save_with_format(&path, image::ImageFormat::Png)
        .unwrap();

    let reopened = image::open(&path).unwrap();
    assert_eq!((reopened.width(), reopened.height()), (210, 210));
}
