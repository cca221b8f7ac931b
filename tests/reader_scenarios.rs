//! End-to-end reader behaviour with scripted decoders
//!
//! The decoders here stand in for real symbol grammars: each one "finds" a
//! symbol when a simple pixel condition holds, which is enough to exercise
//! rotation, inversion, dispatch order and listeners.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use rust_barcode::binarizer::BinaryBitmap;
use rust_barcode::decoder::{Decoder, MultipleDecoder, ResultPointCallback};
use rust_barcode::models::{
    BarcodeFormat, DecodeHints, DecodedResult, MetadataValue, Point, ResultMetadataType,
    StructuredAppend,
};
use rust_barcode::{
    BarcodeReader, BitmapFormat, DecoderRegistry, Error, GrayLuminanceSource, LuminanceSource,
    ReaderKind, ScanState,
};

/// Succeeds when the top-left pixel of the binarized frame is black
struct TopLeftDark {
    format: BarcodeFormat,
    calls: Arc<AtomicUsize>,
}

impl Decoder for TopLeftDark {
    fn decode(
        &mut self,
        image: &BinaryBitmap,
        _hints: &DecodeHints,
        on_point: Option<&mut ResultPointCallback>,
    ) -> Option<DecodedResult> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let matrix = image.black_matrix()?;
        if !matrix.get(0, 0) {
            return None;
        }
        let corner = Point::new(0.5, 0.5);
        if let Some(callback) = on_point {
            callback(Some(corner));
        }
        Some(DecodedResult::new("corner", None, vec![corner], self.format))
    }
}

/// Never finds anything
struct Blind {
    calls: Arc<AtomicUsize>,
}

impl Decoder for Blind {
    fn decode(
        &mut self,
        _image: &BinaryBitmap,
        _hints: &DecodeHints,
        _on_point: Option<&mut ResultPointCallback>,
    ) -> Option<DecodedResult> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        None
    }
}

/// Never finds anything; records the rotation hint of every call
struct HintRecorder {
    seen: Arc<Mutex<Vec<bool>>>,
}

impl Decoder for HintRecorder {
    fn decode(
        &mut self,
        _image: &BinaryBitmap,
        hints: &DecodeHints,
        _on_point: Option<&mut ResultPointCallback>,
    ) -> Option<DecodedResult> {
        self.seen.lock().unwrap().push(hints.try_harder_without_rotation);
        None
    }
}

fn recording_reader(seen: &Arc<Mutex<Vec<bool>>>) -> BarcodeReader {
    let seen = Arc::clone(seen);
    BarcodeReader::new(DecoderRegistry::new().with(ReaderKind::QrCode, move || {
        Box::new(HintRecorder {
            seen: Arc::clone(&seen),
        })
    }))
}

fn counter() -> Arc<AtomicUsize> {
    Arc::new(AtomicUsize::new(0))
}

fn registry_with(kind: ReaderKind, format: BarcodeFormat, calls: &Arc<AtomicUsize>) -> DecoderRegistry {
    let calls = Arc::clone(calls);
    DecoderRegistry::new().with(kind, move || {
        Box::new(TopLeftDark {
            format,
            calls: Arc::clone(&calls),
        })
    })
}

/// 20x20 white frame with one black quadrant
fn quadrant_frame(dark_right: bool, dark_bottom: bool) -> Arc<dyn LuminanceSource> {
    let data = (0..400)
        .map(|i| {
            let (x, y) = (i % 20, i / 20);
            if (x >= 10) == dark_right && (y >= 10) == dark_bottom { 0 } else { 255 }
        })
        .collect();
    Arc::new(GrayLuminanceSource::new(data, 20, 20).unwrap())
}

/// 20x20 black frame with a white top-left quadrant
fn inverted_quadrant_frame() -> Arc<dyn LuminanceSource> {
    let data = (0..400)
        .map(|i| if i % 20 < 10 && i / 20 < 10 { 255 } else { 0 })
        .collect();
    Arc::new(GrayLuminanceSource::new(data, 20, 20).unwrap())
}

#[test]
fn upright_symbol_reports_zero_orientation() {
    let calls = counter();
    let mut reader = BarcodeReader::new(registry_with(ReaderKind::QrCode, BarcodeFormat::QrCode, &calls));

    let result = reader.decode(quadrant_frame(false, false)).unwrap();
    assert_eq!(result.format, BarcodeFormat::QrCode);
    assert_eq!(result.orientation(), Some(0));
    assert_eq!(calls.load(Ordering::SeqCst), 1);
}

#[test]
fn auto_rotate_reports_half_turn() {
    let calls = counter();
    let mut reader = BarcodeReader::new(registry_with(ReaderKind::QrCode, BarcodeFormat::QrCode, &calls));
    reader.set_auto_rotate(true);

    // Dark corner at the bottom right reaches the top left after two turns
    let result = reader.decode(quadrant_frame(true, true)).unwrap();
    assert_eq!(result.orientation(), Some(180));
    assert_eq!(calls.load(Ordering::SeqCst), 3);
}

#[test]
fn without_auto_rotate_only_one_attempt() {
    let calls = counter();
    let mut reader = BarcodeReader::new(registry_with(ReaderKind::QrCode, BarcodeFormat::QrCode, &calls));
    assert!(reader.decode(quadrant_frame(true, true)).is_none());
    assert_eq!(calls.load(Ordering::SeqCst), 1);
}

#[test]
fn inversion_fallback_within_first_rotation() {
    let calls = counter();
    let mut reader = BarcodeReader::new(registry_with(ReaderKind::QrCode, BarcodeFormat::QrCode, &calls));
    reader.set_try_inverted(true);

    let result = reader.decode(inverted_quadrant_frame()).unwrap();
    assert_eq!(result.orientation(), Some(0));
    assert_eq!(calls.load(Ordering::SeqCst), 2);
}

#[test]
fn inversion_disabled_misses() {
    let calls = counter();
    let mut reader = BarcodeReader::new(registry_with(ReaderKind::QrCode, BarcodeFormat::QrCode, &calls));
    assert!(reader.decode(inverted_quadrant_frame()).is_none());
}

#[test]
fn successful_decoder_moves_to_front() {
    let one_d_calls = counter();
    let qr_calls = counter();
    let dm_calls = counter();
    let mut registry = registry_with(ReaderKind::OneD, BarcodeFormat::Code128, &one_d_calls);
    for (kind, calls) in [(ReaderKind::QrCode, &qr_calls), (ReaderKind::DataMatrix, &dm_calls)] {
        let calls = Arc::clone(calls);
        registry.register(kind, move || Box::new(Blind { calls: Arc::clone(&calls) }));
    }

    let mut reader = BarcodeReader::new(registry);
    let mut hints = DecodeHints::with_formats([
        BarcodeFormat::Code128,
        BarcodeFormat::QrCode,
        BarcodeFormat::DataMatrix,
    ]);
    hints.try_harder = true;
    reader.set_options(hints);

    let result = reader.decode(quadrant_frame(false, false)).unwrap();
    assert_eq!(result.format, BarcodeFormat::Code128);
    assert_eq!(reader.decoder_order()[0], ReaderKind::OneD);
    assert_eq!(qr_calls.load(Ordering::SeqCst), 1);
    assert_eq!(reader.state(), ScanState::Primed);

    // Next frame goes straight to the 1D decoder
    reader.decode(quadrant_frame(false, false)).unwrap();
    assert_eq!(qr_calls.load(Ordering::SeqCst), 1);
    assert_eq!(dm_calls.load(Ordering::SeqCst), 1);
    assert_eq!(one_d_calls.load(Ordering::SeqCst), 2);

    // Changing options forgets the learned order
    reader.options_mut().try_harder = true;
    assert_eq!(reader.state(), ScanState::Fresh);
    reader.decode(quadrant_frame(false, false)).unwrap();
    assert_eq!(qr_calls.load(Ordering::SeqCst), 2);
}

#[test]
fn listeners_receive_points_and_results() {
    let calls = counter();
    let mut reader = BarcodeReader::new(registry_with(ReaderKind::QrCode, BarcodeFormat::QrCode, &calls));
    reader.set_auto_rotate(true);

    let points: Arc<Mutex<Vec<Option<Point>>>> = Arc::default();
    let sink = Arc::clone(&points);
    reader.on_result_point(move |point| sink.lock().unwrap().push(point));

    let texts: Arc<Mutex<Vec<String>>> = Arc::default();
    let sink = Arc::clone(&texts);
    reader.on_result_found(move |result| sink.lock().unwrap().push(result.text.clone()));

    reader.decode(quadrant_frame(true, true)).unwrap();

    // Two misses before the hit, each reported as None
    let points = points.lock().unwrap();
    assert_eq!(points.len(), 3);
    assert!(points[0].is_none() && points[1].is_none());
    assert_eq!(points[2], Some(Point::new(0.5, 0.5)));
    assert_eq!(*texts.lock().unwrap(), vec!["corner".to_string()]);
}

#[test]
fn decode_raw_converts_pixels() {
    let calls = counter();
    let mut reader = BarcodeReader::new(registry_with(ReaderKind::QrCode, BarcodeFormat::QrCode, &calls));

    let mut rgb = vec![255u8; 20 * 20 * 3];
    for y in 0..10 {
        for x in 0..10 {
            let offset = (y * 20 + x) * 3;
            rgb[offset..offset + 3].copy_from_slice(&[0, 0, 0]);
        }
    }
    let result = reader.decode_raw(&rgb, 20, 20, BitmapFormat::Rgb24).unwrap();
    assert!(result.is_some());

    let err = reader.decode_raw(&rgb[..10], 20, 20, BitmapFormat::Rgb24).unwrap_err();
    assert_eq!(err, Error::BufferTooSmall { expected: 1200, actual: 10 });
}

#[test]
fn decode_multiple_prefers_qr_multi_reader() {
    struct TwoCodes;

    impl MultipleDecoder for TwoCodes {
        fn decode_multiple(
            &mut self,
            _image: &BinaryBitmap,
            _hints: &DecodeHints,
            _on_point: Option<&mut ResultPointCallback>,
        ) -> Vec<DecodedResult> {
            ["first", "second"]
                .into_iter()
                .map(|text| DecodedResult::new(text, None, vec![], BarcodeFormat::QrCode))
                .collect()
        }
    }

    let calls = counter();
    let mut registry = registry_with(ReaderKind::QrCode, BarcodeFormat::QrCode, &calls);
    registry.register_qr_multi(|| Box::new(TwoCodes));
    let mut reader = BarcodeReader::new(registry);

    // Generic search through the dispatcher when formats are not QR-only
    let results = reader.decode_multiple(quadrant_frame(false, false));
    assert_eq!(results.len(), 1);
    assert!(calls.load(Ordering::SeqCst) >= 1);

    reader.set_options(DecodeHints::with_formats([BarcodeFormat::QrCode]));
    let results = reader.decode_multiple(quadrant_frame(true, true));
    let texts: Vec<_> = results.iter().map(|r| r.text.as_str()).collect();
    assert_eq!(texts, ["first", "second"]);
    assert!(results.iter().all(|r| r.orientation() == Some(0)));
}

#[test]
fn decode_multiple_rotates_and_stamps_each_result() {
    let calls = counter();
    let mut reader = BarcodeReader::new(registry_with(ReaderKind::QrCode, BarcodeFormat::QrCode, &calls));
    reader.set_auto_rotate(true);

    let results = reader.decode_multiple(quadrant_frame(false, true));
    assert_eq!(results.len(), 1);
    // Bottom-left dark quadrant reaches the top left after three quarter turns
    assert_eq!(results[0].orientation(), Some(270));
}

#[test]
fn auto_rotate_hint_survives_replaced_options() {
    let seen: Arc<Mutex<Vec<bool>>> = Arc::default();
    let mut reader = recording_reader(&seen);
    reader.set_auto_rotate(true);
    reader.set_options(DecodeHints::with_formats([BarcodeFormat::QrCode]));

    assert!(reader.decode(quadrant_frame(true, true)).is_none());
    assert_eq!(*seen.lock().unwrap(), vec![true; 4]);
    assert!(!reader.options().try_harder_without_rotation);

    seen.lock().unwrap().clear();
    reader.options_mut().try_harder = true;
    assert!(reader.decode_multiple(quadrant_frame(true, true)).is_empty());
    assert_eq!(*seen.lock().unwrap(), vec![true; 4]);
}

#[test]
fn disabling_auto_rotate_keeps_caller_hint() {
    let seen: Arc<Mutex<Vec<bool>>> = Arc::default();
    let mut reader = recording_reader(&seen);
    let mut hints = DecodeHints::default();
    hints.try_harder_without_rotation = true;
    reader.set_options(hints);
    reader.set_auto_rotate(true);
    reader.set_auto_rotate(false);

    assert!(reader.decode(quadrant_frame(true, true)).is_none());
    assert_eq!(*seen.lock().unwrap(), vec![true]);
    assert!(reader.options().try_harder_without_rotation);
}

#[test]
fn decode_multiple_collects_one_structured_append_sequence() {
    struct Sequence;

    impl MultipleDecoder for Sequence {
        fn decode_multiple(
            &mut self,
            _image: &BinaryBitmap,
            _hints: &DecodeHints,
            _on_point: Option<&mut ResultPointCallback>,
        ) -> Vec<DecodedResult> {
            [("part 2", 1, 40), ("stray", 0, 11), ("part 1", 0, 40)]
                .into_iter()
                .map(|(text, position, parity)| {
                    let mut result = DecodedResult::new(text, None, vec![], BarcodeFormat::QrCode);
                    result.put_metadata(
                        ResultMetadataType::StructuredAppendSequence,
                        MetadataValue::Int(position),
                    );
                    result.put_metadata(
                        ResultMetadataType::StructuredAppendParity,
                        MetadataValue::Int(parity),
                    );
                    result
                })
                .collect()
        }
    }

    let calls = counter();
    let mut registry = registry_with(ReaderKind::QrCode, BarcodeFormat::QrCode, &calls);
    registry.register_qr_multi(|| Box::new(Sequence));
    let mut reader = BarcodeReader::new(registry);

    let mut hints = DecodeHints::with_formats([BarcodeFormat::QrCode]);
    hints.structured_append = Some(StructuredAppend {
        parity: Some(40),
        members_only: true,
    });
    reader.set_options(hints);

    let texts: Vec<_> = reader
        .decode_multiple(quadrant_frame(false, false))
        .into_iter()
        .map(|r| r.text)
        .collect();
    assert_eq!(texts, ["part 1", "part 2"]);
}
