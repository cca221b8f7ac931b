//! Outward-facing reader: rotation and inversion retries around the
//! multi-format dispatcher, plus result notifications

use std::borrow::Cow;
use std::fmt;
use std::sync::Arc;

use tracing::{debug, trace};

use crate::binarizer::{Binarizer, BinarizerFactory, BinaryBitmap, HybridBinarizer};
use crate::decoder::{
    Decoder, DecoderRegistry, GenericMultipleDecoder, MultiFormatReader, MultipleDecoder,
    ReaderKind, ResultPointCallback,
};
use crate::error::Result;
use crate::luminance::{GrayLuminanceSource, LuminanceSource};
use crate::models::{BarcodeFormat, DecodeHints, DecodedResult, Point};
use crate::utils::grayscale::BitmapFormat;

/// Called with every result the reader returns
pub type ResultListener = dyn FnMut(&DecodedResult) + Send + 'static;

/// Whether the dispatcher's decoder list matches the current options
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScanState {
    /// Next decode rebuilds the decoder list from the options
    Fresh,
    /// Decoder list is current; decodes reuse it and its learned order
    Primed,
}

/// High-level decoder for luminance sources and raw pixel buffers
///
/// Holds the options, the rotation/inversion switches and the
/// multi-format dispatcher. Consecutive decodes with unchanged options reuse
/// the dispatcher state, so the decoder that last succeeded is tried first.
pub struct BarcodeReader {
    registry: DecoderRegistry,
    reader: MultiFormatReader,
    options: DecodeHints,
    auto_rotate: bool,
    try_inverted: bool,
    state: ScanState,
    binarizer_factory: Box<BinarizerFactory>,
    result_point_listener: Option<Box<ResultPointCallback>>,
    result_listener: Option<Box<ResultListener>>,
}

impl BarcodeReader {
    /// Reader over the decoders in `registry`, hybrid binarizer, no rotation
    pub fn new(registry: DecoderRegistry) -> Self {
        Self {
            reader: MultiFormatReader::new(registry.clone()),
            registry,
            options: DecodeHints::default(),
            auto_rotate: false,
            try_inverted: false,
            state: ScanState::Fresh,
            binarizer_factory: Box::new(|source: Arc<dyn LuminanceSource>| -> Box<dyn Binarizer> {
                Box::new(HybridBinarizer::new(source))
            }),
            result_point_listener: None,
            result_listener: None,
        }
    }

    /// Whether 90 degree rotations are tried after a miss
    pub fn auto_rotate(&self) -> bool {
        self.auto_rotate
    }

    /// Enable or disable rotation retries
    ///
    /// While enabled, decoders always see `try_harder_without_rotation` set so
    /// they leave rotation to the reader. The stored options are not touched.
    pub fn set_auto_rotate(&mut self, auto_rotate: bool) {
        self.auto_rotate = auto_rotate;
        self.state = ScanState::Fresh;
    }

    /// Whether an inverted copy is tried after a miss
    pub fn try_inverted(&self) -> bool {
        self.try_inverted
    }

    /// Enable or disable the inverted retry
    pub fn set_try_inverted(&mut self, try_inverted: bool) {
        self.try_inverted = try_inverted;
    }

    /// Current decode options
    pub fn options(&self) -> &DecodeHints {
        &self.options
    }

    /// Mutable options; the decoder list is rebuilt on the next decode
    pub fn options_mut(&mut self) -> &mut DecodeHints {
        self.state = ScanState::Fresh;
        &mut self.options
    }

    /// Replace the options
    pub fn set_options(&mut self, options: DecodeHints) {
        self.options = options;
        self.state = ScanState::Fresh;
    }

    /// Use another binarizer for new sources
    pub fn set_binarizer_factory<F>(&mut self, factory: F)
    where
        F: Fn(Arc<dyn LuminanceSource>) -> Box<dyn Binarizer> + Send + 'static,
    {
        self.binarizer_factory = Box::new(factory);
    }

    /// Receive candidate points while decoders search
    pub fn on_result_point<F>(&mut self, listener: F)
    where
        F: FnMut(Option<Point>) + Send + 'static,
    {
        self.result_point_listener = Some(Box::new(listener));
        self.state = ScanState::Fresh;
    }

    /// Stop reporting candidate points
    pub fn clear_result_point_listener(&mut self) {
        self.result_point_listener = None;
        self.state = ScanState::Fresh;
    }

    /// Receive every decoded result
    pub fn on_result_found<F>(&mut self, listener: F)
    where
        F: FnMut(&DecodedResult) + Send + 'static,
    {
        self.result_listener = Some(Box::new(listener));
    }

    /// Stop reporting results
    pub fn clear_result_listener(&mut self) {
        self.result_listener = None;
    }

    /// Whether the next decode reuses the decoder list
    pub fn state(&self) -> ScanState {
        self.state
    }

    /// Current dispatch order of the decoders
    pub fn decoder_order(&self) -> Vec<ReaderKind> {
        self.reader.reader_order()
    }

    /// Decode one symbol from `source`
    ///
    /// Tries the source as given, then inverted (if enabled), then rotated
    /// by 90, 180 and 270 degrees (if enabled). The result carries the
    /// rotation applied in its orientation metadata.
    pub fn decode(&mut self, source: Arc<dyn LuminanceSource>) -> Option<DecodedResult> {
        let rotation_max_count = self.rotation_max_count(source.as_ref());
        let mut source = source;

        for rotation_count in 0..rotation_max_count {
            if rotation_count > 0 {
                source = self.rotate(&source)?;
            }
            let bitmap = self.bitmap(&source);
            let mut result = self.attempt(&bitmap);

            if result.is_none() {
                if let Some(inverted) = self.inverted(&source) {
                    trace!(rotation_count, "retrying inverted");
                    let bitmap = self.bitmap(&inverted);
                    result = self.attempt(&bitmap);
                }
            }

            if let Some(mut result) = result {
                debug!(format = ?result.format, rotation_count, "symbol decoded");
                result.stamp_orientation(rotation_count);
                if let Some(listener) = self.result_listener.as_deref_mut() {
                    listener(&result);
                }
                return Some(result);
            }
        }
        None
    }

    /// Convert raw pixels, then [`BarcodeReader::decode`]
    pub fn decode_raw(
        &mut self,
        pixels: &[u8],
        width: usize,
        height: usize,
        format: BitmapFormat,
    ) -> Result<Option<DecodedResult>> {
        let source = GrayLuminanceSource::from_pixels(pixels, width, height, format)?;
        Ok(self.decode(Arc::new(source)))
    }

    /// Decode every symbol in `source`
    ///
    /// Uses the registered multi-symbol QR decoder when the options ask for
    /// QR only, otherwise searches with the dispatcher by cropping around
    /// each hit. Rotation and inversion retries work as in
    /// [`BarcodeReader::decode`].
    ///
    /// The cropping search rebuilds the dispatcher's decoder list on every
    /// region, so the order learned by earlier [`BarcodeReader::decode`]
    /// calls is not kept. With a structured append hint, results outside the
    /// wanted sequence are dropped and the rest come back in sequence order.
    pub fn decode_multiple(&mut self, source: Arc<dyn LuminanceSource>) -> Vec<DecodedResult> {
        let mut qr_multi = if self.options.is_only(BarcodeFormat::QrCode) {
            self.registry.create_qr_multi()
        } else {
            None
        };
        let rotation_max_count = self.rotation_max_count(source.as_ref());
        let mut source = source;

        for rotation_count in 0..rotation_max_count {
            if rotation_count > 0 {
                match self.rotate(&source) {
                    Some(rotated) => source = rotated,
                    None => break,
                }
            }
            let bitmap = self.bitmap(&source);
            let mut results = self.attempt_multiple(&mut qr_multi, &bitmap);

            if results.is_empty() {
                if let Some(inverted) = self.inverted(&source) {
                    trace!(rotation_count, "retrying inverted");
                    let bitmap = self.bitmap(&inverted);
                    results = self.attempt_multiple(&mut qr_multi, &bitmap);
                }
            }

            if let Some(structured_append) = &self.options.structured_append {
                results = structured_append.arrange(results);
            }

            if !results.is_empty() {
                debug!(found = results.len(), rotation_count, "symbols decoded");
                for result in &mut results {
                    result.stamp_orientation(rotation_count);
                    if let Some(listener) = self.result_listener.as_deref_mut() {
                        listener(result);
                    }
                }
                return results;
            }
        }
        Vec::new()
    }

    /// Convert raw pixels, then [`BarcodeReader::decode_multiple`]
    pub fn decode_multiple_raw(
        &mut self,
        pixels: &[u8],
        width: usize,
        height: usize,
        format: BitmapFormat,
    ) -> Result<Vec<DecodedResult>> {
        let source = GrayLuminanceSource::from_pixels(pixels, width, height, format)?;
        Ok(self.decode_multiple(Arc::new(source)))
    }

    fn rotation_max_count(&self, source: &dyn LuminanceSource) -> usize {
        if self.auto_rotate && source.is_rotate_supported() {
            4
        } else {
            1
        }
    }

    fn bitmap(&self, source: &Arc<dyn LuminanceSource>) -> BinaryBitmap {
        BinaryBitmap::new((self.binarizer_factory)(Arc::clone(source)))
    }

    fn rotate(&self, source: &Arc<dyn LuminanceSource>) -> Option<Arc<dyn LuminanceSource>> {
        source
            .rotate_counter_clockwise()
            .inspect_err(|error| debug!(%error, "rotation failed"))
            .ok()
    }

    fn inverted(&self, source: &Arc<dyn LuminanceSource>) -> Option<Arc<dyn LuminanceSource>> {
        if !self.try_inverted || !source.is_inversion_supported() {
            return None;
        }
        source
            .invert()
            .inspect_err(|error| debug!(%error, "inversion failed"))
            .ok()
    }

    fn attempt(&mut self, bitmap: &BinaryBitmap) -> Option<DecodedResult> {
        let options = dispatch_options(&self.options, self.auto_rotate);
        let on_point = self.result_point_listener.as_deref_mut();
        match self.state {
            ScanState::Primed => self.reader.decode_with_state(bitmap, on_point),
            ScanState::Fresh => {
                let result = self.reader.decode(bitmap, &options, on_point);
                self.state = ScanState::Primed;
                result
            }
        }
    }

    fn attempt_multiple(
        &mut self,
        qr_multi: &mut Option<Box<dyn MultipleDecoder>>,
        bitmap: &BinaryBitmap,
    ) -> Vec<DecodedResult> {
        let options = dispatch_options(&self.options, self.auto_rotate);
        let on_point = self.result_point_listener.as_deref_mut();
        match qr_multi.as_deref_mut() {
            Some(multi) => multi.decode_multiple(bitmap, &options, on_point),
            None => GenericMultipleDecoder::new(&mut self.reader).decode_multiple(
                bitmap,
                &options,
                on_point,
            ),
        }
    }
}

/// Options as decoders see them: rotation is the reader's job while it rotates
fn dispatch_options(options: &DecodeHints, auto_rotate: bool) -> Cow<'_, DecodeHints> {
    if auto_rotate && !options.try_harder_without_rotation {
        let mut options = options.clone();
        options.try_harder_without_rotation = true;
        Cow::Owned(options)
    } else {
        Cow::Borrowed(options)
    }
}

impl fmt::Debug for BarcodeReader {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BarcodeReader")
            .field("registry", &self.registry)
            .field("options", &self.options)
            .field("auto_rotate", &self.auto_rotate)
            .field("try_inverted", &self.try_inverted)
            .field("state", &self.state)
            .finish_non_exhaustive()
    }
}
