use tracing::{debug, trace};

use super::{Decoder, DecoderRegistry, ReaderKind, ResultPointCallback};
use crate::binarizer::BinaryBitmap;
use crate::models::{DecodeHints, DecodedResult};

/// Runs registered decoders in turn until one succeeds
///
/// The decoder list is built from the hints and kept between frames. Each
/// success moves the winning decoder to the front, so continuous scanning of
/// one kind of symbol tries the right decoder first.
pub struct MultiFormatReader {
    registry: DecoderRegistry,
    hints: DecodeHints,
    readers: Option<Vec<(ReaderKind, Box<dyn Decoder>)>>,
}

impl MultiFormatReader {
    /// Reader over `registry`; the decoder list is built on first use
    pub fn new(registry: DecoderRegistry) -> Self {
        Self {
            registry,
            hints: DecodeHints::default(),
            readers: None,
        }
    }

    /// Replace the hints and rebuild the decoder list
    pub fn set_hints(&mut self, hints: &DecodeHints) {
        self.hints = hints.clone();
        let readers: Vec<_> = ReaderKind::order_for(hints)
            .into_iter()
            .filter_map(|kind| self.registry.create(kind).map(|decoder| (kind, decoder)))
            .collect();
        debug!(
            kinds = ?readers.iter().map(|(kind, _)| *kind).collect::<Vec<_>>(),
            "decoder list rebuilt"
        );
        self.readers = Some(readers);
    }

    /// Hints the current list was built from
    pub fn hints(&self) -> &DecodeHints {
        &self.hints
    }

    /// Current dispatch order, empty before the first build
    pub fn reader_order(&self) -> Vec<ReaderKind> {
        self.readers
            .as_ref()
            .map(|readers| readers.iter().map(|(kind, _)| *kind).collect())
            .unwrap_or_default()
    }

    /// Decode with the existing list and hints, building the list if needed
    pub fn decode_with_state(
        &mut self,
        image: &BinaryBitmap,
        on_point: Option<&mut ResultPointCallback>,
    ) -> Option<DecodedResult> {
        if self.readers.is_none() {
            let hints = self.hints.clone();
            self.set_hints(&hints);
        }
        self.decode_internal(image, on_point)
    }

    fn decode_internal(
        &mut self,
        image: &BinaryBitmap,
        mut on_point: Option<&mut ResultPointCallback>,
    ) -> Option<DecodedResult> {
        let readers = self.readers.as_mut()?;
        for index in 0..readers.len() {
            let (kind, reader) = &mut readers[index];
            let kind = *kind;
            reader.reset();
            let result = reader.decode(image, &self.hints, on_point.as_deref_mut());
            if let Some(result) = result {
                if index > 0 {
                    let winner = readers.remove(index);
                    readers.insert(0, winner);
                    debug!(?kind, from = index, "moved successful decoder to front");
                }
                return Some(result);
            }
            trace!(?kind, "decoder missed");
            if let Some(callback) = on_point.as_deref_mut() {
                callback(None);
            }
        }
        None
    }
}

impl Decoder for MultiFormatReader {
    /// Rebuild the list for `hints`, then decode
    fn decode(
        &mut self,
        image: &BinaryBitmap,
        hints: &DecodeHints,
        on_point: Option<&mut ResultPointCallback>,
    ) -> Option<DecodedResult> {
        self.set_hints(hints);
        self.decode_internal(image, on_point)
    }

    fn reset(&mut self) {
        if let Some(readers) = self.readers.as_mut() {
            for (_, reader) in readers.iter_mut() {
                reader.reset();
            }
        }
    }
}
