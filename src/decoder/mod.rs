//! Decoder dispatch
//!
//! Symbol-specific decoders (QR, Data Matrix, the 1D family, ...) live
//! outside this crate and plug in through [`Decoder`] and a
//! [`DecoderRegistry`]. [`MultiFormatReader`] runs the registered decoders
//! in an adaptive order; [`GenericMultipleDecoder`] finds several symbols in
//! one frame by cropping around each hit.

use crate::binarizer::BinaryBitmap;
use crate::models::{DecodeHints, DecodedResult, Point};

/// Recursive crop-and-retry search for several symbols
pub mod generic_multi;
/// Ordered dispatch over registered decoders
pub mod multi_format;
/// Factories for pluggable decoders
pub mod registry;

pub use generic_multi::GenericMultipleDecoder;
pub use multi_format::MultiFormatReader;
pub use registry::{DecoderRegistry, ReaderKind};

/// Receives candidate points while a decoder searches; `None` marks a miss
pub type ResultPointCallback = dyn FnMut(Option<Point>) + Send + 'static;

/// A format-specific symbol decoder
pub trait Decoder: Send {
    /// Look for one symbol in `image`
    ///
    /// A miss is `None`; decoders never report "not found" as an error.
    fn decode(
        &mut self,
        image: &BinaryBitmap,
        hints: &DecodeHints,
        on_point: Option<&mut ResultPointCallback>,
    ) -> Option<DecodedResult>;

    /// Drop any per-image state before the next call
    fn reset(&mut self) {}
}

impl<D: Decoder + ?Sized> Decoder for &mut D {
    fn decode(
        &mut self,
        image: &BinaryBitmap,
        hints: &DecodeHints,
        on_point: Option<&mut ResultPointCallback>,
    ) -> Option<DecodedResult> {
        (**self).decode(image, hints, on_point)
    }

    fn reset(&mut self) {
        (**self).reset()
    }
}

impl<D: Decoder + ?Sized> Decoder for Box<D> {
    fn decode(
        &mut self,
        image: &BinaryBitmap,
        hints: &DecodeHints,
        on_point: Option<&mut ResultPointCallback>,
    ) -> Option<DecodedResult> {
        (**self).decode(image, hints, on_point)
    }

    fn reset(&mut self) {
        (**self).reset()
    }
}

/// A decoder that can return every symbol in a frame
pub trait MultipleDecoder: Send {
    /// All symbols found; empty on a miss
    fn decode_multiple(
        &mut self,
        image: &BinaryBitmap,
        hints: &DecodeHints,
        on_point: Option<&mut ResultPointCallback>,
    ) -> Vec<DecodedResult>;
}
