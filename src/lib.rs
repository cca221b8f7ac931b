//! rust_barcode - image-to-bit-grid acquisition pipeline for barcode readers
//!
//! Turns raw pixels into the clean binary data that format-specific symbol
//! decoders work on, and drives those decoders:
//!
//! - luminance sources with crop, rotation and inversion
//! - global-histogram and block-adaptive binarization
//! - perspective transforms and grid sampling
//! - multi-format dispatch with adaptive decoder ordering
//! - a reader that retries rotated and inverted frames
//!
//! Symbol grammars (QR, Data Matrix, Code 128, ...) are not part of this
//! crate; they plug in through [`decoder::Decoder`] and
//! [`writer::Encoder`].

#![warn(missing_docs)]
#![allow(clippy::missing_docs_in_private_items)]

/// Binarizers and the binary bitmap handed to decoders
pub mod binarizer;
mod config;
/// Decoder trait, registry and multi-format dispatch
pub mod decoder;
/// Grid sampling for symbol detectors
pub mod detector;
/// Crate error type
pub mod error;
/// Tracing subscriber setup for binaries
pub mod logger;
/// Grayscale views over frames
pub mod luminance;
/// Core data structures (BitMatrix, BitArray, Point, hints, results)
pub mod models;
/// Rotation- and inversion-aware reader
pub mod reader;
/// Image loading and statistics helpers for tools
pub mod tools;
/// Utility functions (pixel conversion, geometry)
pub mod utils;
/// Encoder dispatch
pub mod writer;

pub use binarizer::{BinaryBitmap, Binarizer, GlobalHistogramBinarizer, HybridBinarizer};
pub use decoder::{Decoder, DecoderRegistry, MultiFormatReader, ReaderKind};
pub use error::{Error, Result};
pub use luminance::{GrayLuminanceSource, LuminanceSource};
pub use models::{BarcodeFormat, BitArray, BitMatrix, DecodeHints, DecodedResult, Point};
pub use reader::{BarcodeReader, ScanState};
pub use utils::grayscale::BitmapFormat;
pub use writer::{Encoder, MultiFormatWriter};
