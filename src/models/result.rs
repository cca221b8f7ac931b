use std::collections::HashMap;

use super::{BarcodeFormat, Point};

/// Keys of the open metadata map attached to a decoded result
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ResultMetadataType {
    /// Degrees the image was rotated (counter-clockwise) before the symbol decoded
    Orientation,
    /// Raw byte segments of a 2D payload
    ByteSegments,
    /// Error correction level, format specific
    ErrorCorrectionLevel,
    /// Number of codeword errors corrected
    ErrorsCorrected,
    /// Number of codeword erasures corrected
    ErasuresCorrected,
    /// Issue number of a periodical (UPC/EAN extension)
    IssueNumber,
    /// Suggested retail price (UPC/EAN extension)
    SuggestedPrice,
    /// Country of origin derived from the GS1 prefix
    PossibleCountry,
    /// Content of a UPC/EAN extension
    UpcEanExtension,
    /// PDF417 macro block metadata
    Pdf417ExtraMetadata,
    /// Position of this symbol in a structured append sequence
    StructuredAppendSequence,
    /// Parity byte shared by a structured append sequence
    StructuredAppendParity,
    /// ISO/IEC 15424 symbology identifier
    SymbologyIdentifier,
    /// Anything a decoder wants to attach that has no dedicated key
    Other,
}

/// Values stored in the metadata map
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MetadataValue {
    /// Integer value
    Int(i32),
    /// Text value
    Text(String),
    /// List of byte segments
    Bytes(Vec<Vec<u8>>),
}

/// A decoded symbol
#[derive(Debug, Clone, PartialEq)]
pub struct DecodedResult {
    /// Decoded content as text
    pub text: String,
    /// Raw decoded bytes, when the format has a byte representation
    pub raw_bytes: Option<Vec<u8>>,
    /// Number of valid bits in `raw_bytes`
    pub num_bits: usize,
    /// Format of the symbol
    pub format: BarcodeFormat,
    /// Geometric points reported by the decoder, in image coordinates
    pub result_points: Vec<Point>,
    metadata: HashMap<ResultMetadataType, MetadataValue>,
}

impl DecodedResult {
    /// Create a result with text, optional raw bytes and points
    pub fn new(
        text: impl Into<String>,
        raw_bytes: Option<Vec<u8>>,
        result_points: Vec<Point>,
        format: BarcodeFormat,
    ) -> Self {
        let num_bits = raw_bytes.as_ref().map_or(0, |bytes| bytes.len() * 8);
        Self {
            text: text.into(),
            raw_bytes,
            num_bits,
            format,
            result_points,
            metadata: HashMap::new(),
        }
    }

    /// Metadata attached so far
    pub fn metadata(&self) -> &HashMap<ResultMetadataType, MetadataValue> {
        &self.metadata
    }

    /// Look up one metadata entry
    pub fn metadata_value(&self, key: ResultMetadataType) -> Option<&MetadataValue> {
        self.metadata.get(&key)
    }

    /// Add or replace one metadata entry
    pub fn put_metadata(&mut self, key: ResultMetadataType, value: MetadataValue) {
        self.metadata.insert(key, value);
    }

    /// Merge another metadata map into this one
    pub fn put_all_metadata(&mut self, metadata: HashMap<ResultMetadataType, MetadataValue>) {
        self.metadata.extend(metadata);
    }

    /// Append more result points
    pub fn add_result_points(&mut self, points: &[Point]) {
        self.result_points.extend_from_slice(points);
    }

    /// Orientation in degrees, if stamped
    pub fn orientation(&self) -> Option<i32> {
        match self.metadata.get(&ResultMetadataType::Orientation) {
            Some(MetadataValue::Int(degrees)) => Some(*degrees),
            _ => None,
        }
    }

    /// Record `rotation_count` counter-clockwise quarter turns applied by the
    /// caller, combined with any orientation the decoder already detected
    pub fn stamp_orientation(&mut self, rotation_count: usize) {
        let applied = (rotation_count % 4) as i32 * 90;
        let degrees = match self.orientation() {
            Some(existing) => (existing + applied).rem_euclid(360),
            None => applied,
        };
        self.put_metadata(ResultMetadataType::Orientation, MetadataValue::Int(degrees));
    }
}
