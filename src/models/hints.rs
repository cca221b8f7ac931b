use std::collections::BTreeSet;

use super::{BarcodeFormat, DecodedResult, MetadataValue, ResultMetadataType};

/// Options passed to every decoder
///
/// The orchestrator treats any mutation of its hints as a reason to rebuild
/// the decoder list on the next call.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DecodeHints {
    /// Restrict decoding to these formats; `None` means all registered decoders
    pub possible_formats: Option<BTreeSet<BarcodeFormat>>,
    /// Spend more time looking for a symbol
    pub try_harder: bool,
    /// Set by the orchestrator while it handles rotation itself
    pub try_harder_without_rotation: bool,
    /// The image is a clean, unrotated rendering of one symbol
    pub pure_barcode: bool,
    /// Character set used when the symbol does not declare one
    pub character_set: Option<String>,
    /// Acceptable payload lengths for variable-length 1D formats
    pub allowed_lengths: Option<Vec<usize>>,
    /// Acceptable UPC/EAN extension lengths (2 and/or 5)
    pub allowed_ean_extensions: Option<Vec<usize>>,
    /// Treat the payload as GS1
    pub assume_gs1: bool,
    /// Code 39 symbols carry a check digit
    pub assume_code39_check_digit: bool,
    /// Decode Code 39 full-ASCII extended mode
    pub use_code39_extended_mode: bool,
    /// Return Codabar start/stop characters in the text
    pub return_codabar_start_end: bool,
    /// Let decoders try an inverted image themselves
    pub also_inverted: bool,
    /// Collect the symbols of one structured append sequence; `None` treats
    /// every symbol on its own
    pub structured_append: Option<StructuredAppend>,
}

/// Which structured append sequence a multi-symbol decode should collect
///
/// Decoders read it to decide whether to report sequence members; the reader
/// applies it to the results of a multi-symbol decode.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StructuredAppend {
    /// Parity shared by every symbol of the wanted sequence; `None` accepts any
    pub parity: Option<i32>,
    /// Drop symbols that carry no sequence position
    pub members_only: bool,
}

impl StructuredAppend {
    /// Whether `result` belongs to the wanted sequence
    pub fn accepts(&self, result: &DecodedResult) -> bool {
        if self.members_only && sequence_position(result).is_none() {
            return false;
        }
        match (self.parity, result.metadata_value(ResultMetadataType::StructuredAppendParity)) {
            (None, _) => true,
            (Some(wanted), Some(MetadataValue::Int(parity))) => wanted == *parity,
            (Some(_), _) => false,
        }
    }

    /// Keep the accepted results, ordered by sequence position
    ///
    /// Results without a position keep their relative order after the
    /// sequence members.
    pub fn arrange(&self, results: Vec<DecodedResult>) -> Vec<DecodedResult> {
        let mut results: Vec<_> = results.into_iter().filter(|r| self.accepts(r)).collect();
        results.sort_by_key(|r| match sequence_position(r) {
            Some(position) => (false, position),
            None => (true, 0),
        });
        results
    }
}

fn sequence_position(result: &DecodedResult) -> Option<i32> {
    match result.metadata_value(ResultMetadataType::StructuredAppendSequence) {
        Some(MetadataValue::Int(position)) => Some(*position),
        _ => None,
    }
}

impl DecodeHints {
    /// Hints restricted to the given formats
    pub fn with_formats<I: IntoIterator<Item = BarcodeFormat>>(formats: I) -> Self {
        Self {
            possible_formats: Some(formats.into_iter().collect()),
            ..Self::default()
        }
    }

    /// True if `possible_formats` is set and non-empty
    pub fn has_formats(&self) -> bool {
        self.possible_formats
            .as_ref()
            .is_some_and(|formats| !formats.is_empty())
    }

    /// True if the formats are restricted to exactly `format`
    pub fn is_only(&self, format: BarcodeFormat) -> bool {
        self.possible_formats
            .as_ref()
            .is_some_and(|formats| formats.len() == 1 && formats.contains(&format))
    }

    /// True if `format` was requested explicitly
    pub fn wants(&self, format: BarcodeFormat) -> bool {
        self.possible_formats
            .as_ref()
            .is_some_and(|formats| formats.contains(&format))
    }

    /// True if any 1D format was requested explicitly
    pub fn wants_one_d(&self) -> bool {
        self.possible_formats
            .as_ref()
            .is_some_and(|formats| formats.iter().any(|f| f.is_one_d()))
    }
}

/// Options passed to encoders
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EncodeHints {
    /// Quiet zone in modules; `None` lets the encoder choose
    pub margin: Option<usize>,
    /// Error correction level in the encoder's own notation
    pub error_correction: Option<String>,
    /// Character set used for the payload
    pub character_set: Option<String>,
    /// Encode the payload as GS1
    pub gs1_format: bool,
}
