pub mod bit_array;
pub mod format;
pub mod hints;
pub mod matrix;
pub mod point;
pub mod result;

pub use bit_array::BitArray;
pub use format::BarcodeFormat;
pub use hints::{DecodeHints, EncodeHints, StructuredAppend};
pub use matrix::BitMatrix;
pub use point::Point;
pub use result::{DecodedResult, MetadataValue, ResultMetadataType};
