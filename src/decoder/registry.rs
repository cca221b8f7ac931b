use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use super::{Decoder, MultipleDecoder};
use crate::models::{BarcodeFormat, DecodeHints};

/// Slot a decoder occupies in the dispatch order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ReaderKind {
    /// One aggregate decoder for every 1D format
    OneD,
    /// QR Code
    QrCode,
    /// Data Matrix
    DataMatrix,
    /// Aztec
    Aztec,
    /// PDF417
    Pdf417,
    /// MaxiCode
    MaxiCode,
    /// Intelligent Mail Barcode
    Imb,
}

impl ReaderKind {
    /// 2D and postal kinds in dispatch order; `OneD` goes before or after
    /// them depending on try-harder
    pub const MATRIX_ORDER: [ReaderKind; 6] = [
        ReaderKind::QrCode,
        ReaderKind::DataMatrix,
        ReaderKind::Aztec,
        ReaderKind::Pdf417,
        ReaderKind::MaxiCode,
        ReaderKind::Imb,
    ];

    /// Kind that handles `format`
    pub fn for_format(format: BarcodeFormat) -> Self {
        match format {
            BarcodeFormat::QrCode => ReaderKind::QrCode,
            BarcodeFormat::DataMatrix => ReaderKind::DataMatrix,
            BarcodeFormat::Aztec => ReaderKind::Aztec,
            BarcodeFormat::Pdf417 => ReaderKind::Pdf417,
            BarcodeFormat::MaxiCode => ReaderKind::MaxiCode,
            BarcodeFormat::Imb => ReaderKind::Imb,
            _ => ReaderKind::OneD,
        }
    }

    /// True if `hints` explicitly ask for a format of this kind
    pub fn is_requested(self, hints: &DecodeHints) -> bool {
        match self {
            ReaderKind::OneD => hints.wants_one_d(),
            ReaderKind::QrCode => hints.wants(BarcodeFormat::QrCode),
            ReaderKind::DataMatrix => hints.wants(BarcodeFormat::DataMatrix),
            ReaderKind::Aztec => hints.wants(BarcodeFormat::Aztec),
            ReaderKind::Pdf417 => hints.wants(BarcodeFormat::Pdf417),
            ReaderKind::MaxiCode => hints.wants(BarcodeFormat::MaxiCode),
            ReaderKind::Imb => hints.wants(BarcodeFormat::Imb),
        }
    }

    /// Dispatch order for `hints`
    ///
    /// With formats: `OneD` first (or last under try-harder) if any 1D format
    /// is wanted, then the requested matrix kinds. Without formats, or when
    /// none of the requested formats maps to a kind, every kind in default
    /// order under the same `OneD` rule.
    pub fn order_for(hints: &DecodeHints) -> Vec<ReaderKind> {
        let try_harder = hints.try_harder;
        let mut kinds = Vec::new();
        if hints.has_formats() {
            let one_d = hints.wants_one_d();
            if one_d && !try_harder {
                kinds.push(ReaderKind::OneD);
            }
            kinds.extend(Self::MATRIX_ORDER.iter().filter(|k| k.is_requested(hints)));
            if one_d && try_harder {
                kinds.push(ReaderKind::OneD);
            }
        }
        if kinds.is_empty() {
            if !try_harder {
                kinds.push(ReaderKind::OneD);
            }
            kinds.extend(Self::MATRIX_ORDER);
            if try_harder {
                kinds.push(ReaderKind::OneD);
            }
        }
        kinds
    }
}

type DecoderFactory = Arc<dyn Fn() -> Box<dyn Decoder> + Send + Sync>;
type MultipleDecoderFactory = Arc<dyn Fn() -> Box<dyn MultipleDecoder> + Send + Sync>;

/// Factories for the symbol decoders available to a reader
///
/// Cloning shares the factories.
#[derive(Clone, Default)]
pub struct DecoderRegistry {
    factories: HashMap<ReaderKind, DecoderFactory>,
    qr_multi: Option<MultipleDecoderFactory>,
}

impl DecoderRegistry {
    /// Registry with no decoders
    pub fn new() -> Self {
        Self::default()
    }

    /// Register (or replace) the factory for `kind`
    pub fn register<F>(&mut self, kind: ReaderKind, factory: F) -> &mut Self
    where
        F: Fn() -> Box<dyn Decoder> + Send + Sync + 'static,
    {
        self.factories.insert(kind, Arc::new(factory));
        self
    }

    /// Builder form of [`DecoderRegistry::register`]
    pub fn with<F>(mut self, kind: ReaderKind, factory: F) -> Self
    where
        F: Fn() -> Box<dyn Decoder> + Send + Sync + 'static,
    {
        self.register(kind, factory);
        self
    }

    /// Register the dedicated multi-symbol QR decoder
    pub fn register_qr_multi<F>(&mut self, factory: F) -> &mut Self
    where
        F: Fn() -> Box<dyn MultipleDecoder> + Send + Sync + 'static,
    {
        self.qr_multi = Some(Arc::new(factory));
        self
    }

    /// True if a factory exists for `kind`
    pub fn is_registered(&self, kind: ReaderKind) -> bool {
        self.factories.contains_key(&kind)
    }

    /// Fresh decoder for `kind`, if registered
    pub fn create(&self, kind: ReaderKind) -> Option<Box<dyn Decoder>> {
        self.factories.get(&kind).map(|factory| factory())
    }

    /// Fresh multi-symbol QR decoder, if registered
    pub fn create_qr_multi(&self) -> Option<Box<dyn MultipleDecoder>> {
        self.qr_multi.as_ref().map(|factory| factory())
    }
}

impl fmt::Debug for DecoderRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut kinds: Vec<_> = self.factories.keys().collect();
        kinds.sort();
        f.debug_struct("DecoderRegistry")
            .field("kinds", &kinds)
            .field("qr_multi", &self.qr_multi.is_some())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::BarcodeFormat::*;

    #[test]
    fn test_default_order() {
        let order = ReaderKind::order_for(&DecodeHints::default());
        assert_eq!(order.first(), Some(&ReaderKind::OneD));
        assert_eq!(order.len(), 7);
        assert_eq!(&order[1..], &ReaderKind::MATRIX_ORDER);
    }

    #[test]
    fn test_try_harder_moves_one_d_last() {
        let hints = DecodeHints {
            try_harder: true,
            ..DecodeHints::default()
        };
        let order = ReaderKind::order_for(&hints);
        assert_eq!(order.last(), Some(&ReaderKind::OneD));
        assert_eq!(order[0], ReaderKind::QrCode);
    }

    #[test]
    fn test_requested_formats() {
        let hints = DecodeHints::with_formats([DataMatrix, Code128, QrCode]);
        assert_eq!(
            ReaderKind::order_for(&hints),
            vec![ReaderKind::OneD, ReaderKind::QrCode, ReaderKind::DataMatrix]
        );

        let mut hints = DecodeHints::with_formats([Ean13, Pdf417]);
        hints.try_harder = true;
        assert_eq!(
            ReaderKind::order_for(&hints),
            vec![ReaderKind::Pdf417, ReaderKind::OneD]
        );
    }

    #[test]
    fn test_only_matrix_formats_skip_one_d() {
        let hints = DecodeHints::with_formats([Aztec]);
        assert_eq!(ReaderKind::order_for(&hints), vec![ReaderKind::Aztec]);
    }

    #[test]
    fn test_for_format() {
        assert_eq!(ReaderKind::for_format(UpcE), ReaderKind::OneD);
        assert_eq!(ReaderKind::for_format(Imb), ReaderKind::Imb);
    }

    #[test]
    fn test_registry_create() {
        struct Never;
        impl Decoder for Never {
            fn decode(
                &mut self,
                _image: &crate::binarizer::BinaryBitmap,
                _hints: &DecodeHints,
                _on_point: Option<&mut crate::decoder::ResultPointCallback>,
            ) -> Option<crate::models::DecodedResult> {
                None
            }
        }

        let registry = DecoderRegistry::new().with(ReaderKind::QrCode, || Box::new(Never));
        assert!(registry.is_registered(ReaderKind::QrCode));
        assert!(registry.create(ReaderKind::QrCode).is_some());
        assert!(registry.create(ReaderKind::Aztec).is_none());
        assert!(registry.create_qr_multi().is_none());
    }
}
