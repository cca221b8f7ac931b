/// Symbologies known to the dispatcher
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum BarcodeFormat {
    /// Aztec 2D
    Aztec,
    /// Codabar 1D
    Codabar,
    /// Code 39 1D
    Code39,
    /// Code 93 1D
    Code93,
    /// Code 128 1D
    Code128,
    /// Data Matrix 2D
    DataMatrix,
    /// EAN-8 1D
    Ean8,
    /// EAN-13 1D
    Ean13,
    /// Interleaved Two of Five 1D
    Itf,
    /// MaxiCode 2D
    MaxiCode,
    /// PDF417 stacked
    Pdf417,
    /// QR Code 2D
    QrCode,
    /// GS1 DataBar (RSS-14)
    Rss14,
    /// GS1 DataBar Expanded
    RssExpanded,
    /// UPC-A 1D
    UpcA,
    /// UPC-E 1D
    UpcE,
    /// UPC/EAN 2 or 5 digit extension
    UpcEanExtension,
    /// MSI Plessey 1D
    Msi,
    /// Plessey 1D
    Plessey,
    /// Intelligent Mail Barcode
    Imb,
    /// Placeholder for "every 1D format"
    All1D,
}

impl BarcodeFormat {
    /// True for formats handled by the aggregate 1D decoder
    pub fn is_one_d(self) -> bool {
        matches!(
            self,
            BarcodeFormat::Codabar
                | BarcodeFormat::Code39
                | BarcodeFormat::Code93
                | BarcodeFormat::Code128
                | BarcodeFormat::Ean8
                | BarcodeFormat::Ean13
                | BarcodeFormat::Itf
                | BarcodeFormat::Rss14
                | BarcodeFormat::RssExpanded
                | BarcodeFormat::UpcA
                | BarcodeFormat::UpcE
                | BarcodeFormat::UpcEanExtension
                | BarcodeFormat::Msi
                | BarcodeFormat::Plessey
                | BarcodeFormat::All1D
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_one_d_classification() {
        assert!(BarcodeFormat::Code128.is_one_d());
        assert!(BarcodeFormat::All1D.is_one_d());
        assert!(!BarcodeFormat::QrCode.is_one_d());
        assert!(!BarcodeFormat::Imb.is_one_d());
    }
}
