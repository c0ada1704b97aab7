mod binarize;
mod external;
mod extractor;
mod ocr;
mod pdf;

pub use binarize::Binarizer;
pub use external::{CommandOutput, ExternalError, ExternalResult, ExternalTool};
pub use extractor::{
    Capabilities, DocumentKind, ExtractResult, ExtractionError, ExtractionMethod,
    ExtractionOutcome, ExtractionResult, SkipReason, TextExtractor,
};
pub use ocr::{ImageOcr, OcrMyPdf, PdfOcr, PdfOcrStatus, Tesseract};
pub use pdf::{PdfTextSource, Pdftotext};
