//! Document ingest: upload gating and the text extraction seam.
//!
//! Binary decoding of DOCX/PDF lives behind `DocumentTextExtractor`. The default
//! `PlainTextExtractor` decodes bytes as UTF-8 and reports a warning whenever the
//! result is likely not what the user uploaded. `AppState` holds an
//! `Arc<dyn DocumentTextExtractor>`, so a real decoder can be swapped in at startup.

use async_trait::async_trait;

/// Upload formats accepted by the RFP endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocumentKind {
    Text,
    Markdown,
    Docx,
    Pdf,
}

impl DocumentKind {
    /// Classifies an upload by extension (case-insensitive). `None` means unsupported.
    pub fn from_file_name(file_name: &str) -> Option<Self> {
        let lower = file_name.to_lowercase();
        if lower.ends_with(".txt") {
            Some(DocumentKind::Text)
        } else if lower.ends_with(".md") {
            Some(DocumentKind::Markdown)
        } else if lower.ends_with(".docx") {
            Some(DocumentKind::Docx)
        } else if lower.ends_with(".pdf") {
            Some(DocumentKind::Pdf)
        } else {
            None
        }
    }

    pub fn is_binary(&self) -> bool {
        matches!(self, DocumentKind::Docx | DocumentKind::Pdf)
    }

    fn label(&self) -> &'static str {
        match self {
            DocumentKind::Text => "TXT",
            DocumentKind::Markdown => "MD",
            DocumentKind::Docx => "DOCX",
            DocumentKind::Pdf => "PDF",
        }
    }
}

pub const UNSUPPORTED_FORMAT_MESSAGE: &str =
    "Unsupported file format. Use .txt, .md, .docx, or .pdf";

/// Text pulled out of an upload, plus an optional notice about its quality.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtractionResult {
    pub text: String,
    pub warning: Option<String>,
}

impl ExtractionResult {
    /// Raw text as stored on the project, with any warning prepended.
    pub fn stored_text(&self) -> String {
        match &self.warning {
            Some(warning) => format!("[Extraction notice] {warning}\n\n{}", self.text),
            None => self.text.clone(),
        }
    }
}

/// Converts uploaded bytes into plain text for requirement extraction.
#[async_trait]
pub trait DocumentTextExtractor: Send + Sync {
    async fn extract(&self, kind: DocumentKind, bytes: &[u8]) -> ExtractionResult;
}

/// Default extractor: UTF-8 decoding only, no binary format support.
pub struct PlainTextExtractor;

#[async_trait]
impl DocumentTextExtractor for PlainTextExtractor {
    async fn extract(&self, kind: DocumentKind, bytes: &[u8]) -> ExtractionResult {
        extract_plain_text(kind, bytes)
    }
}

/// Lossy UTF-8 decoding that drops a leading byte order mark.
pub fn decode_text(bytes: &[u8]) -> String {
    let text = String::from_utf8_lossy(bytes);
    match text.strip_prefix('\u{FEFF}') {
        Some(rest) => rest.to_string(),
        None => text.into_owned(),
    }
}

fn extract_plain_text(kind: DocumentKind, bytes: &[u8]) -> ExtractionResult {
    let text = decode_text(bytes);

    if kind.is_binary() {
        return ExtractionResult {
            text,
            warning: Some(format!(
                "{} extraction unavailable. Parsed as plain text fallback.",
                kind.label()
            )),
        };
    }

    if is_probably_readable_text(&text) {
        ExtractionResult {
            text,
            warning: None,
        }
    } else {
        ExtractionResult {
            text,
            warning: Some(
                "File content may be binary. Extraction quality may be limited.".to_string(),
            ),
        }
    }
}

/// Non-blank and with few low control characters (code points below TAB).
pub fn is_probably_readable_text(input: &str) -> bool {
    if input.trim().is_empty() {
        return false;
    }
    let control_chars = input.chars().filter(|&c| (c as u32) < 9).count();
    let budget = std::cmp::max(8, input.chars().count() / 50);
    control_chars < budget
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_from_file_name() {
        assert_eq!(DocumentKind::from_file_name("rfp.TXT"), Some(DocumentKind::Text));
        assert_eq!(DocumentKind::from_file_name("notes.md"), Some(DocumentKind::Markdown));
        assert_eq!(DocumentKind::from_file_name("Tender.Docx"), Some(DocumentKind::Docx));
        assert_eq!(DocumentKind::from_file_name("tender.pdf"), Some(DocumentKind::Pdf));
        assert_eq!(DocumentKind::from_file_name("tender.doc"), None);
        assert_eq!(DocumentKind::from_file_name("archive.pdf.zip"), None);
        assert_eq!(DocumentKind::from_file_name(""), None);
    }

    #[test]
    fn test_readable_text() {
        assert!(is_probably_readable_text("The vendor shall comply."));
        assert!(!is_probably_readable_text("   \n\t "));
        assert!(!is_probably_readable_text(""));
        assert!(!is_probably_readable_text(&"\u{1}".repeat(8)));
        // long inputs tolerate up to 2% control characters
        let mostly_text = format!("{}{}", "a".repeat(1000), "\u{0}".repeat(19));
        assert!(is_probably_readable_text(&mostly_text));
        let too_noisy = format!("{}{}", "a".repeat(1000), "\u{0}".repeat(21));
        assert!(!is_probably_readable_text(&too_noisy));
    }

    #[test]
    fn test_tabs_and_newlines_are_not_control_noise() {
        assert!(is_probably_readable_text(&"\t\n\r".repeat(50).replace('\r', "x")));
    }

    #[tokio::test]
    async fn test_plain_text_has_no_warning() {
        let result = PlainTextExtractor
            .extract(DocumentKind::Text, b"Vendor must comply.")
            .await;
        assert_eq!(result.text, "Vendor must comply.");
        assert_eq!(result.warning, None);
        assert_eq!(result.stored_text(), "Vendor must comply.");
    }

    #[tokio::test]
    async fn test_binary_formats_fall_back_with_warning() {
        let result = PlainTextExtractor
            .extract(DocumentKind::Pdf, b"%PDF-1.7 Vendor shall comply")
            .await;
        assert_eq!(
            result.warning.as_deref(),
            Some("PDF extraction unavailable. Parsed as plain text fallback.")
        );
        assert!(result
            .stored_text()
            .starts_with("[Extraction notice] PDF extraction unavailable."));
        assert!(result.stored_text().ends_with("\n\n%PDF-1.7 Vendor shall comply"));
    }

    #[tokio::test]
    async fn test_noisy_text_file_warns() {
        let bytes = [0u8; 32];
        let result = PlainTextExtractor.extract(DocumentKind::Text, &bytes).await;
        assert_eq!(
            result.warning.as_deref(),
            Some("File content may be binary. Extraction quality may be limited.")
        );
    }

    #[tokio::test]
    async fn test_invalid_utf8_is_decoded_lossily() {
        let result = PlainTextExtractor
            .extract(DocumentKind::Markdown, b"Proposal due \xff soon, must comply")
            .await;
        assert!(result.text.contains('\u{FFFD}'));
        assert_eq!(result.warning, None);
    }

    #[tokio::test]
    async fn test_leading_byte_order_mark_is_dropped() {
        let result = PlainTextExtractor
            .extract(
                DocumentKind::Text,
                b"\xEF\xBB\xBFThe vendor shall deliver a plan.\nmust do it",
            )
            .await;
        assert_eq!(result.text, "The vendor shall deliver a plan.\nmust do it");
        assert!(!result.stored_text().starts_with('\u{FEFF}'));

        let reqs = crate::rfp::extractor::extract_requirements(&result.text);
        assert_eq!(reqs.len(), 1);
        assert_eq!(reqs[0].details, "The vendor shall deliver a plan.");
    }

    #[test]
    fn test_bom_does_not_count_towards_line_length() {
        let text = decode_text("\u{FEFF}must do it".as_bytes());
        assert_eq!(text, "must do it");
        assert!(crate::rfp::extractor::extract_requirements(&text).is_empty());
        // only a leading mark is removed
        assert_eq!(decode_text("a\u{FEFF}b".as_bytes()), "a\u{FEFF}b");
    }
}
