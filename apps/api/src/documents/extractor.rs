//! PDF text extraction.
//!
//! Pages are extracted in order and joined with a single space. Page boundaries
//! are not preserved in the output.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ExtractError {
    #[error("unsupported document type '{0}', expected a PDF")]
    UnsupportedType(String),

    #[error("could not read PDF: {0}")]
    Malformed(String),
}

/// Turns raw document bytes into plain text.
///
/// Carried in `AppState` as `Arc<dyn DocumentExtractor>`. Implementations are
/// synchronous; callers run them on the blocking pool.
pub trait DocumentExtractor: Send + Sync {
    fn extract(&self, bytes: &[u8]) -> Result<String, ExtractError>;
}

/// Production extractor backed by `pdf-extract`.
pub struct PdfExtractor;

impl DocumentExtractor for PdfExtractor {
    fn extract(&self, bytes: &[u8]) -> Result<String, ExtractError> {
        let pages = pdf_extract::extract_text_from_mem_by_pages(bytes)
            .map_err(|e| ExtractError::Malformed(e.to_string()))?;
        Ok(join_pages(&pages))
    }
}

/// Joins per-page text with a single space, in page order.
pub fn join_pages<S: AsRef<str>>(pages: &[S]) -> String {
    pages
        .iter()
        .map(AsRef::as_ref)
        .collect::<Vec<_>>()
        .join(" ")
}

/// Checks the declared type of an upload. Without a declared type the file name
/// decides; generic binary uploads named `.pdf` (or unnamed) are let through and
/// rejected later by the parser if they are not PDFs.
pub fn ensure_pdf(media_type: Option<&str>, file_name: Option<&str>) -> Result<(), ExtractError> {
    let named_pdf = file_name
        .map(|n| n.to_ascii_lowercase().ends_with(".pdf"))
        .unwrap_or(false);

    let media_type = media_type
        .map(|m| m.trim().to_ascii_lowercase())
        .filter(|m| !m.is_empty());

    match media_type {
        None => match file_name {
            Some(name) if !named_pdf => Err(ExtractError::UnsupportedType(name.to_string())),
            _ => Ok(()),
        },
        Some(m) if m == "application/pdf" || m == "application/x-pdf" => Ok(()),
        Some(m) if m == "application/octet-stream" && (named_pdf || file_name.is_none()) => Ok(()),
        Some(m) => Err(ExtractError::UnsupportedType(m)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_join_pages_preserves_order_with_single_space() {
        let pages = vec!["Page one text.".to_string(), "Page two.".to_string(), "3".to_string()];
        assert_eq!(join_pages(&pages), "Page one text. Page two. 3");
    }

    #[test]
    fn test_join_pages_single_and_empty() {
        assert_eq!(join_pages(&["only"]), "only");
        assert_eq!(join_pages::<&str>(&[]), "");
    }

    #[test]
    fn test_join_pages_keeps_empty_pages_as_separators() {
        assert_eq!(join_pages(&["a", "", "b"]), "a  b");
    }

    /// Minimal PDF with one Helvetica text line per page and a correct xref table.
    fn pdf_with_pages(texts: &[&str]) -> Vec<u8> {
        let kids = (0..texts.len())
            .map(|i| format!("{} 0 R", 4 + 2 * i))
            .collect::<Vec<_>>()
            .join(" ");
        let mut objects = vec![
            "<< /Type /Catalog /Pages 2 0 R >>".to_string(),
            format!("<< /Type /Pages /Kids [{kids}] /Count {} >>", texts.len()),
            "<< /Type /Font /Subtype /Type1 /BaseFont /Helvetica /Encoding /WinAnsiEncoding >>"
                .to_string(),
        ];
        for (i, text) in texts.iter().enumerate() {
            objects.push(format!(
                "<< /Type /Page /Parent 2 0 R /MediaBox [0 0 612 792] \
                 /Resources << /Font << /F1 3 0 R >> >> /Contents {} 0 R >>",
                5 + 2 * i
            ));
            let content = format!("BT /F1 24 Tf 72 700 Td ({text}) Tj ET");
            objects.push(format!(
                "<< /Length {} >>\nstream\n{content}\nendstream",
                content.len()
            ));
        }

        let mut out = String::from("%PDF-1.4\n");
        let mut offsets = Vec::with_capacity(objects.len());
        for (i, object) in objects.iter().enumerate() {
            offsets.push(out.len());
            out.push_str(&format!("{} 0 obj\n{object}\nendobj\n", i + 1));
        }
        let xref = out.len();
        out.push_str(&format!("xref\n0 {}\n0000000000 65535 f \n", objects.len() + 1));
        for offset in offsets {
            out.push_str(&format!("{offset:010} 00000 n \n"));
        }
        out.push_str(&format!(
            "trailer\n<< /Size {} /Root 1 0 R >>\nstartxref\n{xref}\n%%EOF\n",
            objects.len() + 1
        ));
        out.into_bytes()
    }

    #[test]
    fn test_pdf_extractor_reads_pages_in_order() {
        let text = PdfExtractor.extract(&pdf_with_pages(&["Alpha", "Bravo"])).unwrap();
        assert_eq!(text.split_whitespace().collect::<Vec<_>>(), vec!["Alpha", "Bravo"]);
        // Page texts are joined with a space, never run together
        assert!(!text.contains("AlphaBravo"));
    }

    #[test]
    fn test_pdf_extractor_rejects_garbage() {
        let result = PdfExtractor.extract(b"definitely not a pdf");
        assert!(matches!(result, Err(ExtractError::Malformed(_))));
    }

    #[test]
    fn test_ensure_pdf_accepts_declared_pdf() {
        assert!(ensure_pdf(Some("application/pdf"), Some("resume.pdf")).is_ok());
        assert!(ensure_pdf(Some("Application/PDF"), None).is_ok());
        assert!(ensure_pdf(None, Some("resume.PDF")).is_ok());
        assert!(ensure_pdf(Some("application/octet-stream"), Some("cv.pdf")).is_ok());
        assert!(ensure_pdf(None, None).is_ok());
    }

    #[test]
    fn test_ensure_pdf_rejects_other_types() {
        let err = ensure_pdf(Some("text/plain"), Some("resume.txt")).unwrap_err();
        assert!(matches!(err, ExtractError::UnsupportedType(t) if t == "text/plain"));
        assert!(ensure_pdf(Some("application/octet-stream"), Some("resume.docx")).is_err());
    }

    #[test]
    fn test_ensure_pdf_undeclared_type_uses_file_name() {
        let err = ensure_pdf(None, Some("cv.docx")).unwrap_err();
        assert!(matches!(err, ExtractError::UnsupportedType(t) if t == "cv.docx"));
        assert!(ensure_pdf(Some("  "), Some("notes.txt")).is_err());
        assert!(ensure_pdf(None, Some("cv.pdf")).is_ok());
    }
}
