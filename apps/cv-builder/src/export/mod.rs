// Export adapter: turns the current document into a downloadable artifact.
// Markdown and HTML are plain string templating over `compose::RenderedResume`;
// PDF is drawn programmatically (see `pdf` and `crate::layout`).

pub mod compose;
pub mod handlers;
pub mod html;
pub mod markdown;
pub mod pdf;

use std::fmt;
use std::str::FromStr;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::document::progress::{export_readiness, ExportReadiness};
use crate::models::ResumeDocument;
use crate::templates::TemplateError;

pub use compose::{compose, RenderedResume};
pub use pdf::PdfFonts;

#[derive(Debug, Error)]
pub enum ExportError {
    #[error(
        "Document is not ready for export ({} milestone(s) missing, {} invalid field(s))",
        .0.missing_milestones.len(),
        .0.invalid_fields.len()
    )]
    NotReady(ExportReadiness),

    #[error(transparent)]
    Template(#[from] TemplateError),

    #[error("PDF generation failed: {0}")]
    Pdf(String),

    #[error(
        "The PDF font cannot draw '{}'; set PDF_FONT_PATH to a TrueType font that covers it",
        .0.iter().collect::<String>()
    )]
    UnsupportedCharacters(Vec<char>),

    #[error("Unsupported export format '{0}'")]
    UnknownFormat(String),
}

impl From<lopdf::Error> for ExportError {
    fn from(e: lopdf::Error) -> Self {
        ExportError::Pdf(e.to_string())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExportFormat {
    Pdf,
    Markdown,
    Html,
}

impl ExportFormat {
    pub fn extension(&self) -> &'static str {
        match self {
            ExportFormat::Pdf => "pdf",
            ExportFormat::Markdown => "md",
            ExportFormat::Html => "html",
        }
    }

    pub fn content_type(&self) -> &'static str {
        match self {
            ExportFormat::Pdf => "application/pdf",
            ExportFormat::Markdown => "text/markdown; charset=utf-8",
            ExportFormat::Html => "text/html; charset=utf-8",
        }
    }
}

impl FromStr for ExportFormat {
    type Err = ExportError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "pdf" => Ok(ExportFormat::Pdf),
            "markdown" | "md" => Ok(ExportFormat::Markdown),
            "html" => Ok(ExportFormat::Html),
            other => Err(ExportError::UnknownFormat(other.to_string())),
        }
    }
}

impl fmt::Display for ExportFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            ExportFormat::Pdf => "pdf",
            ExportFormat::Markdown => "markdown",
            ExportFormat::Html => "html",
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Artifact {
    pub file_name: String,
    pub content_type: &'static str,
    pub body: Vec<u8>,
}

/// `{name or "CV"}_{YYYY-MM-DD}.{ext}`, with characters that are unsafe in file
/// names replaced by `_`.
pub fn artifact_file_name(doc: &ResumeDocument, format: ExportFormat, date: NaiveDate) -> String {
    let name = doc.personal_info.name.trim();
    let name = if name.is_empty() { "CV" } else { name };
    let stem: String = name
        .chars()
        .map(|c| match c {
            '/' | '\\' | ':' | '*' | '?' | '"' | '<' | '>' | '|' => '_',
            c if c.is_control() => '_',
            c => c,
        })
        .collect();
    format!("{stem}_{}.{}", date.format("%Y-%m-%d"), format.extension())
}

/// Renders `doc` in `format`, drawing PDFs with `fonts`. Fails without side effects
/// when the document is not export-ready. PDF rendering is CPU-bound; async callers
/// use `spawn_blocking`.
pub fn export_document(
    doc: &ResumeDocument,
    format: ExportFormat,
    date: NaiveDate,
    fonts: &PdfFonts,
) -> Result<Artifact, ExportError> {
    let readiness = export_readiness(doc);
    if !readiness.ready {
        return Err(ExportError::NotReady(readiness));
    }

    let resume = compose(doc)?;
    let body = match format {
        ExportFormat::Markdown => markdown::render(&resume).into_bytes(),
        ExportFormat::Html => html::render(&resume).into_bytes(),
        ExportFormat::Pdf => pdf::render(&resume, fonts)?,
    };

    Ok(Artifact {
        file_name: artifact_file_name(doc, format, date),
        content_type: format.content_type(),
        body,
    })
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::document::mutators::{add_entry, add_language, add_skill, update_personal_info};
    use crate::models::entries::{Experience, Period};
    use crate::models::{Entry, PersonalField, ResumeType};

    /// The minimal export-ready document: every milestone met, all fields valid.
    pub(crate) fn kim_document(resume_type: ResumeType) -> ResumeDocument {
        let mut doc = ResumeDocument::new(resume_type);
        for (field, value) in [
            (PersonalField::Name, "Kim Cheolsu"),
            (PersonalField::Email, "kim@example.com"),
            (PersonalField::Phone, "010-1234-5678"),
            (PersonalField::Location, "Seoul, Korea"),
        ] {
            doc = update_personal_info(&doc, field, value);
        }
        let doc = add_skill(&doc, "Rust").unwrap();
        let doc = add_language(&doc, "Korean").unwrap();
        add_entry(
            &doc,
            Entry::new(Experience {
                company: "Acme".into(),
                position: "Engineer".into(),
                period: Period::new("2020-01", "2023-12"),
                description: "Built the billing platform.".into(),
                ..Default::default()
            }),
        )
    }

    fn date() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 3, 9).unwrap()
    }

    #[test]
    fn test_file_name_uses_name_and_date() {
        let doc = kim_document(ResumeType::CHRONOLOGICAL);
        assert_eq!(
            artifact_file_name(&doc, ExportFormat::Markdown, date()),
            "Kim Cheolsu_2024-03-09.md"
        );
    }

    #[test]
    fn test_file_name_defaults_and_sanitizes() {
        let mut doc = ResumeDocument::new(ResumeType::CASCADE);
        assert_eq!(
            artifact_file_name(&doc, ExportFormat::Pdf, date()),
            "CV_2024-03-09.pdf"
        );
        doc.personal_info.name = "a/b:c".into();
        assert_eq!(
            artifact_file_name(&doc, ExportFormat::Html, date()),
            "a_b_c_2024-03-09.html"
        );
    }

    #[test]
    fn test_export_blocked_when_not_ready() {
        let doc = ResumeDocument::new(ResumeType::CHRONOLOGICAL);
        match export_document(&doc, ExportFormat::Markdown, date(), &PdfFonts::Standard) {
            Err(ExportError::NotReady(readiness)) => {
                assert_eq!(readiness.missing_milestones.len(), 4);
            }
            other => panic!("expected NotReady, got {other:?}"),
        }
    }

    #[test]
    fn test_export_each_format() {
        let doc = kim_document(ResumeType::CHRONOLOGICAL);
        for format in [ExportFormat::Markdown, ExportFormat::Html, ExportFormat::Pdf] {
            let artifact = export_document(&doc, format, date(), &PdfFonts::Standard).unwrap();
            assert_eq!(artifact.content_type, format.content_type());
            assert!(artifact.file_name.ends_with(format.extension()));
            assert!(!artifact.body.is_empty());
        }
    }

    #[test]
    fn test_korean_name_keeps_text_formats_and_rejects_bare_pdf() {
        let doc = update_personal_info(
            &kim_document(ResumeType::CHRONOLOGICAL),
            PersonalField::Name,
            "김철수",
        );
        let markdown = export_document(&doc, ExportFormat::Markdown, date(), &PdfFonts::Standard)
            .unwrap();
        assert!(String::from_utf8(markdown.body).unwrap().starts_with("# 김철수"));
        assert!(matches!(
            export_document(&doc, ExportFormat::Pdf, date(), &PdfFonts::Standard),
            Err(ExportError::UnsupportedCharacters(_))
        ));
    }

    #[test]
    fn test_format_parsing() {
        assert_eq!("PDF".parse::<ExportFormat>().unwrap(), ExportFormat::Pdf);
        assert_eq!("md".parse::<ExportFormat>().unwrap(), ExportFormat::Markdown);
        assert!(matches!(
            "docx".parse::<ExportFormat>(),
            Err(ExportError::UnknownFormat(_))
        ));
    }
}
