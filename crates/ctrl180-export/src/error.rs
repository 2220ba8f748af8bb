use thiserror::Error;

#[derive(Debug, Error)]
pub enum ExportError {
    #[error("invalid template filename: {0}")]
    InvalidTemplateName(String),

    #[error("template not found: {name} ({detail})")]
    TemplateNotFound { name: String, detail: String },

    #[error("PDF load failed: {0}")]
    PdfLoad(String),

    #[error("PDF generation failed: {0}")]
    Pdf(String),

    #[error("image decode failed: {0}")]
    Image(String),

    #[error("PDF object error: {0}")]
    Lopdf(#[from] lopdf::Error),
}
