//! Error types for pagesmith

use thiserror::Error;

/// Result type alias for pagesmith
pub type Result<T> = std::result::Result<T, Error>;

/// Message shown when a split is requested without any selected page
pub const NO_PAGES_SELECTED_MESSAGE: &str =
    "No pages selected. Select at least one page to split.";

/// Why a document could not be opened
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnreadableKind {
    /// Corrupt, truncated or not a PDF at all
    Malformed,
    /// Encrypted and no password was provided
    PasswordRequired,
    /// Encrypted and the provided password does not open it
    IncorrectPassword,
}

/// Error types for pagesmith
#[derive(Error, Debug)]
pub enum Error {
    /// Bytes could not be opened as a PDF
    #[error("Document unreadable: {reason}")]
    DocumentUnreadable { kind: UnreadableKind, reason: String },

    /// A split was requested with an empty selection
    #[error("No pages selected")]
    NoPagesSelected,

    /// A merge was requested with fewer than two documents
    #[error("At least 2 documents are required, got {got}")]
    InsufficientDocuments { got: usize },

    /// Invalid page range
    #[error("Invalid page range: {range}")]
    InvalidPageRange { range: String },

    /// Page out of bounds
    #[error("Page {page} out of bounds (total: {total})")]
    PageOutOfBounds { page: u32, total: u32 },

    /// Options rejected at the boundary
    #[error("Invalid options: {reason}")]
    InvalidOptions { reason: String },

    /// Document id not present in the session
    #[error("Document not found: {id}")]
    DocumentNotFound { id: String },

    /// Uploaded payload exceeds the configured limit
    #[error("Upload too large (max: {max_size} bytes)")]
    UploadTooLarge { max_size: usize },

    /// Render output exceeds the configured pixel budget
    #[error("Image dimension exceeded: {detail}")]
    ImageDimensionExceeded { detail: String },

    /// Archive writer fault
    #[error("Packaging failed: {reason}")]
    PackagingFailed { reason: String },

    /// Codec-level failure while processing a readable document
    #[error("Processing failed: {reason}")]
    ProcessingFailed { reason: String },
}

impl Error {
    /// Malformed input: corrupt bytes or not a PDF
    pub fn unreadable(reason: impl Into<String>) -> Self {
        Error::DocumentUnreadable {
            kind: UnreadableKind::Malformed,
            reason: reason.into(),
        }
    }

    /// Encrypted input that `password` does not open
    pub fn locked(had_password: bool) -> Self {
        if had_password {
            Error::DocumentUnreadable {
                kind: UnreadableKind::IncorrectPassword,
                reason: "incorrect password".to_string(),
            }
        } else {
            Error::DocumentUnreadable {
                kind: UnreadableKind::PasswordRequired,
                reason: "password required".to_string(),
            }
        }
    }

    /// Return a sanitized error message safe to show to users.
    /// Internal details (library errors, byte counts) are omitted.
    /// Full details should be logged via tracing before calling this.
    pub fn client_message(&self) -> String {
        match self {
            Error::DocumentUnreadable { kind, .. } => match kind {
                UnreadableKind::Malformed => {
                    "The file could not be read as a PDF document".to_string()
                }
                UnreadableKind::PasswordRequired => "PDF is password protected".to_string(),
                UnreadableKind::IncorrectPassword => "Incorrect password".to_string(),
            },
            Error::NoPagesSelected => NO_PAGES_SELECTED_MESSAGE.to_string(),
            Error::InsufficientDocuments { .. } => {
                "Select at least 2 documents to merge".to_string()
            }
            Error::InvalidPageRange { range } => format!("Invalid page range: {}", range),
            Error::PageOutOfBounds { page, total } => {
                format!("Page {} out of bounds (total: {})", page, total)
            }
            Error::InvalidOptions { reason } => format!("Invalid options: {}", reason),
            Error::DocumentNotFound { .. } => "Document not found".to_string(),
            Error::UploadTooLarge { max_size, .. } => {
                format!("Upload exceeds maximum size of {} bytes", max_size)
            }
            Error::ImageDimensionExceeded { detail } => {
                format!("Image dimension exceeded: {}", detail)
            }
            Error::PackagingFailed { .. } => "Failed to package the output files".to_string(),
            Error::ProcessingFailed { .. } => "PDF processing error".to_string(),
        }
    }

    /// True for errors caused by the request rather than by the service
    pub fn is_client_error(&self) -> bool {
        matches!(
            self,
            Error::DocumentUnreadable { .. }
                | Error::NoPagesSelected
                | Error::InsufficientDocuments { .. }
                | Error::InvalidPageRange { .. }
                | Error::PageOutOfBounds { .. }
                | Error::InvalidOptions { .. }
                | Error::DocumentNotFound { .. }
                | Error::UploadTooLarge { .. }
                | Error::ImageDimensionExceeded { .. }
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_client_message_hides_reason() {
        let err = Error::ProcessingFailed {
            reason: "qpdf: object 12 0 has bad offset".to_string(),
        };
        assert_eq!(err.client_message(), "PDF processing error");
        assert!(err.to_string().contains("bad offset"));
    }

    #[test]
    fn test_no_pages_selected_message() {
        assert!(Error::NoPagesSelected
            .client_message()
            .starts_with("No pages selected"));
    }

    #[test]
    fn test_locked_documents_are_unreadable() {
        let missing = Error::locked(false);
        assert!(matches!(
            missing,
            Error::DocumentUnreadable {
                kind: UnreadableKind::PasswordRequired,
                ..
            }
        ));
        assert_eq!(missing.client_message(), "PDF is password protected");

        let wrong = Error::locked(true);
        assert!(matches!(
            wrong,
            Error::DocumentUnreadable {
                kind: UnreadableKind::IncorrectPassword,
                ..
            }
        ));
        assert_eq!(wrong.client_message(), "Incorrect password");
        assert!(wrong.is_client_error());
    }

    #[test]
    fn test_client_error_classification() {
        assert!(Error::NoPagesSelected.is_client_error());
        assert!(Error::InsufficientDocuments { got: 1 }.is_client_error());
        assert!(!Error::PackagingFailed {
            reason: "disk".to_string()
        }
        .is_client_error());
        assert!(!Error::ProcessingFailed {
            reason: "codec".to_string()
        }
        .is_client_error());
    }
}
