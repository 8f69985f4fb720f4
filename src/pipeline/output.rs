//! Operation outputs and the result reported to callers

use crate::error::{Error, Result};
use crate::pipeline::packager::BatchPackager;

pub const PDF_MIME: &str = "application/pdf";
pub const ZIP_MIME: &str = "application/zip";

/// One downloadable file
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Artifact {
    pub filename: String,
    pub mime_type: String,
    pub data: Vec<u8>,
}

impl Artifact {
    pub fn new(filename: impl Into<String>, mime_type: impl Into<String>, data: Vec<u8>) -> Self {
        Self {
            filename: filename.into(),
            mime_type: mime_type.into(),
            data,
        }
    }

    pub fn pdf(filename: impl Into<String>, data: Vec<u8>) -> Self {
        Self::new(filename, PDF_MIME, data)
    }
}

/// Everything one operation produced
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Output {
    Single(Artifact),
    Batch(Vec<Artifact>),
}

impl Output {
    /// `Single` for exactly one artifact, `Batch` otherwise
    pub fn from_artifacts(mut artifacts: Vec<Artifact>) -> Result<Self> {
        match artifacts.len() {
            0 => Err(Error::ProcessingFailed {
                reason: "operation produced no output".to_string(),
            }),
            1 => Ok(Output::Single(artifacts.remove(0))),
            _ => Ok(Output::Batch(artifacts)),
        }
    }

    pub fn artifacts(&self) -> &[Artifact] {
        match self {
            Output::Single(artifact) => std::slice::from_ref(artifact),
            Output::Batch(artifacts) => artifacts,
        }
    }

    pub fn len(&self) -> usize {
        self.artifacts().len()
    }

    pub fn is_empty(&self) -> bool {
        self.artifacts().is_empty()
    }

    /// Collapse into one downloadable file. Single artifacts pass through
    /// untouched; batches become `{archive_stem}.zip`.
    pub fn into_download(self, packager: &BatchPackager, archive_stem: &str) -> Result<Artifact> {
        match self {
            Output::Single(artifact) => Ok(artifact),
            Output::Batch(artifacts) => {
                let data = packager.package(&artifacts)?;
                Ok(Artifact::new(format!("{}.zip", archive_stem), ZIP_MIME, data))
            }
        }
    }
}

/// Whether an operation did exactly what was asked
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum Completion {
    #[default]
    Full,
    /// Succeeded with a degraded variant of the request
    Fallback { reason: String },
}

/// Outcome of one tool run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OperationResult {
    pub success: bool,
    pub output: Option<Output>,
    pub error: Option<String>,
    pub completion: Completion,
}

impl OperationResult {
    pub fn ok(output: Output, completion: Completion) -> Self {
        Self {
            success: true,
            output: Some(output),
            error: None,
            completion,
        }
    }

    pub fn failed(error: &Error) -> Self {
        Self {
            success: false,
            output: None,
            error: Some(error.client_message()),
            completion: Completion::Full,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_from_artifacts() {
        assert!(Output::from_artifacts(vec![]).is_err());

        let single = Output::from_artifacts(vec![Artifact::pdf("a.pdf", vec![1])]).unwrap();
        assert!(matches!(single, Output::Single(_)));
        assert_eq!(single.len(), 1);

        let batch = Output::from_artifacts(vec![
            Artifact::pdf("a.pdf", vec![1]),
            Artifact::pdf("b.pdf", vec![2]),
        ])
        .unwrap();
        assert_eq!(batch.len(), 2);
        assert_eq!(batch.artifacts()[1].filename, "b.pdf");
    }

    #[test]
    fn test_single_download_bypasses_packager() {
        let artifact = Artifact::pdf("report_page_1.pdf", b"%PDF-1.4".to_vec());
        let download = Output::Single(artifact.clone())
            .into_download(&BatchPackager::new(), "report")
            .unwrap();
        assert_eq!(download, artifact);
    }

    #[test]
    fn test_batch_download_is_zip() {
        let output = Output::Batch(vec![
            Artifact::pdf("a.pdf", vec![1]),
            Artifact::pdf("b.pdf", vec![2]),
        ]);
        let download = output.into_download(&BatchPackager::new(), "report").unwrap();
        assert_eq!(download.filename, "report.zip");
        assert_eq!(download.mime_type, ZIP_MIME);
        assert!(download.data.starts_with(b"PK"));
    }

    #[test]
    fn test_failed_result_uses_client_message() {
        let result = OperationResult::failed(&Error::NoPagesSelected);
        assert!(!result.success);
        assert!(result.output.is_none());
        assert_eq!(
            result.error.as_deref(),
            Some(crate::error::NO_PAGES_SELECTED_MESSAGE)
        );
    }
}
