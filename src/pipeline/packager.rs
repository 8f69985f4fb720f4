//! ZIP packaging of multi-file outputs

use crate::error::{Error, Result};
use crate::pipeline::output::Artifact;
use std::io::{Cursor, Write};
use tracing::debug;
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipWriter};

fn packaging_failed(e: impl std::fmt::Display) -> Error {
    Error::PackagingFailed {
        reason: e.to_string(),
    }
}

/// Writes artifacts into a single deflated archive
#[derive(Debug, Clone, Copy)]
pub struct BatchPackager {
    method: CompressionMethod,
}

impl Default for BatchPackager {
    fn default() -> Self {
        Self::new()
    }
}

impl BatchPackager {
    pub fn new() -> Self {
        Self {
            method: CompressionMethod::Deflated,
        }
    }

    /// Archive bytes with one entry per artifact, in the given order.
    /// Names are used as-is.
    pub fn package(&self, artifacts: &[Artifact]) -> Result<Vec<u8>> {
        let options = SimpleFileOptions::default().compression_method(self.method);
        let mut zip = ZipWriter::new(Cursor::new(Vec::new()));

        for artifact in artifacts {
            zip.start_file(artifact.filename.as_str(), options)
                .map_err(packaging_failed)?;
            zip.write_all(&artifact.data).map_err(packaging_failed)?;
        }

        let archive = zip.finish().map_err(packaging_failed)?.into_inner();
        debug!(entries = artifacts.len(), bytes = archive.len(), "Packaged archive");
        Ok(archive)
    }
}
