//! qpdf FFI wrapper for PDF structure operations
//!
//! Page copying, composition, encryption and stream compression using the
//! qpdf crate (vendored FFI).

use crate::error::{Error, Result};
use crate::pdf::codec::{Bookmark, ComposeSettings, PageRef, PrintPermission, ProtectSettings};
use crate::pdf::has_pdf_header;
use qpdf::{
    EncryptionParams, EncryptionParamsR6, ObjectStreamMode, QPdf, QPdfDictionary, QPdfObject,
    QPdfObjectLike,
};

/// Wrapper for qpdf operations via FFI
pub struct QpdfWrapper;

/// Helper: open a QPdf from memory, optionally with password
fn open_qpdf(data: &[u8], password: Option<&str>) -> Result<QPdf> {
    if !has_pdf_header(data) {
        return Err(Error::unreadable("missing %PDF header"));
    }

    match password {
        Some(pwd) => QPdf::read_from_memory_encrypted(data, pwd),
        None => QPdf::read_from_memory(data),
    }
    .map_err(|e| map_open_error(e, password.is_some()))
}

/// Map errors raised while parsing input
fn map_open_error(e: qpdf::QPdfError, had_password: bool) -> Error {
    match e.error_code() {
        qpdf::QPdfErrorCode::InvalidPassword => Error::locked(had_password),
        _ => Error::unreadable(e.to_string()),
    }
}

/// Map errors raised while building or writing output
fn map_qpdf_error(e: qpdf::QPdfError) -> Error {
    Error::ProcessingFailed {
        reason: e.to_string(),
    }
}

impl QpdfWrapper {
    /// Number of pages in a PDF
    pub fn get_page_count(input_data: &[u8], password: Option<&str>) -> Result<u32> {
        let qpdf = open_qpdf(input_data, password)?;
        qpdf.get_num_pages()
            .map_err(|e| Error::unreadable(e.to_string()))
    }

    /// Copy `pages` (1-indexed, in the given order) into a new PDF
    pub fn extract_pages(
        input_data: &[u8],
        pages: &[u32],
        password: Option<&str>,
    ) -> Result<Vec<u8>> {
        let source = open_qpdf(input_data, password)?;
        let num_pages = source.get_num_pages().map_err(map_qpdf_error)?;

        let dest = QPdf::empty();

        for &page_num in pages {
            let page = page_num
                .checked_sub(1)
                .and_then(|idx| source.get_page(idx))
                .ok_or(Error::PageOutOfBounds {
                    page: page_num,
                    total: num_pages,
                })?;
            let copied = dest.copy_from_foreign(&page);
            dest.add_page(&copied, false).map_err(map_qpdf_error)?;
        }

        let mut writer = dest.writer();
        writer.preserve_encryption(false);
        writer.write_to_memory().map_err(map_qpdf_error)
    }

    /// Build a PDF whose pages follow `plan`, drawing from `inputs`
    pub fn compose(
        inputs: &[(&[u8], Option<&str>)],
        plan: &[PageRef],
        settings: &ComposeSettings,
    ) -> Result<Vec<u8>> {
        let mut sources = Vec::with_capacity(inputs.len());
        for (i, (data, password)) in inputs.iter().enumerate() {
            let source = open_qpdf(data, *password).map_err(|e| match e {
                Error::DocumentUnreadable { kind, reason } => Error::DocumentUnreadable {
                    kind,
                    reason: format!("input {}: {}", i, reason),
                },
                other => other,
            })?;
            sources.push(source);
        }

        let dest = QPdf::empty();

        for page_ref in plan {
            let source = sources.get(page_ref.source).ok_or_else(|| Error::ProcessingFailed {
                reason: format!("plan refers to missing source {}", page_ref.source),
            })?;
            let page = page_ref
                .page
                .checked_sub(1)
                .and_then(|idx| source.get_page(idx))
                .ok_or(Error::PageOutOfBounds {
                    page: page_ref.page,
                    total: source.get_num_pages().unwrap_or(0),
                })?;
            let copied = dest.copy_from_foreign(&page);
            dest.add_page(&copied, false).map_err(map_qpdf_error)?;
        }

        if let Some(index) = settings.metadata_from {
            if let Some(source) = sources.get(index) {
                copy_info_dictionary(source, &dest);
            }
        }

        if !settings.bookmarks.is_empty() {
            add_outline(&dest, &settings.bookmarks)?;
        }

        let mut writer = dest.writer();
        writer.preserve_encryption(false);
        writer.write_to_memory().map_err(map_qpdf_error)
    }

    /// Encrypt a PDF with AES-256 password protection
    pub fn encrypt(
        input_data: &[u8],
        settings: &ProtectSettings,
        source_password: Option<&str>,
    ) -> Result<Vec<u8>> {
        let qpdf = open_qpdf(input_data, source_password)?;

        let print_perm = match settings.allow_print {
            PrintPermission::None => qpdf::PrintPermission::None,
            PrintPermission::Low => qpdf::PrintPermission::Low,
            PrintPermission::Full => qpdf::PrintPermission::Full,
        };

        let owner_pwd = settings
            .owner_password
            .as_deref()
            .unwrap_or(&settings.user_password);

        let encryption = EncryptionParams::R6(EncryptionParamsR6 {
            user_password: settings.user_password.clone(),
            owner_password: owner_pwd.to_string(),
            allow_accessibility: true,
            allow_extract: settings.allow_copy,
            allow_assemble: settings.allow_modify,
            allow_annotate_and_form: settings.allow_modify,
            allow_form_filling: settings.allow_modify,
            allow_modify_other: settings.allow_modify,
            allow_print: print_perm,
            encrypt_metadata: true,
        });

        let mut writer = qpdf.writer();
        writer
            .preserve_encryption(false)
            .encryption_params(encryption);
        writer.write_to_memory().map_err(map_qpdf_error)
    }

    /// Rewrite a PDF with compressed streams and object streams, dropping
    /// unreferenced objects and optionally the metadata
    pub fn compress(
        input_data: &[u8],
        password: Option<&str>,
        remove_metadata: bool,
    ) -> Result<Vec<u8>> {
        let qpdf = open_qpdf(input_data, password)?;

        if remove_metadata {
            strip_metadata(&qpdf);
        }

        let mut writer = qpdf.writer();
        writer
            .object_stream_mode(ObjectStreamMode::Generate)
            .compress_streams(true)
            .normalize_content(true)
            .preserve_unreferenced_objects(false)
            .preserve_encryption(false);
        writer.write_to_memory().map_err(map_qpdf_error)
    }
}

/// Copy the `/Info` dictionary of `source` into the trailer of `dest`
fn copy_info_dictionary(source: &QPdf, dest: &QPdf) {
    let info = source.get_trailer().and_then(|trailer| trailer.get("/Info"));
    if let (Some(info), Some(trailer)) = (info, dest.get_trailer()) {
        let copied = dest.copy_from_foreign(&info);
        trailer.set("/Info", &copied);
    }
}

/// Remove the document info dictionary and the XMP metadata stream
fn strip_metadata(qpdf: &QPdf) {
    if let Some(trailer) = qpdf.get_trailer() {
        trailer.remove("/Info");
    }
    if let Some(root) = qpdf.get_root() {
        root.remove("/Metadata");
    }
}

/// Attach a flat outline, one item per bookmark, to the catalog of `dest`
fn add_outline(dest: &QPdf, bookmarks: &[Bookmark]) -> Result<()> {
    let root = dest.get_root().ok_or_else(|| Error::ProcessingFailed {
        reason: "output has no catalog".to_string(),
    })?;
    let num_pages = dest.get_num_pages().map_err(map_qpdf_error)?;

    let outlines = dest.new_dictionary();
    outlines.set("/Type", &dest.new_name("/Outlines"));
    let outlines: QPdfObject = QPdfObject::from(outlines).into_indirect();

    let mut items: Vec<QPdfObject> = Vec::with_capacity(bookmarks.len());
    for bookmark in bookmarks {
        let page = bookmark
            .page
            .checked_sub(1)
            .and_then(|idx| dest.get_page(idx))
            .ok_or(Error::PageOutOfBounds {
                page: bookmark.page,
                total: num_pages,
            })?;

        let target = dest.new_array();
        target.push(&QPdfObject::from(page));
        target.push(&dest.new_name("/Fit"));

        let item = dest.new_dictionary();
        item.set("/Title", &dest.new_utf8_string(&bookmark.title));
        item.set("/Parent", &outlines);
        item.set("/Dest", &QPdfObject::from(target));
        items.push(QPdfObject::from(item).into_indirect());
    }

    for (i, item) in items.iter().enumerate() {
        let dict = QPdfDictionary::from(item.clone());
        if i > 0 {
            dict.set("/Prev", &items[i - 1]);
        }
        if let Some(next) = items.get(i + 1) {
            dict.set("/Next", next);
        }
    }

    if let (Some(first), Some(last)) = (items.first(), items.last()) {
        let dict = QPdfDictionary::from(outlines.clone());
        dict.set("/First", first);
        dict.set("/Last", last);
        dict.set("/Count", &dest.new_integer(items.len() as i64));
    }

    root.set("/Outlines", &outlines);
    root.set("/PageMode", &dest.new_name("/UseOutlines"));
    Ok(())
}
