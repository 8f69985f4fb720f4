//! PDFium-backed rasterisation and page stamping

use crate::error::{Error, Result};
use crate::pdf::codec::{ColorMode, ImageFormat, Raster, RenderSettings, RenderTarget, Stamp};
use crate::pdf::has_pdf_header;
use image::codecs::jpeg::JpegEncoder;
use image::DynamicImage;
use pdfium_render::prelude::*;
use std::io::Cursor;

/// Luma threshold separating black from white in `ColorMode::BlackWhite`
const BLACK_WHITE_THRESHOLD: u8 = 128;

/// Get PDFium instance (creates new instance each time - PDFium is not thread-safe)
fn create_pdfium() -> Result<Pdfium> {
    // Try to bind to system library or use static linking
    let bindings = Pdfium::bind_to_library(Pdfium::pdfium_platform_library_name_at_path("./"))
        .or_else(|_| {
            Pdfium::bind_to_library(Pdfium::pdfium_platform_library_name_at_path(
                "/opt/pdfium/lib",
            ))
        })
        .or_else(|_| Pdfium::bind_to_system_library())
        .map_err(|e| Error::ProcessingFailed {
            reason: format!("Failed to initialize PDFium: {}", e),
        })?;

    Ok(Pdfium::new(bindings))
}

/// Map PDFium load errors to our error type
fn map_load_error(err: PdfiumError, had_password: bool) -> Error {
    match err {
        PdfiumError::PdfiumLibraryInternalError(PdfiumInternalError::PasswordError) => {
            Error::locked(had_password)
        }
        _ => Error::unreadable(err.to_string()),
    }
}

/// Reject non-PDF bytes before binding PDFium
fn check_header(data: &[u8]) -> Result<()> {
    if has_pdf_header(data) {
        Ok(())
    } else {
        Err(Error::unreadable("missing %PDF header"))
    }
}

fn load_document<'a>(
    pdfium: &'a Pdfium,
    data: &'a [u8],
    password: Option<&str>,
) -> Result<PdfDocument<'a>> {
    pdfium
        .load_pdf_from_byte_slice(data, password)
        .map_err(|e| map_load_error(e, password.is_some()))
}

/// Render the listed pages (1-indexed) in the given order
pub fn render_pages(
    data: &[u8],
    password: Option<&str>,
    page_numbers: &[u32],
    settings: &RenderSettings,
) -> Result<Vec<Raster>> {
    check_header(data)?;
    let pdfium = create_pdfium()?;
    let document = load_document(&pdfium, data, password)?;

    let pages = document.pages();
    let page_count = pages.len() as u32;
    let mut rendered = Vec::with_capacity(page_numbers.len());

    for &page_num in page_numbers {
        if page_num < 1 || page_num > page_count {
            return Err(Error::PageOutOfBounds {
                page: page_num,
                total: page_count,
            });
        }

        let page = pages
            .get((page_num - 1) as u16)
            .map_err(|e| Error::ProcessingFailed {
                reason: format!("Failed to get page {}: {}", page_num, e),
            })?;

        let config = match settings.target {
            RenderTarget::Width(w) => PdfRenderConfig::new().set_target_width(w as i32),
            RenderTarget::Scale(s) => {
                if let Some(max_pixels) = settings.max_pixels {
                    let pixels = (page.width().value * s) as u64 * (page.height().value * s) as u64;
                    if pixels > max_pixels {
                        return Err(Error::ImageDimensionExceeded {
                            detail: format!(
                                "page {} would render to {} pixels (max: {})",
                                page_num, pixels, max_pixels
                            ),
                        });
                    }
                }
                PdfRenderConfig::new().scale_page_by_factor(s)
            }
        };

        let config = config.render_form_data(true).render_annotations(true);

        let bitmap = page
            .render_with_config(&config)
            .map_err(|e| Error::ProcessingFailed {
                reason: format!("Failed to render page {}: {}", page_num, e),
            })?;

        let converted = apply_color_mode(bitmap.as_image(), settings.color_mode);
        let bytes = encode_image(&converted, settings.format, settings.quality).map_err(|e| {
            Error::ProcessingFailed {
                reason: format!("Failed to encode page {}: {}", page_num, e),
            }
        })?;

        rendered.push(Raster {
            page: page_num,
            width: converted.width(),
            height: converted.height(),
            data: bytes,
            mime_type: settings.format.mime_type().to_string(),
        });
    }

    Ok(rendered)
}

/// Convert a rendered page to the requested colour mode
pub fn apply_color_mode(image: DynamicImage, mode: ColorMode) -> DynamicImage {
    match mode {
        ColorMode::Color => image,
        ColorMode::Grayscale => DynamicImage::ImageLuma8(image.to_luma8()),
        ColorMode::BlackWhite => {
            let mut luma = image.to_luma8();
            for pixel in luma.pixels_mut() {
                pixel.0[0] = if pixel.0[0] < BLACK_WHITE_THRESHOLD { 0 } else { 255 };
            }
            DynamicImage::ImageLuma8(luma)
        }
    }
}

/// Encode an image in the requested format
pub fn encode_image(
    image: &DynamicImage,
    format: ImageFormat,
    quality: u8,
) -> image::ImageResult<Vec<u8>> {
    let mut bytes = Vec::new();
    let mut cursor = Cursor::new(&mut bytes);
    match format {
        ImageFormat::Png => image.write_to(&mut cursor, image::ImageFormat::Png)?,
        ImageFormat::Jpeg => {
            // JPEG has no alpha channel
            let flattened = match image {
                DynamicImage::ImageLuma8(_) => image.clone(),
                _ => DynamicImage::ImageRgb8(image.to_rgb8()),
            };
            let encoder = JpegEncoder::new_with_quality(&mut cursor, quality.clamp(1, 100));
            flattened.write_with_encoder(encoder)?
        }
        ImageFormat::Webp => DynamicImage::ImageRgba8(image.to_rgba8())
            .write_to(&mut cursor, image::ImageFormat::WebP)?,
    }
    Ok(bytes)
}

/// Downscale and lossily re-encode every embedded image, returning the
/// rewritten (unencrypted) document
pub fn reencode_images(
    data: &[u8],
    password: Option<&str>,
    scale: f32,
    quality: u8,
) -> Result<Vec<u8>> {
    check_header(data)?;
    let pdfium = create_pdfium()?;
    let document = load_document(&pdfium, data, password)?;
    let mut reencoded = 0usize;

    let pages = document.pages();
    for page_index in 0..pages.len() {
        let page = pages.get(page_index).map_err(|e| Error::ProcessingFailed {
            reason: format!("Failed to get page {}: {}", page_index + 1, e),
        })?;

        for mut object in page.objects().iter() {
            let Some(image_object) = object.as_image_object_mut() else {
                continue;
            };
            let original = match image_object.get_raw_image() {
                Ok(img) => img,
                Err(e) => {
                    tracing::debug!(page = page_index + 1, error = %e, "skipping unreadable image");
                    continue;
                }
            };

            let degraded = degrade_image(&original, scale, quality).map_err(|e| {
                Error::ProcessingFailed {
                    reason: format!("Failed to re-encode image on page {}: {}", page_index + 1, e),
                }
            })?;
            image_object
                .set_image(&degraded)
                .map_err(|e| Error::ProcessingFailed {
                    reason: format!("Failed to replace image on page {}: {}", page_index + 1, e),
                })?;
            reencoded += 1;
        }
    }

    tracing::debug!(images = reencoded, scale, quality, "re-encoded embedded images");

    document.save_to_bytes().map_err(|e| Error::ProcessingFailed {
        reason: format!("Failed to save re-encoded PDF: {}", e),
    })
}

/// Downscale by `scale` and pass through a JPEG round-trip at `quality`
pub fn degrade_image(image: &DynamicImage, scale: f32, quality: u8) -> image::ImageResult<DynamicImage> {
    let scale = scale.clamp(0.05, 1.0);
    let resized = if scale < 1.0 {
        let width = ((image.width() as f32 * scale).round() as u32).max(1);
        let height = ((image.height() as f32 * scale).round() as u32).max(1);
        image.resize_exact(width, height, image::imageops::FilterType::Triangle)
    } else {
        image.clone()
    };

    let jpeg = encode_image(&resized, ImageFormat::Jpeg, quality)?;
    image::load_from_memory_with_format(&jpeg, image::ImageFormat::Jpeg)
}

/// Stamp every page with a text or image watermark
pub fn stamp_pages(data: &[u8], password: Option<&str>, stamp: &Stamp) -> Result<Vec<u8>> {
    check_header(data)?;
    let pdfium = create_pdfium()?;
    let mut document = load_document(&pdfium, data, password)?;
    let font = document.fonts_mut().helvetica();

    let pages = document.pages();
    for page_index in 0..pages.len() {
        let mut page = pages.get(page_index).map_err(|e| Error::ProcessingFailed {
            reason: format!("Failed to get page {}: {}", page_index + 1, e),
        })?;
        let page_width = page.width().value;
        let page_height = page.height().value;

        let stamped = match stamp {
            Stamp::Text {
                text,
                font_size,
                opacity,
            } => page
                .objects_mut()
                .create_text_object(
                    PdfPoints::ZERO,
                    PdfPoints::ZERO,
                    text,
                    font,
                    PdfPoints::new(*font_size),
                )
                .and_then(|mut object| {
                    object.set_fill_color(PdfColor::new(128, 128, 128, alpha(*opacity)))?;
                    object.rotate_counter_clockwise_degrees(45.0)?;
                    object.translate(
                        PdfPoints::new(page_width * 0.25),
                        PdfPoints::new(page_height * 0.25),
                    )
                }),
            Stamp::Image {
                image,
                width_ratio,
                opacity,
            } => {
                let width = page_width * width_ratio.clamp(0.05, 1.0);
                let height = width * image.height() as f32 / image.width().max(1) as f32;
                let faded = fade(image, *opacity);
                page.objects_mut()
                    .create_image_object(
                        PdfPoints::new((page_width - width) / 2.0),
                        PdfPoints::new((page_height - height) / 2.0),
                        &faded,
                        Some(PdfPoints::new(width)),
                        Some(PdfPoints::new(height)),
                    )
                    .map(|_| ())
            }
        };

        stamped.map_err(|e| Error::ProcessingFailed {
            reason: format!("Failed to stamp page {}: {}", page_index + 1, e),
        })?;
    }

    document.save_to_bytes().map_err(|e| Error::ProcessingFailed {
        reason: format!("Failed to save watermarked PDF: {}", e),
    })
}

fn alpha(opacity: f32) -> u8 {
    (opacity.clamp(0.0, 1.0) * 255.0).round() as u8
}

/// Scale the alpha channel of `image` by `opacity`
fn fade(image: &DynamicImage, opacity: f32) -> DynamicImage {
    let mut rgba = image.to_rgba8();
    let factor = opacity.clamp(0.0, 1.0);
    for pixel in rgba.pixels_mut() {
        pixel.0[3] = (pixel.0[3] as f32 * factor).round() as u8;
    }
    DynamicImage::ImageRgba8(rgba)
}
