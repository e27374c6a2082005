//! Download and print hand-off

use crate::types::{PageImage, Result, ViewerError};
use printpdf::{
    Mm, Op, PdfDocument, PdfPage, PdfSaveOptions, RawImage, RawImageData, RawImageFormat,
    XObjectTransform,
};
use std::path::Path;
use std::sync::Arc;

/// Re-expose the original document bytes
pub async fn export_original(bytes: Arc<[u8]>, path: impl AsRef<Path>) -> Result<()> {
    tokio::fs::write(path, &bytes[..]).await?;
    Ok(())
}

/// Write a print-ready PDF made of the rendered pages
pub async fn export_print_pdf(
    pages: Vec<PageImage>,
    dpi: f32,
    path: impl AsRef<Path>,
) -> Result<()> {
    let path = path.as_ref().to_owned();

    // Image encoding is CPU-bound, spawn blocking
    let bytes = tokio::task::spawn_blocking(move || build_print_pdf(&pages, dpi)).await??;

    tokio::fs::write(&path, bytes).await?;
    Ok(())
}

/// One rendered page per PDF page, sized so the bitmap prints at `dpi`
pub fn build_print_pdf(pages: &[PageImage], dpi: f32) -> Result<Vec<u8>> {
    if pages.is_empty() {
        return Err(ViewerError::Export("No rendered pages to print".to_string()));
    }
    if !(dpi.is_finite() && dpi > 0.0) {
        return Err(ViewerError::Export(format!("Invalid print resolution: {}", dpi)));
    }

    let mut doc = PdfDocument::new("Flipbook print");
    let mut pdf_pages = Vec::with_capacity(pages.len());

    for page in pages {
        let rgb = flatten_on_white(&page.raster);
        let raw = RawImage {
            pixels: RawImageData::U8(rgb.into_raw()),
            width: page.width as usize,
            height: page.height as usize,
            data_format: RawImageFormat::RGB8,
            tag: Vec::new(),
        };
        let image_id = doc.add_image(&raw);

        let ops = vec![Op::UseXobject {
            id: image_id,
            transform: XObjectTransform {
                dpi: Some(dpi),
                ..Default::default()
            },
        }];

        pdf_pages.push(PdfPage::new(
            Mm(px_to_mm(page.width, dpi)),
            Mm(px_to_mm(page.height, dpi)),
            ops,
        ));
    }

    doc.pages = pdf_pages;

    let mut warnings = Vec::new();
    let bytes = doc.save(&PdfSaveOptions::default(), &mut warnings);
    if !warnings.is_empty() {
        log::debug!("Print export produced {} warnings", warnings.len());
    }

    Ok(bytes)
}

/// Composite onto white paper; PDF images carry no alpha here
fn flatten_on_white(raster: &image::RgbaImage) -> image::RgbImage {
    image::RgbImage::from_fn(raster.width(), raster.height(), |x, y| {
        let [r, g, b, a] = raster.get_pixel(x, y).0;
        let alpha = a as u32;
        let blend = |c: u8| ((c as u32 * alpha + 255 * (255 - alpha)) / 255) as u8;
        image::Rgb([blend(r), blend(g), blend(b)])
    })
}

fn px_to_mm(px: u32, dpi: f32) -> f32 {
    crate::constants::px_to_pt(px, dpi) * 25.4 / crate::constants::POINTS_PER_INCH
}
