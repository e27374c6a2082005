use flipbook_core::{DecodeError, PageDecoder, PageSource};
use image::RgbaImage;
use pdfium_render::prelude::*;
use std::path::PathBuf;

/// Initialize Pdfium: the directory recorded at build time, then `vendor/pdfium/lib`
/// under the working directory, then the system library
pub fn init_pdfium() -> Result<Pdfium, PdfiumError> {
    let candidates = [
        option_env!("FLIPBOOK_PDFIUM_LIB_DIR").map(PathBuf::from),
        std::env::current_dir()
            .ok()
            .map(|p| p.join("vendor/pdfium/lib")),
    ];

    for dir in candidates.into_iter().flatten().filter(|p| p.exists()) {
        if let Ok(binding) =
            Pdfium::bind_to_library(Pdfium::pdfium_platform_library_name_at_path(&dir))
        {
            return Ok(Pdfium::new(binding));
        }
    }

    Pdfium::bind_to_system_library().map(Pdfium::new)
}

/// `PageDecoder` backed by Pdfium. The library handle is bound per run since
/// it cannot move between threads.
#[derive(Debug, Default, Clone, Copy)]
pub struct PdfiumDecoder;

impl PageDecoder for PdfiumDecoder {
    fn open(
        &self,
        bytes: &[u8],
        visit: &mut dyn FnMut(&mut dyn PageSource),
    ) -> Result<(), DecodeError> {
        let pdfium = init_pdfium().map_err(|e| DecodeError::Open(e.to_string()))?;
        let document = pdfium
            .load_pdf_from_byte_slice(bytes, None)
            .map_err(|e| DecodeError::Open(e.to_string()))?;

        visit(&mut PdfiumSource {
            document: &document,
        });
        Ok(())
    }
}

struct PdfiumSource<'a, 'b> {
    document: &'a PdfDocument<'b>,
}

impl PageSource for PdfiumSource<'_, '_> {
    fn page_count(&self) -> u32 {
        self.document.pages().len() as u32
    }

    fn render(&mut self, index: u32, scale: f32) -> Result<RgbaImage, DecodeError> {
        let page = self
            .document
            .pages()
            .get(index.saturating_sub(1) as u16)
            .map_err(|e| page_error(index, e))?;

        let config = PdfRenderConfig::new().scale_page_by_factor(scale);
        let bitmap = page
            .render_with_config(&config)
            .map_err(|e| page_error(index, e))?;

        Ok(bitmap.as_image().into_rgba8())
    }
}

fn page_error(index: u32, error: PdfiumError) -> DecodeError {
    DecodeError::Page {
        index,
        message: error.to_string(),
    }
}
