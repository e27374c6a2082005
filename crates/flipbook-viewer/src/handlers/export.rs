use flipbook_async_runtime::ViewerUpdate;
use flipbook_core::{PageImage, export_original, export_print_pdf};
use std::path::PathBuf;
use std::sync::Arc;
use tokio::sync::mpsc;

pub async fn handle_export_original(
    path: PathBuf,
    bytes: Arc<[u8]>,
    update_tx: &mpsc::UnboundedSender<ViewerUpdate>,
) {
    match export_original(bytes, &path).await {
        Ok(()) => {
            log::info!("Saved document to {}", path.display());
            let _ = update_tx.send(ViewerUpdate::Exported { path });
        }
        Err(e) => {
            let _ = update_tx.send(ViewerUpdate::Error {
                message: format!("Failed to save document: {}", e),
            });
        }
    }
}

/// Print hand-off: the pages rasterized so far, one per sheet
pub async fn handle_export_print(
    path: PathBuf,
    pages: Vec<PageImage>,
    dpi: f32,
    update_tx: &mpsc::UnboundedSender<ViewerUpdate>,
) {
    let count = pages.len();
    match export_print_pdf(pages, dpi, &path).await {
        Ok(()) => {
            log::info!("Wrote {} print pages to {}", count, path.display());
            let _ = update_tx.send(ViewerUpdate::Exported { path });
        }
        Err(e) => {
            let _ = update_tx.send(ViewerUpdate::Error {
                message: format!("Failed to prepare print: {}", e),
            });
        }
    }
}
