use flipbook_async_runtime::ViewerUpdate;
use flipbook_core::ViewportController;
use tokio::sync::mpsc;

pub fn publish(viewport: &ViewportController, update_tx: &mpsc::UnboundedSender<ViewerUpdate>) {
    let _ = update_tx.send(ViewerUpdate::ViewportChanged {
        zoom: viewport.zoom(),
        fit_mode: viewport.fit_mode(),
    });
}
