#![cfg_attr(not(debug_assertions), windows_subsystem = "windows")]

use eframe::egui;
use flipbook_core::{JsonFileStore, KeyValueStore, ViewerOptions};
use flipbook_viewer::{AppLogger, PdfiumDecoder};
use std::path::PathBuf;
use std::sync::Arc;

mod app;
mod views;

fn main() -> anyhow::Result<()> {
    let logger = AppLogger::new(500);
    logger.clone().init()?;

    let runtime = tokio::runtime::Runtime::new()?;
    let options = runtime.block_on(load_options());
    let render_scale = options.render_scale;
    let backend: Arc<dyn KeyValueStore> =
        Arc::new(JsonFileStore::new(options.resolved_bookmark_dir()));

    let handle = {
        let _guard = runtime.enter();
        flipbook_viewer::spawn(Arc::new(PdfiumDecoder), options, backend)
    };
    let initial_path = std::env::args_os().nth(1).map(PathBuf::from);

    let native_options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([1280.0, 860.0])
            .with_title("Flipbook"),
        ..Default::default()
    };

    eframe::run_native(
        "Flipbook",
        native_options,
        Box::new(move |cc| {
            Ok(Box::new(app::FlipbookApp::new(
                cc,
                runtime,
                handle,
                logger,
                render_scale,
                initial_path,
            )))
        }),
    )
    .map_err(|e| anyhow::anyhow!("{}", e))
}

/// Options from the platform config file; a broken file falls back to defaults
async fn load_options() -> ViewerOptions {
    let Some(path) = ViewerOptions::default_path() else {
        return ViewerOptions::default();
    };
    match ViewerOptions::load_or_default(&path).await {
        Ok(options) => options,
        Err(e) => {
            log::warn!("Ignoring {}: {}", path.display(), e);
            ViewerOptions::default()
        }
    }
}
