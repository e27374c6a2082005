use anyhow::{Context, Result, bail};
use clap::{Parser, Subcommand, ValueEnum};
use flipbook_core::constants::DEFAULT_PRINT_DPI;
use flipbook_core::flip::slice_transforms;
use flipbook_core::{
    AddOutcome, BookmarkStore, Direction, DocumentMetadata, DocumentSource, JsonFileStore,
    PageImage, PageRasterizer, RasterEvent, ViewerOptions,
};
use flipbook_viewer::{AppLogger, PdfiumDecoder};
use std::path::{Path, PathBuf};
use std::sync::Arc;

#[derive(Parser)]
#[command(name = "flipbook", about = "Flipbook document tools", version)]
struct Cli {
    /// Print log output to stderr
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Rasterize every page to a PNG file
    Render {
        /// Input PDF file
        #[arg(short, long)]
        input: PathBuf,

        /// Output directory
        #[arg(short, long)]
        output: PathBuf,

        /// Render scale relative to natural page size
        #[arg(long)]
        scale: Option<f32>,
    },

    /// Write a print-ready PDF built from the rasterized pages
    Print {
        /// Input PDF file
        #[arg(short, long)]
        input: PathBuf,

        /// Output PDF file
        #[arg(short, long)]
        output: PathBuf,

        /// Print resolution
        #[arg(long, default_value_t = DEFAULT_PRINT_DPI)]
        dpi: f32,
    },

    /// Show document metadata
    Info {
        /// Input PDF file
        #[arg(short, long)]
        input: PathBuf,
    },

    /// Inspect or edit the bookmarks saved for a document
    Bookmarks {
        /// Document the bookmarks belong to
        #[arg(short, long)]
        input: PathBuf,

        /// Bookmark directory (platform data dir when unset)
        #[arg(long)]
        store: Option<PathBuf>,

        #[command(subcommand)]
        action: Option<BookmarkAction>,
    },

    /// Print the slice transforms of a page turn as JSON
    Curl {
        /// Animation fraction between 0 and 1
        #[arg(long)]
        progress: f32,

        #[arg(long, default_value = "forward", value_enum)]
        direction: DirectionArg,

        /// Number of slices (configured default when unset)
        #[arg(long)]
        slices: Option<u32>,
    },
}

#[derive(Subcommand)]
enum BookmarkAction {
    /// List bookmarked pages
    List,
    /// Bookmark a page
    Add { page: u32 },
    /// Remove a bookmark
    Remove { page: u32 },
    /// Attach a note to a bookmarked page; omit the text to clear it
    Note { page: u32, text: Option<String> },
}

#[derive(Clone, Copy, ValueEnum)]
enum DirectionArg {
    Forward,
    Backward,
}

impl From<DirectionArg> for Direction {
    fn from(arg: DirectionArg) -> Self {
        match arg {
            DirectionArg::Forward => Self::Forward,
            DirectionArg::Backward => Self::Backward,
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    AppLogger::new(200)
        .with_echo(cli.verbose)
        .init()
        .context("Failed to install logger")?;

    let options = match ViewerOptions::default_path() {
        Some(path) => ViewerOptions::load_or_default(path).await?,
        None => ViewerOptions::default(),
    };

    match cli.command {
        Commands::Render {
            input,
            output,
            scale,
        } => {
            let scale = scale.unwrap_or(options.render_scale);
            tokio::fs::create_dir_all(&output).await?;

            let stem = file_stem(&input);
            let mut written = 0;
            let mut failed = 0;
            for page in rasterize(&input, scale, &mut failed).await? {
                let path = output.join(format!("{}-{:03}.png", stem, page.index));
                let raster = page.raster.clone();
                let target = path.clone();
                tokio::task::spawn_blocking(move || raster.save(&target))
                    .await?
                    .with_context(|| format!("Failed to write {}", path.display()))?;
                written += 1;
            }
            println!("Rendered {} pages → {}", written, output.display());
            if failed > 0 {
                println!("  {} pages could not be rendered", failed);
            }
        }

        Commands::Print { input, output, dpi } => {
            let mut failed = 0;
            let pages = rasterize(&input, options.render_scale, &mut failed).await?;
            if pages.is_empty() {
                bail!("No pages of {} could be rendered", input.display());
            }
            let count = pages.len();
            flipbook_core::export_print_pdf(pages, dpi, &output).await?;
            println!("Printed {} pages at {} dpi → {}", count, dpi, output.display());
            if failed > 0 {
                println!("  {} pages skipped", failed);
            }
        }

        Commands::Info { input } => {
            let bytes = DocumentSource::File(input.clone()).fetch().await?;
            let metadata =
                tokio::task::spawn_blocking(move || DocumentMetadata::probe(&bytes)).await??;
            println!("Document: {}", input.display());
            println!("  Title: {}", metadata.title.as_deref().unwrap_or("-"));
            println!("  Author: {}", metadata.author.as_deref().unwrap_or("-"));
            println!("  Pages: {}", metadata.declared_pages);
        }

        Commands::Bookmarks {
            input,
            store,
            action,
        } => {
            let dir = store.unwrap_or_else(|| options.resolved_bookmark_dir());
            let key = DocumentSource::File(input).key();
            let mut bookmarks = BookmarkStore::open(key, Arc::new(JsonFileStore::new(dir)));

            match action.unwrap_or(BookmarkAction::List) {
                BookmarkAction::List => {}
                BookmarkAction::Add { page } => {
                    if bookmarks.add(page) == AddOutcome::AlreadyBookmarked {
                        println!("Page {} is already bookmarked", page);
                    }
                }
                BookmarkAction::Remove { page } => {
                    if !bookmarks.remove(page) {
                        println!("Page {} was not bookmarked", page);
                    }
                }
                BookmarkAction::Note { page, text } => {
                    if !bookmarks.set_note(page, text) {
                        bail!("Page {} is not bookmarked", page);
                    }
                }
            }
            if let Some(warning) = bookmarks.take_warning() {
                eprintln!("Warning: {}", warning);
            }

            let pages = bookmarks.list();
            if pages.is_empty() {
                println!("No bookmarks");
            }
            for page in pages {
                match bookmarks.note(page) {
                    Some(note) => println!("  p. {:<5} {}", page, note),
                    None => println!("  p. {}", page),
                }
            }
            if let Some(page) = bookmarks.last_read() {
                println!("Last read: page {}", page);
            }
        }

        Commands::Curl {
            progress,
            direction,
            slices,
        } => {
            if !(0.0..=1.0).contains(&progress) {
                bail!("Progress must be between 0 and 1");
            }
            let transforms = slice_transforms(
                progress,
                slices.unwrap_or(options.slice_count),
                direction.into(),
                options.max_elevation,
            );
            println!("{}", serde_json::to_string_pretty(&transforms)?);
        }
    }

    Ok(())
}

/// Decode every page, counting the ones that fail
async fn rasterize(input: &Path, scale: f32, failed: &mut usize) -> Result<Vec<PageImage>> {
    let bytes = DocumentSource::File(input.to_path_buf()).fetch().await?;
    let mut stream = PageRasterizer::spawn(Arc::new(PdfiumDecoder), bytes, scale);

    let mut pages = Vec::new();
    while let Some(event) = stream.next().await {
        match event {
            RasterEvent::PageCount(count) => log::info!("{} has {} pages", input.display(), count),
            RasterEvent::Page(page) => pages.push(page),
            RasterEvent::PageFailed { index, error } => {
                eprintln!("Page {}: {}", index, error);
                *failed += 1;
            }
            RasterEvent::Finished => break,
            RasterEvent::OpenFailed(error) => {
                return Err(error).with_context(|| format!("Failed to open {}", input.display()));
            }
        }
    }
    Ok(pages)
}

fn file_stem(path: &Path) -> String {
    path.file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "page".to_string())
}
