pub mod viewer;

pub use viewer::{FlipView, ViewerState, open_path, show_viewer};
