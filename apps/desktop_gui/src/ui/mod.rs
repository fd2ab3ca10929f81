//! UI layer for desktop GUI: classification form and flowchart canvas.

pub mod app;
pub mod canvas;

pub use app::ClassifierApp;
