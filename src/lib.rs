pub mod config;
pub mod editor;
pub mod error;
pub mod geometry;
pub mod input;
pub mod logging;
pub mod render;
pub mod state;
pub mod storage;

pub use editor::{GraffitiBuilder, GraffitiEditor, GraffitiListener};
pub use error::{AppError, AppResult};
