use crate::config::ConfigError;
use crate::editor::GraffitiError;
use crate::input::ScriptError;
use crate::render::RasterError;
use crate::state::StateError;
use crate::storage::StorageError;
use thiserror::Error;

pub type AppResult<T> = std::result::Result<T, AppError>;

#[derive(Debug, Error)]
pub enum AppError {
    #[error(transparent)]
    Editor(#[from] GraffitiError),
    #[error(transparent)]
    State(#[from] StateError),
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Storage(#[from] StorageError),
    #[error(transparent)]
    Script(#[from] ScriptError),
    #[error(transparent)]
    Raster(#[from] RasterError),
    #[error("image error: {0}")]
    Image(#[from] image::ImageError),
}
