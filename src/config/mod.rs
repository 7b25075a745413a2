use std::io;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::Deserialize;
use thiserror::Error;

use crate::editor::{EditorSettings, ScaleBounds, DEFAULT_AMPLIFIER_SCALE, DEFAULT_PEN_SIZE};
use crate::geometry::Color;

const APP_DIR: &str = "graffiti";
const APP_CONFIG_FILE: &str = "config.json";
const DEFAULT_PEN_COLOR: &str = "#FF0000";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("missing HOME environment variable")]
    MissingHomeDirectory,
    #[error("failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("failed to parse {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

/// Editor parameters read from `config.json`.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct GraffitiParams {
    pub image_path: Option<PathBuf>,
    pub save_path: Option<PathBuf>,
    pub save_path_is_dir: bool,
    pub eraser_path: Option<PathBuf>,
    pub eraser_resizeable: bool,
    pub drawable_outside: bool,
    pub amplifier_scale: f32,
    pub pen_size: f32,
    pub pen_color: String,
    pub min_scale: f32,
    pub max_scale: f32,
    pub touch_slop: f32,
    pub zoom_repeat_interval_ms: u64,
}

impl Default for GraffitiParams {
    fn default() -> Self {
        let bounds = ScaleBounds::default();
        let settings = EditorSettings::default();
        Self {
            image_path: None,
            save_path: None,
            save_path_is_dir: false,
            eraser_path: None,
            eraser_resizeable: true,
            drawable_outside: false,
            amplifier_scale: DEFAULT_AMPLIFIER_SCALE,
            pen_size: DEFAULT_PEN_SIZE,
            pen_color: DEFAULT_PEN_COLOR.to_string(),
            min_scale: bounds.min,
            max_scale: bounds.max,
            touch_slop: settings.touch_slop,
            zoom_repeat_interval_ms: settings.zoom_repeat_interval.as_millis() as u64,
        }
    }
}

impl GraffitiParams {
    /// Reads `path`, resolving relative file paths against its directory.
    pub fn from_path(path: &Path) -> ConfigResult<Self> {
        let contents = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let params: Self = serde_json::from_str(&contents).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
        Ok(match path.parent() {
            Some(base) => params.resolved_against(base),
            None => params,
        })
    }

    /// Loads `path`, or the user config file when `None`. Missing, unreadable
    /// or invalid files yield the defaults.
    pub fn load(path: Option<&Path>) -> Self {
        let path = match path {
            Some(path) => path.to_path_buf(),
            None => {
                let (xdg_config_home, home) = config_env_dirs();
                match app_config_path(
                    APP_DIR,
                    APP_CONFIG_FILE,
                    xdg_config_home.as_deref(),
                    home.as_deref(),
                ) {
                    Ok(path) => path,
                    Err(err) => {
                        tracing::warn!(%err, "no config directory; using defaults");
                        return Self::default();
                    }
                }
            }
        };
        if !path.exists() {
            tracing::info!(path = %path.display(), "config file not found; using defaults");
            return Self::default();
        }
        Self::from_path(&path).unwrap_or_else(|err| {
            tracing::warn!(%err, "invalid config; using defaults");
            Self::default()
        })
    }

    fn resolved_against(mut self, base: &Path) -> Self {
        for path in [&mut self.image_path, &mut self.save_path, &mut self.eraser_path]
            .into_iter()
            .flatten()
        {
            if path.is_relative() {
                *path = base.join(&*path);
            }
        }
        self
    }

    pub fn pen_color(&self) -> Color {
        Color::from_hex(&self.pen_color).unwrap_or_else(|| {
            tracing::warn!(value = %self.pen_color, "invalid pen color; using red");
            Color::RED
        })
    }

    pub fn editor_settings(&self) -> EditorSettings {
        EditorSettings {
            pen_size: self.pen_size,
            pen_color: self.pen_color(),
            drawable_outside: self.drawable_outside,
            eraser_resizeable: self.eraser_resizeable,
            amplifier_scale: self.amplifier_scale,
            scale_bounds: ScaleBounds::new(self.min_scale, self.max_scale),
            touch_slop: self.touch_slop.max(0.0),
            zoom_repeat_interval: Duration::from_millis(self.zoom_repeat_interval_ms.max(1)),
        }
    }
}

pub(crate) fn config_env_dirs() -> (Option<PathBuf>, Option<PathBuf>) {
    (
        std::env::var_os("XDG_CONFIG_HOME").map(PathBuf::from),
        std::env::var_os("HOME").map(PathBuf::from),
    )
}

pub(crate) fn app_config_path(
    app_dir: &str,
    file_name: &str,
    xdg_config_home: Option<&Path>,
    home: Option<&Path>,
) -> ConfigResult<PathBuf> {
    let mut path = config_root(xdg_config_home, home)?;
    path.push(app_dir);
    path.push(file_name);
    Ok(path)
}

fn config_root(xdg_config_home: Option<&Path>, home: Option<&Path>) -> ConfigResult<PathBuf> {
    if let Some(xdg) = xdg_config_home.filter(|path| !path.as_os_str().is_empty()) {
        return Ok(xdg.to_path_buf());
    }

    let home = home.ok_or(ConfigError::MissingHomeDirectory)?;
    Ok(home.join(".config"))
}
