use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::Deserialize;
use thiserror::Error;

use crate::editor::{GraffitiEditor, GraffitiError, Pen, ShapeKind, ZoomDirection};
use crate::geometry::{Color, Point};

use super::touch::{TouchAction, TouchEvent};

const ZOOM_TICK_TIMEOUT: Duration = Duration::from_secs(2);

#[derive(Debug, Error)]
pub enum ScriptError {
    #[error("failed to read script {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse script: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("step {step}: invalid color {value:?}")]
    InvalidColor { step: usize, value: String },
    #[error("step {step}: {source}")]
    Editor {
        step: usize,
        #[source]
        source: GraffitiError,
    },
}

pub type ScriptResult<T> = std::result::Result<T, ScriptError>;

/// One scripted host action.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum ScriptStep {
    Touch {
        action: TouchAction,
        at: [f32; 2],
        #[serde(default)]
        second: Option<[f32; 2]>,
    },
    Pen {
        pen: Pen,
    },
    Shape {
        shape: ShapeKind,
    },
    Color {
        color: String,
    },
    Size {
        size: f32,
    },
    Moving {
        enabled: bool,
    },
    Undo,
    Clear,
    Centre,
    /// Holds a zoom control for `ticks` repeat steps.
    Zoom {
        direction: ZoomDirection,
        ticks: usize,
    },
}

/// View size plus the steps replayed against an editor.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct TouchScript {
    pub view: [u32; 2],
    #[serde(default)]
    pub steps: Vec<ScriptStep>,
}

impl TouchScript {
    pub fn from_json(json: &str) -> ScriptResult<Self> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn from_path(path: &Path) -> ScriptResult<Self> {
        let json = std::fs::read_to_string(path).map_err(|source| ScriptError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json(&json)
    }
}

fn point([x, y]: [f32; 2]) -> Point {
    Point::new(x, y)
}

/// Lays the editor out at the script's view size and replays every step.
/// Returns how many touch events the editor accepted.
pub fn run_script(editor: &mut GraffitiEditor, script: &TouchScript) -> ScriptResult<usize> {
    let [width, height] = script.view;
    editor.on_size_changed(width, height);

    let mut handled = 0;
    for (step, entry) in script.steps.iter().enumerate() {
        tracing::debug!(step, ?entry, "script step");
        match entry {
            ScriptStep::Touch { action, at, second } => {
                let event = TouchEvent::new(*action, point(*at), second.map(point));
                if editor.on_touch(&event) {
                    handled += 1;
                }
            }
            ScriptStep::Pen { pen } => editor.set_pen(*pen),
            ScriptStep::Shape { shape } => editor.set_shape(*shape),
            ScriptStep::Color { color } => {
                let parsed = Color::from_hex(color).ok_or_else(|| ScriptError::InvalidColor {
                    step,
                    value: color.clone(),
                })?;
                editor.set_color(parsed);
            }
            ScriptStep::Size { size } => editor.set_pen_size(*size),
            ScriptStep::Moving { enabled } => editor.set_moving(*enabled),
            ScriptStep::Undo => {
                editor
                    .undo()
                    .map_err(|source| ScriptError::Editor { step, source })?;
            }
            ScriptStep::Clear => editor
                .clear()
                .map_err(|source| ScriptError::Editor { step, source })?,
            ScriptStep::Centre => editor.centre_picture(),
            ScriptStep::Zoom { direction, ticks } => {
                let mut repeat = editor
                    .press_zoom(*direction)
                    .map_err(|source| ScriptError::Editor { step, source })?;
                let mut applied = 0;
                while applied < *ticks && repeat.is_active() {
                    let steps = editor.wait_zoom(&mut repeat, ZOOM_TICK_TIMEOUT);
                    if steps == 0 {
                        break;
                    }
                    applied += steps;
                }
                repeat.release();
                tracing::debug!(step, applied, scale = editor.scale(), "zoom released");
            }
        }
    }
    Ok(handled)
}
