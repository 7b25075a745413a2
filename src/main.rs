use std::cell::RefCell;
use std::path::{Path, PathBuf};
use std::rc::Rc;

use anyhow::{bail, Context, Result};

use graffiti::config::GraffitiParams;
use graffiti::editor::{ErrorReason, GraffitiEditor, GraffitiListener};
use graffiti::input::{run_script, TouchScript};
use graffiti::render::Raster;
use graffiti::storage::{OutputStorage, SavedOutput};

const USAGE: &str = "usage: graffiti <config.json> [script.json]";

/// Writes saved artwork through [`OutputStorage`] and keeps the outcome.
struct SaveToDisk {
    storage: OutputStorage,
    outcome: Rc<RefCell<Option<Result<SavedOutput>>>>,
}

impl GraffitiListener for SaveToDisk {
    fn on_ready(&mut self) {
        tracing::debug!("editor ready");
    }

    fn on_saved(&mut self, artwork: &Raster, backing: Option<&Raster>) {
        let result = self
            .storage
            .save(artwork, backing)
            .context("failed to write graffiti output");
        *self.outcome.borrow_mut() = Some(result);
    }

    fn on_error(&mut self, reason: ErrorReason, message: &str) {
        tracing::error!(?reason, message, "graffiti editor error");
    }
}

fn load_raster(path: &Path) -> Result<Raster> {
    let image = image::open(path)
        .with_context(|| format!("failed to open image {}", path.display()))?
        .to_rgba8();
    Raster::from_rgba_image(&image).with_context(|| format!("unusable image {}", path.display()))
}

fn main() -> Result<()> {
    graffiti::logging::init();

    let mut args = std::env::args_os().skip(1);
    let Some(config_path) = args.next().map(PathBuf::from) else {
        bail!(USAGE);
    };
    let script_path = args.next().map(PathBuf::from);

    let params = GraffitiParams::load(Some(&config_path));
    let Some(image_path) = params.image_path.as_deref() else {
        bail!("{} does not name an image_path", config_path.display());
    };
    let storage = OutputStorage::from_params(params.save_path.as_deref(), params.save_path_is_dir)
        .context("config does not name a usable save_path")?;

    let outcome = Rc::new(RefCell::new(None));
    let mut builder = GraffitiEditor::builder()
        .image(load_raster(image_path)?)
        .settings(params.editor_settings())
        .listener(SaveToDisk {
            storage,
            outcome: Rc::clone(&outcome),
        });
    if let Some(eraser_path) = params.eraser_path.as_deref() {
        builder = builder.backing_image(load_raster(eraser_path)?);
    }
    let mut editor = builder.build().context("failed to create editor")?;

    match script_path {
        Some(path) => {
            let script = TouchScript::from_path(&path)?;
            let handled = run_script(&mut editor, &script)
                .with_context(|| format!("script {} failed", path.display()))?;
            tracing::info!(handled, strokes = editor.commands().len(), "script replayed");
        }
        None => {
            let source = editor.source_image();
            let (width, height) = (source.width(), source.height());
            editor.on_size_changed(width, height);
        }
    }

    editor.save();
    let saved = outcome
        .borrow_mut()
        .take()
        .context("editor did not hand over its artwork")??;
    println!("{}", saved.artwork.display());
    if let Some(backing) = saved.backing {
        println!("{}", backing.display());
    }
    Ok(())
}
