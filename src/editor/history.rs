use std::rc::Rc;

use tiny_skia::Transform;

use crate::render::{Canvas, Paint, Primitive, Raster, RasterResult};

use super::command::{Geometry, StrokeCommand};
use super::paint::{DrawTarget, PaintResolver};
use super::tools::draw_shape;

/// Ordered stroke commands and the raster they produce over the base image.
#[derive(Debug)]
pub struct CommandLog {
    base: Rc<Raster>,
    raster: Raster,
    commands: Vec<StrokeCommand>,
}

impl CommandLog {
    pub fn new(base: Rc<Raster>) -> RasterResult<Self> {
        let raster = base.try_copy()?;
        Ok(Self {
            base,
            raster,
            commands: Vec::new(),
        })
    }

    pub fn raster(&self) -> &Raster {
        &self.raster
    }

    pub fn commands(&self) -> &[StrokeCommand] {
        &self.commands
    }

    pub fn len(&self) -> usize {
        self.commands.len()
    }

    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }

    pub fn is_modified(&self) -> bool {
        !self.commands.is_empty()
    }

    /// Records `command` and paints only it onto the live raster.
    pub fn append(&mut self, command: StrokeCommand, resolver: &PaintResolver<'_>) {
        paint_command(
            &mut self.raster.canvas(),
            &command,
            resolver,
            DrawTarget::Raster,
        );
        self.commands.push(command);
        tracing::debug!(
            commands = self.commands.len(),
            "stroke command committed"
        );
    }

    /// Drops the newest command and rebuilds the raster from the base image.
    /// Returns `false` when there was nothing to undo.
    pub fn undo(&mut self, resolver: &PaintResolver<'_>) -> RasterResult<bool> {
        if self.commands.is_empty() {
            return Ok(false);
        }
        let mut fresh = self.base.try_copy()?;
        self.commands.pop();
        replay_onto(&mut fresh, &self.commands, resolver);
        self.raster = fresh;
        tracing::debug!(commands = self.commands.len(), "undo replayed log");
        Ok(true)
    }

    pub fn clear(&mut self) -> RasterResult<()> {
        let fresh = self.base.try_copy()?;
        self.commands.clear();
        self.raster = fresh;
        tracing::debug!("command log cleared");
        Ok(())
    }

    /// Rebuilds the current log onto a fresh copy of the base image.
    pub fn replay(&self, resolver: &PaintResolver<'_>) -> RasterResult<Raster> {
        let mut fresh = self.base.try_copy()?;
        replay_onto(&mut fresh, &self.commands, resolver);
        Ok(fresh)
    }
}

fn replay_onto(raster: &mut Raster, commands: &[StrokeCommand], resolver: &PaintResolver<'_>) {
    let mut canvas = raster.canvas();
    for command in commands {
        paint_command(&mut canvas, command, resolver, DrawTarget::Raster);
    }
}

/// Paints one committed command in image coordinates of `target`.
pub fn paint_command(
    canvas: &mut impl Canvas,
    command: &StrokeCommand,
    resolver: &PaintResolver<'_>,
    target: DrawTarget,
) {
    let source = resolver.resolve(
        command.pen(),
        target,
        command.source_matrix().unwrap_or(Transform::identity()),
        command.style(),
    );
    let paint = Paint::new(
        source,
        command.shape_kind().paint_mode(),
        command.stroke_width(),
    );
    match command.geometry() {
        Geometry::Path(path) => canvas.draw(&Primitive::Path(path.segments()), &paint),
        Geometry::Anchors { start, end } => {
            draw_shape(canvas, command.shape_kind(), *start, *end, &paint)
        }
    }
}
