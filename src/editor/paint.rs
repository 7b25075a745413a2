use tiny_skia::Transform;

use crate::geometry::Point;
use crate::render::{PaintSource, Raster, TileMode};

use super::tools::{PaintStyle, Pen};

/// Where a stroke is being painted.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum DrawTarget {
    /// The off-screen raster, in image coordinates.
    Raster,
    /// A scaled screen canvas, in raster-space with the image origin at `offset`.
    Screen { offset: Point },
}

impl DrawTarget {
    pub fn base_matrix(self) -> Transform {
        match self {
            Self::Raster => Transform::identity(),
            Self::Screen { offset } => Transform::from_translate(offset.x, offset.y),
        }
    }
}

/// Turns a logical pen into a concrete paint source.
#[derive(Debug, Clone, Copy)]
pub struct PaintResolver<'a> {
    source: &'a Raster,
    backing: Option<&'a Raster>,
    eraser_resizeable: bool,
}

impl<'a> PaintResolver<'a> {
    pub fn new(source: &'a Raster, backing: Option<&'a Raster>, eraser_resizeable: bool) -> Self {
        Self {
            source,
            backing,
            eraser_resizeable,
        }
    }

    /// `source_matrix` is only read for the clone pen.
    pub fn resolve<'s>(
        &self,
        pen: Pen,
        target: DrawTarget,
        source_matrix: Transform,
        style: &'s PaintStyle,
    ) -> PaintSource<'s>
    where
        'a: 's,
    {
        let base = target.base_matrix();
        match pen {
            Pen::Hand => match style {
                PaintStyle::Solid(color) => PaintSource::Solid(*color),
                PaintStyle::Tiled {
                    bitmap,
                    tile_x,
                    tile_y,
                } => PaintSource::Tiled {
                    raster: bitmap,
                    tile_x: *tile_x,
                    tile_y: *tile_y,
                    matrix: base,
                },
            },
            Pen::Clone => repeat(self.source, base.pre_concat(source_matrix)),
            Pen::Eraser => match self.backing {
                Some(backing) => repeat(backing, self.eraser_matrix(base, backing)),
                None => repeat(self.source, base),
            },
        }
    }

    fn eraser_matrix(&self, base: Transform, backing: &Raster) -> Transform {
        if !self.eraser_resizeable {
            return base;
        }
        base.pre_scale(
            self.source.width() as f32 / backing.width() as f32,
            self.source.height() as f32 / backing.height() as f32,
        )
    }
}

fn repeat(raster: &Raster, matrix: Transform) -> PaintSource<'_> {
    PaintSource::Tiled {
        raster,
        tile_x: TileMode::Repeat,
        tile_y: TileMode::Repeat,
        matrix,
    }
}
