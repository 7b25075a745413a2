mod clone;
mod pen;
mod shape;

use std::rc::Rc;

use serde::Deserialize;

use crate::render::{PaintMode, Raster, TileMode};

pub use crate::geometry::{Color, PathSegment, Point};
pub use clone::CloneAnchor;
pub use pen::{PenOptions, StrokePath, DEFAULT_PEN_SIZE, MIN_PEN_SIZE};
pub use shape::{draw_shape, ArrowHead};

/// Selects how a stroke picks its paint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Pen {
    /// Plain color or pattern.
    #[default]
    Hand,
    /// Samples the source image at an offset from the touch.
    Clone,
    /// Reveals the backing image.
    Eraser,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ShapeKind {
    #[default]
    Freehand,
    Arrow,
    Line,
    HollowCircle,
    FillCircle,
    HollowRect,
    FillRect,
}

impl ShapeKind {
    pub const fn is_filled(self) -> bool {
        matches!(self, Self::FillCircle | Self::FillRect)
    }

    pub const fn paint_mode(self) -> PaintMode {
        if self.is_filled() {
            PaintMode::Fill
        } else {
            PaintMode::Stroke
        }
    }
}

/// Color or pattern a `Hand` stroke is painted with.
#[derive(Debug, Clone)]
pub enum PaintStyle {
    Solid(Color),
    Tiled {
        bitmap: Rc<Raster>,
        tile_x: TileMode,
        tile_y: TileMode,
    },
}

impl Default for PaintStyle {
    fn default() -> Self {
        Self::Solid(Color::RED)
    }
}

impl PaintStyle {
    /// Pattern style mirrored on both axes.
    pub fn tiled(bitmap: Rc<Raster>) -> Self {
        Self::Tiled {
            bitmap,
            tile_x: TileMode::default(),
            tile_y: TileMode::default(),
        }
    }

    pub const fn color(&self) -> Option<Color> {
        match self {
            Self::Solid(color) => Some(*color),
            Self::Tiled { .. } => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_fill_shapes_use_fill_mode() {
        let filled = [ShapeKind::FillCircle, ShapeKind::FillRect];
        for shape in [
            ShapeKind::Freehand,
            ShapeKind::Arrow,
            ShapeKind::Line,
            ShapeKind::HollowCircle,
            ShapeKind::FillCircle,
            ShapeKind::HollowRect,
            ShapeKind::FillRect,
        ] {
            let expected = if filled.contains(&shape) {
                PaintMode::Fill
            } else {
                PaintMode::Stroke
            };
            assert_eq!(shape.paint_mode(), expected, "{shape:?}");
        }
    }

    #[test]
    fn tiled_style_defaults_to_mirror_on_both_axes() {
        let bitmap = Rc::new(Raster::filled(2, 2, Color::WHITE).expect("bitmap"));
        let PaintStyle::Tiled { tile_x, tile_y, .. } = PaintStyle::tiled(bitmap) else {
            panic!("expected tiled style");
        };
        assert_eq!(tile_x, TileMode::Mirror);
        assert_eq!(tile_y, TileMode::Mirror);
        assert_eq!(PaintStyle::default().color(), Some(Color::RED));
    }
}
