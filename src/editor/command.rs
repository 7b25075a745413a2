use tiny_skia::Transform;

use super::tools::{PaintStyle, Pen, Point, ShapeKind, StrokePath};

/// Image-space geometry of a committed stroke.
#[derive(Debug, Clone, PartialEq)]
pub enum Geometry {
    Path(StrokePath),
    Anchors { start: Point, end: Point },
}

/// One completed drawing action. Immutable once built.
#[derive(Debug, Clone)]
pub struct StrokeCommand {
    pen: Pen,
    shape: ShapeKind,
    stroke_width: f32,
    style: PaintStyle,
    geometry: Geometry,
    source_matrix: Option<Transform>,
}

impl StrokeCommand {
    /// Freehand stroke. `clone_matrix` is kept only for the clone pen.
    pub fn freehand(
        pen: Pen,
        stroke_width: f32,
        style: PaintStyle,
        path: StrokePath,
        clone_matrix: Transform,
    ) -> Self {
        Self {
            pen,
            shape: ShapeKind::Freehand,
            stroke_width,
            style,
            geometry: Geometry::Path(path),
            source_matrix: (pen == Pen::Clone).then_some(clone_matrix),
        }
    }

    /// Two-anchor shape. A freehand kind becomes a single-segment path.
    pub fn shape(
        pen: Pen,
        shape: ShapeKind,
        stroke_width: f32,
        style: PaintStyle,
        start: Point,
        end: Point,
        clone_matrix: Transform,
    ) -> Self {
        if shape == ShapeKind::Freehand {
            let mut path = StrokePath::begin(start);
            path.quad_to(start, end);
            return Self::freehand(pen, stroke_width, style, path, clone_matrix);
        }
        Self {
            pen,
            shape,
            stroke_width,
            style,
            geometry: Geometry::Anchors { start, end },
            source_matrix: (pen == Pen::Clone).then_some(clone_matrix),
        }
    }

    pub fn pen(&self) -> Pen {
        self.pen
    }

    pub fn shape_kind(&self) -> ShapeKind {
        self.shape
    }

    pub fn stroke_width(&self) -> f32 {
        self.stroke_width
    }

    pub fn style(&self) -> &PaintStyle {
        &self.style
    }

    pub fn geometry(&self) -> &Geometry {
        &self.geometry
    }

    pub fn source_matrix(&self) -> Option<Transform> {
        self.source_matrix
    }

    /// First and last image-space points of the geometry.
    pub fn span(&self) -> Option<(Point, Point)> {
        match &self.geometry {
            Geometry::Path(path) => Some((path.start()?, path.end()?)),
            Geometry::Anchors { start, end } => Some((*start, *end)),
        }
    }
}
