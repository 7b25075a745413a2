use super::{PaintStyle, PathSegment, Pen, Point, ShapeKind};

pub const MIN_PEN_SIZE: f32 = 1.0;
pub const DEFAULT_PEN_SIZE: f32 = 30.0;

/// Current pen configuration applied to new strokes.
#[derive(Debug, Clone)]
pub struct PenOptions {
    pub pen: Pen,
    pub shape: ShapeKind,
    pub size: f32,
    pub style: PaintStyle,
}

impl Default for PenOptions {
    fn default() -> Self {
        Self {
            pen: Pen::default(),
            shape: ShapeKind::default(),
            size: DEFAULT_PEN_SIZE,
            style: PaintStyle::default(),
        }
    }
}

impl PenOptions {
    pub fn set_size(&mut self, size: f32) {
        self.size = if size.is_finite() {
            size.max(MIN_PEN_SIZE)
        } else {
            DEFAULT_PEN_SIZE
        };
    }

    pub fn set_style(&mut self, style: PaintStyle) {
        self.style = style;
    }
}

/// Smoothed freehand path: a move followed by quadratic segments.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct StrokePath {
    segments: Vec<PathSegment>,
}

impl StrokePath {
    pub fn begin(start: Point) -> Self {
        Self {
            segments: vec![PathSegment::MoveTo(start)],
        }
    }

    pub fn quad_to(&mut self, control: Point, end: Point) {
        self.segments.push(PathSegment::QuadTo { control, end });
    }

    pub fn segments(&self) -> &[PathSegment] {
        &self.segments
    }

    pub fn start(&self) -> Option<Point> {
        self.segments.first().map(|segment| segment.end())
    }

    pub fn end(&self) -> Option<Point> {
        self.segments.last().map(|segment| segment.end())
    }

    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }

    /// Copy of the path with one more quadratic segment.
    pub fn extended(&self, control: Point, end: Point) -> Self {
        let mut path = self.clone();
        path.quad_to(control, end);
        path
    }
}
