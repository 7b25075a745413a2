use crate::render::{Canvas, Paint, PaintMode, Primitive};

use super::{Point, ShapeKind};

/// Shaft end and head triangle of an arrow from `start` to `end`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ArrowHead {
    pub base: Point,
    pub tip: Point,
    pub left: Point,
    pub right: Point,
}

impl ArrowHead {
    pub fn new(start: Point, end: Point, stroke_width: f32) -> Option<Self> {
        let length = start.distance(end);
        if length <= f32::EPSILON {
            return None;
        }
        let ux = (end.x - start.x) / length;
        let uy = (end.y - start.y) / length;
        let (px, py) = (-uy, ux);

        let width = stroke_width.max(1.0);
        let head_length = (width * 3.5).max(width * 2.0).min(length * 0.7);
        let half_width = (width * 1.8).max(width * 0.8);

        let base = Point::new(end.x - ux * head_length, end.y - uy * head_length);
        Some(Self {
            base,
            tip: end,
            left: base.offset(px * half_width, py * half_width),
            right: base.offset(-px * half_width, -py * half_width),
        })
    }
}

/// Draws a two-anchor shape. Freehand strokes carry a path and never get here.
pub fn draw_shape(
    canvas: &mut impl Canvas,
    shape: ShapeKind,
    start: Point,
    end: Point,
    paint: &Paint<'_>,
) {
    match shape {
        ShapeKind::Arrow => {
            let Some(head) = ArrowHead::new(start, end, paint.stroke_width) else {
                return;
            };
            canvas.draw(
                &Primitive::Line {
                    start,
                    end: head.base,
                },
                &paint.with_mode(PaintMode::Stroke),
            );
            canvas.draw(
                &Primitive::Triangle([head.tip, head.left, head.right]),
                &paint.with_mode(PaintMode::Fill),
            );
        }
        ShapeKind::Line => canvas.draw(&Primitive::Line { start, end }, paint),
        ShapeKind::HollowCircle | ShapeKind::FillCircle => canvas.draw(
            &Primitive::Circle {
                center: start,
                radius: start.distance(end),
            },
            paint,
        ),
        ShapeKind::HollowRect | ShapeKind::FillRect => {
            canvas.draw(&Primitive::Rect { start, end }, paint)
        }
        ShapeKind::Freehand => unreachable!("freehand strokes are drawn from their path"),
    }
}
