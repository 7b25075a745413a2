use tiny_skia::Transform;

use crate::render::{Canvas, Paint, Primitive};

use super::{Color, Point};

const RING_OUTER: Color = Color::from_argb(0xaa66_6666);
const RING_INNER: Color = Color::from_argb(0xaaff_ffff);
const DISC_IDLE: Color = Color::from_argb(0x44ff_0000);
const DISC_CLONING: Color = Color::from_argb(0x4400_0088);

/// Image-space sample point the clone pen reads from.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CloneAnchor {
    source: Point,
    source_start: Point,
    touch_start: Point,
    relocating: bool,
    cloning: bool,
}

impl CloneAnchor {
    pub const fn new(at: Point) -> Self {
        Self {
            source: at,
            source_start: at,
            touch_start: at,
            relocating: false,
            cloning: false,
        }
    }

    pub fn position(&self) -> Point {
        self.source
    }

    pub fn is_relocating(&self) -> bool {
        self.relocating
    }

    pub fn is_cloning(&self) -> bool {
        self.cloning
    }

    pub fn contains(&self, point: Point, pen_size: f32) -> bool {
        self.source.distance_squared(point) <= pen_size * pen_size
    }

    /// Starts dragging the anchor itself; the next stroke re-pairs it.
    pub fn begin_relocate(&mut self) {
        self.relocating = true;
        self.cloning = false;
    }

    pub fn relocate_to(&mut self, point: Point) {
        self.source = point;
    }

    pub fn finish_relocate(&mut self, point: Point) {
        self.source = point;
        self.relocating = false;
    }

    /// Pairs the anchor with the stroke's first touch unless a pairing exists.
    pub fn begin_stroke(&mut self, touch: Point) {
        self.relocating = false;
        if !self.cloning {
            self.source_start = self.source;
            self.touch_start = touch;
        }
        self.cloning = true;
    }

    pub fn follow(&mut self, touch: Point) {
        self.source = self.source_start + touch - self.touch_start;
    }

    /// Maps source-image samples onto the touched area.
    pub fn source_matrix(&self) -> Transform {
        let offset = self.touch_start - self.source_start;
        Transform::from_translate(offset.x, offset.y)
    }

    /// Paints the indicator at `centre` (raster-space) for a pen of `size`.
    pub fn draw_indicator(&self, canvas: &mut impl Canvas, centre: Point, size: f32) {
        let rings = [
            (RING_OUTER, size / 4.0, size / 2.0 + size / 8.0),
            (RING_INNER, size / 16.0, size / 2.0 + size / 32.0),
        ];
        for (color, width, radius) in rings {
            canvas.draw(
                &Primitive::Circle {
                    center: centre,
                    radius,
                },
                &Paint::solid_stroke(color, width),
            );
        }
        let disc = if self.cloning { DISC_CLONING } else { DISC_IDLE };
        canvas.draw(
            &Primitive::Circle {
                center: centre,
                radius: size / 2.0,
            },
            &Paint::solid_fill(disc),
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::render::Raster;

    #[test]
    fn first_stroke_pairs_anchor_with_touch() {
        let mut anchor = CloneAnchor::new(Point::new(100.0, 100.0));
        anchor.begin_stroke(Point::new(300.0, 150.0));
        assert!(anchor.is_cloning());

        anchor.follow(Point::new(310.0, 160.0));
        assert_eq!(anchor.position(), Point::new(110.0, 110.0));
        let (x, y) = (anchor.source_matrix().tx, anchor.source_matrix().ty);
        assert_eq!((x, y), (200.0, 50.0));
    }

    #[test]
    fn later_strokes_keep_the_original_pairing() {
        let mut anchor = CloneAnchor::new(Point::new(100.0, 100.0));
        anchor.begin_stroke(Point::new(300.0, 150.0));
        anchor.follow(Point::new(320.0, 150.0));
        anchor.begin_stroke(Point::new(400.0, 400.0));
        anchor.follow(Point::new(400.0, 400.0));
        assert_eq!(anchor.position(), Point::new(200.0, 350.0));
        assert_eq!(anchor.source_matrix().tx, 200.0);
    }

    #[test]
    fn relocating_resets_the_pairing() {
        let mut anchor = CloneAnchor::new(Point::new(100.0, 100.0));
        anchor.begin_stroke(Point::new(300.0, 150.0));
        assert!(anchor.contains(Point::new(105.0, 100.0), 10.0));
        assert!(!anchor.contains(Point::new(111.0, 100.0), 10.0));

        anchor.begin_relocate();
        assert!(anchor.is_relocating());
        assert!(!anchor.is_cloning());
        anchor.relocate_to(Point::new(20.0, 20.0));
        anchor.finish_relocate(Point::new(30.0, 40.0));
        assert!(!anchor.is_relocating());

        anchor.begin_stroke(Point::new(50.0, 50.0));
        assert_eq!(anchor.source_matrix().tx, 20.0);
        assert_eq!(anchor.source_matrix().ty, 10.0);
    }

    #[test]
    fn indicator_disc_color_tracks_cloning() {
        let mut raster = Raster::filled(64, 64, Color::WHITE).expect("raster");
        let mut anchor = CloneAnchor::new(Point::new(32.0, 32.0));
        anchor.draw_indicator(&mut raster.canvas(), Point::new(32.0, 32.0), 32.0);
        let idle = raster.pixel(32, 32).expect("pixel");
        assert!(idle.r > idle.b);

        let mut raster = Raster::filled(64, 64, Color::WHITE).expect("raster");
        anchor.begin_stroke(Point::new(0.0, 0.0));
        anchor.draw_indicator(&mut raster.canvas(), Point::new(32.0, 32.0), 32.0);
        let cloning = raster.pixel(32, 32).expect("pixel");
        assert!(cloning.b > cloning.r);
    }
}
