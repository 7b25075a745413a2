use crate::geometry::{Color, Point};
use crate::render::{Canvas, Paint, Primitive};

const BORDER_COLOR: Color = Color::from_argb(0xaaff_ffff);
const BORDER_WIDTH: f32 = 10.0;
pub const DEFAULT_AMPLIFIER_SCALE: f32 = 2.5;

/// Circular magnifier showing the scene around the current touch.
#[derive(Debug, Clone, PartialEq)]
pub struct Amplifier {
    scale: f32,
    radius: f32,
    horizon_x: f32,
    view_height: f32,
}

impl Amplifier {
    pub fn new(scale: f32) -> Self {
        Self {
            scale,
            radius: 0.0,
            horizon_x: 0.0,
            view_height: 0.0,
        }
    }

    pub fn layout(&mut self, view_width: f32, view_height: f32) {
        let short_side = view_width.min(view_height);
        self.radius = short_side / 4.0;
        self.horizon_x = short_side / 2.0 - self.radius;
        self.view_height = view_height;
    }

    pub fn scale(&self) -> f32 {
        self.scale
    }

    /// Values `<= 0` disable the magnifier.
    pub fn set_scale(&mut self, scale: f32) {
        self.scale = scale;
    }

    pub fn is_enabled(&self) -> bool {
        self.scale > 0.0 && self.radius > 0.0
    }

    pub fn radius(&self) -> f32 {
        self.radius
    }

    /// Top-left corner of the lens; it moves to the bottom when the touch is
    /// under its top position.
    pub fn origin(&self, touch: Point) -> Point {
        let diameter = self.radius * 2.0;
        if touch.y <= diameter {
            Point::new(self.horizon_x, self.view_height - diameter)
        } else {
            Point::new(self.horizon_x, 0.0)
        }
    }

    /// Draws the lens, rendering the scene with `draw_scene` magnified around `touch`.
    pub fn draw<C: Canvas>(
        &self,
        canvas: &mut C,
        touch: Point,
        user_scale: f32,
        draw_scene: impl FnOnce(&mut C),
    ) {
        if !self.is_enabled() || user_scale <= 0.0 {
            return;
        }
        let origin = self.origin(touch);
        let centre = Point::new(self.radius, self.radius);

        canvas.save();
        canvas.translate(origin.x, origin.y);
        canvas.clip_circle(centre, self.radius);
        canvas.fill_color(Color::BLACK);

        canvas.save();
        let scale = self.scale / user_scale;
        canvas.scale(scale, scale);
        canvas.translate(
            -touch.x + self.radius / scale,
            -touch.y + self.radius / scale,
        );
        draw_scene(canvas);
        canvas.restore();

        canvas.draw(
            &Primitive::Circle {
                center: centre,
                radius: self.radius,
            },
            &Paint::solid_stroke(BORDER_COLOR, BORDER_WIDTH),
        );
        canvas.restore();
    }
}
