use crate::geometry::Point;

/// Converts between touch-space, raster-space and image-space for one
/// viewport snapshot.
///
/// Touch-space is raw view coordinates. Image-space is the source image's own
/// pixel grid. Raster-space is touch-space divided by the effective scale,
/// which is the coordinate system of a canvas scaled for on-screen drawing.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CoordinateMapper {
    fit_scale: f32,
    user_scale: f32,
    centre: Point,
    pan: Point,
}

impl CoordinateMapper {
    pub const fn new(fit_scale: f32, user_scale: f32, centre: Point, pan: Point) -> Self {
        Self {
            fit_scale,
            user_scale,
            centre,
            pan,
        }
    }

    pub fn effective_scale(&self) -> f32 {
        self.fit_scale * self.user_scale
    }

    pub fn translation(&self) -> Point {
        self.centre + self.pan
    }

    pub fn touch_to_image(&self, touch: Point) -> Point {
        (touch - self.translation()).scale(1.0 / self.effective_scale())
    }

    pub fn touch_to_raster(&self, touch: Point) -> Point {
        touch.scale(1.0 / self.effective_scale())
    }

    pub fn image_to_touch(&self, image: Point) -> Point {
        image.scale(self.effective_scale()) + self.translation()
    }

    pub fn image_to_raster(&self, image: Point) -> Point {
        image + self.raster_offset()
    }

    /// Pan that places `image` under `touch` at the current scale.
    pub fn pan_for_anchor(&self, touch: Point, image: Point) -> Point {
        touch - image.scale(self.effective_scale()) - self.centre
    }

    /// Raster-space position of the image origin.
    pub fn raster_offset(&self) -> Point {
        self.translation().scale(1.0 / self.effective_scale())
    }
}
