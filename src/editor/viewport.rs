use crate::geometry::Point;

use super::mapper::CoordinateMapper;

pub const DEFAULT_MIN_SCALE: f32 = 1.0;
pub const DEFAULT_MAX_SCALE: f32 = 3.5;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScaleBounds {
    pub min: f32,
    pub max: f32,
}

impl Default for ScaleBounds {
    fn default() -> Self {
        Self {
            min: DEFAULT_MIN_SCALE,
            max: DEFAULT_MAX_SCALE,
        }
    }
}

impl ScaleBounds {
    /// Builds bounds, swapping reversed limits and rejecting non-positive ones.
    pub fn new(min: f32, max: f32) -> Self {
        let (min, max) = if min <= max { (min, max) } else { (max, min) };
        if !(min > 0.0) || !max.is_finite() {
            return Self::default();
        }
        Self { min, max }
    }

    pub fn clamp(&self, scale: f32) -> f32 {
        scale.clamp(self.min, self.max)
    }

    pub fn contains(&self, scale: f32) -> bool {
        (self.min..=self.max).contains(&scale)
    }
}

/// Fit, zoom and pan of the source image inside the view.
#[derive(Debug, Clone, PartialEq)]
pub struct Viewport {
    image_width: f32,
    image_height: f32,
    view_width: f32,
    view_height: f32,
    fit_scale: f32,
    fit_width: f32,
    fit_height: f32,
    centre: Point,
    user_scale: f32,
    pan: Point,
    bounds: ScaleBounds,
}

impl Viewport {
    pub fn new(image_width: u32, image_height: u32, bounds: ScaleBounds) -> Self {
        Self {
            image_width: image_width as f32,
            image_height: image_height as f32,
            view_width: 0.0,
            view_height: 0.0,
            fit_scale: 1.0,
            fit_width: 0.0,
            fit_height: 0.0,
            centre: Point::default(),
            user_scale: bounds.clamp(1.0),
            pan: Point::default(),
            bounds,
        }
    }

    pub fn is_laid_out(&self) -> bool {
        self.view_width > 0.0 && self.view_height > 0.0
    }

    /// Recomputes the fit geometry for a new view size.
    pub fn layout(&mut self, view_width: u32, view_height: u32) {
        self.view_width = view_width as f32;
        self.view_height = view_height as f32;
        if !self.is_laid_out() {
            return;
        }

        let nw = self.image_width / self.view_width;
        let nh = self.image_height / self.view_height;
        if nw > nh {
            self.fit_scale = 1.0 / nw;
            self.fit_width = self.view_width;
            self.fit_height = (self.image_height * self.fit_scale).trunc();
        } else {
            self.fit_scale = 1.0 / nh;
            self.fit_width = (self.image_width * self.fit_scale).trunc();
            self.fit_height = self.view_height;
        }
        self.centre = Point::new(
            (self.view_width - self.fit_width) / 2.0,
            (self.view_height - self.fit_height) / 2.0,
        );
    }

    pub fn mapper(&self) -> CoordinateMapper {
        CoordinateMapper::new(self.fit_scale, self.user_scale, self.centre, self.pan)
    }

    pub fn fit_scale(&self) -> f32 {
        self.fit_scale
    }

    pub fn fit_size(&self) -> (f32, f32) {
        (self.fit_width, self.fit_height)
    }

    pub fn view_size(&self) -> (f32, f32) {
        (self.view_width, self.view_height)
    }

    pub fn image_size(&self) -> (f32, f32) {
        (self.image_width, self.image_height)
    }

    pub fn centre(&self) -> Point {
        self.centre
    }

    pub fn user_scale(&self) -> f32 {
        self.user_scale
    }

    pub fn bounds(&self) -> ScaleBounds {
        self.bounds
    }

    pub fn pan(&self) -> Point {
        self.pan
    }

    pub fn view_centre(&self) -> Point {
        Point::new(self.view_width / 2.0, self.view_height / 2.0)
    }

    /// Sets the zoom factor (clamped) and re-clamps the pan.
    pub fn set_user_scale(&mut self, scale: f32) {
        self.user_scale = self.bounds.clamp(scale);
        self.judge_position();
    }

    pub fn set_pan(&mut self, pan: Point) {
        self.pan = pan;
        self.judge_position();
    }

    /// Zooms to `scale` keeping the image point `anchor` under `touch`.
    pub fn zoom_about(&mut self, scale: f32, touch: Point, anchor: Point) {
        self.set_user_scale(scale);
        let pan = self.mapper().pan_for_anchor(touch, anchor);
        self.set_pan(pan);
    }

    pub fn centre_picture(&mut self) {
        self.user_scale = self.bounds.clamp(1.0);
        self.pan = Point::default();
        self.judge_position();
    }

    /// Keeps the image covering the view when larger than it, and inside the
    /// view otherwise. Returns whether the pan had to change.
    pub fn judge_position(&mut self) -> bool {
        if !self.is_laid_out() {
            return false;
        }
        let scaled_image_width = self.image_width * self.fit_scale * self.user_scale;
        let scaled_image_height = self.image_height * self.fit_scale * self.user_scale;
        let changed_x = clamp_axis(
            &mut self.pan.x,
            self.centre.x,
            self.fit_width * self.user_scale,
            scaled_image_width,
            self.view_width,
        );
        let changed_y = clamp_axis(
            &mut self.pan.y,
            self.centre.y,
            self.fit_height * self.user_scale,
            scaled_image_height,
            self.view_height,
        );
        let changed = changed_x || changed_y;
        if changed {
            tracing::trace!(pan_x = self.pan.x, pan_y = self.pan.y, "pan clamped");
        }
        changed
    }

    /// Raster-space rectangle covered by the image, as `(left, top, right, bottom)`.
    pub fn image_rect_in_raster(&self) -> (f32, f32, f32, f32) {
        let offset = self.mapper().raster_offset();
        (
            offset.x,
            offset.y,
            offset.x + self.image_width,
            offset.y + self.image_height,
        )
    }
}

fn clamp_axis(pan: &mut f32, centre: f32, fit_extent: f32, image_extent: f32, view: f32) -> bool {
    let origin = centre + *pan;
    if fit_extent > view {
        if origin > 0.0 {
            *pan = -centre;
            return true;
        }
        if origin + fit_extent < view {
            *pan = view - fit_extent - centre;
            return true;
        }
    } else {
        if origin + image_extent > view {
            *pan = view - image_extent - centre;
            return true;
        }
        if origin < 0.0 {
            *pan = -centre;
            return true;
        }
    }
    false
}
