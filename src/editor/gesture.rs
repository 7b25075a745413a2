use crate::geometry::Point;

use super::mapper::CoordinateMapper;
use super::tools::{ShapeKind, StrokePath};

/// Offset applied to a release that never left the press point, so a tap
/// still leaves a visible mark.
pub const TAP_NUDGE: f32 = 1.0;

/// Pinch parameters captured when the second contact lands.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Pinch {
    pub old_scale: f32,
    pub old_distance: f32,
    pub midpoint: Point,
    /// Image point under `midpoint` at pinch start.
    pub anchor: Point,
}

impl Pinch {
    /// Zoom factor for the contacts now `distance` apart, or `None` while the
    /// change stays under `touch_slop`.
    pub fn scale_for(&self, distance: f32, touch_slop: f32) -> Option<f32> {
        if self.old_distance <= 0.0 || (distance - self.old_distance).abs() < touch_slop {
            return None;
        }
        Some(self.old_scale * distance / self.old_distance)
    }
}

/// Contact count and touch points of the gesture in flight.
#[derive(Debug, Clone, Default)]
pub struct TouchTracker {
    contacts: u32,
    down: Point,
    last: Point,
    current: Point,
    busy: bool,
    pinch: Option<Pinch>,
}

impl TouchTracker {
    pub fn press(&mut self, touch: Point) {
        *self = Self {
            contacts: 1,
            down: touch,
            last: touch,
            current: touch,
            busy: false,
            pinch: None,
        };
    }

    pub fn step(&mut self, touch: Point) {
        self.last = self.current;
        self.current = touch;
    }

    /// Moves the reference point without producing a delta.
    pub fn rebase(&mut self, touch: Point) {
        self.last = touch;
        self.current = touch;
    }

    pub fn add_contact(&mut self) -> u32 {
        self.contacts += 1;
        self.contacts
    }

    pub fn remove_contact(&mut self) -> u32 {
        self.contacts = self.contacts.saturating_sub(1);
        self.contacts
    }

    pub fn lift(&mut self) {
        self.contacts = 0;
        self.pinch = None;
    }

    pub fn contacts(&self) -> u32 {
        self.contacts
    }

    pub fn down(&self) -> Point {
        self.down
    }

    pub fn last(&self) -> Point {
        self.last
    }

    pub fn current(&self) -> Point {
        self.current
    }

    pub fn delta(&self) -> Point {
        self.current - self.last
    }

    /// True while the contact has not left its press point.
    pub fn is_tap(&self) -> bool {
        self.down == self.current && self.down == self.last
    }

    /// Shifts a tap's release so the stroke is not degenerate.
    pub fn nudge_tap(&mut self) {
        if self.is_tap() {
            self.current = self.current.offset(TAP_NUDGE, TAP_NUDGE);
        }
    }

    pub fn begin_pinch(&mut self, pinch: Pinch) {
        self.pinch = Some(pinch);
        self.busy = true;
    }

    pub fn pinch(&self) -> Option<Pinch> {
        self.pinch
    }

    /// Consumes the guard set by a pinch so the first single-contact move
    /// afterwards only rebases.
    pub fn take_busy(&mut self) -> bool {
        std::mem::take(&mut self.busy)
    }
}

/// Stroke being drawn, kept in image-space for commit and raster-space for
/// the on-screen preview.
#[derive(Debug, Clone, PartialEq)]
pub struct Draft {
    shape: ShapeKind,
    image: StrokePath,
    raster: StrokePath,
}

impl Draft {
    pub fn begin(shape: ShapeKind, mapper: &CoordinateMapper, touch: Point) -> Self {
        Self {
            shape,
            image: StrokePath::begin(mapper.touch_to_image(touch)),
            raster: StrokePath::begin(mapper.touch_to_raster(touch)),
        }
    }

    pub fn shape(&self) -> ShapeKind {
        self.shape
    }

    pub fn raster_path(&self) -> &StrokePath {
        &self.raster
    }

    /// Smooths through `previous` toward the midpoint of `previous` and `current`.
    pub fn extend(&mut self, mapper: &CoordinateMapper, previous: Point, current: Point) {
        if self.shape != ShapeKind::Freehand {
            return;
        }
        let middle = previous.midpoint(current);
        self.image.quad_to(
            mapper.touch_to_image(previous),
            mapper.touch_to_image(middle),
        );
        self.raster.quad_to(
            mapper.touch_to_raster(previous),
            mapper.touch_to_raster(middle),
        );
    }

    /// Closes the image-space path at the release point.
    pub fn finish(mut self, mapper: &CoordinateMapper, previous: Point, release: Point) -> StrokePath {
        self.image.quad_to(
            mapper.touch_to_image(previous),
            mapper.touch_to_image(release),
        );
        self.image
    }
}
