//! Touch-driven annotation engine: viewport, gestures, stroke log and screen rendering.

pub mod amplifier;
pub mod command;
pub mod gesture;
pub mod history;
pub mod mapper;
pub mod paint;
pub mod tools;
pub mod viewport;
pub mod zoom;

use std::fmt;
use std::rc::Rc;
use std::time::Duration;

use thiserror::Error;

use crate::geometry::{Color, Point};
use crate::input::{TouchAction, TouchEvent};
use crate::render::{Canvas, Paint, Primitive, Raster, RasterError, TileMode};
use crate::state::{GestureEvent, GestureMachine, GestureState};

pub use amplifier::{Amplifier, DEFAULT_AMPLIFIER_SCALE};
pub use command::{Geometry, StrokeCommand};
pub use gesture::{Draft, Pinch, TouchTracker, TAP_NUDGE};
pub use history::{paint_command, CommandLog};
pub use mapper::CoordinateMapper;
pub use paint::{DrawTarget, PaintResolver};
pub use tools::{
    draw_shape, CloneAnchor, PaintStyle, Pen, PenOptions, ShapeKind, StrokePath, DEFAULT_PEN_SIZE,
};
pub use viewport::{ScaleBounds, Viewport};
pub use zoom::{ZoomDirection, ZoomRepeat, ZOOM_REPEAT_INTERVAL, ZOOM_STEP};

pub const DEFAULT_TOUCH_SLOP: f32 = 8.0;

pub type GraffitiResult<T> = std::result::Result<T, GraffitiError>;

#[derive(Debug, Error)]
pub enum GraffitiError {
    #[error("a graffiti listener is required")]
    MissingListener,
    #[error("a source image is required")]
    MissingSourceImage,
    #[error("the view has not been laid out yet")]
    NotReady,
    #[error("{operation} failed: {source}")]
    Raster {
        operation: &'static str,
        #[source]
        source: RasterError,
    },
}

/// Tag passed to [`GraffitiListener::on_error`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorReason {
    Undo,
    Clear,
}

impl ErrorReason {
    const fn operation(self) -> &'static str {
        match self {
            Self::Undo => "undo",
            Self::Clear => "clear",
        }
    }
}

/// Host callbacks.
pub trait GraffitiListener {
    /// First layout finished; touches are accepted from now on.
    fn on_ready(&mut self) {}

    /// Hands over the composed artwork and the backing image, if any.
    fn on_saved(&mut self, artwork: &Raster, backing: Option<&Raster>);

    fn on_error(&mut self, reason: ErrorReason, message: &str);
}

/// Settings consumed by the editor at construction.
#[derive(Debug, Clone, PartialEq)]
pub struct EditorSettings {
    pub pen_size: f32,
    pub pen_color: Color,
    pub drawable_outside: bool,
    pub eraser_resizeable: bool,
    pub amplifier_scale: f32,
    pub scale_bounds: ScaleBounds,
    pub touch_slop: f32,
    pub zoom_repeat_interval: Duration,
}

impl Default for EditorSettings {
    fn default() -> Self {
        Self {
            pen_size: DEFAULT_PEN_SIZE,
            pen_color: Color::RED,
            drawable_outside: false,
            eraser_resizeable: true,
            amplifier_scale: DEFAULT_AMPLIFIER_SCALE,
            scale_bounds: ScaleBounds::default(),
            touch_slop: DEFAULT_TOUCH_SLOP,
            zoom_repeat_interval: ZOOM_REPEAT_INTERVAL,
        }
    }
}

#[derive(Default)]
pub struct GraffitiBuilder {
    image: Option<Raster>,
    backing: Option<Raster>,
    listener: Option<Box<dyn GraffitiListener>>,
    settings: EditorSettings,
}

impl GraffitiBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn image(mut self, image: Raster) -> Self {
        self.image = Some(image);
        self
    }

    /// Image the eraser reveals. Without one the eraser restores the source image.
    pub fn backing_image(mut self, backing: Raster) -> Self {
        self.backing = Some(backing);
        self
    }

    pub fn listener(mut self, listener: impl GraffitiListener + 'static) -> Self {
        self.listener = Some(Box::new(listener));
        self
    }

    pub fn settings(mut self, settings: EditorSettings) -> Self {
        self.settings = settings;
        self
    }

    pub fn build(self) -> GraffitiResult<GraffitiEditor> {
        let listener = self.listener.ok_or(GraffitiError::MissingListener)?;
        let image = Rc::new(self.image.ok_or(GraffitiError::MissingSourceImage)?);
        let log = CommandLog::new(Rc::clone(&image)).map_err(|source| GraffitiError::Raster {
            operation: "initial raster copy",
            source,
        })?;

        let settings = self.settings;
        let mut pen = PenOptions::default();
        pen.set_size(settings.pen_size);
        pen.set_style(PaintStyle::Solid(settings.pen_color));

        tracing::info!(
            width = image.width(),
            height = image.height(),
            backing = self.backing.is_some(),
            "graffiti editor created"
        );

        Ok(GraffitiEditor {
            viewport: Viewport::new(image.width(), image.height(), settings.scale_bounds),
            amplifier: Amplifier::new(settings.amplifier_scale),
            backing: self.backing.map(Rc::new),
            image,
            listener,
            log,
            pen,
            anchor: CloneAnchor::new(Point::default()),
            gesture: GestureMachine::new(),
            tracker: TouchTracker::default(),
            draft: None,
            moving: false,
            just_draw_original: false,
            ready: false,
            redraw_requested: true,
            settings,
        })
    }
}

pub struct GraffitiEditor {
    listener: Box<dyn GraffitiListener>,
    image: Rc<Raster>,
    backing: Option<Rc<Raster>>,
    settings: EditorSettings,
    viewport: Viewport,
    log: CommandLog,
    pen: PenOptions,
    anchor: CloneAnchor,
    gesture: GestureMachine,
    tracker: TouchTracker,
    draft: Option<Draft>,
    amplifier: Amplifier,
    moving: bool,
    just_draw_original: bool,
    ready: bool,
    redraw_requested: bool,
}

impl fmt::Debug for GraffitiEditor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GraffitiEditor")
            .field("viewport", &self.viewport)
            .field("commands", &self.log.len())
            .field("pen", &self.pen)
            .field("gesture", &self.gesture.state())
            .field("moving", &self.moving)
            .field("ready", &self.ready)
            .finish_non_exhaustive()
    }
}

impl GraffitiEditor {
    pub fn builder() -> GraffitiBuilder {
        GraffitiBuilder::new()
    }

    /// Lays the image out in a `width` x `height` view.
    pub fn on_size_changed(&mut self, width: u32, height: u32) {
        self.viewport.layout(width, height);
        if !self.viewport.is_laid_out() {
            tracing::debug!(width, height, "ignoring empty view size");
            return;
        }
        self.viewport.judge_position();
        self.amplifier.layout(width as f32, height as f32);

        let mapper = self.viewport.mapper();
        self.anchor
            .relocate_to(mapper.touch_to_image(self.viewport.view_centre()));

        self.request_redraw();
        if !self.ready {
            self.ready = true;
            tracing::info!(
                width,
                height,
                fit_scale = self.viewport.fit_scale(),
                "graffiti editor ready"
            );
            self.listener.on_ready();
        }
    }

    /// Feeds one pointer event. Returns `false` when it was ignored.
    pub fn on_touch(&mut self, event: &TouchEvent) -> bool {
        if !self.ready {
            return false;
        }
        let handled = if self.moving {
            self.on_move_picture(event)
        } else {
            self.on_draw_touch(event)
        };
        if handled {
            self.request_redraw();
        }
        handled
    }

    fn on_move_picture(&mut self, event: &TouchEvent) -> bool {
        match event.action {
            TouchAction::Down => {
                self.gesture.reset();
                self.tracker.press(event.primary);
                self.advance(GestureEvent::PanStart)
            }
            TouchAction::Up | TouchAction::Cancel => {
                self.tracker.lift();
                self.advance(GestureEvent::Release)
            }
            TouchAction::Move => {
                if self.tracker.contacts() < 2 {
                    if self.gesture.state() != GestureState::Panning {
                        return false;
                    }
                    if self.tracker.take_busy() {
                        self.tracker.rebase(event.primary);
                        return true;
                    }
                    self.tracker.step(event.primary);
                    let pan = self.viewport.pan() + self.tracker.delta();
                    self.viewport.set_pan(pan);
                    return true;
                }
                let (Some(pinch), Some(distance)) = (self.tracker.pinch(), event.spacing()) else {
                    return false;
                };
                if let Some(scale) = pinch.scale_for(distance, self.settings.touch_slop) {
                    self.viewport
                        .zoom_about(scale, pinch.midpoint, pinch.anchor);
                }
                true
            }
            TouchAction::PointerDown => {
                let (Some(distance), Some(midpoint)) = (event.spacing(), event.midpoint()) else {
                    return false;
                };
                if !self.advance(GestureEvent::PinchStart) {
                    return false;
                }
                self.tracker.add_contact();
                self.tracker.begin_pinch(Pinch {
                    old_scale: self.viewport.user_scale(),
                    old_distance: distance,
                    midpoint,
                    anchor: self.viewport.mapper().touch_to_image(midpoint),
                });
                true
            }
            TouchAction::PointerUp => {
                if self.tracker.remove_contact() == 1 {
                    return self.advance(GestureEvent::PinchEnd);
                }
                true
            }
        }
    }

    fn on_draw_touch(&mut self, event: &TouchEvent) -> bool {
        let touch = event.primary;
        let mapper = self.viewport.mapper();
        match event.action {
            TouchAction::Down => {
                self.gesture.reset();
                self.tracker.press(touch);
                let image = mapper.touch_to_image(touch);
                if self.pen.pen == Pen::Clone && self.anchor.contains(image, self.pen.size) {
                    self.anchor.begin_relocate();
                    self.draft = None;
                    return self.advance(GestureEvent::RelocateStart);
                }
                if self.pen.pen == Pen::Clone {
                    self.anchor.begin_stroke(image);
                }
                self.draft = Some(Draft::begin(self.pen.shape, &mapper, touch));
                self.advance(GestureEvent::DrawStart)
            }
            TouchAction::Move => {
                if self.tracker.contacts() >= 2 {
                    return false;
                }
                self.tracker.step(touch);
                match self.gesture.state() {
                    GestureState::RelocatingCloneAnchor => {
                        self.anchor.relocate_to(mapper.touch_to_image(touch));
                        true
                    }
                    GestureState::Drawing => {
                        if self.pen.pen == Pen::Clone {
                            self.anchor.follow(mapper.touch_to_image(touch));
                        }
                        if let Some(draft) = self.draft.as_mut() {
                            draft.extend(&mapper, self.tracker.last(), touch);
                        }
                        true
                    }
                    _ => false,
                }
            }
            TouchAction::Up | TouchAction::Cancel => {
                self.tracker.lift();
                self.tracker.step(touch);
                self.tracker.nudge_tap();
                let release = self.tracker.current();
                match self.gesture.state() {
                    GestureState::RelocatingCloneAnchor => {
                        self.anchor.finish_relocate(mapper.touch_to_image(release));
                    }
                    GestureState::Drawing => self.commit_draft(&mapper, release),
                    _ => {}
                }
                self.advance(GestureEvent::Release)
            }
            TouchAction::PointerDown => {
                self.tracker.add_contact();
                true
            }
            TouchAction::PointerUp => {
                self.tracker.remove_contact();
                true
            }
        }
    }

    fn advance(&mut self, event: GestureEvent) -> bool {
        self.gesture.transition(event).is_ok()
    }

    fn commit_draft(&mut self, mapper: &CoordinateMapper, release: Point) {
        let Some(draft) = self.draft.take() else {
            return;
        };
        let pen = self.pen.pen;
        if pen == Pen::Clone {
            self.anchor.follow(mapper.touch_to_image(release));
        }
        let clone_matrix = self.anchor.source_matrix();
        let style = self.pen.style.clone();
        let command = match draft.shape() {
            ShapeKind::Freehand => StrokeCommand::freehand(
                pen,
                self.pen.size,
                style,
                draft.finish(mapper, self.tracker.last(), release),
                clone_matrix,
            ),
            shape => StrokeCommand::shape(
                pen,
                shape,
                self.pen.size,
                style,
                mapper.touch_to_image(self.tracker.down()),
                mapper.touch_to_image(release),
                clone_matrix,
            ),
        };
        let resolver = PaintResolver::new(
            &self.image,
            self.backing.as_deref(),
            self.settings.eraser_resizeable,
        );
        self.log.append(command, &resolver);
    }

    /// Paints the current frame onto `canvas`, which covers the view.
    pub fn draw(&self, canvas: &mut impl Canvas) {
        if !self.ready {
            return;
        }
        canvas.save();
        self.draw_scene(canvas);
        canvas.restore();

        if self.gesture.state().is_drawing() {
            self.amplifier.draw(
                canvas,
                self.tracker.current(),
                self.viewport.user_scale(),
                |lens| self.draw_scene(lens),
            );
        }
    }

    fn draw_scene(&self, canvas: &mut impl Canvas) {
        let mapper = self.viewport.mapper();
        let scale = mapper.effective_scale();
        canvas.scale(scale, scale);

        let (left, top, right, bottom) = self.viewport.image_rect_in_raster();
        if !self.settings.drawable_outside {
            canvas.clip_rect(left, top, right, bottom);
        }
        if self.just_draw_original {
            canvas.draw_raster(&self.image, left, top);
            return;
        }
        canvas.draw_raster(self.log.raster(), left, top);

        if let (GestureState::Drawing, Some(draft)) = (self.gesture.state(), &self.draft) {
            self.draw_preview(canvas, &mapper, draft);
        }
        if self.pen.pen == Pen::Clone {
            self.anchor.draw_indicator(
                canvas,
                mapper.image_to_raster(self.anchor.position()),
                self.pen.size,
            );
        }
    }

    fn draw_preview(&self, canvas: &mut impl Canvas, mapper: &CoordinateMapper, draft: &Draft) {
        let resolver = PaintResolver::new(
            &self.image,
            self.backing.as_deref(),
            self.settings.eraser_resizeable,
        );
        let target = DrawTarget::Screen {
            offset: mapper.raster_offset(),
        };
        let source = resolver.resolve(
            self.pen.pen,
            target,
            self.anchor.source_matrix(),
            &self.pen.style,
        );
        let paint = Paint::new(source, draft.shape().paint_mode(), self.pen.size);
        let tap = self.tracker.is_tap();

        match draft.shape() {
            ShapeKind::Freehand if tap => {
                let last = self.tracker.last();
                let end = (self.tracker.current() + last)
                    .offset(TAP_NUDGE, TAP_NUDGE)
                    .scale(0.5);
                let path = draft
                    .raster_path()
                    .extended(mapper.touch_to_raster(last), mapper.touch_to_raster(end));
                canvas.draw(&Primitive::Path(path.segments()), &paint);
            }
            ShapeKind::Freehand => {
                canvas.draw(&Primitive::Path(draft.raster_path().segments()), &paint);
            }
            shape => {
                let span = if tap { TAP_NUDGE } else { 0.0 };
                draw_shape(
                    canvas,
                    shape,
                    mapper.touch_to_raster(self.tracker.down()),
                    mapper.touch_to_raster(self.tracker.current().offset(span, span)),
                    &paint,
                );
            }
        }
    }

    /// Hands the artwork and backing image to the listener.
    pub fn save(&mut self) {
        tracing::info!(commands = self.log.len(), "saving graffiti");
        self.listener
            .on_saved(self.log.raster(), self.backing.as_deref());
    }

    pub fn clear(&mut self) -> GraffitiResult<()> {
        match self.log.clear() {
            Ok(()) => {
                self.request_redraw();
                Ok(())
            }
            Err(source) => Err(self.report(ErrorReason::Clear, source)),
        }
    }

    /// Removes the newest stroke. Returns `false` when nothing was drawn.
    pub fn undo(&mut self) -> GraffitiResult<bool> {
        let resolver = PaintResolver::new(
            &self.image,
            self.backing.as_deref(),
            self.settings.eraser_resizeable,
        );
        match self.log.undo(&resolver) {
            Ok(undone) => {
                if undone {
                    self.request_redraw();
                }
                Ok(undone)
            }
            Err(source) => Err(self.report(ErrorReason::Undo, source)),
        }
    }

    fn report(&mut self, reason: ErrorReason, source: RasterError) -> GraffitiError {
        let error = GraffitiError::Raster {
            operation: reason.operation(),
            source,
        };
        tracing::warn!(?reason, %error, "raster rebuild failed; keeping previous raster");
        self.listener.on_error(reason, &error.to_string());
        error
    }

    pub fn is_modified(&self) -> bool {
        self.log.is_modified()
    }

    pub fn centre_picture(&mut self) {
        self.viewport.centre_picture();
        self.request_redraw();
    }

    pub fn set_just_draw_original(&mut self, just_draw_original: bool) {
        self.just_draw_original = just_draw_original;
        self.request_redraw();
    }

    pub fn is_just_draw_original(&self) -> bool {
        self.just_draw_original
    }

    pub fn set_color(&mut self, color: Color) {
        self.pen.set_style(PaintStyle::Solid(color));
        self.request_redraw();
    }

    /// Uses `pattern` as the hand pen's paint.
    pub fn set_pattern(&mut self, pattern: Rc<Raster>, tile_x: TileMode, tile_y: TileMode) {
        self.pen.set_style(PaintStyle::Tiled {
            bitmap: pattern,
            tile_x,
            tile_y,
        });
        self.request_redraw();
    }

    pub fn style(&self) -> &PaintStyle {
        &self.pen.style
    }

    pub fn color(&self) -> Option<Color> {
        self.pen.style.color()
    }

    pub fn set_scale(&mut self, scale: f32) {
        self.viewport.set_user_scale(scale);
        self.request_redraw();
    }

    pub fn scale(&self) -> f32 {
        self.viewport.user_scale()
    }

    pub fn set_pen(&mut self, pen: Pen) {
        self.pen.pen = pen;
        self.request_redraw();
    }

    pub fn pen(&self) -> Pen {
        self.pen.pen
    }

    pub fn set_shape(&mut self, shape: ShapeKind) {
        self.pen.shape = shape;
        self.request_redraw();
    }

    pub fn shape(&self) -> ShapeKind {
        self.pen.shape
    }

    pub fn set_pan(&mut self, pan: Point) {
        self.viewport.set_pan(pan);
        self.request_redraw();
    }

    pub fn pan(&self) -> Point {
        self.viewport.pan()
    }

    pub fn set_pen_size(&mut self, size: f32) {
        self.pen.set_size(size);
        self.request_redraw();
    }

    pub fn pen_size(&self) -> f32 {
        self.pen.size
    }

    pub fn set_drawable_outside(&mut self, drawable_outside: bool) {
        self.settings.drawable_outside = drawable_outside;
    }

    pub fn is_drawable_outside(&self) -> bool {
        self.settings.drawable_outside
    }

    /// Values `<= 0` hide the magnifier.
    pub fn set_amplifier_scale(&mut self, scale: f32) {
        self.amplifier.set_scale(scale);
        self.request_redraw();
    }

    pub fn amplifier_scale(&self) -> f32 {
        self.amplifier.scale()
    }

    /// Routes touches to pan/zoom instead of drawing. Switching drops any
    /// gesture in flight.
    pub fn set_moving(&mut self, moving: bool) {
        if self.moving != moving {
            self.gesture.reset();
            self.tracker.lift();
            self.draft = None;
        }
        self.moving = moving;
    }

    pub fn is_moving(&self) -> bool {
        self.moving
    }

    pub fn is_ready(&self) -> bool {
        self.ready
    }

    pub fn mapper(&self) -> CoordinateMapper {
        self.viewport.mapper()
    }

    pub fn viewport(&self) -> &Viewport {
        &self.viewport
    }

    pub fn gesture_state(&self) -> GestureState {
        self.gesture.state()
    }

    pub fn clone_anchor(&self) -> &CloneAnchor {
        &self.anchor
    }

    pub fn commands(&self) -> &[StrokeCommand] {
        self.log.commands()
    }

    pub fn raster(&self) -> &Raster {
        self.log.raster()
    }

    pub fn source_image(&self) -> &Raster {
        &self.image
    }

    pub fn backing_image(&self) -> Option<&Raster> {
        self.backing.as_deref()
    }

    fn request_redraw(&mut self) {
        self.redraw_requested = true;
    }

    /// Returns whether a redraw was requested since the last call.
    pub fn take_redraw_request(&mut self) -> bool {
        std::mem::take(&mut self.redraw_requested)
    }

    /// Starts repeated zoom steps around the image point under the view centre.
    pub fn press_zoom(&self, direction: ZoomDirection) -> GraffitiResult<ZoomRepeat> {
        if !self.ready {
            return Err(GraffitiError::NotReady);
        }
        let anchor = self
            .viewport
            .mapper()
            .touch_to_image(self.viewport.view_centre());
        Ok(ZoomRepeat::start(
            direction,
            anchor,
            self.settings.zoom_repeat_interval,
        ))
    }

    /// Applies ticks already delivered by `repeat`. Returns the steps applied.
    pub fn pump_zoom(&mut self, repeat: &mut ZoomRepeat) -> usize {
        let ticks = repeat.poll();
        self.apply_zoom_steps(repeat, ticks)
    }

    /// Like [`Self::pump_zoom`] but blocks up to `timeout` for the next tick.
    pub fn wait_zoom(&mut self, repeat: &mut ZoomRepeat, timeout: Duration) -> usize {
        let ticks = repeat.wait(timeout);
        self.apply_zoom_steps(repeat, ticks)
    }

    fn apply_zoom_steps(&mut self, repeat: &mut ZoomRepeat, ticks: usize) -> usize {
        let bounds = self.viewport.bounds();
        let centre = self.viewport.view_centre();
        let mut applied = 0;
        for _ in 0..ticks {
            let target = self.viewport.user_scale() + repeat.direction().step();
            let scale = bounds.clamp(target);
            self.viewport.zoom_about(scale, centre, repeat.anchor());
            applied += 1;
            if scale != target {
                tracing::debug!(scale, "zoom repeat reached scale limit");
                repeat.release();
                break;
            }
        }
        if applied > 0 {
            self.request_redraw();
        }
        applied
    }
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;

    use super::*;

    #[derive(Debug, Default)]
    struct Events {
        ready: usize,
        saved: Vec<(u32, u32, bool)>,
        errors: Vec<ErrorReason>,
    }

    #[derive(Clone, Default)]
    struct Recorder(Rc<RefCell<Events>>);

    impl GraffitiListener for Recorder {
        fn on_ready(&mut self) {
            self.0.borrow_mut().ready += 1;
        }

        fn on_saved(&mut self, artwork: &Raster, backing: Option<&Raster>) {
            self.0
                .borrow_mut()
                .saved
                .push((artwork.width(), artwork.height(), backing.is_some()));
        }

        fn on_error(&mut self, reason: ErrorReason, _message: &str) {
            self.0.borrow_mut().errors.push(reason);
        }
    }

    fn editor_with(image: Raster, recorder: &Recorder) -> GraffitiEditor {
        let mut editor = GraffitiEditor::builder()
            .image(image)
            .listener(recorder.clone())
            .build()
            .expect("editor should build");
        editor.on_size_changed(1000, 1000);
        editor
    }

    fn white_editor(recorder: &Recorder) -> GraffitiEditor {
        editor_with(
            Raster::filled(500, 500, Color::WHITE).expect("image"),
            recorder,
        )
    }

    fn tap(editor: &mut GraffitiEditor, at: Point) {
        assert!(editor.on_touch(&TouchEvent::down(at)));
        assert!(editor.on_touch(&TouchEvent::up(at)));
    }

    fn drag(editor: &mut GraffitiEditor, points: &[Point]) {
        let (first, rest) = points.split_first().expect("points");
        editor.on_touch(&TouchEvent::down(*first));
        for point in rest {
            editor.on_touch(&TouchEvent::moved(*point));
        }
        editor.on_touch(&TouchEvent::up(*points.last().expect("points")));
    }

    #[test]
    fn build_requires_listener_and_image() {
        let missing_listener = GraffitiEditor::builder()
            .image(Raster::new(4, 4).expect("image"))
            .build();
        assert!(matches!(missing_listener, Err(GraffitiError::MissingListener)));

        let missing_image = GraffitiEditor::builder()
            .listener(Recorder::default())
            .build();
        assert!(matches!(missing_image, Err(GraffitiError::MissingSourceImage)));
    }

    #[test]
    fn first_layout_reports_ready_once() {
        let recorder = Recorder::default();
        let mut editor = GraffitiEditor::builder()
            .image(Raster::new(500, 500).expect("image"))
            .listener(recorder.clone())
            .build()
            .expect("editor");
        assert!(!editor.on_touch(&TouchEvent::down(Point::new(1.0, 1.0))));

        editor.on_size_changed(0, 0);
        assert_eq!(recorder.0.borrow().ready, 0);
        editor.on_size_changed(1000, 1000);
        editor.on_size_changed(800, 1000);
        assert_eq!(recorder.0.borrow().ready, 1);
        assert!(editor.is_ready());
    }

    #[test]
    fn tap_commits_one_nudged_freehand_stroke() {
        let recorder = Recorder::default();
        let mut editor = white_editor(&recorder);
        tap(&mut editor, Point::new(100.0, 100.0));

        assert_eq!(editor.commands().len(), 1);
        let command = &editor.commands()[0];
        assert_eq!(command.pen(), Pen::Hand);
        assert_eq!(command.shape_kind(), ShapeKind::Freehand);
        let (start, end) = command.span().expect("span");
        assert_eq!(start, Point::new(50.0, 50.0));
        assert_eq!(end, Point::new(50.5, 50.5));
        assert_eq!(editor.raster().pixel(50, 50), Some(Color::RED));
        assert_eq!(editor.gesture_state(), GestureState::Idle);
    }

    #[test]
    fn pinch_zoom_keeps_anchor_under_midpoint() {
        let recorder = Recorder::default();
        let mut editor = white_editor(&recorder);
        editor.set_moving(true);

        let a = Point::new(450.0, 500.0);
        let b = Point::new(550.0, 500.0);
        editor.on_touch(&TouchEvent::down(a));
        editor.on_touch(&TouchEvent::pointer_down(a, b));
        assert_eq!(editor.gesture_state(), GestureState::PinchZoom);
        editor.on_touch(&TouchEvent::pinch_move(
            Point::new(425.0, 500.0),
            Point::new(575.0, 500.0),
        ));

        assert!((editor.scale() - 1.5).abs() < 1e-5);
        let anchor = editor.mapper().touch_to_image(Point::new(500.0, 500.0));
        assert!((anchor.x - 250.0).abs() < 1e-3 && (anchor.y - 250.0).abs() < 1e-3);
        assert!(editor.commands().is_empty());
    }

    #[test]
    fn pinch_scale_is_clamped() {
        let recorder = Recorder::default();
        let mut editor = white_editor(&recorder);
        editor.set_moving(true);
        let a = Point::new(490.0, 500.0);
        let b = Point::new(510.0, 500.0);
        editor.on_touch(&TouchEvent::down(a));
        editor.on_touch(&TouchEvent::pointer_down(a, b));
        editor.on_touch(&TouchEvent::pinch_move(
            Point::new(0.0, 500.0),
            Point::new(1000.0, 500.0),
        ));
        assert_eq!(editor.scale(), 3.5);
        editor.on_touch(&TouchEvent::pinch_move(
            Point::new(499.0, 500.0),
            Point::new(501.0, 500.0),
        ));
        assert_eq!(editor.scale(), 1.0);
    }

    #[test]
    fn first_single_move_after_pinch_does_not_pan() {
        let recorder = Recorder::default();
        let mut editor = white_editor(&recorder);
        editor.set_scale(2.0);
        editor.set_pan(Point::new(-500.0, -500.0));
        editor.set_moving(true);

        let a = Point::new(400.0, 500.0);
        let b = Point::new(600.0, 500.0);
        editor.on_touch(&TouchEvent::down(a));
        editor.on_touch(&TouchEvent::pointer_down(a, b));
        editor.on_touch(&TouchEvent::pointer_up(a, b));
        assert_eq!(editor.gesture_state(), GestureState::Panning);

        let before = editor.pan();
        editor.on_touch(&TouchEvent::moved(Point::new(300.0, 300.0)));
        assert_eq!(editor.pan(), before);
        editor.on_touch(&TouchEvent::moved(Point::new(320.0, 310.0)));
        assert_eq!(editor.pan(), before + Point::new(20.0, 10.0));
        editor.on_touch(&TouchEvent::up(Point::new(320.0, 310.0)));
        assert_eq!(editor.gesture_state(), GestureState::Idle);
    }

    #[test]
    fn drawing_ignores_multi_contact_moves() {
        let recorder = Recorder::default();
        let mut editor = white_editor(&recorder);
        let a = Point::new(100.0, 100.0);
        editor.on_touch(&TouchEvent::down(a));
        editor.on_touch(&TouchEvent::pointer_down(a, Point::new(300.0, 300.0)));
        assert!(!editor.on_touch(&TouchEvent::pinch_move(
            Point::new(200.0, 200.0),
            Point::new(300.0, 300.0),
        )));
        assert_eq!(editor.scale(), 1.0);
        editor.on_touch(&TouchEvent::pointer_up(a, Point::new(300.0, 300.0)));
        editor.on_touch(&TouchEvent::up(a));
        assert_eq!(editor.commands().len(), 1);
    }

    #[test]
    fn shapes_are_committed_in_image_space() {
        let recorder = Recorder::default();
        let mut editor = white_editor(&recorder);
        editor.set_shape(ShapeKind::FillRect);
        editor.set_color(Color::BLACK);
        drag(
            &mut editor,
            &[Point::new(200.0, 200.0), Point::new(300.0, 260.0), Point::new(400.0, 300.0)],
        );
        let command = &editor.commands()[0];
        assert_eq!(
            command.geometry(),
            &Geometry::Anchors {
                start: Point::new(100.0, 100.0),
                end: Point::new(200.0, 150.0)
            }
        );
        assert_eq!(editor.raster().pixel(150, 125), Some(Color::BLACK));
    }

    #[test]
    fn committed_color_is_not_changed_by_later_setters() {
        let recorder = Recorder::default();
        let mut editor = white_editor(&recorder);
        tap(&mut editor, Point::new(100.0, 100.0));
        editor.set_color(Color::BLACK);
        tap(&mut editor, Point::new(600.0, 600.0));
        editor.undo().expect("undo");
        assert_eq!(editor.commands()[0].style().color(), Some(Color::RED));
        assert_eq!(editor.raster().pixel(50, 50), Some(Color::RED));
    }

    #[test]
    fn pattern_preview_matches_commit_when_zoomed_and_panned() {
        let recorder = Recorder::default();
        let mut editor = white_editor(&recorder);
        let pristine = editor.raster().try_copy().expect("copy");
        editor.set_amplifier_scale(0.0);
        editor.set_scale(2.0);
        editor.set_pan(Point::new(-300.0, -200.0));
        assert_eq!(editor.pan(), Point::new(-300.0, -200.0));

        // Left half red, right half blue, tiled from the image origin.
        let blue = Color::new(0, 0, 0xff);
        let mut pattern = Raster::filled(8, 8, Color::RED).expect("pattern");
        pattern.canvas().draw(
            &Primitive::Rect {
                start: Point::new(4.0, 0.0),
                end: Point::new(8.0, 8.0),
            },
            &Paint::solid_fill(blue),
        );
        editor.set_pattern(Rc::new(pattern), TileMode::Repeat, TileMode::Repeat);
        editor.set_shape(ShapeKind::FillRect);

        // Image rect (100, 75) -> (200, 150); screen pixels map to image
        // x 105 (red column) and x 109 (blue column).
        let samples = [(122, 202), (138, 202), (170, 300)];
        assert!(editor.on_touch(&TouchEvent::down(Point::new(100.0, 100.0))));
        assert!(editor.on_touch(&TouchEvent::moved(Point::new(500.0, 400.0))));
        let mut screen = Raster::filled(1000, 1000, Color::BLACK).expect("screen");
        editor.draw(&mut screen.canvas());
        let preview: Vec<_> = samples.iter().map(|&(x, y)| screen.pixel(x, y)).collect();
        assert_eq!(preview[0], Some(Color::RED));
        assert_eq!(preview[1], Some(blue));

        assert!(editor.on_touch(&TouchEvent::up(Point::new(500.0, 400.0))));
        let mut screen = Raster::filled(1000, 1000, Color::BLACK).expect("screen");
        editor.draw(&mut screen.canvas());
        let committed: Vec<_> = samples.iter().map(|&(x, y)| screen.pixel(x, y)).collect();
        assert_eq!(committed, preview);
        assert_eq!(editor.raster().pixel(105, 100), Some(Color::RED));
        assert_eq!(editor.raster().pixel(109, 100), Some(blue));

        editor.set_color(Color::BLACK);
        assert_eq!(editor.commands()[0].style().color(), None);
        let snapshot = editor.raster().try_copy().expect("snapshot");

        editor.set_shape(ShapeKind::Freehand);
        tap(&mut editor, Point::new(800.0, 800.0));
        assert_eq!(editor.commands().len(), 2);
        assert!(editor.undo().expect("undo"));
        assert!(editor.raster().same_pixels(&snapshot));
        assert!(editor.undo().expect("undo pattern"));
        assert!(editor.raster().same_pixels(&pristine));
    }

    #[test]
    fn undo_and_clear_restore_source_pixels() {
        let recorder = Recorder::default();
        let mut editor = white_editor(&recorder);
        let pristine = editor.raster().try_copy().expect("copy");
        drag(
            &mut editor,
            &[Point::new(100.0, 100.0), Point::new(400.0, 300.0)],
        );
        assert!(editor.is_modified());
        assert!(editor.undo().expect("undo"));
        assert!(editor.raster().same_pixels(&pristine));
        assert!(!editor.undo().expect("second undo is a no-op"));

        tap(&mut editor, Point::new(10.0, 10.0));
        editor.clear().expect("clear");
        assert!(!editor.is_modified());
        assert!(editor.raster().same_pixels(&pristine));
        assert!(recorder.0.borrow().errors.is_empty());
    }

    #[test]
    fn clone_pen_copies_from_anchor_offset() {
        let recorder = Recorder::default();
        let mut image = Raster::filled(500, 500, Color::WHITE).expect("image");
        image.canvas().draw(
            &Primitive::Rect {
                start: Point::new(0.0, 0.0),
                end: Point::new(100.0, 500.0),
            },
            &Paint::solid_fill(Color::BLACK),
        );
        let mut editor = editor_with(image, &recorder);
        // Anchor starts at the image centre (250, 250); move it to (50, 250).
        assert_eq!(editor.clone_anchor().position(), Point::new(250.0, 250.0));
        editor.set_pen(Pen::Clone);
        editor.set_pen_size(20.0);
        drag(
            &mut editor,
            &[Point::new(500.0, 500.0), Point::new(300.0, 500.0), Point::new(100.0, 500.0)],
        );
        assert!(editor.commands().is_empty());
        assert_eq!(editor.clone_anchor().position(), Point::new(50.0, 250.0));

        // Stroke at image (400, 250) reads source pixels at (50, 250).
        tap(&mut editor, Point::new(800.0, 500.0));
        let command = &editor.commands()[0];
        let matrix = command.source_matrix().expect("clone matrix");
        assert_eq!((matrix.tx, matrix.ty), (350.0, 0.0));
        assert_eq!(editor.raster().pixel(400, 250), Some(Color::BLACK));
        assert!(editor.clone_anchor().is_cloning());
    }

    #[test]
    fn eraser_reveals_backing_image_through_editor() {
        let recorder = Recorder::default();
        let mut editor = GraffitiEditor::builder()
            .image(Raster::filled(500, 500, Color::WHITE).expect("image"))
            .backing_image(Raster::filled(50, 50, Color::new(0, 0x80, 0)).expect("backing"))
            .listener(recorder.clone())
            .build()
            .expect("editor");
        editor.on_size_changed(1000, 1000);
        editor.set_pen(Pen::Eraser);
        tap(&mut editor, Point::new(200.0, 200.0));
        assert_eq!(editor.raster().pixel(100, 100), Some(Color::new(0, 0x80, 0)));

        editor.save();
        assert_eq!(recorder.0.borrow().saved, vec![(500, 500, true)]);
    }

    #[test]
    fn draw_renders_raster_preview_and_amplifier() {
        let recorder = Recorder::default();
        let mut editor = white_editor(&recorder);
        tap(&mut editor, Point::new(100.0, 100.0));

        let mut screen = Raster::filled(1000, 1000, Color::BLACK).expect("screen");
        editor.draw(&mut screen.canvas());
        assert_eq!(screen.pixel(101, 101), Some(Color::RED));
        assert_eq!(screen.pixel(700, 700), Some(Color::WHITE));

        editor.on_touch(&TouchEvent::down(Point::new(600.0, 600.0)));
        let mut screen = Raster::filled(1000, 1000, Color::BLACK).expect("screen");
        editor.draw(&mut screen.canvas());
        // Live preview of the pending tap.
        assert_eq!(screen.pixel(600, 600), Some(Color::RED));
        // Lens centred at (500, 250) shows the area under the touch.
        assert_eq!(screen.pixel(500, 250), Some(Color::RED));
        assert_eq!(screen.pixel(500, 120), Some(Color::WHITE));
    }

    #[test]
    fn just_draw_original_hides_strokes() {
        let recorder = Recorder::default();
        let mut editor = white_editor(&recorder);
        tap(&mut editor, Point::new(100.0, 100.0));
        editor.set_just_draw_original(true);
        let mut screen = Raster::filled(1000, 1000, Color::BLACK).expect("screen");
        editor.draw(&mut screen.canvas());
        assert_eq!(screen.pixel(101, 101), Some(Color::WHITE));
    }

    #[test]
    fn redraw_requests_are_consumed() {
        let recorder = Recorder::default();
        let mut editor = white_editor(&recorder);
        assert!(editor.take_redraw_request());
        assert!(!editor.take_redraw_request());
        editor.set_pen(Pen::Eraser);
        assert!(editor.take_redraw_request());
    }

    #[test]
    fn zoom_repeat_runs_until_scale_limit() {
        let recorder = Recorder::default();
        let mut editor = GraffitiEditor::builder()
            .image(Raster::filled(500, 500, Color::WHITE).expect("image"))
            .listener(recorder.clone())
            .settings(EditorSettings {
                zoom_repeat_interval: Duration::from_millis(1),
                ..EditorSettings::default()
            })
            .build()
            .expect("editor");
        assert!(matches!(
            editor.press_zoom(ZoomDirection::In),
            Err(GraffitiError::NotReady)
        ));
        editor.on_size_changed(1000, 1000);

        let mut repeat = editor.press_zoom(ZoomDirection::In).expect("zoom");
        let mut steps = 0;
        for _ in 0..10_000 {
            if !repeat.is_active() {
                break;
            }
            steps += editor.wait_zoom(&mut repeat, Duration::from_secs(1));
        }
        assert!(!repeat.is_active());
        assert_eq!(editor.scale(), 3.5);
        assert!(steps >= 50);
        let centre = editor.mapper().touch_to_image(Point::new(500.0, 500.0));
        assert!((centre.x - 250.0).abs() < 1e-2 && (centre.y - 250.0).abs() < 1e-2);

        let mut repeat = editor.press_zoom(ZoomDirection::Out).expect("zoom");
        for _ in 0..10_000 {
            if !repeat.is_active() {
                break;
            }
            editor.wait_zoom(&mut repeat, Duration::from_secs(1));
        }
        assert_eq!(editor.scale(), 1.0);
    }
}
