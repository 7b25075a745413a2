use std::borrow::Cow;

use tiny_skia::{
    FillRule, FilterQuality, LineCap, LineJoin, Mask, Paint as SkiaPaint, Path, PathBuilder,
    Pattern, Pixmap, PixmapPaint, Rect, SpreadMode, Stroke, Transform,
};

use super::{Canvas, Paint, PaintMode, PaintSource, Primitive, Raster, TileMode};
use crate::geometry::{Color, PathSegment, Point};

#[derive(Debug, Clone)]
struct CanvasState {
    transform: Transform,
    clip: Option<Mask>,
}

impl Default for CanvasState {
    fn default() -> Self {
        Self {
            transform: Transform::identity(),
            clip: None,
        }
    }
}

/// `Canvas` implementation drawing into a tiny-skia pixmap.
#[derive(Debug)]
pub struct SkiaCanvas<'a> {
    pixmap: &'a mut Pixmap,
    state: CanvasState,
    stack: Vec<CanvasState>,
}

impl<'a> SkiaCanvas<'a> {
    pub fn new(pixmap: &'a mut Pixmap) -> Self {
        Self {
            pixmap,
            state: CanvasState::default(),
            stack: Vec::new(),
        }
    }

    pub fn transform(&self) -> Transform {
        self.state.transform
    }

    fn intersect_clip(&mut self, path: &Path) {
        let Some(mut mask) = Mask::new(self.pixmap.width(), self.pixmap.height()) else {
            return;
        };
        mask.fill_path(path, FillRule::Winding, true, self.state.transform);
        if let Some(existing) = self.state.clip.as_ref() {
            for (value, previous) in mask.data_mut().iter_mut().zip(existing.data()) {
                *value = ((u16::from(*value) * u16::from(*previous)) / 255) as u8;
            }
        }
        self.state.clip = Some(mask);
    }

    /// Empty clip: nothing may be drawn until restore.
    fn clip_nothing(&mut self) {
        if let Some(mask) = Mask::new(self.pixmap.width(), self.pixmap.height()) {
            self.state.clip = Some(mask);
        }
    }
}

impl Canvas for SkiaCanvas<'_> {
    fn save(&mut self) {
        self.stack.push(self.state.clone());
    }

    fn restore(&mut self) {
        if let Some(state) = self.stack.pop() {
            self.state = state;
        }
    }

    fn concat(&mut self, transform: Transform) {
        self.state.transform = self.state.transform.pre_concat(transform);
    }

    fn clip_rect(&mut self, left: f32, top: f32, right: f32, bottom: f32) {
        let path = rect_path(Point::new(left, top), Point::new(right, bottom));
        match path {
            Some(path) => self.intersect_clip(&path),
            None => self.clip_nothing(),
        }
    }

    fn clip_circle(&mut self, center: Point, radius: f32) {
        match PathBuilder::from_circle(center.x, center.y, radius) {
            Some(path) => self.intersect_clip(&path),
            None => self.clip_nothing(),
        }
    }

    fn fill_color(&mut self, color: Color) {
        let Some(rect) =
            Rect::from_xywh(0.0, 0.0, self.pixmap.width() as f32, self.pixmap.height() as f32)
        else {
            return;
        };
        let mut paint = SkiaPaint::default();
        paint.set_color_rgba8(color.r, color.g, color.b, color.a);
        self.pixmap
            .fill_rect(rect, &paint, Transform::identity(), self.state.clip.as_ref());
    }

    fn draw_raster(&mut self, raster: &Raster, x: f32, y: f32) {
        let transform = self.state.transform.pre_translate(x, y);
        self.pixmap.draw_pixmap(
            0,
            0,
            raster.pixmap().as_ref(),
            &PixmapPaint::default(),
            transform,
            self.state.clip.as_ref(),
        );
    }

    fn draw(&mut self, primitive: &Primitive<'_>, paint: &Paint<'_>) {
        let Some(path) = primitive_path(primitive) else {
            return;
        };
        let tiles = match paint.source {
            PaintSource::Tiled {
                raster,
                tile_x,
                tile_y,
                ..
            } => Some(TileSource::new(raster, tile_x, tile_y)),
            PaintSource::Solid(_) => None,
        };
        let skia_paint = skia_paint(&paint.source, tiles.as_ref());
        match paint.mode {
            PaintMode::Stroke => {
                let stroke = Stroke {
                    width: paint.stroke_width.max(0.0),
                    line_cap: LineCap::Round,
                    line_join: LineJoin::Round,
                    ..Stroke::default()
                };
                self.pixmap.stroke_path(
                    &path,
                    &skia_paint,
                    &stroke,
                    self.state.transform,
                    self.state.clip.as_ref(),
                );
            }
            PaintMode::Fill => {
                self.pixmap.fill_path(
                    &path,
                    &skia_paint,
                    FillRule::Winding,
                    self.state.transform,
                    self.state.clip.as_ref(),
                );
            }
        }
    }
}

/// Pixmap and spread mode a tiled source is sampled with.
struct TileSource<'a> {
    pixmap: Cow<'a, Pixmap>,
    spread: SpreadMode,
}

impl<'a> TileSource<'a> {
    /// tiny-skia has one spread mode for both axes, so a mirrored axis paired
    /// with a repeated one is baked into a doubled pixmap sampled with `Repeat`.
    fn new(raster: &'a Raster, tile_x: TileMode, tile_y: TileMode) -> Self {
        let borrowed = |spread| Self {
            pixmap: Cow::Borrowed(raster.pixmap()),
            spread,
        };
        if tile_x == tile_y {
            return borrowed(spread_mode(tile_x));
        }
        if tile_x == TileMode::Clamp || tile_y == TileMode::Clamp {
            tracing::trace!(?tile_x, ?tile_y, "clamp mixed with tiling; padding both axes");
            return borrowed(SpreadMode::Pad);
        }
        match mirrored(
            raster.pixmap(),
            tile_x == TileMode::Mirror,
            tile_y == TileMode::Mirror,
        ) {
            Some(pixmap) => Self {
                pixmap: Cow::Owned(pixmap),
                spread: SpreadMode::Repeat,
            },
            None => borrowed(spread_mode(tile_x)),
        }
    }
}

/// Appends a flipped copy of `source` along each requested axis.
fn mirrored(source: &Pixmap, along_x: bool, along_y: bool) -> Option<Pixmap> {
    let (width, height) = (source.width(), source.height());
    let out_width = if along_x { width.checked_mul(2)? } else { width };
    let out_height = if along_y { height.checked_mul(2)? } else { height };
    let mut out = Pixmap::new(out_width, out_height)?;
    let pixels = source.pixels();
    for (index, target) in out.pixels_mut().iter_mut().enumerate() {
        let x = index as u32 % out_width;
        let y = index as u32 / out_width;
        let sx = if x < width { x } else { out_width - 1 - x };
        let sy = if y < height { y } else { out_height - 1 - y };
        *target = pixels[(sy * width + sx) as usize];
    }
    Some(out)
}

fn skia_paint<'p>(source: &PaintSource<'_>, tiles: Option<&'p TileSource<'_>>) -> SkiaPaint<'p> {
    let mut paint = SkiaPaint {
        anti_alias: true,
        ..SkiaPaint::default()
    };
    match (*source, tiles) {
        (PaintSource::Solid(color), _) => {
            paint.set_color_rgba8(color.r, color.g, color.b, color.a)
        }
        (PaintSource::Tiled { matrix, .. }, Some(tiles)) => {
            paint.shader = Pattern::new(
                Pixmap::as_ref(&tiles.pixmap),
                tiles.spread,
                FilterQuality::Nearest,
                1.0,
                matrix,
            );
        }
        (PaintSource::Tiled { .. }, None) => {}
    }
    paint
}

const fn spread_mode(mode: TileMode) -> SpreadMode {
    match mode {
        TileMode::Clamp => SpreadMode::Pad,
        TileMode::Repeat => SpreadMode::Repeat,
        TileMode::Mirror => SpreadMode::Reflect,
    }
}

fn primitive_path(primitive: &Primitive<'_>) -> Option<Path> {
    match *primitive {
        Primitive::Path(segments) => segments_path(segments),
        Primitive::Line { start, end } => {
            let mut builder = PathBuilder::new();
            builder.move_to(start.x, start.y);
            builder.line_to(end.x, end.y);
            builder.finish()
        }
        Primitive::Triangle([a, b, c]) => {
            let mut builder = PathBuilder::new();
            builder.move_to(a.x, a.y);
            builder.line_to(b.x, b.y);
            builder.line_to(c.x, c.y);
            builder.close();
            builder.finish()
        }
        Primitive::Circle { center, radius } => {
            PathBuilder::from_circle(center.x, center.y, radius)
        }
        Primitive::Rect { start, end } => rect_path(start, end),
    }
}

fn segments_path(segments: &[PathSegment]) -> Option<Path> {
    let mut builder = PathBuilder::new();
    for segment in segments {
        match *segment {
            PathSegment::MoveTo(point) => builder.move_to(point.x, point.y),
            PathSegment::QuadTo { control, end } => {
                builder.quad_to(control.x, control.y, end.x, end.y)
            }
        }
    }
    builder.finish()
}

fn rect_path(start: Point, end: Point) -> Option<Path> {
    let left = start.x.min(end.x);
    let right = start.x.max(end.x);
    let top = start.y.min(end.y);
    let bottom = start.y.max(end.y);
    let mut builder = PathBuilder::new();
    builder.move_to(left, top);
    builder.line_to(right, top);
    builder.line_to(right, bottom);
    builder.line_to(left, bottom);
    builder.close();
    builder.finish()
}
