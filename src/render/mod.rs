//! Off-screen rasters and the drawing capability the editor paints through.

mod skia;

use image::RgbaImage;
use thiserror::Error;
use tiny_skia::{ColorU8, IntSize, Pixmap, Transform};

use crate::geometry::{Color, PathSegment, Point};

pub use skia::SkiaCanvas;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum RasterError {
    #[error("invalid raster dimensions {width}x{height}")]
    InvalidDimensions { width: u32, height: u32 },
    #[error("failed to allocate {bytes} bytes for a {width}x{height} raster")]
    AllocationFailed { width: u32, height: u32, bytes: usize },
}

pub type RasterResult<T> = std::result::Result<T, RasterError>;

/// Premultiplied RGBA bitmap that can be drawn onto and sampled from.
#[derive(Debug, Clone)]
pub struct Raster {
    pixmap: Pixmap,
}

impl Raster {
    pub fn new(width: u32, height: u32) -> RasterResult<Self> {
        let pixmap =
            Pixmap::new(width, height).ok_or(RasterError::InvalidDimensions { width, height })?;
        Ok(Self { pixmap })
    }

    pub fn filled(width: u32, height: u32, color: Color) -> RasterResult<Self> {
        let mut raster = Self::new(width, height)?;
        raster
            .pixmap
            .fill(tiny_skia::Color::from_rgba8(color.r, color.g, color.b, color.a));
        Ok(raster)
    }

    pub fn from_rgba_image(image: &RgbaImage) -> RasterResult<Self> {
        let mut raster = Self::new(image.width(), image.height())?;
        for (target, source) in raster.pixmap.pixels_mut().iter_mut().zip(image.pixels()) {
            let [r, g, b, a] = source.0;
            *target = ColorU8::from_rgba(r, g, b, a).premultiply();
        }
        Ok(raster)
    }

    pub fn to_rgba_image(&self) -> RgbaImage {
        let mut image = RgbaImage::new(self.width(), self.height());
        for (target, source) in image.pixels_mut().zip(self.pixmap.pixels()) {
            let color = source.demultiply();
            target.0 = [color.red(), color.green(), color.blue(), color.alpha()];
        }
        image
    }

    /// Copies the pixels, reporting allocation failure instead of aborting.
    pub fn try_copy(&self) -> RasterResult<Self> {
        let width = self.width();
        let height = self.height();
        let source = self.pixmap.data();
        let mut data = Vec::new();
        data.try_reserve_exact(source.len())
            .map_err(|_| RasterError::AllocationFailed {
                width,
                height,
                bytes: source.len(),
            })?;
        data.extend_from_slice(source);
        let size =
            IntSize::from_wh(width, height).ok_or(RasterError::InvalidDimensions { width, height })?;
        let pixmap =
            Pixmap::from_vec(data, size).ok_or(RasterError::InvalidDimensions { width, height })?;
        Ok(Self { pixmap })
    }

    pub fn width(&self) -> u32 {
        self.pixmap.width()
    }

    pub fn height(&self) -> u32 {
        self.pixmap.height()
    }

    /// Demultiplied color at `(x, y)`.
    pub fn pixel(&self, x: u32, y: u32) -> Option<Color> {
        let color = self.pixmap.pixel(x, y)?.demultiply();
        Some(Color::rgba(
            color.red(),
            color.green(),
            color.blue(),
            color.alpha(),
        ))
    }

    pub fn same_pixels(&self, other: &Self) -> bool {
        self.width() == other.width()
            && self.height() == other.height()
            && self.pixmap.data() == other.pixmap.data()
    }

    pub fn canvas(&mut self) -> SkiaCanvas<'_> {
        SkiaCanvas::new(&mut self.pixmap)
    }

    pub(crate) fn pixmap(&self) -> &Pixmap {
        &self.pixmap
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TileMode {
    Clamp,
    Repeat,
    #[default]
    Mirror,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PaintMode {
    Stroke,
    Fill,
}

/// Concrete source a primitive is painted with.
#[derive(Debug, Clone, Copy)]
pub enum PaintSource<'a> {
    Solid(Color),
    Tiled {
        raster: &'a Raster,
        tile_x: TileMode,
        tile_y: TileMode,
        /// Maps sampler space into the canvas' local space.
        matrix: Transform,
    },
}

#[derive(Debug, Clone, Copy)]
pub struct Paint<'a> {
    pub source: PaintSource<'a>,
    pub mode: PaintMode,
    pub stroke_width: f32,
}

impl<'a> Paint<'a> {
    pub const fn new(source: PaintSource<'a>, mode: PaintMode, stroke_width: f32) -> Self {
        Self {
            source,
            mode,
            stroke_width,
        }
    }

    pub const fn solid_stroke(color: Color, stroke_width: f32) -> Self {
        Self::new(PaintSource::Solid(color), PaintMode::Stroke, stroke_width)
    }

    pub const fn solid_fill(color: Color) -> Self {
        Self::new(PaintSource::Solid(color), PaintMode::Fill, 0.0)
    }

    pub const fn with_mode(self, mode: PaintMode) -> Self {
        Self { mode, ..self }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Primitive<'a> {
    Path(&'a [PathSegment]),
    Line { start: Point, end: Point },
    Triangle([Point; 3]),
    Circle { center: Point, radius: f32 },
    Rect { start: Point, end: Point },
}

/// 2D drawing target. Transforms and clips stack with `save`/`restore`.
pub trait Canvas {
    fn save(&mut self);

    fn restore(&mut self);

    /// Pre-concatenates `transform` onto the current matrix.
    fn concat(&mut self, transform: Transform);

    fn translate(&mut self, dx: f32, dy: f32) {
        self.concat(Transform::from_translate(dx, dy));
    }

    fn scale(&mut self, sx: f32, sy: f32) {
        self.concat(Transform::from_scale(sx, sy));
    }

    fn clip_rect(&mut self, left: f32, top: f32, right: f32, bottom: f32);

    fn clip_circle(&mut self, center: Point, radius: f32);

    fn fill_color(&mut self, color: Color);

    fn draw_raster(&mut self, raster: &Raster, x: f32, y: f32);

    fn draw(&mut self, primitive: &Primitive<'_>, paint: &Paint<'_>);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn raster_rejects_zero_dimensions() {
        let err = Raster::new(0, 10).expect_err("zero width should fail");
        assert_eq!(
            err,
            RasterError::InvalidDimensions {
                width: 0,
                height: 10
            }
        );
    }

    #[test]
    fn raster_try_copy_preserves_pixels() {
        let raster = Raster::filled(4, 3, Color::rgba(10, 20, 30, 255)).expect("raster");
        let copy = raster.try_copy().expect("copy should allocate");
        assert!(copy.same_pixels(&raster));
        assert_eq!(copy.pixel(3, 2), Some(Color::rgba(10, 20, 30, 255)));
    }

    #[test]
    fn raster_image_bridge_keeps_opaque_colors() {
        let mut pixels = RgbaImage::new(2, 2);
        pixels.put_pixel(1, 0, image::Rgba([200, 100, 50, 255]));
        let raster = Raster::from_rgba_image(&pixels).expect("raster");
        assert_eq!(raster.pixel(1, 0), Some(Color::rgba(200, 100, 50, 255)));
        assert_eq!(raster.to_rgba_image().get_pixel(1, 0).0, [200, 100, 50, 255]);
    }

    #[test]
    fn canvas_fills_solid_rect() {
        let mut raster = Raster::filled(20, 20, Color::WHITE).expect("raster");
        raster.canvas().draw(
            &Primitive::Rect {
                start: Point::new(2.0, 2.0),
                end: Point::new(10.0, 10.0),
            },
            &Paint::solid_fill(Color::RED),
        );
        assert_eq!(raster.pixel(5, 5), Some(Color::RED));
        assert_eq!(raster.pixel(15, 15), Some(Color::WHITE));
    }

    #[test]
    fn canvas_clip_rect_limits_fill() {
        let mut raster = Raster::filled(20, 20, Color::WHITE).expect("raster");
        let mut canvas = raster.canvas();
        canvas.clip_rect(0.0, 0.0, 10.0, 20.0);
        canvas.fill_color(Color::BLACK);
        drop(canvas);
        assert_eq!(raster.pixel(4, 4), Some(Color::BLACK));
        assert_eq!(raster.pixel(15, 4), Some(Color::WHITE));
    }

    #[test]
    fn canvas_restore_drops_clip_and_transform() {
        let mut raster = Raster::filled(20, 20, Color::WHITE).expect("raster");
        let mut canvas = raster.canvas();
        canvas.save();
        canvas.translate(100.0, 100.0);
        canvas.clip_rect(0.0, 0.0, 1.0, 1.0);
        canvas.restore();
        canvas.draw(
            &Primitive::Rect {
                start: Point::new(0.0, 0.0),
                end: Point::new(20.0, 20.0),
            },
            &Paint::solid_fill(Color::BLACK),
        );
        drop(canvas);
        assert_eq!(raster.pixel(10, 10), Some(Color::BLACK));
    }

    #[test]
    fn tiled_source_samples_through_matrix() {
        let mut pattern = Raster::filled(4, 4, Color::RED).expect("pattern");
        pattern.canvas().draw(
            &Primitive::Rect {
                start: Point::new(0.0, 0.0),
                end: Point::new(2.0, 4.0),
            },
            &Paint::solid_fill(Color::BLACK),
        );

        let mut raster = Raster::filled(8, 8, Color::WHITE).expect("raster");
        let paint = Paint::new(
            PaintSource::Tiled {
                raster: &pattern,
                tile_x: TileMode::Repeat,
                tile_y: TileMode::Repeat,
                matrix: Transform::from_translate(2.0, 0.0),
            },
            PaintMode::Fill,
            0.0,
        );
        raster.canvas().draw(
            &Primitive::Rect {
                start: Point::new(0.0, 0.0),
                end: Point::new(8.0, 8.0),
            },
            &paint,
        );

        // Shifted by two pixels: black columns now start at x = 2.
        assert_eq!(raster.pixel(0, 1), Some(Color::RED));
        assert_eq!(raster.pixel(2, 1), Some(Color::BLACK));
        assert_eq!(raster.pixel(5, 1), Some(Color::RED));
    }
}
