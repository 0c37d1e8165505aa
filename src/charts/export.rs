//! Static Export
//! Writes a scene to SVG or PNG through plotters, or dumps it as JSON.

use super::scene::{fit_text, Anchor, Color, Point, Primitive, Scene, Shape};
use plotters::coord::Shift;
use plotters::prelude::*;
use plotters::style::Color as _;
use plotters::style::text_anchor::{HPos, Pos, VPos};
use std::path::Path;
use thiserror::Error;

/// Points sampled along each Bézier link.
const CURVE_SAMPLES: usize = 24;

#[derive(Error, Debug)]
pub enum ExportError {
    #[error("Failed to write export: {0}")]
    Io(#[from] std::io::Error),
    #[error("Drawing failed: {0}")]
    Backend(String),
    #[error("Image encoding failed: {0}")]
    Image(#[from] image::ImageError),
    #[error("Failed to serialize scene: {0}")]
    Json(#[from] serde_json::Error),
    #[error("Unsupported export format: {0}")]
    UnsupportedFormat(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportFormat {
    Svg,
    Png,
    Json,
}

impl ExportFormat {
    pub const ALL: [ExportFormat; 3] = [ExportFormat::Svg, ExportFormat::Png, ExportFormat::Json];

    pub fn extension(self) -> &'static str {
        match self {
            ExportFormat::Svg => "svg",
            ExportFormat::Png => "png",
            ExportFormat::Json => "json",
        }
    }

    pub fn from_path(path: &Path) -> Result<Self, ExportError> {
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .map(str::to_ascii_lowercase)
            .unwrap_or_default();
        Self::ALL
            .into_iter()
            .find(|f| f.extension() == ext)
            .ok_or(ExportError::UnsupportedFormat(ext))
    }
}

/// Export `scene` in the format implied by the file extension.
pub fn export_scene(scene: &Scene, path: &Path) -> Result<(), ExportError> {
    match ExportFormat::from_path(path)? {
        ExportFormat::Svg => export_svg(scene, path),
        ExportFormat::Png => export_png(scene, path),
        ExportFormat::Json => export_json(scene, path),
    }?;
    tracing::info!("Exported chart to {}", path.display());
    Ok(())
}

pub fn export_svg(scene: &Scene, path: &Path) -> Result<(), ExportError> {
    let root = SVGBackend::new(path, canvas_size(scene)).into_drawing_area();
    draw_scene(&root, scene)?;
    root.present().map_err(backend_error)?;
    Ok(())
}

pub fn export_png(scene: &Scene, path: &Path) -> Result<(), ExportError> {
    let (w, h) = canvas_size(scene);
    let mut buffer = vec![0u8; w as usize * h as usize * 3];
    {
        let root = BitMapBackend::with_buffer(&mut buffer, (w, h)).into_drawing_area();
        draw_scene(&root, scene)?;
        root.present().map_err(backend_error)?;
    }
    let img = image::RgbImage::from_raw(w, h, buffer)
        .ok_or_else(|| ExportError::Backend("bitmap buffer size mismatch".to_string()))?;
    img.save(path)?;
    Ok(())
}

pub fn export_json(scene: &Scene, path: &Path) -> Result<(), ExportError> {
    let json = serde_json::to_string_pretty(scene)?;
    std::fs::write(path, json)?;
    Ok(())
}

fn canvas_size(scene: &Scene) -> (u32, u32) {
    (scene.width.max(1.0).ceil() as u32, scene.height.max(1.0).ceil() as u32)
}

fn backend_error<E: std::fmt::Display>(e: E) -> ExportError {
    ExportError::Backend(e.to_string())
}

fn rgb(c: Color) -> RGBColor {
    RGBColor(c.r, c.g, c.b)
}

fn coord(p: Point) -> (i32, i32) {
    (p.x.round() as i32, p.y.round() as i32)
}

/// Point on the cubic Bézier at parameter `t`.
pub fn bezier_point(points: &[Point; 4], t: f32) -> Point {
    let u = 1.0 - t;
    let (a, b, c, d) = (u * u * u, 3.0 * u * u * t, 3.0 * u * t * t, t * t * t);
    Point::new(
        a * points[0].x + b * points[1].x + c * points[2].x + d * points[3].x,
        a * points[0].y + b * points[1].y + c * points[2].y + d * points[3].y,
    )
}

fn draw_scene<DB: DrawingBackend>(
    root: &DrawingArea<DB, Shift>,
    scene: &Scene,
) -> Result<(), ExportError> {
    root.fill(&WHITE).map_err(backend_error)?;
    for primitive in &scene.primitives {
        draw_primitive(root, primitive)?;
    }
    Ok(())
}

fn draw_primitive<DB: DrawingBackend>(
    root: &DrawingArea<DB, Shift>,
    primitive: &Primitive,
) -> Result<(), ExportError> {
    let alpha = primitive.effective_opacity() as f64;
    match &primitive.shape {
        Shape::Rect { rect, fill, stroke } => {
            let corners = [
                coord(Point::new(rect.x0, rect.y0)),
                coord(Point::new(rect.x1, rect.y1)),
            ];
            root.draw(&Rectangle::new(corners, rgb(*fill).mix(alpha).filled()))
                .map_err(backend_error)?;
            if let Some((color, width)) = stroke {
                let style = rgb(*color).mix(alpha).stroke_width(width.round().max(1.0) as u32);
                root.draw(&Rectangle::new(corners, style)).map_err(backend_error)?;
            }
        }
        Shape::Curve { points, color, width } => {
            let path: Vec<(i32, i32)> = (0..=CURVE_SAMPLES)
                .map(|i| coord(bezier_point(points, i as f32 / CURVE_SAMPLES as f32)))
                .collect();
            let style = rgb(*color).mix(alpha).stroke_width(width.round().max(1.0) as u32);
            root.draw(&PathElement::new(path, style)).map_err(backend_error)?;
        }
        Shape::Line { from, to, color, width } => {
            let style = rgb(*color).mix(alpha).stroke_width(width.round().max(1.0) as u32);
            root.draw(&PathElement::new(vec![coord(*from), coord(*to)], style))
                .map_err(backend_error)?;
        }
        Shape::Text {
            pos,
            text,
            size,
            color,
            anchor,
            bold,
            max_width,
        } => {
            let label = match max_width {
                Some(w) => fit_text(text, *size, *w),
                None => text.clone(),
            };
            if label.is_empty() {
                return Ok(());
            }
            let font_style = if *bold { FontStyle::Bold } else { FontStyle::Normal };
            let h_pos = match anchor {
                Anchor::Start => HPos::Left,
                Anchor::Middle => HPos::Center,
                Anchor::End => HPos::Right,
            };
            let text_color = rgb(*color).mix(alpha);
            let style = TextStyle::from(FontDesc::new(FontFamily::SansSerif, *size as f64, font_style))
                .color(&text_color)
                .pos(Pos::new(h_pos, VPos::Center));
            root.draw_text(&label, &style, coord(*pos)).map_err(backend_error)?;
        }
        Shape::Gradient { rect, from, to } => {
            // one-pixel vertical strips
            let steps = rect.width().round().max(1.0) as i32;
            let (x0, y0) = coord(Point::new(rect.x0, rect.y0));
            let y1 = rect.y1.round() as i32;
            for i in 0..steps {
                let t = if steps > 1 { i as f32 / (steps - 1) as f32 } else { 0.0 };
                let c = rgb(from.lerp(*to, t)).mix(alpha).filled();
                root.draw(&Rectangle::new([(x0 + i, y0), (x0 + i + 1, y1)], c))
                    .map_err(backend_error)?;
            }
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::charts::scene::{MarkId, Rect};

    fn sample_scene() -> Scene {
        let mut scene = Scene::new(120.0, 80.0);
        scene.push(Primitive::new(
            MarkId::Cell(0),
            Shape::Rect {
                rect: Rect::new(10.0, 10.0, 60.0, 40.0),
                fill: Color::hex(0x4E79A7),
                stroke: Some((Color::DARK, 3.0)),
            },
        ));
        scene.push(
            Primitive::decoration(Shape::Curve {
                points: [
                    Point::new(0.0, 0.0),
                    Point::new(40.0, 0.0),
                    Point::new(60.0, 80.0),
                    Point::new(100.0, 80.0),
                ],
                color: Color::GREY,
                width: 2.0,
            })
            .with_opacity(0.7),
        );
        scene
    }

    fn temp_path(name: &str) -> std::path::PathBuf {
        std::env::temp_dir().join(format!("cosmetics_dashboard_{}_{}", std::process::id(), name))
    }

    #[test]
    fn test_format_from_extension() {
        assert_eq!(ExportFormat::from_path(Path::new("a/b.SVG")).unwrap(), ExportFormat::Svg);
        assert_eq!(ExportFormat::from_path(Path::new("chart.png")).unwrap(), ExportFormat::Png);
        assert!(matches!(
            ExportFormat::from_path(Path::new("chart.pdf")),
            Err(ExportError::UnsupportedFormat(_))
        ));
    }

    #[test]
    fn test_bezier_endpoints() {
        let pts = [
            Point::new(0.0, 0.0),
            Point::new(40.0, 0.0),
            Point::new(60.0, 80.0),
            Point::new(100.0, 80.0),
        ];
        assert_eq!(bezier_point(&pts, 0.0), pts[0]);
        assert_eq!(bezier_point(&pts, 1.0), pts[3]);
        let mid = bezier_point(&pts, 0.5);
        assert!((mid.x - 50.0).abs() < 1e-4 && (mid.y - 40.0).abs() < 1e-4);
    }

    #[test]
    fn test_json_export() {
        let path = temp_path("scene.json");
        export_scene(&sample_scene(), &path).unwrap();
        let value: serde_json::Value =
            serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(value["width"], 120.0);
        assert_eq!(value["primitives"].as_array().unwrap().len(), 2);
        std::fs::remove_file(path).ok();
    }

    #[test]
    fn test_svg_export() {
        let path = temp_path("scene.svg");
        export_scene(&sample_scene(), &path).unwrap();
        let svg = std::fs::read_to_string(&path).unwrap();
        assert!(svg.contains("<svg"));
        assert!(svg.contains("<rect"));
        std::fs::remove_file(path).ok();
    }

    #[test]
    fn test_svg_export_draws_faded_text() {
        let mut scene = sample_scene();
        scene.push(
            Primitive::decoration(Shape::Text {
                pos: Point::new(60.0, 70.0),
                text: "Glycerin".into(),
                size: 12.0,
                color: Color::DARK,
                anchor: Anchor::Middle,
                bold: true,
                max_width: None,
            })
            .with_opacity(0.5),
        );
        let path = temp_path("text.svg");
        export_scene(&scene, &path).unwrap();
        let svg = std::fs::read_to_string(&path).unwrap();
        assert!(svg.contains("Glycerin"));
        std::fs::remove_file(path).ok();
    }

    #[test]
    fn test_png_export() {
        let path = temp_path("scene.png");
        export_scene(&sample_scene(), &path).unwrap();
        let img = image::open(&path).unwrap().to_rgb8();
        assert_eq!(img.dimensions(), (120, 80));
        assert_eq!(img.get_pixel(119, 0).0, [255, 255, 255]);
        // inside the filled cell, away from its stroke
        assert_eq!(img.get_pixel(50, 15).0, [0x4E, 0x79, 0xA7]);
        std::fs::remove_file(path).ok();
    }
}
