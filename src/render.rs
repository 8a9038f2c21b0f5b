use crate::config::Viewport;
use crate::geometry::Point;
use crate::path::Curve;
use crate::scene::Scene;

const PAPER: [u8; 4] = [255, 255, 255, 255];
const INK: [u8; 4] = [0, 0, 0, 255];
// Partial coverage so overlapping passes darken where they cross.
const INK_ALPHA: f32 = 0.55;
// Target length, in pixels, of the line pieces a curve is flattened into.
const FLATTEN_STEP: f64 = 2.0;

#[inline]
fn lerp_color(a: [u8; 4], b: [u8; 4], t: f32) -> [u8; 4] {
    let t = t.clamp(0.0, 1.0);
    [
        (a[0] as f32 + (b[0] as f32 - a[0] as f32) * t).round() as u8,
        (a[1] as f32 + (b[1] as f32 - a[1] as f32) * t).round() as u8,
        (a[2] as f32 + (b[2] as f32 - a[2] as f32) * t).round() as u8,
        255,
    ]
}

struct Canvas {
    w: usize,
    h: usize,
    rgba: Vec<u8>,
}

impl Canvas {
    fn new(w: usize, h: usize) -> Self {
        let mut rgba = vec![0u8; w * h * 4];
        for px in rgba.chunks_exact_mut(4) {
            px.copy_from_slice(&PAPER);
        }
        Self { w, h, rgba }
    }

    #[inline]
    fn plot(&mut self, x: f64, y: f64) {
        let (x, y) = (x.round(), y.round());
        if x < 0.0 || y < 0.0 || x >= self.w as f64 || y >= self.h as f64 {
            return;
        }
        let i = (y as usize * self.w + x as usize) * 4;
        let px = &mut self.rgba[i..i + 4];
        let blended = lerp_color([px[0], px[1], px[2], px[3]], INK, INK_ALPHA);
        px.copy_from_slice(&blended);
    }

    /// Liang-Barsky clip of `a..b` to the canvas grown by one pixel on every side.
    fn clip(&self, a: Point, b: Point) -> Option<(Point, Point)> {
        let d = b - a;
        let (mut t0, mut t1) = (0.0f64, 1.0f64);
        let edges = [
            (-d.x, a.x + 1.0),
            (d.x, self.w as f64 - a.x),
            (-d.y, a.y + 1.0),
            (d.y, self.h as f64 - a.y),
        ];
        for (p, q) in edges {
            if p == 0.0 {
                if q < 0.0 {
                    return None;
                }
            } else if p < 0.0 {
                t0 = t0.max(q / p);
            } else {
                t1 = t1.min(q / p);
            }
        }
        (t0 <= t1).then(|| (a + d * t0, a + d * t1))
    }

    /// Steps one pixel at a time along the major axis of the visible part.
    /// The end pixel is left to the next line.
    fn line(&mut self, a: Point, b: Point) {
        if !(a.x.is_finite() && a.y.is_finite() && b.x.is_finite() && b.y.is_finite()) {
            return;
        }
        let Some((a, b)) = self.clip(a, b) else {
            return;
        };
        let d = b - a;
        let steps = d.x.abs().max(d.y.abs()).ceil();
        if !steps.is_finite() {
            return;
        }
        if steps < 1.0 {
            self.plot(a.x, a.y);
            return;
        }
        let n = steps as usize;
        for i in 0..n {
            let t = i as f64 / steps;
            self.plot(a.x + d.x * t, a.y + d.y * t);
        }
    }
}

fn flatten(curve: &Curve, scale: Point) -> impl Iterator<Item = Point> {
    let to_px = move |p: Point| Point::new(p.x * scale.x, p.y * scale.y);
    let hull = to_px(curve.from).distance(to_px(curve.control1))
        + to_px(curve.control1).distance(to_px(curve.control2))
        + to_px(curve.control2).distance(to_px(curve.to));
    let pieces = if hull.is_finite() {
        ((hull / FLATTEN_STEP).ceil() as usize).clamp(1, 512)
    } else {
        1
    };
    let curve = *curve;
    (0..=pieces).map(move |i| to_px(curve.point_at(i as f64 / pieces as f64)))
}

/// Rasterizes every path of the scene onto a white `width × height` RGBA8 buffer.
pub fn render_preview(scene: &Scene, viewport: Viewport, width: usize, height: usize) -> Vec<u8> {
    let mut canvas = Canvas::new(width, height);
    let scale = Point::new(
        width as f64 / viewport.width.max(f64::MIN_POSITIVE),
        height as f64 / viewport.height.max(f64::MIN_POSITIVE),
    );

    for path in scene.passes.iter().flat_map(|p| &p.paths) {
        if path.len() == 1 {
            let p = path.segments()[0].point;
            canvas.plot(p.x * scale.x, p.y * scale.y);
            continue;
        }
        for curve in path.curves() {
            let mut prev: Option<Point> = None;
            for p in flatten(&curve, scale) {
                if let Some(q) = prev {
                    canvas.line(q, p);
                }
                prev = Some(p);
            }
        }
    }

    canvas.rgba
}
