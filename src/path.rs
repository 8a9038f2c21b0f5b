use crate::config::SmoothingMethod;
use crate::geometry::Point;

/// A path vertex with cubic Bézier handles, both relative to `point`.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Segment {
    pub point: Point,
    pub handle_in: Point,
    pub handle_out: Point,
}

impl Segment {
    pub fn new(point: Point) -> Self {
        Self {
            point,
            ..Default::default()
        }
    }
}

/// One cubic piece between two consecutive segments, in absolute coordinates.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Curve {
    pub from: Point,
    pub control1: Point,
    pub control2: Point,
    pub to: Point,
}

impl Curve {
    pub fn is_straight(&self) -> bool {
        self.control1 == self.from && self.control2 == self.to
    }

    pub fn point_at(&self, t: f64) -> Point {
        let u = 1.0 - t;
        self.from * (u * u * u)
            + self.control1 * (3.0 * u * u * t)
            + self.control2 * (3.0 * u * t * t)
            + self.to * (t * t * t)
    }
}

/// Which segments a smoothing pass touches.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SmoothRange {
    /// Every segment; a closed path is smoothed as a loop.
    All,
    /// Segments `from..=to`. Negative indices count from the end (`-1` is the last).
    Span { from: isize, to: isize },
}

/// Ordered list of segments plus a closed flag.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Path {
    segments: Vec<Segment>,
    closed: bool,
}

impl Path {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(n: usize) -> Self {
        Self {
            segments: Vec::with_capacity(n),
            closed: false,
        }
    }

    pub fn add(&mut self, point: Point) {
        self.segments.push(Segment::new(point));
    }

    pub fn close(&mut self) {
        self.closed = true;
    }

    pub fn is_closed(&self) -> bool {
        self.closed
    }

    pub fn len(&self) -> usize {
        self.segments.len()
    }

    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }

    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }

    pub fn points(&self) -> impl ExactSizeIterator<Item = Point> + '_ {
        self.segments.iter().map(|s| s.point)
    }

    pub fn remove_last_segment(&mut self) -> Option<Segment> {
        self.segments.pop()
    }

    /// Moves every vertex by `delta`. Handles are relative and stay as they are.
    pub fn translate(&mut self, delta: Point) {
        for s in &mut self.segments {
            s.point += delta;
        }
    }

    /// Cubic pieces in drawing order, including the closing piece of a closed path.
    pub fn curves(&self) -> impl Iterator<Item = Curve> + '_ {
        let n = self.segments.len();
        let count = match (self.closed, n) {
            (_, 0 | 1) => 0,
            (true, _) => n,
            (false, _) => n - 1,
        };
        (0..count).map(move |i| {
            let a = &self.segments[i];
            let b = &self.segments[(i + 1) % n];
            Curve {
                from: a.point,
                control1: a.point + a.handle_out,
                control2: b.point + b.handle_in,
                to: b.point,
            }
        })
    }

    fn resolve(&self, index: isize) -> isize {
        let len = self.segments.len() as isize;
        let i = if index < 0 {
            if self.closed { index % len } else { (index + len).max(0) }
        } else {
            index
        };
        i.min(len - 1)
    }

    #[inline]
    fn wrap(&self, i: isize) -> usize {
        let len = self.segments.len() as isize;
        i.rem_euclid(len) as usize
    }

    /// Recomputes handles over `range`.
    ///
    /// `factor` is the tension for `Geometric` and the alpha exponent for
    /// `CatmullRom`; `Asymmetric` fits a global spline and ignores it.
    pub fn smooth(&mut self, method: SmoothingMethod, factor: f64, range: SmoothRange) {
        let len = self.segments.len() as isize;
        if len == 0 {
            return;
        }
        let (mut from, mut to, looped) = match range {
            SmoothRange::All => (0, len - 1, self.closed),
            SmoothRange::Span { from, to } => (self.resolve(from), self.resolve(to), false),
        };
        if from > to {
            if self.closed {
                from -= len;
            } else {
                std::mem::swap(&mut from, &mut to);
            }
        }

        match method {
            SmoothingMethod::Asymmetric => self.fit_spline(from, to, looped),
            SmoothingMethod::Geometric | SmoothingMethod::CatmullRom => {
                for i in from..=to {
                    let first = !looped && i == from;
                    let last = !looped && i == to;
                    self.smooth_segment(self.wrap(i), method, factor, first, last);
                }
            }
        }
    }

    fn neighbours(&self, index: usize) -> (Option<usize>, Option<usize>) {
        let n = self.segments.len();
        let prev = if index > 0 {
            Some(index - 1)
        } else if self.closed {
            Some(n - 1)
        } else {
            None
        };
        let next = if index + 1 < n {
            Some(index + 1)
        } else if self.closed {
            Some(0)
        } else {
            None
        };
        (prev, next)
    }

    fn smooth_segment(
        &mut self,
        index: usize,
        method: SmoothingMethod,
        factor: f64,
        first: bool,
        last: bool,
    ) {
        let (prev, next) = self.neighbours(index);
        let p1 = self.segments[index].point;
        let p0 = prev.map_or(p1, |i| self.segments[i].point);
        let p2 = next.map_or(p1, |i| self.segments[i].point);
        let d1 = p0.distance(p1);
        let d2 = p1.distance(p2);
        let seg = &mut self.segments[index];

        match method {
            SmoothingMethod::CatmullRom => {
                let d1_a = d1.powf(factor);
                let d1_2a = d1_a * d1_a;
                let d2_a = d2.powf(factor);
                let d2_2a = d2_a * d2_a;
                if !first && prev.is_some() {
                    let a = 2.0 * d2_2a + 3.0 * d2_a * d1_a + d1_2a;
                    let n = 3.0 * d2_a * (d2_a + d1_a);
                    seg.handle_in = if n != 0.0 && n.is_finite() {
                        (p0 * d2_2a + p1 * a - p2 * d1_2a) * (1.0 / n) - p1
                    } else {
                        Point::ZERO
                    };
                }
                if !last && next.is_some() {
                    let a = 2.0 * d1_2a + 3.0 * d1_a * d2_a + d2_2a;
                    let n = 3.0 * d1_a * (d1_a + d2_a);
                    seg.handle_out = if n != 0.0 && n.is_finite() {
                        (p2 * d1_2a + p1 * a - p0 * d2_2a) * (1.0 / n) - p1
                    } else {
                        Point::ZERO
                    };
                }
            }
            SmoothingMethod::Geometric => {
                if prev.is_some() && next.is_some() {
                    let vector = p0 - p2;
                    let k = if d1 + d2 > 0.0 { factor * d1 / (d1 + d2) } else { 0.0 };
                    if !first {
                        seg.handle_in = vector * k;
                    }
                    if !last {
                        seg.handle_out = vector * (k - factor);
                    }
                }
            }
            SmoothingMethod::Asymmetric => unreachable!("spline fitting is not per-segment"),
        }
    }

    /// Global cubic spline through `from..=to` (asymmetric end conditions),
    /// solved as a tridiagonal system with padding knots taken from outside the span.
    fn fit_spline(&mut self, from: isize, to: isize, looped: bool) {
        let len = self.segments.len() as isize;
        let amount = to - from + 1;
        let padding = if looped { amount.min(4) } else { 1 };
        let (pad_left, pad_right) = if self.closed {
            (padding, padding)
        } else {
            (from.min(1), (len - to - 1).min(1))
        };
        let n = (amount - 1 + pad_left + pad_right) as usize;
        if n <= 1 {
            return;
        }

        let knots: Vec<Point> = (0..=n as isize)
            .map(|i| self.segments[self.wrap(from - pad_left + i)].point)
            .collect();

        let mut rhs = vec![Point::ZERO; n];
        let mut diag = vec![0.0; n];
        rhs[0] = knots[0] + knots[1] * 2.0;
        diag[0] = 2.0;
        let mut f = 2.0;
        let mut r = rhs[0];
        for i in 1..n {
            let internal = i < n - 1;
            let (b, u, v) = if internal { (4.0, 4.0, 2.0) } else { (2.0, 3.0, 0.0) };
            let m = 1.0 / f;
            f = b - m;
            diag[i] = f;
            r = knots[i] * u + knots[i + 1] * v - r * m;
            rhs[i] = r;
        }

        let mut ctrl = vec![Point::ZERO; n + 1];
        ctrl[n - 1] = rhs[n - 1] * (1.0 / diag[n - 1]);
        for i in (0..n - 1).rev() {
            ctrl[i] = (rhs[i] - ctrl[i + 1]) * (1.0 / diag[i]);
        }
        ctrl[n] = (knots[n] * 3.0 - ctrl[n - 1]) * 0.5;

        let max = n as isize - pad_right;
        let mut j = from;
        for i in pad_left..=max {
            let index = self.wrap(j);
            let seg = &mut self.segments[index];
            let handle = ctrl[i as usize] - seg.point;
            if looped || i < max {
                seg.handle_out = handle;
            }
            if looped || i > pad_left {
                seg.handle_in = -handle;
            }
            j += 1;
        }
    }
}
