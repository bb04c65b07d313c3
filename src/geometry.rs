use serde::{Deserialize, Serialize};

/// Tolerance for coordinate comparisons throughout the pipeline.
pub const EPSILON: f32 = 1e-6;

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Point {
    pub x: f32,
    pub y: f32,
}

impl Point {
    pub fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    pub fn distance(&self, other: Point) -> f32 {
        let dx = other.x - self.x;
        let dy = other.y - self.y;
        (dx * dx + dy * dy).sqrt()
    }

    pub fn manhattan(&self, other: Point) -> f32 {
        (other.x - self.x).abs() + (other.y - self.y).abs()
    }

    pub fn midpoint(&self, other: Point) -> Point {
        Point::new((self.x + other.x) / 2.0, (self.y + other.y) / 2.0)
    }

    pub fn offset(&self, dx: f32, dy: f32) -> Point {
        Point::new(self.x + dx, self.y + dy)
    }

    pub fn approx_eq(&self, other: Point) -> bool {
        (self.x - other.x).abs() <= EPSILON && (self.y - other.y).abs() <= EPSILON
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Rect {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

impl Rect {
    pub fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    pub fn expand(&self, pad: f32) -> Rect {
        Rect::new(
            self.x - pad,
            self.y - pad,
            self.width + pad * 2.0,
            self.height + pad * 2.0,
        )
    }

    pub fn center(&self) -> Point {
        Point::new(self.x + self.width / 2.0, self.y + self.height / 2.0)
    }

    pub fn contains(&self, p: Point) -> bool {
        p.x >= self.x && p.x <= self.x + self.width && p.y >= self.y && p.y <= self.y + self.height
    }

    /// Strict interior test, used when deciding whether a routed segment
    /// actually cuts through an obstacle rather than grazing its border.
    pub fn contains_strict(&self, p: Point) -> bool {
        p.x > self.x && p.x < self.x + self.width && p.y > self.y && p.y < self.y + self.height
    }

    /// True when the segment `a`..`b` passes through this rectangle:
    /// either an endpoint lies inside, or the segment crosses one of the
    /// four border edges.
    pub fn intersects_segment(&self, a: Point, b: Point) -> bool {
        if self.contains(a) || self.contains(b) {
            return true;
        }
        let tl = Point::new(self.x, self.y);
        let tr = Point::new(self.x + self.width, self.y);
        let bl = Point::new(self.x, self.y + self.height);
        let br = Point::new(self.x + self.width, self.y + self.height);
        segments_intersect(a, b, tl, tr)
            || segments_intersect(a, b, tr, br)
            || segments_intersect(a, b, br, bl)
            || segments_intersect(a, b, bl, tl)
    }
}

fn orientation(a: Point, b: Point, c: Point) -> f32 {
    (b.x - a.x) * (c.y - a.y) - (b.y - a.y) * (c.x - a.x)
}

fn on_segment(a: Point, b: Point, p: Point) -> bool {
    p.x >= a.x.min(b.x) - EPSILON
        && p.x <= a.x.max(b.x) + EPSILON
        && p.y >= a.y.min(b.y) - EPSILON
        && p.y <= a.y.max(b.y) + EPSILON
}

pub fn segments_intersect(a: Point, b: Point, c: Point, d: Point) -> bool {
    let o1 = orientation(a, b, c);
    let o2 = orientation(a, b, d);
    let o3 = orientation(c, d, a);
    let o4 = orientation(c, d, b);

    if ((o1 > 0.0) != (o2 > 0.0)) && ((o3 > 0.0) != (o4 > 0.0)) {
        return true;
    }
    // Collinear overlaps.
    (o1.abs() <= EPSILON && on_segment(a, b, c))
        || (o2.abs() <= EPSILON && on_segment(a, b, d))
        || (o3.abs() <= EPSILON && on_segment(c, d, a))
        || (o4.abs() <= EPSILON && on_segment(c, d, b))
}

/// Evaluate a cubic Bezier at parameter `t`.
pub fn cubic_point(p0: Point, c1: Point, c2: Point, p1: Point, t: f32) -> Point {
    let u = 1.0 - t;
    let w0 = u * u * u;
    let w1 = 3.0 * u * u * t;
    let w2 = 3.0 * u * t * t;
    let w3 = t * t * t;
    Point::new(
        w0 * p0.x + w1 * c1.x + w2 * c2.x + w3 * p1.x,
        w0 * p0.y + w1 * c1.y + w2 * c2.y + w3 * p1.y,
    )
}

/// Synthesize the two cubic control points for a spline edge by offsetting
/// perpendicular from the chord midline. The offset magnitude is
/// `chord length * curvature`.
pub fn spline_controls(start: Point, end: Point, curvature: f32) -> (Point, Point) {
    let dist = start.distance(end);
    if dist <= EPSILON {
        return (start, end);
    }
    let dx = (end.x - start.x) / dist;
    let dy = (end.y - start.y) / dist;
    // Unit normal, left of the travel direction.
    let nx = -dy;
    let ny = dx;
    let offset = dist * curvature;
    let c1 = Point::new(
        start.x + (end.x - start.x) / 3.0 + nx * offset,
        start.y + (end.y - start.y) / 3.0 + ny * offset,
    );
    let c2 = Point::new(
        start.x + (end.x - start.x) * 2.0 / 3.0 + nx * offset,
        start.y + (end.y - start.y) * 2.0 / 3.0 + ny * offset,
    );
    (c1, c2)
}

/// Control points pushed along a fixed axis instead of the chord normal,
/// used when the caller gave an explicit routing direction.
pub fn spline_controls_axis(
    start: Point,
    end: Point,
    horizontal: bool,
    curvature: f32,
) -> (Point, Point) {
    let dist = start.distance(end);
    let offset = dist * curvature;
    if horizontal {
        (
            Point::new(start.x + offset, start.y),
            Point::new(end.x - offset, end.y),
        )
    } else {
        (
            Point::new(start.x, start.y + offset),
            Point::new(end.x, end.y - offset),
        )
    }
}

/// Point halfway along a polyline by arc length.
pub fn polyline_midpoint(points: &[Point]) -> Option<Point> {
    if points.is_empty() {
        return None;
    }
    if points.len() == 1 {
        return Some(points[0]);
    }
    let total: f32 = points.windows(2).map(|w| w[0].distance(w[1])).sum();
    if total <= EPSILON {
        return Some(points[0]);
    }
    let mut remaining = total / 2.0;
    for w in points.windows(2) {
        let len = w[0].distance(w[1]);
        if remaining <= len {
            let t = if len > EPSILON { remaining / len } else { 0.0 };
            return Some(Point::new(
                w[0].x + (w[1].x - w[0].x) * t,
                w[0].y + (w[1].y - w[0].y) * t,
            ));
        }
        remaining -= len;
    }
    Some(points[points.len() - 1])
}
