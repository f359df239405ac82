//! Planar geometry: points, axis-aligned bounds and closed polygons.
//!
//! Floors and barriers are closed polygons in world units. Only what the
//! rasterizer and the barrier pass need is provided: bounds, overlap and
//! point containment.

use crate::error::ProfileError;

/// A point in world units.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Point2 {
    /// Horizontal component.
    pub x: f64,
    /// Vertical component.
    pub y: f64,
}

impl Point2 {
    /// Create a point from its components.
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Euclidean distance to `other`.
    pub fn distance(&self, other: &Point2) -> f64 {
        (self.x - other.x).hypot(self.y - other.y)
    }
}

/// An axis-aligned rectangle, `min` inclusive to `max` inclusive.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Bounds2 {
    /// Lower-left corner.
    pub min: Point2,
    /// Upper-right corner.
    pub max: Point2,
}

impl Bounds2 {
    /// Smallest bounds enclosing every point. `None` for an empty slice.
    pub fn from_points(points: &[Point2]) -> Option<Self> {
        let first = points.first()?;
        let mut min = *first;
        let mut max = *first;
        for p in &points[1..] {
            min.x = min.x.min(p.x);
            min.y = min.y.min(p.y);
            max.x = max.x.max(p.x);
            max.y = max.y.max(p.y);
        }
        Some(Self { min, max })
    }

    /// A `width` × `height` rectangle centred on `center`.
    pub fn from_center(center: Point2, width: f64, height: f64) -> Self {
        Self {
            min: Point2::new(center.x - width / 2.0, center.y - height / 2.0),
            max: Point2::new(center.x + width / 2.0, center.y + height / 2.0),
        }
    }

    /// Horizontal extent.
    pub fn width(&self) -> f64 {
        self.max.x - self.min.x
    }

    /// Vertical extent.
    pub fn height(&self) -> f64 {
        self.max.y - self.min.y
    }

    /// Whether `p` lies inside or on the edge.
    pub fn contains(&self, p: &Point2) -> bool {
        p.x >= self.min.x && p.x <= self.max.x && p.y >= self.min.y && p.y <= self.max.y
    }

    /// Whether the interiors of the two rectangles overlap.
    pub fn intersects(&self, other: &Bounds2) -> bool {
        self.min.x < other.max.x
            && other.min.x < self.max.x
            && self.min.y < other.max.y
            && other.min.y < self.max.y
    }

    /// The four corners, counter-clockwise from `min`.
    pub fn corners(&self) -> [Point2; 4] {
        [
            self.min,
            Point2::new(self.max.x, self.min.y),
            self.max,
            Point2::new(self.min.x, self.max.y),
        ]
    }
}

/// A simple closed polygon.
///
/// The closing edge from the last vertex back to the first is implicit.
#[derive(Clone, Debug, PartialEq)]
pub struct Polygon {
    vertices: Vec<Point2>,
    bounds: Bounds2,
}

impl Polygon {
    /// Build a polygon from its vertices.
    ///
    /// Returns `Err(ProfileError::DegeneratePolygon)` for fewer than three
    /// vertices, any non-finite coordinate, or zero-area bounds.
    pub fn new(vertices: Vec<Point2>) -> Result<Self, ProfileError> {
        if vertices.len() < 3 || vertices.iter().any(|p| !p.x.is_finite() || !p.y.is_finite()) {
            return Err(ProfileError::DegeneratePolygon {
                vertices: vertices.len(),
            });
        }
        let bounds = Bounds2::from_points(&vertices).ok_or(ProfileError::DegeneratePolygon {
            vertices: 0,
        })?;
        if bounds.width() <= 0.0 || bounds.height() <= 0.0 {
            return Err(ProfileError::DegeneratePolygon {
                vertices: vertices.len(),
            });
        }
        Ok(Self { vertices, bounds })
    }

    /// Axis-aligned rectangle from `min` to `max`.
    pub fn rectangle(min: Point2, max: Point2) -> Result<Self, ProfileError> {
        Self::new(vec![
            min,
            Point2::new(max.x, min.y),
            max,
            Point2::new(min.x, max.y),
        ])
    }

    /// The polygon's vertices in order.
    pub fn vertices(&self) -> &[Point2] {
        &self.vertices
    }

    /// Axis-aligned bounds.
    pub fn bounds(&self) -> &Bounds2 {
        &self.bounds
    }

    /// Point-in-polygon test (even-odd ray casting).
    ///
    /// Points exactly on an edge may fall on either side; callers that
    /// rasterize use cell centres, which never sit on cell-aligned edges.
    pub fn contains(&self, p: &Point2) -> bool {
        if !self.bounds.contains(p) {
            return false;
        }
        let mut inside = false;
        let n = self.vertices.len();
        let mut j = n - 1;
        for i in 0..n {
            let a = self.vertices[i];
            let b = self.vertices[j];
            if (a.y > p.y) != (b.y > p.y) {
                let cross_x = (b.x - a.x) * (p.y - a.y) / (b.y - a.y) + a.x;
                if p.x < cross_x {
                    inside = !inside;
                }
            }
            j = i;
        }
        inside
    }
}
