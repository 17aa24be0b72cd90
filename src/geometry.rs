//! Integer 2D geometry for the rasterizer
//!
//! [`Polygon`] is an immutable closed vertex loop; edge `i` runs from vertex
//! `i` to vertex `i + 1`, and the last edge wraps back to the first vertex.

use serde::{Deserialize, Serialize};

/// A lattice point in pixel space
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct Point {
    pub x: i64,
    pub y: i64,
}

impl Point {
    pub fn new(x: i64, y: i64) -> Self {
        Self { x, y }
    }
}

impl From<(i64, i64)> for Point {
    fn from((x, y): (i64, i64)) -> Self {
        Self { x, y }
    }
}

/// Axis-aligned bounding box, inclusive on both ends
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Bounds {
    pub min_x: i64,
    pub min_y: i64,
    pub max_x: i64,
    pub max_y: i64,
}

/// Directed segment between two polygon vertices
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Edge {
    pub from: Point,
    pub to: Point,
}

/// A simple polygon defined by vertices
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Polygon {
    vertices: Vec<Point>,
}

impl Polygon {
    pub fn new(vertices: Vec<Point>) -> Self {
        Self { vertices }
    }

    pub fn from_coords(coords: &[(i64, i64)]) -> Self {
        Self::new(coords.iter().copied().map(Point::from).collect())
    }

    pub fn vertices(&self) -> &[Point] {
        &self.vertices
    }

    pub fn len(&self) -> usize {
        self.vertices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.vertices.is_empty()
    }

    /// At least three vertices
    pub fn is_closed(&self) -> bool {
        self.vertices.len() >= 3
    }

    /// Edge `index`, wrapping from the last vertex to the first
    pub fn edge(&self, index: usize) -> Edge {
        let next = if index + 1 == self.vertices.len() {
            0
        } else {
            index + 1
        };
        Edge {
            from: self.vertices[index],
            to: self.vertices[next],
        }
    }

    /// All edges, including the closing edge
    pub fn edges(&self) -> impl Iterator<Item = Edge> + '_ {
        (0..self.vertices.len()).map(move |i| self.edge(i))
    }

    /// Get the bounding box, or None for an empty polygon
    pub fn bounds(&self) -> Option<Bounds> {
        let first = self.vertices.first()?;
        let mut b = Bounds {
            min_x: first.x,
            min_y: first.y,
            max_x: first.x,
            max_y: first.y,
        };
        for v in &self.vertices {
            b.min_x = b.min_x.min(v.x);
            b.min_y = b.min_y.min(v.y);
            b.max_x = b.max_x.max(v.x);
            b.max_y = b.max_y.max(v.y);
        }
        Some(b)
    }

    /// Collect the x coordinates where scanline `y` meets the outline,
    /// sorted ascending, into `out` (cleared first).
    ///
    /// An edge crossing `y` contributes one point, found by linear
    /// interpolation; crossings are half-open so a shared vertex between a
    /// rising and a falling edge is counted once per edge. An edge lying on
    /// `y` contributes both endpoints.
    pub fn scanline_intersections(&self, y: i64, out: &mut Vec<i64>) {
        out.clear();

        let crossing = |above: Point, below: Point| -> i64 {
            // above.y >= y > below.y, so the divisor is never zero
            let f = (y - below.y) as f64 / (above.y - below.y) as f64;
            (below.x as f64 + (above.x - below.x) as f64 * f) as i64
        };

        for edge in self.edges() {
            let (p1, p2) = (edge.from, edge.to);
            if p1.y >= y && p2.y < y {
                out.push(crossing(p1, p2));
            }
            if p1.y < y && p2.y >= y {
                out.push(crossing(p2, p1));
            }
            if p1.y == y && p2.y == y {
                out.push(p1.x);
                out.push(p2.x);
            }
        }

        out.sort_unstable();
    }
}

/// Walk an integer Bresenham line from `(x1, y1)` to `(x2, y2)`, calling
/// `plot` for every point. Both endpoints are visited; the major axis is the
/// one with the larger absolute delta and advances by one each step.
pub fn bresenham(x1: i64, y1: i64, x2: i64, y2: i64, mut plot: impl FnMut(i64, i64)) {
    let dx = (x2 - x1).abs();
    let dy = (y2 - y1).abs();
    let step_x = (x2 - x1).signum();
    let step_y = (y2 - y1).signum();

    let mut x = x1;
    let mut y = y1;

    if dx > dy {
        let mut err = 2 * dy - dx;
        for _ in 0..=dx {
            plot(x, y);
            if err < 0 {
                err += 2 * dy;
            } else {
                y += step_y;
                err += 2 * dy - 2 * dx;
            }
            x += step_x;
        }
    } else {
        let mut err = 2 * dx - dy;
        for _ in 0..=dy {
            plot(x, y);
            if err < 0 {
                err += 2 * dx;
            } else {
                x += step_x;
                err += 2 * dx - 2 * dy;
            }
            y += step_y;
        }
    }
}
