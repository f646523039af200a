//! # Containment Geometry
//!
//! Planar point-in-region classification for country boundaries.
//!
//! | Type | Test |
//! |------|------|
//! | [`Ring`] | winding number of a closed ring around the point |
//! | [`Polygon`] | ring parity: even rings add area, odd rings are holes |
//! | [`RegionGeometry`] | a single polygon, or the union of several |
//!
//! ## Coordinate System
//!
//! Coordinates are plain `geo::Coord<f64>` values with `x = longitude` and
//! `y = latitude` in degrees. No projection is applied: containment is
//! decided in the plane, which is accurate enough for country lookups away
//! from the poles and the antimeridian.
//!
//! ## Winding Number
//!
//! A ring contains a point when it winds around it a non-zero number of
//! times. Every edge `prev -> v` that crosses the horizontal line through
//! the point contributes `+1` (upward, point on the left) or `-1`
//! (downward, point on the right). The last vertex precedes the first, so
//! rings do not need an explicit closing vertex (a duplicated one is a
//! zero-length edge and contributes nothing).
//!
//! Points exactly on an edge are classified by the strict inequalities of
//! the scan; the result there is not guaranteed to be consistent.
//!
//! Reference: Numerical Recipes, 3rd ed., section 21.4.3 "Polygons".

use geo::{Coord, Rect};

use crate::error::ContainmentError;

// =============================================================================
// Ring
// =============================================================================

/// A closed sequence of vertices forming one boundary of a polygon.
#[derive(Debug, Clone, PartialEq)]
pub struct Ring {
    coords: Vec<Coord>,
}

impl Ring {
    /// Create a ring from its vertices.
    ///
    /// The ring is not validated here; a ring with fewer than three vertices
    /// is rejected when it is first used for classification.
    pub fn new(coords: Vec<Coord>) -> Self {
        Self { coords }
    }

    /// Create a ring from `(x, y)` pairs.
    ///
    /// ```
    /// use country_timeline::Ring;
    ///
    /// let square = Ring::from_xy(&[(0.0, 0.0), (0.0, 1.0), (1.0, 1.0), (1.0, 0.0)]);
    /// assert!(square.contains(geo::coord! { x: 0.5, y: 0.5 }).unwrap());
    /// ```
    pub fn from_xy(points: &[(f64, f64)]) -> Self {
        Self::new(points.iter().map(|&(x, y)| Coord { x, y }).collect())
    }

    pub fn coords(&self) -> &[Coord] {
        &self.coords
    }

    /// Number of distinct vertices, not counting a closing duplicate of the first.
    pub fn vertex_count(&self) -> usize {
        match (self.coords.first(), self.coords.last()) {
            (Some(first), Some(last)) if self.coords.len() > 1 && first == last => {
                self.coords.len() - 1
            }
            _ => self.coords.len(),
        }
    }

    /// Check whether the ring winds around `point`.
    ///
    /// Fails with [`ContainmentError::Geometry`] for rings with fewer than
    /// three vertices.
    pub fn contains(&self, point: Coord) -> Result<bool, ContainmentError> {
        if self.vertex_count() < 3 {
            return Err(ContainmentError::Geometry(format!(
                "ring has {} vertices, at least 3 required",
                self.vertex_count()
            )));
        }
        Ok(winding_number(&self.coords, point) != 0)
    }
}

/// Signed number of times the closed ring `coords` winds around `point`.
fn winding_number(coords: &[Coord], point: Coord) -> i32 {
    let Some(&last) = coords.last() else {
        return 0;
    };

    let mut wind = 0;
    let mut prev = last;
    for &v in coords {
        // (prev - point) x (v - point): > 0 when point is left of prev -> v
        let cross = (prev.x - point.x) * (v.y - point.y) - (prev.y - point.y) * (v.x - point.x);
        if prev.y < point.y {
            if v.y > point.y && cross > 0.0 {
                wind += 1;
            }
        } else if v.y <= point.y && cross < 0.0 {
            wind -= 1;
        }
        prev = v;
    }
    wind
}

// =============================================================================
// Polygon
// =============================================================================

/// A polygon as an ordered list of rings.
///
/// Ring 0 is the outer boundary. After that, rings alternate by position:
/// odd rings are holes, even rings are islands inside the preceding hole.
#[derive(Debug, Clone, PartialEq)]
pub struct Polygon {
    rings: Vec<Ring>,
}

impl Polygon {
    pub fn new(rings: Vec<Ring>) -> Self {
        Self { rings }
    }

    pub fn rings(&self) -> &[Ring] {
        &self.rings
    }

    /// Check whether `point` lies inside the polygon.
    ///
    /// Rings are tested in order. The first even ring that misses the point
    /// rejects it; the first odd ring (hole) that misses the point accepts
    /// it, since the point is then inside the enclosing ring but outside the
    /// hole. If every ring contains the point, the innermost ring decides:
    /// an odd ring count means it was an island.
    ///
    /// ```
    /// use country_timeline::{Polygon, Ring};
    ///
    /// let polygon = Polygon::new(vec![
    ///     Ring::from_xy(&[(0.0, 0.0), (0.0, 4.0), (4.0, 4.0), (4.0, 0.0)]),
    ///     Ring::from_xy(&[(1.0, 1.0), (1.0, 2.0), (2.0, 2.0), (2.0, 1.0)]),
    /// ]);
    /// assert!(polygon.contains(geo::coord! { x: 3.0, y: 3.0 }).unwrap());
    /// assert!(!polygon.contains(geo::coord! { x: 1.5, y: 1.5 }).unwrap());
    /// ```
    pub fn contains(&self, point: Coord) -> Result<bool, ContainmentError> {
        if self.rings.is_empty() {
            return Err(ContainmentError::Geometry("polygon has no rings".to_string()));
        }

        for (i, ring) in self.rings.iter().enumerate() {
            let in_ring = ring.contains(point)?;
            if !in_ring {
                // outside an outer/island ring => outside; outside a hole => inside
                return Ok(i % 2 == 1);
            }
        }
        Ok(self.rings.len() % 2 == 1)
    }

    fn extend_bounds(&self, bounds: &mut Option<(Coord, Coord)>) {
        for c in self.rings.iter().flat_map(|r| r.coords()) {
            let (min, max) = bounds.get_or_insert((*c, *c));
            min.x = min.x.min(c.x);
            min.y = min.y.min(c.y);
            max.x = max.x.max(c.x);
            max.y = max.y.max(c.y);
        }
    }
}

impl From<&geo::Polygon<f64>> for Polygon {
    /// Exterior ring first, then the interiors in order.
    fn from(polygon: &geo::Polygon<f64>) -> Self {
        let rings = std::iter::once(polygon.exterior())
            .chain(polygon.interiors())
            .map(|ls| Ring::new(ls.0.clone()))
            .collect();
        Self::new(rings)
    }
}

// =============================================================================
// Region geometry
// =============================================================================

/// Backing geometry of a named region.
#[derive(Debug, Clone, PartialEq)]
pub enum RegionGeometry {
    Polygon(Polygon),
    /// Union of polygons: inside if inside any member.
    MultiPolygon(Vec<Polygon>),
    /// Any other geometry kind, kept by name so classification can report it.
    Unsupported(String),
}

impl RegionGeometry {
    pub fn contains(&self, point: Coord) -> Result<bool, ContainmentError> {
        match self {
            RegionGeometry::Polygon(polygon) => polygon.contains(point),
            RegionGeometry::MultiPolygon(polygons) => {
                for polygon in polygons {
                    if polygon.contains(point)? {
                        return Ok(true);
                    }
                }
                Ok(false)
            }
            RegionGeometry::Unsupported(kind) => {
                Err(ContainmentError::UnsupportedGeometry(kind.clone()))
            }
        }
    }

    /// Bounding rectangle of every vertex, or `None` for empty or unsupported geometry.
    pub fn envelope(&self) -> Option<Rect> {
        let mut bounds = None;
        match self {
            RegionGeometry::Polygon(polygon) => polygon.extend_bounds(&mut bounds),
            RegionGeometry::MultiPolygon(polygons) => {
                polygons.iter().for_each(|p| p.extend_bounds(&mut bounds))
            }
            RegionGeometry::Unsupported(_) => {}
        }
        bounds.map(|(min, max)| Rect::new(min, max))
    }

    pub fn kind(&self) -> &str {
        match self {
            RegionGeometry::Polygon(_) => "Polygon",
            RegionGeometry::MultiPolygon(_) => "MultiPolygon",
            RegionGeometry::Unsupported(kind) => kind,
        }
    }
}

impl From<&geo::Geometry<f64>> for RegionGeometry {
    fn from(geometry: &geo::Geometry<f64>) -> Self {
        match geometry {
            geo::Geometry::Polygon(p) => RegionGeometry::Polygon(p.into()),
            geo::Geometry::MultiPolygon(mp) => {
                RegionGeometry::MultiPolygon(mp.0.iter().map(Polygon::from).collect())
            }
            geo::Geometry::Point(_) => RegionGeometry::Unsupported("Point".into()),
            geo::Geometry::Line(_) => RegionGeometry::Unsupported("Line".into()),
            geo::Geometry::LineString(_) => RegionGeometry::Unsupported("LineString".into()),
            geo::Geometry::MultiPoint(_) => RegionGeometry::Unsupported("MultiPoint".into()),
            geo::Geometry::MultiLineString(_) => {
                RegionGeometry::Unsupported("MultiLineString".into())
            }
            geo::Geometry::GeometryCollection(_) => {
                RegionGeometry::Unsupported("GeometryCollection".into())
            }
            geo::Geometry::Rect(_) => RegionGeometry::Unsupported("Rect".into()),
            geo::Geometry::Triangle(_) => RegionGeometry::Unsupported("Triangle".into()),
        }
    }
}

impl From<geo::Geometry<f64>> for RegionGeometry {
    fn from(geometry: geo::Geometry<f64>) -> Self {
        (&geometry).into()
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
