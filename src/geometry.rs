//! Polygon model and the capability interface the kernel consumes.
//!
//! The kernel never walks a geometry library's own structures. A backend
//! implements [`PolygonalGeometry`] to hand over its polygon components as
//! [`Polygon`] values; [`Geometry`] is the built-in backend. Point-in-polygon
//! queries go through [`PointLocator`], implemented here by [`PreparedRing`].

use crate::basics::{unite_rectangles, PointD, RectD};
use crate::error::{CoverageError, Result};
use crate::math::calc_polygon_area;

// ============================================================================
// RingRole
// ============================================================================

/// Role of a ring within its polygon.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RingRole {
    /// Outer boundary; adds coverage.
    Exterior,
    /// Hole; removes coverage.
    Interior,
}

impl RingRole {
    /// Sign applied to the ring's coverage when accumulating.
    #[inline]
    pub fn sign(self) -> f64 {
        match self {
            RingRole::Exterior => 1.0,
            RingRole::Interior => -1.0,
        }
    }
}

// ============================================================================
// Ring
// ============================================================================

/// A closed ring, stored counter-clockwise with an explicit closing vertex.
#[derive(Debug, Clone, PartialEq)]
pub struct Ring {
    coords: Vec<PointD>,
    bbox: RectD,
    area: f64,
}

impl Ring {
    /// Build a ring from a vertex sequence.
    ///
    /// The sequence is closed if its last vertex differs from the first and
    /// reversed if it winds clockwise. Fails with
    /// [`CoverageError::InvalidGeometry`] for non-finite coordinates, fewer
    /// than three distinct vertices or zero enclosed area.
    pub fn new(mut coords: Vec<PointD>) -> Result<Self> {
        if coords.iter().any(|p| !(p.x.is_finite() && p.y.is_finite())) {
            return Err(CoverageError::InvalidGeometry(
                "ring has non-finite coordinates".to_string(),
            ));
        }
        let distinct = Self::count_distinct(&coords);
        if distinct < 3 {
            return Err(CoverageError::InvalidGeometry(format!(
                "ring has {} distinct vertices, at least 3 required",
                distinct
            )));
        }
        if coords.first() != coords.last() {
            let first = coords[0];
            coords.push(first);
        }

        let signed = calc_polygon_area(&coords);
        if signed == 0.0 {
            return Err(CoverageError::InvalidGeometry(
                "ring encloses zero area".to_string(),
            ));
        }
        if signed < 0.0 {
            coords.reverse();
        }

        let bbox = RectD::from_points(&coords).ok_or_else(|| {
            CoverageError::InvalidGeometry("ring has no vertices".to_string())
        })?;
        Ok(Self {
            coords,
            bbox,
            area: signed.abs(),
        })
    }

    fn count_distinct(coords: &[PointD]) -> usize {
        let mut distinct: Vec<PointD> = Vec::new();
        for p in coords {
            if !distinct.contains(p) {
                distinct.push(*p);
                if distinct.len() >= 3 {
                    break;
                }
            }
        }
        distinct.len()
    }

    /// Counter-clockwise vertices, first vertex repeated at the end.
    #[inline]
    pub fn coords(&self) -> &[PointD] {
        &self.coords
    }

    #[inline]
    pub fn bbox(&self) -> RectD {
        self.bbox
    }

    /// Enclosed area (always positive).
    #[inline]
    pub fn area(&self) -> f64 {
        self.area
    }

    /// Whether the ring is an axis-aligned rectangle: four distinct
    /// vertices, axis-parallel edges and an area equal to its bbox area.
    pub fn is_rectangle(&self) -> bool {
        if self.coords.len() != 5 {
            return false;
        }
        let axis_aligned = self
            .coords
            .windows(2)
            .all(|w| w[0].x == w[1].x || w[0].y == w[1].y);
        axis_aligned && self.area == self.bbox.area()
    }
}

// ============================================================================
// Polygon
// ============================================================================

/// One exterior ring plus zero or more holes.
#[derive(Debug, Clone, PartialEq)]
pub struct Polygon {
    exterior: Ring,
    interiors: Vec<Ring>,
}

impl Polygon {
    pub fn new(exterior: Ring, interiors: Vec<Ring>) -> Self {
        Self {
            exterior,
            interiors,
        }
    }

    /// Build from raw vertex sequences, validating every ring.
    pub fn from_coords(exterior: Vec<PointD>, interiors: Vec<Vec<PointD>>) -> Result<Self> {
        let exterior = Ring::new(exterior)?;
        let interiors = interiors
            .into_iter()
            .map(Ring::new)
            .collect::<Result<Vec<_>>>()?;
        Ok(Self::new(exterior, interiors))
    }

    /// Axis-aligned rectangle polygon.
    pub fn rectangle(x1: f64, y1: f64, x2: f64, y2: f64) -> Result<Self> {
        Self::from_coords(
            vec![
                PointD::new(x1, y1),
                PointD::new(x2, y1),
                PointD::new(x2, y2),
                PointD::new(x1, y2),
            ],
            Vec::new(),
        )
    }

    #[inline]
    pub fn exterior_ring(&self) -> &Ring {
        &self.exterior
    }

    #[inline]
    pub fn interior_rings(&self) -> &[Ring] {
        &self.interiors
    }

    /// Rings in processing order (exterior first) with their roles.
    pub fn rings(&self) -> impl Iterator<Item = (&Ring, RingRole)> {
        core::iter::once((&self.exterior, RingRole::Exterior))
            .chain(self.interiors.iter().map(|r| (r, RingRole::Interior)))
    }

    /// Bounding box; holes lie inside the exterior so it alone decides.
    #[inline]
    pub fn bbox(&self) -> RectD {
        self.exterior.bbox()
    }

    /// Exterior area minus hole areas.
    pub fn area(&self) -> f64 {
        self.exterior.area() - self.interiors.iter().map(Ring::area).sum::<f64>()
    }
}

// ============================================================================
// Geometry
// ============================================================================

/// Built-in geometry model.
#[derive(Debug, Clone, PartialEq)]
pub enum Geometry {
    Point(PointD),
    LineString(Vec<PointD>),
    Polygon(Polygon),
    MultiPolygon(Vec<Polygon>),
    Collection(Vec<Geometry>),
}

impl Geometry {
    fn kind(&self) -> &'static str {
        match self {
            Geometry::Point(_) => "Point",
            Geometry::LineString(_) => "LineString",
            Geometry::Polygon(_) => "Polygon",
            Geometry::MultiPolygon(_) => "MultiPolygon",
            Geometry::Collection(_) => "GeometryCollection",
        }
    }
}

impl From<Polygon> for Geometry {
    fn from(p: Polygon) -> Self {
        Geometry::Polygon(p)
    }
}

// ============================================================================
// Capability traits
// ============================================================================

/// Polygonal geometry as seen by the coverage kernel.
pub trait PolygonalGeometry {
    /// Decompose into single polygons, flattening multi-part geometries.
    ///
    /// Each entry is one component. A part that is not polygonal, or that
    /// fails ring validation, is reported as an
    /// [`CoverageError::InvalidGeometry`] entry so the caller can decide
    /// whether to abort or skip it.
    fn components(&self) -> Vec<Result<Polygon>>;

    /// Bounding box of each component, in [`components`](Self::components) order.
    fn component_bboxes(&self) -> Vec<Result<RectD>> {
        self.components()
            .into_iter()
            .map(|c| c.map(|p| p.bbox()))
            .collect()
    }
}

/// Union of a set of bounding boxes, `None` if the set is empty.
pub fn union_bbox(bboxes: &[RectD]) -> Option<RectD> {
    let (first, rest) = bboxes.split_first()?;
    Some(rest.iter().fold(*first, |acc, r| unite_rectangles(&acc, r)))
}

impl PolygonalGeometry for Polygon {
    fn components(&self) -> Vec<Result<Polygon>> {
        vec![Ok(self.clone())]
    }
}

impl PolygonalGeometry for Geometry {
    fn components(&self) -> Vec<Result<Polygon>> {
        let mut out = Vec::new();
        // Explicit stack keeps nesting depth off the call stack.
        let mut pending: Vec<&Geometry> = vec![self];
        while let Some(g) = pending.pop() {
            match g {
                Geometry::Polygon(p) => out.push(Ok(p.clone())),
                Geometry::MultiPolygon(ps) => out.extend(ps.iter().cloned().map(Ok)),
                Geometry::Collection(parts) => pending.extend(parts.iter().rev()),
                other => out.push(Err(CoverageError::InvalidGeometry(format!(
                    "expected a polygonal geometry, got {}",
                    other.kind()
                )))),
            }
        }
        out
    }
}

/// Prepared, repeatable point-in-polygon test against a fixed geometry.
pub trait PointLocator {
    /// Whether `p` lies inside. Points exactly on the boundary may go either way.
    fn contains(&self, p: PointD) -> bool;
}

impl<L: PointLocator + ?Sized> PointLocator for &L {
    #[inline]
    fn contains(&self, p: PointD) -> bool {
        (**self).contains(p)
    }
}

/// Crossing-number point locator for a single ring.
pub struct PreparedRing<'a> {
    coords: &'a [PointD],
    bbox: RectD,
}

impl<'a> PreparedRing<'a> {
    pub fn new(ring: &'a Ring) -> Self {
        Self {
            coords: ring.coords(),
            bbox: ring.bbox(),
        }
    }
}

impl PointLocator for PreparedRing<'_> {
    fn contains(&self, p: PointD) -> bool {
        if !self.bbox.hit_test(p.x, p.y) {
            return false;
        }
        let mut inside = false;
        for w in self.coords.windows(2) {
            let (a, b) = (w[0], w[1]);
            if (a.y > p.y) != (b.y > p.y) {
                let x = a.x + (p.y - a.y) * (b.x - a.x) / (b.y - a.y);
                if p.x < x {
                    inside = !inside;
                }
            }
        }
        inside
    }
}

// ============================================================================
// Tests
// ============================================================================
