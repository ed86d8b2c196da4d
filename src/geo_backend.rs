//! [`PolygonalGeometry`] for the `geo` crate's geometry types.
//!
//! Enabled by the `geo` feature. Each `geo` polygon is converted ring by
//! ring into a [`Polygon`]; a degenerate ring fails only its own component.

use geo::{Coord, LineString};

use crate::basics::PointD;
use crate::error::{CoverageError, Result};
use crate::geometry::{Polygon, PolygonalGeometry};

fn ring_points(ring: &LineString<f64>) -> Vec<PointD> {
    ring.coords().map(|c: &Coord<f64>| PointD::new(c.x, c.y)).collect()
}

fn convert(polygon: &geo::Polygon<f64>) -> Result<Polygon> {
    Polygon::from_coords(
        ring_points(polygon.exterior()),
        polygon.interiors().iter().map(ring_points).collect(),
    )
}

impl PolygonalGeometry for geo::Polygon<f64> {
    fn components(&self) -> Vec<Result<Polygon>> {
        vec![convert(self)]
    }
}

impl PolygonalGeometry for geo::MultiPolygon<f64> {
    fn components(&self) -> Vec<Result<Polygon>> {
        self.0.iter().map(convert).collect()
    }
}

impl PolygonalGeometry for geo::Geometry<f64> {
    fn components(&self) -> Vec<Result<Polygon>> {
        let mut out = Vec::new();
        let mut pending: Vec<&geo::Geometry<f64>> = vec![self];
        while let Some(g) = pending.pop() {
            match g {
                geo::Geometry::Polygon(p) => out.push(convert(p)),
                geo::Geometry::MultiPolygon(mp) => out.extend(mp.0.iter().map(convert)),
                geo::Geometry::Rect(r) => out.push(convert(&r.to_polygon())),
                geo::Geometry::Triangle(t) => out.push(convert(&t.to_polygon())),
                geo::Geometry::GeometryCollection(gc) => pending.extend(gc.0.iter().rev()),
                other => out.push(Err(CoverageError::InvalidGeometry(format!(
                    "expected a polygonal geometry, got {}",
                    kind(other)
                )))),
            }
        }
        out
    }
}

fn kind(g: &geo::Geometry<f64>) -> &'static str {
    match g {
        geo::Geometry::Point(_) => "Point",
        geo::Geometry::Line(_) => "Line",
        geo::Geometry::LineString(_) => "LineString",
        geo::Geometry::MultiPoint(_) => "MultiPoint",
        geo::Geometry::MultiLineString(_) => "MultiLineString",
        _ => "Geometry",
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grid::Grid;
    use crate::rasterizer_coverage::compute_coverage;
    use geo::{coord, polygon, Rect};

    #[test]
    fn test_polygon_with_hole() {
        let p = polygon!(
            exterior: [
                (x: 0.0, y: 0.0),
                (x: 10.0, y: 0.0),
                (x: 10.0, y: 10.0),
                (x: 0.0, y: 10.0),
            ],
            interiors: [[
                (x: 3.0, y: 3.0),
                (x: 7.0, y: 3.0),
                (x: 7.0, y: 7.0),
                (x: 3.0, y: 7.0),
            ]],
        );
        let grid = Grid::new(0.0, 0.0, 1.0, 1.0, 10, 10).unwrap();
        let res = compute_coverage(&grid, &p, None).unwrap();
        assert_eq!(res.sum(), 84.0);
    }

    #[test]
    fn test_geometry_collection() {
        let rect = Rect::new(coord! { x: 1.0, y: 1.0 }, coord! { x: 3.0, y: 2.0 });
        let g = geo::Geometry::GeometryCollection(geo::GeometryCollection(vec![
            geo::Geometry::Rect(rect),
            geo::Geometry::Point(geo::Point::new(0.0, 0.0)),
        ]));
        let parts = g.components();
        assert_eq!(parts.len(), 2);
        assert_eq!(parts[0].as_ref().map(Polygon::area), Ok(2.0));
        assert!(parts[1].is_err());
    }

    #[test]
    fn test_degenerate_component_fails_alone() {
        let good = polygon![(x: 0.0, y: 0.0), (x: 1.0, y: 0.0), (x: 0.0, y: 1.0)];
        let flat = polygon![(x: 0.0, y: 0.0), (x: 1.0, y: 1.0), (x: 2.0, y: 2.0)];
        let mp = geo::MultiPolygon(vec![good, flat]);
        let parts = mp.components();
        assert!(parts[0].is_ok());
        assert!(matches!(parts[1], Err(CoverageError::InvalidGeometry(_))));
    }
}
