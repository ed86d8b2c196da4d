//! Area to the left of a set of boundary-to-boundary chains inside a box.
//!
//! Each chain enters the box on its perimeter and leaves it on its
//! perimeter, with the covered region on its left (rings are stored
//! counter-clockwise). The covered region's outline alternates between
//! chains and pieces of the box perimeter walked counter-clockwise, so the
//! outline is rebuilt by following, from each chain's exit, the perimeter
//! counter-clockwise to the nearest chain entry.
//!
//! Positions on the perimeter are measured clockwise from the lower-left
//! corner: up the left side, right along the top, down the right side and
//! left along the bottom.

use crate::basics::{PointD, RectD};
use crate::math::calc_polygon_area;

/// Clockwise distance along the perimeter from the lower-left corner to `p`.
///
/// `p` must lie on the box boundary.
pub fn perimeter_distance(b: &RectD, p: PointD) -> f64 {
    let (w, h) = (b.width(), b.height());
    if p.x == b.x1 {
        p.y - b.y1
    } else if p.y == b.y2 {
        h + (p.x - b.x1)
    } else if p.x == b.x2 {
        h + w + (b.y2 - p.y)
    } else {
        2.0 * h + w + (b.x2 - p.x)
    }
}

/// Counter-clockwise distance along the perimeter from `from` to `to`.
#[inline]
fn ccw_distance(from: f64, to: f64, perimeter: f64) -> f64 {
    if to <= from {
        from - to
    } else {
        perimeter + from - to
    }
}

struct Chain<'a> {
    start: f64,
    stop: f64,
    coords: &'a [PointD],
    visited: bool,
}

/// Total area enclosed to the left of `chains` within `b`.
///
/// Every chain must start and end on the boundary of `b` and chains must
/// not cross each other.
pub fn left_hand_area(b: &RectD, chains: &[&[PointD]]) -> f64 {
    let perimeter = 2.0 * (b.width() + b.height());
    let corners = [
        (0.0, PointD::new(b.x1, b.y1)),
        (b.height(), PointD::new(b.x1, b.y2)),
        (b.height() + b.width(), PointD::new(b.x2, b.y2)),
        (2.0 * b.height() + b.width(), PointD::new(b.x2, b.y1)),
    ];

    let mut chains: Vec<Chain> = chains
        .iter()
        .filter(|c| !c.is_empty())
        .map(|c| Chain {
            start: perimeter_distance(b, c[0]),
            stop: perimeter_distance(b, c[c.len() - 1]),
            coords: *c,
            visited: false,
        })
        .collect();
    chains.sort_by(|p, q| p.stop.total_cmp(&q.stop));

    let mut sum = 0.0;
    let mut outline: Vec<PointD> = Vec::new();
    for first in 0..chains.len() {
        if chains[first].visited {
            continue;
        }
        outline.clear();
        let mut cur = first;
        loop {
            chains[cur].visited = true;
            outline.extend_from_slice(chains[cur].coords);
            let exit = chains[cur].stop;

            let mut next = first;
            let mut best = f64::INFINITY;
            for (k, cand) in chains.iter().enumerate() {
                if cand.visited && k != first {
                    continue;
                }
                let mut d = ccw_distance(exit, cand.start, perimeter);
                // A lone chain that leaves where it entered encloses the
                // area left of its own loop; a clockwise loop therefore
                // wraps the whole perimeter.
                if k == cur && d == 0.0 && calc_polygon_area(cand.coords) < 0.0 {
                    d = perimeter;
                }
                if d < best {
                    best = d;
                    next = k;
                }
            }

            let mut passed: Vec<(f64, PointD)> = corners
                .iter()
                .map(|&(m, p)| (ccw_distance(exit, m, perimeter), p))
                .filter(|&(d, _)| d > 0.0 && d < best)
                .collect();
            passed.sort_by(|p, q| p.0.total_cmp(&q.0));
            outline.extend(passed.into_iter().map(|(_, p)| p));

            if next == first {
                break;
            }
            cur = next;
        }
        sum += calc_polygon_area(&outline);
    }
    sum
}

// ============================================================================
// Tests
// ============================================================================
