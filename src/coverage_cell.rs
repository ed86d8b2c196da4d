//! Per-cell coverage accumulator.
//!
//! A [`CoverageCell`] collects the pieces of a ring that pass through one
//! grid cell as a list of [`Traversal`]s. Once the whole ring has been fed,
//! [`CoverageCell::covered_fraction`] gives the exact fraction of the cell
//! lying to the left of those pieces, i.e. inside the counter-clockwise ring.

use crate::basics::{PointD, RectD};
use crate::cell_box::{crossing, locate, side_of, Location, Side};
use crate::math::calc_polygon_area;
use crate::perimeter::left_hand_area;

// ============================================================================
// Traversal
// ============================================================================

/// One contiguous piece of a ring inside a cell.
///
/// `entry`/`exit` are [`Side::None`] while the piece starts or ends strictly
/// inside the cell (the ring's first vertex, or the ring still in progress).
#[derive(Debug, Clone)]
pub struct Traversal {
    coords: Vec<PointD>,
    entry: Side,
    exit: Side,
}

impl Traversal {
    fn new() -> Self {
        Self {
            coords: Vec::new(),
            entry: Side::None,
            exit: Side::None,
        }
    }

    #[inline]
    pub fn coords(&self) -> &[PointD] {
        &self.coords
    }

    #[inline]
    pub fn entry_side(&self) -> Side {
        self.entry
    }

    #[inline]
    pub fn exit_side(&self) -> Side {
        self.exit
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.coords.is_empty()
    }

    #[inline]
    pub fn is_exited(&self) -> bool {
        self.exit != Side::None
    }

    /// Entered and exited through the cell boundary.
    #[inline]
    pub fn is_traversed(&self) -> bool {
        self.entry != Side::None && self.exit != Side::None
    }

    /// Starts and ends at the same vertex with something in between.
    pub fn is_closed_ring(&self) -> bool {
        self.coords.len() >= 3 && self.coords.first() == self.coords.last()
    }

    /// Holds at least two different coordinates.
    pub fn has_multiple_unique_coordinates(&self) -> bool {
        match self.coords.first() {
            Some(first) => self.coords.iter().any(|c| c != first),
            None => false,
        }
    }

    #[inline]
    pub fn last_coordinate(&self) -> Option<PointD> {
        self.coords.last().copied()
    }

    fn enter(&mut self, p: PointD, side: Side) {
        self.coords.push(p);
        self.entry = side;
    }

    fn exit(&mut self, p: PointD, side: Side) {
        self.coords.push(p);
        self.exit = side;
    }
}

// ============================================================================
// CoverageCell
// ============================================================================

/// Accumulated ring pieces for one cell.
#[derive(Debug, Clone)]
pub struct CoverageCell {
    bbox: RectD,
    traversals: Vec<Traversal>,
}

impl CoverageCell {
    pub fn new(bbox: RectD) -> Self {
        Self {
            bbox,
            traversals: Vec::new(),
        }
    }

    #[inline]
    pub fn traversals(&self) -> &[Traversal] {
        &self.traversals
    }

    #[inline]
    pub fn last_traversal(&self) -> Option<&Traversal> {
        self.traversals.last()
    }

    fn traversal_in_progress(&mut self) -> &mut Traversal {
        if self.traversals.last().map_or(true, Traversal::is_exited) {
            self.traversals.push(Traversal::new());
        }
        let last = self.traversals.len() - 1;
        &mut self.traversals[last]
    }

    /// Feed the next ring coordinate.
    ///
    /// Returns `true` if `p` was consumed (it lies in the closed cell, or it
    /// starts a new traversal). Returns `false` if the segment towards `p`
    /// leaves the cell; the traversal is then closed at the exit point and
    /// `p` must be fed to the neighbouring cell across
    /// [`Traversal::exit_side`].
    pub fn take(&mut self, p: PointD) -> bool {
        let bbox = self.bbox;
        let t = self.traversal_in_progress();

        if t.is_empty() {
            t.enter(p, side_of(&bbox, p));
            return true;
        }

        if locate(&bbox, p) != Location::Outside {
            t.coords.push(p);
            return true;
        }

        let from = t.coords[t.coords.len() - 1];
        let x = crossing(&bbox, from, p);
        t.exit(x.point, x.side);
        false
    }

    /// Close a traversal that ended on the cell boundary without leaving.
    ///
    /// Happens when the ring's closing vertex lies on this cell's edge.
    pub fn force_exit(&mut self) {
        let bbox = self.bbox;
        if let Some(t) = self.traversals.last_mut() {
            if t.is_exited() {
                return;
            }
            if let Some(last) = t.last_coordinate() {
                if locate(&bbox, last) == Location::Boundary {
                    t.exit = side_of(&bbox, last);
                }
            }
        }
    }

    /// Join the ring's opening and closing pieces in the cell holding its
    /// first vertex.
    ///
    /// When the first vertex lies strictly inside the cell, the ring's first
    /// traversal has no entry and its last no exit; together they form one
    /// boundary-to-boundary piece.
    pub fn join_open_ends(&mut self) {
        if self.traversals.len() < 2 {
            return;
        }
        let n = self.traversals.len();
        let joinable = {
            let head = &self.traversals[0];
            let tail = &self.traversals[n - 1];
            head.entry == Side::None
                && tail.exit == Side::None
                && head.coords.first() == tail.coords.last()
        };
        if !joinable {
            return;
        }
        let head = self.traversals.remove(0);
        let tail = &mut self.traversals[n - 2];
        tail.coords.extend_from_slice(&head.coords[1..]);
        tail.exit = head.exit;
    }

    /// Fraction of the cell's area covered by the ring, in `[0, 1]`.
    ///
    /// Call after the whole ring has been fed, [`join_open_ends`] and
    /// [`force_exit`] applied.
    ///
    /// [`join_open_ends`]: Self::join_open_ends
    /// [`force_exit`]: Self::force_exit
    pub fn covered_fraction(&self) -> f64 {
        let cell_area = self.bbox.area();
        if cell_area <= 0.0 {
            return 0.0;
        }

        // Whole ring inside this one cell.
        if self.traversals.len() == 1
            && self.traversals[0].entry == Side::None
            && self.traversals[0].is_closed_ring()
        {
            let a = calc_polygon_area(&self.traversals[0].coords).abs();
            return (a / cell_area).clamp(0.0, 1.0);
        }

        let chains: Vec<&[PointD]> = self
            .traversals
            .iter()
            .filter(|t| t.is_traversed() && t.has_multiple_unique_coordinates())
            .map(|t| t.coords())
            .collect();
        if chains.is_empty() {
            return 0.0;
        }
        (left_hand_area(&self.bbox, &chains) / cell_area).clamp(0.0, 1.0)
    }
}

// ============================================================================
// Tests
// ============================================================================
