//! Stroke ordering: decide the sequence and direction strokes print in.
//!
//! The heuristic is greedy nearest-neighbour with optional reversal; it sits
//! behind a plain function signature so a better planner can replace it
//! without touching the compiler.

use pathprint_core::{Point2D, Stroke};

/// A stroke reference plus the direction it should be printed in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OrientedStroke {
    pub index: usize,
    pub reversed: bool,
}

impl OrientedStroke {
    /// Entry point of the stroke when printed in this orientation.
    pub fn start(&self, strokes: &[Stroke]) -> Point2D {
        if self.reversed {
            strokes[self.index].last_point()
        } else {
            strokes[self.index].first_point()
        }
    }

    /// Exit point of the stroke when printed in this orientation.
    pub fn end(&self, strokes: &[Stroke]) -> Point2D {
        if self.reversed {
            strokes[self.index].first_point()
        } else {
            strokes[self.index].last_point()
        }
    }
}

/// Orders strokes to minimize travel greedily: from the current position,
/// pick the stroke whose nearer endpoint is closest, entering at that
/// endpoint. Ties keep input order and prefer the forward direction, so the
/// result is deterministic.
pub fn order_strokes(strokes: &[Stroke], start: Point2D) -> Vec<OrientedStroke> {
    let mut remaining: Vec<usize> = (0..strokes.len()).collect();
    let mut ordered = Vec::with_capacity(strokes.len());
    let mut position = start;

    while !remaining.is_empty() {
        let mut best_slot = 0;
        let mut best_reversed = false;
        let mut best_distance = f64::INFINITY;
        for (slot, &index) in remaining.iter().enumerate() {
            let stroke = &strokes[index];
            let forward = position.distance_to(&stroke.first_point());
            let backward = position.distance_to(&stroke.last_point());
            if forward < best_distance {
                best_distance = forward;
                best_slot = slot;
                best_reversed = false;
            }
            if backward < best_distance {
                best_distance = backward;
                best_slot = slot;
                best_reversed = true;
            }
        }
        let index = remaining.remove(best_slot);
        let oriented = OrientedStroke {
            index,
            reversed: best_reversed,
        };
        position = oriented.end(strokes);
        ordered.push(oriented);
    }
    ordered
}
