use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::constants::PROXIMITY_DIVISOR;
use crate::layout::{BubbleState, Bounds};

/// Connector between two bubbles close enough to draw a line.
///
/// `a` is always the bubble that comes first in the state slice.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct ProximityEdge {
    pub a: Uuid,
    pub b: Uuid,
    pub distance: f64,
}

impl ProximityEdge {
    pub fn touches(&self, id: Uuid) -> bool {
        self.a == id || self.b == id
    }
}

/// One third of the surface diagonal.
pub fn proximity_threshold(bounds: &Bounds) -> f64 {
    bounds.diagonal() / PROXIMITY_DIVISOR
}

/// All unordered pairs within the threshold. Quadratic in bubble count,
/// which display selection keeps small.
pub fn edges_for(states: &[BubbleState], bounds: &Bounds) -> Vec<ProximityEdge> {
    let threshold = proximity_threshold(bounds);
    let mut edges = Vec::new();
    for (i, a) in states.iter().enumerate() {
        for b in &states[i + 1..] {
            let distance = a.distance_to(b);
            if distance <= threshold {
                edges.push(ProximityEdge {
                    a: a.id,
                    b: b.id,
                    distance,
                });
            }
        }
    }
    edges
}

/// Rendering policy helper: drop edges that touch `id`.
pub fn without_bubble(edges: Vec<ProximityEdge>, id: Option<Uuid>) -> Vec<ProximityEdge> {
    match id {
        Some(id) => edges.into_iter().filter(|e| !e.touches(id)).collect(),
        None => edges,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use proptest::prelude::*;
    use std::collections::HashSet;

    fn at(n: u128, x: f64, y: f64) -> BubbleState {
        BubbleState {
            id: Uuid::from_u128(n),
            label: String::new(),
            x,
            y,
            dx: 0.0,
            dy: 0.0,
            paused: false,
            color: crate::palette::HUE_UNVOTED,
            score: 0,
        }
    }

    #[test]
    fn test_threshold_is_third_of_diagonal() {
        let t = proximity_threshold(&Bounds::default());
        assert_relative_eq!(t, (2.0f64).sqrt() * 100.0 / 3.0, epsilon = 1e-12);
    }

    #[test]
    fn test_close_pair_connected_far_pair_not() {
        let bounds = Bounds::default();
        let states = vec![at(1, 10.0, 10.0), at(2, 30.0, 10.0), at(3, 90.0, 80.0)];
        let edges = edges_for(&states, &bounds);
        assert_eq!(edges.len(), 1);
        assert_eq!(edges[0].a, Uuid::from_u128(1));
        assert_eq!(edges[0].b, Uuid::from_u128(2));
        assert_relative_eq!(edges[0].distance, 20.0);
    }

    #[test]
    fn test_pair_exactly_at_threshold_included() {
        let bounds = Bounds::new(90.0, 120.0); // diagonal 150, threshold 50
        let states = vec![at(1, 0.0, 0.0), at(2, 30.0, 40.0)];
        assert_eq!(edges_for(&states, &bounds).len(), 1);
    }

    #[test]
    fn test_single_and_empty_sets() {
        let bounds = Bounds::default();
        assert!(edges_for(&[], &bounds).is_empty());
        assert!(edges_for(&[at(1, 50.0, 50.0)], &bounds).is_empty());
    }

    #[test]
    fn test_without_bubble_filters_focused() {
        let bounds = Bounds::default();
        let states = vec![at(1, 50.0, 50.0), at(2, 51.0, 50.0), at(3, 52.0, 50.0)];
        let edges = edges_for(&states, &bounds);
        assert_eq!(edges.len(), 3);
        let kept = without_bubble(edges, Some(Uuid::from_u128(2)));
        assert_eq!(kept.len(), 1);
        assert!(!kept[0].touches(Uuid::from_u128(2)));
    }

    proptest! {
        #[test]
        fn prop_no_mirrored_edges(points in proptest::collection::vec((0.0f64..100.0, 0.0f64..100.0), 0..12)) {
            let states: Vec<BubbleState> = points
                .iter()
                .enumerate()
                .map(|(i, &(x, y))| at(i as u128, x, y))
                .collect();
            let edges = edges_for(&states, &Bounds::default());
            let mut seen = HashSet::new();
            for e in &edges {
                prop_assert!(e.a != e.b);
                prop_assert!(!seen.contains(&(e.b, e.a)));
                prop_assert!(seen.insert((e.a, e.b)));
            }
            // Reversing the slice yields the same unordered pairs.
            let mut reversed = states.clone();
            reversed.reverse();
            let rev_edges = edges_for(&reversed, &Bounds::default());
            prop_assert_eq!(rev_edges.len(), edges.len());
            for e in &rev_edges {
                prop_assert!(seen.contains(&(e.b, e.a)));
            }
        }
    }
}
