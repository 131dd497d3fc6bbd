//! Bubble placement and per-frame motion.
//!
//! Bubbles are uncoupled: each moves in a straight line and reflects off the
//! travel rectangle. The engine holds only geometry, never bubble state, so a
//! caller can restart it from any snapshot of [`BubbleState`]s.

use rand::Rng;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::constants::{
    SPAWN_INSET_BOTTOM, SPAWN_INSET_TOP, SPAWN_INSET_X, SPEED_RANGE, SURFACE_HEIGHT,
    SURFACE_WIDTH, TRAVEL_INSET_BOTTOM, TRAVEL_INSET_TOP, TRAVEL_INSET_X, VELOCITY_DAMPING,
};
use crate::idea::Idea;
use crate::palette::{Color, color_for};

/// Axis-aligned rectangle, inclusive on all edges.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Rect {
    pub min_x: f64,
    pub min_y: f64,
    pub max_x: f64,
    pub max_y: f64,
}

impl Rect {
    pub fn contains(&self, x: f64, y: f64) -> bool {
        (self.min_x..=self.max_x).contains(&x) && (self.min_y..=self.max_y).contains(&y)
    }

    /// Uniform point in `[min, max)` on both axes.
    pub fn random_point(&self, rng: &mut impl Rng) -> (f64, f64) {
        let x = self.min_x + rng.random::<f64>() * (self.max_x - self.min_x);
        let y = self.min_y + rng.random::<f64>() * (self.max_y - self.min_y);
        (x, y)
    }
}

/// Rendering surface geometry.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Bounds {
    pub width: f64,
    pub height: f64,
}

impl Default for Bounds {
    fn default() -> Self {
        Self {
            width: SURFACE_WIDTH,
            height: SURFACE_HEIGHT,
        }
    }
}

impl Bounds {
    pub fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }

    fn inset(&self, x: f64, top: f64, bottom: f64) -> Rect {
        Rect {
            min_x: self.width * x,
            min_y: self.height * top,
            max_x: self.width * (1.0 - x),
            max_y: self.height * (1.0 - bottom),
        }
    }

    /// Rectangle bubbles bounce inside.
    pub fn travel_rect(&self) -> Rect {
        self.inset(TRAVEL_INSET_X, TRAVEL_INSET_TOP, TRAVEL_INSET_BOTTOM)
    }

    /// Rectangle fresh bubbles are dropped into. Lies inside the travel rect.
    pub fn spawn_rect(&self) -> Rect {
        self.inset(SPAWN_INSET_X, SPAWN_INSET_TOP, SPAWN_INSET_BOTTOM)
    }

    pub fn diagonal(&self) -> f64 {
        self.width.hypot(self.height)
    }

    /// Both sides finite and strictly positive.
    pub fn is_valid(&self) -> bool {
        self.width.is_finite() && self.width > 0.0 && self.height.is_finite() && self.height > 0.0
    }
}

/// Transient render state for one idea.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct BubbleState {
    pub id: Uuid,
    pub label: String,
    pub x: f64,
    pub y: f64,
    pub dx: f64,
    pub dy: f64,
    pub paused: bool,
    pub color: Color,
    /// Score as displayed; may run ahead of the store after an optimistic vote.
    pub score: u32,
}

impl BubbleState {
    pub fn distance_to(&self, other: &Self) -> f64 {
        (self.x - other.x).hypot(self.y - other.y)
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct LayoutEngine {
    bounds: Bounds,
}

impl LayoutEngine {
    pub fn new(bounds: Bounds) -> Self {
        Self { bounds }
    }

    pub fn bounds(&self) -> Bounds {
        self.bounds
    }

    /// Place each idea at a random spawn point with a small random velocity.
    /// Colors are relative to the highest score among `items`.
    pub fn initialize(&self, items: &[Idea], rng: &mut impl Rng) -> Vec<BubbleState> {
        let max_score = items.iter().map(|i| i.score).max().unwrap_or(0);
        let spawn = self.bounds.spawn_rect();

        items
            .iter()
            .map(|idea| {
                let dx = (rng.random::<f64>() - 0.5) * SPEED_RANGE * self.bounds.width;
                let dy = (rng.random::<f64>() - 0.5) * SPEED_RANGE * self.bounds.height;
                let (x, y) = spawn.random_point(rng);
                BubbleState {
                    id: idea.id,
                    label: idea.title.clone(),
                    x,
                    y,
                    dx: dx * VELOCITY_DAMPING,
                    dy: dy * VELOCITY_DAMPING,
                    paused: false,
                    color: color_for(idea.score, max_score),
                    score: idea.score,
                }
            })
            .collect()
    }

    /// One frame of motion, returning the next states.
    pub fn advance(&self, states: &[BubbleState], dt: f64) -> Vec<BubbleState> {
        let mut next = states.to_vec();
        self.advance_in_place(&mut next, dt);
        next
    }

    /// Move every unpaused bubble by `velocity * dt`, reflecting at the
    /// travel rectangle. `dt = 1.0` is one frame. Non-finite `dt` is a no-op.
    pub fn advance_in_place(&self, states: &mut [BubbleState], dt: f64) {
        if !dt.is_finite() {
            return;
        }
        let rect = self.bounds.travel_rect();
        for bubble in states.iter_mut().filter(|b| !b.paused) {
            bubble.x += bubble.dx * dt;
            bubble.y += bubble.dy * dt;
            reflect(&mut bubble.x, &mut bubble.dx, rect.min_x, rect.max_x);
            reflect(&mut bubble.y, &mut bubble.dy, rect.min_y, rect.max_y);
        }
    }
}

/// Flip the velocity when the coordinate left `[lo, hi]`, then clamp.
fn reflect(pos: &mut f64, vel: &mut f64, lo: f64, hi: f64) {
    if *pos < lo || *pos > hi {
        *vel = -*vel;
    }
    *pos = pos.clamp(lo, hi);
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use proptest::prelude::*;
    use rand::SeedableRng;
    use rand::rngs::SmallRng;

    fn rng() -> SmallRng {
        SmallRng::seed_from_u64(42)
    }

    fn ideas(scores: &[u32]) -> Vec<Idea> {
        scores
            .iter()
            .enumerate()
            .map(|(i, &score)| Idea {
                id: Uuid::from_u128(i as u128 + 1),
                title: format!("idea {i}"),
                description: String::new(),
                submitter_name: None,
                lightning_address: None,
                tags: Vec::new(),
                created_at: String::new(),
                score,
                exclude_from_display: false,
            })
            .collect()
    }

    fn bubble(x: f64, y: f64, dx: f64, dy: f64) -> BubbleState {
        BubbleState {
            id: Uuid::from_u128(1),
            label: String::new(),
            x,
            y,
            dx,
            dy,
            paused: false,
            color: crate::palette::HUE_UNVOTED,
            score: 0,
        }
    }

    #[test]
    fn test_default_rects_match_viewport_units() {
        let bounds = Bounds::default();
        let travel = bounds.travel_rect();
        assert_relative_eq!(travel.min_x, 5.0);
        assert_relative_eq!(travel.max_x, 95.0);
        assert_relative_eq!(travel.min_y, 5.0);
        assert_relative_eq!(travel.max_y, 85.0);

        let spawn = bounds.spawn_rect();
        assert_relative_eq!(spawn.min_x, 10.0);
        assert_relative_eq!(spawn.max_x, 90.0);
        assert_relative_eq!(spawn.min_y, 10.0);
        assert_relative_eq!(spawn.max_y, 70.0);
    }

    #[test]
    fn test_bounds_validity() {
        assert!(Bounds::default().is_valid());
        assert!(!Bounds::new(-10.0, 100.0).is_valid());
        assert!(!Bounds::new(100.0, 0.0).is_valid());
        assert!(!Bounds::new(f64::NAN, 100.0).is_valid());
        assert!(!Bounds::new(100.0, f64::INFINITY).is_valid());
    }

    #[test]
    fn test_initialize_places_inside_spawn_rect() {
        let engine = LayoutEngine::default();
        let states = engine.initialize(&ideas(&[0; 10]), &mut rng());
        let spawn = engine.bounds().spawn_rect();

        assert_eq!(states.len(), 10);
        for s in &states {
            assert!(spawn.contains(s.x, s.y), "({}, {}) outside spawn", s.x, s.y);
            assert!(!s.paused);
        }
    }

    #[test]
    fn test_initial_velocity_is_damped() {
        let engine = LayoutEngine::default();
        let states = engine.initialize(&ideas(&[0; 50]), &mut rng());
        // 0.16 / 2 * 0.7 on the default surface
        let cap = 0.056 + 1e-12;
        for s in &states {
            assert!(s.dx.abs() <= cap && s.dy.abs() <= cap, "velocity too fast: {s:?}");
        }
    }

    #[test]
    fn test_initialize_colors_relative_to_set_max() {
        let engine = LayoutEngine::default();
        let states = engine.initialize(&ideas(&[0, 1, 4]), &mut rng());
        assert_eq!(states[0].color, crate::palette::HUE_UNVOTED);
        assert_eq!(states[1].color, crate::palette::HUE_FIRST_VOTE);
        assert_eq!(states[2].color, crate::palette::HUE_TOP);
        assert_eq!(states[2].score, 4);
    }

    #[test]
    fn test_initialize_is_seed_deterministic() {
        let engine = LayoutEngine::default();
        let a = engine.initialize(&ideas(&[0, 2]), &mut rng());
        let b = engine.initialize(&ideas(&[0, 2]), &mut rng());
        assert_eq!(a, b);
    }

    #[test]
    fn test_advance_moves_by_velocity() {
        let engine = LayoutEngine::default();
        let next = engine.advance(&[bubble(50.0, 50.0, 0.04, -0.02)], 1.0);
        assert_relative_eq!(next[0].x, 50.04, epsilon = 1e-12);
        assert_relative_eq!(next[0].y, 49.98, epsilon = 1e-12);
    }

    #[test]
    fn test_reflects_and_clamps_at_right_edge() {
        let engine = LayoutEngine::default();
        let next = engine.advance(&[bubble(94.99, 50.0, 0.05, 0.0)], 1.0);
        assert_relative_eq!(next[0].x, 95.0);
        assert_relative_eq!(next[0].dx, -0.05);
    }

    #[test]
    fn test_reflects_at_bottom_of_travel_rect() {
        let engine = LayoutEngine::default();
        let next = engine.advance(&[bubble(50.0, 84.98, 0.0, 0.05)], 1.0);
        assert_relative_eq!(next[0].y, 85.0);
        assert_relative_eq!(next[0].dy, -0.05);
    }

    #[test]
    fn test_paused_bubble_does_not_move() {
        let engine = LayoutEngine::default();
        let mut b = bubble(30.0, 30.0, 0.05, 0.05);
        b.paused = true;
        let next = engine.advance(&[b.clone()], 1.0);
        assert_eq!(next[0], b);
    }

    #[test]
    fn test_non_finite_dt_is_noop() {
        let engine = LayoutEngine::default();
        let b = bubble(30.0, 30.0, 0.05, 0.05);
        assert_eq!(engine.advance(&[b.clone()], f64::NAN)[0], b);
    }

    #[test]
    fn test_out_of_bounds_snapshot_is_pulled_back() {
        let engine = LayoutEngine::default();
        let next = engine.advance(&[bubble(-20.0, 120.0, 0.01, 0.01)], 1.0);
        assert!(engine.bounds().travel_rect().contains(next[0].x, next[0].y));
    }

    #[test]
    fn test_scaled_bounds_scale_motion_range() {
        let engine = LayoutEngine::new(Bounds::new(1920.0, 1080.0));
        let states = engine.initialize(&ideas(&[0; 20]), &mut rng());
        let spawn = engine.bounds().spawn_rect();
        for s in &states {
            assert!(spawn.contains(s.x, s.y));
            assert!(s.dx.abs() <= 0.0016 * 1920.0 / 2.0 * 0.7 + 1e-9);
        }
    }

    proptest! {
        #[test]
        fn prop_positions_stay_in_travel_rect(
            seed in any::<u64>(),
            count in 1usize..12,
            ticks in 0usize..400,
            dt in 0.0f64..50.0,
        ) {
            let engine = LayoutEngine::default();
            let mut rng = SmallRng::seed_from_u64(seed);
            let mut states = engine.initialize(&ideas(&vec![0; count]), &mut rng);
            let rect = engine.bounds().travel_rect();
            for _ in 0..ticks {
                engine.advance_in_place(&mut states, dt);
                for s in &states {
                    prop_assert!(rect.contains(s.x, s.y));
                }
            }
        }
    }
}
