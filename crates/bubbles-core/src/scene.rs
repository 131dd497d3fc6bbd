//! The coordinator a host loop drives once per frame.
//!
//! A [`Scene`] owns the bubble collection, the layout engine and the focus
//! state. It is rebuilt wholesale whenever a fresh aggregated set arrives;
//! there is no incremental diffing.

use rand::Rng;
use serde::Serialize;
use uuid::Uuid;

use crate::aggregate::AggregatedSet;
use crate::display::select_for_display;
use crate::focus::{FocusRequest, FocusState, collapse, expand};
use crate::layout::{BubbleState, Bounds, LayoutEngine};
use crate::proximity::{ProximityEdge, edges_for};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DisplayState {
    /// Every source came back empty or failed.
    NoData,
    Ready,
}

/// What the rendering surface needs for one bubble.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct BubbleView {
    pub id: Uuid,
    pub label: String,
    pub x: f64,
    pub y: f64,
    pub color: String,
    pub score: u32,
    pub expanded: bool,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Frame {
    pub state: DisplayState,
    pub focused: Option<Uuid>,
    pub bubbles: Vec<BubbleView>,
    pub edges: Vec<ProximityEdge>,
}

#[derive(Clone, Debug)]
pub struct Scene {
    engine: LayoutEngine,
    bubbles: Vec<BubbleState>,
    focus: FocusState,
}

impl Scene {
    /// An empty scene; shows "no data" until [`Scene::replace`] is called.
    pub fn new(bounds: Bounds) -> Self {
        Self {
            engine: LayoutEngine::new(bounds),
            bubbles: Vec::new(),
            focus: FocusState::default(),
        }
    }

    pub fn from_aggregated(
        set: &AggregatedSet,
        bounds: Bounds,
        cap: usize,
        rng: &mut impl Rng,
    ) -> Self {
        let mut scene = Self::new(bounds);
        scene.replace(set, cap, rng);
        scene
    }

    /// Resume from previously captured states. Paused flags are rebuilt
    /// from `focused`: only the focused bubble stays frozen.
    pub fn from_states(bounds: Bounds, bubbles: Vec<BubbleState>, focused: Option<Uuid>) -> Self {
        let focused = focused.filter(|id| bubbles.iter().any(|b| b.id == *id));
        let bubbles = match focused {
            Some(id) => expand(&bubbles, id),
            None => collapse(&bubbles),
        };
        Self {
            engine: LayoutEngine::new(bounds),
            bubbles,
            focus: FocusState::with_focused(focused),
        }
    }

    /// Throw away every bubble and lay out the new set from scratch.
    pub fn replace(&mut self, set: &AggregatedSet, cap: usize, rng: &mut impl Rng) {
        let shown = select_for_display(set, cap);
        self.bubbles = self.engine.initialize(&shown, rng);
        self.focus.reset();
    }

    pub fn bounds(&self) -> Bounds {
        self.engine.bounds()
    }

    pub fn bubbles(&self) -> &[BubbleState] {
        &self.bubbles
    }

    pub fn focused(&self) -> Option<Uuid> {
        self.focus.focused()
    }

    pub fn state(&self) -> DisplayState {
        if self.bubbles.is_empty() {
            DisplayState::NoData
        } else {
            DisplayState::Ready
        }
    }

    /// Pointer click on a bubble.
    pub fn request_expand(&mut self, id: Uuid) {
        self.focus.request(FocusRequest::Expand(id));
    }

    /// Pointer press anywhere outside the focused bubble.
    pub fn request_collapse(&mut self) {
        self.focus.request(FocusRequest::Collapse);
    }

    /// One frame: apply the pending focus change, move, rebuild edges.
    pub fn tick(&mut self, dt: f64) -> Frame {
        self.focus.apply_pending(&mut self.bubbles);
        self.engine.advance_in_place(&mut self.bubbles, dt);
        self.frame()
    }

    pub fn edges(&self) -> Vec<ProximityEdge> {
        edges_for(&self.bubbles, &self.engine.bounds())
    }

    pub fn frame(&self) -> Frame {
        let focused = self.focus.focused();
        Frame {
            state: self.state(),
            focused,
            bubbles: self
                .bubbles
                .iter()
                .map(|b| BubbleView {
                    id: b.id,
                    label: b.label.clone(),
                    x: b.x,
                    y: b.y,
                    color: b.color.to_hex(),
                    score: b.score,
                    expanded: focused == Some(b.id),
                })
                .collect(),
            edges: self.edges(),
        }
    }

    /// Reflect a vote the store already accepted. Only the displayed score
    /// changes; color waits for the next rebuild. Returns false when the
    /// idea is not on screen.
    pub fn apply_score_increment(&mut self, id: Uuid) -> bool {
        match self.bubbles.iter_mut().find(|b| b.id == id) {
            Some(bubble) => {
                bubble.score = bubble.score.saturating_add(1);
                true
            }
            None => false,
        }
    }
}
