//! Expanded-bubble focus.
//!
//! At most one bubble is focused. Focusing a bubble pauses it and resumes
//! every other one; clearing focus resumes all. Pointer events only queue a
//! transition, and the queue holds one entry: a later request replaces an
//! earlier one that has not been applied yet.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::layout::BubbleState;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "id", rename_all = "snake_case")]
pub enum FocusRequest {
    Expand(Uuid),
    /// Any interaction outside the focused bubble.
    Collapse,
}

/// Pause `id`, resume the rest.
pub fn expand(states: &[BubbleState], id: Uuid) -> Vec<BubbleState> {
    states
        .iter()
        .map(|b| BubbleState {
            paused: b.id == id,
            ..b.clone()
        })
        .collect()
}

/// Resume every bubble.
pub fn collapse(states: &[BubbleState]) -> Vec<BubbleState> {
    states
        .iter()
        .map(|b| BubbleState {
            paused: false,
            ..b.clone()
        })
        .collect()
}

/// Owner of the single focused id and the single pending transition.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FocusState {
    focused: Option<Uuid>,
    #[serde(skip)]
    pending: Option<FocusRequest>,
}

impl FocusState {
    pub fn focused(&self) -> Option<Uuid> {
        self.focused
    }

    pub fn pending(&self) -> Option<FocusRequest> {
        self.pending
    }

    pub fn with_focused(focused: Option<Uuid>) -> Self {
        Self {
            focused,
            pending: None,
        }
    }

    /// Queue a transition, replacing any unapplied one.
    pub fn request(&mut self, request: FocusRequest) {
        self.pending = Some(request);
    }

    /// Apply the pending transition, if any. Expanding an id that is not on
    /// screen is dropped. Returns whether the states changed.
    pub fn apply_pending(&mut self, states: &mut Vec<BubbleState>) -> bool {
        let Some(request) = self.pending.take() else {
            return false;
        };
        match request {
            FocusRequest::Expand(id) => {
                if !states.iter().any(|b| b.id == id) {
                    return false;
                }
                *states = expand(states, id);
                self.focused = Some(id);
            }
            FocusRequest::Collapse => {
                *states = collapse(states);
                self.focused = None;
            }
        }
        true
    }

    /// Forget focus when the bubble set is rebuilt.
    pub fn reset(&mut self) {
        self.focused = None;
        self.pending = None;
    }
}
