//! JSON snapshot of a running scene.
//!
//! A snapshot is everything needed to resume motion: geometry, the bubble
//! states and the focused id. Pending pointer requests are not captured.
//! Restoring checks geometry and coordinates before any tick can run.

use std::fmt;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::layout::{BubbleState, Bounds};
use crate::scene::Scene;
use crate::time::now_iso8601;

pub const SNAPSHOT_VERSION: u32 = 1;

#[derive(Debug)]
pub enum SnapshotError {
    Json(serde_json::Error),
    InvalidBounds { width: f64, height: f64 },
    InvalidBubble(Uuid),
}

impl fmt::Display for SnapshotError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SnapshotError::Json(e) => write!(f, "malformed snapshot: {e}"),
            SnapshotError::InvalidBounds { width, height } => {
                write!(f, "snapshot bounds must be positive, got {width}x{height}")
            }
            SnapshotError::InvalidBubble(id) => {
                write!(f, "snapshot bubble {id} has a non-finite position or velocity")
            }
        }
    }
}

impl std::error::Error for SnapshotError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            SnapshotError::Json(e) => Some(e),
            _ => None,
        }
    }
}

impl From<serde_json::Error> for SnapshotError {
    fn from(e: serde_json::Error) -> Self {
        SnapshotError::Json(e)
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct SceneSnapshot {
    pub version: u32,
    #[serde(default)]
    pub taken_at: String,
    pub bounds: Bounds,
    #[serde(default)]
    pub focused: Option<Uuid>,
    pub bubbles: Vec<BubbleState>,
}

impl SceneSnapshot {
    pub fn capture(scene: &Scene) -> Self {
        Self {
            version: SNAPSHOT_VERSION,
            taken_at: now_iso8601(),
            bounds: scene.bounds(),
            focused: scene.focused(),
            bubbles: scene.bubbles().to_vec(),
        }
    }

    pub fn into_scene(self) -> Result<Scene, SnapshotError> {
        if !self.bounds.is_valid() {
            return Err(SnapshotError::InvalidBounds {
                width: self.bounds.width,
                height: self.bounds.height,
            });
        }
        if let Some(bad) = self
            .bubbles
            .iter()
            .find(|b| ![b.x, b.y, b.dx, b.dy].iter().all(|v| v.is_finite()))
        {
            return Err(SnapshotError::InvalidBubble(bad.id));
        }
        Ok(Scene::from_states(self.bounds, self.bubbles, self.focused))
    }
}

pub fn export_json(scene: &Scene) -> serde_json::Result<String> {
    serde_json::to_string_pretty(&SceneSnapshot::capture(scene))
}

pub fn import_json(json: &str) -> Result<Scene, SnapshotError> {
    let snapshot: SceneSnapshot = serde_json::from_str(json)?;
    snapshot.into_scene()
}
