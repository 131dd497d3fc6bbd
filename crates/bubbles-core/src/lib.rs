//! Idea bubble engine.
//!
//! Merges five ranked views of an idea set into one deduplicated working set,
//! colors each idea by score, and animates the result as bouncing bubbles
//! with proximity connectors.
//!
//! Zero I/O: sources and rendering surfaces plug in from outside.

pub mod aggregate;
pub mod constants;
pub mod display;
pub mod focus;
pub mod idea;
pub mod layout;
pub mod palette;
pub mod proximity;
pub mod refresh;
pub mod sampling;
pub mod scene;
pub mod snapshot;
pub mod time;

pub use aggregate::{
    AggregatedSet, AggregationReport, PRIORITY, RankedLists, RankedSourceProvider,
    SourceFetchFailure, SourceKind, SourceLimits, SourceOutcome, aggregate,
    aggregate_with_report,
};
pub use constants::MAX_BUBBLES;
pub use display::select_for_display;
pub use focus::{FocusRequest, FocusState};
pub use idea::{Idea, IdeaValidationError, NewIdea, ValidIdea};
pub use layout::{BubbleState, Bounds, LayoutEngine, Rect};
pub use palette::{Color, HUE_FIRST_VOTE, HUE_TOP, HUE_UNVOTED, color_for};
pub use proximity::{ProximityEdge, edges_for, proximity_threshold};
pub use refresh::{FetchSequencer, FetchTicket};
pub use sampling::{sample_uniform, sample_weighted};
pub use scene::{BubbleView, DisplayState, Frame, Scene};
pub use snapshot::{SNAPSHOT_VERSION, SceneSnapshot, SnapshotError, export_json, import_json};
pub use time::{millis_to_iso8601, now_iso8601};
