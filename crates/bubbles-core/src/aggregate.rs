//! Merging the five ranked views of the idea set into one working set.
//!
//! Lists are visited in [`PRIORITY`] order and each list in its own order.
//! An idea is kept the first time its id is seen, so it lands where the
//! highest-priority list containing it puts it. A failed source contributes
//! nothing; it never aborts the merge.

use std::collections::HashSet;
use std::fmt;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::idea::Idea;

/// One of the five ranking queries.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SourceKind {
    Newest,
    MostVoted,
    Oldest,
    Random,
    RandomVoted,
}

/// Merge order, highest priority first.
pub const PRIORITY: [SourceKind; 5] = [
    SourceKind::MostVoted,
    SourceKind::Newest,
    SourceKind::Oldest,
    SourceKind::RandomVoted,
    SourceKind::Random,
];

impl SourceKind {
    pub const ALL: [SourceKind; 5] = [
        SourceKind::Newest,
        SourceKind::MostVoted,
        SourceKind::Oldest,
        SourceKind::Random,
        SourceKind::RandomVoted,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Newest => "newest",
            Self::MostVoted => "most_voted",
            Self::Oldest => "oldest",
            Self::Random => "random",
            Self::RandomVoted => "random_voted",
        }
    }
}

impl fmt::Display for SourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Per-source row limits.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SourceLimits {
    pub newest: usize,
    pub most_voted: usize,
    pub oldest: usize,
    pub random: usize,
    pub random_voted: usize,
}

impl Default for SourceLimits {
    fn default() -> Self {
        Self {
            newest: 5,
            most_voted: 5,
            oldest: 2,
            random: 3,
            random_voted: 5,
        }
    }
}

impl SourceLimits {
    pub fn for_kind(&self, kind: SourceKind) -> usize {
        match kind {
            SourceKind::Newest => self.newest,
            SourceKind::MostVoted => self.most_voted,
            SourceKind::Oldest => self.oldest,
            SourceKind::Random => self.random,
            SourceKind::RandomVoted => self.random_voted,
        }
    }
}

/// A single ranking query failed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceFetchFailure {
    pub source: SourceKind,
    pub message: String,
}

impl SourceFetchFailure {
    pub fn new(source: SourceKind, message: impl Into<String>) -> Self {
        Self {
            source,
            message: message.into(),
        }
    }
}

impl fmt::Display for SourceFetchFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "source {} failed: {}", self.source, self.message)
    }
}

impl std::error::Error for SourceFetchFailure {}

/// The external collaborator that answers the five ranking queries.
///
/// Each call is independent; any of them may fail on its own.
pub trait RankedSourceProvider {
    fn fetch(&self, kind: SourceKind, limit: usize) -> Result<Vec<Idea>, SourceFetchFailure>;
}

/// What one source produced: rows, legitimately nothing, or a failure.
#[derive(Debug, Clone, Default)]
pub enum SourceOutcome {
    Loaded(Vec<Idea>),
    #[default]
    Empty,
    Failed(SourceFetchFailure),
}

impl SourceOutcome {
    pub fn from_result(result: Result<Vec<Idea>, SourceFetchFailure>) -> Self {
        match result {
            Ok(ideas) if ideas.is_empty() => Self::Empty,
            Ok(ideas) => Self::Loaded(ideas),
            Err(e) => Self::Failed(e),
        }
    }

    /// Ideas to merge. A failure reads as an empty list.
    pub fn ideas(&self) -> &[Idea] {
        match self {
            Self::Loaded(ideas) => ideas,
            Self::Empty | Self::Failed(_) => &[],
        }
    }

    pub fn is_failed(&self) -> bool {
        matches!(self, Self::Failed(_))
    }
}

/// The five ranked lists, one slot per source.
#[derive(Debug, Clone, Default)]
pub struct RankedLists {
    pub newest: SourceOutcome,
    pub most_voted: SourceOutcome,
    pub oldest: SourceOutcome,
    pub random: SourceOutcome,
    pub random_voted: SourceOutcome,
}

impl RankedLists {
    pub fn get(&self, kind: SourceKind) -> &SourceOutcome {
        match kind {
            SourceKind::Newest => &self.newest,
            SourceKind::MostVoted => &self.most_voted,
            SourceKind::Oldest => &self.oldest,
            SourceKind::Random => &self.random,
            SourceKind::RandomVoted => &self.random_voted,
        }
    }

    pub fn set(&mut self, kind: SourceKind, outcome: SourceOutcome) {
        let slot = match kind {
            SourceKind::Newest => &mut self.newest,
            SourceKind::MostVoted => &mut self.most_voted,
            SourceKind::Oldest => &mut self.oldest,
            SourceKind::Random => &mut self.random,
            SourceKind::RandomVoted => &mut self.random_voted,
        };
        *slot = outcome;
    }

    /// Build from plain lists (no failures).
    pub fn from_lists(
        newest: Vec<Idea>,
        most_voted: Vec<Idea>,
        oldest: Vec<Idea>,
        random: Vec<Idea>,
        random_voted: Vec<Idea>,
    ) -> Self {
        Self {
            newest: SourceOutcome::from_result(Ok(newest)),
            most_voted: SourceOutcome::from_result(Ok(most_voted)),
            oldest: SourceOutcome::from_result(Ok(oldest)),
            random: SourceOutcome::from_result(Ok(random)),
            random_voted: SourceOutcome::from_result(Ok(random_voted)),
        }
    }

    /// Query all five sources sequentially, catching each failure.
    pub fn fetch_all(provider: &impl RankedSourceProvider, limits: &SourceLimits) -> Self {
        let mut lists = Self::default();
        for kind in SourceKind::ALL {
            let result = provider.fetch(kind, limits.for_kind(kind));
            lists.set(kind, SourceOutcome::from_result(result));
        }
        lists
    }
}

/// Counts of how each source resolved, for logging.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct AggregationReport {
    pub loaded: usize,
    pub empty: usize,
    pub failed: usize,
    /// Ideas dropped because a higher-priority list already held them.
    pub duplicates: usize,
}

/// Deduplicated, priority-ordered working set.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct AggregatedSet {
    ideas: Vec<Idea>,
}

impl AggregatedSet {
    pub fn ideas(&self) -> &[Idea] {
        &self.ideas
    }

    pub fn into_ideas(self) -> Vec<Idea> {
        self.ideas
    }

    pub fn len(&self) -> usize {
        self.ideas.len()
    }

    /// True when every source came back empty or failed.
    pub fn is_empty(&self) -> bool {
        self.ideas.is_empty()
    }

    pub fn ids(&self) -> Vec<Uuid> {
        self.ideas.iter().map(|i| i.id).collect()
    }
}

/// Merge the five lists in [`PRIORITY`] order, dropping repeated ids.
pub fn aggregate(lists: &RankedLists) -> AggregatedSet {
    aggregate_with_report(lists).0
}

/// [`aggregate`] plus a per-source report.
pub fn aggregate_with_report(lists: &RankedLists) -> (AggregatedSet, AggregationReport) {
    let mut seen: HashSet<Uuid> = HashSet::new();
    let mut ideas = Vec::new();
    let mut report = AggregationReport::default();

    for kind in PRIORITY {
        let outcome = lists.get(kind);
        match outcome {
            SourceOutcome::Loaded(_) => report.loaded += 1,
            SourceOutcome::Empty => report.empty += 1,
            SourceOutcome::Failed(_) => report.failed += 1,
        }
        for idea in outcome.ideas() {
            if seen.insert(idea.id) {
                ideas.push(idea.clone());
            } else {
                report.duplicates += 1;
            }
        }
    }

    (AggregatedSet { ideas }, report)
}
