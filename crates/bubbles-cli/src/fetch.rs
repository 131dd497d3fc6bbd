//! Concurrent fetch of the five ranking queries.
//!
//! Each query runs on the blocking pool with its own connection. A query
//! that errors or panics becomes [`SourceOutcome::Failed`] and the rest
//! still land.

use std::sync::Arc;

use bubbles_core::{
    FetchSequencer, FetchTicket, Idea, RankedLists, RankedSourceProvider, SourceFetchFailure,
    SourceKind, SourceLimits, SourceOutcome,
};
use tokio::task::JoinError;

pub async fn fetch_concurrently<P>(provider: Arc<P>, limits: SourceLimits) -> RankedLists
where
    P: RankedSourceProvider + Send + Sync + 'static,
{
    let spawn = |kind: SourceKind| {
        let provider = Arc::clone(&provider);
        let limit = limits.for_kind(kind);
        tokio::task::spawn_blocking(move || provider.fetch(kind, limit))
    };

    let (newest, most_voted, oldest, random, random_voted) = tokio::join!(
        spawn(SourceKind::Newest),
        spawn(SourceKind::MostVoted),
        spawn(SourceKind::Oldest),
        spawn(SourceKind::Random),
        spawn(SourceKind::RandomVoted),
    );

    let mut lists = RankedLists::default();
    for (kind, joined) in [
        (SourceKind::Newest, newest),
        (SourceKind::MostVoted, most_voted),
        (SourceKind::Oldest, oldest),
        (SourceKind::Random, random),
        (SourceKind::RandomVoted, random_voted),
    ] {
        lists.set(kind, settle(kind, joined));
    }
    lists
}

fn settle(
    kind: SourceKind,
    joined: Result<Result<Vec<Idea>, SourceFetchFailure>, JoinError>,
) -> SourceOutcome {
    let result = joined
        .unwrap_or_else(|e| Err(SourceFetchFailure::new(kind, format!("query task failed: {e}"))));
    if let Err(failure) = &result {
        tracing::warn!(source = %kind, error = %failure.message, "source fetch failed");
    }
    SourceOutcome::from_result(result)
}

/// Fetches with last-fetch-wins: a result that finishes after a newer one
/// has been applied is dropped.
pub struct Refresher<P> {
    provider: Arc<P>,
    limits: SourceLimits,
    sequencer: FetchSequencer,
}

impl<P> Refresher<P>
where
    P: RankedSourceProvider + Send + Sync + 'static,
{
    pub fn new(provider: P, limits: SourceLimits) -> Self {
        Self {
            provider: Arc::new(provider),
            limits,
            sequencer: FetchSequencer::new(),
        }
    }

    pub fn begin(&self) -> FetchTicket {
        self.sequencer.begin()
    }

    pub async fn fetch(&self) -> RankedLists {
        fetch_concurrently(Arc::clone(&self.provider), self.limits).await
    }

    /// `Some(lists)` if this ticket is still the newest to finish.
    pub fn finish(&self, ticket: FetchTicket, lists: RankedLists) -> Option<RankedLists> {
        if self.sequencer.try_apply(ticket) {
            Some(lists)
        } else {
            tracing::debug!(generation = ticket.generation(), "discarding stale fetch");
            None
        }
    }

    pub async fn refresh(&self) -> Option<RankedLists> {
        let ticket = self.begin();
        let lists = self.fetch().await;
        self.finish(ticket, lists)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::{Duration, Instant};
    use uuid::Uuid;

    fn idea(n: u128) -> Idea {
        Idea {
            id: Uuid::from_u128(n),
            title: format!("idea {n}"),
            description: String::new(),
            submitter_name: None,
            lightning_address: None,
            tags: Vec::new(),
            created_at: format!("2025-05-27T17:46:{:02}.000Z", n % 60),
            score: 0,
            exclude_from_display: false,
        }
    }

    /// Each source returns one idea numbered after its kind, after a delay.
    struct FakeSources {
        delay: Duration,
        failing: Option<SourceKind>,
        panicking: Option<SourceKind>,
    }

    impl FakeSources {
        fn instant() -> Self {
            Self {
                delay: Duration::ZERO,
                failing: None,
                panicking: None,
            }
        }
    }

    impl RankedSourceProvider for FakeSources {
        fn fetch(&self, kind: SourceKind, limit: usize) -> Result<Vec<Idea>, SourceFetchFailure> {
            std::thread::sleep(self.delay);
            if self.panicking == Some(kind) {
                panic!("query blew up");
            }
            if self.failing == Some(kind) {
                return Err(SourceFetchFailure::new(kind, "connection reset"));
            }
            let n = SourceKind::ALL.iter().position(|k| *k == kind).unwrap_or(0) as u128;
            Ok(vec![idea(n); limit.min(1)])
        }
    }

    #[tokio::test]
    async fn test_all_sources_land() {
        let lists = fetch_concurrently(Arc::new(FakeSources::instant()), SourceLimits::default()).await;
        for kind in SourceKind::ALL {
            assert_eq!(lists.get(kind).ideas().len(), 1, "{kind}");
        }
    }

    #[tokio::test]
    async fn test_failure_isolated_to_one_source() {
        let provider = FakeSources {
            failing: Some(SourceKind::MostVoted),
            ..FakeSources::instant()
        };
        let lists = fetch_concurrently(Arc::new(provider), SourceLimits::default()).await;
        assert!(lists.get(SourceKind::MostVoted).is_failed());
        assert_eq!(lists.get(SourceKind::Newest).ideas().len(), 1);
    }

    #[tokio::test]
    async fn test_panicking_query_becomes_failure() {
        let provider = FakeSources {
            panicking: Some(SourceKind::Random),
            ..FakeSources::instant()
        };
        let lists = fetch_concurrently(Arc::new(provider), SourceLimits::default()).await;
        assert!(lists.get(SourceKind::Random).is_failed());
        assert!(!lists.get(SourceKind::Oldest).is_failed());
    }

    #[tokio::test]
    async fn test_zero_limit_is_empty_not_failed() {
        let limits = SourceLimits {
            oldest: 0,
            ..SourceLimits::default()
        };
        let lists = fetch_concurrently(Arc::new(FakeSources::instant()), limits).await;
        assert!(lists.get(SourceKind::Oldest).ideas().is_empty());
        assert!(!lists.get(SourceKind::Oldest).is_failed());
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn test_queries_overlap() {
        let provider = FakeSources {
            delay: Duration::from_millis(200),
            ..FakeSources::instant()
        };
        let start = Instant::now();
        fetch_concurrently(Arc::new(provider), SourceLimits::default()).await;
        assert!(start.elapsed() < Duration::from_millis(900));
    }

    #[tokio::test]
    async fn test_stale_fetch_is_discarded() {
        let refresher = Refresher::new(FakeSources::instant(), SourceLimits::default());
        let first = refresher.begin();
        let second = refresher.begin();

        let newer = refresher.fetch().await;
        assert!(refresher.finish(second, newer).is_some());

        let older = refresher.fetch().await;
        assert!(refresher.finish(first, older).is_none());
    }

    #[tokio::test]
    async fn test_sequential_refreshes_all_apply() {
        let refresher = Refresher::new(FakeSources::instant(), SourceLimits::default());
        assert!(refresher.refresh().await.is_some());
        assert!(refresher.refresh().await.is_some());
    }
}
