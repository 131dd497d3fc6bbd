//! End-to-end: submissions and votes on a file-backed board flow through the
//! five ranking queries into the merged working set.

use bubbles_core::{NewIdea, RankedLists, SourceKind, SourceLimits, aggregate};
use bubbles_store::{Board, StoreError};
use uuid::Uuid;

fn submit(board: &Board, title: &str) -> Uuid {
    board
        .store()
        .insert_idea(&NewIdea {
            title: title.into(),
            description: format!("{title}, but better"),
            tags: vec!["community".into()],
            ..Default::default()
        })
        .unwrap()
        .id
}

#[test]
fn voted_idea_leads_the_working_set() {
    let tmp = tempfile::tempdir().unwrap();
    let board = Board::open(Some(tmp.path())).unwrap();

    let ids: Vec<Uuid> = ["mesh wifi", "seed library", "tool share", "night market"]
        .into_iter()
        .map(|t| submit(&board, t))
        .collect();
    for _ in 0..3 {
        board.store().increment_score(ids[2]).unwrap();
    }
    board.store().increment_score(ids[0]).unwrap();

    let (set, report) = board.gather(Some(11));
    assert_eq!(report.failed, 0);
    assert_eq!(set.ideas()[0].id, ids[2]);
    assert_eq!(set.ideas()[1].id, ids[0]);
    assert_eq!(set.len(), 4);
}

#[test]
fn hidden_ideas_stay_off_the_board() {
    let tmp = tempfile::tempdir().unwrap();
    let board = Board::open(Some(tmp.path())).unwrap();
    let shown = submit(&board, "shown");
    let hidden = submit(&board, "hidden");
    board.store().set_hidden(hidden, true).unwrap();
    board.store().increment_score(hidden).unwrap();

    let (set, _) = board.gather(Some(2));
    assert_eq!(set.ids(), vec![shown]);

    // Still readable directly.
    assert!(board.store().get_idea(hidden).unwrap().is_some());
}

#[test]
fn sources_run_independently_per_thread() {
    let tmp = tempfile::tempdir().unwrap();
    let board = Board::open(Some(tmp.path())).unwrap();
    for n in 0..8 {
        submit(&board, &format!("idea {n}"));
    }
    let sources = board.sources(Some(4));
    let limits = SourceLimits::default();

    let handles: Vec<_> = SourceKind::ALL
        .into_iter()
        .map(|kind| {
            let sources = sources.clone();
            std::thread::spawn(move || {
                use bubbles_core::RankedSourceProvider;
                (kind, sources.fetch(kind, limits.for_kind(kind)))
            })
        })
        .collect();

    let mut lists = RankedLists::default();
    for handle in handles {
        let (kind, result) = handle.join().unwrap();
        let result = result.unwrap();
        assert!(result.len() <= limits.for_kind(kind));
        lists.set(kind, bubbles_core::SourceOutcome::Loaded(result));
    }
    // newest 5 + oldest 2 + random 3 over 8 ideas
    assert!(aggregate(&lists).len() >= 7);
}

#[test]
fn vote_on_missing_idea_is_not_found() {
    let tmp = tempfile::tempdir().unwrap();
    let board = Board::open(Some(tmp.path())).unwrap();
    let err = board.store().increment_score(Uuid::nil()).unwrap_err();
    assert!(matches!(err, StoreError::NotFound(_)));
    assert_eq!(err.to_string(), format!("idea not found: {}", Uuid::nil()));
}

#[test]
fn page_serializes_for_the_list_endpoint() {
    let tmp = tempfile::tempdir().unwrap();
    let board = Board::open(Some(tmp.path())).unwrap();
    for n in 0..3 {
        submit(&board, &format!("idea {n}"));
    }
    let page = board.store().list_page(1, 2).unwrap();
    let json = serde_json::to_value(&page).unwrap();
    assert_eq!(json["current_page"], 1);
    assert_eq!(json["total_pages"], 2);
    assert_eq!(json["total_ideas"], 3);
    assert_eq!(json["ideas"].as_array().unwrap().len(), 2);
    assert_eq!(json["ideas"][0]["tags"][0], "community");
}
