use bubbles_core::{Idea, SourceKind};
use bubbles_store::Store;
use criterion::{Criterion, black_box, criterion_group, criterion_main};
use rand::SeedableRng;
use rand::rngs::SmallRng;
use uuid::Uuid;

fn populated(count: u128) -> Store {
    let store = Store::open_in_memory().unwrap();
    for n in 0..count {
        store
            .put_idea(&Idea {
                id: Uuid::from_u128(n),
                title: format!("idea {n}"),
                description: "bench".into(),
                submitter_name: None,
                lightning_address: None,
                tags: vec!["bench".into()],
                created_at: format!("2025-05-{:02}T00:00:00.000Z", 1 + n % 28),
                score: (n % 13) as u32,
                exclude_from_display: n % 17 == 0,
            })
            .unwrap();
    }
    store
}

fn bench_ranked(c: &mut Criterion) {
    let store = populated(1_000);
    let mut rng = SmallRng::seed_from_u64(5);
    for kind in SourceKind::ALL {
        c.bench_function(&format!("ranked_{kind}_1000"), |b| {
            b.iter(|| black_box(store.ranked(kind, 5, &mut rng).unwrap()))
        });
    }
}

criterion_group!(benches, bench_ranked);
criterion_main!(benches);
