//! Property-based tests for the bounded selector and ranking determinism.

use proptest::prelude::*;

use mood_ranker::{
    CatalogItem, Embedding, RankedEntry, RankingRun, ReferenceSetBuilder, ScoreTuple, TopK,
    TrackIdentity,
};

// Small integer grids make equal scores and equal names common, which is
// where the tie-break has to hold up.
fn entry_strategy() -> impl Strategy<Value = RankedEntry> {
    (prop::collection::vec(-3i8..=3, 2), 0u8..6).prop_map(|(scores, name)| {
        RankedEntry::new(
            ScoreTuple::new(scores.into_iter().map(|s| f32::from(s) / 4.0).collect()),
            TrackIdentity::new(format!("track-{name}"), "artist"),
        )
    })
}

fn sort_and_truncate(mut entries: Vec<RankedEntry>, k: usize) -> Vec<RankedEntry> {
    entries.sort_by(|a, b| b.cmp(a));
    entries.truncate(k);
    entries
}

fn embedding_strategy(dim: usize) -> impl Strategy<Value = Vec<f32>> {
    prop::collection::vec(-1.0f32..1.0, dim)
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(128))]

    #[test]
    fn prop_matches_full_sort(
        entries in prop::collection::vec(entry_strategy(), 0..60),
        k in 1usize..12,
    ) {
        let mut top = TopK::new(k).unwrap();
        for (n, entry) in entries.iter().enumerate() {
            top.insert(entry.clone());
            prop_assert_eq!(top.len(), (n + 1).min(k));
        }

        let expected = sort_and_truncate(entries, k);
        prop_assert_eq!(top.drain_sorted(), expected);
    }

    #[test]
    fn prop_insertion_order_is_irrelevant(
        entries in prop::collection::vec(entry_strategy(), 0..40),
        k in 1usize..8,
    ) {
        let mut forward = TopK::new(k).unwrap();
        for entry in &entries {
            forward.insert(entry.clone());
        }
        let mut backward = TopK::new(k).unwrap();
        for entry in entries.iter().rev() {
            backward.insert(entry.clone());
        }

        prop_assert_eq!(forward.drain_sorted(), backward.drain_sorted());
    }

    #[test]
    fn prop_merge_matches_single_selector(
        left in prop::collection::vec(entry_strategy(), 0..30),
        right in prop::collection::vec(entry_strategy(), 0..30),
        k in 1usize..8,
    ) {
        let mut merged = TopK::new(k).unwrap();
        let mut other = TopK::new(k).unwrap();
        let mut single = TopK::new(k).unwrap();
        for entry in &left {
            merged.insert(entry.clone());
            single.insert(entry.clone());
        }
        for entry in &right {
            other.insert(entry.clone());
            single.insert(entry.clone());
        }
        merged.merge(other);

        prop_assert_eq!(merged.drain_sorted(), single.drain_sorted());
    }

    #[test]
    fn prop_drain_is_descending(
        entries in prop::collection::vec(entry_strategy(), 1..40),
        k in 1usize..10,
    ) {
        let mut top = TopK::new(k).unwrap();
        for entry in entries {
            top.insert(entry);
        }

        let drained = top.drain_sorted();
        for pair in drained.windows(2) {
            prop_assert!(pair[0] >= pair[1]);
        }
    }

    #[test]
    fn prop_ranking_runs_repeat_exactly(
        refs in prop::collection::vec(embedding_strategy(4), 1..4),
        tracks in prop::collection::vec(embedding_strategy(4), 1..30),
        k in 1usize..10,
    ) {
        let mut items: Vec<CatalogItem> = Vec::new();
        for (i, values) in refs.into_iter().enumerate() {
            let embedding = Embedding::new(values).unwrap();
            prop_assume!(embedding.magnitude() > 1e-3);
            items.push(
                CatalogItem::new(TrackIdentity::new(format!("ref-{i}"), "r"), embedding)
                    .with_tag("chill"),
            );
        }
        for (i, values) in tracks.into_iter().enumerate() {
            let embedding = Embedding::new(values).unwrap();
            prop_assume!(embedding.magnitude() > 1e-3);
            items.push(CatalogItem::new(
                TrackIdentity::new(format!("track-{i}"), "t"),
                embedding,
            ));
        }

        let references = ReferenceSetBuilder::new(["chill"]).build(&items).unwrap();
        let run = RankingRun::new(&references, &["chill"], k).unwrap();
        let first = run.run(&items).unwrap();
        let second = run.run(&items).unwrap();

        prop_assert_eq!(first.entries.len(), k.min(items.len()));
        prop_assert_eq!(&first.entries, &second.entries);
        for (a, b) in first.entries.iter().zip(&second.entries) {
            prop_assert_eq!(a.scores.get(0).map(f32::to_bits), b.scores.get(0).map(f32::to_bits));
        }
    }
}
