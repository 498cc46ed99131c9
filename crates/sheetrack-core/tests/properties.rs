//! Property checks over randomly built catalogs.

use chrono::{TimeZone, Utc};
use proptest::prelude::*;
use rusqlite::Connection;
use sheetrack_core::aggregate::{self, ScopeStats};
use sheetrack_core::catalog::reorder::{self, Direction};
use sheetrack_core::catalog::{self, tree};
use sheetrack_core::db::{self, query};
use sheetrack_core::error::CatalogError;
use sheetrack_core::model::{EntityKind, NewProblem, Platform};
use std::collections::BTreeSet;

#[derive(Debug, Clone)]
struct Shape {
    /// topics → sub-patterns → problem count
    topics: Vec<Vec<usize>>,
    delete_mask: Vec<bool>,
    solve_mask: Vec<bool>,
}

fn arb_shape() -> impl Strategy<Value = Shape> {
    (
        proptest::collection::vec(proptest::collection::vec(0usize..4, 0..3), 0..4),
        proptest::collection::vec(any::<bool>(), 40),
        proptest::collection::vec(any::<bool>(), 40),
    )
        .prop_map(|(topics, delete_mask, solve_mask)| Shape {
            topics,
            delete_mask,
            solve_mask,
        })
}

fn build(conn: &Connection, shape: &Shape) -> (String, BTreeSet<String>) {
    let now = Utc.with_ymd_and_hms(2024, 6, 1, 0, 0, 0).single().expect("instant");
    let sheet = catalog::create_sheet(conn, "S", "", now).expect("sheet");
    let mut completed = BTreeSet::new();
    let mut n = 0;

    for (ti, subs) in shape.topics.iter().enumerate() {
        let topic = catalog::create_topic(conn, &sheet.id, &format!("T{ti}")).expect("topic");
        for (si, count) in subs.iter().enumerate() {
            let sp = catalog::create_sub_pattern(conn, &topic.id, &format!("P{ti}.{si}"))
                .expect("sub-pattern");
            for pi in 0..*count {
                let p = catalog::create_problem(
                    conn,
                    &sp.id,
                    NewProblem {
                        title: format!("Q{ti}.{si}.{pi}"),
                        url: "https://example.com".into(),
                        platform: Platform::Other,
                        platform_id: None,
                    },
                )
                .expect("problem");
                let idx = n % 40;
                n += 1;
                if shape.solve_mask[idx] {
                    completed.insert(p.id.clone());
                }
                if shape.delete_mask[idx] {
                    catalog::soft_delete(conn, EntityKind::Problem, &p.id).expect("delete");
                }
            }
        }
    }
    (sheet.id, completed)
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn tree_and_cross_sheet_totals_agree(shape in arb_shape()) {
        let conn = db::open_in_memory().expect("open store");
        let (sheet_id, completed) = build(&conn, &shape);

        let structure = tree::full_structure(&conn, &sheet_id).expect("tree");
        let breakdown = aggregate::sheet_breakdown(&structure, &completed);

        let topic_sum = breakdown
            .topics
            .iter()
            .fold(ScopeStats::default(), |acc, t| acc + t.stats);
        let sub_sum = breakdown
            .topics
            .iter()
            .flat_map(|t| &t.sub_patterns)
            .fold(ScopeStats::default(), |acc, sp| acc + sp.stats);
        prop_assert_eq!(breakdown.stats, topic_sum);
        prop_assert_eq!(breakdown.stats, sub_sum);

        let snapshot = query::load_snapshot(&conn).expect("snapshot");
        let stats = aggregate::sheet_stats(&snapshot, &completed);
        prop_assert_eq!(stats.len(), 1);
        prop_assert_eq!(stats[0].solved, breakdown.stats.solved);
        prop_assert_eq!(stats[0].total, breakdown.stats.total);
        if stats[0].total == 0 {
            prop_assert_eq!(stats[0].percent, 0);
        }
    }

    #[test]
    fn listing_stays_strictly_ordered_under_moves(
        count in 1usize..8,
        steps in proptest::collection::vec(arb_step(), 0..30),
    ) {
        let mut conn = db::open_in_memory().expect("open store");
        let now = Utc.with_ymd_and_hms(2024, 6, 1, 0, 0, 0).single().expect("instant");
        let sheet = catalog::create_sheet(&conn, "S", "", now).expect("sheet");
        let mut ids: Vec<String> = (0..count)
            .map(|i| catalog::create_topic(&conn, &sheet.id, &format!("T{i}")).expect("topic").id)
            .collect();

        for step in steps {
            let before = live_orders(&conn, &sheet.id);
            match step {
                Step::Move(pick, direction) => {
                    let id = &ids[pick.index(ids.len())];
                    if before.iter().any(|(live, _)| live == id) {
                        reorder::move_within_parent(&mut conn, EntityKind::Topic, id, direction)
                            .expect("move");
                        let mut a: Vec<i64> = before.iter().map(|(_, o)| *o).collect();
                        let mut b: Vec<i64> =
                            live_orders(&conn, &sheet.id).iter().map(|(_, o)| *o).collect();
                        a.sort_unstable();
                        b.sort_unstable();
                        prop_assert_eq!(a, b);
                    }
                }
                Step::StaleMove { pick, direction, interleaved } => {
                    let snapshot = query::sibling_orders(&conn, EntityKind::Topic, &sheet.id)
                        .expect("snapshot");
                    let other = &ids[interleaved.index(ids.len())];
                    if snapshot.iter().any(|s| &s.id == other) {
                        reorder::move_within_parent(&mut conn, EntityKind::Topic, other, direction)
                            .expect("interleaved move");
                    }
                    let id = &ids[pick.index(ids.len())];
                    // An outdated snapshot may be rejected but never half-applied.
                    let result = reorder::move_entity(
                        &mut conn,
                        EntityKind::Topic,
                        id,
                        direction,
                        &snapshot,
                    );
                    prop_assert!(
                        matches!(result, Ok(_) | Err(CatalogError::NotFound { .. })),
                        "{:?}",
                        result
                    );
                }
                Step::Delete(pick) => {
                    let id = &ids[pick.index(ids.len())];
                    catalog::soft_delete(&conn, EntityKind::Topic, id).expect("delete");
                }
                Step::Restore(pick) => {
                    let id = &ids[pick.index(ids.len())];
                    catalog::restore(&conn, EntityKind::Topic, id).expect("restore");
                }
                Step::Create => {
                    let topic = catalog::create_topic(&conn, &sheet.id, &format!("T{}", ids.len()))
                        .expect("topic");
                    ids.push(topic.id);
                }
            }

            let orders: Vec<i64> = live_orders(&conn, &sheet.id).iter().map(|(_, o)| *o).collect();
            prop_assert!(orders.windows(2).all(|w| w[0] < w[1]), "{:?} after {:?}", orders, step);
        }
    }
}

#[derive(Debug, Clone, Copy)]
enum Step {
    Move(prop::sample::Index, Direction),
    StaleMove {
        pick: prop::sample::Index,
        direction: Direction,
        interleaved: prop::sample::Index,
    },
    Delete(prop::sample::Index),
    Restore(prop::sample::Index),
    Create,
}

fn arb_direction() -> impl Strategy<Value = Direction> {
    prop_oneof![Just(Direction::Up), Just(Direction::Down)]
}

fn arb_step() -> impl Strategy<Value = Step> {
    prop_oneof![
        3 => (any::<prop::sample::Index>(), arb_direction()).prop_map(|(i, d)| Step::Move(i, d)),
        2 => (any::<prop::sample::Index>(), arb_direction(), any::<prop::sample::Index>())
            .prop_map(|(pick, direction, interleaved)| Step::StaleMove {
                pick,
                direction,
                interleaved,
            }),
        1 => any::<prop::sample::Index>().prop_map(Step::Delete),
        1 => any::<prop::sample::Index>().prop_map(Step::Restore),
        1 => Just(Step::Create),
    ]
}

fn live_orders(conn: &Connection, sheet_id: &str) -> Vec<(String, i64)> {
    query::list_topics(conn, sheet_id)
        .expect("list")
        .into_iter()
        .map(|t| (t.id, t.order))
        .collect()
}
