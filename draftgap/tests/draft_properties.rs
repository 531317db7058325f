use std::collections::HashSet;
use std::sync::Arc;

use draftgap::dataset::Dataset;
use draftgap::draft::pick::{Pick, Role, Team, TEAM_SIZE};
use draftgap::draft::selection::Selection;
use draftgap::draft::state::{DraftStore, PickOptions};
use proptest::prelude::*;

const CHAMPIONS: [&str; 12] = [
    "57", "234", "30", "429", "412", "164", "64", "147", "145", "16", "62", "81",
];

#[derive(Debug, Clone)]
enum Op {
    Pick(Team, usize, Option<usize>, Option<Role>),
    Hover(Team, usize, Option<usize>, Option<Role>),
    ResetSlot(Team, usize),
    ResetTeam(Team),
    ResetAll,
    Select(Team, Option<usize>),
}

fn any_team() -> impl Strategy<Value = Team> {
    prop_oneof![Just(Team::Ally), Just(Team::Opponent)]
}

fn any_role() -> impl Strategy<Value = Option<Role>> {
    prop_oneof![
        Just(None),
        Just(Some(Role::Top)),
        Just(Some(Role::Jungle)),
        Just(Some(Role::Middle)),
        Just(Some(Role::Bottom)),
        Just(Some(Role::Support)),
    ]
}

/// Index into `CHAMPIONS`; `None` clears the slot.
fn any_champion() -> impl Strategy<Value = Option<usize>> {
    proptest::option::weighted(0.9, 0..CHAMPIONS.len())
}

fn any_op() -> impl Strategy<Value = Op> {
    let slot = 0..TEAM_SIZE;
    prop_oneof![
        6 => (any_team(), slot.clone(), any_champion(), any_role())
            .prop_map(|(t, i, c, r)| Op::Pick(t, i, c, r)),
        2 => (any_team(), slot.clone(), any_champion(), any_role())
            .prop_map(|(t, i, c, r)| Op::Hover(t, i, c, r)),
        1 => (any_team(), slot.clone()).prop_map(|(t, i)| Op::ResetSlot(t, i)),
        1 => any_team().prop_map(Op::ResetTeam),
        1 => Just(Op::ResetAll),
        1 => (any_team(), proptest::option::of(slot)).prop_map(|(t, i)| Op::Select(t, i)),
    ]
}

fn new_store() -> DraftStore {
    DraftStore::new(Arc::new(Dataset::from_champions(
        CHAMPIONS.iter().map(|k| (*k, format!("Champion {k}"))),
    )))
}

fn apply(store: &mut DraftStore, op: &Op) {
    let key = |c: &Option<usize>| c.map(|i| CHAMPIONS[i]);
    match op {
        Op::Pick(team, index, champion, role) => {
            store.pick_champion(*team, *index, key(champion), *role, PickOptions::default())
        }
        Op::Hover(team, index, champion, role) => {
            store.hover_champion(*team, *index, key(champion), *role)
        }
        Op::ResetSlot(team, index) => store.reset_champion(*team, *index),
        Op::ResetTeam(team) => store.reset_team(*team),
        Op::ResetAll => store.reset_all(),
        Op::Select(team, index) => store.select(Some(*team), *index, true),
    }
}

fn all_slots(store: &DraftStore) -> impl Iterator<Item = &Pick> {
    store.ally_team().iter().chain(store.opponent_team().iter())
}

proptest! {
    #[test]
    fn champion_keys_are_globally_unique(ops in proptest::collection::vec(any_op(), 1..60)) {
        let mut store = new_store();
        for op in &ops {
            apply(&mut store, op);
            let keys: Vec<&String> = all_slots(&store).filter_map(|p| p.champion_key.as_ref()).collect();
            let unique: HashSet<&String> = keys.iter().copied().collect();
            prop_assert_eq!(keys.len(), unique.len(), "after {:?}", op);
        }
    }

    #[test]
    fn roles_are_unique_per_team(ops in proptest::collection::vec(any_op(), 1..60)) {
        let mut store = new_store();
        for op in &ops {
            apply(&mut store, op);
            for team in Team::BOTH {
                let roles: Vec<Role> = store.team(team).iter().filter_map(|p| p.role).collect();
                let unique: HashSet<Role> = roles.iter().copied().collect();
                prop_assert_eq!(roles.len(), unique.len(), "{} after {:?}", team, op);
            }
        }
    }

    #[test]
    fn draft_finished_iff_all_slots_committed(ops in proptest::collection::vec(any_op(), 1..80)) {
        let mut store = new_store();
        for op in &ops {
            apply(&mut store, op);
            let all_committed = all_slots(&store).all(|p| p.champion_key.is_some());
            prop_assert_eq!(store.draft_finished(), all_committed);
        }
    }

    #[test]
    fn cursor_only_points_at_open_slots(ops in proptest::collection::vec(any_op(), 1..60)) {
        let mut store = new_store();
        for op in &ops {
            apply(&mut store, op);
            let selection = store.selection();
            if let Some(team) = selection.team {
                prop_assert!(
                    store.team(team)[selection.index].champion_key.is_none(),
                    "cursor on filled slot {}/{} after {:?}", team, selection.index, op
                );
            }
        }
    }

    #[test]
    fn reset_all_clears_everything_but_bans(ops in proptest::collection::vec(any_op(), 0..40)) {
        let mut store = new_store();
        store.set_bans(vec!["81".into(), "62".into()]);
        for op in &ops {
            apply(&mut store, op);
        }

        store.reset_all();

        prop_assert!(all_slots(&store).all(Pick::is_empty));
        prop_assert_eq!(store.selection(), Selection::at(Team::Ally, 0));
        prop_assert_eq!(store.bans(), &["81".to_string(), "62".to_string()][..]);
        prop_assert!(!store.draft_finished());
    }
}
