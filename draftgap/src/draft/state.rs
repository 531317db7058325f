// Draft state: both teams' pick slots, bans, owned champions and the
// selection cursor.

use std::collections::HashSet;
use std::sync::Arc;

use tokio::sync::mpsc;
use tracing::{debug, warn};

use super::clash;
use super::pick::{Pick, Role, Team, TeamPicks, TEAM_SIZE};
use super::selection::{next_open_slot, Selection};
use crate::dataset::Dataset;
use crate::protocol::{DraftEvent, DraftSnapshot, DraftUpdate, DraftView};

/// Side effects of [`DraftStore::pick_champion`] beyond writing the slot.
/// Everything is enabled by default.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PickOptions {
    /// Advance the cursor to the next open slot.
    pub update_selection: bool,
    /// Ask the filter collaborator to clear champion search filters.
    pub reset_filters: bool,
    /// Emit an analytics event for a committed champion.
    pub report_event: bool,
    /// Ask the view router to show the draft (or analysis) view.
    pub update_view: bool,
}

impl Default for PickOptions {
    fn default() -> Self {
        PickOptions {
            update_selection: true,
            reset_filters: true,
            report_event: true,
            update_view: true,
        }
    }
}

/// The complete state of one draft.
///
/// Every public mutation is atomic: it runs inside [`DraftStore::batch`] and
/// subscribers see a single [`DraftUpdate`] once the outermost batch ends.
#[derive(Debug)]
pub struct DraftStore {
    dataset: Option<Arc<Dataset>>,
    ally_team: TeamPicks,
    opponent_team: TeamPicks,
    bans: Vec<String>,
    /// Empty means ownership is unknown and every champion counts as owned.
    owned_champions: HashSet<String>,
    selection: Selection,

    batch_depth: usize,
    dirty: bool,
    pending_events: Vec<DraftEvent>,
    subscribers: Vec<mpsc::UnboundedSender<DraftUpdate>>,
}

impl DraftStore {
    /// Create an empty draft validated against `dataset`. The cursor starts
    /// on the first ally slot.
    pub fn new(dataset: Arc<Dataset>) -> Self {
        Self::with_dataset(Some(dataset))
    }

    /// Create an empty draft. Without a dataset every champion pick is
    /// rejected until [`DraftStore::set_dataset`] is called.
    pub fn with_dataset(dataset: Option<Arc<Dataset>>) -> Self {
        DraftStore {
            dataset,
            ally_team: Default::default(),
            opponent_team: Default::default(),
            bans: Vec::new(),
            owned_champions: HashSet::new(),
            selection: Selection::default(),
            batch_depth: 0,
            dirty: false,
            pending_events: Vec::new(),
            subscribers: Vec::new(),
        }
    }

    /// Receive a [`DraftUpdate`] after every atomic change.
    pub fn subscribe(&mut self) -> mpsc::UnboundedReceiver<DraftUpdate> {
        let (tx, rx) = mpsc::unbounded_channel();
        self.subscribers.push(tx);
        rx
    }

    // --- Read access ---

    pub fn ally_team(&self) -> &TeamPicks {
        &self.ally_team
    }

    pub fn opponent_team(&self) -> &TeamPicks {
        &self.opponent_team
    }

    pub fn team(&self, team: Team) -> &TeamPicks {
        match team {
            Team::Ally => &self.ally_team,
            Team::Opponent => &self.opponent_team,
        }
    }

    pub fn bans(&self) -> &[String] {
        &self.bans
    }

    pub fn owned_champions(&self) -> &HashSet<String> {
        &self.owned_champions
    }

    /// Whether the user owns `champion_key`. Always true while ownership is
    /// unknown (empty owned set).
    pub fn is_owned(&self, champion_key: &str) -> bool {
        self.owned_champions.is_empty() || self.owned_champions.contains(champion_key)
    }

    pub fn selection(&self) -> Selection {
        self.selection
    }

    /// True iff all ten slots hold a committed champion.
    pub fn draft_finished(&self) -> bool {
        self.ally_team
            .iter()
            .chain(self.opponent_team.iter())
            .all(|p| p.champion_key.is_some())
    }

    /// Lowest slot on `team` without a committed champion, `None` if full.
    pub fn next_pick(&self, team: Team) -> Option<usize> {
        next_open_slot(self.team(team))
    }

    pub fn snapshot(&self) -> DraftSnapshot {
        DraftSnapshot {
            ally_team: self.ally_team.clone(),
            opponent_team: self.opponent_team.clone(),
            bans: self.bans.clone(),
            owned_champions: self.owned_champions.clone(),
            selection: self.selection,
            draft_finished: self.draft_finished(),
        }
    }

    // --- Batching ---

    /// Run `f` as one atomic update. Batches nest; subscribers are notified
    /// once, when the outermost batch ends, and only if something happened.
    pub fn batch<R>(&mut self, f: impl FnOnce(&mut Self) -> R) -> R {
        self.batch_depth += 1;
        let result = f(self);
        self.batch_depth -= 1;
        if self.batch_depth == 0 {
            self.flush();
        }
        result
    }

    fn flush(&mut self) {
        if !self.dirty && self.pending_events.is_empty() {
            return;
        }
        let update = DraftUpdate {
            snapshot: self.snapshot(),
            events: std::mem::take(&mut self.pending_events),
        };
        self.dirty = false;
        self.subscribers.retain(|tx| tx.send(update.clone()).is_ok());
    }

    fn emit(&mut self, event: DraftEvent) {
        self.pending_events.push(event);
    }

    // --- Mutations ---

    /// Commit `champion_key` (or clear the slot when `None`) with `role` to
    /// slot `index` of `team`.
    ///
    /// Unknown champions are silently ignored. Any other slot holding the
    /// same champion is reset, and any other slot on the same team holding
    /// the same role loses its role. The slot's hover is always cleared.
    pub fn pick_champion(
        &mut self,
        team: Team,
        index: usize,
        champion_key: Option<&str>,
        role: Option<Role>,
        options: PickOptions,
    ) {
        self.batch(|store| {
            if !store.accepts(team, index, champion_key) {
                return;
            }
            store.resolve_clashes(team, index, champion_key, role);
            store.set_slot(
                team,
                index,
                Pick {
                    champion_key: champion_key.map(str::to_string),
                    role,
                    hover_key: None,
                },
            );

            if options.update_view {
                store.emit(DraftEvent::ViewChanged(DraftView::Draft { team: Some(team) }));
            }

            if options.update_selection {
                match store.next_pick(team) {
                    Some(next) => store.select(Some(team), Some(next), true),
                    None => {
                        let other = team.other();
                        match store.next_pick(other) {
                            Some(next) => store.select(Some(other), Some(next), true),
                            None => store.select(None, Some(0), true),
                        }
                    }
                }
            }

            if options.update_view && store.draft_finished() {
                store.emit(DraftEvent::ViewChanged(DraftView::Analysis));
            }

            if options.reset_filters {
                store.emit(DraftEvent::FiltersReset);
            }

            if options.report_event {
                if let Some(key) = champion_key {
                    let champion_name = store
                        .dataset
                        .as_ref()
                        .and_then(|d| d.champion(key))
                        .map(|c| c.name.clone())
                        .unwrap_or_default();
                    store.emit(DraftEvent::PickReported {
                        champion_key: key.to_string(),
                        champion_name,
                        role,
                        role_name: role.map(|r| r.display_name().to_string()),
                    });
                }
            }
        });
    }

    /// Show `champion_key` as a provisional (hovered) choice in a slot. The
    /// slot's committed champion is cleared, its role is claimed.
    pub fn hover_champion(
        &mut self,
        team: Team,
        index: usize,
        champion_key: Option<&str>,
        role: Option<Role>,
    ) {
        self.batch(|store| {
            if !store.accepts(team, index, champion_key) {
                return;
            }
            store.resolve_clashes(team, index, champion_key, role);
            store.set_slot(
                team,
                index,
                Pick {
                    champion_key: None,
                    role,
                    hover_key: champion_key.map(str::to_string),
                },
            );
        });
    }

    /// Clear one slot without moving the cursor or touching filters.
    pub fn reset_champion(&mut self, team: Team, index: usize) {
        self.pick_champion(
            team,
            index,
            None,
            None,
            PickOptions {
                update_selection: false,
                reset_filters: false,
                ..Default::default()
            },
        );
    }

    /// Clear all five slots of `team` and put the cursor on its first slot.
    pub fn reset_team(&mut self, team: Team) {
        self.batch(|store| {
            for index in 0..TEAM_SIZE {
                store.reset_champion(team, index);
            }
            store.select(Some(team), Some(0), true);
        });
    }

    /// Clear both teams (ally first) and return the cursor to the first ally
    /// slot. Bans and owned champions are left alone.
    pub fn reset_all(&mut self) {
        self.batch(|store| {
            store.reset_team(Team::Ally);
            store.reset_team(Team::Opponent);
            store.select(Some(Team::Ally), Some(0), true);
        });
    }

    /// Move the cursor.
    ///
    /// Selecting an already filled slot is a no-op. Without an index the
    /// team's next open slot is used; if the team is full the cursor is
    /// cleared. The view router is always told to show the draft view.
    pub fn select(&mut self, team: Option<Team>, index: Option<usize>, reset_filters: bool) {
        self.batch(|store| {
            if let (Some(team), Some(index)) = (team, index) {
                if index >= TEAM_SIZE {
                    warn!("Ignoring selection of out-of-range slot {team}/{index}");
                    return;
                }
                if store.team(team)[index].champion_key.is_some() {
                    debug!("Ignoring selection of filled slot {team}/{index}");
                    return;
                }
            }

            let selection = match (team, index) {
                (Some(team), Some(index)) => Selection::at(team, index),
                (Some(team), None) => match store.next_pick(team) {
                    Some(next) => Selection::at(team, next),
                    None => Selection::cleared(),
                },
                (None, index) => Selection {
                    team: None,
                    index: index.unwrap_or(0),
                },
            };
            if store.selection != selection {
                store.selection = selection;
                store.dirty = true;
            }

            if reset_filters {
                store.emit(DraftEvent::FiltersReset);
            }

            let team = if store.draft_finished() { None } else { team };
            store.emit(DraftEvent::ViewChanged(DraftView::Draft { team }));
        });
    }

    /// Replace the ban list (in ban order).
    pub fn set_bans(&mut self, bans: Vec<String>) {
        self.batch(|store| {
            if store.bans != bans {
                store.bans = bans;
                store.dirty = true;
            }
        });
    }

    /// Replace the owned-champion set. An empty set means "unknown".
    pub fn set_owned_champions(&mut self, owned: HashSet<String>) {
        self.batch(|store| {
            if store.owned_champions != owned {
                store.owned_champions = owned;
                store.dirty = true;
            }
        });
    }

    /// Swap the champion dataset. Existing picks are kept.
    pub fn set_dataset(&mut self, dataset: Arc<Dataset>) {
        self.dataset = Some(dataset);
    }

    // --- Internals ---

    /// Validation shared by pick and hover.
    fn accepts(&self, team: Team, index: usize, champion_key: Option<&str>) -> bool {
        if index >= TEAM_SIZE {
            warn!("Ignoring pick for out-of-range slot {team}/{index}");
            return false;
        }
        if let Some(key) = champion_key {
            let known = self.dataset.as_ref().is_some_and(|d| d.contains(key));
            if !known {
                debug!("Ignoring pick of unknown champion '{key}'");
                return false;
            }
        }
        true
    }

    fn resolve_clashes(
        &mut self,
        team: Team,
        index: usize,
        champion_key: Option<&str>,
        role: Option<Role>,
    ) {
        if let Some(key) = champion_key {
            for (side, slot) in
                clash::champion_clashes(&self.ally_team, &self.opponent_team, key, team, index)
            {
                debug!("Champion '{key}' moved from {side}/{slot} to {team}/{index}");
                self.reset_champion(side, slot);
            }
        }
        // Roles stay unique per team even when only a role is assigned.
        if let Some(role) = role {
            for slot in clash::role_clashes(self.team(team), role, index) {
                debug!("Role {role} moved from {team}/{slot} to {team}/{index}");
                self.team_mut(team)[slot].role = None;
                self.dirty = true;
            }
        }
    }

    fn set_slot(&mut self, team: Team, index: usize, pick: Pick) {
        self.team_mut(team)[index] = pick;
        self.dirty = true;
    }

    fn team_mut(&mut self, team: Team) -> &mut TeamPicks {
        match team {
            Team::Ally => &mut self.ally_team,
            Team::Opponent => &mut self.opponent_team,
        }
    }
}
