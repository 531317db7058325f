// Keeps the draft in step with the live champion-select session of the
// local game client.
//
// `LcuSync` is polled by the application event loop: it owns a
// `PollSchedule` holding at most one pending deadline, and every completed
// cycle computes the next one from the state it ended in. Cycles are awaited
// one at a time, so they never overlap.

use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use serde::{Deserialize, Serialize};
use tokio::time::Instant;
use tracing::{debug, info, warn};

use super::client::{LcuApi, LcuError};
use super::favourites::{check_import_favourites, Favourites};
use super::types::{ActionKind, ChampSelectSession, PlayerSelection, Summoner};
use crate::db::Database;
use crate::draft::pick::{Role, Team, TEAM_SIZE};
use crate::draft::state::{DraftStore, PickOptions};

/// Connection state towards the local game client.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ClientState {
    /// Client not running or not answering.
    NotFound,
    MainMenu,
    InChampSelect,
    /// Integration switched off by the user.
    Disabled,
}

impl ClientState {
    /// Delay before the next poll while in this state.
    pub fn poll_delay(self) -> Duration {
        match self {
            ClientState::MainMenu => Duration::from_millis(1000),
            ClientState::InChampSelect => Duration::from_millis(500),
            ClientState::NotFound | ClientState::Disabled => Duration::from_millis(2000),
        }
    }
}

impl std::fmt::Display for ClientState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            ClientState::NotFound => "not found",
            ClientState::MainMenu => "main menu",
            ClientState::InChampSelect => "in champ select",
            ClientState::Disabled => "disabled",
        };
        f.write_str(s)
    }
}

/// A single pending deadline. Cancelling clears it; nothing fires until
/// something schedules again.
#[derive(Debug, Default)]
pub struct PollSchedule {
    next: Option<Instant>,
}

impl PollSchedule {
    pub fn schedule_in(&mut self, delay: Duration) {
        self.next = Some(Instant::now() + delay);
    }

    pub fn cancel(&mut self) {
        self.next = None;
    }

    pub fn deadline(&self) -> Option<Instant> {
        self.next
    }

    /// Consume the deadline if it has passed.
    pub fn take_due(&mut self, now: Instant) -> bool {
        match self.next {
            Some(at) if at <= now => {
                self.next = None;
                true
            }
            _ => false,
        }
    }

    /// Sleep until `deadline`, or forever when there is none. Takes the
    /// deadline by value so callers can keep mutating the schedule while
    /// the returned future is alive (e.g. inside `tokio::select!`).
    pub async fn wait_for(deadline: Option<Instant>) {
        match deadline {
            Some(at) => tokio::time::sleep_until(at).await,
            None => std::future::pending().await,
        }
    }
}

/// Tunables for [`LcuSync`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SyncOptions {
    /// Mirror teammates' pick intents as hovers.
    pub show_hovers: bool,
}

impl Default for SyncOptions {
    fn default() -> Self {
        SyncOptions { show_hovers: true }
    }
}

/// The live-client synchronizer.
pub struct LcuSync<A: LcuApi> {
    api: A,
    db: Arc<Database>,
    favourites: Box<dyn Favourites>,
    options: SyncOptions,

    state: ClientState,
    error: Option<String>,
    summoner: Option<Summoner>,
    session: Option<ChampSelectSession>,

    running: bool,
    schedule: PollSchedule,
}

impl<A: LcuApi> LcuSync<A> {
    /// A stopped synchronizer. Call [`LcuSync::start`] to begin polling.
    pub fn new(
        api: A,
        db: Arc<Database>,
        favourites: Box<dyn Favourites>,
        options: SyncOptions,
    ) -> Self {
        LcuSync {
            api,
            db,
            favourites,
            options,
            state: ClientState::NotFound,
            error: None,
            summoner: None,
            session: None,
            running: false,
            schedule: PollSchedule::default(),
        }
    }

    pub fn client_state(&self) -> ClientState {
        self.state
    }

    /// Message of the failure that put the synchronizer in
    /// [`ClientState::NotFound`], cleared by the next successful cycle.
    pub fn client_error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn current_summoner(&self) -> Option<&Summoner> {
        self.summoner.as_ref()
    }

    /// The last champion-select session seen, if the client is in one.
    pub fn champ_select_session(&self) -> Option<&ChampSelectSession> {
        self.session.as_ref()
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    pub fn next_poll(&self) -> Option<Instant> {
        self.schedule.deadline()
    }

    /// Begin polling; the first cycle is due immediately.
    pub fn start(&mut self) {
        info!("Starting League client integration");
        self.running = true;
        self.schedule.schedule_in(Duration::ZERO);
    }

    /// Cancel the pending cycle and report [`ClientState::Disabled`].
    pub fn stop(&mut self) {
        info!("Stopping League client integration");
        self.running = false;
        self.schedule.cancel();
        self.set_state(ClientState::Disabled);
    }

    /// Stop, then report the client as gone.
    pub fn shutdown(&mut self) {
        self.stop();
        self.set_state(ClientState::NotFound);
    }

    /// Run the cycle if its deadline has passed. Returns whether it ran.
    pub async fn poll_if_due(&mut self, store: &mut DraftStore) -> bool {
        if !self.schedule.take_due(Instant::now()) {
            return false;
        }
        self.poll(store).await;
        true
    }

    /// Run one cycle and, unless stopped meanwhile, schedule the next one
    /// after the delay of the state the cycle ended in.
    pub async fn poll(&mut self, store: &mut DraftStore) -> ClientState {
        self.update(store).await;
        if self.running {
            self.schedule.schedule_in(self.state.poll_delay());
        } else {
            debug!("Integration stopped during cycle, not rescheduling");
        }
        self.state
    }

    /// One poll cycle without scheduling. Failures are recorded, never
    /// returned.
    pub async fn update(&mut self, store: &mut DraftStore) {
        match self.run_cycle(store).await {
            Ok(()) => self.error = None,
            Err(e) => {
                if self.state != ClientState::NotFound {
                    warn!("League client unavailable: {e}");
                } else {
                    debug!("League client still unavailable: {e}");
                }
                self.session = None;
                self.error = Some(e.to_string());
                self.set_state(ClientState::NotFound);
            }
        }
    }

    async fn run_cycle(&mut self, store: &mut DraftStore) -> Result<(), LcuError> {
        if self.summoner.is_none() {
            if let Some(summoner) = self.api.current_summoner().await? {
                info!(
                    "Current summoner: {} (id {})",
                    summoner.display_name, summoner.summoner_id
                );
                self.summoner = Some(summoner);
            }
        }

        let Some(session) = self.api.champ_select_session().await? else {
            if self.state != ClientState::MainMenu {
                store.batch(|store| {
                    store.set_bans(Vec::new());
                    store.set_owned_champions(HashSet::new());
                });
            }
            self.session = None;
            self.set_state(ClientState::MainMenu);
            return Ok(());
        };

        let first_time = self.state != ClientState::InChampSelect;
        let owned = if first_time {
            let owned = self.fetch_owned_champions().await;
            self.import_favourites().await;
            owned
        } else {
            None
        };

        let local_summoner_id = self.summoner.as_ref().map(|s| s.summoner_id);
        let show_hovers = self.options.show_hovers;
        store.batch(|store| {
            if first_time {
                info!("Champion select started (game {})", session.game_id);
                if let Some(owned) = owned {
                    store.set_owned_champions(owned);
                }
                store.reset_all();
                store.set_bans(Vec::new());
            }
            update_champ_select_session(store, &session, first_time, local_summoner_id, show_hovers);
        });

        self.session = Some(session);
        self.set_state(ClientState::InChampSelect);
        Ok(())
    }

    async fn fetch_owned_champions(&self) -> Option<HashSet<String>> {
        match self.api.pickable_champion_ids().await {
            Ok(Some(ids)) => Some(ids.iter().map(i64::to_string).collect()),
            Ok(None) => {
                warn!("Failed to get owned champions");
                None
            }
            Err(e) => {
                warn!("Failed to get owned champions: {e}");
                None
            }
        }
    }

    async fn import_favourites(&mut self) {
        let result = check_import_favourites(
            &self.api,
            &self.db,
            self.favourites.as_mut(),
            Utc::now(),
        )
        .await;
        if let Err(e) = result {
            warn!("Favourite picks import failed: {e:#}");
        }
    }

    fn set_state(&mut self, state: ClientState) {
        if self.state != state {
            info!("League client: {} -> {}", self.state, state);
            self.state = state;
        }
    }
}

/// Apply one champion-select session to the store as a single update.
///
/// Only completed pick actions commit champions. The ban list is replaced
/// when it differs, and when anything changed the cursor moves to the slot
/// of the next pending pick. Returns whether any slot changed.
pub fn update_champ_select_session(
    store: &mut DraftStore,
    session: &ChampSelectSession,
    first_time: bool,
    local_summoner_id: Option<i64>,
    show_hovers: bool,
) -> bool {
    let completed_cells: HashSet<i64> = session
        .flat_actions()
        .filter(|a| a.kind == ActionKind::Pick && a.completed)
        .map(|a| a.actor_cell_id)
        .collect();
    let next_pick = session
        .flat_actions()
        .find(|a| a.kind == ActionKind::Pick && !a.completed);
    let bans: Vec<String> = session
        .flat_actions()
        .filter(|a| a.kind == ActionKind::Ban && a.completed && a.champion_id != 0)
        .map(|a| a.champion_id.to_string())
        .collect();

    store.batch(|store| {
        let mut changed = first_time;
        for team in Team::BOTH {
            let cells = session.team_cells(team == Team::Ally);
            for (index, selection) in cells.iter().enumerate().take(TEAM_SIZE) {
                changed |= process_selection(
                    store,
                    selection,
                    team,
                    index,
                    &completed_cells,
                    local_summoner_id,
                );
            }
        }
        // Hovers go last; a hover never displaces a locked pick.
        if show_hovers {
            let cells = session.team_cells(true);
            for (index, selection) in cells.iter().enumerate().take(TEAM_SIZE) {
                reflect_hover(store, selection, index, &completed_cells);
            }
        }

        if store.bans() != bans.as_slice() {
            store.set_bans(bans);
        }

        if let Some(next) = next_pick.filter(|_| changed) {
            let team = if next.is_ally_action {
                Team::Ally
            } else {
                Team::Opponent
            };
            let position = session
                .team_cells(next.is_ally_action)
                .iter()
                .take(TEAM_SIZE)
                .position(|c| c.cell_id == next.actor_cell_id);
            match position {
                Some(index) => store.select(Some(team), Some(index), false),
                None => debug!("No seat for pending pick of cell {}", next.actor_cell_id),
            }
        }
        changed
    })
}

/// Commit a completed selection if it differs from the slot.
fn process_selection(
    store: &mut DraftStore,
    selection: &PlayerSelection,
    team: Team,
    index: usize,
    completed_cells: &HashSet<i64>,
    local_summoner_id: Option<i64>,
) -> bool {
    // Zero while nothing is picked, and for hidden blind-pick opponents.
    if selection.champion_id == 0 || !completed_cells.contains(&selection.cell_id) {
        return false;
    }
    let key = selection.champion_id.to_string();
    if store.team(team)[index].champion_key.as_deref() == Some(key.as_str()) {
        return false;
    }

    let role = Role::from_client_str(&selection.assigned_position);
    let is_local = local_summoner_id.is_some_and(|id| id == selection.summoner_id);
    debug!("Live pick {team}/{index}: champion {key}, role {role:?}");
    store.pick_champion(
        team,
        index,
        Some(&key),
        role,
        PickOptions {
            update_selection: false,
            reset_filters: is_local,
            ..Default::default()
        },
    );
    true
}

/// Mirror a teammate's not yet locked pick intent as a hover.
fn reflect_hover(
    store: &mut DraftStore,
    selection: &PlayerSelection,
    index: usize,
    completed_cells: &HashSet<i64>,
) {
    if completed_cells.contains(&selection.cell_id) {
        return;
    }
    // An intent for a champion someone already locked is stale.
    let intent = (selection.champion_pick_intent != 0)
        .then(|| selection.champion_pick_intent.to_string())
        .filter(|key| !is_committed(store, key));
    let slot = &store.ally_team()[index];
    if slot.champion_key.is_some() || slot.hover_key == intent {
        return;
    }
    let role = Role::from_client_str(&selection.assigned_position);
    store.hover_champion(Team::Ally, index, intent.as_deref(), role);
}

fn is_committed(store: &DraftStore, champion_key: &str) -> bool {
    Team::BOTH.into_iter().any(|team| {
        store
            .team(team)
            .iter()
            .any(|p| p.champion_key.as_deref() == Some(champion_key))
    })
}
