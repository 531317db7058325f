// Application state and orchestration logic.
//
// The central event loop that applies user commands to the draft, runs the
// League client synchronizer whenever its poll deadline passes, and pushes
// UI updates to the front-end.

use tokio::sync::mpsc;
use tracing::{debug, info};

use crate::draft::state::DraftStore;
use crate::lcu::client::LcuApi;
use crate::lcu::sync::{ClientState, LcuSync, PollSchedule};
use crate::protocol::{DraftUpdate, UiUpdate, UserCommand};

// ---------------------------------------------------------------------------
// AppState
// ---------------------------------------------------------------------------

/// Everything the event loop owns.
pub struct AppState<A: LcuApi> {
    pub store: DraftStore,
    pub sync: LcuSync<A>,
}

impl<A: LcuApi> AppState<A> {
    pub fn new(store: DraftStore, sync: LcuSync<A>) -> Self {
        AppState { store, sync }
    }

    /// Apply a user command. `Quit` is handled by the loop itself.
    pub fn handle_user_command(&mut self, cmd: UserCommand) {
        match cmd {
            UserCommand::Pick {
                team,
                index,
                champion_key,
                role,
                options,
            } => {
                debug!("Pick {team}/{index}: {champion_key:?} {role:?}");
                self.store
                    .pick_champion(team, index, champion_key.as_deref(), role, options);
            }
            UserCommand::Hover {
                team,
                index,
                champion_key,
                role,
            } => {
                self.store
                    .hover_champion(team, index, champion_key.as_deref(), role);
            }
            UserCommand::ResetSlot { team, index } => self.store.reset_champion(team, index),
            UserCommand::ResetTeam(team) => self.store.reset_team(team),
            UserCommand::ResetAll => {
                info!("Resetting draft");
                self.store.reset_all();
            }
            UserCommand::Select { team, index } => self.store.select(team, index, true),
            UserCommand::StartIntegration => {
                if !self.sync.is_running() {
                    self.sync.start();
                }
            }
            UserCommand::StopIntegration => self.sync.stop(),
            UserCommand::Quit => {}
        }
    }

    fn client_status(&self) -> (ClientState, Option<String>) {
        (
            self.sync.client_state(),
            self.sync.client_error().map(str::to_string),
        )
    }
}

// ---------------------------------------------------------------------------
// Main event loop
// ---------------------------------------------------------------------------

/// Run the main application event loop.
///
/// Listens with `tokio::select!` on:
/// 1. Draft store updates, forwarded to the front-end
/// 2. User commands
/// 3. The synchronizer's poll deadline
///
/// Returns when the user quits or the command channel closes. The
/// synchronizer is shut down on the way out.
pub async fn run<A: LcuApi>(
    mut cmd_rx: mpsc::Receiver<UserCommand>,
    ui_tx: mpsc::Sender<UiUpdate>,
    mut state: AppState<A>,
) -> anyhow::Result<()> {
    info!("Application event loop started");

    let mut draft_rx = state.store.subscribe();
    let _ = ui_tx
        .send(UiUpdate::Draft(DraftUpdate {
            snapshot: state.store.snapshot(),
            events: Vec::new(),
        }))
        .await;

    let mut last_status = state.client_status();
    let _ = ui_tx
        .send(UiUpdate::ClientStatus {
            state: last_status.0,
            error: last_status.1.clone(),
        })
        .await;

    loop {
        let deadline = state.sync.next_poll();
        tokio::select! {
            biased;

            // --- Draft updates ---
            Some(update) = draft_rx.recv() => {
                let _ = ui_tx.send(UiUpdate::Draft(update)).await;
            }

            // --- User commands ---
            cmd = cmd_rx.recv() => {
                match cmd {
                    Some(UserCommand::Quit) => {
                        info!("Quit command received, shutting down");
                        break;
                    }
                    Some(cmd) => state.handle_user_command(cmd),
                    None => {
                        info!("Command channel closed, shutting down");
                        break;
                    }
                }
            }

            // --- League client poll ---
            _ = PollSchedule::wait_for(deadline) => {
                state.sync.poll_if_due(&mut state.store).await;
            }
        }

        let status = state.client_status();
        if status != last_status {
            let _ = ui_tx
                .send(UiUpdate::ClientStatus {
                    state: status.0,
                    error: status.1.clone(),
                })
                .await;
            last_status = status;
        }
    }

    state.sync.shutdown();
    while let Ok(update) = draft_rx.try_recv() {
        let _ = ui_tx.send(UiUpdate::Draft(update)).await;
    }
    info!("Application event loop exiting");
    Ok(())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use async_trait::async_trait;

    use super::*;
    use crate::dataset::Dataset;
    use crate::db::Database;
    use crate::draft::pick::{Role, Team};
    use crate::draft::selection::Selection;
    use crate::draft::state::PickOptions;
    use crate::lcu::client::LcuError;
    use crate::lcu::favourites::FavouriteSet;
    use crate::lcu::sync::SyncOptions;
    use crate::lcu::types::{ChampSelectSession, GridChampion, Summoner};

    /// A client that is never running.
    struct Offline;

    #[async_trait]
    impl LcuApi for Offline {
        async fn current_summoner(&self) -> Result<Option<Summoner>, LcuError> {
            Err(LcuError::ClientNotRunning { dir: "/x".into() })
        }
        async fn champ_select_session(&self) -> Result<Option<ChampSelectSession>, LcuError> {
            Err(LcuError::ClientNotRunning { dir: "/x".into() })
        }
        async fn grid_champions(&self) -> Result<Option<Vec<GridChampion>>, LcuError> {
            Ok(None)
        }
        async fn pickable_champion_ids(&self) -> Result<Option<Vec<i64>>, LcuError> {
            Ok(None)
        }
    }

    fn app_state() -> AppState<Offline> {
        let store = DraftStore::new(Arc::new(Dataset::from_champions([
            ("57", "Maokai"),
            ("64", "Lee Sin"),
        ])));
        let db = Arc::new(Database::open(":memory:").unwrap());
        let sync = LcuSync::new(
            Offline,
            db,
            Box::new(FavouriteSet::default()),
            SyncOptions::default(),
        );
        AppState::new(store, sync)
    }

    #[test]
    fn commands_mutate_store() {
        let mut state = app_state();
        state.handle_user_command(UserCommand::Pick {
            team: Team::Ally,
            index: 0,
            champion_key: Some("57".into()),
            role: Some(Role::Top),
            options: PickOptions::default(),
        });
        assert_eq!(state.store.ally_team()[0].champion_key.as_deref(), Some("57"));

        state.handle_user_command(UserCommand::Select {
            team: Some(Team::Opponent),
            index: Some(2),
        });
        assert_eq!(state.store.selection(), Selection::at(Team::Opponent, 2));

        state.handle_user_command(UserCommand::ResetAll);
        assert!(state.store.ally_team()[0].is_empty());
    }

    #[test]
    fn start_and_stop_integration() {
        let mut state = app_state();
        state.handle_user_command(UserCommand::StartIntegration);
        assert!(state.sync.is_running());
        assert!(state.sync.next_poll().is_some());

        state.handle_user_command(UserCommand::StopIntegration);
        assert!(!state.sync.is_running());
        assert_eq!(state.sync.client_state(), ClientState::Disabled);
    }

    fn assert_send<T: Send>(_: &T) {}

    #[test]
    fn event_loop_can_be_spawned() {
        // tokio::spawn needs the loop future to be Send.
        let (_cmd_tx, cmd_rx) = mpsc::channel(1);
        let (ui_tx, _ui_rx) = mpsc::channel(1);
        let fut = run(cmd_rx, ui_tx, app_state());
        assert_send(&fut);
    }

    #[tokio::test(start_paused = true)]
    async fn loop_reports_offline_client_and_quits() {
        let (cmd_tx, cmd_rx) = mpsc::channel(8);
        let (ui_tx, mut ui_rx) = mpsc::channel(64);
        let handle = tokio::spawn(run(cmd_rx, ui_tx, app_state()));

        cmd_tx.send(UserCommand::StartIntegration).await.unwrap();
        // Let a few failing cycles run.
        tokio::time::sleep(std::time::Duration::from_secs(5)).await;
        cmd_tx.send(UserCommand::Quit).await.unwrap();
        handle.await.unwrap().unwrap();

        let mut errors = Vec::new();
        while let Ok(update) = ui_rx.try_recv() {
            if let UiUpdate::ClientStatus { state, error } = update {
                errors.push((state, error));
            }
        }
        assert_eq!(errors[0], (ClientState::NotFound, None));
        assert!(errors
            .iter()
            .any(|(s, e)| *s == ClientState::NotFound && e.is_some()));
    }

    #[tokio::test]
    async fn loop_forwards_draft_updates() {
        let (cmd_tx, cmd_rx) = mpsc::channel(8);
        let (ui_tx, mut ui_rx) = mpsc::channel(64);
        let handle = tokio::spawn(run(cmd_rx, ui_tx, app_state()));

        cmd_tx
            .send(UserCommand::Pick {
                team: Team::Ally,
                index: 0,
                champion_key: Some("64".into()),
                role: Some(Role::Jungle),
                options: PickOptions::default(),
            })
            .await
            .unwrap();
        cmd_tx.send(UserCommand::Quit).await.unwrap();
        handle.await.unwrap().unwrap();

        let picked = std::iter::from_fn(|| ui_rx.try_recv().ok()).any(|u| match u {
            UiUpdate::Draft(update) => {
                update.snapshot.ally_team[0].champion_key.as_deref() == Some("64")
            }
            _ => false,
        });
        assert!(picked);
    }
}
