// draftgap entry point.
//
// Startup sequence:
// 1. Initialize tracing (log to file, not terminal)
// 2. Load config
// 3. Open database
// 4. Load the champion dataset
// 5. Build the draft store and League client synchronizer
// 6. Spawn app logic task
// 7. Read commands from stdin, print one line per update
// 8. Cleanup on exit

use std::sync::Arc;

use anyhow::Context;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::mpsc;
use tracing::{error, info, warn};

use draftgap::app;
use draftgap::config;
use draftgap::dataset::Dataset;
use draftgap::db::Database;
use draftgap::draft::pick::{Pick, Team};
use draftgap::draft::state::DraftStore;
use draftgap::input;
use draftgap::lcu::client::LcuClient;
use draftgap::lcu::favourites::FavouriteSet;
use draftgap::lcu::sync::{LcuSync, SyncOptions};
use draftgap::protocol::{DraftSnapshot, UiUpdate, UserCommand};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // 1. Initialize tracing
    init_tracing()?;
    info!("draftgap starting up");

    // 2. Load config
    let config = config::load_config().context("failed to load configuration")?;
    info!(
        "Config loaded: client at {}, dataset {}",
        config.client.install_dir.display(),
        config.dataset.path.display()
    );

    // 3. Open database
    let db_path = config.db_path();
    if let Some(parent) = db_path.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("failed to create {}", parent.display()))?;
    }
    let db = Database::open(&db_path.to_string_lossy()).context("failed to open database")?;
    info!("Database opened at {}", db_path.display());

    // 4. Load the champion dataset. Without one every pick is rejected, but
    // the app still follows the client's connection state.
    let dataset = match Dataset::load(&config.dataset.path) {
        Ok(dataset) => {
            info!(
                "Loaded {} champions (version {})",
                dataset.len(),
                dataset.version
            );
            Some(Arc::new(dataset))
        }
        Err(e) => {
            warn!("No champion dataset: {e:#}");
            eprintln!("warning: {e:#}; champion picks will be ignored");
            None
        }
    };

    // 5. Draft store and synchronizer
    let store = DraftStore::with_dataset(dataset.clone());
    let client = LcuClient::new(&config.client.install_dir, config.client.request_timeout())
        .context("failed to create League client")?;
    let mut sync = LcuSync::new(
        client,
        Arc::new(db),
        Box::new(FavouriteSet::default()),
        SyncOptions {
            show_hovers: config.sync.show_hovers,
        },
    );
    if config.sync.enabled {
        sync.start();
    }

    // 6. Spawn app logic task
    let (cmd_tx, cmd_rx) = mpsc::channel(64);
    let (ui_tx, mut ui_rx) = mpsc::channel(256);
    let app_state = app::AppState::new(store, sync);
    let app_handle = tokio::spawn(async move {
        if let Err(e) = app::run(cmd_rx, ui_tx, app_state).await {
            error!("Application loop error: {}", e);
        }
    });

    let printer = tokio::spawn(async move {
        while let Some(update) = ui_rx.recv().await {
            println!("{}", describe(&update));
        }
    });

    // 7. Commands from stdin until quit or EOF
    println!("draftgap ready. Commands: pick, hover, reset, select, start, stop, quit");
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await.context("failed to read stdin")? {
        match input::parse_command(&line, dataset.as_deref()) {
            Ok(cmd) => {
                let quit = cmd == UserCommand::Quit;
                if cmd_tx.send(cmd).await.is_err() || quit {
                    break;
                }
            }
            Err(input::InputError::Empty) => {}
            Err(e) => eprintln!("{e}"),
        }
    }
    drop(cmd_tx);

    // 8. Cleanup: wait for app task to finish (with timeout)
    let _ = tokio::time::timeout(std::time::Duration::from_secs(5), async {
        let _ = app_handle.await;
        let _ = printer.await;
    })
    .await;

    info!("draftgap shut down cleanly");
    Ok(())
}

/// One line describing a UI update.
fn describe(update: &UiUpdate) -> String {
    match update {
        UiUpdate::Draft(update) => {
            let snapshot = &update.snapshot;
            let mut line = format!(
                "ally [{}] | opponent [{}] | bans [{}]",
                team_line(snapshot, Team::Ally),
                team_line(snapshot, Team::Opponent),
                snapshot.bans.join(", ")
            );
            match snapshot.selection.team {
                Some(team) => line.push_str(&format!(
                    " | selected {team} {}",
                    snapshot.selection.index + 1
                )),
                None if snapshot.draft_finished => line.push_str(" | draft finished"),
                None => {}
            }
            line
        }
        UiUpdate::ClientStatus { state, error } => match error {
            Some(error) => format!("League client: {state} ({error})"),
            None => format!("League client: {state}"),
        },
    }
}

fn team_line(snapshot: &DraftSnapshot, team: Team) -> String {
    snapshot
        .team(team)
        .iter()
        .map(slot_label)
        .collect::<Vec<_>>()
        .join(", ")
}

fn slot_label(pick: &Pick) -> String {
    let champion = match (&pick.champion_key, &pick.hover_key) {
        (Some(key), _) => key.clone(),
        (None, Some(hover)) => format!("({hover})"),
        (None, None) => "-".to_string(),
    };
    match pick.role {
        Some(role) => format!("{champion}:{role}"),
        None => champion,
    }
}

/// Initialize tracing to log to a file (stdout carries the command output).
fn init_tracing() -> anyhow::Result<()> {
    use tracing_subscriber::fmt;
    use tracing_subscriber::EnvFilter;

    // logs/ sits next to config/, and each run truncates the previous log.
    let log_dir = std::env::current_dir()?.join("logs");
    std::fs::create_dir_all(&log_dir)?;
    let log_file = std::fs::File::create(log_dir.join("draftgap.log"))?;

    // RUST_LOG overrides the default of our own info plus everyone's warnings.
    let subscriber = fmt::Subscriber::builder()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("draftgap=info,warn")),
        )
        .with_writer(log_file)
        .with_ansi(false)
        .with_target(true)
        .with_thread_ids(true)
        .with_line_number(true)
        .finish();

    tracing::subscriber::set_global_default(subscriber)
        .context("failed to set tracing subscriber")?;

    Ok(())
}
