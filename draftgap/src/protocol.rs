// Messages exchanged between the draft core, its collaborators and the
// front-end (user commands in, UI updates out).

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::draft::pick::{Role, Team, TeamPicks};
use crate::draft::selection::Selection;
use crate::draft::state::PickOptions;
use crate::lcu::sync::ClientState;

/// The view the draft view-router should display.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum DraftView {
    /// Draft view focused on one team, or the generic draft view when
    /// `team` is `None`.
    Draft { team: Option<Team> },
    /// Analysis view, shown once every slot is filled.
    Analysis,
}

/// A notification for one of the draft's external collaborators.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum DraftEvent {
    /// View router should switch views.
    ViewChanged(DraftView),
    /// Champion search filters should be cleared.
    FiltersReset,
    /// Analytics: a champion was committed to a slot.
    PickReported {
        champion_key: String,
        champion_name: String,
        role: Option<Role>,
        role_name: Option<String>,
    },
}

/// Read-only copy of the store contents, delivered with every update.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DraftSnapshot {
    pub ally_team: TeamPicks,
    pub opponent_team: TeamPicks,
    pub bans: Vec<String>,
    pub owned_champions: HashSet<String>,
    pub selection: Selection,
    pub draft_finished: bool,
}

impl DraftSnapshot {
    pub fn team(&self, team: Team) -> &TeamPicks {
        match team {
            Team::Ally => &self.ally_team,
            Team::Opponent => &self.opponent_team,
        }
    }
}

/// One atomic store change: the state after the change plus every
/// collaborator notification raised while making it, in order.
#[derive(Debug, Clone, PartialEq)]
pub struct DraftUpdate {
    pub snapshot: DraftSnapshot,
    pub events: Vec<DraftEvent>,
}

impl DraftUpdate {
    /// The last view change raised by this update, if any.
    pub fn final_view(&self) -> Option<DraftView> {
        self.events.iter().rev().find_map(|e| match e {
            DraftEvent::ViewChanged(view) => Some(*view),
            _ => None,
        })
    }
}

/// Updates pushed from the event loop to the front-end.
#[derive(Debug, Clone, PartialEq)]
pub enum UiUpdate {
    Draft(DraftUpdate),
    ClientStatus {
        state: ClientState,
        error: Option<String>,
    },
}

/// Commands from the front-end to the event loop.
#[derive(Debug, Clone, PartialEq)]
pub enum UserCommand {
    Pick {
        team: Team,
        index: usize,
        champion_key: Option<String>,
        role: Option<Role>,
        options: PickOptions,
    },
    Hover {
        team: Team,
        index: usize,
        champion_key: Option<String>,
        role: Option<Role>,
    },
    ResetSlot { team: Team, index: usize },
    ResetTeam(Team),
    ResetAll,
    Select {
        team: Option<Team>,
        index: Option<usize>,
    },
    StartIntegration,
    StopIntegration,
    Quit,
}
