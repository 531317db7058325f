// Selection cursor: which team/slot receives the next pick.

use serde::{Deserialize, Serialize};

use super::pick::{Team, TeamPicks};

/// The UI cursor. `team == None` means no active cursor (draft complete or
/// not started); `index` is only meaningful while a team is set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Selection {
    pub team: Option<Team>,
    pub index: usize,
}

impl Selection {
    pub fn at(team: Team, index: usize) -> Self {
        Selection {
            team: Some(team),
            index,
        }
    }

    pub fn cleared() -> Self {
        Selection {
            team: None,
            index: 0,
        }
    }
}

impl Default for Selection {
    fn default() -> Self {
        Selection::at(Team::Ally, 0)
    }
}

/// Lowest slot index on `picks` without a committed champion.
pub fn next_open_slot(picks: &TeamPicks) -> Option<usize> {
    picks.iter().position(|p| p.champion_key.is_none())
}
