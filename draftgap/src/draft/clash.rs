// Conflict detection for champion and role assignments.
//
// Champions are unique across both teams: a clashing slot is cleared
// entirely. Roles are unique per team only: a clashing slot keeps its
// champion and loses just the role.

use super::pick::{Role, Team, TeamPicks};

/// Slots (on either team) other than `(team, index)` that already hold
/// `champion_key` as a committed pick.
pub fn champion_clashes(
    ally: &TeamPicks,
    opponent: &TeamPicks,
    champion_key: &str,
    team: Team,
    index: usize,
) -> Vec<(Team, usize)> {
    let mut clashes = Vec::new();
    for (side, picks) in [(Team::Ally, ally), (Team::Opponent, opponent)] {
        for (i, pick) in picks.iter().enumerate() {
            if (side, i) == (team, index) {
                continue;
            }
            if pick.champion_key.as_deref() == Some(champion_key) {
                clashes.push((side, i));
            }
        }
    }
    clashes
}

/// Slots on the same team, other than `index`, already assigned `role`.
pub fn role_clashes(picks: &TeamPicks, role: Role, index: usize) -> Vec<usize> {
    picks
        .iter()
        .enumerate()
        .filter(|(i, p)| *i != index && p.role == Some(role))
        .map(|(i, _)| i)
        .collect()
}
