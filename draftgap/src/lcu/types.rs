// Wire types for the local game client's REST API. Only the fields the
// draft needs are modelled; everything else is ignored by serde.

use serde::{Deserialize, Serialize};

/// `GET /lol-summoner/v1/current-summoner`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Summoner {
    pub summoner_id: i64,
    pub account_id: i64,
    pub puuid: String,
    pub display_name: String,
    pub game_name: String,
    pub tag_line: String,
    pub summoner_level: u32,
}

/// Kind of a champion-select action.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActionKind {
    Pick,
    Ban,
    #[serde(other)]
    Other,
}

/// One pick or ban turn in champion select.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChampSelectAction {
    #[serde(default)]
    pub id: i64,
    pub actor_cell_id: i64,
    #[serde(default)]
    pub champion_id: i64,
    #[serde(default)]
    pub completed: bool,
    #[serde(default)]
    pub is_ally_action: bool,
    #[serde(default)]
    pub is_in_progress: bool,
    #[serde(rename = "type")]
    pub kind: ActionKind,
}

/// A player's seat ("cell") in champion select.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PlayerSelection {
    pub cell_id: i64,
    /// Zero while nothing is selected (and always zero for hidden
    /// opponents in blind pick).
    pub champion_id: i64,
    /// Champion the player is hovering before locking in.
    pub champion_pick_intent: i64,
    /// `top`, `jungle`, `middle`, `bottom`, `utility` or empty.
    pub assigned_position: String,
    pub summoner_id: i64,
    pub team: i64,
}

/// `GET /lol-champ-select/v1/session`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ChampSelectSession {
    pub game_id: i64,
    pub local_player_cell_id: i64,
    /// Turns grouped by phase; order across groups is session order.
    pub actions: Vec<Vec<ChampSelectAction>>,
    pub my_team: Vec<PlayerSelection>,
    pub their_team: Vec<PlayerSelection>,
    pub is_custom_game: bool,
    pub is_spectating: bool,
    pub timer: Timer,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Timer {
    pub phase: String,
    pub adjusted_time_left_in_phase: i64,
    pub total_time_in_phase: i64,
    pub is_infinite: bool,
}

impl ChampSelectSession {
    /// All actions in session order.
    pub fn flat_actions(&self) -> impl Iterator<Item = &ChampSelectAction> {
        self.actions.iter().flatten()
    }

    /// Seats on the given side, in array order.
    pub fn team_cells(&self, ally: bool) -> &[PlayerSelection] {
        if ally {
            &self.my_team
        } else {
            &self.their_team
        }
    }
}

/// `GET /lol-champ-select/v1/all-grid-champions`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct GridChampion {
    pub id: i64,
    pub name: String,
    /// Positions the user has marked this champion as favourite for
    /// (e.g. `TOP`, `UTILITY`).
    pub positions_favorited: Vec<String>,
    pub owned: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_session_subset() {
        let json = r#"{
            "gameId": 42,
            "localPlayerCellId": 2,
            "actions": [
                [{ "id": 1, "actorCellId": 0, "championId": 57, "completed": true,
                   "isAllyAction": true, "isInProgress": false, "type": "ban" }],
                [{ "id": 2, "actorCellId": 0, "championId": 0, "completed": false,
                   "isAllyAction": true, "isInProgress": true, "type": "pick" },
                 { "id": 3, "actorCellId": 5, "championId": 0, "completed": false,
                   "isAllyAction": false, "isInProgress": false, "type": "ten_bans_reveal" }]
            ],
            "myTeam": [{ "cellId": 0, "championId": 0, "championPickIntent": 64,
                         "assignedPosition": "jungle", "summonerId": 7, "team": 1 }],
            "theirTeam": [],
            "benchChampions": [],
            "timer": { "phase": "BAN_PICK", "adjustedTimeLeftInPhase": 1000 }
        }"#;
        let session: ChampSelectSession = serde_json::from_str(json).unwrap();

        assert_eq!(session.game_id, 42);
        assert_eq!(session.flat_actions().count(), 3);
        let kinds: Vec<_> = session.flat_actions().map(|a| a.kind).collect();
        assert_eq!(kinds, vec![ActionKind::Ban, ActionKind::Pick, ActionKind::Other]);
        assert_eq!(session.my_team[0].champion_pick_intent, 64);
        assert_eq!(session.my_team[0].assigned_position, "jungle");
        assert_eq!(session.timer.phase, "BAN_PICK");
    }

    #[test]
    fn parses_summoner_with_missing_fields() {
        let summoner: Summoner =
            serde_json::from_str(r#"{ "summonerId": 12, "gameName": "Faker" }"#).unwrap();
        assert_eq!(summoner.summoner_id, 12);
        assert_eq!(summoner.game_name, "Faker");
        assert!(summoner.puuid.is_empty());
    }

    #[test]
    fn parses_grid_champion() {
        let grid: Vec<GridChampion> = serde_json::from_str(
            r#"[{ "id": 57, "name": "Maokai", "positionsFavorited": ["TOP", "UTILITY"] }]"#,
        )
        .unwrap();
        assert_eq!(grid[0].positions_favorited, vec!["TOP", "UTILITY"]);
    }
}
