// Pick slot representation and the fixed draft vocabulary (roles, teams).

use serde::{Deserialize, Serialize};
use std::fmt;

/// Number of pick slots per team.
pub const TEAM_SIZE: usize = 5;

/// The five lane roles a pick can be assigned to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Role {
    Top,
    Jungle,
    Middle,
    Bottom,
    Support,
}

impl Role {
    pub const ALL: [Role; 5] = [
        Role::Top,
        Role::Jungle,
        Role::Middle,
        Role::Bottom,
        Role::Support,
    ];

    /// Parse a role string as reported by the game client.
    ///
    /// Champion-select sessions use `top`, `jungle`, `middle`, `bottom` and
    /// `utility`; favourite positions are the same words uppercased.
    /// Anything else (empty, `NONE`, `FILL`) is an unset role.
    pub fn from_client_str(s: &str) -> Option<Self> {
        match s.to_ascii_lowercase().as_str() {
            "top" => Some(Role::Top),
            "jungle" => Some(Role::Jungle),
            "middle" => Some(Role::Middle),
            "bottom" => Some(Role::Bottom),
            "utility" => Some(Role::Support),
            _ => None,
        }
    }

    /// Human readable role name, used in analytics events.
    pub fn display_name(&self) -> &'static str {
        match self {
            Role::Top => "Top",
            Role::Jungle => "Jungle",
            Role::Middle => "Middle",
            Role::Bottom => "Bottom",
            Role::Support => "Support",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.display_name())
    }
}

/// One of the two sides of a draft, relative to the user.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Team {
    Ally,
    Opponent,
}

impl Team {
    pub const BOTH: [Team; 2] = [Team::Ally, Team::Opponent];

    pub fn other(self) -> Team {
        match self {
            Team::Ally => Team::Opponent,
            Team::Opponent => Team::Ally,
        }
    }

    pub fn from_str_team(s: &str) -> Option<Self> {
        match s.to_ascii_lowercase().as_str() {
            "ally" | "a" => Some(Team::Ally),
            "opponent" | "enemy" | "o" => Some(Team::Opponent),
            _ => None,
        }
    }
}

impl fmt::Display for Team {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Team::Ally => write!(f, "ally"),
            Team::Opponent => write!(f, "opponent"),
        }
    }
}

/// A single pick slot.
///
/// `champion_key` is the committed (locked) champion, `hover_key` a
/// provisional one shown while a player is still choosing. Both may be unset.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Pick {
    pub champion_key: Option<String>,
    pub role: Option<Role>,
    pub hover_key: Option<String>,
}

impl Pick {
    pub fn is_empty(&self) -> bool {
        self.champion_key.is_none() && self.role.is_none() && self.hover_key.is_none()
    }
}

/// The five slots of one team, indexed by slot position (not by role).
pub type TeamPicks = [Pick; TEAM_SIZE];
