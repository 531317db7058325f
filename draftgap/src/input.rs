// Text command parsing for the terminal front-end.
//
// Slots are 1-based on the command line and 0-based everywhere else.
//
//   pick <team> <slot> <champion|-> [role]
//   hover <team> <slot> <champion|-> [role]
//   reset [all | <team> [slot]]
//   select <team> [slot] | select none
//   start | stop | quit

use thiserror::Error;

use crate::dataset::Dataset;
use crate::draft::pick::{Role, Team, TEAM_SIZE};
use crate::draft::state::PickOptions;
use crate::protocol::UserCommand;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum InputError {
    #[error("empty command")]
    Empty,

    #[error("unknown command '{0}'")]
    UnknownCommand(String),

    #[error("usage: {0}")]
    Usage(&'static str),

    #[error("unknown team '{0}' (expected ally or opponent)")]
    UnknownTeam(String),

    #[error("slot must be 1-5, got '{0}'")]
    BadSlot(String),

    #[error("unknown champion '{0}'")]
    UnknownChampion(String),
}

const PICK_USAGE: &str = "pick <ally|opponent> <1-5> <champion|-> [role]";
const HOVER_USAGE: &str = "hover <ally|opponent> <1-5> <champion|-> [role]";
const RESET_USAGE: &str = "reset [all | <ally|opponent> [1-5]]";
const SELECT_USAGE: &str = "select <ally|opponent> [1-5] | select none";

/// Parse one line of user input. Champion names are resolved against
/// `dataset` when one is loaded.
pub fn parse_command(line: &str, dataset: Option<&Dataset>) -> Result<UserCommand, InputError> {
    let words: Vec<&str> = line.split_whitespace().collect();
    let Some((verb, args)) = words.split_first() else {
        return Err(InputError::Empty);
    };

    match verb.to_ascii_lowercase().as_str() {
        "pick" | "p" => {
            let (team, index, champion_key, role) = slot_champion_role(args, dataset, PICK_USAGE)?;
            Ok(UserCommand::Pick {
                team,
                index,
                champion_key,
                role,
                options: PickOptions::default(),
            })
        }
        "hover" | "h" => {
            let (team, index, champion_key, role) = slot_champion_role(args, dataset, HOVER_USAGE)?;
            Ok(UserCommand::Hover {
                team,
                index,
                champion_key,
                role,
            })
        }
        "reset" | "r" => match args {
            [] => Ok(UserCommand::ResetAll),
            [all] if all.eq_ignore_ascii_case("all") => Ok(UserCommand::ResetAll),
            [team] => Ok(UserCommand::ResetTeam(parse_team(team)?)),
            [team, slot] => Ok(UserCommand::ResetSlot {
                team: parse_team(team)?,
                index: parse_slot(slot)?,
            }),
            _ => Err(InputError::Usage(RESET_USAGE)),
        },
        "select" | "s" => match args {
            [none] if none.eq_ignore_ascii_case("none") => Ok(UserCommand::Select {
                team: None,
                index: None,
            }),
            [team] => Ok(UserCommand::Select {
                team: Some(parse_team(team)?),
                index: None,
            }),
            [team, slot] => Ok(UserCommand::Select {
                team: Some(parse_team(team)?),
                index: Some(parse_slot(slot)?),
            }),
            _ => Err(InputError::Usage(SELECT_USAGE)),
        },
        "start" => Ok(UserCommand::StartIntegration),
        "stop" => Ok(UserCommand::StopIntegration),
        "quit" | "exit" | "q" => Ok(UserCommand::Quit),
        other => Err(InputError::UnknownCommand(other.to_string())),
    }
}

/// `<team> <slot> <champion words...> [role]`. A trailing word that names
/// a role is taken as the role, everything between slot and role is the
/// champion (names may contain spaces).
fn slot_champion_role(
    args: &[&str],
    dataset: Option<&Dataset>,
    usage: &'static str,
) -> Result<(Team, usize, Option<String>, Option<Role>), InputError> {
    let [team, slot, rest @ ..] = args else {
        return Err(InputError::Usage(usage));
    };
    if rest.is_empty() {
        return Err(InputError::Usage(usage));
    }
    let team = parse_team(team)?;
    let index = parse_slot(slot)?;

    let (champion_words, role) = match rest.split_last() {
        Some((last, init)) if !init.is_empty() => match parse_role(last) {
            Some(role) => (init, Some(role)),
            None => (rest, None),
        },
        _ => (rest, None),
    };
    let champion = champion_words.join(" ");
    let champion_key = if champion == "-" || champion.eq_ignore_ascii_case("none") {
        None
    } else {
        Some(resolve_champion(&champion, dataset)?)
    };

    Ok((team, index, champion_key, role))
}

fn resolve_champion(champion: &str, dataset: Option<&Dataset>) -> Result<String, InputError> {
    match dataset {
        Some(dataset) => dataset
            .resolve_key(champion)
            .map(str::to_string)
            .ok_or_else(|| InputError::UnknownChampion(champion.to_string())),
        // Nothing to resolve names against; the store rejects the key later.
        None => Ok(champion.to_string()),
    }
}

fn parse_team(s: &str) -> Result<Team, InputError> {
    Team::from_str_team(s).ok_or_else(|| InputError::UnknownTeam(s.to_string()))
}

/// Role words accepted at the prompt: the client's own names plus the
/// usual short forms.
fn parse_role(s: &str) -> Option<Role> {
    match s.to_ascii_lowercase().as_str() {
        "jg" | "jng" => Some(Role::Jungle),
        "mid" => Some(Role::Middle),
        "bot" | "adc" => Some(Role::Bottom),
        "support" | "sup" => Some(Role::Support),
        other => Role::from_client_str(other),
    }
}

fn parse_slot(s: &str) -> Result<usize, InputError> {
    match s.parse::<usize>() {
        Ok(n) if (1..=TEAM_SIZE).contains(&n) => Ok(n - 1),
        _ => Err(InputError::BadSlot(s.to_string())),
    }
}
