// Importing favourite picks from the game client, at most once a week.

use std::collections::HashSet;

use chrono::{DateTime, Duration, Utc};
use tracing::{info, warn};

use super::client::LcuApi;
use crate::db::Database;
use crate::draft::pick::Role;

/// Key under which the last time the user was asked is stored.
pub const LAST_ASKED_KEY: &str = "draftgap-import-favourites-last-asked";

/// Days to wait before offering the import again.
pub const ASK_INTERVAL_DAYS: i64 = 7;

/// A champion the user marked as favourite for a role.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct FavouritePick {
    pub champion_key: String,
    pub role: Role,
}

/// The user's favourite-picks list, owned by another part of the
/// application.
pub trait Favourites: Send + Sync {
    fn is_favourite(&self, champion_key: &str, role: Role) -> bool;

    /// Offer `picks` for import. Implementations decide whether to ask the
    /// user or import straight away.
    fn offer_import(&mut self, picks: Vec<FavouritePick>);
}

/// In-memory favourites that accept every offered import.
#[derive(Debug, Default)]
pub struct FavouriteSet {
    picks: HashSet<FavouritePick>,
}

impl FavouriteSet {
    pub fn len(&self) -> usize {
        self.picks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.picks.is_empty()
    }

    pub fn set_favourite(&mut self, champion_key: &str, role: Role, favourite: bool) {
        let pick = FavouritePick {
            champion_key: champion_key.to_string(),
            role,
        };
        if favourite {
            self.picks.insert(pick);
        } else {
            self.picks.remove(&pick);
        }
    }
}

impl Favourites for FavouriteSet {
    fn is_favourite(&self, champion_key: &str, role: Role) -> bool {
        self.picks.contains(&FavouritePick {
            champion_key: champion_key.to_string(),
            role,
        })
    }

    fn offer_import(&mut self, picks: Vec<FavouritePick>) {
        let count = picks.len();
        for pick in picks {
            self.set_favourite(&pick.champion_key, pick.role, true);
        }
        info!("Imported {count} favourite picks from the League client");
    }
}

/// Whether the import was asked about recently enough to skip it.
fn asked_recently(db: &Database, now: DateTime<Utc>) -> anyhow::Result<bool> {
    let Some(raw) = db.load_string(LAST_ASKED_KEY)? else {
        return Ok(false);
    };
    match DateTime::parse_from_rfc3339(&raw) {
        Ok(last) => {
            let elapsed = now.signed_duration_since(last.with_timezone(&Utc));
            Ok(elapsed < Duration::days(ASK_INTERVAL_DAYS))
        }
        Err(e) => {
            warn!("Ignoring unparseable {LAST_ASKED_KEY} value '{raw}': {e}");
            Ok(false)
        }
    }
}

/// Offer the client's favourite picks that the user does not have yet.
///
/// Does nothing if the user was asked less than [`ASK_INTERVAL_DAYS`] ago. The
/// timestamp is only written when something was actually offered. Returns
/// the number of picks offered.
pub async fn check_import_favourites<A: LcuApi + ?Sized>(
    api: &A,
    db: &Database,
    favourites: &mut dyn Favourites,
    now: DateTime<Utc>,
) -> anyhow::Result<usize> {
    if asked_recently(db, now)? {
        return Ok(0);
    }

    let Some(grid) = api.grid_champions().await? else {
        warn!("Failed to get grid champions");
        return Ok(0);
    };

    let mut seen = HashSet::new();
    let missing: Vec<FavouritePick> = grid
        .iter()
        .flat_map(|c| {
            c.positions_favorited
                .iter()
                .filter_map(|p| Role::from_client_str(p))
                .map(move |role| FavouritePick {
                    champion_key: c.id.to_string(),
                    role,
                })
        })
        .filter(|f| !favourites.is_favourite(&f.champion_key, f.role))
        .filter(|f| seen.insert(f.clone()))
        .collect();

    if missing.is_empty() {
        return Ok(0);
    }

    let count = missing.len();
    favourites.offer_import(missing);
    db.save_string(LAST_ASKED_KEY, &now.to_rfc3339())?;
    Ok(count)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lcu::client::LcuError;
    use crate::lcu::types::{ChampSelectSession, GridChampion, Summoner};
    use async_trait::async_trait;

    struct GridOnly(Option<Vec<GridChampion>>);

    #[async_trait]
    impl LcuApi for GridOnly {
        async fn current_summoner(&self) -> Result<Option<Summoner>, LcuError> {
            Ok(None)
        }
        async fn champ_select_session(&self) -> Result<Option<ChampSelectSession>, LcuError> {
            Ok(None)
        }
        async fn grid_champions(&self) -> Result<Option<Vec<GridChampion>>, LcuError> {
            Ok(self.0.clone())
        }
        async fn pickable_champion_ids(&self) -> Result<Option<Vec<i64>>, LcuError> {
            Ok(None)
        }
    }

    fn grid() -> GridOnly {
        GridOnly(Some(vec![
            GridChampion {
                id: 57,
                name: "Maokai".into(),
                positions_favorited: vec!["TOP".into(), "UTILITY".into()],
                owned: true,
            },
            GridChampion {
                id: 64,
                name: "Lee Sin".into(),
                positions_favorited: vec!["JUNGLE".into(), "NONE".into()],
                owned: true,
            },
            GridChampion {
                id: 16,
                name: "Soraka".into(),
                positions_favorited: vec![],
                owned: false,
            },
        ]))
    }

    fn now() -> DateTime<Utc> {
        DateTime::parse_from_rfc3339("2024-03-10T12:00:00Z")
            .unwrap()
            .with_timezone(&Utc)
    }

    #[tokio::test]
    async fn imports_missing_favourites_and_records_timestamp() {
        let db = Database::open(":memory:").unwrap();
        let mut favourites = FavouriteSet::default();
        favourites.set_favourite("64", Role::Jungle, true);

        let offered = check_import_favourites(&grid(), &db, &mut favourites, now())
            .await
            .unwrap();

        assert_eq!(offered, 2);
        assert!(favourites.is_favourite("57", Role::Top));
        assert!(favourites.is_favourite("57", Role::Support));
        assert_eq!(favourites.len(), 3);
        assert_eq!(
            db.load_string(LAST_ASKED_KEY).unwrap(),
            Some(now().to_rfc3339())
        );
    }

    #[tokio::test]
    async fn skips_when_asked_within_a_week() {
        let db = Database::open(":memory:").unwrap();
        let six_days_ago = now() - Duration::days(6);
        db.save_string(LAST_ASKED_KEY, &six_days_ago.to_rfc3339()).unwrap();
        let mut favourites = FavouriteSet::default();

        let offered = check_import_favourites(&grid(), &db, &mut favourites, now())
            .await
            .unwrap();

        assert_eq!(offered, 0);
        assert!(favourites.is_empty());
    }

    #[tokio::test]
    async fn asks_again_after_a_week() {
        let db = Database::open(":memory:").unwrap();
        let eight_days_ago = now() - Duration::days(8);
        db.save_string(LAST_ASKED_KEY, &eight_days_ago.to_rfc3339()).unwrap();
        let mut favourites = FavouriteSet::default();

        let offered = check_import_favourites(&grid(), &db, &mut favourites, now())
            .await
            .unwrap();
        assert_eq!(offered, 3);
    }

    #[tokio::test]
    async fn nothing_new_leaves_timestamp_unset() {
        let db = Database::open(":memory:").unwrap();
        let mut favourites = FavouriteSet::default();
        favourites.set_favourite("57", Role::Top, true);
        favourites.set_favourite("57", Role::Support, true);
        favourites.set_favourite("64", Role::Jungle, true);

        let offered = check_import_favourites(&grid(), &db, &mut favourites, now())
            .await
            .unwrap();

        assert_eq!(offered, 0);
        assert_eq!(db.load_string(LAST_ASKED_KEY).unwrap(), None);
    }

    #[tokio::test]
    async fn missing_grid_is_not_an_error() {
        let db = Database::open(":memory:").unwrap();
        let mut favourites = FavouriteSet::default();
        let offered = check_import_favourites(&GridOnly(None), &db, &mut favourites, now())
            .await
            .unwrap();
        assert_eq!(offered, 0);
    }

    #[tokio::test]
    async fn garbage_timestamp_is_ignored() {
        let db = Database::open(":memory:").unwrap();
        db.save_string(LAST_ASKED_KEY, "yesterday-ish").unwrap();
        let mut favourites = FavouriteSet::default();
        let offered = check_import_favourites(&grid(), &db, &mut favourites, now())
            .await
            .unwrap();
        assert_eq!(offered, 3);
    }
}
