// HTTP client for the League client's local REST API (the "LCU" API).
//
// The client listens on 127.0.0.1 with a self-signed certificate. Its port
// and password are published in a lockfile in the install directory and
// change every time the client restarts, so the lockfile is re-read for each
// request.

use std::path::{Path, PathBuf};
use std::time::Duration;

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use thiserror::Error;
use tracing::debug;

use super::types::{ChampSelectSession, GridChampion, Summoner};

const LOCKFILE_NAMES: [&str; 3] = ["lockfile", "LeagueClientUx.lockfile", "LeagueClient.lockfile"];
const AUTH_USER: &str = "riot";

pub const CURRENT_SUMMONER_PATH: &str = "/lol-summoner/v1/current-summoner";
pub const CHAMP_SELECT_SESSION_PATH: &str = "/lol-champ-select/v1/session";
pub const GRID_CHAMPIONS_PATH: &str = "/lol-champ-select/v1/all-grid-champions";
pub const PICKABLE_CHAMPION_IDS_PATH: &str = "/lol-champ-select/v1/pickable-champion-ids";

#[derive(Debug, Error)]
pub enum LcuError {
    #[error("League client is not running (no lockfile in {dir})")]
    ClientNotRunning { dir: PathBuf },

    #[error("malformed lockfile {path}: {message}")]
    MalformedLockfile { path: PathBuf, message: String },

    #[error("request to {path} failed: {source}")]
    Request {
        path: String,
        source: reqwest::Error,
    },

    #[error("{path} returned HTTP {status}")]
    Status { path: String, status: u16 },

    #[error("failed to build HTTP client: {0}")]
    Build(reqwest::Error),
}

/// The local game-client operations the synchronizer needs.
///
/// `Ok(None)` means the client answered but has nothing to report (e.g. the
/// user is not in champion select); `Err` means the client could not be
/// reached or answered garbage.
#[async_trait]
pub trait LcuApi: Send + Sync {
    async fn current_summoner(&self) -> Result<Option<Summoner>, LcuError>;
    async fn champ_select_session(&self) -> Result<Option<ChampSelectSession>, LcuError>;
    async fn grid_champions(&self) -> Result<Option<Vec<GridChampion>>, LcuError>;
    async fn pickable_champion_ids(&self) -> Result<Option<Vec<i64>>, LcuError>;
}

#[async_trait]
impl<T: LcuApi + ?Sized> LcuApi for std::sync::Arc<T> {
    async fn current_summoner(&self) -> Result<Option<Summoner>, LcuError> {
        (**self).current_summoner().await
    }

    async fn champ_select_session(&self) -> Result<Option<ChampSelectSession>, LcuError> {
        (**self).champ_select_session().await
    }

    async fn grid_champions(&self) -> Result<Option<Vec<GridChampion>>, LcuError> {
        (**self).grid_champions().await
    }

    async fn pickable_champion_ids(&self) -> Result<Option<Vec<i64>>, LcuError> {
        (**self).pickable_champion_ids().await
    }
}

/// Connection details parsed from the client lockfile
/// (`name:pid:port:password:protocol`).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Lockfile {
    pub process: String,
    pub pid: u32,
    pub port: u16,
    pub password: String,
    pub protocol: String,
}

impl Lockfile {
    pub fn parse(content: &str, path: &Path) -> Result<Self, LcuError> {
        let malformed = |message: String| LcuError::MalformedLockfile {
            path: path.to_path_buf(),
            message,
        };

        let parts: Vec<&str> = content.trim().split(':').collect();
        if parts.len() < 5 {
            return Err(malformed(format!(
                "expected 5 ':'-separated fields, found {}",
                parts.len()
            )));
        }
        let pid = parts[1]
            .parse()
            .map_err(|_| malformed(format!("invalid pid '{}'", parts[1])))?;
        let port = parts[2]
            .parse()
            .map_err(|_| malformed(format!("invalid port '{}'", parts[2])))?;

        Ok(Lockfile {
            process: parts[0].to_string(),
            pid,
            port,
            password: parts[3].to_string(),
            protocol: parts[4].to_string(),
        })
    }

    /// Find and parse the lockfile in `install_dir`.
    pub fn read_from(install_dir: &Path) -> Result<Self, LcuError> {
        for name in LOCKFILE_NAMES {
            let path = install_dir.join(name);
            if let Ok(content) = std::fs::read_to_string(&path) {
                return Self::parse(&content, &path);
            }
        }
        Err(LcuError::ClientNotRunning {
            dir: install_dir.to_path_buf(),
        })
    }

    pub fn url(&self, path: &str) -> String {
        format!("{}://127.0.0.1:{}{}", self.protocol, self.port, path)
    }
}

/// [`LcuApi`] over HTTPS.
pub struct LcuClient {
    http: reqwest::Client,
    install_dir: PathBuf,
}

impl LcuClient {
    pub fn new(install_dir: impl Into<PathBuf>, request_timeout: Duration) -> Result<Self, LcuError> {
        let http = reqwest::Client::builder()
            .danger_accept_invalid_certs(true)
            .timeout(request_timeout)
            .build()
            .map_err(LcuError::Build)?;
        Ok(Self {
            http,
            install_dir: install_dir.into(),
        })
    }

    async fn get<T: DeserializeOwned>(&self, path: &str) -> Result<Option<T>, LcuError> {
        let lockfile = Lockfile::read_from(&self.install_dir)?;
        let request_err = |source| LcuError::Request {
            path: path.to_string(),
            source,
        };

        let response = self
            .http
            .get(lockfile.url(path))
            .basic_auth(AUTH_USER, Some(&lockfile.password))
            .header("Accept", "application/json")
            .send()
            .await
            .map_err(request_err)?;

        let status = response.status();
        if status == reqwest::StatusCode::NOT_FOUND {
            debug!("{path} -> 404");
            return Ok(None);
        }
        if !status.is_success() {
            return Err(LcuError::Status {
                path: path.to_string(),
                status: status.as_u16(),
            });
        }

        let body = response.json::<Option<T>>().await.map_err(request_err)?;
        Ok(body)
    }
}

#[async_trait]
impl LcuApi for LcuClient {
    async fn current_summoner(&self) -> Result<Option<Summoner>, LcuError> {
        self.get(CURRENT_SUMMONER_PATH).await
    }

    async fn champ_select_session(&self) -> Result<Option<ChampSelectSession>, LcuError> {
        self.get(CHAMP_SELECT_SESSION_PATH).await
    }

    async fn grid_champions(&self) -> Result<Option<Vec<GridChampion>>, LcuError> {
        self.get(GRID_CHAMPIONS_PATH).await
    }

    async fn pickable_champion_ids(&self) -> Result<Option<Vec<i64>>, LcuError> {
        self.get(PICKABLE_CHAMPION_IDS_PATH).await
    }
}
