// Champion dataset: the set of champions the draft accepts picks for.

use std::collections::HashMap;
use std::path::Path;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

/// Static data about a single champion, keyed by its numeric key string
/// (e.g. "57" for Maokai).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChampionData {
    pub key: String,
    /// Riot's string id (e.g. "MonkeyKing"); not always equal to the name.
    #[serde(default)]
    pub id: String,
    pub name: String,
}

/// The champion dataset a draft is validated against.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Dataset {
    #[serde(default)]
    pub version: String,
    pub champion_data: HashMap<String, ChampionData>,
}

impl Dataset {
    /// Load a dataset from a JSON file.
    pub fn load(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read dataset {}", path.display()))?;
        Self::from_json(&text)
            .with_context(|| format!("failed to parse dataset {}", path.display()))
    }

    pub fn from_json(text: &str) -> Result<Self> {
        let dataset: Dataset = serde_json::from_str(text)?;
        Ok(dataset)
    }

    /// Build a dataset from `(key, name)` pairs.
    pub fn from_champions<I, K, N>(champions: I) -> Self
    where
        I: IntoIterator<Item = (K, N)>,
        K: Into<String>,
        N: Into<String>,
    {
        let champion_data = champions
            .into_iter()
            .map(|(key, name)| {
                let key = key.into();
                let name = name.into();
                (
                    key.clone(),
                    ChampionData {
                        key,
                        id: name.replace(' ', ""),
                        name,
                    },
                )
            })
            .collect();
        Dataset {
            version: String::new(),
            champion_data,
        }
    }

    pub fn champion(&self, key: &str) -> Option<&ChampionData> {
        self.champion_data.get(key)
    }

    pub fn contains(&self, key: &str) -> bool {
        self.champion_data.contains_key(key)
    }

    /// Resolve a key or a (case-insensitive) champion name to a key.
    pub fn resolve_key(&self, key_or_name: &str) -> Option<&str> {
        if let Some(data) = self.champion_data.get(key_or_name) {
            return Some(&data.key);
        }
        self.champion_data
            .values()
            .find(|c| {
                c.name.eq_ignore_ascii_case(key_or_name) || c.id.eq_ignore_ascii_case(key_or_name)
            })
            .map(|c| c.key.as_str())
    }

    pub fn len(&self) -> usize {
        self.champion_data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.champion_data.is_empty()
    }
}
