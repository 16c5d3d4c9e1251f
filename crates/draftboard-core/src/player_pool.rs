// Shared player pool: reference data the draft picks from.
//
// The pool is read-only to the draft. Rows come from a CSV export
// (`name,position,team`) and are upserted into the store.

use std::io::Read;
use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::PlayerId;

/// A draftable player.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Player {
    pub id: PlayerId,
    pub name: String,
    pub position: String,
    pub team: String,
}

/// A player row before it has been assigned an id.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewPlayer {
    pub name: String,
    pub position: String,
    pub team: String,
}

/// Existence lookup against the player pool.
pub trait PlayerPool: Send + Sync {
    fn player_exists(&self, player_id: PlayerId) -> anyhow::Result<bool>;
}

// ---------------------------------------------------------------------------
// Error type
// ---------------------------------------------------------------------------

#[derive(Debug, thiserror::Error)]
pub enum PoolImportError {
    #[error("failed to read file {path}: {source}")]
    Io {
        path: String,
        source: std::io::Error,
    },

    #[error("CSV error in {path}: {source}")]
    Csv { path: String, source: csv::Error },
}

// ---------------------------------------------------------------------------
// CSV loading
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
struct RawPlayerRow {
    name: String,
    position: String,
    #[serde(default)]
    team: String,
}

/// Load pool rows from a CSV file on disk.
pub fn load_players_csv(path: &Path) -> Result<Vec<NewPlayer>, PoolImportError> {
    let file = std::fs::File::open(path).map_err(|e| PoolImportError::Io {
        path: path.display().to_string(),
        source: e,
    })?;
    load_players_from_reader(file).map_err(|e| PoolImportError::Csv {
        path: path.display().to_string(),
        source: e,
    })
}

/// Parse pool rows. Malformed or nameless rows are skipped with a warning;
/// only a broken header fails the whole load.
pub fn load_players_from_reader<R: Read>(rdr: R) -> Result<Vec<NewPlayer>, csv::Error> {
    let mut reader = csv::ReaderBuilder::new().trim(csv::Trim::All).from_reader(rdr);
    reader.headers()?;

    let mut players = Vec::new();
    for result in reader.deserialize::<RawPlayerRow>() {
        match result {
            Ok(raw) => {
                if raw.name.is_empty() || raw.position.is_empty() {
                    warn!("skipping player row with empty name or position");
                    continue;
                }
                players.push(NewPlayer {
                    name: raw.name,
                    position: raw.position.to_uppercase(),
                    team: raw.team,
                });
            }
            Err(e) => {
                warn!("skipping malformed player row: {}", e);
            }
        }
    }
    Ok(players)
}
