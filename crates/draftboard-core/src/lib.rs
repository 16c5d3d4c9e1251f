// Library root: draft turn-order coordination and head-to-head scheduling for
// fantasy leagues, backed by a single SQLite store.

pub mod advisor;
pub mod config;
pub mod db;
pub mod draft;
pub mod error;
pub mod league;
pub mod player_pool;
pub mod schedule;

pub use error::{DraftError, ErrorKind};

/// Row identifier of a fantasy league.
pub type LeagueId = i64;
/// Row identifier of a participant seat within a league.
pub type ParticipantId = i64;
/// Row identifier of a player in the shared pool.
pub type PlayerId = i64;
/// Row identifier of a recorded draft pick.
pub type PickId = i64;
/// Row identifier of a scheduled head-to-head match.
pub type MatchId = i64;
