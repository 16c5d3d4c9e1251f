// A resolved draft turn.

use serde::{Deserialize, Serialize};

use crate::{LeagueId, ParticipantId, PickId, PlayerId};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PickStatus {
    Pending,
    Completed,
}

impl PickStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            PickStatus::Pending => "pending",
            PickStatus::Completed => "completed",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "pending" => Some(PickStatus::Pending),
            "completed" => Some(PickStatus::Completed),
            _ => None,
        }
    }
}

/// One accepted pick. Immutable once written.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DraftPick {
    pub id: PickId,
    pub league_id: LeagueId,
    pub participant_id: ParticipantId,
    pub player_id: PlayerId,
    /// Global sequence number across the whole draft, starting at 1.
    pub pick_number: u32,
    /// `ceil(pick_number / participants)`.
    pub round_number: u32,
    pub status: PickStatus,
    /// UTC timestamp assigned by the store.
    pub picked_at: String,
}
