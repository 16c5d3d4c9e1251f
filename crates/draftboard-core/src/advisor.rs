// Advisory pick suggestions.
//
// Suggestions come from an optional ranking service and are never
// authoritative: the coordinator treats every failure as "no suggestion".

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::{LeagueId, ParticipantId, PlayerId};

/// A player recommended by the ranking service.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RankedPlayer {
    pub player_id: PlayerId,
    #[serde(default)]
    pub score: Option<f64>,
    #[serde(default)]
    pub reason: Option<String>,
}

/// What the caller gets back from a suggestion request.
#[derive(Debug, Clone, PartialEq)]
pub enum Suggestion {
    Available(RankedPlayer),
    Unavailable,
}

impl Suggestion {
    pub fn player_id(&self) -> Option<PlayerId> {
        match self {
            Suggestion::Available(ranked) => Some(ranked.player_id),
            Suggestion::Unavailable => None,
        }
    }
}

/// Context handed to an advisor.
#[derive(Debug, Clone)]
pub struct SuggestionRequest {
    pub league_id: LeagueId,
    pub participant_id: ParticipantId,
    /// Players already taken, in pick order.
    pub drafted: Vec<PlayerId>,
}

/// Source of best-effort pick suggestions.
///
/// `Ok(None)` means the service had nothing to offer. Errors are logged and
/// discarded by the caller.
#[async_trait]
pub trait PickAdvisor: Send + Sync {
    async fn suggest(&self, request: &SuggestionRequest) -> anyhow::Result<Option<RankedPlayer>>;
}

/// Advisor that never suggests anything.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoAdvisor;

#[async_trait]
impl PickAdvisor for NoAdvisor {
    async fn suggest(&self, _request: &SuggestionRequest) -> anyhow::Result<Option<RankedPlayer>> {
        Ok(None)
    }
}
