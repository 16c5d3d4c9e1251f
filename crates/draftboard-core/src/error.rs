// Typed failures returned by the draft coordinator and schedule generator.

use thiserror::Error;

use crate::league::{DraftStatus, LeagueStatus, ParticipantStatus};
use crate::{LeagueId, ParticipantId, PlayerId};

/// Broad class of a [`DraftError`], used by callers to decide how to react.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Operation invoked out of order; re-check state.
    State,
    /// Lost a race or acted on a stale view; refetch and retry if still valid.
    Contention,
    /// Structural problem with the league or request; not retryable as-is.
    Precondition,
    /// The backing store failed.
    Storage,
}

#[derive(Debug, Error)]
pub enum DraftError {
    // --- state ---
    #[error("league {league_id} draft cannot be started: draft is {status}")]
    InvalidState {
        league_id: LeagueId,
        status: DraftStatus,
    },

    #[error("league {league_id} draft is not active (draft is {status})")]
    DraftNotActive {
        league_id: LeagueId,
        status: DraftStatus,
    },

    #[error("league {league_id} draft has not finished (draft is {status})")]
    DraftNotFinished {
        league_id: LeagueId,
        status: DraftStatus,
    },

    #[error("league {league_id} roster is locked (draft is {status})")]
    RosterLocked {
        league_id: LeagueId,
        status: DraftStatus,
    },

    // --- contention ---
    #[error("pick {pick_number} belongs to participant {expected}, not {actual}")]
    NotYourTurn {
        pick_number: u32,
        expected: ParticipantId,
        actual: ParticipantId,
    },

    #[error("player {player_id} was already drafted at pick {pick_number}")]
    PlayerAlreadyDrafted { player_id: PlayerId, pick_number: u32 },

    #[error("league {league_id} already has {existing} scheduled matches")]
    ScheduleAlreadyExists { league_id: LeagueId, existing: u32 },

    // --- precondition ---
    #[error("at least {required} active participants required, found {actual}")]
    InsufficientParticipants { required: u32, actual: u32 },

    #[error("league {0} not found")]
    LeagueNotFound(LeagueId),

    #[error("league {league_id} is {status}")]
    LeagueClosed {
        league_id: LeagueId,
        status: LeagueStatus,
    },

    #[error("participant {participant_id} not found in league {league_id}")]
    ParticipantNotFound {
        league_id: LeagueId,
        participant_id: ParticipantId,
    },

    #[error("participant {participant_id} is {status}, not active")]
    ParticipantInactive {
        participant_id: ParticipantId,
        status: ParticipantStatus,
    },

    #[error("player {0} is not in the player pool")]
    PlayerNotFound(PlayerId),

    #[error("participant {participant_id} holds {picks} of {required} required picks")]
    RosterIncomplete {
        participant_id: ParticipantId,
        picks: u32,
        required: u32,
    },

    // --- storage ---
    #[error("storage error: {0:#}")]
    Storage(#[from] anyhow::Error),
}

impl DraftError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            DraftError::InvalidState { .. }
            | DraftError::DraftNotActive { .. }
            | DraftError::DraftNotFinished { .. }
            | DraftError::RosterLocked { .. } => ErrorKind::State,
            DraftError::NotYourTurn { .. }
            | DraftError::PlayerAlreadyDrafted { .. }
            | DraftError::ScheduleAlreadyExists { .. } => ErrorKind::Contention,
            DraftError::InsufficientParticipants { .. }
            | DraftError::LeagueNotFound(_)
            | DraftError::LeagueClosed { .. }
            | DraftError::ParticipantNotFound { .. }
            | DraftError::ParticipantInactive { .. }
            | DraftError::PlayerNotFound(_)
            | DraftError::RosterIncomplete { .. } => ErrorKind::Precondition,
            DraftError::Storage(_) => ErrorKind::Storage,
        }
    }

    /// Contention errors are expected outcomes of concurrent play: the caller
    /// should refresh its view and may try again.
    pub fn is_retryable(&self) -> bool {
        self.kind() == ErrorKind::Contention
    }
}

impl From<rusqlite::Error> for DraftError {
    fn from(err: rusqlite::Error) -> Self {
        DraftError::Storage(err.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn taxonomy_matches_recovery_strategy() {
        let stale = DraftError::NotYourTurn {
            pick_number: 3,
            expected: 7,
            actual: 4,
        };
        assert_eq!(stale.kind(), ErrorKind::Contention);
        assert!(stale.is_retryable());

        let early = DraftError::DraftNotFinished {
            league_id: 1,
            status: DraftStatus::InProgress,
        };
        assert_eq!(early.kind(), ErrorKind::State);
        assert!(!early.is_retryable());

        let small = DraftError::InsufficientParticipants {
            required: 2,
            actual: 1,
        };
        assert_eq!(small.kind(), ErrorKind::Precondition);
    }

    #[test]
    fn storage_errors_keep_context_chain() {
        let err: DraftError = anyhow::anyhow!("disk I/O error")
            .context("failed to record draft pick")
            .into();
        assert_eq!(err.kind(), ErrorKind::Storage);
        let msg = err.to_string();
        assert!(msg.contains("failed to record draft pick"), "{msg}");
        assert!(msg.contains("disk I/O error"), "{msg}");
    }

    #[test]
    fn messages_name_the_conflict() {
        let err = DraftError::PlayerAlreadyDrafted {
            player_id: 42,
            pick_number: 9,
        };
        assert_eq!(err.to_string(), "player 42 was already drafted at pick 9");
    }
}
