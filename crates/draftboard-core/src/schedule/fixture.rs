// Head-to-head fixtures, saved and unsaved.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::{LeagueId, MatchId, ParticipantId};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchStatus {
    Scheduled,
    InProgress,
    Completed,
}

impl MatchStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            MatchStatus::Scheduled => "scheduled",
            MatchStatus::InProgress => "in_progress",
            MatchStatus::Completed => "completed",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "scheduled" => Some(MatchStatus::Scheduled),
            "in_progress" => Some(MatchStatus::InProgress),
            "completed" => Some(MatchStatus::Completed),
            _ => None,
        }
    }
}

/// A fixture produced by the generator but not yet written.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewMatch {
    pub week_number: u32,
    pub match_number: u32,
    pub home_participant_id: ParticipantId,
    pub away_participant_id: ParticipantId,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
}

/// A stored fixture.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct H2HMatch {
    pub id: MatchId,
    pub league_id: LeagueId,
    pub week_number: u32,
    pub match_number: u32,
    pub home_participant_id: ParticipantId,
    pub away_participant_id: ParticipantId,
    pub home_points: f64,
    pub away_points: f64,
    pub status: MatchStatus,
    pub winner_id: Option<ParticipantId>,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
}

impl H2HMatch {
    /// Whether `participant_id` plays in this fixture.
    pub fn involves(&self, participant_id: ParticipantId) -> bool {
        self.home_participant_id == participant_id || self.away_participant_id == participant_id
    }

    /// The winner implied by the scores: only for completed matches, and
    /// only when the scores differ.
    pub fn resolved_winner(&self) -> Option<ParticipantId> {
        if self.status != MatchStatus::Completed {
            return None;
        }
        if self.home_points > self.away_points {
            Some(self.home_participant_id)
        } else if self.away_points > self.home_points {
            Some(self.away_participant_id)
        } else {
            None
        }
    }
}
