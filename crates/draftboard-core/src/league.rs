// League and participant records plus their lifecycle enums.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::{LeagueId, ParticipantId};

// ---------------------------------------------------------------------------
// Status enums
// ---------------------------------------------------------------------------

/// Progress of a league's draft. Only ever moves forward:
/// `Pending -> InProgress -> Finished`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DraftStatus {
    Pending,
    InProgress,
    Finished,
}

impl DraftStatus {
    /// Stable storage spelling.
    pub fn as_str(&self) -> &'static str {
        match self {
            DraftStatus::Pending => "pending",
            DraftStatus::InProgress => "in_progress",
            DraftStatus::Finished => "finished",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "pending" => Some(DraftStatus::Pending),
            "in_progress" => Some(DraftStatus::InProgress),
            "finished" => Some(DraftStatus::Finished),
            _ => None,
        }
    }
}

impl fmt::Display for DraftStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Overall lifecycle of a league, owned by the league-management flow.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LeagueStatus {
    Pending,
    Active,
    Ended,
    Cancelled,
}

impl LeagueStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            LeagueStatus::Pending => "pending",
            LeagueStatus::Active => "active",
            LeagueStatus::Ended => "ended",
            LeagueStatus::Cancelled => "cancelled",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "pending" => Some(LeagueStatus::Pending),
            "active" => Some(LeagueStatus::Active),
            "ended" => Some(LeagueStatus::Ended),
            "cancelled" => Some(LeagueStatus::Cancelled),
            _ => None,
        }
    }

    /// Whether the league can no longer host a draft.
    pub fn is_closed(&self) -> bool {
        matches!(self, LeagueStatus::Ended | LeagueStatus::Cancelled)
    }
}

impl fmt::Display for LeagueStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ParticipantRole {
    Owner,
    Admin,
    Player,
}

impl ParticipantRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            ParticipantRole::Owner => "owner",
            ParticipantRole::Admin => "admin",
            ParticipantRole::Player => "player",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "owner" => Some(ParticipantRole::Owner),
            "admin" => Some(ParticipantRole::Admin),
            "player" => Some(ParticipantRole::Player),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ParticipantStatus {
    Pending,
    Active,
    Banned,
}

impl ParticipantStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ParticipantStatus::Pending => "pending",
            ParticipantStatus::Active => "active",
            ParticipantStatus::Banned => "banned",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "pending" => Some(ParticipantStatus::Pending),
            "active" => Some(ParticipantStatus::Active),
            "banned" => Some(ParticipantStatus::Banned),
            _ => None,
        }
    }
}

impl fmt::Display for ParticipantStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// Records
// ---------------------------------------------------------------------------

/// One competitive instance: the draft counter and the schedule anchor.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FantasyLeague {
    pub id: LeagueId,
    pub name: String,
    pub draft_status: DraftStatus,
    pub status: LeagueStatus,
    pub min_participants: u32,
    pub max_participants: u32,
    /// Next pick to be made. Starts at 1; only advances while drafting.
    pub current_pick_number: u32,
    /// Active participant count frozen when the draft started (0 before).
    pub draft_participant_count: u32,
    /// Picks per participant, frozen when the draft started (0 before).
    pub draft_rounds: u32,
    /// First day of week 1 of the head-to-head calendar.
    pub start_date: NaiveDate,
}

impl FantasyLeague {
    /// Total number of picks in this league's draft, once started.
    pub fn total_picks(&self) -> u32 {
        self.draft_participant_count * self.draft_rounds
    }
}

/// Fields the league-creation flow supplies for a new league.
#[derive(Debug, Clone)]
pub struct NewLeague {
    pub name: String,
    pub min_participants: u32,
    pub max_participants: u32,
    pub start_date: NaiveDate,
}

/// One user's seat in a league.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Participant {
    pub id: ParticipantId,
    pub league_id: LeagueId,
    pub user_id: i64,
    pub role: ParticipantRole,
    pub status: ParticipantStatus,
    /// 1-based seat order, assigned once when the draft starts.
    pub draft_position: Option<u32>,
    pub team_name: String,
    /// Cumulative score. Owned by scoring; only read here.
    pub points: f64,
    /// Derived standing. Owned by scoring; only read here.
    pub rank: Option<u32>,
}

impl Participant {
    pub fn is_active(&self) -> bool {
        self.status == ParticipantStatus::Active
    }
}

/// Fields the membership flow supplies when a user joins a league.
#[derive(Debug, Clone)]
pub struct NewParticipant {
    pub user_id: i64,
    pub role: ParticipantRole,
    pub status: ParticipantStatus,
    pub team_name: String,
}

// ---------------------------------------------------------------------------
// Unit tests
// ---------------------------------------------------------------------------
