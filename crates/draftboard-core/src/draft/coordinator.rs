// Draft coordinator: the turn-order state machine for one league's draft.
//
// `current_pick_number` on the league row is the only source of truth for
// whose turn it is. Every mutation runs inside one immediate transaction that
// re-reads the counter, validates against it and writes the pick plus the
// advanced counter together.

use std::sync::Arc;
use std::time::Duration;

use anyhow::anyhow;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use serde::Serialize;
use tracing::{debug, info, warn};

use crate::advisor::{NoAdvisor, PickAdvisor, Suggestion, SuggestionRequest};
use crate::config::{Config, DraftConfig, SeatingPolicy};
use crate::db::{queries, Database};
use crate::draft::order;
use crate::draft::pick::DraftPick;
use crate::error::DraftError;
use crate::league::{DraftStatus, FantasyLeague, Participant};
use crate::player_pool::PlayerPool;
use crate::{LeagueId, ParticipantId, PlayerId};

// ---------------------------------------------------------------------------
// Views returned to callers
// ---------------------------------------------------------------------------

/// One seat assigned when the draft starts.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Seat {
    pub participant_id: ParticipantId,
    pub draft_position: u32,
    pub team_name: String,
}

/// Seating produced by `start_draft`, in draft-position order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DraftOrder {
    pub league_id: LeagueId,
    pub seats: Vec<Seat>,
    pub total_picks: u32,
}

/// The participant on the clock.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TurnInfo {
    pub pick_number: u32,
    pub round_number: u32,
    pub draft_position: u32,
    pub participant_id: ParticipantId,
    pub team_name: String,
    pub total_picks: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum Turn {
    OnClock(TurnInfo),
    Ended,
}

// ---------------------------------------------------------------------------
// Coordinator
// ---------------------------------------------------------------------------

pub struct DraftCoordinator {
    db: Arc<Database>,
    pool: Arc<dyn PlayerPool>,
    advisor: Arc<dyn PickAdvisor>,
    draft: DraftConfig,
    advisor_timeout: Duration,
}

impl DraftCoordinator {
    /// Coordinator using `db` as its player pool and no advisor.
    pub fn new(db: Arc<Database>, config: &Config) -> Self {
        let pool: Arc<dyn PlayerPool> = db.clone();
        Self {
            db,
            pool,
            advisor: Arc::new(NoAdvisor),
            draft: config.draft.clone(),
            advisor_timeout: config.advisor.timeout(),
        }
    }

    pub fn with_player_pool(mut self, pool: Arc<dyn PlayerPool>) -> Self {
        self.pool = pool;
        self
    }

    pub fn with_advisor(mut self, advisor: Arc<dyn PickAdvisor>) -> Self {
        self.advisor = advisor;
        self
    }

    /// Seat every active participant and open the draft.
    ///
    /// Positions `1..=N` are handed out by the configured seating policy and
    /// never change afterwards. The participant count and round count are
    /// frozen on the league row.
    pub fn start_draft(&self, league_id: LeagueId) -> Result<DraftOrder, DraftError> {
        let order = self.db.transaction(|tx| {
            let league = queries::require_league(tx, league_id)?;
            if league.status.is_closed() {
                return Err(DraftError::LeagueClosed {
                    league_id,
                    status: league.status,
                });
            }
            if league.draft_status != DraftStatus::Pending {
                return Err(DraftError::InvalidState {
                    league_id,
                    status: league.draft_status,
                });
            }

            let mut active = queries::load_participants(tx, league_id, true)?;
            let count = active.len() as u32;
            let required = league.min_participants.max(1);
            if count < required {
                return Err(DraftError::InsufficientParticipants {
                    required,
                    actual: count,
                });
            }

            self.seat(&mut active);

            let mut seats = Vec::with_capacity(active.len());
            for (idx, participant) in active.into_iter().enumerate() {
                let draft_position = idx as u32 + 1;
                queries::assign_draft_position(tx, participant.id, draft_position)?;
                seats.push(Seat {
                    participant_id: participant.id,
                    draft_position,
                    team_name: participant.team_name,
                });
            }
            queries::mark_draft_started(tx, league_id, count, self.draft.rounds)?;

            Ok(DraftOrder {
                league_id,
                seats,
                total_picks: order::total_picks(count, self.draft.rounds),
            })
        })?;

        info!(
            "Draft started for league {}: {} participants, {} rounds, {} picks",
            league_id,
            order.seats.len(),
            self.draft.rounds,
            order.total_picks
        );
        Ok(order)
    }

    fn seat(&self, participants: &mut [Participant]) {
        match self.draft.seating {
            SeatingPolicy::JoinOrder => {}
            SeatingPolicy::Shuffle => match self.draft.seed {
                Some(seed) => participants.shuffle(&mut StdRng::seed_from_u64(seed)),
                None => participants.shuffle(&mut rand::rng()),
            },
        }
    }

    /// Apply one pick for the participant on the clock.
    ///
    /// A rejected pick leaves the store untouched. The final pick of the
    /// draft also finishes it.
    pub fn submit_pick(
        &self,
        league_id: LeagueId,
        participant_id: ParticipantId,
        player_id: PlayerId,
    ) -> Result<DraftPick, DraftError> {
        // The pool is reference data and may be backed by this same database,
        // so it is consulted outside the transaction, after the draft state.
        self.db.read(|conn| ensure_drafting(&queries::require_league(conn, league_id)?))?;
        if !self.pool.player_exists(player_id)? {
            return Err(DraftError::PlayerNotFound(player_id));
        }

        let result = self.db.transaction(|tx| {
            let league = queries::require_league(tx, league_id)?;
            ensure_drafting(&league)?;

            let pick_number = league.current_pick_number;
            let on_clock = participant_on_clock(tx, &league)?;

            if on_clock.id != participant_id {
                if queries::load_participant(tx, league_id, participant_id)?.is_none() {
                    return Err(DraftError::ParticipantNotFound {
                        league_id,
                        participant_id,
                    });
                }
                return Err(DraftError::NotYourTurn {
                    pick_number,
                    expected: on_clock.id,
                    actual: participant_id,
                });
            }
            if !on_clock.is_active() {
                return Err(DraftError::ParticipantInactive {
                    participant_id,
                    status: on_clock.status,
                });
            }
            if let Some(existing) = queries::pick_for_player(tx, league_id, player_id)? {
                return Err(DraftError::PlayerAlreadyDrafted {
                    player_id,
                    pick_number: existing.pick_number,
                });
            }

            let round_number = order::round_for_pick(pick_number, league.draft_participant_count);
            let pick_id = queries::insert_pick(
                tx,
                league_id,
                participant_id,
                player_id,
                pick_number,
                round_number,
            )?;

            if !queries::advance_pick_counter(tx, league_id, pick_number)? {
                return Err(DraftError::NotYourTurn {
                    pick_number,
                    expected: on_clock.id,
                    actual: participant_id,
                });
            }

            let finished = pick_number >= league.total_picks();
            if finished {
                queries::mark_draft_finished(tx, league_id)?;
            }

            Ok((queries::load_pick(tx, pick_id)?, finished))
        });

        match result {
            Ok((pick, finished)) => {
                info!(
                    "League {}: pick {} (round {}) participant {} took player {}",
                    league_id, pick.pick_number, pick.round_number, participant_id, player_id
                );
                if finished {
                    info!("League {}: final pick made, draft finished", league_id);
                }
                Ok(pick)
            }
            Err(e) => {
                if e.is_retryable() {
                    warn!("League {}: pick rejected: {}", league_id, e);
                }
                Err(e)
            }
        }
    }

    /// Who is on the clock, derived from the pick counter alone.
    pub fn current_turn(&self, league_id: LeagueId) -> Result<Turn, DraftError> {
        let turn = self.db.read(|conn| {
            let league = queries::require_league(conn, league_id)?;
            match league.draft_status {
                DraftStatus::Pending => Err(DraftError::DraftNotActive {
                    league_id,
                    status: league.draft_status,
                }),
                DraftStatus::Finished => Ok(Turn::Ended),
                DraftStatus::InProgress => {
                    let on_clock = participant_on_clock(conn, &league)?;
                    let n = league.draft_participant_count;
                    let pick_number = league.current_pick_number;
                    Ok(Turn::OnClock(TurnInfo {
                        pick_number,
                        round_number: order::round_for_pick(pick_number, n),
                        draft_position: order::draft_position_for_pick(pick_number, n),
                        participant_id: on_clock.id,
                        team_name: on_clock.team_name,
                        total_picks: league.total_picks(),
                    }))
                }
            }
        })?;
        debug!("League {} current turn: {:?}", league_id, turn);
        Ok(turn)
    }

    /// Finish a draft early (explicit end or roster-full signal).
    pub fn end_draft(&self, league_id: LeagueId) -> Result<FantasyLeague, DraftError> {
        let league = self.db.transaction(|tx| {
            let league = queries::require_league(tx, league_id)?;
            if league.draft_status != DraftStatus::InProgress {
                return Err(DraftError::DraftNotActive {
                    league_id,
                    status: league.draft_status,
                });
            }
            queries::mark_draft_finished(tx, league_id)?;
            queries::require_league(tx, league_id)
        })?;

        info!(
            "Draft for league {} ended at pick {} of {}",
            league_id,
            league.current_pick_number - 1,
            league.total_picks()
        );
        Ok(league)
    }

    /// Every pick made so far, in pick order.
    pub fn draft_board(&self, league_id: LeagueId) -> Result<Vec<DraftPick>, DraftError> {
        self.db.read(|conn| {
            queries::require_league(conn, league_id)?;
            Ok(queries::load_picks(conn, league_id)?)
        })
    }

    /// Ask the advisor for a pick. Never fails: timeouts, advisor errors and
    /// suggestions naming unknown or drafted players all come back as
    /// `Unavailable`.
    pub async fn suggest_pick(
        &self,
        league_id: LeagueId,
        participant_id: ParticipantId,
    ) -> Suggestion {
        let drafted = match self.db.drafted_player_ids(league_id) {
            Ok(drafted) => drafted,
            Err(e) => {
                warn!("League {}: cannot build suggestion request: {:#}", league_id, e);
                return Suggestion::Unavailable;
            }
        };
        let request = SuggestionRequest {
            league_id,
            participant_id,
            drafted,
        };

        let suggestion = self.advisor.suggest(&request);
        let ranked = match tokio::time::timeout(self.advisor_timeout, suggestion).await {
            Err(_) => {
                warn!(
                    "League {}: advisor timed out after {:?}",
                    league_id, self.advisor_timeout
                );
                return Suggestion::Unavailable;
            }
            Ok(Err(e)) => {
                warn!("League {}: advisor failed: {:#}", league_id, e);
                return Suggestion::Unavailable;
            }
            Ok(Ok(None)) => return Suggestion::Unavailable,
            Ok(Ok(Some(ranked))) => ranked,
        };

        if request.drafted.contains(&ranked.player_id) {
            warn!(
                "League {}: advisor suggested already drafted player {}",
                league_id, ranked.player_id
            );
            return Suggestion::Unavailable;
        }
        match self.pool.player_exists(ranked.player_id) {
            Ok(true) => Suggestion::Available(ranked),
            Ok(false) => {
                warn!(
                    "League {}: advisor suggested unknown player {}",
                    league_id, ranked.player_id
                );
                Suggestion::Unavailable
            }
            Err(e) => {
                warn!("League {}: cannot verify suggestion: {:#}", league_id, e);
                Suggestion::Unavailable
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// A pick is only accepted while the draft is running in an open league.
fn ensure_drafting(league: &FantasyLeague) -> Result<(), DraftError> {
    if league.draft_status != DraftStatus::InProgress {
        return Err(DraftError::DraftNotActive {
            league_id: league.id,
            status: league.draft_status,
        });
    }
    if league.status.is_closed() {
        return Err(DraftError::LeagueClosed {
            league_id: league.id,
            status: league.status,
        });
    }
    Ok(())
}

/// Participant seated at the draft position that owns the current pick.
fn participant_on_clock(
    conn: &rusqlite::Connection,
    league: &FantasyLeague,
) -> Result<Participant, DraftError> {
    let position =
        order::draft_position_for_pick(league.current_pick_number, league.draft_participant_count);
    queries::participant_at_position(conn, league.id, position)?.ok_or_else(|| {
        DraftError::Storage(anyhow!(
            "league {} has no participant seated at draft position {}",
            league.id,
            position
        ))
    })
}

// ---------------------------------------------------------------------------
// Unit tests
// ---------------------------------------------------------------------------
