// Schedule generator: turns a finished draft's roster into a single
// round-robin H2H calendar.
//
// The precondition checks and the batch insert share one immediate
// transaction, so two concurrent generations cannot both write a schedule.

use std::sync::Arc;

use anyhow::anyhow;
use chrono::{Days, NaiveDate};
use rusqlite::Connection;
use tracing::info;

use crate::config::{Config, ScheduleConfig};
use crate::db::{queries, Database};
use crate::error::DraftError;
use crate::league::{DraftStatus, FantasyLeague, Participant};
use crate::schedule::fixture::{H2HMatch, NewMatch};
use crate::schedule::round_robin;
use crate::LeagueId;

/// Fewest active participants that can form a schedule.
const MIN_SCHEDULE_PARTICIPANTS: u32 = 2;

pub struct ScheduleGenerator {
    db: Arc<Database>,
    config: ScheduleConfig,
}

impl ScheduleGenerator {
    pub fn new(db: Arc<Database>, config: &Config) -> Self {
        Self {
            db,
            config: config.schedule.clone(),
        }
    }

    /// Write the full calendar for a league whose draft has finished.
    ///
    /// Fails with `ScheduleAlreadyExists` if any match is already stored;
    /// clearing a schedule is a separate administrative action.
    pub fn generate_schedule(&self, league_id: LeagueId) -> Result<Vec<H2HMatch>, DraftError> {
        let matches = self.db.transaction(|tx| {
            let league = finished_league(tx, league_id)?;
            let existing = queries::count_matches(tx, league_id)?;
            if existing > 0 {
                return Err(DraftError::ScheduleAlreadyExists { league_id, existing });
            }
            let participants = self.eligible_roster(tx, &league)?;

            let fixtures = plan_fixtures(&league, &participants, self.config.window_days)?;
            for fixture in &fixtures {
                queries::insert_match(tx, league_id, fixture)?;
            }
            Ok(queries::load_matches(tx, league_id, queries::MatchFilter::All)?)
        })?;

        let weeks = matches.iter().map(|m| m.week_number).max().unwrap_or(0);
        info!(
            "Generated schedule for league {}: {} weeks, {} matches",
            league_id,
            weeks,
            matches.len()
        );
        Ok(matches)
    }

    /// The fixtures `generate_schedule` would write, without writing them.
    /// Ignores any schedule already stored.
    pub fn preview_schedule(&self, league_id: LeagueId) -> Result<Vec<NewMatch>, DraftError> {
        self.db.read(|conn| {
            let league = finished_league(conn, league_id)?;
            let participants = self.eligible_roster(conn, &league)?;
            plan_fixtures(&league, &participants, self.config.window_days)
        })
    }

    /// Active participants seated by the draft, in draft-position order,
    /// provided there are at least two and (when configured) every roster is
    /// full.
    fn eligible_roster(
        &self,
        conn: &Connection,
        league: &FantasyLeague,
    ) -> Result<Vec<Participant>, DraftError> {
        let participants = queries::load_seated_participants(conn, league.id)?;
        let count = participants.len() as u32;
        if count < MIN_SCHEDULE_PARTICIPANTS {
            return Err(DraftError::InsufficientParticipants {
                required: MIN_SCHEDULE_PARTICIPANTS,
                actual: count,
            });
        }

        if self.config.require_full_rosters {
            for participant in &participants {
                let picks = queries::count_picks_for(conn, participant.id)?;
                if picks < league.draft_rounds {
                    return Err(DraftError::RosterIncomplete {
                        participant_id: participant.id,
                        picks,
                        required: league.draft_rounds,
                    });
                }
            }
        }

        Ok(participants)
    }
}

fn finished_league(conn: &Connection, league_id: LeagueId) -> Result<FantasyLeague, DraftError> {
    let league = queries::require_league(conn, league_id)?;
    if league.draft_status != DraftStatus::Finished {
        return Err(DraftError::DraftNotFinished {
            league_id,
            status: league.draft_status,
        });
    }
    Ok(league)
}

/// Materialize the circle-method plan for `participants` (already in
/// draft-position order). The entrant listed earlier plays at home.
pub fn plan_fixtures(
    league: &FantasyLeague,
    participants: &[Participant],
    window_days: u32,
) -> Result<Vec<NewMatch>, DraftError> {
    let seats: Vec<usize> = (0..participants.len()).collect();
    let mut fixtures = Vec::new();

    for week in round_robin::plan(&seats) {
        let start_date = week_boundary(league.start_date, week.week_number - 1, window_days)?;
        let end_date = week_boundary(league.start_date, week.week_number, window_days)?;

        for (idx, (a, b)) in week.pairings.into_iter().enumerate() {
            let (home, away) = if a < b { (a, b) } else { (b, a) };
            fixtures.push(NewMatch {
                week_number: week.week_number,
                match_number: idx as u32 + 1,
                home_participant_id: participants[home].id,
                away_participant_id: participants[away].id,
                start_date,
                end_date,
            });
        }
    }

    Ok(fixtures)
}

/// `start` offset by `windows` schedule windows of `window_days` days.
fn week_boundary(
    start: NaiveDate,
    windows: u32,
    window_days: u32,
) -> Result<NaiveDate, DraftError> {
    let days = u64::from(windows) * u64::from(window_days);
    start.checked_add_days(Days::new(days)).ok_or_else(|| {
        DraftError::Storage(anyhow!("schedule date overflow: {start} + {days} days"))
    })
}
