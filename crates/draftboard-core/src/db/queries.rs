// Row-level queries shared by plain reads and transactional operations.
//
// Every function takes a `&Connection` so it can run either under the
// database lock or inside a `Transaction` (which derefs to `Connection`).

use anyhow::{Context, Result};
use chrono::NaiveDate;
use rusqlite::types::Type;
use rusqlite::{params, Connection, OptionalExtension, Row};

use crate::draft::pick::{DraftPick, PickStatus};
use crate::error::DraftError;
use crate::league::{
    DraftStatus, FantasyLeague, LeagueStatus, Participant, ParticipantRole, ParticipantStatus,
};
use crate::player_pool::Player;
use crate::schedule::fixture::{H2HMatch, MatchStatus, NewMatch};
use crate::{LeagueId, ParticipantId, PickId, PlayerId};

// ---------------------------------------------------------------------------
// Column helpers
// ---------------------------------------------------------------------------

/// Read a text column through an enum's `parse` function.
fn enum_column<T>(row: &Row<'_>, idx: usize, parse: fn(&str) -> Option<T>) -> rusqlite::Result<T> {
    let raw: String = row.get(idx)?;
    parse(&raw).ok_or_else(|| {
        rusqlite::Error::FromSqlConversionFailure(
            idx,
            Type::Text,
            format!("unrecognized value {raw:?}").into(),
        )
    })
}

// ---------------------------------------------------------------------------
// Leagues
// ---------------------------------------------------------------------------

const LEAGUE_COLUMNS: &str = "id, name, draft_status, status, min_participants, max_participants,
     current_pick_number, draft_participant_count, draft_rounds, start_date";

fn league_from_row(row: &Row<'_>) -> rusqlite::Result<FantasyLeague> {
    Ok(FantasyLeague {
        id: row.get(0)?,
        name: row.get(1)?,
        draft_status: enum_column(row, 2, DraftStatus::parse)?,
        status: enum_column(row, 3, LeagueStatus::parse)?,
        min_participants: row.get(4)?,
        max_participants: row.get(5)?,
        current_pick_number: row.get(6)?,
        draft_participant_count: row.get(7)?,
        draft_rounds: row.get(8)?,
        start_date: row.get(9)?,
    })
}

pub(crate) fn load_league(conn: &Connection, league_id: LeagueId) -> Result<Option<FantasyLeague>> {
    conn.query_row(
        &format!("SELECT {LEAGUE_COLUMNS} FROM leagues WHERE id = ?1"),
        params![league_id],
        league_from_row,
    )
    .optional()
    .context("failed to load league")
}

/// Load a league, treating a missing row as `LeagueNotFound`.
pub(crate) fn require_league(
    conn: &Connection,
    league_id: LeagueId,
) -> std::result::Result<FantasyLeague, DraftError> {
    load_league(conn, league_id)?.ok_or(DraftError::LeagueNotFound(league_id))
}

pub(crate) fn mark_draft_started(
    conn: &Connection,
    league_id: LeagueId,
    participants: u32,
    rounds: u32,
) -> Result<()> {
    conn.execute(
        "UPDATE leagues
            SET draft_status = 'in_progress',
                current_pick_number = 1,
                draft_participant_count = ?2,
                draft_rounds = ?3,
                status = CASE WHEN status = 'pending' THEN 'active' ELSE status END
          WHERE id = ?1 AND draft_status = 'pending'",
        params![league_id, participants, rounds],
    )
    .context("failed to mark draft started")?;
    Ok(())
}

/// Compare-and-swap the pick counter from `expected` to `expected + 1`.
/// Returns `false` if the counter was not at `expected`.
pub(crate) fn advance_pick_counter(
    conn: &Connection,
    league_id: LeagueId,
    expected: u32,
) -> Result<bool> {
    let updated = conn
        .execute(
            "UPDATE leagues
                SET current_pick_number = current_pick_number + 1
              WHERE id = ?1 AND current_pick_number = ?2 AND draft_status = 'in_progress'",
            params![league_id, expected],
        )
        .context("failed to advance pick counter")?;
    Ok(updated == 1)
}

pub(crate) fn mark_draft_finished(conn: &Connection, league_id: LeagueId) -> Result<()> {
    conn.execute(
        "UPDATE leagues SET draft_status = 'finished'
          WHERE id = ?1 AND draft_status = 'in_progress'",
        params![league_id],
    )
    .context("failed to mark draft finished")?;
    Ok(())
}

// ---------------------------------------------------------------------------
// Participants
// ---------------------------------------------------------------------------

const PARTICIPANT_COLUMNS: &str =
    "id, league_id, user_id, role, status, draft_position, team_name, points, rank";

fn participant_from_row(row: &Row<'_>) -> rusqlite::Result<Participant> {
    Ok(Participant {
        id: row.get(0)?,
        league_id: row.get(1)?,
        user_id: row.get(2)?,
        role: enum_column(row, 3, ParticipantRole::parse)?,
        status: enum_column(row, 4, ParticipantStatus::parse)?,
        draft_position: row.get(5)?,
        team_name: row.get(6)?,
        points: row.get(7)?,
        rank: row.get(8)?,
    })
}

/// Participants of a league ordered by draft position (unseated last), then
/// join order.
pub(crate) fn load_participants(
    conn: &Connection,
    league_id: LeagueId,
    active_only: bool,
) -> Result<Vec<Participant>> {
    let sql = format!(
        "SELECT {PARTICIPANT_COLUMNS} FROM participants
          WHERE league_id = ?1 {}
          ORDER BY draft_position IS NULL, draft_position, id",
        if active_only { "AND status = 'active'" } else { "" }
    );
    let mut stmt = conn
        .prepare(&sql)
        .context("failed to prepare participants query")?;
    let rows = stmt
        .query_map(params![league_id], participant_from_row)
        .context("failed to query participants")?
        .collect::<std::result::Result<Vec<_>, _>>()
        .context("failed to map participant rows")?;
    Ok(rows)
}

/// Active participants holding a draft position, in draft order.
pub(crate) fn load_seated_participants(
    conn: &Connection,
    league_id: LeagueId,
) -> Result<Vec<Participant>> {
    let mut stmt = conn
        .prepare(&format!(
            "SELECT {PARTICIPANT_COLUMNS} FROM participants
              WHERE league_id = ?1 AND status = 'active' AND draft_position IS NOT NULL
              ORDER BY draft_position"
        ))
        .context("failed to prepare seated participants query")?;
    let rows = stmt
        .query_map(params![league_id], participant_from_row)
        .context("failed to query seated participants")?
        .collect::<std::result::Result<Vec<_>, _>>()
        .context("failed to map seated participant rows")?;
    Ok(rows)
}

pub(crate) fn find_participant(
    conn: &Connection,
    participant_id: ParticipantId,
) -> Result<Option<Participant>> {
    conn.query_row(
        &format!("SELECT {PARTICIPANT_COLUMNS} FROM participants WHERE id = ?1"),
        params![participant_id],
        participant_from_row,
    )
    .optional()
    .context("failed to load participant")
}

pub(crate) fn load_participant(
    conn: &Connection,
    league_id: LeagueId,
    participant_id: ParticipantId,
) -> Result<Option<Participant>> {
    conn.query_row(
        &format!("SELECT {PARTICIPANT_COLUMNS} FROM participants WHERE id = ?1 AND league_id = ?2"),
        params![participant_id, league_id],
        participant_from_row,
    )
    .optional()
    .context("failed to load participant")
}

pub(crate) fn participant_at_position(
    conn: &Connection,
    league_id: LeagueId,
    draft_position: u32,
) -> Result<Option<Participant>> {
    conn.query_row(
        &format!(
            "SELECT {PARTICIPANT_COLUMNS} FROM participants
              WHERE league_id = ?1 AND draft_position = ?2"
        ),
        params![league_id, draft_position],
        participant_from_row,
    )
    .optional()
    .context("failed to load participant by draft position")
}

pub(crate) fn assign_draft_position(
    conn: &Connection,
    participant_id: ParticipantId,
    draft_position: u32,
) -> Result<()> {
    conn.execute(
        "UPDATE participants SET draft_position = ?2
          WHERE id = ?1 AND draft_position IS NULL",
        params![participant_id, draft_position],
    )
    .context("failed to assign draft position")?;
    Ok(())
}

// ---------------------------------------------------------------------------
// Players
// ---------------------------------------------------------------------------

pub(crate) fn load_player(conn: &Connection, player_id: PlayerId) -> Result<Option<Player>> {
    conn.query_row(
        "SELECT id, name, position, team FROM players WHERE id = ?1",
        params![player_id],
        |row| {
            Ok(Player {
                id: row.get(0)?,
                name: row.get(1)?,
                position: row.get(2)?,
                team: row.get(3)?,
            })
        },
    )
    .optional()
    .context("failed to load player")
}

// ---------------------------------------------------------------------------
// Draft picks
// ---------------------------------------------------------------------------

const PICK_COLUMNS: &str =
    "id, league_id, participant_id, player_id, pick_number, round_number, status, picked_at";

fn pick_from_row(row: &Row<'_>) -> rusqlite::Result<DraftPick> {
    Ok(DraftPick {
        id: row.get(0)?,
        league_id: row.get(1)?,
        participant_id: row.get(2)?,
        player_id: row.get(3)?,
        pick_number: row.get(4)?,
        round_number: row.get(5)?,
        status: enum_column(row, 6, PickStatus::parse)?,
        picked_at: row.get(7)?,
    })
}

pub(crate) fn load_picks(conn: &Connection, league_id: LeagueId) -> Result<Vec<DraftPick>> {
    let mut stmt = conn
        .prepare(&format!(
            "SELECT {PICK_COLUMNS} FROM draft_picks WHERE league_id = ?1 ORDER BY pick_number"
        ))
        .context("failed to prepare load_picks query")?;
    let picks = stmt
        .query_map(params![league_id], pick_from_row)
        .context("failed to query draft picks")?
        .collect::<std::result::Result<Vec<_>, _>>()
        .context("failed to map draft pick rows")?;
    Ok(picks)
}

pub(crate) fn load_pick(conn: &Connection, pick_id: PickId) -> Result<DraftPick> {
    conn.query_row(
        &format!("SELECT {PICK_COLUMNS} FROM draft_picks WHERE id = ?1"),
        params![pick_id],
        pick_from_row,
    )
    .context("failed to load draft pick")
}

pub(crate) fn pick_for_player(
    conn: &Connection,
    league_id: LeagueId,
    player_id: PlayerId,
) -> Result<Option<DraftPick>> {
    conn.query_row(
        &format!("SELECT {PICK_COLUMNS} FROM draft_picks WHERE league_id = ?1 AND player_id = ?2"),
        params![league_id, player_id],
        pick_from_row,
    )
    .optional()
    .context("failed to look up drafted player")
}

pub(crate) fn insert_pick(
    conn: &Connection,
    league_id: LeagueId,
    participant_id: ParticipantId,
    player_id: PlayerId,
    pick_number: u32,
    round_number: u32,
) -> Result<PickId> {
    conn.execute(
        "INSERT INTO draft_picks
            (league_id, participant_id, player_id, pick_number, round_number, status)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
        params![
            league_id,
            participant_id,
            player_id,
            pick_number,
            round_number,
            PickStatus::Completed.as_str(),
        ],
    )
    .context("failed to record draft pick")?;
    Ok(conn.last_insert_rowid())
}

pub(crate) fn drafted_player_ids(conn: &Connection, league_id: LeagueId) -> Result<Vec<PlayerId>> {
    let mut stmt = conn
        .prepare("SELECT player_id FROM draft_picks WHERE league_id = ?1 ORDER BY pick_number")
        .context("failed to prepare drafted players query")?;
    let ids = stmt
        .query_map(params![league_id], |row| row.get(0))
        .context("failed to query drafted players")?
        .collect::<std::result::Result<Vec<_>, _>>()
        .context("failed to map drafted player rows")?;
    Ok(ids)
}

/// Number of picks held by `participant_id`.
pub(crate) fn count_picks_for(conn: &Connection, participant_id: ParticipantId) -> Result<u32> {
    conn.query_row(
        "SELECT COUNT(*) FROM draft_picks WHERE participant_id = ?1",
        params![participant_id],
        |row| row.get(0),
    )
    .context("failed to count participant picks")
}

// ---------------------------------------------------------------------------
// Matches
// ---------------------------------------------------------------------------

const MATCH_COLUMNS: &str = "id, league_id, week_number, match_number, home_participant_id,
     away_participant_id, home_points, away_points, status, winner_id, start_date, end_date";

fn match_from_row(row: &Row<'_>) -> rusqlite::Result<H2HMatch> {
    Ok(H2HMatch {
        id: row.get(0)?,
        league_id: row.get(1)?,
        week_number: row.get(2)?,
        match_number: row.get(3)?,
        home_participant_id: row.get(4)?,
        away_participant_id: row.get(5)?,
        home_points: row.get(6)?,
        away_points: row.get(7)?,
        status: enum_column(row, 8, MatchStatus::parse)?,
        winner_id: row.get(9)?,
        start_date: row.get::<_, NaiveDate>(10)?,
        end_date: row.get::<_, NaiveDate>(11)?,
    })
}

/// Filter applied when listing a league's fixtures.
#[derive(Debug, Clone, Copy)]
pub(crate) enum MatchFilter {
    All,
    Week(u32),
    Participant(ParticipantId),
}

pub(crate) fn load_matches(
    conn: &Connection,
    league_id: LeagueId,
    filter: MatchFilter,
) -> Result<Vec<H2HMatch>> {
    let (clause, arg): (&str, i64) = match filter {
        MatchFilter::All => ("", 0),
        MatchFilter::Week(week) => ("AND week_number = ?2", i64::from(week)),
        MatchFilter::Participant(id) => (
            "AND (home_participant_id = ?2 OR away_participant_id = ?2)",
            id,
        ),
    };
    let sql = format!(
        "SELECT {MATCH_COLUMNS} FROM h2h_matches
          WHERE league_id = ?1 {clause}
          ORDER BY week_number, match_number"
    );
    let mut stmt = conn.prepare(&sql).context("failed to prepare matches query")?;
    let rows = match filter {
        MatchFilter::All => stmt.query_map(params![league_id], match_from_row),
        _ => stmt.query_map(params![league_id, arg], match_from_row),
    }
    .context("failed to query matches")?
    .collect::<std::result::Result<Vec<_>, _>>()
    .context("failed to map match rows")?;
    Ok(rows)
}

pub(crate) fn count_matches(conn: &Connection, league_id: LeagueId) -> Result<u32> {
    conn.query_row(
        "SELECT COUNT(*) FROM h2h_matches WHERE league_id = ?1",
        params![league_id],
        |row| row.get(0),
    )
    .context("failed to count matches")
}

pub(crate) fn insert_match(conn: &Connection, league_id: LeagueId, m: &NewMatch) -> Result<()> {
    conn.execute(
        "INSERT INTO h2h_matches
            (league_id, week_number, match_number, home_participant_id, away_participant_id,
             status, start_date, end_date)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
        params![
            league_id,
            m.week_number,
            m.match_number,
            m.home_participant_id,
            m.away_participant_id,
            MatchStatus::Scheduled.as_str(),
            m.start_date,
            m.end_date,
        ],
    )
    .context("failed to insert match")?;
    Ok(())
}
