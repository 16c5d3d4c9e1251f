// SQLite persistence for leagues, participants, the player pool, draft picks
// and head-to-head matches.

pub(crate) mod queries;

use std::sync::{Mutex, MutexGuard, PoisonError};

use anyhow::{Context, Result};
use rusqlite::{params, Connection, Transaction, TransactionBehavior};

use crate::draft::pick::DraftPick;
use crate::error::DraftError;
use crate::league::{
    DraftStatus, FantasyLeague, NewLeague, NewParticipant, Participant, ParticipantStatus,
};
use crate::player_pool::{NewPlayer, Player, PlayerPool};
use crate::schedule::fixture::H2HMatch;
use crate::{LeagueId, ParticipantId, PlayerId};

use self::queries::MatchFilter;

const SCHEMA: &str = "
    CREATE TABLE IF NOT EXISTS leagues (
        id                      INTEGER PRIMARY KEY AUTOINCREMENT,
        name                    TEXT NOT NULL,
        draft_status            TEXT NOT NULL DEFAULT 'pending'
                                CHECK (draft_status IN ('pending', 'in_progress', 'finished')),
        status                  TEXT NOT NULL DEFAULT 'pending'
                                CHECK (status IN ('pending', 'active', 'ended', 'cancelled')),
        min_participants        INTEGER NOT NULL,
        max_participants        INTEGER NOT NULL,
        current_pick_number     INTEGER NOT NULL DEFAULT 1 CHECK (current_pick_number >= 1),
        draft_participant_count INTEGER NOT NULL DEFAULT 0,
        draft_rounds            INTEGER NOT NULL DEFAULT 0,
        start_date              TEXT NOT NULL,
        created_at              TEXT NOT NULL DEFAULT (strftime('%Y-%m-%dT%H:%M:%fZ', 'now'))
    );

    CREATE TABLE IF NOT EXISTS participants (
        id             INTEGER PRIMARY KEY AUTOINCREMENT,
        league_id      INTEGER NOT NULL REFERENCES leagues(id),
        user_id        INTEGER NOT NULL,
        role           TEXT NOT NULL CHECK (role IN ('owner', 'admin', 'player')),
        status         TEXT NOT NULL CHECK (status IN ('pending', 'active', 'banned')),
        draft_position INTEGER,
        team_name      TEXT NOT NULL,
        points         REAL NOT NULL DEFAULT 0,
        rank           INTEGER,
        joined_at      TEXT NOT NULL DEFAULT (strftime('%Y-%m-%dT%H:%M:%fZ', 'now')),
        UNIQUE (league_id, user_id),
        UNIQUE (league_id, draft_position)
    );

    CREATE TABLE IF NOT EXISTS players (
        id       INTEGER PRIMARY KEY AUTOINCREMENT,
        name     TEXT NOT NULL,
        position TEXT NOT NULL,
        team     TEXT NOT NULL,
        UNIQUE (name, team)
    );

    CREATE TABLE IF NOT EXISTS draft_picks (
        id             INTEGER PRIMARY KEY AUTOINCREMENT,
        league_id      INTEGER NOT NULL REFERENCES leagues(id),
        participant_id INTEGER NOT NULL REFERENCES participants(id),
        player_id      INTEGER NOT NULL REFERENCES players(id),
        pick_number    INTEGER NOT NULL CHECK (pick_number >= 1),
        round_number   INTEGER NOT NULL CHECK (round_number >= 1),
        status         TEXT NOT NULL CHECK (status IN ('pending', 'completed')),
        picked_at      TEXT NOT NULL DEFAULT (strftime('%Y-%m-%dT%H:%M:%fZ', 'now')),
        UNIQUE (league_id, pick_number),
        UNIQUE (league_id, player_id)
    );

    CREATE TABLE IF NOT EXISTS h2h_matches (
        id                  INTEGER PRIMARY KEY AUTOINCREMENT,
        league_id           INTEGER NOT NULL REFERENCES leagues(id),
        week_number         INTEGER NOT NULL CHECK (week_number >= 1),
        match_number        INTEGER NOT NULL CHECK (match_number >= 1),
        home_participant_id INTEGER NOT NULL REFERENCES participants(id),
        away_participant_id INTEGER NOT NULL REFERENCES participants(id),
        home_points         REAL NOT NULL DEFAULT 0,
        away_points         REAL NOT NULL DEFAULT 0,
        status              TEXT NOT NULL DEFAULT 'scheduled'
                            CHECK (status IN ('scheduled', 'in_progress', 'completed')),
        winner_id           INTEGER REFERENCES participants(id),
        start_date          TEXT NOT NULL,
        end_date            TEXT NOT NULL,
        UNIQUE (league_id, week_number, match_number),
        CHECK (home_participant_id <> away_participant_id)
    );

    CREATE INDEX IF NOT EXISTS idx_participants_league ON participants(league_id);
    CREATE INDEX IF NOT EXISTS idx_h2h_matches_league ON h2h_matches(league_id);
";

/// SQLite-backed store shared by the draft coordinator and schedule
/// generator.
///
/// All access goes through one connection behind a mutex. Mutating
/// operations run in `BEGIN IMMEDIATE` transactions, so they also serialize
/// against other processes holding the same database file.
pub struct Database {
    conn: Mutex<Connection>,
}

impl Database {
    /// Open (or create) a SQLite database at `path` and ensure all tables
    /// exist. Pass `":memory:"` for an ephemeral in-memory database.
    pub fn open(path: &str) -> Result<Self> {
        let conn = Connection::open(path)
            .with_context(|| format!("failed to open database at {path}"))?;

        conn.execute_batch(
            "PRAGMA journal_mode = WAL;
             PRAGMA busy_timeout = 5000;
             PRAGMA foreign_keys = ON;",
        )
        .context("failed to set database pragmas")?;

        conn.execute_batch(SCHEMA)
            .context("failed to create database schema")?;

        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    /// Acquire the connection. A panic while the lock was held cannot leave a
    /// transaction open (it rolls back on drop), so a poisoned lock is
    /// recovered rather than propagated.
    fn conn(&self) -> MutexGuard<'_, Connection> {
        self.conn.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Run `f` against the connection under the lock, for reads that must
    /// see one consistent state.
    pub fn read<T, E>(
        &self,
        f: impl FnOnce(&Connection) -> std::result::Result<T, E>,
    ) -> std::result::Result<T, E> {
        let conn = self.conn();
        f(&conn)
    }

    /// Run `f` inside an immediate (write-locking) transaction. Commits when
    /// `f` returns `Ok`; any `Err` rolls back every write `f` made.
    pub fn transaction<T, E>(
        &self,
        f: impl FnOnce(&Transaction<'_>) -> std::result::Result<T, E>,
    ) -> std::result::Result<T, E>
    where
        E: From<rusqlite::Error>,
    {
        let mut conn = self.conn();
        let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;
        let value = f(&tx)?;
        tx.commit()?;
        Ok(value)
    }

    // ------------------------------------------------------------------
    // Leagues and participants
    // ------------------------------------------------------------------

    /// Create a league with a pending draft.
    pub fn create_league(&self, league: &NewLeague) -> Result<FantasyLeague> {
        let conn = self.conn();
        conn.execute(
            "INSERT INTO leagues (name, min_participants, max_participants, start_date)
             VALUES (?1, ?2, ?3, ?4)",
            params![
                league.name,
                league.min_participants,
                league.max_participants,
                league.start_date,
            ],
        )
        .context("failed to create league")?;
        let id = conn.last_insert_rowid();
        queries::load_league(&conn, id)?.context("created league vanished")
    }

    pub fn league(&self, league_id: LeagueId) -> Result<Option<FantasyLeague>> {
        queries::load_league(&self.conn(), league_id)
    }

    /// Enrol a user in a league. Draft position is left unassigned, so the
    /// roster is locked once the draft has started.
    pub fn add_participant(
        &self,
        league_id: LeagueId,
        participant: &NewParticipant,
    ) -> std::result::Result<Participant, DraftError> {
        self.transaction(|tx| {
            ensure_roster_open(&queries::require_league(tx, league_id)?)?;
            tx.execute(
                "INSERT INTO participants (league_id, user_id, role, status, team_name)
                 VALUES (?1, ?2, ?3, ?4, ?5)",
                params![
                    league_id,
                    participant.user_id,
                    participant.role.as_str(),
                    participant.status.as_str(),
                    participant.team_name,
                ],
            )
            .context("failed to add participant")?;
            let id = tx.last_insert_rowid();
            let added = queries::load_participant(tx, league_id, id)?;
            Ok(added.context("added participant vanished")?)
        })
    }

    /// Change a participant's membership status (activation, bans).
    /// Returns `false` if no such participant exists. After the draft has
    /// started only seated participants can be made active.
    pub fn set_participant_status(
        &self,
        participant_id: ParticipantId,
        status: ParticipantStatus,
    ) -> std::result::Result<bool, DraftError> {
        self.transaction(|tx| {
            let Some(participant) = queries::find_participant(tx, participant_id)? else {
                return Ok(false);
            };
            if status == ParticipantStatus::Active && participant.draft_position.is_none() {
                ensure_roster_open(&queries::require_league(tx, participant.league_id)?)?;
            }
            tx.execute(
                "UPDATE participants SET status = ?2 WHERE id = ?1",
                params![participant_id, status.as_str()],
            )
            .context("failed to update participant status")?;
            Ok(true)
        })
    }

    /// All participants of a league, seated ones first in draft order.
    pub fn participants(&self, league_id: LeagueId) -> Result<Vec<Participant>> {
        queries::load_participants(&self.conn(), league_id, false)
    }

    /// Active participants of a league, seated ones first in draft order.
    pub fn active_participants(&self, league_id: LeagueId) -> Result<Vec<Participant>> {
        queries::load_participants(&self.conn(), league_id, true)
    }

    /// Active participants ordered for display: points descending, then
    /// rank, then draft position. Scoring fields are only read here.
    pub fn standings(&self, league_id: LeagueId) -> Result<Vec<Participant>> {
        let mut participants = self.active_participants(league_id)?;
        participants.sort_by(|a, b| {
            b.points
                .total_cmp(&a.points)
                .then_with(|| a.rank.unwrap_or(u32::MAX).cmp(&b.rank.unwrap_or(u32::MAX)))
                .then_with(|| {
                    a.draft_position
                        .unwrap_or(u32::MAX)
                        .cmp(&b.draft_position.unwrap_or(u32::MAX))
                })
        });
        Ok(participants)
    }

    // ------------------------------------------------------------------
    // Player pool
    // ------------------------------------------------------------------

    /// Insert a player or update their position if a `(name, team)` row
    /// already exists. Returns the player's row id.
    pub fn upsert_player(&self, player: &NewPlayer) -> Result<PlayerId> {
        let conn = self.conn();
        upsert_player_row(&conn, player)
    }

    /// Upsert a batch of players in a single transaction.
    pub fn import_players(&self, players: &[NewPlayer]) -> Result<Vec<PlayerId>> {
        let mut conn = self.conn();
        let tx = conn.transaction().context("failed to begin import transaction")?;
        let ids = players
            .iter()
            .map(|p| upsert_player_row(&tx, p))
            .collect::<Result<Vec<_>>>()?;
        tx.commit().context("failed to commit player import")?;
        Ok(ids)
    }

    pub fn player(&self, player_id: PlayerId) -> Result<Option<Player>> {
        queries::load_player(&self.conn(), player_id)
    }

    // ------------------------------------------------------------------
    // Draft picks
    // ------------------------------------------------------------------

    /// Picks for a league in pick order.
    pub fn picks(&self, league_id: LeagueId) -> Result<Vec<DraftPick>> {
        queries::load_picks(&self.conn(), league_id)
    }

    /// Ids of every player already drafted in a league.
    pub fn drafted_player_ids(&self, league_id: LeagueId) -> Result<Vec<PlayerId>> {
        queries::drafted_player_ids(&self.conn(), league_id)
    }

    // ------------------------------------------------------------------
    // Matches
    // ------------------------------------------------------------------

    pub fn matches(&self, league_id: LeagueId) -> Result<Vec<H2HMatch>> {
        queries::load_matches(&self.conn(), league_id, MatchFilter::All)
    }

    pub fn matches_for_week(&self, league_id: LeagueId, week_number: u32) -> Result<Vec<H2HMatch>> {
        queries::load_matches(&self.conn(), league_id, MatchFilter::Week(week_number))
    }

    pub fn matches_for_participant(
        &self,
        league_id: LeagueId,
        participant_id: ParticipantId,
    ) -> Result<Vec<H2HMatch>> {
        queries::load_matches(
            &self.conn(),
            league_id,
            MatchFilter::Participant(participant_id),
        )
    }

    /// Delete every match of a league so a schedule can be generated again.
    /// This is an explicit administrative action; generation never
    /// overwrites. Returns the number of matches removed.
    pub fn delete_schedule(&self, league_id: LeagueId) -> Result<usize> {
        let deleted = self
            .conn()
            .execute(
                "DELETE FROM h2h_matches WHERE league_id = ?1",
                params![league_id],
            )
            .context("failed to delete schedule")?;
        Ok(deleted)
    }
}

impl PlayerPool for Database {
    fn player_exists(&self, player_id: PlayerId) -> Result<bool> {
        let exists: bool = self
            .conn()
            .query_row(
                "SELECT EXISTS(SELECT 1 FROM players WHERE id = ?1)",
                params![player_id],
                |row| row.get(0),
            )
            .context("failed to check player existence")?;
        Ok(exists)
    }
}

/// Unseated participants cannot join the active roster mid-draft.
fn ensure_roster_open(league: &FantasyLeague) -> std::result::Result<(), DraftError> {
    if league.draft_status != DraftStatus::Pending {
        return Err(DraftError::RosterLocked {
            league_id: league.id,
            status: league.draft_status,
        });
    }
    Ok(())
}

fn upsert_player_row(conn: &Connection, player: &NewPlayer) -> Result<PlayerId> {
    conn.query_row(
        "INSERT INTO players (name, position, team)
         VALUES (?1, ?2, ?3)
         ON CONFLICT(name, team) DO UPDATE SET position = excluded.position
         RETURNING id",
        params![player.name, player.position, player.team],
        |row| row.get(0),
    )
    .context("failed to upsert player")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::league::{LeagueStatus, ParticipantRole};
    use crate::schedule::fixture::NewMatch;
    use chrono::NaiveDate;

    /// Helper: create a fresh in-memory database for each test.
    fn test_db() -> Database {
        Database::open(":memory:").expect("in-memory database should open")
    }

    fn opening_day() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 9, 7).unwrap()
    }

    fn sample_league(db: &Database) -> FantasyLeague {
        db.create_league(&NewLeague {
            name: "Sunday Scaries".into(),
            min_participants: 2,
            max_participants: 10,
            start_date: opening_day(),
        })
        .unwrap()
    }

    fn join(
        db: &Database,
        league_id: LeagueId,
        user_id: i64,
        status: ParticipantStatus,
    ) -> Participant {
        db.add_participant(
            league_id,
            &NewParticipant {
                user_id,
                role: ParticipantRole::Player,
                status,
                team_name: format!("Team {user_id}"),
            },
        )
        .unwrap()
    }

    fn player(name: &str) -> NewPlayer {
        NewPlayer {
            name: name.into(),
            position: "WR".into(),
            team: "FA".into(),
        }
    }

    // ------------------------------------------------------------------
    // Schema / open
    // ------------------------------------------------------------------

    #[test]
    fn open_creates_tables() {
        let db = test_db();
        let conn = db.conn();

        let tables: Vec<String> = conn
            .prepare("SELECT name FROM sqlite_master WHERE type='table' ORDER BY name")
            .unwrap()
            .query_map([], |row| row.get(0))
            .unwrap()
            .collect::<std::result::Result<Vec<_>, _>>()
            .unwrap();

        for table in ["leagues", "participants", "players", "draft_picks", "h2h_matches"] {
            assert!(tables.contains(&table.to_string()), "missing {table}");
        }
    }

    #[test]
    fn reopening_a_file_keeps_data() {
        let path =
            std::env::temp_dir().join(format!("draftboard_reopen_{}.db", std::process::id()));
        let path_str = path.to_str().unwrap();
        let _ = std::fs::remove_file(&path);

        let league_id = {
            let db = Database::open(path_str).unwrap();
            sample_league(&db).id
        };
        let db = Database::open(path_str).unwrap();
        assert!(db.league(league_id).unwrap().is_some());

        drop(db);
        let _ = std::fs::remove_file(&path);
        let _ = std::fs::remove_file(format!("{path_str}-wal"));
        let _ = std::fs::remove_file(format!("{path_str}-shm"));
    }

    // ------------------------------------------------------------------
    // Leagues and participants
    // ------------------------------------------------------------------

    #[test]
    fn new_league_has_pending_draft() {
        let db = test_db();
        let league = sample_league(&db);
        assert_eq!(league.draft_status, DraftStatus::Pending);
        assert_eq!(league.status, LeagueStatus::Pending);
        assert_eq!(league.current_pick_number, 1);
        assert_eq!(league.draft_participant_count, 0);
        assert_eq!(league.start_date, opening_day());
    }

    #[test]
    fn missing_league_is_none() {
        let db = test_db();
        assert!(db.league(404).unwrap().is_none());
    }

    #[test]
    fn participants_ordered_by_join_before_seating() {
        let db = test_db();
        let league = sample_league(&db);
        let a = join(&db, league.id, 1, ParticipantStatus::Active);
        let b = join(&db, league.id, 2, ParticipantStatus::Pending);
        let c = join(&db, league.id, 3, ParticipantStatus::Active);

        let all: Vec<_> = db.participants(league.id).unwrap().iter().map(|p| p.id).collect();
        assert_eq!(all, vec![a.id, b.id, c.id]);

        let active: Vec<_> = db
            .active_participants(league.id)
            .unwrap()
            .iter()
            .map(|p| p.id)
            .collect();
        assert_eq!(active, vec![a.id, c.id]);
    }

    #[test]
    fn same_user_cannot_join_twice() {
        let db = test_db();
        let league = sample_league(&db);
        join(&db, league.id, 1, ParticipantStatus::Active);
        let dup = db.add_participant(
            league.id,
            &NewParticipant {
                user_id: 1,
                role: ParticipantRole::Player,
                status: ParticipantStatus::Active,
                team_name: "Again".into(),
            },
        );
        assert!(dup.is_err());
    }

    #[test]
    fn set_participant_status_bans() {
        let db = test_db();
        let league = sample_league(&db);
        let p = join(&db, league.id, 1, ParticipantStatus::Active);

        assert!(db.set_participant_status(p.id, ParticipantStatus::Banned).unwrap());
        assert!(db.active_participants(league.id).unwrap().is_empty());
        assert!(!db.set_participant_status(9999, ParticipantStatus::Active).unwrap());
    }

    #[test]
    fn roster_locks_once_draft_starts() {
        let db = test_db();
        let league = sample_league(&db);
        let seated = join(&db, league.id, 1, ParticipantStatus::Active);
        let waiting = join(&db, league.id, 2, ParticipantStatus::Pending);
        {
            let conn = db.conn();
            queries::assign_draft_position(&conn, seated.id, 1).unwrap();
            queries::mark_draft_started(&conn, league.id, 1, 2).unwrap();
        }

        let late = db.add_participant(
            league.id,
            &NewParticipant {
                user_id: 3,
                role: ParticipantRole::Player,
                status: ParticipantStatus::Active,
                team_name: "Latecomers".into(),
            },
        );
        assert!(matches!(
            late,
            Err(DraftError::RosterLocked {
                status: DraftStatus::InProgress,
                ..
            })
        ));

        let activation = db.set_participant_status(waiting.id, ParticipantStatus::Active);
        assert!(matches!(activation, Err(DraftError::RosterLocked { .. })));
        assert_eq!(db.participants(league.id).unwrap().len(), 2);

        // Seated participants can still be banned and reinstated.
        assert!(db.set_participant_status(seated.id, ParticipantStatus::Banned).unwrap());
        assert!(db.set_participant_status(seated.id, ParticipantStatus::Active).unwrap());
        // Banning an unseated participant is always allowed.
        assert!(db.set_participant_status(waiting.id, ParticipantStatus::Banned).unwrap());
    }

    #[test]
    fn draft_positions_unique_per_league() {
        let db = test_db();
        let league = sample_league(&db);
        let a = join(&db, league.id, 1, ParticipantStatus::Active);
        let b = join(&db, league.id, 2, ParticipantStatus::Active);

        let conn = db.conn();
        queries::assign_draft_position(&conn, a.id, 1).unwrap();
        assert!(queries::assign_draft_position(&conn, b.id, 1).is_err());
    }

    #[test]
    fn draft_position_is_assigned_once() {
        let db = test_db();
        let league = sample_league(&db);
        let a = join(&db, league.id, 1, ParticipantStatus::Active);

        {
            let conn = db.conn();
            queries::assign_draft_position(&conn, a.id, 2).unwrap();
            queries::assign_draft_position(&conn, a.id, 5).unwrap();
        }
        let seated = db.participants(league.id).unwrap();
        assert_eq!(seated[0].draft_position, Some(2));
    }

    #[test]
    fn standings_order_by_points_then_rank() {
        let db = test_db();
        let league = sample_league(&db);
        let a = join(&db, league.id, 1, ParticipantStatus::Active);
        let b = join(&db, league.id, 2, ParticipantStatus::Active);
        let c = join(&db, league.id, 3, ParticipantStatus::Active);
        {
            let conn = db.conn();
            let score = "UPDATE participants SET points = ?2, rank = ?3 WHERE id = ?1";
            conn.execute(score, params![a.id, 80.5, 2]).unwrap();
            conn.execute(score, params![b.id, 120.0, 1]).unwrap();
            conn.execute(score, params![c.id, 80.5, 1]).unwrap();
        }
        let order: Vec<_> = db.standings(league.id).unwrap().iter().map(|p| p.id).collect();
        assert_eq!(order, vec![b.id, c.id, a.id]);
    }

    // ------------------------------------------------------------------
    // Players
    // ------------------------------------------------------------------

    #[test]
    fn upsert_player_returns_same_id() {
        let db = test_db();
        let id1 = db.upsert_player(&player("Puka Nacua")).unwrap();
        let id2 = db
            .upsert_player(&NewPlayer {
                position: "TE".into(),
                ..player("Puka Nacua")
            })
            .unwrap();
        assert_eq!(id1, id2);
        assert_eq!(db.player(id1).unwrap().unwrap().position, "TE");
        assert!(db.player_exists(id1).unwrap());
        assert!(!db.player_exists(id1 + 100).unwrap());
    }

    #[test]
    fn import_players_batch() {
        let db = test_db();
        let ids = db
            .import_players(&[player("A"), player("B"), player("C")])
            .unwrap();
        assert_eq!(ids.len(), 3);
        assert!(ids.iter().all(|id| db.player_exists(*id).unwrap()));
    }

    // ------------------------------------------------------------------
    // Picks and matches: constraint backstops
    // ------------------------------------------------------------------

    #[test]
    fn pick_number_and_player_unique_per_league() {
        let db = test_db();
        let league = sample_league(&db);
        let a = join(&db, league.id, 1, ParticipantStatus::Active);
        let p1 = db.upsert_player(&player("One")).unwrap();
        let p2 = db.upsert_player(&player("Two")).unwrap();

        let conn = db.conn();
        queries::insert_pick(&conn, league.id, a.id, p1, 1, 1).unwrap();
        assert!(queries::insert_pick(&conn, league.id, a.id, p2, 1, 1).is_err());
        assert!(queries::insert_pick(&conn, league.id, a.id, p1, 2, 1).is_err());
    }

    #[test]
    fn picks_require_known_player() {
        let db = test_db();
        let league = sample_league(&db);
        let a = join(&db, league.id, 1, ParticipantStatus::Active);
        let conn = db.conn();
        assert!(queries::insert_pick(&conn, league.id, a.id, 9999, 1, 1).is_err());
    }

    #[test]
    fn pick_counter_compare_and_swap() {
        let db = test_db();
        let league = sample_league(&db);
        let conn = db.conn();
        queries::mark_draft_started(&conn, league.id, 2, 3).unwrap();

        assert!(queries::advance_pick_counter(&conn, league.id, 1).unwrap());
        // A second writer still holding the stale value loses.
        assert!(!queries::advance_pick_counter(&conn, league.id, 1).unwrap());
        assert!(queries::advance_pick_counter(&conn, league.id, 2).unwrap());

        let league = queries::load_league(&conn, league.id).unwrap().unwrap();
        assert_eq!(league.current_pick_number, 3);
        assert_eq!(league.status, LeagueStatus::Active);
    }

    #[test]
    fn transaction_rolls_back_on_error() {
        let db = test_db();
        let league = sample_league(&db);

        let result: std::result::Result<(), crate::DraftError> = db.transaction(|tx| {
            queries::mark_draft_started(tx, league.id, 4, 2)?;
            Err(crate::DraftError::LeagueNotFound(league.id))
        });
        assert!(result.is_err());

        let league = db.league(league.id).unwrap().unwrap();
        assert_eq!(league.draft_status, DraftStatus::Pending);
        assert_eq!(league.draft_participant_count, 0);
    }

    #[test]
    fn matches_filtered_by_week_and_participant() {
        let db = test_db();
        let league = sample_league(&db);
        let ids: Vec<_> = (1..=4)
            .map(|u| join(&db, league.id, u, ParticipantStatus::Active).id)
            .collect();
        let week = |w: u32, n: u32, h: usize, a: usize| NewMatch {
            week_number: w,
            match_number: n,
            home_participant_id: ids[h],
            away_participant_id: ids[a],
            start_date: opening_day(),
            end_date: opening_day(),
        };
        {
            let conn = db.conn();
            queries::insert_match(&conn, league.id, &week(1, 1, 0, 3)).unwrap();
            queries::insert_match(&conn, league.id, &week(1, 2, 1, 2)).unwrap();
            queries::insert_match(&conn, league.id, &week(2, 1, 0, 2)).unwrap();
        }

        assert_eq!(db.matches(league.id).unwrap().len(), 3);
        assert_eq!(db.matches_for_week(league.id, 1).unwrap().len(), 2);
        let first = db.matches_for_participant(league.id, ids[0]).unwrap();
        assert_eq!(first.len(), 2);
        assert!(first.iter().all(|m| m.involves(ids[0])));

        assert_eq!(db.delete_schedule(league.id).unwrap(), 3);
        assert!(db.matches(league.id).unwrap().is_empty());
    }

    #[test]
    fn match_slot_unique_and_no_self_play() {
        let db = test_db();
        let league = sample_league(&db);
        let a = join(&db, league.id, 1, ParticipantStatus::Active).id;
        let b = join(&db, league.id, 2, ParticipantStatus::Active).id;
        let m = NewMatch {
            week_number: 1,
            match_number: 1,
            home_participant_id: a,
            away_participant_id: b,
            start_date: opening_day(),
            end_date: opening_day(),
        };
        let conn = db.conn();
        queries::insert_match(&conn, league.id, &m).unwrap();
        assert!(queries::insert_match(&conn, league.id, &m).is_err());
        let self_play = NewMatch {
            match_number: 2,
            away_participant_id: a,
            ..m
        };
        assert!(queries::insert_match(&conn, league.id, &self_play).is_err());
    }
}
