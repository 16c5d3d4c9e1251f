// draftboard: administrative command line over one league database.
//
// Startup sequence:
// 1. Initialize tracing (stderr; stdout carries JSON results)
// 2. Load config, copying defaults on first run
// 3. Open database
// 4. Dispatch the subcommand

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use chrono::NaiveDate;
use clap::{Args, Parser, Subcommand};
use serde::Serialize;
use serde_json::json;
use tracing::info;

use draftboard_advisor::AdvisorClient;
use draftboard_core::advisor::Suggestion;
use draftboard_core::config::{self, Config};
use draftboard_core::db::Database;
use draftboard_core::draft::DraftCoordinator;
use draftboard_core::league::{NewLeague, NewParticipant, ParticipantRole, ParticipantStatus};
use draftboard_core::player_pool::{self, NewPlayer};
use draftboard_core::schedule::ScheduleGenerator;
use draftboard_core::{LeagueId, ParticipantId, PlayerId};

#[derive(Parser)]
#[command(name = "draftboard")]
#[command(about = "Snake drafts and head-to-head schedules for fantasy leagues")]
#[command(version)]
struct Cli {
    /// Directory holding `config/` and `defaults/` (defaults to the current directory)
    #[arg(long, global = true)]
    base_dir: Option<PathBuf>,

    /// Database file, overriding `database.path` from config
    #[arg(long, global = true)]
    db: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Create leagues and manage membership
    #[command(subcommand)]
    League(LeagueCommand),

    /// Maintain the shared player pool
    #[command(subcommand)]
    Player(PlayerCommand),

    /// Run a league's draft
    #[command(subcommand)]
    Draft(DraftCommand),

    /// Build and inspect the head-to-head calendar
    #[command(subcommand)]
    Schedule(ScheduleCommand),
}

#[derive(Subcommand)]
enum LeagueCommand {
    /// Create a league with a pending draft
    Create {
        name: String,
        #[arg(long, default_value_t = 2)]
        min: u32,
        #[arg(long, default_value_t = 12)]
        max: u32,
        /// First day of week 1 (YYYY-MM-DD)
        #[arg(long)]
        start: NaiveDate,
    },

    /// Add a user to a league
    Join {
        league: LeagueId,
        #[arg(long)]
        user: i64,
        #[arg(long)]
        team: String,
        #[arg(long, value_parser = parse_role, default_value = "player")]
        role: ParticipantRole,
        #[arg(long, value_parser = parse_status, default_value = "active")]
        status: ParticipantStatus,
    },

    /// Change a participant's status (activate, ban)
    SetStatus {
        participant: ParticipantId,
        #[arg(value_parser = parse_status)]
        status: ParticipantStatus,
    },

    /// Show the league, its participants and standings
    Status { league: LeagueId },
}

#[derive(Subcommand)]
enum PlayerCommand {
    /// Add or update one player
    Add {
        name: String,
        position: String,
        #[arg(default_value = "")]
        team: String,
    },

    /// Import players from a `name,position,team` CSV file
    Import { path: PathBuf },
}

#[derive(Args)]
struct LeagueArg {
    league: LeagueId,
}

#[derive(Subcommand)]
enum DraftCommand {
    /// Seat active participants and open the draft
    Start(LeagueArg),

    /// Submit a pick for the participant on the clock
    Pick {
        league: LeagueId,
        participant: ParticipantId,
        player: PlayerId,
    },

    /// Show whose turn it is
    Turn(LeagueArg),

    /// Finish the draft before all rounds are used
    End(LeagueArg),

    /// List every pick made so far
    Board(LeagueArg),

    /// Ask the ranking service for a suggestion
    Suggest {
        league: LeagueId,
        participant: ParticipantId,
    },
}

#[derive(Subcommand)]
enum ScheduleCommand {
    /// Write the round-robin calendar for a finished draft
    Generate(LeagueArg),

    /// Show the calendar that would be generated, without writing it
    Preview(LeagueArg),

    /// List stored matches
    Show {
        league: LeagueId,
        #[arg(long)]
        week: Option<u32>,
        #[arg(long, conflicts_with = "week")]
        participant: Option<ParticipantId>,
    },

    /// Delete a league's calendar so it can be generated again
    Clear(LeagueArg),
}

fn parse_role(s: &str) -> Result<ParticipantRole, String> {
    ParticipantRole::parse(s).ok_or_else(|| format!("unknown role `{s}` (owner, admin, player)"))
}

fn parse_status(s: &str) -> Result<ParticipantStatus, String> {
    ParticipantStatus::parse(s)
        .ok_or_else(|| format!("unknown status `{s}` (pending, active, banned)"))
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_tracing()?;
    let cli = Cli::parse();

    let base_dir = match &cli.base_dir {
        Some(dir) => dir.clone(),
        None => std::env::current_dir().context("failed to resolve current directory")?,
    };
    let config = config::load_config(&base_dir).context("failed to load configuration")?;

    let db_path = match &cli.db {
        Some(path) => path.clone(),
        None => base_dir.join(&config.database.path).display().to_string(),
    };
    let db = Arc::new(Database::open(&db_path).context("failed to open database")?);
    info!("Database opened at {}", db_path);

    match cli.command {
        Commands::League(cmd) => run_league(&db, cmd),
        Commands::Player(cmd) => run_player(&db, cmd),
        Commands::Draft(cmd) => run_draft(db, &config, cmd).await,
        Commands::Schedule(cmd) => run_schedule(db, &config, cmd),
    }
}

// ---------------------------------------------------------------------------
// Subcommands
// ---------------------------------------------------------------------------

fn run_league(db: &Database, cmd: LeagueCommand) -> anyhow::Result<()> {
    match cmd {
        LeagueCommand::Create {
            name,
            min,
            max,
            start,
        } => {
            anyhow::ensure!(min <= max, "--min ({min}) exceeds --max ({max})");
            let league = db.create_league(&NewLeague {
                name,
                min_participants: min,
                max_participants: max,
                start_date: start,
            })?;
            print_json(&league)
        }
        LeagueCommand::Join {
            league,
            user,
            team,
            role,
            status,
        } => {
            let record = db
                .league(league)?
                .with_context(|| format!("league {league} not found"))?;
            let seated = db.participants(league)?.len() as u32;
            anyhow::ensure!(
                seated < record.max_participants,
                "league {league} is full ({} participants)",
                record.max_participants
            );
            let participant = db.add_participant(
                league,
                &NewParticipant {
                    user_id: user,
                    role,
                    status,
                    team_name: team,
                },
            )?;
            print_json(&participant)
        }
        LeagueCommand::SetStatus {
            participant,
            status,
        } => {
            anyhow::ensure!(
                db.set_participant_status(participant, status)?,
                "participant {participant} not found"
            );
            print_json(&json!({ "participant_id": participant, "status": status }))
        }
        LeagueCommand::Status { league } => {
            let record = db
                .league(league)?
                .with_context(|| format!("league {league} not found"))?;
            print_json(&json!({
                "league": record,
                "participants": db.participants(league)?,
                "standings": db.standings(league)?,
            }))
        }
    }
}

fn run_player(db: &Database, cmd: PlayerCommand) -> anyhow::Result<()> {
    match cmd {
        PlayerCommand::Add {
            name,
            position,
            team,
        } => {
            let id = db.upsert_player(&NewPlayer {
                name,
                position: position.to_uppercase(),
                team,
            })?;
            print_json(&db.player(id)?)
        }
        PlayerCommand::Import { path } => {
            let players = player_pool::load_players_csv(&path)?;
            let ids = db.import_players(&players)?;
            info!("Imported {} players from {}", ids.len(), path.display());
            print_json(&json!({ "imported": ids.len() }))
        }
    }
}

async fn run_draft(db: Arc<Database>, config: &Config, cmd: DraftCommand) -> anyhow::Result<()> {
    let advisor = AdvisorClient::from_config(&config.advisor)?;
    let coordinator = DraftCoordinator::new(db, config).with_advisor(Arc::new(advisor));

    match cmd {
        DraftCommand::Start(LeagueArg { league }) => print_json(&coordinator.start_draft(league)?),
        DraftCommand::Pick {
            league,
            participant,
            player,
        } => print_json(&coordinator.submit_pick(league, participant, player)?),
        DraftCommand::Turn(LeagueArg { league }) => print_json(&coordinator.current_turn(league)?),
        DraftCommand::End(LeagueArg { league }) => print_json(&coordinator.end_draft(league)?),
        DraftCommand::Board(LeagueArg { league }) => print_json(&coordinator.draft_board(league)?),
        DraftCommand::Suggest {
            league,
            participant,
        } => match coordinator.suggest_pick(league, participant).await {
            Suggestion::Available(ranked) => print_json(&ranked),
            Suggestion::Unavailable => print_json(&json!({ "suggestion": null })),
        },
    }
}

fn run_schedule(db: Arc<Database>, config: &Config, cmd: ScheduleCommand) -> anyhow::Result<()> {
    let generator = ScheduleGenerator::new(db.clone(), config);

    match cmd {
        ScheduleCommand::Generate(LeagueArg { league }) => {
            print_json(&generator.generate_schedule(league)?)
        }
        ScheduleCommand::Preview(LeagueArg { league }) => {
            print_json(&generator.preview_schedule(league)?)
        }
        ScheduleCommand::Show {
            league,
            week,
            participant,
        } => {
            let matches = match (week, participant) {
                (Some(week), _) => db.matches_for_week(league, week)?,
                (None, Some(participant)) => db.matches_for_participant(league, participant)?,
                (None, None) => db.matches(league)?,
            };
            print_json(&matches)
        }
        ScheduleCommand::Clear(LeagueArg { league }) => {
            let deleted = db.delete_schedule(league)?;
            info!("Cleared {} matches from league {}", deleted, league);
            print_json(&json!({ "deleted": deleted }))
        }
    }
}

fn print_json<T: Serialize>(value: &T) -> anyhow::Result<()> {
    let text = serde_json::to_string_pretty(value).context("failed to serialize output")?;
    println!("{text}");
    Ok(())
}

/// Initialize tracing on stderr so stdout stays machine-readable.
fn init_tracing() -> anyhow::Result<()> {
    use tracing_subscriber::fmt;
    use tracing_subscriber::EnvFilter;

    let subscriber = fmt::Subscriber::builder()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("draftboard=info,warn")),
        )
        .with_writer(std::io::stderr)
        .with_ansi(false)
        .with_target(true)
        .with_line_number(true)
        .finish();

    tracing::subscriber::set_global_default(subscriber)
        .context("failed to set tracing subscriber")?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn parses_pick_command() {
        let cli = Cli::try_parse_from([
            "draftboard", "--db", ":memory:", "draft", "pick", "1", "4", "77",
        ])
        .unwrap();
        assert_eq!(cli.db.as_deref(), Some(":memory:"));
        match cli.command {
            Commands::Draft(DraftCommand::Pick {
                league,
                participant,
                player,
            }) => assert_eq!((league, participant, player), (1, 4, 77)),
            _ => panic!("expected draft pick"),
        }
    }

    #[test]
    fn parses_league_create_date() {
        let cli = Cli::try_parse_from([
            "draftboard", "league", "create", "Sunday Scaries", "--start", "2026-09-10",
        ])
        .unwrap();
        match cli.command {
            Commands::League(LeagueCommand::Create { start, min, max, .. }) => {
                assert_eq!(start, NaiveDate::from_ymd_opt(2026, 9, 10).unwrap());
                assert_eq!((min, max), (2, 12));
            }
            _ => panic!("expected league create"),
        }
    }

    #[test]
    fn rejects_unknown_role() {
        let result = Cli::try_parse_from([
            "draftboard", "league", "join", "1", "--user", "5", "--team", "X", "--role", "captain",
        ]);
        assert!(result.is_err());
    }

    #[test]
    fn week_and_participant_filters_conflict() {
        let result = Cli::try_parse_from([
            "draftboard", "schedule", "show", "1", "--week", "2", "--participant", "3",
        ]);
        assert!(result.is_err());
    }
}
