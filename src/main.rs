use anyhow::{Context, Result};
use clap::{Parser, Subcommand};

use chess_club_td::fetch::Fetcher;
use chess_club_td::{api, live, ratings, report};

#[derive(Parser)]
#[command(name = "chess-club-td")]
#[command(about = "Query live chess club tournament state", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Show event details and a registration summary
    Event {
        /// Club event id
        event_id: i64,
    },

    /// List entrants grouped by section
    Entries {
        /// Club event id
        event_id: i64,
    },

    /// Show current pairings (or predicted round-1 pairings)
    Pairings {
        /// Club event id
        event_id: i64,
    },

    /// Show standings as of the current round
    Standings {
        /// Club event id
        event_id: i64,
    },

    /// Estimate a member's post-event regular rating
    Estimate {
        /// USCF member id of the player
        member_id: u64,

        /// Opponent member ids, one per game played
        #[arg(long = "opponent", required = true)]
        opponents: Vec<u64>,

        /// Total score across those games (each game scores 0, 0.5, or 1)
        #[arg(long)]
        score: f64,
    },
}

fn main() -> Result<()> {
    env_logger::init();

    let cli = Cli::parse();
    let fetcher = Fetcher::new().context("Failed to create HTTP client")?;

    match cli.command {
        Commands::Event { event_id } => {
            let detail = api::fetch_event_detail(&fetcher, event_id)
                .context("Failed to fetch event detail")?;
            print!("{}", report::render_event(&detail));
        }
        Commands::Entries { event_id } => {
            let tournament = live::fetch_tournament(&fetcher, event_id)
                .context("Failed to fetch tournament")?;
            print!("{}", report::render_entries(&tournament));
        }
        Commands::Pairings { event_id } => {
            let tournament = live::fetch_tournament(&fetcher, event_id)
                .context("Failed to fetch tournament")?;
            print!("{}", report::render_pairings(&tournament));
        }
        Commands::Standings { event_id } => {
            let tournament = live::fetch_tournament(&fetcher, event_id)
                .context("Failed to fetch tournament")?;
            print!("{}", report::render_standings(&tournament));
        }
        Commands::Estimate {
            member_id,
            opponents,
            score,
        } => {
            let estimate = ratings::estimate_for_member(&fetcher, member_id, &opponents, score)
                .context("Failed to estimate rating")?;
            println!("Estimated post-event regular rating: {}", estimate.round());
        }
    }

    Ok(())
}
