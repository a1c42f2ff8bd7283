use battleship_arena::{init_logging, prelude::*};
use clap::{Parser, Subcommand};
use rand::RngCore;

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List the available levels and their fleets.
    Levels,
    /// Play a match between two AI players and print every notification.
    Simulate {
        #[arg(long, env = "ARENA_LEVEL", default_value_t = 1)]
        level: u32,
        #[arg(
            long,
            env = "ARENA_SEED",
            help = "Fix RNG seed for reproducible games (e.g., --seed 12345)"
        )]
        seed: Option<u64>,
    },
}

/// Prints each notification as one JSON line.
struct JsonLines;

#[async_trait::async_trait]
impl NotificationHandler for JsonLines {
    async fn handle(&mut self, event: GameEvent) -> anyhow::Result<()> {
        println!("{}", serde_json::to_string(&event)?);
        Ok(())
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_logging();
    let cli = Cli::parse();
    let levels = LevelsRepository::new();

    match cli.command {
        Commands::Levels => {
            for level in levels.levels() {
                let fleet: Vec<String> = level
                    .fleet
                    .iter()
                    .map(|(class, count)| format!("{}x {}", count, class.name()))
                    .collect();
                println!(
                    "level {}: {}x{} board, {}",
                    level.id,
                    level.battlefield_size,
                    level.battlefield_size,
                    fleet.join(", ")
                );
            }
        }
        Commands::Simulate { level, seed } => {
            let level = levels
                .level(level)
                .ok_or_else(|| anyhow::anyhow!("unknown level {}", level))?;
            let seed = seed.unwrap_or_else(|| rand::rng().next_u64());
            log::info!("simulating level {} with seed {}", level.id, seed);

            let (report, _) = simulate(level, seed, JsonLines).await?;
            print_report(&report);
        }
    }
    Ok(())
}

fn print_report(report: &SimulationReport) {
    for board in &report.boards {
        eprintln!("{}", board);
    }
    match &report.winner {
        Some(winner) => eprintln!(
            "match {} won by {} after {} shots",
            report.session, winner, report.shots
        ),
        None => eprintln!("match {} ended without a winner", report.session),
    }
}
