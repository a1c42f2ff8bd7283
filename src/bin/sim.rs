use battleship_arena::{prelude::*, simulation::CollectingHandler};
use serde_json::json;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args: Vec<String> = std::env::args().collect();
    if args.len() < 2 || args.len() > 3 {
        eprintln!("Usage: {} <seed> [level]", args[0]);
        std::process::exit(1);
    }
    let seed: u64 = args[1].parse()?;
    let level_id: u32 = match args.get(2) {
        Some(arg) => arg.parse()?,
        None => 1,
    };

    let levels = LevelsRepository::new();
    let level = levels
        .level(level_id)
        .ok_or_else(|| anyhow::anyhow!("unknown level {}", level_id))?;

    let (report, handler) = simulate(level, seed, CollectingHandler::default()).await?;
    let hits = handler
        .events
        .iter()
        .filter(|e| matches!(e, GameEvent::GotHit { .. }))
        .count();

    let result = json!({
        "session": report.session,
        "level": report.level,
        "winner": report.winner,
        "shots": report.shots,
        "hits": hits,
        "events": report.events,
    });

    println!("{}", serde_json::to_string(&result)?);
    Ok(())
}
