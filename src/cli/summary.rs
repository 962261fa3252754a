//! The `summary` command: print what a game log recorded.

use std::path::Path;

use skirmish::journal::Journal;

use crate::cli::CliError;

/// Execute the summary command.
pub(crate) fn execute(log_path: &Path) -> Result<(), CliError> {
    let log = Journal::load(log_path)?;

    println!("turns played:    {}", log.frames.len());
    println!("unit limit/turn: {}", log.unit_limit_turn);
    println!("unit limit/game: {}", log.unit_limit_game);

    match log.results {
        Some(results) => {
            for (index, result) in results.iter().enumerate() {
                println!(
                    "player {}:        score {} ({})",
                    index + 1,
                    result.score,
                    result.status
                );
            }
        }
        None => println!("no results recorded (game did not finish)"),
    }

    if let Some(last) = log.frames.last() {
        println!(
            "final roster:    {} actors, money {:?}, scores {:?}",
            last.actors.len(),
            last.money,
            last.scores
        );
    }

    Ok(())
}
