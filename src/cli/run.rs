//! The `run` command: host one match.

use std::path::{Path, PathBuf};
use std::process::{Child, Command, Stdio};
use std::thread;
use std::time::Duration;

use rand::Rng;
use rand::distributions::Alphanumeric;

use skirmish::journal::Journal;
use skirmish::monitor::ProcessMonitor;
use skirmish::orchestrator::{MatchConfig, Orchestrator, PlayerResult, PlayerStatus};
use skirmish::transport::{HostChannel, ShmSlot, segment_name};
use skirmish::world::{PlayerId, SimplePlanner, World, WorldConfig};

use crate::cli::CliError;

/// Execute the run command.
pub(crate) fn execute(
    agents: &[PathBuf],
    turns: u32,
    turn_timeout_ms: u64,
    duration_s: u64,
    log_path: &Path,
) -> Result<(), CliError> {
    if agents.len() != 2 {
        return Err(CliError::new("exactly two agent executables are required"));
    }

    let config = MatchConfig {
        max_turns: turns,
        turn_timeout: Duration::from_millis(turn_timeout_ms),
        game_duration: Duration::from_secs(duration_s),
        ..MatchConfig::default()
    };

    // Session-unique channel names, one segment per agent.
    let session = session_name();
    let names = [PlayerId::One, PlayerId::Two].map(|player| segment_name(&session, player));
    let channels = {
        let [first, second] = &names;
        [
            HostChannel::new(ShmSlot::create(first)?),
            HostChannel::new(ShmSlot::create(second)?),
        ]
    };

    let world = World::new(WorldConfig::default(), Box::new(SimplePlanner))
        .ok_or_else(|| CliError::new("invalid world configuration"))?;
    let orchestrator = Orchestrator::new(world, channels, config);
    let handle = orchestrator.cancel_handle();

    // Each agent receives its channel name as its only argument.
    let children: Vec<Child> = agents
        .iter()
        .zip(&names)
        .map(|(agent, name)| {
            Command::new(agent)
                .arg(name)
                .stdin(Stdio::null())
                .spawn()
                .map_err(|e| CliError::new(format!("failed to spawn {}: {e}", agent.display())))
        })
        .collect::<Result<_, _>>()?;

    // The turn loop gets its own thread; this one supervises the agents.
    let mut journal = Journal::new(config.unit_limit_turn, config.unit_limit_game);
    let runner = thread::spawn(move || {
        let results = orchestrator.run(&mut journal);
        (results, journal)
    });

    let outcomes = ProcessMonitor::default().watch(children, &handle);

    let (mut results, mut journal) = runner
        .join()
        .map_err(|_| CliError::new("engine thread panicked"))?;

    // A crashed agent loses regardless of how the game itself wound down.
    for (result, outcome) in results.iter_mut().zip(&outcomes) {
        if outcome.failed {
            result.status = PlayerStatus::RuntimeError;
        }
    }

    journal.set_results(results);
    journal.save(log_path)?;

    print_results(&results);
    Ok(())
}

fn session_name() -> String {
    let suffix: String = rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(16)
        .map(char::from)
        .collect();
    format!("skirmish-{suffix}")
}

fn print_results(results: &[PlayerResult; 2]) {
    println!(
        "{} {} {} {}",
        results[0].score, results[0].status, results[1].score, results[1].status
    );
}
