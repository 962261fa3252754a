//! The turn loop.
//!
//! The orchestrator composes the timer, the per-agent channels, and the
//! world. It runs blocking on one dedicated thread and is the only thing
//! that ever mutates the world. Everything another thread may touch (the
//! wall-clock expiry, cancellation) goes through [`CancelToken`] flags
//! observed at turn boundaries.
//!
//! A player that breaks the rules (budget overrun, silence, garbage) is
//! faulted: sticky `RUNTIME_ERROR` status, no further transport I/O, no
//! further commands. The other player's game continues unaffected; the
//! faulted player's remaining actors keep executing their last orders
//! under the normal world rules.

use std::fmt;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::error::FaultKind;
use crate::journal::Journal;
use crate::timer::{CancelToken, Timer};
use crate::transport::{HostChannel, Slot, TransportError};
use crate::world::{Command, PlayerId, World};

/// Score bonus that decides the game when a player loses every tower.
///
/// Results carry only scores and statuses, so the tower-wipe win is made
/// visible to consumers through the score comparison.
const VICTORY_BONUS: i64 = 1_000_000;

/// Match-level tunables.
#[derive(Debug, Clone, Copy)]
pub struct MatchConfig {
    /// Turn limit.
    pub max_turns: u32,
    /// Per-turn compute-unit ceiling.
    pub unit_limit_turn: u64,
    /// Per-game compute-unit ceiling.
    pub unit_limit_game: u64,
    /// Wall-clock allowance for each reply.
    pub turn_timeout: Duration,
    /// Wall-clock budget for the whole game.
    pub game_duration: Duration,
}

impl Default for MatchConfig {
    fn default() -> Self {
        Self {
            max_turns: 500,
            unit_limit_turn: 5_000_000,
            unit_limit_game: 1_000_000_000,
            turn_timeout: Duration::from_secs(1),
            game_duration: Duration::from_secs(90),
        }
    }
}

/// How a player's game ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PlayerStatus {
    /// Played to a decided end.
    Normal,
    /// Scores were level (or both sides lost their towers together).
    Tie,
    /// Disqualified: budget overrun, timeout, garbage, or process failure.
    RuntimeError,
}

impl fmt::Display for PlayerStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PlayerStatus::Normal => write!(f, "NORMAL"),
            PlayerStatus::Tie => write!(f, "TIE"),
            PlayerStatus::RuntimeError => write!(f, "RUNTIME_ERROR"),
        }
    }
}

/// Final outcome for one player.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlayerResult {
    /// Final score. The higher score wins.
    pub score: i64,
    /// Final status.
    pub status: PlayerStatus,
}

/// Requests a cooperative stop of the turn loop.
///
/// Cloneable and callable from any thread. The loop finishes the turn it
/// is in and exits; nothing is interrupted by force. When the cancellation
/// was caused by one player's process failing, the caller overrides that
/// player's status afterwards.
#[derive(Debug, Clone)]
pub struct CancelHandle {
    token: CancelToken,
}

impl CancelHandle {
    /// Wrap a token as a cancel handle.
    #[must_use]
    pub const fn new(token: CancelToken) -> Self {
        Self { token }
    }

    /// Request the stop. Idempotent.
    pub fn cancel(&self) {
        info!("cancellation requested");
        self.token.set();
    }
}

/// Per-player budget accounting. Written only by the orchestrator thread.
#[derive(Debug, Clone, Copy, Default)]
struct Ledger {
    /// Units reported for the current turn.
    turn_units: u64,
    /// Units reported over the whole game. Never decreases.
    game_units: u64,
    /// Sticky fault flag.
    faulted: bool,
}

/// Drives a game to completion.
#[derive(Debug)]
pub struct Orchestrator<S> {
    world: World,
    channels: [HostChannel<S>; 2],
    config: MatchConfig,
    timer: Timer,
    halt: CancelToken,
    ledgers: [Ledger; 2],
    map_sent: [bool; 2],
}

impl<S: Slot> Orchestrator<S> {
    /// Compose a game from its parts.
    #[must_use]
    pub fn new(world: World, channels: [HostChannel<S>; 2], config: MatchConfig) -> Self {
        Self {
            world,
            channels,
            config,
            timer: Timer::new(),
            halt: CancelToken::new(),
            ledgers: [Ledger::default(); 2],
            map_sent: [false; 2],
        }
    }

    /// Handle for stopping the loop from another thread.
    #[must_use]
    pub fn cancel_handle(&self) -> CancelHandle {
        CancelHandle::new(self.halt.clone())
    }

    /// Run the game to completion.
    ///
    /// Blocks until the turn limit, the wall-clock budget, a tower wipe, or
    /// a cancellation ends it. Frames are appended to `journal` as they are
    /// produced; the final results are attached to it before returning.
    pub fn run(mut self, journal: &mut Journal) -> [PlayerResult; 2] {
        let expiry = self.halt.clone();
        let armed = self.timer.start(self.config.game_duration, move || {
            info!("wall-clock budget exhausted");
            expiry.set();
        });
        if !armed {
            warn!("deadline timer already armed; reusing the pending deadline");
        }

        let mut wiped_together = false;
        let mut wipe_winner: Option<PlayerId> = None;

        while self.world.turn() < self.config.max_turns && !self.halt.is_set() {
            let commands = self.exchange();
            let frame = self.world.advance(&commands);
            debug!(turn = frame.turn, "turn complete");
            journal.record(frame);

            let towers = [
                self.world.tower_count(PlayerId::One),
                self.world.tower_count(PlayerId::Two),
            ];
            match towers {
                [0, 0] => {
                    wiped_together = true;
                    break;
                }
                [0, _] => {
                    wipe_winner = Some(PlayerId::Two);
                    break;
                }
                [_, 0] => {
                    wipe_winner = Some(PlayerId::One);
                    break;
                }
                _ => {}
            }
        }

        if let Some(winner) = wipe_winner {
            info!(winner = winner.index(), "all opposing towers destroyed");
            self.world.add_score(winner, VICTORY_BONUS);
        }

        for channel in &mut self.channels {
            channel.shutdown();
        }

        let scores = self.world.scores();
        let level = wiped_together || scores[0] == scores[1];
        let results = [PlayerId::One, PlayerId::Two].map(|player| {
            let idx = player.index();
            let status = if self.ledgers[idx].faulted {
                PlayerStatus::RuntimeError
            } else if level {
                PlayerStatus::Tie
            } else {
                PlayerStatus::Normal
            };
            PlayerResult {
                score: scores[idx],
                status,
            }
        });

        journal.set_results(results);
        info!(
            turns = self.world.turn(),
            score_one = results[0].score,
            score_two = results[1].score,
            "game over"
        );
        results
    }

    /// Run one turn's view/command exchange with both live players.
    fn exchange(&mut self) -> [Vec<Command>; 2] {
        let mut commands: [Vec<Command>; 2] = [Vec::new(), Vec::new()];

        for player in PlayerId::BOTH {
            let idx = player.index();
            if self.ledgers[idx].faulted {
                continue;
            }

            let view = self.world.view(player, !self.map_sent[idx]);
            self.map_sent[idx] = true;
            if let Err(error) = self.channels[idx].publish(&view) {
                warn!(player = idx, %error, "view publish failed");
                self.fault(player, FaultKind::Unresponsive);
                continue;
            }

            match self.channels[idx].collect(self.config.turn_timeout, &self.halt) {
                Ok(reply) => {
                    let ledger = &mut self.ledgers[idx];
                    ledger.turn_units = reply.units_used;
                    ledger.game_units = ledger.game_units.saturating_add(reply.units_used);
                    if ledger.turn_units > self.config.unit_limit_turn
                        || ledger.game_units > self.config.unit_limit_game
                    {
                        // The crossing turn's commands are discarded.
                        self.fault(player, FaultKind::BudgetExceeded);
                    } else {
                        commands[idx] = reply.commands;
                    }
                }
                Err(TransportError::Cancelled) => {
                    debug!(player = idx, "reply wait abandoned by cancellation");
                }
                Err(TransportError::TimedOut) => {
                    self.fault(player, FaultKind::Unresponsive);
                }
                Err(error) => {
                    warn!(player = idx, %error, "reply unusable");
                    self.fault(player, FaultKind::MalformedReply);
                }
            }
        }

        commands
    }

    /// Set the sticky fault flag for a player.
    fn fault(&mut self, player: PlayerId, kind: FaultKind) {
        let ledger = &mut self.ledgers[player.index()];
        if !ledger.faulted {
            warn!(player = player.index(), %kind, "player disqualified");
            ledger.faulted = true;
        }
    }
}
