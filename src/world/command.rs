//! Player commands and their rejection reasons.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::world::actor::{ActorId, PlayerId};
use crate::world::map::Coord;

/// An instruction issued by an agent for one of its units.
///
/// Commands are always validated against the current world state before they
/// touch anything; a rejected command is recorded in the frame and dropped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Command {
    /// Order a soldier to walk to a destination.
    Move {
        /// The soldier to move.
        actor: ActorId,
        /// Where to go.
        dest: Coord,
    },
    /// Order a soldier to close on a hostile actor and attack it.
    Attack {
        /// The soldier doing the attacking.
        actor: ActorId,
        /// The hostile actor to bring down.
        target: ActorId,
    },
    /// Erect a new tower at a position, paying its build cost.
    BuildTower {
        /// Where to build.
        position: Coord,
    },
}

/// Why a command was rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CommandError {
    /// The referenced actor id does not exist.
    UnknownActor,
    /// The referenced actor is dead or waiting to respawn.
    DeadActor,
    /// The referenced actor belongs to the other player.
    WrongOwner,
    /// Towers cannot take movement or attack orders.
    NotASoldier,
    /// The destination or build position is off the map.
    OffMap,
    /// The target is unknown, friendly, or cannot currently be harmed.
    InvalidTarget,
    /// Not enough money for the build cost.
    InsufficientFunds,
    /// The player already fields the maximum number of towers.
    TowerLimit,
}

impl fmt::Display for CommandError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CommandError::UnknownActor => write!(f, "no such actor"),
            CommandError::DeadActor => write!(f, "actor is dead or respawning"),
            CommandError::WrongOwner => write!(f, "actor belongs to the opponent"),
            CommandError::NotASoldier => write!(f, "towers cannot take orders"),
            CommandError::OffMap => write!(f, "position is off the map"),
            CommandError::InvalidTarget => write!(f, "target is invalid"),
            CommandError::InsufficientFunds => write!(f, "insufficient funds"),
            CommandError::TowerLimit => write!(f, "tower limit reached"),
        }
    }
}

impl std::error::Error for CommandError {}

/// A command that failed validation, as recorded in the frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RejectedCommand {
    /// The player that issued the command.
    pub player: PlayerId,
    /// The offending command.
    pub command: Command,
    /// Why it was dropped.
    pub error: CommandError,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_command_json_roundtrip() {
        let cmd = Command::Attack {
            actor: 3,
            target: 7,
        };
        let json = serde_json::to_string(&cmd).expect("serialize");
        let back: Command = serde_json::from_str(&json).expect("deserialize");
        assert_eq!(cmd, back);
    }

    #[test]
    fn test_error_display() {
        assert_eq!(
            CommandError::InsufficientFunds.to_string(),
            "insufficient funds"
        );
    }
}
