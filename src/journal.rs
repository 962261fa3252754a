//! Persisted game record.
//!
//! The journal is the collaborator that receives one [`Frame`] per turn and
//! writes one structured record file when the game is over. Frames carry
//! id-keyed actor rosters, so consumers that diff successive frames do so
//! by actor identity.

use std::fmt;
use std::fs::File;
use std::io::{self, BufReader, BufWriter, Write};
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::orchestrator::PlayerResult;
use crate::world::Frame;

/// The complete on-disk record of one game.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GameLog {
    /// Per-turn compute-unit ceiling the game was played under.
    pub unit_limit_turn: u64,
    /// Per-game compute-unit ceiling the game was played under.
    pub unit_limit_game: u64,
    /// One frame per completed turn.
    pub frames: Vec<Frame>,
    /// Final results, once the game finished.
    pub results: Option<[PlayerResult; 2]>,
}

/// Errors from writing or reading a game log.
#[derive(Debug)]
pub enum JournalError {
    /// File system failure.
    Io(io::Error),
    /// The log contents were not valid.
    Format(serde_json::Error),
}

impl fmt::Display for JournalError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            JournalError::Io(e) => write!(f, "journal I/O failed: {e}"),
            JournalError::Format(e) => write!(f, "journal format invalid: {e}"),
        }
    }
}

impl std::error::Error for JournalError {}

impl From<io::Error> for JournalError {
    fn from(e: io::Error) -> Self {
        JournalError::Io(e)
    }
}

/// In-memory accumulator for the game record.
#[derive(Debug, Clone)]
pub struct Journal {
    log: GameLog,
}

impl Journal {
    /// Create an empty journal for a game played under the given ceilings.
    #[must_use]
    pub const fn new(unit_limit_turn: u64, unit_limit_game: u64) -> Self {
        Self {
            log: GameLog {
                unit_limit_turn,
                unit_limit_game,
                frames: Vec::new(),
                results: None,
            },
        }
    }

    /// Append one turn's frame.
    pub fn record(&mut self, frame: Frame) {
        self.log.frames.push(frame);
    }

    /// Attach (or replace) the final results.
    pub fn set_results(&mut self, results: [PlayerResult; 2]) {
        self.log.results = Some(results);
    }

    /// Frames recorded so far.
    #[must_use]
    pub fn frames(&self) -> &[Frame] {
        &self.log.frames
    }

    /// Number of turns recorded so far.
    #[must_use]
    pub fn turns_recorded(&self) -> usize {
        self.log.frames.len()
    }

    /// Serialize the record to a writer.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization or the underlying writer fails.
    pub fn write_to<W: Write>(&self, writer: W) -> Result<(), JournalError> {
        serde_json::to_writer(writer, &self.log).map_err(JournalError::Format)
    }

    /// Write the record file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be created or written.
    pub fn save(&self, path: &Path) -> Result<(), JournalError> {
        let file = File::create(path)?;
        let mut writer = BufWriter::new(file);
        self.write_to(&mut writer)?;
        writer.flush()?;
        Ok(())
    }

    /// Read a record file back.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be opened or is not a valid log.
    pub fn load(path: &Path) -> Result<GameLog, JournalError> {
        let file = File::open(path)?;
        serde_json::from_reader(BufReader::new(file)).map_err(JournalError::Format)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::orchestrator::PlayerStatus;
    use crate::world::{Command, SimplePlanner, World, WorldConfig};

    fn one_frame() -> Frame {
        let mut world =
            World::new(WorldConfig::default(), Box::new(SimplePlanner)).expect("valid config");
        world.advance(&[Vec::<Command>::new(), Vec::new()])
    }

    #[test]
    fn test_save_load_roundtrip() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("game.json");

        let mut journal = Journal::new(1000, 50_000);
        journal.record(one_frame());
        journal.set_results([
            PlayerResult {
                score: 300,
                status: PlayerStatus::Normal,
            },
            PlayerResult {
                score: 100,
                status: PlayerStatus::RuntimeError,
            },
        ]);
        journal.save(&path).expect("save");

        let log = Journal::load(&path).expect("load");
        assert_eq!(log.unit_limit_turn, 1000);
        assert_eq!(log.unit_limit_game, 50_000);
        assert_eq!(log.frames.len(), 1);
        let results = log.results.expect("results present");
        assert_eq!(results[0].score, 300);
        assert_eq!(results[1].status, PlayerStatus::RuntimeError);
    }

    #[test]
    fn test_frames_accumulate_in_order() {
        let mut journal = Journal::new(1, 1);
        journal.record(one_frame());
        journal.record(one_frame());
        assert_eq!(journal.turns_recorded(), 2);
        assert_eq!(journal.frames()[0].turn, 0);
    }

    #[test]
    fn test_load_rejects_garbage() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("bad.json");
        std::fs::write(&path, b"not a log").expect("write");
        assert!(matches!(
            Journal::load(&path),
            Err(JournalError::Format(_))
        ));
    }
}
