//! The per-turn record produced by one world tick.

use serde::{Deserialize, Serialize};

use crate::world::actor::{Actor, ActorId, ActorKind, ActorState, PlayerId};
use crate::world::command::RejectedCommand;
use crate::world::map::Coord;

/// Snapshot of one actor as it stood at the end of a tick.
///
/// Records are keyed by actor id, so consumers that diff successive frames
/// can attribute additions, removals, and changes by identity rather than
/// by position in the list.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct ActorRecord {
    /// Actor id.
    pub id: ActorId,
    /// Owning player.
    pub owner: PlayerId,
    /// Unit kind.
    pub kind: ActorKind,
    /// Hit points at end of tick.
    pub hp: i32,
    /// Position at end of tick.
    pub pos: Coord,
    /// State tag at end of tick.
    pub state: ActorState,
    /// Set on the single frame in which this actor died.
    pub is_dead: bool,
}

impl ActorRecord {
    /// Build a record from a live actor.
    #[must_use]
    pub fn from_actor(actor: &Actor, is_dead: bool) -> Self {
        Self {
            id: actor.id,
            owner: actor.owner,
            kind: actor.kind,
            hp: actor.hp,
            pos: actor.pos,
            state: actor.state,
            is_dead,
        }
    }
}

/// Everything that happened in one tick.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Frame {
    /// Turn number this frame belongs to.
    pub turn: u32,
    /// Post-tick roster, id-ordered. Actors that died this tick appear one
    /// last time with `is_dead` set.
    pub actors: Vec<ActorRecord>,
    /// Money balances after the tick, indexed by player.
    pub money: [i64; 2],
    /// Scores after the tick, indexed by player.
    pub scores: [i64; 2],
    /// Commands rejected during validation this tick.
    pub rejected: Vec<RejectedCommand>,
}

impl Frame {
    /// Look up an actor record by id.
    #[must_use]
    pub fn actor(&self, id: ActorId) -> Option<&ActorRecord> {
        self.actors.iter().find(|record| record.id == id)
    }

    /// Number of live towers a player fields in this frame.
    #[must_use]
    pub fn tower_count(&self, player: PlayerId) -> usize {
        self.actors
            .iter()
            .filter(|record| {
                record.owner == player && record.kind == ActorKind::Tower && !record.is_dead
            })
            .count()
    }
}
