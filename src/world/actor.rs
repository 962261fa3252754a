//! Actors and the arena that owns them.
//!
//! Every unit on the battlefield is one flat [`Actor`] record with a tagged
//! state; there is no type hierarchy. Cross-references (attack targets) are
//! expressed as ids so records never point at each other. The [`Arena`] owns
//! the id generator: ids are assigned monotonically and never reused within
//! a game.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::world::map::Coord;

/// One of the two competing players.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PlayerId {
    /// The first player.
    One,
    /// The second player.
    Two,
}

impl PlayerId {
    /// Both players, in turn-processing order.
    pub const BOTH: [PlayerId; 2] = [PlayerId::One, PlayerId::Two];

    /// Array index for per-player storage.
    #[must_use]
    pub const fn index(self) -> usize {
        match self {
            PlayerId::One => 0,
            PlayerId::Two => 1,
        }
    }

    /// The opposing player.
    #[must_use]
    pub const fn opponent(self) -> Self {
        match self {
            PlayerId::One => PlayerId::Two,
            PlayerId::Two => PlayerId::One,
        }
    }
}

/// Unique identifier for an actor. Never reused within a game.
pub type ActorId = u32;

/// What kind of unit an actor is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ActorKind {
    /// Mobile unit: moves, attacks, respawns after death.
    Soldier,
    /// Stationary unit: attacks anything in range, gone for good once
    /// destroyed.
    Tower,
}

/// The per-actor finite state tag. Exactly one state per actor at any time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ActorState {
    /// No order and no hostile in range.
    Idle,
    /// Advancing one step per turn toward the current order's destination.
    Moving,
    /// Dealing damage to the referenced target this turn.
    Attacking(ActorId),
    /// Hit points reached zero. Counts turns until respawn (soldiers only).
    Dead {
        /// Turns spent dead so far.
        turns: u32,
    },
    /// Back at the spawn point, invulnerable and inert until the window
    /// elapses.
    Respawning {
        /// Invulnerability turns remaining.
        remaining: u32,
    },
}

/// A standing order, kept until completed or replaced.
///
/// Orders outlive the turn that issued them: an actor whose player has
/// faulted keeps executing its last order under the normal state rules.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Order {
    /// Walk to the destination.
    MoveTo(Coord),
    /// Close on the target and attack it while it lives.
    Engage(ActorId),
}

/// One unit on the battlefield.
#[derive(Debug, Clone, Copy)]
pub struct Actor {
    /// Unique id, assigned by the arena.
    pub id: ActorId,
    /// Owning player.
    pub owner: PlayerId,
    /// Unit kind.
    pub kind: ActorKind,
    /// Current hit points.
    pub hp: i32,
    /// Maximum hit points.
    pub max_hp: i32,
    /// Current position.
    pub pos: Coord,
    /// Current state tag.
    pub state: ActorState,
    /// Standing order, if any.
    pub order: Option<Order>,
}

impl Actor {
    /// Whether this actor currently occupies the battlefield.
    ///
    /// Dead actors stay in the arena while they wait to respawn but are
    /// invisible to views, frames, and targeting.
    #[must_use]
    pub const fn is_active(&self) -> bool {
        !matches!(self.state, ActorState::Dead { .. })
    }

    /// Whether this actor can currently deal or take damage.
    ///
    /// Respawning actors are invulnerable and inert for the duration of
    /// their window.
    #[must_use]
    pub const fn is_combatant(&self) -> bool {
        !matches!(
            self.state,
            ActorState::Dead { .. } | ActorState::Respawning { .. }
        )
    }
}

/// Owner of all actors and of the id sequence.
#[derive(Debug, Default)]
pub struct Arena {
    next_id: ActorId,
    actors: BTreeMap<ActorId, Actor>,
}

impl Arena {
    /// Create an empty arena.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an actor, assigning it the next id in the sequence.
    pub fn spawn(
        &mut self,
        owner: PlayerId,
        kind: ActorKind,
        hp: i32,
        pos: Coord,
    ) -> ActorId {
        let id = self.next_id;
        self.next_id += 1;
        self.actors.insert(
            id,
            Actor {
                id,
                owner,
                kind,
                hp,
                max_hp: hp,
                pos,
                state: ActorState::Idle,
                order: None,
            },
        );
        id
    }

    /// Look up an actor by id.
    #[must_use]
    pub fn get(&self, id: ActorId) -> Option<&Actor> {
        self.actors.get(&id)
    }

    /// Look up an actor mutably by id.
    #[must_use]
    pub fn get_mut(&mut self, id: ActorId) -> Option<&mut Actor> {
        self.actors.get_mut(&id)
    }

    /// Remove an actor permanently. The id is not recycled.
    pub fn remove(&mut self, id: ActorId) {
        self.actors.remove(&id);
    }

    /// Iterate actors in ascending id order.
    pub fn iter(&self) -> impl Iterator<Item = &Actor> {
        self.actors.values()
    }

    /// Ids of all actors in ascending order.
    ///
    /// Tick processing collects ids up front so it can mutate actors while
    /// walking the roster.
    #[must_use]
    pub fn ids(&self) -> Vec<ActorId> {
        self.actors.keys().copied().collect()
    }

    /// Number of actors currently stored, dead soldiers included.
    #[must_use]
    pub fn len(&self) -> usize {
        self.actors.len()
    }

    /// Whether the arena holds no actors at all.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.actors.is_empty()
    }
}
