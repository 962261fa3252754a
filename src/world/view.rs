//! The bounded projection of the world an agent is allowed to see.

use serde::{Deserialize, Serialize};

use crate::world::actor::{Actor, ActorId, ActorKind, ActorState, PlayerId};
use crate::world::map::{Coord, MapInfo};

/// One actor as presented to an agent.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct ActorView {
    /// Actor id.
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
}

impl ActorView {
    /// Project a single actor.
    #[must_use]
    pub fn from_actor(actor: &Actor) -> Self {
        Self {
            id: actor.id,
            owner: actor.owner,
            kind: actor.kind,
            hp: actor.hp,
            max_hp: actor.max_hp,
            pos: actor.pos,
            state: actor.state,
        }
    }
}

/// The per-turn state handed to one agent.
///
/// Own actors appear in full. Opponent actors appear only while some allied
/// actor has them in sight. The static map description rides along exactly
/// once, on the first turn's view.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlayerView {
    /// Turn number this view was projected for.
    pub turn: u32,
    /// The receiving player.
    pub player: PlayerId,
    /// Current money balance.
    pub money: i64,
    /// Current score.
    pub score: i64,
    /// The player's own actors, id-ordered.
    pub own: Vec<ActorView>,
    /// Visible opponent actors, id-ordered.
    pub visible: Vec<ActorView>,
    /// Static map data; present on the first view only.
    pub map: Option<MapInfo>,
}
