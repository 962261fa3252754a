//! Authoritative simulation state.
//!
//! The world is mutated from exactly one place: [`World::advance`], called
//! once per turn by the turn loop. A tick validates commands, snapshots
//! start-of-tick combat state, runs one state transition per actor, applies
//! all damage at once, and emits a [`Frame`] describing what happened.
//!
//! Combat is resolved against the shared start-of-tick snapshot, so two
//! actors that each deal lethal damage to the other in the same tick both
//! die in that tick. Neither side gains an advantage from evaluation order.

mod actor;
mod command;
mod frame;
mod map;
mod path;
mod treasury;
mod view;

pub use actor::{Actor, ActorId, ActorKind, ActorState, Arena, Order, PlayerId};
pub use command::{Command, CommandError, RejectedCommand};
pub use frame::{ActorRecord, Frame};
pub use map::{Coord, Map, MapInfo};
pub use path::{PathPlanner, SimplePlanner};
pub use treasury::Treasury;
pub use view::{ActorView, PlayerView};

use std::collections::BTreeMap;

/// Tunables for world construction.
///
/// Built once by the host and passed in; nothing in here is global or
/// mutable after construction.
#[derive(Debug, Clone, Copy)]
pub struct WorldConfig {
    /// Side length of the square map.
    pub map_size: u16,
    /// Spawn points, indexed by player.
    pub spawns: [Coord; 2],
    /// Soldiers fielded per player at game start.
    pub soldiers_per_player: u32,
    /// Soldier hit points.
    pub soldier_hp: i32,
    /// Damage a soldier deals per attacking turn.
    pub soldier_damage: i32,
    /// Soldier attack range (king moves).
    pub soldier_range: u16,
    /// How far any actor can see (king moves).
    pub sight_range: u16,
    /// Turns a soldier stays dead before respawning.
    pub respawn_delay: u32,
    /// Turns a respawned soldier is invulnerable and inert.
    pub invulnerable_turns: u32,
    /// Tower hit points.
    pub tower_hp: i32,
    /// Damage a tower deals per attacking turn.
    pub tower_damage: i32,
    /// Tower attack range (king moves).
    pub tower_range: u16,
    /// Money cost of building a tower.
    pub tower_cost: i64,
    /// Maximum towers a player may field at once.
    pub max_towers: usize,
    /// Starting money per player.
    pub money_start: i64,
    /// Money balance cap.
    pub money_cap: i64,
    /// Money awarded for destroying an enemy soldier.
    pub soldier_kill_reward: i64,
    /// Money awarded for destroying an enemy tower.
    pub tower_kill_reward: i64,
    /// Score awarded for destroying an enemy soldier.
    pub soldier_kill_points: i64,
    /// Score awarded for destroying an enemy tower.
    pub tower_kill_points: i64,
}

impl Default for WorldConfig {
    fn default() -> Self {
        Self {
            map_size: 30,
            spawns: [Coord::new(0, 0), Coord::new(29, 29)],
            soldiers_per_player: 20,
            soldier_hp: 100,
            soldier_damage: 10,
            soldier_range: 4,
            sight_range: 10,
            respawn_delay: 10,
            invulnerable_turns: 2,
            tower_hp: 500,
            tower_damage: 20,
            tower_range: 6,
            tower_cost: 500,
            max_towers: 15,
            money_start: 1000,
            money_cap: 10_000,
            soldier_kill_reward: 50,
            tower_kill_reward: 150,
            soldier_kill_points: 100,
            tower_kill_points: 300,
        }
    }
}

/// Start-of-tick combat snapshot for one actor.
#[derive(Debug, Clone, Copy)]
struct SnapEntry {
    owner: PlayerId,
    pos: Coord,
}

/// The authoritative battlefield state.
#[derive(Debug)]
pub struct World {
    cfg: WorldConfig,
    map: Map,
    arena: Arena,
    planner: Box<dyn PathPlanner>,
    treasury: Treasury,
    scores: [i64; 2],
    turn: u32,
}

impl World {
    /// Build the initial battlefield: one base tower and the starting
    /// soldier contingent per player, all at the player's spawn point.
    ///
    /// Returns `None` if the map size is zero or a spawn point is off the
    /// map.
    #[must_use]
    pub fn new(cfg: WorldConfig, planner: Box<dyn PathPlanner>) -> Option<Self> {
        let map = Map::new(cfg.map_size)?;
        if !cfg.spawns.iter().all(|&spawn| map.contains(spawn)) {
            return None;
        }

        let mut arena = Arena::new();
        for player in PlayerId::BOTH {
            let spawn = cfg.spawns[player.index()];
            arena.spawn(player, ActorKind::Tower, cfg.tower_hp, spawn);
            for _ in 0..cfg.soldiers_per_player {
                arena.spawn(player, ActorKind::Soldier, cfg.soldier_hp, spawn);
            }
        }

        Some(Self {
            cfg,
            map,
            arena,
            planner,
            treasury: Treasury::new(cfg.money_start, cfg.money_cap),
            scores: [0, 0],
            turn: 0,
        })
    }

    /// The turn the next `advance` call will simulate.
    #[must_use]
    pub const fn turn(&self) -> u32 {
        self.turn
    }

    /// Current scores, indexed by player.
    #[must_use]
    pub const fn scores(&self) -> [i64; 2] {
        self.scores
    }

    /// Add points to a player's score.
    pub fn add_score(&mut self, player: PlayerId, points: i64) {
        self.scores[player.index()] += points;
    }

    /// Number of live towers a player currently fields.
    #[must_use]
    pub fn tower_count(&self, player: PlayerId) -> usize {
        self.arena
            .iter()
            .filter(|a| a.owner == player && a.kind == ActorKind::Tower && a.is_active())
            .count()
    }

    /// Direct access to an actor, for inspection.
    #[must_use]
    pub fn actor(&self, id: ActorId) -> Option<&Actor> {
        self.arena.get(id)
    }

    /// Run one deterministic simulation tick.
    pub fn advance(&mut self, commands: &[Vec<Command>; 2]) -> Frame {
        let mut rejected = Vec::new();

        // Validate and latch. Rejected commands never touch state.
        for player in PlayerId::BOTH {
            for &command in &commands[player.index()] {
                if let Err(error) = self.apply_command(player, command) {
                    rejected.push(RejectedCommand {
                        player,
                        command,
                        error,
                    });
                }
            }
        }

        // Start-of-tick snapshot: every actor that can deal or take damage
        // this tick. All combat decisions below read only this.
        let snapshot: BTreeMap<ActorId, SnapEntry> = self
            .arena
            .iter()
            .filter(|a| a.is_combatant())
            .map(|a| {
                (
                    a.id,
                    SnapEntry {
                        owner: a.owner,
                        pos: a.pos,
                    },
                )
            })
            .collect();

        // One transition per actor, in id order. Damage accumulates per
        // target and is applied only after every decision is made.
        let mut damage: BTreeMap<ActorId, i32> = BTreeMap::new();
        for id in self.arena.ids() {
            self.transition(id, &snapshot, &mut damage);
        }

        // Apply all damage at once.
        let mut died: Vec<ActorId> = Vec::new();
        for (&target, &amount) in &damage {
            if let Some(actor) = self.arena.get_mut(target) {
                actor.hp = actor.hp.saturating_sub(amount);
                if actor.hp <= 0 {
                    actor.hp = 0;
                    actor.state = ActorState::Dead { turns: 0 };
                    actor.order = None;
                    died.push(target);
                }
            }
        }

        // Kill rewards go to the opposing player.
        for &id in &died {
            if let Some(actor) = self.arena.get(id) {
                let (reward, points) = match actor.kind {
                    ActorKind::Soldier => {
                        (self.cfg.soldier_kill_reward, self.cfg.soldier_kill_points)
                    }
                    ActorKind::Tower => (self.cfg.tower_kill_reward, self.cfg.tower_kill_points),
                };
                let beneficiary = actor.owner.opponent();
                self.treasury.credit(beneficiary, reward);
                self.scores[beneficiary.index()] += points;
            }
        }

        // Roster: active actors, plus this tick's dead one last time.
        let mut records = Vec::with_capacity(self.arena.len());
        for actor in self.arena.iter() {
            if actor.is_active() {
                records.push(ActorRecord::from_actor(actor, false));
            } else if died.contains(&actor.id) {
                records.push(ActorRecord::from_actor(actor, true));
            }
        }

        let frame = Frame {
            turn: self.turn,
            actors: records,
            money: self.treasury.balances(),
            scores: self.scores,
            rejected,
        };

        // Destroyed towers are gone for good once their death frame exists.
        for &id in &died {
            if self.arena.get(id).is_some_and(|a| a.kind == ActorKind::Tower) {
                self.arena.remove(id);
            }
        }

        self.turn += 1;
        frame
    }

    /// Project the bounded view one agent receives this turn.
    #[must_use]
    pub fn view(&self, player: PlayerId, include_map: bool) -> PlayerView {
        let own: Vec<ActorView> = self
            .arena
            .iter()
            .filter(|a| a.owner == player && a.is_active())
            .map(ActorView::from_actor)
            .collect();

        let visible: Vec<ActorView> = self
            .arena
            .iter()
            .filter(|a| {
                a.owner != player
                    && a.is_active()
                    && own
                        .iter()
                        .any(|o| o.pos.distance(a.pos) <= self.cfg.sight_range)
            })
            .map(ActorView::from_actor)
            .collect();

        let map = include_map.then(|| MapInfo {
            size: self.map.size(),
            spawns: self.cfg.spawns,
        });

        PlayerView {
            turn: self.turn,
            player,
            money: self.treasury.balance(player),
            score: self.scores[player.index()],
            own,
            visible,
            map,
        }
    }

    /// Validate a command against current state and latch its effect.
    fn apply_command(&mut self, player: PlayerId, command: Command) -> Result<(), CommandError> {
        match command {
            Command::Move { actor, dest } => {
                self.check_orderable(player, actor)?;
                if !self.map.contains(dest) {
                    return Err(CommandError::OffMap);
                }
                if let Some(a) = self.arena.get_mut(actor) {
                    a.order = Some(Order::MoveTo(dest));
                }
                Ok(())
            }
            Command::Attack { actor, target } => {
                self.check_orderable(player, actor)?;
                let hostile = self
                    .arena
                    .get(target)
                    .ok_or(CommandError::InvalidTarget)?;
                if hostile.owner == player || !hostile.is_combatant() {
                    return Err(CommandError::InvalidTarget);
                }
                if let Some(a) = self.arena.get_mut(actor) {
                    a.order = Some(Order::Engage(target));
                }
                Ok(())
            }
            Command::BuildTower { position } => {
                if !self.map.contains(position) {
                    return Err(CommandError::OffMap);
                }
                if self.tower_count(player) >= self.cfg.max_towers {
                    return Err(CommandError::TowerLimit);
                }
                if !self.treasury.debit(player, self.cfg.tower_cost) {
                    return Err(CommandError::InsufficientFunds);
                }
                self.arena
                    .spawn(player, ActorKind::Tower, self.cfg.tower_hp, position);
                Ok(())
            }
        }
    }

    /// Shared checks for commands that order a unit around.
    fn check_orderable(&self, player: PlayerId, actor: ActorId) -> Result<(), CommandError> {
        let a = self.arena.get(actor).ok_or(CommandError::UnknownActor)?;
        if a.owner != player {
            return Err(CommandError::WrongOwner);
        }
        if !a.is_combatant() {
            return Err(CommandError::DeadActor);
        }
        if a.kind != ActorKind::Soldier {
            return Err(CommandError::NotASoldier);
        }
        Ok(())
    }

    /// Run one state transition for a single actor.
    fn transition(
        &mut self,
        id: ActorId,
        snapshot: &BTreeMap<ActorId, SnapEntry>,
        damage: &mut BTreeMap<ActorId, i32>,
    ) {
        let Some(actor) = self.arena.get(id).copied() else {
            return;
        };

        match actor.state {
            ActorState::Dead { turns } => {
                let turns = turns + 1;
                if actor.kind == ActorKind::Soldier && turns >= self.cfg.respawn_delay {
                    let spawn = self.cfg.spawns[actor.owner.index()];
                    if let Some(a) = self.arena.get_mut(id) {
                        a.pos = spawn;
                        a.hp = a.max_hp;
                        a.state = ActorState::Respawning {
                            remaining: self.cfg.invulnerable_turns,
                        };
                    }
                } else if let Some(a) = self.arena.get_mut(id) {
                    a.state = ActorState::Dead { turns };
                }
                return;
            }
            ActorState::Respawning { remaining } => {
                let remaining = remaining.saturating_sub(1);
                if let Some(a) = self.arena.get_mut(id) {
                    a.state = if remaining == 0 {
                        ActorState::Idle
                    } else {
                        ActorState::Respawning { remaining }
                    };
                }
                return;
            }
            ActorState::Idle | ActorState::Moving | ActorState::Attacking(_) => {}
        }

        let next = match actor.kind {
            ActorKind::Tower => self.tower_transition(&actor, snapshot, damage),
            ActorKind::Soldier => self.soldier_transition(&actor, snapshot, damage),
        };

        if let Some(a) = self.arena.get_mut(id) {
            a.pos = next.pos;
            a.state = next.state;
            a.order = next.order;
        }
    }

    /// Towers hold position and fire on the nearest hostile in range.
    fn tower_transition(
        &self,
        actor: &Actor,
        snapshot: &BTreeMap<ActorId, SnapEntry>,
        damage: &mut BTreeMap<ActorId, i32>,
    ) -> Transition {
        match nearest_hostile(snapshot, actor, self.cfg.tower_range) {
            Some(target) => {
                *damage.entry(target).or_insert(0) += self.cfg.tower_damage;
                Transition {
                    pos: actor.pos,
                    state: ActorState::Attacking(target),
                    order: None,
                }
            }
            None => Transition {
                pos: actor.pos,
                state: ActorState::Idle,
                order: None,
            },
        }
    }

    /// Soldiers execute their standing order, falling back to engaging
    /// whatever hostile wanders into range.
    fn soldier_transition(
        &self,
        actor: &Actor,
        snapshot: &BTreeMap<ActorId, SnapEntry>,
        damage: &mut BTreeMap<ActorId, i32>,
    ) -> Transition {
        match actor.order {
            Some(Order::Engage(target)) => {
                let entry = snapshot
                    .get(&target)
                    .filter(|e| e.owner != actor.owner);
                match entry {
                    Some(entry) => {
                        if actor.pos.distance(entry.pos) <= self.cfg.soldier_range {
                            *damage.entry(target).or_insert(0) += self.cfg.soldier_damage;
                            Transition {
                                pos: actor.pos,
                                state: ActorState::Attacking(target),
                                order: actor.order,
                            }
                        } else {
                            // Pursue: one path step toward the target's
                            // start-of-tick position.
                            let pos = self.planner.next_step(&self.map, actor.pos, entry.pos);
                            Transition {
                                pos,
                                state: ActorState::Moving,
                                order: actor.order,
                            }
                        }
                    }
                    // Target gone; order complete.
                    None => Transition {
                        pos: actor.pos,
                        state: ActorState::Idle,
                        order: None,
                    },
                }
            }
            Some(Order::MoveTo(dest)) => {
                let pos = self.planner.next_step(&self.map, actor.pos, dest);
                if pos == dest {
                    Transition {
                        pos,
                        state: ActorState::Idle,
                        order: None,
                    }
                } else {
                    Transition {
                        pos,
                        state: ActorState::Moving,
                        order: actor.order,
                    }
                }
            }
            None => match nearest_hostile(snapshot, actor, self.cfg.soldier_range) {
                Some(target) => {
                    *damage.entry(target).or_insert(0) += self.cfg.soldier_damage;
                    Transition {
                        pos: actor.pos,
                        state: ActorState::Attacking(target),
                        order: None,
                    }
                }
                None => Transition {
                    pos: actor.pos,
                    state: ActorState::Idle,
                    order: None,
                },
            },
        }
    }
}

/// Result of one actor transition.
#[derive(Debug, Clone, Copy)]
struct Transition {
    pos: Coord,
    state: ActorState,
    order: Option<Order>,
}

/// Nearest hostile combatant within range; ties broken by lowest id.
fn nearest_hostile(
    snapshot: &BTreeMap<ActorId, SnapEntry>,
    actor: &Actor,
    range: u16,
) -> Option<ActorId> {
    snapshot
        .iter()
        .filter(|&(_, entry)| entry.owner != actor.owner)
        .map(|(&id, entry)| (actor.pos.distance(entry.pos), id))
        .filter(|&(dist, _)| dist <= range)
        .min()
        .map(|(_, id)| id)
}

/// Arithmetic safety proofs for damage application.
///
/// Run with: `cargo kani`
#[cfg(kani)]
mod kani_proofs {
    /// Applied damage never wraps hit points below the i32 floor.
    #[kani::proof]
    fn prove_damage_application_saturates() {
        let hp: i32 = kani::any();
        let amount: i32 = kani::any();
        kani::assume(hp >= 0);
        kani::assume(amount >= 0);

        let after = hp.saturating_sub(amount);
        assert!(after <= hp);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn small_config() -> WorldConfig {
        WorldConfig {
            map_size: 20,
            spawns: [Coord::new(0, 0), Coord::new(19, 19)],
            soldiers_per_player: 1,
            money_start: 1000,
            ..WorldConfig::default()
        }
    }

    fn build_world(cfg: WorldConfig) -> World {
        World::new(cfg, Box::new(SimplePlanner)).expect("valid config")
    }

    /// Id of the first soldier owned by `player`.
    fn soldier_of(world: &World, player: PlayerId) -> ActorId {
        world
            .arena
            .iter()
            .find(|a| a.owner == player && a.kind == ActorKind::Soldier)
            .map(|a| a.id)
            .expect("player has a soldier")
    }

    fn no_commands() -> [Vec<Command>; 2] {
        [Vec::new(), Vec::new()]
    }

    #[test]
    fn test_world_rejects_bad_config() {
        let mut cfg = small_config();
        cfg.spawns[1] = Coord::new(99, 99);
        assert!(World::new(cfg, Box::new(SimplePlanner)).is_none());
    }

    #[test]
    fn test_initial_roster() {
        let world = build_world(small_config());
        assert_eq!(world.tower_count(PlayerId::One), 1);
        assert_eq!(world.tower_count(PlayerId::Two), 1);
        assert_eq!(world.arena.len(), 4);
    }

    #[test]
    fn test_move_advances_one_step_per_turn() {
        let mut world = build_world(small_config());
        let soldier = soldier_of(&world, PlayerId::One);

        let commands = [
            vec![Command::Move {
                actor: soldier,
                dest: Coord::new(3, 0),
            }],
            Vec::new(),
        ];
        let frame = world.advance(&commands);

        let record = frame.actor(soldier).expect("soldier in frame");
        assert_eq!(record.pos, Coord::new(1, 0));
        assert_eq!(record.state, ActorState::Moving);

        // The order persists without being re-issued.
        let frame = world.advance(&no_commands());
        assert_eq!(frame.actor(soldier).expect("in frame").pos, Coord::new(2, 0));
        let frame = world.advance(&no_commands());
        let record = frame.actor(soldier).expect("in frame");
        assert_eq!(record.pos, Coord::new(3, 0));
        assert_eq!(record.state, ActorState::Idle);
    }

    #[test]
    fn test_rejected_build_leaves_state_untouched() {
        let mut cfg = small_config();
        cfg.money_start = 100;
        let mut world = build_world(cfg);

        let commands = [
            vec![Command::BuildTower {
                position: Coord::new(5, 5),
            }],
            Vec::new(),
        ];
        let frame = world.advance(&commands);

        assert_eq!(frame.rejected.len(), 1);
        assert_eq!(frame.rejected[0].error, CommandError::InsufficientFunds);
        assert_eq!(frame.money[0], 100);
        assert_eq!(world.tower_count(PlayerId::One), 1);
    }

    #[test]
    fn test_build_tower_debits_and_spawns() {
        let mut world = build_world(small_config());
        let commands = [
            vec![Command::BuildTower {
                position: Coord::new(5, 5),
            }],
            Vec::new(),
        ];
        let frame = world.advance(&commands);
        assert!(frame.rejected.is_empty());
        assert_eq!(frame.money[0], 500);
        assert_eq!(world.tower_count(PlayerId::One), 2);
    }

    #[test]
    fn test_command_validation_errors() {
        let mut world = build_world(small_config());
        let own_soldier = soldier_of(&world, PlayerId::One);
        let enemy_soldier = soldier_of(&world, PlayerId::Two);

        let commands = [
            vec![
                Command::Move {
                    actor: 9999,
                    dest: Coord::new(1, 1),
                },
                Command::Move {
                    actor: enemy_soldier,
                    dest: Coord::new(1, 1),
                },
                Command::Move {
                    actor: own_soldier,
                    dest: Coord::new(99, 99),
                },
                Command::Attack {
                    actor: own_soldier,
                    target: own_soldier,
                },
            ],
            Vec::new(),
        ];
        let frame = world.advance(&commands);

        let errors: Vec<CommandError> = frame.rejected.iter().map(|r| r.error).collect();
        assert_eq!(
            errors,
            vec![
                CommandError::UnknownActor,
                CommandError::WrongOwner,
                CommandError::OffMap,
                CommandError::InvalidTarget,
            ]
        );
    }

    #[test]
    fn test_mutual_kill_from_shared_snapshot() {
        let mut cfg = small_config();
        cfg.soldier_hp = 10;
        cfg.soldier_damage = 10;
        cfg.soldier_range = 4;
        cfg.tower_range = 0;
        cfg.spawns = [Coord::new(0, 0), Coord::new(4, 0)];
        let mut world = build_world(cfg);

        let a = soldier_of(&world, PlayerId::One);
        let b = soldier_of(&world, PlayerId::Two);

        let commands = [
            vec![Command::Attack { actor: a, target: b }],
            vec![Command::Attack { actor: b, target: a }],
        ];
        let frame = world.advance(&commands);

        let record_a = frame.actor(a).expect("death frame for a");
        let record_b = frame.actor(b).expect("death frame for b");
        assert!(record_a.is_dead, "a must die in the same tick");
        assert!(record_b.is_dead, "b must die in the same tick");
        assert_eq!(record_a.hp, 0);
        assert_eq!(record_b.hp, 0);

        // Both kills paid out.
        assert_eq!(frame.scores, [100, 100]);

        // Dead soldiers leave the roster on the following frame.
        let frame = world.advance(&no_commands());
        assert!(frame.actor(a).is_none());
        assert!(frame.actor(b).is_none());
    }

    #[test]
    fn test_soldier_respawn_cycle() {
        let mut cfg = small_config();
        cfg.soldier_hp = 10;
        cfg.soldier_damage = 10;
        cfg.soldier_range = 4;
        cfg.tower_range = 0;
        cfg.respawn_delay = 3;
        cfg.invulnerable_turns = 2;
        cfg.spawns = [Coord::new(0, 0), Coord::new(4, 0)];
        let mut world = build_world(cfg);

        let a = soldier_of(&world, PlayerId::One);
        let b = soldier_of(&world, PlayerId::Two);

        // Kill b only: a attacks b's start-of-tick position while b is
        // ordered away, so b cannot strike back.
        let commands = [
            vec![Command::Attack { actor: a, target: b }],
            vec![Command::Move {
                actor: b,
                dest: Coord::new(10, 0),
            }],
        ];
        let frame = world.advance(&commands);
        assert!(frame.actor(b).expect("death frame").is_dead);

        // Dead for respawn_delay turns, invisible to frames.
        for _ in 0..cfg.respawn_delay - 1 {
            let frame = world.advance(&no_commands());
            assert!(frame.actor(b).is_none());
        }

        // Respawns at the owner's spawn point at full strength.
        let frame = world.advance(&no_commands());
        let record = frame.actor(b).expect("respawned");
        assert_eq!(record.pos, Coord::new(4, 0));
        assert_eq!(record.hp, 10);
        assert!(matches!(record.state, ActorState::Respawning { .. }));

        // Invulnerable: a keeps attacking but deals nothing.
        let commands = [
            vec![Command::Attack { actor: a, target: b }],
            Vec::new(),
        ];
        let frame = world.advance(&commands);
        let record = frame.actor(b).expect("still there");
        assert_eq!(record.hp, 10);
        assert_eq!(
            frame.rejected[0].error,
            CommandError::InvalidTarget,
            "invulnerable actors are not legal targets"
        );

        // Window elapses back to Idle.
        let frame = world.advance(&no_commands());
        let record = frame.actor(b).expect("still there");
        assert_eq!(record.state, ActorState::Idle);
    }

    #[test]
    fn test_tower_is_discarded_after_death_frame() {
        let mut cfg = small_config();
        cfg.tower_hp = 10;
        cfg.soldier_damage = 10;
        cfg.tower_range = 0;
        cfg.spawns = [Coord::new(0, 0), Coord::new(4, 0)];
        let mut world = build_world(cfg);

        let a = soldier_of(&world, PlayerId::One);
        let tower = world
            .arena
            .iter()
            .find(|t| t.owner == PlayerId::Two && t.kind == ActorKind::Tower)
            .map(|t| t.id)
            .expect("tower exists");

        let commands = [
            vec![Command::Attack {
                actor: a,
                target: tower,
            }],
            Vec::new(),
        ];
        let frame = world.advance(&commands);
        assert!(frame.actor(tower).expect("death frame").is_dead);
        assert_eq!(world.tower_count(PlayerId::Two), 0);

        let frame = world.advance(&no_commands());
        assert!(frame.actor(tower).is_none());
        assert!(world.actor(tower).is_none(), "towers never respawn");
    }

    #[test]
    fn test_idle_soldier_auto_engages() {
        let mut cfg = small_config();
        cfg.soldier_range = 4;
        cfg.tower_range = 0;
        cfg.spawns = [Coord::new(0, 0), Coord::new(3, 0)];
        let mut world = build_world(cfg);

        let a = soldier_of(&world, PlayerId::One);
        let frame = world.advance(&no_commands());

        let record = frame.actor(a).expect("in frame");
        assert!(
            matches!(record.state, ActorState::Attacking(_)),
            "idle soldier with a hostile in range must engage"
        );
    }

    #[test]
    fn test_pursuit_closes_distance_then_attacks() {
        let mut cfg = small_config();
        cfg.soldier_range = 2;
        cfg.tower_range = 0;
        cfg.spawns = [Coord::new(0, 0), Coord::new(5, 0)];
        let mut world = build_world(cfg);

        let a = soldier_of(&world, PlayerId::One);
        let b = soldier_of(&world, PlayerId::Two);

        let commands = [
            vec![Command::Attack { actor: a, target: b }],
            Vec::new(),
        ];
        let frame = world.advance(&commands);
        let record = frame.actor(a).expect("in frame");
        assert_eq!(record.state, ActorState::Moving);
        assert_eq!(record.pos, Coord::new(1, 0));

        // The engage order holds across turns without being re-issued.
        let frame = world.advance(&no_commands());
        let record = frame.actor(a).expect("in frame");
        assert_eq!(record.pos, Coord::new(2, 0));

        let frame = world.advance(&no_commands());
        assert_eq!(frame.actor(a).expect("in frame").pos, Coord::new(3, 0));

        // Range 2 reached; pursuit turns into an attack.
        let frame = world.advance(&no_commands());
        let record = frame.actor(a).expect("in frame");
        assert_eq!(record.state, ActorState::Attacking(b));
    }

    #[test]
    fn test_view_hides_out_of_sight_opponents() {
        let mut cfg = small_config();
        cfg.sight_range = 5;
        cfg.map_size = 30;
        cfg.spawns = [Coord::new(0, 0), Coord::new(29, 29)];
        // Inert towers, so the scout survives the approach.
        cfg.tower_range = 0;
        let mut world = build_world(cfg);

        let view = world.view(PlayerId::One, true);
        assert_eq!(view.own.len(), 2);
        assert!(view.visible.is_empty(), "opponent spawn is out of sight");
        assert!(view.map.is_some());

        // March a soldier toward the opponent until something shows up.
        let soldier = soldier_of(&world, PlayerId::One);
        let commands = [
            vec![Command::Move {
                actor: soldier,
                dest: Coord::new(29, 29),
            }],
            Vec::new(),
        ];
        world.advance(&commands);
        for _ in 0..50 {
            world.advance(&no_commands());
        }
        let view = world.view(PlayerId::One, false);
        assert!(!view.visible.is_empty());
        assert!(view.map.is_none());
    }

    #[test]
    fn test_view_is_id_ordered() {
        let world = build_world(small_config());
        let view = world.view(PlayerId::Two, false);
        let ids: Vec<ActorId> = view.own.iter().map(|a| a.id).collect();
        let mut sorted = ids.clone();
        sorted.sort_unstable();
        assert_eq!(ids, sorted);
    }
}
