//! Benchmarks for the world tick.

#![allow(missing_docs)]
#![allow(clippy::unwrap_used)]

use std::hint::black_box;

use criterion::{Criterion, criterion_group, criterion_main};

use skirmish::world::{ActorKind, Command, Coord, PlayerId, SimplePlanner, World, WorldConfig};

/// A full default roster doing nothing.
fn bench_idle_tick(c: &mut Criterion) {
    let mut world = World::new(WorldConfig::default(), Box::new(SimplePlanner)).unwrap();

    c.bench_function("advance_idle_roster", |b| {
        b.iter(|| black_box(world.advance(&[Vec::new(), Vec::new()])));
    });
}

/// Both armies ordered across the map, so every soldier pathfinds and the
/// midfield turns into a brawl.
fn bench_marching_tick(c: &mut Criterion) {
    let cfg = WorldConfig::default();
    let mut world = World::new(cfg, Box::new(SimplePlanner)).unwrap();

    let orders: [Vec<Command>; 2] = [PlayerId::One, PlayerId::Two].map(|player| {
        let dest = cfg.spawns[player.opponent().index()];
        world
            .view(player, false)
            .own
            .iter()
            .filter(|a| a.kind == ActorKind::Soldier)
            .map(|a| Command::Move {
                actor: a.id,
                dest: Coord::new(dest.x, dest.y),
            })
            .collect()
    });

    c.bench_function("advance_marching_roster", |b| {
        b.iter(|| black_box(world.advance(&orders)));
    });
}

criterion_group!(benches, bench_idle_tick, bench_marching_tick);
criterion_main!(benches);
