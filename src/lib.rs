// Allow unwrap and unreadable literals in tests (test code is not production)
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::unreadable_literal))]
//! Skirmish: a turn-synchronized match engine for two-player programming
//! games.
//!
//! Two untrusted agent programs each control one army. Every turn the
//! engine hands each agent a bounded view of the battlefield, collects its
//! commands within strict compute budgets, and advances the shared world
//! by one deterministic tick. A misbehaving agent (over budget, silent,
//! or crashed) is confined to its own loss; the other player's game is
//! never corrupted.
//!
//! # Architecture
//!
//! ```text
//! ┌────────────────────────────────────────────┐
//! │   Orchestrator (turn loop, budgets)        │
//! ├──────────────┬─────────────────────────────┤
//! │  Transport   │   World (actors, combat)    │
//! │ (per agent)  │                             │
//! ├──────────────┴─────────────────────────────┤
//! │  Timer · CancelToken · ProcessMonitor      │
//! └────────────────────────────────────────────┘
//! ```
//!
//! The [`orchestrator::Orchestrator`] owns the [`world::World`] exclusively
//! and talks to each agent through one [`transport::HostChannel`]. The
//! [`monitor::ProcessMonitor`] watches the agent processes from outside
//! and cancels the loop when one of them dies.

pub mod error;
pub mod journal;
pub mod monitor;
pub mod orchestrator;
pub mod timer;
pub mod transport;
pub mod world;

pub use error::FaultKind;
pub use orchestrator::{CancelHandle, MatchConfig, Orchestrator, PlayerResult, PlayerStatus};
pub use timer::{CancelToken, Timer};
pub use world::{Command, PlayerId, SimplePlanner, World, WorldConfig};
