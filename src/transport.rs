//! Duplex per-agent channels.
//!
//! Each agent talks to the host over one fixed-capacity slot with a state
//! flag that toggles strictly alternately: the host publishes a view and
//! flips the slot to `ReadyForAgent`; the agent reads it, writes back its
//! commands and compute-unit count, and flips to `ReadyForOrchestrator`.
//! The flag is the only synchronization point between the two processes;
//! every flag store is a Release and every load an Acquire, so no reader
//! can observe a ready flag before the payload behind it is complete.
//!
//! Payloads cross the boundary as explicit length-prefixed JSON messages
//! ([`AgentReply`], [`PlayerView`]), never as raw struct memory. Two slot
//! backends exist: [`ShmSlot`] over a POSIX shared-memory segment for real
//! agent processes, and [`LocalSlot`] over process-local memory for tests
//! and in-process agents.

mod local;
mod shmem;
mod wire;

pub use local::LocalSlot;
pub use shmem::{ShmSlot, segment_name};
pub use wire::AgentReply;

use std::fmt;
use std::thread;
use std::time::{Duration, Instant};

use crate::timer::CancelToken;
use crate::world::PlayerView;

/// Payload capacity of a slot, in bytes.
pub const PAYLOAD_CAPACITY: usize = 256 * 1024;

/// How often a blocked side re-checks the slot flag.
const POLL_INTERVAL: Duration = Duration::from_micros(500);

/// Ownership flag of a slot. Exactly one side may write at any time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u32)]
pub enum SlotState {
    /// The host owns the slot and has not published yet.
    Empty = 0,
    /// A view is published; the agent owns the slot.
    ReadyForAgent = 1,
    /// A reply is published; the host owns the slot.
    ReadyForOrchestrator = 2,
    /// The session is over; the agent should exit.
    TimedOut = 3,
}

impl SlotState {
    pub(crate) const fn from_raw(raw: u32) -> Self {
        match raw {
            1 => SlotState::ReadyForAgent,
            2 => SlotState::ReadyForOrchestrator,
            3 => SlotState::TimedOut,
            _ => SlotState::Empty,
        }
    }
}

/// A slot backend: a state flag plus a bounded payload buffer.
///
/// Implementations must order `store_state` after any preceding payload
/// write (Release) and `load_state` before any following payload read
/// (Acquire).
pub trait Slot {
    /// Load the state flag (Acquire).
    fn load_state(&self) -> SlotState;

    /// Store the state flag (Release).
    fn store_state(&self, next: SlotState);

    /// Copy a payload into the slot.
    ///
    /// # Errors
    ///
    /// Fails if the payload exceeds [`PAYLOAD_CAPACITY`].
    fn write_payload(&self, bytes: &[u8]) -> Result<(), TransportError>;

    /// Copy the current payload out of the slot.
    fn read_payload(&self) -> Vec<u8>;
}

/// Errors raised by channel operations.
#[derive(Debug)]
pub enum TransportError {
    /// No reply arrived within the allowed time. The slot is left exactly
    /// as it was; the host side of the channel is permanently disabled.
    TimedOut,
    /// A cancellation request ended the wait early. The channel stays
    /// usable; the caller is expected to be shutting down.
    Cancelled,
    /// The channel was disabled by an earlier timeout or decode failure.
    Poisoned,
    /// The host ended the session; no more views will arrive.
    Closed,
    /// A payload did not fit in the slot.
    PayloadTooLarge {
        /// Size of the offending payload.
        len: usize,
        /// Maximum the slot can hold.
        capacity: usize,
    },
    /// A payload could not be encoded or decoded.
    Codec(String),
    /// A shared-memory system call failed.
    Shm(rustix::io::Errno),
}

impl fmt::Display for TransportError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TransportError::TimedOut => write!(f, "no reply within the allowed time"),
            TransportError::Cancelled => write!(f, "wait abandoned by cancellation"),
            TransportError::Poisoned => write!(f, "channel disabled by an earlier fault"),
            TransportError::Closed => write!(f, "session closed by the host"),
            TransportError::PayloadTooLarge { len, capacity } => {
                write!(f, "payload of {len} bytes exceeds slot capacity {capacity}")
            }
            TransportError::Codec(detail) => write!(f, "malformed payload: {detail}"),
            TransportError::Shm(errno) => write!(f, "shared memory error: {errno}"),
        }
    }
}

impl std::error::Error for TransportError {}

/// Orchestrator side of one agent channel.
#[derive(Debug)]
pub struct HostChannel<S> {
    slot: S,
    poisoned: bool,
}

impl<S: Slot> HostChannel<S> {
    /// Wrap a slot as the host endpoint.
    #[must_use]
    pub fn new(slot: S) -> Self {
        Self {
            slot,
            poisoned: false,
        }
    }

    /// Whether this channel has been permanently disabled.
    #[must_use]
    pub const fn is_poisoned(&self) -> bool {
        self.poisoned
    }

    /// Publish a view and hand the slot to the agent.
    ///
    /// Called once per turn per live player, and never again once the
    /// channel is poisoned.
    ///
    /// # Errors
    ///
    /// Fails if the channel is poisoned or the view does not fit the slot.
    pub fn publish(&mut self, view: &PlayerView) -> Result<(), TransportError> {
        if self.poisoned {
            return Err(TransportError::Poisoned);
        }
        let frame = wire::encode(view)?;
        self.slot.write_payload(&frame)?;
        self.slot.store_state(SlotState::ReadyForAgent);
        Ok(())
    }

    /// Block until the agent's reply arrives or the wait ends.
    ///
    /// On timeout the slot is not touched (the agent may be mid-write and
    /// keeps ownership), but this endpoint poisons itself: the channel is
    /// never used again for the rest of the game. A cancellation observed
    /// mid-wait returns [`TransportError::Cancelled`] without poisoning
    /// anything.
    ///
    /// # Errors
    ///
    /// [`TransportError::TimedOut`] after `timeout` with no reply,
    /// [`TransportError::Cancelled`] if the token was set first, and
    /// [`TransportError::Codec`] (also poisoning) on an undecodable reply.
    pub fn collect(
        &mut self,
        timeout: Duration,
        cancel: &CancelToken,
    ) -> Result<AgentReply, TransportError> {
        if self.poisoned {
            return Err(TransportError::Poisoned);
        }
        let deadline = Instant::now() + timeout;
        loop {
            if self.slot.load_state() == SlotState::ReadyForOrchestrator {
                let frame = self.slot.read_payload();
                self.slot.store_state(SlotState::Empty);
                return wire::decode(&frame).map_err(|e| {
                    self.poisoned = true;
                    e
                });
            }
            if cancel.is_set() {
                return Err(TransportError::Cancelled);
            }
            if Instant::now() >= deadline {
                self.poisoned = true;
                return Err(TransportError::TimedOut);
            }
            thread::sleep(POLL_INTERVAL);
        }
    }

    /// End the session: mark the slot so a blocked agent can exit, and
    /// disable this endpoint.
    pub fn shutdown(&mut self) {
        self.slot.store_state(SlotState::TimedOut);
        self.poisoned = true;
    }
}

/// Agent side of the channel. This is the contract agent programs build
/// against; the engine itself only uses it in tests.
#[derive(Debug)]
pub struct AgentChannel<S> {
    slot: S,
}

impl<S: Slot> AgentChannel<S> {
    /// Wrap a slot as the agent endpoint.
    #[must_use]
    pub fn new(slot: S) -> Self {
        Self { slot }
    }

    /// Block until the host publishes this turn's view.
    ///
    /// # Errors
    ///
    /// [`TransportError::Closed`] once the host ends the session,
    /// [`TransportError::TimedOut`] after `timeout` with nothing published,
    /// [`TransportError::Codec`] on an undecodable view.
    pub fn wait_view(&self, timeout: Duration) -> Result<PlayerView, TransportError> {
        let deadline = Instant::now() + timeout;
        loop {
            match self.slot.load_state() {
                SlotState::ReadyForAgent => {
                    let frame = self.slot.read_payload();
                    // Ownership stays with the agent until it replies.
                    return wire::decode(&frame);
                }
                SlotState::TimedOut => return Err(TransportError::Closed),
                SlotState::Empty | SlotState::ReadyForOrchestrator => {}
            }
            if Instant::now() >= deadline {
                return Err(TransportError::TimedOut);
            }
            thread::sleep(POLL_INTERVAL);
        }
    }

    /// Publish the reply for the current turn and hand the slot back.
    ///
    /// # Errors
    ///
    /// Fails if the reply does not fit the slot.
    pub fn reply(&self, reply: &AgentReply) -> Result<(), TransportError> {
        let frame = wire::encode(reply)?;
        self.slot.write_payload(&frame)?;
        self.slot.store_state(SlotState::ReadyForOrchestrator);
        Ok(())
    }
}

/// Host endpoint over shared memory.
pub type ShmHostChannel = HostChannel<ShmSlot>;
/// Agent endpoint over shared memory.
pub type ShmAgentChannel = AgentChannel<ShmSlot>;
/// Host endpoint over process-local memory.
pub type LocalHostChannel = HostChannel<LocalSlot>;
/// Agent endpoint over process-local memory.
pub type LocalAgentChannel = AgentChannel<LocalSlot>;

/// Create a connected host/agent pair over process-local memory.
#[must_use]
pub fn local_pair() -> (LocalHostChannel, LocalAgentChannel) {
    let slot = LocalSlot::new();
    (HostChannel::new(slot.clone()), AgentChannel::new(slot))
}
