//! Shared-memory slot backend.
//!
//! One POSIX shared-memory segment per agent, named uniquely per session.
//! The host creates the segment (and unlinks the name when the session
//! ends); the agent process opens it by the name it received on its
//! command line. The segment holds nothing but the slot: a state flag, a
//! payload length, and the payload bytes. With length-prefixed messages,
//! neither side ever interprets the other's memory layout.

use std::ptr::null_mut;
use std::sync::atomic::{AtomicU32, Ordering};

use rustix::fs::{Mode, ftruncate};
use rustix::mm::{MapFlags, ProtFlags, mmap, munmap};
use rustix::shm;

use crate::transport::{PAYLOAD_CAPACITY, Slot, SlotState, TransportError};
use crate::world::PlayerId;

/// The shared segment layout.
///
/// `#[repr(C)]` with atomics and raw bytes only: no pointers, nothing that
/// depends on either process's address space.
#[repr(C)]
struct Segment {
    state: AtomicU32,
    len: AtomicU32,
    payload: [u8; PAYLOAD_CAPACITY],
}

/// Conventional segment name for one player's channel within a session.
#[must_use]
pub fn segment_name(session: &str, player: PlayerId) -> String {
    format!("/{session}-p{}", player.index())
}

/// One process's mapping of a shared slot segment.
#[derive(Debug)]
pub struct ShmSlot {
    ptr: *mut Segment,
    name: String,
    owner: bool,
}

// SAFETY: the mapping stays valid for the life of the value, and all access
// to the shared segment goes through atomics or is serialized by the slot
// state protocol.
unsafe impl Send for ShmSlot {}

impl ShmSlot {
    /// Create the segment, map it, and zero-initialize the slot.
    ///
    /// The creator unlinks the name on drop. `name` must start with `/` and
    /// not exist yet.
    ///
    /// # Errors
    ///
    /// Any failing `shm_open`/`ftruncate`/`mmap` call.
    pub fn create(name: &str) -> Result<Self, TransportError> {
        let fd = shm::open(
            name,
            shm::OFlags::CREATE | shm::OFlags::EXCL | shm::OFlags::RDWR,
            Mode::RUSR | Mode::WUSR,
        )
        .map_err(TransportError::Shm)?;

        // ftruncate zero-fills, so the slot comes up in the Empty state.
        ftruncate(&fd, size_of::<Segment>() as u64).map_err(TransportError::Shm)?;

        // SAFETY: mapping a correctly sized, freshly truncated segment.
        let ptr = unsafe {
            mmap(
                null_mut(),
                size_of::<Segment>(),
                ProtFlags::READ | ProtFlags::WRITE,
                MapFlags::SHARED,
                &fd,
                0,
            )
        }
        .map_err(TransportError::Shm)?;

        Ok(Self {
            ptr: ptr.cast::<Segment>(),
            name: name.to_string(),
            owner: true,
        })
    }

    /// Map an existing segment created by the host.
    ///
    /// # Errors
    ///
    /// Any failing `shm_open`/`mmap` call.
    pub fn open(name: &str) -> Result<Self, TransportError> {
        let fd = shm::open(name, shm::OFlags::RDWR, Mode::empty()).map_err(TransportError::Shm)?;

        // SAFETY: the host created and sized the segment before handing the
        // name to this process.
        let ptr = unsafe {
            mmap(
                null_mut(),
                size_of::<Segment>(),
                ProtFlags::READ | ProtFlags::WRITE,
                MapFlags::SHARED,
                &fd,
                0,
            )
        }
        .map_err(TransportError::Shm)?;

        Ok(Self {
            ptr: ptr.cast::<Segment>(),
            name: name.to_string(),
            owner: false,
        })
    }

    fn state_cell(&self) -> &AtomicU32 {
        // SAFETY: ptr is valid while self lives; atomics are safe to share
        // across processes mapping the same segment.
        unsafe { &(*self.ptr).state }
    }

    fn len_cell(&self) -> &AtomicU32 {
        // SAFETY: as for state_cell.
        unsafe { &(*self.ptr).len }
    }
}

impl Slot for ShmSlot {
    fn load_state(&self) -> SlotState {
        SlotState::from_raw(self.state_cell().load(Ordering::Acquire))
    }

    fn store_state(&self, next: SlotState) {
        self.state_cell().store(next as u32, Ordering::Release);
    }

    fn write_payload(&self, bytes: &[u8]) -> Result<(), TransportError> {
        if bytes.len() > PAYLOAD_CAPACITY {
            return Err(TransportError::PayloadTooLarge {
                len: bytes.len(),
                capacity: PAYLOAD_CAPACITY,
            });
        }
        // SAFETY: bounds checked above; the slot protocol guarantees this
        // side currently owns the payload. The Release store on the state
        // flag that follows publishes these bytes.
        unsafe {
            let dst = (&raw mut (*self.ptr).payload).cast::<u8>();
            dst.copy_from_nonoverlapping(bytes.as_ptr(), bytes.len());
        }
        #[allow(clippy::cast_possible_truncation)]
        self.len_cell().store(bytes.len() as u32, Ordering::Relaxed);
        Ok(())
    }

    fn read_payload(&self) -> Vec<u8> {
        #[allow(clippy::cast_possible_truncation)]
        let len = (self.len_cell().load(Ordering::Relaxed) as usize).min(PAYLOAD_CAPACITY);
        let mut buf = vec![0u8; len];
        // SAFETY: len is clamped to the segment's payload bounds, and the
        // Acquire load of the state flag that led here ordered the payload
        // writes before this copy.
        unsafe {
            let src = (&raw const (*self.ptr).payload).cast::<u8>();
            buf.as_mut_ptr().copy_from_nonoverlapping(src, len);
        }
        buf
    }
}

impl Drop for ShmSlot {
    fn drop(&mut self) {
        // SAFETY: unmapping the exact region mapped at construction.
        unsafe {
            let _ = munmap(self.ptr.cast(), size_of::<Segment>());
        }
        // Only the creator unlinks the name.
        if self.owner {
            let _ = shm::unlink(&self.name);
        }
    }
}
