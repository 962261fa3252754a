//! Process-local slot backend.
//!
//! Same protocol as the shared-memory backend, but the "segment" is an
//! atomics-plus-mutex pair on the heap. Used by the test suite and by
//! in-process agents.

use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::{Arc, Mutex, PoisonError};

use crate::transport::{PAYLOAD_CAPACITY, Slot, SlotState, TransportError};

#[derive(Debug, Default)]
struct Shared {
    state: AtomicU32,
    payload: Mutex<Vec<u8>>,
}

/// A cloneable handle to one in-process slot.
///
/// Host and agent endpoints each hold a clone; the underlying buffer is
/// shared.
#[derive(Debug, Clone, Default)]
pub struct LocalSlot {
    inner: Arc<Shared>,
}

impl LocalSlot {
    /// Create a fresh slot in the `Empty` state.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

impl Slot for LocalSlot {
    fn load_state(&self) -> SlotState {
        SlotState::from_raw(self.inner.state.load(Ordering::Acquire))
    }

    fn store_state(&self, next: SlotState) {
        self.inner.state.store(next as u32, Ordering::Release);
    }

    fn write_payload(&self, bytes: &[u8]) -> Result<(), TransportError> {
        if bytes.len() > PAYLOAD_CAPACITY {
            return Err(TransportError::PayloadTooLarge {
                len: bytes.len(),
                capacity: PAYLOAD_CAPACITY,
            });
        }
        let mut payload = self
            .inner
            .payload
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        payload.clear();
        payload.extend_from_slice(bytes);
        Ok(())
    }

    fn read_payload(&self) -> Vec<u8> {
        self.inner
            .payload
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_state_toggles() {
        let slot = LocalSlot::new();
        assert_eq!(slot.load_state(), SlotState::Empty);

        slot.store_state(SlotState::ReadyForAgent);
        assert_eq!(slot.load_state(), SlotState::ReadyForAgent);

        let clone = slot.clone();
        clone.store_state(SlotState::ReadyForOrchestrator);
        assert_eq!(slot.load_state(), SlotState::ReadyForOrchestrator);
    }

    #[test]
    fn test_payload_roundtrip() {
        let slot = LocalSlot::new();
        slot.write_payload(b"hello").expect("fits");
        assert_eq!(slot.read_payload(), b"hello");
    }

    #[test]
    fn test_oversized_payload_rejected() {
        let slot = LocalSlot::new();
        let huge = vec![0u8; PAYLOAD_CAPACITY + 1];
        assert!(matches!(
            slot.write_payload(&huge),
            Err(TransportError::PayloadTooLarge { .. })
        ));
    }
}
