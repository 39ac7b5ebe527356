use std::collections::VecDeque;
use std::sync::Arc;

use parking_lot::Mutex;

use crate::models::packet::DecodedPacket;

/// The single concurrency seam between the capture thread and its consumers.
///
/// Unbounded FIFO with exactly one producer per session, so delivery order
/// matches capture order. Consumers drain in batches on their own schedule;
/// nothing here blocks the producer. Sustained consumer starvation grows the
/// queue without bound, so callers size their drain interval accordingly.
#[derive(Clone, Default)]
pub struct PacketQueue {
    inner: Arc<Mutex<VecDeque<DecodedPacket>>>,
}

impl PacketQueue {
    pub fn new() -> Self {
        Self::default()
    }

    /// Producer side: append one decoded record.
    pub fn push(&self, packet: DecodedPacket) {
        self.inner.lock().push_back(packet);
    }

    /// Consumer side: take everything currently queued, in capture order.
    pub fn drain(&self) -> Vec<DecodedPacket> {
        self.inner.lock().drain(..).collect()
    }

    pub fn len(&self) -> usize {
        self.inner.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.lock().is_empty()
    }

    pub fn clear(&self) {
        self.inner.lock().clear();
    }
}
