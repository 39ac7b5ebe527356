use dashmap::DashMap;

use crate::models::packet::DecodedPacket;

/// Concurrent in-memory history of the current session, keyed by sequence
/// number. Written by the capture thread, read by exports and lookups.
/// Sequence numbers are contiguous 1..N, so ordered retrieval is a sort by key.
#[derive(Default)]
pub struct SessionStore {
    packets: DashMap<u64, DecodedPacket>,
}

impl SessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&self, packet: DecodedPacket) {
        self.packets.insert(packet.seq, packet);
    }

    pub fn get(&self, seq: u64) -> Option<DecodedPacket> {
        self.packets.get(&seq).map(|p| p.clone())
    }

    pub fn len(&self) -> usize {
        self.packets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.packets.is_empty()
    }

    /// Full session history in capture order.
    pub fn ordered(&self) -> Vec<DecodedPacket> {
        let mut all: Vec<DecodedPacket> = self.packets.iter().map(|p| p.value().clone()).collect();
        all.sort_by_key(|p| p.seq);
        all
    }

    /// Explicit session reset.
    pub fn clear(&self) {
        self.packets.clear();
    }
}
