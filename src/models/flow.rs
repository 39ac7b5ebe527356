use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::models::packet::{format_endpoint, DecodedPacket};

/// Undirected identity of a conversation.
///
/// The two endpoints are ordered by a lexicographic comparison of their
/// formatted "address:port" strings, so both directions of a flow map to the
/// same key: `FlowKey::canonical(a, b) == FlowKey::canonical(b, a)`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct FlowKey {
    /// Lexicographically smaller "address:port" endpoint
    pub endpoint_a: String,

    /// Lexicographically larger "address:port" endpoint
    pub endpoint_b: String,

    /// Protocol label shared by both directions
    pub protocol: String,
}

impl FlowKey {
    pub fn canonical(
        src_addr: &str,
        src_port: i32,
        dst_addr: &str,
        dst_port: i32,
        protocol: &str,
    ) -> Self {
        let a = format_endpoint(src_addr, src_port);
        let b = format_endpoint(dst_addr, dst_port);
        let (endpoint_a, endpoint_b) = if a <= b { (a, b) } else { (b, a) };
        Self {
            endpoint_a,
            endpoint_b,
            protocol: protocol.to_string(),
        }
    }

    pub fn for_packet(packet: &DecodedPacket) -> Self {
        Self::canonical(
            &packet.src_addr,
            packet.src_port,
            &packet.dst_addr,
            packet.dst_port,
            &packet.protocol,
        )
    }
}

/// Streaming aggregate for one flow. Created on first sight, mutated in place
/// thereafter. Direction fields reflect the first packet observed.
#[derive(Debug, Clone, Serialize)]
pub struct Conversation {
    pub src_addr: String,
    pub src_port: i32,
    pub dst_addr: String,
    pub dst_port: i32,
    pub protocol: String,

    /// Link-layer addresses observed on the first packet
    pub src_mac: String,
    pub dst_mac: String,

    pub first_seen: DateTime<Utc>,
    pub last_seen: DateTime<Utc>,
    pub packet_count: u64,
    pub total_bytes: u64,
}

impl Conversation {
    fn open(packet: &DecodedPacket) -> Self {
        Self {
            src_addr: packet.src_addr.clone(),
            src_port: packet.src_port,
            dst_addr: packet.dst_addr.clone(),
            dst_port: packet.dst_port,
            protocol: packet.protocol.clone(),
            src_mac: packet.src_mac.clone(),
            dst_mac: packet.dst_mac.clone(),
            first_seen: packet.timestamp,
            last_seen: packet.timestamp,
            packet_count: 1,
            total_bytes: packet.length as u64,
        }
    }

    fn fold(&mut self, packet: &DecodedPacket) {
        self.packet_count += 1;
        self.total_bytes += packet.length as u64;
        self.last_seen = packet.timestamp;
    }
}

/// Consumer-owned conversation map, fed from the decoded-record stream.
/// Single-threaded by design: each consumer owns its own tracker.
#[derive(Debug, Default)]
pub struct ConversationTracker {
    conversations: HashMap<FlowKey, Conversation>,
}

impl ConversationTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fold one packet into its conversation. Un-ported packets (ARP, plain
    /// ICMP) are ignored.
    pub fn record(&mut self, packet: &DecodedPacket) {
        if !packet.is_flow_keyable() {
            return;
        }
        let key = FlowKey::for_packet(packet);
        match self.conversations.get_mut(&key) {
            Some(conv) => conv.fold(packet),
            None => {
                self.conversations.insert(key, Conversation::open(packet));
            }
        }
    }

    pub fn get(&self, key: &FlowKey) -> Option<&Conversation> {
        self.conversations.get(key)
    }

    pub fn len(&self) -> usize {
        self.conversations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.conversations.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&FlowKey, &Conversation)> {
        self.conversations.iter()
    }

    /// Explicit session reset.
    pub fn reset(&mut self) {
        self.conversations.clear();
    }
}
