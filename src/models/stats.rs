use std::collections::{HashMap, VecDeque};

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::models::packet::DecodedPacket;

/// Point-in-time view of capture statistics.
#[derive(Debug, Clone, Serialize, Default)]
pub struct CaptureStats {
    /// Total number of packets seen
    pub total_packets: u64,

    /// Total bytes seen
    pub total_bytes: u64,

    /// Packets per protocol label
    pub protocols: HashMap<String, u64>,

    /// Session start time
    pub start_time: Option<DateTime<Utc>>,

    /// Session end time (once stopped)
    pub end_time: Option<DateTime<Utc>>,

    /// Packets per second over the trailing window
    pub packet_rate: f64,

    /// Bytes per second over the trailing window
    pub data_rate: f64,
}

/// Streaming statistics consumer: per-protocol counters plus a rolling
/// packet/data rate over a trailing window. Owned by a single consumer and
/// fed from the decoded-record stream; it never blocks the producer.
#[derive(Debug)]
pub struct StatsAggregator {
    protocols: HashMap<String, u64>,
    total_packets: u64,
    total_bytes: u64,
    start_time: Option<DateTime<Utc>>,
    end_time: Option<DateTime<Utc>>,

    /// (monotonic_ms, length) of packets inside the trailing window
    window: VecDeque<(u64, usize)>,
    window_ms: u64,
}

impl StatsAggregator {
    /// `window_secs` sizes the trailing rate window; it must be positive.
    pub fn new(window_secs: u64) -> Self {
        Self {
            protocols: HashMap::new(),
            total_packets: 0,
            total_bytes: 0,
            start_time: None,
            end_time: None,
            window: VecDeque::new(),
            window_ms: window_secs.max(1) * 1000,
        }
    }

    /// Fold one packet into the counters and the rolling window.
    pub fn record(&mut self, packet: &DecodedPacket) {
        if self.start_time.is_none() {
            self.start_time = Some(packet.timestamp);
        }
        self.total_packets += 1;
        self.total_bytes += packet.length as u64;
        *self.protocols.entry(packet.protocol.clone()).or_insert(0) += 1;

        self.window.push_back((packet.monotonic_ms, packet.length));
        self.evict(packet.monotonic_ms);
    }

    /// Mark the session as finished.
    pub fn finish(&mut self) {
        self.end_time = Some(Utc::now());
    }

    /// Packets per second over the trailing window, evaluated at `now_ms`
    /// on the same monotonic clock the packets were stamped with.
    pub fn packet_rate(&mut self, now_ms: u64) -> f64 {
        self.evict(now_ms);
        self.window.len() as f64 / (self.window_ms as f64 / 1000.0)
    }

    pub fn protocol_count(&self, protocol: &str) -> u64 {
        self.protocols.get(protocol).copied().unwrap_or(0)
    }

    pub fn snapshot(&mut self, now_ms: u64) -> CaptureStats {
        self.evict(now_ms);
        let secs = self.window_ms as f64 / 1000.0;
        CaptureStats {
            total_packets: self.total_packets,
            total_bytes: self.total_bytes,
            protocols: self.protocols.clone(),
            start_time: self.start_time,
            end_time: self.end_time,
            packet_rate: self.window.len() as f64 / secs,
            data_rate: self.window.iter().map(|(_, len)| *len as u64).sum::<u64>() as f64 / secs,
        }
    }

    /// Explicit session reset.
    pub fn reset(&mut self) {
        self.protocols.clear();
        self.total_packets = 0;
        self.total_bytes = 0;
        self.start_time = None;
        self.end_time = None;
        self.window.clear();
    }

    fn evict(&mut self, now_ms: u64) {
        let cutoff = now_ms.saturating_sub(self.window_ms);
        while let Some((ts, _)) = self.window.front() {
            if *ts < cutoff {
                self.window.pop_front();
            } else {
                break;
            }
        }
    }
}
