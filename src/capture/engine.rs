use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::Instant;

use anyhow::{anyhow, Result};
use chrono::Utc;
use log::{error, info, warn};
use parking_lot::RwLock;
use pcap::{Active, Capture, Device};
use tokio::sync::mpsc;

use crate::capture::decoder::PacketDecoder;
use crate::capture::queue::PacketQueue;
use crate::capture::store::SessionStore;
use crate::models::config::CaptureConfig;
use crate::models::packet::{LinkKind, RawFrame};

const SNAPLEN: i32 = 65535;

/// Capture lifecycle. Error absorbs failed attempts; a new start request is
/// required to leave it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EngineState {
    Idle,
    Opening,
    Capturing,
    Stopping,
    Closed,
    Error,
}

/// Owns the live capture handle and runs the acquisition loop on a dedicated
/// thread. Exactly one producer thread exists per active session; it is the
/// sole writer to the packet queue.
pub struct CaptureEngine {
    state: Arc<RwLock<EngineState>>,
    stop_flag: Arc<AtomicBool>,
    queue: PacketQueue,
    store: Arc<SessionStore>,
    link: Arc<RwLock<LinkKind>>,
    status_tx: mpsc::UnboundedSender<String>,
    worker: Option<thread::JoinHandle<()>>,
}

impl CaptureEngine {
    /// Returns the engine plus the receiving end of its status channel.
    /// Status messages are advisory only, never required for correctness.
    pub fn new() -> (Self, mpsc::UnboundedReceiver<String>) {
        let (status_tx, status_rx) = mpsc::unbounded_channel();
        let engine = Self {
            state: Arc::new(RwLock::new(EngineState::Idle)),
            stop_flag: Arc::new(AtomicBool::new(false)),
            queue: PacketQueue::new(),
            store: Arc::new(SessionStore::new()),
            link: Arc::new(RwLock::new(LinkKind::default())),
            status_tx,
            worker: None,
        };
        (engine, status_rx)
    }

    pub fn state(&self) -> EngineState {
        *self.state.read()
    }

    pub fn queue(&self) -> PacketQueue {
        self.queue.clone()
    }

    pub fn store(&self) -> Arc<SessionStore> {
        Arc::clone(&self.store)
    }

    /// Link-layer kind of the current/most recent session.
    pub fn link_kind(&self) -> LinkKind {
        *self.link.read()
    }

    /// Start a capture session. Fatal errors (unknown interface, open
    /// failure) leave the engine in Error and are also reported on the
    /// status channel. A failed filter compile is non-fatal: the session
    /// proceeds unfiltered.
    pub fn start(&mut self, config: CaptureConfig) -> Result<()> {
        {
            let state = self.state.read();
            if matches!(
                *state,
                EngineState::Opening | EngineState::Capturing | EngineState::Stopping
            ) {
                return Err(anyhow!("capture is already running"));
            }
        }
        // Reclaim the previous session's thread, if any
        if let Some(handle) = self.worker.take() {
            let _ = handle.join();
        }

        *self.state.write() = EngineState::Opening;
        info!("starting capture on interface {}", config.interface);

        let capture = match self.open_capture(&config) {
            Ok(capture) => capture,
            Err(e) => {
                *self.state.write() = EngineState::Error;
                let _ = self.status_tx.send(format!("Capture failed to start: {}", e));
                return Err(e);
            }
        };

        let link = LinkKind::from_dlt(capture.get_datalink().0);
        *self.link.write() = link;

        // Explicit session reset: numbering restarts at 1, history is dropped
        self.store.clear();
        self.queue.clear();
        self.stop_flag.store(false, Ordering::SeqCst);

        *self.state.write() = EngineState::Capturing;
        let _ = self
            .status_tx
            .send(format!("Capturing on {}", config.interface));

        let state = Arc::clone(&self.state);
        let stop_flag = Arc::clone(&self.stop_flag);
        let queue = self.queue.clone();
        let store = Arc::clone(&self.store);
        let status_tx = self.status_tx.clone();
        let limit = config.limit;

        let worker = thread::Builder::new()
            .name("packetcat-capture".to_string())
            .spawn(move || {
                run_loop(capture, link, limit, stop_flag, queue, store, status_tx, state);
            })?;
        self.worker = Some(worker);

        Ok(())
    }

    /// Request a cooperative stop. Idempotent: a no-op unless a session is
    /// opening or capturing.
    pub fn stop(&self) {
        let current = *self.state.read();
        if matches!(current, EngineState::Opening | EngineState::Capturing) {
            info!("stop requested");
            self.stop_flag.store(true, Ordering::SeqCst);
        }
    }

    /// Wait for the capture thread to finish.
    pub fn join(&mut self) {
        if let Some(handle) = self.worker.take() {
            let _ = handle.join();
        }
    }

    fn open_capture(&self, config: &CaptureConfig) -> Result<Capture<Active>> {
        let device = Device::list()
            .map_err(|e| anyhow!("failed to list devices: {}", e))?
            .into_iter()
            .find(|d| d.name == config.interface)
            .ok_or_else(|| anyhow!("interface not found: {}", config.interface))?;

        let mut capture = Capture::from_device(device)
            .map_err(|e| anyhow!("failed to create capture: {}", e))?
            .promisc(config.promiscuous)
            .snaplen(SNAPLEN)
            .timeout(config.timeout_ms)
            .open()
            .map_err(|e| anyhow!("failed to open capture: {}", e))?;

        if let Some(filter) = &config.filter {
            if let Err(e) = capture.filter(filter, true) {
                warn!("filter {:?} failed to compile, capturing unfiltered: {}", filter, e);
                let _ = self
                    .status_tx
                    .send(format!("Filter failed to compile ({}), capturing unfiltered", e));
            }
        }

        Ok(capture)
    }
}

/// The blocking acquisition loop. The stop flag is checked between frames,
/// never mid-frame; the read timeout bounds how long a check can be delayed.
/// The handle is released on every exit path before Closed is reported.
#[allow(clippy::too_many_arguments)]
fn run_loop(
    mut capture: Capture<Active>,
    link: LinkKind,
    limit: u64,
    stop_flag: Arc<AtomicBool>,
    queue: PacketQueue,
    store: Arc<SessionStore>,
    status_tx: mpsc::UnboundedSender<String>,
    state: Arc<RwLock<EngineState>>,
) {
    let decoder = PacketDecoder::new();
    let session_start = Instant::now();
    let mut seq: u64 = 0;
    let mut prev_ms: Option<u64> = None;

    loop {
        if stop_flag.load(Ordering::SeqCst) {
            break;
        }
        match capture.next_packet() {
            Ok(raw) => {
                seq += 1;
                let now_ms = session_start.elapsed().as_millis() as u64;
                let frame = RawFrame {
                    data: raw.data.to_vec(),
                    link,
                    captured_at: Utc::now(),
                };
                let decoded = decoder.decode(frame, seq, now_ms, prev_ms);
                prev_ms = Some(now_ms);

                store.insert(decoded.clone());
                queue.push(decoded);

                if limit > 0 && seq >= limit {
                    let _ = status_tx.send(format!("Packet limit {} reached", limit));
                    break;
                }
            }
            // Read timeout: normal, gives the stop flag a chance
            Err(pcap::Error::TimeoutExpired) => continue,
            Err(e) => {
                error!("capture loop error: {}", e);
                let _ = status_tx.send(format!("Capture error: {}", e));
                break;
            }
        }
    }

    *state.write() = EngineState::Stopping;
    // Release the handle before reporting Closed
    drop(capture);
    *state.write() = EngineState::Closed;
    let _ = status_tx.send(format!("Capture stopped after {} packets", seq));
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stop_on_idle_engine_is_a_noop() {
        let (engine, _status) = CaptureEngine::new();
        assert_eq!(engine.state(), EngineState::Idle);
        engine.stop();
        engine.stop();
        assert_eq!(engine.state(), EngineState::Idle);
    }

    #[test]
    fn start_with_unknown_interface_is_fatal() {
        let (mut engine, mut status) = CaptureEngine::new();
        let config = CaptureConfig {
            interface: "definitely-not-a-real-device-0".to_string(),
            ..CaptureConfig::default()
        };
        assert!(engine.start(config).is_err());
        assert_eq!(engine.state(), EngineState::Error);
        // failure was reported on the status channel, and no loop started
        let msg = status.try_recv().expect("expected a status message");
        assert!(msg.contains("Capture failed to start"));
        assert!(engine.store().is_empty());
    }

    #[test]
    fn engine_in_error_state_accepts_a_new_start_request() {
        let (mut engine, _status) = CaptureEngine::new();
        let bad = CaptureConfig {
            interface: "definitely-not-a-real-device-0".to_string(),
            ..CaptureConfig::default()
        };
        assert!(engine.start(bad.clone()).is_err());
        assert_eq!(engine.state(), EngineState::Error);
        // a second attempt is allowed (and fails the same way here)
        assert!(engine.start(bad).is_err());
    }
}
