use serde::{Deserialize, Serialize};

/// Parameters of one capture session.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CaptureConfig {
    /// Network interface to capture from
    pub interface: String,

    /// Optional BPF filter expression; a failure to compile is non-fatal
    pub filter: Option<String>,

    /// Stop after this many packets; 0 means unlimited
    pub limit: u64,

    /// Enable promiscuous mode
    pub promiscuous: bool,

    /// Read timeout in milliseconds; bounds how long the loop can go
    /// without observing the stop flag
    pub timeout_ms: i32,
}

impl Default for CaptureConfig {
    fn default() -> Self {
        Self {
            interface: String::new(),
            filter: None,
            limit: 0,
            promiscuous: true,
            timeout_ms: 100,
        }
    }
}
