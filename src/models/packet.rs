use chrono::{DateTime, Utc};
use serde::Serialize;

/// Sentinel used wherever a layer could not be decoded.
pub const UNKNOWN: &str = "Unknown";

/// Sentinel port for protocols without transport ports.
pub const NO_PORT: i32 = -1;

/// Link-layer framing of a capture session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum LinkKind {
    /// Ethernet II (DLT_EN10MB)
    Ethernet,
    /// Linux cooked capture (DLT_LINUX_SLL)
    LinuxSll,
    /// Anything else; carries the raw DLT value
    Other(i32),
}

impl LinkKind {
    pub fn from_dlt(dlt: i32) -> Self {
        match dlt {
            1 => LinkKind::Ethernet,
            113 => LinkKind::LinuxSll,
            other => LinkKind::Other(other),
        }
    }

    pub fn dlt(&self) -> i32 {
        match self {
            LinkKind::Ethernet => 1,
            LinkKind::LinuxSll => 113,
            LinkKind::Other(v) => *v,
        }
    }
}

impl Default for LinkKind {
    fn default() -> Self {
        LinkKind::Ethernet
    }
}

/// One raw captured frame, handed from the capture loop to the decoder.
/// Not retained past decoding; the bytes move into the DecodedPacket.
#[derive(Debug, Clone)]
pub struct RawFrame {
    /// Bytes exactly as captured
    pub data: Vec<u8>,

    /// Link-layer framing of the capturing handle
    pub link: LinkKind,

    /// Wall-clock time of capture
    pub captured_at: DateTime<Utc>,
}

/// Free-text per-layer breakdown for inspection. Not a parsed AST.
#[derive(Debug, Clone, Default, Serialize)]
pub struct PacketDetail {
    /// Frame-level summary (number, length, link type)
    pub frame: String,

    /// Link layer (MAC addresses, ethertype)
    pub link: String,

    /// Network layer (addresses, next header)
    pub network: String,

    /// Transport layer (ports, flags)
    pub transport: String,

    /// Application layer (HTTP request line, or a note)
    pub application: String,
}

/// A fully decoded packet, the durable unit of a capture session.
///
/// Fields default to sentinels (`UNKNOWN` / `NO_PORT`) when a layer is absent
/// or malformed; decoding never fails outright.
#[derive(Debug, Clone, Serialize)]
pub struct DecodedPacket {
    /// Sequence number, 1-based and contiguous within a session
    pub seq: u64,

    /// Wall-clock capture time
    pub timestamp: DateTime<Utc>,

    /// Monotonic milliseconds since session start
    pub monotonic_ms: u64,

    /// Milliseconds since the previous packet in the session (0 for the first)
    pub delta_ms: u64,

    /// Source link-layer address, or `UNKNOWN`
    pub src_mac: String,

    /// Destination link-layer address, or `UNKNOWN`
    pub dst_mac: String,

    /// Source network address, or `UNKNOWN`
    pub src_addr: String,

    /// Destination network address, or `UNKNOWN`
    pub dst_addr: String,

    /// Source transport port, or `NO_PORT`
    pub src_port: i32,

    /// Destination transport port, or `NO_PORT`
    pub dst_port: i32,

    /// Protocol label: TCP, UDP, ICMP, ARP, HTTP, HTTPS, or the raw
    /// next-header name when none of those match
    pub protocol: String,

    /// Total captured length in bytes
    pub length: usize,

    /// Heuristic risk score in [0, 1]
    pub risk_score: f64,

    /// Uppercase hex dump of the whole raw frame, space separated
    pub hex_dump: String,

    /// Printable-ASCII dump of the whole raw frame
    pub ascii_dump: String,

    /// Per-layer detail sections, when any layer decoded
    pub detail: Option<PacketDetail>,

    /// The raw frame bytes, kept for byte-exact PCAP export
    #[serde(skip_serializing)]
    pub raw_data: Vec<u8>,
}

impl DecodedPacket {
    /// "addr:port" when a port is present, bare address otherwise.
    pub fn source_endpoint(&self) -> String {
        format_endpoint(&self.src_addr, self.src_port)
    }

    pub fn destination_endpoint(&self) -> String {
        format_endpoint(&self.dst_addr, self.dst_port)
    }

    /// Whether this packet can participate in flow/conversation tracking.
    /// Un-ported protocols (ARP, plain ICMP) are not flow-keyable.
    pub fn is_flow_keyable(&self) -> bool {
        self.src_port != NO_PORT && self.dst_port != NO_PORT
    }
}

pub fn format_endpoint(addr: &str, port: i32) -> String {
    if port == NO_PORT {
        addr.to_string()
    } else {
        format!("{}:{}", addr, port)
    }
}
