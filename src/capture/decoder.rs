use log::{log_enabled, trace, Level};
use pnet::packet::{
    arp::ArpPacket,
    ethernet::{EtherType, EtherTypes, EthernetPacket},
    ip::{IpNextHeaderProtocol, IpNextHeaderProtocols},
    ipv4::Ipv4Packet,
    ipv6::Ipv6Packet,
    tcp::TcpPacket,
    udp::UdpPacket,
    Packet as PnetPacket,
};

use crate::models::packet::{
    DecodedPacket, LinkKind, PacketDetail, RawFrame, NO_PORT, UNKNOWN,
};

/// Linux cooked capture (SLL) header length.
const SLL_HEADER_LEN: usize = 16;

/// Inputs to the risk heuristic.
pub struct RiskInput<'a> {
    pub protocol: &'a str,
    pub tcp_flags: Option<u16>,
}

/// Replaceable scoring function attached to every decoded packet.
/// The score is a heuristic signal in [0, 1], not a security verdict.
pub trait RiskScorer: Send + Sync {
    fn score(&self, input: RiskInput<'_>) -> f64;
}

/// Default heuristic: an unacknowledged TCP connection attempt (SYN without
/// ACK) scores 0.7, any other TCP segment 0.1, everything else 0.
pub struct SynHeuristic;

impl RiskScorer for SynHeuristic {
    fn score(&self, input: RiskInput<'_>) -> f64 {
        match input.tcp_flags {
            Some(flags) => {
                let syn = flags & 0x02 != 0;
                let ack = flags & 0x10 != 0;
                if syn && !ack {
                    0.7
                } else {
                    0.1
                }
            }
            None => 0.0,
        }
    }
}

/// Decodes raw frames into structured packets by peeling link, network,
/// transport and (shallow) application headers.
///
/// Decoding is total: malformed or unrecognized structure degrades to
/// sentinel values instead of failing, so the capture loop never stops on a
/// bad frame. The decoder performs no I/O and holds no per-frame state.
pub struct PacketDecoder {
    scorer: Box<dyn RiskScorer>,
}

/// Fields extracted while peeling headers; starts out all sentinels.
struct Scratch {
    src_mac: String,
    dst_mac: String,
    src_addr: String,
    dst_addr: String,
    src_port: i32,
    dst_port: i32,
    protocol: String,
    tcp_flags: Option<u16>,
    link_section: String,
    network_section: String,
    transport_section: String,
    application_section: String,
}

impl Scratch {
    fn new() -> Self {
        Self {
            src_mac: UNKNOWN.to_string(),
            dst_mac: UNKNOWN.to_string(),
            src_addr: UNKNOWN.to_string(),
            dst_addr: UNKNOWN.to_string(),
            src_port: NO_PORT,
            dst_port: NO_PORT,
            protocol: UNKNOWN.to_string(),
            tcp_flags: None,
            link_section: "No link-layer header decoded".to_string(),
            network_section: "No network-layer header decoded".to_string(),
            transport_section: "No transport-layer header decoded".to_string(),
            application_section: "None".to_string(),
        }
    }
}

impl Default for PacketDecoder {
    fn default() -> Self {
        Self::new()
    }
}

impl PacketDecoder {
    pub fn new() -> Self {
        Self {
            scorer: Box::new(SynHeuristic),
        }
    }

    pub fn with_scorer(scorer: Box<dyn RiskScorer>) -> Self {
        Self { scorer }
    }

    /// Decode one frame. `seq` is the caller-supplied sequence number,
    /// `monotonic_ms` the capture instant on the session clock, and
    /// `prev_monotonic_ms` the previous packet's instant when one exists.
    pub fn decode(
        &self,
        frame: RawFrame,
        seq: u64,
        monotonic_ms: u64,
        prev_monotonic_ms: Option<u64>,
    ) -> DecodedPacket {
        let data = &frame.data;
        let mut scratch = Scratch::new();

        if log_enabled!(Level::Trace) {
            trace!("decoding frame #{}: {} bytes, {:?}", seq, data.len(), frame.link);
        }

        self.peel_link(frame.link, data, &mut scratch);

        let risk_score = self.scorer.score(RiskInput {
            protocol: &scratch.protocol,
            tcp_flags: scratch.tcp_flags,
        });

        let (hex_dump, ascii_dump) = dump(data);
        let delta_ms = prev_monotonic_ms
            .map(|prev| monotonic_ms.saturating_sub(prev))
            .unwrap_or(0);

        let detail = PacketDetail {
            frame: format!(
                "Frame {}: {} bytes captured ({:?})",
                seq,
                data.len(),
                frame.link
            ),
            link: scratch.link_section,
            network: scratch.network_section,
            transport: scratch.transport_section,
            application: scratch.application_section,
        };

        DecodedPacket {
            seq,
            timestamp: frame.captured_at,
            monotonic_ms,
            delta_ms,
            src_mac: scratch.src_mac,
            dst_mac: scratch.dst_mac,
            src_addr: scratch.src_addr,
            dst_addr: scratch.dst_addr,
            src_port: scratch.src_port,
            dst_port: scratch.dst_port,
            protocol: scratch.protocol,
            length: data.len(),
            risk_score,
            hex_dump,
            ascii_dump,
            detail: Some(detail),
            raw_data: frame.data,
        }
    }

    /// Step 1: peel the outermost link-layer header, then hand the payload
    /// to the network classifier.
    fn peel_link(&self, link: LinkKind, data: &[u8], scratch: &mut Scratch) {
        match link {
            LinkKind::Ethernet => {
                if let Some(eth) = EthernetPacket::new(data) {
                    scratch.src_mac = eth.get_source().to_string();
                    scratch.dst_mac = eth.get_destination().to_string();
                    scratch.link_section = format!(
                        "Ethernet II, src {}, dst {}, type {:?}",
                        eth.get_source(),
                        eth.get_destination(),
                        eth.get_ethertype()
                    );
                    self.classify_network(Some(eth.get_ethertype()), eth.payload(), scratch);
                }
            }
            LinkKind::LinuxSll => {
                if data.len() >= SLL_HEADER_LEN {
                    // pkttype(2) hatype(2) halen(2) addr(8) protocol(2)
                    let halen = u16::from_be_bytes([data[4], data[5]]) as usize;
                    if halen > 0 && halen <= 8 {
                        scratch.src_mac = data[6..6 + halen]
                            .iter()
                            .map(|b| format!("{:02x}", b))
                            .collect::<Vec<_>>()
                            .join(":");
                    }
                    let ethertype = EtherType(u16::from_be_bytes([data[14], data[15]]));
                    scratch.link_section = format!(
                        "Linux cooked capture, src {}, type {:?}",
                        scratch.src_mac, ethertype
                    );
                    self.classify_network(Some(ethertype), &data[SLL_HEADER_LEN..], scratch);
                }
            }
            LinkKind::Other(_) => {
                // No known link framing; classify by the version nibble.
                self.classify_network(None, data, scratch);
            }
        }
    }

    /// Step 2: classify the post-link payload as IPv4, IPv6 or ARP.
    fn classify_network(&self, ethertype: Option<EtherType>, payload: &[u8], scratch: &mut Scratch) {
        let kind = match ethertype {
            Some(EtherTypes::Ipv4) => NetworkKind::Ipv4,
            Some(EtherTypes::Ipv6) => NetworkKind::Ipv6,
            Some(EtherTypes::Arp) => NetworkKind::Arp,
            Some(_) => return,
            // Link layer gave no discriminator; fall back to the IP version
            None => match payload.first().map(|b| b >> 4) {
                Some(4) => NetworkKind::Ipv4,
                Some(6) => NetworkKind::Ipv6,
                _ => return,
            },
        };

        match kind {
            NetworkKind::Ipv4 => self.parse_ipv4(payload, scratch),
            NetworkKind::Ipv6 => self.parse_ipv6(payload, scratch),
            NetworkKind::Arp => self.parse_arp(payload, scratch),
        }
    }

    fn parse_ipv4(&self, payload: &[u8], scratch: &mut Scratch) {
        let Some(ip) = Ipv4Packet::new(payload) else {
            return;
        };
        scratch.src_addr = ip.get_source().to_string();
        scratch.dst_addr = ip.get_destination().to_string();
        let next = ip.get_next_level_protocol();
        scratch.network_section = format!(
            "IPv4, src {}, dst {}, ttl {}, proto {}",
            ip.get_source(),
            ip.get_destination(),
            ip.get_ttl(),
            protocol_name(next)
        );
        self.parse_transport(next, ip.payload(), scratch);
    }

    fn parse_ipv6(&self, payload: &[u8], scratch: &mut Scratch) {
        let Some(ip) = Ipv6Packet::new(payload) else {
            return;
        };
        scratch.src_addr = ip.get_source().to_string();
        scratch.dst_addr = ip.get_destination().to_string();
        let next = ip.get_next_header();
        scratch.network_section = format!(
            "IPv6, src {}, dst {}, hop limit {}, next header {}",
            ip.get_source(),
            ip.get_destination(),
            ip.get_hop_limit(),
            protocol_name(next)
        );
        self.parse_transport(next, ip.payload(), scratch);
    }

    /// Step 5: ARP carries its protocol addresses in its own header.
    fn parse_arp(&self, payload: &[u8], scratch: &mut Scratch) {
        let Some(arp) = ArpPacket::new(payload) else {
            return;
        };
        scratch.protocol = "ARP".to_string();
        scratch.src_addr = arp.get_sender_proto_addr().to_string();
        scratch.dst_addr = arp.get_target_proto_addr().to_string();
        scratch.network_section = format!(
            "ARP {:?}, sender {} ({}), target {} ({})",
            arp.get_operation(),
            arp.get_sender_proto_addr(),
            arp.get_sender_hw_addr(),
            arp.get_target_proto_addr(),
            arp.get_target_hw_addr()
        );
    }

    /// Steps 3 and 4: transport extraction plus the shallow application
    /// upgrade for TCP.
    fn parse_transport(&self, next: IpNextHeaderProtocol, payload: &[u8], scratch: &mut Scratch) {
        match next {
            IpNextHeaderProtocols::Tcp => {
                let Some(tcp) = TcpPacket::new(payload) else {
                    scratch.protocol = "TCP".to_string();
                    return;
                };
                let sp = tcp.get_source();
                let dp = tcp.get_destination();
                let flags = tcp.get_flags() as u16;
                scratch.protocol = "TCP".to_string();
                scratch.src_port = sp as i32;
                scratch.dst_port = dp as i32;
                scratch.tcp_flags = Some(flags);
                scratch.transport_section = format!(
                    "TCP, src port {}, dst port {}, flags [{}]",
                    sp,
                    dp,
                    tcp_flag_names(flags)
                );
                self.upgrade_application(sp, dp, tcp.payload(), scratch);
            }
            IpNextHeaderProtocols::Udp => {
                let Some(udp) = UdpPacket::new(payload) else {
                    scratch.protocol = "UDP".to_string();
                    return;
                };
                scratch.protocol = "UDP".to_string();
                scratch.src_port = udp.get_source() as i32;
                scratch.dst_port = udp.get_destination() as i32;
                scratch.transport_section = format!(
                    "UDP, src port {}, dst port {}, length {}",
                    udp.get_source(),
                    udp.get_destination(),
                    udp.get_length()
                );
            }
            other => {
                scratch.protocol = protocol_name(other);
                scratch.transport_section = scratch.protocol.clone();
            }
        }
    }

    /// Relabel TCP as HTTP (port 80 or a request-line prefix) or HTTPS
    /// (port 443, no inspection of the encrypted payload). The asymmetry is
    /// deliberate; the risk score keeps its TCP value.
    fn upgrade_application(&self, sp: u16, dp: u16, payload: &[u8], scratch: &mut Scratch) {
        if sp == 80 || dp == 80 || looks_like_http_request(payload) {
            scratch.protocol = "HTTP".to_string();
            if let Some(line) = http_request_line(payload) {
                scratch.application_section = format!("HTTP: {}", line);
            } else {
                scratch.application_section = "HTTP".to_string();
            }
        } else if sp == 443 || dp == 443 {
            scratch.protocol = "HTTPS".to_string();
            scratch.application_section = "HTTPS (encrypted)".to_string();
        }
    }
}

enum NetworkKind {
    Ipv4,
    Ipv6,
    Arp,
}

/// Step 6: hex and printable-ASCII dumps over the original raw frame.
fn dump(data: &[u8]) -> (String, String) {
    let mut hex = String::with_capacity(data.len() * 3);
    let mut ascii = String::with_capacity(data.len());
    for b in data {
        hex.push_str(&format!("{:02X} ", b));
        ascii.push(if (0x20..=0x7E).contains(b) {
            *b as char
        } else {
            '.'
        });
    }
    (hex.trim_end().to_string(), ascii)
}

/// Short uppercase name for a next-header value, numeric fallback.
fn protocol_name(proto: IpNextHeaderProtocol) -> String {
    match proto {
        IpNextHeaderProtocols::Icmp => "ICMP".to_string(),
        IpNextHeaderProtocols::Icmpv6 => "ICMPv6".to_string(),
        IpNextHeaderProtocols::Igmp => "IGMP".to_string(),
        IpNextHeaderProtocols::Gre => "GRE".to_string(),
        IpNextHeaderProtocols::Esp => "ESP".to_string(),
        IpNextHeaderProtocols::Ah => "AH".to_string(),
        IpNextHeaderProtocols::Sctp => "SCTP".to_string(),
        other => format!("IPPROTO-{}", other.0),
    }
}

fn tcp_flag_names(flags: u16) -> String {
    const NAMES: [(u16, &str); 6] = [
        (0x02, "SYN"),
        (0x10, "ACK"),
        (0x01, "FIN"),
        (0x04, "RST"),
        (0x08, "PSH"),
        (0x20, "URG"),
    ];
    NAMES
        .iter()
        .filter(|(bit, _)| flags & bit != 0)
        .map(|(_, name)| *name)
        .collect::<Vec<_>>()
        .join(" ")
}

const HTTP_METHODS: [&[u8]; 9] = [
    b"GET ", b"POST ", b"PUT ", b"DELETE ", b"HEAD ", b"OPTIONS ", b"PATCH ", b"TRACE ",
    b"CONNECT ",
];

fn looks_like_http_request(payload: &[u8]) -> bool {
    HTTP_METHODS.iter().any(|m| payload.starts_with(m))
}

/// First line of the payload, up to the line terminator.
fn http_request_line(payload: &[u8]) -> Option<String> {
    if payload.is_empty() {
        return None;
    }
    let end = payload
        .iter()
        .position(|&b| b == b'\r' || b == b'\n')
        .unwrap_or(payload.len());
    let line = String::from_utf8_lossy(&payload[..end]).into_owned();
    if line.is_empty() {
        None
    } else {
        Some(line)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn frame(link: LinkKind, data: Vec<u8>) -> RawFrame {
        RawFrame {
            data,
            link,
            captured_at: Utc::now(),
        }
    }

    fn decode(link: LinkKind, data: Vec<u8>) -> DecodedPacket {
        PacketDecoder::new().decode(frame(link, data), 1, 0, None)
    }

    /// Ethernet + IPv4 + TCP frame with the given ports, flag byte and payload.
    fn ipv4_tcp_frame(sp: u16, dp: u16, flag_byte: u8, payload: &[u8]) -> Vec<u8> {
        let mut f = Vec::new();
        // Ethernet
        f.extend_from_slice(&[0x11, 0x22, 0x33, 0x44, 0x55, 0x66]); // dst
        f.extend_from_slice(&[0xaa, 0xbb, 0xcc, 0xdd, 0xee, 0xff]); // src
        f.extend_from_slice(&[0x08, 0x00]); // IPv4
        // IPv4, 20-byte header
        let total = (20 + 20 + payload.len()) as u16;
        f.push(0x45);
        f.push(0x00);
        f.extend_from_slice(&total.to_be_bytes());
        f.extend_from_slice(&[0x00, 0x01, 0x00, 0x00]); // id, frag
        f.push(64); // ttl
        f.push(6); // TCP
        f.extend_from_slice(&[0x00, 0x00]); // checksum
        f.extend_from_slice(&[10, 0, 0, 1]);
        f.extend_from_slice(&[10, 0, 0, 2]);
        // TCP, 20-byte header
        f.extend_from_slice(&sp.to_be_bytes());
        f.extend_from_slice(&dp.to_be_bytes());
        f.extend_from_slice(&[0, 0, 0, 1]); // seq
        f.extend_from_slice(&[0, 0, 0, 0]); // ack
        f.push(0x50); // data offset 5
        f.push(flag_byte);
        f.extend_from_slice(&[0x10, 0x00]); // window
        f.extend_from_slice(&[0x00, 0x00, 0x00, 0x00]); // checksum, urg
        f.extend_from_slice(payload);
        f
    }

    fn ipv4_udp_frame(sp: u16, dp: u16, payload: &[u8]) -> Vec<u8> {
        let mut f = Vec::new();
        f.extend_from_slice(&[0x11, 0x22, 0x33, 0x44, 0x55, 0x66]);
        f.extend_from_slice(&[0xaa, 0xbb, 0xcc, 0xdd, 0xee, 0xff]);
        f.extend_from_slice(&[0x08, 0x00]);
        let total = (20 + 8 + payload.len()) as u16;
        f.push(0x45);
        f.push(0x00);
        f.extend_from_slice(&total.to_be_bytes());
        f.extend_from_slice(&[0x00, 0x01, 0x00, 0x00]);
        f.push(64);
        f.push(17); // UDP
        f.extend_from_slice(&[0x00, 0x00]);
        f.extend_from_slice(&[192, 168, 1, 5]);
        f.extend_from_slice(&[8, 8, 8, 8]);
        f.extend_from_slice(&sp.to_be_bytes());
        f.extend_from_slice(&dp.to_be_bytes());
        f.extend_from_slice(&((8 + payload.len()) as u16).to_be_bytes());
        f.extend_from_slice(&[0x00, 0x00]);
        f.extend_from_slice(payload);
        f
    }

    fn arp_request_frame() -> Vec<u8> {
        let mut f = Vec::new();
        f.extend_from_slice(&[0xff; 6]); // broadcast
        f.extend_from_slice(&[0xaa, 0xbb, 0xcc, 0xdd, 0xee, 0xff]);
        f.extend_from_slice(&[0x08, 0x06]); // ARP
        f.extend_from_slice(&[0x00, 0x01]); // ethernet
        f.extend_from_slice(&[0x08, 0x00]); // IPv4
        f.push(6);
        f.push(4);
        f.extend_from_slice(&[0x00, 0x01]); // request
        f.extend_from_slice(&[0xaa, 0xbb, 0xcc, 0xdd, 0xee, 0xff]);
        f.extend_from_slice(&[192, 168, 1, 10]);
        f.extend_from_slice(&[0x00; 6]);
        f.extend_from_slice(&[192, 168, 1, 1]);
        f
    }

    #[test]
    fn syn_without_ack_scores_high() {
        let p = decode(LinkKind::Ethernet, ipv4_tcp_frame(51000, 8443, 0x02, b""));
        assert_eq!(p.protocol, "TCP");
        assert_eq!(p.src_port, 51000);
        assert_eq!(p.dst_port, 8443);
        assert_eq!(p.risk_score, 0.7);
    }

    #[test]
    fn syn_ack_scores_low() {
        let p = decode(LinkKind::Ethernet, ipv4_tcp_frame(8443, 51000, 0x12, b""));
        assert_eq!(p.protocol, "TCP");
        assert_eq!(p.risk_score, 0.1);
    }

    #[test]
    fn udp_dns_has_ports_and_zero_risk() {
        let p = decode(LinkKind::Ethernet, ipv4_udp_frame(33000, 53, b"\x12\x34"));
        assert_eq!(p.protocol, "UDP");
        assert_eq!(p.src_port, 33000);
        assert_eq!(p.dst_port, 53);
        assert_eq!(p.risk_score, 0.0);
        assert_eq!(p.src_addr, "192.168.1.5");
        assert_eq!(p.dst_addr, "8.8.8.8");
    }

    #[test]
    fn arp_addresses_come_from_arp_header() {
        let p = decode(LinkKind::Ethernet, arp_request_frame());
        assert_eq!(p.protocol, "ARP");
        assert_eq!(p.src_addr, "192.168.1.10");
        assert_eq!(p.dst_addr, "192.168.1.1");
        assert_eq!(p.src_port, NO_PORT);
        assert_eq!(p.dst_port, NO_PORT);
    }

    #[test]
    fn port_80_relabels_as_http() {
        let p = decode(LinkKind::Ethernet, ipv4_tcp_frame(51000, 80, 0x18, b""));
        assert_eq!(p.protocol, "HTTP");
    }

    #[test]
    fn request_line_relabels_as_http_and_is_recorded() {
        let payload = b"GET /index.html HTTP/1.1\r\nHost: example.com\r\n";
        let p = decode(LinkKind::Ethernet, ipv4_tcp_frame(51000, 8080, 0x18, payload));
        assert_eq!(p.protocol, "HTTP");
        let detail = p.detail.unwrap();
        assert_eq!(detail.application, "HTTP: GET /index.html HTTP/1.1");
    }

    #[test]
    fn port_443_relabels_as_https_without_inspection() {
        let p = decode(LinkKind::Ethernet, ipv4_tcp_frame(51000, 443, 0x18, b"\x16\x03\x01"));
        assert_eq!(p.protocol, "HTTPS");
        // relabeling does not change the TCP risk value
        assert_eq!(p.risk_score, 0.1);
    }

    #[test]
    fn decoding_is_total_on_garbage() {
        for data in [vec![], vec![0xde], vec![0xad; 7], vec![0xff; 13]] {
            let p = decode(LinkKind::Ethernet, data.clone());
            assert_eq!(p.protocol, UNKNOWN);
            assert_eq!(p.src_addr, UNKNOWN);
            assert_eq!(p.src_mac, UNKNOWN);
            assert_eq!(p.src_port, NO_PORT);
            assert_eq!(p.length, data.len());
        }
    }

    #[test]
    fn truncated_ipv4_degrades_to_link_fields_only() {
        // valid Ethernet header claiming IPv4, followed by 3 junk bytes
        let mut data = Vec::new();
        data.extend_from_slice(&[0x11, 0x22, 0x33, 0x44, 0x55, 0x66]);
        data.extend_from_slice(&[0xaa, 0xbb, 0xcc, 0xdd, 0xee, 0xff]);
        data.extend_from_slice(&[0x08, 0x00]);
        data.extend_from_slice(&[0x45, 0x00, 0x00]);
        let p = decode(LinkKind::Ethernet, data);
        assert_eq!(p.src_mac, "aa:bb:cc:dd:ee:ff");
        assert_eq!(p.src_addr, UNKNOWN);
        assert_eq!(p.protocol, UNKNOWN);
    }

    #[test]
    fn sll_wrapped_tcp_decodes_ports_without_dst_mac() {
        let inner = ipv4_tcp_frame(40000, 22, 0x02, b"");
        let ip_part = &inner[14..]; // strip the ethernet header
        let mut data = Vec::new();
        data.extend_from_slice(&[0x00, 0x00]); // pkttype
        data.extend_from_slice(&[0x00, 0x01]); // hatype
        data.extend_from_slice(&[0x00, 0x06]); // halen
        data.extend_from_slice(&[0xaa, 0xbb, 0xcc, 0xdd, 0xee, 0xff, 0x00, 0x00]);
        data.extend_from_slice(&[0x08, 0x00]); // IPv4
        data.extend_from_slice(ip_part);

        let p = decode(LinkKind::LinuxSll, data);
        assert_eq!(p.protocol, "TCP");
        assert_eq!(p.src_port, 40000);
        assert_eq!(p.dst_port, 22);
        assert_eq!(p.src_mac, "aa:bb:cc:dd:ee:ff");
        assert_eq!(p.dst_mac, UNKNOWN);
    }

    #[test]
    fn hex_dump_round_trips_to_original_bytes() {
        let data = ipv4_udp_frame(1234, 5678, b"\x00\x01\x7f\x80\xff");
        let p = decode(LinkKind::Ethernet, data.clone());
        let parsed: Vec<u8> = p
            .hex_dump
            .split(' ')
            .map(|h| u8::from_str_radix(h, 16).unwrap())
            .collect();
        assert_eq!(parsed, data);
        assert!(!p.hex_dump.ends_with(' '));
    }

    #[test]
    fn ascii_dump_masks_unprintable_bytes() {
        let p = decode(LinkKind::Other(147), vec![0x41, 0x42, 0x00, 0x7f, 0x20, 0x7e]);
        assert_eq!(p.ascii_dump, "AB.. ~");
    }

    #[test]
    fn delta_is_zero_for_first_packet_and_difference_after() {
        let dec = PacketDecoder::new();
        let first = dec.decode(frame(LinkKind::Ethernet, vec![]), 1, 100, None);
        let second = dec.decode(frame(LinkKind::Ethernet, vec![]), 2, 250, Some(100));
        assert_eq!(first.delta_ms, 0);
        assert_eq!(second.delta_ms, 150);
    }

    #[test]
    fn icmp_labeled_by_next_header_name() {
        let mut f = Vec::new();
        f.extend_from_slice(&[0x11, 0x22, 0x33, 0x44, 0x55, 0x66]);
        f.extend_from_slice(&[0xaa, 0xbb, 0xcc, 0xdd, 0xee, 0xff]);
        f.extend_from_slice(&[0x08, 0x00]);
        f.push(0x45);
        f.push(0x00);
        f.extend_from_slice(&28u16.to_be_bytes());
        f.extend_from_slice(&[0x00, 0x01, 0x00, 0x00]);
        f.push(64);
        f.push(1); // ICMP
        f.extend_from_slice(&[0x00, 0x00]);
        f.extend_from_slice(&[10, 0, 0, 1]);
        f.extend_from_slice(&[10, 0, 0, 2]);
        f.extend_from_slice(&[8, 0, 0, 0, 0, 0, 0, 0]); // echo request
        let p = decode(LinkKind::Ethernet, f);
        assert_eq!(p.protocol, "ICMP");
        assert_eq!(p.src_port, NO_PORT);
    }

    #[test]
    fn custom_scorer_replaces_default() {
        struct Flat;
        impl RiskScorer for Flat {
            fn score(&self, _input: RiskInput<'_>) -> f64 {
                0.5
            }
        }
        let dec = PacketDecoder::with_scorer(Box::new(Flat));
        let p = dec.decode(
            frame(LinkKind::Ethernet, ipv4_tcp_frame(1, 2, 0x02, b"")),
            1,
            0,
            None,
        );
        assert_eq!(p.risk_score, 0.5);
    }
}
