use std::net::IpAddr;

use log::warn;

use crate::models::interface::InterfaceInfo;

/// Enumerate capture-capable interfaces.
///
/// pnet_datalink gives addresses and flags; if it returns nothing the pcap
/// device list is used as a fallback (names and descriptions only).
pub fn list_interfaces() -> Vec<InterfaceInfo> {
    let interfaces = pnet_datalink::interfaces();
    if !interfaces.is_empty() {
        return interfaces
            .into_iter()
            .map(|iface| {
                let mut info = InterfaceInfo::new(iface.name.clone());
                for ip in &iface.ips {
                    if let IpAddr::V4(ipv4) = ip.ip() {
                        info.ipv4_address = Some(ipv4.to_string());
                        break;
                    }
                }
                info.mac_address = iface.mac.map(|mac| mac.to_string());
                info.is_loopback = iface.is_loopback();
                info.is_up = iface.is_up();
                info
            })
            .collect();
    }

    match pcap::Device::list() {
        Ok(devices) => devices
            .into_iter()
            .map(|dev| {
                let mut info = InterfaceInfo::new(dev.name);
                info.description = dev.desc;
                info
            })
            .collect(),
        Err(e) => {
            warn!("failed to list devices from pcap: {}", e);
            Vec::new()
        }
    }
}
