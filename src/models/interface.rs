use serde::{Deserialize, Serialize};

/// Detailed information about a network interface.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InterfaceInfo {
    /// Device system name (used for capture operations)
    pub device_name: String,

    /// Interface description, when the driver provides one
    pub description: Option<String>,

    /// IPv4 address (if available)
    pub ipv4_address: Option<String>,

    /// MAC address (if available)
    pub mac_address: Option<String>,

    /// Whether this is a loopback interface
    pub is_loopback: bool,

    /// Whether this interface is up/active
    pub is_up: bool,
}

impl InterfaceInfo {
    pub fn new(device_name: String) -> Self {
        Self {
            device_name,
            description: None,
            ipv4_address: None,
            mac_address: None,
            is_loopback: false,
            is_up: true,
        }
    }

    /// Interface name with its IPv4 address when known.
    pub fn formatted_display(&self) -> String {
        if let Some(ip) = &self.ipv4_address {
            format!("{} ({})", self.device_name, ip)
        } else {
            self.device_name.clone()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn formatted_display_includes_ip_when_present() {
        let mut info = InterfaceInfo::new("eth0".into());
        assert_eq!(info.formatted_display(), "eth0");
        info.ipv4_address = Some("192.168.1.10".into());
        assert_eq!(info.formatted_display(), "eth0 (192.168.1.10)");
    }
}
