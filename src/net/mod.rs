// src/net/mod.rs
//
// Network side of the control plane
// - address: dotted-quad validation/parsing
// - probe: ICMP round trip and the `ping` loop
// - interface bring-up: DHCP first, deterministic static fallback second

pub mod address;
pub mod probe;

use std::fmt;
use std::net::Ipv4Addr;

use tracing::debug;

use crate::config::NetworkConfig;
use crate::error::HalError;
use crate::hal::net::{IpConfig, NetworkDevice, NetworkStack};

pub use address::{parse_address, validate_address};
pub use probe::{icmp_round_trip, EchoOutcome, NetworkProbe, PingSummary};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AddressSource {
    Dhcp,
    Static,
}

/// Final configuration of one adapter, as assigned at boot.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NetworkInterfaceConfig {
    pub address: Ipv4Addr,
    pub subnet_mask: Ipv4Addr,
    pub default_gateway: Ipv4Addr,
    pub mac: String,
    pub adapter_name: String,
    pub adapter_id: String,
    pub source: AddressSource,
}

impl NetworkInterfaceConfig {
    fn new(device: &NetworkDevice, ip: IpConfig, source: AddressSource) -> Self {
        Self {
            address: ip.address,
            subnet_mask: ip.subnet_mask,
            default_gateway: ip.default_gateway,
            mac: device.mac.clone(),
            adapter_name: device.name.clone(),
            adapter_id: device.name_id.clone(),
            source,
        }
    }
}

impl fmt::Display for NetworkInterfaceConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "[== {} ({}) CONFIGURATION ==]",
            self.adapter_name, self.adapter_id
        )?;
        writeln!(f, "IP: {}", self.address)?;
        writeln!(f, "Subnet: {}", self.subnet_mask)?;
        writeln!(f, "Default gateway: {}", self.default_gateway)?;
        writeln!(f, "MAC: {}", self.mac)?;
        writeln!(f, "Adapter: {}", self.adapter_name)?;
        write!(f, "ID: {}", self.adapter_id)
    }
}

/// `prefix.(base + index)` with the configured mask and gateway.
/// `None` once the host octet would pass 255.
pub fn fallback_config(index: usize, cfg: &NetworkConfig) -> Option<IpConfig> {
    let offset = u8::try_from(index).ok()?;
    let host = cfg.fallback_host_base.checked_add(offset)?;
    let [a, b, c] = cfg.fallback_prefix;
    Some(IpConfig {
        address: Ipv4Addr::new(a, b, c, host),
        subnet_mask: cfg.subnet_mask,
        default_gateway: cfg.gateway,
    })
}

fn leased(net: &dyn NetworkStack, index: usize) -> Option<IpConfig> {
    net.current_config(index)
        .filter(|ip| !ip.address.is_unspecified())
}

/// Bring one adapter up: one DHCP exchange, then the static fallback.
/// `None` means the adapter is still unconfigured after both.
pub fn configure_interface(
    net: &mut dyn NetworkStack,
    index: usize,
    device: &NetworkDevice,
    cfg: &NetworkConfig,
) -> Result<Option<NetworkInterfaceConfig>, HalError> {
    if let Err(e) = net.dhcp_discover(index) {
        debug!(index, error = %e, "dhcp exchange failed");
    }
    if let Some(ip) = leased(net, index) {
        return Ok(Some(NetworkInterfaceConfig::new(device, ip, AddressSource::Dhcp)));
    }

    let Some(fallback) = fallback_config(index, cfg) else {
        return Ok(None);
    };
    net.enable_static(index, fallback)?;
    Ok(leased(net, index).map(|ip| NetworkInterfaceConfig::new(device, ip, AddressSource::Static)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fallback_follows_interface_index() {
        let cfg = NetworkConfig::default();
        let ip = fallback_config(2, &cfg).unwrap();
        assert_eq!(ip.address, Ipv4Addr::new(192, 168, 1, 71));
        assert_eq!(ip.subnet_mask, Ipv4Addr::new(255, 255, 255, 0));
        assert_eq!(ip.default_gateway, Ipv4Addr::new(192, 168, 1, 254));
    }

    #[test]
    fn fallback_runs_out_of_host_octets() {
        let cfg = NetworkConfig::default();
        assert!(fallback_config(186, &cfg).is_some());
        assert!(fallback_config(187, &cfg).is_none());
        assert!(fallback_config(10_000, &cfg).is_none());
    }

    #[test]
    fn display_block() {
        let cfg = NetworkInterfaceConfig {
            address: Ipv4Addr::new(10, 0, 0, 2),
            subnet_mask: Ipv4Addr::new(255, 0, 0, 0),
            default_gateway: Ipv4Addr::new(10, 0, 0, 1),
            mac: "aa:bb".into(),
            adapter_name: "eth0".into(),
            adapter_id: "0".into(),
            source: AddressSource::Dhcp,
        };
        let text = cfg.to_string();
        assert!(text.starts_with("[== eth0 (0) CONFIGURATION ==]\nIP: 10.0.0.2\n"));
        assert!(text.ends_with("ID: 0"));
    }
}
