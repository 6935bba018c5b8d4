// src/hal/net.rs
//! Network interfaces, address assignment and ICMP echo.

use std::net::Ipv4Addr;
use std::time::Duration;

use crate::error::HalError;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NetworkDevice {
    /// Adapter name, e.g. `eth0`.
    pub name: String,
    /// Stable adapter id.
    pub name_id: String,
    pub mac: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IpConfig {
    pub address: Ipv4Addr,
    pub subnet_mask: Ipv4Addr,
    pub default_gateway: Ipv4Addr,
}

pub trait NetworkStack {
    fn devices(&self) -> Vec<NetworkDevice>;

    /// Run one DHCP discover exchange on `device`. A lease, if any, becomes
    /// visible through `current_config`.
    fn dhcp_discover(&mut self, device: usize) -> Result<(), HalError>;

    fn current_config(&self, device: usize) -> Option<IpConfig>;

    fn enable_static(&mut self, device: usize, config: IpConfig) -> Result<(), HalError>;

    /// Open a transient echo client bound to `target`. Dropping it releases it.
    fn icmp_client(&mut self, target: Ipv4Addr) -> Result<Box<dyn IcmpClient>, HalError>;
}

pub trait IcmpClient {
    fn send_echo(&mut self) -> Result<(), HalError>;

    /// Wait at most `timeout` for the matching reply. `None` on timeout.
    fn receive(&mut self, timeout: Duration) -> Result<Option<Duration>, HalError>;
}
