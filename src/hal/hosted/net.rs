// src/hal/hosted/net.rs
//! Host network adapters via sysinfo; ICMP echo through the system `ping`.

use std::collections::HashMap;
use std::net::Ipv4Addr;
use std::process::{Child, Command, Stdio};
use std::thread;
use std::time::{Duration, Instant};

use sysinfo::Networks;
use tracing::debug;

use crate::error::HalError;
use crate::hal::net::{IcmpClient, IpConfig, NetworkDevice, NetworkStack};

const POLL_STEP: Duration = Duration::from_millis(10);

pub struct HostNetwork {
    devices: Vec<NetworkDevice>,
    configs: HashMap<usize, IpConfig>,
}

impl HostNetwork {
    /// Enumerate the host's adapters, loopback excluded, sorted by name.
    pub fn discover() -> Self {
        let networks = Networks::new_with_refreshed_list();
        let mut devices: Vec<NetworkDevice> = networks
            .iter()
            .filter(|(name, _)| name.as_str() != "lo")
            .map(|(name, data)| NetworkDevice {
                name: name.clone(),
                name_id: name.clone(),
                mac: data.mac_address().to_string(),
            })
            .collect();
        devices.sort_by(|a, b| a.name.cmp(&b.name));
        Self::with_devices(devices)
    }

    pub fn with_devices(devices: Vec<NetworkDevice>) -> Self {
        Self {
            devices,
            configs: HashMap::new(),
        }
    }

    fn check(&self, device: usize) -> Result<(), HalError> {
        if device < self.devices.len() {
            Ok(())
        } else {
            Err(HalError::OutOfRange {
                what: "network device",
                index: device,
                max: self.devices.len().saturating_sub(1),
            })
        }
    }
}

impl NetworkStack for HostNetwork {
    fn devices(&self) -> Vec<NetworkDevice> {
        self.devices.clone()
    }

    fn dhcp_discover(&mut self, device: usize) -> Result<(), HalError> {
        self.check(device)?;
        // No DHCP client on the hosted stack: the exchange never yields a lease.
        debug!(device, "dhcp discover sent, no lease");
        Ok(())
    }

    fn current_config(&self, device: usize) -> Option<IpConfig> {
        self.configs.get(&device).copied()
    }

    fn enable_static(&mut self, device: usize, config: IpConfig) -> Result<(), HalError> {
        self.check(device)?;
        self.configs.insert(device, config);
        Ok(())
    }

    fn icmp_client(&mut self, target: Ipv4Addr) -> Result<Box<dyn IcmpClient>, HalError> {
        Ok(Box::new(PingProcess {
            target,
            child: None,
            sent_at: None,
        }))
    }
}

/// One echo request, carried by a `ping -c 1` child.
struct PingProcess {
    target: Ipv4Addr,
    child: Option<Child>,
    sent_at: Option<Instant>,
}

impl IcmpClient for PingProcess {
    fn send_echo(&mut self) -> Result<(), HalError> {
        let child = Command::new("ping")
            .args(["-c", "1", "-n"])
            .arg(self.target.to_string())
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .spawn()?;
        self.child = Some(child);
        self.sent_at = Some(Instant::now());
        Ok(())
    }

    fn receive(&mut self, timeout: Duration) -> Result<Option<Duration>, HalError> {
        let (Some(child), Some(sent_at)) = (self.child.as_mut(), self.sent_at) else {
            return Err(HalError::Device("no echo request outstanding".into()));
        };
        loop {
            if let Some(status) = child.try_wait()? {
                self.child = None;
                return Ok(status.success().then(|| sent_at.elapsed()));
            }
            if sent_at.elapsed() >= timeout {
                return Ok(None);
            }
            thread::sleep(POLL_STEP);
        }
    }
}

impl Drop for PingProcess {
    fn drop(&mut self) {
        if let Some(mut child) = self.child.take() {
            let _ = child.kill();
            let _ = child.wait();
        }
    }
}
