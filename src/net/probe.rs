// src/net/probe.rs
//! ICMP echo round trips and the `ping` loop built on them.

use std::net::Ipv4Addr;
use std::time::Duration;

use tracing::debug;

use crate::config::NetworkConfig;
use crate::error::HalError;
use crate::hal::net::NetworkStack;
use crate::hal::Machine;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EchoOutcome {
    Reply(Duration),
    TimedOut,
}

/// One echo to `target`. The client is released when this returns.
pub fn icmp_round_trip(
    net: &mut dyn NetworkStack,
    target: Ipv4Addr,
    timeout: Duration,
) -> Result<EchoOutcome, HalError> {
    let mut client = net.icmp_client(target)?;
    client.send_echo()?;
    Ok(match client.receive(timeout)? {
        Some(elapsed) => EchoOutcome::Reply(elapsed),
        None => EchoOutcome::TimedOut,
    })
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PingSummary {
    pub sent: u32,
    pub received: u32,
}

impl PingSummary {
    pub fn percent(&self) -> u32 {
        if self.sent == 0 {
            0
        } else {
            self.received * 100 / self.sent
        }
    }
}

pub struct NetworkProbe {
    count: u32,
    timeout: Duration,
    pacing: Duration,
}

impl NetworkProbe {
    pub fn new(cfg: &NetworkConfig) -> Self {
        Self {
            count: cfg.ping_count,
            timeout: Duration::from_millis(cfg.ping_timeout_ms),
            pacing: Duration::from_millis(cfg.ping_pacing_ms),
        }
    }

    /// Probe `target` sequentially, pausing after every reply, and print the tally.
    pub fn ping(&self, m: &mut Machine, target: Ipv4Addr) -> Result<PingSummary, HalError> {
        let mut summary = PingSummary {
            sent: 0,
            received: 0,
        };
        m.console
            .write_line(&format!("Pinging {target} with {} echo requests:", self.count))?;

        for seq in 0..self.count {
            summary.sent += 1;
            match icmp_round_trip(m.net.as_mut(), target, self.timeout)? {
                EchoOutcome::Reply(elapsed) => {
                    summary.received += 1;
                    m.console.write_line(&format!(
                        "Reply from {target}: time={}ms",
                        elapsed.as_millis()
                    ))?;
                    m.platform.sleep(self.pacing);
                }
                EchoOutcome::TimedOut => {
                    debug!(%target, seq, "echo timed out");
                    m.console.write_line("Request timed out.")?;
                }
            }
        }

        m.console.write_line(&format!(
            "Ping statistics for {target}: {}/{} replies ({}%)",
            summary.received,
            summary.sent,
            summary.percent()
        ))?;
        Ok(summary)
    }
}
