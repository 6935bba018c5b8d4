// src/shell/system.rs
//! Console, power, report and help commands.

use tracing::warn;

use crate::error::{CommandError, KernelError};
use crate::hal::storage::DiskView;
use crate::logging::LogType;
use crate::shell::registry::COMMANDS;
use crate::shell::{CommandInvocation, Ctx, Flow};

pub fn clear(ctx: &mut Ctx<'_>, _inv: &CommandInvocation) -> Result<Flow, CommandError> {
    ctx.m.console.clear()?;
    Ok(Flow::Continue)
}

pub fn halt(ctx: &mut Ctx<'_>, _inv: &CommandInvocation) -> Result<Flow, CommandError> {
    ctx.logger.info(ctx.m, "The kernel has been halted.")?;
    Ok(Flow::Halt)
}

/// Returning from the platform call at all is the failure.
pub fn shutdown(ctx: &mut Ctx<'_>, _inv: &CommandInvocation) -> Result<Flow, CommandError> {
    if let Err(e) = ctx.m.platform.shutdown() {
        warn!(error = %e, "shutdown request failed");
    }
    Err(KernelError::ShutdownFailed.into())
}

pub fn reboot(ctx: &mut Ctx<'_>, _inv: &CommandInvocation) -> Result<Flow, CommandError> {
    if let Err(e) = ctx.m.platform.reboot() {
        warn!(error = %e, "reboot request failed");
    }
    Err(KernelError::RebootFailed.into())
}

fn format_uptime(seconds: i64) -> String {
    let seconds = seconds.max(0);
    format!(
        "{}:{:02}:{:02}",
        seconds / 3600,
        (seconds / 60) % 60,
        seconds % 60
    )
}

pub fn sysinfo(ctx: &mut Ctx<'_>, _inv: &CommandInvocation) -> Result<Flow, CommandError> {
    let view = DiskView::read(ctx.m.storage.as_ref())?;
    let classes = view.classes();
    ctx.state.used_ram_kb = ctx.m.platform.used_ram_kb();
    let now = ctx.m.platform.now();
    let uptime = now.signed_duration_since(ctx.state.started_at).num_seconds();

    let report = format!(
        "{banner}\n\
         Kernel start time: {start}\n\
         System uptime: {uptime}\n\
         CPU: {cpu}\n\
         CPU Vendor: {vendor}\n\
         CPU Uptime: {cpu_up}\n\
         RAM: {total} KB ({used} KB used, {pct}%)\n\
         Installed drives: {drives} (HDD: {hdd}, CD: {cd}, RVM: {rvm}, OTHER: {other})\n",
        banner = ctx.config.banner(),
        start = ctx.state.started_at.format("%Y-%m-%d %H:%M:%S"),
        uptime = format_uptime(uptime),
        cpu = ctx.m.platform.cpu_brand(),
        vendor = ctx.m.platform.cpu_vendor(),
        cpu_up = format_uptime(ctx.m.platform.cpu_uptime() as i64),
        total = ctx.state.total_ram_kb,
        used = ctx.state.used_ram_kb,
        pct = ctx.state.ram_percent(),
        drives = view.len(),
        hdd = classes.hard_drives,
        cd = classes.cds,
        rvm = classes.removable,
        other = classes.other,
    );
    ctx.logger.print(ctx.m, &report, LogType::None)?;
    Ok(Flow::Continue)
}

pub fn help(ctx: &mut Ctx<'_>, inv: &CommandInvocation) -> Result<Flow, CommandError> {
    if let Some(name) = inv.arg(0) {
        let command = COMMANDS
            .iter()
            .find(|c| c.names.iter().any(|n| *n == name))
            .ok_or_else(|| CommandError::InvalidCommand(name.to_string()))?;
        ctx.m.console.write_line(&format!("usage: {}", command.usage))?;
        if command.names.len() > 1 {
            ctx.m
                .console
                .write_line(&format!("aliases: {}", command.names[1..].join(", ")))?;
        }
        ctx.m.console.write_line(command.about)?;
        return Ok(Flow::Continue);
    }

    for command in COMMANDS {
        ctx.m
            .console
            .write_line(&format!("{:<12} {}", command.names[0], command.about))?;
    }
    Ok(Flow::Continue)
}
