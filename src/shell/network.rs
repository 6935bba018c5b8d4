// src/shell/network.rs
//! `ping <address>`

use crate::error::CommandError;
use crate::net::{parse_address, validate_address, NetworkProbe};
use crate::shell::{CommandInvocation, Ctx, Flow};

pub const PING_USAGE: &str = "ping <a.b.c.d>";

pub fn ping(ctx: &mut Ctx<'_>, inv: &CommandInvocation) -> Result<Flow, CommandError> {
    let text = inv.arg(0).ok_or(CommandError::Usage(PING_USAGE))?;
    if !validate_address(text) {
        return Err(CommandError::InvalidAddress(text.to_string()));
    }
    let target = parse_address(text);
    if target.is_unspecified() {
        return Err(CommandError::InvalidAddress(text.to_string()));
    }
    NetworkProbe::new(&ctx.config.network).ping(ctx.m, target)?;
    Ok(Flow::Continue)
}
