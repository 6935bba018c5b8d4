// src/shell/files.rs
//! Filesystem commands. Paths are resolved by `Storage` against its current directory.

use crate::error::CommandError;
use crate::logging::LogType;
use crate::shell::{CommandInvocation, Ctx, Flow};

pub const CAT_USAGE: &str = "cat <path>";
pub const RM_USAGE: &str = "rm <path> | rm -rf <dir>";
pub const CP_USAGE: &str = "cp <src> <dst>";
pub const MV_USAGE: &str = "mv <src> <dst>";
pub const MKF_USAGE: &str = "mkf <path>";
pub const MKDIR_USAGE: &str = "mkdir <path>";

const RECURSIVE_FLAG: &str = "-rf";

fn required<'i>(
    inv: &'i CommandInvocation,
    index: usize,
    usage: &'static str,
) -> Result<&'i str, CommandError> {
    inv.arg(index).ok_or(CommandError::Usage(usage))
}

pub fn cat(ctx: &mut Ctx<'_>, inv: &CommandInvocation) -> Result<Flow, CommandError> {
    let path = required(inv, 0, CAT_USAGE)?;
    let text = ctx.m.storage.read_to_string(path)?;
    ctx.logger.print(ctx.m, &text, LogType::None)?;
    Ok(Flow::Continue)
}

pub fn edit(ctx: &mut Ctx<'_>, inv: &CommandInvocation) -> Result<Flow, CommandError> {
    let path = match inv.arg(0) {
        Some(p) => Some(ctx.m.storage.full_path(p)?),
        None => None,
    };
    ctx.m.editor.open(path.as_deref())?;
    Ok(Flow::Continue)
}

/// `rm <file>` deletes a file; `rm -rf <dir>` deletes a directory tree and nothing else.
pub fn remove(ctx: &mut Ctx<'_>, inv: &CommandInvocation) -> Result<Flow, CommandError> {
    match inv.args.as_slice() {
        [flag, dir, ..] if flag == RECURSIVE_FLAG => ctx.m.storage.delete_dir_all(dir)?,
        [flag] if flag == RECURSIVE_FLAG => return Err(CommandError::Usage(RM_USAGE)),
        [path, ..] => ctx.m.storage.delete_file(path)?,
        [] => return Err(CommandError::Usage(RM_USAGE)),
    }
    Ok(Flow::Continue)
}

pub fn copy(ctx: &mut Ctx<'_>, inv: &CommandInvocation) -> Result<Flow, CommandError> {
    let from = required(inv, 0, CP_USAGE)?;
    let to = required(inv, 1, CP_USAGE)?;
    ctx.m.storage.copy_file(from, to)?;
    Ok(Flow::Continue)
}

/// Copy then delete; not atomic.
pub fn move_file(ctx: &mut Ctx<'_>, inv: &CommandInvocation) -> Result<Flow, CommandError> {
    let from = required(inv, 0, MV_USAGE)?;
    let to = required(inv, 1, MV_USAGE)?;
    ctx.m.storage.copy_file(from, to)?;
    ctx.m.storage.delete_file(from)?;
    Ok(Flow::Continue)
}

pub fn make_file(ctx: &mut Ctx<'_>, inv: &CommandInvocation) -> Result<Flow, CommandError> {
    let path = required(inv, 0, MKF_USAGE)?;
    ctx.m.storage.create_file(path)?;
    Ok(Flow::Continue)
}

pub fn make_dir(ctx: &mut Ctx<'_>, inv: &CommandInvocation) -> Result<Flow, CommandError> {
    let path = required(inv, 0, MKDIR_USAGE)?;
    ctx.m.storage.create_dir(path)?;
    Ok(Flow::Continue)
}

pub fn list(ctx: &mut Ctx<'_>, _inv: &CommandInvocation) -> Result<Flow, CommandError> {
    if !ctx.state.has_working_dir() {
        return Err(CommandError::NoWorkingDirectory);
    }
    let cwd = ctx.state.working_dir.clone();
    let files = ctx.m.storage.files(&cwd)?;
    let dirs = ctx.m.storage.directories(&cwd)?;
    let base = cwd.trim_end_matches('/');

    ctx.logger.print(ctx.m, &format!("[== {cwd} ==]"), LogType::None)?;
    for name in files {
        ctx.logger
            .print(ctx.m, &format!("[FILE] {base}/{name}"), LogType::None)?;
    }
    for name in dirs {
        ctx.logger
            .print(ctx.m, &format!("[DIR] {base}/{name}"), LogType::None)?;
    }
    ctx.m.console.write_line("")?;
    Ok(Flow::Continue)
}

/// Directory named by `cd`'s arguments. A leading quote makes everything
/// between the first and the last quote the name, spaces included.
pub fn cd_target(args: &[String]) -> Option<String> {
    let first = args.first()?;
    if !first.starts_with('"') {
        return Some(first.clone());
    }
    let joined = args.join(" ");
    let open = joined.find('"')?;
    let close = joined.rfind('"')?;
    if close <= open {
        return None;
    }
    Some(joined[open + 1..close].to_string())
}

pub fn change_dir(ctx: &mut Ctx<'_>, inv: &CommandInvocation) -> Result<Flow, CommandError> {
    const MISSING: &str = "A directory name must be specified.";

    let name = cd_target(&inv.args)
        .filter(|name| !name.trim().is_empty())
        .ok_or(CommandError::MissingArgument(MISSING))?;
    let full = ctx.m.storage.full_path(&name)?;
    if !ctx.m.storage.dir_exists(&full) {
        return Err(CommandError::DirectoryNotFound(name));
    }

    ctx.m.storage.set_current_dir(&full)?;
    ctx.state.working_dir = ctx.m.storage.current_dir().unwrap_or(full);
    Ok(Flow::Continue)
}
