// tests/loader.rs
mod common;

use std::fs;

use pretty_assertions::assert_eq;
use tempfile::TempDir;

use common::{formatted_disk, path_str, GuestAction, Recorder, TestMachine};
use phoenix::boot::BootSequencer;
use phoenix::config::DiskConfig;
use phoenix::loader::{discover_runtime, HOOK_TESTS_COMPLETE, HOOK_TEST_SUCCESS};
use phoenix::shell::{CommandShell, Flow, ShellState};
use phoenix::{Config, Logger, Machine};

fn boot(config: &Config, tm: TestMachine) -> (Machine, Recorder, ShellState) {
    let (mut m, rec) = tm.build();
    let report = BootSequencer::new(config, Logger::default())
        .run(&mut m)
        .unwrap();
    rec.output.borrow_mut().clear();
    (m, rec, report.shell_state())
}

/// One formatted partition holding `prog.bin`, optionally with a runtime directory.
fn disk_with_program(with_runtime: bool) -> TempDir {
    let disk = TempDir::new().unwrap();
    formatted_disk(disk.path(), 1);
    let root = disk.path().join("part0");
    fs::write(root.join("prog.bin"), b"MZ\x90\x00guest").unwrap();
    if with_runtime {
        fs::create_dir(root.join("framework")).unwrap();
    }
    disk
}

#[test]
fn program_without_runtime_is_refused() {
    let disk = disk_with_program(false);
    let config = Config::default();
    let (mut m, rec, state) = boot(
        &config,
        TestMachine::new().disk(DiskConfig::hard_drive(disk.path())),
    );
    let mut shell = CommandShell::new(&config, Logger::default(), state);

    assert_eq!(shell.execute(&mut m, "prog.bin").unwrap(), Flow::Continue);
    assert!(rec
        .output()
        .contains("guest runtime not found: no 'framework' directory on any mounted partition"));
    assert!(rec.guests.borrow().is_empty());
    assert!(rec.hooks.borrow().is_empty());
}

#[test]
fn guest_output_and_hooks_reach_the_console() {
    let disk = disk_with_program(true);
    let config = Config::default();
    let (mut m, rec, state) = boot(
        &config,
        TestMachine::new()
            .disk(DiskConfig::hard_drive(disk.path()))
            .guest(vec![
                GuestAction::Print("hello from guest".into()),
                GuestAction::Hook(HOOK_TEST_SUCCESS.into(), vec!["Alpha".into()]),
                GuestAction::Hook(HOOK_TEST_SUCCESS.into(), vec![]),
                GuestAction::Hook(HOOK_TESTS_COMPLETE.into(), vec![]),
            ]),
    );
    let mut shell = CommandShell::new(&config, Logger::default(), state);

    shell.execute(&mut m, "prog.bin").unwrap();

    let root = path_str(&disk.path().join("part0"));
    assert_eq!(
        *rec.guests.borrow(),
        vec![(format!("{root}/prog.bin"), format!("{root}/framework"))]
    );
    assert_eq!(
        *rec.hooks.borrow(),
        vec![HOOK_TEST_SUCCESS.to_string(), HOOK_TESTS_COMPLETE.to_string()]
    );
    assert_eq!(
        rec.output(),
        "hello from guest\nAlpha test succeeded\nunnamed test succeeded\nAll Tests Completed.\n"
    );
}

#[test]
fn runtime_installed_after_boot_is_found() {
    let disk = disk_with_program(false);
    let config = Config::default();
    let (mut m, rec, state) = boot(
        &config,
        TestMachine::new()
            .disk(DiskConfig::hard_drive(disk.path()))
            .guest(vec![GuestAction::Print("late start".into())]),
    );
    assert_eq!(state.runtime_path, None);
    let mut shell = CommandShell::new(&config, Logger::default(), state);

    fs::create_dir(disk.path().join("part0").join("framework")).unwrap();
    shell.execute(&mut m, "prog.bin").unwrap();

    assert!(rec.output().contains("late start"));
    assert_eq!(
        shell.state().runtime_path,
        Some(path_str(&disk.path().join("part0").join("framework")))
    );
}

#[test]
fn crashing_guest_leaves_the_shell_running() {
    let disk = disk_with_program(true);
    let config = Config::default();
    let (mut m, rec, state) = boot(
        &config,
        TestMachine::new()
            .disk(DiskConfig::hard_drive(disk.path()))
            .guest(vec![GuestAction::Print("about to fall over".into()), GuestAction::Crash(3)]),
    );
    let mut shell = CommandShell::new(&config, Logger::default(), state);

    assert_eq!(shell.execute(&mut m, "prog.bin").unwrap(), Flow::Continue);
    assert!(rec.output().contains("guest crashed (exit code 3)"));
    assert_eq!(rec.backgrounds.borrow().len(), 0);

    shell.execute(&mut m, "mkdir still-alive").unwrap();
    assert!(disk.path().join("part0").join("still-alive").is_dir());
}

#[test]
fn unknown_hook_is_a_guest_error() {
    let disk = disk_with_program(true);
    let config = Config::default();
    let (mut m, rec, state) = boot(
        &config,
        TestMachine::new()
            .disk(DiskConfig::hard_drive(disk.path()))
            .guest(vec![GuestAction::Hook("FormatEverything".into(), vec![])]),
    );
    let mut shell = CommandShell::new(&config, Logger::default(), state);

    shell.execute(&mut m, "prog.bin").unwrap();
    assert!(rec.output().contains("guest called unknown host hook 'FormatEverything'"));
}

#[test]
fn empty_image_is_not_loaded() {
    let disk = disk_with_program(true);
    fs::write(disk.path().join("part0").join("empty.bin"), b"").unwrap();
    let config = Config::default();
    let (mut m, rec, state) = boot(
        &config,
        TestMachine::new().disk(DiskConfig::hard_drive(disk.path())),
    );
    let mut shell = CommandShell::new(&config, Logger::default(), state);

    shell.execute(&mut m, "empty.bin").unwrap();
    assert!(rec.output().contains("is not a loadable program image"));
    assert!(rec.guests.borrow().is_empty());
}

#[test]
fn discovery_takes_first_partition_in_disk_order() {
    let d0 = TempDir::new().unwrap();
    let d1 = TempDir::new().unwrap();
    let config = Config::default();
    let cfg0 = formatted_disk(d0.path(), 2);
    let cfg1 = formatted_disk(d1.path(), 1);
    fs::create_dir(d0.path().join("part1").join("framework")).unwrap();
    fs::create_dir(d1.path().join("part0").join("framework")).unwrap();
    let (m, _rec, _state) = boot(&config, TestMachine::new().disk(cfg0).disk(cfg1));

    let found = discover_runtime(m.storage.as_ref(), "framework").unwrap();
    assert_eq!(found, Some(path_str(&d0.path().join("part1").join("framework"))));
    assert_eq!(discover_runtime(m.storage.as_ref(), "absent").unwrap(), None);
}

#[test]
fn removed_runtime_is_not_used_from_cache() {
    let disk = disk_with_program(true);
    let config = Config::default();
    let (mut m, rec, state) = boot(
        &config,
        TestMachine::new()
            .disk(DiskConfig::hard_drive(disk.path()))
            .guest(vec![GuestAction::Print("should not run".into())]),
    );
    assert!(state.runtime_path.is_some());
    let mut shell = CommandShell::new(&config, Logger::default(), state);

    shell.execute(&mut m, "rm -rf framework").unwrap();
    shell.execute(&mut m, "prog.bin").unwrap();

    assert!(rec.output().contains("guest runtime not found"));
    assert!(!rec.output().contains("should not run"));
    assert!(rec.guests.borrow().is_empty());
    assert_eq!(shell.state().runtime_path, None);
}
