// tests/common/mod.rs
//! Test doubles for every collaborator except storage, which runs for real over tempdirs.

#![allow(dead_code)]

use std::cell::{Cell, RefCell};
use std::collections::{HashMap, HashSet, VecDeque};
use std::fs;
use std::net::Ipv4Addr;
use std::path::Path;
use std::rc::Rc;
use std::time::Duration;

use chrono::{DateTime, Local, TimeZone};

use phoenix::config::DiskConfig;
use phoenix::hal::hosted::storage::FS_MARKER;
use phoenix::hal::hosted::HostStorage;
use phoenix::hal::{
    Color, Console, Editor, ExecutionContext, GuestProgram, GuestRuntime, HostHook, IcmpClient,
    IpConfig, Machine, NetworkDevice, NetworkStack, Platform,
};
use phoenix::{GuestError, HalError};

// ───────────────────────────── disks ─────────────────────────────

/// `root/part0..n`, each carrying a FAT32 marker.
pub fn formatted_disk(root: &Path, partitions: usize) -> DiskConfig {
    for n in 0..partitions {
        let part = root.join(format!("part{n}"));
        fs::create_dir_all(&part).unwrap();
        fs::write(part.join(FS_MARKER), "FAT32").unwrap();
    }
    DiskConfig::hard_drive(root)
}

pub fn blank_disk(root: &Path) -> DiskConfig {
    DiskConfig::hard_drive(root)
}

/// Canonical string form of a tempdir path, as storage reports roots.
pub fn path_str(path: &Path) -> String {
    path.to_string_lossy().into_owned()
}

// ─────────────────────────── recorder ───────────────────────────

#[derive(Clone, Default)]
pub struct Recorder {
    pub output: Rc<RefCell<String>>,
    pub reads: Rc<Cell<usize>>,
    pub keys: Rc<Cell<usize>>,
    pub clears: Rc<Cell<usize>>,
    pub backgrounds: Rc<RefCell<Vec<Color>>>,
    pub clock_ms: Rc<Cell<u64>>,
    pub beeps: Rc<RefCell<Vec<(u32, Duration)>>>,
    pub sleeps: Rc<RefCell<Vec<Duration>>>,
    pub gc: Rc<Cell<u32>>,
    pub serial: Rc<RefCell<Vec<String>>>,
    pub echoes_sent: Rc<Cell<u32>>,
    pub open_clients: Rc<Cell<i32>>,
    pub guests: Rc<RefCell<Vec<(String, String)>>>,
    pub hooks: Rc<RefCell<Vec<String>>>,
    pub edited: Rc<RefCell<Vec<Option<String>>>>,
}

impl Recorder {
    pub fn output(&self) -> String {
        self.output.borrow().clone()
    }

    pub fn beep_count(&self) -> usize {
        self.beeps.borrow().len()
    }
}

// ───────────────────────────── console ─────────────────────────────

pub struct ScriptedConsole {
    input: VecDeque<String>,
    rec: Recorder,
}

impl Console for ScriptedConsole {
    fn write(&mut self, text: &str) -> Result<(), HalError> {
        self.rec.output.borrow_mut().push_str(text);
        Ok(())
    }

    fn read_line(&mut self) -> Result<Option<String>, HalError> {
        self.rec.reads.set(self.rec.reads.get() + 1);
        Ok(self.input.pop_front())
    }

    fn read_key(&mut self) -> Result<(), HalError> {
        self.rec.keys.set(self.rec.keys.get() + 1);
        Ok(())
    }

    fn set_foreground(&mut self, _color: Color) -> Result<(), HalError> {
        Ok(())
    }

    fn set_background(&mut self, color: Color) -> Result<(), HalError> {
        self.rec.backgrounds.borrow_mut().push(color);
        Ok(())
    }

    fn reset_colors(&mut self) -> Result<(), HalError> {
        Ok(())
    }

    fn clear(&mut self) -> Result<(), HalError> {
        self.rec.clears.set(self.rec.clears.get() + 1);
        Ok(())
    }

    fn size(&self) -> (u16, u16) {
        (80, 25)
    }

    fn set_cursor(&mut self, _column: u16, _row: u16) -> Result<(), HalError> {
        Ok(())
    }
}

// ───────────────────────────── platform ─────────────────────────────

/// Clock that only moves when someone sleeps or beeps.
pub struct MockPlatform {
    base: DateTime<Local>,
    fail: HashSet<&'static str>,
    serial_on: bool,
    rec: Recorder,
}

impl MockPlatform {
    fn fail(&self, step: &'static str) -> Result<(), HalError> {
        if self.fail.contains(step) {
            Err(HalError::Device(format!("{step} exploded")))
        } else {
            Ok(())
        }
    }

    fn advance(&self, d: Duration) {
        let ms = d.as_millis() as u64;
        self.rec.clock_ms.set(self.rec.clock_ms.get() + ms);
    }
}

impl Platform for MockPlatform {
    fn bootstrap(&mut self) -> Result<(), HalError> {
        self.fail("bootstrap")
    }

    fn global_init(&mut self) -> Result<(), HalError> {
        self.fail("global-init")
    }

    fn render_splash(&mut self, _banner: &str) -> Result<(), HalError> {
        self.fail("splash")
    }

    fn enable_serial(&mut self, _baud: u32) -> Result<(), HalError> {
        self.fail("serial")?;
        self.serial_on = true;
        Ok(())
    }

    fn serial_send(&mut self, text: &str) {
        if self.serial_on {
            self.rec.serial.borrow_mut().push(text.to_string());
        }
    }

    fn enable_interrupts(&mut self) -> Result<(), HalError> {
        self.fail("interrupts")
    }

    fn now(&self) -> DateTime<Local> {
        self.base + chrono::Duration::milliseconds(self.rec.clock_ms.get() as i64)
    }

    fn sleep(&mut self, duration: Duration) {
        self.rec.sleeps.borrow_mut().push(duration);
        self.advance(duration);
    }

    fn cpu_brand(&self) -> String {
        "Test CPU @ 1.00GHz".into()
    }

    fn cpu_vendor(&self) -> String {
        "GenuineTest".into()
    }

    fn cpu_uptime(&self) -> u64 {
        42
    }

    fn total_ram_kb(&self) -> u64 {
        1024
    }

    fn used_ram_kb(&mut self) -> u64 {
        256
    }

    fn collect_garbage(&mut self) {
        self.rec.gc.set(self.rec.gc.get() + 1);
    }

    fn beep(&mut self, frequency_hz: u32, duration: Duration) {
        self.rec.beeps.borrow_mut().push((frequency_hz, duration));
        self.advance(duration);
    }

    fn shutdown(&mut self) -> Result<(), HalError> {
        Err(HalError::Unsupported("power off"))
    }

    fn reboot(&mut self) -> Result<(), HalError> {
        Ok(())
    }
}

// ───────────────────────────── network ─────────────────────────────

pub struct MockNet {
    devices: Vec<NetworkDevice>,
    leases: HashMap<usize, IpConfig>,
    configs: HashMap<usize, IpConfig>,
    refuse_static_from: Option<usize>,
    reply_after: Option<Duration>,
    rec: Recorder,
}

impl NetworkStack for MockNet {
    fn devices(&self) -> Vec<NetworkDevice> {
        self.devices.clone()
    }

    fn dhcp_discover(&mut self, device: usize) -> Result<(), HalError> {
        if let Some(lease) = self.leases.get(&device) {
            self.configs.insert(device, *lease);
        }
        Ok(())
    }

    fn current_config(&self, device: usize) -> Option<IpConfig> {
        self.configs.get(&device).copied()
    }

    fn enable_static(&mut self, device: usize, config: IpConfig) -> Result<(), HalError> {
        if self.refuse_static_from.is_some_and(|from| device >= from) {
            return Ok(());
        }
        self.configs.insert(device, config);
        Ok(())
    }

    fn icmp_client(&mut self, _target: Ipv4Addr) -> Result<Box<dyn IcmpClient>, HalError> {
        self.rec.open_clients.set(self.rec.open_clients.get() + 1);
        Ok(Box::new(MockEcho {
            reply_after: self.reply_after,
            rec: self.rec.clone(),
        }))
    }
}

struct MockEcho {
    reply_after: Option<Duration>,
    rec: Recorder,
}

impl IcmpClient for MockEcho {
    fn send_echo(&mut self) -> Result<(), HalError> {
        self.rec.echoes_sent.set(self.rec.echoes_sent.get() + 1);
        Ok(())
    }

    fn receive(&mut self, timeout: Duration) -> Result<Option<Duration>, HalError> {
        Ok(self.reply_after.filter(|t| *t <= timeout))
    }
}

impl Drop for MockEcho {
    fn drop(&mut self) {
        self.rec.open_clients.set(self.rec.open_clients.get() - 1);
    }
}

pub fn nic(n: usize) -> NetworkDevice {
    NetworkDevice {
        name: format!("eth{n}"),
        name_id: format!("nic{n}"),
        mac: format!("52:54:00:00:00:{n:02x}"),
    }
}

// ───────────────────────────── guest runtime ─────────────────────────────

#[derive(Debug, Clone)]
pub enum GuestAction {
    Print(String),
    Hook(String, Vec<String>),
    Crash(i32),
}

pub struct MockRuntime {
    script: Vec<GuestAction>,
    rec: Recorder,
}

impl GuestRuntime for MockRuntime {
    fn instantiate(
        &mut self,
        program: GuestProgram,
        runtime_dir: &str,
    ) -> Result<Box<dyn ExecutionContext>, GuestError> {
        self.rec.guests.borrow_mut().push((program.path.clone(), runtime_dir.to_string()));
        Ok(Box::new(MockContext {
            script: self.script.clone(),
            hooks: HashMap::new(),
            rec: self.rec.clone(),
        }))
    }
}

struct MockContext {
    script: Vec<GuestAction>,
    hooks: HashMap<String, HostHook>,
    rec: Recorder,
}

impl ExecutionContext for MockContext {
    fn register_hook(&mut self, name: &str, hook: HostHook) {
        self.rec.hooks.borrow_mut().push(name.to_string());
        self.hooks.insert(name.to_string(), hook);
    }

    fn run(&mut self, console: &mut dyn Console) -> Result<(), GuestError> {
        for action in self.script.clone() {
            match action {
                GuestAction::Print(line) => {
                    console
                        .write_line(&line)
                        .map_err(|source| GuestError::Hook {
                            name: "print".into(),
                            source,
                        })?;
                }
                GuestAction::Hook(name, args) => {
                    let hook = self
                        .hooks
                        .get_mut(&name)
                        .ok_or_else(|| GuestError::UnknownHook(name.clone()))?;
                    hook(args.as_slice(), &mut *console)
                        .map_err(|source| GuestError::Hook { name, source })?;
                }
                GuestAction::Crash(code) => return Err(GuestError::Crashed { code: Some(code) }),
            }
        }
        Ok(())
    }
}

// ───────────────────────────── editor ─────────────────────────────

pub struct MockEditor {
    rec: Recorder,
}

impl Editor for MockEditor {
    fn open(&mut self, path: Option<&str>) -> Result<(), HalError> {
        self.rec.edited.borrow_mut().push(path.map(str::to_string));
        Ok(())
    }
}

// ───────────────────────────── builder ─────────────────────────────

pub struct TestMachine {
    input: Vec<String>,
    disks: Vec<DiskConfig>,
    devices: Vec<NetworkDevice>,
    leases: HashMap<usize, IpConfig>,
    refuse_static_from: Option<usize>,
    reply_after: Option<Duration>,
    fail: HashSet<&'static str>,
    script: Vec<GuestAction>,
}

impl TestMachine {
    pub fn new() -> Self {
        Self {
            input: Vec::new(),
            disks: Vec::new(),
            devices: Vec::new(),
            leases: HashMap::new(),
            refuse_static_from: None,
            reply_after: None,
            fail: HashSet::new(),
            script: Vec::new(),
        }
    }

    pub fn input(mut self, lines: &[&str]) -> Self {
        self.input = lines.iter().map(|l| l.to_string()).collect();
        self
    }

    pub fn disk(mut self, disk: DiskConfig) -> Self {
        self.disks.push(disk);
        self
    }

    pub fn nics(mut self, count: usize) -> Self {
        self.devices = (0..count).map(nic).collect();
        self
    }

    pub fn lease(mut self, device: usize, address: Ipv4Addr) -> Self {
        self.leases.insert(
            device,
            IpConfig {
                address,
                subnet_mask: Ipv4Addr::new(255, 255, 0, 0),
                default_gateway: Ipv4Addr::new(10, 0, 0, 1),
            },
        );
        self
    }

    pub fn refuse_static_from(mut self, device: usize) -> Self {
        self.refuse_static_from = Some(device);
        self
    }

    pub fn replies_after(mut self, rtt: Duration) -> Self {
        self.reply_after = Some(rtt);
        self
    }

    pub fn failing(mut self, step: &'static str) -> Self {
        self.fail.insert(step);
        self
    }

    pub fn guest(mut self, script: Vec<GuestAction>) -> Self {
        self.script = script;
        self
    }

    pub fn build(self) -> (Machine, Recorder) {
        let rec = Recorder::default();
        let base = Local
            .with_ymd_and_hms(2024, 3, 1, 12, 0, 0)
            .single()
            .unwrap();
        let machine = Machine::new(
            Box::new(ScriptedConsole {
                input: self.input.into(),
                rec: rec.clone(),
            }),
            Box::new(HostStorage::new(self.disks)),
            Box::new(MockNet {
                devices: self.devices,
                leases: self.leases,
                configs: HashMap::new(),
                refuse_static_from: self.refuse_static_from,
                reply_after: self.reply_after,
                rec: rec.clone(),
            }),
            Box::new(MockPlatform {
                base,
                fail: self.fail,
                serial_on: false,
                rec: rec.clone(),
            }),
            Box::new(MockRuntime {
                script: self.script,
                rec: rec.clone(),
            }),
            Box::new(MockEditor {
                rec: rec.clone(),
            }),
        );
        (machine, rec)
    }
}

impl Default for TestMachine {
    fn default() -> Self {
        Self::new()
    }
}
