// src/hal/mod.rs
//
// Phoenix hardware abstraction layer
// - One trait per collaborator: console, storage, network, platform, guest runtime, editor
// - `Machine` owns one boxed implementation of each and is threaded through boot and shell
// - `hosted` backs every trait with the host OS; tests swap in doubles

pub mod console;
pub mod editor;
pub mod guest;
pub mod hosted;
pub mod net;
pub mod platform;
pub mod storage;

pub use console::{Color, Console};
pub use editor::Editor;
pub use guest::{ExecutionContext, GuestProgram, GuestRuntime, HostHook, ImageFormat};
pub use net::{IcmpClient, IpConfig, NetworkDevice, NetworkStack};
pub use platform::Platform;
pub use storage::{BlockDeviceType, Disk, DiskView, Partition, Storage};

/// Every collaborator the core talks to.
///
/// Fields are public so callers can borrow two collaborators at once
/// (e.g. the network stack and the platform clock while pinging).
pub struct Machine {
    pub console: Box<dyn Console>,
    pub storage: Box<dyn Storage>,
    pub net: Box<dyn NetworkStack>,
    pub platform: Box<dyn Platform>,
    pub runtime: Box<dyn GuestRuntime>,
    pub editor: Box<dyn Editor>,
}

impl Machine {
    pub fn new(
        console: Box<dyn Console>,
        storage: Box<dyn Storage>,
        net: Box<dyn NetworkStack>,
        platform: Box<dyn Platform>,
        runtime: Box<dyn GuestRuntime>,
        editor: Box<dyn Editor>,
    ) -> Self {
        Self {
            console,
            storage,
            net,
            platform,
            runtime,
            editor,
        }
    }
}
