// src/fatal.rs
//
// Fatal error containment
// - Announce: red/white palette, clear, banner with message + code, restart hint on the last row
// - Contain: never returns; every > interval seconds of RTC time, a short burst of beeps
// - policy: loop forever, no key-press reboot; the operator power-cycles the machine

use std::time::Duration;

use chrono::Timelike;
use tracing::error;

use crate::config::FatalConfig;
use crate::error::HalError;
use crate::hal::console::Color;
use crate::hal::Machine;

const ANNOUNCE_TONE: Duration = Duration::from_millis(800);
const PULSE: Duration = Duration::from_millis(200);
const PULSE_GAP: Duration = Duration::from_millis(200);
const POLL: Duration = Duration::from_millis(25);

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CriticalErrorRecord {
    pub message: String,
    pub code: i32,
    pub entered_at_second: u32,
}

impl CriticalErrorRecord {
    pub fn banner(&self) -> String {
        format!(
            "[=============================== CRITICAL ERROR ===============================]\
             ERROR MESSAGE: {}\nERROR CODE: {}",
            self.message, self.code
        )
    }
}

/// Fires once more than `interval` seconds have passed on a 0-59 second counter.
#[derive(Debug, Clone, Copy)]
pub struct AlarmTimer {
    interval: u32,
    reference: u32,
}

/// Elapsed time is measured within one minute, so 58 is the longest interval that can fire.
const MAX_INTERVAL: u32 = 58;

impl AlarmTimer {
    pub fn new(interval: u32, now_second: u32) -> Self {
        Self {
            interval: interval.min(MAX_INTERVAL),
            reference: now_second % 60,
        }
    }

    pub fn poll(&mut self, now_second: u32) -> bool {
        let now = now_second % 60;
        let elapsed = (now + 60 - self.reference) % 60;
        if elapsed > self.interval {
            self.reference = now;
            true
        } else {
            false
        }
    }
}

pub struct FatalErrorHandler {
    cfg: FatalConfig,
}

/// A machine that has been announced as failed. Only `step` is left to do.
pub struct Containment<'h> {
    handler: &'h FatalErrorHandler,
    record: CriticalErrorRecord,
    timer: AlarmTimer,
}

impl<'h> Containment<'h> {
    pub fn record(&self) -> &CriticalErrorRecord {
        &self.record
    }

    /// One poll of the containment loop. True when the alert sounded.
    pub fn step(&mut self, m: &mut Machine) -> bool {
        let second = m.platform.now().second();
        let fired = self.timer.poll(second);
        if fired {
            for _ in 0..self.handler.cfg.alert_pulses {
                m.platform.beep(self.handler.cfg.tone_hz, PULSE);
                m.platform.sleep(PULSE_GAP);
            }
        }
        m.platform.sleep(POLL);
        fired
    }
}

impl FatalErrorHandler {
    pub fn new(cfg: FatalConfig) -> Self {
        Self { cfg }
    }

    fn paint(&self, m: &mut Machine, record: &CriticalErrorRecord) -> Result<(), HalError> {
        m.console.set_background(Color::Red)?;
        m.console.set_foreground(Color::White)?;
        m.console.clear()?;
        let (cols, rows) = m.console.size();
        m.console
            .write(&" ".repeat(usize::from(cols) * usize::from(rows)))?;
        m.console.set_cursor(0, 0)?;
        m.console.write_line(&record.banner())?;
        m.console.set_cursor(0, rows.saturating_sub(1))?;
        m.console.write("Please restart the server.")?;
        Ok(())
    }

    /// Render the failure and sound the initial tone.
    pub fn announce(&self, m: &mut Machine, message: &str, code: i32) -> Containment<'_> {
        let record = CriticalErrorRecord {
            message: message.to_string(),
            code,
            entered_at_second: m.platform.now().second(),
        };
        error!(code, message, "critical error");
        m.platform
            .serial_send(&format!("CRITICAL ERROR {code}: {message}"));
        if let Err(e) = self.paint(m, &record) {
            error!(error = %e, "fatal screen could not be drawn");
        }
        m.platform.beep(self.cfg.tone_hz, ANNOUNCE_TONE);

        Containment {
            handler: self,
            timer: AlarmTimer::new(self.cfg.alert_interval_secs, record.entered_at_second),
            record,
        }
    }

    pub fn critical_error(&self, m: &mut Machine, message: &str, code: i32) -> ! {
        let mut containment = self.announce(m, message, code);
        loop {
            containment.step(m);
        }
    }
}
