//! Simulated collaborators for the crate's tests.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use crate::config::{PinId, PinRole};
use crate::hal::{Gpio, SampleClock};

/// A [`Gpio`] whose tx pin drives, and whose rx pin reads, one shared wire.
///
/// Two instances made with [`linked`](WireGpio::linked) talk to each other.
#[derive(Debug, Default)]
pub struct WireGpio {
    wire: Arc<AtomicBool>,
    pub claimed: Vec<(PinId, PinRole)>,
    pub writes: Vec<(PinId, bool)>,
    pub refuse: Option<PinRole>,
}

impl WireGpio {
    pub fn new() -> Self {
        Self::default()
    }

    /// Another endpoint on the same wire.
    pub fn linked(&self) -> Self {
        Self {
            wire: Arc::clone(&self.wire),
            ..Self::default()
        }
    }

    pub fn wire(&self) -> bool {
        self.wire.load(Ordering::Relaxed)
    }

    pub fn set_wire(&self, level: bool) {
        self.wire.store(level, Ordering::Relaxed);
    }

    fn role_of(&self, pin: PinId) -> Option<PinRole> {
        self.claimed
            .iter()
            .find(|(id, _)| *id == pin)
            .map(|&(_, role)| role)
    }

    /// Levels written to `pin`, oldest first.
    pub fn writes_to(&self, pin: PinId) -> Vec<bool> {
        self.writes
            .iter()
            .filter(|(id, _)| *id == pin)
            .map(|&(_, level)| level)
            .collect()
    }
}

impl Gpio for WireGpio {
    type Error = &'static str;

    fn claim(&mut self, pin: PinId, role: PinRole) -> Result<(), Self::Error> {
        if self.refuse == Some(role) {
            return Err("refused");
        }
        if self.role_of(pin).is_some() {
            return Err("busy");
        }
        self.claimed.push((pin, role));
        Ok(())
    }

    fn release(&mut self, pin: PinId) {
        self.claimed.retain(|(id, _)| *id != pin);
    }

    fn read_pin(&mut self, pin: PinId) -> bool {
        self.role_of(pin) == Some(PinRole::Rx) && self.wire()
    }

    fn write_pin(&mut self, pin: PinId, level: bool) {
        self.writes.push((pin, level));
        if self.role_of(pin) == Some(PinRole::Tx) {
            self.set_wire(level);
        }
    }
}

/// A [`SampleClock`] that only records what it was asked to do.
#[derive(Debug, Default)]
pub struct MockClock {
    pub period_ns: Option<u32>,
    pub starts: u32,
    pub cancels: u32,
    pub fail: bool,
}

impl MockClock {
    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Self::default()
        }
    }

    pub fn is_armed(&self) -> bool {
        self.period_ns.is_some()
    }
}

impl SampleClock for MockClock {
    type Error = ();

    fn start(&mut self, period_ns: u32) -> Result<(), Self::Error> {
        self.starts += 1;
        if self.fail {
            return Err(());
        }
        self.period_ns = Some(period_ns);
        Ok(())
    }

    fn cancel(&mut self) {
        self.cancels += 1;
        self.period_ns = None;
    }
}
