//! Modem configuration.
//!
//! [`ModemConfig`] carries the bit rate, the pin assigned to each role and the
//! polarity flags. Defaults:
//!
//! | Parameter  | Default | Range          |
//! |------------|---------|----------------|
//! | baud       | 2000    | 1000..=5000    |
//! | rx pin     | 13      | any, 0 = off   |
//! | tx pin     | 16      | any, 0 = off   |
//! | led pin    | 21      | any, 0 = off   |
//! | ptt pin    | 0 (off) | any, 0 = off   |
//! | ptt invert | off     |                |
//! | verbose    | off     |                |
//!
//! Validation never clamps: an out-of-range bit rate is an error.

use core::fmt;

use crate::consts::{
    BAUD_MAX, BAUD_MIN, DEFAULT_BAUD, DEFAULT_LED_PIN, DEFAULT_PTT_PIN, DEFAULT_RX_PIN,
    DEFAULT_TX_PIN,
};
use crate::error::ModemError;
use crate::timer::tick_period_ns;

/// Identifier of a GPIO line as understood by the [`Gpio`](crate::hal::Gpio)
/// collaborator. Id `0` means "role disabled".
#[derive(PartialEq, Eq, Clone, Copy, Debug, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "defmt-0-3", derive(defmt::Format))]
pub struct PinId(pub u8);

impl PinId {
    /// The disabled-role sentinel.
    pub const NONE: PinId = PinId(0);

    /// Whether this id refers to a real pin.
    pub const fn is_enabled(self) -> bool {
        self.0 != 0
    }
}

impl fmt::Display for PinId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "GPIO{}", self.0)
    }
}

/// The job a pin does for the modem.
#[derive(PartialEq, Eq, Clone, Copy, Debug)]
#[cfg_attr(feature = "defmt-0-3", derive(defmt::Format))]
pub enum PinRole {
    /// Receiver data output, sampled every tick.
    Rx,
    /// Transmitter data input, driven one bit per cell.
    Tx,
    /// Push-to-transmit line, keyed for the length of a transmission.
    Ptt,
    /// Status LED, lit while transmitting.
    Led,
}

impl fmt::Display for PinRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            PinRole::Rx => "rx",
            PinRole::Tx => "tx",
            PinRole::Ptt => "ptt",
            PinRole::Led => "led",
        })
    }
}

/// Settings for a [`Modem`](crate::driver::Modem).
///
/// Applied with [`Modem::configure`](crate::driver::Modem::configure) while the
/// modem is stopped.
#[derive(PartialEq, Eq, Clone, Copy, Debug)]
#[cfg_attr(feature = "defmt-0-3", derive(defmt::Format))]
pub struct ModemConfig {
    /// Link speed in bits per second.
    pub bitrate: u16,
    /// Receive data pin.
    pub rx_pin: PinId,
    /// Transmit data pin.
    pub tx_pin: PinId,
    /// Push-to-transmit pin, [`PinId::NONE`] when not fitted.
    pub ptt_pin: PinId,
    /// Status LED pin, [`PinId::NONE`] when not fitted.
    pub led_pin: PinId,
    /// Invert the received level before demodulating.
    pub rx_inverted: bool,
    /// Invert the transmitted level (carrier on = LOW).
    pub tx_inverted: bool,
    /// Key the transmitter with a LOW level on the PTT pin.
    pub ptt_inverted: bool,
    /// Log every delivered and discarded frame at `info` instead of `debug`.
    pub verbose: bool,
}

impl Default for ModemConfig {
    fn default() -> Self {
        Self {
            bitrate: DEFAULT_BAUD,
            rx_pin: PinId(DEFAULT_RX_PIN),
            tx_pin: PinId(DEFAULT_TX_PIN),
            ptt_pin: PinId(DEFAULT_PTT_PIN),
            led_pin: PinId(DEFAULT_LED_PIN),
            rx_inverted: false,
            tx_inverted: false,
            ptt_inverted: false,
            verbose: false,
        }
    }
}

impl ModemConfig {
    /// Checks the bit rate range and that no two enabled roles share a pin.
    pub fn validate(&self) -> Result<(), ModemError> {
        if !(BAUD_MIN..=BAUD_MAX).contains(&self.bitrate) {
            return Err(ModemError::BitRateOutOfRange(self.bitrate));
        }
        let pins = self.pins();
        for (i, (_, a)) in pins.iter().enumerate() {
            if !a.is_enabled() {
                continue;
            }
            if pins[i + 1..].iter().any(|(_, b)| b == a) {
                return Err(ModemError::DuplicatePin(*a));
            }
        }
        Ok(())
    }

    /// Every role with its assigned pin, in claim order.
    pub fn pins(&self) -> [(PinRole, PinId); 4] {
        [
            (PinRole::Rx, self.rx_pin),
            (PinRole::Tx, self.tx_pin),
            (PinRole::Ptt, self.ptt_pin),
            (PinRole::Led, self.led_pin),
        ]
    }

    /// The pin assigned to `role`.
    pub fn pin(&self, role: PinRole) -> PinId {
        match role {
            PinRole::Rx => self.rx_pin,
            PinRole::Tx => self.tx_pin,
            PinRole::Ptt => self.ptt_pin,
            PinRole::Led => self.led_pin,
        }
    }

    /// Sample clock period for this bit rate, in nanoseconds.
    pub fn tick_period_ns(&self) -> u32 {
        tick_period_ns(self.bitrate)
    }
}
