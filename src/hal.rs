//! Collaborator interfaces: GPIO lines and the sample clock.
//!
//! The modem never touches hardware directly. It reads and drives pins by
//! [`PinId`] through a [`Gpio`] implementation and asks a [`SampleClock`] to
//! call [`Modem::tick`](crate::driver::Modem::tick) at a fixed period. Pin
//! direction and pulls are the collaborator's business.
//!
//! [`HalPins`] implements [`Gpio`] on top of `embedded-hal` digital pins, so
//! any HAL that provides `InputPin`/`OutputPin` can back the modem.

use core::fmt::Debug;

use embedded_hal::digital::{InputPin, OutputPin, PinState};

use crate::config::{PinId, PinRole};

/// Pin access used by the modem.
pub trait Gpio {
    /// Error returned when a pin cannot be claimed.
    type Error: Debug;

    /// Reserves `pin` for `role`. Called by [`Modem::start`](crate::driver::Modem::start).
    fn claim(&mut self, pin: PinId, role: PinRole) -> Result<(), Self::Error>;

    /// Gives `pin` back. Called on shutdown and when a start is unwound.
    fn release(&mut self, pin: PinId);

    /// Reads the current level of `pin`.
    fn read_pin(&mut self, pin: PinId) -> bool;

    /// Drives `pin` to `level`.
    fn write_pin(&mut self, pin: PinId, level: bool);
}

/// A self-rearming periodic timer that calls the modem's tick.
pub trait SampleClock {
    /// Error returned when the timer cannot be armed.
    type Error: Debug;

    /// Arms the timer with a period of `period_ns` nanoseconds.
    fn start(&mut self, period_ns: u32) -> Result<(), Self::Error>;

    /// Disarms the timer. No tick may run after this returns.
    fn cancel(&mut self);
}

/// Errors from [`HalPins`].
#[derive(PartialEq, Eq, Clone, Copy, Debug)]
#[cfg_attr(feature = "defmt-0-3", derive(defmt::Format))]
pub enum HalPinError {
    /// No pin with this id was handed to [`HalPins`] for the requested role.
    NotWired(PinId),
    /// The pin is already claimed.
    AlreadyClaimed(PinId),
}

#[derive(Debug)]
struct Slot<P> {
    id: PinId,
    pin: P,
    claimed: bool,
}

impl<P> Slot<P> {
    fn new(id: PinId, pin: P) -> Self {
        Self {
            id,
            pin,
            claimed: false,
        }
    }
}

/// [`Gpio`] backed by `embedded-hal` pins, one per role.
///
/// ## Example
///
/// ```rust
/// # use embedded_hal_mock::eh1::digital::{Mock as Pin, State as PinState, Transaction as PinTransaction};
/// use vwire::config::PinId;
/// use vwire::hal::HalPins;
///
/// # let tx_pin = Pin::new(&[]);
/// # let rx_pin = Pin::new(&[]);
/// let pins: HalPins<Pin, Pin, Pin, Pin> = HalPins::new((PinId(16), tx_pin), (PinId(13), rx_pin));
/// # let (mut tx, mut rx, _, _) = pins.free();
/// # tx.done();
/// # rx.done();
/// ```
#[derive(Debug)]
pub struct HalPins<TX, RX, PTT, LED>
where
    TX: OutputPin,
    RX: InputPin,
    PTT: OutputPin,
    LED: OutputPin,
{
    tx: Slot<TX>,
    rx: Slot<RX>,
    ptt: Option<Slot<PTT>>,
    led: Option<Slot<LED>>,
}

impl<TX, RX, PTT, LED> HalPins<TX, RX, PTT, LED>
where
    TX: OutputPin,
    RX: InputPin,
    PTT: OutputPin,
    LED: OutputPin,
{
    /// Wraps the data pins, each paired with the id the modem config uses for it.
    pub fn new(tx: (PinId, TX), rx: (PinId, RX)) -> Self {
        Self {
            tx: Slot::new(tx.0, tx.1),
            rx: Slot::new(rx.0, rx.1),
            ptt: None,
            led: None,
        }
    }

    /// Adds a push-to-transmit pin.
    pub fn with_ptt(mut self, id: PinId, pin: PTT) -> Self {
        self.ptt = Some(Slot::new(id, pin));
        self
    }

    /// Adds a status LED pin.
    pub fn with_led(mut self, id: PinId, pin: LED) -> Self {
        self.led = Some(Slot::new(id, pin));
        self
    }

    /// Returns the wrapped pins.
    pub fn free(self) -> (TX, RX, Option<PTT>, Option<LED>) {
        (
            self.tx.pin,
            self.rx.pin,
            self.ptt.map(|s| s.pin),
            self.led.map(|s| s.pin),
        )
    }

    fn claim_flag(&mut self, pin: PinId, role: PinRole) -> Option<&mut bool> {
        match role {
            PinRole::Tx => (self.tx.id == pin).then_some(&mut self.tx.claimed),
            PinRole::Rx => (self.rx.id == pin).then_some(&mut self.rx.claimed),
            PinRole::Ptt => self
                .ptt
                .as_mut()
                .filter(|s| s.id == pin)
                .map(|s| &mut s.claimed),
            PinRole::Led => self
                .led
                .as_mut()
                .filter(|s| s.id == pin)
                .map(|s| &mut s.claimed),
        }
    }
}

fn drive<P: OutputPin>(slot: &mut Slot<P>, pin: PinId, level: bool) -> bool {
    if slot.id != pin || !slot.claimed {
        return false;
    }
    let _ = slot.pin.set_state(PinState::from(level));
    true
}

impl<TX, RX, PTT, LED> Gpio for HalPins<TX, RX, PTT, LED>
where
    TX: OutputPin,
    RX: InputPin,
    PTT: OutputPin,
    LED: OutputPin,
{
    type Error = HalPinError;

    fn claim(&mut self, pin: PinId, role: PinRole) -> Result<(), Self::Error> {
        let claimed = self
            .claim_flag(pin, role)
            .ok_or(HalPinError::NotWired(pin))?;
        if *claimed {
            return Err(HalPinError::AlreadyClaimed(pin));
        }
        *claimed = true;
        Ok(())
    }

    fn release(&mut self, pin: PinId) {
        for role in [PinRole::Tx, PinRole::Rx, PinRole::Ptt, PinRole::Led] {
            if let Some(claimed) = self.claim_flag(pin, role) {
                *claimed = false;
            }
        }
    }

    fn read_pin(&mut self, pin: PinId) -> bool {
        if self.rx.id != pin || !self.rx.claimed {
            return false;
        }
        self.rx.pin.is_high().unwrap_or(false)
    }

    fn write_pin(&mut self, pin: PinId, level: bool) {
        if drive(&mut self.tx, pin, level) {
            return;
        }
        if let Some(ptt) = self.ptt.as_mut() {
            if drive(ptt, pin, level) {
                return;
            }
        }
        if let Some(led) = self.led.as_mut() {
            let _ = drive(led, pin, level);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use embedded_hal_mock::eh1::digital::{
        Mock as PinMock, State as PinState, Transaction as PinTransaction,
    };

    type Pins = HalPins<PinMock, PinMock, PinMock, PinMock>;

    fn done(pins: Pins) {
        let (mut tx, mut rx, ptt, led) = pins.free();
        tx.done();
        rx.done();
        if let Some(mut ptt) = ptt {
            ptt.done();
        }
        if let Some(mut led) = led {
            led.done();
        }
    }

    #[test]
    fn test_claim_matches_role_and_id() {
        let mut pins: Pins = HalPins::new(
            (PinId(16), PinMock::new(&[])),
            (PinId(13), PinMock::new(&[])),
        );
        assert_eq!(pins.claim(PinId(13), PinRole::Rx), Ok(()));
        assert_eq!(
            pins.claim(PinId(13), PinRole::Rx),
            Err(HalPinError::AlreadyClaimed(PinId(13)))
        );
        assert_eq!(
            pins.claim(PinId(13), PinRole::Tx),
            Err(HalPinError::NotWired(PinId(13)))
        );
        assert_eq!(
            pins.claim(PinId(18), PinRole::Ptt),
            Err(HalPinError::NotWired(PinId(18)))
        );
        pins.release(PinId(13));
        assert_eq!(pins.claim(PinId(13), PinRole::Rx), Ok(()));
        done(pins);
    }

    #[test]
    fn test_read_only_samples_claimed_rx_pin() {
        let mut pins: Pins = HalPins::new(
            (PinId(16), PinMock::new(&[])),
            (PinId(13), PinMock::new(&[PinTransaction::get(PinState::High)])),
        );
        assert!(!pins.read_pin(PinId(13)));
        pins.claim(PinId(13), PinRole::Rx).unwrap();
        assert!(pins.read_pin(PinId(13)));
        assert!(!pins.read_pin(PinId(16)));
        done(pins);
    }

    #[test]
    fn test_writes_route_to_the_matching_output() {
        let mut pins: Pins = HalPins::new(
            (
                PinId(16),
                PinMock::new(&[
                    PinTransaction::set(PinState::High),
                    PinTransaction::set(PinState::Low),
                ]),
            ),
            (PinId(13), PinMock::new(&[])),
        )
        .with_ptt(PinId(18), PinMock::new(&[PinTransaction::set(PinState::Low)]))
        .with_led(PinId(21), PinMock::new(&[PinTransaction::set(PinState::High)]));

        for (id, role) in [
            (PinId(16), PinRole::Tx),
            (PinId(18), PinRole::Ptt),
            (PinId(21), PinRole::Led),
        ] {
            pins.claim(id, role).unwrap();
        }
        pins.write_pin(PinId(16), true);
        pins.write_pin(PinId(18), false);
        pins.write_pin(PinId(21), true);
        pins.write_pin(PinId(16), false);
        // Unknown pin: nothing is driven
        pins.write_pin(PinId(5), true);
        done(pins);
    }
}
