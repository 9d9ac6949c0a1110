use core::cell::RefCell;
use core::fmt;

use critical_section::Mutex;

use crate::driver::Modem;
use crate::error::ModemError;
use crate::framer::Message;
use crate::hal::{Gpio, SampleClock};

/// A [`Modem`] shared between a timer interrupt and the main loop.
///
/// Every method enters one short critical section: a single tick's bounded
/// work, or one flag-and-copy. No lock is held while a frame is assembled
/// over many ticks.
///
/// # Example
/// ```rust
/// # use embedded_hal_mock::eh1::digital::Mock as Pin;
/// use vwire::hal::{HalPins, SampleClock};
/// use vwire::timer::SharedModem;
///
/// # struct Timer;
/// # impl SampleClock for Timer {
/// #     type Error = ();
/// #     fn start(&mut self, _: u32) -> Result<(), ()> { Ok(()) }
/// #     fn cancel(&mut self) {}
/// # }
/// static MODEM: SharedModem<HalPins<Pin, Pin, Pin, Pin>, Timer> = SharedModem::new();
///
/// // In the timer interrupt handler:
/// MODEM.tick();
/// ```
pub struct SharedModem<G, C>
where
    G: Gpio,
    C: SampleClock,
{
    inner: Mutex<RefCell<Option<Modem<G, C>>>>,
}

impl<G, C> SharedModem<G, C>
where
    G: Gpio,
    C: SampleClock,
{
    /// Creates an empty slot, usable in a `static`.
    pub const fn new() -> Self {
        Self {
            inner: Mutex::new(RefCell::new(None)),
        }
    }

    /// Moves `modem` into the slot, returning whatever was there.
    pub fn install(&self, modem: Modem<G, C>) -> Option<Modem<G, C>> {
        critical_section::with(|cs| self.inner.borrow(cs).replace(Some(modem)))
    }

    /// Moves the modem out of the slot.
    pub fn take(&self) -> Option<Modem<G, C>> {
        critical_section::with(|cs| self.inner.borrow(cs).take())
    }

    /// Runs `f` on the installed modem inside one critical section.
    ///
    /// Returns `None` if no modem is installed. Keep `f` short.
    pub fn with<R>(&self, f: impl FnOnce(&mut Modem<G, C>) -> R) -> Option<R> {
        critical_section::with(|cs| self.inner.borrow(cs).borrow_mut().as_mut().map(f))
    }

    /// Runs one sample tick. Call from the timer interrupt.
    pub fn tick(&self) {
        let _ = self.with(Modem::tick);
    }

    /// See [`Modem::send`].
    pub fn send(&self, payload: &[u8]) -> Result<(), ModemError> {
        self.with(|m| m.send(payload))
            .unwrap_or(Err(ModemError::NotStarted))
    }

    /// See [`Modem::try_take_message`].
    pub fn try_take_message(&self) -> Option<Message> {
        self.with(Modem::try_take_message).flatten()
    }

    /// See [`Modem::has_message`].
    pub fn has_message(&self) -> bool {
        self.with(|m| m.has_message()).unwrap_or(false)
    }

    /// See [`Modem::start_receive`].
    pub fn start_receive(&self) -> Result<(), ModemError> {
        self.with(Modem::start_receive)
            .unwrap_or(Err(ModemError::NotStarted))
    }

    /// See [`Modem::stop_receive`].
    pub fn stop_receive(&self) {
        let _ = self.with(Modem::stop_receive);
    }

    /// See [`Modem::shutdown`].
    pub fn shutdown(&self) {
        let _ = self.with(Modem::shutdown);
    }
}

impl<G, C> Default for SharedModem<G, C>
where
    G: Gpio,
    C: SampleClock,
{
    fn default() -> Self {
        Self::new()
    }
}

impl<G, C> fmt::Debug for SharedModem<G, C>
where
    G: Gpio,
    C: SampleClock,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SharedModem").finish_non_exhaustive()
    }
}
