//! The modem controller and its sampler loop.
//!
//! This module provides [`Modem`], which owns the configuration, the
//! half-duplex state, the single-slot receive buffer and the transmit cursor.
//! A periodic timer calls [`tick()`](Modem::tick) once per sample; consumers
//! call [`send`](Modem::send) and [`try_take_message`](Modem::try_take_message).
//!
//! ## Example
//!
//! ```rust
//! # use embedded_hal_mock::eh1::digital::{Mock as Pin, State as PinState, Transaction as PinTransaction};
//! use vwire::config::{ModemConfig, PinId};
//! use vwire::driver::Modem;
//! use vwire::hal::{HalPins, SampleClock};
//!
//! struct Timer;
//! impl SampleClock for Timer {
//!     type Error = ();
//!     fn start(&mut self, _period_ns: u32) -> Result<(), ()> { Ok(()) }
//!     fn cancel(&mut self) {}
//! }
//!
//! # let tx_pin = Pin::new(&[PinTransaction::set(PinState::Low), PinTransaction::set(PinState::Low)]);
//! # let rx_pin = Pin::new(&[]);
//! let pins: HalPins<Pin, Pin, Pin, Pin> = HalPins::new((PinId(16), tx_pin), (PinId(13), rx_pin));
//! let mut modem = Modem::new(pins, Timer);
//! modem.configure(ModemConfig { led_pin: PinId::NONE, ..Default::default() }).unwrap();
//! modem.start().unwrap();
//! modem.start_receive().unwrap();
//!
//! loop {
//!     # break; // For testing purposes
//!     modem.tick(); // Called every 62.5 µs by the sample timer
//! }
//! # modem.shutdown();
//! # let (pins, _) = modem.free();
//! # let (mut tx, mut rx, _, _) = pins.free();
//! # tx.done();
//! # rx.done();
//! ```
//!
//! ## Receive slot policy
//!
//! There is one slot. A frame that completes while the slot still holds an
//! unread message is dropped and counted in [`ModemStats::rx_dropped`]; the
//! unread message is kept. Taking the message frees the slot.
//!
//! For tick scheduling helpers and ISR sharing, see [`crate::timer`].

use core::convert::Infallible;

use crate::config::{ModemConfig, PinId, PinRole};
use crate::consts::PTT_GUARD_BITS;
use crate::error::ModemError;
use crate::framer::{DiscardReason, FrameEvent, Message, RxFramer, encode_frame};
use crate::hal::{Gpio, SampleClock};
use crate::pll::{Recovered, SoftwarePll};
use crate::tx::{Transmitter, TxTick};

/// High-level state of the modem. The link is half duplex, so these are
/// mutually exclusive.
#[derive(PartialEq, Eq, Clone, Copy, Default, Debug)]
#[cfg_attr(feature = "defmt-0-3", derive(defmt::Format))]
pub enum ModemState {
    /// Nothing on the sampling path: ticks are ignored.
    #[default]
    Idle,
    /// Every tick samples the receive pin through the PLL and framer.
    Receiving,
    /// Every tick advances the transmit driver; receive framing is suspended.
    Transmitting,
}

/// Link counters. All wrap on overflow.
#[derive(PartialEq, Eq, Clone, Copy, Default, Debug)]
#[cfg_attr(feature = "defmt-0-3", derive(defmt::Format))]
pub struct ModemStats {
    /// Checksum-valid frames delivered to the receive slot.
    pub rx_good: u16,
    /// Frames discarded after sync: invalid symbol, bad length or bad FCS.
    pub rx_bad: u16,
    /// Frames abandoned because the signal went quiet mid-frame.
    pub rx_lost: u16,
    /// Valid frames dropped because the slot still held an unread message.
    pub rx_dropped: u16,
    /// Transmissions sent to completion.
    pub tx_good: u16,
}

#[derive(Debug, Default)]
struct RxSlot {
    message: Message,
    available: bool,
}

/// A software OOK modem driven by a periodic sample tick.
///
/// ## Type Parameters
///
/// - `G`: the [`Gpio`] collaborator used to read and drive pins
/// - `C`: the [`SampleClock`] that calls [`tick()`](Modem::tick)
///
/// ## Notes
///
/// - Configure with [`configure`](Modem::configure) before [`start`](Modem::start).
/// - [`tick()`](Modem::tick) never blocks or allocates.
/// - To share a modem between a timer interrupt and the main loop, put it in a
///   [`SharedModem`](crate::timer::SharedModem) (feature `timer-isr`).
#[derive(Debug)]
pub struct Modem<G, C>
where
    G: Gpio,
    C: SampleClock,
{
    gpio: G,
    clock: C,
    config: ModemConfig,
    state: ModemState,
    started: bool,

    /// Go back to `Receiving` when a transmission ends.
    rx_enabled: bool,

    pll: SoftwarePll,
    framer: RxFramer,
    transmitter: Transmitter,
    rx_slot: RxSlot,
    stats: ModemStats,
}

impl<G, C> Modem<G, C>
where
    G: Gpio,
    C: SampleClock,
{
    /// Creates a stopped modem with the default configuration.
    pub fn new(gpio: G, clock: C) -> Self {
        Self {
            gpio,
            clock,
            config: ModemConfig::default(),
            state: ModemState::Idle,
            started: false,
            rx_enabled: false,
            pll: SoftwarePll::new(),
            framer: RxFramer::new(),
            transmitter: Transmitter::new(),
            rx_slot: RxSlot::default(),
            stats: ModemStats::default(),
        }
    }

    /// Replaces the configuration.
    ///
    /// # Errors
    /// - [`ModemError::BitRateOutOfRange`] outside 1000..=5000 bps (never clamped)
    /// - [`ModemError::DuplicatePin`] if two enabled roles share a pin
    /// - [`ModemError::Busy`] if the modem is started or not idle
    pub fn configure(&mut self, config: ModemConfig) -> Result<(), ModemError> {
        config.validate()?;
        if self.started || self.state != ModemState::Idle {
            return Err(ModemError::Busy);
        }
        self.config = config;
        info!(
            "vwire: configured {} bps, tick {} ns",
            config.bitrate,
            config.tick_period_ns()
        );
        Ok(())
    }

    /// Claims the configured pins and arms the sample clock.
    ///
    /// All or nothing: on failure every pin claimed so far is released and
    /// the clock is left disarmed.
    ///
    /// # Errors
    /// - [`ModemError::Busy`] if already started
    /// - [`ModemError::PinClaim`] if the GPIO collaborator refuses a pin
    /// - [`ModemError::TimerStart`] if the clock cannot be armed
    pub fn start(&mut self) -> Result<(), ModemError> {
        if self.started {
            return Err(ModemError::Busy);
        }

        let pins = self.config.pins();
        for (i, &(role, pin)) in pins.iter().enumerate() {
            if !pin.is_enabled() {
                continue;
            }
            if let Err(_e) = self.gpio.claim(pin, role) {
                warn!("vwire: claiming {} pin {} failed", role_name(role), pin.0);
                self.release_pins(&pins[..i]);
                return Err(ModemError::PinClaim(role));
            }
        }

        self.state = ModemState::Idle;
        self.rx_enabled = false;
        self.drive_idle_levels();

        let period = self.config.tick_period_ns();
        if let Err(_e) = self.clock.start(period) {
            warn!("vwire: sample clock refused a {} ns period", period);
            self.release_pins(&pins);
            return Err(ModemError::TimerStart);
        }

        self.started = true;
        info!("vwire: started, tick period {} ns", period);
        Ok(())
    }

    /// Starts feeding samples to the PLL and framer.
    ///
    /// If a transmission is in flight, reception begins when it ends.
    ///
    /// # Errors
    /// [`ModemError::NotStarted`], or [`ModemError::PinDisabled`] without an rx pin.
    pub fn start_receive(&mut self) -> Result<(), ModemError> {
        if !self.started {
            return Err(ModemError::NotStarted);
        }
        if !self.config.rx_pin.is_enabled() {
            return Err(ModemError::PinDisabled(PinRole::Rx));
        }
        self.rx_enabled = true;
        if self.state == ModemState::Idle {
            self.reset_receiver();
            self.state = ModemState::Receiving;
        }
        Ok(())
    }

    /// Stops reception and drops any partially assembled frame.
    ///
    /// Takes effect immediately: the next tick does not touch the framer.
    /// A message already in the receive slot stays there.
    pub fn stop_receive(&mut self) {
        self.rx_enabled = false;
        if self.state == ModemState::Receiving {
            self.state = ModemState::Idle;
        }
        self.reset_receiver();
    }

    /// Encodes `payload` and starts sending it on the next tick.
    ///
    /// # Errors
    /// - [`ModemError::PayloadTooLong`] above [`MAX_PAYLOAD_LEN`](crate::consts::MAX_PAYLOAD_LEN) bytes
    /// - [`ModemError::Busy`] while a transmission is in flight; it is left untouched
    /// - [`ModemError::NotStarted`], [`ModemError::PinDisabled`] without a tx pin
    pub fn send(&mut self, payload: &[u8]) -> Result<(), ModemError> {
        let frame = encode_frame(payload)?;
        if self.state == ModemState::Transmitting {
            return Err(ModemError::Busy);
        }
        if !self.started {
            return Err(ModemError::NotStarted);
        }
        if !self.config.tx_pin.is_enabled() {
            return Err(ModemError::PinDisabled(PinRole::Tx));
        }

        let guard = if self.config.ptt_pin.is_enabled() {
            PTT_GUARD_BITS
        } else {
            0
        };
        self.transmitter.load(frame, guard);
        // Half duplex: whatever the framer had is gone
        self.reset_receiver();
        self.state = ModemState::Transmitting;
        self.write_ptt(true);
        self.write_led(true);
        debug!("vwire: sending {} bytes", payload.len());
        Ok(())
    }

    /// Takes the buffered message, if any, and frees the slot. Never blocks.
    pub fn try_take_message(&mut self) -> Option<Message> {
        if !self.rx_slot.available {
            return None;
        }
        self.rx_slot.available = false;
        Some(core::mem::take(&mut self.rx_slot.message))
    }

    /// Whether an unread message is waiting. No side effects.
    pub fn has_message(&self) -> bool {
        self.rx_slot.available
    }

    /// `nb` flavour of [`try_take_message`](Modem::try_take_message).
    pub fn poll_message(&mut self) -> nb::Result<Message, Infallible> {
        self.try_take_message().ok_or(nb::Error::WouldBlock)
    }

    /// Completes once no transmission is in flight.
    pub fn poll_sent(&self) -> nb::Result<(), Infallible> {
        if self.state == ModemState::Transmitting {
            Err(nb::Error::WouldBlock)
        } else {
            Ok(())
        }
    }

    /// Halts everything: transmit and receive stop, outputs go to their idle
    /// levels, pins are released and the sample clock is cancelled.
    pub fn shutdown(&mut self) {
        self.transmitter.abort();
        self.rx_enabled = false;
        self.reset_receiver();
        self.state = ModemState::Idle;
        if !self.started {
            return;
        }
        self.clock.cancel();
        self.drive_idle_levels();
        let pins = self.config.pins();
        self.release_pins(&pins);
        self.started = false;
        info!("vwire: shut down");
    }

    /// Advances the modem by one sample tick.
    ///
    /// This is the sampler loop: the timer collaborator calls it every
    /// [`tick_period_ns`](Modem::tick_period_ns). It either feeds one sample to
    /// the receive path or advances the transmit driver. Does nothing when
    /// stopped or idle.
    pub fn tick(&mut self) {
        if !self.started {
            return;
        }
        match self.state {
            ModemState::Receiving => self.receive_tick(),
            ModemState::Transmitting => self.transmit_tick(),
            ModemState::Idle => {}
        }
    }

    /// Current half-duplex state.
    pub fn state(&self) -> ModemState {
        self.state
    }

    /// Active configuration.
    pub fn config(&self) -> &ModemConfig {
        &self.config
    }

    /// Link counters.
    pub fn stats(&self) -> ModemStats {
        self.stats
    }

    /// Whether [`start`](Modem::start) succeeded and no shutdown followed.
    pub fn is_started(&self) -> bool {
        self.started
    }

    /// Whether reception is enabled (possibly paused by a transmission).
    pub fn is_receive_enabled(&self) -> bool {
        self.rx_enabled
    }

    /// Sample clock period for the configured bit rate.
    pub fn tick_period_ns(&self) -> u32 {
        self.config.tick_period_ns()
    }

    /// Gives back the collaborators. Call [`shutdown`](Modem::shutdown) first.
    pub fn free(self) -> (G, C) {
        (self.gpio, self.clock)
    }

    fn receive_tick(&mut self) {
        let sample = self.gpio.read_pin(self.config.rx_pin) != self.config.rx_inverted;
        let event = match self.pll.update(sample) {
            Some(Recovered::Bit(bit)) => self.framer.push_bit(bit),
            Some(Recovered::SignalLost) => self.framer.signal_lost(),
            None => None,
        };
        match event {
            Some(FrameEvent::Complete) => self.deliver(),
            Some(FrameEvent::Discarded(reason)) => self.discard(reason),
            None => {}
        }
    }

    fn transmit_tick(&mut self) {
        match self.transmitter.next_tick() {
            TxTick::Drive(level) => self.write_tx(level),
            TxTick::Hold => {}
            TxTick::Finished => {
                self.write_tx(false);
                self.write_ptt(false);
                self.write_led(false);
                self.stats.tx_good = self.stats.tx_good.wrapping_add(1);
                // Resume from a clean preamble search, never mid-frame
                self.reset_receiver();
                self.state = if self.rx_enabled {
                    ModemState::Receiving
                } else {
                    ModemState::Idle
                };
                debug!("vwire: transmission complete");
            }
        }
    }

    fn deliver(&mut self) {
        let payload = self.framer.payload();
        if self.rx_slot.available {
            self.stats.rx_dropped = self.stats.rx_dropped.wrapping_add(1);
            frame_log!(
                self.config.verbose,
                "vwire: dropped {} byte frame, slot still full",
                payload.len()
            );
            return;
        }
        self.rx_slot.message.clear();
        // Same capacity on both sides
        let _ = self.rx_slot.message.extend_from_slice(payload);
        self.rx_slot.available = true;
        self.stats.rx_good = self.stats.rx_good.wrapping_add(1);
        frame_log!(
            self.config.verbose,
            "vwire: received {} byte frame",
            payload.len()
        );
    }

    fn discard(&mut self, reason: DiscardReason) {
        if reason == DiscardReason::SignalLost {
            self.stats.rx_lost = self.stats.rx_lost.wrapping_add(1);
        } else {
            self.stats.rx_bad = self.stats.rx_bad.wrapping_add(1);
        }
        frame_log!(
            self.config.verbose,
            "vwire: discarded frame ({})",
            discard_name(reason)
        );
    }

    fn reset_receiver(&mut self) {
        self.pll.reset();
        self.framer.reset();
    }

    fn drive_idle_levels(&mut self) {
        self.write_tx(false);
        self.write_ptt(false);
        self.write_led(false);
    }

    fn release_pins(&mut self, pins: &[(PinRole, PinId)]) {
        for &(_, pin) in pins {
            if pin.is_enabled() {
                self.gpio.release(pin);
            }
        }
    }

    fn write_tx(&mut self, level: bool) {
        let pin = self.config.tx_pin;
        if pin.is_enabled() {
            self.gpio.write_pin(pin, level != self.config.tx_inverted);
        }
    }

    fn write_ptt(&mut self, keyed: bool) {
        let pin = self.config.ptt_pin;
        if pin.is_enabled() {
            self.gpio.write_pin(pin, keyed != self.config.ptt_inverted);
        }
    }

    fn write_led(&mut self, on: bool) {
        let pin = self.config.led_pin;
        if pin.is_enabled() {
            self.gpio.write_pin(pin, on);
        }
    }
}

fn role_name(role: PinRole) -> &'static str {
    match role {
        PinRole::Rx => "rx",
        PinRole::Tx => "tx",
        PinRole::Ptt => "ptt",
        PinRole::Led => "led",
    }
}

fn discard_name(reason: DiscardReason) -> &'static str {
    match reason {
        DiscardReason::InvalidSymbol => "invalid symbol",
        DiscardReason::LengthOutOfRange(_) => "length out of range",
        DiscardReason::ChecksumMismatch => "checksum mismatch",
        DiscardReason::SignalLost => "signal lost",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::consts::MAX_PAYLOAD_LEN_USIZE;
    use crate::sim::{MockClock, WireGpio};

    type TestModem = Modem<WireGpio, MockClock>;

    /// Ticks after the transmitter finishes, for the receiver to catch up.
    const SLACK: usize = 64;

    /// A transmitting and a receiving modem on one wire, plus a probe on it.
    fn pair(tx_config: ModemConfig, rx_config: ModemConfig) -> (TestModem, TestModem, WireGpio) {
        let gpio = WireGpio::new();
        let probe = gpio.linked();
        let mut rx = Modem::new(gpio.linked(), MockClock::default());
        let mut tx = Modem::new(gpio, MockClock::default());
        tx.configure(tx_config).unwrap();
        rx.configure(rx_config).unwrap();
        tx.start().unwrap();
        rx.start().unwrap();
        rx.start_receive().unwrap();
        (tx, rx, probe)
    }

    fn run(tx: &mut TestModem, rx: &mut TestModem, ticks: usize) {
        for _ in 0..ticks {
            tx.tick();
            rx.tick();
        }
    }

    fn transmit(tx: &mut TestModem, rx: &mut TestModem) {
        while tx.poll_sent().is_err() {
            tx.tick();
            rx.tick();
        }
        run(tx, rx, SLACK);
    }

    #[test]
    fn test_end_to_end_delivery() {
        let (mut tx, mut rx, _) = pair(ModemConfig::default(), ModemConfig::default());
        tx.send(&[0x41, 0x42]).unwrap();
        assert_eq!(tx.state(), ModemState::Transmitting);
        // 18 symbols of 6 cells of 8 ticks
        run(&mut tx, &mut rx, 18 * 6 * 8 + SLACK);

        assert_eq!(tx.state(), ModemState::Idle);
        assert!(rx.has_message());
        assert_eq!(rx.try_take_message().as_deref(), Some(&[0x41u8, 0x42][..]));
        assert!(!rx.has_message());
        assert!(rx.try_take_message().is_none());
        assert_eq!(tx.stats().tx_good, 1);
        assert_eq!(rx.stats().rx_good, 1);
    }

    #[test]
    fn test_poll_message_blocks_until_delivery() {
        let (mut tx, mut rx, _) = pair(ModemConfig::default(), ModemConfig::default());
        assert_eq!(rx.poll_message(), Err(nb::Error::WouldBlock));
        tx.send(b"").unwrap();
        assert_eq!(tx.poll_sent(), Err(nb::Error::WouldBlock));
        transmit(&mut tx, &mut rx);
        let message = nb::block!(rx.poll_message()).unwrap();
        assert!(message.is_empty());
    }

    #[test]
    fn test_largest_payload_delivered() {
        let (mut tx, mut rx, _) = pair(ModemConfig::default(), ModemConfig::default());
        let payload: Vec<u8> = (0..MAX_PAYLOAD_LEN_USIZE as u8).collect();
        tx.send(&payload).unwrap();
        transmit(&mut tx, &mut rx);
        assert_eq!(rx.try_take_message().as_deref(), Some(&payload[..]));
    }

    #[test]
    fn test_send_while_transmitting_is_busy() {
        let (mut tx, mut rx, _) = pair(ModemConfig::default(), ModemConfig::default());
        tx.send(b"first").unwrap();
        run(&mut tx, &mut rx, 100);
        assert_eq!(tx.send(b"second"), Err(ModemError::Busy));
        transmit(&mut tx, &mut rx);
        assert_eq!(rx.try_take_message().as_deref(), Some(&b"first"[..]));
        assert_eq!(tx.stats().tx_good, 1);
    }

    #[test]
    fn test_unread_message_is_kept_and_newer_dropped() {
        let (mut tx, mut rx, _) = pair(ModemConfig::default(), ModemConfig::default());
        tx.send(b"one").unwrap();
        transmit(&mut tx, &mut rx);
        tx.send(b"two").unwrap();
        transmit(&mut tx, &mut rx);

        assert_eq!(rx.stats().rx_good, 1);
        assert_eq!(rx.stats().rx_dropped, 1);
        assert_eq!(rx.try_take_message().as_deref(), Some(&b"one"[..]));
        assert!(!rx.has_message());

        // The slot is free again
        tx.send(b"three").unwrap();
        transmit(&mut tx, &mut rx);
        assert_eq!(rx.try_take_message().as_deref(), Some(&b"three"[..]));
    }

    #[test]
    fn test_slow_transmitter_still_delivers() {
        let (mut tx, mut rx, _) = pair(ModemConfig::default(), ModemConfig::default());
        tx.send(b"drift").unwrap();
        let mut i = 0usize;
        while tx.poll_sent().is_err() {
            // Transmitter misses one tick in a hundred: 1% slow
            if i % 100 != 99 {
                tx.tick();
            }
            rx.tick();
            i += 1;
        }
        run(&mut tx, &mut rx, SLACK);
        assert_eq!(rx.try_take_message().as_deref(), Some(&b"drift"[..]));
    }

    #[test]
    fn test_inverted_link_delivers() {
        let config = ModemConfig {
            rx_inverted: true,
            tx_inverted: true,
            ..Default::default()
        };
        let (mut tx, mut rx, probe) = pair(config, config);
        // Idle carrier-off level is HIGH on an inverted line
        assert!(probe.wire());
        tx.send(b"inv").unwrap();
        transmit(&mut tx, &mut rx);
        assert!(probe.wire());
        assert_eq!(rx.try_take_message().as_deref(), Some(&b"inv"[..]));
    }

    #[test]
    fn test_ptt_led_and_guard_cells() {
        let config = ModemConfig {
            ptt_pin: PinId(18),
            ptt_inverted: true,
            ..Default::default()
        };
        let mut modem = Modem::new(WireGpio::new(), MockClock::default());
        modem.configure(config).unwrap();
        modem.start().unwrap();
        modem.send(b"AB").unwrap();
        while modem.poll_sent().is_err() {
            modem.tick();
        }
        let (gpio, _) = modem.free();

        // Inverted PTT: idle HIGH, keyed LOW, released HIGH
        assert_eq!(gpio.writes_to(PinId(18)), [true, false, true]);
        assert_eq!(gpio.writes_to(PinId(21)), [false, true, false]);

        let data_bits = encode_frame(b"AB").unwrap().bit_len();
        let tx = gpio.writes_to(PinId(16));
        let guard = usize::from(PTT_GUARD_BITS);
        // idle, lead-in, data, tail, release
        assert_eq!(tx.len(), 1 + guard + data_bits + guard + 1);
        assert!(tx[1..=guard].iter().all(|&level| !level));
        assert!(tx[tx.len() - guard - 1..].iter().all(|&level| !level));
    }

    #[test]
    fn test_configure_checks_bitrate_and_state() {
        let mut modem = Modem::new(WireGpio::new(), MockClock::default());
        for (bitrate, ok) in [(999, false), (1000, true), (5000, true), (5001, false)] {
            let result = modem.configure(ModemConfig {
                bitrate,
                ..Default::default()
            });
            if ok {
                assert_eq!(result, Ok(()));
                assert_eq!(modem.config().bitrate, bitrate);
            } else {
                assert_eq!(result, Err(ModemError::BitRateOutOfRange(bitrate)));
            }
        }
        modem.configure(ModemConfig::default()).unwrap();
        assert_eq!(modem.tick_period_ns(), 62_500);

        modem.start().unwrap();
        assert_eq!(
            modem.configure(ModemConfig::default()),
            Err(ModemError::Busy)
        );
        assert_eq!(modem.start(), Err(ModemError::Busy));
        let (_, clock) = modem.free();
        assert_eq!(clock.period_ns, Some(62_500));
    }

    #[test]
    fn test_refused_pin_unwinds_start() {
        let mut gpio = WireGpio::new();
        gpio.refuse = Some(PinRole::Led);
        let mut modem = Modem::new(gpio, MockClock::default());
        assert_eq!(modem.start(), Err(ModemError::PinClaim(PinRole::Led)));
        assert!(!modem.is_started());
        let (gpio, clock) = modem.free();
        assert!(gpio.claimed.is_empty());
        assert_eq!(clock.starts, 0);
        assert!(!clock.is_armed());
    }

    #[test]
    fn test_timer_failure_unwinds_start() {
        let mut modem = Modem::new(WireGpio::new(), MockClock::failing());
        assert_eq!(modem.start(), Err(ModemError::TimerStart));
        assert!(!modem.is_started());
        assert_eq!(modem.send(b"x"), Err(ModemError::NotStarted));
        let (gpio, clock) = modem.free();
        assert!(gpio.claimed.is_empty());
        assert_eq!(clock.starts, 1);
        assert!(!clock.is_armed());
    }

    #[test]
    fn test_operation_errors() {
        let mut modem = Modem::new(WireGpio::new(), MockClock::default());
        assert_eq!(modem.start_receive(), Err(ModemError::NotStarted));
        assert_eq!(
            modem.send(&[0; MAX_PAYLOAD_LEN_USIZE + 1]),
            Err(ModemError::PayloadTooLong(MAX_PAYLOAD_LEN_USIZE + 1))
        );
        assert_eq!(modem.send(b"x"), Err(ModemError::NotStarted));

        modem
            .configure(ModemConfig {
                rx_pin: PinId::NONE,
                tx_pin: PinId::NONE,
                ..Default::default()
            })
            .unwrap();
        modem.start().unwrap();
        assert_eq!(
            modem.start_receive(),
            Err(ModemError::PinDisabled(PinRole::Rx))
        );
        assert_eq!(modem.send(b"x"), Err(ModemError::PinDisabled(PinRole::Tx)));
    }

    #[test]
    fn test_receive_resumes_after_transmit() {
        let (mut tx, mut rx, _) = pair(ModemConfig::default(), ModemConfig::default());
        tx.start_receive().unwrap();
        assert_eq!(tx.state(), ModemState::Receiving);
        tx.send(b"x").unwrap();
        assert_eq!(tx.state(), ModemState::Transmitting);
        assert!(tx.is_receive_enabled());
        transmit(&mut tx, &mut rx);
        assert_eq!(tx.state(), ModemState::Receiving);
        // Half duplex: it never hears itself
        assert!(!tx.has_message());
        assert!(rx.has_message());
    }

    #[test]
    fn test_stop_receive_drops_partial_frame() {
        let (mut tx, mut rx, _) = pair(ModemConfig::default(), ModemConfig::default());
        tx.send(b"cut short").unwrap();
        run(&mut tx, &mut rx, 600);
        rx.stop_receive();
        assert_eq!(rx.state(), ModemState::Idle);
        transmit(&mut tx, &mut rx);
        assert!(!rx.has_message());
        assert_eq!(rx.stats(), ModemStats::default());
    }

    #[test]
    fn test_lost_signal_mid_frame_is_counted() {
        let (mut tx, mut rx, _) = pair(ModemConfig::default(), ModemConfig::default());
        tx.send(b"interrupted").unwrap();
        run(&mut tx, &mut rx, 600);
        // Line falls silent mid-payload
        tx.shutdown();
        for _ in 0..200 {
            rx.tick();
        }
        assert!(!rx.has_message());
        assert_eq!(rx.stats().rx_lost, 1);
        assert_eq!(rx.state(), ModemState::Receiving);
    }

    #[test]
    fn test_shutdown_releases_everything_once() {
        let mut modem = Modem::new(WireGpio::new(), MockClock::default());
        modem.start().unwrap();
        modem.start_receive().unwrap();
        modem.send(b"bye").unwrap();
        modem.tick();
        modem.shutdown();
        modem.shutdown();
        assert_eq!(modem.state(), ModemState::Idle);
        assert!(!modem.is_started());
        assert!(!modem.is_receive_enabled());

        modem.tick();
        assert_eq!(modem.poll_sent(), Ok(()));
        let (gpio, clock) = modem.free();
        assert!(gpio.claimed.is_empty());
        assert_eq!(clock.cancels, 1);
        assert!(!clock.is_armed());
        // Data line left low
        assert_eq!(gpio.writes_to(PinId(16)).last(), Some(&false));
    }

    #[test]
    fn test_external_noise_on_the_wire_is_tolerated() {
        let (_, mut rx, probe) = pair(ModemConfig::default(), ModemConfig::default());
        let mut x: u32 = 0x9e37_79b9;
        for _ in 0..5_000 {
            x ^= x << 13;
            x ^= x >> 17;
            x ^= x << 5;
            probe.set_wire(x & 1 == 1);
            rx.tick();
        }
        assert!(!rx.has_message());
        assert_eq!(rx.state(), ModemState::Receiving);
    }
}
