//! # vwire
//!
//! A portable, no_std software modem for on/off-keyed (OOK/ASK) radio links,
//! such as cheap 315/433 MHz transmitter and receiver modules.
//!
//! This crate implements the modem in software using:
//! - a 4b6b DC-balanced symbol code with VirtualWire framing
//! - a software PLL for bit clock recovery
//! - a CRC-16 frame check sequence
//! - a single periodic tick that either samples the receiver or drives the transmitter
//! - interrupt-safe sharing with `critical-section`
//!
//! ## Crate features
//! | Feature               | Description |
//! |-----------------------|-------------|
//! | `std`                 | Builds `thiserror`, `critical-section` and `log` against `std` |
//! | `delay-loop`          | Blocking tick loops over `embedded_hal::delay::DelayNs` |
//! | `timer-isr` (default) | `SharedModem` and the `init_modem!`/`tick_modem!` macros |
//! | `defmt-0-3`           | Uses `defmt` logging |
//! | `log`                 | Uses `log` logging |
//!
//! ## Wire protocol
//!
//! - **Half duplex**: a modem is either receiving or transmitting.
//! - **Training preamble** of 36 alternating bits, then two sync symbols
//! - **Frames** of up to 27 payload bytes, each byte sent as two 6-bit symbols
//! - Receiver oversamples every bit 8 times; bit rates from 1000 to 5000 bps
//!
//! ## Usage
//!
//! ```rust,ignore
//! use vwire::config::ModemConfig;
//! use vwire::driver::Modem;
//!
//! let mut modem = Modem::new(gpio, clock);
//! modem.configure(ModemConfig::default())?;
//! modem.start()?;
//! modem.start_receive()?;
//!
//! // From the sample timer, every modem.tick_period_ns():
//! modem.tick();
//!
//! // From the application:
//! modem.send(b"hello")?;
//! if let Some(message) = modem.try_take_message() {
//!     // ...
//! }
//! ```
//!
//! Or, with no timer interrupt, use `run_tick_loop()` with a `DelayNs` implementation:
//!
//! ```rust,ignore
//! vwire::timer::run_tick_loop(&mut modem, &mut delay);
//! ```
//!
//! ## Integration Notes
//!
//! - The modem never touches hardware directly: pins go through [`hal::Gpio`]
//!   and the tick period through [`hal::SampleClock`]. [`hal::HalPins`] adapts
//!   `embedded-hal` pins.
//! - Timing precision matters; a hardware timer is recommended over the delay loop.
//! - To share one modem between an interrupt and the main loop, use
//!   [`timer::SharedModem`].
//!
//! --
//! Designed for `#![no_std]` use in resource-constrained embedded environments.

#![deny(
    bad_style,
    dead_code,
    improper_ctypes,
    non_shorthand_field_patterns,
    no_mangle_generic_items,
    overflowing_literals,
    path_statements,
    patterns_in_fns_without_body,
    unconditional_recursion,
    unused,
    while_true,
    missing_debug_implementations,
    missing_docs,
    trivial_casts,
    trivial_numeric_casts,
    unused_extern_crates,
    unused_import_braces,
    unused_qualifications,
    unused_results
)]
#![cfg_attr(not(feature = "std"), no_std)]

#[cfg(feature = "timer-isr")]
pub use critical_section;

pub use heapless;

#[macro_use]
mod fmt;

pub mod config;
pub mod consts;
pub(crate) mod crc;
pub mod driver;
pub mod encoding;
pub mod error;
pub mod framer;
pub mod hal;
pub mod pll;
pub mod timer;
pub mod tx;

#[cfg(test)]
mod sim;

pub use config::{ModemConfig, PinId, PinRole};
pub use driver::{Modem, ModemState, ModemStats};
pub use error::ModemError;
pub use framer::Message;
