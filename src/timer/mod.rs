//! Sample clock timing and tick scheduling.
//!
//! The modem needs [`tick()`](crate::driver::Modem::tick) called every
//! [`tick_period_ns`] nanoseconds. This employs two approaches: an interrupt
//! service routine sharing the modem through `critical_section`
//! (`timer-isr` feature), or a blocking delay loop (`delay-loop` feature).
//!
//! Contains helpers for both, including:
//! - `tick_period_ns`: sample period for a bit rate
//! - `compute_reload`: runtime timer reload calculator
//! - `const_reload`: compile-time timer reload calculator
//! - `run_tick_loop` / `run_ticks`: blocking loops over `DelayNs` (feature `delay-loop`)
//! - `SharedModem`, `init_modem!()` and `tick_modem!()`: interrupt-side sharing
//!   (feature `timer-isr`)
//!
//! Sample periods for common bit rates:
//!
//! | Bit rate | Tick rate | Period     |
//! |----------|-----------|------------|
//! |     1000 |  8000 Hz  | 125 000 ns |
//! |     2000 | 16000 Hz  |  62 500 ns |
//! |     4000 | 32000 Hz  |  31 250 ns |
//! |     5000 | 40000 Hz  |  25 000 ns |

use libm::round;

use crate::consts::{BAUD_MAX, BAUD_MIN, NANOS_PER_SECOND, SAMPLES_PER_BIT};

#[cfg(feature = "delay-loop")]
mod delay;
#[cfg_attr(feature = "delay-loop", allow(unused_imports))]
#[cfg(feature = "delay-loop")]
pub use delay::*;

#[cfg(feature = "timer-isr")]
mod isr;
#[cfg_attr(feature = "timer-isr", allow(unused_imports))]
#[cfg(feature = "timer-isr")]
pub use isr::*;

#[cfg(feature = "timer-isr")]
mod macros;

/// Sample clock period for `bitrate`, in nanoseconds.
///
/// The bit rate is clamped to `[BAUD_MIN, BAUD_MAX]` here so the result is
/// always a sane timer period; range errors are reported by
/// [`ModemConfig::validate`](crate::config::ModemConfig::validate).
pub const fn tick_period_ns(bitrate: u16) -> u32 {
    let bitrate = if bitrate < BAUD_MIN {
        BAUD_MIN
    } else if bitrate > BAUD_MAX {
        BAUD_MAX
    } else {
        bitrate
    };
    NANOS_PER_SECOND / (SAMPLES_PER_BIT as u32 * bitrate as u32)
}

/// Computes the reload (compare match) value for a hardware timer.
///
/// # Arguments
/// - `f_clk`: timer input clock in Hz
/// - `prescaler`: timer prescaler (e.g., 8, 64, 256)
/// - `period_ns`: desired tick interval, usually from [`tick_period_ns`]
///
/// # Returns
/// - Timer counts per tick, rounded to the nearest integer and saturated to `u16`
pub fn compute_reload(f_clk: u32, prescaler: u32, period_ns: u32) -> u16 {
    let counts_per_second = f64::from(f_clk) / f64::from(prescaler.max(1));
    let counts = round(counts_per_second * f64::from(period_ns) / f64::from(NANOS_PER_SECOND));
    if counts >= f64::from(u16::MAX) {
        u16::MAX
    } else {
        counts as u16
    }
}

/// Compile-time reload value calculator.
///
/// Same as [`compute_reload`] in integer arithmetic, truncating instead of
/// rounding.
///
/// # Example
/// ```rust
/// use vwire::timer::{const_reload, tick_period_ns};
///
/// // 16 MHz clock, prescaler 8, 2000 baud
/// const RELOAD: u16 = const_reload(16_000_000, 8, tick_period_ns(2000));
/// assert_eq!(RELOAD, 125);
/// ```
pub const fn const_reload(f_clk: u32, prescaler: u32, period_ns: u32) -> u16 {
    let prescaler = if prescaler == 0 { 1 } else { prescaler };
    let counts = (f_clk / prescaler) as u64 * period_ns as u64 / NANOS_PER_SECOND as u64;
    if counts > u16::MAX as u64 {
        u16::MAX
    } else {
        counts as u16
    }
}
