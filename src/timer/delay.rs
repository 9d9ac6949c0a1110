use embedded_hal::delay::DelayNs;

use crate::driver::Modem;
use crate::hal::{Gpio, SampleClock};

/// Runs a blocking loop that calls `tick()` on the modem at its sample period.
///
/// This is a simple timing loop for environments where interrupts are
/// unavailable or undesired. The period comes from the modem's configured bit
/// rate and is waited out with `delay.delay_ns()` after each tick.
///
/// # Arguments
/// - `modem`: A started [`Modem`].
/// - `delay`: A delay provider implementing [`DelayNs`], typically from the HAL.
///
/// # Example
/// ```rust,ignore
/// modem.start()?;
/// modem.start_receive()?;
/// vwire::timer::run_tick_loop(&mut modem, &mut delay);
/// ```
///
/// # Notes
/// - Returns once the modem is no longer started, i.e. never in
///   single-purpose polling firmware.
/// - The time spent inside `tick()` is not subtracted from the delay, so the
///   effective bit rate is slightly low; the receive PLL tolerates this.
pub fn run_tick_loop<G, C, D>(modem: &mut Modem<G, C>, delay: &mut D)
where
    G: Gpio,
    C: SampleClock,
    D: DelayNs,
{
    let period = modem.tick_period_ns();
    while modem.is_started() {
        modem.tick();
        delay.delay_ns(period);
    }
}

/// Runs exactly `ticks` sample ticks, waiting one sample period after each.
///
/// Useful for sending one message from polling code: `send`, then run
/// [`Transmitter::total_ticks`](crate::tx::Transmitter::total_ticks) ticks.
pub fn run_ticks<G, C, D>(modem: &mut Modem<G, C>, delay: &mut D, ticks: usize)
where
    G: Gpio,
    C: SampleClock,
    D: DelayNs,
{
    let period = modem.tick_period_ns();
    for _ in 0..ticks {
        modem.tick();
        delay.delay_ns(period);
    }
}
