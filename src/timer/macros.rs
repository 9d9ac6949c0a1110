/// Declares a static global `MODEM` instance protected by a `critical_section` mutex.
///
/// This macro creates a `static` [`SharedModem`](crate::timer::SharedModem)
/// singleton named `MODEM`, suitable for interrupt-based environments where
/// both the main thread and an ISR need to reach the modem.
///
/// # Arguments
/// - `$gpio`: The concrete [`Gpio`](crate::hal::Gpio) type
/// - `$clock`: The concrete [`SampleClock`](crate::hal::SampleClock) type
///
/// # Example
/// ```rust
/// # use embedded_hal_mock::eh1::digital::Mock as Pin;
/// # use vwire::hal::{HalPins, SampleClock};
/// # pub struct Timer;
/// # impl SampleClock for Timer {
/// #     type Error = ();
/// #     fn start(&mut self, _: u32) -> Result<(), ()> { Ok(()) }
/// #     fn cancel(&mut self) {}
/// # }
/// vwire::init_modem!(HalPins<Pin, Pin, Pin, Pin>, Timer);
///
/// assert!(!MODEM.has_message());
/// ```
///
/// # Notes
/// - The slot starts empty: build a [`Modem`](crate::driver::Modem) and
///   [`install`](crate::timer::SharedModem::install) it from `main()`.
/// - Only one `MODEM` may be declared per module.
#[macro_export]
macro_rules! init_modem {
    ( $gpio:ty, $clock:ty ) => {
        pub static MODEM: $crate::timer::SharedModem<$gpio, $clock> =
            $crate::timer::SharedModem::new();
    };
}

/// Runs one sample tick on the global `MODEM` declared by `init_modem!`.
///
/// Call this from the timer interrupt armed by
/// [`SampleClock::start`](crate::hal::SampleClock::start).
///
/// # Example
/// ```rust,ignore
/// #[interrupt]
/// fn TIM2() {
///     vwire::tick_modem!();
/// }
/// ```
///
/// # Notes
/// - Does nothing until a modem is installed and started.
/// - Requires `init_modem!` to have been used in scope.
#[macro_export]
macro_rules! tick_modem {
    () => {
        MODEM.tick()
    };
}
