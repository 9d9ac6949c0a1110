//! Crate-internal logging macros.
//!
//! Routed to `log` or `defmt` by feature; with neither enabled they expand to
//! nothing but still borrow their arguments so call sites stay warning free.
#![allow(unused_macros)]

#[cfg(all(feature = "log", feature = "defmt-0-3"))]
compile_error!("You may not enable both `log` and `defmt-0-3` features.");

macro_rules! trace {
    ($s:literal $(, $x:expr)* $(,)?) => {
        {
            #[cfg(feature = "log")]
            ::log::trace!($s $(, $x)*);
            #[cfg(feature = "defmt-0-3")]
            ::defmt::trace!($s $(, $x)*);
            #[cfg(not(any(feature = "log", feature = "defmt-0-3")))]
            { $( let _ = &$x; )* }
        }
    };
}

macro_rules! debug {
    ($s:literal $(, $x:expr)* $(,)?) => {
        {
            #[cfg(feature = "log")]
            ::log::debug!($s $(, $x)*);
            #[cfg(feature = "defmt-0-3")]
            ::defmt::debug!($s $(, $x)*);
            #[cfg(not(any(feature = "log", feature = "defmt-0-3")))]
            { $( let _ = &$x; )* }
        }
    };
}

macro_rules! info {
    ($s:literal $(, $x:expr)* $(,)?) => {
        {
            #[cfg(feature = "log")]
            ::log::info!($s $(, $x)*);
            #[cfg(feature = "defmt-0-3")]
            ::defmt::info!($s $(, $x)*);
            #[cfg(not(any(feature = "log", feature = "defmt-0-3")))]
            { $( let _ = &$x; )* }
        }
    };
}

macro_rules! warn {
    ($s:literal $(, $x:expr)* $(,)?) => {
        {
            #[cfg(feature = "log")]
            ::log::warn!($s $(, $x)*);
            #[cfg(feature = "defmt-0-3")]
            ::defmt::warn!($s $(, $x)*);
            #[cfg(not(any(feature = "log", feature = "defmt-0-3")))]
            { $( let _ = &$x; )* }
        }
    };
}

/// `info!` when the modem is configured verbose, `debug!` otherwise.
macro_rules! frame_log {
    ($verbose:expr, $s:literal $(, $x:expr)* $(,)?) => {
        if $verbose {
            info!($s $(, $x)*);
        } else {
            debug!($s $(, $x)*);
        }
    };
}
