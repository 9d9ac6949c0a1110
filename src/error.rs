//! Error type returned by the modem's public operations.
//!
//! Only synchronous failures show up here: bad configuration, busy or
//! stopped modem, oversized payloads, and collaborator failures during
//! [`Modem::start`](crate::driver::Modem::start). Link errors (bad checksum,
//! invalid symbol, lost signal) are counted in
//! [`ModemStats`](crate::driver::ModemStats) and never reach the caller.

use thiserror::Error;

use crate::config::{PinId, PinRole};
use crate::consts::{BAUD_MAX, BAUD_MIN, MAX_PAYLOAD_LEN};

/// Failures reported by [`Modem`](crate::driver::Modem) operations.
#[derive(Debug, Error, PartialEq, Eq, Clone, Copy)]
#[cfg_attr(feature = "defmt-0-3", derive(defmt::Format))]
pub enum ModemError {
    /// The requested bit rate is outside the supported range.
    #[error("bit rate {0} bps is outside {min}..={max}", min = BAUD_MIN, max = BAUD_MAX)]
    BitRateOutOfRange(u16),

    /// Two enabled roles were assigned the same pin.
    #[error("{0} is assigned to more than one role")]
    DuplicatePin(PinId),

    /// The operation needs a pin role that is disabled in the configuration.
    #[error("no {0} pin configured")]
    PinDisabled(PinRole),

    /// The payload does not fit in one frame.
    #[error("payload of {0} bytes exceeds the {max} byte frame limit", max = MAX_PAYLOAD_LEN)]
    PayloadTooLong(usize),

    /// A transmission is in flight, or the modem is active and cannot be reconfigured.
    #[error("modem is busy")]
    Busy,

    /// The modem has not been started.
    #[error("modem is not started")]
    NotStarted,

    /// The GPIO collaborator refused to hand over a pin.
    #[error("could not claim the {0} pin")]
    PinClaim(PinRole),

    /// The sample clock could not be armed.
    #[error("could not start the sample clock")]
    TimerStart,
}
