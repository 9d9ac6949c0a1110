//! Software PLL for OOK bit clock recovery.
//!
//! This module reconstructs the transmitter's bit clock from the receiver
//! output alone. The pin is sampled [`SAMPLES_PER_BIT`] times per bit; a phase
//! ramp runs from 0 to [`RAMP_LEN`] once per bit cell, and signal edges nudge
//! it so that edges line up with the ramp wrapping and the cell centre lines
//! up with the ramp crossing its midpoint. That crossing is where the bit is
//! read.
//!
//! Edges never reset the ramp outright: they only speed it up or slow it
//! down by [`RAMP_ADJUST`], which lets the receiver follow a transmitter whose
//! clock is close to, but not exactly, the nominal rate.
//!
//! The PLL knows nothing about symbols or frames. Its output is a stream of
//! [`Recovered`] events consumed by [`RxFramer`](crate::framer::RxFramer).

use crate::consts::{SAMPLES_PER_BIT, SYMBOL_BITS};

/// Phase units per bit cell.
pub const RAMP_LEN: u16 = SAMPLES_PER_BIT as u16 * 20;

/// Ramp advance per tick with no edge.
pub const RAMP_INC: u16 = RAMP_LEN / SAMPLES_PER_BIT as u16;

/// Ramp position of the bit-cell centre.
pub const RAMP_MIDPOINT: u16 = RAMP_LEN / 2;

/// Correction applied to the ramp increment on an edge.
pub const RAMP_ADJUST: u16 = 9;

/// Output of one PLL update.
#[derive(PartialEq, Eq, Clone, Copy, Debug)]
#[cfg_attr(feature = "defmt-0-3", derive(defmt::Format))]
pub enum Recovered {
    /// The ramp crossed a cell centre; this is the bit read there.
    Bit(bool),
    /// The line has held one level for a whole symbol period.
    SignalLost,
}

#[derive(Debug)]
/// A simple digital phase-locked loop for recovering bits from an OOK signal.
///
/// Feed it one sample per tick with [`update`](SoftwarePll::update).
pub struct SoftwarePll {
    /// Phase accumulator used to track position within a single bit interval.
    ///
    /// This is incremented on each `update()` and wraps around at `RAMP_LEN`.
    /// Signal edges adjust how fast it is incremented to maintain phase lock.
    ramp: u16,

    /// Tracks the previous sample value to detect rising or falling edges.
    last_sample: bool,

    /// Bit cells recovered since the last edge.
    ///
    /// Reaching `SYMBOL_BITS` means the transmitter went quiet.
    cells_since_edge: u8,

    /// Ramp increment used when a transition is seen in the first half of
    /// the cell: the PLL is running ahead, so slow it down.
    ramp_retard: u16,

    /// Ramp increment used when a transition is seen in the second half of
    /// the cell: the PLL is running behind, so speed it up.
    ramp_advance: u16,
}

impl Default for SoftwarePll {
    fn default() -> Self {
        Self::new()
    }
}

impl SoftwarePll {
    /// Creates a new PLL with zero phase.
    pub fn new() -> Self {
        Self {
            ramp: 0,
            last_sample: false,
            cells_since_edge: 0,
            ramp_retard: RAMP_INC - RAMP_ADJUST,
            ramp_advance: RAMP_INC + RAMP_ADJUST,
        }
    }

    /// Drops phase and edge history.
    pub fn reset(&mut self) {
        self.ramp = 0;
        self.last_sample = false;
        self.cells_since_edge = 0;
    }

    /// Current ramp position, in `[0, RAMP_LEN)`.
    pub fn ramp(&self) -> u16 {
        self.ramp
    }

    /// Advances the PLL by one tick with the current (already polarity
    /// corrected) pin level.
    ///
    /// Returns an event on the tick where the ramp crosses a cell centre and
    /// `None` on every other tick.
    pub fn update(&mut self, sample: bool) -> Option<Recovered> {
        let before = self.ramp;

        if sample != self.last_sample {
            // Transition: retard if early in the cell, advance if late
            self.ramp += if self.ramp < RAMP_MIDPOINT {
                self.ramp_retard
            } else {
                self.ramp_advance
            };
            self.last_sample = sample;
            self.cells_since_edge = 0;
        } else {
            self.ramp += RAMP_INC;
        }

        // No single step spans both the midpoint and the wrap
        let crossed_centre = before < RAMP_MIDPOINT && self.ramp >= RAMP_MIDPOINT;
        if self.ramp >= RAMP_LEN {
            self.ramp -= RAMP_LEN;
        }

        if !crossed_centre {
            return None;
        }

        self.cells_since_edge = self.cells_since_edge.saturating_add(1);
        if self.cells_since_edge == SYMBOL_BITS {
            trace!("pll: no transition for {} cells", SYMBOL_BITS);
            return Some(Recovered::SignalLost);
        }
        Some(Recovered::Bit(sample))
    }
}
