//! Bit-banged transmit driver.
//!
//! [`Transmitter`] walks an encoded [`TxFrame`] one bit cell at a time. The
//! controller calls [`next_tick`](Transmitter::next_tick) once per sample tick;
//! the driver answers with the level to put on the line at the start of each
//! [`SAMPLES_PER_BIT`]-tick cell and holds it for the rest of the cell.
//!
//! When a push-to-transmit line is in use the data is wrapped in guard cells
//! (line low, PTT still keyed) so slow transmitters have settled before the
//! preamble starts and are not cut off before the last FCS bit.

use crate::consts::SAMPLES_PER_BIT;
use crate::framer::TxFrame;

/// What the transmit pin should do on this tick.
#[derive(PartialEq, Eq, Clone, Copy, Debug)]
#[cfg_attr(feature = "defmt-0-3", derive(defmt::Format))]
pub enum TxTick {
    /// Start of a cell: drive the data line to this (uninverted) level.
    Drive(bool),
    /// Mid-cell: leave the line alone.
    Hold,
    /// The last cell has been held for its full length.
    Finished,
}

#[derive(PartialEq, Eq, Clone, Copy, Debug, Default)]
enum Phase {
    #[default]
    Idle,
    LeadIn,
    Data,
    Tail,
}

/// Transmit-side cursor over one encoded frame.
#[derive(Debug, Default)]
pub struct Transmitter {
    frame: TxFrame,
    phase: Phase,

    /// Guard cells per side.
    guard: u8,

    /// Guard cells left in the current lead-in or tail.
    guard_left: u8,

    /// Index of the next bit of `frame` to send.
    bit_index: usize,

    /// Tick position within the current cell.
    tick_counter: u8,
}

impl Transmitter {
    /// Creates an idle transmitter.
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether a frame is loaded and not yet finished.
    pub fn is_active(&self) -> bool {
        self.phase != Phase::Idle
    }

    /// Loads `frame` for transmission, wrapped in `guard` low cells per side.
    ///
    /// Replaces anything in flight; the controller refuses to call this while
    /// [`is_active`](Transmitter::is_active).
    pub fn load(&mut self, frame: TxFrame, guard: u8) {
        self.frame = frame;
        self.guard = guard;
        self.guard_left = guard;
        self.bit_index = 0;
        self.tick_counter = 0;
        self.phase = if guard > 0 { Phase::LeadIn } else { Phase::Data };
    }

    /// Drops the loaded frame.
    pub fn abort(&mut self) {
        self.phase = Phase::Idle;
        self.bit_index = 0;
        self.tick_counter = 0;
    }

    /// The frame being sent.
    pub fn frame(&self) -> &TxFrame {
        &self.frame
    }

    /// Total ticks from [`load`](Transmitter::load) to
    /// [`TxTick::Finished`], inclusive.
    pub fn total_ticks(&self) -> usize {
        let cells = self.frame.bit_len() + 2 * usize::from(self.guard);
        cells * usize::from(SAMPLES_PER_BIT) + 1
    }

    /// Advances one sample tick.
    pub fn next_tick(&mut self) -> TxTick {
        if self.phase == Phase::Idle {
            return TxTick::Finished;
        }
        let cell_start = self.tick_counter == 0;
        self.tick_counter += 1;
        if self.tick_counter >= SAMPLES_PER_BIT {
            self.tick_counter = 0;
        }
        if !cell_start {
            return TxTick::Hold;
        }
        self.next_cell()
    }

    fn next_cell(&mut self) -> TxTick {
        loop {
            match self.phase {
                Phase::Idle => return TxTick::Finished,
                Phase::LeadIn => {
                    if self.guard_left > 0 {
                        self.guard_left -= 1;
                        return TxTick::Drive(false);
                    }
                    self.phase = Phase::Data;
                }
                Phase::Data => {
                    if let Some(bit) = self.frame.bit(self.bit_index) {
                        self.bit_index += 1;
                        return TxTick::Drive(bit);
                    }
                    self.guard_left = self.guard;
                    self.phase = Phase::Tail;
                }
                Phase::Tail => {
                    if self.guard_left > 0 {
                        self.guard_left -= 1;
                        return TxTick::Drive(false);
                    }
                    self.abort();
                    return TxTick::Finished;
                }
            }
        }
    }
}
