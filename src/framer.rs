//! Message framing for both directions of the link.
//!
//! ## Wire format
//!
//! All fields are 4b6b symbols, each sent least significant bit first:
//!
//! | Field     | Symbols | Content                                            |
//! |-----------|---------|----------------------------------------------------|
//! | training  | 6       | `0x2a` x 6, a run of 36 alternating bits           |
//! | sync      | 2       | `0x38 0x2c`                                        |
//! | length    | 2       | number of payload bytes, 0..=27                    |
//! | payload   | 2 x len | payload bytes, high nibble first                   |
//! | FCS       | 4       | `!crc_ccitt(length, payload)`, low byte first      |
//!
//! The transmit side is [`encode_frame`], which produces a [`TxFrame`]. The
//! receive side is [`RxFramer`], a state machine fed one recovered bit at a
//! time. It holds no timing state of its own.

use heapless::Vec;

use crate::consts::{
    FCS_LEN, MAX_FRAME_SYMBOLS, MAX_PAYLOAD_LEN, MAX_PAYLOAD_LEN_USIZE, PREAMBLE, PREAMBLE_MIN_RUN,
    START_SYMBOL, SYMBOL_BITS,
};
use crate::crc::frame_check_sequence;
use crate::encoding::{decode_6b4b, encode_4b6b};
use crate::error::ModemError;

/// Bits in one encoded byte (two symbols).
const PAIR_BITS: u8 = 2 * SYMBOL_BITS;

/// Mask for the 12 bit receive window.
const WINDOW_MASK: u16 = (1 << PAIR_BITS) - 1;

/// A payload as delivered to, or accepted from, the consumer.
pub type Message = Vec<u8, MAX_PAYLOAD_LEN_USIZE>;

/// A fully encoded frame: preamble, header, payload and FCS as 6-bit symbols.
#[derive(PartialEq, Eq, Clone, Debug, Default)]
pub struct TxFrame {
    symbols: Vec<u8, MAX_FRAME_SYMBOLS>,
}

impl TxFrame {
    /// The encoded symbols, in transmission order.
    pub fn symbols(&self) -> &[u8] {
        &self.symbols
    }

    /// Number of bit cells needed to send the frame.
    pub fn bit_len(&self) -> usize {
        self.symbols.len() * usize::from(SYMBOL_BITS)
    }

    /// Bit `index` of the frame as it goes on the wire.
    ///
    /// Symbols are sent LSB first.
    pub fn bit(&self, index: usize) -> Option<bool> {
        let bits = usize::from(SYMBOL_BITS);
        let symbol = self.symbols.get(index / bits)?;
        Some(symbol & (1 << (index % bits)) != 0)
    }

    /// Iterates over the frame's bits in transmission order.
    pub fn bits(&self) -> impl Iterator<Item = bool> + '_ {
        self.symbols
            .iter()
            .flat_map(|&sym| (0..SYMBOL_BITS).map(move |i| sym & (1 << i) != 0))
    }

    fn push_byte(&mut self, byte: u8) {
        // Capacity is sized for the largest payload; callers check the length first
        let _ = self.symbols.extend_from_slice(&encode_4b6b(byte));
    }
}

/// Encodes `payload` into a complete frame ready for the transmit driver.
///
/// # Errors
/// [`ModemError::PayloadTooLong`] if `payload` is longer than
/// [`MAX_PAYLOAD_LEN`].
pub fn encode_frame(payload: &[u8]) -> Result<TxFrame, ModemError> {
    let length = u8::try_from(payload.len())
        .ok()
        .filter(|&len| len <= MAX_PAYLOAD_LEN)
        .ok_or(ModemError::PayloadTooLong(payload.len()))?;

    let mut frame = TxFrame::default();
    let _ = frame.symbols.extend_from_slice(&PREAMBLE);
    frame.push_byte(length);
    for &b in payload {
        frame.push_byte(b);
    }
    let fcs = frame_check_sequence(length, payload);
    for b in fcs.to_le_bytes() {
        frame.push_byte(b);
    }
    Ok(frame)
}

/// Receive framer state.
#[derive(PartialEq, Eq, Clone, Copy, Debug, Default)]
#[cfg_attr(feature = "defmt-0-3", derive(defmt::Format))]
pub enum FramerState {
    /// Looking for a run of alternating training bits.
    #[default]
    WaitPreamble,
    /// Training seen; waiting for the sync symbols.
    WaitSync,
    /// Reading the length byte.
    ReadLength,
    /// Reading payload bytes.
    ReadPayload,
    /// Reading the two FCS bytes, then validating.
    ReadChecksum,
}

/// Why a frame that got past sync was thrown away.
#[derive(PartialEq, Eq, Clone, Copy, Debug)]
#[cfg_attr(feature = "defmt-0-3", derive(defmt::Format))]
pub enum DiscardReason {
    /// A 6-bit group did not decode to a nibble.
    InvalidSymbol,
    /// The length byte exceeded [`MAX_PAYLOAD_LEN`].
    LengthOutOfRange(u8),
    /// The received FCS did not match the recomputed one.
    ChecksumMismatch,
    /// The line went quiet mid-frame.
    SignalLost,
}

/// Result of feeding a bit to the framer.
#[derive(PartialEq, Eq, Clone, Copy, Debug)]
#[cfg_attr(feature = "defmt-0-3", derive(defmt::Format))]
pub enum FrameEvent {
    /// A checksum-valid frame is ready in [`RxFramer::payload`].
    Complete,
    /// A frame was abandoned; the framer is searching for a preamble again.
    Discarded(DiscardReason),
}

/// Receive-side frame assembler.
///
/// Fed one bit per recovered cell by [`push_bit`](RxFramer::push_bit). A frame
/// is only reported as [`FrameEvent::Complete`] after its FCS has been
/// checked; partial frames never leave this struct.
#[derive(Debug, Default)]
pub struct RxFramer {
    state: FramerState,

    /// Last 12 bits received, newest in bit 11.
    bits: u16,

    /// Previous bit, for spotting alternation in the training run.
    last_bit: bool,

    /// Length of the current alternating run.
    run: u8,

    /// Bits seen in `WaitSync` since the alternation broke.
    sync_bits: u8,

    /// Bits collected towards the current symbol pair.
    bit_count: u8,

    /// Declared payload length.
    length: u8,

    payload: Message,

    fcs: [u8; FCS_LEN],
    fcs_len: u8,
}

impl RxFramer {
    /// Creates a framer searching for a preamble.
    pub fn new() -> Self {
        Self::default()
    }

    /// Current state.
    pub fn state(&self) -> FramerState {
        self.state
    }

    /// Whether a frame is being assembled (sync has been seen).
    pub fn in_frame(&self) -> bool {
        matches!(
            self.state,
            FramerState::ReadLength | FramerState::ReadPayload | FramerState::ReadChecksum
        )
    }

    /// Payload of the last frame reported as [`FrameEvent::Complete`].
    ///
    /// Only meaningful right after `Complete`; the next sync clears it.
    pub fn payload(&self) -> &[u8] {
        &self.payload
    }

    /// Abandons whatever is in progress and goes back to preamble search.
    pub fn reset(&mut self) {
        self.state = FramerState::WaitPreamble;
        self.run = 0;
        self.sync_bits = 0;
        self.bit_count = 0;
    }

    /// Tells the framer the PLL lost the signal.
    ///
    /// Returns a discard event if a frame was being assembled.
    pub fn signal_lost(&mut self) -> Option<FrameEvent> {
        let was_in_frame = self.in_frame();
        self.reset();
        was_in_frame.then_some(FrameEvent::Discarded(DiscardReason::SignalLost))
    }

    /// Feeds one recovered bit.
    pub fn push_bit(&mut self, bit: bool) -> Option<FrameEvent> {
        // Shift in LSB first from the top; the oldest bit falls off the bottom
        self.bits = (self.bits >> 1) | if bit { 1 << (PAIR_BITS - 1) } else { 0 };
        let alternating = bit != self.last_bit;
        self.last_bit = bit;

        match self.state {
            FramerState::WaitPreamble => {
                self.run = if alternating {
                    self.run.saturating_add(1)
                } else {
                    1
                };
                if self.run >= PREAMBLE_MIN_RUN {
                    self.state = FramerState::WaitSync;
                    self.sync_bits = 0;
                }
                None
            }
            FramerState::WaitSync => {
                if self.bits & WINDOW_MASK == START_SYMBOL {
                    self.state = FramerState::ReadLength;
                    self.bit_count = 0;
                    self.payload.clear();
                    self.fcs_len = 0;
                } else if self.sync_bits > 0 || !alternating {
                    self.sync_bits += 1;
                    if self.sync_bits > PAIR_BITS {
                        // Not our sync, resynchronize silently
                        self.reset();
                    }
                }
                None
            }
            FramerState::ReadLength | FramerState::ReadPayload | FramerState::ReadChecksum => {
                self.bit_count += 1;
                if self.bit_count < PAIR_BITS {
                    return None;
                }
                self.bit_count = 0;
                // The 6 lsbits are the high nibble
                let byte = decode_6b4b((self.bits & 0x3f) as u8, (self.bits >> SYMBOL_BITS) as u8);
                match byte {
                    Some(byte) => self.take_byte(byte),
                    None => self.discard(DiscardReason::InvalidSymbol),
                }
            }
        }
    }

    fn take_byte(&mut self, byte: u8) -> Option<FrameEvent> {
        match self.state {
            FramerState::ReadLength => {
                if byte > MAX_PAYLOAD_LEN {
                    return self.discard(DiscardReason::LengthOutOfRange(byte));
                }
                self.length = byte;
                self.state = if byte == 0 {
                    FramerState::ReadChecksum
                } else {
                    FramerState::ReadPayload
                };
                None
            }
            FramerState::ReadPayload => {
                let _ = self.payload.push(byte);
                if self.payload.len() >= usize::from(self.length) {
                    self.state = FramerState::ReadChecksum;
                }
                None
            }
            FramerState::ReadChecksum => {
                self.fcs[usize::from(self.fcs_len)] = byte;
                self.fcs_len += 1;
                if usize::from(self.fcs_len) < FCS_LEN {
                    return None;
                }
                self.validate()
            }
            FramerState::WaitPreamble | FramerState::WaitSync => None,
        }
    }

    fn validate(&mut self) -> Option<FrameEvent> {
        let expected = frame_check_sequence(self.length, &self.payload);
        if u16::from_le_bytes(self.fcs) != expected {
            return self.discard(DiscardReason::ChecksumMismatch);
        }
        self.reset();
        Some(FrameEvent::Complete)
    }

    fn discard(&mut self, reason: DiscardReason) -> Option<FrameEvent> {
        self.reset();
        Some(FrameEvent::Discarded(reason))
    }
}
