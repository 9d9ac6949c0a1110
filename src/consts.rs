//! Constants shared by the transmit and receive sides of the modem.
//!
//! Everything that has to agree on both ends of the link lives here: the
//! training preamble, the sync symbols, the payload bound and the sample
//! clock ratio. The receiver's framer and the transmitter's encoder both
//! read these values, they are never chosen independently.
//!
//! ## Key Concepts
//!
//! - **Bit rate**: the configured link speed, accepted in `[BAUD_MIN, BAUD_MAX]`.
//! - **Oversampling**: the sample clock runs at `SAMPLES_PER_BIT` times the bit rate.
//! - **Preamble**: six `0x2a` training symbols (36 alternating bits) followed by
//!   the two sync symbols `0x38 0x2c`.
//! - **Payload Limits**: VirtualWire's 30 byte message minus the length byte and
//!   the two byte frame check sequence.
//!
//! Pin defaults: receiver on GPIO13, transmitter on GPIO16, LED on GPIO21.

/// Lowest accepted bit rate, in bits per second.
pub const BAUD_MIN: u16 = 1_000;

/// Highest accepted bit rate, in bits per second.
pub const BAUD_MAX: u16 = 5_000;

/// Default bit rate, in bits per second.
pub const DEFAULT_BAUD: u16 = 2_000;

/// Number of sample ticks per bit cell.
///
/// The sampler is called this many times per transmitted bit; the PLL ramp
/// and the transmit driver are both built around it.
pub const SAMPLES_PER_BIT: u8 = 8;

/// Number of bits in one 4b6b symbol.
pub const SYMBOL_BITS: u8 = 6;

/// Default receive pin id.
pub const DEFAULT_RX_PIN: u8 = 13;

/// Default transmit pin id.
pub const DEFAULT_TX_PIN: u8 = 16;

/// Default status LED pin id.
pub const DEFAULT_LED_PIN: u8 = 21;

/// Default push-to-transmit pin id (disabled).
pub const DEFAULT_PTT_PIN: u8 = 0;

/// Maximum number of payload bytes in one frame.
pub const MAX_PAYLOAD_LEN: u8 = 27;

/// See [`MAX_PAYLOAD_LEN`](crate::consts::MAX_PAYLOAD_LEN)
pub const MAX_PAYLOAD_LEN_USIZE: usize = MAX_PAYLOAD_LEN as usize;

/// The training symbol. Sent LSB first it is the bit run `010101`.
pub const TRAINING_SYMBOL: u8 = 0x2a;

/// Number of training symbols at the start of every frame.
pub const TRAINING_LEN: usize = 6;

/// The two sync symbols that close the preamble and mark start-of-frame.
pub const SYNC_SYMBOLS: [u8; 2] = [0x38, 0x2c];

/// Length (in symbols) of the full preamble: training run plus sync.
pub const PREAMBLE_LEN: usize = TRAINING_LEN + SYNC_SYMBOLS.len();

/// The complete preamble as transmitted.
pub const PREAMBLE: [u8; PREAMBLE_LEN] = [
    TRAINING_SYMBOL,
    TRAINING_SYMBOL,
    TRAINING_SYMBOL,
    TRAINING_SYMBOL,
    TRAINING_SYMBOL,
    TRAINING_SYMBOL,
    SYNC_SYMBOLS[0],
    SYNC_SYMBOLS[1],
];

/// The sync symbols as they appear in the receiver's 12 bit shift window.
///
/// Bits are shifted in LSB first from the top, so the first sync symbol ends
/// up in the low six bits: `(0x2c << 6) | 0x38`.
pub const START_SYMBOL: u16 = 0xb38;

/// Minimum run of alternating bits the receiver must see before it starts
/// looking for the sync symbols. The transmitter sends 36.
pub const PREAMBLE_MIN_RUN: u8 = 16;

/// Number of bytes in the frame check sequence.
pub const FCS_LEN: usize = 2;

/// Maximum number of symbols in one encoded frame.
///
/// Preamble, then two symbols per byte for length, payload and FCS.
pub const MAX_FRAME_SYMBOLS: usize = PREAMBLE_LEN + 2 * (1 + MAX_PAYLOAD_LEN_USIZE + FCS_LEN);

/// Bit cells the push-to-transmit line is held before and after the data
/// when a PTT pin is configured.
pub const PTT_GUARD_BITS: u8 = 8;

/// Nanoseconds per second.
pub const NANOS_PER_SECOND: u32 = 1_000_000_000;
